use anyhow::{Context, Result};
use fantoccini::elements::Element;
use fantoccini::key::Key;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::ScrapeConfig;
use crate::errors::ScrapeError;
use crate::page::MapPage;
use crate::selectors::Selector;
use crate::types::ViewportSize;
use crate::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;

/// Browser session driven over WebDriver
pub struct Browser {
    client: Client,
    browser_type: BrowserType,
    // Chrome profile directory, removed when the session is dropped
    _profile_dir: Option<TempDir>,
}

/// Supported browser types
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BrowserType {
    /// Google Chrome/Chromium
    Chrome,
    /// Mozilla Firefox
    Firefox,
}

impl std::str::FromStr for BrowserType {
    type Err = anyhow::Error;

    /// Parse browser type from string (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserType::Firefox),
            "chrome" | "chromium" => Ok(BrowserType::Chrome),
            _ => anyhow::bail!("Unsupported browser: {}", s),
        }
    }
}

impl BrowserType {
    /// WebDriver executable for this browser
    pub fn driver_binary(&self) -> &'static str {
        match self {
            BrowserType::Chrome => "chromedriver",
            BrowserType::Firefox => "geckodriver",
        }
    }

    /// Port the driver listens on when started without arguments
    pub fn standard_port(&self) -> u16 {
        match self {
            BrowserType::Chrome => 9515,
            BrowserType::Firefox => 4444,
        }
    }

    /// Browser launch arguments for the given window settings
    pub fn launch_args(&self, headless: bool, viewport: Option<&ViewportSize>) -> Vec<String> {
        let mut args = Vec::new();
        match self {
            BrowserType::Chrome => {
                args.push("--no-sandbox".to_string());
                if headless {
                    args.push("--headless=new".to_string());
                    args.push("--disable-gpu".to_string());
                    args.push("--disable-dev-shm-usage".to_string());
                }
                match viewport {
                    Some(vp) => args.push(format!("--window-size={},{}", vp.width, vp.height)),
                    None => args.push("--start-maximized".to_string()),
                }
            }
            BrowserType::Firefox => {
                if headless {
                    args.push("--headless".to_string());
                }
                if let Some(vp) = viewport {
                    args.push(format!("--width={}", vp.width));
                    args.push(format!("--height={}", vp.height));
                }
            }
        }
        args
    }
}

impl Browser {
    /// Start a browser session and navigate it to the configured start page
    pub async fn launch(config: &ScrapeConfig) -> Result<Self> {
        let browser_type = config.browser;
        info!(
            "Launching {:?} ({})",
            browser_type,
            if config.headless { "headless" } else { "visible" }
        );

        let webdriver_url = GLOBAL_WEBDRIVER_MANAGER.ensure_driver(browser_type).await?;

        let mut args = browser_type.launch_args(config.headless, config.viewport.as_ref());

        // Chrome refuses to share a profile directory between sessions
        let profile_dir = match browser_type {
            BrowserType::Chrome => {
                let dir = tempfile::Builder::new()
                    .prefix("mapprobe-chrome-")
                    .tempdir()
                    .context("Failed to create browser profile directory")?;
                args.push(format!("--user-data-dir={}", dir.path().display()));
                Some(dir)
            }
            BrowserType::Firefox => None,
        };

        let mut caps = serde_json::Map::new();
        let options_key = match browser_type {
            BrowserType::Chrome => "goog:chromeOptions",
            BrowserType::Firefox => "moz:firefoxOptions",
        };
        caps.insert(options_key.to_string(), json!({ "args": args }));

        debug!("Connecting to WebDriver at {}", webdriver_url);
        let client = match ClientBuilder::rustls()
            .capabilities(caps.clone())
            .connect(&webdriver_url)
            .await
        {
            Ok(client) => client,
            Err(e) => {
                let error_str = e.to_string();
                if !(error_str.contains("Session is already started")
                    || error_str.contains("session not created"))
                {
                    return Err(ScrapeError::WebDriverFailed(format!(
                        "could not open a session at {}: {}",
                        webdriver_url, e
                    ))
                    .into());
                }

                // Driver is wedged: restart it once and try again
                info!("WebDriver refused a new session, restarting it");
                GLOBAL_WEBDRIVER_MANAGER.kill_driver(browser_type);
                tokio::time::sleep(Duration::from_millis(500)).await;
                let new_url = GLOBAL_WEBDRIVER_MANAGER.ensure_driver(browser_type).await?;

                ClientBuilder::rustls()
                    .capabilities(caps)
                    .connect(&new_url)
                    .await
                    .map_err(|e| {
                        ScrapeError::WebDriverFailed(format!(
                            "could not open a session after restart: {}",
                            e
                        ))
                    })?
            }
        };

        if let Some(vp) = &config.viewport
            && let Err(e) = client.set_window_size(vp.width, vp.height).await
        {
            debug!("Could not set window size: {}", e);
        }

        let browser = Browser {
            client,
            browser_type,
            _profile_dir: profile_dir,
        };

        // Hand the session back on failure so the browser window does not linger
        if let Err(e) = browser.goto(&config.start_url).await {
            let _ = browser.client.close().await;
            return Err(e);
        }

        Ok(browser)
    }

    async fn nth(&self, selector: &Selector, index: usize) -> Result<Element> {
        let mut elements = self
            .client
            .find_all(selector.as_locator())
            .await
            .with_context(|| format!("Failed to query {}", selector))?;

        if index >= elements.len() {
            anyhow::bail!(
                "Index {} out of bounds. Found {} elements matching '{}'",
                index,
                elements.len(),
                selector
            );
        }
        Ok(elements.swap_remove(index))
    }

    async fn first(&self, selector: &Selector) -> Option<Element> {
        match self.client.find(selector.as_locator()).await {
            Ok(element) => Some(element),
            Err(e) => {
                debug!("{} not present: {}", selector, e);
                None
            }
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl MapPage for Browser {
    async fn goto(&self, url: &str) -> Result<()> {
        info!("Navigating to {}", url);
        self.client
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;

        // Wait up to 2 seconds for the document to settle
        for _ in 0..20 {
            match self
                .client
                .execute("return document.readyState === 'complete';", vec![])
                .await
            {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }
        Ok(())
    }

    async fn submit_text(&self, selector: &Selector, text: &str) -> Result<()> {
        let element = self
            .client
            .find(selector.as_locator())
            .await
            .map_err(|_| ScrapeError::ElementNotFound(selector.to_string()))?;

        element.clear().await.context("Failed to clear input")?;
        element
            .send_keys(text)
            .await
            .context("Failed to type into input")?;

        let enter: char = Key::Enter.into();
        element
            .send_keys(&enter.to_string())
            .await
            .context("Failed to submit input")?;
        Ok(())
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        let elements = self
            .client
            .find_all(selector.as_locator())
            .await
            .with_context(|| format!("Failed to query {}", selector))?;
        Ok(elements.len())
    }

    async fn scroll_to_end(&self, selector: &Selector) -> Result<bool> {
        let Some(container) = self.first(selector).await else {
            return Ok(false);
        };
        let arg = serde_json::to_value(&container)?;
        self.client
            .execute(
                "arguments[0].scrollTop = arguments[0].scrollHeight;",
                vec![arg],
            )
            .await
            .context("Failed to scroll results")?;
        Ok(true)
    }

    async fn open_card(&self, selector: &Selector, index: usize) -> Result<()> {
        let card = self.nth(selector, index).await?;
        let arg = serde_json::to_value(&card)?;
        self.client
            .execute("arguments[0].scrollIntoView(true);", vec![arg])
            .await
            .context("Failed to scroll card into view")?;
        tokio::time::sleep(Duration::from_millis(500)).await;

        debug!("Opening result card {}", index);
        card.click()
            .await
            .with_context(|| format!("Failed to open result card {}", index))?;
        Ok(())
    }

    async fn read_text(&self, selector: &Selector) -> Option<String> {
        let element = self.first(selector).await?;
        element.text().await.ok().and_then(non_blank)
    }

    async fn read_attribute(&self, selector: &Selector, name: &str) -> Option<String> {
        let element = self.first(selector).await?;
        element.attr(name).await.ok().flatten().and_then(non_blank)
    }

    async fn close(self) -> Result<()> {
        debug!("Closing {:?} session", self.browser_type);
        self.client
            .close()
            .await
            .context("Failed to close browser session")?;
        Ok(())
    }
}
