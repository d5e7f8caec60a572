//! Runtime configuration for a scrape run

use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

use crate::selectors::SelectorSet;
use crate::types::ViewportSize;
use crate::webdriver::BrowserType;

pub const DEFAULT_START_URL: &str = "https://www.google.com/maps";

/// Settings shared by the session controller, submitter and extractor
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Page the session opens and returns to before each query
    pub start_url: String,
    pub browser: BrowserType,
    /// Run without a visible window
    pub headless: bool,
    /// Fixed window size; the browser starts maximized when unset
    pub viewport: Option<ViewportSize>,
    /// Upper bound for the search box and the results panel to appear
    pub results_timeout: Duration,
    /// Interval between presence checks while waiting
    pub poll_interval: Duration,
    /// How many times the results panel is scrolled to load more cards
    pub scroll_rounds: u32,
    pub scroll_pause: Duration,
    /// Pause after opening a card so its detail pane renders
    pub card_pause: Duration,
    pub selectors: SelectorSet,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            start_url: DEFAULT_START_URL.to_string(),
            browser: BrowserType::Chrome,
            headless: false,
            viewport: None,
            results_timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            scroll_rounds: 4,
            scroll_pause: Duration::from_secs(2),
            card_pause: Duration::from_secs(2),
            selectors: SelectorSet::default(),
        }
    }
}

impl ScrapeConfig {
    /// Set the start URL, accepting only http(s) and file pages
    pub fn with_start_url(mut self, raw: &str) -> Result<Self> {
        let parsed = Url::parse(raw).with_context(|| format!("Invalid start URL: {}", raw))?;
        match parsed.scheme() {
            "http" | "https" | "file" => {}
            other => anyhow::bail!("Unsupported URL scheme '{}' in {}", other, raw),
        }
        self.start_url = parsed.to_string();
        Ok(self)
    }

    /// Configuration with every pause removed, for pages that render synchronously
    pub fn without_pauses(mut self) -> Self {
        self.scroll_pause = Duration::ZERO;
        self.card_pause = Duration::ZERO;
        self.poll_interval = Duration::from_millis(1);
        self
    }
}
