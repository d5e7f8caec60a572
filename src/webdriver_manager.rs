use anyhow::{Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::errors::ScrapeError;
use crate::webdriver::BrowserType;

/// Poll attempts while waiting for a freshly spawned driver (3 seconds total)
const STARTUP_ATTEMPTS: u32 = 30;
const STARTUP_POLL: Duration = Duration::from_millis(100);

/// Locates or spawns the WebDriver binary (chromedriver, geckodriver) a session talks to
pub struct WebDriverManager {
    processes: Mutex<Vec<DriverProcess>>,
}

struct DriverProcess {
    browser_type: BrowserType,
    child: Child,
    port: u16,
    url: String,
}

impl Default for WebDriverManager {
    fn default() -> Self {
        Self {
            processes: Mutex::new(Vec::new()),
        }
    }
}

impl WebDriverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the URL of a ready driver for `browser_type`, starting one if needed
    pub async fn ensure_driver(&self, browser_type: BrowserType) -> Result<String> {
        for url in self.managed_urls(browser_type) {
            if Self::verify_driver_working(&url).await {
                debug!("Reusing managed {} at {}", browser_type.driver_binary(), url);
                return Ok(url);
            }
        }

        // A driver the user started by hand on the standard port
        let standard_url = format!("http://localhost:{}", browser_type.standard_port());
        if Self::verify_driver_working(&standard_url).await {
            debug!("Found external WebDriver at {}", standard_url);
            return Ok(standard_url);
        }

        info!(
            "No running {} detected, starting one",
            browser_type.driver_binary()
        );
        self.start_driver(browser_type).await
    }

    fn managed_urls(&self, browser_type: BrowserType) -> Vec<String> {
        match self.processes.lock() {
            Ok(processes) => processes
                .iter()
                .filter(|p| p.browser_type == browser_type)
                .map(|p| p.url.clone())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    async fn start_driver(&self, browser_type: BrowserType) -> Result<String> {
        let binary = browser_type.driver_binary();

        if !Self::command_exists(binary) {
            return Err(ScrapeError::WebDriverFailed(format!(
                "{binary} not found in PATH. Install it first:\n  \
                 macOS: brew install {binary}\n  \
                 Linux: download it from the official releases and put it on PATH\n  \
                 See: https://www.selenium.dev/documentation/webdriver/getting_started/install_drivers/"
            ))
            .into());
        }

        let port = Self::find_free_port_for_browser(browser_type)?;
        let args = match browser_type {
            BrowserType::Chrome => vec![format!("--port={}", port)],
            BrowserType::Firefox => vec!["--port".to_string(), port.to_string()],
        };
        info!("Starting {} on port {}", binary, port);

        let mut cmd = Command::new(binary);
        cmd.args(&args).stdout(Stdio::null()).stderr(Stdio::null());

        // Own process group so the browser it launches dies with it
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to start {}", binary))?;

        let url = format!("http://localhost:{}", port);
        if let Ok(mut processes) = self.processes.lock() {
            processes.push(DriverProcess {
                browser_type,
                child,
                port,
                url: url.clone(),
            });
        }

        for attempt in 1..=STARTUP_ATTEMPTS {
            if Self::is_driver_running(&url).await {
                info!("{} ready on port {}", binary, port);
                return Ok(url);
            }
            if attempt < STARTUP_ATTEMPTS {
                sleep(STARTUP_POLL).await;
            }
        }

        self.stop_port(port);
        Err(ScrapeError::WebDriverFailed(format!(
            "{binary} did not become ready within {} ms",
            STARTUP_ATTEMPTS as u64 * STARTUP_POLL.as_millis() as u64
        ))
        .into())
    }

    /// Check if a command exists in PATH
    pub fn command_exists(command: &str) -> bool {
        #[cfg(unix)]
        let lookup = "which";
        #[cfg(windows)]
        let lookup = "where";

        Command::new(lookup)
            .arg(command)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Pick a port: the driver's conventional ones first, then any the OS hands out
    pub fn find_free_port_for_browser(browser_type: BrowserType) -> Result<u16> {
        let base = browser_type.standard_port();
        for port in base..base + 3 {
            if !Self::is_port_in_use(port) {
                return Ok(port);
            }
            debug!("Port {} is in use", port);
        }

        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(port)
    }

    pub fn is_port_in_use(port: u16) -> bool {
        std::net::TcpListener::bind(("127.0.0.1", port)).is_err()
    }

    /// True when `/status` answers with a success code
    pub async fn is_driver_running(url: &str) -> bool {
        match reqwest::Client::new()
            .get(format!("{}/status", url))
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// True when `/status` reports `value.ready == true`
    async fn verify_driver_working(url: &str) -> bool {
        let response = match reqwest::Client::new()
            .get(format!("{}/status", url))
            .timeout(Duration::from_secs(1))
            .send()
            .await
        {
            Ok(response) => response,
            Err(_) => return false,
        };

        match response.json::<serde_json::Value>().await {
            Ok(body) => body
                .get("value")
                .and_then(|v| v.get("ready"))
                .and_then(|r| r.as_bool())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Kill every managed driver for a browser type
    pub fn kill_driver(&self, browser_type: BrowserType) {
        let Ok(mut processes) = self.processes.lock() else {
            return;
        };
        let (matching, rest): (Vec<_>, Vec<_>) = processes
            .drain(..)
            .partition(|p| p.browser_type == browser_type);
        *processes = rest;
        drop(processes);

        for process in matching {
            Self::terminate(process);
        }
    }

    fn stop_port(&self, port: u16) {
        let process = match self.processes.lock() {
            Ok(mut processes) => processes
                .iter()
                .position(|p| p.port == port)
                .map(|index| processes.remove(index)),
            Err(_) => None,
        };
        if let Some(process) = process {
            warn!("Stopping {} on port {}", process.browser_type.driver_binary(), port);
            Self::terminate(process);
        }
    }

    /// Stop all managed WebDriver processes
    pub fn stop_all(&self) {
        let drained: Vec<DriverProcess> = match self.processes.lock() {
            Ok(mut processes) => processes.drain(..).collect(),
            Err(_) => return,
        };
        for process in drained {
            debug!("Stopping WebDriver on port {}", process.port);
            Self::terminate(process);
        }
    }

    fn terminate(mut process: DriverProcess) {
        #[cfg(unix)]
        Self::kill_process_group(process.child.id() as i32);

        let _ = process.child.kill();
        let _ = process.child.wait();
    }

    /// SIGTERM then SIGKILL the whole group led by `pgid`
    #[cfg(unix)]
    fn kill_process_group(pgid: i32) {
        if let Err(e) = Command::new("kill")
            .args(["-TERM", &format!("-{}", pgid)])
            .output()
        {
            debug!("Failed to send SIGTERM to process group {}: {}", pgid, e);
        }

        std::thread::sleep(Duration::from_millis(100));

        if let Err(e) = Command::new("kill")
            .args(["-KILL", &format!("-{}", pgid)])
            .output()
        {
            debug!("Failed to send SIGKILL to process group {}: {}", pgid, e);
        }
    }

    /// Number of drivers this manager started and still owns
    pub fn managed_count(&self) -> usize {
        self.processes.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl Drop for WebDriverManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

lazy_static::lazy_static! {
    pub static ref GLOBAL_WEBDRIVER_MANAGER: WebDriverManager = WebDriverManager::new();
}

#[cfg(test)]
#[path = "webdriver_manager_test.rs"]
mod webdriver_manager_test;
