use thiserror::Error;

/// Error type that carries the process exit code for each failure category
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Required element not found (exit code 2)
    #[error("No elements found matching selector: {0}")]
    ElementNotFound(String),
    /// WebDriver or browser could not be started or reached (exit code 4)
    #[error("WebDriver connection failed: {0}")]
    WebDriverFailed(String),
    /// Page content did not render in time (exit code 5). Only raised
    /// explicitly; driver-side timeouts stay generic.
    #[error("Operation timed out: {0}")]
    Timeout(String),
    /// Generic error (exit code 1)
    #[error("{0}")]
    Other(anyhow::Error),
}

impl ScrapeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ScrapeError::ElementNotFound(_) => 2,
            ScrapeError::WebDriverFailed(_) => 4,
            ScrapeError::Timeout(_) => 5,
            ScrapeError::Other(_) => 1,
        }
    }
}

impl From<anyhow::Error> for ScrapeError {
    fn from(err: anyhow::Error) -> Self {
        // Typed errors raised inside the crate survive the trip through anyhow
        let err = match err.downcast::<ScrapeError>() {
            Ok(typed) => return typed,
            Err(err) => err,
        };

        let msg = format!("{:#}", err);

        if msg.contains("No elements found matching selector") {
            ScrapeError::ElementNotFound(msg)
        } else if msg.contains("WebDriver")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            ScrapeError::WebDriverFailed(msg)
        } else {
            ScrapeError::Other(err)
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
