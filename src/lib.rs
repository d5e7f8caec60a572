//! # mapprobe
#![allow(clippy::uninlined_format_args)]
//!
//! CLI tool that searches a map web application (Google Maps by default) and
//! prints the business listings it finds: name, address, phone, website and
//! category/description.
//!
//! The browser is driven over WebDriver; `chromedriver` or `geckodriver` is
//! started automatically when none is running.
//!
//! ## CLI Usage
//!
//! ```bash
//! # One search, visible browser
//! mapprobe "empório" --location "São Paulo"
//!
//! # Several searches in one session, headless, JSON lines on stdout
//! mapprobe "casa do norte" "casa de tempero" -l Campinas --headless --format json
//!
//! # No query: prompt for location and a comma-separated list
//! mapprobe
//!
//! # Markup changed? Override the selectors (partial files are fine)
//! mapprobe "padaria" --selectors ./selectors.json
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use mapprobe::{OutputFormat, Reporter, ScrapeConfig, SearchQuery};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ScrapeConfig {
//!     headless: true,
//!     ..ScrapeConfig::default()
//! };
//! let queries = vec![SearchQuery::new("empório", Some("São Paulo".into()))];
//! let mut reporter = Reporter::new(std::io::stdout(), OutputFormat::Simple);
//!
//! let total = mapprobe::scrape::run(&config, &queries, &mut reporter).await?;
//! eprintln!("{} listings", total);
//! # Ok(())
//! # }
//! ```

/// Runtime configuration
pub mod config;

/// Error type with exit codes
pub mod errors;

/// Result card iteration and field extraction
pub mod extractor;

/// Browser operations the scraper relies on
pub mod page;

/// Interactive query entry
pub mod prompt;

/// Listing output
pub mod reporter;

/// Session-scoped run loop
pub mod scrape;

/// Page locators and selector files
pub mod selectors;

/// Search submission and bounded waits
pub mod submitter;

/// Listing and query types
pub mod types;

/// WebDriver browser session
pub mod webdriver;

/// Automatic WebDriver process management
pub mod webdriver_manager;

pub use config::ScrapeConfig;
pub use errors::ScrapeError;
pub use page::MapPage;
pub use reporter::Reporter;
pub use selectors::{FieldSelectors, Selector, SelectorSet};
pub use types::{Listing, OutputFormat, SearchQuery, ViewportSize};
pub use webdriver::{Browser, BrowserType};
