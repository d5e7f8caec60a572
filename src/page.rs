//! The browser operations the scraper depends on
//!
//! [`crate::webdriver::Browser`] implements this over WebDriver. Keeping the
//! submitter, extractor and run loop generic over [`MapPage`] lets them run
//! against an in-memory page in tests.

use anyhow::Result;

use crate::selectors::Selector;

#[allow(async_fn_in_trait)]
pub trait MapPage {
    /// Load `url` and wait for the document to finish loading
    async fn goto(&self, url: &str) -> Result<()>;

    /// Clear the first element matching `selector`, type `text` and press Enter
    async fn submit_text(&self, selector: &Selector, text: &str) -> Result<()>;

    /// Number of elements currently matching `selector`
    async fn count(&self, selector: &Selector) -> Result<usize>;

    /// Scroll the first element matching `selector` to its bottom.
    /// Returns `false` when no such element exists.
    async fn scroll_to_end(&self, selector: &Selector) -> Result<bool>;

    /// Bring the `index`-th match of `selector` into view and click it
    async fn open_card(&self, selector: &Selector, index: usize) -> Result<()>;

    /// Trimmed text of the first match, `None` when absent or blank
    async fn read_text(&self, selector: &Selector) -> Option<String>;

    /// Attribute of the first match, `None` when absent or blank
    async fn read_attribute(&self, selector: &Selector, name: &str) -> Option<String>;

    /// End the browser session
    async fn close(self) -> Result<()>
    where
        Self: Sized;

    async fn exists(&self, selector: &Selector) -> Result<bool> {
        Ok(self.count(selector).await? > 0)
    }
}
