// Common test utilities: an in-memory map page

#![allow(dead_code)]

use anyhow::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use mapprobe::{MapPage, ScrapeConfig, Selector, SelectorSet};

/// One result card and the detail pane it opens
#[derive(Default, Clone)]
pub struct MockCard {
    texts: HashMap<Selector, String>,
    attributes: HashMap<(Selector, String), String>,
}

impl MockCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, selector: Selector, value: &str) -> Self {
        self.texts.insert(selector, value.to_string());
        self
    }

    pub fn attribute(mut self, selector: Selector, name: &str, value: &str) -> Self {
        self.attributes
            .insert((selector, name.to_string()), value.to_string());
        self
    }

    /// Card populated through the first selector of each default chain
    pub fn with_fields(
        name: Option<&str>,
        address: Option<&str>,
        phone: Option<&str>,
        website: Option<&str>,
        description: Option<&str>,
    ) -> Self {
        let fields = SelectorSet::default().fields;
        let mut card = MockCard::new();
        if let Some(v) = name {
            card = card.text(fields.name[0].clone(), v);
        }
        if let Some(v) = address {
            card = card.text(fields.address[0].clone(), v);
        }
        if let Some(v) = phone {
            card = card.text(fields.phone[0].clone(), v);
        }
        if let Some(v) = website {
            card = card
                .attribute(fields.website[0].clone(), "href", v)
                .text(fields.website[0].clone(), "Website");
        }
        if let Some(v) = description {
            card = card.text(fields.description[0].clone(), v);
        }
        card
    }
}

#[derive(Default)]
struct PageState {
    submitted: Vec<String>,
    navigations: Vec<String>,
    opened: Option<usize>,
    scrolls: usize,
}

/// Map page held in memory. Cards render once a query has been submitted.
pub struct MockPage {
    selectors: SelectorSet,
    cards: Vec<MockCard>,
    has_search_box: bool,
    panel_renders: bool,
    fail_open_at: Option<usize>,
    navigation_fails: bool,
    state: RefCell<PageState>,
    closes: Arc<AtomicUsize>,
}

impl MockPage {
    pub fn new(cards: Vec<MockCard>) -> Self {
        MockPage {
            selectors: SelectorSet::default(),
            cards,
            has_search_box: true,
            panel_renders: true,
            fail_open_at: None,
            navigation_fails: false,
            state: RefCell::new(PageState::default()),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn without_search_box(mut self) -> Self {
        self.has_search_box = false;
        self
    }

    /// The results panel never appears after submitting
    pub fn without_results_panel(mut self) -> Self {
        self.panel_renders = false;
        self
    }

    /// Opening the card at `index` fails
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_open_at = Some(index);
        self
    }

    /// Every navigation after the initial page load fails
    pub fn failing_navigation(mut self) -> Self {
        self.navigation_fails = true;
        self
    }

    /// Shared counter of `close` calls, readable after the page is moved
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    pub fn submitted(&self) -> Vec<String> {
        self.state.borrow().submitted.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.borrow().navigations.clone()
    }

    pub fn scrolls(&self) -> usize {
        self.state.borrow().scrolls
    }

    fn results_visible(&self) -> bool {
        self.panel_renders && !self.state.borrow().submitted.is_empty()
    }

    fn opened_card(&self) -> Option<&MockCard> {
        self.state.borrow().opened.and_then(|i| self.cards.get(i))
    }
}

impl MapPage for MockPage {
    async fn goto(&self, url: &str) -> Result<()> {
        if self.navigation_fails {
            anyhow::bail!("unknown error: net::ERR_CONNECTION_RESET ({})", url);
        }
        let mut state = self.state.borrow_mut();
        state.navigations.push(url.to_string());
        state.opened = None;
        Ok(())
    }

    async fn submit_text(&self, selector: &Selector, text: &str) -> Result<()> {
        if !self.has_search_box || *selector != self.selectors.search_box {
            anyhow::bail!("No elements found matching selector: {}", selector);
        }
        self.state.borrow_mut().submitted.push(text.to_string());
        Ok(())
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        if *selector == self.selectors.search_box {
            return Ok(usize::from(self.has_search_box));
        }
        if self.selectors.results_panel.contains(selector)
            || self.selectors.scroll_container.contains(selector)
        {
            return Ok(usize::from(self.results_visible()));
        }
        if *selector == self.selectors.result_card && self.results_visible() {
            return Ok(self.cards.len());
        }
        Ok(0)
    }

    async fn scroll_to_end(&self, selector: &Selector) -> Result<bool> {
        if self.count(selector).await? == 0 {
            return Ok(false);
        }
        self.state.borrow_mut().scrolls += 1;
        Ok(true)
    }

    async fn open_card(&self, selector: &Selector, index: usize) -> Result<()> {
        if *selector != self.selectors.result_card || index >= self.cards.len() {
            anyhow::bail!("Index {} out of bounds", index);
        }
        if self.fail_open_at == Some(index) {
            anyhow::bail!("stale element reference: card {} detached", index);
        }
        self.state.borrow_mut().opened = Some(index);
        Ok(())
    }

    async fn read_text(&self, selector: &Selector) -> Option<String> {
        self.opened_card()?
            .texts
            .get(selector)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    async fn read_attribute(&self, selector: &Selector, name: &str) -> Option<String> {
        self.opened_card()?
            .attributes
            .get(&(selector.clone(), name.to_string()))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    async fn close(self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Default configuration with pauses removed and a short wait bound
pub fn fast_config() -> ScrapeConfig {
    ScrapeConfig {
        results_timeout: Duration::from_millis(50),
        ..ScrapeConfig::default()
    }
    .without_pauses()
}
