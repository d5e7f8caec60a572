//! Walks the rendered result cards and reads one [`Listing`] per card

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ScrapeConfig;
use crate::page::MapPage;
use crate::selectors::{FieldSelectors, Selector};
use crate::types::Listing;

/// The five listing fields, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Address,
    Phone,
    Website,
    Description,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Address,
        Field::Phone,
        Field::Website,
        Field::Description,
    ];

    pub fn chain(self, selectors: &FieldSelectors) -> &[Selector] {
        match self {
            Field::Name => &selectors.name,
            Field::Address => &selectors.address,
            Field::Phone => &selectors.phone,
            Field::Website => &selectors.website,
            Field::Description => &selectors.description,
        }
    }

    /// Links report their target rather than their caption
    fn link_attribute(self) -> Option<&'static str> {
        match self {
            Field::Website => Some("href"),
            _ => None,
        }
    }

    fn slot(self, listing: &mut Listing) -> &mut Option<String> {
        match self {
            Field::Name => &mut listing.name,
            Field::Address => &mut listing.address,
            Field::Phone => &mut listing.phone,
            Field::Website => &mut listing.website,
            Field::Description => &mut listing.description,
        }
    }
}

/// Try each selector in turn; the first non-empty value wins
pub async fn read_field<P: MapPage>(page: &P, field: Field, chain: &[Selector]) -> Option<String> {
    for selector in chain {
        if let Some(attribute) = field.link_attribute()
            && let Some(value) = page.read_attribute(selector, attribute).await
        {
            return Some(value);
        }
        if let Some(value) = page.read_text(selector).await {
            return Some(value);
        }
    }
    debug!("{:?} not found on page", field);
    None
}

/// Read every field of the currently opened card
pub async fn read_listing<P: MapPage>(page: &P, selectors: &FieldSelectors) -> Listing {
    let mut listing = Listing::default();
    for field in Field::ALL {
        *field.slot(&mut listing) = read_field(page, field, field.chain(selectors)).await;
    }
    listing
}

/// Lazy, single-pass sequence of listings over the cards present when it was opened
pub struct ListingCursor<'a, P: MapPage> {
    page: &'a P,
    config: &'a ScrapeConfig,
    total: usize,
    next_index: usize,
    skipped: usize,
}

impl<'a, P: MapPage> ListingCursor<'a, P> {
    /// Load more results by scrolling the panel, then count the cards
    pub async fn open(page: &'a P, config: &'a ScrapeConfig) -> Result<Self> {
        load_more_results(page, config).await?;

        let total = page
            .count(&config.selectors.result_card)
            .await
            .context("Failed to count result cards")?;
        info!("Found {} result cards", total);

        Ok(ListingCursor {
            page,
            config,
            total,
            next_index: 0,
            skipped: 0,
        })
    }

    /// Cards counted when the cursor was opened
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Cards that could not be opened and were skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Extract the next card that opens. A card that fails to open is
    /// logged and skipped; `None` once every card has been visited.
    pub async fn next(&mut self) -> Option<Listing> {
        while self.next_index < self.total {
            let index = self.next_index;
            self.next_index += 1;

            match self.extract(index).await {
                Ok(listing) => return Some(listing),
                Err(e) => {
                    warn!("Skipping result card {}: {:#}", index, e);
                    self.skipped += 1;
                }
            }
        }
        None
    }

    async fn extract(&self, index: usize) -> Result<Listing> {
        self.page
            .open_card(&self.config.selectors.result_card, index)
            .await?;
        if !self.config.card_pause.is_zero() {
            sleep(self.config.card_pause).await;
        }
        Ok(read_listing(self.page, &self.config.selectors.fields).await)
    }
}

/// Scroll the first scroll container found, `scroll_rounds` times
async fn load_more_results<P: MapPage>(page: &P, config: &ScrapeConfig) -> Result<()> {
    if config.scroll_rounds == 0 {
        return Ok(());
    }

    let mut container = None;
    for candidate in &config.selectors.scroll_container {
        if page.exists(candidate).await? {
            container = Some(candidate);
            break;
        }
    }
    let Some(container) = container else {
        debug!("No scrollable results container, skipping scroll");
        return Ok(());
    };

    for round in 1..=config.scroll_rounds {
        if !page.scroll_to_end(container).await? {
            break;
        }
        debug!("Scrolled results ({}/{})", round, config.scroll_rounds);
        if !config.scroll_pause.is_zero() {
            sleep(config.scroll_pause).await;
        }
    }
    Ok(())
}
