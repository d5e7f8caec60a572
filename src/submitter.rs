use anyhow::Result;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::config::ScrapeConfig;
use crate::errors::ScrapeError;
use crate::page::MapPage;
use crate::selectors::Selector;
use crate::types::SearchQuery;

/// Longest wait actually scheduled, whatever timeout was requested
const MAX_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Poll until any of `selectors` is present. Returns the one that matched,
/// or `None` once `timeout` has elapsed.
pub async fn wait_for_any<'s, P: MapPage>(
    page: &P,
    selectors: &'s [Selector],
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<&'s Selector>> {
    let now = Instant::now();
    let deadline = now
        .checked_add(timeout.min(MAX_WAIT))
        .unwrap_or(now);
    loop {
        for selector in selectors {
            if page.exists(selector).await? {
                return Ok(Some(selector));
            }
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        sleep(poll_interval).await;
    }
}

/// Type the query into the search box, submit it and wait for the results panel
pub async fn submit_query<P: MapPage>(
    page: &P,
    config: &ScrapeConfig,
    query: &SearchQuery,
) -> Result<()> {
    let selectors = &config.selectors;
    let search_box = std::slice::from_ref(&selectors.search_box);

    if wait_for_any(page, search_box, config.results_timeout, config.poll_interval)
        .await?
        .is_none()
    {
        return Err(ScrapeError::ElementNotFound(selectors.search_box.to_string()).into());
    }

    let text = query.to_string();
    info!("Searching for: {}", text);
    page.submit_text(&selectors.search_box, &text).await?;

    match wait_for_any(
        page,
        &selectors.results_panel,
        config.results_timeout,
        config.poll_interval,
    )
    .await?
    {
        Some(panel) => {
            debug!("Results panel present ({})", panel);
            Ok(())
        }
        None => Err(ScrapeError::Timeout(format!(
            "results for '{}' did not appear within {:?}",
            text, config.results_timeout
        ))
        .into()),
    }
}
