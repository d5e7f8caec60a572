use anyhow::Result;
use std::io::Write;
use tracing::{info, warn};

use crate::config::ScrapeConfig;
use crate::extractor::ListingCursor;
use crate::page::MapPage;
use crate::reporter::Reporter;
use crate::submitter::submit_query;
use crate::types::SearchQuery;
use crate::webdriver::Browser;

/// Search every query in turn on an open page, reporting listings as they are read.
/// Returns the number of listings reported.
pub async fn scrape_queries<P: MapPage, W: Write>(
    page: &P,
    config: &ScrapeConfig,
    queries: &[SearchQuery],
    reporter: &mut Reporter<W>,
) -> Result<usize> {
    for (i, query) in queries.iter().enumerate() {
        // The session starts on the search page; later queries go back to it
        if i > 0 {
            page.goto(&config.start_url).await?;
        }

        reporter.begin_query(query)?;
        submit_query(page, config, query).await?;

        let mut cursor = ListingCursor::open(page, config).await?;
        while let Some(listing) = cursor.next().await {
            reporter.report(&listing)?;
        }
        if cursor.skipped() > 0 {
            warn!(
                "{} of {} cards for '{}' could not be read",
                cursor.skipped(),
                cursor.len(),
                query
            );
        }
    }

    reporter.finish()?;
    Ok(reporter.count())
}

/// Run the queries on `page` and close it exactly once, whatever the outcome
pub async fn run_session<P: MapPage, W: Write>(
    page: P,
    config: &ScrapeConfig,
    queries: &[SearchQuery],
    reporter: &mut Reporter<W>,
) -> Result<usize> {
    let outcome = scrape_queries(&page, config, queries, reporter).await;
    let closed = page.close().await;

    match (outcome, closed) {
        (Ok(total), Ok(())) => {
            info!("Scrape finished with {} listings", total);
            Ok(total)
        }
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("Browser session did not close cleanly: {:#}", close_err);
            Err(e)
        }
    }
}

/// Launch a browser for `config` and scrape `queries` with it
pub async fn run<W: Write>(
    config: &ScrapeConfig,
    queries: &[SearchQuery],
    reporter: &mut Reporter<W>,
) -> Result<usize> {
    let browser = Browser::launch(config).await?;
    run_session(browser, config, queries, reporter).await
}
