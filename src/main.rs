#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mapprobe::errors::ScrapeError;
use mapprobe::webdriver_manager::GLOBAL_WEBDRIVER_MANAGER;
use mapprobe::{
    BrowserType, OutputFormat, Reporter, ScrapeConfig, SearchQuery, SelectorSet, ViewportSize,
    prompt, scrape,
};

// Exit codes
const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "mapprobe")]
#[command(about = "Search a map application and print business listings", long_about = None)]
struct Cli {
    /// Search terms, e.g. "empório". Prompts interactively when omitted
    queries: Vec<String>,

    /// Location appended to every term ("<term> in <location>")
    #[arg(short, long)]
    location: Option<String>,

    /// Browser to use
    #[arg(short, long, value_enum, default_value = "chrome")]
    browser: BrowserType,

    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,

    /// Set viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
    #[arg(long)]
    viewport: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "simple")]
    format: OutputFormat,

    /// Seconds to wait for the search box and the results panel
    #[arg(long, default_value = "10")]
    timeout: u64,

    /// How many times to scroll the results panel before reading cards
    #[arg(long, default_value = "4")]
    scrolls: u32,

    /// JSON file overriding the page selectors
    #[arg(long)]
    selectors: Option<PathBuf>,

    /// Start page of the map application
    #[arg(long, default_value = mapprobe::config::DEFAULT_START_URL)]
    url: String,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    GLOBAL_WEBDRIVER_MANAGER.stop_all();

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let err: ScrapeError = err.into();
            eprintln!("Error: {}", err);
            std::process::exit(err.exit_code());
        }
    }
}

fn build_config(cli: &Cli) -> Result<ScrapeConfig> {
    let viewport = cli
        .viewport
        .as_deref()
        .map(ViewportSize::parse)
        .transpose()?;

    let config = ScrapeConfig {
        browser: cli.browser,
        headless: cli.headless,
        viewport,
        results_timeout: Duration::from_secs(cli.timeout),
        scroll_rounds: cli.scrolls,
        selectors: SelectorSet::resolve(cli.selectors.as_deref())?,
        ..ScrapeConfig::default()
    };
    config.with_start_url(&cli.url)
}

async fn run() -> Result<()> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapprobe=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    let queries = if cli.queries.is_empty() {
        let stdin = std::io::stdin();
        prompt::prompt_queries(&mut stdin.lock(), &mut std::io::stderr(), cli.location.clone())?
    } else {
        cli.queries
            .iter()
            .map(|term| SearchQuery::new(term.as_str(), cli.location.clone()))
            .collect()
    };

    if queries.is_empty() {
        anyhow::bail!("No valid query given");
    }

    let mut reporter = Reporter::new(std::io::stdout(), cli.format);
    scrape::run(&config, &queries, &mut reporter).await?;
    Ok(())
}
