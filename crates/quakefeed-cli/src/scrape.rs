//! `scrape` command: fetch or read a bulletin and print its records.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use quakefeed_core::AppConfig;
use quakefeed_scraper::{
    extract_earthquakes, BulletinClient, ExtractOptions, Extraction, FetchSettings, MonthSelector,
};

#[derive(Debug, Args)]
pub(crate) struct ScrapeArgs {
    /// Read markup from a saved page instead of fetching it.
    #[arg(long, conflicts_with_all = ["url", "year", "month"])]
    pub file: Option<PathBuf>,

    /// Fetch from this URL instead of the configured source.
    #[arg(long)]
    pub url: Option<String>,

    /// Archive year; requires --month.
    #[arg(long, requires = "month")]
    pub year: Option<i32>,

    /// Archive month (1-12); requires --year.
    #[arg(long, requires = "year", value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: Option<u32>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pub pretty: bool,

    /// Print the extraction report to stderr.
    #[arg(long)]
    pub report: bool,
}

/// Run the `scrape` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the selector is invalid, or
/// the bulletin cannot be fetched. An unrecognizable page is not an error;
/// it prints `[]`.
pub(crate) async fn run_scrape(config: &AppConfig, args: &ScrapeArgs) -> anyhow::Result<()> {
    let options = ExtractOptions::from_config(config);

    let extraction = match &args.file {
        Some(path) => {
            let html = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            tracing::debug!(path = %path.display(), bytes = html.len(), "read saved bulletin");
            extract_earthquakes(&html, &options)
        }
        None => {
            let selector = match (args.year, args.month) {
                (Some(year), Some(month)) => Some(MonthSelector::new(year, month)?),
                _ => None,
            };
            let client = BulletinClient::new(&fetch_settings(config, args.url.as_deref()))
                .context("failed to build bulletin client")?;
            quakefeed_scraper::scrape(&client, selector, &options).await?
        }
    };

    println!("{}", render_records(&extraction, args.pretty)?);
    if args.report {
        eprintln!("{}", serde_json::to_string_pretty(&extraction.report)?);
    }
    Ok(())
}

fn fetch_settings(config: &AppConfig, url_override: Option<&str>) -> FetchSettings {
    let mut settings = FetchSettings::from_config(config);
    if let Some(url) = url_override {
        url.clone_into(&mut settings.source_url);
    }
    settings
}

fn render_records(extraction: &Extraction, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(&extraction.records)
    } else {
        serde_json::to_string(&extraction.records)
    }
}
