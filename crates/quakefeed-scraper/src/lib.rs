//! Earthquake bulletin scraper.
//!
//! [`BulletinClient`] fetches the bulletin markup; [`extract_earthquakes`]
//! turns markup into validated, deduplicated [`EarthquakeRecord`]s. The two
//! halves fail differently: fetching returns a typed [`FetchError`], while
//! extraction never fails and reports degradation through
//! [`ExtractionReport`] and `tracing` events.

pub mod client;
pub mod error;
pub mod extract;
mod rate_limit;

pub use client::{BulletinClient, FetchSettings, MonthSelector};
pub use error::FetchError;
pub use extract::{
    extract_at, extract_earthquakes, ExtractOptions, Extraction, ExtractionReport, SkipReason,
    Strategy, StrategyAttempt,
};
pub use quakefeed_core::EarthquakeRecord;

/// Fetch the bulletin for `selector` (or the latest page) and extract records.
///
/// # Errors
///
/// Returns [`FetchError`] when no document could be retrieved. A reachable
/// page with no recognizable events yields `Ok` with an empty record list.
pub async fn scrape(
    client: &BulletinClient,
    selector: Option<MonthSelector>,
    options: &ExtractOptions,
) -> Result<Extraction, FetchError> {
    let html = client.fetch_bulletin(selector).await?;
    Ok(extract_earthquakes(&html, options))
}
