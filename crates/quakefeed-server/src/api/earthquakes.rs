use axum::{
    extract::{Query, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    Extension, Json,
};
use quakefeed_scraper::{FetchError, MonthSelector};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState, EXTRACTION_SKIPPED_HEADER, EXTRACTION_STRATEGY_HEADER};

/// `year`/`month` arrive as raw strings so malformed values surface as our
/// own `bad_request` body instead of the framework's plain-text rejection.
#[derive(Debug, Deserialize)]
pub(super) struct EarthquakeQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

pub(super) fn parse_selector(query: &EarthquakeQuery) -> Result<Option<MonthSelector>, ApiError> {
    let (year, month) = match (query.year.as_deref(), query.month.as_deref()) {
        (None, None) => return Ok(None),
        (Some(year), Some(month)) => (year.trim(), month.trim()),
        _ => {
            return Err(ApiError::new(
                "bad_request",
                "year and month must be supplied together",
            ))
        }
    };

    let year: i32 = year
        .parse()
        .map_err(|_| ApiError::new("bad_request", format!("year '{year}' is not a number")))?;
    let month: u32 = month
        .parse()
        .map_err(|_| ApiError::new("bad_request", format!("month '{month}' is not a number")))?;

    MonthSelector::new(year, month)
        .map(Some)
        .map_err(|e| ApiError::new("bad_request", e.to_string()))
}

fn map_fetch_error(request_id: &str, error: &FetchError) -> ApiError {
    tracing::error!(request_id, error = %error, "bulletin fetch failed");
    ApiError::new("fetch_failed", "could not retrieve the earthquake bulletin")
        .with_details(error.to_string())
}

pub(super) async fn list_earthquakes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<EarthquakeQuery>,
) -> Result<Response, ApiError> {
    let selector = parse_selector(&query)?;

    let extraction = quakefeed_scraper::scrape(&state.client, selector, &state.options)
        .await
        .map_err(|e| map_fetch_error(&req_id.0, &e))?;

    let report = &extraction.report;
    let strategy = report.strategy.map_or("none", |s| s.tag());
    let skipped = report.total_skipped();
    tracing::info!(
        request_id = %req_id.0,
        strategy,
        returned = report.returned,
        skipped,
        duplicates = report.duplicates_removed,
        degraded = report.degraded_timestamps,
        "served earthquake records"
    );

    let mut response = Json(extraction.records).into_response();
    let headers = response.headers_mut();
    headers.insert(EXTRACTION_STRATEGY_HEADER, HeaderValue::from_static(strategy));
    headers.insert(EXTRACTION_SKIPPED_HEADER, HeaderValue::from(skipped));
    Ok(response)
}
