//! HTTP fetcher for the seismological bulletin pages.

use std::time::Duration;

use chrono::Month;
use quakefeed_core::AppConfig;
use reqwest::Client;

use crate::error::FetchError;
use crate::rate_limit::retry_with_backoff;

const BROWSER_FALLBACK_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Year/month pair selecting a monthly archive page instead of the latest
/// bulletin. Extraction itself never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthSelector {
    year: i32,
    month: Month,
}

impl MonthSelector {
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidSelector`] when `month` is outside 1–12 or
    /// `year` is outside 1900–9999.
    pub fn new(year: i32, month: u32) -> Result<Self, FetchError> {
        if !(1900..=9999).contains(&year) {
            return Err(FetchError::InvalidSelector(format!(
                "year {year} is out of range"
            )));
        }
        let month = u8::try_from(month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .ok_or_else(|| FetchError::InvalidSelector(format!("month {month} is not 1-12")))?;
        Ok(Self { year, month })
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.month.number_from_month()
    }
}

/// Connection and retry settings for [`BulletinClient`].
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub source_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub accept_invalid_certs: bool,
}

impl FetchSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            source_url: config.source_url.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base_ms: config.retry_backoff_base_ms,
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }
}

/// Fetches bulletin markup.
///
/// Each fetch walks a list of user agents (configured first, then a
/// browser-like fallback); each agent gets `max_retries` backoff retries on
/// transient errors. When every agent is exhausted the last error is wrapped
/// in [`FetchError::AllAttemptsFailed`].
pub struct BulletinClient {
    client: Client,
    source_url: String,
    user_agent: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl BulletinClient {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;
        Ok(Self {
            client,
            source_url: settings.source_url.clone(),
            user_agent: settings.user_agent.clone(),
            max_retries: settings.max_retries,
            backoff_base_ms: settings.backoff_base_ms,
        })
    }

    /// Resolve the page URL for `selector`.
    ///
    /// `None` is the latest-bulletin page itself. A selector maps to the
    /// monthly archive, e.g. `EQLatest-Monthly/2025/2025_November.html`.
    #[must_use]
    pub fn bulletin_url(&self, selector: Option<MonthSelector>) -> String {
        match selector {
            None => self.source_url.clone(),
            Some(sel) => format!(
                "{}/EQLatest-Monthly/{}/{}_{}.html",
                self.source_url.trim_end_matches('/'),
                sel.year,
                sel.year,
                sel.month.name()
            ),
        }
    }

    /// Fetch the rendered bulletin markup.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::AllAttemptsFailed`] once every user agent has
    /// exhausted its retries.
    pub async fn fetch_bulletin(
        &self,
        selector: Option<MonthSelector>,
    ) -> Result<String, FetchError> {
        let url = self.bulletin_url(selector);

        let mut user_agents = vec![self.user_agent.as_str()];
        if self.user_agent != BROWSER_FALLBACK_UA {
            user_agents.push(BROWSER_FALLBACK_UA);
        }
        let attempts = user_agents.len();

        let mut last_error = None;
        for user_agent in user_agents {
            let result = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                let url = url.clone();
                async move { self.fetch_once(&url, user_agent).await }
            })
            .await;

            match result {
                Ok(body) => {
                    tracing::debug!(url, user_agent, bytes = body.len(), "fetched bulletin");
                    return Ok(body);
                }
                Err(err) => {
                    tracing::warn!(url, user_agent, error = %err, "bulletin fetch strategy failed");
                    last_error = Some(err);
                }
            }
        }

        let last = last_error.unwrap_or(FetchError::EmptyDocument { url: url.clone() });
        Err(FetchError::AllAttemptsFailed {
            url,
            attempts,
            last: Box::new(last),
        })
    }

    async fn fetch_once(&self, url: &str, user_agent: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(FetchError::RateLimited {
                url: url.to_owned(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyDocument {
                url: url.to_owned(),
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(source_url: &str) -> FetchSettings {
        FetchSettings {
            source_url: source_url.to_owned(),
            timeout_secs: 5,
            user_agent: "quakefeed-test/0.1".to_owned(),
            max_retries: 0,
            backoff_base_ms: 0,
            accept_invalid_certs: false,
        }
    }

    #[test]
    fn month_selector_rejects_month_thirteen() {
        assert!(matches!(
            MonthSelector::new(2025, 13),
            Err(FetchError::InvalidSelector(_))
        ));
        assert!(matches!(
            MonthSelector::new(2025, 0),
            Err(FetchError::InvalidSelector(_))
        ));
    }

    #[test]
    fn month_selector_rejects_implausible_year() {
        assert!(MonthSelector::new(1850, 1).is_err());
    }

    #[test]
    fn month_selector_round_trips_numbers() {
        let sel = MonthSelector::new(2024, 2).unwrap();
        assert_eq!(sel.year(), 2024);
        assert_eq!(sel.month(), 2);
    }

    #[test]
    fn bulletin_url_defaults_to_source_page() {
        let client = BulletinClient::new(&settings("https://bulletin.test/")).unwrap();
        assert_eq!(client.bulletin_url(None), "https://bulletin.test/");
    }

    #[test]
    fn bulletin_url_resolves_monthly_archive() {
        let client = BulletinClient::new(&settings("https://bulletin.test/")).unwrap();
        let sel = MonthSelector::new(2025, 11).unwrap();
        assert_eq!(
            client.bulletin_url(Some(sel)),
            "https://bulletin.test/EQLatest-Monthly/2025/2025_November.html"
        );
    }
}
