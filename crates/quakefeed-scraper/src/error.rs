use thiserror::Error;

/// Failure to obtain a bulletin document.
///
/// Extraction problems are never represented here; see
/// [`crate::ExtractionReport`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url}")]
    RateLimited { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("empty document returned by {url}")]
    EmptyDocument { url: String },

    #[error("invalid bulletin selector: {0}")]
    InvalidSelector(String),

    #[error("all {attempts} fetch strategies failed for {url}: {last}")]
    AllAttemptsFailed {
        url: String,
        attempts: usize,
        #[source]
        last: Box<FetchError>,
    },
}
