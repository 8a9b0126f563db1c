//! Error types for scorecard.

use thiserror::Error;

/// Main error type for scorecard operations.
#[derive(Error, Debug)]
pub enum ScorecardError {
    /// Descriptor rejected before any network call (bad URL, filter, paging, credential)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Server answered with anything other than 200. Never retried here.
    #[error("HTTP {status} from {url}: {hint}")]
    HttpStatus {
        status: u16,
        /// Request URL with the api key redacted
        url: String,
        hint: &'static str,
    },

    /// Payload lacks `results`, or a record lacks a usable `id`
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Local per-credential ledger is full for the current window
    #[error("Rate quota of {limit} requests per window reached; not sending")]
    QuotaExhausted { limit: u32 },

    /// Connection, TLS or timeout failure. The URL is stripped (it carries the key).
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Body was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Imported file or statistics input is unusable
    #[error("Invalid table: {0}")]
    InvalidTable(String),
}

impl ScorecardError {
    /// Whether a caller could reasonably try again later (429 and 5xx).
    /// Advisory only; nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            ScorecardError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            ScorecardError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// HTTP status code, if this is a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ScorecardError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ScorecardError {
    fn from(e: reqwest::Error) -> Self {
        ScorecardError::Transport(e.without_url())
    }
}

/// Result type alias using ScorecardError.
pub type Result<T> = std::result::Result<T, ScorecardError>;
