//! Trip source error types.

use crate::config::ConfigError;

/// Errors from fetching trip data. All of them are recoverable: a caller
/// keeps whatever it fetched last and tries again later.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport failure after retries.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The API answered with a non-2xx status.
    #[error("trips API {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The response body did not match the expected shape.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The source is not reachable for a reason other than transport.
    #[error("{source_name} unavailable: {reason}")]
    Unavailable { source_name: String, reason: String },
    /// Client configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl SourceError {
    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
