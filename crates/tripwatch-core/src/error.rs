//! # Error Types
//!
//! Errors raised while constructing core values. Lifecycle, transport and
//! monitoring errors live in their own crates and never wrap each other
//! silently.

use thiserror::Error;

/// Error constructing a core value from external input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Timestamp input could not be parsed or is out of range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Identifier input was empty or otherwise unusable.
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier {
        /// Identifier namespace (e.g. "trip", "stop").
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// Monetary amount could not be represented.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
