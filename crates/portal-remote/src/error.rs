//! Remote endpoint error types.

use thiserror::Error;

/// Errors that can occur when talking to a remote action endpoint.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No reply within the configured timeout.
    #[error("no reply within {secs}s")]
    Timeout { secs: u64 },

    /// The endpoint answered with a non-success status or an `{error}` body.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The reply was not the JSON shape the action promises.
    #[error("parse error: {0}")]
    Parse(String),

    /// The configured endpoint URL is unusable.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),
}
