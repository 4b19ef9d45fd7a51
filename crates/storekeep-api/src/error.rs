use thiserror::Error;

/// Top-level error type for the `storekeep-api` crate.
///
/// Covers transport failures, malformed base URLs, non-success HTTP
/// responses, and undecodable success bodies. `storekeep-core` maps these
/// into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success status from the backend, with the extracted message.
    #[error("API error (HTTP {status}): {message}")]
    Api { message: String, status: u16 },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
