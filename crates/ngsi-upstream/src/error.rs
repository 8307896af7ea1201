//! Error types for building upstream clients

use thiserror::Error;

/// Result type alias for client construction
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while setting up an upstream client.
///
/// Failures of individual requests are reported as
/// [`ngsi_core::FetchError`] instead, since they cross into the backends.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP client could not be built
    #[error("HTTP client setup failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid base URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Base URL cannot carry path segments (e.g. `data:` URLs)
    #[error("URL cannot be a base: {0}")]
    NotABase(String),
}
