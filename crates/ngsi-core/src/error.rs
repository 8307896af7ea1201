//! Common error types for the proxy core and its backends

use thiserror::Error;

use crate::models::Shape;

/// Result type for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Boxed cause carried by transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while answering a `queryContext` request
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Malformed mapping string or unknown `type`
    #[error("Invalid mapping: {0}")]
    InvalidMapping(String),

    /// The same NGSI attribute name appears twice in one mapping
    #[error("Duplicate attribute: {0}")]
    DuplicateAttribute(String),

    /// The chosen backend cannot serve this attribute shape
    #[error("Backend '{backend}' cannot serve {shape} attribute '{attribute}'")]
    UnsupportedShape {
        backend: &'static str,
        attribute: String,
        shape: Shape,
    },

    /// No fixture registered for the field/selector pair
    #[error("No fixture for field '{field}' (selector: {selector:?})")]
    FixtureNotFound {
        field: String,
        selector: Option<String>,
    },

    /// A live backend failed to produce values
    #[error("Upstream error from {backend}: {source}")]
    Upstream {
        backend: &'static str,
        #[source]
        source: FetchError,
    },

    /// The inbound `queryContext` body could not be read
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A backend broke the adapter contract
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    /// Wrap a fetch failure from a live backend
    pub fn upstream(backend: &'static str, source: FetchError) -> Self {
        ProxyError::Upstream { backend, source }
    }

    /// NGSI status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::InvalidMapping(_) => 400,
            ProxyError::DuplicateAttribute(_) => 400,
            ProxyError::UnsupportedShape { .. } => 400,
            ProxyError::InvalidRequest(_) => 400,
            ProxyError::FixtureNotFound { .. } => 404,
            ProxyError::Upstream { .. } => 500,
            ProxyError::Internal(_) => 500,
        }
    }

    /// NGSI reason phrase matching [`status_code`](Self::status_code)
    pub fn reason_phrase(&self) -> &'static str {
        match self.status_code() {
            400 => "Bad Request",
            404 => "No context element found",
            _ => "Internal Server Error",
        }
    }

    /// Message that may be shown to the consumer.
    ///
    /// Client errors echo their own message. Server errors only name the
    /// backend; the transport cause stays in the logs.
    pub fn public_details(&self) -> String {
        match self {
            ProxyError::Upstream { backend, .. } => {
                format!("Backend '{}' is unavailable", backend)
            }
            ProxyError::Internal(_) => "Backend returned an inconsistent result".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this error is the client's fault
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// Failures reported by an upstream fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection or protocol failure
    #[error("HTTP request failed: {0}")]
    Http(#[source] BoxError),

    /// No response within the configured bound
    #[error("Request timed out")]
    Timeout,

    /// Upstream refused because of its rate limit
    #[error("Rate limited by upstream")]
    RateLimited,

    /// Upstream answered with a non-success status
    #[error("Upstream returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Upstream answered with an error document instead of data
    #[error("Upstream rejected the request: {0}")]
    Rejected(String),

    /// Upstream answered but the payload is unusable
    #[error("Malformed upstream payload: {0}")]
    Malformed(String),

    /// The fetcher is not configured (missing credentials)
    #[error("Upstream not configured: {0}")]
    NotConfigured(String),
}
