//! Shared HTTP plumbing for the upstream clients

use std::time::Duration;

use ngsi_core::FetchError;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{ClientError, Result};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default connection timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest upstream error message kept in a [`FetchError::Status`]
const MAX_ERROR_MESSAGE: usize = 200;

/// Timeouts applied to every upstream request
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl HttpSettings {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: timeout.min(DEFAULT_CONNECT_TIMEOUT),
        }
    }

    /// Build a client with these timeouts; clients are cheap to clone and
    /// share one connection pool.
    pub fn build_client(&self) -> Result<Client> {
        Ok(Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()?)
    }
}

/// Parse a base URL, making sure path segments can be appended to it
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)?;
    if url.cannot_be_a_base() {
        return Err(ClientError::NotABase(base_url.to_string()));
    }
    Ok(url)
}

/// Append path segments to a base URL, percent-encoding each one
pub(crate) fn join_segments<'a>(
    base: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> std::result::Result<Url, FetchError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| FetchError::NotConfigured(format!("invalid base URL {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Classify a transport-level failure
pub(crate) fn transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Http(Box::new(err))
    }
}

#[derive(Deserialize)]
struct TwitterStyleErrors {
    errors: Vec<ErrorEntry>,
}

#[derive(Deserialize)]
struct ErrorEntry {
    message: String,
}

/// Read a JSON body, turning non-success statuses into fetch errors
pub(crate) async fn read_json(response: Response) -> std::result::Result<Value, FetchError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            message: error_message(&body, status),
        });
    }

    response.json::<Value>().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Malformed(e.to_string())
        }
    })
}

fn error_message(body: &str, status: StatusCode) -> String {
    let message = match serde_json::from_str::<TwitterStyleErrors>(body) {
        Ok(parsed) if !parsed.errors.is_empty() => parsed
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; "),
        _ if body.trim().is_empty() => format!("HTTP {}", status),
        _ => body.trim().to_string(),
    };
    message.chars().take(MAX_ERROR_MESSAGE).collect()
}
