//! Shared plumbing for backends that call a live upstream

use std::future::Future;
use std::time::Duration;

use ngsi_core::{AttributeSpec, BackendKind, FetchError, ProxyError, ProxyResult, QuerySelector, Shape};
use tracing::warn;

/// Bound on a single upstream fetch
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Await an upstream fetch, giving up after `limit`.
///
/// Expiry and fetch failures both surface as [`ProxyError::Upstream`].
/// Dropping the returned future drops the in-flight fetch.
pub(crate) async fn bounded<T, F>(kind: BackendKind, limit: Duration, fetch: F) -> ProxyResult<T>
where
    F: Future<Output = Result<T, FetchError>>,
{
    let result = match tokio::time::timeout(limit, fetch).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout),
    };

    result.map_err(|e| {
        warn!(backend = %kind, error = %e, "Upstream fetch failed");
        ProxyError::upstream(kind.as_str(), e)
    })
}

/// Reject the request before any upstream call if some spec has a shape
/// this backend cannot serve
pub(crate) fn require_shape<'a>(
    kind: BackendKind,
    specs: impl IntoIterator<Item = &'a AttributeSpec>,
    shape: Shape,
) -> ProxyResult<()> {
    match specs.into_iter().find(|s| s.shape != shape) {
        Some(spec) => Err(ProxyError::UnsupportedShape {
            backend: kind.as_str(),
            attribute: spec.ngsi_name.clone(),
            shape: spec.shape,
        }),
        None => Ok(()),
    }
}

/// Live backends need a selector to know what to ask for
pub(crate) fn require_selector(kind: BackendKind, selector: &QuerySelector) -> ProxyResult<&str> {
    selector.as_deref().ok_or_else(|| {
        ProxyError::InvalidRequest(format!("The {} backend requires a queryString", kind))
    })
}
