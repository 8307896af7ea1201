//! ContextBackend trait - the uniform contract every data source implements

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::{ProxyError, ProxyResult};
use crate::models::{AttributeSpec, MappingSpec, QuerySelector, RawAttributeValue};

/// The backend variants a route can resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    Random,
    Static,
    Twitter,
    Weather,
}

impl BackendKind {
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Random,
        BackendKind::Static,
        BackendKind::Twitter,
        BackendKind::Weather,
    ];

    /// Route segment and log name of this backend
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Random => "random",
            BackendKind::Static => "static",
            BackendKind::Twitter => "twitter",
            BackendKind::Weather => "weather",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown backend: '{}'", s))
    }
}

/// The core trait that all attribute sources implement.
///
/// `fetch_attributes` returns exactly one value per spec, in spec order. A
/// backend may fetch attributes concurrently but must join them before
/// returning. The first failure fails the whole call; there are no partial
/// results and no retries.
#[async_trait]
pub trait ContextBackend: Send + Sync {
    /// Which variant this backend is
    fn kind(&self) -> BackendKind;

    /// Fetch one raw value per attribute spec
    async fn fetch_attributes(
        &self,
        specs: &MappingSpec,
        selector: &QuerySelector,
    ) -> ProxyResult<Vec<RawAttributeValue>>;
}

/// Run one sub-fetch per spec concurrently and join them in spec order.
///
/// Completion order does not matter: the output is positionally aligned with
/// `specs`. The first error wins and the remaining sub-fetches are dropped.
pub async fn fetch_each<'a, F, Fut>(
    specs: &'a MappingSpec,
    fetch: F,
) -> ProxyResult<Vec<RawAttributeValue>>
where
    F: FnMut(&'a AttributeSpec) -> Fut,
    Fut: Future<Output = ProxyResult<RawAttributeValue>>,
{
    if specs.is_empty() {
        return Err(ProxyError::InvalidMapping(
            "mapping contains no attributes".to_string(),
        ));
    }
    try_join_all(specs.iter().map(fetch)).await
}
