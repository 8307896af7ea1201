//! Upstream fetcher traits.
//!
//! Live backends do not talk HTTP themselves. They are handed a fetcher that
//! returns raw field maps, which keeps the adapters testable without a
//! network and lets the HTTP clients live in their own crate.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::FetchError;

/// Raw upstream record: field name to JSON value
pub type FieldMap = Map<String, Value>;

/// A social-search API returning one record per matching post
#[async_trait]
pub trait SearchFetcher: Send + Sync {
    /// Run one search and return the result items in upstream order
    async fn search(&self, term: &str) -> Result<Vec<FieldMap>, FetchError>;
}

/// A weather API returning one observation per location
#[async_trait]
pub trait ObservationFetcher: Send + Sync {
    /// Fetch the current observation for a `Country/City` path
    async fn observe(&self, location: &str) -> Result<FieldMap, FetchError>;
}
