//! ngsi-backends - The data sources behind the NGSI proxy
//!
//! Each backend implements [`ngsi_core::ContextBackend`]:
//!
//! - [`RandomBackend`] - synthetic values, selector ignored
//! - [`StaticBackend`] - fixtures keyed by field and selector
//! - [`TwitterBackend`] - list attributes from one search per request
//! - [`WeatherBackend`] - scalar readings from one observation per request
//!
//! The live backends take their upstream as a fetcher trait object, so the
//! HTTP clients can be swapped for mocks in tests.

mod fixtures;
mod live;
mod random;
mod twitter;
mod weather;

pub use fixtures::{FixtureDef, FixtureError, FixtureTable, StaticBackend};
pub use live::DEFAULT_UPSTREAM_TIMEOUT;
pub use random::{range_for, RandomBackend, GENERIC_RANGE, RANDOM_LIST_LEN};
pub use twitter::{TwitterBackend, TEXT_FIELD};
pub use weather::{coerce_number, WeatherBackend};
