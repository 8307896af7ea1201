//! ngsi-core - Core traits and types for the NGSI proxy
//!
//! This crate provides the pieces every layer shares:
//! - the mapping language that turns `type`/`mapping` route parameters into
//!   an ordered [`MappingSpec`]
//! - the [`ContextBackend`] contract that every data source implements
//! - the response assembler that turns backend output into an NGSI
//!   `queryContext` envelope

pub mod assembler;
pub mod backend;
pub mod error;
pub mod fetch;
pub mod mapping;
pub mod models;

pub use assembler::{assemble, error_response};
pub use backend::{fetch_each, BackendKind, ContextBackend};
pub use error::{BoxError, FetchError, ProxyError, ProxyResult};
pub use fetch::{FieldMap, ObservationFetcher, SearchFetcher};
pub use mapping::{parse, ValueType};
pub use models::*;
