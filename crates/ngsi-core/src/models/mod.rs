//! Shared data models for the proxy

mod attribute;
mod ngsi;

pub use attribute::*;
pub use ngsi::*;
