//! HTTP request handlers for the proxy API
//!
//! These handlers use the ContextBackend trait and are backend-agnostic.

pub mod context;
pub mod discovery;
