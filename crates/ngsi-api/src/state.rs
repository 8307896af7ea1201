//! Application state for the NGSI proxy API

use std::collections::HashMap;
use std::sync::Arc;

use ngsi_core::{BackendKind, ContextBackend, ProxyError, ProxyResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Backend implementation per route family
    backends: Arc<HashMap<BackendKind, Arc<dyn ContextBackend>>>,
}

impl AppState {
    /// Create a new AppState with the given backends
    pub fn new(backends: HashMap<BackendKind, Arc<dyn ContextBackend>>) -> Self {
        Self {
            backends: Arc::new(backends),
        }
    }

    /// Create AppState from a list of backends, keyed by their own kind
    pub fn from_backends(backends: impl IntoIterator<Item = Arc<dyn ContextBackend>>) -> Self {
        Self::new(backends.into_iter().map(|b| (b.kind(), b)).collect())
    }

    /// Get the backend serving a route family
    pub fn get_backend(&self, kind: BackendKind) -> ProxyResult<&Arc<dyn ContextBackend>> {
        self.backends
            .get(&kind)
            .ok_or_else(|| ProxyError::Internal(format!("No backend registered for '{}'", kind)))
    }

    /// Registered backend kinds, in route order
    pub fn kinds(&self) -> Vec<BackendKind> {
        BackendKind::ALL
            .into_iter()
            .filter(|k| self.backends.contains_key(k))
            .collect()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backends", &self.kinds())
            .finish()
    }
}
