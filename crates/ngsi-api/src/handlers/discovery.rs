//! Discovery handler listing the convenience routes

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::presets::PRESETS;
use crate::state::AppState;

/// Discovery response
#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    /// Preset `queryContext` URLs served by registered backends
    pub context_urls: Vec<String>,
}

pub async fn list_context_urls(State(state): State<AppState>) -> Json<DiscoveryResponse> {
    let kinds = state.kinds();
    let context_urls = PRESETS
        .iter()
        .filter(|p| kinds.contains(&p.backend))
        .map(|p| p.url())
        .collect();

    Json(DiscoveryResponse { context_urls })
}
