//! ngsi-api - NGSI queryContext REST layer
//!
//! This crate provides the HTTP dispatcher that binds `queryContext` routes to
//! [`ngsi_core::ContextBackend`] implementations. It is backend-agnostic.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use ngsi_api::{create_router, AppState};
//! use ngsi_backends::RandomBackend;
//!
//! let state = AppState::from_backends([Arc::new(RandomBackend::new()) as _]);
//! let router = create_router(state);
//! ```

pub mod handlers;
pub mod presets;
pub mod state;

pub use presets::{Preset, RouteConfig, API_PREFIX, PRESETS};
pub use state::AppState;

use axum::routing::get;
use axum::Router;
use ngsi_core::BackendKind;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::context::{preset_route, query_route, selector_route};

fn api(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

/// Create the proxy router with the given application state
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Discovery
        .route(API_PREFIX, get(handlers::discovery::list_context_urls))
        .route(&api("/"), get(handlers::discovery::list_context_urls))
        // Parameterised routes
        .route(
            &api("/random/{type}/{mapping}/queryContext"),
            query_route(BackendKind::Random),
        )
        .route(
            &api("/static/{type}/{mapping}/queryContext"),
            query_route(BackendKind::Static),
        )
        .route(
            &api("/static/{type}/{mapping}/{queryString}/queryContext"),
            selector_route(BackendKind::Static),
        )
        .route(
            &api("/twitter/{type}/{mapping}/{queryString}/queryContext"),
            selector_route(BackendKind::Twitter),
        )
        .route(
            &api("/weather/{type}/{mapping}/{queryString}/queryContext"),
            selector_route(BackendKind::Weather),
        );

    // Convenience routes with pinned parameters
    for preset in PRESETS {
        router = router.route(&preset.url(), preset_route(*preset));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
