//! queryContext handlers
//!
//! Every reply is HTTP 200 with an NGSI envelope; the outcome is carried in
//! the envelope's `statusCode`.

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::routing::{post, MethodRouter};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use ngsi_core::{
    assemble, error_response, parse, BackendKind, EntityRef, NgsiResponse, ProxyError,
    ProxyResult, QueryContextRequest, QuerySelector,
};

use crate::presets::Preset;
use crate::state::AppState;

/// Path parameters of `/{backend}/{type}/{mapping}/queryContext`
#[derive(Debug, Deserialize)]
pub struct ContextPath {
    #[serde(rename = "type")]
    pub value_type: String,
    pub mapping: String,
}

/// Path parameters of `/{backend}/{type}/{mapping}/{queryString}/queryContext`
#[derive(Debug, Deserialize)]
pub struct SelectorPath {
    #[serde(rename = "type")]
    pub value_type: String,
    pub mapping: String,
    #[serde(rename = "queryString")]
    pub query_string: String,
}

/// Route taking `type` and `mapping` from the path, with no selector
pub fn query_route(kind: BackendKind) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>,
              path: Result<Path<ContextPath>, PathRejection>,
              body: Bytes| async move {
            let Path(path) = match path {
                Ok(path) => path,
                Err(rejection) => return Json(rejected_path(rejection)),
            };
            Json(
                query_context(
                    &state,
                    kind,
                    &path.value_type,
                    &path.mapping,
                    QuerySelector::none(),
                    &body,
                )
                .await,
            )
        },
    )
}

/// Route taking `type`, `mapping` and `queryString` from the path
pub fn selector_route(kind: BackendKind) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>,
              path: Result<Path<SelectorPath>, PathRejection>,
              body: Bytes| async move {
            let Path(path) = match path {
                Ok(path) => path,
                Err(rejection) => return Json(rejected_path(rejection)),
            };
            Json(
                query_context(
                    &state,
                    kind,
                    &path.value_type,
                    &path.mapping,
                    QuerySelector::new(path.query_string),
                    &body,
                )
                .await,
            )
        },
    )
}

/// Undecodable path parameters still answer with an envelope
fn rejected_path(rejection: PathRejection) -> NgsiResponse {
    debug!(error = %rejection.body_text(), "Rejected path parameters");
    error_response(
        &EntityRef::default(),
        &ProxyError::InvalidRequest(format!("invalid path parameters: {}", rejection.body_text())),
    )
}

/// Route with every parameter pinned by a preset
pub fn preset_route(preset: Preset) -> MethodRouter<AppState> {
    post(move |State(state): State<AppState>, body: Bytes| async move {
        let config = preset.config;
        let selector = QuerySelector::from(config.query_string.map(str::to_string));
        Json(
            query_context(
                &state,
                preset.backend,
                config.value_type,
                config.mapping,
                selector,
                &body,
            )
            .await,
        )
    })
}

/// Parse, fetch and assemble one `queryContext` request.
///
/// Parse failures short-circuit before the backend is called.
pub async fn query_context(
    state: &AppState,
    kind: BackendKind,
    value_type: &str,
    mapping: &str,
    selector: QuerySelector,
    body: &[u8],
) -> NgsiResponse {
    let entity = match read_entity(body) {
        Ok(entity) => entity,
        Err(e) => return error_response(&EntityRef::default(), &e),
    };

    let specs = match parse(value_type, mapping) {
        Ok(specs) => specs,
        Err(e) => return error_response(&entity, &e),
    };

    let backend = match state.get_backend(kind) {
        Ok(backend) => backend,
        Err(e) => return error_response(&entity, &e),
    };

    debug!(backend = %kind, mapping = %specs, %selector, entity = %entity.entity_type, "queryContext");
    let values = backend.fetch_attributes(&specs, &selector).await;
    assemble(&entity, &specs, values)
}

/// Entity to echo, from an optional `queryContext` body
fn read_entity(body: &[u8]) -> ProxyResult<EntityRef> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EntityRef::default());
    }

    serde_json::from_slice::<QueryContextRequest>(body)
        .map(|request| request.entity())
        .map_err(|e| ProxyError::InvalidRequest(format!("queryContext body is not valid: {}", e)))
}
