//! Response assembly.
//!
//! Turns backend output (or a failure) into an NGSI `queryContext` envelope.
//! Nothing here returns an error: every failure becomes an envelope with an
//! empty attribute list and the matching status code.

use std::error::Error as _;

use tracing::{debug, error};

use crate::error::{ProxyError, ProxyResult};
use crate::models::{
    ContextAttribute, ContextElement, ContextResponse, EntityRef, MappingSpec, NgsiResponse,
    RawAttributeValue, StatusCode,
};

/// Build the response for one request.
///
/// `values` must be positionally aligned with `specs`; a backend that breaks
/// that contract produces a 500 envelope instead of mislabelled attributes.
pub fn assemble(
    entity: &EntityRef,
    specs: &MappingSpec,
    values: ProxyResult<Vec<RawAttributeValue>>,
) -> NgsiResponse {
    let values = match values.and_then(|v| check_alignment(specs, v)) {
        Ok(values) => values,
        Err(err) => return error_response(entity, &err),
    };

    let attributes = specs
        .iter()
        .zip(values)
        .map(|(spec, raw)| ContextAttribute {
            name: spec.ngsi_name.clone(),
            attr_type: spec.shape.ngsi_type().to_string(),
            value: raw.value.into_json(),
        })
        .collect();

    envelope(ContextElement::new(entity, attributes), StatusCode::ok())
}

/// Build the error envelope for a failed request
pub fn error_response(entity: &EntityRef, err: &ProxyError) -> NgsiResponse {
    if err.is_client_error() {
        debug!(code = err.status_code(), error = %err, "queryContext rejected");
    } else {
        error!(code = err.status_code(), error = %err, cause = %cause_chain(err), "queryContext failed");
    }

    let status = StatusCode {
        code: err.status_code().to_string(),
        reason_phrase: err.reason_phrase().to_string(),
        details: Some(err.public_details()),
    };

    envelope(ContextElement::new(entity, Vec::new()), status)
}

fn envelope(context_element: ContextElement, status_code: StatusCode) -> NgsiResponse {
    NgsiResponse {
        context_responses: vec![ContextResponse {
            context_element,
            status_code,
        }],
    }
}

fn check_alignment(
    specs: &MappingSpec,
    values: Vec<RawAttributeValue>,
) -> ProxyResult<Vec<RawAttributeValue>> {
    if values.len() != specs.len() {
        return Err(ProxyError::Internal(format!(
            "backend returned {} values for {} attributes",
            values.len(),
            specs.len()
        )));
    }

    for (spec, raw) in specs.iter().zip(&values) {
        if spec.source_field != raw.source_field || spec.shape != raw.value.shape() {
            return Err(ProxyError::Internal(format!(
                "value for '{}' ({}) does not match attribute '{}' ({} {})",
                raw.source_field,
                raw.value.shape(),
                spec.ngsi_name,
                spec.shape,
                spec.source_field
            )));
        }
    }

    Ok(values)
}

fn cause_chain(err: &ProxyError) -> String {
    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    if chain.is_empty() {
        "-".to_string()
    } else {
        chain.join(": ")
    }
}
