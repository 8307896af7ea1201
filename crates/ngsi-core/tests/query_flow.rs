//! Parse, fetch and assemble with a mock backend
//!
//! Exercises the three core stages together the way the API layer drives
//! them, without any HTTP.

use std::time::Duration;

use async_trait::async_trait;
use ngsi_core::{
    assemble, error_response, fetch_each, parse, AttributeValue, BackendKind, ContextBackend,
    EntityRef, FetchError, MappingSpec, ProxyError, ProxyResult, QuerySelector, RawAttributeValue,
};
use pretty_assertions::assert_eq;
use serde_json::json;

// =============================================================================
// Mock Backend
// =============================================================================

/// Answers each attribute after a delay that shrinks along the mapping, so
/// later attributes finish first
struct ReversingBackend;

#[async_trait]
impl ContextBackend for ReversingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Random
    }

    async fn fetch_attributes(
        &self,
        specs: &MappingSpec,
        _selector: &QuerySelector,
    ) -> ProxyResult<Vec<RawAttributeValue>> {
        let total = specs.len() as u64;
        fetch_each(specs, |spec| {
            let n = specs.iter().position(|s| s == spec).unwrap_or_default() as u64;
            async move {
                tokio::time::sleep(Duration::from_millis((total - n) * 15)).await;
                Ok(RawAttributeValue::new(
                    spec.source_field.clone(),
                    AttributeValue::number((n + 1) as f64),
                ))
            }
        })
        .await
    }
}

/// Always fails, as a live backend would on a dead upstream
struct FailingBackend;

#[async_trait]
impl ContextBackend for FailingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Weather
    }

    async fn fetch_attributes(
        &self,
        _specs: &MappingSpec,
        _selector: &QuerySelector,
    ) -> ProxyResult<Vec<RawAttributeValue>> {
        Err(ProxyError::upstream("weather", FetchError::Timeout))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_order_follows_mapping() {
    let specs = parse("number", "a:x,b:y,c:z,d:w").unwrap();
    let values = ReversingBackend
        .fetch_attributes(&specs, &QuerySelector::none())
        .await;

    let response = assemble(&EntityRef::default(), &specs, values);

    assert_eq!(response.status_code(), 200);
    let got: Vec<_> = response
        .attributes()
        .iter()
        .map(|a| (a.name.as_str(), a.value.clone()))
        .collect();
    assert_eq!(
        got,
        [
            ("a", json!(1.0)),
            ("b", json!(2.0)),
            ("c", json!(3.0)),
            ("d", json!(4.0))
        ]
    );
}

#[tokio::test]
async fn test_failure_yields_empty_500() {
    let specs = parse("number", "temperature:temp_c").unwrap();
    let values = FailingBackend
        .fetch_attributes(&specs, &QuerySelector::new("Germany/Berlin"))
        .await;

    let entity = EntityRef::new("Room").with_id("Room1");
    let response = assemble(&entity, &specs, values);

    assert_eq!(response.status_code(), 500);
    assert!(response.attributes().is_empty());
    let element = &response.first().unwrap().context_element;
    assert_eq!(element.entity_type, "Room");
    assert_eq!(element.id.as_deref(), Some("Room1"));
}

#[test]
fn test_parse_failure_envelope() {
    let err = parse("number", "temperature,temperature").unwrap_err();
    let response = error_response(&EntityRef::default(), &err);

    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["contextResponses"][0]["statusCode"]["code"], "400");
    assert_eq!(body["contextResponses"][0]["contextElement"]["attributes"], json!([]));
    assert_eq!(body["contextResponses"][0]["contextElement"]["isPattern"], "false");
}
