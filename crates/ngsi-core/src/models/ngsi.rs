//! NGSI v1 `queryContext` wire models

use serde::{Deserialize, Serialize};

/// Entity type used when the request does not name one
pub const DEFAULT_ENTITY_TYPE: &str = "Thing";

fn default_entity_type() -> String {
    DEFAULT_ENTITY_TYPE.to_string()
}

fn default_is_pattern() -> String {
    "false".to_string()
}

/// Entity named by a `queryContext` request and echoed in the response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    #[serde(rename = "type", default = "default_entity_type")]
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
}

impl EntityRef {
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl Default for EntityRef {
    fn default() -> Self {
        Self::new(DEFAULT_ENTITY_TYPE)
    }
}

/// Inbound `queryContext` body. Only the entity list is used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryContextRequest {
    #[serde(default)]
    pub entities: Vec<EntityRef>,
}

impl QueryContextRequest {
    /// Entity to echo: the first one requested, or the default
    pub fn entity(&self) -> EntityRef {
        self.entities.first().cloned().unwrap_or_default()
    }
}

/// Outbound `queryContext` response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NgsiResponse {
    pub context_responses: Vec<ContextResponse>,
}

impl NgsiResponse {
    /// The single context response this proxy emits
    pub fn first(&self) -> Option<&ContextResponse> {
        self.context_responses.first()
    }

    /// Numeric status of the first context response (0 if absent)
    pub fn status_code(&self) -> u16 {
        self.first()
            .and_then(|r| r.status_code.code.parse().ok())
            .unwrap_or(0)
    }

    /// Attributes of the first context element
    pub fn attributes(&self) -> &[ContextAttribute] {
        self.first()
            .map(|r| r.context_element.attributes.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextResponse {
    pub context_element: ContextElement,
    pub status_code: StatusCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextElement {
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default = "default_is_pattern")]
    pub is_pattern: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    pub attributes: Vec<ContextAttribute>,
}

impl ContextElement {
    pub fn new(entity: &EntityRef, attributes: Vec<ContextAttribute>) -> Self {
        Self {
            entity_type: entity.entity_type.clone(),
            is_pattern: default_is_pattern(),
            id: entity.id.clone(),
            attributes,
        }
    }
}

/// One NGSI attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: String,
    pub value: serde_json::Value,
}

/// NGSI status pair; `code` is a string on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCode {
    pub code: String,
    pub reason_phrase: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<String>,
}

impl StatusCode {
    pub fn ok() -> Self {
        Self {
            code: "200".to_string(),
            reason_phrase: "OK".to_string(),
            details: None,
        }
    }
}
