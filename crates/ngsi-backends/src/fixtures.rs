//! StaticBackend - fixed fixture values
//!
//! Fixtures are keyed by `(source field, selector)` and loaded once at
//! startup. The table is read-only afterwards, so identical keys always
//! yield identical values.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ngsi_core::{
    fetch_each, AttributeSpec, AttributeValue, BackendKind, ContextBackend, MappingSpec,
    ProxyError, ProxyResult, QuerySelector, RawAttributeValue,
};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Errors in fixture definitions
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Value is neither a number nor a list of scalars
    #[error("Fixture '{field}' has an unsupported value: {value}")]
    InvalidValue { field: String, value: Value },

    /// Same field/selector pair defined twice
    #[error("Fixture '{field}' (selector: {selector:?}) is defined twice")]
    Duplicate {
        field: String,
        selector: Option<String>,
    },

    #[error("Fixture with an empty field name")]
    EmptyField,
}

/// One fixture as written in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureDef {
    pub field: String,
    /// Selector this value answers; `None` matches selector-less requests
    #[serde(default)]
    pub selector: Option<String>,
    pub value: Value,
}

impl FixtureDef {
    pub fn new(field: impl Into<String>, selector: Option<&str>, value: Value) -> Self {
        Self {
            field: field.into(),
            selector: selector.map(str::to_string),
            value,
        }
    }
}

/// Read-only fixture lookup table
#[derive(Debug, Clone, Default)]
pub struct FixtureTable {
    entries: HashMap<(String, Option<String>), AttributeValue>,
}

impl FixtureTable {
    /// Build a table, validating every value
    pub fn from_defs(defs: impl IntoIterator<Item = FixtureDef>) -> Result<Self, FixtureError> {
        let mut entries = HashMap::new();

        for def in defs {
            if def.field.trim().is_empty() {
                return Err(FixtureError::EmptyField);
            }
            let value = fixture_value(&def.field, def.value)?;
            let selector = QuerySelector::from(def.selector).as_deref().map(str::to_string);
            let key = (def.field, selector);
            if entries.contains_key(&key) {
                return Err(FixtureError::Duplicate {
                    field: key.0,
                    selector: key.1,
                });
            }
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }

    /// Fixtures covering every convenience route, plus a couple of
    /// selector-keyed entries for `Country/City` lookups
    pub fn builtin() -> Self {
        let defs = vec![
            FixtureDef::new("temperature", None, json!(21.5)),
            FixtureDef::new("relativeHumidity", None, json!(45)),
            FixtureDef::new(
                "tweets",
                None,
                json!([
                    "FIWARE context broker is up and running",
                    "Smart city pilot publishes new open data sets",
                    "Reading room sensors through an NGSI proxy"
                ]),
            ),
            FixtureDef::new("temperature", Some("Germany/Berlin"), json!(18.2)),
            FixtureDef::new("relativeHumidity", Some("Germany/Berlin"), json!(71)),
            FixtureDef::new("temperature", Some("Spain/Madrid"), json!(27.9)),
            FixtureDef::new("relativeHumidity", Some("Spain/Madrid"), json!(33)),
        ];
        // Built-in values are known to be valid
        Self::from_defs(defs).unwrap_or_default()
    }

    pub fn get(&self, field: &str, selector: &QuerySelector) -> Option<&AttributeValue> {
        self.entries
            .get(&(field.to_string(), selector.as_deref().map(str::to_string)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fixture_value(field: &str, value: Value) -> Result<AttributeValue, FixtureError> {
    let invalid = |value: Value| FixtureError::InvalidValue {
        field: field.to_string(),
        value,
    };

    match value {
        Value::Number(_) => Ok(AttributeValue::Scalar(value)),
        Value::Array(items) if items.iter().all(|i| i.is_number() || i.is_string()) => {
            Ok(AttributeValue::List(items))
        }
        other => Err(invalid(other)),
    }
}

/// Backend serving values from a [`FixtureTable`]
#[derive(Debug, Clone)]
pub struct StaticBackend {
    fixtures: Arc<FixtureTable>,
}

impl StaticBackend {
    pub fn new(fixtures: Arc<FixtureTable>) -> Self {
        Self { fixtures }
    }

    fn lookup(&self, spec: &AttributeSpec, selector: &QuerySelector) -> ProxyResult<AttributeValue> {
        let value = self
            .fixtures
            .get(&spec.source_field, selector)
            .ok_or_else(|| ProxyError::FixtureNotFound {
                field: spec.source_field.clone(),
                selector: selector.as_deref().map(str::to_string),
            })?;

        if value.shape() != spec.shape {
            return Err(ProxyError::UnsupportedShape {
                backend: BackendKind::Static.as_str(),
                attribute: spec.ngsi_name.clone(),
                shape: spec.shape,
            });
        }

        Ok(value.clone())
    }
}

#[async_trait]
impl ContextBackend for StaticBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Static
    }

    async fn fetch_attributes(
        &self,
        specs: &MappingSpec,
        selector: &QuerySelector,
    ) -> ProxyResult<Vec<RawAttributeValue>> {
        debug!(attributes = specs.len(), %selector, "Looking up fixtures");
        fetch_each(specs, |spec| async move {
            let value = self.lookup(spec, selector)?;
            Ok(RawAttributeValue::new(spec.source_field.clone(), value))
        })
        .await
    }
}
