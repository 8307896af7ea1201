//! Attribute mapping models

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProxyError, ProxyResult};

/// Mapping alias that forces a list-shaped attribute
pub const ARRAY_ALIAS: &str = "array";

/// Shape of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A single number or string
    Scalar,
    /// An ordered sequence of scalars
    List,
}

impl Shape {
    /// NGSI attribute type reported for this shape
    pub fn ngsi_type(&self) -> &'static str {
        match self {
            Shape::Scalar => "number",
            Shape::List => "array",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => f.write_str("scalar"),
            Shape::List => f.write_str("list"),
        }
    }
}

/// One parsed mapping unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    /// Attribute name exposed to the consumer
    pub ngsi_name: String,
    /// Backend-native field to read
    pub source_field: String,
    pub shape: Shape,
}

impl AttributeSpec {
    pub fn new(
        ngsi_name: impl Into<String>,
        source_field: impl Into<String>,
        shape: Shape,
    ) -> Self {
        Self {
            ngsi_name: ngsi_name.into(),
            source_field: source_field.into(),
            shape,
        }
    }

    /// Scalar spec reading a field of the same name
    pub fn scalar(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, Shape::Scalar)
    }

    /// List spec reading a field of the same name
    pub fn list(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, Shape::List)
    }

    /// Whether the mapping named a source field different from the NGSI name
    pub fn is_aliased(&self) -> bool {
        self.source_field != self.ngsi_name
    }
}

impl fmt::Display for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_aliased() {
            write!(f, "{}:{}", self.ngsi_name, self.source_field)
        } else if self.shape == Shape::List {
            write!(f, "{}:{}", self.ngsi_name, ARRAY_ALIAS)
        } else {
            f.write_str(&self.ngsi_name)
        }
    }
}

/// Ordered, validated list of attribute specs for one request.
///
/// Order is significant: it is the order of attributes in the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSpec {
    attributes: Vec<AttributeSpec>,
}

impl MappingSpec {
    /// Build a mapping, rejecting empty lists, empty names and duplicates
    pub fn new(attributes: Vec<AttributeSpec>) -> ProxyResult<Self> {
        if attributes.is_empty() {
            return Err(ProxyError::InvalidMapping(
                "mapping contains no attributes".to_string(),
            ));
        }

        for (i, attr) in attributes.iter().enumerate() {
            if attr.ngsi_name.is_empty() || attr.source_field.is_empty() {
                return Err(ProxyError::InvalidMapping(format!(
                    "attribute {} has an empty name",
                    i + 1
                )));
            }
            if attributes[..i].iter().any(|a| a.ngsi_name == attr.ngsi_name) {
                return Err(ProxyError::DuplicateAttribute(attr.ngsi_name.clone()));
            }
        }

        Ok(Self { attributes })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributeSpec> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn as_slice(&self) -> &[AttributeSpec] {
        &self.attributes
    }
}

impl<'a> IntoIterator for &'a MappingSpec {
    type Item = &'a AttributeSpec;
    type IntoIter = std::slice::Iter<'a, AttributeSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

impl fmt::Display for MappingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", attr)?;
        }
        Ok(())
    }
}

/// Opaque backend selector (`queryString` route parameter)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QuerySelector(Option<String>);

impl QuerySelector {
    /// Selector from a string; an empty string means no selector
    pub fn new(selector: impl Into<String>) -> Self {
        let selector = selector.into();
        if selector.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(selector))
        }
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

impl From<Option<String>> for QuerySelector {
    fn from(value: Option<String>) -> Self {
        value.map(QuerySelector::new).unwrap_or_default()
    }
}

impl From<&str> for QuerySelector {
    fn from(value: &str) -> Self {
        QuerySelector::new(value)
    }
}

impl fmt::Display for QuerySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or("-"))
    }
}

/// A value produced by a backend
///
/// `List` comes first so untagged deserialization claims JSON arrays before
/// `Scalar` can.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    List(Vec<Value>),
    Scalar(Value),
}

impl AttributeValue {
    /// Create a numeric scalar; non-finite numbers become `null`
    pub fn number(value: f64) -> Self {
        AttributeValue::Scalar(
            serde_json::Number::from_f64(value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        )
    }

    pub fn shape(&self) -> Shape {
        match self {
            AttributeValue::Scalar(_) => Shape::Scalar,
            AttributeValue::List(_) => Shape::List,
        }
    }

    /// Numeric view of a scalar value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Scalar(v) => v.as_f64(),
            AttributeValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            AttributeValue::List(items) => Some(items),
            AttributeValue::Scalar(_) => None,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            AttributeValue::Scalar(v) => v,
            AttributeValue::List(items) => Value::Array(items),
        }
    }
}

/// Backend output for one attribute spec
#[derive(Debug, Clone, PartialEq)]
pub struct RawAttributeValue {
    pub source_field: String,
    pub value: AttributeValue,
}

impl RawAttributeValue {
    pub fn new(source_field: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            source_field: source_field.into(),
            value,
        }
    }
}
