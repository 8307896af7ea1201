//! Mapping language parser.
//!
//! A mapping names the NGSI attributes of a response and the backend field
//! each one is read from:
//!
//! ```text
//! mapping := unit (',' unit)*
//! unit    := name | name ':' alias
//! ```
//!
//! An alias of `array` forces a list-shaped attribute read from `name`; any
//! other alias is the backend field, with the shape taken from the `type`
//! route parameter (`number` or `list`).
//!
//! ```
//! # use ngsi_core::mapping::parse;
//! # use ngsi_core::Shape;
//! let spec = parse("number", "temperature:temp_c, relativeHumidity").unwrap();
//! let fields: Vec<_> = spec.iter().map(|a| a.source_field.as_str()).collect();
//! assert_eq!(fields, ["temp_c", "relativeHumidity"]);
//! assert!(spec.iter().all(|a| a.shape == Shape::Scalar));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{ProxyError, ProxyResult};
use crate::models::{AttributeSpec, MappingSpec, Shape, ARRAY_ALIAS};

/// Value type named by the `type` route parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Number,
    List,
}

impl ValueType {
    /// Shape of attributes that do not override it with `:array`
    pub fn default_shape(&self) -> Shape {
        match self {
            ValueType::Number => Shape::Scalar,
            ValueType::List => Shape::List,
        }
    }
}

impl FromStr for ValueType {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "number" => Ok(ValueType::Number),
            "list" => Ok(ValueType::List),
            other => Err(ProxyError::InvalidMapping(format!(
                "unknown type '{}', expected 'number' or 'list'",
                other
            ))),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Number => f.write_str("number"),
            ValueType::List => f.write_str("list"),
        }
    }
}

/// Parse the `type` and `mapping` route parameters into an ordered spec
pub fn parse(value_type: &str, mapping: &str) -> ProxyResult<MappingSpec> {
    let value_type: ValueType = value_type.parse()?;

    if mapping.trim().is_empty() {
        return Err(ProxyError::InvalidMapping("mapping is empty".to_string()));
    }

    let attributes = mapping
        .split(',')
        .enumerate()
        .map(|(i, unit)| parse_unit(i + 1, unit, value_type))
        .collect::<ProxyResult<Vec<_>>>()?;

    MappingSpec::new(attributes)
}

fn parse_unit(position: usize, unit: &str, value_type: ValueType) -> ProxyResult<AttributeSpec> {
    let unit = unit.trim();
    if unit.is_empty() {
        return Err(ProxyError::InvalidMapping(format!(
            "mapping unit {} is empty",
            position
        )));
    }

    let mut parts = unit.split(':').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let alias = parts.next();

    if parts.next().is_some() {
        return Err(ProxyError::InvalidMapping(format!(
            "mapping unit '{}' has more than one ':'",
            unit
        )));
    }
    if name.is_empty() {
        return Err(ProxyError::InvalidMapping(format!(
            "mapping unit '{}' has no attribute name",
            unit
        )));
    }

    match alias {
        None => Ok(AttributeSpec::new(name, name, value_type.default_shape())),
        Some("") => Err(ProxyError::InvalidMapping(format!(
            "mapping unit '{}' has an empty alias",
            unit
        ))),
        Some(ARRAY_ALIAS) => Ok(AttributeSpec::new(name, name, Shape::List)),
        Some(field) => Ok(AttributeSpec::new(name, field, value_type.default_shape())),
    }
}
