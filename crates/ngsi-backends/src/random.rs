//! RandomBackend - synthetic attribute values
//!
//! Scalars are drawn uniformly from a range chosen by the source field's
//! meaning; lists are a fixed number of synthetic strings. The selector is
//! ignored and nothing here can fail on valid specs.

use async_trait::async_trait;
use ngsi_core::{
    fetch_each, AttributeSpec, AttributeValue, BackendKind, ContextBackend, MappingSpec,
    ProxyResult, QuerySelector, RawAttributeValue, Shape,
};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tracing::debug;

/// Number of items in a synthetic list
pub const RANDOM_LIST_LEN: usize = 3;

/// Range for fields with no known meaning
pub const GENERIC_RANGE: (f64, f64) = (0.0, 100.0);

/// Inclusive value range for a source field
pub fn range_for(field: &str) -> (f64, f64) {
    match field {
        "temperature" | "temp_c" => (-10.0, 40.0),
        "temp_f" => (14.0, 104.0),
        "relativeHumidity" | "relative_humidity" | "humidity" => (0.0, 100.0),
        "pressure" | "pressure_mb" => (950.0, 1050.0),
        "wind_kph" | "windSpeed" => (0.0, 120.0),
        _ => GENERIC_RANGE,
    }
}

/// Backend producing synthetic values
#[derive(Debug, Clone)]
pub struct RandomBackend {
    list_len: usize,
}

impl RandomBackend {
    pub fn new() -> Self {
        Self {
            list_len: RANDOM_LIST_LEN,
        }
    }

    fn sample(&self, spec: &AttributeSpec) -> AttributeValue {
        let mut rng = rand::thread_rng();
        match spec.shape {
            Shape::Scalar => {
                let (low, high) = range_for(&spec.source_field);
                let value: f64 = rng.gen_range(low..=high);
                // Two decimals, still inside the range
                AttributeValue::number(((value * 100.0).round() / 100.0).clamp(low, high))
            }
            Shape::List => AttributeValue::List(
                (1..=self.list_len)
                    .map(|i| {
                        let tag: String = (&mut rng)
                            .sample_iter(&Alphanumeric)
                            .take(8)
                            .map(char::from)
                            .collect();
                        Value::String(format!("{} #{} {}", spec.source_field, i, tag))
                    })
                    .collect(),
            ),
        }
    }
}

impl Default for RandomBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextBackend for RandomBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Random
    }

    async fn fetch_attributes(
        &self,
        specs: &MappingSpec,
        _selector: &QuerySelector,
    ) -> ProxyResult<Vec<RawAttributeValue>> {
        debug!(attributes = specs.len(), "Generating random values");
        fetch_each(specs, |spec| async move {
            Ok(RawAttributeValue::new(
                spec.source_field.clone(),
                self.sample(spec),
            ))
        })
        .await
    }
}
