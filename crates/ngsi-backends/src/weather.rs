//! WeatherBackend - scalar readings from a weather observation
//!
//! The selector is a `Country/City` path. A single observation is fetched per
//! request and every scalar spec reads its field from it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ngsi_core::{
    AttributeSpec, AttributeValue, BackendKind, ContextBackend, FetchError, FieldMap,
    MappingSpec, ObservationFetcher, ProxyError, ProxyResult, QuerySelector, RawAttributeValue,
    Shape,
};
use serde_json::Value;
use tracing::debug;

use crate::live::{bounded, require_selector, require_shape, DEFAULT_UPSTREAM_TIMEOUT};

/// Backend answering scalar attributes from the current observation
#[derive(Clone)]
pub struct WeatherBackend {
    fetcher: Arc<dyn ObservationFetcher>,
    timeout: Duration,
}

impl WeatherBackend {
    pub fn new(fetcher: Arc<dyn ObservationFetcher>) -> Self {
        Self {
            fetcher,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for WeatherBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherBackend")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContextBackend for WeatherBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Weather
    }

    async fn fetch_attributes(
        &self,
        specs: &MappingSpec,
        selector: &QuerySelector,
    ) -> ProxyResult<Vec<RawAttributeValue>> {
        require_shape(self.kind(), specs, Shape::Scalar)?;
        let location = require_selector(self.kind(), selector)?;

        let observation = bounded(self.kind(), self.timeout, self.fetcher.observe(location)).await?;
        debug!(location, fields = observation.len(), "Observation received");

        specs
            .iter()
            .map(|spec| -> ProxyResult<RawAttributeValue> {
                let value = reading(spec, &observation)
                    .map_err(|e| ProxyError::upstream(self.kind().as_str(), e))?;
                Ok(RawAttributeValue::new(spec.source_field.clone(), value))
            })
            .collect()
    }
}

fn reading(spec: &AttributeSpec, observation: &FieldMap) -> Result<AttributeValue, FetchError> {
    let field = &spec.source_field;
    let value = observation
        .get(field)
        .ok_or_else(|| FetchError::Malformed(format!("observation has no '{}' field", field)))?;

    coerce_number(value)
        .map(AttributeValue::number)
        .ok_or_else(|| FetchError::Malformed(format!("observation field '{}' is not numeric: {}", field, value)))
}

/// Numeric reading from a JSON number or a numeric string such as `"65%"`
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            s.strip_suffix('%')
                .unwrap_or(s)
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngsi_core::parse;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockObservation {
        calls: AtomicUsize,
        delay: Duration,
        body: Value,
    }

    impl MockObservation {
        fn new(body: Value) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                body,
            })
        }
    }

    #[async_trait]
    impl ObservationFetcher for MockObservation {
        async fn observe(&self, _location: &str) -> Result<FieldMap, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match &self.body {
                Value::Object(map) => Ok(map.clone()),
                _ => Err(FetchError::Rejected("querynotfound".to_string())),
            }
        }
    }

    fn berlin() -> Value {
        json!({"temp_c": 18.4, "relative_humidity": "62%", "weather": "Clear"})
    }

    #[tokio::test]
    async fn readings_from_a_single_observation() {
        let mock = MockObservation::new(berlin());
        let backend = WeatherBackend::new(mock.clone());
        let specs = parse("number", "temperature:temp_c,relativeHumidity:relative_humidity").unwrap();

        let values = backend
            .fetch_attributes(&specs, &QuerySelector::new("Germany/Berlin"))
            .await
            .unwrap();

        assert_eq!(values[0].source_field, "temp_c");
        assert_eq!(values[0].value.as_f64(), Some(18.4));
        assert_eq!(values[1].source_field, "relative_humidity");
        assert_eq!(values[1].value.as_f64(), Some(62.0));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn list_spec_rejected_before_fetching() {
        let mock = MockObservation::new(berlin());
        let backend = WeatherBackend::new(mock.clone());
        let specs = parse("number", "temperature:temp_c,tweets:array").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::new("Germany/Berlin"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProxyError::UnsupportedShape { ref attribute, .. } if attribute == "tweets"
        ));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_numeric_field_is_malformed() {
        let backend = WeatherBackend::new(MockObservation::new(berlin()));
        let specs = parse("number", "conditions:weather").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::new("Germany/Berlin"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Upstream {
                source: FetchError::Malformed(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_field_is_malformed() {
        let backend = WeatherBackend::new(MockObservation::new(berlin()));
        let specs = parse("number", "pressure:pressure_mb").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::new("Germany/Berlin"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn rejected_lookup_is_upstream_error() {
        let backend = WeatherBackend::new(MockObservation::new(Value::Null));
        let specs = parse("number", "temperature:temp_c").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::new("Atlantis/Poseidonia"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Upstream {
                backend: "weather",
                source: FetchError::Rejected(_)
            }
        ));
    }

    #[tokio::test]
    async fn slow_observation_times_out() {
        let mock = Arc::new(MockObservation {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(5),
            body: berlin(),
        });
        let backend = WeatherBackend::new(mock).with_timeout(Duration::from_millis(50));
        let specs = parse("number", "temperature:temp_c").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::new("Germany/Berlin"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Upstream {
                source: FetchError::Timeout,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn missing_location_is_a_bad_request() {
        let backend = WeatherBackend::new(MockObservation::new(berlin()));
        let specs = parse("number", "temperature:temp_c").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::none())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(coerce_number(&json!(12)), Some(12.0));
        assert_eq!(coerce_number(&json!("12.3")), Some(12.3));
        assert_eq!(coerce_number(&json!(" 65% ")), Some(65.0));
        assert_eq!(coerce_number(&json!("N/A")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!("NaN")), None);
    }
}
