//! TwitterBackend - list attributes from a social search
//!
//! The selector is the search term. One search runs per request; every list
//! spec reads its field from each result item, in upstream order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ngsi_core::{
    AttributeSpec, AttributeValue, BackendKind, ContextBackend, FetchError, FieldMap,
    MappingSpec, ProxyError, ProxyResult, QuerySelector, RawAttributeValue, SearchFetcher, Shape,
};
use serde_json::Value;
use tracing::debug;

use crate::live::{bounded, require_selector, require_shape, DEFAULT_UPSTREAM_TIMEOUT};

/// Item field used when an unaliased spec names no field the items carry
pub const TEXT_FIELD: &str = "text";

/// Backend answering list attributes from search results
#[derive(Clone)]
pub struct TwitterBackend {
    fetcher: Arc<dyn SearchFetcher>,
    timeout: Duration,
}

impl TwitterBackend {
    pub fn new(fetcher: Arc<dyn SearchFetcher>) -> Self {
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

impl std::fmt::Debug for TwitterBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitterBackend")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContextBackend for TwitterBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Twitter
    }

    async fn fetch_attributes(
        &self,
        specs: &MappingSpec,
        selector: &QuerySelector,
    ) -> ProxyResult<Vec<RawAttributeValue>> {
        require_shape(self.kind(), specs, Shape::List)?;
        let term = require_selector(self.kind(), selector)?;

        let items = bounded(self.kind(), self.timeout, self.fetcher.search(term)).await?;
        debug!(term, items = items.len(), "Search returned");

        specs
            .iter()
            .map(|spec| -> ProxyResult<RawAttributeValue> {
                let values = items
                    .iter()
                    .map(|item| extract(spec, item))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| ProxyError::upstream(self.kind().as_str(), e))?;
                Ok(RawAttributeValue::new(
                    spec.source_field.clone(),
                    AttributeValue::List(values),
                ))
            })
            .collect()
    }
}

fn extract(spec: &AttributeSpec, item: &FieldMap) -> Result<Value, FetchError> {
    let value = match item.get(&spec.source_field) {
        Some(value) => value,
        None if !spec.is_aliased() => item.get(TEXT_FIELD).ok_or_else(|| {
            FetchError::Malformed(format!("search item has no '{}' field", TEXT_FIELD))
        })?,
        None => {
            return Err(FetchError::Malformed(format!(
                "search item has no '{}' field",
                spec.source_field
            )))
        }
    };

    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(value.clone()),
        _ => Err(FetchError::Malformed(format!(
            "search item field '{}' is not a scalar",
            spec.source_field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngsi_core::parse;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockSearch {
        calls: AtomicUsize,
        delay: Duration,
        result: fn(&str) -> Result<Vec<FieldMap>, FetchError>,
    }

    impl MockSearch {
        fn new(result: fn(&str) -> Result<Vec<FieldMap>, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay: Duration::ZERO,
                result,
            })
        }
    }

    #[async_trait]
    impl SearchFetcher for MockSearch {
        async fn search(&self, term: &str) -> Result<Vec<FieldMap>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            (self.result)(term)
        }
    }

    fn item(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn three_tweets(term: &str) -> Result<Vec<FieldMap>, FetchError> {
        Ok((1..=3)
            .map(|i| item(json!({"id": i, "text": format!("{} tweet {}", term, i), "lang": "en"})))
            .collect())
    }

    #[tokio::test]
    async fn texts_in_upstream_order() {
        let mock = MockSearch::new(three_tweets);
        let backend = TwitterBackend::new(mock.clone());
        let specs = parse("list", "tweets:text").unwrap();

        let values = backend
            .fetch_attributes(&specs, &QuerySelector::new("FIWARE"))
            .await
            .unwrap();

        assert_eq!(
            values[0].value,
            AttributeValue::List(vec![
                json!("FIWARE tweet 1"),
                json!("FIWARE tweet 2"),
                json!("FIWARE tweet 3")
            ])
        );
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn one_search_serves_every_spec() {
        let mock = MockSearch::new(three_tweets);
        let backend = TwitterBackend::new(mock.clone());
        let specs = parse("list", "tweets:text,languages:lang,ids:id").unwrap();

        let values = backend
            .fetch_attributes(&specs, &QuerySelector::new("FIWARE"))
            .await
            .unwrap();

        assert_eq!(values.len(), 3);
        assert_eq!(values[1].value.as_list().unwrap()[0], json!("en"));
        assert_eq!(values[2].value.as_list().unwrap()[2], json!(3));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unaliased_spec_falls_back_to_text() {
        let backend = TwitterBackend::new(MockSearch::new(three_tweets));
        let specs = parse("list", "tweets:array").unwrap();

        let values = backend
            .fetch_attributes(&specs, &QuerySelector::new("rust"))
            .await
            .unwrap();
        assert_eq!(values[0].value.as_list().unwrap()[0], json!("rust tweet 1"));
    }

    #[tokio::test]
    async fn aliased_missing_field_is_malformed() {
        let backend = TwitterBackend::new(MockSearch::new(three_tweets));
        let specs = parse("list", "tweets:full_text").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::new("rust"))
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
    async fn scalar_spec_rejected_before_searching() {
        let mock = MockSearch::new(three_tweets);
        let backend = TwitterBackend::new(mock.clone());
        let specs = parse("number", "tweets").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::new("FIWARE"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::UnsupportedShape { backend: "twitter", .. }));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_term_rejected_before_searching() {
        let mock = MockSearch::new(three_tweets);
        let backend = TwitterBackend::new(mock.clone());
        let specs = parse("list", "tweets:text").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::none())
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequest(_)));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_failure_is_upstream_error() {
        let backend = TwitterBackend::new(MockSearch::new(|_| Err(FetchError::RateLimited)));
        let specs = parse("list", "tweets:text").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::new("FIWARE"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(matches!(
            err,
            ProxyError::Upstream {
                source: FetchError::RateLimited,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn slow_search_times_out() {
        let mock = Arc::new(MockSearch {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(5),
            result: three_tweets,
        });
        let backend = TwitterBackend::new(mock).with_timeout(Duration::from_millis(50));
        let specs = parse("list", "tweets:text").unwrap();

        let err = backend
            .fetch_attributes(&specs, &QuerySelector::new("FIWARE"))
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
    async fn empty_result_gives_empty_lists() {
        let backend = TwitterBackend::new(MockSearch::new(|_| Ok(vec![])));
        let specs = parse("list", "tweets:text").unwrap();

        let values = backend
            .fetch_attributes(&specs, &QuerySelector::new("nothing"))
            .await
            .unwrap();
        assert_eq!(values[0].value, AttributeValue::List(vec![]));
    }
}
