//! Weather Underground conditions API client

use async_trait::async_trait;
use ngsi_core::{FetchError, FieldMap, ObservationFetcher};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::Result;
use crate::http::{join_segments, parse_base_url, read_json, transport_error, HttpSettings};

/// Default API root
pub const DEFAULT_WEATHER_URL: &str = "http://api.wunderground.com";

fn default_base_url() -> String {
    DEFAULT_WEATHER_URL.to_string()
}

/// Connection settings for the conditions API
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key; requests fail with `NotConfigured` without it
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

/// Conditions client: one `GET /api/{key}/conditions/q/{Country}/{City}.json`
/// per call
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig, settings: HttpSettings) -> Result<Self> {
        Self::with_client(config, settings.build_client()?)
    }

    /// Build on an existing client to share its connection pool
    pub fn with_client(config: &WeatherConfig, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    fn conditions_url(&self, key: &str, location: &str) -> std::result::Result<Url, FetchError> {
        let mut parts: Vec<&str> = location
            .split('/')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let city = parts
            .pop()
            .ok_or_else(|| FetchError::Rejected(format!("invalid location '{}'", location)))?;
        let city = format!("{}.json", city);

        let mut segments = vec!["api", key, "conditions", "q"];
        segments.extend(parts);
        segments.push(&city);
        join_segments(&self.base_url, segments)
    }
}

#[async_trait]
impl ObservationFetcher for WeatherClient {
    #[instrument(skip(self))]
    async fn observe(&self, location: &str) -> std::result::Result<FieldMap, FetchError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::NotConfigured("weather api key".to_string()))?;

        let url = self.conditions_url(key, location)?;
        debug!(location, "Fetching current conditions");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response).await?;
        current_observation(body)
    }
}

fn current_observation(body: Value) -> std::result::Result<FieldMap, FetchError> {
    let Value::Object(mut root) = body else {
        return Err(FetchError::Malformed("conditions response is not an object".to_string()));
    };

    // Errors come back with HTTP 200 and a `response.error` object
    if let Some(error) = root.get("response").and_then(|r| r.get("error")) {
        let kind = error.get("type").and_then(Value::as_str).unwrap_or("error");
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("no description");
        return Err(FetchError::Rejected(format!("{}: {}", kind, description)));
    }

    match root.remove("current_observation") {
        Some(Value::Object(fields)) => Ok(fields),
        Some(_) => Err(FetchError::Malformed(
            "'current_observation' is not an object".to_string(),
        )),
        None => Err(FetchError::Malformed(
            "conditions response has no 'current_observation'".to_string(),
        )),
    }
}
