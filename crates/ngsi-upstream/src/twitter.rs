//! Twitter standard search API client

use async_trait::async_trait;
use ngsi_core::{FetchError, FieldMap, SearchFetcher};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::Result;
use crate::http::{join_segments, parse_base_url, read_json, transport_error, HttpSettings};

/// Default API root
pub const DEFAULT_TWITTER_URL: &str = "https://api.twitter.com";
/// Default number of results requested per search
pub const DEFAULT_TWEET_COUNT: u32 = 15;

fn default_base_url() -> String {
    DEFAULT_TWITTER_URL.to_string()
}

fn default_count() -> u32 {
    DEFAULT_TWEET_COUNT
}

/// Connection settings for the search API
#[derive(Debug, Clone, Deserialize)]
pub struct TwitterConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// App-only bearer token; requests fail with `NotConfigured` without it
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default = "default_count")]
    pub count: u32,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bearer_token: None,
            count: DEFAULT_TWEET_COUNT,
        }
    }
}

/// Search client: one `GET /1.1/search/tweets.json` per call
#[derive(Debug, Clone)]
pub struct TwitterClient {
    client: Client,
    base_url: Url,
    bearer_token: Option<String>,
    count: u32,
}

impl TwitterClient {
    pub fn new(config: &TwitterConfig, settings: HttpSettings) -> Result<Self> {
        Self::with_client(config, settings.build_client()?)
    }

    /// Build on an existing client to share its connection pool
    pub fn with_client(config: &TwitterConfig, client: Client) -> Result<Self> {
        Ok(Self {
            client,
            base_url: parse_base_url(&config.base_url)?,
            bearer_token: config.bearer_token.clone().filter(|t| !t.is_empty()),
            count: config.count,
        })
    }
}

#[async_trait]
impl SearchFetcher for TwitterClient {
    #[instrument(skip(self))]
    async fn search(&self, term: &str) -> std::result::Result<Vec<FieldMap>, FetchError> {
        let token = self
            .bearer_token
            .as_deref()
            .ok_or_else(|| FetchError::NotConfigured("twitter bearer token".to_string()))?;

        let url = join_segments(&self.base_url, ["1.1", "search", "tweets.json"])?;
        debug!("Searching tweets at {}", url);

        let count = self.count.to_string();
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("q", term), ("count", count.as_str())])
            .send()
            .await
            .map_err(transport_error)?;

        let body = read_json(response).await?;
        statuses(body)
    }
}

fn statuses(body: Value) -> std::result::Result<Vec<FieldMap>, FetchError> {
    let Value::Object(mut root) = body else {
        return Err(FetchError::Malformed("search response is not an object".to_string()));
    };

    match root.remove("statuses") {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(fields) => Ok(fields),
                other => Err(FetchError::Malformed(format!(
                    "search result is not an object: {}",
                    other
                ))),
            })
            .collect(),
        Some(_) => Err(FetchError::Malformed("'statuses' is not an array".to_string())),
        None => Err(FetchError::Malformed("search response has no 'statuses'".to_string())),
    }
}
