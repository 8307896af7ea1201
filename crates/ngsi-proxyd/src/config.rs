//! Configuration file handling for ngsi-proxyd

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ngsi_backends::{FixtureDef, FixtureTable, DEFAULT_UPSTREAM_TIMEOUT};
use ngsi_upstream::{TwitterConfig, WeatherConfig};
use serde::Deserialize;

/// Port used when neither the file nor the command line sets one
pub const DEFAULT_PORT: u16 = 3000;

/// Daemon configuration, as read from TOML
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub twitter: TwitterConfig,
    pub weather: WeatherConfig,
    /// Static backend fixtures; the built-in table is used when empty
    pub fixtures: Vec<FixtureDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Bound on each live upstream fetch
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_UPSTREAM_TIMEOUT.as_millis() as u64,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ProxyConfig {
    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.upstream.timeout_ms == 0 {
            anyhow::bail!("upstream.timeout_ms must be greater than zero");
        }
        Ok(config)
    }

    /// Merge command-line values over file values
    pub fn merge_with_args(
        mut self,
        port: Option<u16>,
        twitter_token: Option<&str>,
        weather_key: Option<&str>,
    ) -> Self {
        if let Some(port) = port {
            self.server.port = port;
        }
        if let Some(token) = twitter_token {
            self.twitter.bearer_token = Some(token.to_string());
        }
        if let Some(key) = weather_key {
            self.weather.api_key = Some(key.to_string());
        }
        self
    }

    /// Fixture table for the static backend
    pub fn fixture_table(&self) -> Result<FixtureTable> {
        if self.fixtures.is_empty() {
            return Ok(FixtureTable::builtin());
        }
        FixtureTable::from_defs(self.fixtures.iter().cloned()).context("Invalid fixture")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngsi_core::QuerySelector;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ProxyConfig::parse("").unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.upstream.timeout(), DEFAULT_UPSTREAM_TIMEOUT);
        assert_eq!(config.twitter.bearer_token, None);
        assert_eq!(config.weather.api_key, None);
        assert_eq!(config.fixture_table().unwrap().len(), FixtureTable::builtin().len());
    }

    #[test]
    fn full_file() {
        let config = ProxyConfig::parse(
            r#"
            [server]
            port = 8080

            [upstream]
            timeout_ms = 2500

            [twitter]
            base_url = "http://localhost:9000"
            bearer_token = "abc"
            count = 5

            [weather]
            api_key = "xyz"

            [[fixtures]]
            field = "temperature"
            value = 19.0

            [[fixtures]]
            field = "temperature"
            selector = "Spain/Madrid"
            value = 30

            [[fixtures]]
            field = "tweets"
            value = ["one", "two"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.timeout(), Duration::from_millis(2500));
        assert_eq!(config.twitter.base_url, "http://localhost:9000");
        assert_eq!(config.twitter.count, 5);
        assert_eq!(config.weather.api_key.as_deref(), Some("xyz"));

        let table = config.fixture_table().unwrap();
        assert_eq!(table.len(), 3);
        let madrid = table
            .get("temperature", &QuerySelector::new("Spain/Madrid"))
            .unwrap();
        assert_eq!(madrid.as_f64(), Some(30.0));
    }

    #[test]
    fn invalid_fixture_is_reported() {
        let config = ProxyConfig::parse(
            r#"
            [[fixtures]]
            field = "temperature"
            value = "warm"
            "#,
        )
        .unwrap();
        assert!(config.fixture_table().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(ProxyConfig::parse("[upstream]\ntimeout_ms = 0").is_err());
    }

    #[test]
    fn args_override_file() {
        let config = ProxyConfig::parse("[server]\nport = 8080\n[twitter]\nbearer_token = \"file\"")
            .unwrap()
            .merge_with_args(Some(9090), Some("cli"), Some("key"));

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.twitter.bearer_token.as_deref(), Some("cli"));
        assert_eq!(config.weather.api_key.as_deref(), Some("key"));

        let untouched = ProxyConfig::default().merge_with_args(None, None, None);
        assert_eq!(untouched.server.port, DEFAULT_PORT);
        assert_eq!(untouched.twitter.bearer_token, None);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 4040").unwrap();

        let config = ProxyConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 4040);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProxyConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
