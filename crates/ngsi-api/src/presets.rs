//! Convenience routes with fixed parameters
//!
//! Each preset pins `type`, `mapping` and optionally `queryString` for one
//! backend, so `POST /proxy/v1/{backend}/{preset}/queryContext` needs no path
//! parameters at all.

use ngsi_core::BackendKind;

/// Route prefix shared by every proxy endpoint
pub const API_PREFIX: &str = "/proxy/v1";

/// Fixed request parameters for a convenience route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteConfig {
    pub value_type: &'static str,
    pub mapping: &'static str,
    pub query_string: Option<&'static str>,
}

impl RouteConfig {
    const fn new(value_type: &'static str, mapping: &'static str) -> Self {
        Self {
            value_type,
            mapping,
            query_string: None,
        }
    }

    const fn selecting(self, query_string: &'static str) -> Self {
        Self {
            query_string: Some(query_string),
            ..self
        }
    }
}

/// A convenience route: backend, preset name and its parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub backend: BackendKind,
    pub name: &'static str,
    pub config: RouteConfig,
}

impl Preset {
    const fn new(backend: BackendKind, name: &'static str, config: RouteConfig) -> Self {
        Self {
            backend,
            name,
            config,
        }
    }

    /// Router path, relative to [`API_PREFIX`]
    pub fn path(&self) -> String {
        format!("/{}/{}/queryContext", self.backend, self.name)
    }

    /// Absolute URL path advertised by discovery
    pub fn url(&self) -> String {
        format!("{}{}", API_PREFIX, self.path())
    }
}

const TEMPERATURE: RouteConfig = RouteConfig::new("number", "temperature");
const HUMIDITY: RouteConfig = RouteConfig::new("number", "relativeHumidity");
const CONDITIONS: RouteConfig = RouteConfig::new("number", "temperature,relativeHumidity");
const TWEETS: RouteConfig = RouteConfig::new("list", "tweets:array");

const WEATHER_LOCATION: &str = "Germany/Berlin";
const TWITTER_TERM: &str = "FIWARE";

/// Every convenience route, in discovery order
pub const PRESETS: &[Preset] = &[
    Preset::new(BackendKind::Random, "temperature", TEMPERATURE),
    Preset::new(BackendKind::Random, "relativeHumidity", HUMIDITY),
    Preset::new(BackendKind::Random, "tweets", TWEETS),
    Preset::new(BackendKind::Random, "weatherConditions", CONDITIONS),
    Preset::new(BackendKind::Static, "temperature", TEMPERATURE),
    Preset::new(BackendKind::Static, "relativeHumidity", HUMIDITY),
    Preset::new(BackendKind::Static, "tweets", TWEETS),
    Preset::new(BackendKind::Static, "weatherConditions", CONDITIONS),
    Preset::new(
        BackendKind::Twitter,
        "tweets",
        RouteConfig::new("list", "tweets:text").selecting(TWITTER_TERM),
    ),
    Preset::new(
        BackendKind::Weather,
        "temperature",
        RouteConfig::new("number", "temperature:temp_c").selecting(WEATHER_LOCATION),
    ),
    Preset::new(
        BackendKind::Weather,
        "relativeHumidity",
        RouteConfig::new("number", "relativeHumidity:relative_humidity")
            .selecting(WEATHER_LOCATION),
    ),
    Preset::new(
        BackendKind::Weather,
        "weatherConditions",
        RouteConfig::new(
            "number",
            "temperature:temp_c,relativeHumidity:relative_humidity",
        )
        .selecting(WEATHER_LOCATION),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use ngsi_core::{parse, Shape};

    #[test]
    fn every_preset_mapping_parses() {
        for preset in PRESETS {
            let specs = parse(preset.config.value_type, preset.config.mapping)
                .unwrap_or_else(|e| panic!("{}: {}", preset.url(), e));
            assert!(!specs.is_empty());
        }
    }

    #[test]
    fn presets_are_unique() {
        for (i, preset) in PRESETS.iter().enumerate() {
            assert!(
                PRESETS[..i].iter().all(|p| p.path() != preset.path()),
                "duplicate preset {}",
                preset.path()
            );
        }
    }

    #[test]
    fn live_presets_carry_a_selector() {
        for preset in PRESETS {
            let live = matches!(preset.backend, BackendKind::Twitter | BackendKind::Weather);
            assert_eq!(live, preset.config.query_string.is_some(), "{}", preset.url());
        }
    }

    #[test]
    fn weather_presets_read_observation_fields() {
        let preset = PRESETS
            .iter()
            .find(|p| p.backend == BackendKind::Weather && p.name == "weatherConditions")
            .unwrap();
        let specs = parse(preset.config.value_type, preset.config.mapping).unwrap();
        let fields: Vec<_> = specs.iter().map(|s| s.source_field.as_str()).collect();
        assert_eq!(fields, ["temp_c", "relative_humidity"]);
        assert!(specs.iter().all(|s| s.shape == Shape::Scalar));
    }

    #[test]
    fn urls_are_prefixed() {
        assert_eq!(
            PRESETS[0].url(),
            "/proxy/v1/random/temperature/queryContext"
        );
        assert_eq!(PRESETS.len(), 12);
    }
}
