//! NGSI proxy upstream clients
//!
//! Typed HTTP clients for the live data sources behind the proxy:
//!
//! - [`TwitterClient`] - standard search API, implements [`ngsi_core::SearchFetcher`]
//! - [`WeatherClient`] - Weather Underground conditions API, implements
//!   [`ngsi_core::ObservationFetcher`]
//!
//! Both return raw field maps; extracting attributes from them is the
//! backends' job.
//!
//! # Example
//!
//! ```rust,no_run
//! use ngsi_core::ObservationFetcher;
//! use ngsi_upstream::{HttpSettings, WeatherClient, WeatherConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WeatherConfig {
//!     api_key: Some("my-key".to_string()),
//!     ..WeatherConfig::default()
//! };
//! let client = WeatherClient::new(&config, HttpSettings::default())?;
//! let observation = client.observe("Germany/Berlin").await?;
//! println!("{:?}", observation.get("temp_c"));
//! # Ok(())
//! # }
//! ```
//!
//! # Testing
//!
//! The `testing` module serves an axum router on an ephemeral port, which is
//! how the integration tests fake both upstream APIs.

mod error;
mod http;
pub mod testing;
mod twitter;
mod weather;

pub use error::{ClientError, Result};
pub use http::{HttpSettings, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
pub use twitter::{TwitterClient, TwitterConfig, DEFAULT_TWEET_COUNT, DEFAULT_TWITTER_URL};
pub use weather::{WeatherClient, WeatherConfig, DEFAULT_WEATHER_URL};
