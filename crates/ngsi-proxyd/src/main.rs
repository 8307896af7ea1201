//! ngsi-proxyd - NGSI Proxy Daemon
//!
//! Serves NGSI v1 `queryContext` endpoints backed by random values, static
//! fixtures, a social search API and a weather API.
//!
//! Usage:
//!   ngsi-proxyd [--config proxy.toml] [--port 3000]
//!
//! Without a config file every backend starts with defaults; the live ones
//! answer with an upstream error until credentials are supplied.

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ngsi_api::{create_router, AppState};
use ngsi_backends::{RandomBackend, StaticBackend, TwitterBackend, WeatherBackend};
use ngsi_core::ContextBackend;
use ngsi_upstream::{HttpSettings, TwitterClient, WeatherClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ProxyConfig;

#[derive(Parser)]
#[command(name = "ngsi-proxyd")]
#[command(author, version, about = "NGSI queryContext proxy daemon")]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "NGSI_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (overrides the config file)
    #[arg(short, long)]
    port: Option<u16>,

    /// Bearer token for the search API
    #[arg(long, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    twitter_bearer_token: Option<String>,

    /// API key for the weather API
    #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
    weather_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ngsi_proxyd=info,ngsi_api=info,ngsi_backends=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ngsi-proxyd (NGSI Proxy Daemon)");

    let args = Args::parse();

    let config = match args.config {
        Some(ref path) => {
            tracing::info!("Loading config from: {}", path.display());
            ProxyConfig::load_from(path)?
        }
        None => {
            tracing::info!("No config file provided, using defaults");
            ProxyConfig::default()
        }
    };
    let config = config.merge_with_args(
        args.port,
        args.twitter_bearer_token.as_deref(),
        args.weather_api_key.as_deref(),
    );

    let state = build_state(&config)?;
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down");
    Ok(())
}

/// Create every backend from configuration
fn build_state(config: &ProxyConfig) -> anyhow::Result<AppState> {
    let timeout = config.upstream.timeout();
    let client = HttpSettings::with_timeout(timeout)
        .build_client()
        .context("Failed to create HTTP client")?;

    let fixtures = config.fixture_table()?;
    tracing::info!(fixtures = fixtures.len(), "Static fixtures loaded");

    if config.twitter.bearer_token.is_none() {
        tracing::warn!("No Twitter bearer token configured; twitter routes will fail");
    }
    let twitter = TwitterClient::with_client(&config.twitter, client.clone())
        .context("Invalid twitter.base_url")?;

    if config.weather.api_key.is_none() {
        tracing::warn!("No Weather API key configured; weather routes will fail");
    }
    let weather = WeatherClient::with_client(&config.weather, client)
        .context("Invalid weather.base_url")?;

    let backends: Vec<Arc<dyn ContextBackend>> = vec![
        Arc::new(RandomBackend::new()),
        Arc::new(StaticBackend::new(Arc::new(fixtures))),
        Arc::new(TwitterBackend::new(Arc::new(twitter)).with_timeout(timeout)),
        Arc::new(WeatherBackend::new(Arc::new(weather)).with_timeout(timeout)),
    ];

    for backend in &backends {
        tracing::info!(backend = %backend.kind(), "Backend registered");
    }

    Ok(AppState::from_backends(backends))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
