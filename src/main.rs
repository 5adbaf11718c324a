//! WeatherWise - Weather API proxy
//!
//! Serves current conditions and forecasts from OpenWeatherMap behind a
//! short-lived cache.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weatherwise::{create_router, spawn_cleanup_task, AppState, Config};

/// Main entry point for the WeatherWise server.
///
/// # Startup Sequence
/// 1. Load `.env` if present
/// 2. Initialize tracing subscriber for logging
/// 3. Load configuration from environment variables
/// 4. Build the weather service (cache store + upstream fetcher)
/// 5. Start the optional cache sweep task
/// 6. Serve the Axum router on the configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weatherwise=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = dotenv {
        tracing::debug!("No .env file loaded: {}", e);
    }

    info!("Starting WeatherWise server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: cache_duration={}s, request_timeout={}s, retry_attempts={}, default_units={}, single_flight={}, port={}",
        config.cache_duration,
        config.request_timeout,
        config.retry_attempts,
        config.default_units,
        config.single_flight,
        config.server_port
    );

    if config.api_key.is_none() {
        warn!("OPENWEATHER_API_KEY not set; weather requests will fail until it is configured");
    }

    let state = AppState::from_config(&config).context("failed to build weather service")?;
    info!("Weather service initialized");

    let cleanup_handle = (config.cleanup_interval > 0).then(|| {
        info!("Background cache sweep enabled");
        spawn_cleanup_task(
            state.service.cache(),
            std::time::Duration::from_secs(config.cleanup_interval),
        )
    });

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cache sweep task aborted");
    }
}
