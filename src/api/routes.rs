//! API Routes
//!
//! Configures the Axum router with all weather service endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    config_handler, current_weather_handler, forecast_handler, health_handler,
    not_found_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /api/weather/current` - Current conditions
/// - `GET /api/weather/forecast` - Multi-day forecast
/// - `GET /api/config` - Dashboard defaults
/// - `GET /api/stats` - Cache statistics
/// - `GET /api/health` - Health check
///
/// # Middleware
/// - CORS: Allows any origin so the browser dashboard can call the API
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/weather/current", get(current_weather_handler))
        .route("/api/weather/forecast", get(forecast_handler))
        .route("/api/config", get(config_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/health", get(health_handler))
        .fallback(not_found_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
