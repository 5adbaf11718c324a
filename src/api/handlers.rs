//! API Handlers
//!
//! HTTP request handlers for each weather service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::models::{ConfigResponse, ErrorResponse, HealthResponse, StatsResponse, WeatherQuery};
use crate::service::WeatherService;
use crate::upstream::Endpoint;

/// Application state shared across all handlers.
///
/// Holds the weather service (cache + fetcher) and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates a new AppState around an existing service.
    pub fn new(service: WeatherService, config: Config) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let service = WeatherService::from_config(config)?;
        Ok(Self::new(service, config.clone()))
    }
}

/// Handler for GET /api/weather/current
pub async fn current_weather_handler(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>> {
    let data = state.service.lookup(Endpoint::Current, &query).await?;
    Ok(Json(data))
}

/// Handler for GET /api/weather/forecast
pub async fn forecast_handler(
    State(state): State<AppState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<Value>> {
    let data = state.service.lookup(Endpoint::Forecast, &query).await?;
    Ok(Json(data))
}

/// Handler for GET /api/config
///
/// Defaults the dashboard uses on first load.
pub async fn config_handler(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse::from_config(&state.config))
}

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.service.stats().await.into())
}

/// Handler for GET /api/health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.config.api_key.is_some()))
}

/// Fallback for unknown routes.
pub async fn not_found_handler() -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}
