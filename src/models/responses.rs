//! Response DTOs for the weather API
//!
//! Weather payloads are passed through as raw JSON; these types cover the
//! service's own endpoints.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::config::Config;
use crate::upstream::Units;

/// Response body for `GET /api/config`, read by the dashboard on load.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigResponse {
    pub default_city: String,
    pub default_country: String,
    pub default_lat: f64,
    pub default_lon: f64,
    pub default_units: Units,
    /// Seconds
    pub cache_duration: u64,
}

impl ConfigResponse {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_city: config.default_city.clone(),
            default_country: config.default_country.clone(),
            default_lat: config.default_lat,
            default_lon: config.default_lon,
            default_units: config.default_units,
            cache_duration: config.cache_duration,
        }
    }
}

/// Response body for `GET /api/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub evictions: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            stores: stats.stores,
            evictions: stats.evictions,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for `GET /api/health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Whether a provider credential is configured
    pub upstream_configured: bool,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(upstream_configured: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            upstream_configured,
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
