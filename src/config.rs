//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::upstream::{Backoff, Units};

/// Default OpenWeatherMap API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

// == API Key ==
/// Provider credential.
///
/// `Debug` never prints the key itself.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a credential, treating blank values as unset.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Returns the raw credential for outbound requests.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenWeatherMap credential, None when not configured
    pub api_key: Option<ApiKey>,
    /// Provider base URL (no trailing slash required)
    pub base_url: String,
    /// Cache freshness window in seconds
    pub cache_duration: u64,
    /// Per-attempt upstream timeout in seconds
    pub request_timeout: u64,
    /// Total upstream attempts per fetch
    pub retry_attempts: u32,
    /// Delay policy between attempts
    pub backoff: Backoff,
    /// Units used when a client does not send any
    pub default_units: Units,
    pub default_city: String,
    pub default_country: String,
    pub default_lat: f64,
    pub default_lon: f64,
    /// LRU bound on cached entries, 0 = unbounded
    pub cache_max_entries: usize,
    /// Background sweep interval in seconds, 0 = disabled
    pub cleanup_interval: u64,
    /// Coalesce concurrent cold misses on the same key
    pub single_flight: bool,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `OPENWEATHER_API_KEY` - Provider credential (default: unset)
    /// - `OPENWEATHER_BASE_URL` - Provider root URL
    /// - `CACHE_DURATION` - Cache TTL in seconds (default: 600)
    /// - `REQUEST_TIMEOUT` - Upstream timeout in seconds (default: 10)
    /// - `RETRY_ATTEMPTS` - Upstream attempts (default: 3)
    /// - `RETRY_BACKOFF` - `none` or `exponential` (default: none)
    /// - `RETRY_INITIAL_DELAY_MS` / `RETRY_MAX_DELAY_MS` - Exponential bounds
    /// - `DEFAULT_UNITS` - `metric`, `imperial` or `standard` (default: metric)
    /// - `DEFAULT_CITY`, `DEFAULT_COUNTRY`, `DEFAULT_LAT`, `DEFAULT_LON`
    /// - `CACHE_MAX_ENTRIES` - LRU bound (default: 0, unbounded)
    /// - `CACHE_CLEANUP_INTERVAL` - Sweep interval in seconds (default: 0, off)
    /// - `SINGLE_FLIGHT` - Request coalescing (default: true)
    /// - `SERVER_PORT` - HTTP server port (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let backoff = match env::var("RETRY_BACKOFF").ok().as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("exponential") => Backoff::Exponential {
                initial: Duration::from_millis(parse_var("RETRY_INITIAL_DELAY_MS", 200)),
                max: Duration::from_millis(parse_var("RETRY_MAX_DELAY_MS", 2000)),
            },
            _ => Backoff::Immediate,
        };

        Self {
            api_key: env::var("OPENWEATHER_API_KEY").ok().and_then(ApiKey::new),
            base_url: env::var("OPENWEATHER_BASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.base_url),
            cache_duration: parse_var("CACHE_DURATION", defaults.cache_duration),
            request_timeout: parse_var("REQUEST_TIMEOUT", defaults.request_timeout),
            retry_attempts: parse_var("RETRY_ATTEMPTS", defaults.retry_attempts).max(1),
            backoff,
            default_units: parse_var("DEFAULT_UNITS", defaults.default_units),
            default_city: env::var("DEFAULT_CITY").unwrap_or(defaults.default_city),
            default_country: env::var("DEFAULT_COUNTRY").unwrap_or(defaults.default_country),
            default_lat: parse_var("DEFAULT_LAT", defaults.default_lat),
            default_lon: parse_var("DEFAULT_LON", defaults.default_lon),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES", defaults.cache_max_entries),
            cleanup_interval: parse_var("CACHE_CLEANUP_INTERVAL", defaults.cleanup_interval),
            single_flight: env::var("SINGLE_FLIGHT")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.single_flight),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
        }
    }

    /// Cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_duration)
    }

    /// Upstream per-attempt timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_duration: 600,
            request_timeout: 10,
            retry_attempts: 3,
            backoff: Backoff::Immediate,
            default_units: Units::Metric,
            default_city: "Gaya".to_string(),
            default_country: "IN".to_string(),
            default_lat: 24.7955,
            default_lon: 84.9994,
            cache_max_entries: 0,
            cleanup_interval: 0,
            single_flight: true,
            server_port: 5000,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
