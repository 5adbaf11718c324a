//! Upstream Fetcher Module
//!
//! Calls the weather provider with a per-attempt timeout and a bounded number
//! of attempts.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::config::{ApiKey, Config};
use crate::error::{Result, WeatherError};
use crate::upstream::{Backoff, Endpoint, FetchParams};

/// Query parameter carrying the provider credential.
const CREDENTIAL_PARAM: &str = "appid";

// == Upstream Fetcher ==
/// HTTP client for the weather provider.
#[derive(Debug, Clone)]
pub struct UpstreamFetcher {
    client: Client,
    base_url: String,
    api_key: Option<ApiKey>,
    attempts: u32,
    backoff: Backoff,
}

impl UpstreamFetcher {
    // == Constructor ==
    /// Creates a fetcher with immediate retries.
    ///
    /// # Arguments
    /// * `base_url` - Provider root, e.g. `https://api.openweathermap.org/data/2.5`
    /// * `api_key` - Credential, None when not configured
    /// * `timeout` - Per-attempt timeout
    /// * `attempts` - Total attempts per fetch (at least 1)
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<ApiKey>,
        timeout: Duration,
        attempts: u32,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Internal(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            attempts: attempts.max(1),
            backoff: Backoff::Immediate,
        })
    }

    /// Creates a fetcher from service configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.timeout(),
            config.retry_attempts,
        )?
        .with_backoff(config.backoff))
    }

    /// Replaces the delay policy between attempts.
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Total attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    // == Fetch ==
    /// Fetches one endpoint, retrying transient failures.
    ///
    /// Non-2xx statuses, transport errors, timeouts and non-JSON bodies each
    /// consume one attempt. The payload is returned as-is.
    ///
    /// # Errors
    /// - `Configuration` when no credential is set (no request is made)
    /// - `Upstream` once every attempt has failed
    #[instrument(skip_all, fields(endpoint = %endpoint), level = "debug")]
    pub async fn fetch(&self, endpoint: Endpoint, params: &FetchParams) -> Result<Value> {
        let Some(api_key) = &self.api_key else {
            error!("OpenWeatherMap API key not configured");
            return Err(WeatherError::Configuration { endpoint });
        };

        let url = format!("{}/{}", self.base_url, endpoint.path());
        let mut query = params.query_pairs();
        query.push((CREDENTIAL_PARAM, api_key.expose().to_string()));

        let mut last_reason = String::new();
        for attempt in 1..=self.attempts {
            match self.attempt(&url, &query).await {
                Ok(data) => {
                    if attempt > 1 {
                        debug!("Upstream succeeded on attempt {}", attempt);
                    }
                    return Ok(data);
                }
                Err(reason) => {
                    warn!("Attempt {} of {} failed: {}", attempt, self.attempts, reason);
                    last_reason = reason;
                }
            }

            if attempt < self.attempts {
                let delay = self.backoff.delay(attempt);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        error!(
            "Failed to fetch {} data after {} attempts",
            endpoint, self.attempts
        );
        Err(WeatherError::Upstream {
            endpoint,
            attempts: self.attempts,
            reason: last_reason,
        })
    }

    /// One request; the error string is safe to log.
    async fn attempt(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> std::result::Result<Value, String> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(describe)?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("upstream returned {}", status));
        }

        response.json::<Value>().await.map_err(describe)
    }
}

/// Renders a transport error without its URL, which carries the credential.
fn describe(err: reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timeout"
    } else if err.is_connect() {
        "connection error"
    } else if err.is_decode() {
        "malformed body"
    } else {
        "request error"
    };
    format!("{}: {}", kind, err.without_url())
}
