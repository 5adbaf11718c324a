//! Weather Service Module
//!
//! Request handling core: derive the cache key, serve fresh cache hits, and
//! fetch from the provider on a miss.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::cache::{CacheKey, CacheStats, CacheStore};
use crate::config::Config;
use crate::error::Result;
use crate::models::WeatherQuery;
use crate::service::SingleFlight;
use crate::upstream::{Endpoint, FetchParams, UpstreamFetcher, Units};

// == Weather Service ==
/// Cache-fronted access to the weather provider.
///
/// Built once at startup and shared by every handler.
#[derive(Debug)]
pub struct WeatherService {
    cache: Arc<RwLock<CacheStore>>,
    fetcher: UpstreamFetcher,
    /// None = every miss fetches independently
    flights: Option<SingleFlight<Result<Value>>>,
    default_units: Units,
}

impl WeatherService {
    // == Constructor ==
    /// Creates a service with single-flight enabled and metric default units.
    pub fn new(cache: CacheStore, fetcher: UpstreamFetcher) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            fetcher,
            flights: Some(SingleFlight::new()),
            default_units: Units::Metric,
        }
    }

    /// Creates a service wired from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = CacheStore::new(config.cache_ttl()).with_max_entries(config.cache_max_entries);
        let fetcher = UpstreamFetcher::from_config(config)?;

        Ok(Self::new(cache, fetcher)
            .with_default_units(config.default_units)
            .with_single_flight(config.single_flight))
    }

    pub fn with_default_units(mut self, units: Units) -> Self {
        self.default_units = units;
        self
    }

    /// Turns request coalescing on or off.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.flights = enabled.then(SingleFlight::new);
        self
    }

    /// Shared handle to the cache, for background maintenance.
    pub fn cache(&self) -> Arc<RwLock<CacheStore>> {
        self.cache.clone()
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    // == Lookup ==
    /// Returns weather data for a client query.
    ///
    /// Query errors surface before the cache is consulted. Only successful
    /// fetches are cached.
    #[instrument(skip_all, fields(endpoint = %endpoint))]
    pub async fn lookup(&self, endpoint: Endpoint, query: &WeatherQuery) -> Result<Value> {
        let params = query.resolve(self.default_units)?;
        let key = CacheKey::derive(endpoint, &params.location, params.units);

        let cached = self.cache.write().await.get(&key);
        if let Some(data) = cached {
            info!(key = %key, "Serving cached data");
            return Ok(data);
        }

        match &self.flights {
            Some(flights) => {
                flights
                    .run(&key, || self.fetch_and_store(endpoint, &key, &params, true))
                    .await
            }
            None => self.fetch_and_store(endpoint, &key, &params, false).await,
        }
    }

    async fn fetch_and_store(
        &self,
        endpoint: Endpoint,
        key: &CacheKey,
        params: &FetchParams,
        recheck: bool,
    ) -> Result<Value> {
        // Another leader may have filled the key between our miss and now
        if recheck {
            if let Some(data) = self.cache.read().await.peek(key) {
                return Ok(data);
            }
        }

        let data = self.fetcher.fetch(endpoint, params).await?;
        self.cache.write().await.put(key.clone(), data.clone());
        info!(key = %key, "Cached fresh data");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKey;
    use crate::error::WeatherError;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(base_url: &str, ttl: Duration) -> WeatherService {
        let fetcher = UpstreamFetcher::new(
            base_url,
            ApiKey::new("test-key"),
            Duration::from_secs(2),
            3,
        )
        .unwrap();
        WeatherService::new(CacheStore::new(ttl), fetcher)
    }

    #[tokio::test]
    async fn test_cold_then_warm() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Gaya"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Gaya"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let service = service(&mock_server.uri(), Duration::from_secs(600));
        let query = WeatherQuery::city("Gaya").with_units("metric");

        let first = service.lookup(Endpoint::Current, &query).await.unwrap();
        let second = service.lookup(Endpoint::Current, &query).await.unwrap();

        assert_eq!(first, json!({"name": "Gaya"}));
        assert_eq!(first, second);
        let key = CacheKey::derive(
            Endpoint::Current,
            &crate::upstream::Location::City("Gaya".to_string()),
            Units::Metric,
        );
        assert!(service.cache.read().await.is_valid(&key));
        assert_eq!(service.stats().await.hits, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
            .expect(2)
            .mount(&mock_server)
            .await;

        let service = service(&mock_server.uri(), Duration::from_millis(50));
        let query = WeatherQuery::city("Gaya");

        service.lookup(Endpoint::Current, &query).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        service.lookup(Endpoint::Current, &query).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_location_touches_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let service = service(&mock_server.uri(), Duration::from_secs(600));
        let err = service
            .lookup(Endpoint::Current, &WeatherQuery::default())
            .await
            .unwrap_err();

        assert_eq!(err, WeatherError::MissingLocation);
        let stats = service.stats().await;
        assert_eq!(stats.hits + stats.misses, 0);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&mock_server)
            .await;

        let service = service(&mock_server.uri(), Duration::from_secs(600));
        let err = service
            .lookup(Endpoint::Forecast, &WeatherQuery::city("Gaya"))
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Upstream { attempts: 3, .. }));
        assert_eq!(service.stats().await.total_entries, 0);
    }

    #[tokio::test]
    async fn test_concurrent_cold_misses_share_one_fetch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "Gaya"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let service = Arc::new(service(&mock_server.uri(), Duration::from_secs(600)));
        let mut handles = Vec::new();
        for _ in 0..5 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .lookup(Endpoint::Current, &WeatherQuery::city("Gaya"))
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), json!({"name": "Gaya"}));
        }
    }

    #[tokio::test]
    async fn test_without_single_flight_each_miss_fetches() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"name": "Gaya"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(3)
            .mount(&mock_server)
            .await;

        let service = Arc::new(
            service(&mock_server.uri(), Duration::from_secs(600)).with_single_flight(false),
        );
        let mut handles = Vec::new();
        for _ in 0..3 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .lookup(Endpoint::Current, &WeatherQuery::city("Gaya"))
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
    }

    #[tokio::test]
    async fn test_default_units_apply_to_key() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let service = service(&mock_server.uri(), Duration::from_secs(600))
            .with_default_units(Units::Imperial);
        service
            .lookup(Endpoint::Current, &WeatherQuery::city("Delhi"))
            .await
            .unwrap();

        let key = CacheKey::derive(
            Endpoint::Current,
            &crate::upstream::Location::City("Delhi".to_string()),
            Units::Imperial,
        );
        assert_eq!(key.as_str(), "current_Delhi_imperial");
        assert!(service.cache.read().await.is_valid(&key));
    }
}
