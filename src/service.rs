//! Cache-first weather fetching
//!
//! `WeatherService` owns the `WeatherCache` and the `WeatherClient`. For a
//! location it serves a cached snapshot when one is still valid, and
//! otherwise requests current weather followed by the forecast, caching the
//! combined result.

use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use crate::cache::WeatherCache;
use crate::data::{Endpoint, FetchError, Location, WeatherClient, WeatherSnapshot};

/// Where a returned snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Served from the cache without network activity
    Cache,
    /// Fetched from the API during this call
    Network,
}

/// A snapshot together with its origin
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub snapshot: WeatherSnapshot,
    pub source: Source,
}

/// Fetch orchestrator with a per-session cache
#[derive(Debug)]
pub struct WeatherService {
    client: WeatherClient,
    cache: WeatherCache<WeatherSnapshot>,
}

impl WeatherService {
    /// Create a service with the default cache expiry
    pub fn new(client: WeatherClient) -> Self {
        Self {
            client,
            cache: WeatherCache::new(),
        }
    }

    /// Create a service whose cached snapshots live for `expiry`
    pub fn with_cache_expiry(client: WeatherClient, expiry: Duration) -> Self {
        Self {
            client,
            cache: WeatherCache::with_expiry(expiry),
        }
    }

    pub fn cache(&self) -> &WeatherCache<WeatherSnapshot> {
        &self.cache
    }

    /// Fetch weather for `location`, preferring a valid cached snapshot
    ///
    /// The forecast request is only issued once the current-weather request
    /// has succeeded. A failed forecast leaves `forecast` empty instead of
    /// failing the whole fetch.
    ///
    /// # Returns
    /// * `Ok(Fetched)` - The snapshot and whether it came from the cache
    /// * `Err(FetchError)` - The current-weather request failed
    pub async fn fetch(&mut self, location: &Location) -> Result<Fetched, FetchError> {
        let cache_key = location.cache_key();

        if let Some(snapshot) = self.cache.get(&cache_key) {
            info!(key = %cache_key, "using cached weather data");
            return Ok(Fetched {
                snapshot: snapshot.clone(),
                source: Source::Cache,
            });
        }

        debug!(key = %cache_key, "cache miss");

        let current = self
            .client
            .fetch(location, Endpoint::Current)
            .await
            .inspect_err(|e| warn!(%location, error = %e, "current weather request failed"))?;

        let forecast = match self.client.fetch(location, Endpoint::Forecast).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!(
                    %location,
                    error = %e,
                    "forecast unavailable, continuing with current weather only"
                );
                None
            }
        };

        let snapshot = WeatherSnapshot {
            current,
            forecast,
            fetched_at: Utc::now(),
        };

        self.cache.set(cache_key, snapshot.clone());

        Ok(Fetched {
            snapshot,
            source: Source::Network,
        })
    }

    /// Drop expired snapshots from the cache
    pub fn sweep_cache(&mut self) -> usize {
        let removed = self.cache.clear_expired();
        if removed > 0 {
            debug!(removed, "swept expired cache entries");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::LocationKind;
    use serde_json::json;
    use std::time::Duration as StdDuration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> WeatherService {
        let client =
            WeatherClient::with_base_url("test_api_key", server.uri(), StdDuration::from_millis(500))
                .unwrap();
        WeatherService::new(client)
    }

    fn delhi() -> Location {
        Location::new(LocationKind::City, "Delhi")
    }

    async fn mount(server: &MockServer, endpoint: &str, response: ResponseTemplate, times: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/{}", endpoint)))
            .respond_with(response)
            .expect(times)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_combines_current_and_forecast() {
        let server = MockServer::start().await;
        mount(
            &server,
            "weather",
            ResponseTemplate::new(200).set_body_json(json!({"name": "Delhi", "main": {"temp": 25}})),
            1,
        )
        .await;
        mount(
            &server,
            "forecast",
            ResponseTemplate::new(200).set_body_json(json!({"list": []})),
            1,
        )
        .await;

        let mut service = service_for(&server);
        let before = Utc::now();
        let fetched = service.fetch(&delhi()).await.unwrap();
        let after = Utc::now();

        assert_eq!(fetched.source, Source::Network);
        assert_eq!(fetched.snapshot.current["name"], "Delhi");
        assert_eq!(fetched.snapshot.forecast, Some(json!({"list": []})));
        assert!(fetched.snapshot.fetched_at >= before);
        assert!(fetched.snapshot.fetched_at <= after);
        assert_eq!(service.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let server = MockServer::start().await;
        mount(
            &server,
            "weather",
            ResponseTemplate::new(200).set_body_json(json!({"name": "Delhi"})),
            1,
        )
        .await;
        mount(
            &server,
            "forecast",
            ResponseTemplate::new(200).set_body_json(json!({"list": []})),
            1,
        )
        .await;

        let mut service = service_for(&server);
        let first = service.fetch(&delhi()).await.unwrap();
        let second = service.fetch(&delhi()).await.unwrap();

        assert_eq!(second.source, Source::Cache);
        assert_eq!(first.snapshot, second.snapshot);
        // Mock expectations (one call each) are verified when the server drops
    }

    #[tokio::test]
    async fn test_pincode_and_city_are_cached_separately() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("zip", "110001,IN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Connaught Place"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Delhi,IN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Delhi"})))
            .expect(1)
            .mount(&server)
            .await;
        mount(
            &server,
            "forecast",
            ResponseTemplate::new(200).set_body_json(json!({"list": []})),
            2,
        )
        .await;

        let mut service = service_for(&server);
        let pin = service
            .fetch(&Location::new(LocationKind::Pincode, "110001"))
            .await
            .unwrap();
        let city = service.fetch(&delhi()).await.unwrap();

        assert_eq!(pin.snapshot.current["name"], "Connaught Place");
        assert_eq!(city.snapshot.current["name"], "Delhi");
        assert_eq!(service.cache().len(), 2);
    }

    #[tokio::test]
    async fn test_not_found_skips_forecast_and_cache() {
        let server = MockServer::start().await;
        mount(&server, "weather", ResponseTemplate::new(404), 1).await;
        mount(&server, "forecast", ResponseTemplate::new(200), 0).await;

        let mut service = service_for(&server);
        let result = service.fetch(&delhi()).await;

        assert!(matches!(result, Err(FetchError::NotFound)));
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start().await;
        mount(&server, "weather", ResponseTemplate::new(401), 1).await;
        mount(&server, "forecast", ResponseTemplate::new(200), 0).await;

        let mut service = service_for(&server);
        let result = service.fetch(&delhi()).await;

        assert!(matches!(result, Err(FetchError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_other_status_is_api_error() {
        let server = MockServer::start().await;
        mount(&server, "weather", ResponseTemplate::new(500), 1).await;

        let mut service = service_for(&server);
        let result = service.fetch(&delhi()).await;

        match result {
            Err(FetchError::Api(status)) => assert_eq!(status.as_u16(), 500),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let server = MockServer::start().await;
        mount(
            &server,
            "weather",
            ResponseTemplate::new(200)
                .set_body_json(json!({"name": "Delhi"}))
                .set_delay(StdDuration::from_secs(2)),
            1,
        )
        .await;

        let mut service = service_for(&server);
        let result = service.fetch(&delhi()).await;

        assert!(matches!(result, Err(FetchError::Timeout)), "got {:?}", result);
        assert!(service.cache().is_empty());
    }

    #[tokio::test]
    async fn test_forecast_failure_degrades_to_current_only() {
        let server = MockServer::start().await;
        mount(
            &server,
            "weather",
            ResponseTemplate::new(200).set_body_json(json!({"name": "Mumbai"})),
            1,
        )
        .await;
        mount(&server, "forecast", ResponseTemplate::new(503), 1).await;

        let mut service = service_for(&server);
        let fetched = service
            .fetch(&Location::new(LocationKind::City, "Mumbai"))
            .await
            .unwrap();

        assert_eq!(fetched.snapshot.current["name"], "Mumbai");
        assert!(fetched.snapshot.forecast.is_none());
        assert_eq!(service.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_forecast_timeout_degrades_to_current_only() {
        let server = MockServer::start().await;
        mount(
            &server,
            "weather",
            ResponseTemplate::new(200).set_body_json(json!({"name": "Chennai"})),
            1,
        )
        .await;
        mount(
            &server,
            "forecast",
            ResponseTemplate::new(200)
                .set_body_json(json!({"list": []}))
                .set_delay(StdDuration::from_secs(2)),
            1,
        )
        .await;

        let mut service = service_for(&server);
        let fetched = service
            .fetch(&Location::new(LocationKind::City, "Chennai"))
            .await
            .unwrap();

        assert_eq!(fetched.source, Source::Network);
        assert_eq!(fetched.snapshot.current["name"], "Chennai");
        assert!(fetched.snapshot.forecast.is_none());
        assert_eq!(service.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_forecast_degrades_to_current_only() {
        let server = MockServer::start().await;
        mount(
            &server,
            "weather",
            ResponseTemplate::new(200).set_body_json(json!({"name": "Hyderabad"})),
            1,
        )
        .await;
        mount(
            &server,
            "forecast",
            ResponseTemplate::new(200).set_body_string("<html>oops</html>"),
            1,
        )
        .await;

        let mut service = service_for(&server);
        let fetched = service
            .fetch(&Location::new(LocationKind::City, "Hyderabad"))
            .await
            .unwrap();

        assert_eq!(fetched.snapshot.current["name"], "Hyderabad");
        assert!(fetched.snapshot.forecast.is_none());
    }

    #[tokio::test]
    async fn test_expired_snapshot_triggers_new_fetch() {
        let server = MockServer::start().await;
        mount(
            &server,
            "weather",
            ResponseTemplate::new(200).set_body_json(json!({"name": "Pune"})),
            2,
        )
        .await;
        mount(
            &server,
            "forecast",
            ResponseTemplate::new(200).set_body_json(json!({"list": []})),
            2,
        )
        .await;

        let client =
            WeatherClient::with_base_url("test_api_key", server.uri(), StdDuration::from_millis(500))
                .unwrap();
        let mut service = WeatherService::with_cache_expiry(client, Duration::milliseconds(20));
        let pune = Location::new(LocationKind::City, "Pune");

        service.fetch(&pune).await.unwrap();
        tokio::time::sleep(StdDuration::from_millis(40)).await;
        let second = service.fetch(&pune).await.unwrap();

        assert_eq!(second.source, Source::Network);
    }

    #[tokio::test]
    async fn test_sweep_cache_removes_expired_snapshots() {
        let server = MockServer::start().await;
        mount(
            &server,
            "weather",
            ResponseTemplate::new(200).set_body_json(json!({"name": "Pune"})),
            1,
        )
        .await;
        mount(
            &server,
            "forecast",
            ResponseTemplate::new(200).set_body_json(json!({"list": []})),
            1,
        )
        .await;

        let client =
            WeatherClient::with_base_url("test_api_key", server.uri(), StdDuration::from_millis(500))
                .unwrap();
        let mut service = WeatherService::with_cache_expiry(client, Duration::milliseconds(20));

        service
            .fetch(&Location::new(LocationKind::City, "Pune"))
            .await
            .unwrap();
        assert_eq!(service.sweep_cache(), 0);

        tokio::time::sleep(StdDuration::from_millis(40)).await;
        assert_eq!(service.sweep_cache(), 1);
        assert!(service.cache().is_empty());
    }
}
