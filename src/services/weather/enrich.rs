//! Concurrent weather enrichment of result pages

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use super::resolver::WeatherResolver;
use crate::{
    error::AppResult,
    models::weather::{HasCoordinates, WeatherReport},
};

/// A record with its weather attached as an extra `weather` field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enriched<T> {
    #[serde(flatten)]
    pub record: T,
    pub weather: WeatherReport,
}

impl WeatherResolver {
    /// Resolve weather for every record concurrently.
    ///
    /// Output order matches input order regardless of completion order. The
    /// first resolution error fails the whole batch.
    pub async fn enrich<T: HasCoordinates>(&self, records: Vec<T>) -> AppResult<Vec<Enriched<T>>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let reports = try_join_all(records.iter().map(|record| {
            let (latitude, longitude) = record.coordinates();
            self.resolve(latitude, longitude)
        }))
        .await?;

        Ok(records
            .into_iter()
            .zip(reports)
            .map(|(record, weather)| Enriched { record, weather })
            .collect())
    }

    /// Enrich a single record
    pub async fn enrich_one<T: HasCoordinates>(&self, record: T) -> AppResult<Enriched<T>> {
        let (latitude, longitude) = record.coordinates();
        let weather = self.resolve(latitude, longitude).await?;
        Ok(Enriched { record, weather })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::weather::CurrentWeather;
    use crate::services::weather::cache::{MemoryCache, MemoryObjectStore, MockFastCache};
    use crate::services::weather::upstream::{MockWeatherUpstream, WeatherUpstream};

    #[derive(Debug, Clone, Serialize, PartialEq)]
    struct Spot {
        name: &'static str,
        lat: f64,
        lon: f64,
    }

    impl HasCoordinates for Spot {
        fn coordinates(&self) -> (f64, f64) {
            (self.lat, self.lon)
        }
    }

    /// Upstream whose latency is the latitude in milliseconds; reports the
    /// latitude as the temperature.
    struct SlowUpstream {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherUpstream for SlowUpstream {
        async fn fetch(&self, latitude: f64, _longitude: f64) -> AppResult<WeatherReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(latitude as u64)).await;
            Ok(WeatherReport::Current(CurrentWeather {
                temperature: Some(latitude),
                ..Default::default()
            }))
        }
    }

    fn spot(name: &'static str, lat: f64) -> Spot {
        Spot { name, lat, lon: 0.0 }
    }

    fn temperature(report: &WeatherReport) -> Option<f64> {
        match report {
            WeatherReport::Current(current) => current.temperature,
            WeatherReport::Unavailable { .. } => None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_enrich_preserves_input_order() {
        let upstream = Arc::new(SlowUpstream {
            calls: AtomicUsize::new(0),
        });
        let resolver = WeatherResolver::new(
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryObjectStore::new()),
            upstream.clone(),
            Duration::from_secs(900),
            Duration::from_secs(300),
        );
        // Slowest first so completion order is the reverse of input order
        let spots = vec![spot("a", 80.0), spot("b", 40.0), spot("c", 20.0), spot("d", 10.0)];

        let start = tokio::time::Instant::now();
        let enriched = resolver.enrich(spots.clone()).await.unwrap();

        let names: Vec<_> = enriched.iter().map(|e| e.record.name).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
        for (e, s) in enriched.iter().zip(&spots) {
            assert_eq!(temperature(&e.weather), Some(s.lat));
        }
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 4);
        // Concurrent: total time is the slowest call, not the sum
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_enrich_fails_fast_on_cache_error() {
        let mut fast = MockFastCache::new();
        fast.expect_get().returning(|key| {
            if key.starts_with("weather:13.0000") {
                Err(AppError::Cache("connection reset".to_string()))
            } else {
                Ok(None)
            }
        });
        fast.expect_set().returning(|_, _, _| Ok(()));
        let mut upstream = MockWeatherUpstream::new();
        upstream
            .expect_fetch()
            .returning(|_, _| Ok(WeatherReport::Current(CurrentWeather::default())));
        let resolver = WeatherResolver::new(
            Arc::new(fast),
            Arc::new(MemoryObjectStore::new()),
            Arc::new(upstream),
            Duration::from_secs(900),
            Duration::from_secs(300),
        );

        let result = resolver
            .enrich(vec![spot("ok", 12.0), spot("bad", 13.0), spot("ok2", 14.0)])
            .await;
        assert!(matches!(result, Err(AppError::Cache(_))));
    }

    #[tokio::test]
    async fn test_enrich_empty_page() {
        let mut upstream = MockWeatherUpstream::new();
        upstream.expect_fetch().never();
        let resolver = WeatherResolver::new(
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryObjectStore::new()),
            Arc::new(upstream),
            Duration::from_secs(900),
            Duration::from_secs(300),
        );
        let enriched = resolver.enrich(Vec::<Spot>::new()).await.unwrap();
        assert!(enriched.is_empty());
    }

    #[test]
    fn test_enriched_serializes_flat() {
        let enriched = Enriched {
            record: spot("park", 1.0),
            weather: WeatherReport::Unavailable {
                error: "Weather API error: 503".to_string(),
            },
        };
        let json = serde_json::to_value(&enriched).unwrap();
        assert_eq!(json["name"], "park");
        assert_eq!(json["weather"]["error"], "Weather API error: 503");
    }
}
