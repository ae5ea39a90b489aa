//! Three-tier weather resolution: fast cache, durable cache, upstream API.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use super::cache::{DurableCache, FastCache};
use super::upstream::WeatherUpstream;
use crate::{
    error::AppResult,
    models::weather::{Fingerprint, WeatherReport},
};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Where a resolution was satisfied
#[derive(Debug, Clone, PartialEq)]
enum Lookup {
    FastHit(WeatherReport),
    DurableHit(WeatherReport),
    Upstream,
}

#[derive(Clone)]
pub struct WeatherResolver {
    fast: Arc<dyn FastCache>,
    durable: Arc<dyn DurableCache>,
    upstream: Arc<dyn WeatherUpstream>,
    fast_ttl: Duration,
    freshness: Duration,
}

impl WeatherResolver {
    /// `fast_ttl` is the expiry given to fast-cache writes; `freshness` is how
    /// old a durable object may be before it counts as a miss.
    pub fn new(
        fast: Arc<dyn FastCache>,
        durable: Arc<dyn DurableCache>,
        upstream: Arc<dyn WeatherUpstream>,
        fast_ttl: Duration,
        freshness: Duration,
    ) -> Self {
        Self {
            fast,
            durable,
            upstream,
            fast_ttl,
            freshness,
        }
    }

    /// Current weather for a coordinate pair.
    ///
    /// Cache reads that fail with anything but a miss are returned as errors.
    /// An upstream non-success status produces `WeatherReport::Unavailable`,
    /// which is never cached.
    pub async fn resolve(&self, latitude: f64, longitude: f64) -> AppResult<WeatherReport> {
        let fingerprint = Fingerprint::new(latitude, longitude);

        match self.lookup(&fingerprint).await? {
            Lookup::FastHit(report) => {
                tracing::debug!("weather {}: fast cache hit", fingerprint);
                Ok(report)
            }
            Lookup::DurableHit(report) => {
                tracing::debug!("weather {}: durable cache hit", fingerprint);
                self.backfill_fast(&fingerprint, &report).await;
                Ok(report)
            }
            Lookup::Upstream => {
                tracing::debug!("weather {}: cache miss, fetching upstream", fingerprint);
                self.fetch_and_store(&fingerprint, latitude, longitude).await
            }
        }
    }

    async fn lookup(&self, fingerprint: &Fingerprint) -> AppResult<Lookup> {
        if let Some(report) = self.read_fast(fingerprint).await? {
            return Ok(Lookup::FastHit(report));
        }
        if let Some(report) = self.read_durable(fingerprint).await? {
            return Ok(Lookup::DurableHit(report));
        }
        Ok(Lookup::Upstream)
    }

    async fn read_fast(&self, fingerprint: &Fingerprint) -> AppResult<Option<WeatherReport>> {
        let key = fingerprint.fast_key();
        let Some(raw) = self.fast.get(&key).await? else {
            return Ok(None);
        };
        Ok(decode_cached(&key, raw.as_bytes()))
    }

    async fn read_durable(&self, fingerprint: &Fingerprint) -> AppResult<Option<WeatherReport>> {
        let key = fingerprint.durable_key();
        let Some(entry) = self.durable.get(&key).await? else {
            return Ok(None);
        };

        let age = Utc::now()
            .signed_duration_since(entry.last_modified)
            .to_std()
            // Last write in the future (clock skew) counts as brand new
            .unwrap_or(Duration::ZERO);
        if age > self.freshness {
            tracing::debug!("{} is stale ({}s old)", key, age.as_secs());
            return Ok(None);
        }

        Ok(decode_cached(&key, &entry.body))
    }

    async fn backfill_fast(&self, fingerprint: &Fingerprint, report: &WeatherReport) {
        let key = fingerprint.fast_key();
        match serde_json::to_string(report) {
            Ok(json) => {
                if let Err(e) = self.fast.set(&key, &json, self.fast_ttl).await {
                    tracing::warn!("Failed to backfill {}: {}", key, e);
                }
            }
            Err(e) => tracing::warn!("Failed to encode weather for {}: {}", key, e),
        }
    }

    async fn fetch_and_store(
        &self,
        fingerprint: &Fingerprint,
        latitude: f64,
        longitude: f64,
    ) -> AppResult<WeatherReport> {
        let report = self.upstream.fetch(latitude, longitude).await?;
        if !report.is_cacheable() {
            return Ok(report);
        }

        let json = match serde_json::to_string(&report) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to encode weather for {}: {}", fingerprint, e);
                return Ok(report);
            }
        };

        let durable_key = fingerprint.durable_key();
        let fast_key = fingerprint.fast_key();
        let (durable, fast) = tokio::join!(
            self.durable.put(&durable_key, json.clone().into_bytes(), JSON_CONTENT_TYPE),
            self.fast.set(&fast_key, &json, self.fast_ttl),
        );
        if let Err(e) = durable {
            tracing::warn!("Failed to write {}: {}", durable_key, e);
        }
        if let Err(e) = fast {
            tracing::warn!("Failed to write {}: {}", fast_key, e);
        }

        Ok(report)
    }
}

/// Decode a cached blob; undecodable or non-weather values count as a miss
fn decode_cached(key: &str, raw: &[u8]) -> Option<WeatherReport> {
    match serde_json::from_slice::<WeatherReport>(raw) {
        Ok(report) if report.is_cacheable() => Some(report),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Ignoring undecodable cache entry {}: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::weather::CurrentWeather;
    use crate::services::weather::cache::{MemoryCache, MemoryObjectStore, MockFastCache};
    use crate::services::weather::upstream::MockWeatherUpstream;
    use tokio_test::{assert_err, assert_ok};

    const TTL: Duration = Duration::from_secs(900);
    const FRESHNESS: Duration = Duration::from_secs(300);

    fn sunny() -> WeatherReport {
        WeatherReport::Current(CurrentWeather {
            temperature: Some(24.0),
            feels_like: Some(25.0),
            description: Some("clear sky".to_string()),
            humidity: Some(30.0),
            wind_speed: Some(2.0),
        })
    }

    fn resolver(
        fast: &MemoryCache,
        durable: &MemoryObjectStore,
        upstream: MockWeatherUpstream,
    ) -> WeatherResolver {
        WeatherResolver::new(
            Arc::new(fast.clone()),
            Arc::new(durable.clone()),
            Arc::new(upstream),
            TTL,
            FRESHNESS,
        )
    }

    #[tokio::test]
    async fn test_cold_path_fills_both_tiers() {
        let fast = MemoryCache::new();
        let durable = MemoryObjectStore::new();
        let mut upstream = MockWeatherUpstream::new();
        upstream
            .expect_fetch()
            .withf(|lat, lon| *lat == 50.45 && *lon == 30.52)
            .times(1)
            .returning(|_, _| Ok(sunny()));
        let resolver = resolver(&fast, &durable, upstream);

        let report = assert_ok!(resolver.resolve(50.45, 30.52).await);
        assert_eq!(report, sunny());

        let fp = Fingerprint::new(50.45, 30.52);
        let cached = fast.get(&fp.fast_key()).await.unwrap().unwrap();
        assert_eq!(serde_json::from_str::<WeatherReport>(&cached).unwrap(), sunny());
        let stored = durable.get(&fp.durable_key()).await.unwrap().unwrap();
        assert_eq!(serde_json::from_slice::<WeatherReport>(&stored.body).unwrap(), sunny());
    }

    #[tokio::test]
    async fn test_second_call_hits_fast_cache() {
        let fast = MemoryCache::new();
        let durable = MemoryObjectStore::new();
        let mut upstream = MockWeatherUpstream::new();
        upstream.expect_fetch().times(1).returning(|_, _| Ok(sunny()));
        let resolver = resolver(&fast, &durable, upstream);

        assert_ok!(resolver.resolve(10.0, 20.0).await);
        // Same fingerprint after rounding
        assert_eq!(assert_ok!(resolver.resolve(10.00001, 20.00001).await), sunny());
    }

    #[tokio::test]
    async fn test_fresh_durable_entry_is_used_and_backfilled() {
        let fast = MemoryCache::new();
        let durable = MemoryObjectStore::new();
        let fp = Fingerprint::new(1.0, 2.0);
        durable
            .put_at(
                &fp.durable_key(),
                serde_json::to_vec(&sunny()).unwrap(),
                Utc::now() - chrono::Duration::minutes(2),
            )
            .await;
        let mut upstream = MockWeatherUpstream::new();
        upstream.expect_fetch().never();
        let resolver = resolver(&fast, &durable, upstream);

        assert_eq!(assert_ok!(resolver.resolve(1.0, 2.0).await), sunny());
        assert!(fast.get(&fp.fast_key()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_stale_durable_entry_is_refetched() {
        let fast = MemoryCache::new();
        let durable = MemoryObjectStore::new();
        let fp = Fingerprint::new(1.0, 2.0);
        let stale = WeatherReport::Current(CurrentWeather {
            temperature: Some(-5.0),
            ..Default::default()
        });
        durable
            .put_at(
                &fp.durable_key(),
                serde_json::to_vec(&stale).unwrap(),
                Utc::now() - chrono::Duration::minutes(6),
            )
            .await;
        let mut upstream = MockWeatherUpstream::new();
        upstream.expect_fetch().times(1).returning(|_, _| Ok(sunny()));
        let resolver = resolver(&fast, &durable, upstream);

        assert_eq!(assert_ok!(resolver.resolve(1.0, 2.0).await), sunny());
        let refreshed = durable.get(&fp.durable_key()).await.unwrap().unwrap();
        assert_eq!(serde_json::from_slice::<WeatherReport>(&refreshed.body).unwrap(), sunny());
    }

    #[tokio::test]
    async fn test_upstream_error_is_returned_but_not_cached() {
        let fast = MemoryCache::new();
        let durable = MemoryObjectStore::new();
        let mut upstream = MockWeatherUpstream::new();
        upstream.expect_fetch().times(2).returning(|_, _| {
            Ok(WeatherReport::Unavailable {
                error: "Weather API error: 429".to_string(),
            })
        });
        let resolver = resolver(&fast, &durable, upstream);

        for _ in 0..2 {
            let report = assert_ok!(resolver.resolve(3.0, 4.0).await);
            assert!(!report.is_cacheable());
        }
        let fp = Fingerprint::new(3.0, 4.0);
        assert!(fast.get(&fp.fast_key()).await.unwrap().is_none());
        assert!(!durable.contains(&fp.durable_key()).await);
    }

    #[tokio::test]
    async fn test_fast_cache_failure_is_fatal() {
        let mut fast = MockFastCache::new();
        fast.expect_get()
            .returning(|_| Err(AppError::Cache("connection refused".to_string())));
        let mut upstream = MockWeatherUpstream::new();
        upstream.expect_fetch().never();
        let resolver = WeatherResolver::new(
            Arc::new(fast),
            Arc::new(MemoryObjectStore::new()),
            Arc::new(upstream),
            TTL,
            FRESHNESS,
        );

        let err = assert_err!(resolver.resolve(1.0, 1.0).await);
        assert!(matches!(err, AppError::Cache(_)));
    }

    #[tokio::test]
    async fn test_fast_write_failure_does_not_block_durable_write() {
        let mut fast = MockFastCache::new();
        fast.expect_get().returning(|_| Ok(None));
        fast.expect_set()
            .times(1)
            .returning(|_, _, _| Err(AppError::Cache("read-only replica".to_string())));
        let durable = MemoryObjectStore::new();
        let mut upstream = MockWeatherUpstream::new();
        upstream.expect_fetch().times(1).returning(|_, _| Ok(sunny()));
        let resolver = WeatherResolver::new(
            Arc::new(fast),
            Arc::new(durable.clone()),
            Arc::new(upstream),
            TTL,
            FRESHNESS,
        );

        assert_eq!(assert_ok!(resolver.resolve(7.0, 8.0).await), sunny());
        assert!(durable.contains(&Fingerprint::new(7.0, 8.0).durable_key()).await);
    }

    #[test]
    fn test_decode_cached_rejects_garbage() {
        assert_eq!(decode_cached("k", b"not json"), None);
        assert_eq!(decode_cached("k", br#"{"error":"Weather API error: 500"}"#), None);
        assert_eq!(
            decode_cached("k", &serde_json::to_vec(&sunny()).unwrap()),
            Some(sunny())
        );
    }
}
