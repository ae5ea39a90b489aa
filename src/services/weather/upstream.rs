//! OpenWeatherMap current-conditions client

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::WeatherConfig,
    error::{AppError, AppResult},
    models::weather::{CurrentWeather, WeatherReport},
};

/// Source of live weather for a single coordinate pair.
///
/// A non-success HTTP status is not an error: it yields
/// [`WeatherReport::Unavailable`]. Transport failures (DNS, timeout,
/// malformed body) are returned as [`AppError::Upstream`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WeatherUpstream: Send + Sync {
    async fn fetch(&self, latitude: f64, longitude: f64) -> AppResult<WeatherReport>;
}

#[derive(Debug, Default, Deserialize)]
struct OwmPayload {
    #[serde(default)]
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
    #[serde(default)]
    wind: OwmWind,
}

#[derive(Debug, Default, Deserialize)]
struct OwmMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmCondition {
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OwmWind {
    speed: Option<f64>,
}

impl From<OwmPayload> for CurrentWeather {
    fn from(payload: OwmPayload) -> Self {
        CurrentWeather {
            temperature: payload.main.temp,
            feels_like: payload.main.feels_like,
            description: payload.weather.into_iter().next().and_then(|c| c.description),
            humidity: payload.main.humidity,
            wind_speed: payload.wind.speed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("locus-server/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build weather HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl WeatherUpstream for OpenWeatherClient {
    async fn fetch(&self, latitude: f64, longitude: f64) -> AppResult<WeatherReport> {
        tracing::debug!("Fetching weather for ({}, {})", latitude, longitude);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            // The request URL carries the API key
            .map_err(|e| {
                AppError::Upstream(format!(
                    "Weather request for ({latitude},{longitude}) failed: {}",
                    e.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Weather API returned {} for ({}, {})", status, latitude, longitude);
            return Ok(WeatherReport::Unavailable {
                error: format!("Weather API error: {}", status.as_u16()),
            });
        }

        let payload: OwmPayload = response
            .json()
            .await
            .map_err(|e| {
                AppError::Upstream(format!(
                    "Invalid weather payload for ({latitude},{longitude}): {}",
                    e.without_url()
                ))
            })?;

        Ok(WeatherReport::Current(payload.into()))
    }
}
