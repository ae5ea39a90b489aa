//! Weather records attached to locations

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current conditions in metric units
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct CurrentWeather {
    /// Temperature (°C)
    pub temperature: Option<f64>,
    /// Perceived temperature (°C)
    pub feels_like: Option<f64>,
    pub description: Option<String>,
    /// Relative humidity (%)
    pub humidity: Option<f64>,
    /// Wind speed (m/s)
    pub wind_speed: Option<f64>,
}

/// Weather attached to a location: either current conditions or the reason
/// the upstream could not provide them.
///
/// Only `Current` values are ever written to a cache tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum WeatherReport {
    // Tried first when decoding: every field of `CurrentWeather` is optional
    // and would otherwise swallow the error shape.
    Unavailable { error: String },
    Current(CurrentWeather),
}

impl WeatherReport {
    pub fn is_cacheable(&self) -> bool {
        matches!(self, WeatherReport::Current(_))
    }
}

/// Records that can be enriched with weather for their position
pub trait HasCoordinates {
    /// (latitude, longitude) in decimal degrees
    fn coordinates(&self) -> (f64, f64);
}

/// Cache key component for a coordinate pair: both values rounded to four
/// decimals and joined with `_`, e.g. `12.3450_-98.7650`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self(format!("{:.4}_{:.4}", latitude, longitude))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key in the fast (key-value) cache
    pub fn fast_key(&self) -> String {
        format!("weather:{}", self.0)
    }

    /// Object key in the durable (object storage) cache
    pub fn durable_key(&self) -> String {
        format!("weather_cache/{}", self.0)
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_format() {
        let fp = Fingerprint::new(12.345, -98.765);
        assert_eq!(fp.as_str(), "12.3450_-98.7650");
        assert_eq!(fp.fast_key(), "weather:12.3450_-98.7650");
        assert_eq!(fp.durable_key(), "weather_cache/12.3450_-98.7650");
    }

    #[test]
    fn test_fingerprint_rounds_to_four_decimals() {
        assert_eq!(
            Fingerprint::new(50.123456, 30.654321),
            Fingerprint::new(50.12346, 30.65432)
        );
        assert_ne!(Fingerprint::new(50.1234, 30.0), Fingerprint::new(50.1235, 30.0));
    }

    #[test]
    fn test_report_json_shapes() {
        let current = WeatherReport::Current(CurrentWeather {
            temperature: Some(21.5),
            feels_like: Some(20.9),
            description: Some("clear sky".to_string()),
            humidity: Some(40.0),
            wind_speed: Some(3.1),
        });
        let json = serde_json::to_value(&current).unwrap();
        assert_eq!(json["temperature"], 21.5);
        assert_eq!(json["description"], "clear sky");
        assert_eq!(serde_json::from_value::<WeatherReport>(json).unwrap(), current);

        let failed: WeatherReport =
            serde_json::from_str(r#"{"error":"Weather API error: 401"}"#).unwrap();
        assert!(!failed.is_cacheable());
        assert_eq!(
            failed,
            WeatherReport::Unavailable {
                error: "Weather API error: 401".to_string()
            }
        );
    }
}
