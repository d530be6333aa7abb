//! Core data models for the India weather CLI
//!
//! This module contains the location types, the OpenWeatherMap client, and
//! the snapshot type combining one fetch cycle's current and forecast data.

pub mod location;
pub mod weather;

pub use location::{Location, LocationError, LocationKind};
pub use weather::{Endpoint, FetchError, WeatherClient};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Combined current and forecast data from a single fetch cycle
///
/// The API bodies are kept as untyped JSON; `current_conditions` and
/// `forecast_entries` provide typed views for display.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Body of the current-weather response
    pub current: Value,
    /// Body of the forecast response, if that request succeeded
    pub forecast: Option<Value>,
    /// When this snapshot was fetched
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    /// Typed view of the current-weather body
    ///
    /// Each field that is missing, null or of an unexpected type falls back
    /// to its own default; the others are still read.
    pub fn current_conditions(&self) -> CurrentConditions {
        CurrentConditions::deserialize(&self.current).unwrap_or_default()
    }

    /// Forecast entries, or `None` when no forecast was fetched
    ///
    /// Slots that are not JSON objects are skipped.
    pub fn forecast_entries(&self) -> Option<Vec<ForecastEntry>> {
        let forecast = self.forecast.as_ref()?;
        Some(
            ForecastResponse::deserialize(forecast)
                .map(|response| response.list)
                .unwrap_or_default(),
        )
    }
}

/// Fields of the current-weather body used for display
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub sys: SunInfo,
    #[serde(deserialize_with = "lenient")]
    pub main: Readings,
    /// Visibility in metres
    #[serde(deserialize_with = "lenient")]
    pub visibility: f64,
    #[serde(deserialize_with = "lenient")]
    pub wind: Wind,
    #[serde(deserialize_with = "lenient_list")]
    pub weather: Vec<Condition>,
}

impl CurrentConditions {
    /// First reported condition, if any
    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }
}

/// Country and sun times (unix seconds)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SunInfo {
    #[serde(deserialize_with = "lenient")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub sunrise: i64,
    #[serde(deserialize_with = "lenient")]
    pub sunset: i64,
}

/// Temperature, humidity and pressure readings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Readings {
    /// Temperature in Celsius
    #[serde(deserialize_with = "lenient")]
    pub temp: f64,
    /// Feels-like temperature in Celsius
    #[serde(deserialize_with = "lenient")]
    pub feels_like: f64,
    /// Relative humidity percentage
    #[serde(deserialize_with = "lenient")]
    pub humidity: f64,
    /// Pressure in hPa
    #[serde(deserialize_with = "lenient")]
    pub pressure: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Wind {
    /// Wind speed in m/s
    #[serde(deserialize_with = "lenient")]
    pub speed: f64,
    /// Direction in degrees
    #[serde(deserialize_with = "lenient")]
    pub deg: f64,
}

/// One entry of the `weather` array
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Condition {
    #[serde(deserialize_with = "lenient")]
    pub main: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
}

/// Forecast body: 3-hourly entries
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForecastResponse {
    #[serde(deserialize_with = "lenient_list")]
    pub list: Vec<ForecastEntry>,
}

/// A single 3-hour forecast slot
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForecastEntry {
    /// Slot start in unix seconds
    #[serde(deserialize_with = "lenient")]
    pub dt: i64,
    #[serde(deserialize_with = "lenient")]
    pub main: Readings,
    #[serde(deserialize_with = "lenient_list")]
    pub weather: Vec<Condition>,
    #[serde(deserialize_with = "lenient")]
    pub wind: Wind,
}

impl ForecastEntry {
    pub fn description(&self) -> Option<&str> {
        self.weather.first()?.description.as_deref()
    }
}

/// Deserialize a field, substituting its default when it is null or mistyped
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Deserialize an array, skipping elements that do not parse
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| T::deserialize(item).ok())
        .collect())
}
