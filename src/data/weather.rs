//! OpenWeatherMap API client
//!
//! This module issues the current-weather and forecast requests for a
//! `Location` and classifies every HTTP or transport outcome into a
//! `FetchError`. Response bodies are returned as untyped JSON.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::Location;

/// Base URL for the OpenWeatherMap 2.5 API
pub const OPENWEATHER_BASE_URL: &str = "http://api.openweathermap.org/data/2.5";

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The two API resources queried for every location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Current conditions (`/weather`)
    Current,
    /// 5 day / 3 hour forecast (`/forecast`)
    Forecast,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Current => "weather",
            Endpoint::Forecast => "forecast",
        }
    }
}

/// Errors that can occur when fetching weather data
///
/// The display text of each variant is the message shown to the user.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 404
    #[error("Location not found. Please check the city name or pincode.")]
    NotFound,

    /// HTTP 401
    #[error("Invalid API key. Please check your OpenWeatherMap API key.")]
    Unauthorized,

    /// Any other non-200 status
    #[error("API Error: {}", .0.as_u16())]
    Api(StatusCode),

    /// The request did not complete within the configured timeout
    #[error("Request timeout. Please check your internet connection.")]
    Timeout,

    /// The server could not be reached
    #[error("Connection error. Please check your internet connection.")]
    Connection,

    /// Any other transport-level failure
    #[error("Request error: {0}")]
    Request(reqwest::Error),

    /// The body was not valid JSON
    #[error("Invalid response from weather service.")]
    MalformedResponse(#[from] serde_json::Error),

    /// Anything that does not fit the categories above
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection
        } else {
            FetchError::Request(err)
        }
    }
}

/// Client for the OpenWeatherMap current-weather and forecast endpoints
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    /// Create a client against the public API with the default timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_base_url(
            api_key,
            OPENWEATHER_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a client against a custom base URL
    ///
    /// # Arguments
    /// * `api_key` - OpenWeatherMap API key sent as `appid`
    /// * `base_url` - Base URL without the endpoint path
    /// * `timeout` - Upper bound for each request, including reading the body
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unexpected(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL for `location` on `endpoint`
    ///
    /// e.g. `{base}/weather?q=Delhi,IN&appid={key}&units=metric`
    pub fn build_api_url(&self, location: &Location, endpoint: Endpoint) -> String {
        format!(
            "{}/{}?{}&appid={}&units=metric",
            self.base_url,
            endpoint.path(),
            location.query(),
            self.api_key
        )
    }

    /// Fetch one endpoint for `location` and decode the body as JSON
    ///
    /// # Returns
    /// * `Ok(Value)` - The decoded body of a 200 response
    /// * `Err(FetchError)` - The classified failure
    pub async fn fetch(&self, location: &Location, endpoint: Endpoint) -> Result<Value, FetchError> {
        let url = Url::parse(&self.build_api_url(location, endpoint))
            .map_err(|e| FetchError::Unexpected(format!("invalid request URL: {}", e)))?;

        debug!(endpoint = endpoint.path(), %location, "sending request");

        let response = self.client.get(url).send().await?;
        check_status(response.status())?;

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;

        Ok(body)
    }
}

/// Map a response status to the matching error, if any
pub fn check_status(status: StatusCode) -> Result<(), FetchError> {
    match status {
        StatusCode::OK => Ok(()),
        StatusCode::NOT_FOUND => Err(FetchError::NotFound),
        StatusCode::UNAUTHORIZED => Err(FetchError::Unauthorized),
        other => Err(FetchError::Api(other)),
    }
}
