use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    config::Endpoints,
    error::SkyError,
    model::{CandidateLocation, Condition, Coordinates, ForecastReport, WeatherState},
};

use super::GeoWeatherService;

/// Open-Meteo forecast and geocoding APIs. No API key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    endpoints: Endpoints,
    timeout: Duration,
    http: Client,
}

impl OpenMeteoProvider {
    pub fn new(endpoints: Endpoints, timeout: Duration) -> Result<Self, SkyError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SkyError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoints,
            timeout,
            http,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, SkyError> {
        tracing::debug!(url, ?query, "Open-Meteo request");

        let res = self.http.get(url).query(query).send().await.map_err(|e| {
            if e.is_timeout() {
                SkyError::Timeout(self.timeout)
            } else {
                SkyError::Network(format!("Failed to send request to {url}: {e}"))
            }
        })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| SkyError::Network(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(SkyError::Network(format!(
                "Request to {url} failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| SkyError::UpstreamData(format!("Failed to parse JSON from {url}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: i64,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    current_weather: Option<OmCurrentWeather>,
    timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    #[serde(default)]
    results: Vec<CandidateLocation>,
}

#[async_trait]
impl GeoWeatherService for OpenMeteoProvider {
    async fn forecast(&self, at: Coordinates) -> Result<ForecastReport, SkyError> {
        let parsed: OmForecastResponse = self
            .get_json(
                &self.endpoints.forecast,
                &[
                    ("latitude", at.latitude.to_string()),
                    ("longitude", at.longitude.to_string()),
                    ("current_weather", "true".to_string()),
                    ("temperature_unit", "fahrenheit".to_string()),
                    ("windspeed_unit", "mph".to_string()),
                    ("timezone", "auto".to_string()),
                ],
            )
            .await?;

        let current = parsed.current_weather.ok_or_else(|| {
            SkyError::UpstreamData("No current_weather returned from Open-Meteo".to_string())
        })?;

        let weather = WeatherState::new(
            Condition::from_wmo_code(current.weathercode),
            current.temperature.round() as i32,
            current.windspeed.round() as i32,
        );

        Ok(ForecastReport {
            weather,
            timezone: parsed.timezone.filter(|tz| !tz.is_empty()),
        })
    }

    async fn reverse_geocode(
        &self,
        at: Coordinates,
    ) -> Result<Option<CandidateLocation>, SkyError> {
        let parsed: OmGeocodingResponse = self
            .get_json(
                &self.endpoints.reverse,
                &[
                    ("latitude", at.latitude.to_string()),
                    ("longitude", at.longitude.to_string()),
                    ("count", "1".to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        Ok(parsed.results.into_iter().next())
    }

    async fn search(&self, name: &str, count: usize) -> Result<Vec<CandidateLocation>, SkyError> {
        let parsed: OmGeocodingResponse = self
            .get_json(
                &self.endpoints.search,
                &[
                    ("name", name.to_string()),
                    ("count", count.to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        Ok(parsed.results)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
