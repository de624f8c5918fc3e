//! One-shot device position lookups.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::{error::SkyError, model::Coordinates};

/// Yields the device position once per call, or an error.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, SkyError>;
}

/// Coordinates supplied up front, e.g. on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator(pub Coordinates);

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn locate(&self) -> Result<Coordinates, SkyError> {
        Ok(self.0)
    }
}

/// Approximate position from the public IP address (ip-api.com format).
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SkyError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SkyError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
        })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, SkyError> {
        let res = self.http.get(&self.url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(SkyError::Geolocation(format!(
                "IP geolocation failed with status {status}"
            )));
        }

        let body: IpApiResponse = res.json().await?;
        if body.status != "success" {
            return Err(SkyError::Geolocation(
                body.message.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(SkyError::UpstreamData(
                "IP geolocation response had no coordinates".to_string(),
            )),
        }
    }
}
