use crate::{
    Config,
    error::SkyError,
    model::{CandidateLocation, Coordinates, ForecastReport},
    provider::openmeteo::OpenMeteoProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openmeteo;

/// Number of candidates requested from the geocoding service per query.
pub const SEARCH_COUNT: usize = 10;

/// Geocoding and forecast lookups behind one seam.
#[async_trait]
pub trait GeoWeatherService: Send + Sync + Debug {
    /// Current conditions for a point, in Fahrenheit and mph, together with
    /// the timezone the service reports for that point.
    async fn forecast(&self, at: Coordinates) -> Result<ForecastReport, SkyError>;

    /// The nearest named place, or `None` when the service knows of none.
    async fn reverse_geocode(&self, at: Coordinates)
    -> Result<Option<CandidateLocation>, SkyError>;

    /// Up to `count` places matching `name`, unfiltered and in service order.
    async fn search(&self, name: &str, count: usize) -> Result<Vec<CandidateLocation>, SkyError>;
}

/// Construct the service from config.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn GeoWeatherService>, SkyError> {
    let provider = OpenMeteoProvider::new(config.endpoints.clone(), config.request_timeout())?;
    Ok(Box::new(provider))
}
