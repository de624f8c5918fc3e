//! Core library for the `skyclock` terminal sky.
//!
//! This crate defines:
//! - Configuration handling
//! - Location and weather resolution over geocoding/forecast services
//! - Debounced type-ahead suggestions
//! - The time-and-weather to sky-state mapping
//!
//! It is used by `skyclock-cli`, but can also drive other front ends.

pub mod config;
pub mod debounce;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod sky;
pub mod state;

pub use config::{Config, Endpoints};
pub use debounce::{Debouncer, SuggestionFeed};
pub use error::SkyError;
pub use geolocation::{FixedGeolocator, Geolocator, IpGeolocator};
pub use model::{CandidateLocation, Condition, Coordinates, Location, WeatherState};
pub use provider::GeoWeatherService;
pub use resolver::Resolver;
pub use sky::{SkyFrame, SkyRenderer, Viewport};
pub use state::{AppState, StateHandle};
