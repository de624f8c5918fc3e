//! Location and weather resolution.
//!
//! Turns a device position, a typed query, or a picked suggestion into a
//! committed [`Location`] plus [`WeatherState`]. Forecast failures are
//! absorbed into a clear-sky default; everything else comes back as a
//! [`SkyError`] with state left untouched.

use std::{future::Future, sync::Arc, time::Duration};

use crate::{
    Config,
    error::SkyError,
    geolocation::{Geolocator, IpGeolocator},
    model::{CandidateLocation, Coordinates, ForecastReport, Location, WeatherState},
    provider::{GeoWeatherService, SEARCH_COUNT, provider_from_config},
    state::StateHandle,
};

/// Queries shorter than this never reach the geocoding service.
pub const MIN_SUGGESTION_CHARS: usize = 2;
/// Suggestions shown after filtering.
pub const MAX_SUGGESTIONS: usize = 5;
/// Name used when reverse geocoding itself fails.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone)]
pub struct Resolver {
    service: Arc<dyn GeoWeatherService>,
    geolocator: Arc<dyn Geolocator>,
    state: StateHandle,
    timeout: Duration,
}

impl Resolver {
    pub fn new(
        service: Arc<dyn GeoWeatherService>,
        geolocator: Arc<dyn Geolocator>,
        state: StateHandle,
        timeout: Duration,
    ) -> Self {
        Self {
            service,
            geolocator,
            state,
            timeout,
        }
    }

    /// Open-Meteo plus IP geolocation, as configured.
    pub fn from_config(config: &Config, state: StateHandle) -> Result<Self, SkyError> {
        let service = provider_from_config(config)?;
        let geolocator =
            IpGeolocator::new(&config.endpoints.ip_geolocation, config.request_timeout())?;

        Ok(Self::new(
            Arc::from(service),
            Arc::new(geolocator),
            state,
            config.request_timeout(),
        ))
    }

    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = geolocator;
        self
    }

    pub fn state(&self) -> &StateHandle {
        &self.state
    }

    async fn bounded<T, F>(&self, request: F) -> Result<T, SkyError>
    where
        F: Future<Output = Result<T, SkyError>>,
    {
        tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| SkyError::Timeout(self.timeout))?
    }

    /// Startup: a saved default location if there is one, device position otherwise.
    pub async fn resolve_startup(
        &self,
        default_location: Option<&CandidateLocation>,
    ) -> Result<Location, SkyError> {
        match default_location {
            Some(candidate) => self.select(candidate).await,
            None => self.resolve_current_position().await,
        }
    }

    /// Device position → place name → forecast, committed together.
    ///
    /// Fails only when the position itself is unavailable; in that case
    /// nothing is committed.
    pub async fn resolve_current_position(&self) -> Result<Location, SkyError> {
        let at = self
            .bounded(self.geolocator.locate())
            .await
            .map_err(|e| match e {
                SkyError::Geolocation(_) => e,
                other => SkyError::Geolocation(other.to_string()),
            })?;

        let display_name = self.reverse_geocode(at).await;
        let report = self.forecast_or_default(at).await;

        let location = Location {
            coordinates: at,
            display_name,
            timezone: report.timezone,
        };
        self.state.commit(location.clone(), report.weather).await;
        tracing::info!(location = %location.display_name, "Resolved current position");

        Ok(location)
    }

    /// Name for a point. Never fails: zero results give a coordinate label,
    /// a failed request gives [`UNKNOWN_LOCATION`].
    pub async fn reverse_geocode(&self, at: Coordinates) -> String {
        match self.bounded(self.service.reverse_geocode(at)).await {
            Ok(Some(place)) if place.name.as_deref().is_some_and(|n| !n.is_empty()) => {
                place.display_name()
            }
            Ok(_) => {
                let fallback = at.to_display_name();
                tracing::warn!(location = %fallback, "No place found, using coordinates");
                fallback
            }
            Err(e) => {
                tracing::warn!(error = %e, "Reverse geocode failed");
                UNKNOWN_LOCATION.to_string()
            }
        }
    }

    /// Forecast for a point. Failures are logged and replaced by the
    /// clear-sky default, carrying over the last known temperature.
    pub async fn forecast_or_default(&self, at: Coordinates) -> ForecastReport {
        match self.bounded(self.service.forecast(at)).await {
            Ok(report) => {
                tracing::info!(
                    condition = %report.weather.condition,
                    temperature_f = ?report.weather.temperature_f,
                    wind_mph = report.weather.wind_speed_mph,
                    timezone = ?report.timezone,
                    "Weather fetched"
                );
                report
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch weather, using default clear sky");
                let previous = self.state.snapshot().await.weather;
                ForecastReport {
                    weather: WeatherState::clear_fallback(&previous),
                    timezone: None,
                }
            }
        }
    }

    /// Re-fetch weather for the committed location. Returns `false` when no
    /// location is set yet or it changed while the request was in flight.
    pub async fn refresh(&self) -> bool {
        let Some(location) = self.state.snapshot().await.location else {
            return false;
        };

        let report = self.forecast_or_default(location.coordinates).await;
        self.state
            .commit_refresh(location.coordinates, report.weather, report.timezone)
            .await
    }

    /// Free-text search. Commits the chosen place through [`Resolver::select`].
    pub async fn search(&self, query: &str) -> Result<Location, SkyError> {
        let query = query.trim();
        let key = primary_match_key(query);
        let search_text = key.as_deref().unwrap_or(query);

        let results = self
            .bounded(self.service.search(search_text, SEARCH_COUNT))
            .await?;
        if results.is_empty() {
            return Err(SkyError::NotFound(format!("No results for '{query}'")));
        }

        let chosen = pick_candidate(key.as_deref(), &results)
            .ok_or_else(|| SkyError::NotFound(format!("No valid location for '{query}'")))?;

        self.select(chosen).await
    }

    /// Up to [`MAX_SUGGESTIONS`] valid candidates for a partially typed query.
    /// Short queries return nothing without touching the network.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<CandidateLocation>, SkyError> {
        let query = query.trim();
        if query.chars().count() < MIN_SUGGESTION_CHARS {
            return Ok(Vec::new());
        }

        let results = self.bounded(self.service.search(query, SEARCH_COUNT)).await?;

        Ok(results
            .into_iter()
            .filter(CandidateLocation::is_valid)
            .take(MAX_SUGGESTIONS)
            .collect())
    }

    /// Commit a picked candidate. The forecast for it must report a
    /// timezone, otherwise nothing is committed.
    pub async fn select(&self, candidate: &CandidateLocation) -> Result<Location, SkyError> {
        let at = match candidate.coordinates() {
            Some(at) if candidate.is_valid() => at,
            _ => {
                return Err(SkyError::Validation(format!(
                    "'{}' is missing coordinates, name or country",
                    candidate.display_name()
                )));
            }
        };

        let report = self.forecast_or_default(at).await;
        let timezone = report.timezone.ok_or_else(|| {
            SkyError::UpstreamData("Could not retrieve timezone for this location.".to_string())
        })?;

        let location = Location {
            coordinates: at,
            display_name: candidate.display_name(),
            timezone: Some(timezone),
        };
        self.state.commit(location.clone(), report.weather).await;
        tracing::info!(location = %location.display_name, "Location selected");

        Ok(location)
    }
}

/// For `"Seattle, Washington"` the key is `"Seattle"`; queries without a
/// comma have none.
pub fn primary_match_key(query: &str) -> Option<String> {
    query
        .split_once(',')
        .map(|(first, _)| first.trim().to_string())
}

/// With a key, the first valid candidate whose locale fields contain it;
/// otherwise (or if none match) the first valid candidate.
pub fn pick_candidate<'a>(
    key: Option<&str>,
    candidates: &'a [CandidateLocation],
) -> Option<&'a CandidateLocation> {
    let mut valid = candidates.iter().filter(|c| c.is_valid());

    key.and_then(|key| valid.clone().find(|c| c.matches_key(key)))
        .or_else(|| valid.next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::Condition, state::AppState};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug)]
    enum Reverse {
        Found(CandidateLocation),
        Empty,
        Fails,
    }

    #[derive(Debug)]
    struct FakeService {
        forecast: Option<ForecastReport>,
        forecast_delay: Option<Duration>,
        reverse: Reverse,
        results: Vec<CandidateLocation>,
        searches: Mutex<Vec<String>>,
    }

    impl FakeService {
        fn new() -> Self {
            Self {
                forecast: Some(ForecastReport {
                    weather: WeatherState::new(Condition::Rainy, 52, 20),
                    timezone: Some("America/Los_Angeles".into()),
                }),
                forecast_delay: None,
                reverse: Reverse::Empty,
                results: Vec::new(),
                searches: Mutex::new(Vec::new()),
            }
        }

        fn searches(&self) -> Vec<String> {
            self.searches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GeoWeatherService for FakeService {
        async fn forecast(&self, _at: Coordinates) -> Result<ForecastReport, SkyError> {
            if let Some(delay) = self.forecast_delay {
                tokio::time::sleep(delay).await;
            }
            self.forecast
                .clone()
                .ok_or_else(|| SkyError::UpstreamData("No current_weather".into()))
        }

        async fn reverse_geocode(
            &self,
            _at: Coordinates,
        ) -> Result<Option<CandidateLocation>, SkyError> {
            match &self.reverse {
                Reverse::Found(c) => Ok(Some(c.clone())),
                Reverse::Empty => Ok(None),
                Reverse::Fails => Err(SkyError::Network("connection reset".into())),
            }
        }

        async fn search(
            &self,
            name: &str,
            count: usize,
        ) -> Result<Vec<CandidateLocation>, SkyError> {
            self.searches.lock().unwrap().push(name.to_string());
            Ok(self.results.iter().take(count).cloned().collect())
        }
    }

    #[derive(Debug)]
    struct DeniedGeolocator;

    #[async_trait]
    impl Geolocator for DeniedGeolocator {
        async fn locate(&self) -> Result<Coordinates, SkyError> {
            Err(SkyError::Geolocation("permission denied".into()))
        }
    }

    fn place(name: &str, admin1: &str, country: &str) -> CandidateLocation {
        CandidateLocation {
            name: Some(name.into()),
            admin1: Some(admin1.into()),
            admin2: None,
            country: Some(country.into()),
            latitude: Some(47.6),
            longitude: Some(-122.3),
        }
    }

    fn resolver_with(service: FakeService) -> (Resolver, Arc<FakeService>) {
        let service = Arc::new(service);
        let resolver = Resolver::new(
            service.clone(),
            Arc::new(crate::geolocation::FixedGeolocator(Coordinates::new(47.6, -122.3))),
            StateHandle::new(),
            Duration::from_secs(10),
        );
        (resolver, service)
    }

    #[test]
    fn primary_key_is_text_before_first_comma() {
        assert_eq!(
            primary_match_key("Seattle, Washington, United States").as_deref(),
            Some("Seattle")
        );
        assert_eq!(primary_match_key("Seattle"), None);
        assert_eq!(primary_match_key(" Paris ,France").as_deref(), Some("Paris"));
    }

    #[test]
    fn pick_prefers_first_key_match_in_list_order() {
        let results = vec![
            place("Portland", "Oregon", "United States"),
            place("Seattle", "Washington", "United States"),
            place("Seattle", "Fife", "United Kingdom"),
        ];
        let chosen = pick_candidate(Some("seattle"), &results).unwrap();
        assert_eq!(chosen.admin1.as_deref(), Some("Washington"));
    }

    #[test]
    fn pick_falls_back_to_first_valid() {
        let mut invalid = place("Seattle", "Washington", "United States");
        invalid.country = None;
        let results = vec![invalid, place("Tacoma", "Washington", "United States")];

        let chosen = pick_candidate(Some("nowhere"), &results).unwrap();
        assert_eq!(chosen.name.as_deref(), Some("Tacoma"));
        let chosen = pick_candidate(None, &results).unwrap();
        assert_eq!(chosen.name.as_deref(), Some("Tacoma"));
    }

    #[tokio::test]
    async fn current_position_commits_name_timezone_and_weather() {
        let mut service = FakeService::new();
        service.reverse = Reverse::Found(place("Seattle", "Washington", "United States"));
        let (resolver, _) = resolver_with(service);

        let location = resolver.resolve_current_position().await.unwrap();
        assert_eq!(location.display_name, "Seattle, Washington, United States");
        assert_eq!(location.timezone.as_deref(), Some("America/Los_Angeles"));

        let state = resolver.state().snapshot().await;
        assert_eq!(state.location, Some(location));
        assert_eq!(state.weather.condition, Condition::Rainy);
        assert!(state.weather.is_windy);
    }

    #[tokio::test]
    async fn reverse_geocode_fallbacks() {
        let (resolver, _) = resolver_with(FakeService::new());
        assert_eq!(
            resolver.reverse_geocode(Coordinates::new(12.3456, -7.891)).await,
            "12.35, -7.89"
        );

        let mut failing = FakeService::new();
        failing.reverse = Reverse::Fails;
        let (resolver, _) = resolver_with(failing);
        assert_eq!(
            resolver.reverse_geocode(Coordinates::new(1.0, 2.0)).await,
            UNKNOWN_LOCATION
        );
    }

    #[tokio::test]
    async fn denied_geolocation_leaves_state_unset() {
        let (resolver, _) = resolver_with(FakeService::new());
        let resolver = resolver.with_geolocator(Arc::new(DeniedGeolocator));

        let err = resolver.resolve_current_position().await.unwrap_err();
        assert!(matches!(err, SkyError::Geolocation(_)));

        let state = resolver.state().snapshot().await;
        assert_eq!(state.location_label(), "Loading...");
    }

    #[tokio::test]
    async fn missing_current_weather_falls_back_to_clear_sky() {
        let mut service = FakeService::new();
        service.forecast = None;
        let (resolver, _) = resolver_with(service);

        let location = resolver.resolve_current_position().await.unwrap();
        assert_eq!(location.timezone, None);

        let weather = resolver.state().snapshot().await.weather;
        assert_eq!(weather, WeatherState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_forecast_times_out_to_clear_sky() {
        let mut service = FakeService::new();
        service.forecast_delay = Some(Duration::from_secs(30));
        let (resolver, _) = resolver_with(service);

        let report = resolver
            .forecast_or_default(Coordinates::new(0.0, 0.0))
            .await;
        assert_eq!(report.weather.condition, Condition::Clear);
        assert_eq!(report.timezone, None);
    }

    #[tokio::test]
    async fn search_with_comma_queries_primary_key_and_matches_it() {
        let mut service = FakeService::new();
        service.results = vec![
            place("Portland", "Oregon", "United States"),
            place("Seattle", "Washington", "United States"),
            place("Seattle", "Fife", "United Kingdom"),
        ];
        let (resolver, service) = resolver_with(service);

        let location = resolver
            .search("Seattle, Washington, United States")
            .await
            .unwrap();

        assert_eq!(service.searches(), vec!["Seattle".to_string()]);
        assert_eq!(location.display_name, "Seattle, Washington, United States");
    }

    #[tokio::test]
    async fn search_without_valid_results_changes_nothing() {
        let mut incomplete = place("Atlantis", "Ocean", "");
        incomplete.country = None;
        let mut service = FakeService::new();
        service.results = vec![incomplete];
        let (resolver, _) = resolver_with(service);

        let err = resolver.search("Atlantis").await.unwrap_err();
        assert!(matches!(err, SkyError::NotFound(_)));
        assert!(resolver.state().snapshot().await.location.is_none());

        let (resolver, _) = resolver_with(FakeService::new());
        let err = resolver.search("Nowhere").await.unwrap_err();
        assert!(matches!(err, SkyError::NotFound(_)));
    }

    #[tokio::test]
    async fn short_queries_never_hit_the_service() {
        let (resolver, service) = resolver_with(FakeService::new());

        assert!(resolver.suggestions("S").await.unwrap().is_empty());
        assert!(resolver.suggestions("  ").await.unwrap().is_empty());
        assert!(resolver.suggestions(" a ").await.unwrap().is_empty());
        assert!(service.searches().is_empty());
    }

    #[tokio::test]
    async fn suggestions_filter_invalid_and_cap_at_five() {
        let mut no_coords = place("Springfield", "Nowhere", "United States");
        no_coords.latitude = None;

        let mut service = FakeService::new();
        service.results = std::iter::once(no_coords)
            .chain((0..8).map(|i| place(&format!("Springfield {i}"), "IL", "United States")))
            .collect();
        let (resolver, _) = resolver_with(service);

        let suggestions = resolver.suggestions("Springf").await.unwrap();
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert!(suggestions.iter().all(CandidateLocation::is_valid));
        assert_eq!(suggestions[0].name.as_deref(), Some("Springfield 0"));
    }

    #[tokio::test]
    async fn select_rejects_incomplete_candidate() {
        let (resolver, _) = resolver_with(FakeService::new());
        let mut candidate = place("Seattle", "Washington", "United States");
        candidate.name = Some(String::new());

        let err = resolver.select(&candidate).await.unwrap_err();
        assert!(matches!(err, SkyError::Validation(_)));
        assert!(resolver.state().snapshot().await.location.is_none());
    }

    #[tokio::test]
    async fn select_without_timezone_does_not_commit() {
        let mut service = FakeService::new();
        service.forecast = Some(ForecastReport {
            weather: WeatherState::new(Condition::Clear, 70, 3),
            timezone: None,
        });
        let (resolver, _) = resolver_with(service);

        let err = resolver
            .select(&place("Seattle", "Washington", "United States"))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timezone"));
        assert_eq!(resolver.state().snapshot().await, AppState::default());
    }

    #[tokio::test]
    async fn selecting_suggestion_matches_searching_its_name() {
        let results = vec![
            place("Seattle", "Washington", "United States"),
            place("Seattle", "Fife", "United Kingdom"),
        ];

        let mut service = FakeService::new();
        service.results = results.clone();
        let (by_suggestion, _) = resolver_with(service);
        let suggestion = by_suggestion.suggestions("Seattle").await.unwrap().remove(0);
        let selected = by_suggestion.select(&suggestion).await.unwrap();

        let mut service = FakeService::new();
        service.results = results;
        let (by_search, _) = resolver_with(service);
        let searched = by_search
            .search(suggestion.name.as_deref().unwrap())
            .await
            .unwrap();

        assert_eq!(selected, searched);
    }

    #[tokio::test]
    async fn refresh_requires_a_location() {
        let (resolver, _) = resolver_with(FakeService::new());
        assert!(!resolver.refresh().await);

        resolver
            .select(&place("Seattle", "Washington", "United States"))
            .await
            .unwrap();
        assert!(resolver.refresh().await);
        assert_eq!(
            resolver.state().snapshot().await.timezone(),
            Some("America/Los_Angeles")
        );
    }

    #[tokio::test]
    async fn failed_refresh_keeps_location_and_temperature() {
        let (resolver, _) = resolver_with(FakeService::new());
        let committed = resolver
            .select(&place("Seattle", "Washington", "United States"))
            .await
            .unwrap();

        let mut offline = FakeService::new();
        offline.forecast = None;
        let offline = Resolver::new(
            Arc::new(offline),
            Arc::new(DeniedGeolocator),
            resolver.state().clone(),
            Duration::from_secs(10),
        );

        assert!(offline.refresh().await);

        let state = resolver.state().snapshot().await;
        assert_eq!(state.location, Some(committed));
        assert_eq!(state.timezone(), Some("America/Los_Angeles"));
        assert_eq!(
            state.weather,
            WeatherState {
                condition: Condition::Clear,
                temperature_f: Some(52),
                wind_speed_mph: 0,
                is_windy: false,
            }
        );
    }

    #[tokio::test]
    async fn startup_prefers_saved_location() {
        let (resolver, _) = resolver_with(FakeService::new());
        let resolver = resolver.with_geolocator(Arc::new(DeniedGeolocator));

        let saved = place("Seattle", "Washington", "United States");
        let location = resolver.resolve_startup(Some(&saved)).await.unwrap();
        assert_eq!(location.display_name, "Seattle, Washington, United States");

        assert!(resolver.resolve_startup(None).await.is_err());
    }
}
