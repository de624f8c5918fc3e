use std::sync::Arc;
use tokio::sync::RwLock;

use crate::model::{Coordinates, Location, WeatherState};

/// Everything the renderer needs from the resolver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub location: Option<Location>,
    pub weather: WeatherState,
}

impl AppState {
    /// Location label, `"Loading..."` until one is committed.
    pub fn location_label(&self) -> &str {
        self.location
            .as_ref()
            .map(|l| l.display_name.as_str())
            .unwrap_or("Loading...")
    }

    pub fn timezone(&self) -> Option<&str> {
        self.location.as_ref().and_then(|l| l.timezone.as_deref())
    }
}

/// Shared handle to [`AppState`].
///
/// Readers get snapshots. Writers can only swap a whole [`Location`] or
/// [`WeatherState`], never patch individual fields.
#[derive(Debug, Clone, Default)]
pub struct StateHandle {
    inner: Arc<RwLock<AppState>>,
}

impl StateHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> AppState {
        self.inner.read().await.clone()
    }

    /// Swap location and weather under one lock.
    pub(crate) async fn commit(&self, location: Location, weather: WeatherState) {
        let mut state = self.inner.write().await;
        state.location = Some(location);
        state.weather = weather;
    }

    /// Apply a refreshed forecast, but only if the committed location is
    /// still the one it was fetched for. A reported timezone replaces the
    /// location with a copy carrying that timezone.
    pub(crate) async fn commit_refresh(
        &self,
        fetched_for: Coordinates,
        weather: WeatherState,
        timezone: Option<String>,
    ) -> bool {
        let mut state = self.inner.write().await;
        let Some(current) = state.location.clone() else {
            return false;
        };
        if current.coordinates != fetched_for {
            return false;
        }

        let changed = timezone.filter(|tz| current.timezone.as_deref() != Some(tz.as_str()));
        if let Some(tz) = changed {
            state.location = Some(Location {
                timezone: Some(tz),
                ..current
            });
        }
        state.weather = weather;
        true
    }
}
