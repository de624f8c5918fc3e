use serde::{Deserialize, Serialize};
use std::fmt;

/// Wind speed above which the sky is considered windy.
pub const WINDY_THRESHOLD_MPH: i32 = 15;

/// Internal weather classification used to drive the sky visuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Foggy,
    Drizzle,
    Rainy,
    Snowy,
    Stormy,
}

impl Condition {
    /// Map a WMO weather code to a condition. Unlisted codes are `Cloudy`.
    pub fn from_wmo_code(code: i64) -> Self {
        match code {
            0 => Self::Clear,
            1 | 2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Foggy,
            51..=57 => Self::Drizzle,
            61..=67 | 80..=82 => Self::Rainy,
            71..=77 | 85 | 86 => Self::Snowy,
            95 | 96 | 99 => Self::Stormy,
            _ => Self::Cloudy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::PartlyCloudy => "partly-cloudy",
            Self::Cloudy => "cloudy",
            Self::Foggy => "foggy",
            Self::Drizzle => "drizzle",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
            Self::Stormy => "stormy",
        }
    }

    pub const fn all() -> &'static [Condition] {
        &[
            Condition::Clear,
            Condition::PartlyCloudy,
            Condition::Cloudy,
            Condition::Foggy,
            Condition::Drizzle,
            Condition::Rainy,
            Condition::Snowy,
            Condition::Stormy,
        ]
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// `"47.61, -122.33"`, used when no place name is known.
    pub fn to_display_name(&self) -> String {
        format!("{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

/// The committed location the sky is drawn for.
///
/// Only ever replaced as a whole, see [`crate::state::AppState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub coordinates: Coordinates,
    pub display_name: String,
    /// IANA timezone identifier. `None` until a forecast reports one, in
    /// which case the system timezone is used for rendering.
    pub timezone: Option<String>,
}

/// Current conditions as last fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherState {
    pub condition: Condition,
    pub temperature_f: Option<i32>,
    pub wind_speed_mph: i32,
    pub is_windy: bool,
}

impl WeatherState {
    pub fn new(condition: Condition, temperature_f: i32, wind_speed_mph: i32) -> Self {
        Self {
            condition,
            temperature_f: Some(temperature_f),
            wind_speed_mph,
            is_windy: wind_speed_mph > WINDY_THRESHOLD_MPH,
        }
    }

    /// The clear-sky state used when a forecast cannot be fetched. The last
    /// known temperature is carried over.
    pub fn clear_fallback(previous: &WeatherState) -> Self {
        Self {
            condition: Condition::Clear,
            temperature_f: previous.temperature_f,
            wind_speed_mph: 0,
            is_windy: false,
        }
    }
}

impl Default for WeatherState {
    fn default() -> Self {
        Self {
            condition: Condition::Clear,
            temperature_f: None,
            wind_speed_mph: 0,
            is_windy: false,
        }
    }
}

/// Result of a forecast query: the weather plus the timezone the service
/// reported for the point.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub weather: WeatherState,
    pub timezone: Option<String>,
}

/// A place returned by search, suggestions, or reverse geocoding.
///
/// Fields are optional because the geocoding service omits them freely;
/// use [`CandidateLocation::is_valid`] before offering one to the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateLocation {
    pub name: Option<String>,
    #[serde(default)]
    pub admin1: Option<String>,
    #[serde(default)]
    pub admin2: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl CandidateLocation {
    /// Latitude, longitude, name and country must all be present and non-empty.
    pub fn is_valid(&self) -> bool {
        let non_empty = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        self.latitude.is_some()
            && self.longitude.is_some()
            && non_empty(&self.name)
            && non_empty(&self.country)
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }

    /// `name[, admin1][, country]`
    pub fn display_name(&self) -> String {
        let mut out = self.name.clone().unwrap_or_default();
        for part in [&self.admin1, &self.country].into_iter().flatten() {
            if !part.is_empty() {
                out.push_str(", ");
                out.push_str(part);
            }
        }
        out
    }

    /// `admin1, country`, whichever are present. Shown under a suggestion's name.
    pub fn details(&self) -> String {
        [&self.admin1, &self.country]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// True when name, admin1, admin2 or country contains `key`, ignoring case.
    pub fn matches_key(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        [&self.name, &self.admin1, &self.admin2, &self.country]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .any(|part| part.to_lowercase().contains(&key))
    }
}
