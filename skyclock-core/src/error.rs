use std::time::Duration;

/// Failures raised by the resolver and the services behind it.
#[derive(Debug, thiserror::Error)]
pub enum SkyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected response from upstream service: {0}")]
    UpstreamData(String),

    #[error("Invalid location: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Geolocation unavailable: {0}")]
    Geolocation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SkyError {
    /// True for transport failures and expired deadlines.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// Short message for the error area of the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) | Self::Timeout(_) => "Error searching location. Please try again.",
            Self::UpstreamData(_) => "Could not retrieve weather data for this location.",
            Self::Validation(_) => "Invalid location data. Please try another location.",
            Self::NotFound(_) => {
                "Location not found. Please try a simpler search (e.g., just the city name)."
            }
            Self::Geolocation(_) => "Could not get your location. Please search manually.",
            Self::Config(_) => "Configuration problem. Run `skyclock configure`.",
        }
    }
}

impl From<reqwest::Error> for SkyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::UpstreamData(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SkyError {
    fn from(err: serde_json::Error) -> Self {
        Self::UpstreamData(err.to_string())
    }
}
