use crate::flow::Origin;

pub const PERMISSION_DENIED_ALERT: &str = "Permission denied for location access.";
pub const LOCATION_WEATHER_ALERT: &str = "Error getting weather from location.";
pub const CITY_NOT_FOUND_ALERT: &str = "City not found!";
pub const SEARCH_FAILED_ALERT: &str = "Unable to fetch weather. Check your connection and try again.";

/// Failures of a single weather or forecast lookup.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("No weather data found for {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed weather provider response: {0}")]
    Malformed(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

/// Failures of the location boundary.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Current position unavailable: {0}")]
    PositionUnavailable(String),
}

/// Why a resolution cycle ended in the `Error` phase.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("Weather lookup failed ({origin}): {source}")]
    Weather {
        origin: Origin,
        #[source]
        source: ClientError,
    },
}

impl FlowError {
    /// Plain-language text for the blocking alert shown to the user.
    ///
    /// The location path collapses every failure into one message; the
    /// search path only tells "not found" apart from everything else.
    pub fn alert_message(&self) -> &'static str {
        match self {
            FlowError::PermissionDenied => PERMISSION_DENIED_ALERT,
            FlowError::Location(_) => LOCATION_WEATHER_ALERT,
            FlowError::Weather { origin: Origin::Location, .. } => LOCATION_WEATHER_ALERT,
            FlowError::Weather { origin: Origin::Search, source } if source.is_not_found() => {
                CITY_NOT_FOUND_ALERT
            }
            FlowError::Weather { origin: Origin::Search, .. } => SEARCH_FAILED_ALERT,
        }
    }
}
