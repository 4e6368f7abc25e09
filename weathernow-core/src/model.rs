use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{background::Background, error::ClientError, flow::Phase};

/// A device position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both components must be finite and inside the geographic range.
    pub fn validate(&self) -> Result<(), ClientError> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(ClientError::InvalidLocator(format!(
                "coordinates must be finite, got ({}, {})",
                self.latitude, self.longitude
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ClientError::InvalidLocator(format!(
                "coordinates out of range: ({}, {})",
                self.latitude, self.longitude
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What to look weather up for: free text typed by the user, or a position.
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    City(String),
    Coordinates(Coordinates),
}

impl Locator {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    /// Checks the input constraints and returns the locator that should go
    /// on the wire (city names are trimmed).
    pub fn normalized(&self) -> Result<Self, ClientError> {
        match self {
            Locator::City(name) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(ClientError::InvalidLocator("city name is empty".to_string()));
                }
                Ok(Locator::City(trimmed.to_string()))
            }
            Locator::Coordinates(coords) => {
                coords.validate()?;
                Ok(Locator::Coordinates(*coords))
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::City(name) => f.write_str(name),
            Locator::Coordinates(coords) => write!(f, "({coords})"),
        }
    }
}

/// Current conditions for one place, as confirmed by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city_name: String,
    pub country: Option<String>,
    /// Condition category, e.g. "Rain", "Clouds", "Clear".
    pub condition_main: String,
    pub description: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherRecord {
    /// The provider-confirmed name the dependent forecast lookup must use.
    pub fn canonical_city(&self) -> Result<CanonicalCity, ClientError> {
        let name = self.city_name.trim();
        if name.is_empty() {
            return Err(ClientError::InvalidLocator(
                "provider returned no city name for this location".to_string(),
            ));
        }
        Ok(CanonicalCity(name.to_string()))
    }

    pub fn display_name(&self) -> String {
        match self.country.as_deref() {
            Some(country) if !country.is_empty() => format!("{}, {}", self.city_name, country),
            _ => self.city_name.clone(),
        }
    }
}

/// City name resolved by a weather lookup. Only a [`WeatherRecord`] can
/// produce one, so a forecast can never be requested for raw user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CanonicalCity(String);

impl CanonicalCity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalCity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: f64,
    pub condition_main: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRecord {
    pub city: CanonicalCity,
    /// Chronological.
    pub entries: Vec<ForecastEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub min_c: f64,
    pub max_c: f64,
    pub condition_main: String,
}

impl ForecastRecord {
    pub fn new(city: CanonicalCity, mut entries: Vec<ForecastEntry>) -> Self {
        entries.sort_by_key(|e| e.timestamp);
        Self { city, entries }
    }

    /// One summary per UTC day; the condition is taken from the entry
    /// closest to midday.
    pub fn daily(&self) -> Vec<DailyForecast> {
        let mut days: BTreeMap<NaiveDate, Vec<&ForecastEntry>> = BTreeMap::new();
        for entry in &self.entries {
            days.entry(entry.timestamp.date_naive()).or_default().push(entry);
        }

        days.into_iter()
            .filter_map(|(date, entries)| {
                let midday = entries
                    .iter()
                    .min_by_key(|e| (i64::from(e.timestamp.hour()) - 12).abs())?;
                let min_c = entries.iter().map(|e| e.temperature_c).fold(f64::INFINITY, f64::min);
                let max_c =
                    entries.iter().map(|e| e.temperature_c).fold(f64::NEG_INFINITY, f64::max);
                Some(DailyForecast {
                    date,
                    min_c,
                    max_c,
                    condition_main: midday.condition_main.clone(),
                })
            })
            .collect()
    }
}

/// Everything the presentation layer needs to draw the screen.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ResolutionState {
    pub city_search_text: String,
    pub weather: Option<WeatherRecord>,
    pub forecast: Option<ForecastRecord>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub phase: Phase,
}

impl ResolutionState {
    pub fn background(&self) -> Background {
        Background::for_weather(self.weather.as_ref())
    }
}
