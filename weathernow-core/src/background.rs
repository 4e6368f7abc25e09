use serde::Serialize;

use crate::model::WeatherRecord;

/// Backdrop variant chosen from the current condition category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    Rainy,
    Cloudy,
    #[default]
    Sunny,
}

impl Background {
    /// Substring match on the lowercased condition; no record means sunny.
    pub fn for_weather(weather: Option<&WeatherRecord>) -> Self {
        weather.map_or(Self::Sunny, |w| Self::for_condition(&w.condition_main))
    }

    pub fn for_condition(condition_main: &str) -> Self {
        let main = condition_main.to_lowercase();
        if main.contains("rain") {
            Self::Rainy
        } else if main.contains("cloud") {
            Self::Cloudy
        } else {
            Self::Sunny
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rainy => "rainy",
            Self::Cloudy => "cloudy",
            Self::Sunny => "sunny",
        }
    }

    pub fn asset(&self) -> &'static str {
        match self {
            Self::Rainy => "rainy.jpg",
            Self::Cloudy => "cloudy.jpg",
            Self::Sunny => "sunny.jpg",
        }
    }
}

impl std::fmt::Display for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
