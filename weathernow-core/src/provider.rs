use crate::{
    Config,
    error::ClientError,
    model::{CanonicalCity, ForecastRecord, Locator, WeatherRecord},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Unit system sent with every request.
pub const UNITS: &str = "metric";

/// Resolves current conditions for a city name or a coordinate pair.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_current_weather(&self, locator: &Locator) -> Result<WeatherRecord, ClientError>;
}

/// Resolves a multi-day forecast for a city the weather lookup confirmed.
#[async_trait]
pub trait ForecastClient: Send + Sync + Debug {
    async fn fetch_forecast(&self, city: &CanonicalCity) -> Result<ForecastRecord, ClientError>;
}

/// Construct the OpenWeather client from config (API key and optional base URL).
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weathernow configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let client = match config.openweather.base_url.as_deref() {
        Some(base_url) => OpenWeatherClient::with_base_url(api_key.to_owned(), base_url),
        None => OpenWeatherClient::new(api_key.to_owned()),
    };

    Ok(client)
}
