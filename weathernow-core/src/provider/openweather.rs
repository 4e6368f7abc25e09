use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    error::ClientError,
    model::{CanonicalCity, ForecastEntry, ForecastRecord, Locator, WeatherRecord},
};

use super::{ForecastClient, UNITS, WeatherClient};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One GET against `{base_url}/{endpoint}`; no retry.
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        target: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str()), ("units", UNITS)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(target.to_string()));
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::Malformed(format!("{endpoint} response: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: Option<f64>,
    #[serde(default)]
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    list: Vec<OwForecastEntry>,
}

impl OwCurrentResponse {
    fn into_record(self) -> Result<WeatherRecord, ClientError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .filter(|w| !w.main.trim().is_empty())
            .ok_or_else(|| ClientError::Malformed("response has no weather condition".to_string()))?;

        if !self.main.temp.is_finite() {
            return Err(ClientError::Malformed("temperature is not a finite number".to_string()));
        }

        Ok(WeatherRecord {
            city_name: self.name,
            country: self.sys.and_then(|s| s.country),
            condition_main: condition.main,
            description: condition.description,
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like.unwrap_or(self.main.temp),
            humidity_pct: self.main.humidity.unwrap_or_default(),
            wind_speed_mps: self.wind.map(|w| w.speed).unwrap_or_default(),
            observed_at: self.dt.and_then(unix_to_utc),
        })
    }
}

impl OwForecastEntry {
    fn into_entry(self) -> Option<ForecastEntry> {
        let timestamp = unix_to_utc(self.dt)?;
        let (condition_main, description) = self
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, w.description))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        Some(ForecastEntry {
            timestamp,
            temperature_c: self.main.temp,
            condition_main,
            description,
        })
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    #[instrument(skip(self, locator), fields(locator = %locator))]
    async fn fetch_current_weather(&self, locator: &Locator) -> Result<WeatherRecord, ClientError> {
        let locator = locator.normalized()?;

        let query = match &locator {
            Locator::City(name) => vec![("q", name.clone())],
            Locator::Coordinates(coords) => vec![
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ],
        };

        let parsed: OwCurrentResponse = self.get("weather", &locator.to_string(), &query).await?;
        let record = parsed.into_record()?;

        debug!(city = %record.city_name, condition = %record.condition_main, "current weather resolved");
        Ok(record)
    }
}

#[async_trait]
impl ForecastClient for OpenWeatherClient {
    #[instrument(skip(self, city), fields(city = %city))]
    async fn fetch_forecast(&self, city: &CanonicalCity) -> Result<ForecastRecord, ClientError> {
        let query = [("q", city.as_str().to_string())];
        let parsed: OwForecastResponse = self.get("forecast", city.as_str(), &query).await?;

        let entries: Vec<ForecastEntry> =
            parsed.list.into_iter().filter_map(OwForecastEntry::into_entry).collect();

        debug!(entries = entries.len(), "forecast resolved");
        Ok(ForecastRecord::new(city.clone(), entries))
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
