//! Core library for the `weathernow` app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather and forecast clients over the OpenWeather API
//! - The device location boundary
//! - The location-to-weather resolution flow and the state it drives
//! - Background selection for the current condition
//!
//! It is used by `weathernow-cli`, but any other front end can drive the
//! same flow by implementing [`Presenter`] and [`LocationProvider`].

pub mod background;
pub mod config;
pub mod error;
pub mod flow;
pub mod location;
pub mod model;
pub mod presentation;
pub mod provider;

pub use background::Background;
pub use config::Config;
pub use error::{ClientError, FlowError, LocationError};
pub use flow::{CycleOutcome, Origin, Phase, WeatherResolutionFlow};
pub use location::{LocationProvider, Permission, StaticLocation};
pub use model::{
    CanonicalCity, Coordinates, DailyForecast, ForecastEntry, ForecastRecord, Locator,
    ResolutionState, WeatherRecord,
};
pub use presentation::Presenter;
pub use provider::{ForecastClient, WeatherClient, openweather::OpenWeatherClient};
