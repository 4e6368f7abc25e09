//! Location-to-weather resolution.
//!
//! One resolution cycle goes from a trigger (mount, pull-to-refresh or a
//! search submit) to `Ready` or `Error`:
//!
//! ```text
//! Idle -> LocatingDevice -> FetchingWeather -> FetchingForecast -> Ready
//!              \                  \                                 (Error from any step)
//!               search submit ----^
//! ```
//!
//! Every step awaits the previous one. Cycles are numbered; a cycle whose
//! number is no longer the latest stops touching [`ResolutionState`] and
//! stops issuing requests, so the most recent trigger always wins.

use std::{fmt, sync::Arc};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    background::Background,
    error::FlowError,
    location::{LocationProvider, Permission},
    model::{Locator, ResolutionState},
    presentation::Presenter,
    provider::{ForecastClient, WeatherClient},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    LocatingDevice,
    FetchingWeather,
    FetchingForecast,
    Ready,
    Error,
}

impl Phase {
    pub fn is_fetching(self) -> bool {
        matches!(self, Phase::FetchingWeather | Phase::FetchingForecast)
    }
}

/// Which path produced the locator for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Location,
    Search,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Location => "location",
            Origin::Search => "search",
        })
    }
}

/// How a single trigger ended, from that trigger's point of view.
#[derive(Debug)]
pub enum CycleOutcome {
    Ready,
    /// Weather is shown but the forecast lookup failed.
    ReadyWithoutForecast,
    Failed(FlowError),
    /// A newer trigger started before this one finished; its results were dropped.
    Superseded,
    /// Blank search text; nothing was requested.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Mount,
    Refresh,
    Search,
}

impl Trigger {
    fn origin(self) -> Origin {
        match self {
            Trigger::Mount | Trigger::Refresh => Origin::Location,
            Trigger::Search => Origin::Search,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cycle {
    id: u64,
    trigger: Trigger,
}

#[derive(Debug, Default)]
struct Inner {
    latest_cycle: u64,
    state: ResolutionState,
}

#[derive(Debug)]
pub struct WeatherResolutionFlow {
    weather: Arc<dyn WeatherClient>,
    forecast: Arc<dyn ForecastClient>,
    location: Arc<dyn LocationProvider>,
    presenter: Arc<dyn Presenter>,
    inner: Mutex<Inner>,
}

impl WeatherResolutionFlow {
    pub fn new(
        weather: Arc<dyn WeatherClient>,
        forecast: Arc<dyn ForecastClient>,
        location: Arc<dyn LocationProvider>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            weather,
            forecast,
            location,
            presenter,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Snapshot of the current state for rendering.
    pub fn state(&self) -> ResolutionState {
        self.inner.lock().state.clone()
    }

    pub fn background(&self) -> Background {
        self.inner.lock().state.background()
    }

    pub fn set_search_text(&self, text: impl Into<String>) {
        self.inner.lock().state.city_search_text = text.into();
    }

    pub async fn on_mount(&self) -> CycleOutcome {
        self.resolve_from_location(Trigger::Mount).await
    }

    pub async fn on_refresh_pull(&self) -> CycleOutcome {
        self.resolve_from_location(Trigger::Refresh).await
    }

    pub async fn on_search_submit(&self, text: &str) -> CycleOutcome {
        self.set_search_text(text);

        let city = text.trim();
        if city.is_empty() {
            debug!("ignoring blank search");
            return CycleOutcome::Skipped;
        }

        self.presenter.dismiss_input();
        let cycle = self.begin_cycle(Trigger::Search, Phase::FetchingWeather);
        self.resolve_weather(cycle, Locator::city(city)).await
    }

    async fn resolve_from_location(&self, trigger: Trigger) -> CycleOutcome {
        let cycle = self.begin_cycle(trigger, Phase::LocatingDevice);

        if self.location.request_permission().await == Permission::Denied {
            return self.fail(cycle, FlowError::PermissionDenied);
        }

        let coords = match self.location.current_coordinates().await {
            Ok(coords) => coords,
            Err(e) => return self.fail(cycle, e.into()),
        };

        if !self.apply(cycle, |s| set_phase(s, Phase::FetchingWeather)) {
            return CycleOutcome::Superseded;
        }

        self.resolve_weather(cycle, Locator::Coordinates(coords)).await
    }

    async fn resolve_weather(&self, cycle: Cycle, locator: Locator) -> CycleOutcome {
        let weather = match self.weather.fetch_current_weather(&locator).await {
            Ok(weather) => weather,
            Err(source) => {
                let origin = cycle.trigger.origin();
                return self.fail(cycle, FlowError::Weather { origin, source });
            }
        };

        let city = weather.canonical_city();
        let stored = self.apply(cycle, move |s| {
            s.weather = Some(weather);
            s.forecast = None;
            set_phase(s, Phase::FetchingForecast);
        });
        if !stored {
            return CycleOutcome::Superseded;
        }

        let city = match city {
            Ok(city) => city,
            Err(e) => {
                warn!(cycle = cycle.id, error = %e, "skipping forecast");
                return self.finish_without_forecast(cycle);
            }
        };

        match self.forecast.fetch_forecast(&city).await {
            Ok(forecast) => {
                let stored = self.apply(cycle, move |s| {
                    s.forecast = Some(forecast);
                    finish(s, Phase::Ready);
                });
                if stored {
                    info!(cycle = cycle.id, %city, "weather and forecast ready");
                    CycleOutcome::Ready
                } else {
                    CycleOutcome::Superseded
                }
            }
            Err(e) => {
                warn!(cycle = cycle.id, %city, error = %e, "forecast lookup failed");
                self.finish_without_forecast(cycle)
            }
        }
    }

    fn begin_cycle(&self, trigger: Trigger, phase: Phase) -> Cycle {
        let mut inner = self.inner.lock();
        inner.latest_cycle += 1;

        let state = &mut inner.state;
        set_phase(state, phase);
        state.is_refreshing = trigger == Trigger::Refresh;

        let cycle = Cycle { id: inner.latest_cycle, trigger };
        debug!(cycle = cycle.id, ?trigger, ?phase, "resolution cycle started");
        cycle
    }

    /// Runs `update` only while `cycle` is still the latest one.
    fn apply(&self, cycle: Cycle, update: impl FnOnce(&mut ResolutionState)) -> bool {
        let mut inner = self.inner.lock();
        if inner.latest_cycle != cycle.id {
            debug!(cycle = cycle.id, latest = inner.latest_cycle, "dropping stale result");
            return false;
        }
        update(&mut inner.state);
        true
    }

    /// The alert is emitted while the state lock is held, so no newer cycle
    /// can start between the staleness check and the notification.
    fn fail(&self, cycle: Cycle, err: FlowError) -> CycleOutcome {
        let mut inner = self.inner.lock();
        if inner.latest_cycle != cycle.id {
            debug!(cycle = cycle.id, latest = inner.latest_cycle, "dropping stale failure");
            return CycleOutcome::Superseded;
        }
        finish(&mut inner.state, Phase::Error);

        warn!(cycle = cycle.id, error = %err, "resolution cycle failed");
        self.presenter.alert(err.alert_message());
        drop(inner);

        CycleOutcome::Failed(err)
    }

    fn finish_without_forecast(&self, cycle: Cycle) -> CycleOutcome {
        if self.apply(cycle, |s| finish(s, Phase::Ready)) {
            CycleOutcome::ReadyWithoutForecast
        } else {
            CycleOutcome::Superseded
        }
    }
}

fn set_phase(state: &mut ResolutionState, phase: Phase) {
    state.phase = phase;
    state.is_loading = phase.is_fetching();
}

fn finish(state: &mut ResolutionState, phase: Phase) {
    set_phase(state, phase);
    state.is_refreshing = false;
}
