//! Terminal presentation of [`ResolutionState`].

use std::fmt;

use serde::Serialize;
use weathernow_core::{Background, Phase, Presenter, ResolutionState};

/// Alerts go to stderr so stdout only carries rendered state.
#[derive(Debug, Default)]
pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}

/// Text view of a [`ResolutionState`]: header with the background variant,
/// weather card, then one forecast line per day.
pub struct StateView<'a>(pub &'a ResolutionState);

impl fmt::Display for StateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(f, "Weather Now  [{}]", state.background())?;

        if state.is_loading {
            writeln!(f, "Loading...")?;
        }

        match &state.weather {
            Some(weather) => {
                writeln!(f)?;
                writeln!(f, "{}", weather.display_name())?;
                writeln!(
                    f,
                    "  {:.1}°C  {} ({})",
                    weather.temperature_c, weather.condition_main, weather.description
                )?;
                writeln!(
                    f,
                    "  feels like {:.1}°C, humidity {}%, wind {:.1} m/s",
                    weather.feels_like_c, weather.humidity_pct, weather.wind_speed_mps
                )?;
                if let Some(observed) = weather.observed_at {
                    writeln!(f, "  observed {}", observed.format("%Y-%m-%d %H:%M UTC"))?;
                }
            }
            None if state.phase == Phase::Error => writeln!(f, "No weather available.")?,
            None => {}
        }

        if let Some(forecast) = &state.forecast {
            writeln!(f)?;
            writeln!(f, "Forecast")?;
            for day in forecast.daily() {
                writeln!(
                    f,
                    "  {}  {:>5.1}°C / {:>5.1}°C  {}",
                    day.date.format("%a %d %b"),
                    day.min_c,
                    day.max_c,
                    day.condition_main
                )?;
            }
        }

        Ok(())
    }
}

pub fn render(state: &ResolutionState) -> String {
    StateView(state).to_string()
}

#[derive(Serialize)]
struct JsonView<'a> {
    #[serde(flatten)]
    state: &'a ResolutionState,
    background: Background,
    background_asset: &'static str,
}

/// The state plus the background selection derived from it.
pub fn render_json(state: &ResolutionState) -> serde_json::Result<String> {
    let background = state.background();
    serde_json::to_string_pretty(&JsonView {
        state,
        background,
        background_asset: background.asset(),
    })
}
