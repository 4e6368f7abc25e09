use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode, Text};
use weathernow_core::{
    Config, Coordinates, CycleOutcome, StaticLocation, WeatherResolutionFlow,
    provider::client_from_config,
};

use crate::render::{TerminalPresenter, render, render_json};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathernow", version, about = "Current weather and forecast")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional default position.
    Configure,

    /// Show weather for a city, or for the configured position when no city is given.
    Show {
        /// City name to search for.
        city: Option<String>,

        #[command(flatten)]
        position: PositionArgs,

        /// Print the resolution state as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Start from the current position, then search repeatedly.
    ///
    /// An empty line refreshes from the position; `q` quits.
    Interactive {
        #[command(flatten)]
        position: PositionArgs,
    },
}

#[derive(Debug, Args)]
pub struct PositionArgs {
    /// Latitude to use instead of the configured position.
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude to use instead of the configured position.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl PositionArgs {
    fn resolve(&self, config: &Config) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => config.location,
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Configure => configure().map(|()| ExitCode::SUCCESS),
            Command::Show { city, position, json } => {
                let config = Config::load()?;
                let flow = build_flow(&config, position.resolve(&config))?;

                let outcome = match city {
                    Some(city) => flow.on_search_submit(&city).await,
                    None => flow.on_mount().await,
                };

                let state = flow.state();
                if json {
                    println!("{}", render_json(&state)?);
                } else {
                    print!("{}", render(&state));
                }

                if show_succeeded(outcome)? {
                    Ok(ExitCode::SUCCESS)
                } else {
                    Ok(ExitCode::FAILURE)
                }
            }
            Command::Interactive { position } => {
                let config = Config::load()?;
                let flow = build_flow(&config, position.resolve(&config))?;
                interactive(&flow).await.map(|()| ExitCode::SUCCESS)
            }
        }
    }
}

/// A failed cycle has already been reported through the presenter, so it
/// only turns into a non-zero exit, not a second error message.
fn show_succeeded(outcome: CycleOutcome) -> anyhow::Result<bool> {
    match outcome {
        CycleOutcome::Failed(err) => {
            tracing::debug!(error = %err, "show failed");
            Ok(false)
        }
        CycleOutcome::Skipped => Err(anyhow::anyhow!("City name must not be empty")),
        CycleOutcome::Ready | CycleOutcome::ReadyWithoutForecast | CycleOutcome::Superseded => {
            Ok(true)
        }
    }
}

fn build_flow(config: &Config, position: Option<Coordinates>) -> anyhow::Result<WeatherResolutionFlow> {
    let client = Arc::new(client_from_config(config)?);

    Ok(WeatherResolutionFlow::new(
        client.clone(),
        client,
        Arc::new(StaticLocation::new(position)),
        Arc::new(TerminalPresenter),
    ))
}

async fn interactive(flow: &WeatherResolutionFlow) -> anyhow::Result<()> {
    flow.on_mount().await;
    print!("{}", render(&flow.state()));

    loop {
        let input = Text::new("Search by city...")
            .with_help_message("Enter to refresh from your position, q to quit")
            .prompt()
            .context("Failed to read search input")?;

        match input.trim() {
            "q" | "quit" => return Ok(()),
            "" => {
                flow.on_refresh_pull().await;
            }
            city => {
                flow.on_search_submit(city).await;
            }
        }

        println!();
        print!("{}", render(&flow.state()));
    }
}

fn configure() -> anyhow::Result<()> {
    // Read the file directly so an environment override is never written back.
    let path = Config::config_file_path()?;
    let mut config = Config::load_from(&path)?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let set_position = Confirm::new("Store a default position?")
        .with_default(config.location.is_some())
        .prompt()
        .context("Failed to read answer")?;

    if set_position {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number between -90 and 90")
            .prompt()
            .context("Failed to read latitude")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number between -180 and 180")
            .prompt()
            .context("Failed to read longitude")?;

        let coordinates = Coordinates::new(latitude, longitude);
        coordinates.validate()?;
        config.set_location(Some(coordinates));
    } else {
        config.set_location(None);
    }

    config.save_to(&path)?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use weathernow_core::{ClientError, FlowError, Origin};

    #[test]
    fn failed_cycle_exits_without_error_chain() {
        let outcome = CycleOutcome::Failed(FlowError::Weather {
            origin: Origin::Search,
            source: ClientError::NotFound("Qwxyzzy".into()),
        });
        assert!(!show_succeeded(outcome).unwrap());
        assert!(!show_succeeded(CycleOutcome::Failed(FlowError::PermissionDenied)).unwrap());
    }

    #[test]
    fn ready_cycles_succeed() {
        assert!(show_succeeded(CycleOutcome::Ready).unwrap());
        assert!(show_succeeded(CycleOutcome::ReadyWithoutForecast).unwrap());
    }

    #[test]
    fn blank_city_is_an_error() {
        let err = show_succeeded(CycleOutcome::Skipped).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn position_flags_override_config() {
        let mut config = Config::default();
        config.set_location(Some(Coordinates::new(1.0, 2.0)));

        let flags = PositionArgs { lat: Some(-33.87), lon: Some(151.21) };
        assert_eq!(flags.resolve(&config), Some(Coordinates::new(-33.87, 151.21)));

        let none = PositionArgs { lat: None, lon: None };
        assert_eq!(none.resolve(&config), Some(Coordinates::new(1.0, 2.0)));
    }
}
