use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use tracing::debug;
use weatherdeck_core::{Config, Location, Units, WeatherRequest, provider_from_config};

use crate::output;

/// Cities offered when `show` is run without a location.
pub const QUICK_PICKS: &[&str] = &["London", "Sydney", "Tokyo", "Toronto", "Paris"];

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdeck", version, about = "Weather dashboard in the terminal")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default units.
    Configure,

    /// Show current conditions and forecast for a location.
    Show {
        /// City name; omit to pick from the quick-pick list.
        city: Option<String>,

        #[arg(long, requires = "lon", conflicts_with = "city", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", conflicts_with = "city", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// "metric" or "imperial"; defaults to the configured units.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,

        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List the quick-pick cities.
    Cities,
}

fn parse_units(value: &str) -> Result<Units, String> {
    Units::try_from(value).map_err(|e| e.to_string())
}

/// Location from explicit arguments, if any were given.
fn explicit_location(
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Option<Location> {
    match (lat, lon, city) {
        (Some(lat), Some(lon), _) => Some(Location::Coordinates { lat, lon }),
        (_, _, Some(city)) => Some(Location::City(city)),
        _ => None,
    }
}

fn pick_city() -> anyhow::Result<Location> {
    let city = Select::new("City:", QUICK_PICKS.to_vec())
        .prompt()
        .context("No city selected")?;
    Ok(Location::City(city.to_string()))
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show { city, lat, lon, units, json } => {
                let config = Config::load()?;
                let location = match explicit_location(city, lat, lon) {
                    Some(location) => location,
                    None => pick_city()?,
                };
                let units = units.unwrap_or_else(|| config.default_units());

                let provider = provider_from_config(&config)?;
                let request = WeatherRequest { location, units };
                debug!(location = %request.location, %units, "fetching weather");
                let report = provider
                    .get_weather(&request)
                    .await
                    .with_context(|| format!("Could not load weather for {}", request.location))?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    print!("{}", output::render(&report, units, |code| provider.icon_url(code))?);
                }
            }
            Command::Cities => {
                for city in QUICK_PICKS {
                    println!("{city}");
                }
            }
        }

        Ok(())
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("API key prompt aborted")?;
    let units = Select::new("Default units:", Units::all().to_vec())
        .prompt()
        .context("Units prompt aborted")?;

    config.api_key = Some(api_key.trim().to_string());
    config.units = Some(units);

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_city_and_units() {
        let cli = Cli::try_parse_from(["weatherdeck", "show", "Tokyo", "--units", "imperial"]).unwrap();
        match cli.command {
            Command::Show { city, units, json, .. } => {
                assert_eq!(city.as_deref(), Some("Tokyo"));
                assert_eq!(units, Some(Units::Imperial));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_negative_coordinates() {
        let cli =
            Cli::try_parse_from(["weatherdeck", "show", "--lat", "51.5", "--lon", "-0.12"]).unwrap();
        match cli.command {
            Command::Show { lat, lon, .. } => {
                assert_eq!(explicit_location(None, lat, lon), Some(Location::Coordinates { lat: 51.5, lon: -0.12 }));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["weatherdeck", "show", "--lat", "51.5"]).is_err());
    }

    #[test]
    fn rejects_unknown_units() {
        assert!(Cli::try_parse_from(["weatherdeck", "show", "Paris", "--units", "kelvin"]).is_err());
    }

    #[test]
    fn no_location_means_interactive_pick() {
        assert_eq!(explicit_location(None, None, None), None);
        assert_eq!(
            explicit_location(Some("Paris".into()), None, None),
            Some(Location::City("Paris".into()))
        );
    }
}
