mod error_mapping;

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use trailwx_core::{AppError, Config, WeatherError};
use trailwx_weather::{
    build_rows, location_label, request_fetch, Coordinate, CurrentSummary, DisplayUnits,
    Distance, Forecast, FreshnessWindow, ProviderSettings, WeatherCache, WeatherProvider,
    WeatherServiceMessage,
};

use crate::error_mapping::IntoAppError;

/// Show the weather forecast for a location
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    lon: Option<f64>,

    /// Place name shown instead of the coordinate
    #[arg(long)]
    place: Option<String>,

    /// Print the normalized forecast as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    trailwx_core::init()?;
    let mut app = match trailwx_core::App::new() {
        Ok(app) => app,
        Err(e) => {
            report(&e);
            std::process::exit(1);
        }
    };

    let code = match run(&cli, app.config()) {
        Ok(()) => 0,
        Err(e) => {
            report(&e);
            1
        }
    };

    app.shutdown()?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn report(e: &AppError) {
    tracing::error!("{}", e);
    eprintln!("{}", e.user_message());
}

/// How long to wait on the channel; the fetch itself gives up after `timeout`.
fn result_wait(timeout: Duration) -> Duration {
    timeout.saturating_add(Duration::from_secs(1))
}

/// Coordinate and display name from the command line, else from the config.
fn resolve_location(cli: &Cli, config: &Config) -> Result<(Coordinate, Option<String>), AppError> {
    let (latitude, longitude, place) = match (cli.lat, cli.lon, &config.location) {
        (Some(lat), Some(lon), _) => (lat, lon, cli.place.clone()),
        (_, _, Some(loc)) => (
            loc.latitude,
            loc.longitude,
            cli.place.clone().or_else(|| loc.place_name.clone()),
        ),
        _ => {
            return Err(WeatherError::LocationNotFound(
                "no coordinate given and none configured".to_string(),
            )
            .into())
        }
    };

    let coordinate = Coordinate::new(latitude, longitude)
        .map_err(|e| WeatherError::LocationNotFound(e.to_string()))?;
    Ok((coordinate, place))
}

fn provider_settings(config: &Config) -> ProviderSettings {
    ProviderSettings {
        base_url: config.weather.api_base_url.clone(),
        request_timeout: Duration::from_secs(config.weather.request_timeout_secs),
        freshness: FreshnessWindow {
            max_age: chrono::Duration::minutes(i64::from(config.weather.cache_max_age_minutes)),
            max_distance: Distance::from_miles(config.weather.cache_max_distance_miles),
        },
    }
}

fn display_units(config: &Config) -> DisplayUnits {
    DisplayUnits {
        temperature: match config.display.temperature_unit {
            trailwx_core::TemperatureUnit::Celsius => trailwx_weather::TemperatureUnit::Celsius,
            trailwx_core::TemperatureUnit::Fahrenheit => {
                trailwx_weather::TemperatureUnit::Fahrenheit
            }
        },
        speed: match config.display.speed_unit {
            trailwx_core::SpeedUnit::Kph => trailwx_weather::SpeedUnit::Kph,
            trailwx_core::SpeedUnit::Mph => trailwx_weather::SpeedUnit::Mph,
        },
        hourly_window_hours: i64::from(config.display.hourly_window_hours),
    }
}

fn run(cli: &Cli, config: &Config) -> Result<(), AppError> {
    let (coordinate, place) = resolve_location(cli, config)?;

    let cache = WeatherCache::new(&config.cache_dir);
    let provider = WeatherProvider::new(cache, provider_settings(config))
        .map_err(IntoAppError::into_app_error)?;
    let provider = Arc::new(provider);

    let runtime = tokio::runtime::Runtime::new()?;
    let (tx, rx) = mpsc::channel();
    let timeout = Duration::from_secs(config.weather.fetch_timeout_secs);

    tracing::info!("Requesting forecast for {}", coordinate);
    request_fetch(runtime.handle(), &tx, provider, coordinate, timeout);

    let forecast = match rx.recv_timeout(result_wait(timeout)) {
        Ok(WeatherServiceMessage::FetchDone(result)) => {
            result.map_err(IntoAppError::into_app_error)?
        }
        Err(e) => {
            tracing::warn!("No fetch result received: {}", e);
            return Err(WeatherError::ServiceUnavailable.into());
        }
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&forecast).map_err(anyhow::Error::from)?;
        println!("{json}");
    } else {
        print_forecast(&forecast, place.as_deref(), &display_units(config));
    }

    Ok(())
}

fn print_forecast(forecast: &Forecast, place: Option<&str>, units: &DisplayUnits) {
    let now = chrono::Utc::now();
    let summary = CurrentSummary::from_forecast(forecast, now, units);

    println!("{}", location_label(place, &forecast.location));
    println!(
        "{}  {}  ({})",
        summary.temperature, summary.description, summary.high_low
    );

    for row in build_rows(forecast, now, units) {
        match &row.subtitle {
            Some(subtitle) => println!("  {:<28}{}", row.title, subtitle),
            None => println!("\n{}", row.title),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use trailwx_core::LocationConfig;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("trailwx").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_accepts_negative_longitude() {
        let cli = cli(&["--lat", "39.74", "--lon", "-104.99", "--json"]);
        assert_eq!(cli.lon, Some(-104.99));
        assert!(cli.json);
    }

    #[test]
    fn test_cli_requires_both_coordinates() {
        assert!(Cli::try_parse_from(["trailwx", "--lat", "39.74"]).is_err());
    }

    #[test]
    fn test_location_falls_back_to_config() {
        let mut config = Config::default();
        config.location = Some(LocationConfig {
            latitude: 39.74,
            longitude: -104.99,
            place_name: Some("Denver".to_string()),
        });

        let (coordinate, place) = resolve_location(&cli(&[]), &config).unwrap();
        assert_eq!(coordinate.latitude, 39.74);
        assert_eq!(place.as_deref(), Some("Denver"));

        let (coordinate, place) =
            resolve_location(&cli(&["--lat", "47.6", "--lon", "-122.3"]), &config).unwrap();
        assert_eq!(coordinate.longitude, -122.3);
        assert!(place.is_none());
    }

    #[test]
    fn test_missing_location_is_location_not_found() {
        let err = resolve_location(&cli(&[]), &Config::default()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Weather(WeatherError::LocationNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_coordinate_is_rejected() {
        let err = resolve_location(&cli(&["--lat", "120", "--lon", "0"]), &Config::default())
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Weather(WeatherError::LocationNotFound(_))
        ));
    }

    #[test]
    fn test_result_wait_saturates() {
        assert_eq!(result_wait(Duration::from_secs(30)), Duration::from_secs(31));
        assert_eq!(result_wait(Duration::from_secs(u64::MAX)), Duration::MAX);
    }

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.weather.cache_max_age_minutes = 30;
        config.display.temperature_unit = trailwx_core::TemperatureUnit::Celsius;

        let settings = provider_settings(&config);
        assert_eq!(settings.freshness.max_age, chrono::Duration::minutes(30));
        assert_eq!(settings.request_timeout, Duration::from_secs(10));

        let units = display_units(&config);
        assert_eq!(units.temperature, trailwx_weather::TemperatureUnit::Celsius);
        assert_eq!(units.hourly_window_hours, 24);
    }
}
