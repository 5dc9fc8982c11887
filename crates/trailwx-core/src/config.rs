use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

const APP_DIR: &str = "trailwx";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Directory holding the forecast cache file
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Provider, timeout and cache freshness settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Rendering preferences
    #[serde(default)]
    pub display: DisplayConfig,

    /// Default location used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,
}

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Celsius,
    #[default]
    Fahrenheit,
}

/// Wind speed unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedUnit {
    Kph,
    #[default]
    Mph,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the Open-Meteo compatible forecast API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Overall deadline for a background fetch in seconds
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// A cached forecast older than this is refetched
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_minutes: u32,

    /// A cached forecast farther away than this is refetched
    #[serde(default = "default_cache_max_distance")]
    pub cache_max_distance_miles: f64,
}

fn default_api_base_url() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_cache_max_age() -> u32 {
    60
}

fn default_cache_max_distance() -> f64 {
    5.0
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            cache_max_age_minutes: default_cache_max_age(),
            cache_max_distance_miles: default_cache_max_distance(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,

    #[serde(default)]
    pub speed_unit: SpeedUnit,

    /// How many hours ahead the hourly section reaches
    #[serde(default = "default_hourly_window")]
    pub hourly_window_hours: u32,
}

fn default_hourly_window() -> u32 {
    24
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::default(),
            speed_unit: SpeedUnit::default(),
            hourly_window_hours: default_hourly_window(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            cache_dir: default_cache_dir(),
            weather: WeatherConfig::default(),
            display: DisplayConfig::default(),
            location: None,
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it is missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Wrote default config to {}", path.display());
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        Self::validated(Self::load()?)
    }

    fn validated(config: Self) -> Result<(Self, ValidationResult), ConfigError> {
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.weather.fetch_timeout_secs == 0 {
            result.add_error(
                "weather.fetch_timeout_secs",
                "Fetch timeout must be greater than 0",
            );
        } else if self.weather.fetch_timeout_secs < self.weather.request_timeout_secs {
            result.add_warning(
                "weather.fetch_timeout_secs",
                "Fetch timeout is shorter than the request timeout",
            );
        }

        if self.weather.cache_max_age_minutes == 0 {
            result.add_warning(
                "weather.cache_max_age_minutes",
                "Forecast cache disabled (0 minutes)",
            );
        } else if self.weather.cache_max_age_minutes > 1440 {
            result.add_warning(
                "weather.cache_max_age_minutes",
                "Cached forecasts are reused for more than 24 hours",
            );
        }

        let distance = self.weather.cache_max_distance_miles;
        if !distance.is_finite() || distance < 0.0 {
            result.add_error(
                "weather.cache_max_distance_miles",
                "Cache distance must be a non-negative number",
            );
        } else if distance > 100.0 {
            result.add_warning(
                "weather.cache_max_distance_miles",
                "Cached forecasts are reused more than 100 miles away",
            );
        }

        if self.display.hourly_window_hours == 0 {
            result.add_warning("display.hourly_window_hours", "Hourly section will be empty");
        } else if self.display.hourly_window_hours > 168 {
            result.add_warning(
                "display.hourly_window_hours",
                "Hourly window is longer than the forecast horizon",
            );
        }

        if let Some(location) = &self.location {
            if !(-90.0..=90.0).contains(&location.latitude) {
                result.add_error(
                    "location.latitude",
                    format!("Latitude out of range: {}", location.latitude),
                );
            }
            if !(-180.0..=180.0).contains(&location.longitude) {
                result.add_error(
                    "location.longitude",
                    format!("Longitude out of range: {}", location.longitude),
                );
            }
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`, creating its directory
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("failed to serialize config: {e}")))?;

        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::MissingSetting("platform config directory".to_string()))?
            .join(APP_DIR);

        Ok(config_dir.join("config.toml"))
    }
}
