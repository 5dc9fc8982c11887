use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Coordinate;
use crate::units::{Distance, Speed, Temperature};

/// Weather condition categories mapped from WMO codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    #[default]
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Drizzle,
    Rain,
    HeavyRain,
    Snow,
    Sleet,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert a WMO weather interpretation code.
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 | 2 => Self::PartlyCloudy,
            3 => Self::Cloudy,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            // Freezing drizzle and freezing rain
            56 | 57 | 66 | 67 => Self::Sleet,
            61 | 63 | 80 => Self::Rain,
            65 | 81 | 82 => Self::HeavyRain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snow,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Clear,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::Rain => "Rain",
            Self::HeavyRain => "Heavy Rain",
            Self::Snow => "Snow",
            Self::Sleet => "Sleet",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Icon reference handed to the list sink.
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clear => "sun",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Fog => "cloud_fog",
            Self::Drizzle | Self::Rain | Self::HeavyRain => "cloud_rain",
            Self::Snow | Self::Sleet => "cloud_snow",
            Self::Thunderstorm => "cloud_lightning",
        }
    }
}

/// One time-stamped bundle of conditions. Used for both the current
/// observation and each hourly forecast entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub time: DateTime<Utc>,
    pub temperature: Temperature,
    pub feels_like: Temperature,
    /// Relative humidity, 0.0 to 1.0
    pub humidity: f64,
    /// Probability of precipitation, 0.0 to 1.0
    pub precipitation_probability: f64,
    pub precipitation: Distance,
    pub rain: Distance,
    pub showers: Distance,
    pub snowfall: Distance,
    pub snow_depth: Distance,
    pub weather_code: i32,
    pub condition: WeatherCondition,
    /// Cloud cover, 0.0 to 1.0
    pub cloud_cover: f64,
    /// `None` when the model reports no visibility
    pub visibility: Option<Distance>,
    pub wind_speed: Speed,
    pub wind_gusts: Speed,
    pub uv_index: f64,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub condition: WeatherCondition,
    pub high: Temperature,
    pub low: Temperature,
    pub max_wind_speed: Speed,
    pub max_wind_gusts: Speed,
    pub snowfall: Distance,
    pub showers: Distance,
    pub rain: Distance,
    pub uv_index: f64,
}

/// Normalized forecast bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Grid point the provider generated the forecast for
    pub location: Coordinate,
    pub timezone: String,
    pub utc_offset_seconds: i32,
    pub current: WeatherSample,
    /// Ascending by time, all strictly after the current top-of-hour
    pub hourly: Vec<WeatherSample>,
    /// Ascending by date, starting no earlier than yesterday
    pub daily: Vec<DayForecast>,
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Provider returned HTTP {0}")]
    HttpStatus(u16),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Not available: {0}")]
    NotAvailable(String),
    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),
}

impl From<serde_json::Error> for WeatherError {
    fn from(e: serde_json::Error) -> Self {
        WeatherError::Parse(e.to_string())
    }
}
