//! Open-Meteo wire format.
//!
//! Series fields are parallel arrays indexed by the `time` array. Timestamps
//! are local-naive (`YYYY-MM-DDTHH:MM`) in the zone given by
//! `utc_offset_seconds`.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::location::Coordinate;
use crate::types::WeatherError;

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawForecastResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub generationtime_ms: f64,
    pub timezone: String,
    pub utc_offset_seconds: i32,
    pub current: CurrentDto,
    pub hourly: HourlyDto,
    pub daily: DailyDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentDto {
    pub time: String,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub apparent_temperature: f64,
    pub precipitation: f64,
    pub rain: f64,
    pub showers: f64,
    pub snowfall: f64,
    pub weather_code: i32,
    pub cloud_cover: f64,
    pub wind_speed_10m: f64,
    pub wind_gusts_10m: f64,
}

/// Some models have no precipitation probability, snow depth, visibility or
/// UV series and report `null` entries for them; those fields are optional.
/// Every other series must be complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyDto {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub apparent_temperature: Vec<f64>,
    pub relative_humidity_2m: Vec<f64>,
    pub precipitation_probability: Vec<Option<f64>>,
    pub precipitation: Vec<f64>,
    pub rain: Vec<f64>,
    pub showers: Vec<f64>,
    pub snowfall: Vec<f64>,
    pub snow_depth: Vec<Option<f64>>,
    pub weather_code: Vec<i32>,
    pub cloud_cover: Vec<f64>,
    pub visibility: Vec<Option<f64>>,
    pub wind_speed_10m: Vec<f64>,
    pub wind_gusts_10m: Vec<f64>,
    pub uv_index: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyDto {
    pub time: Vec<String>,
    pub weather_code: Vec<i32>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub uv_index_max: Vec<Option<f64>>,
    pub snowfall_sum: Vec<f64>,
    pub showers_sum: Vec<f64>,
    pub rain_sum: Vec<f64>,
    pub wind_speed_10m_max: Vec<f64>,
    pub wind_gusts_10m_max: Vec<f64>,
}

impl RawForecastResponse {
    pub fn parse(body: &str) -> Result<Self, WeatherError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Grid coordinate the provider generated the forecast for.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn offset(&self) -> Result<FixedOffset, WeatherError> {
        FixedOffset::east_opt(self.utc_offset_seconds).ok_or_else(|| {
            WeatherError::Parse(format!(
                "utc_offset_seconds out of range: {}",
                self.utc_offset_seconds
            ))
        })
    }

    /// Absolute instant of the `current` sample.
    pub fn generated_at(&self) -> Result<DateTime<Utc>, WeatherError> {
        parse_local_time(&self.current.time, self.offset()?)
    }
}

/// Interpret a local-naive provider timestamp in the given offset.
pub fn parse_local_time(value: &str, offset: FixedOffset) -> Result<DateTime<Utc>, WeatherError> {
    let naive = NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT)
        .map_err(|e| WeatherError::Parse(format!("invalid time {value:?}: {e}")))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| WeatherError::Parse(format!("ambiguous local time {value:?}")))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, WeatherError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| WeatherError::Parse(format!("invalid date {value:?}: {e}")))
}
