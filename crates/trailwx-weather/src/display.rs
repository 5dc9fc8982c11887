//! Display rows for a list sink.
//!
//! Turns a [`Forecast`] into ordered rows (id, title, subtitle, icon) and a
//! headline summary, formatting quantities in the preferred units.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Offset, Timelike, Utc};
use serde::Serialize;

use crate::location::Coordinate;
use crate::normalize::top_of_hour;
use crate::types::Forecast;
use crate::units::{SpeedUnit, TemperatureUnit};

const HOURLY_HEADER_ID: i64 = 0;
const DAILY_HEADER_ID: i64 = 1;
const DAYS_FROM_CE_TO_UNIX_EPOCH: i64 = 719_163;
const SEPARATOR: &str = "  -  ";

/// Unit and window preferences for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayUnits {
    pub temperature: TemperatureUnit,
    pub speed: SpeedUnit,
    pub hourly_window_hours: i64,
}

impl Default for DisplayUnits {
    fn default() -> Self {
        Self {
            temperature: TemperatureUnit::default(),
            speed: SpeedUnit::default(),
            hourly_window_hours: 24,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub icon: Option<&'static str>,
}

impl ListRow {
    fn header(id: i64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            subtitle: None,
            icon: None,
        }
    }
}

/// Format an hour of day (0-23), e.g. `13` as `"1 PM"`.
pub fn format_hour(hour: u32, include_am_pm: bool) -> String {
    if !include_am_pm {
        return (hour % 24).to_string();
    }
    let suffix = if hour < 12 { "AM" } else { "PM" };
    let h = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{h} {suffix}")
}

fn rounded(value: f64) -> i64 {
    value.round() as i64
}

fn percent(fraction: f64) -> i64 {
    rounded(fraction * 100.0)
}

fn location_offset(forecast: &Forecast) -> FixedOffset {
    FixedOffset::east_opt(forecast.utc_offset_seconds).unwrap_or_else(|| Utc.fix())
}

/// Rows for the hourly section followed by the daily section.
pub fn build_rows(forecast: &Forecast, now: DateTime<Utc>, units: &DisplayUnits) -> Vec<ListRow> {
    let offset = location_offset(forecast);
    let hour_start = top_of_hour(now, offset);
    let window_end = Duration::try_hours(units.hourly_window_hours)
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let local_now = now.with_timezone(&offset);

    let mut rows = vec![ListRow::header(HOURLY_HEADER_ID, "HOURLY")];

    rows.extend(
        forecast
            .hourly
            .iter()
            // Normalized forecasts start after the current hour; a forecast
            // rendered in a later hour than it was normalized still holds it.
            .filter(|s| s.time >= hour_start && s.time < window_end)
            .map(|s| {
                let local = s.time.with_timezone(&offset);
                let is_now =
                    local.date_naive() == local_now.date_naive() && local.hour() == local_now.hour();
                let label = if is_now {
                    "Now".to_string()
                } else {
                    format_hour(local.hour(), true)
                };

                ListRow {
                    id: s.time.timestamp_millis(),
                    title: format!("{label}{SEPARATOR}{}", s.condition.description()),
                    subtitle: Some(format!(
                        "{}°{SEPARATOR}{}% precip.{SEPARATOR}{}% humidity{SEPARATOR}{} {}",
                        rounded(s.temperature.in_unit(units.temperature)),
                        percent(s.precipitation_probability),
                        percent(s.humidity),
                        rounded(s.wind_speed.in_unit(units.speed)),
                        units.speed.label(),
                    )),
                    icon: Some(s.condition.icon_name()),
                }
            }),
    );

    rows.push(ListRow::header(DAILY_HEADER_ID, "DAILY"));

    rows.extend(forecast.daily.iter().map(|d| ListRow {
        id: i64::from(d.date.num_days_from_ce()) - DAYS_FROM_CE_TO_UNIX_EPOCH,
        title: format!(
            "{}/{}{SEPARATOR}{}",
            d.date.month(),
            d.date.day(),
            d.condition.description()
        ),
        subtitle: Some(format!(
            "{}° / {}°",
            rounded(d.high.in_unit(units.temperature)),
            rounded(d.low.in_unit(units.temperature))
        )),
        icon: Some(d.condition.icon_name()),
    }));

    rows
}

/// Headline for the current conditions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentSummary {
    pub temperature: String,
    pub description: &'static str,
    pub icon: &'static str,
    /// Today's `"high° / low°"`, or `"-"` when today is not in the forecast
    pub high_low: String,
}

impl CurrentSummary {
    pub fn from_forecast(forecast: &Forecast, now: DateTime<Utc>, units: &DisplayUnits) -> Self {
        let today = now.with_timezone(&location_offset(forecast)).date_naive();
        let high_low = forecast
            .daily
            .iter()
            .find(|d| d.date == today)
            .map(|d| {
                format!(
                    "{}° / {}°",
                    rounded(d.high.in_unit(units.temperature)),
                    rounded(d.low.in_unit(units.temperature))
                )
            })
            .unwrap_or_else(|| "-".to_string());

        let current = &forecast.current;
        Self {
            temperature: format!("{}°", rounded(current.temperature.in_unit(units.temperature))),
            description: current.condition.description(),
            icon: current.condition.icon_name(),
            high_low,
        }
    }
}

/// Place name when known, otherwise the coordinate to two decimals.
pub fn location_label(place: Option<&str>, coordinate: &Coordinate) -> String {
    match place {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => coordinate.to_decimal_degrees(2),
    }
}
