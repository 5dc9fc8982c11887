//! DTO-to-domain mapping.
//!
//! Parallel arrays are validated for equal length before they are zipped into
//! samples. Hourly samples are kept only when strictly after the location's
//! current top-of-hour; daily samples from yesterday (location calendar) on.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

use crate::dto::{parse_date, parse_local_time, DailyDto, HourlyDto, RawForecastResponse};
use crate::types::{DayForecast, Forecast, WeatherCondition, WeatherError, WeatherSample};
use crate::units::{Distance, Speed, Temperature};

/// Convert a 0-100 percentage into a 0-1 fraction.
fn fraction(percent: f64) -> f64 {
    (percent / 100.0).clamp(0.0, 1.0)
}

fn check_len(series: &str, field: &str, actual: usize, expected: usize) -> Result<(), WeatherError> {
    if actual == expected {
        Ok(())
    } else {
        Err(WeatherError::Parse(format!(
            "{series}.{field} has {actual} entries, expected {expected}"
        )))
    }
}

/// Start of the current hour in the location's offset, as an instant.
pub fn top_of_hour(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local = now.with_timezone(&offset).naive_local();
    local
        .date()
        .and_hms_opt(local.hour(), 0, 0)
        .and_then(|t| offset.from_local_datetime(&t).single())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Yesterday's date on the location's calendar.
pub fn yesterday(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    let today = now.with_timezone(&offset).date_naive();
    today.pred_opt().unwrap_or(today)
}

/// Map every hourly entry, in provider order, without filtering.
pub fn hourly_samples(
    hourly: &HourlyDto,
    offset: FixedOffset,
) -> Result<Vec<WeatherSample>, WeatherError> {
    let n = hourly.time.len();
    let lengths = [
        ("temperature_2m", hourly.temperature_2m.len()),
        ("apparent_temperature", hourly.apparent_temperature.len()),
        ("relative_humidity_2m", hourly.relative_humidity_2m.len()),
        ("precipitation_probability", hourly.precipitation_probability.len()),
        ("precipitation", hourly.precipitation.len()),
        ("rain", hourly.rain.len()),
        ("showers", hourly.showers.len()),
        ("snowfall", hourly.snowfall.len()),
        ("snow_depth", hourly.snow_depth.len()),
        ("weather_code", hourly.weather_code.len()),
        ("cloud_cover", hourly.cloud_cover.len()),
        ("visibility", hourly.visibility.len()),
        ("wind_speed_10m", hourly.wind_speed_10m.len()),
        ("wind_gusts_10m", hourly.wind_gusts_10m.len()),
        ("uv_index", hourly.uv_index.len()),
    ];
    for (field, len) in lengths {
        check_len("hourly", field, len, n)?;
    }

    (0..n)
        .map(|i| {
            let code = hourly.weather_code[i];
            Ok(WeatherSample {
                time: parse_local_time(&hourly.time[i], offset)?,
                temperature: Temperature::from_celsius(hourly.temperature_2m[i]),
                feels_like: Temperature::from_celsius(hourly.apparent_temperature[i]),
                humidity: fraction(hourly.relative_humidity_2m[i]),
                precipitation_probability: hourly.precipitation_probability[i]
                    .map(fraction)
                    .unwrap_or(0.0),
                precipitation: Distance::from_millimeters(hourly.precipitation[i]),
                rain: Distance::from_millimeters(hourly.rain[i]),
                showers: Distance::from_millimeters(hourly.showers[i]),
                snowfall: Distance::from_centimeters(hourly.snowfall[i]),
                snow_depth: Distance::from_meters(hourly.snow_depth[i].unwrap_or(0.0)),
                weather_code: code,
                condition: WeatherCondition::from_wmo_code(code),
                cloud_cover: fraction(hourly.cloud_cover[i]),
                visibility: hourly.visibility[i].map(Distance::from_meters),
                wind_speed: Speed::from_kilometers_per_hour(hourly.wind_speed_10m[i]),
                wind_gusts: Speed::from_kilometers_per_hour(hourly.wind_gusts_10m[i]),
                uv_index: hourly.uv_index[i].unwrap_or(0.0),
            })
        })
        .collect()
}

/// Map every daily entry, in provider order, without filtering.
pub fn daily_samples(daily: &DailyDto) -> Result<Vec<DayForecast>, WeatherError> {
    let n = daily.time.len();
    let lengths = [
        ("weather_code", daily.weather_code.len()),
        ("temperature_2m_max", daily.temperature_2m_max.len()),
        ("temperature_2m_min", daily.temperature_2m_min.len()),
        ("uv_index_max", daily.uv_index_max.len()),
        ("snowfall_sum", daily.snowfall_sum.len()),
        ("showers_sum", daily.showers_sum.len()),
        ("rain_sum", daily.rain_sum.len()),
        ("wind_speed_10m_max", daily.wind_speed_10m_max.len()),
        ("wind_gusts_10m_max", daily.wind_gusts_10m_max.len()),
    ];
    for (field, len) in lengths {
        check_len("daily", field, len, n)?;
    }

    (0..n)
        .map(|i| {
            let code = daily.weather_code[i];
            Ok(DayForecast {
                date: parse_date(&daily.time[i])?,
                weather_code: code,
                condition: WeatherCondition::from_wmo_code(code),
                high: Temperature::from_celsius(daily.temperature_2m_max[i]),
                low: Temperature::from_celsius(daily.temperature_2m_min[i]),
                max_wind_speed: Speed::from_kilometers_per_hour(daily.wind_speed_10m_max[i]),
                max_wind_gusts: Speed::from_kilometers_per_hour(daily.wind_gusts_10m_max[i]),
                snowfall: Distance::from_centimeters(daily.snowfall_sum[i]),
                showers: Distance::from_millimeters(daily.showers_sum[i]),
                rain: Distance::from_millimeters(daily.rain_sum[i]),
                uv_index: daily.uv_index_max[i].unwrap_or(0.0),
            })
        })
        .collect()
}

/// Build the normalized forecast as seen at `now`.
pub fn normalize(raw: &RawForecastResponse, now: DateTime<Utc>) -> Result<Forecast, WeatherError> {
    let offset = raw.offset()?;
    let current_time = raw.generated_at()?;
    let all_hourly = hourly_samples(&raw.hourly, offset)?;

    // The current endpoint has no visibility, precipitation probability or UV
    let first = all_hourly
        .first()
        .ok_or_else(|| WeatherError::NotAvailable("hourly series is empty".to_string()))?;
    let nearest = all_hourly
        .iter()
        .min_by_key(|s| (s.time - current_time).num_seconds().abs())
        .unwrap_or(first);

    let c = &raw.current;
    let current = WeatherSample {
        time: current_time,
        temperature: Temperature::from_celsius(c.temperature_2m),
        feels_like: Temperature::from_celsius(c.apparent_temperature),
        humidity: fraction(c.relative_humidity_2m),
        precipitation_probability: nearest.precipitation_probability,
        precipitation: Distance::from_millimeters(c.precipitation),
        rain: Distance::from_millimeters(c.rain),
        showers: Distance::from_millimeters(c.showers),
        snowfall: Distance::from_centimeters(c.snowfall),
        snow_depth: nearest.snow_depth,
        weather_code: c.weather_code,
        condition: WeatherCondition::from_wmo_code(c.weather_code),
        cloud_cover: fraction(c.cloud_cover),
        visibility: first.visibility,
        wind_speed: Speed::from_kilometers_per_hour(c.wind_speed_10m),
        wind_gusts: Speed::from_kilometers_per_hour(c.wind_gusts_10m),
        uv_index: nearest.uv_index,
    };

    let hour_start = top_of_hour(now, offset);
    let mut hourly: Vec<WeatherSample> = all_hourly
        .into_iter()
        .filter(|s| s.time > hour_start)
        .collect();
    hourly.sort_by_key(|s| s.time);

    let earliest = yesterday(now, offset);
    let mut daily: Vec<DayForecast> = daily_samples(&raw.daily)?
        .into_iter()
        .filter(|d| d.date >= earliest)
        .collect();
    daily.sort_by_key(|d| d.date);

    Ok(Forecast {
        location: raw.coordinate(),
        timezone: raw.timezone.clone(),
        utc_offset_seconds: raw.utc_offset_seconds,
        current,
        hourly,
        daily,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::dto::{CurrentDto, DailyDto, HourlyDto};

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn hourly(times: &[&str], humidity: &[f64]) -> HourlyDto {
        let n = times.len();
        HourlyDto {
            time: times.iter().map(|t| t.to_string()).collect(),
            temperature_2m: (0..n).map(|i| 10.0 + i as f64).collect(),
            apparent_temperature: vec![9.0; n],
            relative_humidity_2m: humidity.to_vec(),
            precipitation_probability: (0..n).map(|i| Some((i * 10) as f64)).collect(),
            precipitation: vec![0.4; n],
            rain: vec![0.3; n],
            showers: vec![0.1; n],
            snowfall: vec![0.0; n],
            snow_depth: vec![Some(0.0); n],
            weather_code: vec![61; n],
            cloud_cover: vec![100.0; n],
            visibility: (0..n).map(|i| Some(20_000.0 + i as f64)).collect(),
            wind_speed_10m: vec![16.0; n],
            wind_gusts_10m: vec![30.0; n],
            uv_index: (0..n).map(|i| Some(i as f64)).collect(),
        }
    }

    fn daily(dates: &[&str]) -> DailyDto {
        let n = dates.len();
        DailyDto {
            time: dates.iter().map(|d| d.to_string()).collect(),
            weather_code: vec![3; n],
            temperature_2m_max: vec![18.0; n],
            temperature_2m_min: vec![7.0; n],
            uv_index_max: vec![Some(4.5); n],
            snowfall_sum: vec![0.0; n],
            showers_sum: vec![1.0; n],
            rain_sum: vec![2.0; n],
            wind_speed_10m_max: vec![20.0; n],
            wind_gusts_10m_max: vec![40.0; n],
        }
    }

    fn response(hourly: HourlyDto, daily: DailyDto) -> RawForecastResponse {
        RawForecastResponse {
            latitude: 47.6,
            longitude: -122.3,
            generationtime_ms: 0.5,
            timezone: "UTC".to_string(),
            utc_offset_seconds: 0,
            current: CurrentDto {
                time: "2026-10-16T12:15".to_string(),
                temperature_2m: 15.0,
                relative_humidity_2m: 80.0,
                apparent_temperature: 14.0,
                precipitation: 0.2,
                rain: 0.2,
                showers: 0.0,
                snowfall: 0.0,
                weather_code: 2,
                cloud_cover: 45.0,
                wind_speed_10m: 12.0,
                wind_gusts_10m: 25.0,
            },
            hourly,
            daily,
        }
    }

    #[test]
    fn test_hourly_excludes_current_hour_and_earlier() {
        let raw = response(
            hourly(
                &["2026-10-16T11:00", "2026-10-16T12:00", "2026-10-16T13:00", "2026-10-16T14:00"],
                &[50.0; 4],
            ),
            daily(&["2026-10-16"]),
        );
        let forecast = normalize(&raw, utc("2026-10-16T12:40:00Z")).unwrap();

        let times: Vec<String> = forecast.hourly.iter().map(|s| s.time.to_rfc3339()).collect();
        assert_eq!(
            times,
            vec!["2026-10-16T13:00:00+00:00", "2026-10-16T14:00:00+00:00"]
        );
    }

    #[test]
    fn test_outputs_sorted_regardless_of_provider_order() {
        let raw = response(
            hourly(
                &["2026-10-16T16:00", "2026-10-16T13:00", "2026-10-16T15:00", "2026-10-16T14:00"],
                &[50.0; 4],
            ),
            daily(&["2026-10-18", "2026-10-16", "2026-10-17"]),
        );
        let forecast = normalize(&raw, utc("2026-10-16T12:05:00Z")).unwrap();

        assert!(forecast.hourly.windows(2).all(|w| w[0].time < w[1].time));
        assert!(forecast.daily.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(forecast.hourly.len(), 4);
        assert_eq!(forecast.daily.len(), 3);
    }

    #[test]
    fn test_daily_keeps_yesterday_drops_older() {
        let raw = response(
            hourly(&["2026-10-16T13:00"], &[50.0]),
            daily(&["2026-10-14", "2026-10-15", "2026-10-16", "2026-10-17"]),
        );
        let forecast = normalize(&raw, utc("2026-10-16T12:00:00Z")).unwrap();

        let dates: Vec<String> = forecast.daily.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-10-15", "2026-10-16", "2026-10-17"]);
    }

    #[test]
    fn test_yesterday_uses_location_calendar() {
        // 02:00 UTC is still the previous evening at UTC-7
        let offset = FixedOffset::east_opt(-7 * 3600).unwrap();
        let y = yesterday(utc("2026-10-16T02:00:00Z"), offset);
        assert_eq!(y, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());
    }

    #[test]
    fn test_top_of_hour_half_hour_offset() {
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        // 07:10 UTC is 12:40 local; local top of hour is 12:00 = 06:30 UTC
        let t = top_of_hour(utc("2026-10-16T07:10:00Z"), offset);
        assert_eq!(t, utc("2026-10-16T06:30:00Z"));
    }

    #[test]
    fn test_percentages_become_fractions() {
        let raw = response(
            hourly(&["2026-10-16T13:00", "2026-10-16T14:00"], &[0.0, 100.0]),
            daily(&["2026-10-16"]),
        );
        let forecast = normalize(&raw, utc("2026-10-16T12:00:00Z")).unwrap();

        assert!((forecast.current.humidity - 0.8).abs() < 1e-9);
        assert!((forecast.current.cloud_cover - 0.45).abs() < 1e-9);
        for s in &forecast.hourly {
            for v in [s.humidity, s.cloud_cover, s.precipitation_probability] {
                assert!((0.0..=1.0).contains(&v), "{v} out of range");
            }
        }
        assert_eq!(forecast.hourly[1].humidity, 1.0);
    }

    #[test]
    fn test_current_sample_mapping() {
        let raw = response(
            hourly(
                &["2026-10-16T11:00", "2026-10-16T12:00", "2026-10-16T13:00"],
                &[50.0; 3],
            ),
            daily(&["2026-10-16"]),
        );
        let forecast = normalize(&raw, utc("2026-10-16T12:20:00Z")).unwrap();
        let current = &forecast.current;

        assert_eq!(current.time, utc("2026-10-16T12:15:00Z"));
        assert_eq!(current.temperature.celsius(), 15.0);
        assert_eq!(current.condition, WeatherCondition::PartlyCloudy);
        // visibility from the first hourly entry
        assert_eq!(current.visibility.map(|v| v.meters()), Some(20_000.0));
        // probability and UV from the 12:00 entry, the nearest to 12:15
        assert!((current.precipitation_probability - 0.1).abs() < 1e-9);
        assert_eq!(current.uv_index, 1.0);
        assert!((current.precipitation.millimeters() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_length_mismatch_is_parse_error() {
        let mut h = hourly(&["2026-10-16T13:00", "2026-10-16T14:00"], &[50.0, 50.0]);
        h.visibility.pop();
        let raw = response(h, daily(&["2026-10-16"]));

        let err = normalize(&raw, utc("2026-10-16T12:00:00Z")).unwrap_err();
        match err {
            WeatherError::Parse(msg) => assert!(msg.contains("hourly.visibility"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_daily_length_mismatch_is_parse_error() {
        let mut d = daily(&["2026-10-16", "2026-10-17"]);
        d.rain_sum.push(1.0);
        let raw = response(hourly(&["2026-10-16T13:00"], &[50.0]), d);

        assert!(matches!(
            normalize(&raw, utc("2026-10-16T12:00:00Z")),
            Err(WeatherError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_hourly_is_not_available() {
        let raw = response(hourly(&[], &[]), daily(&["2026-10-16"]));
        assert!(matches!(
            normalize(&raw, utc("2026-10-16T12:00:00Z")),
            Err(WeatherError::NotAvailable(_))
        ));
    }

    #[test]
    fn test_null_optional_series_fall_back() {
        let mut h = hourly(&["2026-10-16T13:00", "2026-10-16T14:00"], &[50.0, 50.0]);
        h.visibility = vec![None, Some(9_000.0)];
        h.snow_depth = vec![None, None];
        h.uv_index = vec![None, Some(2.0)];
        h.precipitation_probability = vec![Some(40.0), None];
        let mut d = daily(&["2026-10-16"]);
        d.uv_index_max = vec![None];
        let raw = response(h, d);

        let forecast = normalize(&raw, utc("2026-10-16T12:00:00Z")).unwrap();
        assert!(forecast.current.visibility.is_none());
        assert_eq!(
            forecast.hourly[1].visibility.map(|v| v.meters()),
            Some(9_000.0)
        );
        assert_eq!(forecast.hourly[0].snow_depth.meters(), 0.0);
        assert_eq!(forecast.hourly[0].uv_index, 0.0);
        assert!((forecast.hourly[0].precipitation_probability - 0.4).abs() < 1e-9);
        assert_eq!(forecast.hourly[1].precipitation_probability, 0.0);
        assert_eq!(forecast.daily[0].uv_index, 0.0);
    }
}
