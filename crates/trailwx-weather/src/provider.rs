//! Open-Meteo forecast provider with a freshness-checked cache in front.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use crate::cache::{CachedForecast, FreshnessWindow, WeatherCache};
use crate::dto::RawForecastResponse;
use crate::location::Coordinate;
use crate::normalize::normalize;
use crate::types::{Forecast, WeatherError};

pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";
const REQUEST_TIMEOUT_SECS: u64 = 10;

const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,uv_index_max,\
snowfall_sum,showers_sum,rain_sum,wind_speed_10m_max,wind_gusts_10m_max";
const HOURLY_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,\
precipitation_probability,precipitation,weather_code,cloud_cover,visibility,wind_speed_10m,\
wind_gusts_10m,rain,showers,snowfall,snow_depth,uv_index";
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
precipitation,rain,showers,snowfall,weather_code,cloud_cover,wind_speed_10m,wind_gusts_10m";

/// Provider settings. `Default` targets the public Open-Meteo endpoint.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub freshness: FreshnessWindow,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            freshness: FreshnessWindow::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    cache: WeatherCache,
    settings: ProviderSettings,
}

impl WeatherProvider {
    pub fn new(cache: WeatherCache, settings: ProviderSettings) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            cache,
            settings,
        })
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Forecast for `coordinate`, or `None` when it could not be obtained.
    pub async fn get_weather(&self, coordinate: &Coordinate) -> Option<Forecast> {
        match self.try_get_weather_at(coordinate, Utc::now()).await {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                tracing::warn!("Weather unavailable for {}: {}", coordinate, e);
                None
            }
        }
    }

    /// Forecast for `coordinate` as seen at `now`.
    ///
    /// Uses the cached response when it is fresh for this coordinate and
    /// normalizes cleanly, otherwise issues a single request and replaces
    /// the cache slot.
    #[instrument(skip(self), fields(lat = coordinate.latitude, lon = coordinate.longitude))]
    pub async fn try_get_weather_at(
        &self,
        coordinate: &Coordinate,
        now: DateTime<Utc>,
    ) -> Result<Forecast, WeatherError> {
        if let Some(cached) = self.fresh_cached(coordinate, now).await {
            match normalize(&cached.response, now) {
                Ok(forecast) => return Ok(forecast),
                Err(e) => tracing::debug!("Cached forecast failed to normalize: {}", e),
            }
        }

        let response = self.fetch(coordinate).await?;
        normalize(&response, now)
    }

    /// The cached entry if usable. Any cache failure counts as a miss.
    async fn fresh_cached(&self, coordinate: &Coordinate, now: DateTime<Utc>) -> Option<CachedForecast> {
        let cached = match self.cache.load().await {
            Ok(Some(cached)) => cached,
            Ok(None) => {
                tracing::debug!("No cached forecast");
                return None;
            }
            Err(e) => {
                tracing::debug!("Ignoring unreadable forecast cache: {}", e);
                return None;
            }
        };

        if cached.is_fresh_for(coordinate, now, &self.settings.freshness) {
            tracing::debug!(
                "Using cached forecast ({} min old)",
                cached.age(now).num_minutes()
            );
            Some(cached)
        } else {
            tracing::debug!("Cached forecast is stale or too far away");
            None
        }
    }

    /// Request a fresh forecast and persist the raw body before parsing.
    async fn fetch(&self, coordinate: &Coordinate) -> Result<RawForecastResponse, WeatherError> {
        let url = self.forecast_url(coordinate)?;
        tracing::info!("Fetching forecast for {}", coordinate);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::HttpStatus(status.as_u16()));
        }
        let body = response.text().await?;

        if let Err(e) = self.cache.store(&body).await {
            tracing::warn!("Failed to write forecast cache: {}", e);
        }

        RawForecastResponse::parse(&body)
    }

    pub fn forecast_url(&self, coordinate: &Coordinate) -> Result<Url, WeatherError> {
        let base = format!("{}/v1/forecast", self.settings.base_url.trim_end_matches('/'));
        Url::parse_with_params(
            &base,
            &[
                ("latitude", coordinate.latitude.to_string()),
                ("longitude", coordinate.longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("hourly", HOURLY_FIELDS.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("timezone", "auto".to_string()),
            ],
        )
        .map_err(|e| WeatherError::NotAvailable(format!("invalid provider URL: {e}")))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn provider(base_url: &str) -> WeatherProvider {
        let settings = ProviderSettings {
            base_url: base_url.to_string(),
            ..ProviderSettings::default()
        };
        WeatherProvider::new(WeatherCache::new(std::path::Path::new("/tmp/trailwx-test")), settings)
            .unwrap()
    }

    #[test]
    fn test_forecast_url_encodes_query() {
        let p = provider("https://api.example.com/");
        let coordinate = Coordinate::new(47.5, -122.25).unwrap();
        let url = p.forecast_url(&coordinate).unwrap();

        assert_eq!(url.path(), "/v1/forecast");
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["latitude"], "47.5");
        assert_eq!(pairs["longitude"], "-122.25");
        assert_eq!(pairs["timezone"], "auto");
        assert!(pairs["daily"].starts_with("weather_code,temperature_2m_max"));
        assert!(pairs["hourly"].contains("precipitation_probability"));
        assert!(pairs["current"].ends_with("wind_gusts_10m"));
    }

    #[test]
    fn test_forecast_url_rejects_bad_base() {
        let p = provider("not a url");
        let coordinate = Coordinate::new(0.0, 0.0).unwrap();
        assert!(matches!(
            p.forecast_url(&coordinate),
            Err(WeatherError::NotAvailable(_))
        ));
    }
}
