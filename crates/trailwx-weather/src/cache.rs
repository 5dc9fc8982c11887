//! Single-slot forecast cache.
//!
//! The slot holds the last raw provider body verbatim. Every successful fetch
//! overwrites it; nothing else evicts it.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};

use crate::dto::RawForecastResponse;
use crate::location::Coordinate;
use crate::types::WeatherError;
use crate::units::Distance;

const CACHE_FILE_NAME: &str = "weather.json";

/// Bounds under which a cached forecast may be reused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessWindow {
    pub max_age: Duration,
    pub max_distance: Distance,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(1),
            max_distance: Distance::from_miles(5.0),
        }
    }
}

/// A parsed cache entry with the coordinate and instant it was generated for.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedForecast {
    pub response: RawForecastResponse,
    pub coordinate: Coordinate,
    pub generated_at: DateTime<Utc>,
}

impl CachedForecast {
    pub fn from_response(response: RawForecastResponse) -> Result<Self, WeatherError> {
        let generated_at = response.generated_at()?;
        let coordinate = response.coordinate();
        Ok(Self {
            response,
            coordinate,
            generated_at,
        })
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.generated_at)
    }

    /// True when younger than `max_age` and closer than `max_distance`.
    pub fn is_fresh_for(
        &self,
        requested: &Coordinate,
        now: DateTime<Utc>,
        window: &FreshnessWindow,
    ) -> bool {
        let distance = self.coordinate.distance_to(requested);
        self.age(now) < window.max_age && distance < window.max_distance
    }
}

#[derive(Debug, Clone)]
pub struct WeatherCache {
    cache_path: PathBuf,
}

impl WeatherCache {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_path: cache_dir.join(CACHE_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.cache_path
    }

    /// Raw body of the slot, or `None` when nothing has been cached yet.
    pub async fn read_raw(&self) -> Result<Option<String>, WeatherError> {
        match tokio::fs::read_to_string(&self.cache_path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read and parse the slot. Malformed content is a `Parse` error.
    pub async fn load(&self) -> Result<Option<CachedForecast>, WeatherError> {
        let Some(body) = self.read_raw().await? else {
            return Ok(None);
        };
        let response = RawForecastResponse::parse(&body)?;
        CachedForecast::from_response(response).map(Some)
    }

    /// Replace the slot with `body`, via temp file and rename.
    pub async fn store(&self, body: &str) -> Result<(), WeatherError> {
        let parent = self.cache_path.parent().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "cache path must have a parent directory",
            )
        })?;
        tokio::fs::create_dir_all(parent).await?;

        let tmp_path = self
            .cache_path
            .with_extension(format!("{}.tmp", std::process::id()));
        tokio::fs::write(&tmp_path, body).await?;
        tokio::fs::rename(&tmp_path, &self.cache_path).await?;
        tracing::debug!("Wrote forecast cache to {}", self.cache_path.display());
        Ok(())
    }
}
