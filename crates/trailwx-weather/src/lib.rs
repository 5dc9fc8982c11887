//! Weather forecasts for trailwx
//!
//! Fetches Open-Meteo forecasts, keeps the last response in a single-slot
//! cache that is reused while recent and nearby, and normalizes it into
//! unit-carrying current/hourly/daily samples.

pub mod cache;
pub mod display;
pub mod dto;
pub mod location;
pub mod normalize;
pub mod provider;
pub mod service;
pub mod types;
pub mod units;

pub use cache::{CachedForecast, FreshnessWindow, WeatherCache};
pub use display::{build_rows, location_label, CurrentSummary, DisplayUnits, ListRow};
pub use dto::RawForecastResponse;
pub use location::Coordinate;
pub use provider::{ProviderSettings, WeatherProvider};
pub use service::{request_fetch, FetchError, WeatherServiceMessage};
pub use types::*;
pub use units::{Distance, Speed, SpeedUnit, Temperature, TemperatureUnit};
