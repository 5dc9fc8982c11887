//! Background forecast fetching.
//! Network work runs on a tokio runtime; results come back over mpsc so the
//! caller's thread never waits on I/O directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use crate::location::Coordinate;
use crate::provider::WeatherProvider;
use crate::types::{Forecast, WeatherError};

/// Error type for background fetches
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The caller's deadline elapsed before the provider finished
    #[error("Weather request timed out")]
    Timeout,
    /// The provider could not produce a forecast
    #[error("Weather unavailable: {0}")]
    Failed(#[from] WeatherError),
}

/// Messages sent from async operations back to the caller
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of fetching weather data
    FetchDone(Result<Forecast, FetchError>),
}

/// Fetch the forecast for `coordinate` on `runtime`, bounded by `timeout`.
/// Sends exactly one `FetchDone` on the channel.
pub fn request_fetch(
    runtime: &Handle,
    tx: &std::sync::mpsc::Sender<WeatherServiceMessage>,
    provider: Arc<WeatherProvider>,
    coordinate: Coordinate,
    timeout: Duration,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let now = chrono::Utc::now();
        let result = match tokio::time::timeout(
            timeout,
            provider.try_get_weather_at(&coordinate, now),
        )
        .await
        {
            Ok(Ok(forecast)) => Ok(forecast),
            Ok(Err(e)) => {
                tracing::warn!("Weather fetch failed: {}", e);
                Err(FetchError::Failed(e))
            }
            Err(_) => {
                tracing::warn!("Weather fetch timed out after {:?}", timeout);
                Err(FetchError::Timeout)
            }
        };
        let _ = tx.send(WeatherServiceMessage::FetchDone(result));
    });
}
