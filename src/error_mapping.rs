//! Maps weather crate failures onto the application error type.

use trailwx_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError};
use trailwx_weather::{FetchError, WeatherError as ProviderError};

pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}

impl IntoAppError for ProviderError {
    fn into_app_error(self) -> AppError {
        match self {
            ProviderError::Network(e) => AppError::Network(e.into_network_error()),
            ProviderError::HttpStatus(status) if status >= 500 => {
                AppError::Weather(WeatherError::ServiceUnavailable)
            }
            ProviderError::HttpStatus(status) => AppError::Network(NetworkError::ServerError {
                status,
                message: format!("forecast request returned HTTP {status}"),
            }),
            ProviderError::Parse(s) => AppError::Weather(WeatherError::ApiError(s)),
            ProviderError::NotAvailable(s) => AppError::Weather(WeatherError::ApiError(s)),
            ProviderError::Cache(e) => AppError::Weather(WeatherError::CacheError(e.to_string())),
        }
    }
}

impl IntoAppError for FetchError {
    fn into_app_error(self) -> AppError {
        match self {
            FetchError::Timeout => AppError::Network(NetworkError::Timeout),
            FetchError::Failed(e) => e.into_app_error(),
        }
    }
}
