use anyhow::Result;
use std::sync::Arc;

use crate::{AppError, Config};

/// Application state and lifecycle
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Create a new application instance from the on-disk config
    pub fn new() -> Result<Self, AppError> {
        let (config, validation) = Config::load_validated()?;
        tracing::debug!(
            "Config loaded with {} warning(s)",
            validation.warnings.len()
        );
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        tracing::info!(
            "Application started (cache dir: {})",
            config.cache_dir.display()
        );
        Self {
            config: Arc::new(config),
        }
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }
}
