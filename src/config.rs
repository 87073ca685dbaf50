//! Configuration management.
use crate::error::ScopeError;
use crate::mosaic::{DEFAULT_CROSSHAIR_SIZE, DEFAULT_ZOOM_IN_RATIO};
use config::Config;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub log_level: String,
    pub mosaic: MosaicSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MosaicSettings {
    /// Multiplicative zoom step per wheel tick.
    pub zoom_in_ratio: f64,
    /// On-screen crosshair footprint in viewport pixels.
    pub crosshair_size: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// Default directory offered by the parameter-file choosers.
    pub parameter_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            mosaic: MosaicSettings {
                zoom_in_ratio: DEFAULT_ZOOM_IN_RATIO,
                crosshair_size: DEFAULT_CROSSHAIR_SIZE,
            },
            storage: StorageSettings {
                parameter_dir: "parameters".to_string(),
            },
        }
    }
}

impl Settings {
    pub fn new(config_name: Option<&str>) -> Result<Self, ScopeError> {
        let config_path = format!("config/{}", config_name.unwrap_or("default"));
        let s = Config::builder()
            .add_source(config::File::with_name(&config_path))
            .build()
            .map_err(ScopeError::Config)?;

        s.try_deserialize().map_err(ScopeError::Config)
    }
}
