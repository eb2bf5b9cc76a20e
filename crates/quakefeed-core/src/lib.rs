pub mod app_config;
pub mod config;
pub mod model;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use model::{EarthquakeRecord, GeoBounds, UNKNOWN_LOCATION};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid {axis} bounds: min {min} must be below max {max}")]
    InvalidBounds {
        axis: &'static str,
        min: f64,
        max: f64,
    },
}
