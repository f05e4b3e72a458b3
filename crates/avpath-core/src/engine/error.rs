use thiserror::Error;

use super::config::ConfigError;
use crate::core::grid::header::GridError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Grid lookup failed: {source}")]
    Grid {
        #[from]
        source: GridError,
    },

    #[error("Accessible volume has not been resampled yet")]
    NotResampled,

    #[error("Internal logic error: {0}")]
    Internal(String),
}
