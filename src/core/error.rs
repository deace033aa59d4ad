//! Error types for the core module
//!
//! Configuration errors never stop the pipeline: a rejected update is logged
//! and the previous settings stay in force.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, validating or saving settings
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Settings file could not be read or written
    #[error("Settings I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings text is not a valid settings record
    #[error("Settings serialization error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A probability outside `[0, 1]`
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// Arrow colour that is not `#RRGGBB`
    #[error("Invalid arrow colour: {input:?}")]
    InvalidColor { input: String },
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
