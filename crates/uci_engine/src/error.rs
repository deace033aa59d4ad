//! Error types for the UCI engine client
//!
//! Separates the one failure that disables analysis for the whole session
//! ([`EngineError::Unavailable`]) from per-query failures that only cost the
//! current request.

use thiserror::Error;

/// Errors that can occur while talking to an external engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// No engine binary could be located or launched
    #[error("Engine unavailable: {message}")]
    Unavailable { message: String },

    /// The engine answered with something the client could not use
    #[error("Engine query failed: {message}")]
    Query { message: String },

    /// The engine did not answer within the allotted time
    #[error("Engine did not respond to `{command}` within {millis}ms")]
    Timeout { command: String, millis: u128 },

    /// The engine closed its output stream
    #[error("Engine process closed its output stream")]
    Disconnected,

    /// Pipe I/O error
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Whether the failure leaves the engine handle usable for the next query
    pub fn is_transient(&self) -> bool {
        !matches!(self, EngineError::Unavailable { .. } | EngineError::Disconnected)
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
