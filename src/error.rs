//! Custom error types for the crate.
//!
//! `HubError` consolidates the error sources of the runtime core. Registry
//! and scheduler operations deliberately do not use it — lookup misses and
//! lock contention are logged, degraded-cycle events, never errors (see the
//! outcome enums in [`crate::registry`]). What remains fallible is
//! construction-time work: configuration loading and driver-table
//! validation.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type HubResult<T> = std::result::Result<T, HubError>;

/// Errors surfaced by construction and configuration paths.
#[derive(Error, Debug)]
pub enum HubError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Driver table error: duplicate driver name '{0}'")]
    DuplicateDriverName(String),

    #[error("Driver table error: driver with empty name")]
    EmptyDriverName,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(String),

    #[error("Invalid log level '{0}'")]
    InvalidLogLevel(String),

    #[error("Telemetry setup error: {0}")]
    Telemetry(String),
}
