//! Error types for chitra-scan

use crate::core::types::Axis;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// chitra-scan error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (row log, config file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Actuator or sensor failure
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// An expected limit switch never asserted
    #[error("Timed out after {waited_ms}ms waiting for {what}")]
    Timeout {
        /// What the controller was waiting for
        what: &'static str,
        /// Time spent waiting (milliseconds)
        waited_ms: u64,
    },

    /// A limit switch stayed pressed through every release attempt
    #[error("{axis} limit switch still pressed after {attempts} release attempts")]
    SwitchStuck {
        /// Axis whose switch is latched
        axis: Axis,
        /// Number of back-off moves issued
        attempts: u32,
    },

    /// Operation not allowed while a scan is running
    #[error("Scan in progress")]
    Busy,

    /// Unknown device type in configuration
    #[error("Unknown device type: {0}")]
    UnknownDevice(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
