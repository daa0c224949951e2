//! Configuration for chitra-scan
//!
//! Loaded from a TOML file. Every field has a default matching the reference
//! gantry, so an empty file (or no file at all) yields a usable setup.
//!
//! ```toml
//! [device]
//! type = "mock"
//! name = "Simulated gantry"
//!
//! [scan]
//! speed = 600
//! sample_interval = 10
//! row_limit = 400
//!
//! [output]
//! csv_path = "scanned_data.csv"
//! ```

use crate::devices::mock::config::SimulationConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub homing: HomingConfig,
    #[serde(default)]
    pub bumper: BumperConfig,
    #[serde(default)]
    pub jog: JogConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Device selection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Device type ("mock")
    #[serde(rename = "type", default = "default_device_type")]
    pub device_type: String,

    /// Human readable name for logs
    #[serde(default = "default_device_name")]
    pub name: String,

    /// Simulated gantry parameters (mock device only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulation: Option<SimulationConfig>,
}

fn default_device_type() -> String {
    "mock".to_string()
}
fn default_device_name() -> String {
    "Simulated gantry".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_type: default_device_type(),
            name: default_device_name(),
            simulation: None,
        }
    }
}

/// Raster scan parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Nominal X speed while scanning (deg/s); also the Y step speed
    #[serde(default = "default_scan_speed")]
    pub speed: i32,

    /// Poll interval of the row loop (ms)
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Travel after which X slows down (deg)
    #[serde(default = "default_ramp_threshold")]
    pub ramp_threshold: i64,

    /// Speed divisor applied past the ramp threshold
    #[serde(default = "default_ramp_divisor")]
    pub ramp_divisor: i32,

    /// Travel between two samples (deg)
    #[serde(default = "default_sample_interval")]
    pub sample_interval: i64,

    /// Maximum samples kept per row
    #[serde(default = "default_row_capacity")]
    pub row_capacity: usize,

    /// Number of rows in a session
    #[serde(default = "default_row_limit")]
    pub row_limit: i64,

    /// Y rotation between rows (deg), one logical row unit
    #[serde(default = "default_y_step_angle")]
    pub y_step_angle: i32,

    /// Delay after each Y step (ms)
    #[serde(default = "default_row_settle_ms")]
    pub row_settle_ms: u64,

    /// Give up on a row whose limit switch never asserts (ms)
    #[serde(default = "default_row_timeout_ms")]
    pub row_timeout_ms: u64,
}

fn default_scan_speed() -> i32 {
    600
}
fn default_tick_ms() -> u64 {
    1
}
fn default_ramp_threshold() -> i64 {
    3500
}
fn default_ramp_divisor() -> i32 {
    5
}
fn default_sample_interval() -> i64 {
    10
}
fn default_row_capacity() -> usize {
    400
}
fn default_row_limit() -> i64 {
    400
}
fn default_y_step_angle() -> i32 {
    30
}
fn default_row_settle_ms() -> u64 {
    100
}
fn default_row_timeout_ms() -> u64 {
    120_000
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            speed: default_scan_speed(),
            tick_ms: default_tick_ms(),
            ramp_threshold: default_ramp_threshold(),
            ramp_divisor: default_ramp_divisor(),
            sample_interval: default_sample_interval(),
            row_capacity: default_row_capacity(),
            row_limit: default_row_limit(),
            y_step_angle: default_y_step_angle(),
            row_settle_ms: default_row_settle_ms(),
            row_timeout_ms: default_row_timeout_ms(),
        }
    }
}

impl ScanConfig {
    /// Speed commanded once the ramp threshold is passed
    pub fn ramped_speed(&self) -> i32 {
        self.speed / self.ramp_divisor
    }
}

/// Homing parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HomingConfig {
    /// Approach speed towards the home switches (deg/s)
    #[serde(default = "default_homing_speed")]
    pub speed: i32,

    /// Switch poll interval (ms)
    #[serde(default = "default_homing_poll_ms")]
    pub poll_ms: u64,

    /// Per-axis limit before homing is declared stalled (ms)
    #[serde(default = "default_homing_timeout_ms")]
    pub timeout_ms: u64,

    /// Pause after both axes are homed (ms)
    #[serde(default = "default_homing_settle_ms")]
    pub settle_ms: u64,
}

fn default_homing_speed() -> i32 {
    300
}
fn default_homing_poll_ms() -> u64 {
    10
}
fn default_homing_timeout_ms() -> u64 {
    60_000
}
fn default_homing_settle_ms() -> u64 {
    1000
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            speed: default_homing_speed(),
            poll_ms: default_homing_poll_ms(),
            timeout_ms: default_homing_timeout_ms(),
            settle_ms: default_homing_settle_ms(),
        }
    }
}

/// Limit-switch recovery parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BumperConfig {
    /// Back-off speed (deg/s)
    #[serde(default = "default_backoff_speed")]
    pub backoff_speed: i32,

    /// Back-off distance per move (deg)
    #[serde(default = "default_backoff_angle")]
    pub backoff_angle: i32,

    /// Settle delay after each back-off move (ms)
    #[serde(default = "default_bumper_settle_ms")]
    pub settle_ms: u64,

    /// Back-off moves allowed before a Y switch is declared stuck
    #[serde(default = "default_max_release_attempts")]
    pub max_release_attempts: u32,
}

fn default_backoff_speed() -> i32 {
    500
}
fn default_backoff_angle() -> i32 {
    100
}
fn default_bumper_settle_ms() -> u64 {
    100
}
fn default_max_release_attempts() -> u32 {
    20
}

impl Default for BumperConfig {
    fn default() -> Self {
        Self {
            backoff_speed: default_backoff_speed(),
            backoff_angle: default_backoff_angle(),
            settle_ms: default_bumper_settle_ms(),
            max_release_attempts: default_max_release_attempts(),
        }
    }
}

/// Manual jog parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JogConfig {
    /// Angle moved per jog command (deg)
    #[serde(default = "default_jog_step")]
    pub step: i32,

    /// Jog speed (deg/s)
    #[serde(default = "default_jog_speed")]
    pub speed: i32,

    /// Input poll cadence of the console loop (ms)
    #[serde(default = "default_jog_poll_ms")]
    pub poll_ms: u64,
}

fn default_jog_step() -> i32 {
    2
}
fn default_jog_speed() -> i32 {
    300
}
fn default_jog_poll_ms() -> u64 {
    100
}

impl Default for JogConfig {
    fn default() -> Self {
        Self {
            step: default_jog_step(),
            speed: default_jog_speed(),
            poll_ms: default_jog_poll_ms(),
        }
    }
}

/// Row log output
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Path of the row log, truncated at startup
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
}

fn default_csv_path() -> String {
    "scanned_data.csv".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default log filter (trace, debug, info, warn, error); RUST_LOG wins
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load and validate configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot work with
    pub fn validate(&self) -> Result<()> {
        let scan = &self.scan;
        if scan.sample_interval <= 0 {
            return Err(Error::Config("scan.sample_interval must be positive".into()));
        }
        if scan.ramp_divisor <= 0 {
            return Err(Error::Config("scan.ramp_divisor must be positive".into()));
        }
        if scan.speed <= 0 || self.homing.speed <= 0 || self.jog.speed <= 0 {
            return Err(Error::Config("speeds must be positive".into()));
        }
        if scan.row_capacity == 0 {
            return Err(Error::Config("scan.row_capacity must be at least 1".into()));
        }
        if scan.row_limit < 0 {
            return Err(Error::Config("scan.row_limit must not be negative".into()));
        }
        if scan.tick_ms == 0 || self.homing.poll_ms == 0 {
            return Err(Error::Config("poll intervals must be at least 1ms".into()));
        }
        if self.bumper.max_release_attempts == 0 {
            return Err(Error::Config(
                "bumper.max_release_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
