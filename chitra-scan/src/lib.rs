//! chitra-scan - Two-axis gantry raster scanner
//!
//! Drives an X and a Y carriage carrying a reflectance sensor over a scan
//! bed and logs a row-by-row raster of brightness samples.
//!
//! ## Modules
//!
//! - [`core`]: Hardware capability traits and shared types
//! - [`scan`]: Homing, limit recovery and the serpentine scan controller
//! - [`devices`]: Device factory and the simulated gantry
//! - [`jog`]: Manual jog commands for the console front end
//!
//! ## Example
//!
//! ```no_run
//! use chitra_scan::devices::create_gantry;
//! use chitra_scan::scan::{CsvRowLog, ScanController};
//! use chitra_scan::Config;
//!
//! # fn main() -> chitra_scan::Result<()> {
//! let config = Config::default();
//! let gantry = create_gantry(&config)?;
//! let log = CsvRowLog::create(&config.output.csv_path)?;
//! let mut scanner = ScanController::new(gantry, Box::new(log), &config)?;
//!
//! scanner.home()?;
//! scanner.scan()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod devices;
pub mod error;
pub mod jog;
pub mod scan;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
