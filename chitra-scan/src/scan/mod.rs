//! Homing, limit recovery and the raster scan state machine.
//!
//! - [`tracker::PositionTracker`]: logical (x, y)
//! - [`bumper::BumperRecoveryHandler`]: back off a pressed limit switch
//! - [`homing::AxisHomer`]: drive both axes to zero
//! - [`recorder::RowRecorder`]: per-row samples and row log sinks
//! - [`controller::ScanController`]: owns all of the above and runs a scan

pub mod bumper;
pub mod controller;
pub mod homing;
pub mod recorder;
pub mod tracker;

pub use controller::{RowReport, ScanController};
pub use recorder::{CsvRowLog, MemoryRowLog, RowRecorder, RowSink};
pub use tracker::PositionTracker;
