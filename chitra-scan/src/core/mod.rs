//! Core abstractions shared by the scan components.
//!
//! - [`driver`]: Capability traits for motors, switches and the sensor
//! - [`types`]: Position, direction, bumper events, session state

pub mod driver;
pub mod types;
