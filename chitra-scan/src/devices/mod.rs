//! Device implementations

pub mod mock;

use crate::config::Config;
use crate::core::driver::Gantry;
use crate::error::{Error, Result};
use mock::MockGantry;

/// Create the gantry handles described by the configuration
pub fn create_gantry(config: &Config) -> Result<Gantry> {
    match config.device.device_type.as_str() {
        "mock" => {
            let sim = config.device.simulation.clone().unwrap_or_default();
            let mock = MockGantry::new(sim)?;
            Ok(mock.gantry())
        }
        _ => Err(Error::UnknownDevice(config.device.device_type.clone())),
    }
}
