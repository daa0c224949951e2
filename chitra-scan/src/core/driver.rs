//! Hardware capability traits and the [`Gantry`] bundle
//!
//! The controller never talks to a device directly. Each actuator and sensor
//! is a capability object handed over at construction and owned by the
//! controller for the rest of its life.

use crate::error::Result;
use std::time::Duration;

/// Axis motor with a cumulative encoder
pub trait Motor: Send {
    /// Start continuous rotation at a signed speed (degrees per second)
    fn run(&mut self, speed: i32) -> Result<()>;

    /// Rotate by a signed angle at the given speed, returning once the move
    /// has nominally completed
    fn run_angle(&mut self, speed: i32, angle: i32) -> Result<()>;

    /// Halt the motor
    fn stop(&mut self) -> Result<()>;

    /// Cumulative encoder reading (degrees)
    fn angle(&mut self) -> Result<i64>;
}

/// Binary limit switch
pub trait LimitSwitch: Send {
    fn pressed(&mut self) -> Result<bool>;
}

/// Optical reflectance sensor
pub trait ReflectanceSensor: Send {
    /// Reflected light intensity, 0 (dark) to 100 (bright)
    fn reflectance(&mut self) -> Result<u8>;
}

/// Audible acknowledgment
pub trait Indicator: Send {
    fn beep(&mut self) -> Result<()>;
}

/// Source of delays for polling loops and mechanical settling
///
/// Simulated devices advance their model here instead of sleeping.
pub trait Clock: Send {
    fn sleep(&mut self, duration: Duration);
}

/// Every handle the scan controller needs
pub struct Gantry {
    pub motor_x: Box<dyn Motor>,
    pub motor_y: Box<dyn Motor>,
    /// X switch at the start side (reached moving backward)
    pub x_start: Box<dyn LimitSwitch>,
    /// X switch at the far side (reached moving forward)
    pub x_end: Box<dyn LimitSwitch>,
    /// Y home switch
    pub y_home: Box<dyn LimitSwitch>,
    pub sensor: Box<dyn ReflectanceSensor>,
    pub indicator: Box<dyn Indicator>,
    pub clock: Box<dyn Clock>,
}

impl Gantry {
    /// Stop both axes, attempting the second even if the first fails
    pub fn stop_all(&mut self) -> Result<()> {
        let x = self.motor_x.stop();
        let y = self.motor_y.stop();
        x.and(y)
    }

    #[inline]
    pub fn sleep_ms(&mut self, ms: u64) {
        if ms > 0 {
            self.clock.sleep(Duration::from_millis(ms));
        }
    }
}
