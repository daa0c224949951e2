//! Carriage kinematics for the simulated gantry
//!
//! Each axis is a carriage between two hard stops. The motor encoder only
//! counts travel the carriage actually made, so a carriage pushed into a
//! stop stalls its encoder as well.

use std::time::Duration;

/// One motorized carriage
#[derive(Debug, Clone)]
pub struct CarriageAxis {
    /// Carriage position (deg from the low stop)
    position: f64,
    /// Upper hard stop (deg)
    travel: f64,
    /// Cumulative encoder reading (deg)
    encoder: f64,
    /// Commanded continuous speed (deg/s)
    velocity: f64,
}

impl CarriageAxis {
    pub fn new(position: f64, travel: f64) -> Self {
        let travel = travel.max(0.0);
        Self {
            position: position.clamp(0.0, travel),
            travel,
            encoder: 0.0,
            velocity: 0.0,
        }
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn travel(&self) -> f64 {
        self.travel
    }

    #[inline]
    pub fn encoder(&self) -> f64 {
        self.encoder
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    /// Move by a signed distance, stopping at the hard stops
    ///
    /// Returns the distance actually traveled.
    pub fn displace(&mut self, delta: f64) -> f64 {
        let target = (self.position + delta).clamp(0.0, self.travel);
        let moved = target - self.position;
        self.position = target;
        self.encoder += moved;
        moved
    }

    /// Integrate the commanded velocity over `dt`
    pub fn advance(&mut self, dt: Duration) -> f64 {
        if self.velocity == 0.0 {
            return 0.0;
        }
        let delta = self.velocity * dt.as_micros() as f64 / 1_000_000.0;
        self.displace(delta)
    }
}

/// Time a finite move takes at the given speed
pub fn move_duration(speed: i32, angle: i32) -> Duration {
    if speed == 0 {
        return Duration::ZERO;
    }
    let micros = (angle.unsigned_abs() as u64 * 1_000_000) / speed.unsigned_abs() as u64;
    Duration::from_micros(micros)
}
