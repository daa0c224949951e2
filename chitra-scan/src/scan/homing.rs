//! Axis homing
//!
//! Drives X, then Y, against their start-side switches and zeroes both
//! logical coordinates through the bumper recovery protocol.

use crate::config::{BumperConfig, HomingConfig};
use crate::core::driver::Gantry;
use crate::core::types::{Axis, Direction};
use crate::error::{Error, Result};
use crate::scan::bumper::BumperRecoveryHandler;
use crate::scan::tracker::PositionTracker;

/// Homing sequence bound to the controller's state
pub struct AxisHomer<'a> {
    pub gantry: &'a mut Gantry,
    pub tracker: &'a mut PositionTracker,
    pub direction: &'a mut Direction,
    pub ready: &'a mut bool,
    pub homing: &'a HomingConfig,
    pub bumper: &'a BumperConfig,
}

impl AxisHomer<'_> {
    /// Home both axes and mark the session ready
    pub fn home(&mut self) -> Result<()> {
        log::info!("Homing: moving to start");

        self.approach(Axis::X)?;
        let event = BumperRecoveryHandler::new(self.gantry, self.tracker, self.bumper).recover_x(
            self.direction,
            Direction::Forward,
            0,
        )?;
        log::debug!("Homing: {:?}", event);

        self.approach(Axis::Y)?;
        let event = BumperRecoveryHandler::new(self.gantry, self.tracker, self.bumper).recover_y(0)?;
        log::debug!("Homing: {:?}", event);

        self.gantry.sleep_ms(self.homing.settle_ms);
        *self.ready = true;
        log::info!("Homing complete; ready to scan");
        Ok(())
    }

    /// Run an axis towards its start switch until the switch is pressed
    fn approach(&mut self, axis: Axis) -> Result<()> {
        let speed = -self.homing.speed;
        let what = match axis {
            Axis::X => "X start switch",
            Axis::Y => "Y home switch",
        };

        match axis {
            Axis::X => self.gantry.motor_x.run(speed)?,
            Axis::Y => self.gantry.motor_y.run(speed)?,
        }

        let mut waited_ms = 0;
        loop {
            let pressed = match axis {
                Axis::X => self.gantry.x_start.pressed()?,
                Axis::Y => self.gantry.y_home.pressed()?,
            };
            if pressed {
                break;
            }
            if waited_ms >= self.homing.timeout_ms {
                return Err(Error::Timeout { what, waited_ms });
            }
            self.gantry.sleep_ms(self.homing.poll_ms);
            waited_ms += self.homing.poll_ms;
        }

        match axis {
            Axis::X => self.gantry.motor_x.stop()?,
            Axis::Y => self.gantry.motor_y.stop()?,
        }
        log::debug!("{} reached after {}ms", what, waited_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Position;
    use crate::devices::mock::config::SimulationConfig;
    use crate::devices::mock::{MockGantry, SwitchId};

    struct Fixture {
        mock: MockGantry,
        gantry: Gantry,
        tracker: PositionTracker,
        direction: Direction,
        ready: bool,
        homing: HomingConfig,
        bumper: BumperConfig,
    }

    impl Fixture {
        fn new(sim: SimulationConfig) -> Self {
            let mock = MockGantry::new(sim).unwrap();
            let gantry = mock.gantry();
            Self {
                mock,
                gantry,
                tracker: PositionTracker::new(),
                direction: Direction::Backward,
                ready: false,
                homing: HomingConfig::default(),
                bumper: BumperConfig::default(),
            }
        }

        fn home(&mut self) -> Result<()> {
            AxisHomer {
                gantry: &mut self.gantry,
                tracker: &mut self.tracker,
                direction: &mut self.direction,
                ready: &mut self.ready,
                homing: &self.homing,
                bumper: &self.bumper,
            }
            .home()
        }
    }

    #[test]
    fn test_home_from_anywhere() {
        for (x, y) in [(0.0, 0.0), (1500.0, 600.0), (4000.0, 12_500.0), (37.0, 3.0)] {
            let mut fx = Fixture::new(SimulationConfig {
                start_x: x,
                start_y: y,
                ..SimulationConfig::quiet()
            });
            fx.tracker.set_x(999);
            fx.tracker.set_y(42);

            fx.home().unwrap();

            assert_eq!(fx.tracker.get(), Position::new(0, 0));
            assert!(fx.ready);
            assert_eq!(fx.direction, Direction::Forward);
            // carriage left sitting one back-off move past each switch
            assert_eq!(fx.mock.carriage_x(), 100.0);
            assert_eq!(fx.mock.carriage_y(), 100.0);
        }
    }

    #[test]
    fn test_home_twice_is_idempotent() {
        let mut fx = Fixture::new(SimulationConfig::quiet());
        fx.home().unwrap();
        let first = (fx.mock.carriage_x(), fx.mock.carriage_y());
        fx.home().unwrap();
        assert_eq!((fx.mock.carriage_x(), fx.mock.carriage_y()), first);
        assert_eq!(fx.tracker.get(), Position::new(0, 0));
    }

    #[test]
    fn test_beeps_twice_per_axis() {
        let mut fx = Fixture::new(SimulationConfig::quiet());
        fx.home().unwrap();
        assert_eq!(fx.mock.beeps(), 4);
    }

    #[test]
    fn test_dead_switch_times_out() {
        let mut fx = Fixture::new(SimulationConfig::quiet());
        fx.mock.disable_switch(SwitchId::XStart);
        fx.homing.timeout_ms = 2_000;

        let err = fx.home().unwrap_err();
        assert!(matches!(
            err,
            Error::Timeout {
                what: "X start switch",
                waited_ms: 2_000
            }
        ));
        assert!(!fx.ready);
    }
}
