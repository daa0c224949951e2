//! Limit-switch (bumper) recovery
//!
//! Every time a carriage reaches a limit switch the same protocol runs:
//! beep, back the carriage off the switch, beep again, reset the logical
//! coordinate of that axis and, for X, hand over the new scan direction.

use crate::config::BumperConfig;
use crate::core::driver::Gantry;
use crate::core::types::{Axis, BumperEvent, Direction};
use crate::error::{Error, Result};
use crate::scan::tracker::PositionTracker;

/// Recovery protocol bound to the controller's state for one event
pub struct BumperRecoveryHandler<'a> {
    gantry: &'a mut Gantry,
    tracker: &'a mut PositionTracker,
    config: &'a BumperConfig,
}

impl<'a> BumperRecoveryHandler<'a> {
    pub fn new(
        gantry: &'a mut Gantry,
        tracker: &'a mut PositionTracker,
        config: &'a BumperConfig,
    ) -> Self {
        Self {
            gantry,
            tracker,
            config,
        }
    }

    /// Recover from an X switch
    ///
    /// The back-off is a single timed move towards `new_direction`, i.e.
    /// away from the switch that fired. `direction` is the controller's scan
    /// direction and is overwritten with `new_direction`.
    pub fn recover_x(
        &mut self,
        direction: &mut Direction,
        new_direction: Direction,
        reset_to: i64,
    ) -> Result<BumperEvent> {
        let fired_while = *direction;
        self.gantry.indicator.beep()?;
        log::info!("Reached X limit moving {}, backing off", fired_while);

        self.gantry.motor_x.run_angle(
            self.config.backoff_speed,
            new_direction.apply(self.config.backoff_angle),
        )?;
        self.gantry.sleep_ms(self.config.settle_ms);

        self.gantry.indicator.beep()?;
        self.tracker.set_x(reset_to);
        *direction = new_direction;
        log::info!(
            "X limit released; position reset to {}, now moving {}",
            reset_to,
            new_direction
        );

        Ok(BumperEvent {
            axis: Axis::X,
            direction: Some(fired_while),
            reset_to,
            release_attempts: 1,
        })
    }

    /// Recover from the Y home switch
    ///
    /// Backs off repeatedly while the switch stays pressed, up to
    /// `max_release_attempts` moves.
    pub fn recover_y(&mut self, reset_to: i64) -> Result<BumperEvent> {
        self.gantry.indicator.beep()?;
        log::info!("Reached Y limit, waiting for release");

        let mut attempts = 0;
        while self.gantry.y_home.pressed()? {
            if attempts >= self.config.max_release_attempts {
                self.gantry.motor_y.stop()?;
                return Err(Error::SwitchStuck {
                    axis: Axis::Y,
                    attempts,
                });
            }
            self.gantry
                .motor_y
                .run_angle(self.config.backoff_speed, self.config.backoff_angle)?;
            self.gantry.sleep_ms(self.config.settle_ms);
            attempts += 1;
        }

        self.gantry.indicator.beep()?;
        self.tracker.set_y(reset_to);
        log::info!(
            "Y limit released after {} back-off moves; position reset to {}",
            attempts,
            reset_to
        );

        Ok(BumperEvent {
            axis: Axis::Y,
            direction: None,
            reset_to,
            release_attempts: attempts,
        })
    }
}
