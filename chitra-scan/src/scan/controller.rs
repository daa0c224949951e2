//! Raster scan controller
//!
//! Owns the gantry and every piece of scan state. One call to
//! [`ScanController::scan`] runs a full serpentine session:
//!
//! ```text
//! for each row until y >= row_limit:
//!   1. remember the X encoder reading
//!   2. run X at the scan speed in the current direction
//!   3. every tick: ramp down past the threshold, sample every
//!      `sample_interval` of travel, stop at the switch ahead
//!   4. bumper recovery: reverse direction, reset x
//!   5. emit the row in left-to-right order
//!   6. step Y by one row
//! ```
//!
//! Sampling is triggered by distance, never by time, so the resolution of a
//! row does not depend on the carriage speed.

use crate::config::{BumperConfig, Config, HomingConfig, JogConfig, ScanConfig};
use crate::core::driver::Gantry;
use crate::core::types::{Direction, Position, ScanOutcome, SessionState};
use crate::error::{Error, Result};
use crate::scan::bumper::BumperRecoveryHandler;
use crate::scan::homing::AxisHomer;
use crate::scan::recorder::{RowRecorder, RowSink};
use crate::scan::tracker::PositionTracker;

/// Summary of one scanned row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowReport {
    /// Direction the row was scanned in
    pub direction: Direction,
    /// X travel between the row start and the limit switch (deg)
    pub traveled: i64,
    /// Samples written to the log
    pub samples: usize,
    /// Whether the carriage was slowed down before the switch
    pub ramped: bool,
}

/// Two-axis raster scan controller
pub struct ScanController {
    gantry: Gantry,
    sink: Box<dyn RowSink>,
    tracker: PositionTracker,
    recorder: RowRecorder,
    direction: Direction,
    ready: bool,
    state: SessionState,
    rows_completed: u32,
    last_row: Option<RowReport>,
    scan_config: ScanConfig,
    homing_config: HomingConfig,
    bumper_config: BumperConfig,
    jog_config: JogConfig,
}

impl ScanController {
    /// Build a controller over `gantry`, rejecting an invalid configuration
    pub fn new(gantry: Gantry, sink: Box<dyn RowSink>, config: &Config) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "ScanController: speed={}, ramp at {} (1/{}), sample every {}, {} rows",
            config.scan.speed,
            config.scan.ramp_threshold,
            config.scan.ramp_divisor,
            config.scan.sample_interval,
            config.scan.row_limit
        );
        Ok(Self {
            gantry,
            sink,
            tracker: PositionTracker::new(),
            recorder: RowRecorder::new(config.scan.row_capacity),
            direction: Direction::Forward,
            ready: false,
            state: SessionState::Idle,
            rows_completed: 0,
            last_row: None,
            scan_config: config.scan.clone(),
            homing_config: config.homing.clone(),
            bumper_config: config.bumper.clone(),
            jog_config: config.jog.clone(),
        })
    }

    /// Home both axes; the controller is ready to scan afterwards
    pub fn home(&mut self) -> Result<()> {
        if self.state.is_busy() {
            return Err(Error::Busy);
        }
        self.state = SessionState::Homing;
        self.ready = false;

        let result = AxisHomer {
            gantry: &mut self.gantry,
            tracker: &mut self.tracker,
            direction: &mut self.direction,
            ready: &mut self.ready,
            homing: &self.homing_config,
            bumper: &self.bumper_config,
        }
        .home();

        match result {
            Ok(()) => {
                self.state = SessionState::Ready;
                Ok(())
            }
            Err(e) => Err(self.abort(e)),
        }
    }

    /// Run a full serpentine scan
    ///
    /// Rejected without any motion when the gantry has not been homed.
    pub fn scan(&mut self) -> Result<ScanOutcome> {
        if !self.ready {
            log::warn!("Scanner is not ready; home first");
            return Ok(ScanOutcome::NotReady);
        }

        log::info!("Scanning {} rows", self.scan_config.row_limit);
        self.ready = false;
        self.direction = Direction::Forward;
        self.state = SessionState::Scanning;
        // rows are counted from the homed Y origin, whatever was jogged since
        self.tracker.set_y(0);

        let mut rows = 0;
        while self.tracker.y() < self.scan_config.row_limit {
            match self.scan_row() {
                Ok(report) => {
                    rows += 1;
                    self.rows_completed += 1;
                    self.last_row = Some(report);
                }
                Err(e) => return Err(self.abort(e)),
            }
        }

        self.state = SessionState::Done;
        log::info!("All scanned: {} rows", rows);
        Ok(ScanOutcome::Completed { rows })
    }

    fn scan_row(&mut self) -> Result<RowReport> {
        let cfg = &self.scan_config;
        let direction = self.direction;
        let row = self.tracker.y();

        let reference = self.gantry.motor_x.angle()?;
        let start_x = self.tracker.x();
        self.gantry.motor_x.run(direction.apply(cfg.speed))?;

        let mut ramped = false;
        let mut next_sample = 0;
        let mut waited_ms = 0;
        loop {
            // only the switch ahead of the carriage ends the row
            let at_limit = match direction {
                Direction::Forward => self.gantry.x_end.pressed()?,
                Direction::Backward => self.gantry.x_start.pressed()?,
            };
            if at_limit {
                break;
            }
            if waited_ms >= cfg.row_timeout_ms {
                return Err(Error::Timeout {
                    what: "X limit switch",
                    waited_ms,
                });
            }

            let traveled = (self.gantry.motor_x.angle()? - reference).abs();
            self.tracker
                .set_x((start_x + direction.sign() as i64 * traveled).max(0));

            if !ramped && traveled >= cfg.ramp_threshold {
                ramped = true;
                self.gantry
                    .motor_x
                    .run(direction.apply(cfg.ramped_speed()))?;
                log::debug!("Row {}: ramping down at {} deg", row, traveled);
            }

            if traveled >= next_sample {
                self.recorder.sample(self.gantry.sensor.as_mut())?;
                next_sample = (traveled / cfg.sample_interval + 1) * cfg.sample_interval;
            }

            self.gantry.sleep_ms(cfg.tick_ms);
            waited_ms += cfg.tick_ms;
        }

        self.gantry.motor_x.stop()?;
        let final_travel = (self.gantry.motor_x.angle()? - reference).abs();
        self.tracker
            .set_x((start_x + direction.sign() as i64 * final_travel).max(0));
        log::debug!(
            "Row {}: {} limit after {} deg ({} samples)",
            row,
            direction,
            final_travel,
            self.recorder.len()
        );

        let reset_to = match direction {
            Direction::Backward => 0,
            // the far end becomes the known scan width
            Direction::Forward => self.tracker.x(),
        };
        let event =
            BumperRecoveryHandler::new(&mut self.gantry, &mut self.tracker, &self.bumper_config)
                .recover_x(&mut self.direction, direction.reversed(), reset_to)?;
        log::debug!("Row {}: {:?}", row, event);

        let samples = self.recorder.emit(direction, self.sink.as_mut())?;

        self.gantry
            .motor_y
            .run_angle(self.scan_config.speed, self.scan_config.y_step_angle)?;
        self.tracker.set_y(row + 1);
        log::info!("Row {} done ({}, {} samples)", row + 1, direction, samples);
        self.gantry.sleep_ms(self.scan_config.row_settle_ms);

        Ok(RowReport {
            direction,
            traveled: final_travel,
            samples,
            ramped,
        })
    }

    /// Stop everything and leave the session not ready
    fn abort(&mut self, error: Error) -> Error {
        log::error!("{:?} aborted: {}", self.state, error);
        if let Err(e) = self.gantry.stop_all() {
            log::error!("Failed to stop motors: {}", e);
        }
        self.recorder.clear();
        self.ready = false;
        self.state = SessionState::Aborted;
        error
    }

    /// Jog X by a signed angle
    pub fn move_x(&mut self, delta: i32) -> Result<Position> {
        self.jog(delta, true)
    }

    /// Jog Y by a signed angle
    pub fn move_y(&mut self, delta: i32) -> Result<Position> {
        self.jog(delta, false)
    }

    fn jog(&mut self, delta: i32, x_axis: bool) -> Result<Position> {
        if self.state.is_busy() {
            return Err(Error::Busy);
        }
        let speed = self.jog_config.speed;
        if x_axis {
            self.gantry.motor_x.run_angle(speed, delta)?;
            self.tracker.set_x((self.tracker.x() + delta as i64).max(0));
        } else {
            self.gantry.motor_y.run_angle(speed, delta)?;
            self.tracker.set_y((self.tracker.y() + delta as i64).max(0));
        }
        Ok(self.tracker.get())
    }

    pub fn get_position(&self) -> Position {
        self.tracker.get()
    }

    pub fn beep(&mut self) -> Result<()> {
        self.gantry.indicator.beep()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Rows emitted since the controller was created
    pub fn rows_completed(&self) -> u32 {
        self.rows_completed
    }

    pub fn last_row(&self) -> Option<RowReport> {
        self.last_row
    }

    /// Step size of one jog command
    pub fn jog_step(&self) -> i32 {
        self.jog_config.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Axis;
    use crate::devices::mock::config::SimulationConfig;
    use crate::devices::mock::{MockGantry, MotorCommand};
    use crate::scan::recorder::MemoryRowLog;

    fn controller(sim: SimulationConfig, config: &Config) -> (MockGantry, MemoryRowLog, ScanController) {
        let mock = MockGantry::new(sim).unwrap();
        let log = MemoryRowLog::new();
        let ctl = ScanController::new(mock.gantry(), Box::new(log.clone()), config).unwrap();
        (mock, log, ctl)
    }

    #[test]
    fn test_scan_before_home_is_rejected() {
        let (mock, log, mut ctl) = controller(SimulationConfig::quiet(), &Config::default());

        assert_eq!(ctl.scan().unwrap(), ScanOutcome::NotReady);
        assert!(mock.commands(Axis::X).is_empty());
        assert!(mock.commands(Axis::Y).is_empty());
        assert!(log.is_empty());
        assert_eq!(ctl.state(), SessionState::Idle);
    }

    #[test]
    fn test_home_sets_ready() {
        let (_mock, _log, mut ctl) = controller(SimulationConfig::quiet(), &Config::default());
        ctl.home().unwrap();
        assert!(ctl.is_ready());
        assert_eq!(ctl.state(), SessionState::Ready);
        assert_eq!(ctl.get_position(), Position::new(0, 0));
    }

    #[test]
    fn test_small_scan_completes() {
        let mut config = Config::default();
        config.scan.row_limit = 3;
        let sim = SimulationConfig {
            bed_width: 800,
            ..SimulationConfig::quiet()
        };
        let (_mock, log, mut ctl) = controller(sim, &config);

        ctl.home().unwrap();
        assert_eq!(ctl.scan().unwrap(), ScanOutcome::Completed { rows: 3 });
        assert_eq!(ctl.state(), SessionState::Done);
        assert!(!ctl.is_ready());
        assert_eq!(log.len(), 3);
        assert_eq!(ctl.get_position().y, 3);
        // three rows: forward, backward, forward
        assert_eq!(ctl.direction(), Direction::Backward);
    }

    #[test]
    fn test_scan_after_done_needs_rehoming() {
        let mut config = Config::default();
        config.scan.row_limit = 1;
        let sim = SimulationConfig {
            bed_width: 500,
            ..SimulationConfig::quiet()
        };
        let (_mock, log, mut ctl) = controller(sim, &config);

        ctl.home().unwrap();
        ctl.scan().unwrap();
        assert_eq!(ctl.scan().unwrap(), ScanOutcome::NotReady);
        assert_eq!(log.len(), 1);

        ctl.home().unwrap();
        assert_eq!(ctl.scan().unwrap(), ScanOutcome::Completed { rows: 1 });
        assert_eq!(ctl.rows_completed(), 2);
    }

    #[test]
    fn test_sensor_failure_aborts_cleanly() {
        let mut config = Config::default();
        config.scan.row_limit = 5;
        let (mock, log, mut ctl) = controller(SimulationConfig::quiet(), &config);

        ctl.home().unwrap();
        mock.set_sensor_fault(true);
        let err = ctl.scan().unwrap_err();

        assert!(matches!(err, Error::Hardware(_)));
        assert_eq!(ctl.state(), SessionState::Aborted);
        assert!(!ctl.is_ready());
        assert!(log.is_empty());
        assert_eq!(mock.velocity(Axis::X), 0.0);
        assert_eq!(mock.commands(Axis::X).last(), Some(&MotorCommand::Stop));
    }

    #[test]
    fn test_jog_updates_position() {
        let (mock, _log, mut ctl) = controller(SimulationConfig::quiet(), &Config::default());
        ctl.home().unwrap();

        assert_eq!(ctl.move_x(2).unwrap(), Position::new(2, 0));
        assert_eq!(ctl.move_y(2).unwrap(), Position::new(2, 2));
        assert_eq!(ctl.move_x(-5).unwrap(), Position::new(0, 2));
        assert_eq!(mock.carriage_x(), 97.0);
        assert!(ctl.is_ready());
    }
}
