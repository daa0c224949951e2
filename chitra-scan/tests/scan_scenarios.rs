//! End-to-end scan sessions against the simulated gantry

use chitra_scan::core::types::{Axis, Direction, Position, ScanOutcome, SessionState};
use chitra_scan::devices::mock::config::SimulationConfig;
use chitra_scan::devices::mock::{MockGantry, MotorCommand, SwitchId};
use chitra_scan::scan::{CsvRowLog, MemoryRowLog, RowSink, ScanController};
use chitra_scan::{Config, Error};

/// 500 deg bed: after homing leaves the carriage 100 deg out, a forward row
/// covers exactly 400 deg. At 1000 deg/s and a 1ms tick the encoder moves
/// one degree per tick.
fn narrow_bed() -> SimulationConfig {
    SimulationConfig {
        bed_width: 500,
        ..SimulationConfig::quiet()
    }
}

fn unit_tick_config(rows: i64) -> Config {
    let mut config = Config::default();
    config.scan.speed = 1000;
    config.scan.tick_ms = 1;
    config.scan.sample_interval = 10;
    config.scan.row_limit = rows;
    config
}

fn setup(
    sim: SimulationConfig,
    config: &Config,
) -> (MockGantry, MemoryRowLog, ScanController) {
    let mock = MockGantry::new(sim).unwrap();
    let log = MemoryRowLog::new();
    let ctl = ScanController::new(mock.gantry(), Box::new(log.clone()), config).unwrap();
    (mock, log, ctl)
}

fn homed(sim: SimulationConfig, config: &Config) -> (MockGantry, MemoryRowLog, ScanController) {
    let (mock, log, mut ctl) = setup(sim, config);
    ctl.home().unwrap();
    mock.clear_commands();
    (mock, log, ctl)
}

#[test]
fn forward_row_samples_every_interval_until_the_end_switch() {
    let (mock, log, mut ctl) = homed(narrow_bed(), &unit_tick_config(1));
    mock.script_reflectance(0..40);

    assert_eq!(ctl.scan().unwrap(), ScanOutcome::Completed { rows: 1 });

    // one sample at traveled 0, 10, ..., 390; the switch cuts the row at 400
    let rows = log.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], (0..40).collect::<Vec<u8>>());

    let report = ctl.last_row().unwrap();
    assert_eq!(report.direction, Direction::Forward);
    assert_eq!(report.traveled, 400);
    assert_eq!(report.samples, 40);
    assert!(!report.ramped);
    assert_eq!(ctl.get_position(), Position::new(400, 1));
}

#[test]
fn backward_row_is_logged_left_to_right() {
    let (mock, log, mut ctl) = homed(narrow_bed(), &unit_tick_config(2));
    mock.script_reflectance(0..40);
    // the return pass meets the same columns in the opposite order
    mock.script_reflectance((0..40).rev());

    assert_eq!(ctl.scan().unwrap(), ScanOutcome::Completed { rows: 2 });

    let rows = log.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], rows[0]);
    assert_eq!(rows[1], (0..40).collect::<Vec<u8>>());

    let report = ctl.last_row().unwrap();
    assert_eq!(report.direction, Direction::Backward);
    assert_eq!(report.traveled, 400);
    assert_eq!(ctl.get_position(), Position::new(0, 2));
}

#[test]
fn scan_without_homing_does_nothing() {
    let (mock, log, mut ctl) = setup(narrow_bed(), &unit_tick_config(3));

    assert_eq!(ctl.scan().unwrap(), ScanOutcome::NotReady);
    assert!(mock.commands(Axis::X).is_empty());
    assert!(mock.commands(Axis::Y).is_empty());
    assert!(log.is_empty());
    assert_eq!(ctl.state(), SessionState::Idle);
}

#[test]
fn long_row_ramps_down_once_past_threshold() {
    // 4000 deg bed: the forward row passes the 3500 deg threshold at 3600+
    let mut config = Config::default();
    config.scan.row_limit = 1;
    let (mock, _log, mut ctl) = homed(SimulationConfig::quiet(), &config);

    ctl.scan().unwrap();

    let speed = config.scan.speed;
    assert_eq!(
        mock.commands(Axis::X),
        vec![
            MotorCommand::Run(speed),
            MotorCommand::Run(speed / 5),
            MotorCommand::Stop,
            MotorCommand::RunAngle {
                speed: config.bumper.backoff_speed,
                angle: -config.bumper.backoff_angle,
            },
        ]
    );
    let report = ctl.last_row().unwrap();
    assert!(report.ramped);
    assert_eq!(report.traveled, 3900);
}

#[test]
fn rows_alternate_direction() {
    let (mock, log, mut ctl) = homed(narrow_bed(), &unit_tick_config(4));

    ctl.scan().unwrap();

    let row_runs: Vec<i32> = mock
        .commands(Axis::X)
        .into_iter()
        .filter_map(|cmd| match cmd {
            MotorCommand::Run(speed) => Some(speed),
            _ => None,
        })
        .collect();
    assert_eq!(row_runs, vec![1000, -1000, 1000, -1000]);
    assert_eq!(log.len(), 4);
    assert_eq!(ctl.direction(), Direction::Forward);
}

#[test]
fn scan_stops_at_row_limit() {
    let config = unit_tick_config(5);
    let (mock, log, mut ctl) = homed(narrow_bed(), &config);

    assert_eq!(ctl.scan().unwrap(), ScanOutcome::Completed { rows: 5 });
    assert_eq!(log.len(), 5);
    assert_eq!(ctl.get_position().y, 5);
    assert_eq!(ctl.state(), SessionState::Done);
    assert!(!ctl.is_ready());

    let steps = mock.commands(Axis::Y);
    assert_eq!(steps.len(), 5);
    assert!(steps.iter().all(|cmd| *cmd
        == MotorCommand::RunAngle {
            speed: config.scan.speed,
            angle: config.scan.y_step_angle,
        }));
}

#[test]
fn full_row_buffer_drops_extra_samples() {
    let mut config = unit_tick_config(1);
    config.scan.row_capacity = 10;
    let (mock, log, mut ctl) = homed(narrow_bed(), &config);
    mock.script_reflectance(0..40);

    assert_eq!(ctl.scan().unwrap(), ScanOutcome::Completed { rows: 1 });

    assert_eq!(log.rows()[0], (0..10).collect::<Vec<u8>>());
    assert_eq!(ctl.last_row().unwrap().samples, 10);
}

#[test]
fn csv_log_holds_one_line_per_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.csv");
    std::fs::write(&path, "stale session\n").unwrap();

    let mock = MockGantry::new(narrow_bed()).unwrap();
    let sink = CsvRowLog::create(&path).unwrap();
    let mut ctl = ScanController::new(mock.gantry(), Box::new(sink), &unit_tick_config(2)).unwrap();
    ctl.home().unwrap();
    ctl.scan().unwrap();
    drop(ctl);

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let values: Vec<u8> = line.split(',').map(|v| v.parse().unwrap()).collect();
        assert_eq!(values.len(), 40);
        assert!(values.iter().all(|v| *v <= 100));
    }
}

#[test]
fn csv_log_formats_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    let mut sink = CsvRowLog::create(&path).unwrap();
    sink.write_row(&[85, 10, 0]).unwrap();
    sink.write_row(&[]).unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "85,10,0\n\n");
}

#[test]
fn stuck_home_switch_aborts_homing() {
    let (mock, log, mut ctl) = setup(narrow_bed(), &unit_tick_config(2));
    mock.set_stuck_y_switch(true);

    let err = ctl.home().unwrap_err();
    assert!(matches!(
        err,
        Error::SwitchStuck {
            axis: Axis::Y,
            attempts: 20
        }
    ));
    assert_eq!(ctl.state(), SessionState::Aborted);
    assert_eq!(ctl.scan().unwrap(), ScanOutcome::NotReady);
    assert!(log.is_empty());

    // cleared fault, fresh homing
    mock.set_stuck_y_switch(false);
    ctl.home().unwrap();
    assert_eq!(ctl.scan().unwrap(), ScanOutcome::Completed { rows: 2 });
}

#[test]
fn encoder_failure_mid_scan_stops_motors() {
    let (mock, log, mut ctl) = homed(narrow_bed(), &unit_tick_config(3));
    mock.set_encoder_fault(true);

    assert!(matches!(ctl.scan(), Err(Error::Hardware(_))));
    assert_eq!(mock.velocity(Axis::X), 0.0);
    assert_eq!(mock.velocity(Axis::Y), 0.0);
    assert!(log.is_empty());
    assert_eq!(ctl.state(), SessionState::Aborted);
}

#[test]
fn dead_end_switch_times_out_the_row() {
    let mut config = unit_tick_config(2);
    config.scan.row_timeout_ms = 3_000;
    let (mock, log, mut ctl) = homed(narrow_bed(), &config);
    mock.disable_switch(SwitchId::XEnd);

    let err = ctl.scan().unwrap_err();
    assert!(matches!(
        err,
        Error::Timeout {
            what: "X limit switch",
            waited_ms: 3_000
        }
    ));
    // carriage stalled against the far stop without the switch reporting it
    assert_eq!(mock.carriage_x(), 500.0);
    assert!(!mock.is_pressed(SwitchId::XEnd));
    assert_eq!(mock.velocity(Axis::X), 0.0);
    assert_eq!(mock.commands(Axis::X).last(), Some(&MotorCommand::Stop));
    assert!(log.is_empty());
    assert_eq!(ctl.state(), SessionState::Aborted);
    assert!(!ctl.is_ready());
}

#[test]
fn y_jog_after_homing_keeps_full_row_count() {
    let (_mock, log, mut ctl) = homed(narrow_bed(), &unit_tick_config(5));
    assert_eq!(ctl.move_y(2).unwrap(), Position::new(0, 2));

    assert_eq!(ctl.scan().unwrap(), ScanOutcome::Completed { rows: 5 });
    assert_eq!(log.len(), 5);
    assert_eq!(ctl.get_position().y, 5);
}

#[test]
fn invalid_config_is_rejected_before_any_motion() {
    let mock = MockGantry::new(narrow_bed()).unwrap();

    let mut config = unit_tick_config(1);
    config.scan.sample_interval = 0;
    let result = ScanController::new(mock.gantry(), Box::new(MemoryRowLog::new()), &config);
    assert!(matches!(result, Err(Error::Config(_))));

    let mut config = unit_tick_config(1);
    config.scan.ramp_divisor = 0;
    let result = ScanController::new(mock.gantry(), Box::new(MemoryRowLog::new()), &config);
    assert!(matches!(result, Err(Error::Config(_))));

    assert!(mock.commands(Axis::X).is_empty());
}
