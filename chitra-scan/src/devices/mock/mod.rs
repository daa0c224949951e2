//! Simulated gantry for hardware-free scanning
//!
//! Simulates both carriages, the three limit switches, the reflectance sensor
//! and the speaker of a two-axis scanner, so the whole homing and scan
//! sequence can run on a desk or inside tests.
//!
//! # Overview
//!
//! | Component | Simulation Method |
//! |-----------|-------------------|
//! | X / Y motors | Constant-speed carriages between hard stops |
//! | Encoders | Integrated carriage travel (stalls at the stops) |
//! | Limit switches | Carriage within `*_switch_travel` of a stop |
//! | Reflectance sensor | Bed pattern lookup + Gaussian noise |
//! | Speaker | Beep counter |
//!
//! # Time
//!
//! There is no simulation thread. The world only moves when the controller
//! sleeps on the simulated [`Clock`] or issues a blocking `run_angle`, which
//! makes every run fully deterministic for a given seed. `speed_factor`
//! optionally paces the simulation against the wall clock.
//!
//! # Handles
//!
//! [`MockGantry`] owns the shared world. [`MockGantry::gantry`] hands out a
//! [`Gantry`] whose handles all point at that world, while the `MockGantry`
//! itself stays available for inspection and fault injection.

pub mod config;
mod bed;
mod noise;
mod physics;

use crate::core::driver::{Clock, Gantry, Indicator, LimitSwitch, Motor, ReflectanceSensor};
use crate::core::types::Axis;
use crate::error::{Error, Result};

use bed::ScanBed;
use config::SimulationConfig;
use noise::NoiseGenerator;
use physics::{move_duration, CarriageAxis};

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Motor command as received by a simulated motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    Run(i32),
    RunAngle { speed: i32, angle: i32 },
    Stop,
}

/// Simulated limit switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchId {
    XStart,
    XEnd,
    YHome,
}

#[derive(Debug, Default)]
struct Faults {
    sensor: bool,
    encoder_x: bool,
    stuck_y_switch: bool,
    disabled: Vec<SwitchId>,
}

/// Shared simulation state
struct World {
    x: CarriageAxis,
    y: CarriageAxis,
    bed: ScanBed,
    noise: NoiseGenerator,
    config: SimulationConfig,
    elapsed: Duration,
    beeps: u32,
    x_commands: Vec<MotorCommand>,
    y_commands: Vec<MotorCommand>,
    scripted: VecDeque<u8>,
    faults: Faults,
}

impl World {
    fn axis_mut(&mut self, axis: Axis) -> &mut CarriageAxis {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    fn record(&mut self, axis: Axis, cmd: MotorCommand) {
        match axis {
            Axis::X => self.x_commands.push(cmd),
            Axis::Y => self.y_commands.push(cmd),
        }
    }

    fn advance(&mut self, dt: Duration) {
        self.x.advance(dt);
        self.y.advance(dt);
        self.elapsed += dt;
    }

    fn switch_pressed(&self, id: SwitchId) -> bool {
        if self.faults.disabled.contains(&id) {
            return false;
        }
        match id {
            SwitchId::XStart => self.x.position() <= self.config.x_switch_travel,
            SwitchId::XEnd => self.x.position() >= self.x.travel() - self.config.x_switch_travel,
            SwitchId::YHome => {
                self.faults.stuck_y_switch || self.y.position() <= self.config.y_switch_travel
            }
        }
    }

    /// Wall-clock time to spend for `dt` of simulated time
    fn pacing(&self, dt: Duration) -> Option<Duration> {
        if self.config.speed_factor > 0.0 {
            Some(dt.div_f64(self.config.speed_factor))
        } else {
            None
        }
    }
}

/// Simulated two-axis gantry
#[derive(Clone)]
pub struct MockGantry {
    world: Arc<Mutex<World>>,
}

impl MockGantry {
    /// Create a simulated gantry from its configuration
    pub fn new(config: SimulationConfig) -> Result<Self> {
        if config.bed_width <= 0 || config.bed_depth <= 0 {
            return Err(Error::Config(
                "simulation.bed_width and bed_depth must be positive".to_string(),
            ));
        }
        let bed = ScanBed::from_config(&config)?;
        let world = World {
            x: CarriageAxis::new(config.start_x, config.bed_width as f64),
            y: CarriageAxis::new(config.start_y, config.bed_depth as f64),
            bed,
            noise: NoiseGenerator::new(config.random_seed),
            config,
            elapsed: Duration::ZERO,
            beeps: 0,
            x_commands: Vec::new(),
            y_commands: Vec::new(),
            scripted: VecDeque::new(),
            faults: Faults::default(),
        };
        log::info!(
            "Simulated gantry: bed {}x{} deg, carriage at ({:.0}, {:.0})",
            world.x.travel(),
            world.y.travel(),
            world.x.position(),
            world.y.position()
        );
        Ok(Self {
            world: Arc::new(Mutex::new(world)),
        })
    }

    /// Capability handles for the scan controller
    pub fn gantry(&self) -> Gantry {
        Gantry {
            motor_x: Box::new(MockMotor::new(&self.world, Axis::X)),
            motor_y: Box::new(MockMotor::new(&self.world, Axis::Y)),
            x_start: Box::new(MockSwitch::new(&self.world, SwitchId::XStart)),
            x_end: Box::new(MockSwitch::new(&self.world, SwitchId::XEnd)),
            y_home: Box::new(MockSwitch::new(&self.world, SwitchId::YHome)),
            sensor: Box::new(MockSensor {
                world: Arc::clone(&self.world),
            }),
            indicator: Box::new(MockIndicator {
                world: Arc::clone(&self.world),
            }),
            clock: Box::new(MockClock {
                world: Arc::clone(&self.world),
            }),
        }
    }

    /// X carriage position (deg from the start stop)
    pub fn carriage_x(&self) -> f64 {
        self.world.lock().x.position()
    }

    /// Y carriage position (deg from the home stop)
    pub fn carriage_y(&self) -> f64 {
        self.world.lock().y.position()
    }

    /// Commanded continuous speed of an axis
    pub fn velocity(&self, axis: Axis) -> f64 {
        self.world.lock().axis_mut(axis).velocity()
    }

    /// Every command the motor of `axis` received
    pub fn commands(&self, axis: Axis) -> Vec<MotorCommand> {
        let world = self.world.lock();
        match axis {
            Axis::X => world.x_commands.clone(),
            Axis::Y => world.y_commands.clone(),
        }
    }

    pub fn clear_commands(&self) {
        let mut world = self.world.lock();
        world.x_commands.clear();
        world.y_commands.clear();
    }

    pub fn beeps(&self) -> u32 {
        self.world.lock().beeps
    }

    /// Simulated time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.world.lock().elapsed
    }

    pub fn is_pressed(&self, id: SwitchId) -> bool {
        self.world.lock().switch_pressed(id)
    }

    /// Values returned by the sensor before it falls back to the bed pattern
    pub fn script_reflectance<I: IntoIterator<Item = u8>>(&self, values: I) {
        self.world.lock().scripted.extend(values);
    }

    /// Make every reflectance read fail
    pub fn set_sensor_fault(&self, fault: bool) {
        self.world.lock().faults.sensor = fault;
    }

    /// Make every X encoder read fail
    pub fn set_encoder_fault(&self, fault: bool) {
        self.world.lock().faults.encoder_x = fault;
    }

    /// Latch the Y home switch regardless of carriage position
    pub fn set_stuck_y_switch(&self, stuck: bool) {
        self.world.lock().faults.stuck_y_switch = stuck;
    }

    /// Disconnect a switch so it never reads pressed
    pub fn disable_switch(&self, id: SwitchId) {
        let mut world = self.world.lock();
        if !world.faults.disabled.contains(&id) {
            world.faults.disabled.push(id);
        }
    }
}

struct MockMotor {
    world: Arc<Mutex<World>>,
    axis: Axis,
}

impl MockMotor {
    fn new(world: &Arc<Mutex<World>>, axis: Axis) -> Self {
        Self {
            world: Arc::clone(world),
            axis,
        }
    }
}

impl Motor for MockMotor {
    fn run(&mut self, speed: i32) -> Result<()> {
        let mut world = self.world.lock();
        world.record(self.axis, MotorCommand::Run(speed));
        world.axis_mut(self.axis).set_velocity(speed as f64);
        Ok(())
    }

    fn run_angle(&mut self, speed: i32, angle: i32) -> Result<()> {
        let pacing = {
            let mut world = self.world.lock();
            world.record(self.axis, MotorCommand::RunAngle { speed, angle });
            let duration = move_duration(speed, angle);

            // the commanded axis moves as one step, the other keeps running
            let delta = angle as f64 * if speed < 0 { -1.0 } else { 1.0 };
            let axis = world.axis_mut(self.axis);
            axis.set_velocity(0.0);
            if speed != 0 {
                axis.displace(delta);
            }
            let other = match self.axis {
                Axis::X => &mut world.y,
                Axis::Y => &mut world.x,
            };
            other.advance(duration);
            world.elapsed += duration;
            world.pacing(duration)
        };
        if let Some(wall) = pacing {
            std::thread::sleep(wall);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut world = self.world.lock();
        world.record(self.axis, MotorCommand::Stop);
        world.axis_mut(self.axis).set_velocity(0.0);
        Ok(())
    }

    fn angle(&mut self) -> Result<i64> {
        let mut world = self.world.lock();
        if self.axis == Axis::X && world.faults.encoder_x {
            return Err(Error::Hardware("X encoder not responding".to_string()));
        }
        Ok(world.axis_mut(self.axis).encoder().round() as i64)
    }
}

struct MockSwitch {
    world: Arc<Mutex<World>>,
    id: SwitchId,
}

impl MockSwitch {
    fn new(world: &Arc<Mutex<World>>, id: SwitchId) -> Self {
        Self {
            world: Arc::clone(world),
            id,
        }
    }
}

impl LimitSwitch for MockSwitch {
    fn pressed(&mut self) -> Result<bool> {
        Ok(self.world.lock().switch_pressed(self.id))
    }
}

struct MockSensor {
    world: Arc<Mutex<World>>,
}

impl ReflectanceSensor for MockSensor {
    fn reflectance(&mut self) -> Result<u8> {
        let mut world = self.world.lock();
        if world.faults.sensor {
            return Err(Error::Hardware(
                "reflectance sensor not responding".to_string(),
            ));
        }
        if let Some(value) = world.scripted.pop_front() {
            return Ok(value);
        }
        let clean = world.bed.reflectance_at(world.x.position(), world.y.position());
        let stddev = world.config.sensor_noise_stddev;
        Ok(world.noise.perturb_reflectance(clean, stddev))
    }
}

struct MockIndicator {
    world: Arc<Mutex<World>>,
}

impl Indicator for MockIndicator {
    fn beep(&mut self) -> Result<()> {
        let mut world = self.world.lock();
        world.beeps += 1;
        log::debug!("beep #{}", world.beeps);
        Ok(())
    }
}

struct MockClock {
    world: Arc<Mutex<World>>,
}

impl Clock for MockClock {
    fn sleep(&mut self, duration: Duration) {
        let pacing = {
            let mut world = self.world.lock();
            world.advance(duration);
            world.pacing(duration)
        };
        if let Some(wall) = pacing {
            std::thread::sleep(wall);
        }
    }
}
