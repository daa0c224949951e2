//! Simulated gantry configuration
//!
//! Every parameter has a default, so `[device.simulation]` may be empty.
//!
//! ```text
//! SimulationConfig
//! ├── bed_width, bed_depth          # Travel of each axis (deg)
//! ├── start_x, start_y              # Carriage position at power-on
//! ├── x_switch_travel, y_switch_travel
//! ├── pattern_file | grid_*         # What the sensor sees
//! ├── sensor_noise_stddev, random_seed
//! └── speed_factor                  # Wall-clock pacing
//! ```
//!
//! | Parameter | Default | Meaning |
//! |-----------|---------|---------|
//! | bed_width | 4000 | X travel between the start and end switches |
//! | bed_depth | 12500 | Y travel beyond the home switch |
//! | grid_spacing | 400 | Distance between printed grid lines |
//! | line_width | 40 | Printed line thickness |
//! | sensor_noise_stddev | 1.5 | Gaussian reflectance noise |

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// X travel between the two X switches (deg)
    #[serde(default = "default_bed_width")]
    pub bed_width: i64,

    /// Y travel from the home switch to the far stop (deg)
    #[serde(default = "default_bed_depth")]
    pub bed_depth: i64,

    /// Initial X carriage position (deg from the start stop)
    #[serde(default = "default_start_x")]
    pub start_x: f64,

    /// Initial Y carriage position (deg from the home stop)
    #[serde(default = "default_start_y")]
    pub start_y: f64,

    /// Distance from each X stop over which its switch reads pressed
    #[serde(default)]
    pub x_switch_travel: f64,

    /// Distance from the Y stop over which the home switch reads pressed
    #[serde(default)]
    pub y_switch_travel: f64,

    /// Grayscale image (PNG/PGM) stretched over the bed; overrides the grid
    #[serde(default)]
    pub pattern_file: Option<String>,

    /// Spacing of the synthetic grid lines (deg)
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: f64,

    /// Thickness of the synthetic grid lines (deg)
    #[serde(default = "default_line_width")]
    pub line_width: f64,

    /// Reflectance of blank paper (0-100)
    #[serde(default = "default_paper_reflectance")]
    pub paper_reflectance: u8,

    /// Reflectance of printed lines (0-100)
    #[serde(default = "default_ink_reflectance")]
    pub ink_reflectance: u8,

    /// Reflectance noise standard deviation
    #[serde(default = "default_sensor_noise_stddev")]
    pub sensor_noise_stddev: f32,

    /// Random seed for reproducible noise (0 = random each run)
    #[serde(default)]
    pub random_seed: u64,

    /// Wall-clock pacing: 1.0 = real time, 2.0 = twice as fast,
    /// 0.0 = never sleep
    #[serde(default)]
    pub speed_factor: f64,
}

fn default_bed_width() -> i64 {
    4000
}
fn default_bed_depth() -> i64 {
    12_500
}
fn default_start_x() -> f64 {
    1500.0
}
fn default_start_y() -> f64 {
    600.0
}
fn default_grid_spacing() -> f64 {
    400.0
}
fn default_line_width() -> f64 {
    40.0
}
fn default_paper_reflectance() -> u8 {
    85
}
fn default_ink_reflectance() -> u8 {
    10
}
fn default_sensor_noise_stddev() -> f32 {
    1.5
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bed_width: default_bed_width(),
            bed_depth: default_bed_depth(),
            start_x: default_start_x(),
            start_y: default_start_y(),
            x_switch_travel: 0.0,
            y_switch_travel: 0.0,
            pattern_file: None,
            grid_spacing: default_grid_spacing(),
            line_width: default_line_width(),
            paper_reflectance: default_paper_reflectance(),
            ink_reflectance: default_ink_reflectance(),
            sensor_noise_stddev: default_sensor_noise_stddev(),
            random_seed: 0,
            speed_factor: 0.0,
        }
    }
}

impl SimulationConfig {
    /// Defaults without sensor noise, for deterministic runs
    pub fn quiet() -> Self {
        Self {
            sensor_noise_stddev: 0.0,
            random_seed: 1,
            ..Self::default()
        }
    }
}
