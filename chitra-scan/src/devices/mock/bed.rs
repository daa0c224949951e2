//! What the simulated sensor sees on the scan bed
//!
//! Either a grayscale image stretched over the whole bed, or a synthetic
//! printed grid (dark lines on white paper).

use super::config::SimulationConfig;
use crate::error::{Error, Result};
use image::GrayImage;
use std::path::Path;

enum Pattern {
    Image(GrayImage),
    Grid {
        spacing: f64,
        line_width: f64,
        paper: u8,
        ink: u8,
    },
}

pub struct ScanBed {
    pattern: Pattern,
    width: f64,
    depth: f64,
}

impl ScanBed {
    /// Build the bed described by the simulation config
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let pattern = match &config.pattern_file {
            Some(path) => Pattern::Image(load_pattern(path)?),
            None => {
                if config.grid_spacing <= 0.0 {
                    return Err(Error::Config(
                        "simulation.grid_spacing must be positive".to_string(),
                    ));
                }
                Pattern::Grid {
                    spacing: config.grid_spacing,
                    line_width: config.line_width,
                    paper: config.paper_reflectance.min(100),
                    ink: config.ink_reflectance.min(100),
                }
            }
        };

        Ok(Self {
            pattern,
            width: config.bed_width as f64,
            depth: config.bed_depth as f64,
        })
    }

    #[cfg(test)]
    fn from_image(pixels: GrayImage, width: f64, depth: f64) -> Self {
        Self {
            pattern: Pattern::Image(pixels),
            width,
            depth,
        }
    }

    /// Noise-free reflectance (0-100) under the sensor at (x, y)
    pub fn reflectance_at(&self, x: f64, y: f64) -> u8 {
        match &self.pattern {
            Pattern::Grid {
                spacing,
                line_width,
                paper,
                ink,
            } => {
                let on_line = |v: f64| v.rem_euclid(*spacing) < *line_width;
                if on_line(x) || on_line(y) {
                    *ink
                } else {
                    *paper
                }
            }
            Pattern::Image(pixels) => {
                let (w, h) = pixels.dimensions();
                if w == 0 || h == 0 {
                    return 0;
                }
                let px = pixel_index(x, self.width, w);
                let py = pixel_index(y, self.depth, h);
                let luma = pixels.get_pixel(px, py).0[0] as u32;
                (luma * 100 / 255) as u8
            }
        }
    }
}

fn pixel_index(pos: f64, extent: f64, pixels: u32) -> u32 {
    if extent <= 0.0 {
        return 0;
    }
    let frac = (pos / extent).clamp(0.0, 1.0);
    ((frac * pixels as f64) as u32).min(pixels - 1)
}

fn load_pattern(path: &str) -> Result<GrayImage> {
    let path = Path::new(path);
    let img = image::open(path)
        .map_err(|e| {
            Error::Config(format!(
                "Failed to load bed pattern {}: {}",
                path.display(),
                e
            ))
        })?
        .into_luma8();
    log::info!(
        "Loaded bed pattern {} ({}x{} px)",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img)
}
