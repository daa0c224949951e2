//! Seeded Gaussian noise for the simulated reflectance sensor

use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

/// Noise generator with configurable seed for reproducibility
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// Create a new noise generator
    ///
    /// A seed of 0 draws from system entropy.
    pub fn new(seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Self { rng }
    }

    /// Gaussian noise with the given standard deviation
    #[inline]
    pub fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }

    /// Add noise to a reflectance value, keeping it in 0..=100
    pub fn perturb_reflectance(&mut self, value: u8, stddev: f32) -> u8 {
        let noisy = value as f32 + self.gaussian(stddev);
        noisy.round().clamp(0.0, 100.0) as u8
    }
}
