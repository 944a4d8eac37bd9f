//! Injectable randomness
//!
//! Spawn and velocity decisions draw from a `RandomSource` so that the
//! distribution logic can be driven by a seeded PRNG in play and by a fixed
//! script in tests.

use rand::Rng;
use rand_pcg::Pcg32;

/// Source of uniform random numbers in `[0, 1)`
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`
    fn unit(&mut self) -> f32;

    /// Uniform value in `[lo, hi)`
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.unit() * (hi - lo)
    }

    /// Uniform index in `0..len` (`len` must be non-zero)
    fn index(&mut self, len: usize) -> usize {
        ((self.unit() * len as f32) as usize).min(len - 1)
    }
}

impl RandomSource for Pcg32 {
    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Replays a fixed list of values, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let mut values = values.into();
        if values.is_empty() {
            values.push(0.5);
        }
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn unit(&mut self) -> f32 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v.clamp(0.0, 0.999_999)
    }
}
