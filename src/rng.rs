//! Small deterministic PRNG for spin impulses and ball spawn positions.

use crate::float::Float;

/// xorshift64* generator. Same seed, same sequence, on every target.
#[derive(Copy, Clone, Debug)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed | 1 }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        ((x.wrapping_mul(2685821657736338717)) >> 32) as u32
    }

    /// Uniform in [0, 1).
    pub fn next_unit<F: Float>(&mut self) -> F {
        F::from_f64(self.next_u32() as f64 / (u32::MAX as f64 + 1.0))
    }

    /// Uniform in [lo, hi).
    pub fn range<F: Float>(&mut self, lo: F, hi: F) -> F {
        lo + (hi - lo) * self.next_unit::<F>()
    }

    /// Uniform in [-magnitude, magnitude]; the upper end is reachable after rounding to f32.
    pub fn signed<F: Float>(&mut self, magnitude: F) -> F {
        self.range(-magnitude, magnitude)
    }

    pub fn state(&self) -> u64 {
        self.state
    }
}
