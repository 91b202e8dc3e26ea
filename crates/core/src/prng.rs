//! Seedable Xorshift64 PRNG used for particle spawning.
//!
//! The browser host seeds it from `Math.random()`; the CLI and tests seed it
//! explicitly so a given seed always spawns the same field.

use serde::{Deserialize, Serialize};

/// Xorshift64 PRNG with shifts (13, 7, 17).
///
/// A seed of 0 is replaced with a non-zero fallback, since zero is a fixed
/// point of the algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Builds a seed from a unit-interval float, e.g. `Math.random()`.
    pub fn from_unit(value: f64) -> Self {
        let bits = (value.clamp(0.0, 1.0) * u64::MAX as f64) as u64;
        Self::new(bits)
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform f64 in [0, 1), built from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Uniform f64 in [-magnitude, magnitude).
    pub fn next_signed(&mut self, magnitude: f64) -> f64 {
        self.next_range(-magnitude, magnitude)
    }

    /// Uniform usize in [0, max).
    ///
    /// # Panics
    ///
    /// Panics if `max` is 0.
    pub fn next_usize(&mut self, max: usize) -> usize {
        (self.next_u64() as usize) % max
    }

    /// Picks one element of a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_usize(items.len()))
    }
}
