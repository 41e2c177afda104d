//! Injectable random source so card draws and question picks replay under a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send {
    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform in `[0, n)`. `n` must be positive.
    fn below(&mut self, n: usize) -> usize;

    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}

/// Production source backed by `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn below(&mut self, n: usize) -> usize {
        debug_assert!(n > 0, "below() needs a non-empty range");
        self.0.gen_range(0..n.max(1))
    }
}

/// Replays a fixed script of values, cycling when exhausted. Test double.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    floats: Vec<f64>,
    indices: Vec<usize>,
    next_float: usize,
    next_index: usize,
}

impl ScriptedRandom {
    pub fn new(floats: Vec<f64>, indices: Vec<usize>) -> Self {
        Self {
            floats,
            indices,
            next_float: 0,
            next_index: 0,
        }
    }

    pub fn floats(floats: Vec<f64>) -> Self {
        Self::new(floats, vec![0])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f64(&mut self) -> f64 {
        if self.floats.is_empty() {
            return 0.0;
        }
        let v = self.floats[self.next_float % self.floats.len()];
        self.next_float += 1;
        v
    }

    fn below(&mut self, n: usize) -> usize {
        if self.indices.is_empty() || n == 0 {
            return 0;
        }
        let v = self.indices[self.next_index % self.indices.len()];
        self.next_index += 1;
        v % n
    }
}
