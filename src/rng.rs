//! Seeded random source threaded through every stochastic decision.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The single random stream of a simulation run. Re-seeding with the same
/// value reproduces the same trajectory year by year.
#[derive(Clone, Debug)]
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RngCore for SimRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Helpers for the Bernoulli trials the lifecycle is built from.
pub trait RngExt {
    /// Uniform draw in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// True with the given probability. Values at or above 1 always succeed,
    /// values at or below 0 never do.
    fn chance(&mut self, probability: f64) -> bool;
}

impl<R: Rng + ?Sized> RngExt for R {
    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }
}
