//! Seeded random variates for arrivals, service, routing, and failures.
//!
//! The engine draws every random number through one
//! [`VariateGenerator`]. Seeding it makes a run reproducible; replacing
//! it makes the engine testable with a scripted stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Exp1;
use sojourn_core::Distribution;

/// Source of every random draw the engine makes.
#[derive(Clone, Debug)]
pub struct VariateGenerator {
    rng: ChaCha8Rng,
}

impl VariateGenerator {
    /// Generator seeded from `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Wrap an existing stream, for example one positioned mid-sequence.
    pub fn from_rng(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }

    /// Draw a duration with the given `mean` from `distribution`.
    ///
    /// A non-finite or non-positive mean yields zero. `Trace` has no
    /// recorded data to replay and falls back to the mean.
    pub fn sample(&mut self, distribution: Distribution, mean: f64) -> f64 {
        if !(mean.is_finite() && mean > 0.0) {
            return 0.0;
        }
        match distribution {
            Distribution::Poisson => self.exp1() * mean,
            Distribution::Deterministic | Distribution::Trace => mean,
            Distribution::Uniform => self.rng.gen_range(0.0..2.0 * mean),
            Distribution::Erlang { k } => {
                let k = k.max(1);
                let total: f64 = (0..k).map(|_| self.exp1()).sum();
                total * mean / f64::from(k)
            }
        }
    }

    /// Uniform draw in `[0, 1)`.
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.uniform() < p
    }

    fn exp1(&mut self) -> f64 {
        self.rng.sample(Exp1)
    }
}
