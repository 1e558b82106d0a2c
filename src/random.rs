//! Injectable random source
//!
//! Every random draw in the core (initial seed point, KMeans++ sampling,
//! empty-cluster reseeding) goes through [`RandomSource`], so a seeded or
//! scripted source makes whole trajectories reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the uniform draws used by the clustering core.
pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `[0, len)`. `len` is always at least 1.
    fn next_index(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn next_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Build the host's random source, seeded when a seed is given
pub fn seeded(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
