//! Random source abstraction.
//!
//! Training draws randomness in exactly two shapes: a uniform integer in
//! `[0, n)` (initial center choice) and a uniform double in `[0, 1)`
//! (weighted selection, synthetic coordinates). Parameterizing over this
//! trait keeps training deterministic under a fixed seed, which the
//! property tests rely on.

use rand::Rng;

/// Source of uniform randomness for training.
///
/// Any [`rand::Rng`] implements this, so a seeded
/// [`StdRng`](rand::rngs::StdRng) is the usual deterministic choice and
/// [`rand::rng()`] the usual production one.
pub trait RandomSource {
    /// Uniform integer in `[0, bound)`. `bound` must be positive.
    fn uniform_int(&mut self, bound: usize) -> usize;

    /// Uniform double in `[0, 1)`.
    fn uniform_double(&mut self) -> f64;
}

impl<R: Rng> RandomSource for R {
    #[inline]
    fn uniform_int(&mut self, bound: usize) -> usize {
        self.random_range(0..bound)
    }

    #[inline]
    fn uniform_double(&mut self) -> f64 {
        self.random::<f64>()
    }
}
