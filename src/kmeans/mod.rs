//! Centroid training driver.
//!
//! [`Trainer`] selects between two paths:
//!
//! - **Quick path** when `samples ≤ k`: there is no clustering to do, so
//!   distinct samples become centers directly and the remainder is padded
//!   with random vectors (`quick`).
//! - **Full path** otherwise: k-means++ seeding (`init`) followed by
//!   Elkan-accelerated Lloyd iteration (`elkan`).
//!
//! Both paths end with the post-condition validator (`check`), which
//! treats any violation as a bug in the numerics rather than a recoverable
//! condition.

pub(crate) mod check;
pub(crate) mod elkan;
pub(crate) mod init;
pub(crate) mod quick;

use log::debug;

use crate::cancel::CancelToken;
use crate::distance::{DistanceFn, DistanceKind, NormFn};
use crate::error::{Result, TrainError};
use crate::random::RandomSource;
use crate::vectors::VectorArray;

/// Default scratch memory budget: 64 MB, the usual starting point for
/// maintenance operations.
pub const DEFAULT_MEMORY_BUDGET: usize = 64 * 1024 * 1024;

/// Maximum number of Lloyd passes before giving up on convergence.
pub(crate) const MAX_ITERATIONS: usize = 500;

/// Configured centroid trainer.
///
/// Built in the usual builder style; the only required piece is the
/// distance function, which must satisfy the triangle inequality.
///
/// ```rust
/// use kentro::{DistanceKind, Trainer};
///
/// let trainer = Trainer::for_metric(DistanceKind::Angular)
///     .with_memory_budget(256 * 1024 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct Trainer {
    distance: DistanceFn,
    norm: Option<NormFn>,
    index_norm: Option<NormFn>,
    mem_budget: usize,
    cancel: CancelToken,
}

impl Trainer {
    /// Create a trainer with a custom metric and no normalization.
    #[must_use]
    pub fn new(distance: DistanceFn) -> Self {
        Self {
            distance,
            norm: None,
            index_norm: None,
            mem_budget: DEFAULT_MEMORY_BUDGET,
            cancel: CancelToken::new(),
        }
    }

    /// Create a trainer wired for one of the preset metrics.
    #[must_use]
    pub fn for_metric(kind: DistanceKind) -> Self {
        Self {
            distance: kind.distance_fn(),
            norm: kind.kmeans_norm_fn(),
            index_norm: kind.index_norm_fn(),
            mem_budget: DEFAULT_MEMORY_BUDGET,
            cancel: CancelToken::new(),
        }
    }

    /// Normalize freshly computed centers with `norm` (spherical k-means).
    #[must_use]
    pub fn with_norm(mut self, norm: NormFn) -> Self {
        self.norm = Some(norm);
        self
    }

    /// Validate the final centers against `norm`: any zero-norm center is a
    /// post-condition violation. This is the *index* norm, distinct from
    /// the k-means norm.
    #[must_use]
    pub fn with_index_norm(mut self, norm: NormFn) -> Self {
        self.index_norm = Some(norm);
        self
    }

    /// Cap scratch memory at `bytes`. Training fails up front with
    /// [`TrainError::BudgetExceeded`] if the required scratch would not fit.
    #[must_use]
    pub fn with_memory_budget(mut self, bytes: usize) -> Self {
        self.mem_budget = bytes;
        self
    }

    /// Attach a cancellation token checked at every outer pass.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Train `centers.maxlen()` centroids from `samples`.
    ///
    /// `centers` must be empty on entry and share the sample dimension. On
    /// success `centers.len() == centers.maxlen()` and every center is
    /// finite, NaN-free, and distinct. The output order is unspecified
    /// (validation sorts centers in place).
    pub fn train(
        &self,
        samples: &VectorArray,
        centers: &mut VectorArray,
        rng: &mut dyn RandomSource,
    ) -> Result<()> {
        self.validate(samples, centers)?;

        if samples.len() <= centers.maxlen() {
            debug!(
                "quick path: {} samples for {} centers",
                samples.len(),
                centers.maxlen()
            );
            quick::quick_centers(samples, centers, self.norm, rng)?;
        } else {
            let mut elkan = elkan::ElkanKmeans::new(
                samples,
                centers,
                self.distance,
                self.norm,
                self.mem_budget,
                &self.cancel,
            )?;
            elkan.seed(rng)?;
            elkan.run(rng)?;
        }

        check::check_centers(centers, self.index_norm)
    }

    fn validate(&self, samples: &VectorArray, centers: &VectorArray) -> Result<()> {
        if centers.dim() == 0 || centers.maxlen() == 0 {
            return Err(TrainError::UnsupportedType(
                "centers must have positive dimension and capacity".into(),
            ));
        }
        if samples.dim() != centers.dim() {
            return Err(TrainError::UnsupportedType(format!(
                "sample dimension {} does not match center dimension {}",
                samples.dim(),
                centers.dim()
            )));
        }
        if !centers.is_empty() {
            return Err(TrainError::UnsupportedType(
                "centers must be empty on entry".into(),
            ));
        }
        Ok(())
    }
}

/// Scale `v` to unit length under `norm`, leaving zero-norm vectors
/// unmodified.
pub(crate) fn apply_norm(norm: NormFn, v: &mut [f32]) {
    let n = norm(v);
    if n > 0.0 {
        for x in v.iter_mut() {
            *x = (f64::from(*x) / n) as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::l2_distance;
    use rand::SeedableRng;

    #[test]
    fn rejects_dimension_mismatch() {
        let samples = VectorArray::zeroed(4, 3);
        let mut centers = VectorArray::new(2, 2);
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let err = Trainer::new(l2_distance)
            .train(&samples, &mut centers, &mut rng)
            .unwrap_err();
        assert!(matches!(err, TrainError::UnsupportedType(_)));
    }

    #[test]
    fn rejects_non_empty_centers() {
        let samples = VectorArray::zeroed(4, 2);
        let mut centers = VectorArray::new(2, 2);
        centers.push(&[1.0, 1.0]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let err = Trainer::new(l2_distance)
            .train(&samples, &mut centers, &mut rng)
            .unwrap_err();
        assert!(matches!(err, TrainError::UnsupportedType(_)));
    }

    #[test]
    fn rejects_zero_capacity() {
        let samples = VectorArray::zeroed(4, 2);
        let mut centers = VectorArray::new(0, 2);
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let err = Trainer::new(l2_distance)
            .train(&samples, &mut centers, &mut rng)
            .unwrap_err();
        assert!(matches!(err, TrainError::UnsupportedType(_)));
    }

    #[test]
    fn apply_norm_scales_to_unit_length() {
        let mut v = [3.0_f32, 4.0];
        apply_norm(crate::distance::l2_norm, &mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn apply_norm_leaves_zero_vector_unmodified() {
        let mut v = [0.0_f32, 0.0];
        apply_norm(crate::distance::l2_norm, &mut v);
        assert_eq!(v, [0.0, 0.0]);
    }
}
