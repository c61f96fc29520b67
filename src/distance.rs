//! Distance and norm adapters for centroid training.
//!
//! The training core is polymorphic over a pair of plain function pointers:
//! a *distance* and an optional *norm*. Both are fixed for a training run, so
//! there is no per-element dynamic dispatch.
//!
//! ## Important nuance
//!
//! Elkan's pruning relies on the triangle inequality, so the configured
//! distance must be a true metric. That means **L2, not L2 squared**, for
//! Euclidean training, and **angular distance** (not cosine distance) for
//! cosine/inner-product training. Squared distances do not satisfy the
//! triangle inequality and will silently produce wrong assignments.

use serde::{Deserialize, Serialize};

use crate::simd;

/// Distance between two vectors. Must satisfy the triangle inequality.
pub type DistanceFn = fn(&[f32], &[f32]) -> f64;

/// Norm of a vector.
pub type NormFn = fn(&[f32]) -> f64;

/// Preset metric configurations for training.
///
/// Selects the distance used inside k-means, the norm applied to freshly
/// computed centers (spherical k-means), and the norm validated on the final
/// centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceKind {
    /// Euclidean training: true L2 distance, no normalization.
    L2,
    /// Spherical training for cosine/inner-product indexes: angular
    /// distance, centers kept on the unit sphere.
    Angular,
}

impl DistanceKind {
    /// The metric used for every distance evaluation during training.
    #[must_use]
    pub fn distance_fn(self) -> DistanceFn {
        match self {
            DistanceKind::L2 => l2_distance,
            DistanceKind::Angular => angular_distance,
        }
    }

    /// Norm applied to newly computed centers, if any.
    #[must_use]
    pub fn kmeans_norm_fn(self) -> Option<NormFn> {
        match self {
            DistanceKind::L2 => None,
            DistanceKind::Angular => Some(l2_norm),
        }
    }

    /// Norm validated on the final centers, if any.
    ///
    /// Distinct from [`kmeans_norm_fn`](Self::kmeans_norm_fn): a zero-norm
    /// center is unusable by a cosine index even though training itself
    /// tolerates it.
    #[must_use]
    pub fn index_norm_fn(self) -> Option<NormFn> {
        match self {
            DistanceKind::L2 => None,
            DistanceKind::Angular => Some(l2_norm),
        }
    }
}

/// True L2 (Euclidean) distance.
#[inline]
#[must_use]
pub fn l2_distance(a: &[f32], b: &[f32]) -> f64 {
    f64::from(simd::l2_distance(a, b))
}

/// Angular distance $\arccos(\cos(a,b))$, in `[0, π]`.
///
/// A metric on the unit sphere, unlike cosine distance itself.
#[inline]
#[must_use]
pub fn angular_distance(a: &[f32], b: &[f32]) -> f64 {
    f64::from(simd::cosine(a, b).clamp(-1.0, 1.0)).acos()
}

/// L2 norm.
#[inline]
#[must_use]
pub fn l2_norm(v: &[f32]) -> f64 {
    f64::from(simd::norm(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_satisfies_triangle_inequality() {
        let a = [0.0_f32, 0.0];
        let b = [1.0_f32, 1.0];
        let c = [2.0_f32, 0.0];
        assert!(l2_distance(&a, &c) <= l2_distance(&a, &b) + l2_distance(&b, &c) + 1e-9);
    }

    #[test]
    fn angular_distance_is_zero_for_parallel() {
        let a = [1.0_f32, 0.0];
        let b = [2.0_f32, 0.0];
        assert!(angular_distance(&a, &b) < 1e-6);
    }

    #[test]
    fn angular_distance_of_opposite_is_pi() {
        let a = [1.0_f32, 0.0];
        let b = [-1.0_f32, 0.0];
        assert!((angular_distance(&a, &b) - std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn angular_satisfies_triangle_inequality_on_sphere() {
        let a = [1.0_f32, 0.0];
        let b = [0.707_f32, 0.707];
        let c = [0.0_f32, 1.0];
        assert!(angular_distance(&a, &c) <= angular_distance(&a, &b) + angular_distance(&b, &c) + 1e-6);
    }
}
