//! kentro: centroid training for IVF coarse quantizers.
//!
//! Given a set of sample vectors, produce `k` centroids suitable for use as
//! the cluster centers of an inverted-file (IVF) index. Training is exact
//! Lloyd k-means, seeded with k-means++ and accelerated with Elkan's
//! triangle-inequality pruning.
//!
//! # Why Elkan?
//!
//! Naive Lloyd recomputes every point-to-center distance on every pass:
//! O(n · k) distance calls per iteration. Elkan (2003) keeps per-point upper
//! bounds and per-(point, center) lower bounds, plus half the inter-center
//! distances, and uses the triangle inequality to skip evaluations that
//! cannot change an assignment:
//!
//! ```text
//! d(c, c') ≥ 2·d(x, c)   ⟹   d(x, c') ≥ d(x, c)
//! ```
//!
//! On well-clustered data the vast majority of distance calls are pruned
//! while the result stays **identical** to naive Lloyd; the pruning is not
//! an approximation.
//!
//! | Situation | Path |
//! |-----------|------|
//! | `samples ≤ k` | Degenerate quick path: dedup samples, pad with random unit vectors |
//! | `samples > k` | k-means++ seeding → Elkan iteration (≤ 500 passes) |
//!
//! # Metrics
//!
//! The distance function must satisfy the triangle inequality. Use true L2
//! (not squared) for Euclidean training, and angular distance for
//! cosine/inner-product training with a configured norm (spherical k-means).
//! [`DistanceKind`] wires up both presets.
//!
//! # Usage
//!
//! ```rust
//! use kentro::{DistanceKind, Trainer, VectorArray};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut samples = VectorArray::new(1000, 8);
//! for i in 0..1000 {
//!     let v: Vec<f32> = (0..8).map(|d| ((i + d) as f32 * 0.37).sin()).collect();
//!     samples.push(&v);
//! }
//!
//! let mut centers = VectorArray::new(16, 8);
//! let mut rng = StdRng::seed_from_u64(42);
//!
//! Trainer::for_metric(DistanceKind::L2)
//!     .train(&samples, &mut centers, &mut rng)
//!     .expect("training failed");
//!
//! assert_eq!(centers.len(), 16);
//! ```
//!
//! # Guarantees
//!
//! On success, `centers` holds exactly `k` vectors with no NaN, no infinity,
//! and no two centers byte-equal. With a fixed RNG seed and identical inputs
//! the output is bit-identical across runs. All scratch memory is sized up
//! front against a configurable budget and released on every exit path.
//!
//! # Non-goals
//!
//! Streaming/online k-means, mini-batch variants, GPU offload, and vector
//! element types other than dense `f32` are out of scope.

pub mod cancel;
pub mod distance;
pub mod error;
pub mod kmeans;
pub mod random;
pub mod simd;
pub mod vectors;

// Re-exports
pub use cancel::CancelToken;
pub use distance::{DistanceFn, DistanceKind, NormFn};
pub use error::{Result, TrainError, Violation};
pub use kmeans::Trainer;
pub use random::RandomSource;
pub use vectors::VectorArray;
