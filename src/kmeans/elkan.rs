//! Elkan-accelerated Lloyd iteration.
//!
//! Elkan (2003), "Using the Triangle Inequality to Accelerate k-Means".
//! The loop maintains, for every sample `j` and center `c`:
//!
//! - `lower[j, c] ≤ d(x_j, c)`, a per-pair lower bound,
//! - `upper[j] ≥ d(x_j, c(x_j))`, an upper bound to the assigned center,
//! - `halfcdist[a, b] = d(c_a, c_b) / 2` and `s[a] = min_{b≠a} halfcdist[a, b]`.
//!
//! Both bound invariants hold with equality right after seeding (the
//! k-means++ pass stores exact distances) and are preserved conservatively
//! when centers move: each lower bound shrinks by the movement of its
//! center, each upper bound grows by the movement of the assigned center.
//! A distance is only ever recomputed when the bounds fail to prove the
//! assignment unchanged, which on clustered data prunes the vast majority
//! of evaluations while leaving the Lloyd semantics exact.

use log::{debug, trace};

use crate::cancel::CancelToken;
use crate::distance::{DistanceFn, NormFn};
use crate::error::{Result, TrainError};
use crate::random::RandomSource;
use crate::vectors::VectorArray;

use super::{MAX_ITERATIONS, apply_norm, init};

/// One Elkan training invocation.
///
/// Owns every scratch allocation; all of it is sized and admitted against
/// the memory budget in [`new`](Self::new) before anything is allocated,
/// and released when the value drops, on every exit path.
#[derive(Debug)]
pub(crate) struct ElkanKmeans<'a> {
    samples: &'a VectorArray,
    centers: &'a mut VectorArray,
    distance: DistanceFn,
    norm: Option<NormFn>,
    cancel: &'a CancelToken,

    num_samples: usize,
    num_centers: usize,

    // Scratch. Bounds are f32 to halve the footprint of the two largest
    // arrays; distances are computed in f64 and narrowed on store.
    new_centers: VectorArray,
    counts: Vec<u32>,
    assignment: Vec<u32>,
    lower: Vec<f32>,
    upper: Vec<f32>,
    s: Vec<f32>,
    halfcdist: Vec<f32>,
    newcdist: Vec<f32>,
}

/// Total training footprint in bytes: both caller containers plus every
/// scratch array, mirroring what [`ElkanKmeans::new`] will allocate.
fn estimate_bytes(samples: &VectorArray, centers: &VectorArray) -> usize {
    let n = samples.len();
    let k = centers.maxlen();
    let dim = centers.dim();
    let f = std::mem::size_of::<f32>();
    let u = std::mem::size_of::<u32>();

    VectorArray::byte_size(samples.maxlen(), dim)
        + VectorArray::byte_size(k, dim)
        + VectorArray::byte_size(k, dim)
        + k * u
        + n * u
        + n * k * f
        + n * f
        + k * f
        + k * k * f
        + k * f
}

impl<'a> ElkanKmeans<'a> {
    /// Admit the configuration against `mem_budget` and allocate scratch.
    ///
    /// Fails with [`TrainError::BudgetExceeded`] before any allocation when
    /// the total footprint would not fit, and with
    /// [`TrainError::DimensionOverflow`] when `k²` would overflow the
    /// 32-bit signed arithmetic assumed by the bounds-matrix indexing.
    pub(crate) fn new(
        samples: &'a VectorArray,
        centers: &'a mut VectorArray,
        distance: DistanceFn,
        norm: Option<NormFn>,
        mem_budget: usize,
        cancel: &'a CancelToken,
    ) -> Result<Self> {
        let num_samples = samples.len();
        let num_centers = centers.maxlen();
        let dim = centers.dim();

        let total = estimate_bytes(samples, centers);
        if total > mem_budget {
            // Round the requirement up so the message never understates it
            return Err(TrainError::BudgetExceeded {
                required_mb: total / (1024 * 1024) + 1,
                budget_mb: mem_budget / (1024 * 1024),
            });
        }

        if (num_centers as u64) * (num_centers as u64) > i32::MAX as u64 {
            return Err(TrainError::DimensionOverflow);
        }

        debug!("estimated memory: {} MB", total / (1024 * 1024));

        Ok(Self {
            samples,
            centers,
            distance,
            norm,
            cancel,
            num_samples,
            num_centers,
            new_centers: VectorArray::zeroed(num_centers, dim),
            counts: vec![0; num_centers],
            assignment: vec![0; num_samples],
            lower: vec![0.0; num_samples * num_centers],
            upper: vec![0.0; num_samples],
            s: vec![0.0; num_centers],
            halfcdist: vec![0.0; num_centers * num_centers],
            newcdist: vec![0.0; num_centers],
        })
    }

    /// Pick initial centers with k-means++ and derive the initial
    /// assignment from the primed lower bounds, with no extra distance calls.
    pub(crate) fn seed(&mut self, rng: &mut dyn RandomSource) -> Result<()> {
        init::init_centers(
            self.samples,
            self.centers,
            &mut self.lower,
            self.distance,
            self.cancel,
            rng,
        )?;

        let k = self.num_centers;
        for j in 0..self.num_samples {
            let mut min_distance = f32::MAX;
            let mut closest = 0;

            for c in 0..k {
                let d = self.lower[j * k + c];
                if d < min_distance {
                    min_distance = d;
                    closest = c;
                }
            }

            self.upper[j] = min_distance;
            self.assignment[j] = closest as u32;
        }

        Ok(())
    }

    /// Run Lloyd passes until assignments stabilize, up to
    /// [`MAX_ITERATIONS`].
    pub(crate) fn run(&mut self, rng: &mut dyn RandomSource) -> Result<()> {
        for iteration in 0..MAX_ITERATIONS {
            // Can take a while, so stay interruptible
            if self.cancel.is_cancelled() {
                return Err(TrainError::Cancelled);
            }

            self.update_inter_center_bounds();

            // Iteration 0 is special: seeding left upper bounds exact, so
            // they are not stale and need no refresh before use.
            let changes = self.refine_assignments(iteration != 0);

            self.update_means(rng);
            self.widen_bounds();
            self.commit();

            trace!("iteration {iteration}: {changes} reassignments");

            if changes == 0 && iteration != 0 {
                debug!("converged after {} iterations", iteration + 1);
                break;
            }
        }

        Ok(())
    }

    /// Step 1: half inter-center distances and each center's nearest-other
    /// distance `s`.
    fn update_inter_center_bounds(&mut self) {
        let k = self.num_centers;

        for a in 0..k {
            for b in (a + 1)..k {
                let d = (0.5 * (self.distance)(self.centers.get(a), self.centers.get(b))) as f32;
                self.halfcdist[a * k + b] = d;
                self.halfcdist[b * k + a] = d;
            }
        }

        for a in 0..k {
            let mut min_distance = f32::MAX;
            for b in 0..k {
                if a == b {
                    continue;
                }
                let d = self.halfcdist[a * k + b];
                if d < min_distance {
                    min_distance = d;
                }
            }
            self.s[a] = min_distance;
        }
    }

    /// Steps 2–3: reassign samples whose bounds cannot prove the current
    /// assignment optimal. Returns the number of reassignments.
    ///
    /// `stale_upper` marks the per-sample upper bound as needing one exact
    /// refresh before it is trusted (true on every pass but the first).
    /// Ties break toward the lowest-indexed center: only a strictly smaller
    /// distance reassigns.
    fn refine_assignments(&mut self, stale_upper: bool) -> usize {
        let k = self.num_centers;
        let mut changes = 0;

        for j in 0..self.num_samples {
            // Step 2: u(x) <= s(c(x)) proves no other center can be closer
            if self.upper[j] <= self.s[self.assignment[j] as usize] {
                continue;
            }

            let mut stale = stale_upper;

            for c in 0..k {
                let a = self.assignment[j] as usize;

                // Step 3 pruning conditions
                if c == a {
                    continue;
                }
                if self.upper[j] <= self.lower[j * k + c] {
                    continue;
                }
                if self.upper[j] <= self.halfcdist[a * k + c] {
                    continue;
                }

                let x = self.samples.get(j);

                // Step 3a: refresh the stale upper bound exactly once
                let dxcx = if stale {
                    let d = (self.distance)(x, self.centers.get(a)) as f32;

                    // d(x, c(x)) is also a valid lower bound for c(x)
                    self.lower[j * k + a] = d;
                    self.upper[j] = d;

                    stale = false;
                    d
                } else {
                    self.upper[j]
                };

                // Step 3b: the bounds were inconclusive, compute d(x, c)
                if dxcx > self.lower[j * k + c] || dxcx > self.halfcdist[a * k + c] {
                    let dxc = (self.distance)(x, self.centers.get(c)) as f32;

                    self.lower[j * k + c] = dxc;

                    if dxc < dxcx {
                        self.assignment[j] = c as u32;
                        self.upper[j] = dxc;
                        changes += 1;
                    }
                }
            }
        }

        changes
    }

    /// Step 4: recompute each center as the mean of its assigned samples.
    ///
    /// Accumulation happens in the vectors' native f32; coordinates that
    /// saturate to infinity are clamped to `±f32::MAX` before dividing.
    /// Empty clusters are reinitialized with uniform-random coordinates in
    /// `[0, 1)`. When a norm is configured the result is scaled to unit
    /// length (zero-norm vectors stay as they are).
    fn update_means(&mut self, rng: &mut dyn RandomSource) {
        let k = self.num_centers;

        for a in 0..k {
            self.new_centers.get_mut(a).fill(0.0);
            self.counts[a] = 0;
        }

        for j in 0..self.num_samples {
            let a = self.assignment[j] as usize;
            let x = self.samples.get(j);

            let sum = self.new_centers.get_mut(a);
            for (acc, &v) in sum.iter_mut().zip(x.iter()) {
                *acc += v;
            }
            self.counts[a] += 1;
        }

        for a in 0..k {
            let count = self.counts[a];
            let vec = self.new_centers.get_mut(a);

            if count > 0 {
                for x in vec.iter_mut() {
                    if x.is_infinite() {
                        *x = if *x > 0.0 { f32::MAX } else { f32::MIN };
                    }
                }

                for x in vec.iter_mut() {
                    *x /= count as f32;
                }
            } else {
                for x in vec.iter_mut() {
                    *x = rng.uniform_double() as f32;
                }
            }

            if let Some(norm) = self.norm {
                apply_norm(norm, vec);
            }
        }
    }

    /// Steps 5–6: widen every bound by how far its center is about to move.
    fn widen_bounds(&mut self) {
        let k = self.num_centers;

        for a in 0..k {
            self.newcdist[a] =
                (self.distance)(self.centers.get(a), self.new_centers.get(a)) as f32;
        }

        for j in 0..self.num_samples {
            for c in 0..k {
                let d = self.lower[j * k + c] - self.newcdist[c];
                self.lower[j * k + c] = if d < 0.0 { 0.0 } else { d };
            }
        }

        // Upper bounds grow stale here; the next pass refreshes them
        for j in 0..self.num_samples {
            self.upper[j] += self.newcdist[self.assignment[j] as usize];
        }
    }

    /// Step 7: move the new means into the live centers.
    fn commit(&mut self) {
        for a in 0..self.num_centers {
            self.centers.set(a, self.new_centers.get(a));
        }
    }
}
