//! Degenerate-case center selection for tiny sample sets.

use crate::distance::NormFn;
use crate::error::Result;
use crate::random::RandomSource;
use crate::vectors::{VectorArray, bytes_equal, compare_vectors};

use super::apply_norm;

/// Build `centers.maxlen()` centers from at most that many samples.
///
/// Prefers real data: the distinct samples, in sorted order, become centers
/// verbatim. The remainder is filled with synthetic vectors whose
/// coordinates are uniform in `[0, 1)`, normalized when a k-means norm is
/// configured so they can serve a spherical index. Zero-norm synthetics are
/// left unnormalized.
///
/// The sample container is read-only, so ordering happens through a sorted
/// index permutation rather than in place.
pub(crate) fn quick_centers(
    samples: &VectorArray,
    centers: &mut VectorArray,
    norm: Option<NormFn>,
    rng: &mut dyn RandomSource,
) -> Result<()> {
    let dim = centers.dim();

    // Copy existing vectors while avoiding duplicates
    if !samples.is_empty() {
        let mut order: Vec<usize> = (0..samples.len()).collect();
        order.sort_unstable_by(|&a, &b| compare_vectors(samples.get(a), samples.get(b)));

        for (pos, &i) in order.iter().enumerate() {
            let vec = samples.get(i);
            if pos == 0 || !bytes_equal(vec, samples.get(order[pos - 1])) {
                centers.push(vec);
            }
        }
    }

    // Fill remaining with random data
    let mut synthetic = vec![0.0f32; dim];
    while centers.len() < centers.maxlen() {
        for x in synthetic.iter_mut() {
            *x = rng.uniform_double() as f32;
        }

        // Only random centers need normalizing; real samples stay verbatim
        if let Some(norm) = norm {
            apply_norm(norm, &mut synthetic);
        }

        centers.push(&synthetic);
    }

    Ok(())
}
