//! k-means++ seeding with lower-bound priming.
//!
//! Arthur & Vassilvitskii (2007): draw each new center with probability
//! proportional to the squared distance from the nearest already-chosen
//! center. The distance work is not thrown away: every computed distance
//! lands in the lower-bound matrix, so the Elkan loop starts with tight
//! bounds and an exact initial assignment without a single extra distance
//! call.

use crate::cancel::CancelToken;
use crate::distance::DistanceFn;
use crate::error::{Result, TrainError};
use crate::random::RandomSource;
use crate::vectors::VectorArray;

/// Seed `centers` with k-means++ and fill `lower` with exact distances.
///
/// `lower` is the row-major `numSamples × numCenters` bounds matrix. On
/// exit `lower[j * k + i]` equals the true distance from sample `j` to
/// center `i` at the moment center `i` was chosen, for every `(j, i)`,
/// including the last column, which is populated by a final pass that
/// selects nothing.
///
/// When all samples coincide the selection weights collapse to zero and the
/// walk below always picks sample 0; the resulting duplicate centers are
/// separated later by empty-cluster reseeding, or failing that rejected by
/// center validation.
pub(crate) fn init_centers(
    samples: &VectorArray,
    centers: &mut VectorArray,
    lower: &mut [f32],
    distance: DistanceFn,
    cancel: &CancelToken,
    rng: &mut dyn RandomSource,
) -> Result<()> {
    let num_centers = centers.maxlen();
    let num_samples = samples.len();
    let mut weight = vec![f32::MAX; num_samples];

    // Choose an initial center uniformly at random
    centers.push(samples.get(rng.uniform_int(num_samples)));

    for i in 0..num_centers {
        if cancel.is_cancelled() {
            return Err(TrainError::Cancelled);
        }

        let mut sum = 0.0f64;

        for j in 0..num_samples {
            // Only need to compute distance for the newest center
            let d = distance(samples.get(j), centers.get(i));

            lower[j * num_centers + i] = d as f32;

            // Distance squared gives the weighted probability distribution
            let dd = d * d;
            if dd < f64::from(weight[j]) {
                weight[j] = dd as f32;
            }

            sum += f64::from(weight[j]);
        }

        // The final pass exists only to populate the last column of lower
        if i + 1 == num_centers {
            break;
        }

        // Choose the next center by walking the cumulative weights
        let mut choice = sum * rng.uniform_double();
        let mut next = num_samples - 1;
        for j in 0..num_samples - 1 {
            choice -= f64::from(weight[j]);
            if choice <= 0.0 {
                next = j;
                break;
            }
        }

        centers.push(samples.get(next));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::l2_distance;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sample_grid(n: usize, dim: usize) -> VectorArray {
        let mut samples = VectorArray::new(n, dim);
        for i in 0..n {
            let v: Vec<f32> = (0..dim).map(|d| ((i * 7 + d * 3) % 13) as f32).collect();
            samples.push(&v);
        }
        samples
    }

    #[test]
    fn seeds_k_centers_from_samples() {
        let samples = sample_grid(40, 4);
        let mut centers = VectorArray::new(5, 4);
        let mut lower = vec![0.0f32; 40 * 5];
        let mut rng = StdRng::seed_from_u64(11);

        init_centers(
            &samples,
            &mut centers,
            &mut lower,
            l2_distance,
            &CancelToken::new(),
            &mut rng,
        )
        .unwrap();

        assert_eq!(centers.len(), 5);
        for c in centers.iter() {
            assert!(samples.iter().any(|s| s == c));
        }
    }

    #[test]
    fn lower_bounds_are_exact_distances_at_seeding() {
        let samples = sample_grid(30, 3);
        let k = 4;
        let mut centers = VectorArray::new(k, 3);
        let mut lower = vec![0.0f32; 30 * k];
        let mut rng = StdRng::seed_from_u64(23);

        init_centers(
            &samples,
            &mut centers,
            &mut lower,
            l2_distance,
            &CancelToken::new(),
            &mut rng,
        )
        .unwrap();

        // Centers never move during seeding, so every column must hold the
        // true distance, the last one included.
        for j in 0..30 {
            for i in 0..k {
                let expected = l2_distance(samples.get(j), centers.get(i)) as f32;
                assert_eq!(lower[j * k + i], expected);
            }
        }
    }

    #[test]
    fn identical_samples_degenerate_to_sample_zero() {
        let mut samples = VectorArray::new(6, 2);
        for _ in 0..6 {
            samples.push(&[2.0, 2.0]);
        }
        let k = 3;
        let mut centers = VectorArray::new(k, 2);
        let mut lower = vec![0.0f32; 6 * k];
        let mut rng = StdRng::seed_from_u64(5);

        init_centers(
            &samples,
            &mut centers,
            &mut lower,
            l2_distance,
            &CancelToken::new(),
            &mut rng,
        )
        .unwrap();

        // Duplicate centers are expected here; later stages deal with them.
        assert_eq!(centers.len(), k);
        for c in centers.iter() {
            assert_eq!(c, &[2.0, 2.0]);
        }
    }

    #[test]
    fn cancelled_token_aborts_seeding() {
        let samples = sample_grid(20, 2);
        let mut centers = VectorArray::new(4, 2);
        let mut lower = vec![0.0f32; 20 * 4];
        let mut rng = StdRng::seed_from_u64(9);
        let token = CancelToken::new();
        token.cancel();

        let err = init_centers(
            &samples,
            &mut centers,
            &mut lower,
            l2_distance,
            &token,
            &mut rng,
        )
        .unwrap_err();
        assert_eq!(err, TrainError::Cancelled);
    }
}
