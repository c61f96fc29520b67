//! Post-condition validation of finished centers.

use crate::distance::NormFn;
use crate::error::{Result, TrainError, Violation};
use crate::vectors::{VectorArray, bytes_equal};

/// Validate the trained centers, failing with
/// [`TrainError::PostconditionViolated`] on the first issue found.
///
/// Checks, in order: the requested number of centers was produced; no
/// coordinate is NaN or infinite; no two centers are byte-identical; and,
/// when an index-level norm is configured, no center has zero norm.
///
/// Sorts `centers` in place for the duplicate scan, so the output order of
/// training is the sorted order.
pub(crate) fn check_centers(centers: &mut VectorArray, index_norm: Option<NormFn>) -> Result<()> {
    if centers.len() != centers.maxlen() {
        return Err(TrainError::PostconditionViolated(Violation::NotEnoughCenters));
    }

    for vec in centers.iter() {
        for &x in vec {
            if x.is_nan() {
                return Err(TrainError::PostconditionViolated(Violation::Nan));
            }
            if x.is_infinite() {
                return Err(TrainError::PostconditionViolated(Violation::Infinite));
            }
        }
    }

    // Adjacent duplicates after sorting catch all duplicate pairs
    centers.sort();
    for i in 1..centers.len() {
        if bytes_equal(centers.get(i), centers.get(i - 1)) {
            return Err(TrainError::PostconditionViolated(Violation::Duplicate));
        }
    }

    // A zero vector is unusable by a cosine index even though training
    // itself tolerates it
    if let Some(norm) = index_norm {
        for vec in centers.iter() {
            if norm(vec) == 0.0 {
                return Err(TrainError::PostconditionViolated(Violation::ZeroNorm));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::l2_norm;

    fn centers_of(rows: &[&[f32]]) -> VectorArray {
        let mut arr = VectorArray::new(rows.len(), rows[0].len());
        for row in rows {
            arr.push(row);
        }
        arr
    }

    #[test]
    fn valid_centers_pass() {
        let mut centers = centers_of(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 1.0]]);
        check_centers(&mut centers, Some(l2_norm)).unwrap();
    }

    #[test]
    fn short_center_list_is_rejected() {
        let mut centers = VectorArray::new(3, 2);
        centers.push(&[1.0, 0.0]);
        let err = check_centers(&mut centers, None).unwrap_err();
        assert_eq!(
            err,
            TrainError::PostconditionViolated(Violation::NotEnoughCenters)
        );
    }

    #[test]
    fn nan_is_rejected() {
        let mut centers = centers_of(&[&[1.0, f32::NAN]]);
        let err = check_centers(&mut centers, None).unwrap_err();
        assert_eq!(err, TrainError::PostconditionViolated(Violation::Nan));
    }

    #[test]
    fn infinity_is_rejected() {
        let mut centers = centers_of(&[&[f32::INFINITY, 0.0]]);
        let err = check_centers(&mut centers, None).unwrap_err();
        assert_eq!(err, TrainError::PostconditionViolated(Violation::Infinite));
    }

    #[test]
    fn nonadjacent_duplicates_are_found() {
        let mut centers = centers_of(&[&[1.0, 0.0], &[0.0, 1.0], &[1.0, 0.0]]);
        let err = check_centers(&mut centers, None).unwrap_err();
        assert_eq!(err, TrainError::PostconditionViolated(Violation::Duplicate));
    }

    #[test]
    fn zero_norm_is_rejected_only_with_index_norm() {
        let mut centers = centers_of(&[&[0.0, 0.0], &[1.0, 0.0]]);
        check_centers(&mut centers, None).unwrap();

        let mut centers = centers_of(&[&[0.0, 0.0], &[1.0, 0.0]]);
        let err = check_centers(&mut centers, Some(l2_norm)).unwrap_err();
        assert_eq!(err, TrainError::PostconditionViolated(Violation::ZeroNorm));
    }
}
