//! Fixed-capacity containers of same-dimension dense vectors.

use std::cmp::Ordering;

/// A length-tracking container of `f32` vectors with fixed dimension and
/// capacity.
///
/// Storage is a single contiguous buffer of `maxlen * dim` floats; slot `i`
/// occupies `items[i*dim .. (i+1)*dim]`. The full buffer is allocated at
/// construction and capacity never changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorArray {
    dim: usize,
    length: usize,
    maxlen: usize,
    items: Vec<f32>,
}

impl VectorArray {
    /// Create an empty array with capacity for `maxlen` vectors of
    /// dimension `dim`.
    #[must_use]
    pub fn new(maxlen: usize, dim: usize) -> Self {
        Self {
            dim,
            length: 0,
            maxlen,
            items: vec![0.0; maxlen * dim],
        }
    }

    /// Create a full array of `maxlen` zero vectors (`length == maxlen`).
    #[must_use]
    pub fn zeroed(maxlen: usize, dim: usize) -> Self {
        Self {
            length: maxlen,
            ..Self::new(maxlen, dim)
        }
    }

    /// Vector dimension.
    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of vectors currently stored.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether no vectors are stored.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Capacity in vectors.
    #[inline]
    #[must_use]
    pub fn maxlen(&self) -> usize {
        self.maxlen
    }

    /// Size of one vector slot in bytes.
    #[inline]
    #[must_use]
    pub fn itemsize(&self) -> usize {
        self.dim * std::mem::size_of::<f32>()
    }

    /// Total byte footprint of an array with the given shape, for memory
    /// accounting.
    #[must_use]
    pub fn byte_size(maxlen: usize, dim: usize) -> usize {
        std::mem::size_of::<Self>() + maxlen * dim * std::mem::size_of::<f32>()
    }

    /// Borrow vector `i`. Callers keep `i < len()`.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize) -> &[f32] {
        debug_assert!(i < self.length);
        &self.items[i * self.dim..(i + 1) * self.dim]
    }

    /// Mutably borrow vector `i`. Callers keep `i < len()`.
    #[inline]
    pub fn get_mut(&mut self, i: usize) -> &mut [f32] {
        debug_assert!(i < self.length);
        &mut self.items[i * self.dim..(i + 1) * self.dim]
    }

    /// Overwrite vector `i` in place. Panics on dimension mismatch.
    #[inline]
    pub fn set(&mut self, i: usize, v: &[f32]) {
        self.get_mut(i).copy_from_slice(v);
    }

    /// Append a vector. Panics if the array is full or the dimension
    /// mismatches.
    pub fn push(&mut self, v: &[f32]) {
        assert!(self.length < self.maxlen, "VectorArray is full");
        let i = self.length;
        self.items[i * self.dim..(i + 1) * self.dim].copy_from_slice(v);
        self.length += 1;
    }

    /// Iterate over the stored vectors.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.items[..self.length * self.dim].chunks_exact(self.dim)
    }

    /// Sort the stored vectors in place by the total lexicographic order.
    pub fn sort(&mut self) {
        let mut sorted: Vec<Vec<f32>> = self.iter().map(<[f32]>::to_vec).collect();
        sorted.sort_unstable_by(|a, b| compare_vectors(a, b));
        for (i, v) in sorted.iter().enumerate() {
            self.items[i * self.dim..(i + 1) * self.dim].copy_from_slice(v);
        }
    }
}

/// Total lexicographic order on vectors, coordinate by coordinate.
///
/// Uses `total_cmp` so NaN payloads still order deterministically.
#[must_use]
pub fn compare_vectors(a: &[f32], b: &[f32]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Bitwise (byte) equality of two vectors.
///
/// Distinct from `==` on floats: `-0.0` and `0.0` compare unequal here, and
/// equal NaN payloads compare equal. This is the notion of "duplicate" that
/// matters for an index whose pages store raw vector bytes.
#[must_use]
pub fn bytes_equal(a: &[f32], b: &[f32]) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get_round_trip() {
        let mut arr = VectorArray::new(3, 2);
        arr.push(&[1.0, 2.0]);
        arr.push(&[3.0, 4.0]);
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.get(0), &[1.0, 2.0]);
        assert_eq!(arr.get(1), &[3.0, 4.0]);
    }

    #[test]
    #[should_panic(expected = "full")]
    fn push_past_capacity_panics() {
        let mut arr = VectorArray::new(1, 2);
        arr.push(&[1.0, 2.0]);
        arr.push(&[3.0, 4.0]);
    }

    #[test]
    fn sort_orders_lexicographically() {
        let mut arr = VectorArray::new(3, 2);
        arr.push(&[1.0, 0.0]);
        arr.push(&[0.0, 1.0]);
        arr.push(&[0.0, 0.0]);
        arr.sort();
        assert_eq!(arr.get(0), &[0.0, 0.0]);
        assert_eq!(arr.get(1), &[0.0, 1.0]);
        assert_eq!(arr.get(2), &[1.0, 0.0]);
    }

    #[test]
    fn bytes_equal_distinguishes_signed_zero() {
        assert!(bytes_equal(&[0.0, 1.0], &[0.0, 1.0]));
        assert!(!bytes_equal(&[0.0], &[-0.0]));
    }

    #[test]
    fn compare_vectors_orders_by_first_difference() {
        assert_eq!(compare_vectors(&[1.0, 9.0], &[2.0, 0.0]), Ordering::Less);
        assert_eq!(compare_vectors(&[1.0, 1.0], &[1.0, 1.0]), Ordering::Equal);
        assert_eq!(compare_vectors(&[1.0, 2.0], &[1.0, 1.0]), Ordering::Greater);
    }
}
