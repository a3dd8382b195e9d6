//! Vector Normalization
//!
//! Euclidean norm and in-place L2 normalization.

/// Compute the Euclidean (L2) norm of a vector
///
/// Accumulates in `f64` so long vectors with large components do not lose
/// precision before the square root.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter()
        .map(|&x| {
            let x = x as f64;
            x * x
        })
        .sum::<f64>()
        .sqrt() as f32
}

/// Scale a vector to unit length in place, returning its original norm.
///
/// A zero (or non-finite) norm leaves the vector untouched.
pub fn l2_normalize(v: &mut [f32]) -> f32 {
    let norm = l2_norm(v);
    if norm > 0.0 && norm.is_finite() {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    norm
}
