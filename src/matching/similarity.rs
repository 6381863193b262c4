//! Cosine similarity between embedding vectors.

use thiserror::Error;

/// Errors raised when two vectors cannot be compared.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SimilarityError {
    /// Vectors come from different embedding spaces.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the query vector.
        expected: usize,
        /// Dimension of the compared vector.
        actual: usize,
    },
    /// At least one vector has zero magnitude, so the angle is undefined.
    #[error("Cosine similarity is undefined for a zero-magnitude vector")]
    ZeroMagnitude,
    /// A component is NaN or infinite.
    #[error("Cosine similarity is undefined for a vector with non-finite components")]
    NonFinite,
}

/// Cosine similarity of `a` and `b`: their dot product over the product of their magnitudes.
///
/// Sums are accumulated in `f64`, so components near the `f32` limits neither overflow nor
/// vanish. The result lies in `[-1, 1]` and is never `-0.0`.
pub fn similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if !is_finite(a) || !is_finite(b) {
        return Err(SimilarityError::NonFinite);
    }

    let norm_a = magnitude(a);
    let norm_b = magnitude(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::ZeroMagnitude);
    }

    let dot = a
        .iter()
        .zip(b)
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum::<f64>();
    let cosine = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0) as f32;
    // Orthogonal vectors can yield -0.0; fold it into 0.0 so equal scores compare equal.
    Ok(cosine + 0.0)
}

/// Euclidean norm of `vector`, accumulated in `f64`.
pub fn magnitude(vector: &[f32]) -> f64 {
    vector
        .iter()
        .map(|value| f64::from(*value).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Whether every component is finite.
pub fn is_finite(vector: &[f32]) -> bool {
    vector.iter().all(|value| value.is_finite())
}
