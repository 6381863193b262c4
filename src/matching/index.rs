//! Id-to-vector collections handed to the ranking engine.

use super::similarity::{is_finite, magnitude};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while assembling an [`EmbeddingIndex`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IndexError {
    /// An entry disagrees with the dimensionality of the entries before it.
    #[error("Embedding for id {id} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        /// Offending entry id, rendered for diagnostics.
        id: String,
        /// Dimension established by the first entry.
        expected: usize,
        /// Dimension of the offending entry.
        actual: usize,
    },
}

/// Vectors of a single embedding space keyed by document id.
///
/// Entries without a vector, or whose vector is empty, zero-magnitude or non-finite, are dropped
/// while building, so every stored vector is comparable.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingIndex<K: Ord = crate::records::DocumentId> {
    vectors: BTreeMap<K, Vec<f32>>,
    dimension: Option<usize>,
}

impl<K: Ord> Default for EmbeddingIndex<K> {
    fn default() -> Self {
        Self {
            vectors: BTreeMap::new(),
            dimension: None,
        }
    }
}

impl<K: Ord + Clone + std::fmt::Display> EmbeddingIndex<K> {
    /// Build an index from `(id, vector)` entries, skipping missing vectors.
    pub fn from_entries<I>(entries: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = (K, Option<Vec<f32>>)>,
    {
        let mut index = Self::default();
        for (id, vector) in entries {
            match vector {
                Some(vector) => {
                    index.insert(id, vector)?;
                }
                None => tracing::warn!(%id, "Skipping entry without an embedding"),
            }
        }
        Ok(index)
    }

    /// Insert one vector. Returns `false` when the vector was skipped as empty, zero or non-finite.
    pub fn insert(&mut self, id: K, vector: Vec<f32>) -> Result<bool, IndexError> {
        if vector.is_empty() || magnitude(&vector) == 0.0 {
            tracing::warn!(%id, "Skipping empty or zero-magnitude embedding");
            return Ok(false);
        }
        if !is_finite(&vector) {
            tracing::warn!(%id, "Skipping embedding with non-finite components");
            return Ok(false);
        }

        match self.dimension {
            Some(expected) if expected != vector.len() => {
                return Err(IndexError::DimensionMismatch {
                    id: id.to_string(),
                    expected,
                    actual: vector.len(),
                });
            }
            Some(_) => {}
            None => self.dimension = Some(vector.len()),
        }

        self.vectors.insert(id, vector);
        Ok(true)
    }
}

impl<K: Ord> EmbeddingIndex<K> {
    /// Dimensionality shared by every vector, `None` while empty.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector stored for `id`.
    pub fn get(&self, id: &K) -> Option<&[f32]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    /// Iterate over entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[f32])> {
        self.vectors
            .iter()
            .map(|(id, vector)| (id, vector.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_missing_empty_and_zero_vectors() {
        let index = EmbeddingIndex::from_entries(vec![
            (1_u64, Some(vec![1.0, 0.0])),
            (2, None),
            (3, Some(Vec::new())),
            (4, Some(vec![0.0, 0.0])),
            (5, Some(vec![0.0, 2.0])),
        ])
        .expect("index");

        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), Some(2));
        assert!(index.get(&2).is_none());
        assert_eq!(index.get(&5), Some(&[0.0, 2.0][..]));
    }

    #[test]
    fn keeps_tiny_vectors_and_drops_non_finite_ones() {
        let mut index = EmbeddingIndex::default();

        assert_eq!(index.insert(1_u64, vec![1e-30, 0.0]), Ok(true));
        assert_eq!(index.insert(2, vec![f32::NAN, 1.0]), Ok(false));
        assert_eq!(index.insert(3, vec![f32::INFINITY, 1.0]), Ok(false));
        assert_eq!(index.len(), 1);
        assert!(index.get(&1).is_some());
    }

    #[test]
    fn rejects_mixed_dimensions() {
        let error = EmbeddingIndex::from_entries(vec![
            (1_u64, Some(vec![1.0, 0.0])),
            (2, Some(vec![1.0, 0.0, 0.0])),
        ])
        .expect_err("mixed dimensions");

        assert_eq!(
            error,
            IndexError::DimensionMismatch {
                id: "2".into(),
                expected: 2,
                actual: 3
            }
        );
    }
}
