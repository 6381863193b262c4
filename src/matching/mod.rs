//! Similarity scoring and deterministic top-k ranking between jobs and resumes.
//!
//! Every operation here is pure: scores are computed from the vectors passed in and nothing is
//! cached, so disjoint queries may run in parallel without coordination. Ranking orders by
//! descending score and breaks exact ties by ascending id.

mod index;
mod similarity;

pub use index::{EmbeddingIndex, IndexError};
pub use similarity::{SimilarityError, is_finite, magnitude, similarity};

use crate::records::MatchResult;
use std::collections::BTreeMap;

/// Score `query` against every vector in `collection`.
///
/// Fails when the collection's dimension differs from the query, and when the query itself
/// has zero magnitude or non-finite components.
pub fn score_against_collection<K: Ord + Clone>(
    query: &[f32],
    collection: &EmbeddingIndex<K>,
) -> Result<BTreeMap<K, f32>, SimilarityError> {
    match collection.dimension() {
        Some(dimension) if dimension != query.len() => {
            return Err(SimilarityError::DimensionMismatch {
                expected: query.len(),
                actual: dimension,
            });
        }
        _ => {}
    }

    collection
        .iter()
        .map(|(id, vector)| similarity(query, vector).map(|score| (id.clone(), score)))
        .collect()
}

/// Sort scores descending (ties by ascending id) and keep the first `k`.
///
/// `0.0` and `-0.0` count as equal. Scores from [`similarity`] are always finite.
pub fn rank_top_k<K: Ord>(scores: impl IntoIterator<Item = (K, f32)>, k: usize) -> Vec<(K, f32)> {
    let mut ranked: Vec<(K, f32)> = scores.into_iter().collect();
    // `+ 0.0` folds -0.0 into 0.0, which `total_cmp` would otherwise order below it.
    ranked.sort_by(|left, right| {
        (right.1 + 0.0)
            .total_cmp(&(left.1 + 0.0))
            .then_with(|| left.0.cmp(&right.0))
    });
    ranked.truncate(k);
    ranked
}

/// Rank resumes for one job.
pub fn match_job_to_resumes<K: Ord + Clone>(
    job_id: K,
    job_vector: &[f32],
    resumes: &EmbeddingIndex<K>,
    top_k: usize,
) -> Result<Vec<MatchResult<K>>, SimilarityError> {
    let scores = score_against_collection(job_vector, resumes)?;
    Ok(rank_top_k(scores, top_k)
        .into_iter()
        .map(|(resume_id, score)| MatchResult {
            job_id: job_id.clone(),
            resume_id,
            score,
        })
        .collect())
}

/// Rank jobs for one resume.
pub fn match_resume_to_jobs<K: Ord + Clone>(
    resume_id: K,
    resume_vector: &[f32],
    jobs: &EmbeddingIndex<K>,
    top_k: usize,
) -> Result<Vec<MatchResult<K>>, SimilarityError> {
    let scores = score_against_collection(resume_vector, jobs)?;
    Ok(rank_top_k(scores, top_k)
        .into_iter()
        .map(|(job_id, score)| MatchResult {
            job_id,
            resume_id: resume_id.clone(),
            score,
        })
        .collect())
}
