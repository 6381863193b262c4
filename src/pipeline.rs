//! Batch helpers sequencing normalization and embedding over many documents.
//!
//! A failed document never aborts its batch; it is logged and skipped. Documents are
//! processed one after another; callers wanting parallelism can split batches themselves since
//! the normalizer carries no cross-document state.

use crate::embedding::{EmbeddingClient, EmbeddingClientError, EmbeddingText};
use crate::matching::{EmbeddingIndex, IndexError};
use crate::metrics::PipelineMetrics;
use crate::normalization::{CanonicalRecord, Normalized, Normalizer};
use crate::records::{DocumentId, RawDocument};
use serde::Serialize;
use thiserror::Error;

/// Per-batch success and failure counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Documents that produced a canonical record.
    pub succeeded: usize,
    /// Ids of documents skipped after retry exhaustion.
    pub failed_ids: Vec<DocumentId>,
}

impl BatchReport {
    /// Number of skipped documents.
    pub fn failed(&self) -> usize {
        self.failed_ids.len()
    }
}

/// Canonical records produced by a batch along with its report.
#[derive(Debug, Clone)]
pub struct BatchOutcome<R> {
    /// Successfully normalized records in input order.
    pub records: Vec<(DocumentId, R)>,
    /// Success and failure counts.
    pub report: BatchReport,
}

/// Errors raised while embedding a batch of records.
#[derive(Debug, Error)]
pub enum EmbedBatchError {
    /// Embedding provider failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingClientError),
    /// Provider returned vectors that do not form a single embedding space.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Normalize every document in order, skipping the ones whose retries are exhausted.
pub async fn normalize_batch<R: CanonicalRecord>(
    normalizer: &Normalizer,
    documents: &[RawDocument],
    metrics: &PipelineMetrics,
) -> BatchOutcome<R> {
    let kind = R::KIND;
    let mut records = Vec::with_capacity(documents.len());
    let mut report = BatchReport::default();

    for document in documents {
        match normalizer.normalize::<R>(&document.text).await {
            Normalized::Record { record, attempts } => {
                metrics.record_success(attempts as u64);
                report.succeeded += 1;
                records.push((document.id, record));
            }
            Normalized::Exhausted {
                attempts,
                last_failure,
            } => {
                metrics.record_failure(attempts as u64);
                tracing::warn!(
                    %kind,
                    document_id = document.id,
                    attempts,
                    error = %last_failure,
                    "Skipping document"
                );
                report.failed_ids.push(document.id);
            }
        }
    }

    tracing::info!(
        %kind,
        succeeded = report.succeeded,
        failed = report.failed(),
        "Normalized batch"
    );

    BatchOutcome { records, report }
}

/// Render embedding text for each record, embed them in one call and index the vectors.
pub async fn embed_records<R: EmbeddingText>(
    client: &dyn EmbeddingClient,
    records: &[(DocumentId, R)],
) -> Result<EmbeddingIndex, EmbedBatchError> {
    if records.is_empty() {
        return Ok(EmbeddingIndex::default());
    }

    let texts: Vec<String> = records
        .iter()
        .map(|(_, record)| record.embedding_text())
        .collect();
    let vectors = client.generate_embeddings(texts).await?;
    if vectors.len() != records.len() {
        return Err(EmbeddingClientError::CountMismatch {
            expected: records.len(),
            actual: vectors.len(),
        }
        .into());
    }

    let index = EmbeddingIndex::from_entries(
        records
            .iter()
            .zip(vectors)
            .map(|((id, _), vector)| (*id, Some(vector))),
    )?;

    tracing::debug!(
        count = index.len(),
        dimension = ?index.dimension(),
        "Embedded batch"
    );

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbeddingClient;
    use crate::generation::{GenerationClientError, GenerationOptions, TextGenerator};
    use crate::records::{CanonicalJobRecord, CanonicalResumeRecord};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// Answers with a resume object unless the prompt mentions "broken".
    struct KeywordGenerator;

    #[async_trait]
    impl TextGenerator for KeywordGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, GenerationClientError> {
            if prompt.contains("broken") {
                Ok("no json here".into())
            } else {
                Ok("{\n  \"skills\": [\"Rust\"]".into())
            }
        }
    }

    fn documents() -> Vec<RawDocument> {
        vec![
            RawDocument {
                id: 1,
                text: "Rust developer".into(),
            },
            RawDocument {
                id: 2,
                text: "broken".into(),
            },
            RawDocument {
                id: 3,
                text: "Another Rust developer".into(),
            },
        ]
    }

    #[tokio::test]
    async fn failed_documents_do_not_stop_the_batch() {
        let normalizer = Normalizer::new(Arc::new(KeywordGenerator));
        let metrics = PipelineMetrics::new();

        let outcome =
            normalize_batch::<CanonicalResumeRecord>(&normalizer, &documents(), &metrics).await;

        let ids: Vec<DocumentId> = outcome.records.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(
            outcome.report,
            BatchReport {
                succeeded: 2,
                failed_ids: vec![2]
            }
        );
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_normalized, 2);
        assert_eq!(snapshot.documents_failed, 1);
        assert_eq!(snapshot.generation_attempts, 5);
    }

    #[tokio::test]
    async fn embed_records_indexes_every_record() {
        let records = vec![
            (4, CanonicalJobRecord::default()),
            (9, CanonicalJobRecord {
                job_title: "Data Engineer".into(),
                ..CanonicalJobRecord::default()
            }),
        ];

        let index = embed_records(&HashingEmbeddingClient::new(32), &records)
            .await
            .expect("index");

        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), Some(32));
        assert!(index.get(&4).is_some());
        assert!(index.get(&9).is_some());
    }

    #[tokio::test]
    async fn embed_records_skips_backend_for_empty_batch() {
        let records: Vec<(DocumentId, CanonicalJobRecord)> = Vec::new();
        let index = embed_records(&HashingEmbeddingClient::new(0), &records)
            .await
            .expect("empty index");
        assert!(index.is_empty());
    }
}
