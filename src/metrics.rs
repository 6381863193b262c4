use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing normalization activity.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_normalized: AtomicU64,
    documents_failed: AtomicU64,
    generation_attempts: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document that produced a canonical record after `attempts` backend calls.
    pub fn record_success(&self, attempts: u64) {
        self.documents_normalized.fetch_add(1, Ordering::Relaxed);
        self.generation_attempts
            .fetch_add(attempts, Ordering::Relaxed);
    }

    /// Record a document skipped after exhausting `attempts` backend calls.
    pub fn record_failure(&self, attempts: u64) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
        self.generation_attempts
            .fetch_add(attempts, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_normalized: self.documents_normalized.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            generation_attempts: self.generation_attempts.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of normalization counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents that produced a canonical record.
    pub documents_normalized: u64,
    /// Documents skipped after retry exhaustion.
    pub documents_failed: u64,
    /// Total text-generation calls spent across all documents.
    pub generation_attempts: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_successes_failures_and_attempts() {
        let metrics = PipelineMetrics::new();
        metrics.record_success(1);
        metrics.record_success(2);
        metrics.record_failure(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_normalized, 2);
        assert_eq!(snapshot.documents_failed, 1);
        assert_eq!(snapshot.generation_attempts, 6);
    }

    #[test]
    fn snapshot_starts_empty() {
        let metrics = PipelineMetrics::new();
        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                documents_normalized: 0,
                documents_failed: 0,
                generation_attempts: 0,
            }
        );
    }
}
