//! Normalization of free-text resumes and job descriptions into canonical records.
//!
//! Each document goes through the same loop: build the extraction prompt, call the
//! text-generation backend, recover a JSON object from the raw output and coerce it into the
//! record schema. Parse failures are retried sequentially up to a fixed bound; exhausting the
//! bound yields [`Normalized::Exhausted`] rather than an error so batch callers can skip the
//! document and move on.

pub mod coerce;
pub mod prompts;
pub mod recovery;

use crate::generation::{GenerationClientError, GenerationOptions, TextGenerator};
use crate::records::{
    CanonicalJobRecord, CanonicalResumeRecord, DocumentKind, MAX_EDUCATION, MAX_EXPERIENCE,
    MAX_INDUSTRIES, MAX_SKILLS, NOT_SPECIFIED,
};
use coerce::{FragmentKind, coerce_field, scalar_text};
use recovery::{RecoveryError, recover_object};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Total attempts per document, the first call included.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
/// Output-length bound applied to extraction calls.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 512;

/// Why a single normalization attempt produced no record.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    /// The backend call itself failed.
    #[error(transparent)]
    Backend(#[from] GenerationClientError),
    /// The backend answered but no JSON object could be recovered.
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
}

/// Outcome of normalizing one document.
#[derive(Debug)]
pub enum Normalized<R> {
    /// A canonical record was produced.
    Record {
        /// The coerced record.
        record: R,
        /// Attempts spent, including the successful one.
        attempts: usize,
    },
    /// Every attempt failed; the document should be skipped.
    Exhausted {
        /// Attempts spent (the configured bound).
        attempts: usize,
        /// Failure observed on the final attempt.
        last_failure: AttemptFailure,
    },
}

impl<R> Normalized<R> {
    /// Number of backend invocations spent on the document.
    pub fn attempts(&self) -> usize {
        match self {
            Self::Record { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// Discard diagnostics and keep only the record, if any.
    pub fn into_record(self) -> Option<R> {
        match self {
            Self::Record { record, .. } => Some(record),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Record types the normalizer can produce.
pub trait CanonicalRecord: Sized {
    /// Document kind handled by this record type.
    const KIND: DocumentKind;

    /// Build the extraction prompt for the cleaned document text.
    fn build_prompt(text: &str) -> String;

    /// Coerce a recovered JSON object into the record schema. Never fails.
    fn from_object(object: &Map<String, Value>) -> Self;
}

impl CanonicalRecord for CanonicalResumeRecord {
    const KIND: DocumentKind = DocumentKind::Resume;

    fn build_prompt(text: &str) -> String {
        prompts::build_resume_prompt(text)
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            skills: list_field(object, "skills", FragmentKind::Plain, Some(MAX_SKILLS)),
            experience: list_field(
                object,
                "experience",
                FragmentKind::Experience,
                Some(MAX_EXPERIENCE),
            ),
            education: list_field(
                object,
                "education",
                FragmentKind::Education,
                Some(MAX_EDUCATION),
            ),
            certifications: list_field(object, "certifications", FragmentKind::Plain, None),
            industries: list_field(object, "industries", FragmentKind::Plain, Some(MAX_INDUSTRIES)),
        }
    }
}

impl CanonicalRecord for CanonicalJobRecord {
    const KIND: DocumentKind = DocumentKind::Job;

    fn build_prompt(text: &str) -> String {
        prompts::build_job_prompt(text)
    }

    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            job_title: scalar_field(object, "job_title"),
            required_skills: list_field(
                object,
                "required_skills",
                FragmentKind::Plain,
                Some(MAX_SKILLS),
            ),
            required_experience: scalar_field(object, "required_experience"),
            required_education: scalar_field(object, "required_education"),
            industry: scalar_field(object, "industry"),
        }
    }
}

fn list_field(
    object: &Map<String, Value>,
    key: &str,
    kind: FragmentKind,
    limit: Option<usize>,
) -> Vec<String> {
    let mut items = coerce_field(object.get(key), kind);
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    items
}

/// Strings are kept verbatim, other scalars stringified, arrays of scalars joined; anything
/// else falls back to [`NOT_SPECIFIED`].
fn scalar_field(object: &Map<String, Value>, key: &str) -> String {
    let rendered = match object.get(key) {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Some(value) => scalar_text(value),
        None => None,
    };
    rendered.unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

/// Drives extraction prompts through a text-generation backend with bounded retries.
///
/// The normalizer keeps no per-document state, so one instance can serve concurrent calls for
/// distinct documents as long as the backend tolerates them.
#[derive(Clone)]
pub struct Normalizer {
    generator: Arc<dyn TextGenerator>,
    options: GenerationOptions,
    max_attempts: usize,
}

impl Normalizer {
    /// Create a normalizer with deterministic extraction options and three attempts.
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            options: GenerationOptions::normalization(DEFAULT_MAX_OUTPUT_TOKENS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the attempt bound (clamped to at least one attempt).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Override the output-length bound of extraction calls.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.options.max_output_tokens = max_output_tokens;
        self
    }

    /// Configured attempt bound.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Normalize a resume, returning `None` when every attempt failed.
    pub async fn normalize_resume(&self, text: &str) -> Option<CanonicalResumeRecord> {
        self.normalize::<CanonicalResumeRecord>(text)
            .await
            .into_record()
    }

    /// Normalize a job description, returning `None` when every attempt failed.
    pub async fn normalize_job(&self, text: &str) -> Option<CanonicalJobRecord> {
        self.normalize::<CanonicalJobRecord>(text)
            .await
            .into_record()
    }

    /// Run the bounded extraction loop for one document.
    pub async fn normalize<R: CanonicalRecord>(&self, text: &str) -> Normalized<R> {
        let kind = R::KIND;
        let prompt = R::build_prompt(text);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let failure = match self.generator.generate(&prompt, &self.options).await {
                Ok(raw) => match recover_object(&raw) {
                    Ok(object) => {
                        tracing::debug!(%kind, attempt, "Normalized document");
                        return Normalized::Record {
                            record: R::from_object(&object),
                            attempts: attempt,
                        };
                    }
                    Err(error) => AttemptFailure::from(error),
                },
                Err(error) => AttemptFailure::from(error),
            };

            if attempt >= self.max_attempts {
                tracing::error!(
                    %kind,
                    attempts = attempt,
                    error = %failure,
                    "Failed to normalize document; retries exhausted"
                );
                return Normalized::Exhausted {
                    attempts: attempt,
                    last_failure: failure,
                };
            }

            tracing::warn!(
                %kind,
                attempt,
                max_attempts = self.max_attempts,
                error = %failure,
                "Normalization attempt failed; retrying"
            );
        }
    }
}
