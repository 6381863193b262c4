//! Data model shared by the normalization pipeline and the matching engine.
//!
//! Canonical records are produced once by the normalizer and never mutated afterwards. Every
//! list field holds flat, non-empty strings and every scalar field holds a string (the
//! [`NOT_SPECIFIED`] placeholder when the model omitted it).

use serde::{Deserialize, Serialize};

/// Identifier assigned to a document by the ingestion collaborator.
pub type DocumentId = u64;

/// Placeholder used for scalar job fields the model left empty.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Maximum number of skills retained per resume and per job.
pub const MAX_SKILLS: usize = 8;
/// Maximum number of experience entries retained per resume.
pub const MAX_EXPERIENCE: usize = 4;
/// Maximum number of education entries retained per resume.
pub const MAX_EDUCATION: usize = 3;
/// Maximum number of industries retained per resume.
pub const MAX_INDUSTRIES: usize = 3;

/// Kind of free-text document fed into the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Candidate resume.
    Resume,
    /// Job description.
    Job,
}

impl DocumentKind {
    /// Lowercase label used in logs and diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resume => "resume",
            Self::Job => "job",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cleaned document text as handed over by ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Stable identifier, unique per run.
    pub id: DocumentId,
    /// Cleaned free text.
    pub text: String,
}

/// Structured resume produced by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalResumeRecord {
    /// Normalized professional skills (at most [`MAX_SKILLS`]).
    pub skills: Vec<String>,
    /// One entry per role (at most [`MAX_EXPERIENCE`]).
    pub experience: Vec<String>,
    /// One entry per degree or certification (at most [`MAX_EDUCATION`]).
    pub education: Vec<String>,
    /// Professional certifications.
    pub certifications: Vec<String>,
    /// Industries worked in (at most [`MAX_INDUSTRIES`]).
    pub industries: Vec<String>,
}

/// Structured job description produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalJobRecord {
    /// Normalized job title.
    pub job_title: String,
    /// Skills needed for the role (at most [`MAX_SKILLS`]).
    pub required_skills: Vec<String>,
    /// Experience level or years.
    pub required_experience: String,
    /// Minimum education requirement.
    pub required_education: String,
    /// Primary industry of the role.
    pub industry: String,
}

impl Default for CanonicalJobRecord {
    fn default() -> Self {
        Self {
            job_title: NOT_SPECIFIED.to_string(),
            required_skills: Vec::new(),
            required_experience: NOT_SPECIFIED.to_string(),
            required_education: NOT_SPECIFIED.to_string(),
            industry: NOT_SPECIFIED.to_string(),
        }
    }
}

/// One ranked pairing between a job and a resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult<K = DocumentId> {
    /// Job side of the pairing.
    pub job_id: K,
    /// Resume side of the pairing.
    pub resume_id: K,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}
