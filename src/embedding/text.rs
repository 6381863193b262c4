//! Deterministic text rendering of canonical records for the embedding backend.
//!
//! List fields are deduplicated and sorted before joining so that two records holding the same
//! facts in a different order embed identically. Labels and line order are fixed per record kind.

use crate::records::{CanonicalJobRecord, CanonicalResumeRecord};
use std::collections::BTreeSet;

const LIST_SEPARATOR: &str = ", ";

/// Records that can be rendered into embedding input.
pub trait EmbeddingText {
    /// Render the record into its stable embedding text.
    fn embedding_text(&self) -> String;
}

impl EmbeddingText for CanonicalResumeRecord {
    fn embedding_text(&self) -> String {
        build_resume_embedding_text(self)
    }
}

impl EmbeddingText for CanonicalJobRecord {
    fn embedding_text(&self) -> String {
        build_job_embedding_text(self)
    }
}

/// Render a resume as `Skills/Experience/Education/Certifications/Industries` lines.
pub fn build_resume_embedding_text(resume: &CanonicalResumeRecord) -> String {
    [
        format!("Skills: {}", join_sorted(&resume.skills)),
        format!("Experience: {}", join_sorted(&resume.experience)),
        format!("Education: {}", join_sorted(&resume.education)),
        format!("Certifications: {}", join_sorted(&resume.certifications)),
        format!("Industries: {}", join_sorted(&resume.industries)),
    ]
    .join("\n")
}

/// Render a job as `Job title/Required skills/.../Industry` lines.
pub fn build_job_embedding_text(job: &CanonicalJobRecord) -> String {
    [
        format!("Job title: {}", job.job_title),
        format!("Required skills: {}", join_sorted(&job.required_skills)),
        format!("Required experience: {}", job.required_experience),
        format!("Required education: {}", job.required_education),
        format!("Industry: {}", job.industry),
    ]
    .join("\n")
}

fn join_sorted(values: &[String]) -> String {
    values
        .iter()
        .map(String::as_str)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}
