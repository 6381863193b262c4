//! Helpers for turning source rows into [`RawDocument`]s.
//!
//! Tabular parsing lives outside this crate; these helpers only clean text and compose the
//! fixed document layouts the extraction prompts expect.

use crate::records::RawDocument;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading documents from disk.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to open.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The input file is not a JSON array of documents.
    #[error("Failed to parse {path}: {source}")]
    Parse {
        /// Path that failed to parse.
        path: String,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },
}

/// Collapse every run of whitespace into one space and trim the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compose resume text as `Category: <category>. Resume text: <text>`.
pub fn resume_text(category: &str, text: &str) -> String {
    format!(
        "Category: {}. Resume text: {}",
        clean_text(category),
        clean_text(text)
    )
}

/// Compose job text as `<field>: <value>` pairs joined by `". "`.
pub fn job_text<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    fields
        .into_iter()
        .map(|(field, value)| format!("{field}: {}", clean_text(value)))
        .collect::<Vec<_>>()
        .join(". ")
}

/// Read a JSON array of `{id, text}` documents and clean every text.
pub fn load_documents(path: &Path) -> Result<Vec<RawDocument>, IngestionError> {
    let source_path = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| IngestionError::Io {
        path: source_path.clone(),
        source,
    })?;
    let documents: Vec<RawDocument> =
        serde_json::from_str(&contents).map_err(|source| IngestionError::Parse {
            path: source_path.clone(),
            source,
        })?;

    tracing::debug!(path = %source_path, count = documents.len(), "Loaded documents");

    Ok(documents
        .into_iter()
        .map(|document| RawDocument {
            id: document.id,
            text: clean_text(&document.text),
        })
        .collect())
}
