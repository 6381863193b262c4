#![deny(missing_docs)]

//! Core library for Rusty Match: LLM-assisted resume/job normalization and embedding-based
//! matching.

/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction, adapters and embedding text rendering.
pub mod embedding;
/// Match explanations generated by the text-generation backend.
pub mod explanation;
/// Text-generation client abstraction and adapters.
pub mod generation;
/// Document cleaning and loading helpers.
pub mod ingestion;
/// Structured logging and tracing setup.
pub mod logging;
/// Similarity scoring and top-k ranking.
pub mod matching;
/// Normalization counters.
pub mod metrics;
/// Prompt building, JSON recovery, schema coercion and the retry loop.
pub mod normalization;
/// Batch sequencing of normalization and embedding.
pub mod pipeline;
/// Canonical records and match results.
pub mod records;
