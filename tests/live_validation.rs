use std::{env, sync::Once};

use rustymatch::{
    config::{self, Config},
    embedding::{self, EmbeddingText},
    generation,
    matching::{self, EmbeddingIndex},
    normalization::Normalizer,
};

static INIT: Once = Once::new();

fn set_default_env(key: &str, value: &str) {
    let needs_value = env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true);
    if needs_value {
        // SAFETY: Tests run serially via Once and we intentionally mutate process env.
        unsafe {
            env::set_var(key, value);
        }
    }
}

fn live_config() -> &'static Config {
    INIT.call_once(|| {
        set_default_env("OLLAMA_URL", "http://127.0.0.1:11434");
        set_default_env("GENERATION_MODEL", "llama3");
        set_default_env("EMBEDDING_PROVIDER", "ollama");
        set_default_env("EMBEDDING_MODEL", "nomic-embed-text");
    });
    config::init_config().expect("live configuration")
}

#[tokio::test]
#[ignore = "Requires live Ollama generation"]
async fn live_resume_normalization() {
    let config = live_config();
    let normalizer = Normalizer::new(generation::get_generation_client(config).into())
        .with_max_attempts(config.normalization_max_attempts)
        .with_max_output_tokens(config.generation_max_tokens);

    let record = normalizer
        .normalize_resume(
            "Category: INFORMATION-TECHNOLOGY. Resume text: Backend engineer with 5 years of \
             Rust and PostgreSQL at Acme Corp. BSc Computer Science, University of Leeds, 2016.",
        )
        .await
        .expect("model should produce a parseable record within the attempt budget");

    assert!(!record.skills.is_empty(), "expected extracted skills: {record:?}");
    assert!(record.skills.len() <= 8);
    assert!(record.experience.len() <= 4);
}

#[tokio::test]
#[ignore = "Requires live Ollama embeddings"]
async fn live_embedding_ranking() {
    let config = live_config();
    let client = embedding::get_embedding_client(config);

    let texts = vec![
        "Skills: PostgreSQL, Rust".to_string(),
        "Job title: Backend Engineer\nRequired skills: PostgreSQL, Rust".to_string(),
        "Job title: Pastry Chef\nRequired skills: Baking, Decorating".to_string(),
    ];
    let vectors = client
        .generate_embeddings(texts)
        .await
        .expect("failed to request embeddings from provider");
    assert_eq!(vectors.len(), 3, "expected embedding per input text");
    if let Some(dimension) = config.embedding_dimension {
        assert_eq!(vectors[0].len(), dimension, "embedding dimension mismatch");
    }

    let mut vectors = vectors.into_iter();
    let resume = vectors.next().expect("resume vector");
    let jobs = EmbeddingIndex::from_entries(
        vectors
            .enumerate()
            .map(|(offset, vector)| (offset as u64 + 1, Some(vector))),
    )
    .expect("job index");

    let matches = matching::match_resume_to_jobs(0, &resume, &jobs, 2).expect("ranking");
    assert_eq!(matches[0].job_id, 1, "backend role should rank first: {matches:?}");
}

#[test]
fn embedding_text_is_stable_for_live_inputs() {
    let resume = rustymatch::records::CanonicalResumeRecord {
        skills: vec!["Rust".into(), "PostgreSQL".into(), "Rust".into()],
        ..Default::default()
    };
    assert!(resume.embedding_text().starts_with("Skills: PostgreSQL, Rust"));
}
