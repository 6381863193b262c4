use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rustymatch::{
    config::{self, Config},
    embedding, explanation,
    generation::{self, GenerationOptions, TextGenerator},
    ingestion, logging, matching,
    metrics::PipelineMetrics,
    normalization::Normalizer,
    pipeline::{self, BatchOutcome},
    records::{CanonicalJobRecord, CanonicalResumeRecord, DocumentId, MatchResult},
};
use serde::Serialize;
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

#[derive(Parser)]
#[command(
    name = "rustymatch",
    about = "Normalize resumes and job descriptions with a local LLM and rank them by embedding similarity"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a batch of documents and print the canonical records.
    Normalize {
        #[arg(long, value_enum)]
        kind: KindArg,
        /// JSON array of `{id, text}` documents.
        #[arg(long)]
        input: PathBuf,
    },
    /// Rank resumes against jobs.
    Match {
        /// JSON array of `{id, text}` resumes.
        #[arg(long)]
        resumes: PathBuf,
        /// JSON array of `{id, text}` job descriptions.
        #[arg(long)]
        jobs: PathBuf,
        /// Which side is the query: rank resumes per job, or jobs per resume.
        #[arg(long, value_enum, default_value_t = Direction::Jobs)]
        direction: Direction,
        /// Matches kept per query (defaults to `MATCH_TOP_K`).
        #[arg(long)]
        top_k: Option<usize>,
        /// Ask the text-generation backend to explain every match.
        #[arg(long)]
        explain: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Resume,
    Job,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Direction {
    /// Rank resumes for every job.
    Jobs,
    /// Rank jobs for every resume.
    Resumes,
}

#[derive(Serialize)]
struct NormalizedEntry<R> {
    id: DocumentId,
    record: R,
}

#[derive(Serialize)]
struct MatchReport {
    #[serde(flatten)]
    result: MatchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();
    let config = config::init_config().context("failed to load configuration")?;

    let generator: Arc<dyn TextGenerator> = Arc::from(generation::get_generation_client(config));
    let normalizer = Normalizer::new(generator.clone())
        .with_max_attempts(config.normalization_max_attempts)
        .with_max_output_tokens(config.generation_max_tokens);
    let metrics = PipelineMetrics::new();

    match cli.command {
        Command::Normalize { kind, input } => {
            let documents = ingestion::load_documents(&input)?;
            let json = match kind {
                KindArg::Resume => {
                    let batch = pipeline::normalize_batch::<CanonicalResumeRecord>(
                        &normalizer,
                        &documents,
                        &metrics,
                    )
                    .await;
                    serde_json::to_string_pretty(&entries(batch))?
                }
                KindArg::Job => {
                    let batch = pipeline::normalize_batch::<CanonicalJobRecord>(
                        &normalizer,
                        &documents,
                        &metrics,
                    )
                    .await;
                    serde_json::to_string_pretty(&entries(batch))?
                }
            };
            println!("{json}");
        }
        Command::Match {
            resumes,
            jobs,
            direction,
            top_k,
            explain,
        } => {
            let reports = run_match(
                config,
                &normalizer,
                generator.as_ref(),
                &metrics,
                MatchArgs {
                    resumes,
                    jobs,
                    direction,
                    top_k: top_k.unwrap_or(config.match_top_k),
                    explain,
                },
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        normalized = snapshot.documents_normalized,
        failed = snapshot.documents_failed,
        generation_attempts = snapshot.generation_attempts,
        "Run complete"
    );

    Ok(())
}

fn entries<R>(batch: BatchOutcome<R>) -> Vec<NormalizedEntry<R>> {
    batch
        .records
        .into_iter()
        .map(|(id, record)| NormalizedEntry { id, record })
        .collect()
}

struct MatchArgs {
    resumes: PathBuf,
    jobs: PathBuf,
    direction: Direction,
    top_k: usize,
    explain: bool,
}

async fn run_match(
    config: &Config,
    normalizer: &Normalizer,
    generator: &dyn TextGenerator,
    metrics: &PipelineMetrics,
    args: MatchArgs,
) -> Result<Vec<MatchReport>> {
    let resume_documents = ingestion::load_documents(&args.resumes)?;
    let job_documents = ingestion::load_documents(&args.jobs)?;

    let resume_batch =
        pipeline::normalize_batch::<CanonicalResumeRecord>(normalizer, &resume_documents, metrics)
            .await;
    let job_batch =
        pipeline::normalize_batch::<CanonicalJobRecord>(normalizer, &job_documents, metrics).await;

    let embedder = embedding::get_embedding_client(config);
    let resume_index = pipeline::embed_records(embedder.as_ref(), &resume_batch.records)
        .await
        .context("failed to embed resumes")?;
    let job_index = pipeline::embed_records(embedder.as_ref(), &job_batch.records)
        .await
        .context("failed to embed jobs")?;

    let mut results = Vec::new();
    match args.direction {
        Direction::Jobs => {
            for (job_id, job_vector) in job_index.iter() {
                results.extend(matching::match_job_to_resumes(
                    *job_id,
                    job_vector,
                    &resume_index,
                    args.top_k,
                )?);
            }
        }
        Direction::Resumes => {
            for (resume_id, resume_vector) in resume_index.iter() {
                results.extend(matching::match_resume_to_jobs(
                    *resume_id,
                    resume_vector,
                    &job_index,
                    args.top_k,
                )?);
            }
        }
    }

    tracing::info!(matches = results.len(), "Ranked matches");

    if !args.explain {
        return Ok(results
            .into_iter()
            .map(|result| MatchReport {
                result,
                explanation: None,
            })
            .collect());
    }

    let jobs: BTreeMap<DocumentId, &CanonicalJobRecord> = job_batch
        .records
        .iter()
        .map(|(id, record)| (*id, record))
        .collect();
    let resumes: BTreeMap<DocumentId, &CanonicalResumeRecord> = resume_batch
        .records
        .iter()
        .map(|(id, record)| (*id, record))
        .collect();
    let options = GenerationOptions::explanation(config.generation_max_tokens);

    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        let explanation = match (jobs.get(&result.job_id), resumes.get(&result.resume_id)) {
            (Some(job), Some(resume)) => {
                match explanation::explain_match(generator, &options, job, resume, result.score)
                    .await
                {
                    Ok(text) => Some(text),
                    Err(error) => {
                        tracing::warn!(
                            job_id = result.job_id,
                            resume_id = result.resume_id,
                            error = %error,
                            "Failed to explain match"
                        );
                        None
                    }
                }
            }
            _ => None,
        };
        reports.push(MatchReport {
            result,
            explanation,
        });
    }

    Ok(reports)
}
