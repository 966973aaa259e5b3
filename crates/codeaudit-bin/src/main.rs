//! CodeAudit worker binary
//!
//! Reads job specifications from a JSONL file, feeds them through the
//! in-memory queue and runs the pipeline until the queue drains. Reports
//! land as JSON files in the configured output directory.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use codeaudit_adapters::{AiClient, LlmRefactoringOracle, LlmReviewOracle, LlmSecurityOracle};
use codeaudit_analysis::LanguageRouter;
use codeaudit_types::WorkItem;
use codeaudit_worker::{
    JsonResultStore, JsonRuleProvider, LocalSourceStore, MemoryQueue, Pipeline, RuleProvider,
    StaticRuleProvider, Worker,
};
use config::WorkerConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "codeaudit", about = "AI-assisted code review worker", version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSONL file with one job specification per line
    #[arg(short, long)]
    jobs: PathBuf,

    /// Directory source locators are resolved against (overrides config)
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Directory reports are written into (overrides config)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// JSON file with custom rule definitions
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Concurrent consumer tasks (overrides config)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log filter, e.g. "info" or "codeaudit_worker=debug"
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// One line of the jobs file. Looser than [`WorkItem`]: the id is optional
/// and assigned here when missing.
#[derive(Debug, Deserialize)]
struct JobSpec {
    #[serde(default)]
    submission_id: Option<String>,
    source_locator: String,
    #[serde(default)]
    language: Option<String>,
}

impl JobSpec {
    fn into_work_item(self) -> WorkItem {
        WorkItem {
            submission_id: self
                .submission_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            source_locator: self.source_locator,
            language: self.language.unwrap_or_else(|| "unknown".to_string()),
            enqueued_at: chrono::Utc::now(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = WorkerConfig::load(cli.config.as_deref())?;
    let source_dir = cli.source_dir.unwrap_or(config.storage.source_dir);
    let output_dir = cli.output_dir.unwrap_or(config.storage.output_dir);
    let concurrency = cli.concurrency.unwrap_or(config.worker.concurrency);

    let client = Arc::new(AiClient::new(config.ai).context("building AI client")?);
    let rules: Arc<dyn RuleProvider> = match cli.rules {
        Some(path) => Arc::new(JsonRuleProvider::new(path)),
        None => Arc::new(StaticRuleProvider::empty()),
    };

    let pipeline = Arc::new(Pipeline::new(
        LanguageRouter::new(),
        rules,
        Arc::new(LlmReviewOracle::new(client.clone())),
        Arc::new(LlmSecurityOracle::new(client.clone())),
        Arc::new(LlmRefactoringOracle::new(client)),
        Arc::new(LocalSourceStore::new(source_dir)),
        Arc::new(JsonResultStore::new(&output_dir)),
    ));

    let queue = Arc::new(MemoryQueue::new(config.worker.max_attempts));
    let published = publish_jobs(&queue, &cli.jobs)?;
    queue.close();
    tracing::info!("enqueued {published} jobs from {}", cli.jobs.display());

    Worker::new(queue.clone(), pipeline).run(concurrency).await;

    let dead = queue.dead_letters();
    if !dead.is_empty() {
        tracing::warn!("{} jobs exhausted their delivery attempts", dead.len());
    }
    tracing::info!("done; reports written to {}", output_dir.display());
    Ok(())
}

/// Parse the JSONL jobs file and enqueue every entry. Blank lines are
/// skipped; a malformed line aborts the run before any work starts.
fn publish_jobs(queue: &MemoryQueue, path: &PathBuf) -> Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading jobs file {}", path.display()))?;

    let mut published = 0;
    for (number, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let spec: JobSpec = serde_json::from_str(line)
            .with_context(|| format!("parsing job on line {}", number + 1))?;
        queue
            .publish(&spec.into_work_item())
            .context("enqueueing job")?;
        published += 1;
    }
    Ok(published)
}
