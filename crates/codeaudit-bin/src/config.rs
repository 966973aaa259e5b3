//! Worker configuration loaded from TOML
//!
//! Every section and field has a usable default, so a missing config file
//! yields a worker that talks to a local model endpoint and writes reports
//! next to the working directory. The API key can always be supplied via
//! `CODEAUDIT_API_KEY` instead of the file.

use anyhow::{Context, Result};
use codeaudit_adapters::AiConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level worker configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkerConfig {
    /// AI provider settings
    #[serde(default)]
    pub ai: AiConfig,
    /// Queue and concurrency settings
    #[serde(default)]
    pub worker: WorkerSection,
    /// Storage locations
    #[serde(default)]
    pub storage: StorageSection,
}

/// `[worker]` section
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSection {
    /// Number of concurrent consumer tasks
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Delivery attempts before a message is dead-lettered
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// `[storage]` section
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// Directory submitted sources are resolved against
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,
    /// Directory reports are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_concurrency() -> usize {
    4
}

fn default_max_attempts() -> u32 {
    3
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl Default for WorkerSection {
    fn default() -> Self {
        WorkerSection {
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for StorageSection {
    fn default() -> Self {
        StorageSection {
            source_dir: default_source_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl WorkerConfig {
    /// Load configuration from `path` when given, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                toml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => WorkerConfig::default(),
        };

        if let Ok(api_key) = std::env::var("CODEAUDIT_API_KEY") {
            if !api_key.is_empty() {
                config.ai.api_key = Some(api_key);
            }
        }

        Ok(config)
    }
}
