//! Configuration and source construction.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizdrill_core::model::{DEFAULT_CUSTOM_COUNT, FINAL_EXAM_MINUTES, POOLED_QUESTION_CAP};

use crate::batch::DEFAULT_BATCH_SIZE;
use crate::composer::ComposeSettings;
use crate::fetcher::DEFAULT_MAX_RETRIES;
use crate::source::{DirSource, HttpSource, QuestionSource, DEFAULT_TIMEOUT_SECS};

/// Where question-set documents come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    /// A hosted catalogue behind a base URL.
    Http {
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        request_timeout_secs: u64,
    },
    /// A local directory of documents.
    Dir { path: PathBuf },
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level quizdrill configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizdrillConfig {
    /// Catalogue manifest file.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    /// Question-set source; defaults to the manifest's own directory.
    #[serde(default)]
    pub source: Option<SourceConfig>,
    /// Retries after a failed fetch attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Documents fetched concurrently per batch window.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Question cap on pooled quizzes.
    #[serde(default = "default_pooled_cap")]
    pub pooled_cap: usize,
    /// Time limit (minutes) for final exams without one of their own.
    #[serde(default = "default_final_exam_minutes")]
    pub final_exam_minutes: u32,
    /// Default question count for custom quizzes.
    #[serde(default = "default_custom_count")]
    pub custom_count: usize,
    /// Saved custom quizzes file.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("quiz-data.json")
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
fn default_pooled_cap() -> usize {
    POOLED_QUESTION_CAP
}
fn default_final_exam_minutes() -> u32 {
    FINAL_EXAM_MINUTES
}
fn default_custom_count() -> usize {
    DEFAULT_CUSTOM_COUNT
}
fn default_store_path() -> PathBuf {
    PathBuf::from("saved-quizzes.json")
}

impl Default for QuizdrillConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            source: None,
            max_retries: default_max_retries(),
            batch_size: default_batch_size(),
            pooled_cap: default_pooled_cap(),
            final_exam_minutes: default_final_exam_minutes(),
            custom_count: default_custom_count(),
            store_path: default_store_path(),
        }
    }
}

impl QuizdrillConfig {
    /// The compose knobs this config carries.
    pub fn compose_settings(&self) -> ComposeSettings {
        ComposeSettings {
            batch_size: self.batch_size,
            pooled_cap: self.pooled_cap,
            final_exam_minutes: self.final_exam_minutes,
            custom_count: self.custom_count,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_source_config(config: &SourceConfig) -> SourceConfig {
    match config {
        SourceConfig::Http {
            base_url,
            request_timeout_secs,
        } => SourceConfig::Http {
            base_url: resolve_env_vars(base_url),
            request_timeout_secs: *request_timeout_secs,
        },
        SourceConfig::Dir { path } => SourceConfig::Dir { path: path.clone() },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizdrill.toml` in the current directory
/// 2. `~/.config/quizdrill/config.toml`
///
/// Environment variable override: `QUIZDRILL_BASE_URL` forces an HTTP source.
pub fn load_config() -> Result<QuizdrillConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizdrillConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizdrill.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizdrillConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizdrillConfig::default(),
    };

    // Apply env var overrides
    if let Ok(url) = std::env::var("QUIZDRILL_BASE_URL") {
        let request_timeout_secs = match &config.source {
            Some(SourceConfig::Http {
                request_timeout_secs,
                ..
            }) => *request_timeout_secs,
            _ => default_timeout_secs(),
        };
        config.source = Some(SourceConfig::Http {
            base_url: url,
            request_timeout_secs,
        });
    }

    config.source = config.source.as_ref().map(resolve_source_config);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizdrill"))
}

/// Build the question source this config names.
///
/// With no source configured, documents are read from the directory the
/// manifest file lives in.
pub fn create_source(config: &QuizdrillConfig) -> Arc<dyn QuestionSource> {
    match &config.source {
        Some(SourceConfig::Http {
            base_url,
            request_timeout_secs,
        }) => Arc::new(HttpSource::with_timeout(
            base_url,
            Duration::from_secs(*request_timeout_secs),
        )),
        Some(SourceConfig::Dir { path }) => Arc::new(DirSource::new(path)),
        None => {
            let dir = config
                .manifest
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Arc::new(DirSource::new(dir))
        }
    }
}
