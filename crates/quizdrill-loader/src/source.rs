//! Question-set sources.
//!
//! A [`QuestionSource`] hands out question-set documents by file name.
//! [`HttpSource`] covers the hosted catalogue, [`DirSource`] reads the same
//! documents from a local directory. Both decode into
//! [`QuestionSet`](quizdrill_core::model::QuestionSet) and surface transport,
//! status and decode failures as [`SourceError`] so the fetch layer can decide
//! what to retry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use quizdrill_core::model::QuestionSet;

use crate::error::SourceError;

/// Default per-request timeout for [`HttpSource`].
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Anything that can produce question-set documents by file name.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetch and decode the document stored under `file`.
    async fn fetch(&self, file: &str) -> Result<QuestionSet, SourceError>;
}

/// Fetches question-set documents over HTTP, relative to a base URL.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source rooted at `base_url` with the default timeout.
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a source rooted at `base_url` with a custom request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(source = "http"))]
    async fn fetch(&self, file: &str) -> Result<QuestionSet, SourceError> {
        let url = format!("{}/{}", self.base_url, file);
        debug!(url = %url, "requesting question set");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;
        let set: QuestionSet = serde_json::from_str(&body)?;
        Ok(set)
    }
}

/// Reads question-set documents from a local directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl QuestionSource for DirSource {
    fn name(&self) -> &str {
        "dir"
    }

    #[instrument(skip(self), fields(source = "dir"))]
    async fn fetch(&self, file: &str) -> Result<QuestionSet, SourceError> {
        let path = self.root.join(file);
        let content = tokio::fs::read_to_string(&path).await?;
        let set: QuestionSet = serde_json::from_str(&content)?;
        Ok(set)
    }
}
