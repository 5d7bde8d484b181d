//! Cache-aware, retrying document fetch.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use quizdrill_core::model::QuestionSet;

use crate::cache::DocumentCache;
use crate::error::LoadError;
use crate::source::QuestionSource;

/// Default number of retries after a failed fetch attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Fetches question-set documents through the cache, retrying on failure.
pub struct Fetcher {
    source: Arc<dyn QuestionSource>,
    cache: DocumentCache,
    max_retries: u32,
}

impl Fetcher {
    pub fn new(source: Arc<dyn QuestionSource>, cache: DocumentCache) -> Self {
        Self {
            source,
            cache,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn cache(&self) -> &DocumentCache {
        &self.cache
    }

    /// Fetch `file`, consulting the cache first.
    ///
    /// A cached document is returned even when `cancel` has fired. Otherwise a
    /// failed attempt is retried up to `max_retries` times, immediately and
    /// without backoff. Cancellation cuts in between attempts and while a
    /// request is in flight, and is never retried.
    #[instrument(skip(self, cancel), fields(source = %self.source.name()))]
    pub async fn fetch(
        &self,
        file: &str,
        cancel: &CancellationToken,
    ) -> Result<QuestionSet, LoadError> {
        if let Some(set) = self.cache.get(file) {
            debug!(file, "cache hit");
            return Ok(set);
        }

        let mut attempt = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(LoadError::Cancelled);
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Err(LoadError::Cancelled),
                outcome = self.source.fetch(file) => outcome,
            };

            match outcome {
                Ok(set) => {
                    self.cache.put(file, set.clone());
                    return Ok(set);
                }
                Err(err) if attempt < self.max_retries => {
                    warn!(file, attempt, error = %err, "fetch attempt failed, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(LoadError::failed(file, err)),
            }
        }
    }
}
