//! Mock source for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use quizdrill_core::model::QuestionSet;

use crate::error::SourceError;
use crate::source::QuestionSource;

/// A mock question source for testing the load pipeline without a server.
///
/// Serves configurable documents by file name, and can be scripted to fail a
/// number of times before succeeding or to delay each response.
pub struct MockSource {
    /// Documents served by file name.
    documents: HashMap<String, QuestionSet>,
    /// Remaining scripted failures per file name.
    failures: Mutex<HashMap<String, u32>>,
    /// Fetches made per file name.
    calls: Mutex<HashMap<String, u32>>,
    /// Total fetches made.
    total_calls: AtomicU32,
    /// Artificial latency before each response.
    delay: Option<Duration>,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            total_calls: AtomicU32::new(0),
            delay: None,
        }
    }

    /// Serve `set` when `file` is fetched.
    pub fn with_document(mut self, file: &str, set: QuestionSet) -> Self {
        self.documents.insert(file.to_string(), set);
        self
    }

    /// Fail the first `times` fetches of `file` with an HTTP 500, then serve
    /// its document.
    pub fn failing(mut self, file: &str, times: u32) -> Self {
        self.failures
            .get_mut()
            .unwrap()
            .insert(file.to_string(), times);
        self
    }

    /// Fail every fetch of `file`.
    pub fn always_failing(self, file: &str) -> Self {
        self.failing(file, u32::MAX)
    }

    /// Sleep for `delay` before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches made for `file`.
    pub fn fetch_count(&self, file: &str) -> u32 {
        self.calls.lock().unwrap().get(file).copied().unwrap_or(0)
    }

    /// Number of fetches made in total.
    pub fn total_fetches(&self) -> u32 {
        self.total_calls.load(Ordering::Relaxed)
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, file: &str) -> Result<QuestionSet, SourceError> {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
        *self
            .calls
            .lock()
            .unwrap()
            .entry(file.to_string())
            .or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(remaining) = self.failures.lock().unwrap().get_mut(file) {
            if *remaining > 0 {
                *remaining = remaining.saturating_sub(1);
                return Err(SourceError::Status { status: 500 });
            }
        }

        self.documents
            .get(file)
            .cloned()
            .ok_or(SourceError::Status { status: 404 })
    }
}
