//! Loading-layer error types.

use thiserror::Error;

use quizdrill_core::model::QuizKind;

/// Errors surfaced by the fetcher, batch loader and composer.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The load's cancellation token fired. A cancelled load is never
    /// retried and its partial results are never applied.
    #[error("load cancelled")]
    Cancelled,

    /// A document could not be fetched, after all retry attempts.
    #[error("failed to load {key}: {source}")]
    Failed {
        /// The document key that failed.
        key: String,
        /// The terminal underlying cause.
        #[source]
        source: SourceError,
    },

    /// A custom quiz was requested with no modules chosen.
    #[error("no modules selected")]
    EmptySelection,
}

impl LoadError {
    /// Whether this error is a cancellation (as opposed to a real
    /// failure), so callers can tell a superseded load from a broken one.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }

    pub(crate) fn failed(key: impl Into<String>, source: SourceError) -> Self {
        LoadError::Failed {
            key: key.into(),
            source,
        }
    }
}

/// Errors from a question source's transport or decoding.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Could not reach the source at all.
    #[error("network error: {0}")]
    Network(String),

    /// The source answered with a non-success HTTP status.
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// Filesystem failure while reading a local document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document was fetched but is not valid question-set JSON.
    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from the saved-quiz store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while reading or writing the store file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store file exists but is not valid JSON.
    #[error("malformed store file: {0}")]
    Decode(#[from] serde_json::Error),

    /// Only custom quizzes are persisted.
    #[error("only custom quizzes can be saved (got a {0} quiz)")]
    NotCustom(QuizKind),
}
