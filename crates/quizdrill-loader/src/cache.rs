//! Shared in-memory cache of question-set documents.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use quizdrill_core::model::QuestionSet;

/// Caches decoded question-set documents by file name.
///
/// Reads hand out deep copies, so callers may shuffle, truncate or otherwise
/// mutate what they get without disturbing the cached original. Clones of the
/// cache share the same underlying map.
#[derive(Clone, Default)]
pub struct DocumentCache {
    inner: Arc<Mutex<HashMap<String, QuestionSet>>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// An independent copy of the document stored under `file`, if any.
    pub fn get(&self, file: &str) -> Option<QuestionSet> {
        self.lock().get(file).cloned()
    }

    /// Store `set` under `file`, replacing any previous document.
    pub fn put(&self, file: &str, set: QuestionSet) {
        self.lock().insert(file.to_string(), set);
    }

    pub fn contains(&self, file: &str) -> bool {
        self.lock().contains_key(file)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, QuestionSet>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
