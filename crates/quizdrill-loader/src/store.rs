//! Persistence for custom quizzes.
//!
//! Custom quizzes are generated, not listed in the catalogue, so they are the
//! only kind worth keeping. The store is one JSON file holding every saved
//! quiz; saving replaces by id, so regenerating a quiz under the same id
//! updates it in place.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use quizdrill_core::model::{Quiz, QuizKind};

use crate::error::StoreError;

/// A JSON-file store of saved custom quizzes.
pub struct SavedQuizStore {
    path: PathBuf,
}

impl SavedQuizStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every saved quiz, in saved order. A missing store file is an empty
    /// store.
    pub fn load(&self) -> Result<Vec<Quiz>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Look up a saved quiz by id.
    pub fn find(&self, id: &str) -> Result<Option<Quiz>, StoreError> {
        Ok(self.load()?.into_iter().find(|q| q.id == id))
    }

    /// Save `quiz`, replacing any saved quiz with the same id.
    ///
    /// Only custom quizzes are accepted; catalogue quizzes can always be
    /// recomposed from their entries.
    #[instrument(skip(self, quiz), fields(id = %quiz.id))]
    pub fn save(&self, quiz: &Quiz) -> Result<(), StoreError> {
        if quiz.kind != QuizKind::Custom {
            return Err(StoreError::NotCustom(quiz.kind));
        }

        let mut quizzes = self.load()?;
        match quizzes.iter_mut().find(|q| q.id == quiz.id) {
            Some(existing) => *existing = quiz.clone(),
            None => quizzes.push(quiz.clone()),
        }

        self.write(&quizzes)?;
        debug!(total = quizzes.len(), "saved quiz");
        Ok(())
    }

    /// Delete the saved quiz with `id`. Returns whether anything was removed.
    #[instrument(skip(self))]
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut quizzes = self.load()?;
        let before = quizzes.len();
        quizzes.retain(|q| q.id != id);

        let removed = quizzes.len() != before;
        if removed {
            self.write(&quizzes)?;
            debug!("deleted saved quiz");
        }
        Ok(removed)
    }

    fn write(&self, quizzes: &[Quiz]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(quizzes)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
