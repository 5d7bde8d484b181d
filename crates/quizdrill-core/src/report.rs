//! Score and review report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::QuizKind;

/// The outcome of a finished quiz session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    /// Quiz identifier.
    pub quiz_id: String,
    /// Quiz display name.
    pub quiz_title: String,
    /// What flavour of quiz was taken.
    pub kind: QuizKind,
    /// Number of questions in the quiz.
    pub total: usize,
    /// Number of questions with a non-empty answer entry.
    pub answered: usize,
    /// Number of fully correct answers.
    pub correct: usize,
    /// `round(100 * correct / total)`; 0 for an empty quiz.
    pub score: u32,
    /// Pass mark the score was judged against.
    pub pass_percentage: u32,
    /// Whether the score reached the pass mark.
    pub passed: bool,
    /// When the session finished.
    pub finished_at: DateTime<Utc>,
}

impl ScoreReport {
    /// Save the report as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ScoreReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// One-line human summary, e.g. `7/10 correct (70%) - passed`.
    pub fn summary(&self) -> String {
        format!(
            "{}/{} correct ({}%) - {}",
            self.correct,
            self.total,
            self.score,
            if self.passed { "passed" } else { "failed" }
        )
    }
}

/// One question's row in the read-only review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEntry {
    /// Question position in play order.
    pub index: usize,
    /// Prompt text.
    pub prompt: String,
    /// Question kind wire name.
    pub kind: String,
    /// Whether the question carried a non-empty answer entry.
    pub answered: bool,
    /// Whether the answer was fully correct.
    pub correct: bool,
    /// The user's answer, rendered as display texts.
    pub your_answer: Vec<String>,
    /// The correct answer, rendered as display texts.
    pub correct_answer: Vec<String>,
    /// Explanation from the question, when present.
    pub explanation: Option<String>,
}
