//! Error types for session-engine misuse.

use thiserror::Error;

use crate::session::Phase;

/// Errors returned by [`crate::session::QuizSession`] operations.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The addressed question index does not exist in the loaded quiz.
    #[error("question index {index} out of range (quiz has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    /// The addressed option index does not exist on the question.
    #[error("option index {index} out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },

    /// The addressed slot index does not exist on the question.
    #[error("slot index {index} out of range ({len} slots)")]
    SlotOutOfRange { index: usize, len: usize },

    /// The answer action's shape does not fit the question kind
    /// (e.g. toggling an option on a match question).
    #[error("cannot {action} a {kind} question")]
    ActionMismatch {
        action: &'static str,
        kind: &'static str,
    },

    /// The operation is not valid in the session's current phase.
    #[error("cannot {op} while the session is in the {phase} phase")]
    Phase { op: &'static str, phase: Phase },
}
