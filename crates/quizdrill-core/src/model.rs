//! Core data model types for quizdrill.
//!
//! These are the fundamental types the whole system works with: the
//! catalogue manifest, question-set documents, the four question kinds,
//! runnable quizzes, and answer values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Default pass mark (percent) when a document does not specify one.
pub const DEFAULT_PASS_PERCENT: u32 = 70;
/// Maximum question count for pooled quizzes (checkpoints, final exams).
pub const POOLED_QUESTION_CAP: usize = 100;
/// Fixed time limit (minutes) stamped on composed final exams.
pub const FINAL_EXAM_MINUTES: u32 = 75;
/// Default question count for custom quizzes.
pub const DEFAULT_CUSTOM_COUNT: usize = 20;
/// Default title for custom quizzes.
pub const DEFAULT_CUSTOM_TITLE: &str = "Custom Quiz";

/// A course module listed in the catalogue manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleEntry {
    /// Unique identifier for this module.
    pub id: String,
    /// Human-readable name.
    pub title: String,
    /// Question-set document this module loads from.
    pub file: String,
    /// Position in the course; used for range pooling.
    pub module_number: u32,
}

/// A checkpoint review covering an inclusive range of module numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointEntry {
    /// Unique identifier for this checkpoint.
    pub id: String,
    /// Human-readable name.
    pub title: String,
    /// Question-set document for this checkpoint (may carry no questions,
    /// in which case the checkpoint pools from its module range).
    pub file: String,
    /// Inclusive `[lo, hi]` range of module numbers to pool from.
    pub module_range: [u32; 2],
}

impl CheckpointEntry {
    /// Whether `module_number` falls inside this checkpoint's range.
    pub fn covers(&self, module_number: u32) -> bool {
        self.module_range[0] <= module_number && module_number <= self.module_range[1]
    }
}

/// A final exam listed in the catalogue manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamEntry {
    /// Unique identifier for this exam.
    pub id: String,
    /// Human-readable name.
    pub title: String,
    /// Question-set document for this exam.
    pub file: String,
    /// Optional blurb shown in catalogue listings.
    #[serde(default)]
    pub description: Option<String>,
}

/// The catalogue manifest: everything the system can offer.
///
/// The wire format uses the plural `finalExams` key; the legacy singular
/// `finalExam` (one entry) is still accepted on input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawManifest")]
pub struct Manifest {
    /// Course modules, one per question-set document.
    pub modules: Vec<ModuleEntry>,
    /// Checkpoint reviews.
    pub checkpoints: Vec<CheckpointEntry>,
    /// Final exams.
    pub final_exams: Vec<ExamEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    #[serde(default)]
    modules: Vec<ModuleEntry>,
    #[serde(default)]
    checkpoints: Vec<CheckpointEntry>,
    #[serde(default)]
    final_exams: Vec<ExamEntry>,
    #[serde(default)]
    final_exam: Option<ExamEntry>,
}

impl From<RawManifest> for Manifest {
    fn from(raw: RawManifest) -> Self {
        let final_exams = if raw.final_exams.is_empty() {
            raw.final_exam.into_iter().collect()
        } else {
            raw.final_exams
        };
        Manifest {
            modules: raw.modules,
            checkpoints: raw.checkpoints,
            final_exams,
        }
    }
}

impl Manifest {
    /// Look up a module by id.
    pub fn module(&self, id: &str) -> Option<&ModuleEntry> {
        self.modules.iter().find(|m| m.id == id)
    }

    /// Look up a checkpoint by id.
    pub fn checkpoint(&self, id: &str) -> Option<&CheckpointEntry> {
        self.checkpoints.iter().find(|c| c.id == id)
    }

    /// Look up a final exam by id.
    pub fn final_exam(&self, id: &str) -> Option<&ExamEntry> {
        self.final_exams.iter().find(|e| e.id == id)
    }

    /// Modules whose number falls in the inclusive `[lo, hi]` range,
    /// in manifest order.
    pub fn modules_in_range(&self, lo: u32, hi: u32) -> Vec<&ModuleEntry> {
        self.modules
            .iter()
            .filter(|m| lo <= m.module_number && m.module_number <= hi)
            .collect()
    }

    /// The `[min, max]` module-number span of the whole catalogue, or
    /// `None` for an empty manifest.
    pub fn module_span(&self) -> Option<[u32; 2]> {
        let lo = self.modules.iter().map(|m| m.module_number).min()?;
        let hi = self.modules.iter().map(|m| m.module_number).max()?;
        Some([lo, hi])
    }
}

/// One selectable option of a single- or multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Option text shown to the user.
    pub text: String,
    /// Whether this option belongs to the correct answer.
    #[serde(default)]
    pub is_correct: bool,
}

/// One left/right pairing of a match question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// Fixed left side (the slot).
    pub left: String,
    /// Correct right side for this slot.
    pub right: String,
}

/// The four question kinds, as a closed sum.
///
/// Adding a kind is a compile-visible change: every `match` over this
/// enum is exhaustive. The wire tag is the JSON `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuestionKind {
    /// Exactly one correct option; answered with one option index.
    Single {
        /// The selectable options.
        options: Vec<Choice>,
    },
    /// One or more correct options; answered with an index set.
    Multiple {
        /// The selectable options.
        options: Vec<Choice>,
    },
    /// Left sides matched to right-side texts; answered slot by slot.
    Match {
        /// The pairings to reconstruct.
        pairs: Vec<Pair>,
    },
    /// Same payload and scoring as [`QuestionKind::Match`]; front ends
    /// present it with dropdown selectors instead of free placement.
    DropdownMatch {
        /// The pairings to reconstruct.
        pairs: Vec<Pair>,
    },
}

impl QuestionKind {
    /// Wire name of this kind (`single`, `multiple`, `match`,
    /// `dropdown-match`).
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::Single { .. } => "single",
            QuestionKind::Multiple { .. } => "multiple",
            QuestionKind::Match { .. } => "match",
            QuestionKind::DropdownMatch { .. } => "dropdown-match",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single question: common presentation fields plus the kind payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt text shown to the user.
    #[serde(rename = "question")]
    pub prompt: String,
    /// Optional illustration path.
    #[serde(default)]
    pub image: Option<String>,
    /// Optional explanation shown during review.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Kind-specific payload (options or pairs).
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// A question-set document as stored at the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSet {
    /// Display name.
    pub title: String,
    /// Pass mark override (percent); [`DEFAULT_PASS_PERCENT`] applies
    /// when absent.
    #[serde(default)]
    pub pass_percentage: Option<u32>,
    /// Countdown length in minutes; no countdown when absent.
    #[serde(default)]
    pub time_limit: Option<u32>,
    /// The questions, in document order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// What flavour of quiz a [`Quiz`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizKind {
    Module,
    Checkpoint,
    FinalExam,
    Custom,
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizKind::Module => write!(f, "module"),
            QuizKind::Checkpoint => write!(f, "checkpoint"),
            QuizKind::FinalExam => write!(f, "final-exam"),
            QuizKind::Custom => write!(f, "custom"),
        }
    }
}

/// A runnable quiz, ready for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Unique identifier (manifest id, or generated for custom quizzes).
    pub id: String,
    /// Display name.
    pub title: String,
    /// What flavour of quiz this is.
    #[serde(rename = "type")]
    pub kind: QuizKind,
    /// The questions, in play order.
    pub questions: Vec<Question>,
    /// Pass mark in percent.
    pub pass_percentage: u32,
    /// Countdown length in minutes; untimed when absent.
    #[serde(default)]
    pub time_limit: Option<u32>,
    /// For custom quizzes: the module ids the pool was drawn from.
    #[serde(default)]
    pub created_from: Option<Vec<String>>,
    /// For custom quizzes: when the quiz was generated.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Quiz {
    /// Number of questions in play order.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the quiz carries no questions at all.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// A recorded answer for one question.
///
/// The JSON rendering is untagged and mirrors each kind's natural shape:
/// a bare index, an index array, or a slot-to-text object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Chosen option index of a single-choice question.
    Single(usize),
    /// Toggled option indices of a multiple-choice question.
    Multiple(BTreeSet<usize>),
    /// Slot index to chosen right-side text of a match question.
    Pairs(BTreeMap<usize, String>),
}

impl Answer {
    /// Whether this entry counts as answered. Toggling every index back
    /// out (or clearing every slot) leaves an empty entry, which does
    /// not count.
    pub fn is_answered(&self) -> bool {
        match self {
            Answer::Single(_) => true,
            Answer::Multiple(set) => !set.is_empty(),
            Answer::Pairs(map) => !map.is_empty(),
        }
    }
}
