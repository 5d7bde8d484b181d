//! The quiz session state machine.
//!
//! A session moves through four phases:
//!
//! ```text
//! Start --begin--> InProgress --finish--> Finished --review--> Reviewing
//!   ^                                                              |
//!   +----------------------- reset ------------------------------+
//! ```
//!
//! [`QuizSession`] is the synchronous core: it owns the loaded quiz, the
//! answer map, the current-question index with its settle lock, and the
//! countdown deadline. [`SharedSession`] wraps it for shared use and runs
//! the countdown as a background task; a generation counter keeps stale
//! timers from finishing a session they no longer belong to.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::QuizError;
use crate::model::{Answer, Question, QuestionKind, Quiz, QuizKind};
use crate::report::{ReviewEntry, ScoreReport};
use crate::score::{review_quiz, score_quiz};

/// How long the current-question index is locked after a navigation,
/// mirroring the front end's transition animation.
pub const SETTLE_INTERVAL: Duration = Duration::from_millis(300);

/// The lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Quiz loaded, not yet begun.
    Start,
    /// Questions are being answered; the countdown (if any) is running.
    InProgress,
    /// Scored; the report is available.
    Finished,
    /// Read-only walkthrough of questions and answers.
    Reviewing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Start => write!(f, "start"),
            Phase::InProgress => write!(f, "in-progress"),
            Phase::Finished => write!(f, "finished"),
            Phase::Reviewing => write!(f, "reviewing"),
        }
    }
}

/// An answer-recording action. Which actions apply depends on the
/// question kind being answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerAction {
    /// Choose the option at this index (single choice; overwrites).
    Choose(usize),
    /// Toggle the option at this index in or out (multiple choice).
    Toggle(usize),
    /// Fill a slot with a right-side text (match kinds; overwrites).
    Fill { slot: usize, text: String },
    /// Clear a slot (match kinds; removes the slot's entry).
    Clear { slot: usize },
}

impl AnswerAction {
    fn describes(&self) -> &'static str {
        match self {
            AnswerAction::Choose(_) => "choose an option on",
            AnswerAction::Toggle(_) => "toggle an option on",
            AnswerAction::Fill { .. } => "fill a slot on",
            AnswerAction::Clear { .. } => "clear a slot on",
        }
    }
}

/// A rendering-neutral view of the session, safe to hand to any front
/// end. Everything a results screen or progress bar needs is here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Current lifecycle phase.
    pub phase: Phase,
    /// Id of the loaded quiz.
    pub quiz_id: String,
    /// Title of the loaded quiz.
    pub quiz_title: String,
    /// Flavour of the loaded quiz.
    pub kind: QuizKind,
    /// Total question count.
    pub total: usize,
    /// Current-question index.
    pub current_index: usize,
    /// Whether a navigation settle lock is still held.
    pub transitioning: bool,
    /// Count of questions with a non-empty answer entry.
    pub answered_count: usize,
    /// Per-question answered flags, in play order.
    pub answered: Vec<bool>,
    /// Seconds left on the countdown; `None` when untimed or not begun.
    pub remaining_seconds: Option<u64>,
    /// The score report, once the session has finished.
    pub report: Option<ScoreReport>,
}

/// The synchronous session state machine. See the module docs for the
/// phase diagram.
#[derive(Debug)]
pub struct QuizSession {
    quiz: Quiz,
    phase: Phase,
    current: usize,
    answers: BTreeMap<usize, Answer>,
    transition_until: Option<Instant>,
    deadline: Option<Instant>,
    timer_generation: u64,
    report: Option<ScoreReport>,
}

impl QuizSession {
    /// Create a session over `quiz`, in the Start phase.
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            phase: Phase::Start,
            current: 0,
            answers: BTreeMap::new(),
            transition_until: None,
            deadline: None,
            timer_generation: 0,
            report: None,
        }
    }

    /// Replace the loaded quiz and return to the Start phase. Any
    /// running countdown is defused.
    pub fn load(&mut self, quiz: Quiz) {
        self.quiz = quiz;
        self.reset();
    }

    /// The loaded quiz.
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current-question index.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question at the current index, if the quiz has any.
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.current)
    }

    /// The recorded answers, keyed by question index.
    pub fn answers(&self) -> &BTreeMap<usize, Answer> {
        &self.answers
    }

    /// The score report, once finished.
    pub fn report(&self) -> Option<&ScoreReport> {
        self.report.as_ref()
    }

    /// Whether a navigation settle lock is still held.
    pub fn is_transitioning(&self) -> bool {
        self.transition_until
            .map_or(false, |until| Instant::now() < until)
    }

    /// Seconds left on the countdown, or `None` when untimed / not begun.
    pub fn remaining_seconds(&self) -> Option<u64> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()).as_secs())
    }

    /// Begin the quiz: Start -> InProgress. A time limit on the quiz
    /// arms a countdown of `minutes * 60` seconds from now.
    pub fn begin(&mut self) -> Result<(), QuizError> {
        if self.phase != Phase::Start {
            return Err(QuizError::Phase {
                op: "begin",
                phase: self.phase,
            });
        }
        self.phase = Phase::InProgress;
        self.timer_generation = self.timer_generation.wrapping_add(1);
        self.deadline = self
            .quiz
            .time_limit
            .map(|minutes| Instant::now() + Duration::from_secs(u64::from(minutes) * 60));
        info!(
            quiz_id = %self.quiz.id,
            questions = self.quiz.len(),
            time_limit = ?self.quiz.time_limit,
            "quiz session started"
        );
        Ok(())
    }

    /// Record an answer on the question at `index`.
    ///
    /// Recording is permitted at any time while in progress, including
    /// during a navigation settle; it is rejected in every other phase
    /// (a review is read-only). The action must fit the question kind,
    /// and all indices are bounds-checked, so the answer map never holds
    /// an entry a quiz question cannot account for.
    pub fn answer(&mut self, index: usize, action: AnswerAction) -> Result<(), QuizError> {
        if self.phase != Phase::InProgress {
            return Err(QuizError::Phase {
                op: "answer",
                phase: self.phase,
            });
        }
        let len = self.quiz.len();
        let question = self
            .quiz
            .questions
            .get(index)
            .ok_or(QuizError::QuestionOutOfRange { index, len })?;
        match (&question.kind, action) {
            (QuestionKind::Single { options }, AnswerAction::Choose(option)) => {
                if option >= options.len() {
                    return Err(QuizError::OptionOutOfRange {
                        index: option,
                        len: options.len(),
                    });
                }
                self.answers.insert(index, Answer::Single(option));
            }
            (QuestionKind::Multiple { options }, AnswerAction::Toggle(option)) => {
                if option >= options.len() {
                    return Err(QuizError::OptionOutOfRange {
                        index: option,
                        len: options.len(),
                    });
                }
                let entry = self
                    .answers
                    .entry(index)
                    .or_insert_with(|| Answer::Multiple(BTreeSet::new()));
                if let Answer::Multiple(set) = entry {
                    if !set.remove(&option) {
                        set.insert(option);
                    }
                }
            }
            (
                QuestionKind::Match { pairs } | QuestionKind::DropdownMatch { pairs },
                AnswerAction::Fill { slot, text },
            ) => {
                if slot >= pairs.len() {
                    return Err(QuizError::SlotOutOfRange {
                        index: slot,
                        len: pairs.len(),
                    });
                }
                let entry = self
                    .answers
                    .entry(index)
                    .or_insert_with(|| Answer::Pairs(BTreeMap::new()));
                if let Answer::Pairs(map) = entry {
                    map.insert(slot, text);
                }
            }
            (
                QuestionKind::Match { pairs } | QuestionKind::DropdownMatch { pairs },
                AnswerAction::Clear { slot },
            ) => {
                if slot >= pairs.len() {
                    return Err(QuizError::SlotOutOfRange {
                        index: slot,
                        len: pairs.len(),
                    });
                }
                if let Some(Answer::Pairs(map)) = self.answers.get_mut(&index) {
                    map.remove(&slot);
                }
            }
            (kind, action) => {
                return Err(QuizError::ActionMismatch {
                    action: action.describes(),
                    kind: kind.name(),
                });
            }
        }
        Ok(())
    }

    /// Move the current-question index to `target`.
    ///
    /// Returns `false` without moving when a settle lock is held, when
    /// `target` is out of bounds or equals the current index, or when
    /// the phase has no notion of a current question (only InProgress
    /// and Reviewing navigate). A successful move engages the settle
    /// lock for [`SETTLE_INTERVAL`]; the lock releases on its own.
    pub fn navigate(&mut self, target: usize) -> bool {
        if !matches!(self.phase, Phase::InProgress | Phase::Reviewing) {
            return false;
        }
        if self.is_transitioning() {
            return false;
        }
        if target >= self.quiz.len() || target == self.current {
            return false;
        }
        self.current = target;
        self.transition_until = Some(Instant::now() + SETTLE_INTERVAL);
        true
    }

    /// Finish the quiz: stop the countdown, score, move to Finished.
    ///
    /// Finishing an already finished session recomputes the same report
    /// (scoring is pure), so a manual finish racing the countdown is
    /// harmless.
    pub fn finish(&mut self) -> Result<ScoreReport, QuizError> {
        if !matches!(self.phase, Phase::InProgress | Phase::Finished) {
            return Err(QuizError::Phase {
                op: "finish",
                phase: self.phase,
            });
        }
        self.deadline = None;
        self.timer_generation = self.timer_generation.wrapping_add(1);
        let report = score_quiz(&self.quiz, &self.answers);
        self.phase = Phase::Finished;
        info!(
            quiz_id = %self.quiz.id,
            score = report.score,
            passed = report.passed,
            "quiz session finished"
        );
        self.report = Some(report.clone());
        Ok(report)
    }

    /// Enter the read-only review: Finished -> Reviewing, starting at
    /// the first question. Re-entering while already reviewing keeps
    /// the current position. Returns the per-question juxtaposition.
    pub fn review(&mut self) -> Result<Vec<ReviewEntry>, QuizError> {
        match self.phase {
            Phase::Finished => {
                self.phase = Phase::Reviewing;
                self.current = 0;
                self.transition_until = None;
            }
            Phase::Reviewing => {}
            phase => {
                return Err(QuizError::Phase {
                    op: "review",
                    phase,
                });
            }
        }
        Ok(review_quiz(&self.quiz, &self.answers))
    }

    /// Return to the Start phase: answers cleared, index 0, settle lock
    /// and countdown cleared. The loaded quiz is kept.
    pub fn reset(&mut self) {
        self.phase = Phase::Start;
        self.current = 0;
        self.answers.clear();
        self.transition_until = None;
        self.deadline = None;
        self.timer_generation = self.timer_generation.wrapping_add(1);
        self.report = None;
    }

    /// Countdown expiry, called by the background timer. Only the timer
    /// armed by the current `begin` may fire: a stale generation (the
    /// session was finished, reset, or reloaded since) is ignored.
    fn expire(&mut self, generation: u64) -> bool {
        if generation != self.timer_generation || self.phase != Phase::InProgress {
            return false;
        }
        debug!(quiz_id = %self.quiz.id, "countdown expired, finishing session");
        self.finish().is_ok()
    }

    /// Snapshot the session for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        let answered: Vec<bool> = (0..self.quiz.len())
            .map(|i| {
                self.answers
                    .get(&i)
                    .map_or(false, Answer::is_answered)
            })
            .collect();
        SessionSnapshot {
            phase: self.phase,
            quiz_id: self.quiz.id.clone(),
            quiz_title: self.quiz.title.clone(),
            kind: self.quiz.kind,
            total: self.quiz.len(),
            current_index: self.current,
            transitioning: self.is_transitioning(),
            answered_count: answered.iter().filter(|a| **a).count(),
            answered,
            remaining_seconds: self.remaining_seconds(),
            report: self.report.clone(),
        }
    }
}

/// A clonable handle to a session shared between the caller and the
/// countdown task.
///
/// [`SharedSession::begin`] arms the countdown by spawning a task that
/// sleeps to the deadline and then finishes the session, so it must be
/// called from within a tokio runtime when the quiz is timed. The lock
/// is never held across an await.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<QuizSession>>,
}

impl SharedSession {
    /// Create a shared session over `quiz`, in the Start phase.
    pub fn new(quiz: Quiz) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QuizSession::new(quiz))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QuizSession> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with exclusive access to the underlying session.
    pub fn with<R>(&self, f: impl FnOnce(&mut QuizSession) -> R) -> R {
        f(&mut self.lock())
    }

    /// Begin the quiz and, when it is timed, arm the countdown task.
    pub fn begin(&self) -> Result<(), QuizError> {
        let (deadline, generation) = {
            let mut session = self.lock();
            session.begin()?;
            (session.deadline, session.timer_generation)
        };
        if let Some(deadline) = deadline {
            let watchdog = self.clone();
            tokio::spawn(async move {
                tokio::time::sleep_until(deadline).await;
                watchdog.lock().expire(generation);
            });
        }
        Ok(())
    }

    /// See [`QuizSession::load`].
    pub fn load(&self, quiz: Quiz) {
        self.lock().load(quiz);
    }

    /// See [`QuizSession::answer`].
    pub fn answer(&self, index: usize, action: AnswerAction) -> Result<(), QuizError> {
        self.lock().answer(index, action)
    }

    /// See [`QuizSession::navigate`].
    pub fn navigate(&self, target: usize) -> bool {
        self.lock().navigate(target)
    }

    /// See [`QuizSession::finish`].
    pub fn finish(&self) -> Result<ScoreReport, QuizError> {
        self.lock().finish()
    }

    /// See [`QuizSession::review`].
    pub fn review(&self) -> Result<Vec<ReviewEntry>, QuizError> {
        self.lock().review()
    }

    /// See [`QuizSession::reset`].
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// See [`QuizSession::snapshot`].
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }
}
