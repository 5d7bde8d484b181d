//! Scoring and review for answered quizzes.
//!
//! Scoring is pure: the same quiz and answer map always produce the same
//! counts, so finishing a session twice cannot disagree with itself.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;

use crate::model::{Answer, Question, QuestionKind, Quiz};
use crate::report::{ReviewEntry, ScoreReport};

/// Whether `answer` is a fully correct response to `question`.
///
/// Missing entries and empty entries (every option toggled back out,
/// every slot cleared) are incorrect. Multiple-choice demands exact set
/// equality; match kinds demand every slot filled with its pair's right
/// side. There is no partial credit.
pub fn question_correct(question: &Question, answer: Option<&Answer>) -> bool {
    let Some(answer) = answer else {
        return false;
    };
    if !answer.is_answered() {
        return false;
    }
    match (&question.kind, answer) {
        (QuestionKind::Single { options }, Answer::Single(chosen)) => {
            options.iter().position(|o| o.is_correct) == Some(*chosen)
        }
        (QuestionKind::Multiple { options }, Answer::Multiple(chosen)) => {
            let correct: BTreeSet<usize> = options
                .iter()
                .enumerate()
                .filter(|(_, o)| o.is_correct)
                .map(|(i, _)| i)
                .collect();
            *chosen == correct
        }
        (
            QuestionKind::Match { pairs } | QuestionKind::DropdownMatch { pairs },
            Answer::Pairs(filled),
        ) => {
            filled.len() == pairs.len()
                && pairs.iter().enumerate().all(|(slot, pair)| {
                    filled.get(&slot).map_or(false, |text| *text == pair.right)
                })
        }
        // Answer shape does not fit the question kind.
        _ => false,
    }
}

/// Score a quiz against an answer map.
///
/// The score is `round(100 * correct / total)`; an empty quiz scores 0.
/// Passing means reaching the quiz's pass percentage.
pub fn score_quiz(quiz: &Quiz, answers: &BTreeMap<usize, Answer>) -> ScoreReport {
    let total = quiz.questions.len();
    let answered = answers.values().filter(|a| a.is_answered()).count();
    let correct = quiz
        .questions
        .iter()
        .enumerate()
        .filter(|(i, q)| question_correct(q, answers.get(i)))
        .count();
    let score = if total == 0 {
        0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() as u32
    };
    ScoreReport {
        quiz_id: quiz.id.clone(),
        quiz_title: quiz.title.clone(),
        kind: quiz.kind,
        total,
        answered,
        correct,
        score,
        pass_percentage: quiz.pass_percentage,
        passed: score >= quiz.pass_percentage,
        finished_at: Utc::now(),
    }
}

/// Build the read-only review: every question juxtaposed with the user's
/// answer and the correct answer, rendered as display texts.
pub fn review_quiz(quiz: &Quiz, answers: &BTreeMap<usize, Answer>) -> Vec<ReviewEntry> {
    quiz.questions
        .iter()
        .enumerate()
        .map(|(index, question)| {
            let answer = answers.get(&index);
            ReviewEntry {
                index,
                prompt: question.prompt.clone(),
                kind: question.kind.name().to_string(),
                answered: answer.map_or(false, Answer::is_answered),
                correct: question_correct(question, answer),
                your_answer: format_answer(question, answer),
                correct_answer: format_correct(question),
                explanation: question.explanation.clone(),
            }
        })
        .collect()
}

fn format_answer(question: &Question, answer: Option<&Answer>) -> Vec<String> {
    let Some(answer) = answer else {
        return Vec::new();
    };
    match (&question.kind, answer) {
        (QuestionKind::Single { options }, Answer::Single(i)) => {
            options.get(*i).map(|o| o.text.clone()).into_iter().collect()
        }
        (QuestionKind::Multiple { options }, Answer::Multiple(set)) => set
            .iter()
            .filter_map(|i| options.get(*i))
            .map(|o| o.text.clone())
            .collect(),
        (
            QuestionKind::Match { pairs } | QuestionKind::DropdownMatch { pairs },
            Answer::Pairs(filled),
        ) => pairs
            .iter()
            .enumerate()
            .filter_map(|(slot, pair)| {
                filled
                    .get(&slot)
                    .map(|text| format!("{} -> {}", pair.left, text))
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn format_correct(question: &Question) -> Vec<String> {
    match &question.kind {
        QuestionKind::Single { options } | QuestionKind::Multiple { options } => options
            .iter()
            .filter(|o| o.is_correct)
            .map(|o| o.text.clone())
            .collect(),
        QuestionKind::Match { pairs } | QuestionKind::DropdownMatch { pairs } => pairs
            .iter()
            .map(|pair| format!("{} -> {}", pair.left, pair.right))
            .collect(),
    }
}
