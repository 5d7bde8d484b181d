//! The `quizdrill take` command.
//!
//! Composes the requested quiz, then drives a session over stdin: one
//! question at a time, answers typed as option numbers. Running out of input
//! (or `q`) hands the quiz in with whatever has been answered so far.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use quizdrill_core::error::QuizError;
use quizdrill_core::manifest::load_manifest;
use quizdrill_core::model::{Question, QuestionKind, Quiz};
use quizdrill_core::report::ReviewEntry;
use quizdrill_core::session::{AnswerAction, SharedSession};
use quizdrill_loader::cache::DocumentCache;
use quizdrill_loader::composer::Composer;
use quizdrill_loader::config::{create_source, load_config_from, QuizdrillConfig};
use quizdrill_loader::controller::LoadController;
use quizdrill_loader::fetcher::Fetcher;
use quizdrill_loader::store::SavedQuizStore;

pub async fn execute(
    kind: String,
    id: String,
    manifest_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    report_dir: Option<PathBuf>,
    review: bool,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(path) = manifest_path {
        config.manifest = path;
    }

    let quiz = compose_quiz(&kind, &id, &config, seed).await?;
    anyhow::ensure!(!quiz.is_empty(), "quiz '{}' has no questions", id);

    let total = quiz.len();
    let session = SharedSession::new(quiz);
    session.begin()?;

    let (title, pass, time_limit) = session.with(|s| {
        let quiz = s.quiz();
        (quiz.title.clone(), quiz.pass_percentage, quiz.time_limit)
    });
    println!("{title}");
    println!("{total} questions, pass mark {pass}%");
    if let Some(minutes) = time_limit {
        println!("Time limit: {minutes} minutes");
    }
    println!("Answer each question, or press Enter to skip it. `q` hands the quiz in.");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    'questions: for index in 0..total {
        let question = session.with(|s| s.quiz().questions[index].clone());
        println!();
        print_question(index, total, &question);
        if let Some(secs) = session.with(|s| s.remaining_seconds()) {
            println!("  ({}m{:02}s left)", secs / 60, secs % 60);
        }

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => break 'questions,
            };
            let line = line.trim();

            if line.is_empty() {
                break;
            }
            if line == "q" {
                break 'questions;
            }

            let actions = match parse_actions(&question.kind, line) {
                Ok(actions) => actions,
                Err(msg) => {
                    println!("{msg}");
                    continue;
                }
            };

            let outcome = session.with(|s| {
                for action in actions {
                    s.answer(index, action)?;
                }
                Ok::<(), QuizError>(())
            });

            match outcome {
                Ok(()) => break,
                Err(QuizError::Phase { .. }) => {
                    println!("Time is up.");
                    break 'questions;
                }
                Err(e) => println!("{e}"),
            }
        }
    }

    let report = session.finish()?;
    println!();
    println!("{}", report.summary());

    if review {
        let entries = session.review()?;
        print_review(&entries);
    }

    if let Some(dir) = report_dir {
        std::fs::create_dir_all(&dir)?;
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("report-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

/// Resolve `kind`/`id` against the catalogue (or the saved-quiz store) and
/// compose the quiz.
async fn compose_quiz(
    kind: &str,
    id: &str,
    config: &QuizdrillConfig,
    seed: Option<u64>,
) -> Result<Quiz> {
    if kind == "saved" {
        return SavedQuizStore::new(&config.store_path)
            .find(id)?
            .with_context(|| format!("no saved quiz with id '{id}'"));
    }

    let manifest = load_manifest(&config.manifest)?;
    let source = create_source(config);
    let fetcher = Fetcher::new(source, DocumentCache::new()).with_max_retries(config.max_retries);
    let mut composer = Composer::new(manifest, fetcher).with_settings(config.compose_settings());
    if let Some(seed) = seed {
        composer = composer.with_seed(seed);
    }

    let controller = LoadController::new();
    let cancel = controller.begin();

    let quiz = match kind {
        "module" => {
            let entry = composer
                .manifest()
                .module(id)
                .with_context(|| format!("no module with id '{id}' in the catalogue"))?
                .clone();
            composer.module_quiz(&entry, &cancel).await?
        }
        "checkpoint" => {
            let entry = composer
                .manifest()
                .checkpoint(id)
                .with_context(|| format!("no checkpoint with id '{id}' in the catalogue"))?
                .clone();
            composer.checkpoint_quiz(&entry, &cancel).await?
        }
        "final" => {
            let entry = composer
                .manifest()
                .final_exam(id)
                .with_context(|| format!("no final exam with id '{id}' in the catalogue"))?
                .clone();
            composer.final_exam_quiz(&entry, &cancel).await?
        }
        other => bail!("unknown quiz kind '{other}' (expected module, checkpoint, final or saved)"),
    };

    Ok(quiz)
}

fn print_question(index: usize, total: usize, question: &Question) {
    println!("[{}/{}] {}", index + 1, total, question.prompt);

    match &question.kind {
        QuestionKind::Single { options } => {
            for (i, option) in options.iter().enumerate() {
                println!("  {}) {}", i + 1, option.text);
            }
            println!("Pick one option number.");
        }
        QuestionKind::Multiple { options } => {
            for (i, option) in options.iter().enumerate() {
                println!("  {}) {}", i + 1, option.text);
            }
            println!("Pick option numbers, e.g. 1,3.");
        }
        QuestionKind::Match { pairs } | QuestionKind::DropdownMatch { pairs } => {
            for (i, pair) in pairs.iter().enumerate() {
                println!("  {}. {}", i + 1, pair.left);
            }
            println!("Choices:");
            for (i, pair) in pairs.iter().enumerate() {
                println!("  {}) {}", i + 1, pair.right);
            }
            println!("Give one choice per slot, e.g. 2,1 (`-` leaves a slot open).");
        }
    }
}

/// Turn one input line into session actions for this question kind.
fn parse_actions(kind: &QuestionKind, line: &str) -> Result<Vec<AnswerAction>, String> {
    let numbers = |line: &str| -> Result<Vec<usize>, String> {
        line.split([',', ' '])
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .ok_or_else(|| format!("not an option number: {part}"))
            })
            .collect()
    };

    match kind {
        QuestionKind::Single { .. } => {
            let picked = numbers(line)?;
            if picked.len() != 1 {
                return Err("pick exactly one option".to_string());
            }
            Ok(vec![AnswerAction::Choose(picked[0])])
        }
        QuestionKind::Multiple { .. } => {
            let picked = numbers(line)?;
            if picked.is_empty() {
                return Err("pick at least one option".to_string());
            }
            Ok(picked.into_iter().map(AnswerAction::Toggle).collect())
        }
        QuestionKind::Match { pairs } | QuestionKind::DropdownMatch { pairs } => {
            let parts: Vec<&str> = line
                .split([',', ' '])
                .filter(|part| !part.is_empty())
                .collect();
            if parts.len() > pairs.len() {
                return Err(format!("give at most {} choices", pairs.len()));
            }

            let mut actions = Vec::new();
            for (slot, part) in parts.iter().enumerate() {
                if *part == "-" {
                    continue;
                }
                let choice = part
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .filter(|&n| n < pairs.len())
                    .ok_or_else(|| format!("not a choice number: {part}"))?;
                actions.push(AnswerAction::Fill {
                    slot,
                    text: pairs[choice].right.clone(),
                });
            }
            Ok(actions)
        }
    }
}

fn print_review(entries: &[ReviewEntry]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["#", "Result", "Question", "Your answer", "Correct answer"]);
    for entry in entries {
        let result = if entry.correct {
            "OK"
        } else if entry.answered {
            "WRONG"
        } else {
            "SKIPPED"
        };
        table.add_row(vec![
            Cell::new(entry.index + 1),
            Cell::new(result),
            Cell::new(&entry.prompt),
            Cell::new(entry.your_answer.join(", ")),
            Cell::new(entry.correct_answer.join(", ")),
        ]);
    }
    println!("\n{table}");

    for entry in entries {
        if !entry.correct {
            if let Some(explanation) = &entry.explanation {
                println!("[{}] {}", entry.index + 1, explanation);
            }
        }
    }
}
