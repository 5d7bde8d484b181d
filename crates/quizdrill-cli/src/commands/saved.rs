//! The `quizdrill saved` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdrill_loader::config::load_config_from;
use quizdrill_loader::store::SavedQuizStore;

pub fn execute(delete: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = SavedQuizStore::new(&config.store_path);

    if let Some(id) = delete {
        if store.delete(&id)? {
            println!("Deleted {id}.");
        } else {
            anyhow::bail!("no saved quiz with id '{id}'");
        }
        return Ok(());
    }

    let quizzes = store.load()?;
    if quizzes.is_empty() {
        println!("No saved quizzes. Build one with `quizdrill build --modules <ids>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Id", "Title", "Questions", "Built from", "Created"]);
    for quiz in &quizzes {
        let built_from = quiz
            .created_from
            .as_deref()
            .map(|ids| ids.join(", "))
            .unwrap_or_else(|| "-".to_string());
        let created = quiz
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&quiz.id),
            Cell::new(&quiz.title),
            Cell::new(quiz.len()),
            Cell::new(built_from),
            Cell::new(created),
        ]);
    }
    println!("{table}");
    Ok(())
}
