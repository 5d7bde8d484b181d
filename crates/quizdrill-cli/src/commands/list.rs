//! The `quizdrill list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizdrill_core::manifest::load_manifest;
use quizdrill_loader::config::load_config_from;
use quizdrill_loader::store::SavedQuizStore;

pub fn execute(manifest_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(path) = manifest_path {
        config.manifest = path;
    }

    let manifest = load_manifest(&config.manifest)?;

    let mut modules = Table::new();
    modules.set_header(vec!["Id", "#", "Module", "File"]);
    for module in &manifest.modules {
        modules.add_row(vec![
            Cell::new(&module.id),
            Cell::new(module.module_number),
            Cell::new(&module.title),
            Cell::new(&module.file),
        ]);
    }
    println!("Modules ({})", manifest.modules.len());
    println!("{modules}");

    if !manifest.checkpoints.is_empty() {
        let mut checkpoints = Table::new();
        checkpoints.set_header(vec!["Id", "Modules", "Checkpoint"]);
        for checkpoint in &manifest.checkpoints {
            let [lo, hi] = checkpoint.module_range;
            checkpoints.add_row(vec![
                Cell::new(&checkpoint.id),
                Cell::new(format!("{lo}-{hi}")),
                Cell::new(&checkpoint.title),
            ]);
        }
        println!("\nCheckpoints ({})", manifest.checkpoints.len());
        println!("{checkpoints}");
    }

    if !manifest.final_exams.is_empty() {
        let mut exams = Table::new();
        exams.set_header(vec!["Id", "Final exam"]);
        for exam in &manifest.final_exams {
            exams.add_row(vec![Cell::new(&exam.id), Cell::new(&exam.title)]);
        }
        println!("\nFinal exams ({})", manifest.final_exams.len());
        println!("{exams}");
    }

    let saved = SavedQuizStore::new(&config.store_path).load()?;
    if !saved.is_empty() {
        println!(
            "\n{} saved custom quiz(es); see `quizdrill saved`.",
            saved.len()
        );
    }

    Ok(())
}
