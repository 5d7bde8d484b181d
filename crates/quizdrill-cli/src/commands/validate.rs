//! The `quizdrill validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizdrill_core::manifest::{load_manifest, validate_manifest};
use quizdrill_loader::config::load_config_from;

pub fn execute(manifest_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(path) = manifest_path {
        config.manifest = path;
    }

    let manifest = load_manifest(&config.manifest)?;
    println!(
        "Catalogue: {} modules, {} checkpoints, {} final exams",
        manifest.modules.len(),
        manifest.checkpoints.len(),
        manifest.final_exams.len()
    );

    let findings = validate_manifest(&manifest);
    for finding in &findings {
        let prefix = finding
            .entry_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} PROBLEM: {}", finding.message);
    }

    if findings.is_empty() {
        println!("Manifest is valid.");
        Ok(())
    } else {
        anyhow::bail!("{} problem(s) found", findings.len());
    }
}
