//! Catalogue manifest loading and validation.
//!
//! The manifest is a JSON document listing every module, checkpoint and
//! final exam the system can offer.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::Manifest;

/// Load and parse a manifest from a JSON file.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;
    parse_manifest_str(&content)
}

/// Parse a JSON string into a [`Manifest`] (useful for testing).
pub fn parse_manifest_str(content: &str) -> Result<Manifest> {
    let manifest: Manifest =
        serde_json::from_str(content).context("failed to parse manifest JSON")?;
    Ok(manifest)
}

/// A finding from manifest validation.
#[derive(Debug, Clone)]
pub struct ValidationFinding {
    /// The offending entry's id, when one applies.
    pub entry_id: Option<String>,
    /// Human-readable description of the problem.
    pub message: String,
}

/// Validate a manifest for catalogue hygiene issues.
///
/// An empty result means the manifest is clean.
pub fn validate_manifest(manifest: &Manifest) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();

    // Ids must be unique across all three collections.
    let mut seen_ids = HashSet::new();
    let all_ids = manifest
        .modules
        .iter()
        .map(|m| &m.id)
        .chain(manifest.checkpoints.iter().map(|c| &c.id))
        .chain(manifest.final_exams.iter().map(|e| &e.id));
    for id in all_ids {
        if !seen_ids.insert(id) {
            findings.push(ValidationFinding {
                entry_id: Some(id.clone()),
                message: format!("duplicate id: {id}"),
            });
        }
    }

    // Every entry must name a document file.
    let files = manifest
        .modules
        .iter()
        .map(|m| (&m.id, &m.file))
        .chain(manifest.checkpoints.iter().map(|c| (&c.id, &c.file)))
        .chain(manifest.final_exams.iter().map(|e| (&e.id, &e.file)));
    for (id, file) in files {
        if file.trim().is_empty() {
            findings.push(ValidationFinding {
                entry_id: Some(id.clone()),
                message: "file reference is empty".into(),
            });
        }
    }

    // Module numbers drive range pooling and must be positive.
    for module in &manifest.modules {
        if module.module_number == 0 {
            findings.push(ValidationFinding {
                entry_id: Some(module.id.clone()),
                message: "moduleNumber must be positive".into(),
            });
        }
    }

    // Checkpoint ranges must be well-formed and cover at least one module.
    for checkpoint in &manifest.checkpoints {
        let [lo, hi] = checkpoint.module_range;
        if lo > hi {
            findings.push(ValidationFinding {
                entry_id: Some(checkpoint.id.clone()),
                message: format!("moduleRange [{lo}, {hi}] is inverted"),
            });
        } else if manifest.modules_in_range(lo, hi).is_empty() {
            findings.push(ValidationFinding {
                entry_id: Some(checkpoint.id.clone()),
                message: format!("moduleRange [{lo}, {hi}] covers no known module"),
            });
        }
    }

    findings
}
