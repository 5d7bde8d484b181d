//! The `quizdrill build` command.
//!
//! Builds a custom quiz from the questions of the chosen modules and saves it
//! so `quizdrill take saved <id>` can replay it later.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizdrill_core::manifest::load_manifest;
use quizdrill_core::model::ModuleEntry;
use quizdrill_loader::cache::DocumentCache;
use quizdrill_loader::composer::Composer;
use quizdrill_loader::config::{create_source, load_config_from};
use quizdrill_loader::controller::LoadController;
use quizdrill_loader::fetcher::Fetcher;
use quizdrill_loader::store::SavedQuizStore;

pub async fn execute(
    modules: String,
    count: Option<usize>,
    title: Option<String>,
    seed: Option<u64>,
    manifest_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(path) = manifest_path {
        config.manifest = path;
    }

    let manifest = load_manifest(&config.manifest)?;
    let source = create_source(&config);
    let fetcher = Fetcher::new(source, DocumentCache::new()).with_max_retries(config.max_retries);
    let mut composer = Composer::new(manifest, fetcher).with_settings(config.compose_settings());
    if let Some(seed) = seed {
        composer = composer.with_seed(seed);
    }

    let selection: Vec<&ModuleEntry> = modules
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            composer.manifest().module(id).with_context(|| {
                let available: Vec<&str> = composer
                    .manifest()
                    .modules
                    .iter()
                    .map(|m| m.id.as_str())
                    .collect();
                format!(
                    "no module with id '{id}' in the catalogue (available: {})",
                    available.join(", ")
                )
            })
        })
        .collect::<Result<_>>()?;

    let controller = LoadController::new();
    let cancel = controller.begin();

    let quiz = composer
        .custom_quiz(&selection, count, title, &cancel)
        .await?;

    let store = SavedQuizStore::new(&config.store_path);
    store.save(&quiz)?;

    println!("Saved custom quiz '{}' ({} questions).", quiz.id, quiz.len());
    println!("Store: {}", config.store_path.display());
    println!("Replay it with: quizdrill take saved {}", quiz.id);
    Ok(())
}
