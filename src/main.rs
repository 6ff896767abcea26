//! Entry point for the parallel-edition reader.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments (the two document paths).
//! - Load user configuration from `conf/config.toml`.
//! - Load both documents and restore any persisted sync points.
//! - Hand the session to the interactive loop.

mod classifier;
mod config;
mod document;
mod epub_loader;
mod mapper;
mod pdf_loader;
mod repl;
mod session;
mod store;
mod sync;

use crate::config::{AppConfig, load_config};
use crate::document::{Document, DocumentKind, load_pair};
use crate::mapper::MappingStrategy;
use crate::repl::App;
use crate::session::{DocumentSide, Session};
use crate::sync::SyncSet;
use anyhow::{Result, anyhow};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let (original_path, translation_path) = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        original = %original_path.display(),
        translation = %translation_path.display(),
        level = %config.log_level,
        "Starting parallel reader"
    );

    let (original, translation) = load_pair(&original_path, &translation_path, &config)?;

    let original_name = file_name(&original_path);
    let translation_name = file_name(&translation_path);
    let strategy = choose_strategy(
        &config,
        &original,
        &translation,
        &original_name,
        &translation_name,
    );

    let session = Session::load(
        DocumentSide::new(original.kind(), original_name, original.total_units()),
        DocumentSide::new(translation.kind(), translation_name, translation.total_units()),
        strategy,
    );

    App {
        session,
        original,
        translation,
        config,
    }
    .run()
}

/// Mapping mode is fixed at session-load time: the adjustable chapter
/// offset for EPUB pairs when configured, otherwise sync-point anchoring
/// seeded from the persisted record for this document pair.
fn choose_strategy(
    config: &AppConfig,
    original: &Document,
    translation: &Document,
    original_name: &str,
    translation_name: &str,
) -> MappingStrategy {
    if config.epub_offset_mode
        && original.kind() == DocumentKind::Epub
        && translation.kind() == DocumentKind::Epub
    {
        info!("Using the fixed chapter offset for this EPUB pair");
        return MappingStrategy::FixedOffset(0);
    }

    let points = store::load_sync_points(&config.cache_dir, original_name, translation_name)
        .unwrap_or_default();
    if !points.is_empty() {
        info!(points = points.len(), "Restored persisted sync points");
    }
    MappingStrategy::Anchored(SyncSet::from_points(points))
}

fn parse_args() -> Result<(PathBuf, PathBuf)> {
    let mut args = env::args().skip(1);
    let usage = "Usage: tandem-reader <original-book> <translation-book>";
    let original = PathBuf::from(args.next().ok_or_else(|| anyhow!(usage))?);
    let translation = PathBuf::from(args.next().ok_or_else(|| anyhow!(usage))?);

    for path in [&original, &translation] {
        if !path.exists() {
            return Err(anyhow!("File not found: {}", path.display()));
        }
    }
    Ok((original, translation))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(filter_layer))
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}
