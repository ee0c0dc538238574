//! Shared utilities for CLI commands.

use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use fs2::FileExt;
use hl_core::{Clock, Tracker};
use hl_db::Database;

use crate::Config;

/// Creates the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

/// Takes the exclusive store lock. It is released when the file is dropped.
///
/// Held across load, mutate and save so two `hl` processes cannot both pass
/// the hour-capacity check against the same stale snapshot.
pub fn lock_store(config: &Config) -> Result<File> {
    let path = config.lock_path();
    ensure_parent_dir(&path)?;
    let lock_file = File::create(&path)
        .with_context(|| format!("failed to create lock file {}", path.display()))?;
    lock_file
        .lock_exclusive()
        .context("failed to acquire lock")?;
    tracing::debug!(path = %path.display(), "acquired store lock");
    Ok(lock_file)
}

/// Opens the configured database and loads a tracker from it.
pub fn open_tracker<C: Clock>(config: &Config, clock: C) -> Result<Tracker<Database, C>> {
    ensure_parent_dir(&config.database_path)?;
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let tracker = Tracker::open(db, clock, config.default_zone()?)
        .context("failed to load stored entries")?;
    Ok(tracker)
}
