//! Import command for merging a legacy `userdata.json` into the database.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use hl_core::{Clock, SnapshotStore, Tracker};

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Path to the legacy JSON data file.
    pub path: PathBuf,
}

pub fn run<W: Write, S: SnapshotStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    args: &ImportArgs,
) -> Result<()> {
    let snapshot = hl_db::read_legacy_file(&args.path)
        .with_context(|| format!("failed to read {}", args.path.display()))?;
    let summary = tracker.import(snapshot)?;

    writeln!(
        writer,
        "Imported {} entries and {} timezone preferences from {}",
        summary.entries,
        summary.preferences,
        args.path.display()
    )?;
    if summary.duplicates > 0 || summary.rejected > 0 {
        writeln!(
            writer,
            "Skipped {} already imported and {} rejected entries.",
            summary.duplicates, summary.rejected
        )?;
    }
    if summary.entries > 0 {
        writeln!(
            writer,
            "Hint: Run 'hl claim' to attach entries logged under your name to your user ID."
        )?;
    }
    Ok(())
}
