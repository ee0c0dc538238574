//! `hl remove`: drop every entry in one local hour of today.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use hl_core::{Clock, HourSlot, SnapshotStore, Tracker, UserRef};

use super::logs_noun;

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Hour on a 12-hour clock (1-12).
    #[arg(allow_negative_numbers = true)]
    pub hour: i64,

    /// AM or PM.
    pub am_pm: String,
}

pub fn run<W: Write, S: SnapshotStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    user: &UserRef,
    args: &RemoveArgs,
) -> Result<()> {
    let slot = HourSlot::parse(args.hour, &args.am_pm)?;
    let removed = tracker.remove_hour(user, slot)?;

    if removed == 0 {
        writeln!(writer, "No logs found for {slot}.")?;
    } else {
        writeln!(writer, "Removed {removed} {} for {slot}.", logs_noun(removed))?;
    }
    Ok(())
}
