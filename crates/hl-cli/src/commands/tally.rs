//! `hl tally`: today's totals per activity.

use std::io::Write;

use anyhow::Result;
use hl_core::{Clock, SnapshotStore, Tracker, UserRef, format_duration};

pub fn run<W: Write, S: SnapshotStore, C: Clock>(
    writer: &mut W,
    tracker: &Tracker<S, C>,
    user: &UserRef,
) -> Result<()> {
    let Some(tally) = super::or_no_data(writer, tracker.tally(user), "No logs found for today.")?
    else {
        return Ok(());
    };

    writeln!(
        writer,
        "{} total for {}: {}",
        tally.date.format("%b %-d"),
        user.display_name,
        format_duration(tally.total_minutes.into())
    )?;
    for activity in &tally.activities {
        writeln!(
            writer,
            "- {}: {}",
            activity.activity,
            format_duration(activity.minutes.into())
        )?;
    }
    Ok(())
}
