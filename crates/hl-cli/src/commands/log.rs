//! `hl log`: record minutes against a local hour of today.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use hl_core::{Clock, HourSlot, SnapshotStore, Tracker, UserRef};

#[derive(Debug, Args)]
pub struct LogArgs {
    /// Hour on a 12-hour clock (1-12).
    #[arg(allow_negative_numbers = true)]
    pub hour: i64,

    /// AM or PM.
    pub am_pm: String,

    /// Minutes spent. An hour holds at most 60.
    #[arg(allow_negative_numbers = true)]
    pub minutes: i64,

    /// What you did. Multiple words are joined with spaces.
    #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
    pub activity: Vec<String>,
}

pub fn run<W: Write, S: SnapshotStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    user: &UserRef,
    args: &LogArgs,
) -> Result<()> {
    let slot = HourSlot::parse(args.hour, &args.am_pm)?;
    let logged = tracker.log_activity(user, slot, args.minutes, &args.activity.join(" "))?;

    writeln!(
        writer,
        "Successfully logged {} min of '{}' at {} {} by {}!",
        logged.entry.minutes,
        logged.entry.activity,
        logged.slot,
        logged.local.format("%Z"),
        user.display_name
    )?;
    Ok(())
}
