//! `hl vs`: two users' last seven days side by side.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use hl_core::format::{block_bar, format_average};
use hl_core::{Clock, Contender, HeadToHead, SnapshotStore, Tracker, UserId, UserRef, format_duration};

#[derive(Debug, Args)]
pub struct VsArgs {
    /// User ID to compare against.
    pub other: String,

    /// Display name of the other user, for their legacy entries.
    #[arg(long)]
    pub other_name: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

fn summary_line(contender: &Contender) -> String {
    format!(
        "{}: today {}, week {}, avg {} / day",
        contender.display_name,
        format_duration(contender.today_minutes.into()),
        format_duration(contender.week_minutes.into()),
        format_average(contender.avg_7)
    )
}

pub fn format_head_to_head(h2h: &HeadToHead) -> String {
    let (first, second) = (&h2h.first, &h2h.second);
    let mut lines = vec![
        format!("{} vs {}, last 7 days", first.display_name, second.display_name),
        summary_line(first),
        summary_line(second),
        String::new(),
        format!("{:<4}{:<19}{}", "", first.display_name, second.display_name),
    ];

    // Each side is its own last seven days, oldest first. Users in different
    // zones can be a day apart, so the weekday labels are the first user's.
    for (i, day) in first.last_7.days().enumerate() {
        lines.push(format!(
            "{:<4}{:<10} {:<8}{:<10} {}",
            day.date.format("%a").to_string(),
            block_bar(h2h.bars.first[i]),
            format_duration(day.minutes.into()),
            block_bar(h2h.bars.second[i]),
            format_duration(second.last_7.minutes[i].into())
        ));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn run<W: Write, S: SnapshotStore, C: Clock>(
    writer: &mut W,
    tracker: &Tracker<S, C>,
    user: &UserRef,
    args: &VsArgs,
) -> Result<()> {
    let other_id = UserId::new(args.other.as_str())?;
    let other_name = args
        .other_name
        .clone()
        .unwrap_or_else(|| other_id.to_string());
    let other = UserRef::new(other_id, other_name);

    let Some(h2h) = super::or_no_data(
        writer,
        tracker.head_to_head(user, &other),
        "No logs found for either of you in the last 7 days.",
    )?
    else {
        return Ok(());
    };

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&h2h)?)?;
    } else {
        write!(writer, "{}", format_head_to_head(&h2h))?;
    }
    Ok(())
}
