//! `hl stats`: today, rolling averages, top activities, best day and a
//! seven-day graph.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use hl_core::compare::bar_length;
use hl_core::format::{block_bar, format_average};
use hl_core::{Clock, SnapshotStore, Tracker, UserRef, UserStats, format_duration};

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One row of a bar graph: weekday, bar, duration.
fn graph_line(date: NaiveDate, bar: u32, minutes: u32) -> String {
    format!(
        "{:<4}{:<10} {}",
        date.format("%a").to_string(),
        block_bar(bar),
        format_duration(minutes.into())
    )
}

pub fn format_stats(user: &UserRef, stats: &UserStats) -> String {
    let mut out = String::new();
    let mut push = |line: String| {
        out.push_str(&line);
        out.push('\n');
    };

    push(format!("Stats for {}:", user.display_name));
    push(format!("Today total: {}", format_duration(stats.today_minutes.into())));
    push(format!("7-day rolling average: {} / day", format_average(stats.avg_7)));
    push(format!("30-day rolling average: {} / day", format_average(stats.avg_30)));
    push(String::new());

    push("Activity breakdown (last 30 days):".to_string());
    for total in &stats.top_activities {
        push(format!("- {}: {}", total.activity, format_duration(total.minutes.into())));
    }
    push(String::new());

    if let Some(best) = stats.best_day {
        push(format!(
            "Most logged day ever: {} with {}",
            best.date.format("%b %-d, %Y"),
            format_duration(best.minutes.into())
        ));
        push(String::new());
    }

    push("Last 7 days progress:".to_string());
    let max = stats.last_7.max();
    for day in stats.last_7.days() {
        push(graph_line(day.date, bar_length(day.minutes, max), day.minutes));
    }
    out
}

pub fn run<W: Write, S: SnapshotStore, C: Clock>(
    writer: &mut W,
    tracker: &Tracker<S, C>,
    user: &UserRef,
    args: &StatsArgs,
) -> Result<()> {
    let Some(stats) =
        super::or_no_data(writer, tracker.stats(user), "No logs found for your user.")?
    else {
        return Ok(());
    };

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&stats)?)?;
    } else {
        write!(writer, "{}", format_stats(user, &stats))?;
    }
    Ok(())
}
