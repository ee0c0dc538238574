//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{
    import::ImportArgs, log::LogArgs, remove::RemoveArgs, settz::SetTimezoneArgs, stats::StatsArgs,
    vs::VsArgs,
};

/// Hour-bucketed activity log.
///
/// Records short bursts of activity against local clock hours and reports
/// daily totals, rolling averages and head-to-head comparisons.
#[derive(Debug, Parser)]
#[command(name = "hl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Stable user ID to act as (overrides `user_id` in config).
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Display name to act as (overrides `display_name` in config).
    #[arg(short, long, global = true)]
    pub name: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Set your timezone, e.g. America/New_York.
    #[command(name = "settz", alias = "settimezone")]
    SetTimezone(SetTimezoneArgs),

    /// Log an activity with time and duration.
    Log(LogArgs),

    /// Remove logs for a specific hour today.
    Remove(RemoveArgs),

    /// Show your past logged activities.
    #[command(name = "showlog")]
    ShowLog,

    /// Tally your total logged time for today.
    Tally,

    /// Show stats: daily totals, averages, top activities, best day and progress graph.
    Stats(StatsArgs),

    /// Compare your last 7 days with another user.
    Vs(VsArgs),

    /// Import entries and timezones from a legacy userdata.json file.
    Import(ImportArgs),

    /// Attach your user ID to legacy entries logged under your display name.
    Claim,
}

impl Commands {
    /// Whether the command writes to the store.
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::SetTimezone(_) | Self::Log(_) | Self::Remove(_) | Self::Import(_) | Self::Claim
        )
    }
}
