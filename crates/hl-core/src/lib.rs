//! Core domain logic for hourlog.
//!
//! This crate contains the fundamental types and logic for:
//! - Hour buckets: converting "2 PM" into a UTC instant in the user's zone and
//!   capping every local hour at 60 logged minutes
//! - Statistics: daily totals, rolling averages, rankings and head-to-heads
//! - Persistence contract: whole-snapshot load/save behind [`SnapshotStore`]

pub mod clock;
pub mod compare;
pub mod entry;
mod error;
pub mod format;
pub mod log;
pub mod snapshot;
pub mod stats;
mod tracker;
pub mod types;
pub mod zone;

pub use clock::{Clock, FixedClock, SystemClock};
pub use compare::{ComparisonBars, compare};
pub use entry::{ActivityEntry, UserRef};
pub use error::TrackerError;
pub use format::format_duration;
pub use log::{EntryLog, HOUR_CAPACITY_MINUTES, MergeOutcome};
pub use snapshot::{MemoryStore, Snapshot, SnapshotStore};
pub use stats::{ActivityTotal, DailyTotal, Last7Series, RollingWindow, StatsAggregator};
pub use tracker::{
    Contender, HeadToHead, ImportSummary, LogLine, LoggedActivity, Tally, Tracker, UserStats,
};
pub use types::{ActivityLabel, HourSlot, Meridiem, UserId, ValidationError};
pub use zone::{DEFAULT_TIMEZONE, TimeZoneResolver};
