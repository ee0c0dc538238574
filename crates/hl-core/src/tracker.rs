//! The tracker: owned state plus the operations exposed to the command layer.
//!
//! # Mutation model
//!
//! Every mutating operation stages its change on a copy of the log and the
//! timezone map, saves that copy through the [`SnapshotStore`], and only then
//! swaps it in. A failed save leaves the tracker exactly as it was.
//!
//! Mutations take `&mut self`, so within one process the validate-then-append
//! sequence cannot interleave. Share a tracker across threads behind a `Mutex`.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::clock::Clock;
use crate::compare::{ComparisonBars, compare_series};
use crate::entry::{ActivityEntry, UserRef};
use crate::error::TrackerError;
use crate::log::EntryLog;
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::stats::{
    ActivityTotal, DailyTotal, Last7Series, RollingWindow, StatsAggregator, TOP_ACTIVITY_COUNT,
    TOP_ACTIVITY_WINDOW_DAYS,
};
use crate::types::{ActivityLabel, HourSlot, UserId, validate_minutes};
use crate::zone::{TimeZoneResolver, project};

/// Result of a successful log request.
#[derive(Debug, Clone)]
pub struct LoggedActivity {
    pub entry: ActivityEntry,
    pub slot: HourSlot,
    /// Start of the logged hour in the user's zone.
    pub local: DateTime<Tz>,
    /// Bucket total including this entry.
    pub bucket_minutes: u32,
}

/// One line of a user's log, projected into their current zone.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub local: DateTime<Tz>,
    pub minutes: u32,
    pub activity: ActivityLabel,
}

/// Today's per-activity totals.
#[derive(Debug, Clone, Serialize)]
pub struct Tally {
    pub date: NaiveDate,
    pub total_minutes: u32,
    pub activities: Vec<ActivityTotal>,
}

/// The stats view for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub today: NaiveDate,
    pub today_minutes: u32,
    pub avg_7: f64,
    pub avg_30: f64,
    pub last_7: Last7Series,
    pub top_activities: Vec<ActivityTotal>,
    pub best_day: Option<DailyTotal>,
}

/// One side of a head-to-head.
#[derive(Debug, Clone, Serialize)]
pub struct Contender {
    pub user_id: UserId,
    pub display_name: String,
    pub today: NaiveDate,
    pub today_minutes: u32,
    pub week_minutes: u32,
    pub avg_7: f64,
    pub last_7: Last7Series,
}

/// Two users' last seven days on a shared scale.
#[derive(Debug, Clone, Serialize)]
pub struct HeadToHead {
    pub first: Contender,
    pub second: Contender,
    pub bars: ComparisonBars,
}

/// Counts from merging an imported snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Entries added to the log.
    pub entries: usize,
    /// Entries already present, skipped.
    pub duplicates: usize,
    /// Entries refused for bad minutes or a full hour.
    pub rejected: usize,
    pub preferences: usize,
}

/// Owns the entry log and timezone preferences, and persists them.
pub struct Tracker<S, C> {
    store: S,
    clock: C,
    log: EntryLog,
    zones: TimeZoneResolver,
}

impl<S: SnapshotStore, C: Clock> Tracker<S, C> {
    /// Loads the current snapshot from `store`.
    pub fn open(store: S, clock: C, default_zone: Tz) -> Result<Self, TrackerError> {
        let snapshot = store.load().map_err(TrackerError::persistence)?;
        tracing::debug!(
            entries = snapshot.entries.len(),
            preferences = snapshot.preferences.len(),
            "loaded snapshot"
        );
        Ok(Self {
            store,
            clock,
            log: EntryLog::new(snapshot.entries),
            zones: TimeZoneResolver::with_preferences(snapshot.preferences, default_zone),
        })
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        self.log.entries()
    }

    pub const fn zones(&self) -> &TimeZoneResolver {
        &self.zones
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The current instant in the user's zone.
    pub fn now_for(&self, user: &UserId) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.zones.resolve(user))
    }

    /// The user's current zone and the date it is there right now.
    pub fn today_for(&self, user: &UserId) -> (Tz, NaiveDate) {
        let now = self.now_for(user);
        (now.timezone(), now.date_naive())
    }

    /// Entries belonging to `user`, ready for aggregation.
    pub fn history<'a>(&'a self, user: &'a UserRef) -> StatsAggregator<'a> {
        StatsAggregator::new(self.log.for_user(user))
    }

    fn commit(&mut self, log: EntryLog, zones: TimeZoneResolver) -> Result<(), TrackerError> {
        let snapshot = Snapshot {
            entries: log.entries().to_vec(),
            preferences: zones.preferences().clone(),
        };
        self.store
            .save(&snapshot)
            .map_err(TrackerError::persistence)?;
        self.log = log;
        self.zones = zones;
        Ok(())
    }

    /// Validates and stores the user's timezone preference.
    pub fn set_timezone(&mut self, user: &UserRef, zone_name: &str) -> Result<Tz, TrackerError> {
        let mut zones = self.zones.clone();
        let previous = zones.resolve(&user.id);
        let zone = zones.set(&user.id, zone_name)?;

        if previous != zone {
            let existing = self.log.for_user(user).count();
            if existing > 0 {
                tracing::warn!(
                    user = %user.id,
                    from = previous.name(),
                    to = zone.name(),
                    existing,
                    "timezone change reclassifies existing entries into new local hours"
                );
            }
        }

        self.commit(self.log.clone(), zones)?;
        tracing::info!(user = %user.id, zone = zone.name(), "timezone set");
        Ok(zone)
    }

    /// Logs `minutes` of `activity` in `slot` of the user's current day.
    pub fn log_activity(
        &mut self,
        user: &UserRef,
        slot: HourSlot,
        minutes: i64,
        activity: &str,
    ) -> Result<LoggedActivity, TrackerError> {
        let minutes = validate_minutes(minutes)?;
        let activity = ActivityLabel::new(activity)?;
        let (zone, today) = self.today_for(&user.id);

        let mut log = self.log.clone();
        let entry = log
            .append(user, zone, today, slot, minutes, activity)?
            .clone();
        let (date, hour) = project(entry.instant, zone);
        let bucket_minutes = log.minutes_in_bucket(user, zone, date, hour);
        self.commit(log, self.zones.clone())?;

        tracing::info!(
            user = %user.id,
            %slot,
            minutes,
            activity = %entry.activity,
            bucket_minutes,
            "logged activity"
        );
        Ok(LoggedActivity {
            local: entry.instant.with_timezone(&zone),
            entry,
            slot,
            bucket_minutes,
        })
    }

    /// Removes today's entries in `slot`. Returns how many were removed.
    ///
    /// Nothing is written when no entry matches.
    pub fn remove_hour(&mut self, user: &UserRef, slot: HourSlot) -> Result<usize, TrackerError> {
        let (zone, today) = self.today_for(&user.id);

        let mut log = self.log.clone();
        let removed = log.remove_hour(user, zone, today, slot);
        if removed == 0 {
            tracing::debug!(user = %user.id, %slot, "no entries to remove");
            return Ok(0);
        }

        self.commit(log, self.zones.clone())?;
        tracing::info!(user = %user.id, %slot, removed, "removed entries");
        Ok(removed)
    }

    /// All of the user's entries, oldest first, in their current zone.
    pub fn show_log(&self, user: &UserRef) -> Result<Vec<LogLine>, TrackerError> {
        let zone = self.zones.resolve(&user.id);
        let mut entries: Vec<_> = self.log.for_user(user).collect();
        if entries.is_empty() {
            return Err(TrackerError::NoDataFound);
        }
        entries.sort_by_key(|entry| entry.instant);

        Ok(entries
            .into_iter()
            .map(|entry| LogLine {
                local: entry.instant.with_timezone(&zone),
                minutes: entry.minutes,
                activity: entry.activity.clone(),
            })
            .collect())
    }

    /// Per-activity totals for the user's current day.
    pub fn tally(&self, user: &UserRef) -> Result<Tally, TrackerError> {
        let (_, today) = self.today_for(&user.id);
        let activities = self.history(user).activities_on(today);
        if activities.is_empty() {
            return Err(TrackerError::NoDataFound);
        }

        Ok(Tally {
            date: today,
            total_minutes: activities.iter().map(|a| a.minutes).sum(),
            activities,
        })
    }

    pub fn stats(&self, user: &UserRef) -> Result<UserStats, TrackerError> {
        let history = self.history(user);
        if history.is_empty() {
            return Err(TrackerError::NoDataFound);
        }
        let (_, today) = self.today_for(&user.id);

        Ok(UserStats {
            today,
            today_minutes: history.day_total(today),
            avg_7: history.rolling_average(today, RollingWindow::Week),
            avg_30: history.rolling_average(today, RollingWindow::Month),
            last_7: history.last_7(today),
            top_activities: history.top_activities(
                today,
                TOP_ACTIVITY_WINDOW_DAYS,
                TOP_ACTIVITY_COUNT,
            ),
            best_day: history.best_day(),
        })
    }

    fn contender(&self, user: &UserRef) -> Contender {
        let history = self.history(user);
        let (_, today) = self.today_for(&user.id);
        let last_7 = history.last_7(today);
        Contender {
            user_id: user.id.clone(),
            display_name: user.display_name.clone(),
            today,
            today_minutes: history.day_total(today),
            week_minutes: last_7.total(),
            avg_7: history.rolling_average(today, RollingWindow::Week),
            last_7,
        }
    }

    /// Compares two users' last seven days.
    ///
    /// Reports [`TrackerError::NoDataFound`] when neither logged anything in
    /// that window.
    pub fn head_to_head(&self, first: &UserRef, second: &UserRef) -> Result<HeadToHead, TrackerError> {
        let first = self.contender(first);
        let second = self.contender(second);
        let bars = compare_series(&first.last_7, &second.last_7);
        if first.last_7.is_all_zero() && second.last_7.is_all_zero() {
            return Err(TrackerError::NoDataFound);
        }
        Ok(HeadToHead {
            first,
            second,
            bars,
        })
    }

    /// Gives the user's legacy name-matched entries their stable id.
    pub fn claim_legacy(&mut self, user: &UserRef) -> Result<usize, TrackerError> {
        let mut log = self.log.clone();
        let claimed = log.claim_legacy(user);
        if claimed == 0 {
            return Ok(0);
        }
        self.commit(log, self.zones.clone())?;
        tracing::info!(user = %user.id, claimed, "claimed legacy entries");
        Ok(claimed)
    }

    /// Merges an external snapshot. Preferences overwrite existing ones and
    /// are applied first, so entries are bucketed through the merged zones.
    ///
    /// Entries go through the same hour cap as [`log_activity`](Self::log_activity);
    /// repeats of stored entries are skipped, which makes re-importing a file
    /// harmless.
    pub fn import(&mut self, snapshot: Snapshot) -> Result<ImportSummary, TrackerError> {
        let mut preferences = self.zones.preferences().clone();
        let imported_preferences = snapshot.preferences.len();
        preferences.extend(snapshot.preferences);
        let zones = TimeZoneResolver::with_preferences(preferences, self.zones.default_zone());

        let mut log = self.log.clone();
        let outcome = log.merge(snapshot.entries, &zones);

        self.commit(log, zones)?;
        tracing::info!(
            entries = outcome.added,
            duplicates = outcome.duplicates,
            rejected = outcome.rejected,
            preferences = imported_preferences,
            "imported snapshot"
        );
        Ok(ImportSummary {
            entries: outcome.added,
            duplicates: outcome.duplicates,
            rejected: outcome.rejected,
            preferences: imported_preferences,
        })
    }
}
