//! Aggregations over one user's entries.
//!
//! Everything here groups by the stored `date` of each entry, never by
//! re-projecting its instant, so statistics stay stable when a user changes
//! timezone.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::entry::ActivityEntry;
use crate::types::ActivityLabel;

/// Trailing window used by rankings in the stats view.
pub const TOP_ACTIVITY_WINDOW_DAYS: u32 = 30;

/// Number of activities shown in rankings.
pub const TOP_ACTIVITY_COUNT: usize = 5;

/// Minutes spent on one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityTotal {
    pub activity: ActivityLabel,
    pub minutes: u32,
}

/// Minutes logged on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub minutes: u32,
}

/// Supported rolling-average windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingWindow {
    Week,
    Month,
}

impl RollingWindow {
    pub const fn days(self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
        }
    }
}

/// Seven daily totals ending at a given date, oldest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Last7Series {
    pub start: NaiveDate,
    pub minutes: [u32; 7],
}

impl Last7Series {
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(6)
    }

    /// Dates paired with their totals.
    pub fn days(&self) -> impl Iterator<Item = DailyTotal> + '_ {
        self.minutes
            .iter()
            .enumerate()
            .map(|(offset, &minutes)| DailyTotal {
                date: self.start + Duration::days(offset as i64),
                minutes,
            })
    }

    pub fn max(&self) -> u32 {
        self.minutes.iter().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> u32 {
        self.minutes.iter().sum()
    }

    pub fn is_all_zero(&self) -> bool {
        self.minutes.iter().all(|&m| m == 0)
    }
}

/// First date of an inclusive trailing window ending at `end`.
fn window_start(end: NaiveDate, days: u32) -> NaiveDate {
    end - Duration::days(i64::from(days.saturating_sub(1)))
}

/// Sums minutes per activity, keeping the order in which labels first appear.
fn group_by_activity<'a>(entries: impl Iterator<Item = &'a ActivityEntry>) -> Vec<ActivityTotal> {
    let mut totals: Vec<ActivityTotal> = Vec::new();
    let mut index: HashMap<&ActivityLabel, usize> = HashMap::new();
    for entry in entries {
        if let Some(&i) = index.get(&entry.activity) {
            totals[i].minutes += entry.minutes;
        } else {
            index.insert(&entry.activity, totals.len());
            totals.push(ActivityTotal {
                activity: entry.activity.clone(),
                minutes: entry.minutes,
            });
        }
    }
    totals
}

/// Derives totals, averages and rankings from one user's entries.
#[derive(Debug, Clone)]
pub struct StatsAggregator<'a> {
    entries: Vec<&'a ActivityEntry>,
    daily: BTreeMap<NaiveDate, u32>,
}

impl<'a> StatsAggregator<'a> {
    /// Builds an aggregator over entries already filtered to one user.
    pub fn new(entries: impl IntoIterator<Item = &'a ActivityEntry>) -> Self {
        let entries: Vec<_> = entries.into_iter().collect();
        let mut daily = BTreeMap::new();
        for entry in &entries {
            *daily.entry(entry.date).or_insert(0) += entry.minutes;
        }
        Self { entries, daily }
    }

    /// True when the user has never logged anything.
    ///
    /// This checks for entries, not for non-zero totals.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn daily_totals(&self) -> &BTreeMap<NaiveDate, u32> {
        &self.daily
    }

    pub fn day_total(&self, date: NaiveDate) -> u32 {
        self.daily.get(&date).copied().unwrap_or(0)
    }

    /// Average minutes per day over the window ending at `end`, inclusive.
    /// Days without entries count as zero.
    pub fn rolling_average(&self, end: NaiveDate, window: RollingWindow) -> f64 {
        let days = window.days();
        let start = window_start(end, days);
        let total: u32 = self.daily.range(start..=end).map(|(_, &m)| m).sum();
        f64::from(total) / f64::from(days)
    }

    pub fn last_7(&self, today: NaiveDate) -> Last7Series {
        let start = window_start(today, 7);
        let mut minutes = [0; 7];
        for (offset, slot) in minutes.iter_mut().enumerate() {
            *slot = self.day_total(start + Duration::days(offset as i64));
        }
        Last7Series { start, minutes }
    }

    /// Highest-total activities in the trailing window ending at `today`.
    ///
    /// Ties keep the order in which the labels first appear.
    pub fn top_activities(&self, today: NaiveDate, window_days: u32, top_n: usize) -> Vec<ActivityTotal> {
        let start = window_start(today, window_days);
        let in_window = self
            .entries
            .iter()
            .copied()
            .filter(|entry| (start..=today).contains(&entry.date));
        let mut totals = group_by_activity(in_window);
        totals.sort_by_key(|total| std::cmp::Reverse(total.minutes));
        totals.truncate(top_n);
        totals
    }

    /// Per-activity totals for one stored date, in first-seen order.
    pub fn activities_on(&self, date: NaiveDate) -> Vec<ActivityTotal> {
        group_by_activity(self.entries.iter().copied().filter(|entry| entry.date == date))
    }

    /// The date with the most minutes ever. Ties go to the earliest date.
    pub fn best_day(&self) -> Option<DailyTotal> {
        let mut best: Option<DailyTotal> = None;
        for (&date, &minutes) in &self.daily {
            if best.is_none_or(|b| minutes > b.minutes) {
                best = Some(DailyTotal { date, minutes });
            }
        }
        best
    }
}
