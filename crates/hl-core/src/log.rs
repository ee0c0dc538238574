//! The bucket-validated entry log.
//!
//! Every entry belongs to a local hour bucket: the civil hour its instant
//! falls in when projected through the owner's current zone. The log refuses
//! any append that would take a bucket past [`HOUR_CAPACITY_MINUTES`].

use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::entry::{ActivityEntry, UserRef};
use crate::error::TrackerError;
use crate::types::{ActivityLabel, HourSlot};
use crate::zone::{TimeZoneResolver, localize, project};

/// Most minutes a single local hour can hold for one user.
pub const HOUR_CAPACITY_MINUTES: u32 = 60;

/// Append-only (modulo explicit removal) collection of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryLog {
    entries: Vec<ActivityEntry>,
}

impl EntryLog {
    pub const fn new(entries: Vec<ActivityEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ActivityEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries owned by `user`, in insertion order.
    pub fn for_user<'a>(
        &'a self,
        user: &'a UserRef,
    ) -> impl Iterator<Item = &'a ActivityEntry> + 'a {
        self.entries.iter().filter(move |entry| user.matches(entry))
    }

    /// Minutes already logged in the `(date, civil_hour)` bucket.
    pub fn minutes_in_bucket(
        &self,
        user: &UserRef,
        zone: Tz,
        date: NaiveDate,
        civil_hour: u32,
    ) -> u32 {
        self.for_user(user)
            .filter(|entry| project(entry.instant, zone) == (date, civil_hour))
            .map(|entry| entry.minutes)
            .sum()
    }

    /// Validates and appends an entry for `slot` on `today`.
    ///
    /// Nothing is mutated when the bucket would overflow.
    pub fn append(
        &mut self,
        user: &UserRef,
        zone: Tz,
        today: NaiveDate,
        slot: HourSlot,
        minutes: u32,
        activity: ActivityLabel,
    ) -> Result<&ActivityEntry, TrackerError> {
        let instant = localize(today, slot.civil_hour(), zone);
        // A spring-forward gap hour lands in the next civil hour, so the
        // bucket is wherever the instant actually falls.
        let (date, hour) = project(instant, zone);

        let existing = self.minutes_in_bucket(user, zone, date, hour);
        if existing.saturating_add(minutes) > HOUR_CAPACITY_MINUTES {
            return Err(TrackerError::HourCapacityExceeded {
                slot,
                existing,
                requested: minutes,
            });
        }

        self.entries.push(ActivityEntry {
            user_id: Some(user.id.clone()),
            display_name: user.display_name.clone(),
            instant,
            date,
            minutes,
            activity,
            logged_zone: Some(zone.name().to_string()),
        });
        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Removes the user's entries stored under `today` whose instant falls in
    /// the hour `slot` resolves to. Returns how many were removed.
    pub fn remove_hour(&mut self, user: &UserRef, zone: Tz, today: NaiveDate, slot: HourSlot) -> usize {
        let (_, civil_hour) = project(localize(today, slot.civil_hour(), zone), zone);
        let before = self.entries.len();
        self.entries.retain(|entry| {
            let in_bucket = user.matches(entry)
                && entry.date == today
                && project(entry.instant, zone).1 == civil_hour;
            !in_bucket
        });
        before - self.entries.len()
    }

    /// Stamps the stable id onto entries matched only by legacy display name.
    pub fn claim_legacy(&mut self, user: &UserRef) -> usize {
        let mut claimed = 0;
        for entry in &mut self.entries {
            if user.matches_legacy_name(entry) {
                entry.user_id = Some(user.id.clone());
                claimed += 1;
            }
        }
        claimed
    }

    /// Merges foreign entries under the same rules as [`append`](Self::append).
    ///
    /// Each entry is bucketed through its owner's zone in `zones`; entries
    /// without a stable id use the default zone. Exact repeats of an entry
    /// already present are skipped, as are entries with minutes outside
    /// `1..=60` or that would overflow their bucket.
    pub fn merge(
        &mut self,
        entries: impl IntoIterator<Item = ActivityEntry>,
        zones: &TimeZoneResolver,
    ) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        for entry in entries {
            if self.entries.iter().any(|existing| is_repeat(existing, &entry)) {
                outcome.duplicates += 1;
                continue;
            }
            if !(1..=HOUR_CAPACITY_MINUTES).contains(&entry.minutes) {
                tracing::warn!(
                    user = %entry.display_name,
                    minutes = entry.minutes,
                    "rejecting entry with out-of-range minutes"
                );
                outcome.rejected += 1;
                continue;
            }

            let zone = entry
                .user_id
                .as_ref()
                .map_or_else(|| zones.default_zone(), |id| zones.resolve(id));
            let bucket = project(entry.instant, zone);
            let existing: u32 = self
                .entries
                .iter()
                .filter(|other| {
                    same_owner(other, &entry) && project(other.instant, zone) == bucket
                })
                .map(|other| other.minutes)
                .sum();
            if existing.saturating_add(entry.minutes) > HOUR_CAPACITY_MINUTES {
                tracing::warn!(
                    user = %entry.display_name,
                    date = %bucket.0,
                    hour = bucket.1,
                    existing,
                    requested = entry.minutes,
                    "rejecting entry that would overflow its hour"
                );
                outcome.rejected += 1;
                continue;
            }

            self.entries.push(entry);
            outcome.added += 1;
        }
        outcome
    }
}

/// What [`EntryLog::merge`] did with each incoming entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub added: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// Whether two entries belong to the same person.
///
/// Mirrors [`UserRef::matches`]: ids decide when both carry one, otherwise
/// the display name does.
fn same_owner(a: &ActivityEntry, b: &ActivityEntry) -> bool {
    match (&a.user_id, &b.user_id) {
        (Some(x), Some(y)) => x == y,
        _ => a.display_name == b.display_name,
    }
}

fn is_repeat(existing: &ActivityEntry, incoming: &ActivityEntry) -> bool {
    same_owner(existing, incoming)
        && existing.instant == incoming.instant
        && existing.minutes == incoming.minutes
        && existing.activity == incoming.activity
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::{Meridiem, UserId};

    const NEW_YORK: Tz = chrono_tz::America::New_York;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn alice() -> UserRef {
        UserRef::new(UserId::new("1").unwrap(), "alice")
    }

    fn bob() -> UserRef {
        UserRef::new(UserId::new("2").unwrap(), "bob")
    }

    fn slot(hour: i64, meridiem: Meridiem) -> HourSlot {
        HourSlot::new(hour, meridiem).unwrap()
    }

    fn label(name: &str) -> ActivityLabel {
        ActivityLabel::new(name).unwrap()
    }

    #[test]
    fn fills_hour_to_capacity_then_rejects() {
        let mut log = EntryLog::default();
        let two_pm = slot(2, Meridiem::Pm);

        log.append(&alice(), NEW_YORK, today(), two_pm, 30, label("coding"))
            .unwrap();
        log.append(&alice(), NEW_YORK, today(), two_pm, 30, label("coding"))
            .unwrap();
        assert_eq!(log.minutes_in_bucket(&alice(), NEW_YORK, today(), 14), 60);

        let err = log
            .append(&alice(), NEW_YORK, today(), two_pm, 1, label("coding"))
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::HourCapacityExceeded {
                existing: 60,
                requested: 1,
                ..
            }
        ));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn single_entry_over_capacity_is_rejected() {
        let mut log = EntryLog::default();
        let err = log
            .append(&alice(), NEW_YORK, today(), slot(9, Meridiem::Am), 61, label("run"))
            .unwrap_err();
        assert!(matches!(err, TrackerError::HourCapacityExceeded { .. }));
        assert!(log.is_empty());
    }

    #[test]
    fn buckets_are_per_user_and_per_hour() {
        let mut log = EntryLog::default();
        let noon = slot(12, Meridiem::Pm);
        let midnight = slot(12, Meridiem::Am);

        log.append(&alice(), NEW_YORK, today(), noon, 60, label("lunch"))
            .unwrap();
        log.append(&bob(), NEW_YORK, today(), noon, 60, label("lunch"))
            .unwrap();
        log.append(&alice(), NEW_YORK, today(), midnight, 60, label("sleep"))
            .unwrap();

        assert_eq!(log.minutes_in_bucket(&alice(), NEW_YORK, today(), 12), 60);
        assert_eq!(log.minutes_in_bucket(&alice(), NEW_YORK, today(), 0), 60);
        assert_eq!(log.minutes_in_bucket(&bob(), NEW_YORK, today(), 0), 0);
    }

    #[test]
    fn appended_entry_carries_utc_instant_and_local_date() {
        let mut log = EntryLog::default();
        let entry = log
            .append(&alice(), NEW_YORK, today(), slot(2, Meridiem::Pm), 30, label(" Coding "))
            .unwrap();

        assert_eq!(entry.instant.to_rfc3339(), "2025-06-10T18:00:00+00:00");
        assert_eq!(entry.date, today());
        assert_eq!(entry.activity.as_str(), "coding");
        assert_eq!(entry.user_id, Some(UserId::new("1").unwrap()));
        assert_eq!(entry.logged_zone.as_deref(), Some("America/New_York"));
    }

    #[test]
    fn bucket_is_reprojected_through_current_zone() {
        let mut log = EntryLog::default();
        log.append(&alice(), NEW_YORK, today(), slot(2, Meridiem::Pm), 60, label("coding"))
            .unwrap();

        // 18:00 UTC is 15:00 in Sao Paulo, so the 2 PM bucket there is empty.
        let sao_paulo = chrono_tz::America::Sao_Paulo;
        assert_eq!(log.minutes_in_bucket(&alice(), sao_paulo, today(), 14), 0);
        assert_eq!(log.minutes_in_bucket(&alice(), sao_paulo, today(), 15), 60);
    }

    #[test]
    fn remove_hour_drops_only_matching_bucket() {
        let mut log = EntryLog::default();
        log.append(&alice(), NEW_YORK, today(), slot(2, Meridiem::Pm), 20, label("a"))
            .unwrap();
        log.append(&alice(), NEW_YORK, today(), slot(2, Meridiem::Pm), 20, label("b"))
            .unwrap();
        log.append(&alice(), NEW_YORK, today(), slot(3, Meridiem::Pm), 20, label("c"))
            .unwrap();
        log.append(&bob(), NEW_YORK, today(), slot(2, Meridiem::Pm), 20, label("d"))
            .unwrap();

        let removed = log.remove_hour(&alice(), NEW_YORK, today(), slot(2, Meridiem::Pm));
        assert_eq!(removed, 2);
        let left: Vec<_> = log.entries().iter().map(|e| e.activity.as_str()).collect();
        assert_eq!(left, ["c", "d"]);
    }

    #[test]
    fn remove_hour_without_matches_leaves_log_unchanged() {
        let mut log = EntryLog::default();
        log.append(&alice(), NEW_YORK, today(), slot(2, Meridiem::Pm), 20, label("a"))
            .unwrap();
        let before = log.clone();

        assert_eq!(
            log.remove_hour(&alice(), NEW_YORK, today(), slot(4, Meridiem::Am)),
            0
        );
        assert_eq!(log, before);
    }

    #[test]
    fn remove_hour_ignores_other_days() {
        let mut log = EntryLog::default();
        let yesterday = today().pred_opt().unwrap();
        log.append(&alice(), NEW_YORK, yesterday, slot(2, Meridiem::Pm), 20, label("a"))
            .unwrap();

        assert_eq!(
            log.remove_hour(&alice(), NEW_YORK, today(), slot(2, Meridiem::Pm)),
            0
        );
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn legacy_entries_count_toward_capacity_and_can_be_claimed() {
        let mut log = EntryLog::default();
        let legacy = ActivityEntry {
            user_id: None,
            display_name: "alice".to_string(),
            instant: localize(today(), 14, NEW_YORK),
            date: today(),
            minutes: 45,
            activity: label("reading"),
            logged_zone: None,
        };
        let outcome = log.merge([legacy], &TimeZoneResolver::new(NEW_YORK));
        assert_eq!(outcome.added, 1);

        let err = log
            .append(&alice(), NEW_YORK, today(), slot(2, Meridiem::Pm), 20, label("coding"))
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::HourCapacityExceeded { existing: 45, .. }
        ));

        assert_eq!(log.claim_legacy(&alice()), 1);
        assert_eq!(log.claim_legacy(&alice()), 0);
        assert_eq!(log.entries()[0].user_id, Some(UserId::new("1").unwrap()));
    }

    fn legacy(minutes: u32, hour: u32) -> ActivityEntry {
        ActivityEntry {
            user_id: None,
            display_name: "alice".to_string(),
            instant: localize(today(), hour, NEW_YORK),
            date: today(),
            minutes,
            activity: label("reading"),
            logged_zone: None,
        }
    }

    #[test]
    fn merge_skips_exact_repeats() {
        let mut log = EntryLog::default();
        let zones = TimeZoneResolver::new(NEW_YORK);

        let first = log.merge([legacy(45, 14)], &zones);
        assert_eq!(first.added, 1);
        let second = log.merge([legacy(45, 14)], &zones);
        assert_eq!(
            second,
            MergeOutcome {
                added: 0,
                duplicates: 1,
                rejected: 0
            }
        );
        assert_eq!(log.minutes_in_bucket(&alice(), NEW_YORK, today(), 14), 45);
    }

    #[test]
    fn merge_repeat_detection_survives_claim() {
        let mut log = EntryLog::default();
        let zones = TimeZoneResolver::new(NEW_YORK);
        log.merge([legacy(45, 14)], &zones);
        log.claim_legacy(&alice());

        let outcome = log.merge([legacy(45, 14)], &zones);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn merge_enforces_hour_capacity() {
        let mut log = EntryLog::default();
        log.append(&alice(), NEW_YORK, today(), slot(2, Meridiem::Pm), 30, label("coding"))
            .unwrap();

        let mut overflow = legacy(40, 14);
        overflow.activity = label("chess");
        let outcome = log.merge([legacy(30, 15), overflow], &TimeZoneResolver::new(NEW_YORK));

        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.rejected, 1);
        assert_eq!(log.minutes_in_bucket(&alice(), NEW_YORK, today(), 14), 30);
    }

    #[test]
    fn merge_rejects_out_of_range_minutes() {
        let mut log = EntryLog::default();
        let zones = TimeZoneResolver::new(NEW_YORK);
        let outcome = log.merge(
            [legacy(0, 9), legacy(61, 10), legacy(4_000_000_000, 11)],
            &zones,
        );

        assert_eq!(outcome.rejected, 3);
        assert!(log.is_empty());
    }

    #[test]
    fn merge_buckets_through_owner_zone() {
        let mut log = EntryLog::default();
        let mut zones = TimeZoneResolver::new(NEW_YORK);
        zones.set(&alice().id, "Asia/Kolkata").unwrap();

        let owned = |instant: &str| ActivityEntry {
            user_id: Some(alice().id),
            display_name: "alice".to_string(),
            instant: instant.parse().unwrap(),
            date: today(),
            minutes: 40,
            activity: label("go"),
            logged_zone: None,
        };
        // 05:40Z and 06:20Z are different New York hours but both 11 AM in Kolkata.
        let outcome = log.merge(
            [owned("2025-06-10T05:40:00Z"), owned("2025-06-10T06:20:00Z")],
            &zones,
        );
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.rejected, 1);
    }
}
