//! Importer for the name-keyed JSON data file written by the original bot.
//!
//! The file looks like:
//!
//! ```json
//! {
//!   "time_logs": [
//!     {"user": "alice", "datetime_utc": "2025-06-10T18:00:00+00:00",
//!      "date": "2025-06-10", "minutes": 30, "activity": "coding"}
//!   ],
//!   "user_timezones": {"1234": "Asia/Seoul"}
//! }
//! ```
//!
//! Entries there carry a display name but no stable user id, so they come
//! back with `user_id: None` and are matched by name until claimed.

use std::collections::BTreeMap;
use std::path::Path;

use hl_core::{ActivityEntry, ActivityLabel, HOUR_CAPACITY_MINUTES, Snapshot, UserId};
use serde::Deserialize;

use crate::{DbError, parse_date, parse_timestamp, preference};

#[derive(Debug, Deserialize)]
struct LegacyFile {
    #[serde(default)]
    time_logs: Vec<LegacyEntry>,
    #[serde(default)]
    user_timezones: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LegacyEntry {
    user: String,
    datetime_utc: String,
    date: String,
    minutes: i64,
    activity: String,
}

/// Parses legacy JSON into a snapshot.
///
/// Zero-minute entries, which the old format allowed, are dropped.
pub fn parse_legacy(json: &str) -> Result<Snapshot, DbError> {
    let file: LegacyFile = serde_json::from_str(json)?;

    let mut entries = Vec::with_capacity(file.time_logs.len());
    for (row, raw) in (1_i64..).zip(file.time_logs) {
        let invalid = |message: String| DbError::InvalidRecord { row, message };
        if raw.minutes == 0 {
            tracing::warn!(row, user = %raw.user, "skipping zero-minute legacy entry");
            continue;
        }
        let minutes = u32::try_from(raw.minutes)
            .ok()
            .filter(|&m| m <= HOUR_CAPACITY_MINUTES)
            .ok_or_else(|| invalid(format!("minutes out of range: {}", raw.minutes)))?;
        let activity = ActivityLabel::new(&raw.activity).map_err(|err| invalid(err.to_string()))?;

        entries.push(ActivityEntry {
            user_id: None,
            display_name: raw.user,
            instant: parse_timestamp(&raw.datetime_utc, row)?,
            date: parse_date(&raw.date, row)?,
            minutes,
            activity,
            logged_zone: None,
        });
    }

    let preferences = file
        .user_timezones
        .into_iter()
        .map(|(user_id, zone)| preference(user_id, &zone))
        .collect::<Result<BTreeMap<UserId, _>, _>>()?;

    Ok(Snapshot {
        entries,
        preferences,
    })
}

/// Reads and parses a legacy data file.
pub fn read_legacy_file(path: &Path) -> Result<Snapshot, DbError> {
    let json = std::fs::read_to_string(path).map_err(|source| DbError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_legacy(&json)
}
