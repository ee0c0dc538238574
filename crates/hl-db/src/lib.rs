//! Storage layer for hourlog.
//!
//! Provides whole-snapshot persistence for activity entries and timezone
//! preferences using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Instants are stored as TEXT in RFC 3339 format with a `Z` suffix
//! (e.g., `2025-06-10T18:00:00Z`), keeping whatever sub-second precision the
//! value carries so a save/load cycle is lossless. Local dates are stored as
//! `YYYY-MM-DD`.
//!
//! ## Entry Order
//!
//! `entries.seq` records insertion order. Saving rewrites the table, so `seq`
//! is always dense and starts at 1.

mod legacy;

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use hl_core::{
    ActivityEntry, ActivityLabel, HOUR_CAPACITY_MINUTES, Snapshot, SnapshotStore, UserId,
};
use rusqlite::{Connection, params};
use thiserror::Error;

pub use legacy::{parse_legacy, read_legacy_file};

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored instant.
    #[error("invalid timestamp in entry {row}: {timestamp}")]
    TimestampParse {
        row: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse a stored local date.
    #[error("invalid date in entry {row}: {date}")]
    DateParse {
        row: i64,
        date: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored zone name is not in the registry.
    #[error("invalid timezone for user {user_id}: {zone}")]
    InvalidZone { user_id: String, zone: String },
    /// A record is structurally valid but breaks a domain rule.
    #[error("invalid record {row}: {message}")]
    InvalidRecord { row: i64, message: String },
    /// Failed to read a legacy data file.
    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// A legacy data file is not valid JSON of the expected shape.
    #[error("invalid legacy data: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An entry row as stored, before domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EntryRow {
    seq: i64,
    user_id: Option<String>,
    display_name: String,
    instant_utc: String,
    local_date: String,
    minutes: i64,
    activity: String,
    logged_zone: Option<String>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Entries table: one row per logged activity
            -- instant_utc: RFC 3339 (e.g., '2025-06-10T18:00:00Z')
            -- local_date: owner's calendar date at logging time ('2025-06-10')
            -- user_id: NULL for records imported from the legacy data file
            CREATE TABLE IF NOT EXISTS entries (
                seq INTEGER PRIMARY KEY,
                user_id TEXT,
                display_name TEXT NOT NULL,
                instant_utc TEXT NOT NULL,
                local_date TEXT NOT NULL,
                minutes INTEGER NOT NULL CHECK (minutes BETWEEN 1 AND 60),
                activity TEXT NOT NULL,
                logged_zone TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_entries_user ON entries(user_id);
            CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(local_date);

            CREATE TABLE IF NOT EXISTS user_timezones (
                user_id TEXT PRIMARY KEY,
                zone TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    fn entry_rows(conn: &Connection) -> Result<Vec<EntryRow>, DbError> {
        let mut stmt = conn.prepare(
            "
            SELECT seq, user_id, display_name, instant_utc, local_date, minutes, activity, logged_zone
            FROM entries
            ORDER BY seq ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(EntryRow {
                seq: row.get(0)?,
                user_id: row.get(1)?,
                display_name: row.get(2)?,
                instant_utc: row.get(3)?,
                local_date: row.get(4)?,
                minutes: row.get(5)?,
                activity: row.get(6)?,
                logged_zone: row.get(7)?,
            })
        })?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?);
        }
        Ok(entries)
    }

    fn preference_rows(conn: &Connection) -> Result<Vec<(String, String)>, DbError> {
        let mut stmt = conn.prepare("SELECT user_id, zone FROM user_timezones ORDER BY user_id")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut preferences = Vec::new();
        for row in rows {
            preferences.push(row?);
        }
        Ok(preferences)
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl SnapshotStore for Database {
    type Error = DbError;

    /// Reads both tables inside one transaction so the snapshot is consistent.
    fn load(&self) -> Result<Snapshot, DbError> {
        let tx = self.conn.unchecked_transaction()?;
        let entry_rows = Self::entry_rows(&tx)?;
        let preference_rows = Self::preference_rows(&tx)?;
        tx.commit()?;

        let entries = entry_rows
            .into_iter()
            .map(entry_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let preferences = preference_rows
            .into_iter()
            .map(|(user_id, zone)| preference(user_id, &zone))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        tracing::debug!(
            entries = entries.len(),
            preferences = preferences.len(),
            "loaded snapshot from database"
        );
        Ok(Snapshot {
            entries,
            preferences,
        })
    }

    /// Replaces both tables with `snapshot` in a single transaction.
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), DbError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM entries", [])?;
        tx.execute("DELETE FROM user_timezones", [])?;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO entries
                (seq, user_id, display_name, instant_utc, local_date, minutes, activity, logged_zone)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for (seq, entry) in (1_i64..).zip(&snapshot.entries) {
                stmt.execute(params![
                    seq,
                    entry.user_id.as_ref().map(UserId::as_str),
                    entry.display_name,
                    format_timestamp(entry.instant),
                    entry.date.format("%Y-%m-%d").to_string(),
                    i64::from(entry.minutes),
                    entry.activity.as_str(),
                    entry.logged_zone,
                ])?;
            }

            let mut stmt =
                tx.prepare("INSERT INTO user_timezones (user_id, zone) VALUES (?, ?)")?;
            for (user_id, zone) in &snapshot.preferences {
                stmt.execute(params![user_id.as_str(), zone.name()])?;
            }
        }
        tx.commit()?;

        tracing::debug!(
            entries = snapshot.entries.len(),
            preferences = snapshot.preferences.len(),
            "saved snapshot to database"
        );
        Ok(())
    }
}

fn entry_from_row(row: EntryRow) -> Result<ActivityEntry, DbError> {
    let seq = row.seq;
    let invalid = |message: String| DbError::InvalidRecord { row: seq, message };

    let user_id = row
        .user_id
        .map(UserId::new)
        .transpose()
        .map_err(|err| invalid(err.to_string()))?;
    let minutes = u32::try_from(row.minutes)
        .ok()
        .filter(|m| (1..=HOUR_CAPACITY_MINUTES).contains(m))
        .ok_or_else(|| invalid(format!("minutes out of range: {}", row.minutes)))?;
    let activity = ActivityLabel::new(&row.activity).map_err(|err| invalid(err.to_string()))?;

    Ok(ActivityEntry {
        user_id,
        display_name: row.display_name,
        instant: parse_timestamp(&row.instant_utc, seq)?,
        date: parse_date(&row.local_date, seq)?,
        minutes,
        activity,
        logged_zone: row.logged_zone,
    })
}

fn parse_timestamp(timestamp: &str, row: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            row,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn parse_date(date: &str, row: i64) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|source| DbError::DateParse {
        row,
        date: date.to_string(),
        source,
    })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Validates a stored preference row.
fn preference(user_id: String, zone: &str) -> Result<(UserId, Tz), DbError> {
    let invalid = |user_id: &str| DbError::InvalidZone {
        user_id: user_id.to_string(),
        zone: zone.to_string(),
    };
    let tz = hl_core::zone::parse_zone(zone).map_err(|_| invalid(&user_id))?;
    let id = UserId::new(user_id).map_err(|_| invalid(""))?;
    Ok((id, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn entry(user_id: Option<&str>, instant: &str, date: &str, minutes: u32, activity: &str) -> ActivityEntry {
        ActivityEntry {
            user_id: user_id.map(|id| UserId::new(id).unwrap()),
            display_name: "alice".to_string(),
            instant: instant.parse().unwrap(),
            date: date.parse().unwrap(),
            minutes,
            activity: ActivityLabel::new(activity).unwrap(),
            logged_zone: user_id.map(|_| "America/New_York".to_string()),
        }
    }

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            entries: vec![
                entry(Some("1"), "2025-06-10T18:00:00Z", "2025-06-10", 30, "coding"),
                entry(None, "2025-06-09T03:00:00Z", "2025-06-08", 60, "reading"),
                entry(Some("1"), "2025-06-10T18:00:00.250Z", "2025-06-10", 15, "coding"),
            ],
            preferences: BTreeMap::from([
                (UserId::new("1").unwrap(), chrono_tz::Asia::Seoul),
                (UserId::new("2").unwrap(), chrono_tz::UTC),
            ]),
        }
    }

    #[test]
    fn open_in_memory_database() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn schema_matches_data_model() {
        let db = Database::open_in_memory().expect("open in-memory db");

        assert_eq!(
            table_columns(&db.conn, "entries"),
            vec![
                "seq",
                "user_id",
                "display_name",
                "instant_utc",
                "local_date",
                "minutes",
                "activity",
                "logged_zone",
            ]
        );
        assert_eq!(
            table_columns(&db.conn, "user_timezones"),
            vec!["user_id", "zone"]
        );

        let indexes = index_names(&db.conn, "entries");
        let expected: HashSet<String> = ["idx_entries_user", "idx_entries_date"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(expected.is_subset(&indexes));
    }

    fn table_columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .expect("prepare table_info");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query table_info");
        rows.map(|row| row.expect("table_info row")).collect()
    }

    fn index_names(conn: &Connection, table: &str) -> HashSet<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA index_list({table})"))
            .expect("prepare index_list");
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .expect("query index_list");
        rows.map(|row| row.expect("index_list row")).collect()
    }

    #[test]
    fn empty_database_loads_empty_snapshot() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.load().unwrap(), Snapshot::default());
    }

    #[test]
    fn save_then_load_is_identity() {
        let mut db = Database::open_in_memory().unwrap();
        let snapshot = sample_snapshot();

        db.save(&snapshot).unwrap();
        let loaded = db.load().unwrap();
        assert_eq!(loaded, snapshot);

        // Saving what was loaded changes nothing.
        db.save(&loaded).unwrap();
        assert_eq!(db.load().unwrap(), snapshot);
    }

    #[test]
    fn save_replaces_previous_contents() {
        let mut db = Database::open_in_memory().unwrap();
        db.save(&sample_snapshot()).unwrap();

        let smaller = Snapshot {
            entries: vec![entry(Some("3"), "2025-01-01T00:00:00Z", "2024-12-31", 5, "tea")],
            preferences: BTreeMap::new(),
        };
        db.save(&smaller).unwrap();

        assert_eq!(db.load().unwrap(), smaller);
        assert_eq!(db.entry_count().unwrap(), 1);
    }

    #[test]
    fn snapshot_survives_reopen() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("hourlog.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.save(&sample_snapshot()).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.load().unwrap(), sample_snapshot());
    }

    #[test]
    fn timestamps_are_stored_as_utc_text() {
        let mut db = Database::open_in_memory().unwrap();
        db.save(&sample_snapshot()).unwrap();

        let stored: Vec<String> = {
            let mut stmt = db
                .conn
                .prepare("SELECT instant_utc FROM entries ORDER BY seq")
                .unwrap();
            stmt.query_map([], |row| row.get(0))
                .unwrap()
                .map(Result::unwrap)
                .collect()
        };
        assert_eq!(
            stored,
            [
                "2025-06-10T18:00:00Z",
                "2025-06-09T03:00:00Z",
                "2025-06-10T18:00:00.250Z"
            ]
        );
    }

    #[test]
    fn load_rejects_unknown_zone() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO user_timezones (user_id, zone) VALUES ('9', 'Atlantis/Capital')",
                [],
            )
            .unwrap();

        let err = db.load().unwrap_err();
        assert!(matches!(err, DbError::InvalidZone { .. }));
    }

    #[test]
    fn load_rejects_malformed_timestamp() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO entries (seq, user_id, display_name, instant_utc, local_date, minutes, activity)
                 VALUES (1, '1', 'alice', 'yesterday', '2025-06-10', 10, 'x')",
                [],
            )
            .unwrap();

        let err = db.load().unwrap_err();
        assert!(err.to_string().contains("invalid timestamp in entry 1"));
    }

    #[test]
    fn schema_rejects_minutes_outside_one_hour() {
        let db = Database::open_in_memory().unwrap();
        let insert = |minutes: i64| {
            db.conn.execute(
                "INSERT INTO entries (seq, user_id, display_name, instant_utc, local_date, minutes, activity)
                 VALUES (?1, '1', 'alice', '2025-06-10T18:00:00Z', '2025-06-10', ?1, 'x')",
                [minutes],
            )
        };
        assert!(insert(0).is_err());
        assert!(insert(61).is_err());
        assert!(insert(4_000_000_000).is_err());
        assert!(insert(60).is_ok());
        assert!(insert(1).is_ok());
    }

    #[test]
    fn entry_rows_with_oversized_minutes_are_rejected() {
        let row = EntryRow {
            seq: 3,
            user_id: Some("1".to_string()),
            display_name: "alice".to_string(),
            instant_utc: "2025-06-10T18:00:00Z".to_string(),
            local_date: "2025-06-10".to_string(),
            minutes: 61,
            activity: "x".to_string(),
            logged_zone: None,
        };
        let err = entry_from_row(row.clone()).unwrap_err();
        assert!(matches!(err, DbError::InvalidRecord { row: 3, .. }));

        let row = EntryRow { minutes: 60, ..row };
        assert_eq!(entry_from_row(row).unwrap().minutes, 60);
    }
}
