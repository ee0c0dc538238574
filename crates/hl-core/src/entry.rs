//! Logged activity entries and user matching.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ActivityLabel, UserId};

/// One logged burst of activity.
///
/// Entries are immutable once appended; removal drops whole entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Stable identifier of the owner. Absent on records imported from the
    /// name-keyed legacy data file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Owner's display name at logging time.
    pub display_name: String,
    /// Start of the logged hour, in UTC.
    pub instant: DateTime<Utc>,
    /// Local calendar date at logging time.
    pub date: NaiveDate,
    pub minutes: u32,
    pub activity: ActivityLabel,
    /// Zone the entry was logged under. Informational only; bucketing always
    /// uses the owner's current zone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_zone: Option<String>,
}

/// The identity a request is made under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserRef {
    pub id: UserId,
    pub display_name: String,
}

impl UserRef {
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Whether `entry` belongs to this user.
    ///
    /// Two clauses: the stable id matches, or the entry predates stable ids
    /// and carries this user's display name.
    pub fn matches(&self, entry: &ActivityEntry) -> bool {
        self.matches_id(entry) || self.matches_legacy_name(entry)
    }

    pub fn matches_id(&self, entry: &ActivityEntry) -> bool {
        entry.user_id.as_ref() == Some(&self.id)
    }

    pub fn matches_legacy_name(&self, entry: &ActivityEntry) -> bool {
        entry.user_id.is_none() && entry.display_name == self.display_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: Option<&str>, name: &str) -> ActivityEntry {
        ActivityEntry {
            user_id: user_id.map(|id| UserId::new(id).unwrap()),
            display_name: name.to_string(),
            instant: "2025-03-01T19:00:00Z".parse().unwrap(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            minutes: 30,
            activity: ActivityLabel::new("reading").unwrap(),
            logged_zone: None,
        }
    }

    #[test]
    fn matches_by_stable_id_regardless_of_name() {
        let user = UserRef::new(UserId::new("7").unwrap(), "alice");
        assert!(user.matches(&entry(Some("7"), "old-alice")));
        assert!(!user.matches(&entry(Some("8"), "alice")));
    }

    #[test]
    fn matches_legacy_entries_by_name() {
        let user = UserRef::new(UserId::new("7").unwrap(), "alice");
        let legacy = entry(None, "alice");
        assert!(user.matches(&legacy));
        assert!(user.matches_legacy_name(&legacy));
        assert!(!user.matches_id(&legacy));
        assert!(!user.matches(&entry(None, "bob")));
    }

    #[test]
    fn entry_serde_omits_missing_optionals() {
        let json = serde_json::to_value(entry(None, "alice")).unwrap();
        assert!(json.get("user_id").is_none());
        assert!(json.get("logged_zone").is_none());
        assert_eq!(json["date"], "2025-03-01");
        assert_eq!(json["activity"], "reading");
    }
}
