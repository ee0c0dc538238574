//! Timezone resolution and civil-time conversion.

use std::collections::BTreeMap;

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::types::{UserId, ValidationError};

/// Zone used for users who never set one.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Parses an IANA zone identifier.
///
/// Matching is exact, as in the registry: `"utc"` is rejected where `"UTC"` is
/// accepted.
pub fn parse_zone(name: &str) -> Result<Tz, ValidationError> {
    name.parse::<Tz>()
        .ok()
        .filter(|tz| tz.name() == name)
        .ok_or_else(|| ValidationError::InvalidTimezone {
            name: name.to_string(),
        })
}

pub fn is_valid_zone(name: &str) -> bool {
    parse_zone(name).is_ok()
}

/// Converts a local date and civil hour (minute zero) to a UTC instant.
///
/// Ambiguous readings (DST fall-back) take the standard-time offset, which is
/// the later instant. Readings inside a spring-forward gap use the offset in
/// force just before the gap.
pub fn localize(date: NaiveDate, civil_hour: u32, zone: Tz) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(civil_hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let naive = date.and_time(time);
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(_, dt) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let before_gap = naive - Duration::hours(1);
            let offset = match zone.from_local_datetime(&before_gap) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(_, dt) => dt.offset().fix(),
                LocalResult::None => zone.offset_from_utc_datetime(&naive).fix(),
            };
            let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            utc.and_utc()
        }
    }
}

/// Projects a UTC instant into a zone, returning the local date and civil hour.
pub fn project(instant: DateTime<Utc>, zone: Tz) -> (NaiveDate, u32) {
    let local = instant.with_timezone(&zone);
    (local.date_naive(), local.hour())
}

/// Per-user timezone preferences with a fallback zone.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeZoneResolver {
    preferences: BTreeMap<UserId, Tz>,
    default_zone: Tz,
}

impl Default for TimeZoneResolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl TimeZoneResolver {
    pub const fn new(default_zone: Tz) -> Self {
        Self {
            preferences: BTreeMap::new(),
            default_zone,
        }
    }

    /// Builds a resolver over previously persisted preferences.
    pub const fn with_preferences(preferences: BTreeMap<UserId, Tz>, default_zone: Tz) -> Self {
        Self {
            preferences,
            default_zone,
        }
    }

    /// Returns the user's zone, or the default when none is stored.
    pub fn resolve(&self, user: &UserId) -> Tz {
        self.preferences
            .get(user)
            .copied()
            .unwrap_or(self.default_zone)
    }

    /// Returns the stored preference only.
    pub fn preference(&self, user: &UserId) -> Option<Tz> {
        self.preferences.get(user).copied()
    }

    /// Validates and overwrites the user's preference.
    pub fn set(&mut self, user: &UserId, zone_name: &str) -> Result<Tz, ValidationError> {
        let zone = parse_zone(zone_name)?;
        self.preferences.insert(user.clone(), zone);
        Ok(zone)
    }

    pub const fn default_zone(&self) -> Tz {
        self.default_zone
    }

    pub const fn preferences(&self) -> &BTreeMap<UserId, Tz> {
        &self.preferences
    }

    pub fn into_preferences(self) -> BTreeMap<UserId, Tz> {
        self.preferences
    }
}
