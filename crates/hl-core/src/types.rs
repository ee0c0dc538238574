//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for request inputs.
///
/// All of these are detected at the request boundary, before any entry is
/// read or written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The 12-hour clock value was outside 1..=12.
    #[error("hour must be between 1 and 12, got {value}")]
    InvalidHour { value: i64 },

    /// The meridiem was neither AM nor PM.
    #[error("expected AM or PM, got {value:?}")]
    InvalidAmPm { value: String },

    /// The duration was zero or negative.
    #[error("minutes must be a positive number, got {value}")]
    NegativeMinutes { value: i64 },

    /// The timezone name is not in the IANA registry.
    #[error("unknown timezone: {name}")]
    InvalidTimezone { name: String },
}

/// Morning or afternoon half of a 12-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Display form, as typed by users.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Meridiem {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Self::Am),
            "PM" => Ok(Self::Pm),
            _ => Err(ValidationError::InvalidAmPm {
                value: s.to_string(),
            }),
        }
    }
}

/// A validated 12-hour clock reading such as "2 PM".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourSlot {
    hour12: u8,
    meridiem: Meridiem,
}

impl HourSlot {
    /// Creates a slot from an already-parsed meridiem.
    pub fn new(hour12: i64, meridiem: Meridiem) -> Result<Self, ValidationError> {
        match u8::try_from(hour12) {
            Ok(hour @ 1..=12) => Ok(Self {
                hour12: hour,
                meridiem,
            }),
            _ => Err(ValidationError::InvalidHour { value: hour12 }),
        }
    }

    /// Parses raw user input. The meridiem is checked before the hour.
    pub fn parse(hour12: i64, meridiem: &str) -> Result<Self, ValidationError> {
        let meridiem = meridiem.parse()?;
        Self::new(hour12, meridiem)
    }

    /// Builds the slot that displays a 24-hour civil hour.
    ///
    /// Returns `None` for values above 23.
    pub fn from_civil_hour(hour: u32) -> Option<Self> {
        let meridiem = match hour {
            0..=11 => Meridiem::Am,
            12..=23 => Meridiem::Pm,
            _ => return None,
        };
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        Some(Self {
            hour12: u8::try_from(hour12).ok()?,
            meridiem,
        })
    }

    pub const fn hour12(self) -> u8 {
        self.hour12
    }

    pub const fn meridiem(self) -> Meridiem {
        self.meridiem
    }

    /// Converts to a 24-hour civil hour: 12 AM is 0, 12 PM is 12.
    pub const fn civil_hour(self) -> u32 {
        let hour = self.hour12 as u32;
        match (self.meridiem, hour) {
            (Meridiem::Am, 12) => 0,
            (Meridiem::Am, h) | (Meridiem::Pm, h @ 12) => h,
            (Meridiem::Pm, h) => h + 12,
        }
    }
}

impl fmt::Display for HourSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.hour12, self.meridiem)
    }
}

/// Checks a requested duration. Anything below one minute is rejected.
pub const fn validate_minutes(minutes: i64) -> Result<u32, ValidationError> {
    if minutes < 1 || minutes > u32::MAX as i64 {
        return Err(ValidationError::NegativeMinutes { value: minutes });
    }
    Ok(minutes as u32)
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A stable user identifier.
    ///
    /// Unlike display names, IDs never change for a given user.
    UserId, "user ID"
);

/// A normalized activity label: trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActivityLabel(String);

impl ActivityLabel {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let label = raw.trim().to_lowercase();
        if label.is_empty() {
            return Err(ValidationError::Empty { field: "activity" });
        }
        Ok(Self(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ActivityLabel {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<ActivityLabel> for String {
    fn from(label: ActivityLabel) -> Self {
        label.0
    }
}

impl fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
