//! Tracker error taxonomy.

use thiserror::Error;

use crate::types::{HourSlot, ValidationError};

/// Errors returned by [`Tracker`](crate::Tracker) operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Request input failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Logging would push the local hour past 60 minutes.
    #[error(
        "total logged minutes in the hour {slot} would exceed 60 ({existing} already logged, {requested} requested)"
    )]
    HourCapacityExceeded {
        slot: HourSlot,
        existing: u32,
        requested: u32,
    },

    /// The query matched nothing. Not a system failure.
    #[error("no logs found")]
    NoDataFound,

    /// Loading or saving the snapshot failed. In-memory state is unchanged.
    #[error("persistence failed")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TrackerError {
    pub(crate) fn persistence<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence(Box::new(err))
    }

    /// Whether this is a user-input problem rather than a system failure.
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Invalid(_) | Self::HourCapacityExceeded { .. } | Self::NoDataFound
        )
    }
}
