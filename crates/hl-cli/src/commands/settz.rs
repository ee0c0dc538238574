//! `hl settz`: store the user's timezone preference.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use hl_core::{Clock, SnapshotStore, Tracker, TrackerError, UserRef, ValidationError};

const ZONE_HINT: &str = "\
Valid examples include:
- America/New_York
- America/Los_Angeles
- Europe/London
- Asia/Seoul
- Asia/Tokyo
- UTC
Full list: https://en.wikipedia.org/wiki/List_of_tz_database_time_zones";

#[derive(Debug, Args)]
pub struct SetTimezoneArgs {
    /// IANA timezone name, e.g. `Asia/Seoul`.
    pub zone: String,
}

pub fn run<W: Write, S: SnapshotStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    user: &UserRef,
    args: &SetTimezoneArgs,
) -> Result<()> {
    let zone = match tracker.set_timezone(user, &args.zone) {
        Ok(zone) => zone,
        Err(err @ TrackerError::Invalid(ValidationError::InvalidTimezone { .. })) => {
            writeln!(writer, "{ZONE_HINT}")?;
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    writeln!(
        writer,
        "Timezone set to {} for {}",
        zone.name(),
        user.display_name
    )?;
    Ok(())
}
