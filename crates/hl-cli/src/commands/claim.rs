//! `hl claim`: move legacy name-matched entries onto the user's stable ID.

use std::io::Write;

use anyhow::Result;
use hl_core::{Clock, SnapshotStore, Tracker, UserRef};

use super::logs_noun;

pub fn run<W: Write, S: SnapshotStore, C: Clock>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    user: &UserRef,
) -> Result<()> {
    let claimed = tracker.claim_legacy(user)?;
    if claimed == 0 {
        writeln!(writer, "No unclaimed logs found for {}.", user.display_name)?;
    } else {
        writeln!(
            writer,
            "Claimed {claimed} {} for {} ({}).",
            logs_noun(claimed),
            user.display_name,
            user.id
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use hl_core::{ActivityEntry, ActivityLabel, Snapshot};
    use insta::assert_snapshot;

    use crate::commands::test_support::{alice, render, tracker};

    fn legacy(name: &str) -> ActivityEntry {
        ActivityEntry {
            user_id: None,
            display_name: name.to_string(),
            instant: "2025-06-10T13:00:00Z".parse().unwrap(),
            date: "2025-06-10".parse().unwrap(),
            minutes: 15,
            activity: ActivityLabel::new("coding").unwrap(),
            logged_zone: None,
        }
    }

    #[test]
    fn claims_only_matching_names() {
        let mut tracker = tracker();
        tracker
            .import(Snapshot {
                entries: vec![legacy("alice"), legacy("alice"), legacy("carol")],
                ..Snapshot::default()
            })
            .unwrap();

        let output = render(|w| run(w, &mut tracker, &alice()));
        assert_snapshot!(output.trim_end(), @"Claimed 2 logs for alice (1).");

        let claimed = tracker
            .entries()
            .iter()
            .filter(|e| e.user_id.as_ref() == Some(&alice().id))
            .count();
        assert_eq!(claimed, 2);

        let output = render(|w| run(w, &mut tracker, &alice()));
        assert_snapshot!(output.trim_end(), @"No unclaimed logs found for alice.");
    }
}
