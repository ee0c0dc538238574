//! `hl showlog`: every entry the user has, oldest first.

use std::io::Write;

use anyhow::Result;
use hl_core::{Clock, SnapshotStore, Tracker, UserRef};

pub fn run<W: Write, S: SnapshotStore, C: Clock>(
    writer: &mut W,
    tracker: &Tracker<S, C>,
    user: &UserRef,
) -> Result<()> {
    let Some(lines) = super::or_no_data(writer, tracker.show_log(user), "No logs found.")? else {
        return Ok(());
    };

    let now = tracker.now_for(&user.id);
    writeln!(writer, "Logs for {} ({}):", user.display_name, now.format("%Z"))?;
    for line in lines {
        writeln!(
            writer,
            "{} - {} min of {}",
            line.local.format("%Y-%m-%d at %I:%M %p"),
            line.minutes,
            line.activity
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use hl_core::{HourSlot, Meridiem};
    use insta::assert_snapshot;

    use crate::commands::test_support::{alice, bob, render, tracker};

    #[test]
    fn lists_entries_in_time_order() {
        let mut tracker = tracker();
        let slot = |h, m| HourSlot::new(h, m).unwrap();
        tracker
            .log_activity(&alice(), slot(3, Meridiem::Pm), 15, "reading")
            .unwrap();
        tracker
            .log_activity(&alice(), slot(9, Meridiem::Am), 45, "coding")
            .unwrap();
        tracker
            .log_activity(&bob(), slot(9, Meridiem::Am), 45, "gaming")
            .unwrap();

        let output = render(|w| run(w, &tracker, &alice()));
        assert_snapshot!(output, @r"
        Logs for alice (EDT):
        2025-06-10 at 09:00 AM - 45 min of coding
        2025-06-10 at 03:00 PM - 15 min of reading
        ");
    }

    #[test]
    fn empty_log_is_a_message() {
        let tracker = tracker();
        let output = render(|w| run(w, &tracker, &alice()));
        assert_snapshot!(output.trim_end(), @"No logs found.");
    }
}
