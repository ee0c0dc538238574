//! Shared duration and bar formatting.

/// Formats minutes as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m.
pub fn format_duration(total_minutes: i64) -> String {
    if total_minutes < 0 {
        return "0m".to_string();
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Formats a fractional per-day average, rounding half to even.
#[allow(clippy::cast_possible_truncation)]
pub fn format_average(minutes_per_day: f64) -> String {
    format_duration(minutes_per_day.round_ties_even() as i64)
}

/// A run of full blocks, one per unit.
pub fn block_bar(length: u32) -> String {
    "█".repeat(length as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_examples() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(60), "1h 0m");
        assert_eq!(format_duration(90), "1h 30m");
        assert_eq!(format_duration(1501), "25h 1m");
        assert_eq!(format_duration(-5), "0m");
    }

    #[test]
    fn format_average_rounds_half_to_even() {
        assert_eq!(format_average(20.5), "20m");
        assert_eq!(format_average(21.5), "22m");
        assert_eq!(format_average(59.6), "1h 0m");
    }

    #[test]
    fn block_bar_repeats() {
        assert_eq!(block_bar(0), "");
        assert_eq!(block_bar(3), "███");
    }
}
