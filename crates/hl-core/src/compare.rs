//! Head-to-head scaling of two weekly series.

use serde::Serialize;

use crate::stats::Last7Series;

/// Longest bar a day can get.
pub const BAR_SCALE: u32 = 10;

/// Both users' days scaled against a shared maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparisonBars {
    /// The shared maximum, never below 1.
    pub scale: u32,
    pub first: [u32; 7],
    pub second: [u32; 7],
}

/// Scales two series to 0..=10 against their combined maximum.
///
/// The maximum is floored at 1, so two empty weeks yield all-zero bars.
pub fn compare(first: &[u32; 7], second: &[u32; 7]) -> ComparisonBars {
    let scale = first
        .iter()
        .chain(second)
        .copied()
        .max()
        .unwrap_or(0)
        .max(1);
    ComparisonBars {
        scale,
        first: first.map(|m| bar_length(m, scale)),
        second: second.map(|m| bar_length(m, scale)),
    }
}

/// Compares two [`Last7Series`] day by day.
pub fn compare_series(first: &Last7Series, second: &Last7Series) -> ComparisonBars {
    compare(&first.minutes, &second.minutes)
}

/// `floor(minutes / max * 10)`, computed in integers.
pub fn bar_length(minutes: u32, max: u32) -> u32 {
    let max = max.max(1);
    let scaled = u64::from(minutes) * u64::from(BAR_SCALE) / u64::from(max);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}
