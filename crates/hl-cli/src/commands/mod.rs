//! CLI command implementations.
//!
//! Every command takes the writer it renders into, the open tracker and the
//! acting user, so tests can drive them against an in-memory store.

pub mod claim;
pub mod import;
pub mod log;
pub mod remove;
pub mod settz;
pub mod showlog;
pub mod stats;
pub mod tally;
pub mod util;
pub mod vs;

use std::io::Write;

use hl_core::TrackerError;

/// Unwraps a query result, printing `message` instead when nothing was found.
///
/// An empty result is an answer, not a failure, so it never reaches `main`.
fn or_no_data<T, W: Write>(
    writer: &mut W,
    result: Result<T, TrackerError>,
    message: &str,
) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(TrackerError::NoDataFound) => {
            writeln!(writer, "{message}")?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// "log" or "logs".
const fn logs_noun(count: usize) -> &'static str {
    if count == 1 { "log" } else { "logs" }
}
