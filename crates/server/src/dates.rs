use chrono::{NaiveDate, Utc};
use thiserror::Error;

/// A date-shaped value that is not a real calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid date.")]
pub struct InvalidDate;

/// Finds the first `YYYY-MM-DD` shaped window in `input`. Purely syntactic;
/// the window may still be calendar-invalid (e.g. `2023-02-31`).
fn date_window(input: &str) -> Option<&str> {
    let bytes = input.as_bytes();
    for start in 0..bytes.len().saturating_sub(9) {
        let w = &bytes[start..start + 10];
        if w[0..4].iter().all(|b| b.is_ascii_digit())
            && w[4] == b'-'
            && w[5..7].iter().all(|b| b.is_ascii_digit())
            && w[7] == b'-'
            && w[8..10].iter().all(|b| b.is_ascii_digit())
        {
            // The window starts and ends on ascii bytes so the slice can't
            // split a codepoint
            return Some(&input[start..start + 10]);
        }
    }
    None
}

/// Resolves the date field of a new exercise. A `YYYY-MM-DD` shaped window
/// anywhere in the input wins and must be a valid calendar date; a missing
/// or shapeless input falls back to today (UTC).
pub fn resolve_date(input: Option<&str>) -> Result<NaiveDate, InvalidDate> {
    match input.and_then(date_window) {
        Some(window) => NaiveDate::parse_from_str(window, "%Y-%m-%d").map_err(|_| InvalidDate),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Strict `YYYY-MM-DD` parse for the log range bounds; callers ignore
/// anything unparseable rather than failing the request
pub fn parse_bound(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}
