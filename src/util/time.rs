//! Calendar-day helpers in the restaurant's reference timezone.
//!
//! Persisted instants are UTC; every "which day is this?" question is answered
//! by converting a local calendar date into a half-open UTC window here.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::error::{AppError, AppResult};

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Longest span searched past a skipped wall-clock time.
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Local wall-clock time to a UTC instant.
///
/// Ambiguous times (DST fall-back) resolve to the first occurrence. A time
/// skipped by a DST jump resolves to the first valid instant after the gap.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    (0..=MAX_GAP_MINUTES)
        .map(|minutes| naive + Duration::minutes(minutes))
        .find_map(|candidate| candidate.and_local_timezone(tz).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// `[local midnight, next local midnight)` for `date`, as UTC instants.
///
/// Callers compare with `>= start && < end`.
pub fn day_window(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let next_day = date.succ_opt().unwrap_or(date);
    (
        local_to_utc(date.and_time(chrono::NaiveTime::MIN), tz),
        local_to_utc(next_day.and_time(chrono::NaiveTime::MIN), tz),
    )
}

/// Calendar date of `instant` in `tz`.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}
