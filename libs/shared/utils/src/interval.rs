//! Interval intersection rules used by every scheduling component.

use chrono::{NaiveDate, NaiveTime, Timelike};

/// Half-open interval intersection: `[a_start, a_end)` and `[b_start, b_end)`
/// conflict iff `a_start < b_end && b_start < a_end`. Touching endpoints
/// (one range ends at 10:00, the other starts at 10:00) are not a conflict.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Common comparison unit for time-of-day values.
pub fn minutes_since_midnight(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Inclusive calendar-date ranges (unavailability windows block every date
/// in `[start, end]`), so touching endpoints do conflict here.
pub fn date_ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

pub fn range_contains_date(start: NaiveDate, end: NaiveDate, date: NaiveDate) -> bool {
    start <= date && date <= end
}
