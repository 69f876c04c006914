//! Local calendar helpers.
//!
//! Timestamps are stored in UTC; days, weeks and clock times are always
//! interpreted in the local timezone.

use chrono::{DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

/// Returns the local calendar day of a timestamp.
pub fn local_day(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Returns the local wall-clock time of a timestamp.
pub fn local_time(ts: DateTime<Utc>) -> NaiveTime {
    ts.with_timezone(&Local).time()
}

/// Converts a local date at midnight to UTC.
pub fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    local_to_utc(date.and_time(NaiveTime::MIN))
}

/// Converts a local date and wall-clock time to UTC.
pub fn local_at(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    local_to_utc(date.and_time(time))
}

/// Ambiguous times (DST fall-back) resolve to the earlier instant; times in a
/// spring-forward gap move one hour ahead.
fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let shifted = naive + chrono::Duration::hours(1);
            Local
                .from_local_datetime(&shifted)
                .earliest()
                .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
        }
    }
}
