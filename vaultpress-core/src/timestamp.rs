//! Local wall-clock timestamps used for sync bookkeeping.
//!
//! The `publish_sync_at` frontmatter field is written as
//! `YYYY-MM-DD HH:mm:ss` in local time and read back by the next sync run,
//! so formatting and parsing here must stay exact inverses.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Timelike};
use std::time::SystemTime;

const SYNC_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a local date-time as `YYYY-MM-DD HH:mm:ss` (zero padded).
pub fn format_local_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(SYNC_FORMAT).to_string()
}

/// Current local time truncated to whole seconds.
pub fn now_local() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

/// Convert a filesystem timestamp to local wall-clock time, truncated to
/// whole seconds so it compares cleanly against a recorded sync timestamp.
pub fn system_time_to_local(time: SystemTime) -> NaiveDateTime {
    let local: DateTime<Local> = time.into();
    truncate_to_seconds(local.naive_local())
}

/// Parse a recorded sync timestamp field by field.
///
/// The value is split on `-`, space and `:`; the first six fields must be
/// integers forming a valid calendar date and time.
pub fn parse_sync_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let fields = raw
        .trim()
        .split(['-', ' ', ':'])
        .take(6)
        .map(|part| part.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    let [year, month, day, hour, minute, second] = fields.as_slice() else {
        return None;
    };

    NaiveDate::from_ymd_opt(i32::try_from(*year).ok()?, *month, *day)?
        .and_hms_opt(*hour, *minute, *second)
}

fn truncate_to_seconds(datetime: NaiveDateTime) -> NaiveDateTime {
    datetime.with_nanosecond(0).unwrap_or(datetime)
}
