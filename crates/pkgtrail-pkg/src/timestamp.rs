//! Free-form date/time parsing for manager-reported install times

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

/// Zoned formats, tried in order
const ZONED_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M %z",
    "%Y-%m-%dT%H:%M:%S%z",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

lazy_static! {
    static ref DATE_TIME_PREFIX: Regex =
        Regex::new(r"^(\d{4}-\d{2}-\d{2})[ T](\d{2}:\d{2}:\d{2})").expect("valid regex");
}

/// Parse a date/time fragment into seconds since the Unix epoch
///
/// Tries the zoned formats, then a bare date (local midnight), then falls
/// back to pulling a leading `YYYY-MM-DD HH:MM:SS` out of the text and
/// reading it as UTC. Returns `None` when nothing matches.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<i64> {
    let text = text.trim();
    let zoned = match text.strip_suffix('Z') {
        Some(rest) => format!("{rest}+0000"),
        None => text.to_string(),
    };

    for fmt in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&zoned, fmt) {
            return Some(dt.timestamp());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.timestamp());
    }

    let caps = DATE_TIME_PREFIX.captures(text)?;
    let naive = NaiveDateTime::parse_from_str(
        &format!("{} {}", &caps[1], &caps[2]),
        "%Y-%m-%d %H:%M:%S",
    )
    .ok()?;
    Some(Utc.from_utc_datetime(&naive).timestamp())
}
