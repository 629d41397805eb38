//! HTTP date formatting and lenient parsing.

use std::time::SystemTime;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

// RFC 850 layout with a four-digit year, which some servers still send.
static RFC850_LONG_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:mon|tues|wednes|thurs|fri|satur|sun)day, (\d\d)-(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)-(\d{4}) (\d\d):(\d\d):(\d\d) GMT$",
    )
    .expect("RFC 850 date regex is valid")
});

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Format as an IMF-fixdate, e.g. `Wed, 21 Oct 2015 07:28:00 GMT`.
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Parse any of the HTTP date layouts.
///
/// Accepts IMF-fixdate, RFC 850 with a two-digit year and asctime. An RFC 850
/// date carrying a four-digit year is accepted too, with a warning.
pub fn parse_http_date(value: &str) -> Result<SystemTime> {
    let trimmed = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(dt.with_timezone(&Utc).into());
    }
    for layout in ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, layout) {
            return Ok(Utc.from_utc_datetime(&naive).into());
        }
    }

    match parse_long_year_rfc850(trimmed) {
        Some(time) => {
            tracing::warn!(date = value, "non-standard HTTP date, read as RFC 850 with a four-digit year");
            Ok(time)
        }
        None => Err(Error::InvalidDate(value.to_string())),
    }
}

fn parse_long_year_rfc850(value: &str) -> Option<SystemTime> {
    let caps = RFC850_LONG_YEAR.captures(value)?;
    let month_name = caps[2].to_ascii_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
    let naive = NaiveDate::from_ymd_opt(caps[3].parse().ok()?, month, caps[1].parse().ok()?)?
        .and_hms_opt(
            caps[4].parse().ok()?,
            caps[5].parse().ok()?,
            caps[6].parse().ok()?,
        )?;
    Some(Utc.from_utc_datetime(&naive).into())
}
