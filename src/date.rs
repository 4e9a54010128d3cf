//! Best-effort parsing of the raw date text kept on [`crate::Channel`] and
//! [`crate::Item`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

// tried after RFC 2822 and RFC 3339, zone-less values are taken as GMT
const LOOSE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",
    "%a, %d %b %Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses an RFC-822 style date such as `Tue, 10 Jun 2003 04:00:00 GMT`.
///
/// `None` when nothing matches; decoding never depends on this.
pub fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .or_else(|| parse_loose(raw))
}

fn parse_loose(raw: &str) -> Option<DateTime<FixedOffset>> {
    let naive = raw
        .strip_suffix("UTC")
        .or_else(|| raw.strip_suffix("GMT"))
        .unwrap_or(raw)
        .trim_end();
    let gmt = FixedOffset::east_opt(0)?;
    LOOSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(naive, fmt).ok())
        .map(|dt| gmt.from_utc_datetime(&dt))
}
