//! `Date:` header parsing against a fixed list of accepted layouts.
//!
//! The layouts are tried in order and the first match wins:
//!
//! 1. `Mon, 2 Jan 2006 15:04:05 -0700`
//! 2. `Mon, 2 Jan 2006 15:04:05 -0700 (MST)`
//! 3. `Mon, 2 Jan 2006 15:04:05 MST`
//!
//! Anything else (ISO 8601, missing weekday, malformed zone names) is an error.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use tracing::warn;

use crate::error::{ExtractError, Result};

/// Date and time portion shared by every layout, after the weekday prefix.
const DATETIME_FORMAT: &str = "%d %b %Y %H:%M:%S";

/// Same, followed by a numeric `±hhmm` offset.
const DATETIME_OFFSET_FORMAT: &str = "%d %b %Y %H:%M:%S %z";

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// One accepted `Date:` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// `Mon, 2 Jan 2006 15:04:05 -0700`
    NumericOffset,
    /// `Mon, 2 Jan 2006 15:04:05 -0700 (MST)`
    NumericOffsetWithZoneComment,
    /// `Mon, 2 Jan 2006 15:04:05 MST`
    ZoneName,
}

/// Layouts in the order they are tried.
pub const ACCEPTED_LAYOUTS: [DateLayout; 3] = [
    DateLayout::NumericOffset,
    DateLayout::NumericOffsetWithZoneComment,
    DateLayout::ZoneName,
];

impl DateLayout {
    /// Parse `input` strictly according to this layout.
    pub fn parse(self, input: &str) -> std::result::Result<DateTime<FixedOffset>, String> {
        let rest = strip_weekday(input)?;
        match self {
            DateLayout::NumericOffset => parse_numeric_offset(rest),
            DateLayout::NumericOffsetWithZoneComment => {
                let inner = strip_zone_comment(rest)?;
                parse_numeric_offset(inner)
            }
            DateLayout::ZoneName => parse_zone_name(rest),
        }
    }
}

/// Parse a `Date:` header value, trying each accepted layout in order.
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    let mut last_reason = String::from("empty value");
    if !trimmed.is_empty() {
        for layout in ACCEPTED_LAYOUTS {
            match layout.parse(trimmed) {
                Ok(dt) => return Ok(dt),
                Err(reason) => last_reason = reason,
            }
        }
    }
    Err(ExtractError::InvalidDate {
        value: value.to_string(),
        reason: last_reason,
    })
}

/// Remove the `Mon, ` prefix. The weekday is not checked against the date.
fn strip_weekday(s: &str) -> std::result::Result<&str, String> {
    let (day, rest) = s
        .split_once(',')
        .ok_or_else(|| format!("missing weekday prefix in {s:?}"))?;
    if !WEEKDAYS.iter().any(|w| w.eq_ignore_ascii_case(day)) {
        return Err(format!("unknown weekday {day:?}"));
    }
    let rest = rest
        .strip_prefix(' ')
        .ok_or_else(|| "expected a space after the weekday".to_string())?;
    Ok(rest)
}

/// `2 Jan 2006 15:04:05 -0700 (MST)` → `2 Jan 2006 15:04:05 -0700`
fn strip_zone_comment(s: &str) -> std::result::Result<&str, String> {
    let without_close = s
        .strip_suffix(')')
        .ok_or_else(|| "missing parenthesized zone name".to_string())?;
    let (inner, zone) = without_close
        .rsplit_once(" (")
        .ok_or_else(|| "missing parenthesized zone name".to_string())?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-')
    {
        return Err(format!("invalid zone name {zone:?}"));
    }
    Ok(inner)
}

fn parse_numeric_offset(s: &str) -> std::result::Result<DateTime<FixedOffset>, String> {
    // chrono's %z also accepts "+07:00"; the layout only allows "+0700".
    let offset = s.rsplit(' ').next().unwrap_or_default();
    if offset.len() != 5 || !(offset.starts_with('+') || offset.starts_with('-')) {
        return Err(format!("expected a numeric zone offset, found {offset:?}"));
    }
    DateTime::parse_from_str(s, DATETIME_OFFSET_FORMAT).map_err(|e| e.to_string())
}

fn parse_zone_name(s: &str) -> std::result::Result<DateTime<FixedOffset>, String> {
    let (datetime, zone) = s
        .rsplit_once(' ')
        .ok_or_else(|| "missing zone name".to_string())?;
    if !is_zone_abbreviation(zone) {
        return Err(format!("invalid zone name {zone:?}"));
    }
    let seconds = zone_offset_seconds(zone).unwrap_or_else(|| {
        warn!(zone, "Unknown zone abbreviation, assuming UTC");
        0
    });
    let offset = FixedOffset::east_opt(seconds)
        .ok_or_else(|| format!("zone offset out of range for {zone:?}"))?;
    let naive = NaiveDateTime::parse_from_str(datetime, DATETIME_FORMAT).map_err(|e| e.to_string())?;
    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| format!("ambiguous local time {datetime:?}"))
}

/// Shape of a zone abbreviation: three upper-case letters, or four or five
/// ending in `T` (`NZST`, `AKDT`). `UTC` and `UT` are always accepted.
fn is_zone_abbreviation(name: &str) -> bool {
    if name == "UT" || name == "UTC" {
        return true;
    }
    if !name.bytes().all(|b| b.is_ascii_uppercase()) {
        return false;
    }
    match name.len() {
        3 => true,
        4 | 5 => name.ends_with('T'),
        _ => false,
    }
}

/// Offset east of UTC in seconds for well-known zone abbreviations.
fn zone_offset_seconds(name: &str) -> Option<i32> {
    let hours_minutes: (i32, i32) = match name {
        "UT" | "UTC" | "GMT" => (0, 0),
        "EST" => (-5, 0),
        "EDT" => (-4, 0),
        "CST" => (-6, 0),
        "CDT" => (-5, 0),
        "MST" => (-7, 0),
        "MDT" => (-6, 0),
        "PST" => (-8, 0),
        "PDT" => (-7, 0),
        "AKST" => (-9, 0),
        "AKDT" => (-8, 0),
        "HST" => (-10, 0),
        "WET" => (0, 0),
        "WEST" | "BST" | "CET" => (1, 0),
        "CEST" | "EET" => (2, 0),
        "EEST" | "MSK" => (3, 0),
        "IST" => (5, 30),
        "JST" | "KST" => (9, 0),
        "AEST" => (10, 0),
        "AEDT" => (11, 0),
        _ => return None,
    };
    let sign = if hours_minutes.0 < 0 { -1 } else { 1 };
    Some(hours_minutes.0 * 3600 + sign * hours_minutes.1 * 60)
}
