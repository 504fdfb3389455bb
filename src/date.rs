use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::InvalidPeriodPolicy;
use crate::ir::{Instant, TimelineItem};

const RANGE_PAD_FRACTION: i64 = 10;
const ZERO_SPAN_PAD_DAYS: i64 = 30;

static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(monday|tuesday|wednesday|thursday|friday|saturday|sunday|mon|tues|tue|wed|thurs|thur|thu|fri|sat|sun)\.?,?\s+",
    )
    .unwrap()
});
static ORDINAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").unwrap());
static AT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+at\s+").unwrap());
static AM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d)\s*a\.?m\.?(\s|$)").unwrap());
static PM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d)\s*p\.?m\.?(\s|$)").unwrap());
static BARE_HOUR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)(\d{1,2}) (AM|PM)").unwrap());
static SPACES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());
static YEAR_MONTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").unwrap());
static MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{3,9})\.? (\d{4})$").unwrap());
static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d{9,13}$").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%b %d %Y %I:%M %p",
    "%b %d %Y %I:%M:%S %p",
    "%b %d %Y %H:%M",
    "%b %d %Y %H:%M:%S",
    "%B %d %Y %I:%M %p",
    "%B %d %Y %I:%M:%S %p",
    "%B %d %Y %H:%M",
    "%d %b %Y %I:%M %p",
    "%d %b %Y %H:%M",
    "%d %B %Y %I:%M %p",
    "%d %B %Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%Y %b %d",
];

/// Current wall-clock instant, used wherever a date is missing or unusable.
pub fn now() -> Instant {
    Local::now().naive_local()
}

/// Parses a human-written date, falling back to the current instant.
///
/// A bad date must never abort the layout of a whole timeline, so failures
/// are only reported through the log.
pub fn parse_instant(input: &str) -> Instant {
    match try_parse_instant(input) {
        Some(instant) => instant,
        None => {
            log::warn!("unparseable date {input:?}, substituting the current time");
            now()
        }
    }
}

pub fn try_parse_instant(input: &str) -> Option<Instant> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(parsed.with_timezone(&Local).naive_local());
    }
    if TIMESTAMP_RE.is_match(trimmed) {
        return parse_timestamp(trimmed);
    }

    let normalized = normalize(trimmed);
    // Partial dates go first: chrono's format lists would read "March 2025"
    // as a day and a two-digit year.
    if YEAR_RE.is_match(&normalized) {
        let year: i32 = normalized.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0);
    }
    if let Some(caps) = YEAR_MONTH_RE.captures(&normalized) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0);
    }
    if let Some(caps) = MONTH_YEAR_RE.captures(&normalized) {
        let candidate = format!("1 {} {}", &caps[1], &caps[2]);
        for fmt in ["%d %b %Y", "%d %B %Y"] {
            if let Ok(parsed) = NaiveDate::parse_from_str(&candidate, fmt) {
                return parsed.and_hms_opt(0, 0, 0);
            }
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(&normalized, fmt) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn normalize(input: &str) -> String {
    let text = WEEKDAY_RE.replace(input, "");
    let text = ORDINAL_RE.replace_all(&text, "$1");
    let text = AT_RE.replace_all(&text, " ");
    let text = text.replace(',', " ");
    let text = AM_RE.replace_all(&text, "$1 AM$2");
    let text = PM_RE.replace_all(&text, "$1 PM$2");
    let text = SPACES_RE.replace_all(text.trim(), " ");
    BARE_HOUR_RE
        .replace_all(&text, "${1}${2}:00 ${3}")
        .into_owned()
}

fn parse_timestamp(digits: &str) -> Option<Instant> {
    let value: i64 = digits.parse().ok()?;
    // 12+ digits only make sense as milliseconds.
    let millis = if digits.trim_start_matches('-').len() >= 12 {
        value
    } else {
        value.checked_mul(1000)?
    };
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.naive_local())
}

pub fn to_millis(instant: Instant) -> i64 {
    instant.and_utc().timestamp_millis()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub min: Instant,
    pub max: Instant,
}

/// Padded domain covering every instant the items occupy. Inverted periods
/// contribute the endpoints `policy` resolves them to.
pub fn range_of(items: &[TimelineItem], policy: InvalidPeriodPolicy) -> DateRange {
    range_of_at(items, policy, now())
}

/// Like [`range_of`] with an explicit "now" for the empty case.
pub fn range_of_at(
    items: &[TimelineItem],
    policy: InvalidPeriodPolicy,
    now: Instant,
) -> DateRange {
    let mut bounds: Option<(Instant, Instant)> = None;
    for instant in items.iter().flat_map(|item| item.instants(policy)) {
        bounds = Some(match bounds {
            Some((min, max)) => (min.min(instant), max.max(instant)),
            None => (instant, instant),
        });
    }
    let Some((min, max)) = bounds else {
        return DateRange { min: now, max: now };
    };

    let span = to_millis(max) - to_millis(min);
    let pad = if span == 0 {
        Duration::days(ZERO_SPAN_PAD_DAYS)
    } else {
        Duration::milliseconds(span / RANGE_PAD_FRACTION)
    };
    DateRange {
        min: min - pad,
        max: max + pad,
    }
}
