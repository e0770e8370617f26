//! Date and time helpers for semi-structured listings
//!
//! Venue pages rarely agree on a format. These helpers cover the shapes seen
//! in practice: `7/3`, `Jul 3`, `Thursday, July 3rd`, `7pm`, `7:30 PM`,
//! `1 - 8pm`, and ISO-8601 values from structured data.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

static NUMERIC_DATE: OnceLock<Option<Regex>> = OnceLock::new();
static NAMED_DATE: OnceLock<Option<Regex>> = OnceLock::new();
static SINGLE_TIME: OnceLock<Option<Regex>> = OnceLock::new();
static TIME_RANGE: OnceLock<Option<Regex>> = OnceLock::new();

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Month number for an English month name or its abbreviation
pub fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.trim().to_ascii_lowercase();
    let prefix = lower.get(..3)?;
    let month = match prefix {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Picks the year for a month/day listed without one
///
/// Months earlier than the current month belong to next year; anything else
/// stays in the current year.
pub fn resolve_month_day(month: u32, day: u32, today: NaiveDate) -> Option<NaiveDate> {
    let year = if month < today.month() {
        today.year() + 1
    } else {
        today.year()
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses the first date found in free text
///
/// Accepts `YYYY-MM-DD`, `M/D/YYYY`, `M/D`, and `Month D[, YYYY]`.
pub fn parse_date_text(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(date) = text.get(..10).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()) {
        return Some(date);
    }

    let numeric = cached(&NUMERIC_DATE, r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}))?\b")?;
    if let Some(caps) = numeric.captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        return match caps.get(3) {
            Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day),
            None => resolve_month_day(month, day, today),
        };
    }

    let named = cached(
        &NAMED_DATE,
        r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s+(\d{4}))?",
    )?;
    let caps = named.captures(text)?;
    let month = month_from_name(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    match caps.get(3) {
        Some(year) => NaiveDate::from_ymd_opt(year.as_str().parse().ok()?, month, day),
        None => resolve_month_day(month, day, today),
    }
}

fn to_24h(hour: u32, minute: u32, period: Option<&str>) -> Option<NaiveTime> {
    let hour = match period.map(str::to_ascii_lowercase).as_deref() {
        Some("pm") if hour < 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parses a single clock time such as `7pm`, `7:30 PM`, or `19:30`
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let re = cached(&SINGLE_TIME, r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\.?|\b(\d{1,2}):(\d{2})\b")?;
    let caps = re.captures(text)?;

    if let Some(hour) = caps.get(1) {
        let hour: u32 = hour.as_str().parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let period = if caps[3].eq_ignore_ascii_case("p") { "pm" } else { "am" };
        return to_24h(hour, minute, Some(period));
    }

    let hour: u32 = caps.get(4)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(5)?.as_str().parse().ok()?;
    to_24h(hour, minute, None)
}

/// Parses a time range such as `1 - 8pm` or `12:30 — 9:00pm`
///
/// A trailing am/pm applies to both ends unless that would put the start
/// after the end (`11 - 2pm` is 11:00 to 14:00).
pub fn parse_time_range(text: &str) -> Option<(NaiveTime, NaiveTime)> {
    let re = cached(
        &TIME_RANGE,
        r"(?i)(\d{1,2})(?::(\d{2}))?\s*([ap]m)?\s*(?:-|–|—|to)\s*(\d{1,2})(?::(\d{2}))?\s*([ap]m)",
    )?;
    let caps = re.captures(text)?;

    let start_hour: u32 = caps[1].parse().ok()?;
    let start_min: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let end_hour: u32 = caps[4].parse().ok()?;
    let end_min: u32 = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let end_period = caps.get(6)?.as_str();

    let end = to_24h(end_hour, end_min, Some(end_period))?;
    let start = match caps.get(3) {
        Some(period) => to_24h(start_hour, start_min, Some(period.as_str()))?,
        None => {
            let shared = to_24h(start_hour, start_min, Some(end_period))?;
            if shared > end {
                to_24h(start_hour, start_min, Some("am"))?
            } else {
                shared
            }
        }
    };

    Some((start, end))
}

/// Parses an ISO-8601 value from structured data
///
/// Returns the calendar day and, when the value carries a time, the local
/// wall-clock time. Values with an explicit non-UTC offset keep their own
/// wall-clock time; UTC values are shifted into the reference zone.
pub fn parse_iso(text: &str, reference: FixedOffset) -> Option<(NaiveDate, Option<NaiveDateTime>)> {
    let text = text.trim();

    if let Ok(aware) = DateTime::parse_from_rfc3339(text) {
        let local = if aware.offset().local_minus_utc() == 0 {
            aware.with_timezone(&reference).naive_local()
        } else {
            aware.naive_local()
        };
        return Some((local.date(), Some(local)));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some((naive.date(), Some(naive)));
        }
    }

    // Offsets without a colon, e.g. 2025-11-04T19:00:00-0500
    if let Ok(aware) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
        let local = aware.naive_local();
        return Some((local.date(), Some(local)));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| (date, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn pacific() -> FixedOffset {
        FixedOffset::west_opt(8 * 3600).unwrap()
    }

    #[test]
    fn test_resolve_month_day_rolls_over() {
        let today = date(2025, 11, 2);
        assert_eq!(resolve_month_day(11, 4, today), Some(date(2025, 11, 4)));
        assert_eq!(resolve_month_day(12, 31, today), Some(date(2025, 12, 31)));
        assert_eq!(resolve_month_day(1, 3, today), Some(date(2026, 1, 3)));
        assert_eq!(resolve_month_day(2, 30, today), None);
    }

    #[test]
    fn test_parse_date_text_formats() {
        let today = date(2025, 7, 1);
        assert_eq!(parse_date_text("7/3", today), Some(date(2025, 7, 3)));
        assert_eq!(parse_date_text("Thursday, 7/3", today), Some(date(2025, 7, 3)));
        assert_eq!(parse_date_text("07/03/2026", today), Some(date(2026, 7, 3)));
        assert_eq!(parse_date_text("Jul 3", today), Some(date(2025, 7, 3)));
        assert_eq!(parse_date_text("Thursday, July 3rd", today), Some(date(2025, 7, 3)));
        assert_eq!(parse_date_text("Sept 14, 2025", today), Some(date(2025, 9, 14)));
        assert_eq!(parse_date_text("2025-07-04T19:00:00", today), Some(date(2025, 7, 4)));
        assert_eq!(parse_date_text("Mar 2", today), Some(date(2026, 3, 2)));
        assert_eq!(parse_date_text("no date here", today), None);
        assert_eq!(parse_date_text("", today), None);
    }

    #[test]
    fn test_month_from_name() {
        assert_eq!(month_from_name("January"), Some(1));
        assert_eq!(month_from_name("sept"), Some(9));
        assert_eq!(month_from_name("Dec"), Some(12));
        assert_eq!(month_from_name("Ju"), None);
        assert_eq!(month_from_name("Smarch"), None);
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("7pm"), Some(time(19, 0)));
        assert_eq!(parse_time("Show 7:30 PM"), Some(time(19, 30)));
        assert_eq!(parse_time("12am"), Some(time(0, 0)));
        assert_eq!(parse_time("12 p.m."), Some(time(12, 0)));
        assert_eq!(parse_time("19:45"), Some(time(19, 45)));
        assert_eq!(parse_time("doors soon"), None);
    }

    #[test]
    fn test_parse_time_range() {
        assert_eq!(parse_time_range("1 — 8pm"), Some((time(13, 0), time(20, 0))));
        assert_eq!(parse_time_range("12:30 - 9:00pm"), Some((time(12, 30), time(21, 0))));
        assert_eq!(parse_time_range("11 - 2pm"), Some((time(11, 0), time(14, 0))));
        assert_eq!(parse_time_range("11am to 3pm"), Some((time(11, 0), time(15, 0))));
        assert_eq!(parse_time_range("all day"), None);
    }

    #[test]
    fn test_parse_iso_variants() {
        let (day, at) = parse_iso("2025-11-04T19:30:00-05:00", pacific()).unwrap();
        assert_eq!(day, date(2025, 11, 4));
        assert_eq!(at, Some(date(2025, 11, 4).and_time(time(19, 30))));

        // UTC values move into the reference zone
        let (day, at) = parse_iso("2025-11-05T03:00:00Z", pacific()).unwrap();
        assert_eq!(day, date(2025, 11, 4));
        assert_eq!(at, Some(date(2025, 11, 4).and_time(time(19, 0))));

        let (day, at) = parse_iso("2025-11-04T20:00", pacific()).unwrap();
        assert_eq!(day, date(2025, 11, 4));
        assert_eq!(at.map(|t| t.time()), Some(time(20, 0)));

        assert_eq!(parse_iso("2025-11-04", pacific()), Some((date(2025, 11, 4), None)));
        assert_eq!(parse_iso("next tuesday", pacific()), None);
    }
}
