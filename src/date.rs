//! Date Heuristic
//!
//! Scores raw text fragments for looking like a publication timestamp, and
//! parses them with a deliberately small layered strategy: the common native
//! calendar formats, then `D Month, YYYY - H:MM AM/PM`, then `D/M/YYYY H:MM`.
//! Anything else is not a date. Parse failure is the normal outcome for most
//! text and only lowers the score.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::dom::{self, Document, Element};

/// Small reward/penalty.
const MEDIUM: i64 = 50;
/// Large penalty.
const BIG: i64 = 100;
/// Texts shorter than this (in chars) are unlikely timestamps.
const MIN_DATE_LEN: usize = 15;

/// `5 March, 2024 - 3:15 PM`
#[allow(clippy::expect_used)]
static MONTH_NAME_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})\s+([A-Za-z]+),\s+(\d{4})\s+-\s+(\d{1,2}):(\d{2})\s+(AM|PM)")
        .expect("MONTH_NAME_FORMAT regex")
});

/// `05/03/2024 15:15`, day first
#[allow(clippy::expect_used)]
static DAY_FIRST_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{4}) (\d{1,2}):(\d{1,2})").expect("DAY_FIRST_FORMAT regex")
});

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Datetime formats tried by [`parse_native`] after RFC 3339 and RFC 2822.
const NATIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %H:%M",
];

/// Date-only formats tried by [`parse_native`], taken as midnight.
const NATIVE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",  // January 15, 2024
    "%b %d, %Y",  // Jan 15, 2024
    "%d %B %Y",   // 15 January 2024
    "%d %b %Y",   // 15 Jan 2024
];

/// Parse `text` as a local timestamp.
///
/// Native calendar formats first, then the two forum formats. Returns `None`
/// when nothing matches.
#[must_use]
pub fn parse(text: &str) -> Option<NaiveDateTime> {
    parse_native(text).or_else(|| parse_custom(text))
}

/// The standard calendar formats: RFC 3339, RFC 2822, ISO-like datetimes and a
/// few spelled-out date forms. Zoned inputs are converted to local time.
#[must_use]
pub fn parse_native(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for fmt in NATIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }

    for fmt in NATIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// The two forum-specific formats, searched anywhere in `text`.
///
/// In the month-name format only PM hours other than 12 are shifted by twelve;
/// `12:xx AM` stays at hour 12. Month names are matched case-sensitively.
/// Out-of-range fields roll over into the next unit: `31/02/2024` is the
/// 2nd of March and `13:15 PM` is 01:15 the next day.
#[must_use]
pub fn parse_custom(text: &str) -> Option<NaiveDateTime> {
    parse_month_name(text).or_else(|| parse_day_first(text))
}

fn parse_month_name(text: &str) -> Option<NaiveDateTime> {
    let caps = MONTH_NAME_FORMAT.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month = MONTHS.iter().position(|m| *m == &caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    let mut hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;

    if &caps[6] == "PM" && hour != 12 {
        hour += 12;
    }

    let month = u32::try_from(month).ok()? + 1;
    rolled_over(year, month, day, hour, minute)
}

fn parse_day_first(text: &str) -> Option<NaiveDateTime> {
    let caps = DAY_FIRST_FORMAT.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let hour: u32 = caps[4].parse().ok()?;
    let minute: u32 = caps[5].parse().ok()?;

    rolled_over(year, month, day, hour, minute)
}

/// Calendar fields to a timestamp, carrying overflow (and day or month 0)
/// into the neighbouring unit instead of rejecting it.
fn rolled_over(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<NaiveDateTime> {
    let months = i64::from(year) * 12 + i64::from(month) - 1;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12)).ok()? + 1;

    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::days(i64::from(day) - 1))?
        .checked_add_signed(Duration::hours(i64::from(hour)))?
        .checked_add_signed(Duration::minutes(i64::from(minute)))
}

/// Score `text` for being a publication date, relative to the current time.
#[must_use]
pub fn score(text: &str) -> i64 {
    score_at(text, Local::now().naive_local())
}

/// Score `text` for being a publication date, relative to `now`.
///
/// - length below 15 chars: -50, else +50
/// - parses to a past timestamp: +50; fails to parse or lies in the future: -100
/// - more digit chars than non-digit chars: +50, else -50
#[must_use]
pub fn score_at(text: &str, now: NaiveDateTime) -> i64 {
    let mut out = 0;
    let length = text.chars().count();

    if length < MIN_DATE_LEN {
        out -= MEDIUM;
    } else {
        out += MEDIUM;
    }

    match parse(text) {
        Some(date) if date < now => out += MEDIUM,
        _ => out -= BIG,
    }

    let digits = text.chars().filter(char::is_ascii_digit).count();
    if digits > length - digits {
        out += MEDIUM;
    } else {
        out -= MEDIUM;
    }

    out
}

/// Replay a persisted date path: parse the direct text of each node matching
/// `path` and return the first that parses.
///
/// A path matching nothing is tried as empty text, which never parses.
#[must_use]
pub fn extract_date(doc: &Document, path: &str) -> Option<NaiveDateTime> {
    let texts: Vec<String> = dom::select_all(doc, path)
        .iter()
        .map(Element::own_text)
        .collect();

    texts.iter().find_map(|text| parse(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_month_name_format() {
        assert_eq!(parse("5 March, 2024 - 3:15 PM"), Some(at(2024, 3, 5, 15, 15)));
        assert_eq!(parse("Posted 12 January, 2023 - 9:05 AM by x"), Some(at(2023, 1, 12, 9, 5)));
    }

    #[test]
    fn test_month_name_noon_and_midnight_quirk() {
        assert_eq!(parse("1 June, 2022 - 12:30 PM"), Some(at(2022, 6, 1, 12, 30)));
        // AM hours are never shifted, 12 AM stays at hour 12
        assert_eq!(parse("1 June, 2022 - 12:30 AM"), Some(at(2022, 6, 1, 12, 30)));
    }

    #[test]
    fn test_month_name_is_case_sensitive() {
        assert_eq!(parse_custom("5 march, 2024 - 3:15 PM"), None);
    }

    #[test]
    fn test_day_first_format() {
        assert_eq!(parse("05/03/2024 15:15"), Some(at(2024, 3, 5, 15, 15)));
        assert_eq!(parse("on 1/12/2020 7:5"), Some(at(2020, 12, 1, 7, 5)));
    }

    #[test]
    fn test_native_formats() {
        assert_eq!(parse("2024-03-05 15:15:00"), Some(at(2024, 3, 5, 15, 15)));
        assert_eq!(parse("  2024-03-05  "), Some(at(2024, 3, 5, 0, 0)));
        assert_eq!(parse("March 5, 2024"), Some(at(2024, 3, 5, 0, 0)));
        assert!(parse("2024-03-05T15:15:00Z").is_some());
    }

    #[test]
    fn test_non_dates() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("hello world"), None);
        assert_eq!(parse("42 Smarch, 2024 - 3:15 PM"), None);
    }

    #[test]
    fn test_out_of_range_fields_roll_over() {
        assert_eq!(parse("31/02/2024 10:00"), Some(at(2024, 3, 2, 10, 0)));
        assert_eq!(parse("5 March, 2024 - 13:15 PM"), Some(at(2024, 3, 6, 1, 15)));
        assert_eq!(parse("0/1/2024 23:75"), Some(at(2024, 1, 1, 0, 15)));
        assert_eq!(parse("5/13/2024 10:00"), Some(at(2025, 1, 5, 10, 0)));
        assert_eq!(parse("5/0/2024 10:00"), Some(at(2023, 12, 5, 10, 0)));
    }

    #[test]
    fn test_score_past_numeric_date() {
        let now = at(2026, 1, 1, 0, 0);
        // 16 chars, 12 digits, parses in the past
        assert_eq!(score_at("05/03/2024 15:15", now), 150);
    }

    #[test]
    fn test_score_future_date_is_penalized() {
        let now = at(2020, 1, 1, 0, 0);
        assert_eq!(score_at("05/03/2024 15:15", now), 0);
    }

    #[test]
    fn test_score_plain_text() {
        let now = at(2026, 1, 1, 0, 0);
        // short, unparseable, no digits
        assert_eq!(score_at("hello", now), -200);
        assert_eq!(score_at("", now), -200);
    }

    #[test]
    fn test_score_long_spelled_date() {
        let now = at(2026, 1, 1, 0, 0);
        // long, parses, but letters outnumber digits
        assert_eq!(score_at("5 March, 2024 - 3:15 PM", now), 50);
    }

    #[test]
    fn test_extract_date_uses_direct_text() {
        let doc = dom::parse(
            r#"<div class="meta"><span class="when">05/03/2024 15:15<b>edited</b></span></div>"#,
        );

        assert_eq!(extract_date(&doc, "span.when"), Some(at(2024, 3, 5, 15, 15)));
        assert_eq!(extract_date(&doc, "span.missing"), None);
    }
}
