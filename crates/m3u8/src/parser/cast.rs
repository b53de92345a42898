use std::sync::LazyLock;

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, SecondsFormat, TimeZone, Utc, Weekday,
};
use regex::{Captures, Regex};

use crate::error::{M3u8Error, M3u8Result};

// ISO 8601 date forms, tried in this order. Each pattern is anchored at the start of the
// value and the rest of the value is parsed as an optional time of day.
static CALENDAR_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-?(\d{2})-?(\d{2})").unwrap());
static WEEK_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-?W(\d{2})(?:-?(\d))?").unwrap());
static ORDINAL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-?(\d{3})").unwrap());
static YEAR_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-?(\d{2})").unwrap());
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})").unwrap());

static UTC_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-])(\d{2})(?::?(\d{2}))?$").unwrap());

/// Week-only dates refer to the Monday of that week.
const DEFAULT_WEEKDAY: u32 = 1;

pub fn cast_int(value: &str) -> M3u8Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|source| M3u8Error::InvalidInteger {
            value: value.to_string(),
            source,
        })
}

pub fn cast_float(value: &str) -> M3u8Result<f64> {
    let number: f64 = value
        .trim()
        .parse()
        .map_err(|source| M3u8Error::InvalidFloat {
            value: value.to_string(),
            source,
        })?;
    if !number.is_finite() {
        return Err(M3u8Error::OutOfRange(value.to_string()));
    }
    Ok(number)
}

/// Integer attribute written as a decimal, like `BANDWIDTH=1280000.0`.
pub fn cast_int_from_float(value: &str) -> M3u8Result<u64> {
    let number = cast_float(value)?.trunc();
    // u64::MAX as f64 rounds up to 2^64, which is already out of range
    if number < 0.0 || number >= u64::MAX as f64 {
        return Err(M3u8Error::OutOfRange(value.to_string()));
    }
    Ok(number as u64)
}

/// Removes one layer of matching single or double quotes.
///
/// `"foo"` -> `foo`, `'foo'` -> `foo`, `'foo` -> `'foo`
pub fn remove_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

pub fn quoted(value: &str) -> String {
    format!("\"{value}\"")
}

/// Formats a duration-like number, omitting the fraction of whole numbers.
///
/// `6.0` -> `6`, `6.5` -> `6.5`
pub fn int_or_float_to_string(number: f64) -> String {
    if number.is_finite() && number.fract() == 0.0 {
        format!("{number:.0}")
    } else {
        number.to_string()
    }
}

pub fn format_date_time(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses an ISO 8601 timestamp as used by `#EXT-X-PROGRAM-DATE-TIME`.
///
/// Accepted date forms are calendar dates (`YYYY-MM-DD`, `YYYYMMDD`), week dates
/// (`YYYY-Www-D`, `YYYYWwwD`, `YYYY-Www`, `YYYYWww`), ordinal dates (`YYYY-DDD`,
/// `YYYYDDD`), `YYYY-MM` and `YYYY`. The first form matching the input is used; a date
/// which matches a form but does not exist in the calendar is an error.
///
/// The date may be followed by `T` and a time of day with an optional UTC offset.
/// Values without a time of day or offset are treated as UTC.
pub fn cast_date_time(value: &str) -> M3u8Result<DateTime<FixedOffset>> {
    let value = value.trim();
    let invalid = || M3u8Error::InvalidDateTime(value.to_string());
    let number = |caps: &Captures<'_>, index: usize| -> M3u8Result<u32> {
        caps.get(index)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(invalid)
    };

    let (date, rest) = if let Some(caps) = CALENDAR_DATE.captures(value) {
        let date = NaiveDate::from_ymd_opt(
            number(&caps, 1)? as i32,
            number(&caps, 2)?,
            number(&caps, 3)?,
        );
        (date, &value[caps[0].len()..])
    } else if let Some(caps) = WEEK_DATE.captures(value) {
        let year = number(&caps, 1)? as i32;
        let week = number(&caps, 2)?;
        let weekday = match caps.get(3) {
            Some(_) => number(&caps, 3)?,
            None => DEFAULT_WEEKDAY,
        };
        let date = iso_weekday(weekday)
            .and_then(|weekday| NaiveDate::from_isoywd_opt(year, week, weekday));
        (date, &value[caps[0].len()..])
    } else if let Some(caps) = ORDINAL_DATE.captures(value) {
        let date = NaiveDate::from_yo_opt(number(&caps, 1)? as i32, number(&caps, 2)?);
        (date, &value[caps[0].len()..])
    } else if let Some(caps) = YEAR_MONTH.captures(value) {
        let date = NaiveDate::from_ymd_opt(number(&caps, 1)? as i32, number(&caps, 2)?, 1);
        (date, &value[caps[0].len()..])
    } else if let Some(caps) = YEAR.captures(value) {
        let date = NaiveDate::from_ymd_opt(number(&caps, 1)? as i32, 1, 1);
        (date, &value[caps[0].len()..])
    } else {
        return Err(invalid());
    };
    let date = date.ok_or_else(invalid)?;

    let (time, offset) = if rest.is_empty() {
        (NaiveTime::MIN, utc())
    } else {
        let rest = rest
            .strip_prefix('T')
            .or_else(|| rest.strip_prefix(' '))
            .ok_or_else(invalid)?;
        parse_time_of_day(rest).ok_or_else(invalid)?
    };

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(invalid)
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn iso_weekday(day: u32) -> Option<Weekday> {
    match day {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}

fn parse_time_of_day(value: &str) -> Option<(NaiveTime, FixedOffset)> {
    let (time, zone) = ["%H:%M:%S%.f", "%H%M%S%.f", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_and_remainder(value, format).ok())?;

    let offset = match zone {
        "" | "Z" | "z" => utc(),
        zone => {
            let caps = UTC_OFFSET.captures(zone)?;
            let hours: i32 = caps[2].parse().ok()?;
            let minutes: i32 = caps.get(3).map_or(Some(0), |m| m.as_str().parse().ok())?;
            let seconds = hours * 3600 + minutes * 60;
            match &caps[1] {
                "-" => FixedOffset::west_opt(seconds)?,
                _ => FixedOffset::east_opt(seconds)?,
            }
        }
    };

    Some((time, offset))
}
