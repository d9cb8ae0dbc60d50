//! Naive local timestamps and elapsed-time arithmetic
//!
//! Timestamps carry no timezone: the board clock is seeded once from the
//! time-sync service in the configured zone and every value after that is
//! plain local wall time. The stored text form is `YYYY-MM-DD HH:MM:SS`.
//!
//! Date arithmetic uses Howard Hinnant's `days_from_civil` and
//! `civil_from_days` algorithms, which are O(1) and exact for the proleptic
//! Gregorian calendar.
//! Reference: <http://howardhinnant.github.io/date_algorithms.html>

use core::fmt::{self, Write};
use core::str::FromStr;

use thiserror_no_std::Error;

pub const SECS_PER_MINUTE: i64 = 60;
pub const SECS_PER_HOUR: i64 = 3_600;
pub const SECS_PER_DAY: i64 = 86_400;

/// Longest rendering of a [`Timestamp`] (five-digit year included).
pub const TIMESTAMP_TEXT_LEN: usize = 20;

/// Text form of a timestamp as written to the feed store.
pub type TimestampText = heapless::String<TIMESTAMP_TEXT_LEN>;

/// Days between 0000-03-01 and 1970-01-01.
const EPOCH_SHIFT_DAYS: i64 = 719_468;
const DAYS_PER_ERA: i64 = 146_097;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampParseError {
    #[error("malformed timestamp text")]
    Malformed,
    #[error("{0} out of range")]
    OutOfRange(&'static str),
}

/// A naive local date and time.
///
/// `weekday` (ISO, 1 = Monday) and `yearday` (1-based) are only known when
/// the value comes from the clock or the time-sync service. After parsing
/// the stored text form they are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub weekday: Option<u8>,
    pub yearday: Option<u16>,
}

impl Timestamp {
    /// Build a validated timestamp with unknown weekday and yearday.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, TimestampParseError> {
        if !(1..=12).contains(&month) {
            return Err(TimestampParseError::OutOfRange("month"));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(TimestampParseError::OutOfRange("day"));
        }
        if hour > 23 {
            return Err(TimestampParseError::OutOfRange("hour"));
        }
        if minute > 59 {
            return Err(TimestampParseError::OutOfRange("minute"));
        }
        if second > 59 {
            return Err(TimestampParseError::OutOfRange("second"));
        }

        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            weekday: None,
            yearday: None,
        })
    }

    /// Parse the stored `YYYY-MM-DD HH:MM:SS` form.
    ///
    /// Unpadded fields (`2019-3-5 9:4:7`) are accepted as well, since older
    /// records were written that way.
    pub fn parse(text: &str) -> Result<Self, TimestampParseError> {
        let (date, time) = text
            .trim()
            .split_once(' ')
            .ok_or(TimestampParseError::Malformed)?;
        let [year, month, day] = split_fields(date, '-')?;
        let [hour, minute, second] = split_fields(time.trim_start(), ':')?;

        Self::new(
            number(year)?,
            number(month)?,
            number(day)?,
            number(hour)?,
            number(minute)?,
            number(second)?,
        )
    }

    /// Parse a time-sync service reply.
    ///
    /// The reply is whitespace-delimited:
    /// `YYYY-MM-DD HH:MM:SS.mmm DDD W ±ZZZZ TZ`, where `DDD` is the day of
    /// the year and `W` the ISO day of the week. Fields after the weekday
    /// are ignored.
    pub fn from_time_service(reply: &str) -> Result<Self, TimestampParseError> {
        let mut fields = reply.split_ascii_whitespace();
        let date = fields.next().ok_or(TimestampParseError::Malformed)?;
        let time = fields.next().ok_or(TimestampParseError::Malformed)?;
        let yearday: u16 = number(fields.next().ok_or(TimestampParseError::Malformed)?)?;
        let weekday: u8 = number(fields.next().ok_or(TimestampParseError::Malformed)?)?;

        // Drop the millisecond part
        let time = time.split('.').next().unwrap_or(time);

        let [year, month, day] = split_fields(date, '-')?;
        let [hour, minute, second] = split_fields(time, ':')?;
        let mut ts = Self::new(
            number(year)?,
            number(month)?,
            number(day)?,
            number(hour)?,
            number(minute)?,
            number(second)?,
        )?;

        if !(1..=7).contains(&weekday) {
            return Err(TimestampParseError::OutOfRange("weekday"));
        }
        if !(1..=366).contains(&yearday) {
            return Err(TimestampParseError::OutOfRange("yearday"));
        }
        ts.weekday = Some(weekday);
        ts.yearday = Some(yearday);
        Ok(ts)
    }

    /// Render the zero-padded stored form.
    pub fn format(&self) -> TimestampText {
        let mut text = TimestampText::new();
        // Capacity covers the widest u16 year
        write!(text, "{self}").ok();
        text
    }

    /// Seconds since 1970-01-01 00:00:00 in the same (local) zone.
    pub fn to_local_secs(&self) -> i64 {
        days_from_civil(self.year as i64, self.month, self.day) * SECS_PER_DAY
            + self.hour as i64 * SECS_PER_HOUR
            + self.minute as i64 * SECS_PER_MINUTE
            + self.second as i64
    }

    /// Inverse of [`Timestamp::to_local_secs`]; weekday and yearday are filled.
    pub fn from_local_secs(secs: i64) -> Self {
        let days = secs.div_euclid(SECS_PER_DAY);
        let secs_today = secs.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        let year = year.clamp(0, u16::MAX as i64);

        // 1970-01-01 was a Thursday
        let weekday = ((days.rem_euclid(7) + 3) % 7 + 1) as u8;
        let yearday = (days - days_from_civil(year, 1, 1) + 1) as u16;

        Self {
            year: year as u16,
            month,
            day,
            hour: (secs_today / SECS_PER_HOUR) as u8,
            minute: ((secs_today % SECS_PER_HOUR) / SECS_PER_MINUTE) as u8,
            second: (secs_today % SECS_PER_MINUTE) as u8,
            weekday: Some(weekday),
            yearday: Some(yearday),
        }
    }

    /// The timestamp `secs` seconds later (or earlier, when negative).
    pub fn offset_secs(&self, secs: i64) -> Self {
        Self::from_local_secs(self.to_local_secs() + secs)
    }

    /// Whether both timestamps fall on the same calendar date.
    pub fn same_date(&self, other: &Self) -> bool {
        self.year == other.year && self.month == other.month && self.day == other.day
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Elapsed time split into clock fields.
///
/// `hours` wraps at 24 and there is no day component, so a span of 25 hours
/// reads as 1 hour. `total_secs` keeps the unwrapped value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Elapsed {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub total_secs: u64,
}

impl Elapsed {
    pub fn from_secs(total_secs: u64) -> Self {
        Self {
            hours: ((total_secs / SECS_PER_HOUR as u64) % 24) as u8,
            minutes: ((total_secs / SECS_PER_MINUTE as u64) % 60) as u8,
            seconds: (total_secs % SECS_PER_MINUTE as u64) as u8,
            total_secs,
        }
    }

    pub fn hms(&self) -> (u8, u8, u8) {
        (self.hours, self.minutes, self.seconds)
    }
}

/// Time from `reference` to `now`.
///
/// A reference in the future (clock not yet synced, or a record written by a
/// clock running ahead) yields zero.
pub fn elapsed(now: &Timestamp, reference: &Timestamp) -> Elapsed {
    let span = now.to_local_secs() - reference.to_local_secs();
    Elapsed::from_secs(span.max(0) as u64)
}

pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since 1970-01-01 for a civil date.
fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    // Years start on March 1 so the leap day lands at the end
    let y = if month <= 2 { year - 1 } else { year };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400;
    let m = month as i64;
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * DAYS_PER_ERA + doe - EPOCH_SHIFT_DAYS
}

/// Civil date (year, month, day) for days since 1970-01-01.
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + EPOCH_SHIFT_DAYS;
    let era = if z >= 0 { z } else { z - (DAYS_PER_ERA - 1) } / DAYS_PER_ERA;
    let doe = z - era * DAYS_PER_ERA;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / (DAYS_PER_ERA - 1)) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

fn split_fields(text: &str, separator: char) -> Result<[&str; 3], TimestampParseError> {
    let mut parts = text.split(separator);
    let fields = [
        parts.next().ok_or(TimestampParseError::Malformed)?,
        parts.next().ok_or(TimestampParseError::Malformed)?,
        parts.next().ok_or(TimestampParseError::Malformed)?,
    ];
    if parts.next().is_some() {
        return Err(TimestampParseError::Malformed);
    }
    Ok(fields)
}

fn number<T: FromStr>(field: &str) -> Result<T, TimestampParseError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimestampParseError::Malformed);
    }
    field.parse().map_err(|_| TimestampParseError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Timestamp {
        Timestamp::new(year, month, day, hour, minute, second).unwrap()
    }

    #[test]
    fn test_elapsed_zero() {
        let t = ts(2024, 3, 5, 9, 4, 7);
        assert_eq!(elapsed(&t, &t).hms(), (0, 0, 0));
    }

    #[test]
    fn test_elapsed_hour_minute_second() {
        let reference = ts(2024, 3, 5, 9, 4, 7);
        let now = reference.offset_secs(3661);
        assert_eq!(elapsed(&now, &reference).hms(), (1, 1, 1));
    }

    #[test]
    fn test_elapsed_wraps_hours_at_24() {
        let reference = ts(2024, 3, 5, 9, 0, 0);
        let now = reference.offset_secs(90_000);
        let e = elapsed(&now, &reference);
        assert_eq!(e.hms(), (1, 0, 0));
        assert_eq!(e.total_secs, 90_000);
    }

    #[test]
    fn test_elapsed_future_reference_clamps_to_zero() {
        let now = ts(2024, 3, 5, 9, 0, 0);
        let reference = now.offset_secs(120);
        let e = elapsed(&now, &reference);
        assert_eq!(e.hms(), (0, 0, 0));
        assert_eq!(e.total_secs, 0);
    }

    #[test]
    fn test_elapsed_across_midnight_and_month_end() {
        let reference = ts(2024, 2, 29, 23, 50, 0);
        let now = ts(2024, 3, 1, 0, 20, 30);
        assert_eq!(elapsed(&now, &reference).hms(), (0, 30, 30));
    }

    #[test]
    fn test_format_zero_pads() {
        assert_eq!(ts(2024, 3, 5, 9, 4, 7).format(), "2024-03-05 09:04:07");
    }

    #[test]
    fn test_format_parse_round_trip() {
        for t in [
            ts(2024, 3, 5, 9, 4, 7),
            ts(1999, 12, 31, 23, 59, 59),
            ts(2000, 2, 29, 0, 0, 0),
        ] {
            let parsed = Timestamp::parse(&t.format()).unwrap();
            assert_eq!(parsed, t);
            assert_eq!(parsed.weekday, None);
            assert_eq!(parsed.yearday, None);
        }
    }

    #[test]
    fn test_parse_accepts_unpadded_legacy_values() {
        let parsed = Timestamp::parse("2019-3-5 9:4:7").unwrap();
        assert_eq!(parsed, ts(2019, 3, 5, 9, 4, 7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Timestamp::parse(""), Err(TimestampParseError::Malformed));
        assert_eq!(
            Timestamp::parse("2024-03-05"),
            Err(TimestampParseError::Malformed)
        );
        assert_eq!(
            Timestamp::parse("2024-03-05 09:04"),
            Err(TimestampParseError::Malformed)
        );
        assert_eq!(
            Timestamp::parse("2024-03-05 09:04:0x"),
            Err(TimestampParseError::Malformed)
        );
        assert_eq!(
            Timestamp::parse("2024-+3-05 09:04:07"),
            Err(TimestampParseError::Malformed)
        );
    }

    #[test]
    fn test_parse_rejects_out_of_range_fields() {
        assert_eq!(
            Timestamp::parse("2024-13-05 09:04:07"),
            Err(TimestampParseError::OutOfRange("month"))
        );
        assert_eq!(
            Timestamp::parse("2023-02-29 09:04:07"),
            Err(TimestampParseError::OutOfRange("day"))
        );
        assert_eq!(
            Timestamp::parse("2024-03-05 24:00:00"),
            Err(TimestampParseError::OutOfRange("hour"))
        );
    }

    #[test]
    fn test_time_service_reply() {
        let t = Timestamp::from_time_service("2024-03-05 09:04:07.123 065 2 -0800 PST\n").unwrap();
        assert_eq!(t.format(), "2024-03-05 09:04:07");
        assert_eq!(t.yearday, Some(65));
        assert_eq!(t.weekday, Some(2));
    }

    #[test]
    fn test_time_service_reply_truncated() {
        assert_eq!(
            Timestamp::from_time_service("2024-03-05 09:04:07.123"),
            Err(TimestampParseError::Malformed)
        );
        assert_eq!(
            Timestamp::from_time_service("2024-03-05 09:04:07.123 065 9 -0800 PST"),
            Err(TimestampParseError::OutOfRange("weekday"))
        );
    }

    #[test]
    fn test_local_secs_round_trip() {
        let t = ts(2024, 3, 5, 9, 4, 7);
        let back = Timestamp::from_local_secs(t.to_local_secs());
        assert_eq!(back.format(), t.format());
        // 2024-03-05 was a Tuesday, day 65 of a leap year
        assert_eq!(back.weekday, Some(2));
        assert_eq!(back.yearday, Some(65));
    }

    #[test]
    fn test_local_secs_epoch() {
        let epoch = ts(1970, 1, 1, 0, 0, 0);
        assert_eq!(epoch.to_local_secs(), 0);
        let back = Timestamp::from_local_secs(0);
        assert_eq!(back.weekday, Some(4));
        assert_eq!(back.yearday, Some(1));
    }

    #[test]
    fn test_same_date() {
        let evening = ts(2024, 3, 5, 23, 59, 59);
        assert!(evening.same_date(&ts(2024, 3, 5, 0, 0, 0)));
        assert!(!evening.same_date(&evening.offset_secs(1)));
        // Same day-of-month in a different month is a different date
        assert!(!evening.same_date(&ts(2024, 4, 5, 23, 59, 59)));
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(1900));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(2100));
    }
}
