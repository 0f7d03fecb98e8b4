//! Calendar-aware time handling for model time coordinates
//!
//! Climate and ice-sheet models frequently store time in non-standard calendars
//! (360-day years, years without leap days, ...). Observations are indexed by a
//! fractional year, so every model timestamp has to be normalised into the same
//! real-valued axis before the two series can be compared.
//!
//! This module provides:
//!
//! - [`Calendar`]: the CF calendar families with their leap-year and month-length rules
//! - [`CalendarDate`]: a date within a specific calendar
//! - [`CfTimeUnits`]: decoding of CF `"<unit> since <reference>"` offsets
//! - [`TimeCoordinate`]: a timestamp held as calendar date, fractional year and days since epoch
//! - [`check_datarange`]: the precondition check run before any interpolation
//!
//! # Examples
//!
//! ```rust
//! use icemass_core::calendar::{Calendar, CfTimeUnits};
//!
//! let units = CfTimeUnits::parse("days since 2000-01-01").unwrap();
//! let date = units.decode(360.0, Calendar::Day360).unwrap();
//! assert_eq!((date.year(), date.month(), date.day()), (2001, 1, 1));
//! assert_eq!(date.fractional_year(), 2001.0);
//! ```

use crate::errors::{IceMassError, IceMassResult};
use crate::FloatValue;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

const SECONDS_PER_DAY: i64 = 86_400;

/// First Julian day number of the Gregorian part of the mixed calendar (1582-10-15).
const GREGORIAN_REFORM_JDN: i64 = 2_299_161;

const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Calendar systems found in CF-compliant model output
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Calendar {
    /// Mixed Julian/Gregorian calendar (`standard`, `gregorian`)
    Standard,
    /// Gregorian rules extended backwards to all years
    ProlepticGregorian,
    /// Leap year every fourth year
    Julian,
    /// Every year has 365 days (`noleap`, `365_day`)
    NoLeap,
    /// Every year has 366 days (`all_leap`, `366_day`)
    AllLeap,
    /// Twelve 30-day months (`360_day`)
    Day360,
}

impl Calendar {
    /// Canonical CF name of the calendar
    pub fn cf_name(&self) -> &'static str {
        match self {
            Calendar::Standard => "standard",
            Calendar::ProlepticGregorian => "proleptic_gregorian",
            Calendar::Julian => "julian",
            Calendar::NoLeap => "noleap",
            Calendar::AllLeap => "all_leap",
            Calendar::Day360 => "360_day",
        }
    }

    pub fn is_leap_year(&self, year: i32) -> bool {
        match self {
            Calendar::NoLeap | Calendar::Day360 => false,
            Calendar::AllLeap => true,
            Calendar::Julian => julian_leap(year),
            Calendar::ProlepticGregorian => gregorian_leap(year),
            // 1582 is a common year under both rules
            Calendar::Standard if year < 1582 => julian_leap(year),
            Calendar::Standard => gregorian_leap(year),
        }
    }

    /// Number of days in `year`
    ///
    /// This is the denominator used when converting a date into a fractional year.
    pub fn days_in_year(&self, year: i32) -> u32 {
        match self {
            Calendar::NoLeap => 365,
            Calendar::AllLeap => 366,
            Calendar::Day360 => 360,
            _ if self.is_leap_year(year) => 366,
            _ => 365,
        }
    }

    /// Number of days in `month` (1-based) of `year`, `None` for an invalid month
    pub fn days_in_month(&self, year: i32, month: u32) -> Option<u32> {
        (1..=12)
            .contains(&month)
            .then(|| self.month_length(year, month))
    }

    /// `month` must be in `1..=12`
    fn month_length(&self, year: i32, month: u32) -> u32 {
        match self {
            Calendar::Day360 => 30,
            _ if month == 2 && self.is_leap_year(year) => 29,
            _ => MONTH_LENGTHS[(month - 1) as usize],
        }
    }

    fn is_valid_date(&self, year: i32, month: u32, day: u32) -> bool {
        if !(1..=12).contains(&month) || day == 0 || day > self.month_length(year, month) {
            return false;
        }
        // Days dropped by the Gregorian reform
        !(*self == Calendar::Standard && year == 1582 && month == 10 && (5..15).contains(&day))
    }

    /// Ordinal day count for a date, contiguous within this calendar
    fn day_number(&self, year: i32, month: u32, day: u32) -> i64 {
        match self {
            Calendar::NoLeap | Calendar::AllLeap | Calendar::Day360 => {
                let year_length = self.days_in_year(0) as i64;
                year as i64 * year_length
                    + self.days_before_month(0, month) as i64
                    + (day as i64 - 1)
            }
            Calendar::ProlepticGregorian => gregorian_to_jdn(year as i64, month, day),
            Calendar::Julian => julian_to_jdn(year as i64, month, day),
            Calendar::Standard => {
                if (year, month, day) >= (1582, 10, 15) {
                    gregorian_to_jdn(year as i64, month, day)
                } else {
                    julian_to_jdn(year as i64, month, day)
                }
            }
        }
    }

    fn from_day_number(&self, number: i64) -> (i32, u32, u32) {
        match self {
            Calendar::NoLeap | Calendar::AllLeap | Calendar::Day360 => {
                let year_length = self.days_in_year(0) as i64;
                let year = number.div_euclid(year_length);
                let mut remaining = number.rem_euclid(year_length) as u32;
                let mut month = 1;
                while remaining >= self.month_length(0, month) {
                    remaining -= self.month_length(0, month);
                    month += 1;
                }
                (year as i32, month, remaining + 1)
            }
            Calendar::ProlepticGregorian => jdn_to_gregorian(number),
            Calendar::Julian => jdn_to_julian(number),
            Calendar::Standard if number >= GREGORIAN_REFORM_JDN => jdn_to_gregorian(number),
            Calendar::Standard => jdn_to_julian(number),
        }
    }

    fn days_before_month(&self, year: i32, month: u32) -> u32 {
        (1..month).map(|m| self.month_length(year, m)).sum()
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cf_name())
    }
}

impl FromStr for Calendar {
    type Err = IceMassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "gregorian" => Ok(Calendar::Standard),
            "proleptic_gregorian" => Ok(Calendar::ProlepticGregorian),
            "julian" => Ok(Calendar::Julian),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            _ => Err(IceMassError::UnknownCalendar(s.to_string())),
        }
    }
}

fn julian_leap(year: i32) -> bool {
    year.rem_euclid(4) == 0
}

fn gregorian_leap(year: i32) -> bool {
    (year.rem_euclid(4) == 0 && year.rem_euclid(100) != 0) || year.rem_euclid(400) == 0
}

// Julian day number conversions (Fliegel & Van Flandern), valid for years after -4800.
fn gregorian_to_jdn(year: i64, month: u32, day: u32) -> i64 {
    let a = (14 - month as i64) / 12;
    let y = year + 4800 - a;
    let m = month as i64 + 12 * a - 3;
    day as i64 + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
}

fn julian_to_jdn(year: i64, month: u32, day: u32) -> i64 {
    let a = (14 - month as i64) / 12;
    let y = year + 4800 - a;
    let m = month as i64 + 12 * a - 3;
    day as i64 + (153 * m + 2) / 5 + 365 * y + y / 4 - 32083
}

fn jdn_to_gregorian(jdn: i64) -> (i32, u32, u32) {
    let a = jdn + 32044;
    let b = (4 * a + 3) / 146_097;
    let c = a - 146_097 * b / 4;
    split_jdn_remainder(100 * b, c)
}

fn jdn_to_julian(jdn: i64) -> (i32, u32, u32) {
    split_jdn_remainder(0, jdn + 32082)
}

fn split_jdn_remainder(century_years: i64, c: i64) -> (i32, u32, u32) {
    let d = (4 * c + 3) / 1461;
    let e = c - 1461 * d / 4;
    let m = (5 * e + 2) / 153;
    let day = e - (153 * m + 2) / 5 + 1;
    let month = m + 3 - 12 * (m / 10);
    let year = century_years + d - 4800 + m / 10;
    (year as i32, month as u32, day as u32)
}

/// A date (with time of day) in a specific calendar
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDate {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    calendar: Calendar,
}

impl CalendarDate {
    /// Create a date at midnight
    ///
    /// Returns [`IceMassError::InvalidDate`] if the day does not exist in `calendar`.
    pub fn new(year: i32, month: u32, day: u32, calendar: Calendar) -> IceMassResult<Self> {
        Self::with_time(year, month, day, 0, 0, 0, calendar)
    }

    pub fn with_time(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        calendar: Calendar,
    ) -> IceMassResult<Self> {
        if !calendar.is_valid_date(year, month, day) || hour > 23 || minute > 59 || second > 59 {
            return Err(IceMassError::InvalidDate {
                year,
                month,
                day,
                calendar: calendar.to_string(),
            });
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            calendar,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn calendar(&self) -> Calendar {
        self.calendar
    }

    /// Day of the year, starting at 1 for the first of January
    pub fn day_of_year(&self) -> u32 {
        self.calendar.days_before_month(self.year, self.month) + self.day
    }

    /// Days in this date's year under its calendar
    pub fn days_in_year(&self) -> u32 {
        self.calendar.days_in_year(self.year)
    }

    /// Fractional year: `year + (day_of_year - 1) / days_in_year`
    ///
    /// The time of day does not contribute, so every timestamp within a day maps
    /// onto the same value.
    pub fn fractional_year(&self) -> FloatValue {
        self.year as FloatValue
            + (self.day_of_year() - 1) as FloatValue / self.days_in_year() as FloatValue
    }

    /// The same instant as a chrono timestamp
    ///
    /// Only dates on the proleptic Gregorian axis convert: `ProlepticGregorian`
    /// dates, and `Standard` dates from the 1582 reform onwards.
    pub fn to_naive_datetime(&self) -> Option<NaiveDateTime> {
        let gregorian = match self.calendar {
            Calendar::ProlepticGregorian => true,
            Calendar::Standard => self.day_number() >= GREGORIAN_REFORM_JDN,
            _ => false,
        };
        if !gregorian {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_opt(self.hour, self.minute, self.second))
    }

    fn seconds_of_day(&self) -> i64 {
        (self.hour * 3600 + self.minute * 60 + self.second) as i64
    }

    fn day_number(&self) -> i64 {
        self.calendar.day_number(self.year, self.month, self.day)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02} ({})",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.calendar
        )
    }
}

/// Unit of a CF time offset
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn seconds(&self) -> FloatValue {
        match self {
            TimeUnit::Days => 86_400.0,
            TimeUnit::Hours => 3_600.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Seconds => 1.0,
        }
    }
}

/// Parsed CF time units such as `"days since 1850-01-01 00:00:00"`
///
/// The reference date is stored calendar-free and only interpreted once a
/// calendar is supplied, because the same units string is valid in every calendar.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CfTimeUnits {
    unit: TimeUnit,
    year: i32,
    month: u32,
    day: u32,
    seconds_of_day: i64,
}

impl CfTimeUnits {
    pub fn parse(units: &str) -> IceMassResult<Self> {
        let invalid = || IceMassError::InvalidTimeUnits(units.to_string());
        let lower = units.trim().to_ascii_lowercase();
        let (unit, reference) = lower.split_once(" since ").ok_or_else(invalid)?;

        let unit = match unit.trim() {
            "days" | "day" | "d" => TimeUnit::Days,
            "hours" | "hour" | "hr" | "h" => TimeUnit::Hours,
            "minutes" | "minute" | "min" => TimeUnit::Minutes,
            "seconds" | "second" | "sec" | "s" => TimeUnit::Seconds,
            _ => return Err(invalid()),
        };

        // Reference is "<date>[ |T]<time>[ UTC|Z]"
        let mut parts = reference
            .trim()
            .split(|c: char| c.is_whitespace() || c == 't')
            .filter(|p| !p.is_empty());
        let date = parts.next().ok_or_else(invalid)?;
        let mut ymd = date.splitn(3, '-');
        let year = ymd.next().and_then(|v| v.parse::<i32>().ok()).ok_or_else(invalid)?;
        let month = ymd.next().and_then(|v| v.parse::<u32>().ok()).ok_or_else(invalid)?;
        let day = ymd.next().and_then(|v| v.parse::<u32>().ok()).ok_or_else(invalid)?;

        let seconds_of_day = match parts.next().filter(|t| t.contains(':')) {
            Some(time) => {
                let mut hms = time.trim_end_matches('z').split(':');
                let hour = hms.next().and_then(|v| v.parse::<i64>().ok()).ok_or_else(invalid)?;
                let minute = hms
                    .next()
                    .map_or(Some(0), |v| v.parse::<i64>().ok())
                    .ok_or_else(invalid)?;
                let second = hms
                    .next()
                    .map_or(Some(0.0), |v| v.parse::<f64>().ok())
                    .ok_or_else(invalid)?;
                hour * 3600 + minute * 60 + second.floor() as i64
            }
            None => 0,
        };

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(invalid());
        }
        if !(0..SECONDS_PER_DAY).contains(&seconds_of_day) {
            return Err(invalid());
        }

        Ok(Self {
            unit,
            year,
            month,
            day,
            seconds_of_day,
        })
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    /// The reference date interpreted in `calendar`
    pub fn epoch(&self, calendar: Calendar) -> IceMassResult<CalendarDate> {
        let hour = (self.seconds_of_day / 3600) as u32;
        let minute = ((self.seconds_of_day % 3600) / 60) as u32;
        let second = (self.seconds_of_day % 60) as u32;
        CalendarDate::with_time(self.year, self.month, self.day, hour, minute, second, calendar)
    }

    /// Decode an offset in these units into a date in `calendar`
    ///
    /// Sub-second precision is rounded to the nearest second.
    pub fn decode(&self, value: FloatValue, calendar: Calendar) -> IceMassResult<CalendarDate> {
        let epoch = self.epoch(calendar)?;
        let total_seconds =
            (epoch.seconds_of_day() as FloatValue + value * self.unit.seconds()).round() as i64;
        let day_offset = total_seconds.div_euclid(SECONDS_PER_DAY);
        let seconds = total_seconds.rem_euclid(SECONDS_PER_DAY);

        let (year, month, day) = calendar.from_day_number(epoch.day_number() + day_offset);
        CalendarDate::with_time(
            year,
            month,
            day,
            (seconds / 3600) as u32,
            ((seconds % 3600) / 60) as u32,
            (seconds % 60) as u32,
            calendar,
        )
    }

    /// Encode a date as an offset in these units (inverse of [`decode`](Self::decode))
    pub fn encode(&self, date: &CalendarDate) -> IceMassResult<FloatValue> {
        Ok(self.days_since_epoch(date)? * 86_400.0 / self.unit.seconds())
    }

    /// Real-valued days between the reference date and `date`
    pub fn days_since_epoch(&self, date: &CalendarDate) -> IceMassResult<FloatValue> {
        let epoch = self.epoch(date.calendar())?;
        let days = (date.day_number() - epoch.day_number()) as FloatValue;
        let seconds = (date.seconds_of_day() - epoch.seconds_of_day()) as FloatValue;
        Ok(days + seconds / 86_400.0)
    }
}

/// A point in time held in the three representations used across datasets
///
/// All three fields are derived from the same calendar date on construction and
/// are therefore mutually consistent.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeCoordinate {
    pub date: CalendarDate,
    pub fractional_year: FloatValue,
    pub days_since_epoch: FloatValue,
}

impl TimeCoordinate {
    pub fn from_offset(
        value: FloatValue,
        units: &CfTimeUnits,
        calendar: Calendar,
    ) -> IceMassResult<Self> {
        let date = units.decode(value, calendar)?;
        Ok(Self {
            date,
            fractional_year: date.fractional_year(),
            days_since_epoch: units.days_since_epoch(&date)?,
        })
    }
}

/// Convert a model's native time coordinate into fractional years
pub fn fractional_years(
    values: &[FloatValue],
    units: &CfTimeUnits,
    calendar: Calendar,
) -> IceMassResult<Vec<FloatValue>> {
    values
        .iter()
        .map(|&v| units.decode(v, calendar).map(|d| d.fractional_year()))
        .collect()
}

/// Check the requested analysis window lies within the model's time coverage
///
/// Both bounds are inclusive: requesting exactly the first or last native time
/// is valid.
pub fn check_datarange(
    native_times: &[FloatValue],
    start: FloatValue,
    end: FloatValue,
) -> IceMassResult<()> {
    let (min, max) = native_times
        .iter()
        .filter(|t| !t.is_nan())
        .fold((FloatValue::INFINITY, FloatValue::NEG_INFINITY), |(lo, hi), &t| {
            (lo.min(t), hi.max(t))
        });
    if min > max {
        return Err(IceMassError::InvalidGrid(
            "time coordinate has no valid values".to_string(),
        ));
    }

    let within = |t: FloatValue| min <= t && t <= max;
    if within(start) && within(end) {
        info!(start, end, min, max, "Selected dates are within the range of the model data");
        Ok(())
    } else {
        Err(IceMassError::DateOutOfRange {
            start,
            end,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_in_year_fixed_length_calendars() {
        for year in [1850, 1900, 2000, 2001, 2004, 2100] {
            assert_eq!(Calendar::NoLeap.days_in_year(year), 365);
            assert_eq!(Calendar::AllLeap.days_in_year(year), 366);
            assert_eq!(Calendar::Day360.days_in_year(year), 360);
        }
    }

    #[test]
    fn days_in_year_gregorian_rule() {
        for calendar in [Calendar::Standard, Calendar::ProlepticGregorian] {
            assert_eq!(calendar.days_in_year(2000), 366);
            assert_eq!(calendar.days_in_year(2004), 366);
            assert_eq!(calendar.days_in_year(1900), 365);
            assert_eq!(calendar.days_in_year(2001), 365);
        }
        assert_eq!(Calendar::Julian.days_in_year(1900), 366);
    }

    #[test]
    fn month_lengths() {
        assert_eq!(Calendar::Standard.days_in_month(2000, 2), Some(29));
        assert_eq!(Calendar::NoLeap.days_in_month(2000, 2), Some(28));
        assert_eq!(Calendar::Day360.days_in_month(2001, 1), Some(30));
        assert_eq!(Calendar::Julian.days_in_month(2001, 12), Some(31));
        assert_eq!(Calendar::Standard.days_in_month(2001, 0), None);
        assert_eq!(Calendar::Standard.days_in_month(2001, 13), None);
    }

    #[test]
    fn calendar_aliases() {
        assert_eq!("365_day".parse::<Calendar>().unwrap(), Calendar::NoLeap);
        assert_eq!("noleap".parse::<Calendar>().unwrap(), Calendar::NoLeap);
        assert_eq!("366_day".parse::<Calendar>().unwrap(), Calendar::AllLeap);
        assert_eq!("Gregorian".parse::<Calendar>().unwrap(), Calendar::Standard);
        assert!(matches!(
            "lunar".parse::<Calendar>(),
            Err(IceMassError::UnknownCalendar(_))
        ));
    }

    #[test]
    fn fractional_year_uses_calendar_denominator() {
        let date = CalendarDate::new(2001, 7, 1, Calendar::Day360).unwrap();
        assert_eq!(date.day_of_year(), 181);
        assert_eq!(date.fractional_year(), 2001.5);

        let date = CalendarDate::new(2000, 3, 1, Calendar::ProlepticGregorian).unwrap();
        assert_eq!(date.day_of_year(), 61);
        assert!((date.fractional_year() - (2000.0 + 60.0 / 366.0)).abs() < 1e-12);
    }

    #[test]
    fn invalid_dates_rejected() {
        assert!(CalendarDate::new(2001, 2, 29, Calendar::NoLeap).is_err());
        assert!(CalendarDate::new(2001, 2, 29, Calendar::AllLeap).is_ok());
        assert!(CalendarDate::new(2001, 2, 30, Calendar::Day360).is_ok());
        assert!(CalendarDate::new(1582, 10, 10, Calendar::Standard).is_err());
        assert!(CalendarDate::new(1582, 10, 10, Calendar::ProlepticGregorian).is_ok());
    }

    #[test]
    fn decode_noleap_offsets() {
        let units = CfTimeUnits::parse("days since 1850-01-01 00:00:00").unwrap();
        let date = units.decode(365.0 * 150.0 + 59.0, Calendar::NoLeap).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2000, 3, 1));
    }

    #[test]
    fn decode_gregorian_matches_chrono() {
        let units = CfTimeUnits::parse("days since 1970-01-01").unwrap();
        let date = units
            .decode(11_017.5, Calendar::ProlepticGregorian)
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::days(11_017)
            + chrono::Duration::hours(12);
        assert_eq!(date.to_naive_datetime(), Some(expected));
        assert_eq!((date.year(), date.month(), date.day()), (2000, 3, 1));
        assert_eq!(date.to_string(), "2000-03-01 12:00:00 (proleptic_gregorian)");
    }

    #[test]
    fn standard_calendar_skips_reform_gap() {
        let units = CfTimeUnits::parse("days since 1582-10-04").unwrap();
        let date = units.decode(1.0, Calendar::Standard).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (1582, 10, 15));
        assert!(date.to_naive_datetime().is_some());

        let julian = units.decode(0.0, Calendar::Standard).unwrap();
        assert_eq!(julian.to_naive_datetime(), None);
        let no_leap = CalendarDate::new(2001, 3, 1, Calendar::NoLeap).unwrap();
        assert_eq!(no_leap.to_naive_datetime(), None);
    }

    #[test]
    fn encode_inverts_decode() {
        let units = CfTimeUnits::parse("hours since 2000-01-01T06:00").unwrap();
        for calendar in [Calendar::Day360, Calendar::Julian, Calendar::Standard] {
            let date = units.decode(1234.0, calendar).unwrap();
            assert!((units.encode(&date).unwrap() - 1234.0).abs() < 1e-9);
        }
    }

    #[test]
    fn time_coordinate_is_consistent() {
        let units = CfTimeUnits::parse("days since 2000-01-01 00:00:00 UTC").unwrap();
        let coord = TimeCoordinate::from_offset(540.0, &units, Calendar::Day360).unwrap();
        assert_eq!(coord.fractional_year, 2001.5);
        assert_eq!(coord.days_since_epoch, 540.0);
    }

    #[test]
    fn invalid_units_rejected() {
        assert!(CfTimeUnits::parse("fortnights since 2000-01-01").is_err());
        assert!(CfTimeUnits::parse("days after 2000-01-01").is_err());
        assert!(CfTimeUnits::parse("days since 2000-13-01").is_err());
    }

    #[test]
    fn check_datarange_boundaries() {
        let times = [2000.0, 2000.5, 2001.0, 2001.5];
        assert!(check_datarange(&times, 2000.0, 2001.5).is_ok());
        assert!(check_datarange(&times, 2000.5, 2001.0).is_ok());
        assert!(matches!(
            check_datarange(&times, 1999.9, 2001.0),
            Err(IceMassError::DateOutOfRange { .. })
        ));
        assert!(matches!(
            check_datarange(&times, 2000.0, 2001.6),
            Err(IceMassError::DateOutOfRange { .. })
        ));
        assert!(check_datarange(&[], 2000.0, 2001.0).is_err());
    }
}
