//! Proleptic Gregorian calendar math
//!
//! Conversions between seconds since the Unix epoch and calendar fields.
//! Day counting follows the civil-from-days / days-from-civil scheme on
//! 400-year eras, so dates before 1970 and far in the future work too.
//!
//! All functions are total: out-of-range inputs are carried arithmetically
//! (month 13 becomes January of the next year, second 60 becomes the next
//! minute) instead of being rejected.

use crate::clock::DateTime;

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Days in a 400-year era
const DAYS_PER_ERA: i64 = 146_097;

/// Days from 0000-03-01 to 1970-01-01
const EPOCH_SHIFT: i64 = 719_468;

/// 1970-01-01 was a Thursday (Monday = 0)
const EPOCH_WEEKDAY: i64 = 3;

/// Check for a Gregorian leap year
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`
///
/// Returns 0 for a month outside 1-12.
pub const fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since 1970-01-01 for a calendar date
///
/// `month` and `day` may be out of range; the excess is carried.
pub fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    // Normalize month into 1-12, carrying whole years
    let month0 = month - 1;
    let year = year + month0.div_euclid(12);
    let month = month0.rem_euclid(12) + 1;

    // Count from March so the leap day falls at the end of the year
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year.rem_euclid(400);
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;

    era * DAYS_PER_ERA + doe - EPOCH_SHIFT + (day - 1)
}

/// Calendar date `(year, month, day)` for days since 1970-01-01
pub fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + EPOCH_SHIFT;
    let era = z.div_euclid(DAYS_PER_ERA);
    let doe = z.rem_euclid(DAYS_PER_ERA);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };

    (year, month as u8, day as u8)
}

/// Weekday for days since 1970-01-01 (Monday = 0 .. Sunday = 6)
pub fn weekday_from_days(days: i64) -> u8 {
    (days + EPOCH_WEEKDAY).rem_euclid(7) as u8
}

/// Day of the year, 1-based (1 January = 1)
pub fn year_day(year: i32, month: u8, day: u8) -> u16 {
    let year = i64::from(year);
    let days = days_from_civil(year, i64::from(month), i64::from(day));
    (days - days_from_civil(year, 1, 1) + 1) as u16
}

/// Seconds since 1970-01-01T00:00:00 for calendar fields
pub fn seconds_since_epoch(
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
) -> i64 {
    let days = days_from_civil(i64::from(year), i64::from(month), i64::from(day));
    days * SECONDS_PER_DAY
        + i64::from(hour) * SECONDS_PER_HOUR
        + i64::from(minute) * SECONDS_PER_MINUTE
        + i64::from(second)
}

/// Calendar fields for seconds since 1970-01-01T00:00:00
///
/// The microsecond field is left at 0. Years beyond the `i32` range wrap.
pub fn datetime_from_seconds(seconds: i64) -> DateTime {
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    let secs_of_day = seconds.rem_euclid(SECONDS_PER_DAY);
    let (year, month, day) = civil_from_days(days);

    DateTime {
        year: year as i32,
        month,
        day,
        weekday: weekday_from_days(days),
        hour: (secs_of_day / SECONDS_PER_HOUR) as u8,
        minute: (secs_of_day % SECONDS_PER_HOUR / SECONDS_PER_MINUTE) as u8,
        second: (secs_of_day % SECONDS_PER_MINUTE) as u8,
        microsecond: 0,
    }
}
