//! Wall-clock accessor
//!
//! A pass-through view over a [`TimeSource`]: reads convert seconds since
//! the epoch into calendar fields, writes convert back. Nothing is stored
//! here and no field ranges are checked.

use keeptime_hal::{TimeError, TimeSource, Timestamp};

use crate::calendar;

/// Calendar date and time
///
/// On reads every field is populated. On writes `weekday` is ignored;
/// it is always derived from the date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    /// Full year (e.g. 2024)
    pub year: i32,
    /// Month, 1-12
    pub month: u8,
    /// Day of the month, 1-31
    pub day: u8,
    /// Day of the week, 0 = Monday .. 6 = Sunday
    pub weekday: u8,
    /// Hour, 0-23
    pub hour: u8,
    /// Minute, 0-59
    pub minute: u8,
    /// Second, 0-59
    pub second: u8,
    /// Sub-second fraction in microseconds
    pub microsecond: u32,
}

/// `(year, month, day, weekday, hour, minute, second, microsecond)`
pub type DateTimeTuple = (i32, u8, u8, u8, u8, u8, u8, u32);

impl DateTime {
    /// Create a date/time for writing; weekday is left at 0
    pub const fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        microsecond: u32,
    ) -> Self {
        Self {
            year,
            month,
            day,
            weekday: 0,
            hour,
            minute,
            second,
            microsecond,
        }
    }

    /// Convert to the 8-tuple form
    pub const fn to_tuple(&self) -> DateTimeTuple {
        (
            self.year,
            self.month,
            self.day,
            self.weekday,
            self.hour,
            self.minute,
            self.second,
            self.microsecond,
        )
    }

    /// Seconds since the epoch for the calendar fields (weekday ignored)
    pub fn epoch_seconds(&self) -> i64 {
        calendar::seconds_since_epoch(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        )
    }

    /// Day of the year, 1-based
    pub fn year_day(&self) -> u16 {
        calendar::year_day(self.year, self.month, self.day)
    }

    /// Build from a timestamp, deriving the weekday
    pub fn from_timestamp(ts: Timestamp) -> Self {
        let mut dt = calendar::datetime_from_seconds(ts.seconds);
        dt.microsecond = ts.micros;
        dt
    }

    /// Timestamp for the calendar fields (weekday ignored)
    pub fn to_timestamp(&self) -> Timestamp {
        Timestamp::new(self.epoch_seconds(), self.microsecond)
    }
}

impl From<DateTimeTuple> for DateTime {
    fn from(t: DateTimeTuple) -> Self {
        Self {
            year: t.0,
            month: t.1,
            day: t.2,
            weekday: t.3,
            hour: t.4,
            minute: t.5,
            second: t.6,
            microsecond: t.7,
        }
    }
}

impl From<DateTime> for DateTimeTuple {
    fn from(dt: DateTime) -> Self {
        dt.to_tuple()
    }
}

/// Calendar view over a time source
#[derive(Debug)]
pub struct WallClock<T> {
    source: T,
}

impl<T: TimeSource> WallClock<T> {
    /// Create a wall clock over a time source
    pub const fn new(source: T) -> Self {
        Self { source }
    }

    /// Read the current date and time
    pub fn now(&mut self) -> Result<DateTime, TimeError> {
        self.source.now().map(DateTime::from_timestamp)
    }

    /// Set the current date and time
    ///
    /// `time.weekday` is not consulted. Fields are not range-checked.
    pub fn set(&mut self, time: &DateTime) -> Result<(), TimeError> {
        self.source.set(time.to_timestamp())
    }

    /// Access the underlying time source
    pub fn source(&mut self) -> &mut T {
        &mut self.source
    }

    /// Release the underlying time source
    pub fn into_inner(self) -> T {
        self.source
    }
}
