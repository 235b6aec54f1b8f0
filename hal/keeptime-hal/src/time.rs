//! Time source abstractions
//!
//! A time source supplies and accepts the current wall-clock time as
//! seconds since the Unix epoch (1970-01-01T00:00:00) plus a microsecond
//! fraction. Calendar conversion happens above this layer.

/// Microseconds in one second
pub const MICROS_PER_SECOND: u32 = 1_000_000;

/// A point in wall-clock time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp {
    /// Whole seconds since 1970-01-01T00:00:00
    pub seconds: i64,
    /// Sub-second fraction in microseconds
    ///
    /// Normally below [`MICROS_PER_SECOND`], but values are passed
    /// through unchecked; range handling is up to the time source.
    pub micros: u32,
}

impl Timestamp {
    /// Create a timestamp from seconds and microseconds
    pub const fn new(seconds: i64, micros: u32) -> Self {
        Self { seconds, micros }
    }

    /// Create a timestamp on a whole second
    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds, micros: 0 }
    }

    /// Total microseconds since the epoch
    pub const fn as_micros(&self) -> i64 {
        self.seconds * MICROS_PER_SECOND as i64 + self.micros as i64
    }

    /// Build a timestamp from total microseconds since the epoch
    pub const fn from_micros(micros: i64) -> Self {
        Self {
            seconds: micros.div_euclid(MICROS_PER_SECOND as i64),
            micros: micros.rem_euclid(MICROS_PER_SECOND as i64) as u32,
        }
    }

    /// Limit to the whole seconds `min..=max`
    ///
    /// A time before `min` snaps to the start of `min`; a time after `max`
    /// snaps to the last microsecond of `max`. Times inside keep their
    /// fraction.
    pub const fn clamp_seconds(self, min: i64, max: i64) -> Self {
        if self.seconds < min {
            Self::from_seconds(min)
        } else if self.seconds > max {
            Self::new(max, MICROS_PER_SECOND - 1)
        } else {
            self
        }
    }
}

/// Errors from the time source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// Reading the clock failed
    Read,
    /// Writing the clock failed
    Write,
    /// Clock is not running (never set, or stopped)
    NotRunning,
    /// The requested time cannot be represented by the hardware
    OutOfRange,
}

/// Wall-clock time source
///
/// Implemented by chip HALs over their calendar/timer peripheral.
/// Errors are reported as-is; callers do not retry.
pub trait TimeSource {
    /// Read the current time
    fn now(&mut self) -> Result<Timestamp, TimeError>;

    /// Set the current time
    ///
    /// No range validation is expected from callers; an implementation
    /// that cannot hold `time` returns [`TimeError::OutOfRange`].
    fn set(&mut self, time: Timestamp) -> Result<(), TimeError>;
}

impl<T: TimeSource + ?Sized> TimeSource for &mut T {
    fn now(&mut self) -> Result<Timestamp, TimeError> {
        (**self).now()
    }

    fn set(&mut self, time: Timestamp) -> Result<(), TimeError> {
        (**self).set(time)
    }
}
