//! RTC time source
//!
//! The RP2040 RTC keeps calendar time with one-second resolution. The
//! sub-second fraction comes from the embassy time driver: on every set
//! (or the first read after boot) the current epoch time is anchored to
//! an [`Instant`], and reads extrapolate from that anchor.
//!
//! The RTC stays the reference. Once the anchor is older than
//! [`RESYNC_AFTER`], a read checks the extrapolated time against the RTC
//! seconds, pulls it back into range and re-anchors.

use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime as ChipDateTime, DayOfWeek, Rtc, RtcError};
use embassy_time::{Duration, Instant};
use keeptime_core::calendar;
use keeptime_hal::{TimeError, TimeSource, Timestamp};

/// Highest year the RTC registers can hold
const MAX_YEAR: i32 = 4095;

/// Anchor age after which reads are checked against the RTC
pub const RESYNC_AFTER: Duration = Duration::from_secs(1);

/// Epoch time pinned to a monotonic instant
#[derive(Debug, Clone, Copy)]
struct Anchor {
    at: Instant,
    epoch_micros: i64,
}

/// Time source backed by the RP2040 RTC
pub struct RtcTimeSource<'d> {
    rtc: Rtc<'d, RTC>,
    anchor: Option<Anchor>,
}

impl<'d> RtcTimeSource<'d> {
    /// Wrap an RTC driver
    pub fn new(rtc: Rtc<'d, RTC>) -> Self {
        Self { rtc, anchor: None }
    }

    /// Check whether the RTC has been set and is counting
    pub fn is_running(&self) -> bool {
        self.rtc.is_running()
    }

    /// Read whole seconds since the epoch from the RTC
    fn read_seconds(&mut self) -> Result<i64, TimeError> {
        let now = self.rtc.now().map_err(map_rtc_error)?;
        Ok(calendar::seconds_since_epoch(
            i32::from(now.year),
            now.month,
            now.day,
            now.hour,
            now.minute,
            now.second,
        ))
    }

    fn set_anchor(&mut self, at: Instant, time: Timestamp) {
        self.anchor = Some(Anchor {
            at,
            epoch_micros: time.as_micros(),
        });
    }
}

impl TimeSource for RtcTimeSource<'_> {
    fn now(&mut self) -> Result<Timestamp, TimeError> {
        let now = Instant::now();
        let Some(anchor) = self.anchor else {
            let time = Timestamp::from_seconds(self.read_seconds()?);
            self.set_anchor(now, time);
            return Ok(time);
        };

        let age = now.duration_since(anchor.at);
        let extrapolated = Timestamp::from_micros(anchor.epoch_micros + age.as_micros() as i64);
        if age < RESYNC_AFTER {
            return Ok(extrapolated);
        }

        // The RTC counts whole seconds from the last set, which need not
        // fall on a second boundary, so allow one second of phase
        let seconds = self.read_seconds()?;
        let time = extrapolated.clamp_seconds(seconds, seconds + 1);
        self.set_anchor(now, time);
        Ok(time)
    }

    fn set(&mut self, time: Timestamp) -> Result<(), TimeError> {
        let dt = calendar::datetime_from_seconds(time.seconds);
        if !(0..=MAX_YEAR).contains(&dt.year) {
            return Err(TimeError::OutOfRange);
        }

        let chip = ChipDateTime {
            year: dt.year as u16,
            month: dt.month,
            day: dt.day,
            day_of_week: day_of_week(dt.weekday),
            hour: dt.hour,
            minute: dt.minute,
            second: dt.second,
        };
        self.rtc.set_datetime(chip).map_err(|e| match e {
            RtcError::NotRunning => TimeError::NotRunning,
            _ => TimeError::Write,
        })?;

        self.set_anchor(Instant::now(), time);
        Ok(())
    }
}

fn map_rtc_error(e: RtcError) -> TimeError {
    match e {
        RtcError::NotRunning => TimeError::NotRunning,
        _ => TimeError::Read,
    }
}

/// Chip weekday for a Monday-based weekday index
fn day_of_week(weekday: u8) -> DayOfWeek {
    match weekday {
        0 => DayOfWeek::Monday,
        1 => DayOfWeek::Tuesday,
        2 => DayOfWeek::Wednesday,
        3 => DayOfWeek::Thursday,
        4 => DayOfWeek::Friday,
        5 => DayOfWeek::Saturday,
        _ => DayOfWeek::Sunday,
    }
}
