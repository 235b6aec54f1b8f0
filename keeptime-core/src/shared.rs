//! Shared singleton access
//!
//! The RTC domain is global per device. [`SharedRtc`] owns the one [`Rtc`]
//! behind a blocking mutex and hands out [`RtcHandle`]s; every handle
//! refers to the same state. Each operation holds the lock for its whole
//! duration, so a torn read or write of the multi-field header cannot be
//! observed from another context.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Vec;
use keeptime_hal::TimeSource;

use crate::clock::DateTime;
use crate::error::RtcError;
use crate::region::RegionStatus;
use crate::rtc::Rtc;
use crate::traits::RtcDevice;

/// Mutex-guarded RTC
pub struct SharedRtc<'a, M: RawMutex, T, const N: usize> {
    inner: Mutex<M, RefCell<Rtc<'a, T, N>>>,
}

impl<'a, M: RawMutex, T: TimeSource, const N: usize> SharedRtc<'a, M, T, N> {
    /// Take ownership of the device RTC
    pub fn new(rtc: Rtc<'a, T, N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(rtc)),
        }
    }

    /// Get a handle to the shared RTC
    pub fn handle(&self) -> RtcHandle<'_, 'a, M, T, N> {
        RtcHandle { shared: self }
    }

    /// Run `f` with exclusive access to the RTC
    pub fn with<R>(&self, f: impl FnOnce(&mut Rtc<'a, T, N>) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Handle to the shared RTC
///
/// Cheap to copy; all copies operate on the same retained region and clock.
pub struct RtcHandle<'s, 'a, M: RawMutex, T, const N: usize> {
    shared: &'s SharedRtc<'a, M, T, N>,
}

impl<M: RawMutex, T, const N: usize> Clone for RtcHandle<'_, '_, M, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: RawMutex, T, const N: usize> Copy for RtcHandle<'_, '_, M, T, N> {}

impl<'s, 'a, M: RawMutex, T: TimeSource, const N: usize> RtcHandle<'s, 'a, M, T, N> {
    /// Set the clock if `time` is given, then re-validate retained memory
    pub fn init(&self, time: Option<&DateTime>) -> Result<RegionStatus, RtcError> {
        self.shared.with(|rtc| rtc.init(time))
    }

    /// Current date and time
    pub fn datetime(&self) -> Result<DateTime, RtcError> {
        self.shared.with(|rtc| rtc.now())
    }

    /// Set the date and time (weekday ignored)
    pub fn set_datetime(&self, time: &DateTime) -> Result<(), RtcError> {
        self.shared.with(|rtc| rtc.set(time))
    }

    /// Retained payload (empty when nothing valid is stored)
    pub fn memory(&self) -> Vec<u8, N> {
        self.shared.with(|rtc| rtc.load())
    }

    /// Replace the retained payload
    pub fn set_memory(&self, data: &[u8]) -> Result<(), RtcError> {
        self.shared.with(|rtc| rtc.store(data))
    }

    /// Retained payload capacity in bytes
    pub fn capacity(&self) -> usize {
        N
    }
}
