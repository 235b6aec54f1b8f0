//! RTC facade
//!
//! Combines the wall clock and the retained-region validator behind the
//! [`RtcDevice`] interface. Construct exactly one per device.

use heapless::Vec;
use keeptime_hal::TimeSource;

use crate::clock::{DateTime, WallClock};
use crate::error::RtcError;
use crate::region::{RegionStatus, RetainedBlock, RetainedRegion};
use crate::traits::RtcDevice;

/// Real-time clock with retained user memory
#[derive(Debug)]
pub struct Rtc<'a, T, const N: usize> {
    clock: WallClock<T>,
    region: RetainedRegion<'a, N>,
}

impl<'a, T: TimeSource, const N: usize> Rtc<'a, T, N> {
    /// Create the RTC over a time source and a retained block
    ///
    /// Nothing is read or written until [`Rtc::init`].
    pub fn new(source: T, block: &'a mut RetainedBlock<N>) -> Self {
        Self {
            clock: WallClock::new(source),
            region: RetainedRegion::new(block),
        }
    }

    /// Module initialization
    ///
    /// Sets the clock when `time` is given, then re-validates the retained
    /// region. A clock failure is returned before the region is touched.
    pub fn init(&mut self, time: Option<&DateTime>) -> Result<RegionStatus, RtcError> {
        if let Some(time) = time {
            self.clock.set(time)?;
        }
        Ok(self.region.initialize())
    }

    /// Wall clock
    pub fn clock(&mut self) -> &mut WallClock<T> {
        &mut self.clock
    }

    /// Retained-region validator
    pub fn region(&mut self) -> &mut RetainedRegion<'a, N> {
        &mut self.region
    }
}

impl<T: TimeSource, const N: usize> RtcDevice<N> for Rtc<'_, T, N> {
    fn load(&mut self) -> Vec<u8, N> {
        self.region.load()
    }

    fn store(&mut self, data: &[u8]) -> Result<(), RtcError> {
        Ok(self.region.store(data)?)
    }

    fn now(&mut self) -> Result<DateTime, RtcError> {
        Ok(self.clock.now()?)
    }

    fn set(&mut self, time: &DateTime) -> Result<(), RtcError> {
        Ok(self.clock.set(time)?)
    }
}
