//! Capability interface for the real-time domain
//!
//! The host binding layer talks to this trait; [`crate::Rtc`] is the one
//! concrete implementation on a device.

use heapless::Vec;

use crate::clock::DateTime;
use crate::error::RtcError;

/// Retained memory plus wall clock
pub trait RtcDevice<const N: usize> {
    /// Copy out the retained payload (empty when nothing valid is stored)
    fn load(&mut self) -> Vec<u8, N>;

    /// Replace the retained payload
    fn store(&mut self, data: &[u8]) -> Result<(), RtcError>;

    /// Read the current date and time
    fn now(&mut self) -> Result<DateTime, RtcError>;

    /// Set the current date and time (weekday ignored)
    fn set(&mut self, time: &DateTime) -> Result<(), RtcError>;

    /// Retained payload capacity in bytes
    fn capacity(&self) -> usize {
        N
    }
}
