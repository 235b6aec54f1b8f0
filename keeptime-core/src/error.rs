//! Error types
//!
//! Integrity failures of the retained region are not errors: they are
//! healed in place and reported through [`crate::RegionStatus`].

use keeptime_hal::TimeError;

/// Errors from retained-region writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegionError {
    /// Payload exceeds the configured capacity
    PayloadTooLarge,
}

/// Errors from the [`crate::Rtc`] facade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// Payload exceeds the configured capacity
    PayloadTooLarge,
    /// Time source failure, passed through unchanged
    Time(TimeError),
}

impl From<RegionError> for RtcError {
    fn from(e: RegionError) -> Self {
        match e {
            RegionError::PayloadTooLarge => RtcError::PayloadTooLarge,
        }
    }
}

impl From<TimeError> for RtcError {
    fn from(e: TimeError) -> Self {
        RtcError::Time(e)
    }
}
