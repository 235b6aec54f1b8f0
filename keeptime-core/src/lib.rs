//! Board-agnostic core logic for the retained RTC domain
//!
//! This crate contains all logic that does not depend on a specific chip:
//!
//! - Retained-region validator (magic tag, length, optional checksum)
//! - Folded CRC-32 over the region header and payload
//! - Proleptic Gregorian calendar conversion
//! - Wall clock over a [`keeptime_hal::TimeSource`]
//! - The [`Rtc`] facade and its shared singleton handle
//!
//! # Persisted layout
//!
//! ```text
//! ┌───────┬────────────┬──────────┬──────────────┐
//! │ MAGIC │ STORED_LEN │ CHECKSUM │ PAYLOAD      │
//! │ 4B    │ 2B         │ 2B (opt) │ capacity B   │
//! └───────┴────────────┴──────────┴──────────────┘
//! ```
//!
//! All header fields use the native byte order. The checksum field only
//! exists when the `checksum` feature is enabled.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod calendar;
#[cfg(feature = "checksum")]
pub mod checksum;
pub mod clock;
pub mod error;
pub mod region;
pub mod rtc;
pub mod shared;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{DateTime, WallClock};
pub use error::{RegionError, RtcError};
pub use region::{
    RegionStatus, RetainedBlock, RetainedRegion, HEADER_LEN, MEM_MAGIC, MEM_MAGIC_CHECKED,
    MEM_MAGIC_PLAIN,
};
pub use rtc::Rtc;
pub use shared::{RtcHandle, SharedRtc};
pub use traits::RtcDevice;
