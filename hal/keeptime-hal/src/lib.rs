//! Keeptime Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits for the real-time
//! domain. Chip-specific HALs (RP2040, ...) implement them so the same
//! retained-memory and clock logic runs on different hardware.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (keeptime-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keeptime-core (validator, clock, Rtc)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  keeptime-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ keeptime-hal- │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`time::TimeSource`] - Wall-clock seconds and sub-second fraction

#![no_std]
#![deny(unsafe_code)]

pub mod time;

// Re-export key traits at crate root for convenience
pub use time::{TimeError, TimeSource, Timestamp, MICROS_PER_SECOND};
