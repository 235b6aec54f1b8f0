//! RP2040-specific HAL for the real-time domain
//!
//! This crate provides RP2040-specific implementations:
//! - Wall-clock time source over the on-chip RTC

#![no_std]

pub mod rtc;

pub use rtc::RtcTimeSource;
