//! Keeptime - Retained RTC Memory Firmware
//!
//! Firmware binary for RP2040-based boards. Brings up the RTC, validates
//! the retained memory block left by the previous run and keeps a boot
//! counter in it, then reports the wall clock periodically.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::rtc::Rtc as ChipRtc;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Timer;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use keeptime_core::{RegionStatus, Rtc, RtcError, RtcHandle, SharedRtc};
use keeptime_hal::TimeError;
use keeptime_hal_rp2040::RtcTimeSource;

use crate::config::{DEFAULT_DATETIME, USER_MEM_MAX};

mod config;
mod retained;

/// The device RTC, shared by every context that needs it
type DeviceRtc = SharedRtc<'static, CriticalSectionRawMutex, RtcTimeSource<'static>, USER_MEM_MAX>;

/// Handle type used by the application
type Handle = RtcHandle<'static, 'static, CriticalSectionRawMutex, RtcTimeSource<'static>, USER_MEM_MAX>;

/// Interval between clock reports
const REPORT_INTERVAL_S: u64 = 60;

// Static cell for the RTC singleton (must live forever for handle references)
static RTC: StaticCell<DeviceRtc> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Keeptime firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let source = RtcTimeSource::new(ChipRtc::new(p.RTC));
    let running = source.is_running();

    let Some(block) = retained::take() else {
        // Only reachable if take() was called twice
        defmt::panic!("Retained block already taken");
    };

    let shared: &'static DeviceRtc = RTC.init(SharedRtc::new(Rtc::new(source, block)));
    let rtc = shared.handle();

    // Seed the clock only when it has never been set since power-up
    let seed = if running { None } else { Some(&DEFAULT_DATETIME) };
    match rtc.init(seed) {
        Ok(RegionStatus::Valid) => info!("Retained memory valid ({} bytes max)", USER_MEM_MAX),
        Ok(RegionStatus::Empty) => info!("Retained memory empty"),
        Ok(RegionStatus::Healed) => warn!("Retained memory invalid, reset to empty"),
        Err(e) => error!("RTC init failed: {:?}", e),
    }

    #[cfg(user_mem)]
    bump_boot_count(rtc);

    loop {
        report_time(rtc);
        Timer::after_secs(REPORT_INTERVAL_S).await;
    }
}

/// Log the current wall-clock time
fn report_time(rtc: Handle) {
    match rtc.datetime() {
        Ok(dt) => info!("Time: {}", dt),
        Err(RtcError::Time(TimeError::NotRunning)) => warn!("RTC not running"),
        Err(e) => error!("Failed to read clock: {:?}", e),
    }
}

/// Count boots in retained memory
///
/// The counter survives resets and deep sleep; it starts over whenever
/// the retained block fails validation.
#[cfg(user_mem)]
fn bump_boot_count(rtc: Handle) {
    let stored = rtc.memory();
    let count = match <[u8; 4]>::try_from(stored.as_slice()) {
        Ok(bytes) => u32::from_le_bytes(bytes).wrapping_add(1),
        Err(_) => {
            if !stored.is_empty() {
                warn!("Retained memory holds {} bytes, not a boot counter", stored.len());
            }
            1
        }
    };

    match rtc.set_memory(&count.to_le_bytes()) {
        Ok(()) => info!("Boot count: {}", count),
        Err(e) => error!("Failed to store boot count: {:?}", e),
    }
}
