//! Retained RAM placement
//!
//! The retained block sits in the `.uninit` section, which cortex-m-rt
//! neither zeroes nor initializes at reset. Whatever the previous run (or
//! power-on) left there is handed to the validator untouched.

use core::mem::MaybeUninit;
use core::ptr::addr_of_mut;

use portable_atomic::{AtomicBool, Ordering};

use keeptime_core::RetainedBlock;

use crate::config::USER_MEM_MAX;

/// The device's retained block
#[link_section = ".uninit.keeptime.RETAINED"]
static mut RETAINED: MaybeUninit<RetainedBlock<USER_MEM_MAX>> = MaybeUninit::uninit();

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Take the retained block
///
/// Returns `None` after the first call, so only one validator can ever
/// own the block.
pub fn take() -> Option<&'static mut RetainedBlock<USER_MEM_MAX>> {
    if TAKEN.swap(true, Ordering::AcqRel) {
        return None;
    }

    // SAFETY: TAKEN guarantees this is the only reference ever created.
    // RetainedBlock is plain bytes with alignment 1, so every bit pattern
    // the RAM may hold after reset is a valid value.
    unsafe { Some((*addr_of_mut!(RETAINED)).assume_init_mut()) }
}
