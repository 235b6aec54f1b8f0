//! Retained-region validator
//!
//! The retained block lives in RAM that survives reset and deep sleep but
//! is never zeroed, so its content may be anything: a valid payload from
//! an earlier run, a store torn by a reset, leftovers from unrelated
//! firmware, or power-on noise. Nothing about it is cached; validity is
//! re-derived from the raw bytes on every call.
//!
//! Invalid content is not an error. It is reset to the canonical empty
//! state (`magic = 0`, `stored_len = 0`) the first time it is observed.
//!
//! Images built with and without the `checksum` feature lay the block out
//! differently (the checksum slot shifts the payload by two bytes), so
//! each variant writes its own magic. An image without checksum support
//! still reads a block committed by a checksum image, skipping the check
//! it cannot perform; the reverse is rejected and healed.

use core::ops::Range;

use heapless::Vec;

use crate::error::RegionError;

/// Sentinel written by images with checksum support
pub const MEM_MAGIC_CHECKED: u32 = 0x7550_7921;

/// Sentinel written by images without checksum support
pub const MEM_MAGIC_PLAIN: u32 = 0x7550_79DE;

/// Sentinel written on every successful store by this image
#[cfg(feature = "checksum")]
pub const MEM_MAGIC: u32 = MEM_MAGIC_CHECKED;
#[cfg(not(feature = "checksum"))]
pub const MEM_MAGIC: u32 = MEM_MAGIC_PLAIN;

/// Size of the magic field
const MAGIC_LEN: usize = 4;

/// Size of the length field
const LENGTH_LEN: usize = 2;

/// Size of the checksum slot in a checksum-enabled layout
#[cfg(not(feature = "checksum"))]
const FOREIGN_CHECKSUM_LEN: usize = 2;

/// Size of the checksum field
#[cfg(feature = "checksum")]
const CHECKSUM_LEN: usize = 2;
#[cfg(not(feature = "checksum"))]
const CHECKSUM_LEN: usize = 0;

/// Bytes in front of the payload
pub const HEADER_LEN: usize = MAGIC_LEN + LENGTH_LEN + CHECKSUM_LEN;

/// Raw retained block
///
/// Every field is a byte array, so the block has alignment 1 and no
/// padding: it occupies exactly [`Self::SIZE`] bytes of retained RAM.
/// Multi-byte values use the native byte order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct RetainedBlock<const N: usize> {
    magic: [u8; MAGIC_LEN],
    stored_len: [u8; LENGTH_LEN],
    #[cfg(feature = "checksum")]
    checksum: [u8; CHECKSUM_LEN],
    data: [u8; N],
}

impl<const N: usize> RetainedBlock<N> {
    /// Persisted size in bytes
    pub const SIZE: usize = HEADER_LEN + N;

    /// The length field is 16 bits wide
    const CAPACITY_FITS: () = assert!(N <= u16::MAX as usize, "capacity exceeds u16 length field");

    /// All-zero block
    ///
    /// For boards without no-init RAM and for tests. A zeroed block is the
    /// canonical empty state.
    pub const fn zeroed() -> Self {
        Self::filled(0)
    }

    /// Block with every byte set to `byte`
    pub const fn filled(byte: u8) -> Self {
        let () = Self::CAPACITY_FITS;
        Self {
            magic: [byte; MAGIC_LEN],
            stored_len: [byte; LENGTH_LEN],
            #[cfg(feature = "checksum")]
            checksum: [byte; CHECKSUM_LEN],
            data: [byte; N],
        }
    }

    /// Stored magic value, as found
    pub fn magic(&self) -> u32 {
        u32::from_ne_bytes(self.magic)
    }

    /// Stored length value, as found (not validated)
    pub fn raw_len(&self) -> u16 {
        u16::from_ne_bytes(self.stored_len)
    }

    /// Stored checksum value, as found
    #[cfg(feature = "checksum")]
    pub fn checksum(&self) -> u16 {
        u16::from_ne_bytes(self.checksum)
    }

    /// Whole payload area, including bytes past the stored length
    pub fn data(&self) -> &[u8; N] {
        &self.data
    }

    fn set_magic(&mut self, magic: u32) {
        self.magic = magic.to_ne_bytes();
    }

    fn set_len(&mut self, len: u16) {
        self.stored_len = len.to_ne_bytes();
    }

    /// Where the payload sits in `data`, if the header is plausible
    ///
    /// Checks the magic and that the length fits; the checksum is
    /// verified separately.
    fn payload_range(&self) -> Option<Range<usize>> {
        let len = usize::from(self.raw_len());
        match self.magic() {
            MEM_MAGIC if len <= N => Some(0..len),
            // Committed by a checksum image: its checksum slot occupies
            // the first two bytes of our payload area
            #[cfg(not(feature = "checksum"))]
            MEM_MAGIC_CHECKED if len + FOREIGN_CHECKSUM_LEN <= N => {
                Some(FOREIGN_CHECKSUM_LEN..FOREIGN_CHECKSUM_LEN + len)
            }
            _ => None,
        }
    }

    /// Checksum over the current header and `payload`
    #[cfg(feature = "checksum")]
    fn compute_checksum(&self, payload: &[u8]) -> u16 {
        crate::checksum::region_checksum(self.magic, self.stored_len, payload)
    }

    /// Full validity check: header plus checksum when enabled
    fn valid_range(&self) -> Option<Range<usize>> {
        let range = self.payload_range()?;

        #[cfg(feature = "checksum")]
        {
            if self.compute_checksum(&self.data[range.clone()]) != self.checksum() {
                return None;
            }
        }

        Some(range)
    }

    /// Canonical empty state, as left by a heal
    fn is_cleared(&self) -> bool {
        self.magic() == 0 && self.raw_len() == 0
    }

    /// Reset to the canonical empty state
    fn heal(&mut self) {
        self.set_magic(0);
        self.set_len(0);
    }
}

impl<const N: usize> Default for RetainedBlock<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Outcome of [`RetainedRegion::initialize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegionStatus {
    /// Content was valid and has been kept
    Valid,
    /// Region was already in the canonical empty state
    Empty,
    /// Content was invalid and has been reset to empty
    Healed,
}

/// Validator over a retained block
///
/// The block is handed in by the caller (usually a `static` in a no-init
/// RAM section); the validator never allocates or caches it.
#[derive(Debug)]
pub struct RetainedRegion<'a, const N: usize> {
    block: &'a mut RetainedBlock<N>,
}

impl<'a, const N: usize> RetainedRegion<'a, N> {
    /// Wrap a retained block without touching it
    pub fn new(block: &'a mut RetainedBlock<N>) -> Self {
        Self { block }
    }

    /// Maximum payload size in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Read-only view of the raw block
    pub fn block(&self) -> &RetainedBlock<N> {
        self.block
    }

    /// Check validity without healing
    pub fn is_valid(&self) -> bool {
        self.block.valid_range().is_some()
    }

    /// Trusted payload length (0 when the region is invalid)
    pub fn stored_len(&self) -> usize {
        self.block.valid_range().map_or(0, |range| range.len())
    }

    /// Validate the region once at boot
    ///
    /// Valid content is kept as-is; anything else is reset to empty.
    /// Calling it again on a healed region reports [`RegionStatus::Empty`].
    pub fn initialize(&mut self) -> RegionStatus {
        if self.block.valid_range().is_some() {
            RegionStatus::Valid
        } else if self.block.is_cleared() {
            RegionStatus::Empty
        } else {
            self.block.heal();
            RegionStatus::Healed
        }
    }

    /// Copy out the stored payload
    ///
    /// Returns an empty vector when nothing is stored or the region is
    /// invalid; an invalid region is healed on the way.
    pub fn load(&mut self) -> Vec<u8, N> {
        let Some(range) = self.block.payload_range() else {
            self.block.heal();
            return Vec::new();
        };

        if range.is_empty() {
            return Vec::new();
        }

        let mut payload = Vec::new();
        if payload.extend_from_slice(&self.block.data[range]).is_err() {
            // Unreachable: payload_range bounds the range by N
            self.block.heal();
            return Vec::new();
        }

        // Verify against the copy, so the checked bytes are the returned bytes
        #[cfg(feature = "checksum")]
        {
            if self.block.compute_checksum(&payload) != self.block.checksum() {
                self.block.set_len(0);
                return Vec::new();
            }
        }

        payload
    }

    /// Replace the stored payload
    ///
    /// Fails with [`RegionError::PayloadTooLarge`] before touching the
    /// block when `data` exceeds the capacity. Bytes past the new length
    /// are left as they were.
    pub fn store(&mut self, data: &[u8]) -> Result<(), RegionError> {
        if data.len() > N {
            return Err(RegionError::PayloadTooLarge);
        }
        let len = u16::try_from(data.len()).map_err(|_| RegionError::PayloadTooLarge)?;

        self.block.set_magic(MEM_MAGIC);
        self.block.data[..data.len()].copy_from_slice(data);
        self.block.set_len(len);

        #[cfg(feature = "checksum")]
        {
            self.block.checksum = self.block.compute_checksum(data).to_ne_bytes();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CAP: usize = 64;

    #[test]
    fn test_layout_size() {
        assert_eq!(core::mem::size_of::<RetainedBlock<CAP>>(), HEADER_LEN + CAP);
        assert_eq!(core::mem::size_of::<RetainedBlock<0>>(), HEADER_LEN);
        assert_eq!(core::mem::size_of::<RetainedBlock<2048>>(), RetainedBlock::<2048>::SIZE);
        assert_eq!(core::mem::align_of::<RetainedBlock<CAP>>(), 1);
        #[cfg(feature = "checksum")]
        assert_eq!(HEADER_LEN, 8);
        #[cfg(not(feature = "checksum"))]
        assert_eq!(HEADER_LEN, 6);
    }

    #[test]
    fn test_zeroed_block_is_empty() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        let mut region = RetainedRegion::new(&mut block);

        assert!(!region.is_valid());
        assert!(region.load().is_empty());
        assert_eq!(region.stored_len(), 0);
    }

    #[test]
    fn test_store_then_load() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        let mut region = RetainedRegion::new(&mut block);

        region.store(b"hello retained world").unwrap();
        assert_eq!(region.load().as_slice(), b"hello retained world");
        assert_eq!(region.stored_len(), 20);
        assert_eq!(region.block().magic(), MEM_MAGIC);
    }

    #[test]
    fn test_store_full_capacity() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        let mut region = RetainedRegion::new(&mut block);

        let data = [0xA5u8; CAP];
        region.store(&data).unwrap();
        assert_eq!(region.load().as_slice(), &data[..]);
    }

    #[test]
    fn test_store_empty() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        let mut region = RetainedRegion::new(&mut block);

        region.store(b"abc").unwrap();
        region.store(b"").unwrap();
        assert!(region.load().is_empty());
        // An empty store is still a valid commit
        assert!(region.is_valid());
        assert_eq!(region.initialize(), RegionStatus::Valid);
    }

    #[test]
    fn test_oversize_rejected_without_mutation() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        let mut region = RetainedRegion::new(&mut block);
        region.store(b"keep me").unwrap();
        let before = region.block().clone();

        assert_eq!(region.store(&[0u8; CAP + 1]), Err(RegionError::PayloadTooLarge));
        assert_eq!(region.block(), &before);
        assert_eq!(region.load().as_slice(), b"keep me");
    }

    #[test]
    fn test_shorter_store_leaves_trailing_bytes() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        let mut region = RetainedRegion::new(&mut block);

        region.store(b"abcdef").unwrap();
        region.store(b"xy").unwrap();
        assert_eq!(region.load().as_slice(), b"xy");
        assert_eq!(&region.block().data()[..6], b"xycdef");
    }

    #[test]
    fn test_wrong_magic_heals_on_initialize() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        RetainedRegion::new(&mut block).store(b"payload").unwrap();
        block.set_magic(0xDEAD_BEEF);

        let mut region = RetainedRegion::new(&mut block);
        assert_eq!(region.initialize(), RegionStatus::Healed);
        assert!(region.load().is_empty());
        assert_eq!(region.block().raw_len(), 0);
        assert_eq!(region.block().magic(), 0);
    }

    #[test]
    fn test_wrong_magic_heals_on_load() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        RetainedRegion::new(&mut block).store(b"payload").unwrap();
        block.set_magic(MEM_MAGIC ^ 1);

        let mut region = RetainedRegion::new(&mut block);
        assert!(region.load().is_empty());
        assert_eq!(region.block().raw_len(), 0);
        assert!(region.load().is_empty());
    }

    #[test]
    fn test_length_beyond_capacity_heals() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        block.set_magic(MEM_MAGIC);
        block.set_len(CAP as u16 + 1);

        let mut region = RetainedRegion::new(&mut block);
        assert!(!region.is_valid());
        assert!(region.load().is_empty());
        assert_eq!(region.block().raw_len(), 0);
    }

    #[test]
    fn test_power_on_garbage() {
        for byte in [0x21, 0x55, 0xAA, 0xFF] {
            let mut block = RetainedBlock::<CAP>::filled(byte);
            let mut region = RetainedRegion::new(&mut block);

            assert_eq!(region.initialize(), RegionStatus::Healed);
            assert!(region.load().is_empty());
            assert_eq!(region.block().magic(), 0);
            assert_eq!(region.block().raw_len(), 0);
        }
    }

    #[test]
    fn test_zeroed_block_initializes_empty() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        let before = block.clone();
        let mut region = RetainedRegion::new(&mut block);

        assert_eq!(region.initialize(), RegionStatus::Empty);
        assert!(region.load().is_empty());
        assert_eq!(region.block(), &before);
    }

    #[test]
    fn test_initialize_idempotent() {
        let mut block = RetainedBlock::<CAP>::filled(0x5A);
        let mut region = RetainedRegion::new(&mut block);

        assert_eq!(region.initialize(), RegionStatus::Healed);
        let first = region.load();
        let healed = region.block().clone();

        // A second boot over the healed block has nothing left to repair
        assert_eq!(region.initialize(), RegionStatus::Empty);
        assert_eq!(region.initialize(), RegionStatus::Empty);
        assert_eq!(region.load(), first);
        assert_eq!(region.block(), &healed);

        region.store(b"boot count 7").unwrap();
        assert_eq!(region.initialize(), RegionStatus::Valid);
        assert_eq!(region.initialize(), RegionStatus::Valid);
        assert_eq!(region.load().as_slice(), b"boot count 7");
    }

    #[test]
    fn test_cleared_magic_with_stale_length_heals() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        block.set_len(5);

        let mut region = RetainedRegion::new(&mut block);
        assert_eq!(region.initialize(), RegionStatus::Healed);
        assert_eq!(region.initialize(), RegionStatus::Empty);
    }

    #[test]
    fn test_survives_rewrap() {
        // A new validator over the same block sees the committed payload
        let mut block = RetainedBlock::<CAP>::zeroed();
        RetainedRegion::new(&mut block).store(b"across reset").unwrap();

        let mut region = RetainedRegion::new(&mut block);
        assert_eq!(region.initialize(), RegionStatus::Valid);
        assert_eq!(region.load().as_slice(), b"across reset");
    }

    #[test]
    fn test_zero_capacity() {
        let mut block = RetainedBlock::<0>::zeroed();
        let mut region = RetainedRegion::new(&mut block);

        assert_eq!(region.capacity(), 0);
        assert!(region.load().is_empty());
        assert_eq!(region.store(b""), Ok(()));
        assert_eq!(region.store(b"x"), Err(RegionError::PayloadTooLarge));
        assert!(region.load().is_empty());
    }

    #[cfg(feature = "checksum")]
    #[test]
    fn test_checksum_written_on_store() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        RetainedRegion::new(&mut block).store(b"abc").unwrap();

        let expected = crate::checksum::region_checksum(
            MEM_MAGIC.to_ne_bytes(),
            3u16.to_ne_bytes(),
            b"abc",
        );
        assert_eq!(block.checksum(), expected);
    }

    #[cfg(feature = "checksum")]
    #[test]
    fn test_payload_corruption_detected_on_load() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        RetainedRegion::new(&mut block).store(b"abcdef").unwrap();
        block.data[2] ^= 0x10;

        let mut region = RetainedRegion::new(&mut block);
        assert!(region.load().is_empty());
        assert_eq!(region.block().raw_len(), 0);
    }

    #[cfg(feature = "checksum")]
    #[test]
    fn test_trailing_bytes_outside_checksum() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        RetainedRegion::new(&mut block).store(b"abc").unwrap();
        block.data[CAP - 1] ^= 0xFF;

        let mut region = RetainedRegion::new(&mut block);
        assert_eq!(region.initialize(), RegionStatus::Valid);
        assert_eq!(region.load().as_slice(), b"abc");
    }

    #[cfg(feature = "checksum")]
    #[test]
    fn test_checksum_corruption_heals_on_initialize() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        RetainedRegion::new(&mut block).store(b"abcdef").unwrap();
        block.checksum[0] ^= 0x01;

        let mut region = RetainedRegion::new(&mut block);
        assert_eq!(region.initialize(), RegionStatus::Healed);
        assert!(region.load().is_empty());
    }

    #[cfg(feature = "checksum")]
    #[test]
    fn test_every_single_bit_flip_detected() {
        const PAYLOAD: &[u8] = b"retained payload";
        let mut committed = RetainedBlock::<CAP>::zeroed();
        RetainedRegion::new(&mut committed).store(PAYLOAD).unwrap();

        let fields = [MAGIC_LEN, LENGTH_LEN, PAYLOAD.len()];
        for (field, &width) in fields.iter().enumerate() {
            for byte in 0..width {
                for bit in 0..8 {
                    let mut block = committed.clone();
                    let mask = 1u8 << bit;
                    match field {
                        0 => block.magic[byte] ^= mask,
                        1 => block.stored_len[byte] ^= mask,
                        _ => block.data[byte] ^= mask,
                    }

                    let mut region = RetainedRegion::new(&mut block);
                    assert!(
                        region.load().is_empty(),
                        "flip in field {} byte {} bit {} went unnoticed",
                        field,
                        byte,
                        bit
                    );
                }
            }
        }
    }

    #[test]
    fn test_variant_magics_differ() {
        assert_ne!(MEM_MAGIC_CHECKED, MEM_MAGIC_PLAIN);
        #[cfg(feature = "checksum")]
        assert_eq!(MEM_MAGIC, MEM_MAGIC_CHECKED);
        #[cfg(not(feature = "checksum"))]
        assert_eq!(MEM_MAGIC, MEM_MAGIC_PLAIN);
    }

    /// Block as a checksum-enabled image commits it: the checksum slot
    /// precedes the payload
    #[cfg(not(feature = "checksum"))]
    fn checked_image(payload: &[u8], checksum: u16) -> RetainedBlock<CAP> {
        let mut block = RetainedBlock::<CAP>::filled(0x77);
        block.set_magic(MEM_MAGIC_CHECKED);
        block.set_len(payload.len() as u16);
        block.data[..2].copy_from_slice(&checksum.to_ne_bytes());
        block.data[2..2 + payload.len()].copy_from_slice(payload);
        block
    }

    #[cfg(not(feature = "checksum"))]
    #[test]
    fn test_reads_block_from_checksum_image() {
        let mut block = checked_image(b"abc", 0xBEEF);
        let mut region = RetainedRegion::new(&mut block);

        assert_eq!(region.initialize(), RegionStatus::Valid);
        assert_eq!(region.stored_len(), 3);
        // Checksum bytes are skipped, not returned as payload
        assert_eq!(region.load().as_slice(), b"abc");
    }

    #[cfg(not(feature = "checksum"))]
    #[test]
    fn test_store_replaces_block_from_checksum_image() {
        let mut block = checked_image(b"old", 0x1234);
        let mut region = RetainedRegion::new(&mut block);

        region.store(b"new").unwrap();
        assert_eq!(region.block().magic(), MEM_MAGIC_PLAIN);
        assert_eq!(region.load().as_slice(), b"new");
    }

    #[cfg(not(feature = "checksum"))]
    #[test]
    fn test_checksum_image_length_beyond_capacity_heals() {
        let mut block = checked_image(b"", 0);
        block.set_len((CAP - 1) as u16);

        let mut region = RetainedRegion::new(&mut block);
        assert_eq!(region.initialize(), RegionStatus::Healed);
        assert!(region.load().is_empty());
    }

    #[cfg(feature = "checksum")]
    #[test]
    fn test_block_from_plain_image_heals() {
        let mut block = RetainedBlock::<CAP>::zeroed();
        block.set_magic(MEM_MAGIC_PLAIN);
        block.set_len(3);
        block.data[..3].copy_from_slice(b"abc");

        let mut region = RetainedRegion::new(&mut block);
        assert!(!region.is_valid());
        assert_eq!(region.initialize(), RegionStatus::Healed);
        assert!(region.load().is_empty());
        assert_eq!(region.block().magic(), 0);
    }

    proptest! {
        #[test]
        fn prop_round_trip(data in proptest::collection::vec(any::<u8>(), 0..=CAP)) {
            let mut block = RetainedBlock::<CAP>::filled(0xEE);
            let mut region = RetainedRegion::new(&mut block);
            region.initialize();

            region.store(&data).unwrap();
            let loaded = region.load();
            prop_assert_eq!(loaded.as_slice(), data.as_slice());
        }

        #[test]
        fn prop_oversize_keeps_previous(
            prev in proptest::collection::vec(any::<u8>(), 0..=CAP),
            extra in 1usize..64,
        ) {
            let mut block = RetainedBlock::<CAP>::zeroed();
            let mut region = RetainedRegion::new(&mut block);
            region.store(&prev).unwrap();

            let big = std::vec![0x42u8; CAP + extra];
            prop_assert_eq!(region.store(&big), Err(RegionError::PayloadTooLarge));
            let loaded = region.load();
            prop_assert_eq!(loaded.as_slice(), prev.as_slice());
        }

        #[cfg(feature = "checksum")]
        #[test]
        fn prop_single_bit_flip_detected(
            data in proptest::collection::vec(any::<u8>(), 1..=CAP),
            target in 0usize..3,
            index in any::<proptest::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut block = RetainedBlock::<CAP>::zeroed();
            RetainedRegion::new(&mut block).store(&data).unwrap();

            let mask = 1u8 << bit;
            match target {
                0 => block.magic[index.index(MAGIC_LEN)] ^= mask,
                1 => block.stored_len[index.index(LENGTH_LEN)] ^= mask,
                _ => block.data[index.index(data.len())] ^= mask,
            }

            let mut region = RetainedRegion::new(&mut block);
            prop_assert!(region.load().is_empty());
            prop_assert!(region.load().is_empty());
        }
    }
}
