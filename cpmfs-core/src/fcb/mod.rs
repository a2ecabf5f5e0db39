//! File Control Block (FCB) implementation.
//!
//! The FCB is CP/M's file descriptor structure. Guest programs keep it in
//! their own memory and hand it to the BDOS, so the layout is a hard
//! compatibility contract and is reproduced here byte for byte.
//!
//! Layout (36 bytes):
//! - Byte 0: Drive (0=default, 1=A:, 2=B:, ...)
//! - Bytes 1-8: Filename (space-padded)
//! - Bytes 9-11: Extension (space-padded)
//! - Byte 12: Current extent (EX)
//! - Byte 13: Reserved (S1)
//! - Byte 14: Extent high bits (S2), bit 7 is the modified flag
//! - Byte 15: Record count (RC)
//! - Bytes 16-31: Disk allocation map (AL)
//! - Byte 32: Current record (CR)
//! - Bytes 33-35: Random record number (R0, R1, R2)
//!
//! [`Fcb`] is an owned value: decoding and re-encoding never touch a byte
//! the caller did not ask to change, including S1 and the allocation map.

mod name;
mod pattern;
mod position;

use std::array::TryFromSliceError;
use std::fmt;

pub use position::{EXTENT_HIGH_SIZE, EXTENT_SIZE, S2_EXTENT_MASK};

/// Size of an FCB in bytes.
pub const FCB_SIZE: usize = 36;

/// Record size in CP/M (always 128 bytes).
pub const RECORD_SIZE: usize = 128;

/// Width of the name field.
pub const NAME_LEN: usize = 8;

/// Width of the extension field.
pub const EXT_LEN: usize = 3;

const DRIVE: usize = 0x00;
const NAME: usize = 0x01;
const EXT: usize = 0x09;
const EX: usize = 0x0C;
const S1: usize = 0x0D;
const S2: usize = 0x0E;
const RC: usize = 0x0F;
const AL: usize = 0x10;
const CR: usize = 0x20;
const R0: usize = 0x21;

/// File Control Block, held as its 36-byte wire image.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fcb {
    mem: [u8; FCB_SIZE],
}

impl Default for Fcb {
    fn default() -> Self {
        Self::new()
    }
}

impl Fcb {
    /// Create a blank FCB: default drive, name and type all spaces.
    pub fn new() -> Self {
        let mut fcb = Self {
            mem: [0; FCB_SIZE],
        };
        fcb.blank();
        fcb
    }

    /// Decode an FCB from its wire form. Every byte is taken as-is.
    pub fn from_bytes(bytes: [u8; FCB_SIZE]) -> Self {
        Self { mem: bytes }
    }

    /// Encode this FCB to its wire form.
    pub fn to_bytes(&self) -> [u8; FCB_SIZE] {
        self.mem
    }

    /// Borrow the wire form without copying.
    pub fn as_bytes(&self) -> &[u8; FCB_SIZE] {
        &self.mem
    }

    /// Copy the wire form into guest memory (first 36 bytes of `dest`).
    /// A window shorter than 36 bytes is left untouched and reported.
    pub fn write_to(&self, dest: &mut [u8]) -> Result<(), TryFromSliceError> {
        let len = dest.len().min(FCB_SIZE);
        let window: &mut [u8; FCB_SIZE] = (&mut dest[..len]).try_into()?;
        *window = self.mem;
        Ok(())
    }

    /// Drive number: 0 = current, 1 = A:, 2 = B:, etc.
    pub fn drive(&self) -> u8 {
        self.mem[DRIVE]
    }

    /// Set drive number.
    pub fn set_drive(&mut self, drive: u8) {
        self.mem[DRIVE] = drive;
    }

    /// Get raw filename bytes (8 chars, space-padded).
    pub fn raw_name(&self) -> &[u8] {
        &self.mem[NAME..NAME + NAME_LEN]
    }

    /// Get raw extension bytes (3 chars, space-padded).
    pub fn raw_ext(&self) -> &[u8] {
        &self.mem[EXT..EXT + EXT_LEN]
    }

    /// Overwrite the raw filename bytes.
    pub fn set_raw_name(&mut self, name: [u8; NAME_LEN]) {
        self.mem[NAME..NAME + NAME_LEN].copy_from_slice(&name);
    }

    /// Overwrite the raw extension bytes.
    pub fn set_raw_ext(&mut self, ext: [u8; EXT_LEN]) {
        self.mem[EXT..EXT + EXT_LEN].copy_from_slice(&ext);
    }

    /// Current extent number (EX).
    pub fn ex(&self) -> u8 {
        self.mem[EX]
    }

    /// Set current extent.
    pub fn set_ex(&mut self, v: u8) {
        self.mem[EX] = v;
    }

    /// S1 byte (reserved).
    pub fn s1(&self) -> u8 {
        self.mem[S1]
    }

    /// Set S1.
    pub fn set_s1(&mut self, v: u8) {
        self.mem[S1] = v;
    }

    /// S2 byte, unmasked. See [`Fcb::s2_extent`] for the arithmetic value.
    pub fn s2(&self) -> u8 {
        self.mem[S2]
    }

    /// Set S2.
    pub fn set_s2(&mut self, v: u8) {
        self.mem[S2] = v;
    }

    /// Record count (RC) - records in current extent.
    pub fn rc(&self) -> u8 {
        self.mem[RC]
    }

    /// Set record count.
    pub fn set_rc(&mut self, v: u8) {
        self.mem[RC] = v;
    }

    /// Allocation map (d0-d15). Never interpreted here.
    pub fn allocation(&self) -> &[u8] {
        &self.mem[AL..CR]
    }

    /// Overwrite the allocation map.
    pub fn set_allocation(&mut self, al: [u8; 16]) {
        self.mem[AL..CR].copy_from_slice(&al);
    }

    /// Current record within extent (CR).
    pub fn cr(&self) -> u8 {
        self.mem[CR]
    }

    /// Set current record.
    pub fn set_cr(&mut self, v: u8) {
        self.mem[CR] = v;
    }

    /// Random record bytes R0, R1, R2 (little-endian).
    pub fn raw_random(&self) -> &[u8] {
        &self.mem[R0..FCB_SIZE]
    }

    /// Blank out this FCB (set to spaces).
    pub fn blank(&mut self) {
        self.mem[DRIVE] = 0;
        for byte in &mut self.mem[NAME..EX] {
            *byte = b' ';
        }
        for byte in &mut self.mem[EX..FCB_SIZE] {
            *byte = 0;
        }
    }

    /// Reset the position and bookkeeping fields for a new file operation.
    /// Name, drive and random record are left alone.
    pub fn init(&mut self) {
        self.set_ex(0);
        self.set_s1(0);
        self.set_s2(0);
        self.set_rc(0);
        self.set_cr(0);
        self.set_allocation([0; 16]);
    }
}

impl From<[u8; FCB_SIZE]> for Fcb {
    fn from(bytes: [u8; FCB_SIZE]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Fcb> for [u8; FCB_SIZE] {
    fn from(fcb: Fcb) -> Self {
        fcb.to_bytes()
    }
}

/// Decode from a guest memory slice. The slice must be exactly 36 bytes;
/// callers holding a larger window should slice it first.
impl TryFrom<&[u8]> for Fcb {
    type Error = TryFromSliceError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self::from_bytes(value.try_into()?))
    }
}

impl fmt::Debug for Fcb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fcb")
            .field("drive", &self.drive())
            .field("name", &String::from_utf8_lossy(self.raw_name()))
            .field("ext", &String::from_utf8_lossy(self.raw_ext()))
            .field("ex", &self.ex())
            .field("s1", &self.s1())
            .field("s2", &self.s2())
            .field("rc", &self.rc())
            .field("al", &self.allocation())
            .field("cr", &self.cr())
            .field("random", &self.random_offset())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{QuickCheck, TestResult};

    fn patterned() -> [u8; FCB_SIZE] {
        let mut bytes = [0u8; FCB_SIZE];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(37).wrapping_add(5);
        }
        bytes
    }

    #[test]
    fn test_blank_layout() {
        let fcb = Fcb::new();
        let bytes = fcb.to_bytes();
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..12], b"           ");
        assert!(bytes[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_field_offsets() {
        let mut fcb = Fcb::new();
        fcb.set_drive(2);
        fcb.set_raw_name(*b"HELLO   ");
        fcb.set_raw_ext(*b"COM");
        fcb.set_ex(3);
        fcb.set_s1(0xAA);
        fcb.set_s2(0x81);
        fcb.set_rc(0x80);
        fcb.set_allocation([0x11; 16]);
        fcb.set_cr(0x7F);
        fcb.set_random_offset(0x030201);

        let bytes = fcb.to_bytes();
        assert_eq!(bytes[0], 2);
        assert_eq!(&bytes[1..9], b"HELLO   ");
        assert_eq!(&bytes[9..12], b"COM");
        assert_eq!(bytes[12], 3);
        assert_eq!(bytes[13], 0xAA);
        assert_eq!(bytes[14], 0x81);
        assert_eq!(bytes[15], 0x80);
        assert_eq!(&bytes[16..32], &[0x11; 16]);
        assert_eq!(bytes[32], 0x7F);
        assert_eq!(&bytes[33..36], &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_reserved_bytes_survive() {
        let bytes = patterned();
        let fcb = Fcb::from_bytes(bytes);
        assert_eq!(fcb.s1(), bytes[13]);
        assert_eq!(fcb.allocation(), &bytes[16..32]);
        assert_eq!(fcb.to_bytes(), bytes);
    }

    #[test]
    fn test_garbage_is_accepted() {
        let bytes = [0xFF; FCB_SIZE];
        let fcb = Fcb::from_bytes(bytes);
        assert_eq!(fcb.drive(), 0xFF);
        assert_eq!(fcb.to_bytes(), bytes);
    }

    #[test]
    fn test_try_from_slice() {
        let bytes = patterned();
        let fcb = Fcb::try_from(&bytes[..]).unwrap();
        assert_eq!(fcb.to_bytes(), bytes);

        assert!(Fcb::try_from(&bytes[..35]).is_err());
    }

    #[test]
    fn test_write_to_guest_memory() {
        let mut mem = [0xEEu8; 64];
        let fcb = Fcb::from_bytes(patterned());
        fcb.write_to(&mut mem[0x10..]).unwrap();

        assert_eq!(&mem[0x10..0x10 + FCB_SIZE], &patterned());
        assert_eq!(mem[0x0F], 0xEE);
        assert_eq!(mem[0x10 + FCB_SIZE], 0xEE);
    }

    #[test]
    fn test_write_to_short_window() {
        let mut mem = [0xEEu8; FCB_SIZE - 1];
        let fcb = Fcb::from_bytes(patterned());

        assert!(fcb.write_to(&mut mem).is_err());
        assert!(mem.iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_init_keeps_name_and_random() {
        let mut fcb = Fcb::from_bytes(patterned());
        let name = fcb.raw_name().to_vec();
        let random = fcb.random_offset();
        fcb.init();

        assert_eq!(fcb.raw_name(), &name[..]);
        assert_eq!(fcb.random_offset(), random);
        assert_eq!(fcb.ex(), 0);
        assert_eq!(fcb.s2(), 0);
        assert_eq!(fcb.cr(), 0);
        assert!(fcb.allocation().iter().all(|&b| b == 0));
    }

    #[test]
    fn prop_bytes_roundtrip() {
        fn property(seed: Vec<u8>) -> TestResult {
            if seed.is_empty() {
                return TestResult::discard();
            }
            let mut bytes = [0u8; FCB_SIZE];
            for (i, b) in bytes.iter_mut().enumerate() {
                *b = seed[i % seed.len()].wrapping_add(i as u8);
            }

            let fcb = Fcb::from_bytes(bytes);
            let again = Fcb::from_bytes(fcb.to_bytes());
            TestResult::from_bool(fcb.to_bytes() == bytes && again == fcb)
        }

        let mut qc = QuickCheck::new().tests(200);
        qc.quickcheck(property as fn(Vec<u8>) -> TestResult);
    }

    #[test]
    fn prop_encoded_size_is_fixed() {
        fn property(drive: u8, ex: u8, s2: u8, cr: u8, random: u32) -> bool {
            let mut fcb = Fcb::new();
            fcb.set_drive(drive);
            fcb.set_ex(ex);
            fcb.set_s2(s2);
            fcb.set_cr(cr);
            fcb.set_random_offset(random);
            fcb.to_bytes().len() == FCB_SIZE && fcb.as_bytes().len() == FCB_SIZE
        }

        let mut qc = QuickCheck::new().tests(100);
        qc.quickcheck(property as fn(u8, u8, u8, u8, u32) -> bool);
    }
}
