//! Sequential and random file positions.
//!
//! Two views coexist in every FCB and never affect each other:
//! - sequential: `S2 * 512K + EX * 16K + CR * 128` bytes
//! - random: 24-bit record number in R0 (low) .. R2 (high)

use super::{Fcb, RECORD_SIZE, R0};

/// Bytes covered by one logical extent (EX step).
pub const EXTENT_SIZE: u32 = 16384;

/// Bytes covered by one S2 step (32 extents).
pub const EXTENT_HIGH_SIZE: u32 = 524288;

/// Bits of S2 that take part in offset arithmetic. Bit 7 is the
/// modified flag.
pub const S2_EXTENT_MASK: u8 = 0x7F;

const RECORD: u32 = RECORD_SIZE as u32;

impl Fcb {
    /// S2 with the modified flag masked off.
    pub fn s2_extent(&self) -> u8 {
        self.s2() & S2_EXTENT_MASK
    }

    /// Byte offset used by sequential reads and writes.
    pub fn sequential_offset(&self) -> u32 {
        u32::from(self.s2_extent()) * EXTENT_HIGH_SIZE
            + u32::from(self.ex()) * EXTENT_SIZE
            + u32::from(self.cr()) * RECORD
    }

    /// Store a sequential byte offset into S2, EX and CR.
    ///
    /// S2 is recomputed from the offset, so the modified flag is cleared.
    /// Offsets past the S2 range wrap, and any sub-record remainder is
    /// dropped.
    pub fn set_sequential_offset(&mut self, offset: u32) {
        let s2 = (offset / EXTENT_HIGH_SIZE) as u8 & S2_EXTENT_MASK;
        let ex = ((offset % EXTENT_HIGH_SIZE) / EXTENT_SIZE) as u8;
        let cr = ((offset % EXTENT_SIZE) / RECORD) as u8;

        self.set_s2(s2);
        self.set_ex(ex);
        self.set_cr(cr);
    }

    /// Move the sequential position forward by one record, carrying
    /// CR into EX and EX into S2.
    pub fn advance_sequential(&mut self) {
        self.set_sequential_offset(self.sequential_offset().wrapping_add(RECORD));
    }

    /// Sequential position as a record number.
    pub fn current_record(&self) -> u32 {
        self.sequential_offset() / RECORD
    }

    /// Set the sequential position by record number.
    pub fn set_current_record(&mut self, n: u32) {
        self.set_sequential_offset(n.wrapping_mul(RECORD));
    }

    /// Random record number (24-bit, from R0, R1, R2).
    pub fn random_offset(&self) -> u32 {
        let r = &self.mem[R0..R0 + 3];
        u32::from_le_bytes([r[0], r[1], r[2], 0])
    }

    /// Set random record number. Bits above 24 are dropped.
    pub fn set_random_offset(&mut self, n: u32) {
        let [r0, r1, r2, _] = n.to_le_bytes();
        self.mem[R0] = r0;
        self.mem[R0 + 1] = r1;
        self.mem[R0 + 2] = r2;
    }
}
