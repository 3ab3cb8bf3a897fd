//! Bit-matrix row primitives
//!
//! The logical matrix is a flat bit string: row after row, with no padding
//! between rows for the range-partitioned backends. Bits are stored LSB-first
//! within each byte:
//!
//! ```text
//! bit offset k  ->  byte (k >> 3), mask 1 << (k & 7)
//! ```
//!
//! so bit 0 of a buffer is the least significant bit of its first byte. All
//! decoding in this crate funnels through [`decode_row`], which works
//! identically whether the row's base offset is byte-aligned or not; the
//! in-memory and streaming backends rely on sub-byte alignment.
//!
//! # Example
//!
//! ```rust
//! use bitgrid::bitmap::{decode_row, set_bit};
//!
//! let mut buf = vec![0u8; 2];
//! set_bit(&mut buf, 3);
//! set_bit(&mut buf, 9);
//!
//! // One 5-bit row starting at bit offset 3: bits 3 and 9 land at
//! // row-relative positions 0 and 6, but only position 0 is in range.
//! let mut matches = Vec::new();
//! decode_row(&buf, 3, 5, &mut matches);
//! assert_eq!(matches, vec![0]);
//! ```

/// Bytes needed to hold `row_bits` bits, rounded up to whole bytes
pub const fn row_bytes(row_bits: usize) -> usize {
    (row_bits + 7) >> 3
}

/// Test the bit at absolute offset `bit_offset`
///
/// The buffer must cover the offset; callers validate bounds before decoding.
#[inline]
pub fn bit_is_set(buf: &[u8], bit_offset: u64) -> bool {
    buf[(bit_offset >> 3) as usize] & (1 << (bit_offset & 7)) != 0
}

/// Set the bit at absolute offset `bit_offset`
#[inline]
pub fn set_bit(buf: &mut [u8], bit_offset: u64) {
    buf[(bit_offset >> 3) as usize] |= 1 << (bit_offset & 7);
}

/// Decode one matrix row into matched label indices
///
/// For `k` in `0..row_bits`, tests the bit at `bit_offset_base + k` and
/// pushes `k` onto `matches` when set, so the output is in ascending
/// label-index order. Pure function over the byte slice; performs no I/O and
/// no early exit (labels may appear in any position).
///
/// The buffer must cover bits `bit_offset_base .. bit_offset_base + row_bits`.
pub fn decode_row(buf: &[u8], bit_offset_base: u64, row_bits: usize, matches: &mut Vec<usize>) {
    debug_assert!(
        (bit_offset_base + row_bits as u64).div_ceil(8) <= buf.len() as u64,
        "row exceeds buffer"
    );
    for k in 0..row_bits {
        if bit_is_set(buf, bit_offset_base + k as u64) {
            matches.push(k);
        }
    }
}

/// Repack byte-aligned row records into one contiguous bit-packed matrix
///
/// `rows` is the direct-access file layout: consecutive records of
/// `bytes_per_row` bytes, one per target, each holding `row_bits` significant
/// bits. The result drops the per-row byte padding, concatenating rows at bit
/// granularity the way the range-partitioned backends store them.
pub fn pack_rows(rows: &[u8], bytes_per_row: usize, row_bits: usize) -> Vec<u8> {
    let num_rows = rows.len() / bytes_per_row;
    let mut packed = vec![0u8; row_bytes(num_rows * row_bits)];
    for row in 0..num_rows {
        let record = &rows[row * bytes_per_row..(row + 1) * bytes_per_row];
        let base = (row * row_bits) as u64;
        for k in 0..row_bits {
            if bit_is_set(record, k as u64) {
                set_bit(&mut packed, base + k as u64);
            }
        }
    }
    packed
}
