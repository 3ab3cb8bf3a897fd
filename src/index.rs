//! Range index: sorted, disjoint target intervals with binary-search dispatch
//!
//! The range-partitioned backends do not store a row for every target in
//! `[min_target, max_target]`; resolvable targets cluster into contiguous
//! ranges with gaps between them. Each range carries the bit offset of its
//! first row within the logical matrix, so locating a target's range is all
//! the offset arithmetic needs.
//!
//! Gaps are legal: a target covered by no range resolves to "no labels",
//! which is a successful empty result, not an error.

use crate::error::ConstructionError;
use crate::types::Target;
use serde::{Deserialize, Serialize};

/// A contiguous span of resolvable targets
///
/// `start` and `end` are inclusive. `bit_offset_base` is the bit offset of
/// target `start`'s row within the logical (decompressed) matrix; rows for
/// the remaining targets in the range follow back-to-back at `row_bits`-bit
/// strides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRange {
    /// First target covered (inclusive)
    pub start: Target,
    /// Last target covered (inclusive)
    pub end: Target,
    /// Bit offset of `start`'s row in the logical matrix
    pub bit_offset_base: u64,
}

impl TargetRange {
    /// True if `target` falls within this range (inclusive bounds)
    pub fn contains(&self, target: Target) -> bool {
        self.start <= target && target <= self.end
    }

    /// Number of targets covered
    pub fn span(&self) -> u64 {
        (self.end - self.start) as u64 + 1
    }

    /// Bit offset of `target`'s row, given the row width
    ///
    /// Callers must ensure `self.contains(target)` first.
    pub fn row_offset(&self, target: Target, row_bits: usize) -> u64 {
        self.bit_offset_base + (target - self.start) as u64 * row_bits as u64
    }
}

/// Sorted, disjoint range list with binary-search lookup
///
/// # Example
///
/// ```rust
/// use bitgrid::index::{RangeIndex, TargetRange};
///
/// let index = RangeIndex::new(vec![
///     TargetRange { start: 10, end: 12, bit_offset_base: 0 },
///     TargetRange { start: 20, end: 20, bit_offset_base: 24 },
/// ])
/// .unwrap();
///
/// assert!(index.locate(11).is_some());
/// assert!(index.locate(15).is_none()); // gap between ranges
/// ```
#[derive(Debug, Clone)]
pub struct RangeIndex {
    ranges: Vec<TargetRange>,
}

impl RangeIndex {
    /// Build an index, validating ordering and disjointness
    ///
    /// Rejects a range with `start > end` and any pair of successive ranges
    /// that touch out of order or overlap. Malformed input is a construction
    /// error; it never surfaces as a runtime decode failure.
    pub fn new(ranges: Vec<TargetRange>) -> Result<Self, ConstructionError> {
        for (i, range) in ranges.iter().enumerate() {
            if range.start > range.end {
                return Err(ConstructionError::InvertedRange {
                    index: i,
                    start: range.start,
                    end: range.end,
                });
            }
            if i > 0 {
                let prev = &ranges[i - 1];
                if range.start <= prev.end {
                    return Err(ConstructionError::OverlappingRanges {
                        prev: i - 1,
                        prev_end: prev.end,
                        index: i,
                        start: range.start,
                    });
                }
            }
        }
        Ok(Self { ranges })
    }

    /// Locate the range containing `target`, if any
    ///
    /// Binary search over the sorted list: at most one range can contain a
    /// target because the ranges are disjoint.
    pub fn locate(&self, target: Target) -> Option<&TargetRange> {
        let mut lo = 0isize;
        let mut hi = self.ranges.len() as isize - 1;
        while lo <= hi {
            let mid = ((lo + hi) / 2) as usize;
            let range = &self.ranges[mid];
            if range.contains(target) {
                return Some(range);
            } else if target < range.start {
                hi = mid as isize - 1;
            } else {
                lo = mid as isize + 1;
            }
        }
        None
    }

    /// Number of ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True if the index holds no ranges
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterate ranges in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &TargetRange> {
        self.ranges.iter()
    }

    /// Highest bit offset any covered target's row can address, exclusive
    ///
    /// Used to size-check the matrix buffer at construction.
    pub fn required_bits(&self, row_bits: usize) -> u64 {
        self.ranges
            .iter()
            .map(|r| r.bit_offset_base + r.span() * row_bits as u64)
            .max()
            .unwrap_or(0)
    }
}
