//! In-memory storage: full bit-packed matrix plus range index
//!
//! Rows are concatenated at bit granularity with no padding, so a row's base
//! offset is rarely byte-aligned; decoding happens in place against the
//! resident buffer with no per-call copy.

use crate::bitmap;
use crate::engine::{ResolveEngine, RowScratch};
use crate::error::{ConstructionError, ResolveError};
use crate::index::RangeIndex;
use crate::types::Target;
use bytes::Bytes;
use tracing::debug;

/// Resident uncompressed matrix with binary-search range dispatch
#[derive(Debug)]
pub struct InMemoryEngine {
    /// Bit-packed matrix covering every indexed range
    matrix: Bytes,
    /// Sorted, disjoint target ranges
    index: RangeIndex,
    /// Bits per row (label count)
    row_bits: usize,
}

impl InMemoryEngine {
    /// Build an engine over a resident matrix buffer
    ///
    /// The buffer must cover the highest bit offset any indexed target can
    /// address; an undersized buffer is rejected here rather than panicking
    /// during a later decode.
    pub fn new(
        matrix: impl Into<Bytes>,
        index: RangeIndex,
        row_bits: usize,
    ) -> Result<Self, ConstructionError> {
        let matrix = matrix.into();
        let required = bitmap::row_bytes(index.required_bits(row_bits) as usize);
        if matrix.len() < required {
            return Err(ConstructionError::MatrixTooSmall {
                required,
                actual: matrix.len(),
            });
        }
        debug!(
            matrix_bytes = matrix.len(),
            num_ranges = index.len(),
            row_bits,
            "built in-memory matrix engine"
        );
        Ok(Self {
            matrix,
            index,
            row_bits,
        })
    }

    /// The backing matrix buffer
    pub fn matrix(&self) -> &[u8] {
        &self.matrix
    }
}

impl ResolveEngine for InMemoryEngine {
    fn engine_id(&self) -> &'static str {
        "in-memory"
    }

    fn resolve(&self, target: Target, scratch: &mut RowScratch) -> Result<(), ResolveError> {
        scratch.begin();

        // A target in a gap between ranges is "no labels", not an error.
        if let Some(range) = self.index.locate(target) {
            let base = range.row_offset(target, self.row_bits);
            bitmap::decode_row(&self.matrix, base, self.row_bits, &mut scratch.matches);
        }
        Ok(())
    }
}
