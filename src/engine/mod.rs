//! Resolver facade over the pluggable storage backends
//!
//! A [`Resolver`] owns the label table, the target bounds, and one boxed
//! [`ResolveEngine`]; it maps the engine's matched bit positions to borrowed
//! label strings. The handle is immutable after construction: `resolve` takes
//! `&self` plus a caller-owned [`RowScratch`], so a resolver can be shared
//! across threads with one scratch per thread.
//!
//! # Example
//!
//! ```rust
//! use bitgrid::engine::{Resolver, RowScratch};
//! use bitgrid::index::TargetRange;
//! use bitgrid::meta::ResolverMeta;
//!
//! // Two labels, one range covering targets 10..=11; target 10 matches
//! // label 0, target 11 matches both.
//! let meta = ResolverMeta {
//!     num_labels: 2,
//!     max_label_len: 4,
//!     row_bytes: 1,
//!     min_target: 10,
//!     max_target: 11,
//!     labels: vec!["warm".into(), "cold".into()],
//! };
//! let ranges = vec![TargetRange { start: 10, end: 11, bit_offset_base: 0 }];
//! let matrix = vec![0b1101u8]; // rows: 10 -> 01, 11 -> 11 (LSB-first)
//! let resolver = Resolver::in_memory(matrix, ranges, meta).unwrap();
//!
//! let mut scratch = RowScratch::new();
//! let mut out = vec![None; resolver.num_labels()];
//! resolver.resolve(11, &mut scratch, &mut out).unwrap();
//! assert_eq!(out, vec![Some("warm"), Some("cold")]);
//! ```

pub mod traits;

pub use traits::{ResolveEngine, RowScratch};

use crate::bitmap;
use crate::error::{ConstructionError, ResolveError};
use crate::index::{RangeIndex, TargetRange};
use crate::meta::ResolverMeta;
use crate::storage::{deflate, DeflateEngine, DirectFileEngine, InMemoryEngine};
use crate::types::{LabelTable, Target};
use bytes::Bytes;
use std::path::Path;
use tracing::info;

/// Immutable resolver handle
///
/// Created once by a backend-specific constructor; lives for the process
/// lifetime (or until dropped); never mutated by `resolve`.
pub struct Resolver {
    min_target: Target,
    max_target: Target,
    labels: LabelTable,
    engine: Box<dyn ResolveEngine>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("min_target", &self.min_target)
            .field("max_target", &self.max_target)
            .field("labels", &self.labels)
            .field("engine", &self.engine.engine_id())
            .finish()
    }
}

impl Resolver {
    /// Direct-access backend: rows stay on disk, one seek + read per lookup
    pub fn direct(
        row_file: impl AsRef<Path>,
        meta: ResolverMeta,
    ) -> Result<Self, ConstructionError> {
        let engine = DirectFileEngine::open(
            row_file,
            meta.min_target,
            meta.num_labels,
            meta.row_bytes,
        )?;
        Ok(Self::from_parts(meta, Box::new(engine)))
    }

    /// In-memory backend over an already bit-packed matrix and range list
    pub fn in_memory(
        matrix: impl Into<Bytes>,
        ranges: Vec<TargetRange>,
        meta: ResolverMeta,
    ) -> Result<Self, ConstructionError> {
        let index = RangeIndex::new(ranges)?;
        let engine = InMemoryEngine::new(matrix, index, meta.num_labels)?;
        Ok(Self::from_parts(meta, Box::new(engine)))
    }

    /// Streaming backend over an already compressed matrix and range list
    pub fn deflate(
        stream: impl Into<Bytes>,
        ranges: Vec<TargetRange>,
        meta: ResolverMeta,
    ) -> Result<Self, ConstructionError> {
        let index = RangeIndex::new(ranges)?;
        let engine = DeflateEngine::new(stream, index, meta.num_labels)?;
        Ok(Self::from_parts(meta, Box::new(engine)))
    }

    /// In-memory backend built by repacking a byte-aligned row file buffer
    ///
    /// `rows` is the direct-access file layout; it is repacked into the
    /// bit-granular matrix under a single range covering
    /// `min_target..=max_target`.
    pub fn memory_from_rows(rows: &[u8], meta: ResolverMeta) -> Result<Self, ConstructionError> {
        let (matrix, ranges) = repack(rows, &meta)?;
        Self::in_memory(matrix, ranges, meta)
    }

    /// Streaming backend built by repacking and compressing a row file buffer
    pub fn deflate_from_rows(rows: &[u8], meta: ResolverMeta) -> Result<Self, ConstructionError> {
        let (matrix, ranges) = repack(rows, &meta)?;
        let stream = deflate::compress_matrix(&matrix)?;
        Self::deflate(stream, ranges, meta)
    }

    fn from_parts(meta: ResolverMeta, engine: Box<dyn ResolveEngine>) -> Self {
        info!(
            engine = engine.engine_id(),
            num_labels = meta.num_labels,
            min_target = meta.min_target,
            max_target = meta.max_target,
            "resolver ready"
        );
        Self {
            min_target: meta.min_target,
            max_target: meta.max_target,
            labels: LabelTable::new(meta.labels),
            engine,
        }
    }

    /// Smallest target the metadata declares
    pub fn min_target(&self) -> Target {
        self.min_target
    }

    /// Largest target the metadata declares
    pub fn max_target(&self) -> Target {
        self.max_target
    }

    /// Number of labels (and slots `resolve` may fill)
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// The shared label table
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Identifier of the active backend
    pub fn engine_id(&self) -> &'static str {
        self.engine.engine_id()
    }

    /// Resolve `target` into the caller's label-slot buffer
    ///
    /// `out` must have at least [`Self::num_labels`] slots. On success, slots
    /// `[0, j)` hold the matched labels in ascending label-index order; slot
    /// `j`, if it exists, is set to `None` as the end sentinel. A full buffer
    /// with no sentinel means exactly `num_labels` labels matched.
    ///
    /// Rejecting a target outside `[min_target, max_target]` is the caller's
    /// job: the range-based backends simply return an empty result for one,
    /// while the direct-access backend surfaces an I/O error when the record
    /// offset falls outside the file.
    pub fn resolve<'r>(
        &'r self,
        target: Target,
        scratch: &mut RowScratch,
        out: &mut [Option<&'r str>],
    ) -> Result<(), ResolveError> {
        if out.len() < self.labels.len() {
            return Err(ResolveError::OutputTooSmall {
                capacity: out.len(),
                num_labels: self.labels.len(),
            });
        }
        self.engine.resolve(target, scratch)?;
        let mut filled = 0;
        for &k in scratch.matches() {
            out[filled] = Some(&self.labels[k]);
            filled += 1;
        }
        if filled < out.len() {
            out[filled] = None;
        }
        Ok(())
    }

    /// Resolve `target` into a freshly collected label list
    ///
    /// Convenience over [`Self::resolve`] for callers that do not manage a
    /// slot buffer; the returned strings still borrow from the label table.
    pub fn resolve_vec<'r>(
        &'r self,
        target: Target,
        scratch: &mut RowScratch,
    ) -> Result<Vec<&'r str>, ResolveError> {
        self.engine.resolve(target, scratch)?;
        Ok(scratch
            .matches
            .iter()
            .map(|&k| &self.labels[k])
            .collect())
    }
}

/// Repack byte-aligned rows into (bit-packed matrix, single covering range)
fn repack(
    rows: &[u8],
    meta: &ResolverMeta,
) -> Result<(Vec<u8>, Vec<TargetRange>), ConstructionError> {
    if meta.row_bytes == 0 || meta.row_bytes < bitmap::row_bytes(meta.num_labels) {
        return Err(ConstructionError::InvalidRowWidth(meta.row_bytes));
    }
    let required = meta.num_rows() as usize * meta.row_bytes;
    if rows.len() < required {
        return Err(ConstructionError::MatrixTooSmall {
            required,
            actual: rows.len(),
        });
    }
    let matrix = bitmap::pack_rows(&rows[..required], meta.row_bytes, meta.num_labels);
    let ranges = vec![TargetRange {
        start: meta.min_target,
        end: meta.max_target,
        bit_offset_base: 0,
    }];
    Ok((matrix, ranges))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta_abc() -> ResolverMeta {
        ResolverMeta {
            num_labels: 3,
            max_label_len: 1,
            row_bytes: 1,
            min_target: 0,
            max_target: 2,
            labels: vec!["a".into(), "b".into(), "c".into()],
        }
    }

    #[test]
    fn test_sentinel_marks_early_end() {
        let rows = vec![0b101u8, 0b000, 0b111];
        let resolver = Resolver::memory_from_rows(&rows, meta_abc()).unwrap();
        let mut scratch = RowScratch::new();
        let mut out = vec![None; 3];

        resolver.resolve(0, &mut scratch, &mut out).unwrap();
        assert_eq!(out, vec![Some("a"), Some("c"), None]);

        resolver.resolve(1, &mut scratch, &mut out).unwrap();
        assert_eq!(out[0], None);

        // All slots used: no sentinel, buffer exactly full.
        resolver.resolve(2, &mut scratch, &mut out).unwrap();
        assert_eq!(out, vec![Some("a"), Some("b"), Some("c")]);
    }

    #[test]
    fn test_output_too_small_is_rejected() {
        let rows = vec![0u8; 3];
        let resolver = Resolver::memory_from_rows(&rows, meta_abc()).unwrap();
        let mut scratch = RowScratch::new();
        let mut out = vec![None; 2];
        let err = resolver.resolve(0, &mut scratch, &mut out).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::OutputTooSmall {
                capacity: 2,
                num_labels: 3,
            }
        ));
    }

    #[test]
    fn test_repack_rejects_short_row_buffer() {
        let rows = vec![0u8; 2]; // needs 3
        let err = Resolver::memory_from_rows(&rows, meta_abc()).unwrap_err();
        assert!(matches!(err, ConstructionError::MatrixTooSmall { .. }));
    }

    #[test]
    fn test_resolve_vec_borrows_labels() {
        let rows = vec![0b110u8, 0b000, 0b000];
        let resolver = Resolver::deflate_from_rows(&rows, meta_abc()).unwrap();
        let mut scratch = RowScratch::new();
        assert_eq!(resolver.resolve_vec(0, &mut scratch).unwrap(), vec!["b", "c"]);
        assert!(resolver.resolve_vec(1, &mut scratch).unwrap().is_empty());
    }
}
