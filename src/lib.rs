//! Bitgrid - bit-matrix label resolution with pluggable storage backends
//!
//! This library resolves an integer key (a "target") to an ordered subset of
//! string labels by consulting a target-by-label bit matrix: bit
//! `(target, label)` set means that label applies to that target. Three
//! interchangeable backends store the matrix:
//!
//! - **Direct-access**: byte-aligned rows on disk, one seek + read per lookup
//! - **In-memory**: the full bit-packed matrix resident, range-partitioned
//!   with binary-search dispatch
//! - **Streaming-decompression**: the same matrix as one zlib stream, decoded
//!   by skip-ahead inflation without ever materializing the whole thing
//!
//! All three share the range index and the LSB-first row decoder, and hang
//! off a single [`engine::Resolver`] facade.
//!
//! # Example
//!
//! ```rust
//! use bitgrid::engine::{Resolver, RowScratch};
//! use bitgrid::meta::ResolverMeta;
//!
//! let meta = ResolverMeta {
//!     num_labels: 3,
//!     max_label_len: 1,
//!     row_bytes: 1,
//!     min_target: 0,
//!     max_target: 1,
//!     labels: vec!["a".into(), "b".into(), "c".into()],
//! };
//! // Row records: target 0 -> bits 0 and 2, target 1 -> no labels.
//! let resolver = Resolver::memory_from_rows(&[0b101, 0b000], meta).unwrap();
//!
//! let mut scratch = RowScratch::new();
//! assert_eq!(resolver.resolve_vec(0, &mut scratch).unwrap(), vec!["a", "c"]);
//! assert!(resolver.resolve_vec(1, &mut scratch).unwrap().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bitmap;
pub mod engine;
pub mod error;
pub mod index;
pub mod meta;
pub mod storage;
pub mod types;

// Re-export main types
pub use engine::{ResolveEngine, Resolver, RowScratch};
pub use error::{ConstructionError, DecompressionError, Error, ResolveError, Result};
pub use index::{RangeIndex, TargetRange};
pub use meta::ResolverMeta;
pub use types::{LabelTable, Target};
