//! Storage backends for the bit matrix
//!
//! Three interchangeable strategies trade memory for lookup cost:
//!
//! - **`DirectFileEngine`**: matrix stays on disk; one seek + one fixed-size
//!   record read per lookup. Rows are byte-aligned, every in-bounds target
//!   has one.
//! - **`InMemoryEngine`**: full bit-packed matrix resident in memory,
//!   partitioned into ranges with gaps; lookup is a binary search plus a
//!   decode at an arbitrary bit offset.
//! - **`DeflateEngine`**: the same range-partitioned matrix as a single
//!   zlib stream; lookup restarts inflation from the head and skips forward,
//!   so cost grows with the target's offset while memory stays at the
//!   compressed size.
//!
//! All three implement [`crate::engine::ResolveEngine`] and share the range
//! index and row decoder; choosing one is a construction-time decision.

pub mod deflate;
pub mod direct;
pub mod memory;

pub use deflate::DeflateEngine;
pub use direct::DirectFileEngine;
pub use memory::InMemoryEngine;
