//! Core trait definitions for pluggable resolver backends

use crate::error::ResolveError;
use crate::types::Target;

/// Per-call working memory for a resolve operation
///
/// Backends take the scratch explicitly and hold no mutable state of their
/// own, so a handle can be shared across threads as long as each caller owns
/// its own `RowScratch`.
///
/// One scratch can be reused across any number of calls and any number of
/// backends; the byte buffer grows to the largest row requested and stays.
#[derive(Debug, Default)]
pub struct RowScratch {
    /// Staging area for raw row bytes (direct reads, inflated output)
    pub(crate) buf: Vec<u8>,
    /// Label indices matched by the most recent resolve
    pub(crate) matches: Vec<usize>,
}

impl RowScratch {
    /// Create an empty scratch; buffers grow on first use
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scratch with a pre-sized byte buffer
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            matches: Vec::new(),
        }
    }

    /// Label indices matched by the most recent resolve, ascending
    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// Reset match state at the start of a resolve call
    pub(crate) fn begin(&mut self) {
        self.matches.clear();
    }
}

/// One resolver storage strategy
///
/// Implementations resolve a target to the set of label indices whose bit is
/// set in that target's matrix row, leaving the indices in
/// [`RowScratch::matches`]. All three backends are synchronous and take
/// `&self`: any I/O is blocking, and all per-call mutation happens in the
/// caller-owned scratch.
pub trait ResolveEngine: Send + Sync {
    /// Short identifier for logs and diagnostics
    fn engine_id(&self) -> &'static str;

    /// Resolve `target`, leaving matched label indices in `scratch`
    ///
    /// A target no row covers yields an empty match list and `Ok`; errors are
    /// reserved for I/O and decompression failures, which abort this call
    /// only and leave the engine usable.
    fn resolve(&self, target: Target, scratch: &mut RowScratch) -> Result<(), ResolveError>;
}
