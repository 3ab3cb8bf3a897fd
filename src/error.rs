//! Error types for the resolver

use thiserror::Error;

/// Main error type for the resolver
#[derive(Error, Debug)]
pub enum Error {
    /// Handle construction failed; no resolver was produced
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),

    /// A single resolve call failed; the handle remains usable
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),
}

/// Errors raised while building a resolver handle
///
/// These are fatal: when one is returned no handle exists, and the caller is
/// expected to abort rather than retry.
#[derive(Error, Debug)]
pub enum ConstructionError {
    /// Backing file or stream could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata header is missing one of its five integer fields
    #[error("{origin}: missing some of NUM_LABELS, MAX_LABEL_LEN, ROW_BYTES, MIN_TARGET, MAX_TARGET")]
    MissingMetadata {
        /// File or stream the metadata was read from
        origin: String,
    },

    /// Metadata ended before the declared number of labels was read
    #[error("{origin}: unexpected EOF after {read} of {expected} labels")]
    ShortLabelList {
        /// File or stream the metadata was read from
        origin: String,
        /// Labels successfully read before EOF
        read: usize,
        /// Labels the header declared
        expected: usize,
    },

    /// A label line had no trailing newline
    #[error("{origin}: truncated label `{label}`")]
    TruncatedLabel {
        /// File or stream the metadata was read from
        origin: String,
        /// The partial label text
        label: String,
    },

    /// Declared row width disagrees with the label count
    #[error("row width mismatch: metadata says {row_bytes} bytes, {num_labels} labels need {expected}")]
    RowWidthMismatch {
        /// Bytes per row from the metadata header
        row_bytes: usize,
        /// Label count from the metadata header
        num_labels: usize,
        /// `ceil(num_labels / 8)`
        expected: usize,
    },

    /// Row width of zero (or otherwise unusable)
    #[error("invalid row width: {0} bytes")]
    InvalidRowWidth(usize),

    /// A range has `start > end`
    #[error("range {index} is inverted: start {start} > end {end}")]
    InvertedRange {
        /// Position in the range list
        index: usize,
        /// Range start
        start: u32,
        /// Range end
        end: u32,
    },

    /// Successive ranges overlap or are out of order
    #[error("range {index} starts at {start}, at or before range {prev} ends ({prev_end})")]
    OverlappingRanges {
        /// Position of the earlier range
        prev: usize,
        /// Inclusive end of the earlier range
        prev_end: u32,
        /// Position of the offending range
        index: usize,
        /// Start of the offending range
        start: u32,
    },

    /// Matrix buffer cannot hold the highest bit offset the ranges address
    #[error("matrix buffer too small: {actual} bytes, need {required}")]
    MatrixTooSmall {
        /// Bytes the range index requires
        required: usize,
        /// Bytes actually supplied
        actual: usize,
    },
}

/// Errors raised by a single resolve call
///
/// These are local to the call: the handle and its shared immutable state
/// stay valid, and subsequent calls may succeed.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Seek or read failure, including a short read against the row file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Seek landed somewhere other than the requested record offset
    #[error("seek landed at {actual}, expected {expected}")]
    SeekMismatch {
        /// Byte offset that was requested
        expected: u64,
        /// Byte offset the seek reported
        actual: u64,
    },

    /// Decompression failed during skip-ahead or the bounded row inflate
    #[error("Decompression error: {0}")]
    Decompression(#[from] DecompressionError),

    /// Caller's output buffer has fewer slots than there are labels
    #[error("output buffer too small: {capacity} slots for {num_labels} labels")]
    OutputTooSmall {
        /// Slots the caller provided
        capacity: usize,
        /// Slots required
        num_labels: usize,
    },
}

/// Decompressor failure detail for the streaming backend
#[derive(Error, Debug)]
pub enum DecompressionError {
    /// The underlying inflater rejected the stream
    #[error("corrupt deflate stream: {0}")]
    Corrupt(#[from] flate2::DecompressError),

    /// Stream ended while still discarding the skip prefix
    #[error("stream ended {remaining} bytes short of skip offset {offset}")]
    TruncatedSkip {
        /// Decompressed byte offset that was being skipped to
        offset: u64,
        /// Bytes of the skip prefix still outstanding at end of stream
        remaining: u64,
    },

    /// Stream ended before producing enough bytes to cover one row
    #[error("stream ended before a full row: got {got} bytes, need {need}")]
    ShortRow {
        /// Bytes produced for the row
        got: usize,
        /// Bytes a full row (plus alignment spill) occupies
        need: usize,
    },

    /// The inflater stopped making progress with input and output available
    #[error("decompressor stalled after {consumed} input bytes")]
    Stalled {
        /// Compressed bytes consumed before the stall
        consumed: u64,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
