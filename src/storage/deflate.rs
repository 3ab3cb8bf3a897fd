//! Streaming-decompression storage: skip-ahead inflation over one zlib stream
//!
//! The whole bit-packed matrix is stored as a single zlib-format DEFLATE
//! stream. DEFLATE is not seekable in the compressed domain, so every lookup
//! re-initializes an inflater at the head of the stream, discards decompressed
//! output in bounded chunks until the target row's byte offset is reached,
//! then inflates just the bytes covering one row. The skipped prefix must
//! agree byte-for-byte with a full decompression; the tests pin that down.
//!
//! Cost model: O(skip_bytes) CPU per lookup against compressed-size memory.
//! Callers doing many lookups over late targets should prefer
//! [`crate::storage::InMemoryEngine`].

use crate::bitmap;
use crate::engine::{ResolveEngine, RowScratch};
use crate::error::{ConstructionError, DecompressionError, ResolveError};
use crate::index::RangeIndex;
use crate::types::Target;
use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use std::io::Write;
use tracing::debug;

/// Floor for the per-call inflate buffer; larger skips fewer times
const SCRATCH_FLOOR: usize = 1024;

/// Compressed matrix with binary-search range dispatch
pub struct DeflateEngine {
    /// The complete zlib stream for the concatenated rows
    stream: Bytes,
    /// Sorted, disjoint target ranges (offsets address decompressed bits)
    index: RangeIndex,
    /// Bits per row (label count)
    row_bits: usize,
}

impl DeflateEngine {
    /// Build an engine over a complete zlib stream
    ///
    /// The stream itself is validated lazily: corruption only surfaces when a
    /// lookup inflates past it, as a per-call error.
    pub fn new(
        stream: impl Into<Bytes>,
        index: RangeIndex,
        row_bits: usize,
    ) -> Result<Self, ConstructionError> {
        let stream = stream.into();
        debug!(
            compressed_bytes = stream.len(),
            num_ranges = index.len(),
            row_bits,
            "built streaming-decompression engine"
        );
        Ok(Self {
            stream,
            index,
            row_bits,
        })
    }

    /// Inflate one bounded chunk, returning bytes produced and end-of-stream
    fn inflate_step(
        &self,
        z: &mut Decompress,
        out: &mut [u8],
        flush: FlushDecompress,
    ) -> Result<(usize, bool), DecompressionError> {
        let before = z.total_out();
        let input = &self.stream[z.total_in() as usize..];
        let status = z.decompress(input, out, flush)?;
        let produced = (z.total_out() - before) as usize;
        match status {
            Status::StreamEnd => Ok((produced, true)),
            // No forward progress with output space available means the
            // stream ran out without its trailer (or the inflater is stuck).
            Status::Ok | Status::BufError if produced == 0 => Err(DecompressionError::Stalled {
                consumed: z.total_in(),
            }),
            Status::Ok | Status::BufError => Ok((produced, false)),
        }
    }
}

impl ResolveEngine for DeflateEngine {
    fn engine_id(&self) -> &'static str {
        "deflate-stream"
    }

    fn resolve(&self, target: Target, scratch: &mut RowScratch) -> Result<(), ResolveError> {
        scratch.begin();

        let Some(range) = self.index.locate(target) else {
            return Ok(());
        };
        let bit_offset = range.row_offset(target, self.row_bits);
        let skip_bytes = bit_offset >> 3;
        let residual = (bit_offset & 7) as usize;
        // One spare byte absorbs a row that starts mid-byte and spills past
        // its own width.
        let need = bitmap::row_bytes(self.row_bits) + 1;

        let RowScratch { buf, matches } = scratch;
        buf.clear();
        buf.resize(need.max(SCRATCH_FLOOR), 0);

        // Fresh inflater per call; the compressed domain has no seek.
        let mut z = Decompress::new(true);
        let mut ended = false;

        // Skip phase: inflate-and-discard the prefix in bounded chunks.
        let mut remaining = skip_bytes;
        while remaining > 0 {
            let chunk = remaining.min(buf.len() as u64) as usize;
            let (produced, at_end) = self
                .inflate_step(&mut z, &mut buf[..chunk], FlushDecompress::None)
                .map_err(ResolveError::Decompression)?;
            remaining -= produced as u64;
            if at_end {
                ended = true;
                if remaining > 0 {
                    return Err(ResolveError::Decompression(
                        DecompressionError::TruncatedSkip {
                            offset: skip_bytes,
                            remaining,
                        },
                    ));
                }
                break;
            }
        }

        // Row phase: bounded inflate of exactly the bytes covering one row.
        let mut got = 0;
        while got < need && !ended {
            let (produced, at_end) = self
                .inflate_step(&mut z, &mut buf[got..need], FlushDecompress::Sync)
                .map_err(ResolveError::Decompression)?;
            got += produced;
            ended = at_end;
        }

        // The spare byte may legitimately be missing for the last row of the
        // matrix; anything short of the row's own bits is truncation.
        if got * 8 < residual + self.row_bits {
            return Err(ResolveError::Decompression(DecompressionError::ShortRow {
                got,
                need,
            }));
        }

        bitmap::decode_row(&buf[..got], residual as u64, self.row_bits, matches);
        Ok(())
    }
}

/// Compress a bit-packed matrix into the zlib stream form
///
/// Uses best compression, matching the offline matrix generator.
pub fn compress_matrix(matrix: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(matrix)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::set_bit;
    use crate::index::TargetRange;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn inflate_all(stream: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(stream).read_to_end(&mut out).unwrap();
        out
    }

    /// Matrix of 2-bit rows over ranges {10..=12 @ 0} and {20..=21 @ 6}.
    fn fixture() -> (Vec<u8>, RangeIndex) {
        let mut matrix = vec![0u8; 2];
        set_bit(&mut matrix, 0); // target 10, label 0
        set_bit(&mut matrix, 2); // target 11, label 0
        set_bit(&mut matrix, 5); // target 12, label 1
        set_bit(&mut matrix, 6); // target 20, label 0
        set_bit(&mut matrix, 7); // target 20, label 1
        set_bit(&mut matrix, 9); // target 21, label 1
        let index = RangeIndex::new(vec![
            TargetRange {
                start: 10,
                end: 12,
                bit_offset_base: 0,
            },
            TargetRange {
                start: 20,
                end: 21,
                bit_offset_base: 6,
            },
        ])
        .unwrap();
        (matrix, index)
    }

    #[test]
    fn test_compress_round_trips() {
        let (matrix, _) = fixture();
        let stream = compress_matrix(&matrix).unwrap();
        assert_eq!(inflate_all(&stream), matrix);
    }

    #[test]
    fn test_resolve_matches_uncompressed_decode() {
        let (matrix, index) = fixture();
        let engine = DeflateEngine::new(compress_matrix(&matrix).unwrap(), index, 2).unwrap();
        let mut scratch = RowScratch::new();

        let expected: &[(Target, &[usize])] = &[
            (10, &[0]),
            (11, &[0]),
            (12, &[1]),
            (20, &[0, 1]),
            (21, &[1]),
        ];
        for &(target, matches) in expected {
            engine.resolve(target, &mut scratch).unwrap();
            assert_eq!(scratch.matches(), matches, "target {}", target);
        }
    }

    #[test]
    fn test_uncovered_target_is_empty_success() {
        let (matrix, index) = fixture();
        let engine = DeflateEngine::new(compress_matrix(&matrix).unwrap(), index, 2).unwrap();
        let mut scratch = RowScratch::new();
        for gap_target in [0, 9, 13, 19, 22] {
            engine.resolve(gap_target, &mut scratch).unwrap();
            assert!(scratch.matches().is_empty(), "target {}", gap_target);
        }
    }

    #[test]
    fn test_skip_ahead_agrees_with_full_decompression() {
        // A matrix big enough that skips span many scratch-floor chunks.
        let row_bits = 81usize;
        let num_rows = 500u32;
        let total_bits = num_rows as usize * row_bits;
        let mut matrix = vec![0u8; crate::bitmap::row_bytes(total_bits)];
        for row in 0..num_rows as usize {
            // A sparse, row-dependent pattern.
            for k in [row % row_bits, (row * 7) % row_bits] {
                set_bit(&mut matrix, (row * row_bits + k) as u64);
            }
        }
        let index = RangeIndex::new(vec![TargetRange {
            start: 1000,
            end: 1000 + num_rows - 1,
            bit_offset_base: 0,
        }])
        .unwrap();
        let stream = compress_matrix(&matrix).unwrap();
        let full = inflate_all(&stream);
        assert_eq!(full, matrix);

        let engine = DeflateEngine::new(stream, index, row_bits).unwrap();
        let mut scratch = RowScratch::new();

        // First row, last row, and a spread in between.
        for target in [1000, 1001, 1137, 1300, 1000 + num_rows - 1] {
            engine.resolve(target, &mut scratch).unwrap();
            let row = (target - 1000) as usize;
            let mut expected = Vec::new();
            crate::bitmap::decode_row(&full, (row * row_bits) as u64, row_bits, &mut expected);
            assert_eq!(scratch.matches(), expected, "target {}", target);
        }
    }

    #[test]
    fn test_corrupt_stream_is_per_call_error() {
        let (matrix, index) = fixture();
        let mut stream = compress_matrix(&matrix).unwrap();
        let mid = stream.len() / 2;
        stream[mid] ^= 0xff;

        let engine = DeflateEngine::new(stream, index, 2).unwrap();
        let mut scratch = RowScratch::new();
        let err = engine.resolve(21, &mut scratch).unwrap_err();
        assert!(matches!(err, ResolveError::Decompression(_)));
    }

    #[test]
    fn test_truncated_stream_reports_and_recovers_nothing_shared() {
        let (matrix, index) = fixture();
        let full_stream = compress_matrix(&matrix).unwrap();
        let truncated = full_stream[..full_stream.len() - 4].to_vec();

        let engine = DeflateEngine::new(truncated, index, 2).unwrap();
        let mut scratch = RowScratch::new();
        let err = engine.resolve(21, &mut scratch).unwrap_err();
        assert!(matches!(err, ResolveError::Decompression(_)));

        // Each call re-initializes decompression, so the handle stays valid;
        // the same call fails the same way rather than corrupting state.
        let err = engine.resolve(21, &mut scratch).unwrap_err();
        assert!(matches!(err, ResolveError::Decompression(_)));
    }
}
