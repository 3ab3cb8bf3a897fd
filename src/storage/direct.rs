//! Direct-access storage: seek and read one row record per lookup
//!
//! The backing file is a concatenation of fixed-size row records, one per
//! target from `min_target` to `max_target` inclusive, each
//! `ceil(num_labels/8)` bytes. There is no range index and no gap concept:
//! every in-bounds target owns a record, and a record that cannot be read
//! (short file, bad offset) surfaces as an I/O error for that call.

use crate::bitmap;
use crate::engine::{ResolveEngine, RowScratch};
use crate::error::{ConstructionError, ResolveError};
use crate::types::Target;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed matrix with byte-aligned rows
#[derive(Debug)]
pub struct DirectFileEngine {
    /// Open read handle; seeks go through `&File` so resolve takes `&self`
    file: File,
    /// Source path, kept for error context
    path: PathBuf,
    /// Bytes per row record
    row_bytes: usize,
    /// Bits per row (label count)
    row_bits: usize,
    /// Target owning the first record
    min_target: Target,
}

impl DirectFileEngine {
    /// Open a row file
    ///
    /// Requires a readable file and a positive row width; both failures are
    /// construction errors and produce no engine.
    pub fn open(
        path: impl AsRef<Path>,
        min_target: Target,
        num_labels: usize,
        row_bytes: usize,
    ) -> Result<Self, ConstructionError> {
        if row_bytes == 0 || row_bytes < bitmap::row_bytes(num_labels) {
            return Err(ConstructionError::InvalidRowWidth(row_bytes));
        }
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        debug!(path = %path.display(), row_bytes, "opened direct-access row file");
        Ok(Self {
            file,
            path,
            row_bytes,
            row_bits: num_labels,
            min_target,
        })
    }

    /// Path of the backing row file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResolveEngine for DirectFileEngine {
    fn engine_id(&self) -> &'static str {
        "direct-file"
    }

    fn resolve(&self, target: Target, scratch: &mut RowScratch) -> Result<(), ResolveError> {
        scratch.begin();

        // A target below the minimum would wrap the record arithmetic; report
        // it the way any unreadable offset is reported.
        let slot = target.checked_sub(self.min_target).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("target {} below minimum {}", target, self.min_target),
            )
        })?;
        let offset = slot as u64 * self.row_bytes as u64;

        let pos = (&self.file).seek(SeekFrom::Start(offset))?;
        if pos != offset {
            return Err(ResolveError::SeekMismatch {
                expected: offset,
                actual: pos,
            });
        }

        let RowScratch { buf, matches } = scratch;
        buf.clear();
        buf.resize(self.row_bytes, 0);
        (&self.file).read_exact(buf)?;

        bitmap::decode_row(buf, 0, self.row_bits, matches);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_rows(rows: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(rows).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_resolve_reads_correct_record() {
        // Targets 5..=7, one byte per row.
        let file = write_rows(&[0b0000_0101, 0b0000_0010, 0b0000_0111]);
        let engine = DirectFileEngine::open(file.path(), 5, 3, 1).unwrap();
        let mut scratch = RowScratch::new();

        engine.resolve(5, &mut scratch).unwrap();
        assert_eq!(scratch.matches(), &[0, 2]);

        engine.resolve(6, &mut scratch).unwrap();
        assert_eq!(scratch.matches(), &[1]);

        engine.resolve(7, &mut scratch).unwrap();
        assert_eq!(scratch.matches(), &[0, 1, 2]);
    }

    #[test]
    fn test_short_file_is_per_call_io_error() {
        let file = write_rows(&[0b0000_0001]);
        let engine = DirectFileEngine::open(file.path(), 0, 3, 1).unwrap();
        let mut scratch = RowScratch::new();

        // Record for target 9 is past EOF.
        let err = engine.resolve(9, &mut scratch).unwrap_err();
        assert!(matches!(err, ResolveError::Io(_)));

        // The engine stays usable afterwards.
        engine.resolve(0, &mut scratch).unwrap();
        assert_eq!(scratch.matches(), &[0]);
    }

    #[test]
    fn test_target_below_minimum_is_io_error() {
        let file = write_rows(&[0xff]);
        let engine = DirectFileEngine::open(file.path(), 10, 3, 1).unwrap();
        let mut scratch = RowScratch::new();
        let err = engine.resolve(3, &mut scratch).unwrap_err();
        assert!(matches!(err, ResolveError::Io(_)));
    }

    #[test]
    fn test_open_rejects_zero_row_width() {
        let file = write_rows(&[0u8]);
        let err = DirectFileEngine::open(file.path(), 0, 3, 0).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidRowWidth(0)));
    }

    #[test]
    fn test_open_rejects_row_width_too_narrow_for_labels() {
        let file = write_rows(&[0u8]);
        let err = DirectFileEngine::open(file.path(), 0, 9, 1).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidRowWidth(1)));
    }

    #[test]
    fn test_open_missing_file_is_construction_error() {
        let err = DirectFileEngine::open("/nonexistent/rows.bmp", 0, 3, 1).unwrap_err();
        assert!(matches!(err, ConstructionError::Io(_)));
    }
}
