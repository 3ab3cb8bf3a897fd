//! Metadata text format loader
//!
//! A metadata file describes one bit matrix: a header line of five
//! whitespace-separated integers
//!
//! ```text
//! NUM_LABELS MAX_LABEL_LEN ROW_BYTES MIN_TARGET MAX_TARGET
//! ```
//!
//! followed by exactly `NUM_LABELS` newline-terminated label lines. A label
//! line without a trailing newline is treated as truncated: the file was cut
//! off mid-write and must be rejected rather than silently shortened.

use crate::bitmap;
use crate::error::ConstructionError;
use crate::types::Target;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Parsed resolver metadata
///
/// Immutable once loaded; every backend constructor consumes one of these to
/// learn the label set, row geometry, and target bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverMeta {
    /// Number of labels (bit width of a logical matrix row)
    pub num_labels: usize,
    /// Length of the longest label, in bytes
    pub max_label_len: usize,
    /// Bytes per row record in the direct-access file format
    pub row_bytes: usize,
    /// Smallest target with a row in the direct-access file
    pub min_target: Target,
    /// Largest target with a row in the direct-access file
    pub max_target: Target,
    /// Labels in bit-position order
    pub labels: Vec<String>,
}

impl ResolverMeta {
    /// Load metadata from a file path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConstructionError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let meta = Self::read_from(reader, &path.display().to_string())?;
        debug!(
            path = %path.display(),
            num_labels = meta.num_labels,
            min_target = meta.min_target,
            max_target = meta.max_target,
            "loaded resolver metadata"
        );
        Ok(meta)
    }

    /// Parse metadata from any buffered reader
    ///
    /// `origin` names the source in error messages (a path, or a fixture name
    /// in tests).
    pub fn read_from<R: BufRead>(mut reader: R, origin: &str) -> Result<Self, ConstructionError> {
        let mut header = String::new();
        reader.read_line(&mut header)?;

        let missing = || ConstructionError::MissingMetadata {
            origin: origin.to_string(),
        };
        let mut fields = header.split_whitespace();
        let mut next_field = || fields.next().ok_or_else(missing);
        let num_labels: usize = next_field()?.parse().map_err(|_| missing())?;
        let max_label_len: usize = next_field()?.parse().map_err(|_| missing())?;
        let row_bytes: usize = next_field()?.parse().map_err(|_| missing())?;
        let min_target: Target = next_field()?.parse().map_err(|_| missing())?;
        let max_target: Target = next_field()?.parse().map_err(|_| missing())?;

        let expected = bitmap::row_bytes(num_labels);
        if row_bytes != expected {
            return Err(ConstructionError::RowWidthMismatch {
                row_bytes,
                num_labels,
                expected,
            });
        }

        let mut labels = Vec::with_capacity(num_labels);
        for read in 0..num_labels {
            let mut line = String::new();
            let n = reader.read_line(&mut line)?;
            if n == 0 {
                return Err(ConstructionError::ShortLabelList {
                    origin: origin.to_string(),
                    read,
                    expected: num_labels,
                });
            }
            if !line.ends_with('\n') {
                return Err(ConstructionError::TruncatedLabel {
                    origin: origin.to_string(),
                    label: line,
                });
            }
            line.pop();
            labels.push(line);
        }

        Ok(Self {
            num_labels,
            max_label_len,
            row_bytes,
            min_target,
            max_target,
            labels,
        })
    }

    /// Number of row records in a full direct-access file
    pub fn num_rows(&self) -> u64 {
        (self.max_target - self.min_target) as u64 + 1
    }
}
