// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame importer seam.
//!
//! Parsing mesh files is left to implementations of [`FrameImporter`]; the
//! ingestion engine only sees the meshes a file expands into.

use crate::mesh::MeshFrame;
use crate::settings::{FrameFormat, ImportSettings};
use std::path::{Path, PathBuf};

/// Error importing one frame file
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file contents are malformed
    #[error("{}:{line}: {message}", .path.display())]
    Parse {
        /// File path
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// The importer cannot read this format
    #[error("No importer available for {0} files")]
    UnsupportedFormat(FrameFormat),
}

/// Turns one frame file into the meshes it contains.
///
/// Implementations must be deterministic: importing the same file with the
/// same settings twice must yield the same meshes in the same order, with
/// vertices in the same order.
pub trait FrameImporter {
    /// Import a frame file
    fn import_frame(
        &mut self,
        format: FrameFormat,
        path: &Path,
        settings: &ImportSettings,
    ) -> Result<Vec<MeshFrame>, ImportError>;

    /// Release anything left over from earlier imports
    fn purge_orphans(&mut self) {}
}
