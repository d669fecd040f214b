// SPDX-License-Identifier: MIT OR Apache-2.0
//! Re-ingesting a previously imported sequence into the same object.

use crate::frame_set::resolve;
use crate::importer::FrameImporter;
use crate::ingest::{IngestError, Ingestor, Result};
use crate::mesh::AnimatedMesh;
use crate::metadata::SequenceMetadata;
use crate::progress::ProgressReporter;
use std::path::{Path, PathBuf};

/// File existence checks used before a reload
pub trait FileSystem {
    /// Whether `path` is an existing regular file
    fn exists(&self, path: &Path) -> bool;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Recorded files that no longer exist
pub fn missing_files(metadata: &SequenceMetadata, fs: &dyn FileSystem) -> Vec<PathBuf> {
    metadata
        .files
        .iter()
        .filter(|path| !fs.exists(path))
        .cloned()
        .collect()
}

/// Whether every recorded file still exists
pub fn verify_files(metadata: &SequenceMetadata, fs: &dyn FileSystem) -> bool {
    metadata.files.iter().all(|path| fs.exists(path))
}

/// Re-import an object's sequence from its stored source and settings.
///
/// The frames are resolved again from the stored directory, prefix and format;
/// the stored file list is only used to check that nothing was deleted. The
/// object keeps its identity and name. On any error it is left unchanged.
pub fn reload(
    object: &mut AnimatedMesh,
    importer: &mut dyn FrameImporter,
    progress: &mut dyn ProgressReporter,
    fs: &dyn FileSystem,
) -> Result<()> {
    let metadata = match object.sequence_metadata()? {
        Some(metadata) if metadata.initialized => metadata,
        _ => return Err(IngestError::NotInitialized(object.id)),
    };

    let missing = missing_files(&metadata, fs);
    if !missing.is_empty() {
        tracing::warn!(
            "Cannot reload {}: {} source file(s) missing",
            object.name,
            missing.len()
        );
        return Err(IngestError::SourceFilesMissing { missing });
    }

    let source = metadata.source;
    let frames = resolve(&source.directory, &source.prefix, source.format)?;
    Ingestor::new(importer, progress).ingest_into(&source, frames.as_ref(), &metadata.settings, object)
}
