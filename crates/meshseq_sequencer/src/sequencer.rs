// SPDX-License-Identifier: MIT OR Apache-2.0
//! Import and reload entry points.

use crate::frame_set::resolve;
use crate::importer::FrameImporter;
use crate::ingest::{Ingestor, Result};
use crate::mesh::AnimatedMesh;
use crate::progress::ProgressReporter;
use crate::reload::{self, FileSystem, StdFileSystem};
use crate::settings::{ImportSettings, SequenceSource};

/// Turns frame sequences into shape-key animated objects.
///
/// Holds no state between calls besides the filesystem used for reload
/// checks; everything a reload needs is stored on the object itself.
#[derive(Debug, Clone, Default)]
pub struct ShapeKeySequencer<F: FileSystem = StdFileSystem> {
    fs: F,
}

impl ShapeKeySequencer {
    /// Create a sequencer using the real filesystem
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: FileSystem> ShapeKeySequencer<F> {
    /// Create a sequencer with a custom filesystem
    pub fn with_file_system(fs: F) -> Self {
        Self { fs }
    }

    /// Resolve the frames of `source` and ingest them into new objects
    pub fn import(
        &self,
        source: &SequenceSource,
        settings: &ImportSettings,
        importer: &mut dyn FrameImporter,
        progress: &mut dyn ProgressReporter,
    ) -> Result<Vec<AnimatedMesh>> {
        let frames = resolve(&source.directory, &source.prefix, source.format)?;
        Ingestor::new(importer, progress).ingest(source, frames.as_ref(), settings)
    }

    /// Re-ingest `object` from the source stored on it
    pub fn reload(
        &self,
        object: &mut AnimatedMesh,
        importer: &mut dyn FrameImporter,
        progress: &mut dyn ProgressReporter,
    ) -> Result<()> {
        reload::reload(object, importer, progress, &self.fs)
    }

    /// Whether every file recorded on `object` still exists.
    ///
    /// Objects without readable sequence metadata have nothing to verify and
    /// report `false`.
    pub fn verify_files(&self, object: &AnimatedMesh) -> bool {
        match object.sequence_metadata() {
            Ok(Some(metadata)) => reload::verify_files(&metadata, &self.fs),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Unreadable sequence metadata on {}: {e}", object.name);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::IngestError;
    use crate::progress::{NoProgress, RecordingProgress};
    use crate::settings::FrameFormat;
    use crate::testing::{mesh, FakeImporter};
    use std::fs;
    use std::path::Path;

    fn write_frames(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), "").unwrap();
        }
    }

    #[test]
    fn test_import_resolves_and_ingests() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), &["wave_10.obj", "wave_2.obj", "wave_1.obj", "other_1.obj"]);
        let mut importer = FakeImporter::default()
            .with_frame("wave_1.obj", vec![mesh("wave_1", 3, 1.0)])
            .with_frame("wave_2.obj", vec![mesh("wave_2", 3, 2.0)])
            .with_frame("wave_10.obj", vec![mesh("wave_10", 3, 10.0)]);

        let source = SequenceSource::new(dir.path(), "wave_", FrameFormat::Obj);
        let mut progress = RecordingProgress::default();
        let objects = ShapeKeySequencer::new()
            .import(&source, &ImportSettings::default(), &mut importer, &mut progress)
            .unwrap();

        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name, "wave_shapekeys");
        assert_eq!(
            objects[0].shape_keys.key("Frame 2").unwrap().positions,
            mesh("wave_10", 3, 10.0).positions
        );
        assert_eq!(importer.imported.len(), 3);
        assert_eq!(progress.begun, vec![6]);
        assert_eq!(progress.ended, 1);
    }

    #[test]
    fn test_import_without_matches() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), &["other_1.obj"]);
        let source = SequenceSource::new(dir.path(), "wave_", FrameFormat::Obj);
        let mut importer = FakeImporter::default();
        let mut progress = RecordingProgress::default();

        let err = ShapeKeySequencer::new()
            .import(&source, &ImportSettings::default(), &mut importer, &mut progress)
            .unwrap_err();

        assert!(matches!(err, IngestError::NoFilesFound { .. }));
        assert!(importer.imported.is_empty());
        assert!(progress.begun.is_empty());
    }

    #[test]
    fn test_reload_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        write_frames(dir.path(), &["wave_1.obj", "wave_2.obj"]);
        let importer = || {
            FakeImporter::default()
                .with_frame("wave_1.obj", vec![mesh("wave_1", 4, 1.0)])
                .with_frame("wave_2.obj", vec![mesh("wave_2", 4, 2.0)])
        };

        let sequencer = ShapeKeySequencer::new();
        let source = SequenceSource::new(dir.path(), "wave_", FrameFormat::Obj);
        let mut progress = NoProgress;
        let mut object = sequencer
            .import(&source, &ImportSettings::default(), &mut importer(), &mut progress)
            .unwrap()
            .remove(0);
        assert!(sequencer.verify_files(&object));

        let id = object.id;
        sequencer.reload(&mut object, &mut importer(), &mut progress).unwrap();
        assert_eq!(object.id, id);
        assert_eq!(object.shape_keys.len(), 2);

        fs::remove_file(dir.path().join("wave_1.obj")).unwrap();
        assert!(!sequencer.verify_files(&object));
        let err = sequencer.reload(&mut object, &mut importer(), &mut progress).unwrap_err();
        assert!(matches!(err, IngestError::SourceFilesMissing { .. }));
    }

    #[test]
    fn test_verify_plain_object() {
        let object = AnimatedMesh::new("Plain", vec![[0.0; 3]]);
        assert!(!ShapeKeySequencer::new().verify_files(&object));
    }
}
