// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence ingestion: frame files in, shape-key animated meshes out.
//!
//! The base frame becomes the mesh and its `Basis` key, every further frame
//! becomes a `Frame k` key, and each of those keys gets a weight curve that is
//! 1.0 at frame `k` and 0.0 at every other keyed frame.
//!
//! Nothing is committed until every frame has been imported and validated: a
//! fresh run either returns all objects or none, and a reload either replaces
//! the target's mesh data and metadata or leaves it untouched.

use crate::animation::WeightAnimation;
use crate::binding::{ObjectId, ShapeKeyBinding};
use crate::frame_set::{FrameFile, FrameSet, ResolveError};
use crate::importer::{FrameImporter, ImportError};
use crate::keyframe::Keyframe;
use crate::mesh::{
    frame_key_name, sequence_object_name, AnimatedMesh, MeshFrame, Position, ShapeKey,
    ShapeKeyStack,
};
use crate::metadata::{MetadataError, PropertyStore, SequenceMetadata};
use crate::progress::ProgressReporter;
use crate::settings::{ImportSettings, SequenceSource, SettingsError};
use crate::track::Track;
use std::path::PathBuf;

/// Error ingesting or reloading a sequence. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// No file matched the sequence pattern
    #[error("No files matching {mask} found in {}", .directory.display())]
    NoFilesFound {
        /// Searched directory
        directory: PathBuf,
        /// File mask, e.g. `frame*.obj`
        mask: String,
    },

    /// Listing the directory failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Import settings are invalid
    #[error("Invalid import settings: {0}")]
    Settings(#[from] SettingsError),

    /// The frame importer failed
    #[error("Failed to import {}: {source}", .frame_file.display())]
    Import {
        /// Frame being imported
        frame_file: PathBuf,
        /// Importer error
        source: ImportError,
    },

    /// A mesh of the base frame has no vertices
    #[error("Imported object {} in {} has 0 vertices", .mesh_index + 1, .frame_file.display())]
    EmptyBaseMesh {
        /// Base frame file
        frame_file: PathBuf,
        /// Index of the mesh within the import
        mesh_index: usize,
    },

    /// A mesh of a delta frame has no vertices
    #[error("Imported object {} in {} has 0 vertices", .mesh_index + 1, .frame_file.display())]
    EmptyDeltaMesh {
        /// Delta frame file
        frame_file: PathBuf,
        /// Index of the mesh within the import
        mesh_index: usize,
    },

    /// A delta mesh has a different vertex count than its base mesh
    #[error(
        "Imported object {} in {} has a different vertex count ({actual}) than the base object ({expected})",
        .mesh_index + 1,
        .frame_file.display()
    )]
    VertexCountMismatch {
        /// Delta frame file
        frame_file: PathBuf,
        /// Index of the mesh within the import
        mesh_index: usize,
        /// Vertex count of the base mesh
        expected: usize,
        /// Vertex count of the delta mesh
        actual: usize,
    },

    /// A delta frame expanded into a different number of meshes than the base frame
    #[error("{} imported {actual} objects but the base frame imported {expected}", .frame_file.display())]
    MeshCountMismatch {
        /// Delta frame file
        frame_file: PathBuf,
        /// Mesh count of the base frame
        expected: usize,
        /// Mesh count of the delta frame
        actual: usize,
    },

    /// Reload needs the base frame to be a single mesh
    #[error("Cannot reload: {} imported {mesh_count} objects, only single-object sequences can be reloaded", .frame_file.display())]
    MultiMeshReloadUnsupported {
        /// Base frame file
        frame_file: PathBuf,
        /// Number of meshes imported
        mesh_count: usize,
    },

    /// Files recorded by the previous import are gone
    #[error("{} source file(s) no longer exist, first: {}", .missing.len(), first_path(.missing))]
    SourceFilesMissing {
        /// Every missing file
        missing: Vec<PathBuf>,
    },

    /// The object has never been ingested
    #[error("Object {0} has no imported sequence to reload")]
    NotInitialized(ObjectId),

    /// Stored metadata is unreadable
    #[error("Invalid sequence metadata: {0}")]
    Metadata(#[from] MetadataError),
}

fn first_path(paths: &[PathBuf]) -> String {
    paths
        .first()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

/// Result type for ingestion
pub type Result<T> = std::result::Result<T, IngestError>;

/// Shape keys built for one base mesh, not yet attached to an object
struct StagedMesh {
    name: String,
    stack: ShapeKeyStack,
}

/// Drives frame imports and builds shape-key stacks and weight curves
pub struct Ingestor<'a> {
    importer: &'a mut dyn FrameImporter,
    progress: &'a mut dyn ProgressReporter,
}

impl<'a> Ingestor<'a> {
    /// Create an ingestor using the given collaborators
    pub fn new(importer: &'a mut dyn FrameImporter, progress: &'a mut dyn ProgressReporter) -> Self {
        Self { importer, progress }
    }

    /// Ingest a sequence into new objects, one per mesh of the base frame.
    ///
    /// Metadata is stored on the first object only.
    pub fn ingest(
        &mut self,
        source: &SequenceSource,
        frames: Option<&FrameSet>,
        settings: &ImportSettings,
    ) -> Result<Vec<AnimatedMesh>> {
        let frames = require_frames(source, frames)?;
        settings.validate()?;

        self.progress.begin(2 * frames.len());
        let result = self.ingest_fresh(source, frames, settings);
        self.finish();

        let objects = result?;
        tracing::info!(
            "Imported {} frames of {} into {} object(s)",
            frames.len(),
            source.file_mask(),
            objects.len()
        );
        Ok(objects)
    }

    /// Re-ingest a sequence into an existing object, keeping its identity.
    ///
    /// The base frame must import as exactly one mesh. Its positions replace
    /// the object's vertices, and the object's shape keys, weight curves and
    /// metadata are replaced by the new ones. On error the object is unchanged.
    pub fn ingest_into(
        &mut self,
        source: &SequenceSource,
        frames: Option<&FrameSet>,
        settings: &ImportSettings,
        existing: &mut AnimatedMesh,
    ) -> Result<()> {
        let frames = require_frames(source, frames)?;
        settings.validate()?;

        self.progress.begin(2 * frames.len());
        let result = self.ingest_existing(source, frames, settings, existing);
        self.finish();

        result?;
        tracing::info!(
            "Reloaded {} frames of {} into {}",
            frames.len(),
            source.file_mask(),
            existing.name
        );
        Ok(())
    }

    fn finish(&mut self) {
        self.progress.end();
        self.importer.purge_orphans();
    }

    fn ingest_fresh(
        &mut self,
        source: &SequenceSource,
        frames: &FrameSet,
        settings: &ImportSettings,
    ) -> Result<Vec<AnimatedMesh>> {
        let bases = self.import_base(source, frames, settings)?;
        let mut staged: Vec<StagedMesh> = bases
            .into_iter()
            .map(|mesh| StagedMesh {
                name: sequence_object_name(&mesh.name),
                stack: ShapeKeyStack::with_basis(mesh.positions),
            })
            .collect();

        let frame_count = self.add_delta_frames(source, frames, settings, &mut staged)?;

        let mut properties = PropertyStore::new();
        build_metadata(source, frames, settings, frame_count).write_to(&mut properties)?;

        let mut objects: Vec<AnimatedMesh> = staged
            .into_iter()
            .map(|mesh| {
                let mut object = AnimatedMesh::new(mesh.name, basis_positions(&mesh.stack));
                object.shape_keys = mesh.stack;
                object
            })
            .collect();
        for object in &mut objects {
            object.animation = key_weights(object.id, &object.shape_keys, frame_count);
            self.progress.update(frame_count + object.shape_keys.len());
        }
        if let Some(first) = objects.first_mut() {
            first.properties = properties;
        }
        Ok(objects)
    }

    fn ingest_existing(
        &mut self,
        source: &SequenceSource,
        frames: &FrameSet,
        settings: &ImportSettings,
        existing: &mut AnimatedMesh,
    ) -> Result<()> {
        let mut bases = self.import_base(source, frames, settings)?;
        if bases.len() != 1 {
            return Err(IngestError::MultiMeshReloadUnsupported {
                frame_file: frames.base().path().to_path_buf(),
                mesh_count: bases.len(),
            });
        }
        let base = bases.remove(0);
        let mut staged = StagedMesh {
            name: existing.name.clone(),
            stack: ShapeKeyStack::with_basis(base.positions),
        };

        let frame_count =
            self.add_delta_frames(source, frames, settings, std::slice::from_mut(&mut staged))?;

        let mut properties = existing.properties.clone();
        build_metadata(source, frames, settings, frame_count).write_to(&mut properties)?;

        let animation = key_weights(existing.id, &staged.stack, frame_count);
        self.progress.update(frame_count + staged.stack.len());

        // Commit
        let vertices = basis_positions(&staged.stack);
        existing.vertices.clear();
        existing.vertices.extend(vertices);
        existing.shape_keys = staged.stack;
        existing.animation = animation;
        existing.properties = properties;
        Ok(())
    }

    fn import(
        &mut self,
        source: &SequenceSource,
        file: &FrameFile,
        settings: &ImportSettings,
    ) -> Result<Vec<MeshFrame>> {
        self.importer
            .import_frame(source.format, file.path(), settings)
            .map_err(|e| IngestError::Import {
                frame_file: file.path().to_path_buf(),
                source: e,
            })
    }

    /// Import the base frame and check that none of its meshes are empty
    fn import_base(
        &mut self,
        source: &SequenceSource,
        frames: &FrameSet,
        settings: &ImportSettings,
    ) -> Result<Vec<MeshFrame>> {
        let file = frames.base();
        let meshes = self.import(source, file, settings)?;
        // A file without any mesh counts as an empty first mesh
        let empty = if meshes.is_empty() {
            Some(0)
        } else {
            meshes.iter().position(|m| m.vertex_count() == 0)
        };
        if let Some(mesh_index) = empty {
            return Err(IngestError::EmptyBaseMesh {
                frame_file: file.path().to_path_buf(),
                mesh_index,
            });
        }
        tracing::debug!(
            "Base frame {} imported {} mesh(es)",
            file.path().display(),
            meshes.len()
        );
        Ok(meshes)
    }

    /// Add one shape key per delta frame to every staged mesh.
    ///
    /// Returns the number of keyed frames: delta frames plus the basis.
    fn add_delta_frames(
        &mut self,
        source: &SequenceSource,
        frames: &FrameSet,
        settings: &ImportSettings,
        staged: &mut [StagedMesh],
    ) -> Result<usize> {
        let mut frame_index = 1;
        for file in frames.deltas() {
            let meshes = self.import(source, file, settings)?;
            validate_delta(file, &meshes, staged)?;

            let key_name = frame_key_name(frame_index);
            // Moving the positions releases the imported frame
            for (mesh, target) in meshes.into_iter().zip(staged.iter_mut()) {
                target.stack.push(ShapeKey::new(key_name.clone(), mesh.positions));
            }
            tracing::debug!("Added {} from {}", key_name, file.path().display());

            frame_index += 1;
            self.progress.update(frame_index);
        }
        Ok(frame_index)
    }
}

fn require_frames<'f>(source: &SequenceSource, frames: Option<&'f FrameSet>) -> Result<&'f FrameSet> {
    frames.ok_or_else(|| IngestError::NoFilesFound {
        directory: source.directory.clone(),
        mask: source.file_mask(),
    })
}

/// Check a delta import against the staged base meshes before anything is written
fn validate_delta(file: &FrameFile, meshes: &[MeshFrame], staged: &[StagedMesh]) -> Result<()> {
    if meshes.len() != staged.len() {
        return Err(IngestError::MeshCountMismatch {
            frame_file: file.path().to_path_buf(),
            expected: staged.len(),
            actual: meshes.len(),
        });
    }
    for (mesh_index, (mesh, target)) in meshes.iter().zip(staged).enumerate() {
        let actual = mesh.vertex_count();
        if actual == 0 {
            return Err(IngestError::EmptyDeltaMesh {
                frame_file: file.path().to_path_buf(),
                mesh_index,
            });
        }
        let expected = target.stack.vertex_count();
        if actual != expected {
            return Err(IngestError::VertexCountMismatch {
                frame_file: file.path().to_path_buf(),
                mesh_index,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

fn basis_positions(stack: &ShapeKeyStack) -> Vec<Position> {
    stack
        .basis()
        .map(|k| k.positions.clone())
        .unwrap_or_default()
}

fn build_metadata(
    source: &SequenceSource,
    frames: &FrameSet,
    settings: &ImportSettings,
    frame_count: usize,
) -> SequenceMetadata {
    SequenceMetadata {
        source: source.clone(),
        files: frames.paths(),
        settings: settings.clone(),
        file_count: frames.len(),
        frame_count,
        initialized: true,
    }
}

/// One-hot weight curves: the key at stack position `j` is 1.0 at frame `j`
/// and 0.0 at every other frame in `1..=frame_count`. The basis is not keyed.
pub fn key_weights(object: ObjectId, stack: &ShapeKeyStack, frame_count: usize) -> WeightAnimation {
    let mut animation = WeightAnimation::new(1, frame_count as u32);
    for (index, key) in stack.frame_keys().iter().enumerate() {
        let position = index + 1;
        let keyframes = (1..=frame_count)
            .map(|time| {
                let weight = if time == position { 1.0 } else { 0.0 };
                Keyframe::new(time as f32, weight)
            })
            .collect();
        let binding = ShapeKeyBinding::new(object, key.name.clone());
        tracing::trace!("Keying {} over 1..={frame_count}", binding.data_path());
        animation.add_track(Track::with_keyframes(binding, keyframes));
    }
    animation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{NoProgress, RecordingProgress};
    use crate::settings::FrameFormat;
    use crate::testing::{mesh, FakeImporter};

    fn source() -> SequenceSource {
        SequenceSource::new("/seq", "wave", FrameFormat::Obj)
    }

    fn frames(count: usize) -> FrameSet {
        FrameSet::from_paths((1..=count).map(|i| format!("/seq/wave{i}.obj"))).unwrap()
    }

    /// Importer where every frame is one mesh of `vertices` vertices
    fn uniform_importer(count: usize, vertices: usize) -> FakeImporter {
        (1..=count).fold(FakeImporter::default(), |importer, i| {
            importer.with_frame(&format!("wave{i}.obj"), vec![mesh("wave1", vertices, i as f32)])
        })
    }

    fn ingest(importer: &mut FakeImporter, frames: &FrameSet) -> Result<Vec<AnimatedMesh>> {
        let mut progress = NoProgress;
        Ingestor::new(importer, &mut progress).ingest(&source(), Some(frames), &ImportSettings::default())
    }

    #[test]
    fn test_builds_one_key_per_delta_frame() {
        let frames = frames(4);
        let mut importer = uniform_importer(4, 6);

        let objects = ingest(&mut importer, &frames).unwrap();
        assert_eq!(objects.len(), 1);

        let object = &objects[0];
        assert_eq!(object.name, "wave_shapekeys");
        assert!(object.shape_keys.use_relative);
        assert_eq!(object.shape_keys.frame_keys().len(), 3);

        let names: Vec<&str> = object.shape_keys.keys().iter().map(|k| k.name.as_str()).collect();
        assert_eq!(names, vec!["Basis", "Frame 1", "Frame 2", "Frame 3"]);
        assert!(object.shape_keys.keys().iter().all(|k| k.positions.len() == 6));

        // Basis and mesh hold the first file's positions
        let first = mesh("wave1", 6, 1.0).positions;
        assert_eq!(object.shape_keys.basis().unwrap().positions, first);
        assert_eq!(object.vertices, first);
        assert_eq!(object.shape_keys.keys()[2].positions, mesh("wave1", 6, 3.0).positions);
    }

    #[test]
    fn test_imports_in_natural_order() {
        let frames = FrameSet::from_paths(["/seq/wave10.obj", "/seq/wave2.obj", "/seq/wave1.obj"]).unwrap();
        let mut importer = FakeImporter::default()
            .with_frame("wave1.obj", vec![mesh("wave1", 3, 1.0)])
            .with_frame("wave2.obj", vec![mesh("wave2", 3, 2.0)])
            .with_frame("wave10.obj", vec![mesh("wave10", 3, 10.0)]);

        let objects = ingest(&mut importer, &frames).unwrap();
        let imported: Vec<String> = importer
            .imported
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(imported, vec!["wave1.obj", "wave2.obj", "wave10.obj"]);
        assert_eq!(
            objects[0].shape_keys.key("Frame 2").unwrap().positions,
            mesh("wave10", 3, 10.0).positions
        );
    }

    #[test]
    fn test_one_hot_weights() {
        let count = 5;
        let frames = frames(count);
        let mut importer = uniform_importer(count, 4);

        let objects = ingest(&mut importer, &frames).unwrap();
        let animation = &objects[0].animation;
        assert_eq!(animation.frame_start, 1);
        assert_eq!(animation.frame_end, count as u32);
        assert_eq!(animation.track_count(), count - 1);
        assert!(animation.track_for("Basis").is_none());

        for (j, key) in objects[0].shape_keys.keys().iter().enumerate().skip(1) {
            let track = animation.track_for(&key.name).unwrap();
            assert_eq!(track.keyframe_count(), count);
            for t in 1..=count {
                let expected = if t == j { 1.0 } else { 0.0 };
                let keyframe = &track.keyframes()[t - 1];
                assert_eq!(keyframe.time, t as f32);
                assert_eq!(keyframe.value, expected);
            }
        }
        assert_eq!(animation.active_key(2.0), Some("Frame 2"));
        assert_eq!(animation.active_key(count as f32), None);
    }

    #[test]
    fn test_single_file_has_only_basis() {
        let frames = frames(1);
        let mut importer = uniform_importer(1, 3);

        let objects = ingest(&mut importer, &frames).unwrap();
        assert_eq!(objects[0].shape_keys.len(), 1);
        assert!(objects[0].animation.is_empty());

        let metadata = objects[0].sequence_metadata().unwrap().unwrap();
        assert_eq!(metadata.frame_count, 1);
        assert_eq!(metadata.file_count, 1);
    }

    #[test]
    fn test_vertex_count_mismatch() {
        let frames = frames(3);
        let mut importer = FakeImporter::default()
            .with_frame("wave1.obj", vec![mesh("wave1", 4, 1.0)])
            .with_frame("wave2.obj", vec![mesh("wave2", 5, 2.0)])
            .with_frame("wave3.obj", vec![mesh("wave3", 4, 3.0)]);

        let err = ingest(&mut importer, &frames).unwrap_err();
        match err {
            IngestError::VertexCountMismatch {
                frame_file,
                mesh_index,
                expected,
                actual,
            } => {
                assert_eq!(frame_file, PathBuf::from("/seq/wave2.obj"));
                assert_eq!(mesh_index, 0);
                assert_eq!(expected, 4);
                assert_eq!(actual, 5);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Aborted before the third frame
        assert_eq!(importer.imported.len(), 2);
        assert_eq!(importer.purged, 1);
    }

    #[test]
    fn test_no_files_found() {
        let mut importer = FakeImporter::default();
        let mut progress = NoProgress;
        let err = Ingestor::new(&mut importer, &mut progress)
            .ingest(&source(), None, &ImportSettings::default())
            .unwrap_err();
        assert!(matches!(err, IngestError::NoFilesFound { ref mask, .. } if mask == "wave*.obj"));
        assert!(importer.imported.is_empty());
    }

    #[test]
    fn test_empty_base_mesh() {
        let frames = frames(2);
        let mut importer = FakeImporter::default()
            .with_frame("wave1.obj", vec![mesh("a", 3, 1.0), mesh("b", 0, 1.0)])
            .with_frame("wave2.obj", vec![mesh("a", 3, 2.0), mesh("b", 3, 2.0)]);

        let err = ingest(&mut importer, &frames).unwrap_err();
        assert!(matches!(err, IngestError::EmptyBaseMesh { mesh_index: 1, .. }));
        assert_eq!(err.to_string(), "Imported object 2 in /seq/wave1.obj has 0 vertices");
    }

    #[test]
    fn test_base_without_meshes() {
        let frames = frames(1);
        let mut importer = FakeImporter::default().with_frame("wave1.obj", Vec::new());

        let err = ingest(&mut importer, &frames).unwrap_err();
        assert!(matches!(err, IngestError::EmptyBaseMesh { mesh_index: 0, .. }));
    }

    #[test]
    fn test_empty_delta_mesh() {
        let frames = frames(2);
        let mut importer = FakeImporter::default()
            .with_frame("wave1.obj", vec![mesh("a", 3, 1.0)])
            .with_frame("wave2.obj", vec![mesh("a", 0, 2.0)]);

        let err = ingest(&mut importer, &frames).unwrap_err();
        assert!(matches!(err, IngestError::EmptyDeltaMesh { mesh_index: 0, ref frame_file } if frame_file.ends_with("wave2.obj")));
    }

    #[test]
    fn test_mesh_count_mismatch() {
        let frames = frames(2);
        let mut importer = FakeImporter::default()
            .with_frame("wave1.obj", vec![mesh("a", 3, 1.0)])
            .with_frame("wave2.obj", vec![mesh("a", 3, 2.0), mesh("b", 3, 2.0)]);

        let err = ingest(&mut importer, &frames).unwrap_err();
        assert!(matches!(err, IngestError::MeshCountMismatch { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn test_import_failure_names_file() {
        let frames = frames(2);
        let mut importer = FakeImporter::default().with_frame("wave1.obj", vec![mesh("a", 3, 1.0)]);

        let err = ingest(&mut importer, &frames).unwrap_err();
        assert!(matches!(err, IngestError::Import { ref frame_file, .. } if frame_file.ends_with("wave2.obj")));
    }

    #[test]
    fn test_multi_mesh_fresh_import() {
        let frames = frames(3);
        let mut importer = (1..=3).fold(FakeImporter::default(), |importer, i| {
            importer.with_frame(
                &format!("wave{i}.obj"),
                vec![mesh("Body.001", 4, i as f32), mesh("Cloth", 2, -(i as f32))],
            )
        });

        let objects = ingest(&mut importer, &frames).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name, "Body_shapekeys");
        assert_eq!(objects[1].name, "Cloth_shapekeys");
        assert_ne!(objects[0].id, objects[1].id);

        for object in &objects {
            assert_eq!(object.shape_keys.len(), 3);
            assert_eq!(object.animation.track_count(), 2);
            assert!(object.animation.tracks().all(|t| t.binding.object == object.id));
        }
        assert_eq!(objects[1].shape_keys.key("Frame 2").unwrap().positions, mesh("Cloth", 2, -3.0).positions);

        // Metadata lives on the first object only
        assert!(objects[0].sequence_metadata().unwrap().is_some());
        assert!(objects[1].sequence_metadata().unwrap().is_none());
    }

    #[test]
    fn test_metadata_snapshot() {
        let frames = frames(3);
        let mut importer = uniform_importer(3, 2);
        let mut settings = ImportSettings::default();
        settings.obj.global_scale = 0.5;

        let mut progress = NoProgress;
        let objects = Ingestor::new(&mut importer, &mut progress)
            .ingest(&source(), Some(&frames), &settings)
            .unwrap();

        let metadata = objects[0].sequence_metadata().unwrap().unwrap();
        assert!(metadata.initialized);
        assert_eq!(metadata.source, source());
        assert_eq!(metadata.files, frames.paths());
        assert_eq!(metadata.settings, settings);
        assert_eq!(metadata.file_count, 3);
        assert_eq!(metadata.frame_count, 3);
    }

    #[test]
    fn test_invalid_settings_rejected_before_import() {
        let frames = frames(2);
        let mut importer = uniform_importer(2, 2);
        let mut settings = ImportSettings::default();
        settings.axis_up = settings.axis_forward;

        let mut progress = NoProgress;
        let err = Ingestor::new(&mut importer, &mut progress)
            .ingest(&source(), Some(&frames), &settings)
            .unwrap_err();
        assert!(matches!(err, IngestError::Settings(_)));
        assert!(importer.imported.is_empty());
    }

    #[test]
    fn test_progress_reporting() {
        let frames = frames(3);
        let mut importer = uniform_importer(3, 2);
        let mut progress = RecordingProgress::default();

        Ingestor::new(&mut importer, &mut progress)
            .ingest(&source(), Some(&frames), &ImportSettings::default())
            .unwrap();

        assert_eq!(progress.begun, vec![6]);
        assert_eq!(progress.updates, vec![2, 3, 6]);
        assert_eq!(progress.ended, 1);
    }

    #[test]
    fn test_ingest_into_existing_keeps_identity() {
        let frames = frames(3);
        let mut importer = uniform_importer(3, 4);
        let mut existing = AnimatedMesh::new("Hero", vec![[9.0; 3]; 4]);
        existing.shape_keys = ShapeKeyStack::with_basis(vec![[9.0; 3]; 4]);
        let id = existing.id;

        let mut progress = NoProgress;
        Ingestor::new(&mut importer, &mut progress)
            .ingest_into(&source(), Some(&frames), &ImportSettings::default(), &mut existing)
            .unwrap();

        assert_eq!(existing.id, id);
        assert_eq!(existing.name, "Hero");
        assert_eq!(existing.vertices, mesh("wave1", 4, 1.0).positions);
        assert_eq!(existing.shape_keys.len(), 3);
        assert!(existing.animation.tracks().all(|t| t.binding.object == id));
        assert_eq!(existing.sequence_metadata().unwrap().unwrap().frame_count, 3);
    }

    #[test]
    fn test_ingest_into_rejects_multi_mesh_base() {
        let frames = frames(2);
        let mut importer = FakeImporter::default()
            .with_frame("wave1.obj", vec![mesh("a", 3, 1.0), mesh("b", 3, 1.0)])
            .with_frame("wave2.obj", vec![mesh("a", 3, 2.0), mesh("b", 3, 2.0)]);
        let mut existing = AnimatedMesh::new("Hero", vec![[9.0; 3]; 3]);
        let before = existing.clone();

        let mut progress = NoProgress;
        let err = Ingestor::new(&mut importer, &mut progress)
            .ingest_into(&source(), Some(&frames), &ImportSettings::default(), &mut existing)
            .unwrap_err();

        assert!(matches!(err, IngestError::MultiMeshReloadUnsupported { mesh_count: 2, .. }));
        assert_eq!(existing.vertices, before.vertices);
        assert_eq!(existing.shape_keys, before.shape_keys);
        assert_eq!(existing.properties, before.properties);
        // Delta frames are never imported
        assert_eq!(importer.imported.len(), 1);
    }

    #[test]
    fn test_ingest_into_failure_leaves_object_untouched() {
        let frames = frames(3);
        let mut importer = FakeImporter::default()
            .with_frame("wave1.obj", vec![mesh("a", 3, 1.0)])
            .with_frame("wave2.obj", vec![mesh("a", 3, 2.0)])
            .with_frame("wave3.obj", vec![mesh("a", 2, 3.0)]);
        let mut existing = AnimatedMesh::new("Hero", vec![[9.0; 3]; 3]);
        existing.shape_keys = ShapeKeyStack::with_basis(vec![[9.0; 3]; 3]);
        let before = existing.clone();

        let mut progress = NoProgress;
        let err = Ingestor::new(&mut importer, &mut progress)
            .ingest_into(&source(), Some(&frames), &ImportSettings::default(), &mut existing)
            .unwrap_err();

        assert!(matches!(err, IngestError::VertexCountMismatch { expected: 3, actual: 2, .. }));
        assert_eq!(existing.vertices, before.vertices);
        assert_eq!(existing.shape_keys, before.shape_keys);
        assert!(existing.animation.is_empty());
    }
}
