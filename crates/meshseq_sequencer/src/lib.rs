// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mesh sequence ingestion for shape-key animation.
//!
//! This crate turns a directory of numbered mesh files into one animated
//! object per base mesh:
//! - Frame discovery with natural ordering
//! - Shape-key stacks built from per-frame vertex positions
//! - One-hot weight curves, one per shape key
//! - Metadata stored on the object for later reloads
//!
//! ## Architecture
//!
//! Parsing mesh files and reporting progress are left to the host through
//! the [`FrameImporter`] and [`ProgressReporter`] traits. The ingestion
//! engine validates every frame before committing anything, so a failed
//! import or reload never leaves a half-built object behind.

pub mod animation;
pub mod binding;
pub mod frame_set;
pub mod importer;
pub mod ingest;
pub mod keyframe;
pub mod mesh;
pub mod metadata;
pub mod progress;
pub mod reload;
pub mod sequencer;
pub mod settings;
pub mod track;

#[cfg(test)]
mod testing;

pub use animation::WeightAnimation;
pub use binding::{ObjectId, ShapeKeyBinding};
pub use frame_set::{resolve, FrameFile, FrameSet, ResolveError, SortKey};
pub use importer::{FrameImporter, ImportError};
pub use ingest::{key_weights, IngestError, Ingestor};
pub use keyframe::{Interpolation, Keyframe, KeyframeId};
pub use mesh::{
    frame_key_name, sequence_object_name, AnimatedMesh, MeshFrame, Position, ShapeKey,
    ShapeKeyStack, BASIS_NAME,
};
pub use metadata::{MetadataError, PropertyStore, PropertyValue, SequenceMetadata, SequenceState};
pub use progress::{LogProgress, NoProgress, ProgressReporter};
pub use reload::{FileSystem, StdFileSystem};
pub use sequencer::ShapeKeySequencer;
pub use settings::{
    Axis, FrameFormat, ImportSettings, ObjSettings, PlySettings, SequenceSource, SettingsError,
    StlSettings,
};
pub use track::{Track, TrackId};
