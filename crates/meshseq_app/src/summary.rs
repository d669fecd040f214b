// SPDX-License-Identifier: MIT OR Apache-2.0
//! Human and machine readable object summaries.

use meshseq_sequencer::{AnimatedMesh, FileSystem, SequenceState, ShapeKeySequencer, Track};
use serde::Serialize;
use std::fmt;

/// Where an object's sequence was imported from
#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    /// Directory the frames were resolved in
    pub directory: String,
    /// Glob mask used to find the frames, e.g. `wave_*.obj`
    pub mask: String,
    /// Human readable frame format
    pub format: &'static str,
    /// Number of files recorded at the last import
    pub file_count: usize,
    /// Last keyed frame
    pub frame_count: usize,
    /// Every recorded file still exists
    pub files_present: bool,
}

/// One scene object
#[derive(Debug, Clone, Serialize)]
pub struct ObjectSummary {
    /// Stable object identity
    pub id: String,
    /// Scene name
    pub name: String,
    /// Vertex count of the base mesh
    pub vertices: usize,
    /// Shape key names in stack order, Basis first
    pub shape_keys: Vec<String>,
    /// Number of weight tracks
    pub tracks: usize,
    /// Keyframes over all tracks
    pub keyframes: usize,
    /// First frame of the weight animation
    pub frame_start: u32,
    /// Last frame of the weight animation
    pub frame_end: u32,
    /// Whether the object can be reloaded
    pub initialized: bool,
    /// Frame the active key was looked up at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<u32>,
    /// Shape key at full weight on `frame`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_key: Option<String>,
    /// Absent for plain objects or unreadable metadata
    pub source: Option<SourceSummary>,
}

impl ObjectSummary {
    /// Summarise an object, checking its recorded files on disk
    pub fn new<F: FileSystem>(object: &AnimatedMesh, sequencer: &ShapeKeySequencer<F>) -> Self {
        let source = match object.sequence_metadata() {
            Ok(Some(metadata)) => Some(SourceSummary {
                directory: metadata.source.directory.display().to_string(),
                mask: metadata.source.file_mask(),
                format: metadata.source.format.display_name(),
                file_count: metadata.file_count,
                frame_count: metadata.frame_count,
                files_present: sequencer.verify_files(object),
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Skipping metadata of {}: {e}", object.name);
                None
            }
        };

        let animation = &object.animation;
        Self {
            id: object.id.to_string(),
            name: object.name.clone(),
            vertices: object.vertex_count(),
            shape_keys: object.shape_keys.keys().iter().map(|k| k.name.clone()).collect(),
            tracks: animation.track_count(),
            keyframes: animation.tracks().map(Track::keyframe_count).sum(),
            frame_start: animation.frame_start,
            frame_end: animation.frame_end,
            initialized: object.sequence_state() == SequenceState::Initialized,
            frame: None,
            active_key: None,
            source,
        }
    }

    /// Also report which shape key is fully weighted at `frame`
    pub fn at_frame(mut self, object: &AnimatedMesh, frame: u32) -> Self {
        self.frame = Some(frame);
        self.active_key = object.animation.active_key(frame as f32).map(str::to_owned);
        self
    }
}

impl fmt::Display for ObjectSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} vertices, {} shape keys",
            self.name,
            self.id,
            self.vertices,
            self.shape_keys.len()
        )?;
        if let Some(source) = &self.source {
            write!(
                f,
                ", {} tracks ({} keyframes), frames {}..={} from {}/{} ({}, {} files{})",
                self.tracks,
                self.keyframes,
                self.frame_start,
                self.frame_end,
                source.directory,
                source.mask,
                source.format,
                source.file_count,
                if source.files_present { "" } else { ", some missing" }
            )?;
        }
        if let Some(frame) = self.frame {
            match &self.active_key {
                Some(key) => write!(f, "; frame {frame}: {key}")?,
                None => write!(f, "; frame {frame}: Basis")?,
            }
        }
        Ok(())
    }
}
