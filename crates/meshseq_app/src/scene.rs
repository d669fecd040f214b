// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene documents holding imported sequence objects.

use meshseq_sequencer::{AnimatedMesh, ObjectId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current scene file format version
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// Error loading or saving a scene
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed scene file
    #[error("Invalid scene file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Scene written by a newer version
    #[error("Scene version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}

/// A set of objects saved to a RON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Format version
    pub version: u32,
    /// Objects in creation order
    pub objects: Vec<AnimatedMesh>,
}

impl Default for SceneDocument {
    fn default() -> Self {
        Self {
            version: SCENE_FORMAT_VERSION,
            objects: Vec::new(),
        }
    }
}

impl SceneDocument {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a scene from a file
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        let scene: SceneDocument = ron::from_str(&content)?;

        // Version check
        if scene.version > SCENE_FORMAT_VERSION {
            return Err(SceneError::UnsupportedVersion {
                found: scene.version,
                supported: SCENE_FORMAT_VERSION,
            });
        }

        Ok(scene)
    }

    /// Load a scene, or start an empty one if the file does not exist yet
    pub fn load_or_new(path: &Path) -> Result<Self, SceneError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Save the scene to a file
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Add an object, renaming it `name.001`, `name.002`, ... if the name is taken
    pub fn add_object(&mut self, mut object: AnimatedMesh) -> ObjectId {
        if self.find(&object.name).is_some() {
            let base = object.name.clone();
            let mut n = 1;
            while self.find(&format!("{base}.{n:03}")).is_some() {
                n += 1;
            }
            object.name = format!("{base}.{n:03}");
        }
        let id = object.id;
        self.objects.push(object);
        id
    }

    /// Find an object by name
    pub fn find(&self, name: &str) -> Option<&AnimatedMesh> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Find an object by name for modification
    pub fn find_mut(&mut self, name: &str) -> Option<&mut AnimatedMesh> {
        self.objects.iter_mut().find(|o| o.name == name)
    }
}
