// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mesh data: imported frames, shape keys and animated objects.

use crate::animation::WeightAnimation;
use crate::binding::ObjectId;
use crate::metadata::{PropertyStore, SequenceMetadata, MetadataError, SequenceState};
use serde::{Deserialize, Serialize};

/// Name of the reference shape key
pub const BASIS_NAME: &str = "Basis";

/// Suffix appended to objects created from a sequence
pub const OBJECT_NAME_SUFFIX: &str = "_shapekeys";

/// A 3D vertex position
pub type Position = [f32; 3];

/// Name of the shape key holding delta frame `index` (1-based)
pub fn frame_key_name(index: usize) -> String {
    format!("Frame {index}")
}

/// Geometry of one mesh produced by importing a frame file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshFrame {
    /// Mesh name chosen by the importer
    pub name: String,
    /// Vertex positions in file order
    pub positions: Vec<Position>,
}

impl MeshFrame {
    /// Create a mesh frame
    pub fn new(name: impl Into<String>, positions: Vec<Position>) -> Self {
        Self {
            name: name.into(),
            positions,
        }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// How a shape key blends between keyed weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KeyInterpolation {
    /// Linear blend
    #[default]
    Linear,
}

/// A named alternate set of vertex positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeKey {
    /// Shape key name
    pub name: String,
    /// One position per mesh vertex
    pub positions: Vec<Position>,
    /// Blend interpolation
    pub interpolation: KeyInterpolation,
}

impl ShapeKey {
    /// Create a linear shape key
    pub fn new(name: impl Into<String>, positions: Vec<Position>) -> Self {
        Self {
            name: name.into(),
            positions,
            interpolation: KeyInterpolation::Linear,
        }
    }
}

/// Ordered shape keys of a mesh; index 0 is the basis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShapeKeyStack {
    /// Keys blend independently against the basis
    pub use_relative: bool,
    keys: Vec<ShapeKey>,
}

impl ShapeKeyStack {
    /// Create a relative stack whose basis holds `positions`
    pub fn with_basis(positions: Vec<Position>) -> Self {
        Self {
            use_relative: true,
            keys: vec![ShapeKey::new(BASIS_NAME, positions)],
        }
    }

    /// Append a key; returns its stack position
    pub fn push(&mut self, key: ShapeKey) -> usize {
        self.keys.push(key);
        self.keys.len() - 1
    }

    /// The basis key
    pub fn basis(&self) -> Option<&ShapeKey> {
        self.keys.first()
    }

    /// Keys after the basis, in stack order
    pub fn frame_keys(&self) -> &[ShapeKey] {
        self.keys.get(1..).unwrap_or_default()
    }

    /// All keys including the basis
    pub fn keys(&self) -> &[ShapeKey] {
        &self.keys
    }

    /// Find a key by name
    pub fn key(&self, name: &str) -> Option<&ShapeKey> {
        self.keys.iter().find(|k| k.name == name)
    }

    /// Number of keys including the basis
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the stack has no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Vertex count shared by every key
    pub fn vertex_count(&self) -> usize {
        self.basis().map_or(0, |k| k.positions.len())
    }
}

/// A mesh object animated through its shape keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatedMesh {
    /// Object identity, stable across reloads
    pub id: ObjectId,
    /// Object name
    pub name: String,
    /// Mesh vertex positions
    pub vertices: Vec<Position>,
    /// Shape key stack
    pub shape_keys: ShapeKeyStack,
    /// Weight curves of the non-basis keys
    pub animation: WeightAnimation,
    /// Custom key-value state attached to the object
    #[serde(default)]
    pub properties: PropertyStore,
}

impl AnimatedMesh {
    /// Create a plain mesh object with no shape keys
    pub fn new(name: impl Into<String>, vertices: Vec<Position>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            vertices,
            shape_keys: ShapeKeyStack::default(),
            animation: WeightAnimation::default(),
            properties: PropertyStore::default(),
        }
    }

    /// Number of mesh vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of animated states, basis included
    pub fn frame_count(&self) -> usize {
        self.shape_keys.len()
    }

    /// Sequence metadata stored on this object, if any
    pub fn sequence_metadata(&self) -> Result<Option<SequenceMetadata>, MetadataError> {
        SequenceMetadata::read_from(&self.properties)
    }

    /// Lifecycle state of the object's sequence
    pub fn sequence_state(&self) -> SequenceState {
        SequenceState::of(&self.properties)
    }
}

/// Object name for a sequence whose base mesh is called `mesh_name`.
///
/// `"wave_0001.obj"` becomes `"wave_shapekeys"`.
pub fn sequence_object_name(mesh_name: &str) -> String {
    let stem = match mesh_name.rfind('.') {
        Some(dot) if dot > 0 => &mesh_name[..dot],
        _ => mesh_name,
    };
    let trimmed = stem.trim_end_matches(|c: char| c == '.' || c == '_' || c.is_ascii_digit());
    format!("{trimmed}{OBJECT_NAME_SUFFIX}")
}
