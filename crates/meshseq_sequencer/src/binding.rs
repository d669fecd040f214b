// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binding of weight tracks to shape keys on an object.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of an animated mesh object.
///
/// Reloading a sequence into an existing object keeps this ID, so anything
/// that refers to the object by ID stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    /// Create a new random object ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Binding of a track to the weight of one shape key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeKeyBinding {
    /// Object owning the shape key
    pub object: ObjectId,
    /// Shape key name
    pub shape_key: String,
}

impl ShapeKeyBinding {
    /// Create a binding to a shape key weight
    pub fn new(object: ObjectId, shape_key: impl Into<String>) -> Self {
        Self {
            object,
            shape_key: shape_key.into(),
        }
    }

    /// Host data path of the animated property
    pub fn data_path(&self) -> String {
        format!("key_blocks[\"{}\"].value", self.shape_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_path() {
        let binding = ShapeKeyBinding::new(ObjectId::new(), "Frame 3");
        assert_eq!(binding.data_path(), "key_blocks[\"Frame 3\"].value");
    }
}
