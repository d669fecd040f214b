// SPDX-License-Identifier: MIT OR Apache-2.0
//! Keyframe definitions for shape-key weight curves.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A weight keyframe on a track.
///
/// Times are scene frame numbers, so a sequence keyed at every integer frame
/// produces a hard switch between neighbouring 0.0/1.0 values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Frame time
    pub time: f32,
    /// Weight at this keyframe
    pub value: f32,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
            value,
        }
    }

    /// Linearly interpolate from this keyframe towards `next` at normalized time `t`
    pub fn interpolate(&self, next: &Keyframe, t: f32) -> f32 {
        Interpolation::lerp(self.value, next.value, t)
    }
}

/// Interpolation utilities
pub struct Interpolation;

impl Interpolation {
    /// Linear interpolation between two floats
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}
