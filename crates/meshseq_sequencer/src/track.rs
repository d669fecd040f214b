// SPDX-License-Identifier: MIT OR Apache-2.0
//! Weight tracks for shape keys.

use crate::binding::ShapeKeyBinding;
use crate::keyframe::Keyframe;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// A weight curve driving one shape key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Shape key whose weight this track animates
    pub binding: ShapeKeyBinding,
    /// Keyframes, sorted by time
    keyframes: Vec<Keyframe>,
    /// Whether the track is muted
    pub muted: bool,
}

impl Track {
    /// Create a track from keyframes in any order
    pub fn with_keyframes(binding: ShapeKeyBinding, mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self {
            id: TrackId::new(),
            binding,
            keyframes,
            muted: false,
        }
    }

    /// Name of the animated shape key
    pub fn name(&self) -> &str {
        &self.binding.shape_key
    }

    /// Find keyframes surrounding a time
    fn find_keyframes(&self, time: f32) -> (Option<&Keyframe>, Option<&Keyframe>) {
        match self.keyframes.iter().position(|k| k.time >= time) {
            // Past all keyframes
            None => (self.keyframes.last(), None),
            // Before or at first keyframe
            Some(0) => (None, self.keyframes.first()),
            Some(idx) => (Some(&self.keyframes[idx - 1]), Some(&self.keyframes[idx])),
        }
    }

    /// Evaluate the weight at a given time
    pub fn evaluate(&self, time: f32) -> Option<f32> {
        match self.find_keyframes(time) {
            (None, None) => None,
            (Some(kf), None) | (None, Some(kf)) => Some(kf.value),
            (Some(a), Some(b)) => {
                if (b.time - a.time).abs() < 0.0001 {
                    return Some(b.value);
                }
                let t = (time - a.time) / (b.time - a.time);
                Some(a.interpolate(b, t))
            }
        }
    }

    /// Get all keyframes
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Get keyframe count
    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }
}
