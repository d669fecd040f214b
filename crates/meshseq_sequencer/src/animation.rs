// SPDX-License-Identifier: MIT OR Apache-2.0
//! Weight animation containing one track per animated shape key.

use crate::track::{Track, TrackId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Shape-key weight animation of one object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightAnimation {
    /// Tracks in creation order
    tracks: IndexMap<TrackId, Track>,
    /// First keyed frame
    pub frame_start: u32,
    /// Last keyed frame
    pub frame_end: u32,
}

impl WeightAnimation {
    /// Create an empty animation covering `frame_start..=frame_end`
    pub fn new(frame_start: u32, frame_end: u32) -> Self {
        Self {
            tracks: IndexMap::new(),
            frame_start,
            frame_end,
        }
    }

    /// Add a track
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        id
    }

    /// Get the track animating a shape key
    pub fn track_for(&self, shape_key: &str) -> Option<&Track> {
        self.tracks.values().find(|t| t.name() == shape_key)
    }

    /// Get all tracks
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the animation has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Weight of a shape key at a frame
    pub fn weight(&self, shape_key: &str, frame: f32) -> Option<f32> {
        self.track_for(shape_key)?.evaluate(frame)
    }

    /// Evaluate every unmuted track at a frame
    pub fn evaluate(&self, frame: f32) -> Vec<(&str, f32)> {
        self.tracks
            .values()
            .filter(|t| !t.muted)
            .filter_map(|t| t.evaluate(frame).map(|w| (t.name(), w)))
            .collect()
    }

    /// Shape key with full weight at a frame, if any
    pub fn active_key(&self, frame: f32) -> Option<&str> {
        self.evaluate(frame)
            .into_iter()
            .find(|(_, w)| *w >= 1.0)
            .map(|(name, _)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{ObjectId, ShapeKeyBinding};
    use crate::keyframe::Keyframe;

    fn animation() -> WeightAnimation {
        let object = ObjectId::new();
        let mut animation = WeightAnimation::new(1, 3);
        for (j, name) in ["Frame 1", "Frame 2"].into_iter().enumerate() {
            let keyframes = (1..=3)
                .map(|t| Keyframe::new(t as f32, if t == j + 1 { 1.0 } else { 0.0 }))
                .collect();
            animation.add_track(Track::with_keyframes(ShapeKeyBinding::new(object, name), keyframes));
        }
        animation
    }

    #[test]
    fn test_tracks_keep_creation_order() {
        let animation = animation();
        let names: Vec<&str> = animation.tracks().map(Track::name).collect();
        assert_eq!(names, vec!["Frame 1", "Frame 2"]);
    }

    #[test]
    fn test_active_key() {
        let animation = animation();
        assert_eq!(animation.active_key(1.0), Some("Frame 1"));
        assert_eq!(animation.active_key(2.0), Some("Frame 2"));
        assert_eq!(animation.active_key(3.0), None);
        assert_eq!(animation.weight("Frame 2", 1.5), Some(0.5));
    }

    #[test]
    fn test_muted_tracks_are_skipped() {
        let mut animation = animation();
        let id = animation.tracks().next().map(|t| t.id).unwrap();
        animation.tracks.get_mut(&id).unwrap().muted = true;
        assert_eq!(animation.evaluate(1.0), vec![("Frame 2", 0.0)]);
        assert_eq!(animation.active_key(1.0), None);
        assert_eq!(animation.track_count(), 2);
    }
}
