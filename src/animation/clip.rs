use glam::{Quat, Vec3};

use crate::animation::tracks::KeyframeTrack;

/// Keyframe data for one channel of one bone.
#[derive(Debug, Clone)]
pub enum ChannelData {
    Translation(KeyframeTrack<Vec3>),
    Rotation(KeyframeTrack<Quat>),
    Scale(KeyframeTrack<Vec3>),
}

impl ChannelData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            ChannelData::Translation(t) | ChannelData::Scale(t) => t.end_time(),
            ChannelData::Rotation(t) => t.end_time(),
        }
    }
}

/// One bone channel: which bone it drives, and its curve.
#[derive(Debug, Clone)]
pub struct Track {
    /// Canonical bone name this channel targets.
    pub bone: String,
    pub data: ChannelData,
}

/// A named, immutable animation clip shared read-only between all actions
/// that reference it.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Duration is derived from the latest keyframe across all tracks.
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }
}
