use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::clip::{AnimationClip, ChannelData};
use crate::animation::mask::BoneMask;
use crate::animation::tracks::SampleCursor;

/// Playback behavior when local time reaches a clip boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Clamp at the end (or start, when reversed) and mark finished.
    Once,
    /// Wrap modulo duration.
    Loop,
    /// Reflect direction at each boundary.
    PingPong,
}

/// One weighted playback instance of a clip inside a blend layer.
///
/// Owned exclusively by the [`AnimationBlendLayer`](crate::animation::AnimationBlendLayer)
/// that created it; removed explicitly, or automatically once transient and
/// weightless.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    /// Local playback time in seconds.
    pub time: f32,
    /// Playback speed multiplier; negative plays in reverse.
    pub time_scale: f32,
    /// Requested blend weight in `[0, 1]`.
    pub weight: f32,
    pub loop_mode: LoopMode,
    /// Removed automatically when the weight reaches zero.
    pub transient: bool,

    pub(crate) mask: Option<BoneMask>,
    pub(crate) finished: bool,
    cursors: Vec<SampleCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            transient: false,
            mask: None,
            finished: false,
            cursors: vec![SampleCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_loop_mode(mut self, mode: LoopMode) -> Self {
        self.loop_mode = mode;
        self
    }

    /// Restricts this action's influence to the given bone subset.
    #[must_use]
    pub fn with_mask(mut self, mask: BoneMask) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Marks the action for automatic removal once its weight reaches zero.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances local playback time according to the loop mode.
    pub fn advance(&mut self, dt: f32) {
        let duration = self.clip.duration;
        if self.finished || duration <= 0.0 {
            return;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.finished = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.finished = true;
                }
            }
            LoopMode::Loop => {
                self.time = self.time.rem_euclid(duration);
            }
            LoopMode::PingPong => {
                // Fold the [0, 2*duration) cycle back onto [0, duration].
                let folded = self.time.rem_euclid(duration * 2.0);
                self.time = if folded > duration {
                    duration * 2.0 - folded
                } else {
                    folded
                };
            }
        }
    }

    pub(crate) fn sample_vec3(&mut self, track: usize) -> Option<Vec3> {
        let t = self.clip.tracks.get(track)?;
        let cursor = self.cursors.get_mut(track)?;
        match &t.data {
            ChannelData::Translation(track) | ChannelData::Scale(track) => {
                Some(track.sample(self.time, cursor))
            }
            ChannelData::Rotation(_) => None,
        }
    }

    pub(crate) fn sample_quat(&mut self, track: usize) -> Option<Quat> {
        let t = self.clip.tracks.get(track)?;
        let cursor = self.cursors.get_mut(track)?;
        match &t.data {
            ChannelData::Rotation(track) => Some(track.sample(self.time, cursor)),
            _ => None,
        }
    }
}
