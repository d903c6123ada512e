//! Skeletal animation: clips, keyframe tracks, bone masks and the blend
//! layer that composites concurrent actions into one pose per frame.

pub mod action;
pub mod clip;
pub mod layer;
pub mod mask;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode};
pub use clip::{AnimationClip, ChannelData, Track};
pub use layer::{ActionId, AnimationBlendLayer};
pub use mask::{BoneMask, BoneMaskRegistry};
pub use tracks::{Interpolation, KeyframeTrack, SampleCursor};
pub use values::Interpolatable;
