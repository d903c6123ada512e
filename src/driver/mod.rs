//! Input-driven controllers: scroll timeline and pointer head tracking.
//!
//! Both follow the single-writer handoff: event handlers write scalar state
//! here, and the render loop reads it once per frame tick. Input cadence is
//! fully decoupled from render cadence.

pub mod pointer;
pub mod timeline;

pub use pointer::{PointerLookConfig, PointerLookController};
pub use timeline::{
    Ease, Keyframes, LayoutMode, ScrollSection, ScrollTimelineController, TimelineOutputs,
    TimelineTarget,
};
