//! vitrine — a scroll-driven 3D character animation engine.
//!
//! The engine reconciles a continuous, reversible input signal (scroll
//! progress) with discrete, time-based animation clips: an encrypted model
//! asset is decrypted and ingested just in time, concurrent bone-masked
//! actions are composited into one pose per frame, scroll progress maps to
//! camera/transform/material parameters through keyframe curves, and a
//! pointer-driven head override composes on top of the blended pose.

pub mod animation;
pub mod assets;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod scene;

pub use animation::{
    ActionId, AnimationAction, AnimationBlendLayer, AnimationClip, BoneMask, BoneMaskRegistry,
    LoopMode,
};
pub use assets::{
    AssetReader, FileAssetReader, LoadingSignal, Model, ModelIngestor, NullLoadingSignal,
    load_encrypted_model, load_encrypted_model_with,
};
pub use driver::{
    Ease, Keyframes, LayoutMode, PointerLookConfig, PointerLookController,
    ScrollTimelineController, TimelineOutputs, TimelineTarget,
};
pub use engine::{Engine, HeadlessBackend, RenderBackend};
pub use errors::{Result, VitrineError};
pub use scene::{Bone, BoneTransform, Camera, Node, NodeKind, Pose, Scene, Skeleton, Transform};
