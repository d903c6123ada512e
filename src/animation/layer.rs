use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};

use crate::animation::action::AnimationAction;
use crate::animation::clip::ChannelData;
use crate::errors::{Result, VitrineError};
use crate::scene::skeleton::{Pose, Skeleton, canonical_bone_name};

/// Stable handle to an action inside a blend layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(u64);

/// Track indices of one bone's channels within one clip, resolved at add
/// time so per-frame blending is purely index-based.
#[derive(Debug, Clone, Copy)]
struct BoneChannels {
    bone: usize,
    translation: Option<usize>,
    rotation: Option<usize>,
    scale: Option<usize>,
}

#[derive(Debug)]
struct ActiveAction {
    id: ActionId,
    action: AnimationAction,
    bindings: Vec<BoneChannels>,
}

/// Composites N concurrently active weighted actions into one pose per frame.
///
/// Blend policy, per bone: weighted average of the sampled local transforms
/// of every action whose mask covers the bone. If the requested weights sum
/// above 1 they are scaled down proportionally; if they sum below 1 the
/// remainder blends in the rest pose, so every bone's weights always total
/// exactly 1. Bones no action touches keep the rest pose.
///
/// The layer applies no implicit priority between overlapping actions;
/// callers that stack full-weight actions on the same bones must budget
/// their weights to sum to at most 1.
pub struct AnimationBlendLayer {
    skeleton: Arc<Skeleton>,
    rest: Pose,
    pose: Pose,
    actions: Vec<ActiveAction>,
    next_id: u64,

    // Per-bone scratch, reused every tick.
    weight_sums: Vec<f32>,
    translation_acc: Vec<Vec3>,
    rotation_acc: Vec<Vec4>,
    scale_acc: Vec<Vec3>,
}

impl AnimationBlendLayer {
    #[must_use]
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        let rest = skeleton.rest_pose();
        let pose = rest.clone();
        let n = skeleton.len();
        Self {
            skeleton,
            rest,
            pose,
            actions: Vec::new(),
            next_id: 0,
            weight_sums: vec![0.0; n],
            translation_acc: vec![Vec3::ZERO; n],
            rotation_acc: vec![Vec4::ZERO; n],
            scale_acc: vec![Vec3::ZERO; n],
        }
    }

    #[must_use]
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Adds an action, resolving its clip channels to bone indices.
    ///
    /// # Errors
    ///
    /// [`VitrineError::IncompatibleClip`] when no channel of the clip binds
    /// to the layer's skeleton; the active set is left unchanged.
    pub fn add(&mut self, action: AnimationAction) -> Result<ActionId> {
        let mut bindings: Vec<BoneChannels> = Vec::new();
        let mut bound_any = false;

        for (track_index, track) in action.clip().tracks.iter().enumerate() {
            let Some(bone) = self.skeleton.bone_index(&canonical_bone_name(&track.bone)) else {
                continue;
            };
            bound_any = true;

            // The mask scopes influence; unmasked bones stay with whichever
            // other actions control them.
            if let Some(mask) = &action.mask {
                if !mask.covers(bone) {
                    continue;
                }
            }

            let slot = match bindings.iter().position(|b| b.bone == bone) {
                Some(i) => i,
                None => {
                    bindings.push(BoneChannels {
                        bone,
                        translation: None,
                        rotation: None,
                        scale: None,
                    });
                    bindings.len() - 1
                }
            };
            let channels = &mut bindings[slot];
            match &track.data {
                ChannelData::Translation(_) => channels.translation = Some(track_index),
                ChannelData::Rotation(_) => channels.rotation = Some(track_index),
                ChannelData::Scale(_) => channels.scale = Some(track_index),
            }
        }

        if !bound_any {
            return Err(VitrineError::IncompatibleClip {
                clip: action.clip().name.clone(),
            });
        }

        let id = ActionId(self.next_id);
        self.next_id += 1;
        self.actions.push(ActiveAction {
            id,
            action,
            bindings,
        });
        Ok(id)
    }

    /// Removes an action. Returns whether it was present.
    pub fn remove(&mut self, id: ActionId) -> bool {
        let before = self.actions.len();
        self.actions.retain(|a| a.id != id);
        self.actions.len() != before
    }

    #[must_use]
    pub fn action(&self, id: ActionId) -> Option<&AnimationAction> {
        self.actions.iter().find(|a| a.id == id).map(|a| &a.action)
    }

    pub fn action_mut(&mut self, id: ActionId) -> Option<&mut AnimationAction> {
        self.actions
            .iter_mut()
            .find(|a| a.id == id)
            .map(|a| &mut a.action)
    }

    pub fn set_weight(&mut self, id: ActionId, weight: f32) {
        if let Some(action) = self.action_mut(id) {
            action.weight = weight.clamp(0.0, 1.0);
        }
    }

    /// Advances all actions and composites the frame's pose.
    pub fn tick(&mut self, dt: f32) -> &Pose {
        for active in &mut self.actions {
            active.action.advance(dt);
        }

        self.weight_sums.fill(0.0);
        self.translation_acc.fill(Vec3::ZERO);
        self.rotation_acc.fill(Vec4::ZERO);
        self.scale_acc.fill(Vec3::ZERO);

        for active in &self.actions {
            if active.action.weight <= 0.0 {
                continue;
            }
            for channels in &active.bindings {
                self.weight_sums[channels.bone] += active.action.weight;
            }
        }

        for active in &mut self.actions {
            let weight = active.action.weight;
            if weight <= 0.0 {
                continue;
            }
            for channels in &active.bindings {
                let bone = channels.bone;
                let total = self.weight_sums[bone];
                // Scale down proportionally past 1; below 1 the remainder
                // goes to the rest pose in the finalize pass.
                let w = if total > 1.0 { weight / total } else { weight };
                let rest = *self.rest.local(bone);

                let translation = channels
                    .translation
                    .and_then(|t| active.action.sample_vec3(t))
                    .unwrap_or(rest.translation);
                let scale = channels
                    .scale
                    .and_then(|t| active.action.sample_vec3(t))
                    .unwrap_or(rest.scale);
                let mut rotation = channels
                    .rotation
                    .and_then(|t| active.action.sample_quat(t))
                    .unwrap_or(rest.rotation);

                // Keep quaternion accumulation on one cover of the sphere.
                if rotation.dot(rest.rotation) < 0.0 {
                    rotation = -rotation;
                }

                self.translation_acc[bone] += translation * w;
                self.scale_acc[bone] += scale * w;
                self.rotation_acc[bone] += Vec4::from(rotation) * w;
            }
        }

        for bone in 0..self.rest.len() {
            let rest = *self.rest.local(bone);
            let total = self.weight_sums[bone];
            let out = self.pose.local_mut(bone);

            if total <= 0.0 {
                *out = rest;
                continue;
            }

            let rest_fill = (1.0 - total).max(0.0);
            out.translation = self.translation_acc[bone] + rest.translation * rest_fill;
            out.scale = self.scale_acc[bone] + rest.scale * rest_fill;
            let rotation = self.rotation_acc[bone] + Vec4::from(rest.rotation) * rest_fill;
            out.rotation = Quat::from_vec4(rotation).normalize();
        }

        self.actions
            .retain(|a| !(a.action.transient && a.action.weight <= 0.0));

        &self.pose
    }

    /// The pose produced by the most recent tick.
    #[must_use]
    pub fn pose(&self) -> &Pose {
        &self.pose
    }
}
