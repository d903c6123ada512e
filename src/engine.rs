//! Engine Core Module
//!
//! [`Engine`] is the render loop: the per-frame orchestrator that owns the
//! drawable graph, the blend layer and the render context, and is the sole
//! mutator of skeletal state. Input collaborators (scroll trigger system,
//! pointer events, resize) only write scalar state through the routing
//! methods here; the next [`Engine::frame`] tick reads it. That
//! single-writer handoff keeps input cadence decoupled from render cadence
//! with no locking.
//!
//! # Lifecycle
//!
//! 1. Create with [`Engine::new`] around a [`RenderBackend`].
//! 2. Load a model asynchronously ([`crate::assets::load_encrypted_model`])
//!    and hand it over with [`Engine::install_model`]. Until then every
//!    frame renders the placeholder scene.
//! 3. Drive [`Engine::frame`] at display refresh rate.
//! 4. [`Engine::teardown`] stops the loop and detaches input routing
//!    *before* releasing backend resources.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Quat;

use crate::animation::{
    ActionId, AnimationAction, AnimationBlendLayer, BoneMask, BoneMaskRegistry, LoopMode,
};
use crate::assets::Model;
use crate::driver::{LayoutMode, PointerLookController, ScrollTimelineController, TimelineOutputs};
use crate::errors::{Result, VitrineError};
use crate::scene::{Camera, NodeKey, NodeKind, Scene, Skeleton};

/// Draw-call seam. The engine hands each composed frame to the backend;
/// swapping backends never touches animation or input code.
pub trait RenderBackend {
    fn render_frame(&mut self, scene: &Scene, camera: &Camera);
    /// Releases GPU resources. Called exactly once, from
    /// [`Engine::teardown`], after the loop has stopped.
    fn release(&mut self) {}
}

/// Backend that draws nothing. Used in tests and while prototyping.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    pub frames_rendered: u64,
    pub released: bool,
}

impl RenderBackend for HeadlessBackend {
    fn render_frame(&mut self, _scene: &Scene, _camera: &Camera) {
        self.frames_rendered += 1;
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// The character's animation state once a model is installed.
struct CharacterRig {
    skeleton: Arc<Skeleton>,
    layer: AnimationBlendLayer,
    head_bone: Option<usize>,
    actions_by_name: HashMap<String, ActionId>,
}

/// The per-frame orchestrator. See the module docs for the lifecycle.
pub struct Engine<B: RenderBackend> {
    backend: B,
    scene: Scene,
    camera: Camera,
    timeline: ScrollTimelineController,
    pointer: PointerLookController,
    masks: BoneMaskRegistry,

    rig: Option<CharacterRig>,
    group_root: Option<NodeKey>,
    clips: Vec<Arc<crate::animation::AnimationClip>>,

    running: bool,
    time: f32,
    frame_count: u64,
}

impl<B: RenderBackend> Engine<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            scene: Scene::new(),
            camera: Camera::default(),
            timeline: ScrollTimelineController::new(),
            pointer: PointerLookController::default(),
            masks: BoneMaskRegistry::with_defaults(),
            rig: None,
            group_root: None,
            clips: Vec::new(),
            running: true,
            time: 0.0,
            frame_count: 0,
        }
    }

    /// Replaces the built-in bone-group table.
    #[must_use]
    pub fn with_masks(mut self, masks: BoneMaskRegistry) -> Self {
        self.masks = masks;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn timeline_mut(&mut self) -> &mut ScrollTimelineController {
        &mut self.timeline
    }

    #[must_use]
    pub fn timeline(&self) -> &ScrollTimelineController {
        &self.timeline
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.group_root.is_some()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.time
    }

    // ========================================================================
    // Model installation
    // ========================================================================

    /// Takes ownership of an ingested model: drawable graph, skeleton and
    /// clips. The head bone is resolved once, through the "head" group of
    /// the bone-mask registry; a rig without one degrades to no head
    /// tracking with a warning.
    pub fn install_model(&mut self, model: Model) -> Result<()> {
        self.scene = model.scene;
        self.clips = model.clips;
        self.group_root = self.scene.roots().first().copied();

        self.rig = match model.skeleton {
            Some(skeleton) => {
                let skeleton = Arc::new(skeleton);
                let head_bone = self.resolve_head_bone(&skeleton);
                Some(CharacterRig {
                    layer: AnimationBlendLayer::new(skeleton.clone()),
                    skeleton,
                    head_bone,
                    actions_by_name: HashMap::new(),
                })
            }
            None => {
                log::warn!("model has no skeleton; character animation disabled");
                None
            }
        };
        Ok(())
    }

    fn resolve_head_bone(&self, skeleton: &Skeleton) -> Option<usize> {
        match self.masks.resolve("head", skeleton) {
            Ok(mask) => {
                let head = (0..skeleton.len()).find(|&i| mask.covers(i));
                if head.is_none() {
                    log::warn!("\"head\" bone group matches no skeleton bone; head tracking off");
                }
                head
            }
            Err(err) => {
                log::warn!("head bone unresolved ({err}); head tracking off");
                None
            }
        }
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Starts a named action on the rig, optionally restricted to a bone
    /// group. Reusing an active name replaces that instance. An unknown
    /// group name logs a warning and the action contributes zero
    /// influence; an incompatible clip is rejected and the active set
    /// stays unchanged.
    pub fn start_action(
        &mut self,
        name: &str,
        clip_name: &str,
        group: Option<&str>,
        weight: f32,
        loop_mode: LoopMode,
    ) -> Result<ActionId> {
        let Some(clip) = self.clips.iter().find(|c| c.name == clip_name).cloned() else {
            return Err(VitrineError::IncompatibleClip {
                clip: clip_name.to_string(),
            });
        };
        let Some(rig) = self.rig.as_mut() else {
            return Err(VitrineError::IncompatibleClip {
                clip: clip_name.to_string(),
            });
        };

        let mask = match group {
            None => None,
            Some(group_name) => match self.masks.resolve(group_name, &rig.skeleton) {
                Ok(mask) => Some(mask),
                Err(err) => {
                    log::warn!("action {name:?}: {err}; it will contribute zero influence");
                    Some(BoneMask::from_indices(rig.skeleton.len(), &[]))
                }
            },
        };

        let mut action = AnimationAction::new(clip)
            .with_weight(weight)
            .with_loop_mode(loop_mode);
        if let Some(mask) = mask {
            action = action.with_mask(mask);
        }

        let id = rig.layer.add(action)?;
        // Restarting a name replaces its previous instance; an id left in
        // the layer without a name entry would be unreachable forever.
        if let Some(old) = rig.actions_by_name.insert(name.to_string(), id) {
            rig.layer.remove(old);
        }
        Ok(id)
    }

    /// Removes a named action. Returns whether it was present.
    pub fn stop_action(&mut self, name: &str) -> bool {
        let Some(rig) = self.rig.as_mut() else {
            return false;
        };
        match rig.actions_by_name.remove(name) {
            Some(id) => rig.layer.remove(id),
            None => false,
        }
    }

    // ========================================================================
    // Input routing (event-handler write paths)
    // ========================================================================

    pub fn on_scroll_update(&mut self, section_id: &str, raw_offset: f32) {
        if self.running {
            self.timeline.on_scroll_update(section_id, raw_offset);
        }
    }

    pub fn on_section_enter(&mut self, section_id: &str) {
        if self.running {
            self.timeline.on_section_enter(section_id);
        }
    }

    pub fn on_section_leave(&mut self, section_id: &str) {
        if self.running {
            self.timeline.on_section_leave(section_id);
        }
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if self.running {
            self.pointer.set_pointer_viewport(x, y, width, height);
        }
    }

    /// Read once per resize: switches keyframe variants and camera aspect.
    pub fn set_layout_mode(&mut self, mode: LayoutMode, aspect: f32) {
        if self.running {
            self.timeline.set_layout_mode(mode);
            self.camera.set_aspect(aspect);
        }
    }

    // ========================================================================
    // Frame tick
    // ========================================================================

    /// Advances one frame: ticks the blend layer, applies the latest
    /// timeline outputs and the pointer head override, refreshes world
    /// matrices and issues the draw. Never suspends.
    pub fn frame(&mut self, dt: f32) {
        if !self.running {
            return;
        }

        let outputs = self.timeline.outputs().clone();
        let head_override = self.pointer.update(dt);

        self.apply_character(dt, &outputs, head_override);
        self.apply_outputs(&outputs);

        self.scene.update_world_matrices();
        self.backend.render_frame(&self.scene, &self.camera);

        self.time += dt;
        self.frame_count += 1;
    }

    fn apply_character(&mut self, dt: f32, outputs: &TimelineOutputs, head_override: Quat) {
        // No rig yet (still loading, or load failed): render the
        // placeholder scene without ever touching an unset skeleton.
        let Some(rig) = self.rig.as_mut() else {
            return;
        };

        for (name, &weight) in &outputs.action_weights {
            if let Some(&id) = rig.actions_by_name.get(name) {
                rig.layer.set_weight(id, weight);
            }
        }

        let pose = rig.layer.tick(dt);

        for (bone_index, bone) in rig.skeleton.bones().iter().enumerate() {
            let Some(node) = self.scene.get_node_mut(bone.node) else {
                continue;
            };
            let local = pose.local(bone_index);
            node.transform.position = local.translation;
            node.transform.scale = local.scale;
            node.transform.rotation = if rig.head_bone == Some(bone_index) {
                // Additive override composed after the blended pose.
                local.rotation * head_override
            } else {
                local.rotation
            };
        }
    }

    fn apply_outputs(&mut self, outputs: &TimelineOutputs) {
        self.camera.position = outputs.camera_position;
        self.camera.fov_y = outputs.camera_fov;

        if let Some(root) = self.group_root {
            if let Some(node) = self.scene.get_node_mut(root) {
                node.transform.position = outputs.group_position;
                node.transform.set_rotation_euler(0.0, outputs.group_rotation_y, 0.0);
                node.transform.scale = glam::Vec3::splat(outputs.group_scale);
            }
        }

        for (_, node) in self.scene.iter_nodes_mut() {
            match &mut node.kind {
                NodeKind::Mesh(mesh) => mesh.opacity = outputs.material_opacity,
                NodeKind::Light(light) => light.intensity = outputs.light_intensity,
                NodeKind::Group => {}
            }
            if let Some(&visible) = outputs.visibility.get(&node.name) {
                node.visible = visible;
            }
        }
    }

    // ========================================================================
    // Teardown
    // ========================================================================

    /// Stops the loop and detaches input routing, then releases backend
    /// resources. The ordering is correctness-critical: a callback arriving
    /// after teardown must find the routing already closed, never freed
    /// backend state.
    pub fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.backend.release();
    }
}
