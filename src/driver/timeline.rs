//! Scroll-to-parameter mapping.
//!
//! The external trigger system reports normalized scroll offsets per page
//! section; this controller turns them into interpolated target values
//! (camera pose, character group transform, light intensity, material
//! opacity, blend weights) written into a [`TimelineOutputs`] snapshot.
//!
//! Evaluation is a pure function of section progress, so rapid scroll
//! reversal or a 0-to-1 jump lands on exactly the same outputs as a slow
//! continuous pass.

use std::collections::HashMap;

use glam::Vec3;

use crate::animation::values::Interpolatable;
use crate::errors::{Result, VitrineError};

/// Easing applied to the local `t` within one keyframe segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    SmoothStep,
    EaseOutCubic,
}

impl Ease {
    #[must_use]
    fn apply(self, t: f32) -> f32 {
        match self {
            Ease::Linear => t,
            Ease::SmoothStep => t * t * (3.0 - 2.0 * t),
            Ease::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Ordered (progress, value) control points over `[0, 1]`.
#[derive(Debug, Clone)]
pub struct Keyframes<T: Interpolatable> {
    points: Vec<(f32, T)>,
    ease: Ease,
}

impl<T: Interpolatable> Keyframes<T> {
    /// # Errors
    ///
    /// [`VitrineError::InvalidKeyframeSequence`] when fewer than two points
    /// are given, progress values are not strictly increasing, or the
    /// endpoints are not exactly 0.0 and 1.0. Rejected at registration so
    /// malformed curves never reach per-frame evaluation.
    pub fn new(points: Vec<(f32, T)>, ease: Ease) -> Result<Self> {
        if points.len() < 2 {
            return Err(VitrineError::InvalidKeyframeSequence(format!(
                "need at least 2 control points, got {}",
                points.len()
            )));
        }
        for pair in points.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(VitrineError::InvalidKeyframeSequence(format!(
                    "progress values must be strictly increasing, got {} then {}",
                    pair[0].0, pair[1].0
                )));
            }
        }
        let first = points[0].0;
        let last = points[points.len() - 1].0;
        if first != 0.0 || last != 1.0 {
            return Err(VitrineError::InvalidKeyframeSequence(format!(
                "endpoints must be 0.0 and 1.0, got {first} and {last}"
            )));
        }
        Ok(Self { points, ease })
    }

    /// Piecewise interpolation; exact endpoint values at 0 and 1, no
    /// extrapolation beyond.
    #[must_use]
    pub fn evaluate(&self, progress: f32) -> T {
        let p = progress.clamp(0.0, 1.0);
        if p <= 0.0 {
            return self.points[0].1;
        }
        let last = self.points.len() - 1;
        if p >= 1.0 {
            return self.points[last].1;
        }

        let next = self.points.partition_point(|&(kp, _)| kp <= p);
        let (p0, v0) = self.points[next - 1];
        let (p1, v1) = self.points[next];
        let t = self.ease.apply((p - p0) / (p1 - p0));
        T::interpolate(v0, v1, t)
    }
}

/// Active layout variant, read once per resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    Wide,
    Compact,
}

/// Which output field a keyframe curve drives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimelineTarget {
    CameraX,
    CameraY,
    CameraZ,
    CameraFov,
    GroupX,
    GroupY,
    GroupZ,
    GroupRotationY,
    GroupScale,
    LightIntensity,
    MaterialOpacity,
    /// Blend weight of the named animation action.
    ActionWeight(String),
}

/// Single-writer snapshot the render loop reads once per frame.
#[derive(Debug, Clone)]
pub struct TimelineOutputs {
    pub camera_position: Vec3,
    pub camera_fov: f32,
    pub group_position: Vec3,
    pub group_rotation_y: f32,
    pub group_scale: f32,
    pub light_intensity: f32,
    pub material_opacity: f32,
    pub action_weights: HashMap<String, f32>,
    /// Discrete visibility toggles by node name.
    pub visibility: HashMap<String, bool>,
}

impl Default for TimelineOutputs {
    fn default() -> Self {
        Self {
            camera_position: Vec3::new(0.0, 1.0, 3.0),
            camera_fov: 50.0_f32.to_radians(),
            group_position: Vec3::ZERO,
            group_rotation_y: 0.0,
            group_scale: 1.0,
            light_intensity: 1.0,
            material_opacity: 1.0,
            action_weights: HashMap::new(),
            visibility: HashMap::new(),
        }
    }
}

impl TimelineOutputs {
    fn set(&mut self, target: &TimelineTarget, value: f32) {
        match target {
            TimelineTarget::CameraX => self.camera_position.x = value,
            TimelineTarget::CameraY => self.camera_position.y = value,
            TimelineTarget::CameraZ => self.camera_position.z = value,
            TimelineTarget::CameraFov => self.camera_fov = value,
            TimelineTarget::GroupX => self.group_position.x = value,
            TimelineTarget::GroupY => self.group_position.y = value,
            TimelineTarget::GroupZ => self.group_position.z = value,
            TimelineTarget::GroupRotationY => self.group_rotation_y = value,
            TimelineTarget::GroupScale => self.group_scale = value,
            TimelineTarget::LightIntensity => self.light_intensity = value,
            TimelineTarget::MaterialOpacity => self.material_opacity = value,
            TimelineTarget::ActionWeight(name) => {
                self.action_weights.insert(name.clone(), value);
            }
        }
    }
}

/// One registered page section, driven by the external trigger system.
#[derive(Debug, Clone)]
pub struct ScrollSection {
    pub id: String,
    pub start: f32,
    pub end: f32,
    /// Normalized progress in `[0, 1]`; meaningful only while active.
    pub progress: f32,
    pub active: bool,
}

struct Binding {
    section: usize,
    target: TimelineTarget,
    wide: Keyframes<f32>,
    compact: Option<Keyframes<f32>>,
    /// Value emitted while the section is inactive.
    rest: f32,
}

struct Toggle {
    section: usize,
    node: String,
    threshold: f32,
    visible_above: bool,
}

/// Maps per-section scroll progress to output parameters.
pub struct ScrollTimelineController {
    sections: Vec<ScrollSection>,
    bindings: Vec<Binding>,
    toggles: Vec<Toggle>,
    mode: LayoutMode,
    outputs: TimelineOutputs,
}

impl ScrollTimelineController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            bindings: Vec::new(),
            toggles: Vec::new(),
            mode: LayoutMode::Wide,
            outputs: TimelineOutputs::default(),
        }
    }

    /// Registers a section by identifier and scroll-offset range.
    pub fn register_section(&mut self, id: &str, start: f32, end: f32) {
        if end <= start {
            log::warn!("section {id:?} has an empty offset range [{start}, {end}], ignored");
            return;
        }
        self.sections.push(ScrollSection {
            id: id.to_string(),
            start,
            end,
            progress: 0.0,
            active: false,
        });
    }

    #[must_use]
    pub fn section(&self, id: &str) -> Option<&ScrollSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    fn section_index(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Binds a keyframe curve to a target for one section. The section
    /// being unregistered (e.g. its trigger element was missing) is
    /// non-fatal: the binding is dropped with a warning and the feature
    /// degrades to rest values.
    pub fn bind(&mut self, section_id: &str, target: TimelineTarget, curve: Keyframes<f32>) {
        self.bind_responsive(section_id, target, curve, None);
    }

    /// Like [`bind`](Self::bind), with a separate curve for compact layout.
    pub fn bind_responsive(
        &mut self,
        section_id: &str,
        target: TimelineTarget,
        wide: Keyframes<f32>,
        compact: Option<Keyframes<f32>>,
    ) {
        let Some(section) = self.section_index(section_id) else {
            log::warn!("binding for unregistered section {section_id:?} dropped");
            return;
        };
        let rest = wide.evaluate(0.0);
        self.bindings.push(Binding {
            section,
            target,
            wide,
            compact,
            rest,
        });
        self.refresh_section(section);
    }

    /// Registers a discrete visibility toggle: the named node is shown
    /// (or hidden, when `visible_above` is false) once progress crosses
    /// `threshold`. State always reflects the final progress, so a fast
    /// scroll that jumps the threshold lands in the same state as a slow
    /// one.
    pub fn bind_toggle(
        &mut self,
        section_id: &str,
        node: &str,
        threshold: f32,
        visible_above: bool,
    ) {
        let Some(section) = self.section_index(section_id) else {
            log::warn!("toggle for unregistered section {section_id:?} dropped");
            return;
        };
        self.toggles.push(Toggle {
            section,
            node: node.to_string(),
            threshold,
            visible_above,
        });
        self.refresh_section(section);
    }

    /// Switches the responsive keyframe variant and re-evaluates.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.mode != mode {
            self.mode = mode;
            for i in 0..self.sections.len() {
                self.refresh_section(i);
            }
        }
    }

    #[must_use]
    pub fn layout_mode(&self) -> LayoutMode {
        self.mode
    }

    /// Recomputes a section's progress from a raw scroll offset and emits
    /// the interpolated values for every binding of that section.
    pub fn on_scroll_update(&mut self, section_id: &str, raw_offset: f32) {
        let Some(index) = self.section_index(section_id) else {
            return;
        };
        {
            let section = &mut self.sections[index];
            section.progress =
                ((raw_offset - section.start) / (section.end - section.start)).clamp(0.0, 1.0);
            section.active = raw_offset >= section.start && raw_offset <= section.end;
        }
        self.refresh_section(index);
    }

    /// Activation callback from the trigger system.
    pub fn on_section_enter(&mut self, section_id: &str) {
        if let Some(index) = self.section_index(section_id) {
            self.sections[index].active = true;
            self.refresh_section(index);
        }
    }

    /// Deactivation callback; the section's outputs revert to rest values.
    pub fn on_section_leave(&mut self, section_id: &str) {
        if let Some(index) = self.section_index(section_id) {
            self.sections[index].active = false;
            self.refresh_section(index);
        }
    }

    /// The latest output snapshot, read once per frame by the render loop.
    #[must_use]
    pub fn outputs(&self) -> &TimelineOutputs {
        &self.outputs
    }

    fn refresh_section(&mut self, index: usize) {
        let (progress, active) = {
            let section = &self.sections[index];
            (section.progress, section.active)
        };

        for binding in self.bindings.iter().filter(|b| b.section == index) {
            let value = if active {
                let curve = match (self.mode, &binding.compact) {
                    (LayoutMode::Compact, Some(compact)) => compact,
                    _ => &binding.wide,
                };
                curve.evaluate(progress)
            } else {
                binding.rest
            };
            self.outputs.set(&binding.target, value);
        }

        for toggle in self.toggles.iter().filter(|t| t.section == index) {
            let above = progress >= toggle.threshold;
            let visible = above == toggle.visible_above;
            self.outputs.visibility.insert(toggle.node.clone(), visible);
        }
    }
}

impl Default for ScrollTimelineController {
    fn default() -> Self {
        Self::new()
    }
}
