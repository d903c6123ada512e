//! Pointer-driven head tracking.

use glam::{EulerRot, Quat, Vec2};

/// Tuning for the head-look effect.
#[derive(Debug, Clone, Copy)]
pub struct PointerLookConfig {
    /// Exponential smoothing rate per second; higher follows the pointer
    /// more tightly.
    pub smoothing: f32,
    /// Yaw at the edge of the viewport, radians.
    pub yaw_range: f32,
    /// Pitch at the edge of the viewport, radians.
    pub pitch_range: f32,
    /// Hard clamp on yaw, radians.
    pub max_yaw: f32,
    /// Hard clamp on pitch, radians.
    pub max_pitch: f32,
}

impl Default for PointerLookConfig {
    fn default() -> Self {
        Self {
            smoothing: 8.0,
            yaw_range: 0.6,
            pitch_range: 0.35,
            max_yaw: 0.7,
            max_pitch: 0.45,
        }
    }
}

/// Maintains a smoothed look target from raw pointer samples and derives a
/// bounded head-bone override rotation.
///
/// The override composes *after* the blend layer's output for the head bone,
/// so head tracking is independent of whichever idle/typing pose is active.
/// Raw samples arrive from the input event handler; only
/// [`PointerLookController::update`] (called from the frame tick) reads them.
pub struct PointerLookController {
    config: PointerLookConfig,
    /// Latest raw sample in normalized device coordinates, `[-1, 1]`.
    raw: Vec2,
    smoothed: Vec2,
}

impl PointerLookController {
    #[must_use]
    pub fn new(config: PointerLookConfig) -> Self {
        Self {
            config,
            raw: Vec2::ZERO,
            smoothed: Vec2::ZERO,
        }
    }

    /// Event-handler write path: records a pointer sample in viewport
    /// pixels. Never touches the skeleton.
    pub fn set_pointer_viewport(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        // Viewport pixels to NDC, +y up.
        self.raw = Vec2::new(
            (x / width) * 2.0 - 1.0,
            1.0 - (y / height) * 2.0,
        );
    }

    /// Records a pointer sample already in `[-1, 1]` coordinates.
    pub fn set_pointer_ndc(&mut self, ndc: Vec2) {
        self.raw = ndc;
    }

    /// Frame-tick read path: advances the smoothed target and returns this
    /// frame's head override rotation, clamped to anatomically plausible
    /// limits regardless of pointer extremity.
    pub fn update(&mut self, dt: f32) -> Quat {
        let alpha = 1.0 - (-self.config.smoothing * dt.max(0.0)).exp();
        self.smoothed += (self.raw - self.smoothed) * alpha;

        let yaw = (self.smoothed.x * self.config.yaw_range)
            .clamp(-self.config.max_yaw, self.config.max_yaw);
        let pitch = (self.smoothed.y * self.config.pitch_range)
            .clamp(-self.config.max_pitch, self.config.max_pitch);

        Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
    }

    /// Extracts (yaw, pitch) from an override produced by
    /// [`update`](Self::update).
    #[must_use]
    pub fn angles(rotation: Quat) -> Vec2 {
        let (yaw, pitch, _) = rotation.to_euler(EulerRot::YXZ);
        Vec2::new(yaw, pitch)
    }
}

impl Default for PointerLookController {
    fn default() -> Self {
        Self::new(PointerLookConfig::default())
    }
}
