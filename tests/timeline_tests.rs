//! Scroll Timeline & Pointer Tests
//!
//! Tests for:
//! - Keyframe sequence validation at registration time
//! - Interpolation endpoint exactness and continuity
//! - Section activation state and rest values
//! - Fast-scroll jumps vs. continuous traversal
//! - Responsive keyframe variants
//! - Pointer head-look smoothing and clamping

use glam::Vec2;

use vitrine::driver::pointer::{PointerLookConfig, PointerLookController};
use vitrine::driver::timeline::{
    Ease, Keyframes, LayoutMode, ScrollTimelineController, TimelineTarget,
};
use vitrine::errors::VitrineError;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn linear(points: Vec<(f32, f32)>) -> Keyframes<f32> {
    Keyframes::new(points, Ease::Linear).expect("valid keyframes")
}

// ============================================================================
// Keyframes validation
// ============================================================================

#[test]
fn keyframes_reject_single_point() {
    let err = Keyframes::new(vec![(0.0, 1.0_f32)], Ease::Linear).unwrap_err();
    assert!(matches!(err, VitrineError::InvalidKeyframeSequence(_)));
}

#[test]
fn keyframes_reject_non_increasing_progress() {
    let err =
        Keyframes::new(vec![(0.0, 0.0_f32), (0.5, 1.0), (0.5, 2.0), (1.0, 3.0)], Ease::Linear)
            .unwrap_err();
    assert!(matches!(err, VitrineError::InvalidKeyframeSequence(_)));
}

#[test]
fn keyframes_reject_bad_endpoints() {
    let err = Keyframes::new(vec![(0.1, 0.0_f32), (1.0, 1.0)], Ease::Linear).unwrap_err();
    assert!(matches!(err, VitrineError::InvalidKeyframeSequence(_)));

    let err = Keyframes::new(vec![(0.0, 0.0_f32), (0.9, 1.0)], Ease::Linear).unwrap_err();
    assert!(matches!(err, VitrineError::InvalidKeyframeSequence(_)));
}

// ============================================================================
// Keyframes evaluation
// ============================================================================

#[test]
fn endpoints_evaluate_exactly() {
    let curve = linear(vec![(0.0, -3.0), (0.4, 10.0), (1.0, 7.0)]);
    assert_eq!(curve.evaluate(0.0), -3.0);
    assert_eq!(curve.evaluate(1.0), 7.0);
    // No extrapolation beyond [0, 1].
    assert_eq!(curve.evaluate(-2.0), -3.0);
    assert_eq!(curve.evaluate(2.0), 7.0);
}

#[test]
fn piecewise_linear_between_brackets() {
    let curve = linear(vec![(0.0, 0.0), (0.5, 10.0), (1.0, 0.0)]);
    assert!(approx(curve.evaluate(0.25), 5.0));
    assert!(approx(curve.evaluate(0.5), 10.0));
    assert!(approx(curve.evaluate(0.75), 5.0));
}

#[test]
fn evaluation_is_continuous_and_monotonic() {
    let curve = linear(vec![(0.0, 0.0), (0.3, 2.0), (0.7, 5.0), (1.0, 9.0)]);
    let mut previous = curve.evaluate(0.0);
    for i in 1..=1000 {
        let value = curve.evaluate(i as f32 / 1000.0);
        assert!(value >= previous, "monotonic keyframes produced a dip");
        assert!(value - previous < 0.05, "discontinuity detected");
        previous = value;
    }
}

#[test]
fn smoothstep_ease_passes_through_midpoint() {
    let curve = Keyframes::new(vec![(0.0, 0.0_f32), (1.0, 1.0)], Ease::SmoothStep).unwrap();
    assert!(approx(curve.evaluate(0.5), 0.5));
    // Ease-out rises faster than linear early on.
    let out = Keyframes::new(vec![(0.0, 0.0_f32), (1.0, 1.0)], Ease::EaseOutCubic).unwrap();
    assert!(out.evaluate(0.25) > 0.25);
}

// ============================================================================
// ScrollTimelineController
// ============================================================================

fn hero_controller() -> ScrollTimelineController {
    let mut controller = ScrollTimelineController::new();
    controller.register_section("hero", 0.0, 100.0);
    controller.bind(
        "hero",
        TimelineTarget::GroupRotationY,
        linear(vec![(0.0, 0.0), (1.0, 2.0)]),
    );
    controller
}

#[test]
fn progress_is_clamped_and_mapped() {
    let mut controller = hero_controller();
    controller.on_scroll_update("hero", 50.0);
    let section = controller.section("hero").unwrap();
    assert!(approx(section.progress, 0.5));
    assert!(section.active);
    assert!(approx(controller.outputs().group_rotation_y, 1.0));
}

#[test]
fn fast_scroll_jump_matches_continuous_traversal() {
    // One controller scrubs through every intermediate offset, the other
    // jumps straight to the end; continuous outputs must agree exactly.
    let mut scrubbed = hero_controller();
    for step in 0..=100 {
        scrubbed.on_scroll_update("hero", step as f32);
    }
    let mut jumped = hero_controller();
    jumped.on_scroll_update("hero", 0.0);
    jumped.on_scroll_update("hero", 100.0);

    assert_eq!(
        scrubbed.outputs().group_rotation_y,
        jumped.outputs().group_rotation_y
    );
}

#[test]
fn identical_progress_yields_identical_output() {
    let mut controller = hero_controller();
    controller.on_scroll_update("hero", 73.0);
    let first = controller.outputs().group_rotation_y;

    // Scroll away and back; no hidden frame state may leak in.
    controller.on_scroll_update("hero", 10.0);
    controller.on_scroll_update("hero", 73.0);
    assert_eq!(controller.outputs().group_rotation_y, first);
}

#[test]
fn inactive_section_emits_rest_values() {
    let mut controller = hero_controller();
    controller.on_scroll_update("hero", 50.0);
    assert!(approx(controller.outputs().group_rotation_y, 1.0));

    // Scrolled fully past: progress clamps to 1 but the section leaves.
    controller.on_scroll_update("hero", 150.0);
    let section = controller.section("hero").unwrap();
    assert!(!section.active);
    assert!(approx(section.progress, 1.0));
    assert!(approx(controller.outputs().group_rotation_y, 0.0));
}

#[test]
fn explicit_enter_and_leave_toggle_activation() {
    let mut controller = hero_controller();
    controller.on_scroll_update("hero", 40.0);
    controller.on_section_leave("hero");
    assert!(approx(controller.outputs().group_rotation_y, 0.0));

    controller.on_section_enter("hero");
    assert!(approx(controller.outputs().group_rotation_y, 0.8));
}

#[test]
fn binding_to_unregistered_section_degrades_silently() {
    let mut controller = ScrollTimelineController::new();
    controller.bind(
        "missing",
        TimelineTarget::CameraX,
        linear(vec![(0.0, 0.0), (1.0, 1.0)]),
    );
    controller.on_scroll_update("missing", 10.0);
    assert!(approx(controller.outputs().camera_position.x, 0.0));
}

#[test]
fn discrete_toggle_reflects_final_progress_only() {
    let mut controller = ScrollTimelineController::new();
    controller.register_section("desk", 0.0, 10.0);
    controller.bind_toggle("desk", "laptop", 0.5, true);

    // Jump from 0 straight past the threshold.
    controller.on_scroll_update("desk", 0.0);
    assert_eq!(controller.outputs().visibility.get("laptop"), Some(&false));
    controller.on_scroll_update("desk", 10.0);
    assert_eq!(controller.outputs().visibility.get("laptop"), Some(&true));

    // And back again in one jump.
    controller.on_scroll_update("desk", 0.0);
    assert_eq!(controller.outputs().visibility.get("laptop"), Some(&false));
}

#[test]
fn compact_layout_picks_alternate_curve() {
    let mut controller = ScrollTimelineController::new();
    controller.register_section("hero", 0.0, 100.0);
    controller.bind_responsive(
        "hero",
        TimelineTarget::CameraZ,
        linear(vec![(0.0, 3.0), (1.0, 5.0)]),
        Some(linear(vec![(0.0, 4.0), (1.0, 8.0)])),
    );

    controller.on_scroll_update("hero", 50.0);
    assert!(approx(controller.outputs().camera_position.z, 4.0));

    // Mode switch re-evaluates with the compact curve at the same progress.
    controller.set_layout_mode(LayoutMode::Compact);
    assert!(approx(controller.outputs().camera_position.z, 6.0));
}

#[test]
fn action_weight_targets_are_keyed_by_name() {
    let mut controller = ScrollTimelineController::new();
    controller.register_section("work", 0.0, 10.0);
    controller.bind(
        "work",
        TimelineTarget::ActionWeight("typing".to_string()),
        linear(vec![(0.0, 0.0), (1.0, 1.0)]),
    );

    controller.on_scroll_update("work", 5.0);
    assert!(approx(
        *controller.outputs().action_weights.get("typing").unwrap(),
        0.5
    ));
}

// ============================================================================
// PointerLookController
// ============================================================================

#[test]
fn pointer_rotation_never_exceeds_bounds() {
    let config = PointerLookConfig::default();
    let mut controller = PointerLookController::new(config);

    // Absurdly far outside the viewport.
    controller.set_pointer_ndc(Vec2::new(1000.0, -1000.0));
    let mut rotation = glam::Quat::IDENTITY;
    for _ in 0..600 {
        rotation = controller.update(1.0 / 60.0);
    }

    let angles = PointerLookController::angles(rotation);
    assert!(angles.x.abs() <= config.max_yaw + 1e-4);
    assert!(angles.y.abs() <= config.max_pitch + 1e-4);
}

#[test]
fn pointer_smoothing_approaches_target() {
    let mut controller = PointerLookController::new(PointerLookConfig {
        smoothing: 8.0,
        yaw_range: 1.0,
        pitch_range: 1.0,
        max_yaw: 2.0,
        max_pitch: 2.0,
    });

    controller.set_pointer_ndc(Vec2::new(0.5, 0.0));
    let first = PointerLookController::angles(controller.update(1.0 / 60.0)).x;
    assert!(first > 0.0 && first < 0.5);

    for _ in 0..600 {
        controller.update(1.0 / 60.0);
    }
    let settled = PointerLookController::angles(controller.update(1.0 / 60.0)).x;
    assert!((settled - 0.5).abs() < 1e-3);
}

#[test]
fn viewport_coordinates_map_to_centered_ndc() {
    let mut controller = PointerLookController::default();
    controller.set_pointer_viewport(960.0, 540.0, 1920.0, 1080.0);
    for _ in 0..600 {
        controller.update(1.0 / 60.0);
    }
    let angles = PointerLookController::angles(controller.update(1.0 / 60.0));
    assert!(approx(angles.x, 0.0));
    assert!(approx(angles.y, 0.0));
}
