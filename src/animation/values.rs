use glam::{Quat, Vec3};

/// Value types a keyframe track can carry.
pub trait Interpolatable: Copy {
    /// Linear (or spherical, for rotations) interpolation at `t` in `[0, 1]`.
    fn interpolate(a: Self, b: Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }
}

impl Interpolatable for Quat {
    fn interpolate(a: Self, b: Self, t: f32) -> Self {
        a.slerp(b, t)
    }
}
