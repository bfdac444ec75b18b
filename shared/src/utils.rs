use std::f32::consts::{PI, TAU};

use crate::collision::{Vec3, settings::DIST_EPS_SQ};

/// Normalize `v`, or return zero if it is too short to have a direction.
#[inline]
pub fn normalize_or_zero(v: &Vec3) -> Vec3 {
    let len_sq = v.norm_squared();
    if len_sq <= DIST_EPS_SQ || !len_sq.is_finite() {
        return Vec3::zeros();
    }
    v / len_sq.sqrt()
}

/// Unit horizontal (XZ) direction the camera faces for a given yaw.
///
/// Yaw 0 faces -Z; positive yaw turns left (counter-clockwise seen from above).
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Unit horizontal direction to the camera's right for a given yaw.
///
/// Equals `forward_from_yaw(yaw) × +Y`.
#[inline]
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Wrap an angle into `(-PI, PI]`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Affine remap of `value` from `[from_min, from_max]` to `[0, 1]`, clamped.
///
/// A collapsed input range yields 0.
#[inline]
pub fn remap_unit(value: f32, from_min: f32, from_max: f32) -> f32 {
    let span = from_max - from_min;
    if span.abs() <= f32::EPSILON || !value.is_finite() {
        return 0.0;
    }
    ((value - from_min) / span).clamp(0.0, 1.0)
}
