//! Camera orientation for the first-person view.
//!
//! Yaw/pitch are applied in YXZ order (yaw about +Y, then pitch about the
//! rotated +X); the unrotated camera looks down -Z.

use crate::{
    collision::Vec3,
    constants::{LOOK_SPRING_FREQUENCY, MAX_PITCH_DEG},
    utils::{forward_from_yaw, right_from_yaw, wrap_angle},
};

/// How the view should change this frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum LookCommand {
    /// Leave the view alone.
    #[default]
    Hold,
    /// Rotate instantly by these angles (radians). Mouse look.
    Delta { yaw: f32, pitch: f32 },
    /// Steer smoothly toward this absolute orientation (radians). Hand aim.
    Target { yaw: f32, pitch: f32 },
}

/// Current view angles plus the spring velocities used while steering.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ViewRig {
    pub yaw: f32,
    pub pitch: f32,
    yaw_rate: f32,
    pitch_rate: f32,
}

impl ViewRig {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw: wrap_angle(yaw),
            pitch: clamp_pitch(pitch),
            ..Self::default()
        }
    }

    /// Rotate instantly. Any steering velocity is discarded so a later
    /// target does not inherit stale momentum.
    pub fn rotate_by(&mut self, yaw: f32, pitch: f32) {
        self.yaw = wrap_angle(self.yaw + yaw);
        self.pitch = clamp_pitch(self.pitch + pitch);
        self.yaw_rate = 0.0;
        self.pitch_rate = 0.0;
    }

    /// Advance a critically damped spring toward `(yaw, pitch)` by `dt` seconds.
    ///
    /// Yaw takes the short way around the circle.
    pub fn approach(&mut self, yaw: f32, pitch: f32, dt: f32, frequency: f32) {
        if dt <= 0.0 {
            return;
        }
        let target_pitch = clamp_pitch(pitch);

        let yaw_error = wrap_angle(self.yaw - yaw);
        let (yaw_error, yaw_rate) = critically_damped(yaw_error, self.yaw_rate, frequency, dt);
        self.yaw = wrap_angle(yaw + yaw_error);
        self.yaw_rate = yaw_rate;

        let (pitch_error, pitch_rate) =
            critically_damped(self.pitch - target_pitch, self.pitch_rate, frequency, dt);
        self.pitch = clamp_pitch(target_pitch + pitch_error);
        self.pitch_rate = pitch_rate;
    }

    /// Apply one substep's share of a look command.
    ///
    /// Deltas are split evenly across the substeps of a frame so the summed
    /// rotation equals the full delta.
    pub fn apply(&mut self, look: &LookCommand, dt: f32, substeps: u32) {
        match *look {
            LookCommand::Hold => {}
            LookCommand::Delta { yaw, pitch } => {
                let share = 1.0 / substeps.max(1) as f32;
                self.rotate_by(yaw * share, pitch * share);
            }
            LookCommand::Target { yaw, pitch } => {
                self.approach(yaw, pitch, dt, LOOK_SPRING_FREQUENCY);
            }
        }
    }

    /// Horizontal forward basis vector.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.yaw)
    }

    /// Horizontal right basis vector.
    #[inline]
    pub fn right(&self) -> Vec3 {
        right_from_yaw(self.yaw)
    }

    /// Full 3D view direction including pitch.
    pub fn look_direction(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-sy * cp, sp, -cy * cp)
    }
}

/// Convert a unit aim direction to absolute view angles:
/// yaw = atan2(x, z), pitch = -asin(y).
///
/// A zero-length direction has no orientation and yields `None`.
pub fn aim_to_angles(aim: &Vec3) -> Option<(f32, f32)> {
    let len = aim.norm();
    if !(len > 1.0e-6) {
        return None;
    }
    let dir = aim / len;
    Some((dir.x.atan2(dir.z), -dir.y.clamp(-1.0, 1.0).asin()))
}

#[inline]
fn clamp_pitch(pitch: f32) -> f32 {
    let limit = MAX_PITCH_DEG.to_radians();
    pitch.clamp(-limit, limit)
}

/// Closed-form critically damped spring step on an error `x` with rate `v`.
#[inline]
fn critically_damped(x: f32, v: f32, omega: f32, dt: f32) -> (f32, f32) {
    let decay = (-omega * dt).exp();
    let temp = (v + omega * x) * dt;
    ((x + temp) * decay, (v - omega * temp) * decay)
}
