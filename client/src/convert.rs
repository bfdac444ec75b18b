//! Bevy (glam) <-> simulation (nalgebra) conversions.

use bevy::prelude::*;
use nalgebra as na;

#[inline]
pub fn to_na(v: Vec3) -> na::Vector3<f32> {
    na::Vector3::new(v.x, v.y, v.z)
}

#[inline]
pub fn from_na(v: &na::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
pub fn quat_to_na(q: Quat) -> na::UnitQuaternion<f32> {
    na::UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Camera orientation for a yaw/pitch pair (YXZ order, no roll).
#[inline]
pub fn view_rotation(yaw: f32, pitch: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storybook_shared::utils::forward_from_yaw;

    #[test]
    fn quaternions_rotate_the_same_way() {
        let q = Quat::from_euler(EulerRot::YXZ, 0.7, -0.3, 0.0);
        let v = Vec3::new(0.2, 1.0, -3.0);
        let expected = q * v;
        let actual = from_na(&(quat_to_na(q) * to_na(v)));
        assert!((expected - actual).length() < 1.0e-5);
    }

    #[test]
    fn view_rotation_faces_the_simulation_forward() {
        for yaw in [-2.0f32, 0.0, 0.5, 3.0] {
            let facing = view_rotation(yaw, 0.0) * Vec3::NEG_Z;
            let forward = from_na(&forward_from_yaw(yaw));
            assert!((facing - forward).length() < 1.0e-5);
        }
    }
}
