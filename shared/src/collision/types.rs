/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no query algorithms. It defines the data
exchanged between:
- broad (the static world BVH and candidate queries)
- narrow_phase (closed-form capsule vs triangle penetration)
- the player physics core, which owns the capsule and consumes the results
*/

use nalgebra as na;

use crate::{
    constants::{PLAYER_RADIUS, SPAWN_END, SPAWN_START},
    error::CapsuleError,
};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// Swept-sphere body of the player: a segment from `start` (feet sphere) to
/// `end` (head sphere) with a radius.
///
/// Upright at construction; afterwards it is only ever translated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerCapsule {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
}

impl PlayerCapsule {
    /// Build an upright capsule. `radius` must be positive and `end` must sit
    /// above `start`.
    pub fn upright(start: Vec3, end: Vec3, radius: f32) -> Result<Self, CapsuleError> {
        if !(radius > 0.0) {
            return Err(CapsuleError::NonPositiveRadius(radius));
        }
        if !(end.y > start.y) {
            return Err(CapsuleError::NotUpright {
                start_y: start.y,
                end_y: end.y,
            });
        }
        Ok(Self { start, end, radius })
    }

    /// The player body at the level's spawn point.
    pub fn spawn() -> Self {
        Self {
            start: Vec3::from(SPAWN_START),
            end: Vec3::from(SPAWN_END),
            radius: PLAYER_RADIUS,
        }
    }

    #[inline]
    pub fn translate(&mut self, delta: &Vec3) {
        self.start += delta;
        self.end += delta;
    }

    /// Midpoint of the capsule segment.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }
}

/// Penetration of the player capsule into the static world.
///
/// Produced by a single query and consumed within the same substep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionResult {
    /// Unit direction pointing away from the surface into free space.
    pub normal: Vec3,
    /// How far the capsule must move along `normal` to stop overlapping (>= 0).
    pub depth: f32,
}

/// Indexed triangle soup supplied by the level loader.
#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub vertices: Vec<Point>,
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Point>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    /// The 12 outward-facing triangles of an oriented box.
    pub fn cuboid(half_extents: Vec3, translation: Vec3, rotation: Quat) -> Self {
        let iso = Iso::from_parts(na::Translation3::from(translation), rotation);
        let (hx, hy, hz) = (half_extents.x, half_extents.y, half_extents.z);

        let corners = [
            Point::new(-hx, -hy, -hz),
            Point::new(hx, -hy, -hz),
            Point::new(hx, hy, -hz),
            Point::new(-hx, hy, -hz),
            Point::new(-hx, -hy, hz),
            Point::new(hx, -hy, hz),
            Point::new(hx, hy, hz),
            Point::new(-hx, hy, hz),
        ];
        let vertices = corners.iter().map(|p| iso * p).collect();

        // Counter-clockwise when seen from outside.
        let indices = vec![
            [0, 3, 2],
            [0, 2, 1],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];

        Self { vertices, indices }
    }

    /// Iterate the triangles as vertex triples. Indices that point past the
    /// vertex list are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        self.indices.iter().filter_map(|&[a, b, c]| {
            let a = self.vertices.get(a as usize)?;
            let b = self.vertices.get(b as usize)?;
            let c = self.vertices.get(c as usize)?;
            Some([*a, *b, *c])
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upright_capsule_rejects_bad_shapes() {
        let start = Vec3::new(0.0, 0.35, 0.0);
        let end = Vec3::new(0.0, 1.0, 0.0);

        assert!(PlayerCapsule::upright(start, end, 0.35).is_ok());
        assert!(matches!(
            PlayerCapsule::upright(start, end, 0.0),
            Err(CapsuleError::NonPositiveRadius(_))
        ));
        assert!(matches!(
            PlayerCapsule::upright(end, start, 0.35),
            Err(CapsuleError::NotUpright { .. })
        ));
    }

    #[test]
    fn capsule_translation_moves_both_ends() {
        let mut capsule =
            PlayerCapsule::upright(Vec3::new(0.0, 0.35, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.35)
                .unwrap();
        capsule.translate(&Vec3::new(1.0, -0.5, 2.0));

        assert_eq!(capsule.start, Vec3::new(1.0, -0.15, 2.0));
        assert_eq!(capsule.end, Vec3::new(1.0, 0.5, 2.0));
        assert!((capsule.center().y - 0.175).abs() < 1.0e-6);
    }

    #[test]
    fn cuboid_faces_point_outward() {
        let mesh = TriangleMesh::cuboid(Vec3::new(1.0, 2.0, 3.0), Vec3::zeros(), Quat::identity());
        assert_eq!(mesh.triangle_count(), 12);

        for [a, b, c] in mesh.triangles() {
            let normal = (b - a).cross(&(c - a));
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            assert!(normal.dot(&centroid) > 0.0, "inward face at {centroid:?}");
        }
    }

    #[test]
    fn out_of_range_indices_are_skipped() {
        let mesh = TriangleMesh::new(
            vec![Point::origin(), Point::new(1.0, 0.0, 0.0), Point::new(0.0, 0.0, 1.0)],
            vec![[0, 1, 2], [0, 1, 7]],
        );
        assert_eq!(mesh.triangles().count(), 1);
    }
}
