use rapier3d::parry::{
    bounding_volume::Aabb,
    partitioning::{Bvh, BvhBuildStrategy},
    shape::Triangle,
};

use super::{
    settings::DEGENERATE_AREA_SQ,
    types::{PlayerCapsule, Point, TriangleMesh, Vec3},
};

/// Immutable bounding volume hierarchy over the level's triangles.
///
/// Built once when the level is loaded. Queries only borrow it, so a single
/// instance is shared by every substep of every frame.
pub struct WorldCollider {
    /// BVH over per-triangle AABBs. Leaf `i` is `triangles[i]`.
    bvh: Bvh,
    triangles: Vec<Triangle>,
}

impl WorldCollider {
    /// Build the index from every triangle of every mesh.
    ///
    /// Degenerate (zero-area) triangles carry no usable normal and are dropped.
    pub fn build_from_meshes(meshes: &[TriangleMesh]) -> Self {
        let mut triangles = Vec::new();
        let mut skipped = 0usize;

        for mesh in meshes {
            for [a, b, c] in mesh.triangles() {
                if (b - a).cross(&(c - a)).norm_squared() <= DEGENERATE_AREA_SQ {
                    skipped += 1;
                    continue;
                }
                triangles.push(Triangle::new(a, b, c));
            }
        }

        let aabbs: Vec<Aabb> = triangles.iter().map(triangle_aabb).collect();
        let bvh = Bvh::from_leaves(BvhBuildStrategy::Binned, &aabbs);

        log::info!(
            "world collider built: {} triangles from {} meshes ({} degenerate skipped)",
            triangles.len(),
            meshes.len(),
            skipped
        );

        Self { bvh, triangles }
    }

    /// A collider with no geometry. Every query misses.
    pub fn empty() -> Self {
        Self::build_from_meshes(&[])
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Triangles whose bounds overlap `aabb`.
    pub fn candidates<'a>(&'a self, aabb: &'a Aabb) -> impl Iterator<Item = &'a Triangle> + 'a {
        self.bvh
            .intersect_aabb(aabb)
            .filter_map(|leaf| self.triangles.get(leaf as usize))
    }
}

fn triangle_aabb(tri: &Triangle) -> Aabb {
    Aabb::new(tri.a.inf(&tri.b).inf(&tri.c), tri.a.sup(&tri.b).sup(&tri.c))
}

/// World-space bounds of a capsule, inflated by `margin` on all sides.
pub fn capsule_aabb(capsule: &PlayerCapsule, margin: f32) -> Aabb {
    let pad = capsule.radius + margin.max(0.0);
    let delta = Vec3::new(pad, pad, pad);
    Aabb::new(
        Point::from(capsule.start.inf(&capsule.end) - delta),
        Point::from(capsule.start.sup(&capsule.end) + delta),
    )
}
