use super::{
    broad::{WorldCollider, capsule_aabb},
    narrow_phase::{CONTACT_PREDICTION, capsule_triangle_penetration},
    settings::{DIST_EPS_SQ, QUERY_MARGIN},
    types::{CollisionResult, PlayerCapsule, Vec3},
};

impl WorldCollider {
    /// Net penetration of `capsule` into the world, if it touches anything.
    ///
    /// Algorithm:
    /// - Gather candidate triangles from the BVH around the capsule bounds.
    /// - Resolve each overlapping triangle in turn on a scratch copy of the
    ///   capsule, accumulating the push-out.
    /// - Report the accumulated displacement as one normal/depth pair. Touching
    ///   contacts with no displacement report the deepest contact's normal and
    ///   zero depth, so resting on the floor still classifies as floor.
    ///
    /// The caller's capsule is never modified.
    pub fn intersect_capsule(&self, capsule: &PlayerCapsule) -> Option<CollisionResult> {
        if self.is_empty() {
            return None;
        }

        let mut scratch = *capsule;
        let bounds = capsule_aabb(capsule, QUERY_MARGIN + CONTACT_PREDICTION);
        let mut touching: Option<CollisionResult> = None;

        for triangle in self.candidates(&bounds) {
            let Some(hit) = capsule_triangle_penetration(&scratch, triangle) else {
                continue;
            };

            if touching.is_none_or(|best| hit.depth > best.depth) {
                touching = Some(hit);
            }
            if hit.depth > 0.0 {
                scratch.translate(&(hit.normal * hit.depth));
            }
        }

        let touching = touching?;
        let displacement: Vec3 = scratch.start - capsule.start;
        let len_sq = displacement.norm_squared();
        if len_sq <= DIST_EPS_SQ {
            return Some(CollisionResult {
                normal: touching.normal,
                depth: len_sq.sqrt(),
            });
        }

        let depth = len_sq.sqrt();
        Some(CollisionResult {
            normal: displacement / depth,
            depth,
        })
    }
}
