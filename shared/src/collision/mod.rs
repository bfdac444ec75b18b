/*!
Collision root module.

The static world collider: a BVH over the level's triangles (parry's `Bvh`,
reached through `rapier3d::parry`) answering "how far, and which way, is this
capsule sunk into the world" once per physics substep. The code is split for
clarity:

- types:        shared data types (PlayerCapsule, CollisionResult, TriangleMesh)
- settings:     tolerances
- broad:        BVH build and candidate queries
- narrow_phase: closed-form capsule vs triangle penetration
- penetration:  the per-substep capsule query combining both phases
*/

pub mod broad;
pub mod narrow_phase;
pub mod penetration;
pub mod settings;
pub mod types;

// Re-export commonly used types.
pub use broad::WorldCollider;
pub use settings::DEPTH_EPSILON;
pub use types::{CollisionResult, PlayerCapsule, Point, Quat, TriangleMesh, Vec3};
