/*!
World collider tolerances.

Distances are in meters. Favor practical world-space tolerances over machine
epsilon, except for the push-out threshold which only filters float noise.
*/

/// Penetrations shallower than this are ignored by the push-out step.
///
/// Without it, contacts at rest produce endless sub-nanometer corrections.
pub const DEPTH_EPSILON: f32 = 1.0e-10;

/// Triangles whose doubled area squared falls below this are dropped at build.
pub const DEGENERATE_AREA_SQ: f32 = 1.0e-12;

/// Margin added around the capsule bounds when gathering candidate triangles.
pub const QUERY_MARGIN: f32 = 1.0e-3;

/// Squared length under which a vector is treated as zero.
pub const DIST_EPS_SQ: f32 = 1.0e-12;
