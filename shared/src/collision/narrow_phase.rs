/*!
Capsule vs triangle penetration.

Closed-form closest-point query between the capsule segment and one triangle.
All math runs relative to the capsule's bottom sphere center, so precision
depends on the distance to the player, not on where the triangle sits in the
level or how large it is.

Triangles are one-sided: a capsule whose whole segment lies behind the face
(against its winding normal) never touches it.
*/

use rapier3d::parry::shape::Triangle;

use super::types::{CollisionResult, PlayerCapsule, Vec3};

/// Distance under which a separated capsule still counts as touching a
/// triangle (meters). Keeps a capsule resting on the floor in contact instead
/// of flickering between touching and airborne every substep.
pub const CONTACT_PREDICTION: f32 = 1.0e-4;

/// A face candidate must beat an edge candidate by this much (meters) to win.
/// Keeps flat faces authoritative over their own shared edges.
const TIE_BREAK: f32 = 1.0e-6;

/// Penetration of `capsule` into a single world-space triangle.
///
/// The returned normal points from the triangle toward the capsule and the
/// depth is `radius - distance`, clamped at zero for touching contacts.
pub fn capsule_triangle_penetration(
    capsule: &PlayerCapsule,
    triangle: &Triangle,
) -> Option<CollisionResult> {
    let origin = capsule.start;
    let a = triangle.a.coords - origin;
    let b = triangle.b.coords - origin;
    let c = triangle.c.coords - origin;
    let axis = capsule.end - capsule.start;
    let reach = capsule.radius + CONTACT_PREDICTION;

    let normal = (b - a).cross(&(c - a)).try_normalize(f32::EPSILON)?;
    let d_start = -normal.dot(&a);
    let d_end = normal.dot(&(axis - a));

    if d_start.min(d_end) > reach || (d_start < 0.0 && d_end < 0.0) {
        return None;
    }

    // The segment pierces the face: push the deeper sphere back in front.
    if (d_start < 0.0) != (d_end < 0.0) {
        let t = d_start / (d_start - d_end);
        if contains(&a, &b, &c, &normal, &(axis * t)) {
            return Some(CollisionResult {
                normal,
                depth: capsule.radius - d_start.min(d_end),
            });
        }
    }

    let mut best: Option<(f32, Vec3)> = None;

    for (distance, point) in [(d_start, Vec3::zeros()), (d_end, axis)] {
        if distance >= 0.0
            && best.is_none_or(|(d, _)| distance < d)
            && contains(&a, &b, &c, &normal, &(point - normal * distance))
        {
            best = Some((distance, normal));
        }
    }

    for (p, q) in [(a, b), (b, c), (c, a)] {
        let (on_axis, on_edge) = closest_points_on_segments(&Vec3::zeros(), &axis, &p, &q);
        let offset = on_axis - on_edge;
        let distance = offset.norm();
        if best.is_some_and(|(d, _)| distance >= d - TIE_BREAK) {
            continue;
        }
        let direction = if distance > f32::EPSILON {
            offset / distance
        } else {
            normal
        };
        best = Some((distance, direction));
    }

    let (distance, direction) = best?;
    if distance > reach || !direction.iter().all(|v| v.is_finite()) {
        return None;
    }

    Some(CollisionResult {
        normal: direction,
        depth: (capsule.radius - distance).max(0.0),
    })
}

/// Whether `p`, assumed on the triangle's plane, lies inside or on its edges.
fn contains(a: &Vec3, b: &Vec3, c: &Vec3, normal: &Vec3, p: &Vec3) -> bool {
    (b - a).cross(&(p - a)).dot(normal) >= 0.0
        && (c - b).cross(&(p - b)).dot(normal) >= 0.0
        && (a - c).cross(&(p - c)).dot(normal) >= 0.0
}

/// Closest points between segments `p1..q1` and `p2..q2`.
fn closest_points_on_segments(p1: &Vec3, q1: &Vec3, p2: &Vec3, q2: &Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    if a <= f32::EPSILON && e <= f32::EPSILON {
        return (*p1, *p2);
    }

    let (s, t) = if a <= f32::EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= f32::EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let s = if denom > f32::EPSILON * a * e {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t = (b * s + f) / e;
            if t < 0.0 {
                ((-c / a).clamp(0.0, 1.0), 0.0)
            } else if t > 1.0 {
                (((b - c) / a).clamp(0.0, 1.0), 1.0)
            } else {
                (s, t)
            }
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}
