//! Great-circle arc helpers shared by the cell codec and region tests.
//!
//! All arcs here are minor arcs between two non-antipodal unit vectors.
//! Cell edges and polygon sides are always shorter than 90 degrees, so
//! the "minor arc" restriction never bites in practice.

use qbox_core::constants::RAD_TO_DEG;
use qbox_core::math::asin_clamped;
use qbox_core::Direction;

/// Whether `f` lies on the minor arc from `a` to `b`, given the arc's
/// plane normal `n = a x b`. `f` must already lie in that plane.
pub(crate) fn on_arc(f: &Direction, a: &Direction, b: &Direction, n: &Direction) -> bool {
    a.cross(f).dot(n) >= 0.0 && f.cross(b).dot(n) >= 0.0
}

/// Angular distance in degrees from `p` to the minor arc `a`-`b`.
///
/// If the foot of the perpendicular from `p` falls on the arc, the
/// distance is `asin(|n_hat . p|)`; otherwise the nearer endpoint wins.
pub(crate) fn point_to_arc_deg(p: &Direction, a: &Direction, b: &Direction) -> f64 {
    let n = a.cross(b);
    let mag = n.magnitude();
    if mag < 1e-15 {
        // Degenerate edge: endpoints coincide (or are antipodal, which
        // cell edges never are).
        return Direction::dist_deg(p, a);
    }
    let n_hat = Direction::new(n.x / mag, n.y / mag, n.z / mag);
    let sin_d = n_hat.dot(p);
    // Foot of the perpendicular: p projected into the arc's plane.
    let foot = Direction::new(
        p.x - sin_d * n_hat.x,
        p.y - sin_d * n_hat.y,
        p.z - sin_d * n_hat.z,
    );
    if !foot.is_none() && on_arc(&foot, a, b, &n_hat) {
        return asin_clamped(libm::fabs(sin_d)) * RAD_TO_DEG;
    }
    Direction::dist_deg(p, a).min(Direction::dist_deg(p, b))
}

/// Whether the minor arcs `a`-`b` and `c`-`d` cross.
///
/// The candidate crossing point is the intersection of the two great
/// circles (`n1 x n2`, either sign); a crossing exists when one candidate
/// lies on both arcs. Shared endpoints count as crossings.
pub(crate) fn arcs_cross(a: &Direction, b: &Direction, c: &Direction, d: &Direction) -> bool {
    let n1 = a.cross(b);
    let n2 = c.cross(d);
    let i = n1.cross(&n2);
    let mag = i.magnitude();
    if mag < 1e-15 {
        // Coplanar arcs: they overlap iff an endpoint of one lies on the
        // other.
        return on_arc(c, a, b, &n1)
            || on_arc(d, a, b, &n1)
            || on_arc(a, c, d, &n2)
            || on_arc(b, c, d, &n2);
    }
    let i = Direction::new(i.x / mag, i.y / mag, i.z / mag);
    (on_arc(&i, a, b, &n1) && on_arc(&i, c, d, &n2))
        || (on_arc(&-i, a, b, &n1) && on_arc(&-i, c, d, &n2))
}
