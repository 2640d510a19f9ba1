//! Cube-face projection of the celestial sphere.
//!
//! Each direction is assigned to one of 6 cube faces — the face whose axis
//! has the largest matching-sign component — and projected gnomonically
//! onto that face's plane. A cube avoids the singularities of a single
//! polar projection: every face covers ~90 degrees with bounded
//! distortion, so the quad-tree built on top gets cells of comparable
//! size everywhere on the sky.
//!
//! # Face layout
//!
//! | face | axis | center (lon, lat) |
//! |------|------|-------------------|
//! | 1 | +z | (0, +90) |
//! | 2 | +y | (90, 0) |
//! | 3 | +x | (0, 0) |
//! | 4 | -x | (180, 0) |
//! | 5 | -y | (270, 0) |
//! | 6 | -z | (0, -90) |
//!
//! On each face the planar coordinates (X, Y) run in (-1, 1), X eastward
//! and Y northward on the equatorial faces. Rounding at face edges can
//! push a coordinate marginally past 1; callers clamp where it matters.

use qbox_core::Direction;

/// Number of cube faces.
pub const NUM_FACES: u8 = 6;

/// Safety bound for face selection: a unit vector's dominant component is
/// at least 1/sqrt(3). Inputs whose dominant component (after
/// normalization) falls below this are degenerate and get no face.
const MIN_DOMINANT: f64 = 0.577;

/// Selects the cube face containing a direction.
///
/// Returns `None` for the zero sentinel, non-finite components, or a
/// vector so far from unit length that the dominant-component invariant
/// fails — silently picking a face for garbage input would corrupt every
/// cell computed from it.
pub fn face_of(v: &Direction) -> Option<u8> {
    let ax = libm::fabs(v.x);
    let ay = libm::fabs(v.y);
    let az = libm::fabs(v.z);
    let mag = v.magnitude();
    if !mag.is_finite() || mag == 0.0 {
        return None;
    }
    let dominant = ax.max(ay).max(az);
    if dominant < MIN_DOMINANT * mag {
        return None;
    }
    let face = if ax >= ay && ax >= az {
        if v.x > 0.0 {
            3
        } else {
            4
        }
    } else if ay >= az {
        if v.y > 0.0 {
            2
        } else {
            5
        }
    } else if v.z > 0.0 {
        1
    } else {
        6
    };
    Some(face)
}

/// Projects a direction onto its cube face.
///
/// Returns `(face, X, Y)` with X, Y in (-1, 1) up to rounding at face
/// edges, or `None` when [`face_of`] rejects the input.
pub fn project(v: &Direction) -> Option<(u8, f64, f64)> {
    let face = face_of(v)?;
    let (x, y, z) = (v.x, v.y, v.z);
    let (px, py) = match face {
        1 => (x / z, y / z),
        2 => (-x / y, z / y),
        3 => (y / x, z / x),
        4 => (y / x, -z / x),
        5 => (-x / y, -z / y),
        _ => (-x / z, -y / z),
    };
    Some((face, px, py))
}

/// Inverse of [`project`]: the unit vector at planar (X, Y) on a face.
///
/// Exact inverse via the normalization factor `1/sqrt(1 + X^2 + Y^2)`.
/// X and Y may lie outside (-1, 1); the result is then a direction on a
/// neighboring face, which the adjacency code relies on.
///
/// # Panics
///
/// Panics if `face` is outside 1..=6 (contract violation).
pub fn unproject(face: u8, px: f64, py: f64) -> Direction {
    assert!((1..=6).contains(&face), "cube face {face} outside 1..=6");
    let r = 1.0 / libm::sqrt(1.0 + px * px + py * py);
    match face {
        1 => Direction::new(px * r, py * r, r),
        2 => Direction::new(-px * r, r, py * r),
        3 => Direction::new(r, px * r, py * r),
        4 => Direction::new(-r, -px * r, py * r),
        5 => Direction::new(px * r, -r, py * r),
        _ => Direction::new(px * r, py * r, -r),
    }
}

/// Center direction of a face.
pub fn face_center(face: u8) -> Direction {
    unproject(face, 0.0, 0.0)
}
