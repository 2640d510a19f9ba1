//! Small math helpers shared by the geometry code.
//!
//! Thin wrappers over `libm` plus the chord/angle conversions used by the
//! stable angular-distance formulas. Inverse trig arguments are clamped to
//! [-1, 1] before the call: accumulated rounding routinely pushes a dot
//! product to 1.0000000000000002, and `asin`/`acos` must not return NaN
//! for that.

use crate::constants::{DEG_TO_RAD, RAD_TO_DEG};

/// `asin` with the argument clamped to [-1, 1].
#[inline]
pub fn asin_clamped(x: f64) -> f64 {
    libm::asin(x.clamp(-1.0, 1.0))
}

/// `acos` with the argument clamped to [-1, 1].
#[inline]
pub fn acos_clamped(x: f64) -> f64 {
    libm::acos(x.clamp(-1.0, 1.0))
}

/// Chord length subtended by an angle, `2 sin(a/2)`.
///
/// The chord between two unit vectors separated by angle `a`.
#[inline]
pub fn chord_from_angle_deg(angle_deg: f64) -> f64 {
    2.0 * libm::sin(0.5 * angle_deg * DEG_TO_RAD)
}

/// Angle subtended by a chord, `2 asin(c/2)`, in degrees.
///
/// Inverse of [`chord_from_angle_deg`]. Stable for both tiny and
/// near-antipodal separations, unlike the dot-product/`acos` route.
#[inline]
pub fn angle_from_chord_deg(chord: f64) -> f64 {
    2.0 * asin_clamped(0.5 * chord) * RAD_TO_DEG
}
