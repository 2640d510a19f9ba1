//! 3x3 rotation matrices and local tangent frames.
//!
//! Rotations carry directions between reference frames (a zone defined in
//! galactic coordinates, a box rolled by a position angle) and build the
//! local tangent frame around a direction. Conventions follow the ERFA
//! ones the wider astronomy ecosystem uses:
//!
//! - matrices are proper rotations (orthogonal, determinant +1), stored
//!   row-major as `[[f64; 3]; 3]`;
//! - `rotate_x/y/z(angle)` compose a passive frame rotation *after* the
//!   current matrix (`m <- R_axis(angle) * m`), positive counterclockwise
//!   looking from the positive axis toward the origin;
//! - the inverse of a rotation is its transpose.
//!
//! # Local frames
//!
//! [`Matrix3::local`] builds the rotation taking a direction to
//! (lon, lat) = (0, 0): its rows are the direction itself, the local east
//! axis, and the local north axis. Applying it expresses a position in the
//! tangent frame of that direction, which is how boxes, ellipses, and
//! zones are constructed.
//!
//! ```
//! use qbox_core::{Direction, Matrix3};
//!
//! let center = Direction::from_angles(83.6, -5.4);
//! let m = Matrix3::local(&center);
//! let local = m.apply(&center);
//! assert!(local.lon().abs() < 1e-12 || (local.lon() - 360.0).abs() < 1e-12);
//! assert!(local.lat().abs() < 1e-12);
//! ```

use crate::constants::DEG_TO_RAD;
use crate::direction::Direction;

/// A 3x3 rotation matrix (row-major).
///
/// Orthonormality is the constructor's contract: `from_rows` trusts its
/// input, and the composition helpers only ever produce proper rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix3 {
    elements: [[f64; 3]; 3],
}

impl Matrix3 {
    /// The identity rotation.
    pub fn identity() -> Self {
        Self {
            elements: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    /// Builds a matrix from three rows. The rows must be orthonormal.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self { elements: rows }
    }

    /// Element at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.elements[row][col]
    }

    /// Returns the transpose (the inverse, for a proper rotation).
    pub fn transpose(&self) -> Self {
        let e = &self.elements;
        Self {
            elements: [
                [e[0][0], e[1][0], e[2][0]],
                [e[0][1], e[1][1], e[2][1]],
                [e[0][2], e[1][2], e[2][2]],
            ],
        }
    }

    /// Exact identity test, used to skip no-op rotations.
    pub fn is_identity(&self) -> bool {
        const I: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        self.elements == I
    }

    /// Composes a rotation about the X axis: `self <- Rx(angle) * self`.
    pub fn rotate_x(&mut self, angle_rad: f64) {
        let (s, c) = libm::sincos(angle_rad);
        let e = self.elements;
        for col in 0..3 {
            self.elements[1][col] = c * e[1][col] + s * e[2][col];
            self.elements[2][col] = -s * e[1][col] + c * e[2][col];
        }
    }

    /// Composes a rotation about the Y axis: `self <- Ry(angle) * self`.
    pub fn rotate_y(&mut self, angle_rad: f64) {
        let (s, c) = libm::sincos(angle_rad);
        let e = self.elements;
        for col in 0..3 {
            self.elements[0][col] = c * e[0][col] - s * e[2][col];
            self.elements[2][col] = s * e[0][col] + c * e[2][col];
        }
    }

    /// Composes a rotation about the Z axis: `self <- Rz(angle) * self`.
    pub fn rotate_z(&mut self, angle_rad: f64) {
        let (s, c) = libm::sincos(angle_rad);
        let e = self.elements;
        for col in 0..3 {
            self.elements[0][col] = c * e[0][col] + s * e[1][col];
            self.elements[1][col] = -s * e[0][col] + c * e[1][col];
        }
    }

    /// Applies the rotation to a direction (rows times column vector).
    ///
    /// The identity is detected and skipped; the sentinel maps to itself.
    pub fn apply(&self, v: &Direction) -> Direction {
        if self.is_identity() {
            return *v;
        }
        let e = &self.elements;
        Direction::new(
            e[0][0] * v.x + e[0][1] * v.y + e[0][2] * v.z,
            e[1][0] * v.x + e[1][1] * v.y + e[1][2] * v.z,
            e[2][0] * v.x + e[2][1] * v.y + e[2][2] * v.z,
        )
    }

    /// Applies the inverse rotation (transpose times column vector).
    pub fn apply_inverse(&self, v: &Direction) -> Direction {
        if self.is_identity() {
            return *v;
        }
        let e = &self.elements;
        Direction::new(
            e[0][0] * v.x + e[1][0] * v.y + e[2][0] * v.z,
            e[0][1] * v.x + e[1][1] * v.y + e[2][1] * v.z,
            e[0][2] * v.x + e[1][2] * v.y + e[2][2] * v.z,
        )
    }

    /// Builds the local tangent frame of `dir`: rows (dir, east, north).
    ///
    /// Applying the result takes `dir` to (lon, lat) = (0, 0). At the
    /// poles, where east is undefined, the lon = 0 meridian convention is
    /// used (east = +y).
    pub fn local(dir: &Direction) -> Self {
        let u = dir.normalize();
        let z_axis = Direction::new(0.0, 0.0, 1.0);
        let mut east = z_axis.cross(&u);
        let mag = east.magnitude();
        if mag < 1e-12 {
            east = Direction::new(0.0, 1.0, 0.0);
        } else {
            east = east.normalize();
        }
        let north = u.cross(&east);
        Self::from_rows([
            [u.x, u.y, u.z],
            [east.x, east.y, east.z],
            [north.x, north.y, north.z],
        ])
    }

    /// Local tangent frame of `dir` rolled by a position angle.
    ///
    /// After applying the result, the axis at position angle `pa_deg`
    /// (counted from north through east) lies along local +lon. This is
    /// the frame boxes and ellipses are laid out in.
    pub fn local_with_pa(dir: &Direction, pa_deg: f64) -> Self {
        let mut m = Self::local(dir);
        m.rotate_x((90.0 - pa_deg) * DEG_TO_RAD);
        m
    }
}

/// Matrix * Matrix (composition; rightmost acts first)
impl std::ops::Mul for Matrix3 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let a = &self.elements;
        let b = &rhs.elements;
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
            }
        }
        Self { elements: out }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HALF_PI;

    #[test]
    fn test_identity_apply() {
        let m = Matrix3::identity();
        let v = Direction::from_angles(33.0, -12.0);
        assert_eq!(m.apply(&v), v);
        assert!(m.is_identity());
    }

    #[test]
    fn test_rotate_z_passive() {
        let mut m = Matrix3::identity();
        m.rotate_z(HALF_PI);
        // Passive convention: a vector at lon 90 reads as lon 0 in the
        // rotated frame.
        let v = Direction::from_angles(90.0, 0.0);
        let r = m.apply(&v);
        assert!((r.x - 1.0).abs() < 1e-15);
        assert!(r.y.abs() < 1e-15);
    }

    #[test]
    fn test_transpose_is_inverse() {
        let mut m = Matrix3::identity();
        m.rotate_z(0.3);
        m.rotate_x(-0.7);
        m.rotate_y(1.1);
        let prod = m * m.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!((prod.get(i, j) - expect).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn test_apply_inverse_roundtrip() {
        let mut m = Matrix3::identity();
        m.rotate_x(0.4);
        m.rotate_z(-1.2);
        let v = Direction::from_angles(200.0, 55.0);
        let back = m.apply_inverse(&m.apply(&v));
        assert!(v.squared_chord(&back) < 1e-28);
    }

    #[test]
    fn test_local_centers() {
        for &(lon, lat) in &[(0.0, 0.0), (45.0, 30.0), (300.0, -80.0), (180.0, 89.0)] {
            let d = Direction::from_angles(lon, lat);
            let m = Matrix3::local(&d);
            let l = m.apply(&d);
            assert!((l.x - 1.0).abs() < 1e-12, "({lon},{lat}) -> {l}");
        }
    }

    #[test]
    fn test_local_east_north() {
        let d = Direction::from_angles(10.0, 20.0);
        let m = Matrix3::local(&d);
        // A point slightly east maps to +lon, slightly north to +lat.
        let east = Direction::from_angles(10.1, 20.0);
        let le = m.apply(&east);
        assert!(le.lon() > 0.0 && le.lon() < 1.0);
        let north = Direction::from_angles(10.0, 20.1);
        let ln = m.apply(&north);
        assert!(ln.lat() > 0.09 && ln.lat() < 0.11);
    }

    #[test]
    fn test_local_at_pole() {
        let pole = Direction::new(0.0, 0.0, 1.0);
        let m = Matrix3::local(&pole);
        let l = m.apply(&pole);
        assert!((l.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_local_with_pa() {
        let c = Direction::from_angles(0.0, 0.0);
        // pa = 0: the major axis points north, so a point north of the
        // center lands on local +lon.
        let m = Matrix3::local_with_pa(&c, 0.0);
        let north = Direction::from_angles(0.0, 1.0);
        let l = m.apply(&north);
        assert!((l.lon() - 1.0).abs() < 1e-9, "{}", l.lon());
        assert!(l.lat().abs() < 1e-9);

        // pa = 90: the major axis points east.
        let m = Matrix3::local_with_pa(&c, 90.0);
        let east = Direction::from_angles(1.0, 0.0);
        let l = m.apply(&east);
        assert!((l.lon() - 1.0).abs() < 1e-9);
        assert!(l.lat().abs() < 1e-9);
    }
}
