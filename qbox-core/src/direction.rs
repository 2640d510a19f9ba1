//! Directions on the celestial sphere.
//!
//! A [`Direction`] is a 3D Cartesian unit vector. Catalog positions are
//! usually given as (longitude, latitude) pairs in degrees, but every
//! geometric test — distances, rotations, containment — is cleanest on the
//! vector form, so that is what we store; the angles are derived on demand.
//!
//! # The zero-vector sentinel
//!
//! The zero vector `(0, 0, 0)` stands for "undefined position"
//! ([`Direction::NONE`]). Angle accessors return NaN for it and
//! [`Direction::dist_deg`] propagates NaN, so an undefined position can
//! never silently match anything.
//!
//! # Distances
//!
//! Angular separation is computed from the chord, `2 asin(|a - b| / 2)`,
//! not from `acos(a . b)`: the chord form keeps full precision for both
//! near-identical and near-antipodal directions.
//!
//! ```
//! use qbox_core::Direction;
//!
//! let a = Direction::from_angles(0.0, 0.0);
//! let b = Direction::from_angles(180.0, 0.0);
//! assert!((Direction::dist_deg(&a, &b) - 180.0).abs() < 1e-12);
//! ```

use crate::constants::{DEG_TO_RAD, RAD_TO_DEG};
use crate::math::asin_clamped;
use std::fmt;

/// A direction on the unit sphere (or the zero "undefined" sentinel).
///
/// Components are public for direct access in hot loops. Constructors
/// produce unit vectors; arithmetic helpers (`cross`, `sub`) may produce
/// non-unit intermediates that callers normalize when needed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Direction {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Direction {
    /// The "undefined position" sentinel.
    pub const NONE: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Creates a direction from raw components (not normalized).
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Creates a unit vector from (longitude, latitude) in degrees.
    ///
    /// x = cos(lat) cos(lon), y = cos(lat) sin(lon), z = sin(lat).
    /// NaN inputs propagate to NaN components.
    pub fn from_angles(lon_deg: f64, lat_deg: f64) -> Self {
        let (sin_lon, cos_lon) = libm::sincos(lon_deg * DEG_TO_RAD);
        let (sin_lat, cos_lat) = libm::sincos(lat_deg * DEG_TO_RAD);
        Self::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Returns `true` for the zero-vector sentinel.
    #[inline]
    pub fn is_none(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Longitude in degrees, normalized to [0, 360).
    ///
    /// Returns 0 at the poles and NaN for the sentinel.
    pub fn lon(&self) -> f64 {
        if self.is_none() {
            return f64::NAN;
        }
        if self.x == 0.0 && self.y == 0.0 {
            return 0.0;
        }
        let mut lon = libm::atan2(self.y, self.x) * RAD_TO_DEG;
        if lon < 0.0 {
            lon += 360.0;
        }
        // atan2(-0.0, 1.0) folds to 360.0 above; keep the range half-open.
        if lon >= 360.0 {
            lon = 0.0;
        }
        lon
    }

    /// Latitude in degrees, in [-90, 90]; NaN for the sentinel.
    pub fn lat(&self) -> f64 {
        if self.is_none() {
            return f64::NAN;
        }
        let r = libm::sqrt(self.x * self.x + self.y * self.y);
        if r == 0.0 {
            return if self.z > 0.0 { 90.0 } else { -90.0 };
        }
        libm::atan2(self.z, r) * RAD_TO_DEG
    }

    /// Euclidean length.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        libm::sqrt(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Returns a unit vector in the same direction; the sentinel is
    /// returned unchanged (avoids NaN).
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            *self
        } else {
            Self::new(self.x / mag, self.y / mag, self.z / mag)
        }
    }

    /// Dot product. For unit vectors this is the cosine of the separation.
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product (right-hand rule).
    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Squared chord length `|a - b|^2`, in [0, 4] for unit vectors.
    ///
    /// The cheapest monotone proxy for angular separation; used for
    /// distance comparisons and the stable distance formula.
    #[inline]
    pub fn squared_chord(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Angular separation in degrees via `2 asin(|a - b| / 2)`.
    ///
    /// Returns NaN if either input is the [`NONE`](Self::NONE) sentinel.
    pub fn dist_deg(a: &Self, b: &Self) -> f64 {
        if a.is_none() || b.is_none() {
            return f64::NAN;
        }
        let chord = libm::sqrt(a.squared_chord(b));
        2.0 * asin_clamped(0.5 * chord) * RAD_TO_DEG
    }
}

/// Direction - Direction (chord vector, not a unit vector)
impl std::ops::Sub for Direction {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// -Direction (antipode)
impl std::ops::Neg for Direction {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Direction(none)")
        } else {
            write!(f, "Direction({:+010.5} {:+010.5})", self.lon(), self.lat())
        }
    }
}
