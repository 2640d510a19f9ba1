//! Core spherical-geometry primitives for celestial catalog work.
//!
//! This crate holds the leaf-level building blocks shared by the spatial
//! index and region-classification crates: directions on the unit sphere,
//! 3x3 rotation matrices, angular-distance math, and the unified error type.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`direction`] | [`Direction`] — unit vector with longitude/latitude accessors |
//! | [`rotation`] | [`Matrix3`] — orthonormal rotations and local tangent frames |
//! | [`math`] | chord/angle conversions, clamped inverse trig |
//! | [`constants`] | angular constants shared across the workspace |
//! | [`errors`] | [`GeomError`] / [`GeomResult`] |
//!
//! # Conventions
//!
//! Public APIs speak degrees (catalog convention: longitude in [0, 360),
//! latitude in [-90, 90]); internal math is in radians. All transcendental
//! math goes through `libm` for reproducible results across platforms.
//!
//! ```
//! use qbox_core::Direction;
//!
//! let a = Direction::from_angles(10.0, 20.0);
//! let b = Direction::from_angles(11.0, 20.0);
//! let d = Direction::dist_deg(&a, &b);
//! assert!(d > 0.9 && d < 1.0);
//! ```

pub mod constants;
pub mod direction;
pub mod errors;
pub mod math;
pub mod rotation;

pub use direction::Direction;
pub use errors::{GeomError, GeomResult, RegionErrorKind};
pub use rotation::Matrix3;
