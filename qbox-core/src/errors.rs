//! Error types for spherical-geometry and spatial-index operations.
//!
//! A single [`GeomError`] covers the failure modes of this workspace:
//! region construction rejects (bad vertex lists, out-of-range axes),
//! malformed cell codes handed to the Qbox codec, and numerical failures
//! in helper routines.
//!
//! # Error Categories
//!
//! | Variant | Use Case | Recoverable? |
//! |---------|----------|--------------|
//! | [`InvalidRegion`](GeomError::InvalidRegion) | Region construction rejects | No |
//! | [`InvalidCell`](GeomError::InvalidCell) | Malformed Qbox value or text code | Yes |
//! | [`MathError`](GeomError::MathError) | Numerical failure in a helper | No |
//!
//! Programming-contract violations (a subdivision level outside 0..=12, a
//! face outside 1..=6 reaching an internal encoder) are caller bugs and
//! panic rather than returning an error: propagating a wrong cell silently
//! would corrupt every query built on it.
//!
//! # Usage
//!
//! Most fallible functions return [`GeomResult<T>`], which is
//! `Result<T, GeomError>`. Use the constructor methods for consistent
//! error creation:
//!
//! ```
//! use qbox_core::{GeomError, RegionErrorKind};
//!
//! let err = GeomError::invalid_region(RegionErrorKind::NotConvex, "vertex 2 bends outward");
//! assert!(err.to_string().contains("NotConvex"));
//! ```

use thiserror::Error;

/// Classification of region-construction rejects.
///
/// Used with [`GeomError::InvalidRegion`] to distinguish the cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionErrorKind {
    /// Fewer than 3 vertices supplied for a polygon.
    TooFewVertices,
    /// Polygon vertices do not describe a convex outline.
    NotConvex,
    /// A radius or semi-axis is outside its valid range.
    AxisOutOfRange,
    /// The center direction is the zero-vector sentinel or not finite.
    InvalidCenter,
    /// Zone latitude bounds are empty or out of range.
    EmptyZone,
}

/// Unified error type for the geometry and index crates.
#[derive(Error, Debug)]
pub enum GeomError {
    /// Region construction reject; the caller must fix the input.
    #[error("Invalid region ({kind:?}): {message}")]
    InvalidRegion {
        kind: RegionErrorKind,
        message: String,
    },

    /// Malformed Qbox value or textual cell code.
    ///
    /// This is the only recoverable variant — it typically comes from
    /// parsing external text, and a corrected input may succeed.
    #[error("Invalid cell: {message}")]
    InvalidCell { message: String },

    /// Numerical computation failure.
    #[error("Math error in {operation}: {message}")]
    MathError { operation: String, message: String },
}

/// Convenience alias for `Result<T, GeomError>`.
pub type GeomResult<T> = Result<T, GeomError>;

impl GeomError {
    /// Creates an [`InvalidRegion`](Self::InvalidRegion) error.
    pub fn invalid_region(kind: RegionErrorKind, reason: &str) -> Self {
        Self::InvalidRegion {
            kind,
            message: reason.to_string(),
        }
    }

    /// Creates an [`InvalidCell`](Self::InvalidCell) error.
    pub fn invalid_cell(reason: &str) -> Self {
        Self::InvalidCell {
            message: reason.to_string(),
        }
    }

    /// Creates a [`MathError`](Self::MathError).
    pub fn math_error(operation: &str, reason: &str) -> Self {
        Self::MathError {
            operation: operation.to_string(),
            message: reason.to_string(),
        }
    }

    /// Returns `true` if a corrected input might succeed on retry.
    ///
    /// Only [`InvalidCell`](Self::InvalidCell) qualifies (re-parse after
    /// fixing the text); construction and math errors need a code change.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidCell { .. })
    }
}
