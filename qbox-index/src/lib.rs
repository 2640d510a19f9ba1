//! Hierarchical cube-sphere sky index with region classification.
//!
//! The sky is projected onto the 6 faces of a cube and each face is
//! subdivided as a quad-tree, giving cells ("Qboxes") addressed by a
//! single integer. Spatial queries build a [`Region`] — a circle, convex
//! polygon, ellipse, or longitude/latitude zone — and descend the tree,
//! pruning cells the region provably misses and short-circuiting cells it
//! provably swallows.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`coocube`] | cube-face selection and planar (face, X, Y) projection |
//! | [`qbox`] | [`Qbox`] cell codec: center, corners, area, adjacency, text codes |
//! | [`region`] | [`Region`] variants, [`Status`], point/circle/cell classification |
//! | [`select`] | [`select`] — lazy tree descent yielding matching leaf cells |
//!
//! # Quick Start
//!
//! ```
//! use qbox_core::Direction;
//! use qbox_index::{select, Region};
//!
//! let center = Direction::from_angles(83.6, -5.4);
//! let region = Region::circle(center, 2.0).unwrap();
//!
//! let cells: Vec<_> = select(&region, 6).collect();
//! assert!(!cells.is_empty());
//! for cell in &cells {
//!     // Cells flagged "any" are entirely inside the circle; the rest
//!     // straddle its boundary.
//!     let _ = cell.is_any();
//! }
//! ```
//!
//! # Relationship statuses
//!
//! Classification is 4-valued ([`Status`]): `Disjoint`, `Intersects`,
//! `Includes` (the probe lies inside the region), and `IsPartOf` (the
//! region lies inside the probe). The two containment directions drive
//! different pruning decisions, so they are never collapsed into one.

pub mod coocube;
pub mod qbox;
pub mod region;
pub mod select;

mod arc;

pub use qbox::{Dir4, Qbox, MAX_LEVEL};
pub use region::{Region, Status};
pub use select::{select, QboxSelector};

use qbox_core::Direction;

/// Classifies a Qbox cell against a region (pure function form).
///
/// Equivalent to [`Region::classify_qbox`].
pub fn classify_qbox(region: &Region, cell: Qbox) -> Status {
    region.classify_qbox(cell)
}

/// Classifies a circle against a region (pure function form).
///
/// Equivalent to [`Region::classify_circle`].
pub fn classify_circle(region: &Region, center: &Direction, radius_deg: f64) -> Status {
    region.classify_circle(center, radius_deg)
}
