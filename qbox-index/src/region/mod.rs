//! Sky regions and their 4-valued classification.
//!
//! A [`Region`] is one of four shapes on the unit sphere: a small circle
//! ([`CircularRegion`]), a convex polygon ([`ConvexRegion`], also built
//! from a box), a spherical ellipse ([`EllipticalRegion`]), and a
//! longitude/latitude zone ([`ZonalRegion`]). Construction validates the
//! parameters once; after that every classification call is total —
//! undefined probes (the zero-direction sentinel, NaN radii) classify as
//! [`Status::Disjoint`] rather than erroring mid-query.
//!
//! # Classification
//!
//! Probes are circles or [`Qbox`] cells, and the answer is 4-valued:
//!
//! | [`Status`] | Meaning |
//! |------------|---------|
//! | `Disjoint` | probe and region share no point |
//! | `Intersects` | they overlap, neither contains the other |
//! | `Includes` | the region contains the whole probe |
//! | `IsPartOf` | the probe contains the whole region |
//!
//! The two containment directions matter to the tree descent: an
//! `Includes` cell is taken with everything below it, while an `IsPartOf`
//! cell must still be subdivided to tighten the selection.
//!
//! Every classification starts with the same cheap bounding-cap test
//! ([`RegionCore`]): each region carries a centroid, an inner radius
//! (a cap certainly inside) and an outer radius (a cap certainly
//! covering). Most cells are resolved by comparing three distances; only
//! the survivors pay for the shape-specific boundary tests.

use qbox_core::{Direction, GeomError, GeomResult, RegionErrorKind};
use std::fmt;

use crate::qbox::Qbox;

pub mod circular;
pub mod convex;
pub mod elliptical;
pub mod zonal;

pub use circular::CircularRegion;
pub use convex::ConvexRegion;
pub use elliptical::EllipticalRegion;
pub use zonal::ZonalRegion;

/// Outcome of classifying a probe (circle or cell) against a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    /// No common point.
    Disjoint,
    /// Overlapping, neither contains the other.
    Intersects,
    /// The region contains the whole probe.
    Includes,
    /// The probe contains the whole region.
    IsPartOf,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Disjoint => "disjoint",
            Status::Intersects => "intersects",
            Status::Includes => "includes",
            Status::IsPartOf => "is-part-of",
        };
        f.write_str(s)
    }
}

/// Bounding-cap summary shared by every region shape.
///
/// `minrad` and `maxrad` (degrees) bound the region between two caps
/// around `centroid`: the region contains the inner cap and fits inside
/// the outer one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RegionCore {
    pub(crate) centroid: Direction,
    pub(crate) minrad: f64,
    pub(crate) maxrad: f64,
}

impl RegionCore {
    /// First-stage test of a circular probe at distance `dist` with
    /// radius `radius` (both degrees). `None` means the caps cannot
    /// decide and the shape test must run.
    ///
    /// A non-finite distance (undefined probe) is `Disjoint`.
    pub(crate) fn check1(&self, dist: f64, radius: f64) -> Option<Status> {
        if !dist.is_finite() {
            return Some(Status::Disjoint);
        }
        if dist >= radius + self.maxrad {
            return Some(Status::Disjoint);
        }
        if self.minrad >= dist + radius {
            return Some(Status::Includes);
        }
        if radius >= dist + self.maxrad {
            return Some(Status::IsPartOf);
        }
        None
    }

    /// First-stage test of a cell whose center is at `dist`, with the
    /// level's circumradius and inradius.
    ///
    /// The disjoint and covered arms bound the cell by its circumcircle;
    /// the is-part-of arm needs the cell to contain the region, so it
    /// uses the inscribed cap instead.
    pub(crate) fn check1_qbox(
        &self,
        dist: f64,
        cell_maxrad: f64,
        cell_minrad: f64,
    ) -> Option<Status> {
        if !dist.is_finite() {
            return Some(Status::Disjoint);
        }
        if dist >= cell_maxrad + self.maxrad {
            return Some(Status::Disjoint);
        }
        if self.minrad >= dist + cell_maxrad {
            return Some(Status::Includes);
        }
        if cell_minrad >= dist + self.maxrad {
            return Some(Status::IsPartOf);
        }
        None
    }
}

/// Normalizes and validates a region center.
pub(crate) fn checked_center(center: &Direction) -> GeomResult<Direction> {
    let mag = center.magnitude();
    if center.is_none() || !mag.is_finite() {
        return Err(GeomError::invalid_region(
            RegionErrorKind::InvalidCenter,
            "center is the undefined-position sentinel or not finite",
        ));
    }
    Ok(center.normalize())
}

/// A validated sky region.
///
/// See the module docs for the shape catalog. All constructors live here
/// so that callers deal with one type; the per-shape structs stay public
/// for code that needs shape-specific accessors.
#[derive(Debug, Clone)]
pub enum Region {
    Circular(CircularRegion),
    Convex(ConvexRegion),
    Elliptical(EllipticalRegion),
    Zonal(ZonalRegion),
}

impl Region {
    /// A small circle (spherical cap) of `radius_deg` around `center`.
    ///
    /// Radii above 180 degrees are clamped (see
    /// [`Region::radius_clamped`]).
    pub fn circle(center: Direction, radius_deg: f64) -> GeomResult<Self> {
        CircularRegion::new(&center, radius_deg).map(Region::Circular)
    }

    /// A convex polygon through the given vertices (any winding).
    pub fn polygon(vertices: &[Direction]) -> GeomResult<Self> {
        ConvexRegion::new(vertices).map(Region::Convex)
    }

    /// A box: `width_deg` along the axis at position angle `pa_deg`
    /// (north through east), `height_deg` across it, centered on
    /// `center`. Built as a 4-vertex convex polygon.
    pub fn box_region(
        center: Direction,
        width_deg: f64,
        height_deg: f64,
        pa_deg: f64,
    ) -> GeomResult<Self> {
        ConvexRegion::new_box(&center, width_deg, height_deg, pa_deg).map(Region::Convex)
    }

    /// A spherical ellipse: semi-major axis `a_deg` at position angle
    /// `pa_deg`, semi-minor `b_deg`, centered on `center`.
    pub fn ellipse(center: Direction, a_deg: f64, b_deg: f64, pa_deg: f64) -> GeomResult<Self> {
        EllipticalRegion::new(&center, a_deg, b_deg, pa_deg).map(Region::Elliptical)
    }

    /// A longitude/latitude zone: `lon0_deg` eastward to `lon1_deg`
    /// (equal bounds give the full ring), latitudes `lat0_deg` to
    /// `lat1_deg`.
    pub fn zone(lon0_deg: f64, lon1_deg: f64, lat0_deg: f64, lat1_deg: f64) -> GeomResult<Self> {
        ZonalRegion::new(lon0_deg, lon1_deg, lat0_deg, lat1_deg).map(Region::Zonal)
    }

    /// A zone expressed in a rotated frame (rows of `frame` are the
    /// frame's axes): bounds are interpreted in that frame.
    pub fn zone_in_frame(
        frame: qbox_core::Matrix3,
        lon0_deg: f64,
        lon1_deg: f64,
        lat0_deg: f64,
        lat1_deg: f64,
    ) -> GeomResult<Self> {
        ZonalRegion::new_in_frame(frame, lon0_deg, lon1_deg, lat0_deg, lat1_deg).map(Region::Zonal)
    }

    fn core(&self) -> &RegionCore {
        match self {
            Region::Circular(r) => r.core(),
            Region::Convex(r) => r.core(),
            Region::Elliptical(r) => r.core(),
            Region::Zonal(r) => r.core(),
        }
    }

    /// A direction inside the region, used as its reference point.
    pub fn centroid(&self) -> Direction {
        self.core().centroid
    }

    /// Region area in square degrees.
    pub fn area_deg2(&self) -> f64 {
        match self {
            Region::Circular(r) => r.area_deg2(),
            Region::Convex(r) => r.area_deg2(),
            Region::Elliptical(r) => r.area_deg2(),
            Region::Zonal(r) => r.area_deg2(),
        }
    }

    /// Whether the region's boundary is inclusive of `dir`.
    ///
    /// The undefined-position sentinel is never contained.
    pub fn contains(&self, dir: &Direction) -> bool {
        if dir.is_none() || !dir.magnitude().is_finite() {
            return false;
        }
        match self {
            Region::Circular(r) => r.contains(dir),
            Region::Convex(r) => r.contains(dir),
            Region::Elliptical(r) => r.contains(dir),
            Region::Zonal(r) => r.contains(dir),
        }
    }

    /// Classifies a circular probe against the region.
    ///
    /// Total: an undefined center or non-finite/negative radius gives
    /// [`Status::Disjoint`].
    pub fn classify_circle(&self, center: &Direction, radius_deg: f64) -> Status {
        if center.is_none() || !radius_deg.is_finite() || radius_deg < 0.0 {
            return Status::Disjoint;
        }
        match self {
            Region::Circular(r) => r.classify_circle(center, radius_deg),
            Region::Convex(r) => r.classify_circle(center, radius_deg),
            Region::Elliptical(r) => r.classify_circle(center, radius_deg),
            Region::Zonal(r) => r.classify_circle(center, radius_deg),
        }
    }

    /// Classifies a cell against the region.
    ///
    /// The whole-sphere value contains every region, so it classifies as
    /// [`Status::IsPartOf`].
    pub fn classify_qbox(&self, cell: Qbox) -> Status {
        if cell.is_sphere() {
            return Status::IsPartOf;
        }
        match self {
            Region::Circular(r) => r.classify_qbox(cell),
            Region::Convex(r) => r.classify_qbox(cell),
            Region::Elliptical(r) => r.classify_qbox(cell),
            Region::Zonal(r) => r.classify_qbox(cell),
        }
    }

    /// Whether construction clamped an oversized circle radius to 180
    /// degrees. Always `false` for the other shapes.
    pub fn radius_clamped(&self) -> bool {
        match self {
            Region::Circular(r) => r.radius_clamped(),
            _ => false,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Circular(r) => write!(
                f,
                "circle({:.4} {:.4} r={:.4})",
                r.core().centroid.lon(),
                r.core().centroid.lat(),
                r.radius_deg()
            ),
            Region::Convex(r) => write!(f, "polygon({} vertices)", r.vertices().len()),
            Region::Elliptical(r) => write!(
                f,
                "ellipse({:.4} {:.4} a={:.4} b={:.4} pa={:.1})",
                r.core().centroid.lon(),
                r.core().centroid.lat(),
                r.semi_major_deg(),
                r.semi_minor_deg(),
                r.position_angle_deg()
            ),
            Region::Zonal(r) => write!(f, "zone({})", r.describe_bounds()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check1_arms() {
        let core = RegionCore {
            centroid: Direction::from_angles(0.0, 0.0),
            minrad: 5.0,
            maxrad: 10.0,
        };
        assert_eq!(core.check1(30.0, 10.0), Some(Status::Disjoint));
        assert_eq!(core.check1(1.0, 2.0), Some(Status::Includes));
        assert_eq!(core.check1(2.0, 40.0), Some(Status::IsPartOf));
        assert_eq!(core.check1(12.0, 4.0), None);
        assert_eq!(core.check1(f64::NAN, 4.0), Some(Status::Disjoint));
    }

    #[test]
    fn test_check1_qbox_uses_both_cell_radii() {
        let core = RegionCore {
            centroid: Direction::from_angles(0.0, 0.0),
            minrad: 5.0,
            maxrad: 10.0,
        };
        // Cell circumradius 3, inradius 2.
        assert_eq!(core.check1_qbox(14.0, 3.0, 2.0), Some(Status::Disjoint));
        assert_eq!(core.check1_qbox(1.0, 3.0, 2.0), Some(Status::Includes));
        // is-part-of arm needs the inscribed cap to cover the region:
        // inradius 2 < 0 + 10, so it cannot fire even at distance 0.
        assert_eq!(core.check1_qbox(0.0, 3.0, 2.0), None);
        let wide = RegionCore {
            centroid: Direction::from_angles(0.0, 0.0),
            minrad: 0.5,
            maxrad: 1.0,
        };
        assert_eq!(wide.check1_qbox(1.0, 30.0, 20.0), Some(Status::IsPartOf));
    }

    #[test]
    fn test_classify_total_on_garbage() {
        let r = Region::circle(Direction::from_angles(10.0, 10.0), 5.0).unwrap();
        assert_eq!(r.classify_circle(&Direction::NONE, 1.0), Status::Disjoint);
        let c = Direction::from_angles(10.0, 10.0);
        assert_eq!(r.classify_circle(&c, f64::NAN), Status::Disjoint);
        assert_eq!(r.classify_circle(&c, -1.0), Status::Disjoint);
        assert!(!r.contains(&Direction::NONE));
    }

    #[test]
    fn test_sphere_cell_is_part_of() {
        let r = Region::circle(Direction::from_angles(0.0, 0.0), 1.0).unwrap();
        assert_eq!(r.classify_qbox(Qbox::SPHERE), Status::IsPartOf);
    }

    #[test]
    fn test_smaller_concentric_circles_stay_included() {
        // Once a probe circle fits inside a region, every smaller
        // concentric probe fits too.
        let shapes = [
            Region::circle(Direction::from_angles(83.6, -5.4), 2.5).unwrap(),
            Region::box_region(Direction::from_angles(210.0, 35.0), 5.0, 2.0, 30.0).unwrap(),
            Region::ellipse(Direction::from_angles(10.0, -60.0), 3.0, 1.0, 75.0).unwrap(),
            Region::zone(355.0, 5.0, -3.0, 3.0).unwrap(),
        ];
        let centers = [
            Direction::from_angles(83.6, -5.4),
            Direction::from_angles(210.0, 35.0),
            Direction::from_angles(10.0, -60.0),
            Direction::from_angles(0.0, 0.0),
        ];
        for (region, center) in shapes.iter().zip(&centers) {
            let mut included = false;
            for r in [16.0, 8.0, 4.0, 2.0, 0.9, 0.45, 0.2, 0.1] {
                let s = region.classify_circle(center, r);
                if included {
                    assert_eq!(s, Status::Includes, "{region}: r={r} not included");
                } else {
                    included = s == Status::Includes;
                }
            }
            assert!(included, "{region}: no probe radius was ever included");
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(Status::Disjoint.to_string(), "disjoint");
        assert_eq!(Status::IsPartOf.to_string(), "is-part-of");
    }
}
