//! Circular (spherical cap) regions.
//!
//! The workhorse shape: cone searches around a catalog position. The
//! bounding caps of [`RegionCore`] are the region itself here, so the
//! first-stage test is already exact for circle probes; only cell
//! classification needs boundary work.

use qbox_core::constants::DEG2_PER_STERADIAN;
use qbox_core::math::chord_from_angle_deg;
use qbox_core::{Direction, GeomError, GeomResult, RegionErrorKind};

use crate::arc::point_to_arc_deg;
use crate::qbox::Qbox;
use crate::region::{checked_center, RegionCore, Status};

/// A small circle of given angular radius around a center.
#[derive(Debug, Clone)]
pub struct CircularRegion {
    core: RegionCore,
    radius_deg: f64,
    /// Squared chord of the radius; `contains` is one subtraction and
    /// one comparison per probe.
    chord2: f64,
    clamped: bool,
}

impl CircularRegion {
    /// Builds a cap of `radius_deg` around `center`.
    ///
    /// The radius must be finite and positive; values above 180 degrees
    /// are clamped to the full sphere and flagged via
    /// [`radius_clamped`](Self::radius_clamped).
    pub fn new(center: &Direction, radius_deg: f64) -> GeomResult<Self> {
        let centroid = checked_center(center)?;
        if !radius_deg.is_finite() || radius_deg <= 0.0 {
            return Err(GeomError::invalid_region(
                RegionErrorKind::AxisOutOfRange,
                "circle radius must be finite and positive",
            ));
        }
        let (radius_deg, clamped) = if radius_deg > 180.0 {
            (180.0, true)
        } else {
            (radius_deg, false)
        };
        let chord = chord_from_angle_deg(radius_deg);
        Ok(Self {
            core: RegionCore {
                centroid,
                minrad: radius_deg,
                maxrad: radius_deg,
            },
            radius_deg,
            chord2: chord * chord,
            clamped,
        })
    }

    pub(crate) fn core(&self) -> &RegionCore {
        &self.core
    }

    /// The cap radius in degrees.
    pub fn radius_deg(&self) -> f64 {
        self.radius_deg
    }

    /// Whether the requested radius exceeded 180 degrees and was clamped.
    pub fn radius_clamped(&self) -> bool {
        self.clamped
    }

    /// Cap area, `2 pi (1 - cos r)` steradians.
    pub fn area_deg2(&self) -> f64 {
        use qbox_core::constants::{DEG_TO_RAD, TWOPI};
        TWOPI * (1.0 - libm::cos(self.radius_deg * DEG_TO_RAD)) * DEG2_PER_STERADIAN
    }

    /// Boundary-inclusive point containment.
    pub fn contains(&self, dir: &Direction) -> bool {
        dir.squared_chord(&self.core.centroid) <= self.chord2
    }

    /// Exact 4-valued classification of a circle probe.
    ///
    /// Two caps relate entirely through their center distance and radii,
    /// so the first-stage arms are the whole answer; what they cannot
    /// decide is an overlap.
    pub fn classify_circle(&self, center: &Direction, radius_deg: f64) -> Status {
        let d = Direction::dist_deg(&self.core.centroid, center);
        self.core.check1(d, radius_deg).unwrap_or(Status::Intersects)
    }

    /// 4-valued classification of a cell.
    ///
    /// The whole-sphere value contains every region and classifies as
    /// [`Status::IsPartOf`].
    pub fn classify_qbox(&self, cell: Qbox) -> Status {
        if cell.is_sphere() {
            return Status::IsPartOf;
        }
        let cell = cell.without_any();
        let level = cell.level();
        let center = cell.center();
        let d = Direction::dist_deg(&self.core.centroid, &center);
        if let Some(s) = self
            .core
            .check1_qbox(d, Qbox::max_radius(level), Qbox::min_radius(level))
        {
            return s;
        }

        let corners = cell.corners();
        let inside = corners
            .iter()
            .filter(|c| c.squared_chord(&self.core.centroid) <= self.chord2)
            .count();

        match inside {
            4 => {
                if self.radius_deg <= 90.0 {
                    return Status::Includes;
                }
                // Wide cap: its complement is a cap around the antipode.
                // All corners in, but the complement can still poke
                // through an edge or sit wholly inside the cell.
                let anti = -self.core.centroid;
                let hole = 180.0 - self.radius_deg;
                if hole > 0.0 && (cell.contains(&anti) || min_edge_dist(&anti, &corners) < hole) {
                    Status::Intersects
                } else {
                    Status::Includes
                }
            }
            1..=3 => Status::Intersects,
            _ => {
                // No corner inside: the circle either crosses an edge,
                // sits wholly inside the cell, or misses it.
                if min_edge_dist(&self.core.centroid, &corners) < self.radius_deg {
                    Status::Intersects
                } else if cell.contains(&self.core.centroid) {
                    Status::IsPartOf
                } else {
                    Status::Disjoint
                }
            }
        }
    }
}

fn min_edge_dist(p: &Direction, corners: &[Direction; 4]) -> f64 {
    let mut best = f64::MAX;
    for i in 0..4 {
        best = best.min(point_to_arc_deg(p, &corners[i], &corners[(i + 1) % 4]));
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(lon: f64, lat: f64, r: f64) -> CircularRegion {
        CircularRegion::new(&Direction::from_angles(lon, lat), r).unwrap()
    }

    #[test]
    fn test_rejects_bad_input() {
        let c = Direction::from_angles(0.0, 0.0);
        assert!(CircularRegion::new(&c, 0.0).is_err());
        assert!(CircularRegion::new(&c, -1.0).is_err());
        assert!(CircularRegion::new(&c, f64::NAN).is_err());
        assert!(CircularRegion::new(&Direction::NONE, 5.0).is_err());
    }

    #[test]
    fn test_radius_clamp() {
        let r = circle(0.0, 0.0, 200.0);
        assert!(r.radius_clamped());
        assert_eq!(r.radius_deg(), 180.0);
        assert!(r.contains(&Direction::from_angles(180.0, 0.0)));
        assert!(!circle(0.0, 0.0, 10.0).radius_clamped());
    }

    #[test]
    fn test_contains() {
        let r = circle(100.0, 40.0, 5.0);
        assert!(r.contains(&Direction::from_angles(100.0, 40.0)));
        assert!(r.contains(&Direction::from_angles(100.0, 44.9)));
        assert!(!r.contains(&Direction::from_angles(100.0, 45.1)));
    }

    #[test]
    fn test_area() {
        use qbox_core::constants::SPHERE_AREA_DEG2;
        // Hemisphere and a 1-degree cap against the small-cap formula.
        assert!((circle(0.0, 0.0, 90.0).area_deg2() - SPHERE_AREA_DEG2 / 2.0).abs() < 1e-6);
        let a = circle(0.0, 0.0, 1.0).area_deg2();
        assert!((a - std::f64::consts::PI).abs() / a < 1e-3, "{a}");
    }

    #[test]
    fn test_classify_circle_nested_at_pole() {
        // Concentric caps at the pole: the smaller probe is included.
        let r = circle(0.0, 90.0, 10.0);
        let pole = Direction::from_angles(0.0, 90.0);
        assert_eq!(r.classify_circle(&pole, 3.0), Status::Includes);
        assert_eq!(r.classify_circle(&pole, 30.0), Status::IsPartOf);
        let off = Direction::from_angles(0.0, 75.0);
        assert_eq!(r.classify_circle(&off, 6.0), Status::Intersects);
        assert_eq!(r.classify_circle(&off, 2.0), Status::Disjoint);
    }

    #[test]
    fn test_classify_qbox_small_circle_vs_face() {
        // A small circle at a face center is strictly inside the face:
        // the inscribed-radius arm (45 degrees at level 0) settles
        // IsPartOf without any boundary work.
        let r = circle(0.0, 0.0, 2.0);
        let face3 = Qbox::from_parts(3, 0, 0, 0);
        assert_eq!(r.classify_qbox(face3), Status::IsPartOf);
        assert_eq!(circle(0.0, 0.0, 1.0).classify_qbox(face3), Status::IsPartOf);
        let face4 = Qbox::from_parts(4, 0, 0, 0);
        assert_eq!(r.classify_qbox(face4), Status::Disjoint);
    }

    #[test]
    fn test_classify_qbox_whole_sphere() {
        let r = circle(20.0, 10.0, 5.0);
        assert_eq!(r.classify_qbox(Qbox::SPHERE), Status::IsPartOf);
    }

    #[test]
    fn test_classify_qbox_includes_fine_cells() {
        let r = circle(20.0, 10.0, 5.0);
        let c = Direction::from_angles(20.0, 10.0);
        let q = Qbox::from_direction(&c, 8);
        assert_eq!(r.classify_qbox(q), Status::Includes);
        // The flag takes no part in classification.
        assert_eq!(r.classify_qbox(q.with_any()), Status::Includes);
    }

    #[test]
    fn test_classify_qbox_boundary_cell() {
        // A cell straddling the circle boundary.
        let r = circle(20.0, 10.0, 5.0);
        let edge = Direction::from_angles(20.0, 15.0);
        let q = Qbox::from_direction(&edge, 6);
        assert_eq!(r.classify_qbox(q), Status::Intersects);
    }

    #[test]
    fn test_classify_qbox_disjoint_far() {
        let r = circle(20.0, 10.0, 5.0);
        let far = Direction::from_angles(200.0, -10.0);
        assert_eq!(r.classify_qbox(Qbox::from_direction(&far, 4)), Status::Disjoint);
    }

    #[test]
    fn test_classify_qbox_wide_cap() {
        // A 170-degree cap: everything but a 10-degree hole around the
        // antipode. A fine cell inside the hole is disjoint, cells
        // overlapping the hole rim intersect, cells away from the hole
        // are included.
        let r = circle(0.0, 0.0, 170.0);
        let anti = Direction::from_angles(180.0, 0.0);
        assert_eq!(r.classify_qbox(Qbox::from_direction(&anti, 4)), Status::Disjoint);
        assert_eq!(r.classify_qbox(Qbox::from_direction(&anti, 2)), Status::Intersects);
        let rim = Direction::from_angles(170.0, 0.0);
        assert_eq!(r.classify_qbox(Qbox::from_direction(&rim, 4)), Status::Intersects);
        let side = Direction::from_angles(90.0, 0.0);
        assert_eq!(r.classify_qbox(Qbox::from_direction(&side, 4)), Status::Includes);
    }

    #[test]
    fn test_classification_consistent_with_contains() {
        // Sampled consistency: a cell classified Includes contains only
        // in-circle points at its center and corners.
        let r = circle(33.0, -21.0, 4.0);
        for level in [4u8, 6, 8] {
            for dlon in [-5.0, -2.0, 0.0, 2.0, 5.0] {
                for dlat in [-5.0, 0.0, 5.0] {
                    let p = Direction::from_angles(33.0 + dlon, -21.0 + dlat);
                    let q = Qbox::from_direction(&p, level);
                    match r.classify_qbox(q) {
                        Status::Includes => {
                            assert!(r.contains(&q.center()));
                            for c in q.corners() {
                                assert!(r.contains(&c), "{q} corner outside");
                            }
                        }
                        Status::Disjoint => {
                            assert!(!r.contains(&q.center()));
                            for c in q.corners() {
                                assert!(!r.contains(&c), "{q} corner inside");
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
