//! Longitude/latitude zone regions.
//!
//! A zone is a longitude wedge crossed with a latitude band, optionally
//! expressed in a rotated frame (a declination band in the equatorial
//! frame, a galactic-latitude cut, ...). Internally every zone is
//! rotated so its wedge is centered on longitude 0: containment is then
//! a `z` range check plus one scale-invariant cosine comparison, with no
//! angle wraparound left anywhere.
//!
//! Equal longitude bounds mean the full 360-degree ring; the latitude
//! bounds must be a proper non-empty interval.
//!
//! The boundary pieces are two small circles (the parallels) and, for a
//! partial wedge, two meridian arcs (great circles). Both admit exact
//! nearest/farthest-point formulas, so circle classification here is
//! fully exact rather than bounding-cap approximate.

use qbox_core::constants::{DEG2_PER_STERADIAN, DEG_TO_RAD, RAD_TO_DEG};
use qbox_core::math::asin_clamped;
use qbox_core::{Direction, GeomError, GeomResult, Matrix3, RegionErrorKind};

use crate::arc::point_to_arc_deg;
use crate::qbox::Qbox;
use crate::region::{RegionCore, Status};

/// A longitude/latitude zone, possibly in a rotated frame.
#[derive(Debug, Clone)]
pub struct ZonalRegion {
    core: RegionCore,
    /// World directions times `rot` land in the zone frame: wedge
    /// centered on longitude 0, latitudes as given.
    rot: Matrix3,
    lat0: f64,
    lat1: f64,
    z0: f64,
    z1: f64,
    half_span: f64,
    cos_half_span: f64,
    full: bool,
    lon0: f64,
    lon1: f64,
    area_deg2: f64,
}

impl ZonalRegion {
    /// Builds a zone in the base frame. Longitudes run eastward from
    /// `lon0_deg` to `lon1_deg` (equal bounds give the full ring).
    pub fn new(lon0_deg: f64, lon1_deg: f64, lat0_deg: f64, lat1_deg: f64) -> GeomResult<Self> {
        Self::new_in_frame(Matrix3::identity(), lon0_deg, lon1_deg, lat0_deg, lat1_deg)
    }

    /// Builds a zone whose bounds are interpreted in `frame` (the rows
    /// of `frame` are the frame axes expressed in base coordinates).
    pub fn new_in_frame(
        frame: Matrix3,
        lon0_deg: f64,
        lon1_deg: f64,
        lat0_deg: f64,
        lat1_deg: f64,
    ) -> GeomResult<Self> {
        for v in [lon0_deg, lon1_deg, lat0_deg, lat1_deg] {
            if !v.is_finite() {
                return Err(GeomError::invalid_region(
                    RegionErrorKind::EmptyZone,
                    "zone bounds must be finite",
                ));
            }
        }
        if !(lat0_deg < lat1_deg && lat0_deg >= -90.0 && lat1_deg <= 90.0) {
            return Err(GeomError::invalid_region(
                RegionErrorKind::EmptyZone,
                "zone latitudes must satisfy -90 <= lat0 < lat1 <= 90",
            ));
        }
        let lon0 = lon0_deg.rem_euclid(360.0);
        let lon1 = lon1_deg.rem_euclid(360.0);
        let mut span = lon1 - lon0;
        if span <= 0.0 {
            span += 360.0;
        }
        let full = span >= 360.0;
        let half_span = 0.5 * span;
        let lonc = lon0 + half_span;

        let mut rot = frame;
        rot.rotate_z(lonc * DEG_TO_RAD);

        let latc = 0.5 * (lat0_deg + lat1_deg);
        let centroid = rot.apply_inverse(&Direction::from_angles(0.0, latc));

        // Bounding radii, computed in the zone frame where the centroid
        // sits at (0, latc). The farthest boundary points of a latitude
        // circle from a point on its central meridian are the wedge
        // corners (distance grows with the longitude offset), or the
        // antimeridian points for the full ring.
        let local_c = Direction::from_angles(0.0, latc);
        let far_lon = if full { 180.0 } else { half_span };
        let mut maxrad = 0.0f64;
        for lat in [lat0_deg, lat1_deg] {
            let p = Direction::from_angles(far_lon, lat);
            maxrad = maxrad.max(Direction::dist_deg(&local_c, &p));
        }
        let mut minrad = (latc - lat0_deg).min(lat1_deg - latc);
        if !full {
            let a = Direction::from_angles(half_span, lat0_deg);
            let b = Direction::from_angles(half_span, lat1_deg);
            minrad = minrad.min(point_to_arc_deg(&local_c, &a, &b));
        }

        let z0 = libm::sin(lat0_deg * DEG_TO_RAD);
        let z1 = libm::sin(lat1_deg * DEG_TO_RAD);
        let area_deg2 = span * DEG_TO_RAD * (z1 - z0) * DEG2_PER_STERADIAN;

        Ok(Self {
            core: RegionCore {
                centroid,
                minrad,
                maxrad,
            },
            rot,
            lat0: lat0_deg,
            lat1: lat1_deg,
            z0,
            z1,
            half_span,
            cos_half_span: libm::cos(half_span * DEG_TO_RAD),
            full,
            lon0,
            lon1,
            area_deg2,
        })
    }

    pub(crate) fn core(&self) -> &RegionCore {
        &self.core
    }

    /// Human-readable bounds, for diagnostics.
    pub fn describe_bounds(&self) -> String {
        if self.full {
            format!("lon all, lat {}..{}", self.lat0, self.lat1)
        } else {
            format!(
                "lon {}..{}, lat {}..{}",
                self.lon0, self.lon1, self.lat0, self.lat1
            )
        }
    }

    /// Zone area in square degrees (exact: span times sine-latitude
    /// difference).
    pub fn area_deg2(&self) -> f64 {
        self.area_deg2
    }

    /// Boundary-inclusive point containment.
    pub fn contains(&self, dir: &Direction) -> bool {
        self.contains_local(&self.rot.apply(dir))
    }

    fn contains_local(&self, p: &Direction) -> bool {
        if p.z < self.z0 || p.z > self.z1 {
            return false;
        }
        if self.full {
            return true;
        }
        // cos(lon) >= cos(half_span), scale-invariant in (x, y).
        p.x >= self.cos_half_span * libm::hypot(p.x, p.y)
    }

    /// 4-valued classification of a circle probe (exact).
    pub fn classify_circle(&self, center: &Direction, radius_deg: f64) -> Status {
        self.icircle(center, radius_deg, true)
    }

    /// Circle classification; with `deep` false it settles for
    /// `Intersects` once the cheap exact tests cannot decide, which is
    /// all the cell pre-check needs.
    fn icircle(&self, center: &Direction, radius_deg: f64, deep: bool) -> Status {
        let d = Direction::dist_deg(&self.core.centroid, center);
        if let Some(s) = self.core.check1(d, radius_deg) {
            return s;
        }
        let lc = self.rot.apply(center);
        let lat_c = lc.lat();

        // Latitude band: the meridian distance to a parallel is exact.
        if lat_c - radius_deg > self.lat1 || lat_c + radius_deg < self.lat0 {
            return Status::Disjoint;
        }
        let in_band = lat_c - radius_deg >= self.lat0 && lat_c + radius_deg <= self.lat1;

        if self.full {
            if in_band {
                return Status::Includes;
            }
        } else {
            // Longitude extent of the cap: exact unless the cap rings a
            // pole.
            let sin_r = libm::sin(radius_deg * DEG_TO_RAD);
            let cos_lat = libm::cos(lat_c * DEG_TO_RAD);
            let spans_all = sin_r >= cos_lat;
            if !spans_all {
                let lam = asin_clamped(sin_r / cos_lat) * RAD_TO_DEG;
                let lon_c = signed_lon(&lc);
                if libm::fabs(lon_c) - lam > self.half_span {
                    return Status::Disjoint;
                }
                if in_band && libm::fabs(lon_c) + lam <= self.half_span {
                    return Status::Includes;
                }
            }
        }
        if !deep {
            return Status::Intersects;
        }

        let bmin = self.boundary_min_dist(&lc);
        let bmax = self.boundary_max_dist(&lc);
        if bmax <= radius_deg && !self.contains_local(&-lc) {
            return Status::IsPartOf;
        }
        if self.contains_local(&lc) {
            if bmin >= radius_deg {
                Status::Includes
            } else {
                Status::Intersects
            }
        } else if bmin > radius_deg {
            Status::Disjoint
        } else {
            Status::Intersects
        }
    }

    /// Exact distance from a zone-frame point to the nearest boundary
    /// point.
    ///
    /// On a parallel the distance to a point grows with the longitude
    /// offset, so the nearest parallel point is at the clamped
    /// longitude; the meridian edges are great arcs.
    fn boundary_min_dist(&self, lc: &Direction) -> f64 {
        let lon_c = signed_lon(lc);
        let mut best = f64::MAX;
        for lat in [self.lat0, self.lat1] {
            let lon = if self.full {
                lon_c
            } else {
                lon_c.clamp(-self.half_span, self.half_span)
            };
            best = best.min(Direction::dist_deg(lc, &Direction::from_angles(lon, lat)));
        }
        if !self.full {
            for sgn in [-1.0, 1.0] {
                let a = Direction::from_angles(sgn * self.half_span, self.lat0);
                let b = Direction::from_angles(sgn * self.half_span, self.lat1);
                best = best.min(point_to_arc_deg(lc, &a, &b));
            }
        }
        best
    }

    /// Exact distance from a zone-frame point to the farthest boundary
    /// point.
    fn boundary_max_dist(&self, lc: &Direction) -> f64 {
        let lon_c = signed_lon(lc);
        let mut far = lon_c + 180.0;
        if far > 180.0 {
            far -= 360.0;
        }
        let mut best = 0.0f64;
        for lat in [self.lat0, self.lat1] {
            if self.full {
                best = best.max(Direction::dist_deg(lc, &Direction::from_angles(far, lat)));
            } else {
                for lon in [-self.half_span, self.half_span] {
                    best = best.max(Direction::dist_deg(lc, &Direction::from_angles(lon, lat)));
                }
                if libm::fabs(far) <= self.half_span {
                    best = best.max(Direction::dist_deg(lc, &Direction::from_angles(far, lat)));
                }
            }
        }
        if !self.full {
            // Farthest point of a great arc is the one nearest the
            // antipode.
            let anti = -*lc;
            for sgn in [-1.0, 1.0] {
                let a = Direction::from_angles(sgn * self.half_span, self.lat0);
                let b = Direction::from_angles(sgn * self.half_span, self.lat1);
                best = best.max(180.0 - point_to_arc_deg(&anti, &a, &b));
            }
        }
        best
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
        // The cell sits inside its circumscribed cap, so an exact
        // verdict on that cap settles the one-sided cases.
        match self.icircle(&center, Qbox::max_radius(level), false) {
            Status::Disjoint => return Status::Disjoint,
            Status::Includes => return Status::Includes,
            _ => {}
        }

        let corners = cell.corners();
        let inside = corners.iter().filter(|c| self.contains(c)).count();
        if inside > 0 && inside < 4 {
            return Status::Intersects;
        }

        // Boundary crossings, in the zone frame where the boundary
        // pieces are coordinate surfaces.
        let lc: Vec<Direction> = corners.iter().map(|c| self.rot.apply(c)).collect();
        for i in 0..4 {
            let (a, b) = (&lc[i], &lc[(i + 1) % 4]);
            if self.edge_crosses_parallel(a, b, self.z0)
                || self.edge_crosses_parallel(a, b, self.z1)
            {
                return Status::Intersects;
            }
            if !self.full
                && (self.edge_crosses_meridian(a, b, 1.0) || self.edge_crosses_meridian(a, b, -1.0))
            {
                return Status::Intersects;
            }
        }

        if inside == 4 {
            // All corners in, no crossing: still reject a cell that
            // swallows a polar hole of the zone (the complement of a
            // full ring is two caps, either of which can sit wholly
            // inside a cell).
            let north = self.rot.apply_inverse(&Direction::new(0.0, 0.0, 1.0));
            if self.lat1 < 90.0 && cell.contains(&north) {
                return Status::Intersects;
            }
            if self.lat0 > -90.0 && cell.contains(&-north) {
                return Status::Intersects;
            }
            Status::Includes
        } else if cell.contains(&self.core.centroid) {
            Status::IsPartOf
        } else {
            Status::Disjoint
        }
    }

    /// Whether the chord from `a` to `b` crosses the small circle
    /// `z = z_i` within the zone's longitude wedge.
    ///
    /// Normalizing `p(t) = a + t (b - a)` and clearing the denominator
    /// turns `p.z = z_i |p|` into a quadratic; the sign check discards
    /// the mirror parallel introduced by squaring.
    fn edge_crosses_parallel(&self, a: &Direction, b: &Direction, z_i: f64) -> bool {
        let delta = *b - *a;
        let aa = a.dot(a);
        let ad = a.dot(&delta);
        let dd = delta.dot(&delta);
        let zi2 = z_i * z_i;
        let q2 = delta.z * delta.z - zi2 * dd;
        let q1 = 2.0 * (a.z * delta.z - zi2 * ad);
        let q0 = a.z * a.z - zi2 * aa;

        let mut roots = [f64::NAN; 2];
        if libm::fabs(q2) < 1e-15 {
            if libm::fabs(q1) < 1e-15 {
                return false;
            }
            roots[0] = -q0 / q1;
        } else {
            let disc = q1 * q1 - 4.0 * q2 * q0;
            if disc < 0.0 {
                return false;
            }
            let sq = libm::sqrt(disc);
            roots[0] = (-q1 - sq) / (2.0 * q2);
            roots[1] = (-q1 + sq) / (2.0 * q2);
        }
        for t in roots {
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            let p = Direction::new(a.x + t * delta.x, a.y + t * delta.y, a.z + t * delta.z);
            if z_i != 0.0 && p.z * z_i < 0.0 {
                continue;
            }
            if self.full || p.x >= self.cos_half_span * libm::hypot(p.x, p.y) {
                return true;
            }
        }
        false
    }

    /// Whether the chord from `a` to `b` crosses the meridian edge at
    /// `sgn * half_span`, within the latitude band.
    fn edge_crosses_meridian(&self, a: &Direction, b: &Direction, sgn: f64) -> bool {
        let (sin_hs, cos_hs) = libm::sincos(sgn * self.half_span * DEG_TO_RAD);
        // Plane normal of the meridian's great circle.
        let n = Direction::new(-sin_hs, cos_hs, 0.0);
        let delta = *b - *a;
        let nd = n.dot(&delta);
        if libm::fabs(nd) < 1e-15 {
            return false;
        }
        let t = -n.dot(a) / nd;
        if !(0.0..=1.0).contains(&t) {
            return false;
        }
        let p = Direction::new(a.x + t * delta.x, a.y + t * delta.y, a.z + t * delta.z);
        // On the meridian's half of its great circle, not the antipodal
        // half.
        if p.x * cos_hs + p.y * sin_hs <= 0.0 {
            return false;
        }
        let z = p.z / p.magnitude();
        (self.z0..=self.z1).contains(&z)
    }
}

/// Longitude of a zone-frame direction folded into (-180, 180].
fn signed_lon(p: &Direction) -> f64 {
    let mut lon = p.lon();
    if lon > 180.0 {
        lon -= 360.0;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_bounds() {
        assert!(ZonalRegion::new(0.0, 90.0, 40.0, 30.0).is_err());
        assert!(ZonalRegion::new(0.0, 90.0, 30.0, 30.0).is_err());
        assert!(ZonalRegion::new(0.0, 90.0, -100.0, 30.0).is_err());
        assert!(ZonalRegion::new(f64::NAN, 90.0, 0.0, 30.0).is_err());
    }

    #[test]
    fn test_contains_plain() {
        let z = ZonalRegion::new(10.0, 50.0, -20.0, 20.0).unwrap();
        assert!(z.contains(&Direction::from_angles(30.0, 0.0)));
        assert!(z.contains(&Direction::from_angles(10.0, -20.0))); // corner
        assert!(!z.contains(&Direction::from_angles(51.0, 0.0)));
        assert!(!z.contains(&Direction::from_angles(30.0, 21.0)));
        assert!(!z.contains(&Direction::from_angles(210.0, 0.0)));
    }

    #[test]
    fn test_contains_wraps_zero() {
        // lon 359 eastward to 1 crosses the zero meridian.
        let z = ZonalRegion::new(359.0, 1.0, -1.0, 1.0).unwrap();
        assert!(z.contains(&Direction::from_angles(0.0, 0.0)));
        assert!(z.contains(&Direction::from_angles(359.5, 0.5)));
        assert!(!z.contains(&Direction::from_angles(180.0, 0.0)));
        assert!(!z.contains(&Direction::from_angles(2.0, 0.0)));
    }

    #[test]
    fn test_full_ring() {
        let z = ZonalRegion::new(0.0, 0.0, 40.0, 50.0).unwrap();
        for lon in [0.0, 90.0, 180.0, 270.0] {
            assert!(z.contains(&Direction::from_angles(lon, 45.0)));
        }
        assert!(!z.contains(&Direction::from_angles(0.0, 39.0)));
        // Exact band area.
        let expect = 2.0 * std::f64::consts::PI
            * (libm::sin(50.0 * DEG_TO_RAD) - libm::sin(40.0 * DEG_TO_RAD))
            * DEG2_PER_STERADIAN;
        assert!((z.area_deg2() - expect).abs() < 1e-9);
    }

    #[test]
    fn test_rotated_frame() {
        // Frame whose local equator passes through the base pole: rows
        // are (pole, east at pole, -x).
        let frame = Matrix3::local(&Direction::from_angles(0.0, 90.0));
        let z = ZonalRegion::new_in_frame(frame, 0.0, 0.0, -5.0, 5.0).unwrap();
        assert!(z.contains(&Direction::from_angles(0.0, 90.0)));
        assert!(!z.contains(&Direction::from_angles(0.0, 0.0)));
    }

    #[test]
    fn test_area_wedge() {
        let z = ZonalRegion::new(0.0, 90.0, 0.0, 90.0).unwrap();
        // A quarter wedge of the northern hemisphere: 1/8 sphere.
        use qbox_core::constants::SPHERE_AREA_DEG2;
        assert!((z.area_deg2() - SPHERE_AREA_DEG2 / 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_classify_circle() {
        let z = ZonalRegion::new(0.0, 90.0, 30.0, 60.0).unwrap();
        let mid = Direction::from_angles(45.0, 45.0);
        assert_eq!(z.classify_circle(&mid, 5.0), Status::Includes);
        assert_eq!(z.classify_circle(&mid, 20.0), Status::Intersects);
        // At 40 degrees the probe swallows the zone (its far corners
        // sit about 38 degrees out).
        assert_eq!(z.classify_circle(&mid, 40.0), Status::IsPartOf);
        assert_eq!(
            z.classify_circle(&Direction::from_angles(45.0, 80.0), 3.0),
            Status::Disjoint
        );
        // Disjoint in longitude only: same latitudes, far wedge.
        assert_eq!(
            z.classify_circle(&Direction::from_angles(180.0, 45.0), 5.0),
            Status::Disjoint
        );
        // Big probe swallowing the zone, centered outside it.
        assert_eq!(
            z.classify_circle(&Direction::from_angles(45.0, 10.0), 61.0),
            Status::IsPartOf
        );
        assert_eq!(
            z.classify_circle(&Direction::from_angles(45.0, 10.0), 60.0),
            Status::Intersects
        );
    }

    #[test]
    fn test_classify_circle_touching_meridian_edge() {
        let z = ZonalRegion::new(0.0, 90.0, 30.0, 60.0).unwrap();
        // Center west of the lon-0 edge at the band's latitude: the cap
        // crosses the meridian edge once its longitude reach exceeds
        // the gap.
        let c = Direction::from_angles(350.0, 45.0);
        assert_eq!(z.classify_circle(&c, 5.0), Status::Disjoint);
        assert_eq!(z.classify_circle(&c, 10.0), Status::Intersects);
    }

    #[test]
    fn test_classify_qbox() {
        let z = ZonalRegion::new(0.0, 90.0, 30.0, 60.0).unwrap();
        let inside = Qbox::from_direction(&Direction::from_angles(45.0, 45.0), 7);
        assert_eq!(z.classify_qbox(inside), Status::Includes);
        let rim = Qbox::from_direction(&Direction::from_angles(45.0, 30.0), 7);
        assert_eq!(z.classify_qbox(rim), Status::Intersects);
        let below = Qbox::from_direction(&Direction::from_angles(45.0, 0.0), 5);
        assert_eq!(z.classify_qbox(below), Status::Disjoint);
    }

    #[test]
    fn test_classify_qbox_whole_sphere() {
        let z = ZonalRegion::new(10.0, 50.0, -20.0, 20.0).unwrap();
        assert_eq!(z.classify_qbox(Qbox::SPHERE), Status::IsPartOf);
    }

    #[test]
    fn test_classify_qbox_wrap() {
        let z = ZonalRegion::new(350.0, 10.0, -5.0, 5.0).unwrap();
        let q = Qbox::from_direction(&Direction::from_angles(0.0, 0.0), 6);
        assert_eq!(z.classify_qbox(q), Status::Includes);
        let out = Qbox::from_direction(&Direction::from_angles(30.0, 0.0), 6);
        assert_eq!(z.classify_qbox(out), Status::Disjoint);
    }

    #[test]
    fn test_classify_qbox_thin_ring_through_cell() {
        // A thin full ring crossing a cell: no corner on either side,
        // only the parallel-crossing quadratic sees it.
        let z = ZonalRegion::new(0.0, 0.0, 4.9, 5.1).unwrap();
        let cell = Qbox::from_direction(&Direction::from_angles(5.0, 5.0), 3);
        assert_eq!(z.classify_qbox(cell), Status::Intersects);
    }

    #[test]
    fn test_classify_qbox_polar_hole_inside_cell() {
        // A wide full ring versus the polar face: every face corner is
        // in the ring, but the cap above lat 80 is not, and it sits
        // wholly inside the face.
        let z = ZonalRegion::new(0.0, 0.0, -80.0, 80.0).unwrap();
        let face1 = Qbox::from_parts(1, 0, 0, 0);
        assert_eq!(z.classify_qbox(face1), Status::Intersects);
        // With the band running to the pole the face really is inside.
        let capped = ZonalRegion::new(0.0, 0.0, -80.0, 90.0).unwrap();
        assert_eq!(capped.classify_qbox(face1), Status::Includes);
    }

    #[test]
    fn test_classify_qbox_zone_inside_cell() {
        // A small zone wholly inside one level-1 cell.
        let z = ZonalRegion::new(348.0, 356.0, 8.0, 14.0).unwrap();
        let cell = Qbox::from_parts(3, 0, 1, 1);
        assert_eq!(z.classify_qbox(cell), Status::IsPartOf);
    }

    #[test]
    fn test_describe_bounds() {
        let z = ZonalRegion::new(10.0, 50.0, -20.0, 20.0).unwrap();
        assert!(z.describe_bounds().contains("10"));
        let ring = ZonalRegion::new(0.0, 0.0, 40.0, 50.0).unwrap();
        assert!(ring.describe_bounds().contains("all"));
    }
}
