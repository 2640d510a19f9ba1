//! Convex polygon regions (and boxes, which are 4-vertex polygons).
//!
//! A convex spherical polygon is the intersection of the hemispheres on
//! the inner side of its edge great circles, so point containment is one
//! dot product per edge. Construction orients the edge normals inward
//! regardless of the supplied winding and rejects vertex lists that do
//! not bound a convex outline.

use qbox_core::constants::{DEG2_PER_STERADIAN, RAD_TO_DEG};
use qbox_core::math::{asin_clamped, chord_from_angle_deg};
use qbox_core::{Direction, GeomError, GeomResult, Matrix3, RegionErrorKind};

use crate::arc::{arcs_cross, point_to_arc_deg};
use crate::qbox::Qbox;
use crate::region::{checked_center, RegionCore, Status};

/// A convex polygon on the sphere.
#[derive(Debug, Clone)]
pub struct ConvexRegion {
    core: RegionCore,
    vertices: Vec<Direction>,
    /// Inward unit normals, one per edge `vertices[i] -> vertices[i+1]`
    /// (wrapping).
    normals: Vec<Direction>,
    area_deg2: f64,
}

impl ConvexRegion {
    /// Builds a convex polygon through `vertices`, in either winding.
    ///
    /// Rejects fewer than 3 vertices, undefined or coincident
    /// consecutive vertices, and outlines that are not convex (some
    /// vertex on the outer side of some edge).
    pub fn new(vertices: &[Direction]) -> GeomResult<Self> {
        if vertices.len() < 3 {
            return Err(GeomError::invalid_region(
                RegionErrorKind::TooFewVertices,
                "a polygon needs at least 3 vertices",
            ));
        }
        let mut verts = Vec::with_capacity(vertices.len());
        for (i, v) in vertices.iter().enumerate() {
            let mag = v.magnitude();
            if v.is_none() || !mag.is_finite() {
                return Err(GeomError::invalid_region(
                    RegionErrorKind::InvalidCenter,
                    &format!("vertex {i} is undefined or not finite"),
                ));
            }
            verts.push(v.normalize());
        }

        let mut sum = Direction::new(0.0, 0.0, 0.0);
        for v in &verts {
            sum = Direction::new(sum.x + v.x, sum.y + v.y, sum.z + v.z);
        }
        if sum.magnitude() < 1e-9 {
            return Err(GeomError::invalid_region(
                RegionErrorKind::NotConvex,
                "vertices have no well-defined centroid",
            ));
        }
        let centroid = sum.normalize();

        let n = verts.len();
        let mut normals = Vec::with_capacity(n);
        for i in 0..n {
            let raw = verts[i].cross(&verts[(i + 1) % n]);
            let mag = raw.magnitude();
            if mag < 1e-12 {
                return Err(GeomError::invalid_region(
                    RegionErrorKind::NotConvex,
                    &format!("vertices {i} and {} coincide or are antipodal", (i + 1) % n),
                ));
            }
            let mut nrm = Direction::new(raw.x / mag, raw.y / mag, raw.z / mag);
            let side = nrm.dot(&centroid);
            if side == 0.0 {
                return Err(GeomError::invalid_region(
                    RegionErrorKind::NotConvex,
                    &format!("centroid lies on edge {i}"),
                ));
            }
            if side < 0.0 {
                nrm = -nrm;
            }
            normals.push(nrm);
        }
        // The winding must be consistent: flipping normals one by one
        // above hides a reversed winding, but a genuinely non-convex
        // outline puts some vertex outside some edge.
        for (i, nrm) in normals.iter().enumerate() {
            for (j, v) in verts.iter().enumerate() {
                if nrm.dot(v) < -1e-12 {
                    return Err(GeomError::invalid_region(
                        RegionErrorKind::NotConvex,
                        &format!("vertex {j} lies outside edge {i}"),
                    ));
                }
            }
        }

        let mut minrad = f64::MAX;
        for nrm in &normals {
            minrad = minrad.min(asin_clamped(nrm.dot(&centroid)) * RAD_TO_DEG);
        }
        let mut maxrad = 0.0f64;
        for v in &verts {
            maxrad = maxrad.max(Direction::dist_deg(&centroid, v));
        }

        let area_deg2 = fan_area_sr(&centroid, &verts) * DEG2_PER_STERADIAN;

        Ok(Self {
            core: RegionCore {
                centroid,
                minrad,
                maxrad,
            },
            vertices: verts,
            normals,
            area_deg2,
        })
    }

    /// Builds a box: `width_deg` along the position-angle axis,
    /// `height_deg` across it, centered on `center`.
    ///
    /// The position angle is counted from north through east and folded
    /// into [0, 180). Both extents must be positive and below 90
    /// degrees so the corners stay in one hemisphere.
    pub fn new_box(
        center: &Direction,
        width_deg: f64,
        height_deg: f64,
        pa_deg: f64,
    ) -> GeomResult<Self> {
        let c = checked_center(center)?;
        for (name, v) in [("width", width_deg), ("height", height_deg)] {
            if !v.is_finite() || v <= 0.0 || v >= 90.0 {
                return Err(GeomError::invalid_region(
                    RegionErrorKind::AxisOutOfRange,
                    &format!("box {name} must be in (0, 90) degrees"),
                ));
            }
        }
        if !pa_deg.is_finite() {
            return Err(GeomError::invalid_region(
                RegionErrorKind::AxisOutOfRange,
                "box position angle must be finite",
            ));
        }
        let pa = pa_deg.rem_euclid(180.0);
        let m = Matrix3::local_with_pa(&c, pa);
        let (w2, h2) = (0.5 * width_deg, 0.5 * height_deg);
        // Corners in the rolled tangent frame, counterclockwise.
        let local = [
            Direction::from_angles(-w2, -h2),
            Direction::from_angles(w2, -h2),
            Direction::from_angles(w2, h2),
            Direction::from_angles(-w2, h2),
        ];
        let verts: Vec<Direction> = local.iter().map(|v| m.apply_inverse(v)).collect();
        Self::new(&verts)
    }

    pub(crate) fn core(&self) -> &RegionCore {
        &self.core
    }

    /// The normalized vertices, in construction order.
    pub fn vertices(&self) -> &[Direction] {
        &self.vertices
    }

    /// Polygon area in square degrees (centroid-fan spherical excess).
    pub fn area_deg2(&self) -> f64 {
        self.area_deg2
    }

    /// Boundary-inclusive point containment: inside every edge.
    pub fn contains(&self, dir: &Direction) -> bool {
        self.normals.iter().all(|n| n.dot(dir) >= 0.0)
    }

    /// 4-valued classification of a circle probe.
    pub fn classify_circle(&self, center: &Direction, radius_deg: f64) -> Status {
        let d = Direction::dist_deg(&self.core.centroid, center);
        if let Some(s) = self.core.check1(d, radius_deg) {
            return s;
        }
        let chord = chord_from_angle_deg(radius_deg);
        let chord2 = chord * chord;
        let inside = self
            .vertices
            .iter()
            .filter(|v| v.squared_chord(center) <= chord2)
            .count();
        if inside == self.vertices.len() {
            return Status::IsPartOf;
        }
        if inside > 0 {
            return Status::Intersects;
        }
        // No vertex inside the circle: the circle crosses an edge, sits
        // wholly inside the polygon, or misses it.
        let n = self.vertices.len();
        for i in 0..n {
            if point_to_arc_deg(center, &self.vertices[i], &self.vertices[(i + 1) % n])
                < radius_deg
            {
                return Status::Intersects;
            }
        }
        if self.contains(center) {
            Status::Includes
        } else {
            Status::Disjoint
        }
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
        let d = Direction::dist_deg(&self.core.centroid, &cell.center());
        if let Some(s) = self
            .core
            .check1_qbox(d, Qbox::max_radius(level), Qbox::min_radius(level))
        {
            return s;
        }

        let corners = cell.corners();
        let inside = corners.iter().filter(|c| self.contains(c)).count();
        if inside > 0 && inside < 4 {
            return Status::Intersects;
        }

        // Boundary crossings decide the remaining ambiguous layouts: a
        // polygon vertex poking through a cell edge, or a narrow polygon
        // cutting a corner off the cell.
        let n = self.vertices.len();
        for i in 0..n {
            let (a, b) = (&self.vertices[i], &self.vertices[(i + 1) % n]);
            for j in 0..4 {
                if arcs_cross(a, b, &corners[j], &corners[(j + 1) % 4]) {
                    return Status::Intersects;
                }
            }
        }

        if inside == 4 {
            Status::Includes
        } else if cell.contains(&self.core.centroid) {
            Status::IsPartOf
        } else {
            Status::Disjoint
        }
    }
}

/// Unsigned solid angle of the polygon as a fan of triangles around an
/// interior point, each by the spherical-excess arctangent formula.
fn fan_area_sr(apex: &Direction, verts: &[Direction]) -> f64 {
    let n = verts.len();
    let mut total = 0.0;
    for i in 0..n {
        let (a, b) = (&verts[i], &verts[(i + 1) % n]);
        let triple = apex.dot(&a.cross(b));
        let denom = 1.0 + apex.dot(a) + a.dot(b) + b.dot(apex);
        total += 2.0 * libm::atan2(triple, denom);
    }
    libm::fabs(total)
}
