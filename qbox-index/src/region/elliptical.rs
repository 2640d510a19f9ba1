//! Spherical ellipse regions.
//!
//! The locus of points whose angular distances to two foci sum to twice
//! the semi-major axis — the shape of an error ellipse or a projected
//! galaxy outline. With semi-axes `a >= b` the foci sit on the major
//! axis at `c` from the center, where `cos c = cos a / cos b`.
//!
//! Working directly with the focal-sum definition needs two `acos` per
//! probe; instead containment uses the equivalent algebraic form on the
//! focal cosines `c0, c1 = p . f0, p . f1`:
//!
//! ```text
//! c0^2 + c1^2 - 2 cos(2a) c0 c1 >= sin^2(2a),   c0 + c1 > 0
//! ```
//!
//! The first inequality squares the focal-sum bound; the second discards
//! the mirror solution around the antipodal focus pair. The same
//! polynomial, taken along a cell edge chord, turns boundary crossing
//! into a quadratic root test.

use qbox_core::constants::{DEG2_PER_STERADIAN, DEG_TO_RAD, HALF_PI, RAD_TO_DEG, TWOPI};
use qbox_core::math::acos_clamped;
use qbox_core::{Direction, GeomError, GeomResult, Matrix3, RegionErrorKind};

use crate::qbox::Qbox;
use crate::region::{checked_center, RegionCore, Status};

/// A spherical ellipse.
#[derive(Debug, Clone)]
pub struct EllipticalRegion {
    core: RegionCore,
    a_deg: f64,
    b_deg: f64,
    pa_deg: f64,
    f0: Direction,
    f1: Direction,
    cos_2a: f64,
    sin_2a_sq: f64,
    area_deg2: f64,
}

impl EllipticalRegion {
    /// Builds an ellipse with semi-major axis `a_deg` at position angle
    /// `pa_deg` (north through east, folded into [0, 180)) and
    /// semi-minor axis `b_deg`.
    ///
    /// Requires `0 < b <= a < 90`; `a == b` degenerates cleanly to a
    /// circle (both foci at the center).
    pub fn new(center: &Direction, a_deg: f64, b_deg: f64, pa_deg: f64) -> GeomResult<Self> {
        let centroid = checked_center(center)?;
        if !a_deg.is_finite() || !b_deg.is_finite() || !pa_deg.is_finite() {
            return Err(GeomError::invalid_region(
                RegionErrorKind::AxisOutOfRange,
                "ellipse axes and position angle must be finite",
            ));
        }
        if !(b_deg > 0.0 && b_deg <= a_deg && a_deg < 90.0) {
            return Err(GeomError::invalid_region(
                RegionErrorKind::AxisOutOfRange,
                "ellipse axes must satisfy 0 < b <= a < 90 degrees",
            ));
        }
        let pa = pa_deg.rem_euclid(180.0);
        let m = Matrix3::local_with_pa(&centroid, pa);
        let cos_c = libm::cos(a_deg * DEG_TO_RAD) / libm::cos(b_deg * DEG_TO_RAD);
        let c_deg = acos_clamped(cos_c) * RAD_TO_DEG;
        let f0 = m.apply_inverse(&Direction::from_angles(c_deg, 0.0));
        let f1 = m.apply_inverse(&Direction::from_angles(-c_deg, 0.0));
        let two_a = 2.0 * a_deg * DEG_TO_RAD;
        let sin_2a = libm::sin(two_a);
        Ok(Self {
            core: RegionCore {
                centroid,
                minrad: b_deg,
                maxrad: a_deg,
            },
            a_deg,
            b_deg,
            pa_deg: pa,
            f0,
            f1,
            cos_2a: libm::cos(two_a),
            sin_2a_sq: sin_2a * sin_2a,
            area_deg2: area_sr(a_deg, b_deg) * DEG2_PER_STERADIAN,
        })
    }

    pub(crate) fn core(&self) -> &RegionCore {
        &self.core
    }

    /// Semi-major axis in degrees.
    pub fn semi_major_deg(&self) -> f64 {
        self.a_deg
    }

    /// Semi-minor axis in degrees.
    pub fn semi_minor_deg(&self) -> f64 {
        self.b_deg
    }

    /// Position angle of the major axis in degrees, in [0, 180).
    pub fn position_angle_deg(&self) -> f64 {
        self.pa_deg
    }

    /// Ellipse area in square degrees.
    pub fn area_deg2(&self) -> f64 {
        self.area_deg2
    }

    /// Boundary-inclusive point containment via the focal-cosine form.
    pub fn contains(&self, dir: &Direction) -> bool {
        let c0 = dir.dot(&self.f0);
        let c1 = dir.dot(&self.f1);
        c0 + c1 > 0.0
            && c0 * c0 + c1 * c1 - 2.0 * self.cos_2a * c0 * c1 >= self.sin_2a_sq
    }

    /// 4-valued classification of a circle probe.
    ///
    /// After the bounding caps, the focal sum at the probe center
    /// brackets the focal sum over the whole probe to within twice its
    /// radius, which decides the clear cases.
    pub fn classify_circle(&self, center: &Direction, radius_deg: f64) -> Status {
        let d = Direction::dist_deg(&self.core.centroid, center);
        if let Some(s) = self.core.check1(d, radius_deg) {
            return s;
        }
        let s = Direction::dist_deg(center, &self.f0) + Direction::dist_deg(center, &self.f1);
        let two_a = 2.0 * self.a_deg;
        let two_r = 2.0 * radius_deg;
        if s - two_r >= two_a {
            return Status::Disjoint;
        }
        if s + two_r <= two_a {
            return Status::Includes;
        }
        Status::Intersects
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
        // The ellipse is convex (a < 90), so all corners in means the
        // whole cell is in.
        if inside == 4 {
            return Status::Includes;
        }
        if inside > 0 {
            return Status::Intersects;
        }

        for i in 0..4 {
            if self.edge_crosses_boundary(&corners[i], &corners[(i + 1) % 4]) {
                return Status::Intersects;
            }
        }
        if cell.contains(&self.core.centroid) {
            Status::IsPartOf
        } else {
            Status::Disjoint
        }
    }

    /// Whether the chord from `a` to `b` (a cell edge) crosses the
    /// ellipse boundary.
    ///
    /// Points on the edge are `p(t) = a + t (b - a)`; substituting the
    /// normalized `p` into the boundary equation and clearing the
    /// denominator `|p|^2` gives a quadratic in `t`. A root in [0, 1]
    /// that passes the hemisphere guards is a genuine boundary point.
    fn edge_crosses_boundary(&self, a: &Direction, b: &Direction) -> bool {
        let delta = *b - *a;
        let a0 = a.dot(&self.f0);
        let a1 = a.dot(&self.f1);
        let b0 = delta.dot(&self.f0);
        let b1 = delta.dot(&self.f1);
        let aa = a.dot(a);
        let ad = a.dot(&delta);
        let dd = delta.dot(&delta);
        let k = 2.0 * self.cos_2a;
        let q2 = b0 * b0 + b1 * b1 - k * b0 * b1 - self.sin_2a_sq * dd;
        let q1 = 2.0 * (a0 * b0 + a1 * b1) - k * (a0 * b1 + a1 * b0) - self.sin_2a_sq * 2.0 * ad;
        let q0 = a0 * a0 + a1 * a1 - k * a0 * a1 - self.sin_2a_sq * aa;

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
            let p = Direction::new(
                a.x + t * delta.x,
                a.y + t * delta.y,
                a.z + t * delta.z,
            );
            // Guards against the mirror branch around the antipodal foci.
            if p.dot(&self.core.centroid) > 0.0 && p.dot(&self.f0) + p.dot(&self.f1) > 0.0 {
                return true;
            }
        }
        false
    }
}

/// Ellipse solid angle in steradians.
///
/// Gnomonic projection around the center maps the boundary to a planar
/// ellipse with semi-axes `tan a`, `tan b`; the solid angle is the
/// integral of the gnomonic area element over it. In polar form that
/// reduces to a single smooth integrand in the azimuth, written here in
/// a cancellation-free shape and integrated by adaptive Simpson (a
/// circle reproduces the cap formula exactly).
fn area_sr(a_deg: f64, b_deg: f64) -> f64 {
    if (a_deg - b_deg).abs() < 1e-12 {
        return TWOPI * (1.0 - libm::cos(a_deg * DEG_TO_RAD));
    }
    let ta = libm::tan(a_deg * DEG_TO_RAD);
    let tb = libm::tan(b_deg * DEG_TO_RAD);
    let ta2 = ta * ta;
    let tb2 = tb * tb;
    let f = move |phi: f64| {
        let (s, c) = libm::sincos(phi);
        let r2 = ta2 * tb2 / (tb2 * c * c + ta2 * s * s);
        let root = libm::sqrt(1.0 + r2);
        r2 / (root * (1.0 + root))
    };
    4.0 * adaptive_simpson(&f, 0.0, HALF_PI, 1e-13)
}

fn simpson(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

fn adaptive_simpson<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, eps: f64) -> f64 {
    let m = 0.5 * (a + b);
    let (fa, fm, fb) = (f(a), f(m), f(b));
    let whole = simpson(a, b, fa, fm, fb);
    refine(f, a, b, fa, fm, fb, whole, eps, 24)
}

#[allow(clippy::too_many_arguments)]
fn refine<F: Fn(f64) -> f64>(
    f: &F,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    eps: f64,
    depth: u32,
) -> f64 {
    let m = 0.5 * (a + b);
    let (lm, rm) = (0.5 * (a + m), 0.5 * (m + b));
    let (flm, frm) = (f(lm), f(rm));
    let left = simpson(a, m, fa, flm, fm);
    let right = simpson(m, b, fm, frm, fb);
    let delta = left + right - whole;
    if depth == 0 || libm::fabs(delta) <= 15.0 * eps {
        return left + right + delta / 15.0;
    }
    refine(f, a, m, fa, flm, fm, left, 0.5 * eps, depth - 1)
        + refine(f, m, b, fm, frm, fb, right, 0.5 * eps, depth - 1)
}
