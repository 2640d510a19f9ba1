//! The Qbox cell codec: quad-tree cells on the cube sphere, packed into
//! a `u32`.
//!
//! Each cube face is cut into `2^level x 2^level` cells, level 0 being
//! the face itself and [`MAX_LEVEL`] (12) a grid of 4096 x 4096 cells
//! (about 80 arcseconds on a side). Cell boundaries are uniform in `atan(X)` rather
//! than in the planar coordinate itself, which evens out the gnomonic
//! area distortion: the largest cell of a level is never more than a few
//! percent bigger than the smallest.
//!
//! # Value layout
//!
//! ```text
//!   bit 31                                   bit 0
//!   A 0...0 1 f f f  xy xy ... xy
//!   |        | \_face  \__ 2 bits per level, first
//!   |        marker        subdivision first
//!   coverage flag
//! ```
//!
//! The marker bit above the 3-bit face number makes the value
//! self-delimiting: the position of the highest set bit encodes the
//! level, so cells of every level share one integer space and a parent
//! is literally its child shifted right by two. The face values 1..=6
//! give level-0 cells the raw values 9..=14. The all-zero value is the
//! whole sphere. Bit 31 is a coverage flag used by the selector to mark
//! cells lying entirely inside a region ("any": every finer cell below
//! this one matches too); it takes no part in identity comparisons made
//! through [`Qbox::without_any`].
//!
//! ```
//! use qbox_core::Direction;
//! use qbox_index::qbox::Qbox;
//!
//! let d = Direction::from_angles(83.6, -5.4);
//! let q = Qbox::from_direction(&d, 6);
//! assert_eq!(q.level(), 6);
//! assert!(q.contains(&d));
//! assert_eq!(q.parent().unwrap().level(), 5);
//! ```
//!
//! # Text codes
//!
//! Cells print as `face[:path][A]` with the path in base 4, one digit
//! per level (`3:021A`), and parse back via [`FromStr`]. The whole
//! sphere prints as `*`.

use crate::arc::point_to_arc_deg;
use crate::coocube;
use qbox_core::constants::{DEG2_PER_STERADIAN, HALF_PI, RAD_TO_DEG, SPHERE_AREA_DEG2};
use qbox_core::math::asin_clamped;
use qbox_core::{Direction, GeomError, GeomResult};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Deepest supported subdivision level.
pub const MAX_LEVEL: u8 = 12;

const ANY_FLAG: u32 = 1 << 31;

/// A cell of the cube-sphere quad-tree (or the whole sphere).
///
/// `Copy` and 4 bytes: selections are plain `Vec<Qbox>`s and comparing,
/// hashing, or persisting cells is integer work. See the module docs for
/// the bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Qbox(u32);

/// One of the four in-plane step directions used by cell adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir4 {
    PlusX,
    PlusY,
    MinusX,
    MinusY,
}

impl Dir4 {
    /// All four directions, in the order adjacency scans use.
    pub const ALL: [Dir4; 4] = [Dir4::PlusX, Dir4::PlusY, Dir4::MinusX, Dir4::MinusY];

    /// The opposite step direction.
    pub fn opposite(self) -> Self {
        match self {
            Dir4::PlusX => Dir4::MinusX,
            Dir4::MinusX => Dir4::PlusX,
            Dir4::PlusY => Dir4::MinusY,
            Dir4::MinusY => Dir4::PlusY,
        }
    }

    fn index(self) -> usize {
        match self {
            Dir4::PlusX => 0,
            Dir4::PlusY => 1,
            Dir4::MinusX => 2,
            Dir4::MinusY => 3,
        }
    }
}

/// Which edge of the destination face a cross-face step enters through.
#[derive(Clone, Copy)]
enum Edge {
    IxLow,
    IxHigh,
    IyLow,
    IyHigh,
}

#[derive(Clone, Copy)]
struct Link {
    face: u8,
    edge: Edge,
    reverse: bool,
}

const fn link(face: u8, edge: Edge, reverse: bool) -> Link {
    Link {
        face,
        edge,
        reverse,
    }
}

/// Cross-face adjacency, indexed by `[Dir4][face - 1]`.
///
/// Stepping off a face edge lands on the destination face's named edge;
/// the along-edge index is kept or mirrored (`reverse`) so that shared
/// edges line up cell for cell at every level. The table is its own
/// consistency proof: stepping across any face edge and back must return
/// the starting cell, which the adjacency tests verify exhaustively.
const FACE_LINKS: [[Link; 6]; 4] = [
    // +X
    [
        link(3, Edge::IyHigh, false),
        link(4, Edge::IxLow, false),
        link(2, Edge::IxLow, false),
        link(5, Edge::IxLow, false),
        link(3, Edge::IxLow, false),
        link(3, Edge::IyLow, false),
    ],
    // +Y
    [
        link(2, Edge::IyHigh, true),
        link(1, Edge::IyHigh, true),
        link(1, Edge::IxHigh, false),
        link(1, Edge::IxLow, true),
        link(1, Edge::IyLow, false),
        link(2, Edge::IyLow, true),
    ],
    // -X
    [
        link(4, Edge::IyHigh, true),
        link(3, Edge::IxHigh, false),
        link(5, Edge::IxHigh, false),
        link(2, Edge::IxHigh, false),
        link(4, Edge::IxHigh, false),
        link(4, Edge::IyLow, true),
    ],
    // -Y
    [
        link(5, Edge::IyHigh, false),
        link(6, Edge::IyHigh, true),
        link(6, Edge::IxHigh, false),
        link(6, Edge::IxLow, true),
        link(6, Edge::IyLow, false),
        link(5, Edge::IyLow, false),
    ],
];

/// Lower planar coordinate of grid bin `i` out of `n` (uniform in atan).
fn bin_edge(i: u32, n: u32) -> f64 {
    libm::tan((i as f64 / n as f64 - 0.5) * HALF_PI)
}

/// Planar coordinate of the center of bin `i`.
fn bin_center(i: u32, n: u32) -> f64 {
    libm::tan(((i as f64 + 0.5) / n as f64 - 0.5) * HALF_PI)
}

/// Grid bin of planar coordinate `x`, clamped into 0..n.
///
/// The clamp absorbs rounding at face edges, where a projected
/// coordinate can land marginally outside (-1, 1).
fn plane_to_bin(x: f64, n: u32) -> u32 {
    let t = libm::floor((libm::atan(x) / HALF_PI + 0.5) * n as f64);
    if t < 0.0 {
        0
    } else if t >= n as f64 {
        n - 1
    } else {
        t as u32
    }
}

impl Qbox {
    /// The whole sphere (raw value 0).
    pub const SPHERE: Self = Self(0);

    /// The raw packed value.
    #[inline]
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Validates a raw value coming from storage or the wire.
    ///
    /// Accepts 0 (whole sphere) and any well-formed cell value, with or
    /// without the coverage flag.
    pub fn from_raw(value: u32) -> GeomResult<Self> {
        let v = value & !ANY_FLAG;
        if v == 0 {
            if value != 0 {
                return Err(GeomError::invalid_cell(
                    "coverage flag set on the whole-sphere value",
                ));
            }
            return Ok(Self::SPHERE);
        }
        let bitlen = 32 - v.leading_zeros();
        if bitlen < 4 || bitlen % 2 != 0 {
            return Err(GeomError::invalid_cell(&format!(
                "value {value:#x} has no valid face prefix"
            )));
        }
        let level = (bitlen - 4) / 2;
        if level > MAX_LEVEL as u32 {
            return Err(GeomError::invalid_cell(&format!(
                "value {value:#x} encodes level {level}, beyond {MAX_LEVEL}"
            )));
        }
        let face = (v >> (bitlen - 4)) & 7;
        if !(1..=6).contains(&face) {
            return Err(GeomError::invalid_cell(&format!(
                "value {value:#x} has face {face}, outside 1..=6"
            )));
        }
        Ok(Self(value))
    }

    /// Builds a cell from its face, grid indices, and level.
    ///
    /// # Panics
    ///
    /// Panics on out-of-contract arguments (face outside 1..=6, level
    /// beyond [`MAX_LEVEL`], an index outside the level's grid).
    pub fn from_parts(face: u8, ix: u32, iy: u32, level: u8) -> Self {
        assert!((1..=6).contains(&face), "face {face} outside 1..=6");
        assert!(level <= MAX_LEVEL, "level {level} beyond {MAX_LEVEL}");
        let n = 1u32 << level;
        assert!(ix < n && iy < n, "grid index ({ix},{iy}) outside {n}x{n}");
        let mut v = 8 | face as u32;
        for k in (0..level).rev() {
            let xb = (ix >> k) & 1;
            let yb = (iy >> k) & 1;
            v = (v << 2) | (xb << 1) | yb;
        }
        Self(v)
    }

    /// The cell containing a direction at the given level.
    ///
    /// The undefined-position sentinel (and any direction the cube
    /// projection rejects) maps to [`SPHERE`](Self::SPHERE).
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`MAX_LEVEL`].
    pub fn from_direction(dir: &Direction, level: u8) -> Self {
        assert!(level <= MAX_LEVEL, "level {level} beyond {MAX_LEVEL}");
        match coocube::project(dir) {
            None => Self::SPHERE,
            Some((face, px, py)) => {
                let n = 1u32 << level;
                Self::from_parts(face, plane_to_bin(px, n), plane_to_bin(py, n), level)
            }
        }
    }

    /// Whether this is the whole-sphere value.
    #[inline]
    pub fn is_sphere(&self) -> bool {
        self.0 & !ANY_FLAG == 0
    }

    /// Whether the coverage flag is set.
    #[inline]
    pub fn is_any(&self) -> bool {
        self.0 & ANY_FLAG != 0
    }

    /// This cell with the coverage flag set.
    #[inline]
    pub fn with_any(&self) -> Self {
        Self(self.0 | ANY_FLAG)
    }

    /// This cell with the coverage flag cleared (the cell's identity).
    #[inline]
    pub fn without_any(&self) -> Self {
        Self(self.0 & !ANY_FLAG)
    }

    /// Subdivision level, 0..=[`MAX_LEVEL`].
    ///
    /// # Panics
    ///
    /// Panics on the whole-sphere value, which has no level.
    pub fn level(&self) -> u8 {
        assert!(!self.is_sphere(), "whole-sphere value has no level");
        let v = self.0 & !ANY_FLAG;
        ((32 - v.leading_zeros() - 4) / 2) as u8
    }

    /// Cube face, 1..=6.
    pub fn face(&self) -> u8 {
        self.decode().0
    }

    /// Unpacks into `(face, ix, iy, level)`.
    ///
    /// # Panics
    ///
    /// Panics on the whole-sphere value.
    pub fn decode(&self) -> (u8, u32, u32, u8) {
        let level = self.level();
        let v = self.0 & !ANY_FLAG;
        let face = ((v >> (2 * level)) & 7) as u8;
        let mut ix = 0;
        let mut iy = 0;
        for k in (0..level).rev() {
            let pair = (v >> (2 * k)) & 3;
            ix = (ix << 1) | (pair >> 1);
            iy = (iy << 1) | (pair & 1);
        }
        (face, ix, iy, level)
    }

    /// The enclosing cell one level up; `None` at level 0.
    ///
    /// The coverage flag is not carried over.
    pub fn parent(&self) -> Option<Self> {
        if self.level() == 0 {
            None
        } else {
            Some(Self((self.0 & !ANY_FLAG) >> 2))
        }
    }

    /// Child `i` (0..=3) one level down; bit 1 of `i` selects the upper
    /// X half, bit 0 the upper Y half.
    ///
    /// # Panics
    ///
    /// Panics at [`MAX_LEVEL`] or for `i > 3`.
    pub fn child(&self, i: u8) -> Self {
        assert!(i < 4, "child index {i} outside 0..=3");
        assert!(
            self.level() < MAX_LEVEL,
            "cannot subdivide below level {MAX_LEVEL}"
        );
        Self(((self.0 & !ANY_FLAG) << 2) | i as u32)
    }

    /// The four children, in child-index order.
    pub fn children(&self) -> [Self; 4] {
        [self.child(0), self.child(1), self.child(2), self.child(3)]
    }

    /// Direction at the cell center.
    pub fn center(&self) -> Direction {
        let (face, ix, iy, level) = self.decode();
        let n = 1u32 << level;
        coocube::unproject(face, bin_center(ix, n), bin_center(iy, n))
    }

    /// The four corner directions, counterclockwise seen from outside
    /// the sphere, starting at the (low X, low Y) corner.
    ///
    /// Consecutive pairs (wrapping) are the cell's edges, each a
    /// great-circle arc.
    pub fn corners(&self) -> [Direction; 4] {
        let (face, ix, iy, level) = self.decode();
        let n = 1u32 << level;
        let x0 = bin_edge(ix, n);
        let x1 = bin_edge(ix + 1, n);
        let y0 = bin_edge(iy, n);
        let y1 = bin_edge(iy + 1, n);
        [
            coocube::unproject(face, x0, y0),
            coocube::unproject(face, x1, y0),
            coocube::unproject(face, x1, y1),
            coocube::unproject(face, x0, y1),
        ]
    }

    /// Exact cell area in square degrees.
    ///
    /// Closed form for the solid angle of a gnomonic rectangle; the sum
    /// over a cell's four children reproduces the cell exactly, and a
    /// full face is 2 pi / 3 steradians.
    pub fn area_deg2(&self) -> f64 {
        if self.is_sphere() {
            return SPHERE_AREA_DEG2;
        }
        fn hat(x: f64) -> f64 {
            x / libm::sqrt(1.0 + x * x)
        }
        let (_, ix, iy, level) = self.decode();
        let n = 1u32 << level;
        let (x0, x1) = (hat(bin_edge(ix, n)), hat(bin_edge(ix + 1, n)));
        let (y0, y1) = (hat(bin_edge(iy, n)), hat(bin_edge(iy + 1, n)));
        let sr = libm::asin(x1 * y1) + libm::asin(x0 * y0)
            - libm::asin(x1 * y0)
            - libm::asin(x0 * y1);
        sr * DEG2_PER_STERADIAN
    }

    /// Whether a direction falls inside this cell.
    ///
    /// The whole sphere contains every defined direction; no cell
    /// contains the undefined-position sentinel.
    pub fn contains(&self, dir: &Direction) -> bool {
        if self.is_sphere() {
            return !dir.is_none() && dir.magnitude().is_finite();
        }
        Self::from_direction(dir, self.level()) == self.without_any()
    }

    /// The edge-sharing neighbor in the given planar direction.
    ///
    /// Stays on the same face where possible, otherwise crosses to the
    /// neighboring face with the shared edge aligned cell for cell. The
    /// result never carries the coverage flag.
    ///
    /// # Panics
    ///
    /// Panics on the whole-sphere value.
    pub fn adjacent(&self, dir: Dir4) -> Self {
        let (face, ix, iy, level) = self.decode();
        let n = 1u32 << level;
        match dir {
            Dir4::PlusX if ix + 1 < n => return Self::from_parts(face, ix + 1, iy, level),
            Dir4::MinusX if ix > 0 => return Self::from_parts(face, ix - 1, iy, level),
            Dir4::PlusY if iy + 1 < n => return Self::from_parts(face, ix, iy + 1, level),
            Dir4::MinusY if iy > 0 => return Self::from_parts(face, ix, iy - 1, level),
            _ => {}
        }
        let lk = FACE_LINKS[dir.index()][(face - 1) as usize];
        let along = match dir {
            Dir4::PlusX | Dir4::MinusX => iy,
            Dir4::PlusY | Dir4::MinusY => ix,
        };
        let al = if lk.reverse { n - 1 - along } else { along };
        let (nix, niy) = match lk.edge {
            Edge::IxLow => (0, al),
            Edge::IxHigh => (n - 1, al),
            Edge::IyLow => (al, 0),
            Edge::IyHigh => (al, n - 1),
        };
        Self::from_parts(lk.face, nix, niy, level)
    }

    /// All cells touching this one: the 4 edge neighbors plus the corner
    /// neighbors, without duplicates.
    ///
    /// A corner neighbor is reached by stepping around the corner both
    /// ways; at the cube's 8 triple corners, where only three cells
    /// meet, the two ways disagree and the diagonal is dropped. Interior
    /// cells get 8 neighbors, face-corner cells 7, faces themselves 4.
    pub fn nearby(&self) -> Vec<Self> {
        let base = self.without_any();
        let mut out = Vec::with_capacity(8);
        for d in Dir4::ALL {
            let q = base.adjacent(d);
            if q != base && !out.contains(&q) {
                out.push(q);
            }
        }
        let chains = [
            (Dir4::PlusX, Dir4::PlusY),
            (Dir4::PlusY, Dir4::MinusX),
            (Dir4::MinusX, Dir4::MinusY),
            (Dir4::MinusY, Dir4::PlusX),
        ];
        for (d1, d2) in chains {
            let a = base.adjacent(d1).adjacent(d2);
            let b = base.adjacent(d2).adjacent(d1);
            if a == b && a != base && !out.contains(&a) {
                out.push(a);
            }
        }
        out
    }

    /// The containing cell and its neighbors, each with its angular
    /// distance in degrees from `dir`, nearest first.
    ///
    /// The containing cell comes back with distance 0; for the others
    /// the distance is to the nearest cell edge. Empty for the
    /// undefined-position sentinel.
    pub fn nearest_cells(dir: &Direction, level: u8) -> Vec<(Self, f64)> {
        let home = Self::from_direction(dir, level);
        if home.is_sphere() {
            return Vec::new();
        }
        let mut cells = vec![home];
        cells.extend(home.nearby());
        let mut out: Vec<(Self, f64)> = cells
            .into_iter()
            .map(|q| {
                let d = if q.contains(dir) {
                    0.0
                } else {
                    let k = q.corners();
                    let mut best = f64::MAX;
                    for i in 0..4 {
                        best = best.min(point_to_arc_deg(dir, &k[i], &k[(i + 1) % 4]));
                    }
                    best
                };
                (q, d)
            })
            .collect();
        out.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        out
    }

    /// Circumradius bound for a level: no point of any level-`level`
    /// cell is farther than this (in degrees) from the cell's center.
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`MAX_LEVEL`].
    pub fn max_radius(level: u8) -> f64 {
        assert!(level <= MAX_LEVEL, "level {level} beyond {MAX_LEVEL}");
        radius_tables().max[level as usize]
    }

    /// Inradius bound for a level: every level-`level` cell contains the
    /// cap of this radius (in degrees) around its center.
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`MAX_LEVEL`].
    pub fn min_radius(level: u8) -> f64 {
        assert!(level <= MAX_LEVEL, "level {level} beyond {MAX_LEVEL}");
        radius_tables().min[level as usize]
    }
}

struct RadiusTables {
    max: [f64; 13],
    min: [f64; 13],
}

static RADIUS_TABLES: OnceLock<RadiusTables> = OnceLock::new();

/// Per-level circumradius / inradius bounds, computed once on first use.
///
/// By cube symmetry one face is representative. For coarse levels every
/// cell is scanned; for fine ones the extremes lie on the grid's
/// symmetry lines (the circumradius peaks at the face center, the
/// inradius bottoms out at the face corner), so scanning the diagonal
/// plus the bottom, middle, and top rows covers them.
fn radius_tables() -> &'static RadiusTables {
    RADIUS_TABLES.get_or_init(|| {
        let mut max = [0.0; 13];
        let mut min = [0.0; 13];
        for level in 0..=MAX_LEVEL {
            let n = 1u32 << level;
            let mut maxr = 0.0f64;
            let mut minr = f64::MAX;
            let mut scan = |ix: u32, iy: u32| {
                let q = Qbox::from_parts(3, ix, iy, level);
                let c = q.center();
                let k = q.corners();
                for i in 0..4 {
                    maxr = maxr.max(Direction::dist_deg(&c, &k[i]));
                    let nrm = k[i].cross(&k[(i + 1) % 4]).normalize();
                    minr = minr.min(asin_clamped(libm::fabs(nrm.dot(&c))) * RAD_TO_DEG);
                }
            };
            if level <= 6 {
                for ix in 0..n {
                    for iy in 0..n {
                        scan(ix, iy);
                    }
                }
            } else {
                for i in 0..n {
                    scan(i, i);
                    scan(i, 0);
                    scan(i, n / 2);
                    scan(i, n - 1);
                }
            }
            max[level as usize] = maxr;
            min[level as usize] = minr;
        }
        RadiusTables { max, min }
    })
}

impl fmt::Display for Qbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sphere() {
            return write!(f, "*");
        }
        let (face, _, _, level) = self.decode();
        write!(f, "{face}")?;
        if level > 0 {
            write!(f, ":")?;
            let v = self.0 & !ANY_FLAG;
            for k in (0..level).rev() {
                write!(f, "{}", (v >> (2 * k)) & 3)?;
            }
        }
        if self.is_any() {
            write!(f, "A")?;
        }
        Ok(())
    }
}

impl FromStr for Qbox {
    type Err = GeomError;

    fn from_str(s: &str) -> GeomResult<Self> {
        let t = s.trim();
        if t == "*" {
            return Ok(Self::SPHERE);
        }
        let (t, any) = match t.strip_suffix('A') {
            Some(rest) => (rest, true),
            None => (t, false),
        };
        let (face_part, path_part) = match t.split_once(':') {
            Some((fp, pp)) => (fp, Some(pp)),
            None => (t, None),
        };
        let face: u32 = face_part
            .parse()
            .map_err(|_| GeomError::invalid_cell(&format!("cell code {s:?}: bad face number")))?;
        if !(1..=6).contains(&face) {
            return Err(GeomError::invalid_cell(&format!(
                "cell code {s:?}: face {face} outside 1..=6"
            )));
        }
        let mut v = 8 | face;
        if let Some(path) = path_part {
            if path.is_empty() || path.len() > MAX_LEVEL as usize {
                return Err(GeomError::invalid_cell(&format!(
                    "cell code {s:?}: path must be 1..={MAX_LEVEL} digits"
                )));
            }
            for ch in path.chars() {
                let d = ch.to_digit(4).ok_or_else(|| {
                    GeomError::invalid_cell(&format!("cell code {s:?}: digit {ch:?} not in 0..=3"))
                })?;
                v = (v << 2) | d;
            }
        }
        let q = Self(v);
        Ok(if any { q.with_any() } else { q })
    }
}
