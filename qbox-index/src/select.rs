//! Region-driven tree descent.
//!
//! [`select`] walks the cell quad-tree against a [`Region`] and lazily
//! yields the cells of the selection, coarsest first within each face.
//! The classification verdict drives the walk:
//!
//! - `Disjoint` cells are pruned with their whole subtree;
//! - `Includes` cells (entirely inside the region) are yielded
//!   immediately with the "any" flag set, covering their subtree in one
//!   value;
//! - everything else is subdivided until `max_level`, where the
//!   straddling cells are yielded unflagged.
//!
//! Consumers filtering a catalog can therefore take every record under
//! a flagged cell without further geometry, and only run the exact
//! point test inside the unflagged boundary cells.
//!
//! ```
//! use qbox_core::Direction;
//! use qbox_index::{select, Region};
//!
//! let region = Region::zone(20.0, 30.0, -5.0, 5.0).unwrap();
//! let total: f64 = select(&region, 5).map(|c| c.area_deg2()).sum();
//! // The selection covers the zone (with slack at the boundary).
//! assert!(total >= region.area_deg2());
//! ```

use crate::qbox::{Qbox, MAX_LEVEL};
use crate::region::{Region, Status};

/// Starts a selection of cells overlapping `region`, subdividing down
/// to `max_level`.
///
/// # Panics
///
/// Panics if `max_level` exceeds [`MAX_LEVEL`].
pub fn select(region: &Region, max_level: u8) -> QboxSelector {
    QboxSelector::new(region, max_level)
}

/// Lazy iterator over the cells of a region selection.
///
/// Holds a work stack of pending cells; each `next` call pops and
/// classifies until it can yield, so fully disjoint subtrees cost one
/// classification each and nothing is materialized up front.
#[derive(Debug, Clone)]
pub struct QboxSelector {
    region: Region,
    max_level: u8,
    stack: Vec<Qbox>,
}

impl QboxSelector {
    /// See [`select`].
    pub fn new(region: &Region, max_level: u8) -> Self {
        assert!(
            max_level <= MAX_LEVEL,
            "selection level {max_level} beyond {MAX_LEVEL}"
        );
        // Seed with the 6 faces, reversed so face 1 is popped first.
        let stack = (1..=6u8)
            .rev()
            .map(|face| Qbox::from_parts(face, 0, 0, 0))
            .collect();
        Self {
            region: region.clone(),
            max_level,
            stack,
        }
    }
}

impl Iterator for QboxSelector {
    type Item = Qbox;

    fn next(&mut self) -> Option<Qbox> {
        while let Some(cell) = self.stack.pop() {
            match self.region.classify_qbox(cell) {
                Status::Disjoint => continue,
                Status::Includes => return Some(cell.with_any()),
                Status::Intersects | Status::IsPartOf => {
                    if cell.level() >= self.max_level {
                        return Some(cell);
                    }
                    let kids = cell.children();
                    for i in (0..4).rev() {
                        self.stack.push(kids[i]);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbox_core::constants::SPHERE_AREA_DEG2;
    use qbox_core::Direction;

    #[test]
    fn test_level_zero_yields_faces() {
        // A region is never disjoint from every face, and at level 0 no
        // subdivision happens.
        let region = Region::circle(Direction::from_angles(0.0, 0.0), 5.0).unwrap();
        let cells: Vec<Qbox> = select(&region, 0).collect();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].without_any().face(), 3);
    }

    #[test]
    fn test_whole_sphere_circle_selects_all_faces_flagged() {
        let region = Region::circle(Direction::from_angles(0.0, 0.0), 180.0).unwrap();
        let cells: Vec<Qbox> = select(&region, 4).collect();
        assert_eq!(cells.len(), 6);
        assert!(cells.iter().all(|c| c.is_any() && c.level() == 0));
    }

    #[test]
    fn test_selection_covers_region() {
        let region = Region::circle(Direction::from_angles(83.6, -5.4), 2.0).unwrap();
        let total: f64 = select(&region, 7).map(|c| c.area_deg2()).sum();
        assert!(total >= region.area_deg2());
        // At level 7 the boundary slack stays moderate.
        assert!(total < 4.0 * region.area_deg2(), "{total}");
    }

    #[test]
    fn test_flagged_cells_lie_inside() {
        let center = Direction::from_angles(200.0, 40.0);
        let region = Region::circle(center, 3.0).unwrap();
        for cell in select(&region, 8) {
            if cell.is_any() {
                let plain = cell.without_any();
                assert!(region.contains(&plain.center()), "{plain}");
                for c in plain.corners() {
                    assert!(region.contains(&c), "{plain} corner outside");
                }
            }
        }
    }

    #[test]
    fn test_no_selected_cell_is_disjoint() {
        let region = Region::zone(350.0, 20.0, -10.0, 10.0).unwrap();
        for cell in select(&region, 6) {
            assert_ne!(region.classify_qbox(cell.without_any()), Status::Disjoint);
        }
    }

    #[test]
    fn test_in_region_points_are_covered() {
        let region =
            Region::box_region(Direction::from_angles(120.0, -30.0), 6.0, 3.0, 25.0).unwrap();
        let cells: Vec<Qbox> = select(&region, 7).map(|c| c.without_any()).collect();
        for dlon in [-2.5, 0.0, 2.5] {
            for dlat in [-1.2, 0.0, 1.2] {
                let p = Direction::from_angles(120.0 + dlon, -30.0 + dlat);
                if region.contains(&p) {
                    assert!(
                        cells.iter().any(|c| c.contains(&p)),
                        "({dlon},{dlat}) uncovered"
                    );
                }
            }
        }
    }

    #[test]
    fn test_selector_is_restartable() {
        let region = Region::circle(Direction::from_angles(10.0, 10.0), 4.0).unwrap();
        let sel = select(&region, 5);
        let a: Vec<Qbox> = sel.clone().collect();
        let b: Vec<Qbox> = sel.collect();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_small_region_coarse_level() {
        // A tiny ellipse at a coarse level: exactly one unflagged cell.
        let region =
            Region::ellipse(Direction::from_angles(45.0, 45.0), 0.5, 0.2, 10.0).unwrap();
        let cells: Vec<Qbox> = select(&region, 3).collect();
        assert_eq!(cells.len(), 1);
        assert!(!cells[0].is_any());
        assert_eq!(region.classify_qbox(cells[0]), Status::IsPartOf);
    }

    #[test]
    fn test_total_sphere_area_partition() {
        // Selecting with a hemisphere cap: flagged + boundary cells
        // cover at least half the sphere.
        let region = Region::circle(Direction::from_angles(0.0, 90.0), 90.0).unwrap();
        let total: f64 = select(&region, 4).map(|c| c.area_deg2()).sum();
        assert!(total >= SPHERE_AREA_DEG2 / 2.0 - 1e-6);
        assert!(total <= SPHERE_AREA_DEG2);
    }

    #[test]
    #[should_panic]
    fn test_level_beyond_max_panics() {
        let region = Region::circle(Direction::from_angles(0.0, 0.0), 1.0).unwrap();
        let _ = select(&region, 13);
    }
}
