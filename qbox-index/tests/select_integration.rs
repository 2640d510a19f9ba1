//! End-to-end selection checks across all region shapes.
//!
//! These walk the public API the way a catalog server would: build a
//! region, run the tree descent, and verify the yielded cells against
//! independent point sampling.

use qbox_core::Direction;
use qbox_index::{select, Qbox, Region, Status};

/// Sample points on a small lon/lat grid around a center.
fn grid(lon: f64, lat: f64, reach: f64, steps: i32) -> Vec<Direction> {
    let mut out = Vec::new();
    for i in -steps..=steps {
        for j in -steps..=steps {
            let f = f64::from(i) / f64::from(steps);
            let g = f64::from(j) / f64::from(steps);
            out.push(Direction::from_angles(lon + f * reach, lat + g * reach));
        }
    }
    out
}

fn shapes() -> Vec<(Region, f64, f64, f64)> {
    // (region, probe-grid lon, lat, reach)
    vec![
        (
            Region::circle(Direction::from_angles(83.6, -5.4), 2.5).unwrap(),
            83.6,
            -5.4,
            4.0,
        ),
        (
            Region::box_region(Direction::from_angles(210.0, 35.0), 5.0, 2.0, 30.0).unwrap(),
            210.0,
            35.0,
            4.0,
        ),
        (
            Region::ellipse(Direction::from_angles(10.0, -60.0), 3.0, 1.0, 75.0).unwrap(),
            10.0,
            -60.0,
            4.0,
        ),
        (
            Region::zone(355.0, 5.0, -3.0, 3.0).unwrap(),
            0.0,
            0.0,
            6.0,
        ),
    ]
}

#[test]
fn selected_cells_are_never_disjoint() {
    for (region, _, _, _) in shapes() {
        for cell in select(&region, 6) {
            assert_ne!(
                region.classify_qbox(cell.without_any()),
                Status::Disjoint,
                "{region} yielded a disjoint cell {cell}"
            );
        }
    }
}

#[test]
fn flagged_cells_are_entirely_inside() {
    for (region, _, _, _) in shapes() {
        for cell in select(&region, 7) {
            if !cell.is_any() {
                continue;
            }
            let plain = cell.without_any();
            assert!(region.contains(&plain.center()), "{region} / {plain}");
            for corner in plain.corners() {
                assert!(region.contains(&corner), "{region} / {plain}");
            }
        }
    }
}

#[test]
fn every_in_region_point_falls_in_a_selected_cell() {
    for (region, lon, lat, reach) in shapes() {
        let cells: Vec<Qbox> = select(&region, 7).map(|c| c.without_any()).collect();
        for p in grid(lon, lat, reach, 8) {
            if !region.contains(&p) {
                continue;
            }
            assert!(
                cells.iter().any(|c| c.contains(&p)),
                "{region} misses {p}"
            );
        }
    }
}

#[test]
fn out_of_region_points_avoid_flagged_cells() {
    for (region, lon, lat, reach) in shapes() {
        let flagged: Vec<Qbox> = select(&region, 7)
            .filter(|c| c.is_any())
            .map(|c| c.without_any())
            .collect();
        for p in grid(lon, lat, reach, 8) {
            if region.contains(&p) {
                continue;
            }
            assert!(
                !flagged.iter().any(|c| c.contains(&p)),
                "{region}: outside point {p} in a flagged cell"
            );
        }
    }
}

#[test]
fn coverage_area_bounds_the_region_area() {
    for (region, _, _, _) in shapes() {
        let total: f64 = select(&region, 8).map(|c| c.area_deg2()).sum();
        assert!(
            total >= region.area_deg2(),
            "{region}: coverage {total} below region area {}",
            region.area_deg2()
        );
        // Fine levels keep the boundary slack well under one region
        // area for these shapes.
        assert!(
            total <= 2.0 * region.area_deg2(),
            "{region}: coverage {total} too loose for area {}",
            region.area_deg2()
        );
    }
}

#[test]
fn deeper_levels_tighten_the_coverage() {
    let region = Region::circle(Direction::from_angles(120.0, 20.0), 4.0).unwrap();
    let mut prev = f64::MAX;
    for level in [3u8, 5, 7, 9] {
        let total: f64 = select(&region, level).map(|c| c.area_deg2()).sum();
        assert!(
            total <= prev + 1e-9,
            "coverage grew from {prev} to {total} at level {level}"
        );
        prev = total;
    }
    assert!(prev >= region.area_deg2());
}

#[test]
fn selection_respects_the_any_flag_contract() {
    // Every yielded cell is either flagged (entirely inside) or a
    // boundary cell at exactly the requested level.
    let region = Region::ellipse(Direction::from_angles(300.0, 48.0), 2.0, 1.2, 140.0).unwrap();
    for cell in select(&region, 6) {
        if cell.is_any() {
            assert_eq!(
                region.classify_qbox(cell.without_any()),
                Status::Includes
            );
        } else {
            assert_eq!(cell.level(), 6, "unflagged cell {cell} above max level");
        }
    }
}
