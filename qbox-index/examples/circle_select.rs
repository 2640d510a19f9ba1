//! Cone-search selection demo: pick a center and radius, list the
//! cells a catalog query would scan.
//!
//! ```text
//! cargo run --example circle_select -- 83.6 -5.4 2.0 7
//! ```

use qbox_core::Direction;
use qbox_index::{select, Region};

fn main() {
    let mut args = std::env::args().skip(1);
    let lon: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(83.6);
    let lat: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(-5.4);
    let radius: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(2.0);
    let level: u8 = args.next().and_then(|s| s.parse().ok()).unwrap_or(7);

    let center = Direction::from_angles(lon, lat);
    let region = match Region::circle(center, radius) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("bad region: {e}");
            std::process::exit(1);
        }
    };

    println!("selecting {region} down to level {level}");
    let mut full = 0usize;
    let mut partial = 0usize;
    let mut covered = 0.0f64;
    for cell in select(&region, level) {
        let tag = if cell.is_any() { "full" } else { "edge" };
        println!("  {tag}  {cell}  ({:.4} deg2)", cell.area_deg2());
        if cell.is_any() {
            full += 1;
        } else {
            partial += 1;
        }
        covered += cell.area_deg2();
    }
    println!(
        "{full} interior cells, {partial} boundary cells; \
         coverage {covered:.3} deg2 for a region of {:.3} deg2",
        region.area_deg2()
    );
}
