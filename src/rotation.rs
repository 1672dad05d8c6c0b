//! Rotation pre-enrichment: before arranging, stamp each item with a small
//! recommended rotation set so the pack strategy does not have to search
//! the full circle.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::bed::Bed;
use crate::geometry::{BoundingBox, Polygon};
use crate::item::Item;

/// The rotation (radians) at which the polygon's axis-aligned bounding box
/// has the smallest area, found via rotating calipers: the minimal
/// enclosing rectangle always has one side flush with a convex hull edge.
pub fn min_area_bbox_rotation(hull: &Polygon) -> f64 {
    let n = hull.points.len();
    if n < 2 {
        return 0.0;
    }
    let mut best_angle = 0.0;
    let mut best_area = f64::INFINITY;
    for i in 0..n {
        let a = hull.points[i];
        let b = hull.points[(i + 1) % n];
        let edge_angle = ((b.y - a.y) as f64).atan2((b.x - a.x) as f64);
        let rotated = hull.rotated(-edge_angle);
        let Some(bb) = rotated.bounding_box() else {
            continue;
        };
        let area = bb.width() as f64 * bb.height() as f64;
        if area < best_area {
            best_area = area;
            best_angle = -edge_angle;
        }
    }
    best_angle
}

/// A rotation that would let an oversized item fit a rectangle bed, if one
/// exists among the axis-swapping candidates.
fn fitting_rotation(hull: &Polygon, bed_bb: BoundingBox) -> Option<f64> {
    let item_bb = hull.bounding_box()?;
    if item_bb.width() <= bed_bb.width() && item_bb.height() <= bed_bb.height() {
        return None;
    }
    let rotated_bb = hull.rotated(FRAC_PI_2).bounding_box()?;
    if rotated_bb.width() <= bed_bb.width() && rotated_bb.height() <= bed_bb.height() {
        Some(FRAC_PI_2)
    } else {
        None
    }
}

/// Populates `item.data.recommended_rotations`. Wipe towers are excluded:
/// they are expected to stay at a fixed orientation chosen by the host.
pub fn enrich(item: &mut Item, bed: &Bed) {
    if item.is_wipe_tower() {
        return;
    }
    let hull = item.fixed_outline().contour.convex_hull();
    let base = min_area_bbox_rotation(&hull);

    let mut candidates = vec![
        base,
        base + FRAC_PI_4,
        base + FRAC_PI_2,
        base + 3.0 * FRAC_PI_4,
        base + PI,
    ];
    if base.abs() > 1.0e-9 {
        candidates.push(0.0);
    }
    if let Bed::Rectangle(bb) = bed {
        if let Some(angle) = fitting_rotation(&hull, *bb) {
            candidates.push(angle);
        }
    }
    item.data.recommended_rotations = candidates;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{to_scaled, Point};

    #[test]
    fn min_area_rotation_of_axis_aligned_square_is_zero_mod_90() {
        let s = to_scaled(10.0);
        let square = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(s, 0),
            Point::new(s, s),
            Point::new(0, s),
        ]);
        let angle = min_area_bbox_rotation(&square);
        let normalized = angle.rem_euclid(FRAC_PI_2);
        assert!(normalized < 1e-6 || (FRAC_PI_2 - normalized) < 1e-6);
    }

    #[test]
    fn min_area_rotation_of_a_rotated_rectangle_undoes_its_rotation_mod_90() {
        let s = to_scaled(10.0);
        let rect = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(s * 2, 0),
            Point::new(s * 2, s),
            Point::new(0, s),
        ]);
        for phi_deg in [10.0, 37.0, 63.0, 88.0] {
            let phi = phi_deg * std::f64::consts::PI / 180.0;
            let rotated = rect.rotated(phi);
            let angle = min_area_bbox_rotation(&rotated);
            let sum = (angle + phi).rem_euclid(FRAC_PI_2);
            assert!(
                sum < 1e-3 || (FRAC_PI_2 - sum) < 1e-3,
                "phi={phi_deg} angle={angle} sum={sum}"
            );
        }
    }
}
