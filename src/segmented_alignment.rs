//! Segmented-bed post-processing: after packing, shift each bed's pile by
//! whole segments toward the configured pivot corner.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::bed::{SegmentedRectangle, XlAlignment};
use crate::geometry::{BoundingBox, Point};
use crate::item::Item;

const RANDOM_CHOICES: [XlAlignment; 5] = [
    XlAlignment::Center,
    XlAlignment::FrontLeft,
    XlAlignment::FrontRight,
    XlAlignment::RearLeft,
    XlAlignment::RearRight,
];

/// Shifts every item on `bed_index` so its merged pile sits flush against
/// `seg.pivot`'s corner, snapped to whole segment multiples. Per the
/// source's documented (if unexplained) behaviour, a bed is skipped
/// entirely — not just the wipe tower left in place, the whole pile — the
/// moment any item on it is a wipe tower.
pub fn align_bed(seg: &SegmentedRectangle, bed_index: i32, items: &mut [Item], seed: u64) {
    let on_bed: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, it)| it.bed_index == bed_index)
        .map(|(i, _)| i)
        .collect();
    if on_bed.is_empty() || on_bed.iter().any(|&i| items[i].is_wipe_tower()) {
        return;
    }

    let Some(pile_bbox) = on_bed
        .iter()
        .filter_map(|&i| items[i].transformed_bbox())
        .reduce(merge)
    else {
        return;
    };

    let cell_w = seg.cell_width().max(1);
    let cell_h = seg.cell_height().max(1);
    let segs_wide = (pile_bbox.width() as f64 / cell_w as f64).ceil().max(1.0) as i64;
    let segs_tall = (pile_bbox.height() as f64 / cell_h as f64).ceil().max(1.0) as i64;
    let target_w = segs_wide * cell_w;
    let target_h = segs_tall * cell_h;

    let pivot = resolve_pivot(seg.pivot, seed ^ (bed_index as u64));
    let (target_x, target_y) = pivot_origin(pivot, seg.bb, target_w, target_h);

    let dx = target_x - pile_bbox.min.x;
    let dy = target_y - pile_bbox.min.y;
    if dx == 0 && dy == 0 {
        return;
    }
    for &i in &on_bed {
        let p = items[i].pose.translation;
        items[i].set_translation(Point::new(p.x + dx, p.y + dy));
    }
}

fn merge(a: BoundingBox, b: BoundingBox) -> BoundingBox {
    BoundingBox::new(
        Point::new(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
        Point::new(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
    )
}

fn resolve_pivot(pivot: XlAlignment, seed: u64) -> XlAlignment {
    if pivot != XlAlignment::Random {
        return pivot;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    RANDOM_CHOICES[rng.gen_range(0..RANDOM_CHOICES.len())]
}

fn pivot_origin(pivot: XlAlignment, bb: BoundingBox, w: i64, h: i64) -> (i64, i64) {
    match pivot {
        XlAlignment::FrontLeft => (bb.min.x, bb.min.y),
        XlAlignment::FrontRight => (bb.max.x - w, bb.min.y),
        XlAlignment::RearLeft => (bb.min.x, bb.max.y - h),
        XlAlignment::RearRight => (bb.max.x - w, bb.max.y - h),
        XlAlignment::Center => (
            bb.min.x + (bb.width() - w) / 2,
            bb.min.y + (bb.height() - h) / 2,
        ),
        XlAlignment::Random => unreachable!("resolved above"),
    }
}
