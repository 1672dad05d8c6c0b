//! "Topographic-mix" kernel: blends compaction and neighbour-alignment
//! scoring, weighted differently for big and small items, with a special
//! case for wipe towers. Used by default for rectangle and irregular beds.

use rstar::{RTree, RTreeObject, AABB};

use crate::bed::Bed;
use crate::geometry::{BoundingBox, Point};
use crate::item::Item;
use crate::kernel::Kernel;
use crate::packing_context::PackingContext;

/// Envelope area, as a fraction of bed area, above which an item counts as
/// "big" for the purposes of R*-tree membership and scoring case selection.
const BIG_ITEM_THRESHOLD: f64 = 0.02;

const WEIGHT_BIG_COMPACTION: f64 = 0.6;
const WEIGHT_BIG_ALIGNMENT: f64 = 0.1;
const WEIGHT_REMAINING_COMPACTION: f64 = 0.3;
const WEIGHT_REMAINING_ALIGNMENT: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
struct EnvelopeLeaf {
    bb: BoundingBox,
    /// The placed item's true polygon area (mm^2), not its bbox area; used
    /// to restrict alignment-neighbour lookups to similarly-sized pieces.
    area: f64,
}

impl RTreeObject for EnvelopeLeaf {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [
                crate::geometry::to_mm(self.bb.min.x),
                crate::geometry::to_mm(self.bb.min.y),
            ],
            [
                crate::geometry::to_mm(self.bb.max.x),
                crate::geometry::to_mm(self.bb.max.y),
            ],
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct TmKernel {
    big_tree: RTree<EnvelopeLeaf>,
    all_tree: RTree<EnvelopeLeaf>,
    /// Bounding box of every placed item's envelope, used as the pile
    /// centre for compaction scoring.
    pile_bbox: Option<BoundingBox>,
    /// Bounding box of only the "big" placed items.
    big_bbox: Option<BoundingBox>,
    bed_area: f64,
    remaining: usize,
    /// Total item count observed on the first `on_start_packing` call of
    /// this kernel's lifetime (a kernel is constructed fresh per task), so
    /// `remaining / initial_total` shrinks monotonically toward 0.
    initial_total: Option<usize>,
}

impl TmKernel {
    pub fn new() -> Self {
        Self::default()
    }

    fn merged_bbox(a: BoundingBox, b: BoundingBox) -> BoundingBox {
        BoundingBox::new(
            Point::new(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
            Point::new(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
        )
    }

    /// Best (lowest) alignment score among `tree`'s members that overlap
    /// `item_bb` and whose true polygon area nearly equals `item_area`: how
    /// well the candidate placement lines up with a same-sized neighbour,
    /// 1.0 when there is no such neighbour, close to 0 when merging their
    /// bboxes wastes little extra area. Only one neighbour needs to align
    /// well, so the minimum (best) score wins.
    fn alignment_score(tree: &RTree<EnvelopeLeaf>, item_bb: BoundingBox, item_area: f64) -> f64 {
        if item_area <= 0.0 {
            return 1.0;
        }
        let query = AABB::from_corners(
            [
                crate::geometry::to_mm(item_bb.min.x),
                crate::geometry::to_mm(item_bb.min.y),
            ],
            [
                crate::geometry::to_mm(item_bb.max.x),
                crate::geometry::to_mm(item_bb.max.y),
            ],
        );
        let own_area = item_bb.area() as f64;
        let mut best = 1.0;
        for neighbour in tree.locate_in_envelope_intersecting(&query) {
            if (1.0 - neighbour.area / item_area).abs() >= 1.0e-6 {
                continue;
            }
            let merged = Self::merged_bbox(item_bb, neighbour.bb);
            let merged_area = merged.area() as f64;
            if merged_area <= 0.0 {
                continue;
            }
            let neighbour_bbox_area = neighbour.bb.area() as f64;
            let score = 1.0 - (own_area + neighbour_bbox_area) / merged_area;
            if score < best {
                best = score;
            }
        }
        best
    }

    /// Linear, bed-size-normalized distance between two points.
    fn normalized_distance(center: Point, target: Point, bed_area: f64) -> f64 {
        if bed_area <= 0.0 {
            return 0.0;
        }
        center.dist(target) / bed_area.sqrt()
    }
}

impl Kernel for TmKernel {
    fn placement_fitness(&self, item: &Item, translation: Point, context: &PackingContext) -> f64 {
        let _ = context;
        let mut probe = item.clone();
        probe.set_translation(translation);
        let Some(bb) = probe.transformed_bbox() else {
            return f64::NEG_INFINITY;
        };
        let center = bb.center();

        if probe.is_wipe_tower() {
            let sink = probe.data.sink.unwrap_or(center);
            return -(probe.envelope_centroid().dist_sq(sink) as f64);
        }

        let pile_center = self.pile_bbox.map(|bb| bb.center()).unwrap_or(center);

        let item_area = probe.fixed_area();
        let item_area_ratio = if self.bed_area > 0.0 {
            item_area / self.bed_area
        } else {
            0.0
        };

        let is_big = item_area_ratio > BIG_ITEM_THRESHOLD || self.all_tree.size() == 0;

        if is_big {
            let dist = Self::normalized_distance(center, pile_center, self.bed_area);
            let align = Self::alignment_score(&self.big_tree, bb, item_area);
            let total = self.initial_total.unwrap_or(1).max(1) as f64;
            let r = (self.remaining as f64 / total).cbrt();
            -(WEIGHT_BIG_COMPACTION * dist
                + WEIGHT_BIG_ALIGNMENT * align
                + (1.0 - r) * (WEIGHT_REMAINING_COMPACTION * dist)
                + r * (WEIGHT_REMAINING_ALIGNMENT * align))
        } else {
            let big_center = self.big_bbox.map(|bb| bb.center()).unwrap_or(pile_center);
            -Self::normalized_distance(center, big_center, self.bed_area)
        }
    }

    fn on_start_packing(
        &mut self,
        _item: &mut Item,
        bed: &Bed,
        context: &PackingContext,
        remaining: &[Item],
    ) -> bool {
        self.bed_area = bed.area();
        self.remaining = remaining.len();
        if self.initial_total.is_none() {
            self.initial_total = Some(remaining.len() + 1);
        }

        let mut all_leaves = Vec::new();
        let mut big_leaves = Vec::new();
        self.pile_bbox = None;
        self.big_bbox = None;
        for placed in context.all_items() {
            let Some(bb) = placed.transformed_bbox() else {
                continue;
            };
            let area = placed.fixed_area();
            let leaf = EnvelopeLeaf { bb, area };
            self.pile_bbox = Some(match self.pile_bbox {
                Some(acc) => Self::merged_bbox(acc, bb),
                None => bb,
            });
            let ratio = if self.bed_area > 0.0 { area / self.bed_area } else { 0.0 };
            if ratio > BIG_ITEM_THRESHOLD {
                self.big_bbox = Some(match self.big_bbox {
                    Some(acc) => Self::merged_bbox(acc, bb),
                    None => bb,
                });
                big_leaves.push(leaf);
            }
            all_leaves.push(leaf);
        }
        self.all_tree = RTree::bulk_load(all_leaves);
        self.big_tree = RTree::bulk_load(big_leaves);
        false
    }
}
