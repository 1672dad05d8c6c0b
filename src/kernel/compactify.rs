//! Wraps no inner kernel: scores purely by how little convex-hull area the
//! union of all placed envelopes would grow to.

use crate::bed::Bed;
use crate::geometry::{ExPolygon, Point, PolygonSet};
use crate::item::Item;
use crate::kernel::Kernel;
use crate::packing_context::PackingContext;

#[derive(Debug, Clone, Default)]
pub struct CompactifyKernel {
    merged_pile: PolygonSet,
}

impl CompactifyKernel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Kernel for CompactifyKernel {
    fn placement_fitness(&self, item: &Item, translation: Point, _context: &PackingContext) -> f64 {
        let mut probe = item.clone();
        probe.set_translation(translation);
        let mut pile = self.merged_pile.clone();
        pile.polygons.push(probe.transformed_outline());
        -pile.convex_hull_area()
    }

    fn on_start_packing(
        &mut self,
        _item: &mut Item,
        _bed: &Bed,
        context: &PackingContext,
        _remaining: &[Item],
    ) -> bool {
        let mut pieces: Vec<ExPolygon> = context
            .all_items()
            .map(Item::transformed_outline)
            .collect();
        let mut union = PolygonSet::default();
        for piece in pieces.drain(..) {
            union = union.union(&PolygonSet::new(vec![piece]));
        }
        self.merged_pile = union;
        false
    }
}
