//! Wraps another kernel so it arranges on an unbounded bed (avoiding the
//! cost of a hard rectangle constraint inside the optimizer) while still
//! being pushed toward a target rectangle by a quadratic miss penalty.
//! Only used when the real bed has no fixed items yet — with fixed items
//! present the caller should arrange directly on the real, bounded bed.

use crate::bed::Bed;
use crate::geometry::{BoundingBox, Point};
use crate::item::Item;
use crate::kernel::Kernel;
use crate::packing_context::PackingContext;

#[derive(Debug, Clone)]
pub struct RectangleOverfitKernel<K> {
    inner: K,
    target: BoundingBox,
}

impl<K: Kernel> RectangleOverfitKernel<K> {
    pub fn new(inner: K, target: BoundingBox) -> Self {
        Self { inner, target }
    }

    pub fn into_inner(self) -> K {
        self.inner
    }

    fn miss(&self, pile_bbox: BoundingBox) -> f64 {
        let over_x = (pile_bbox.width() - self.target.width()).max(0) as f64;
        let over_y = (pile_bbox.height() - self.target.height()).max(0) as f64;
        let miss = over_x.max(over_y);
        miss * miss
    }

    /// Translates every packed item in `context` so the pile's bounding box
    /// is centred inside the target rectangle. Called once, by the caller,
    /// after the last item for this bed has been committed — the original
    /// engine performs the equivalent alignment in a context destructor;
    /// here it is an explicit step so there is no hidden control flow.
    pub fn align_pile(&self, context: &mut PackingContext) {
        let Some(mut pile_bbox) = context.packed.first().and_then(Item::transformed_bbox) else {
            return;
        };
        for item in &context.packed {
            if let Some(bb) = item.transformed_bbox() {
                pile_bbox = BoundingBox::new(
                    Point::new(pile_bbox.min.x.min(bb.min.x), pile_bbox.min.y.min(bb.min.y)),
                    Point::new(pile_bbox.max.x.max(bb.max.x), pile_bbox.max.y.max(bb.max.y)),
                );
            }
        }
        let target_center = self.target.center();
        let pile_center = pile_bbox.center();
        let dx = target_center.x - pile_center.x;
        let dy = target_center.y - pile_center.y;
        for item in &mut context.packed {
            let t = item.pose.translation;
            item.set_translation(Point::new(t.x + dx, t.y + dy));
        }
    }
}

impl<K: Kernel> Kernel for RectangleOverfitKernel<K> {
    fn placement_fitness(&self, item: &Item, translation: Point, context: &PackingContext) -> f64 {
        let base = self.inner.placement_fitness(item, translation, context);
        let mut probe = item.clone();
        probe.set_translation(translation);
        let Some(mut pile_bbox) = probe.transformed_bbox() else {
            return base;
        };
        for placed in context.all_items() {
            if let Some(bb) = placed.transformed_bbox() {
                pile_bbox = BoundingBox::new(
                    Point::new(pile_bbox.min.x.min(bb.min.x), pile_bbox.min.y.min(bb.min.y)),
                    Point::new(pile_bbox.max.x.max(bb.max.x), pile_bbox.max.y.max(bb.max.y)),
                );
            }
        }
        base - self.miss(pile_bbox)
    }

    fn on_start_packing(
        &mut self,
        item: &mut Item,
        _bed: &Bed,
        context: &PackingContext,
        remaining: &[Item],
    ) -> bool {
        self.inner.on_start_packing(item, &Bed::Infinite, context, remaining)
    }

    fn on_item_packed(&mut self, item: &mut Item, bed: &Bed, context: &PackingContext) -> bool {
        self.inner.on_item_packed(item, bed, context)
    }
}
