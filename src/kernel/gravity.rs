//! Pulls items toward a sink point. The simplest kernel, used by default
//! for circular beds and whenever the host forces `pull_to_center`.

use crate::bed::Bed;
use crate::geometry::Point;
use crate::item::Item;
use crate::kernel::Kernel;
use crate::packing_context::PackingContext;

#[derive(Debug, Clone, Default)]
pub struct GravityKernel;

impl GravityKernel {
    pub fn new() -> Self {
        Self
    }

    fn sink_for(item: &Item, bed: &Bed) -> Point {
        item.data.sink.unwrap_or_else(|| bed.bounding_box().center())
    }
}

impl Kernel for GravityKernel {
    fn placement_fitness(&self, item: &Item, translation: Point, context: &PackingContext) -> f64 {
        let _ = context;
        let mut probe = item.clone();
        probe.set_translation(translation);
        let sink = probe.data.sink.unwrap_or(translation);
        -(probe.envelope_centroid().dist_sq(sink) as f64)
    }

    fn on_start_packing(
        &mut self,
        item: &mut Item,
        bed: &Bed,
        context: &PackingContext,
        _remaining: &[Item],
    ) -> bool {
        if !context.is_empty() {
            return false;
        }
        let sink = Self::sink_for(item, bed);
        let centroid_offset = {
            let at_origin_centroid = item.centroid();
            Point::new(
                sink.x - (at_origin_centroid.x - item.pose.translation.x),
                sink.y - (at_origin_centroid.y - item.pose.translation.y),
            )
        };
        item.set_translation(centroid_offset);
        let bb = item.transformed_bbox();
        match bb {
            Some(bb) => bed.bounding_box().contains_point(bb.min) && bed.bounding_box().contains_point(bb.max),
            None => false,
        }
    }
}
