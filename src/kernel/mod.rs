//! Pluggable placement kernels: the scoring and pre/post-placement hooks
//! the pack strategy calls into for every candidate translation.

pub mod compactify;
pub mod gravity;
pub mod rectangle_overfit;
#[cfg(feature = "svg-debug")]
pub mod svg_debug;
pub mod tm;

use crate::bed::Bed;
use crate::geometry::{Point, PolygonSet};
use crate::item::Item;
use crate::packing_context::PackingContext;

/// A placement kernel: decides how good a candidate translation is, and
/// gets a few hooks around the rest of the placement lifecycle.
pub trait Kernel {
    /// Higher is better. Called once per candidate translation while the
    /// optimizer samples the feasible region.
    fn placement_fitness(&self, item: &Item, translation: Point, context: &PackingContext) -> f64;

    /// Called before the pack strategy tries any rotation/NFP sampling for
    /// `item`. Returning `true` means the kernel placed the item itself
    /// (e.g., centered it on a sink) and the caller should skip NFP
    /// sampling entirely.
    fn on_start_packing(
        &mut self,
        item: &mut Item,
        bed: &Bed,
        context: &PackingContext,
        remaining: &[Item],
    ) -> bool {
        let _ = (item, bed, context, remaining);
        false
    }

    /// Called once per rotation, after the feasible region for that
    /// rotation has been computed and before the optimizer samples it.
    /// Mainly useful for kernels that want to observe the region a
    /// placement was drawn from (e.g. for debug output); has no effect on
    /// placement itself.
    fn on_feasible_region(&mut self, region: &PolygonSet) {
        let _ = region;
    }

    /// Called after the pack strategy has set `item`'s final translation
    /// and rotation but before it is committed to the context. Returning
    /// `false` vetoes the placement.
    fn on_item_packed(&mut self, item: &mut Item, bed: &Bed, context: &PackingContext) -> bool {
        let _ = (item, bed, context);
        true
    }
}

pub use compactify::CompactifyKernel;
pub use gravity::GravityKernel;
pub use rectangle_overfit::RectangleOverfitKernel;
pub use tm::TmKernel;
