//! Wraps another kernel, emitting one SVG file per placement attempt
//! showing the bed, the feasible region, fixed items, and the final item
//! placement. Gated behind the `svg-debug` feature; not meant for
//! production arranging runs.

use std::path::PathBuf;

use svg::node::element::{Path, Rectangle};
use svg::Document;

use crate::bed::Bed;
use crate::geometry::{to_mm, ExPolygon, Point, Polygon, PolygonSet};
use crate::item::Item;
use crate::kernel::Kernel;
use crate::packing_context::PackingContext;

#[derive(Debug, Clone)]
pub struct SvgDebugKernel<K> {
    inner: K,
    out_dir: PathBuf,
    counter: std::cell::Cell<u64>,
    /// The feasible region the optimizer is currently sampling, captured by
    /// [`Kernel::on_feasible_region`] just before it is needed in
    /// [`Kernel::on_item_packed`]. Reset to empty at the start of each
    /// rotation attempt by the same hook, so a stale region from an earlier
    /// rotation is never dumped alongside a later one's placement.
    last_feasible: std::cell::RefCell<PolygonSet>,
}

impl<K: Kernel> SvgDebugKernel<K> {
    pub fn new(inner: K, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            out_dir: out_dir.into(),
            counter: std::cell::Cell::new(0),
            last_feasible: std::cell::RefCell::new(PolygonSet::default()),
        }
    }

    fn polygon_path(poly: &Polygon) -> Path {
        let mut data = svg::node::element::path::Data::new();
        if let Some(first) = poly.points.first() {
            let (x, y) = first.to_f64();
            data = data.move_to((x, y));
            for p in &poly.points[1..] {
                let (x, y) = p.to_f64();
                data = data.line_to((x, y));
            }
            data = data.close();
        }
        Path::new().set("d", data).set("fill", "none")
    }

    fn dump(&self, bed: &Bed, feasible: &PolygonSet, context: &PackingContext, final_outline: &ExPolygon) {
        let bb = bed.bounding_box();
        let mut document = Document::new().set(
            "viewBox",
            (
                to_mm(bb.min.x),
                to_mm(bb.min.y),
                to_mm(bb.width()),
                to_mm(bb.height()),
            ),
        );

        document = document.add(
            Rectangle::new()
                .set("x", to_mm(bb.min.x))
                .set("y", to_mm(bb.min.y))
                .set("width", to_mm(bb.width()))
                .set("height", to_mm(bb.height()))
                .set("fill", "none")
                .set("stroke", "black"),
        );

        for region in &feasible.polygons {
            document = document.add(
                Self::polygon_path(&region.contour)
                    .set("stroke", "green")
                    .set("fill", "rgba(0,255,0,0.1)"),
            );
        }

        for placed in context.all_items() {
            document = document.add(
                Self::polygon_path(&placed.transformed_outline().contour)
                    .set("stroke", "gray")
                    .set("fill", "rgba(128,128,128,0.3)"),
            );
        }

        document = document.add(
            Self::polygon_path(&final_outline.contour)
                .set("stroke", "red")
                .set("fill", "rgba(255,0,0,0.3)"),
        );

        let n = self.counter.get();
        self.counter.set(n + 1);
        let path = self.out_dir.join(format!("placement_{n:05}.svg"));
        let _ = svg::save(path, &document);
    }
}

impl<K: Kernel> Kernel for SvgDebugKernel<K> {
    fn placement_fitness(&self, item: &Item, translation: Point, context: &PackingContext) -> f64 {
        self.inner.placement_fitness(item, translation, context)
    }

    fn on_start_packing(
        &mut self,
        item: &mut Item,
        bed: &Bed,
        context: &PackingContext,
        remaining: &[Item],
    ) -> bool {
        self.inner.on_start_packing(item, bed, context, remaining)
    }

    fn on_feasible_region(&mut self, region: &PolygonSet) {
        self.inner.on_feasible_region(region);
        *self.last_feasible.borrow_mut() = region.clone();
    }

    fn on_item_packed(&mut self, item: &mut Item, bed: &Bed, context: &PackingContext) -> bool {
        let accepted = self.inner.on_item_packed(item, bed, context);
        if accepted {
            let outline = item.transformed_outline();
            let feasible = self.last_feasible.borrow();
            self.dump(bed, &feasible, context, &outline);
        }
        accepted
    }
}
