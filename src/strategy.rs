//! The pack strategy: given one item, a bed, and what is already on it,
//! find a feasible rotation and translation and ask the kernel to score
//! candidates across it.

use ordered_float::OrderedFloat;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::bed::Bed;
use crate::cancellation::CancellationToken;
use crate::edge_cache::EdgeCache;
use crate::geometry::{Point, Polygon, PolygonSet};
use crate::ifp;
use crate::item::Item;
use crate::kernel::Kernel;
use crate::nfp;
use crate::optimizer::{self, OptimizerSettings};
use crate::packing_context::PackingContext;
use crate::settings::Settings;

/// Unions every already-placed item's no-fit-polygon against `item_parts`
/// into one forbidden region. Each obstacle's NFP is independent of every
/// other's, so when `parallel` is set (the `parallel` Cargo feature plus
/// `Settings::parallel`) the per-obstacle NFPs are computed across a rayon
/// thread pool and reduced with `union`.
fn forbidden_region(context: &PackingContext, item_parts: &[Polygon], parallel: bool) -> PolygonSet {
    let nfp_against = |placed: &Item| nfp::nfp_concave_concave(&placed.transformed_convex_parts(), item_parts);

    #[cfg(feature = "parallel")]
    if parallel {
        let placed: Vec<&Item> = context.all_items().collect();
        return placed
            .par_iter()
            .map(|p| nfp_against(p))
            .reduce(PolygonSet::default, |a, b| a.union(&b));
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    context
        .all_items()
        .fold(PolygonSet::default(), |acc, placed| acc.union(&nfp_against(placed)))
}

/// The rotations the strategy should try for `item`, `0.0` always first:
/// the item's recommended set (populated by [`crate::rotation::enrich`]
/// when rotation is enabled) plus whatever the item itself restricts
/// rotation to.
fn rotation_candidates(item: &Item, rotations_enabled: bool) -> Vec<f64> {
    let mut set = vec![0.0];
    if rotations_enabled {
        set.extend(item.data.recommended_rotations.iter().copied());
    }
    set.extend(item.allowed_rotations.iter().copied());
    set.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    set.dedup_by(|a, b| (*a - *b).abs() < 1.0e-9);
    set
}

/// Attempts to place `item` on `bed` given everything already in
/// `context`. On success, `item`'s translation and rotation are updated
/// and `true` is returned; on failure, or if `cancel` fires before a
/// placement is found, `item` is left unrotated and untranslated and
/// `false` is returned.
pub fn pack(
    kernel: &mut dyn Kernel,
    bed: &Bed,
    item: &mut Item,
    context: &PackingContext,
    remaining: &[Item],
    settings: &Settings,
    cancel: &CancellationToken,
) -> bool {
    if cancel.is_canceled() {
        return false;
    }

    if kernel.on_start_packing(item, bed, context, remaining) {
        return kernel.on_item_packed(item, bed, context);
    }

    let rotations = rotation_candidates(item, settings.rotations_enabled);
    let mut best: Option<(f64, f64, Point)> = None;

    for rotation in rotations {
        if cancel.is_canceled() {
            break;
        }
        let local_hull = item.fixed_outline().contour.rotated(rotation).convex_hull();
        let ifp_region = ifp::ifp(bed, &local_hull);
        if ifp_region.is_empty() {
            continue;
        }

        let item_parts: Vec<Polygon> = item
            .shape
            .convex_parts
            .iter()
            .map(|p| p.rotated(rotation))
            .collect();

        let forbidden = forbidden_region(context, &item_parts, settings.parallel);
        let feasible = ifp_region.difference(&forbidden);
        if feasible.is_empty() {
            continue;
        }
        kernel.on_feasible_region(&feasible);

        item.set_rotation(rotation);
        for region in &feasible.polygons {
            let cache = EdgeCache::from_contour(&region.contour.points, settings.accuracy);
            let opt_settings = OptimizerSettings::new(settings.accuracy);
            let Some(result) = optimizer::optimize(&cache, opt_settings, cancel, |p| {
                kernel.placement_fitness(item, p, context)
            }) else {
                continue;
            };
            let improves = best
                .as_ref()
                .map(|(s, ..)| OrderedFloat(result.score) > OrderedFloat(*s))
                .unwrap_or(true);
            if improves {
                best = Some((result.score, rotation, result.point));
            }
        }
    }

    match best {
        Some((_, rotation, translation)) => {
            item.set_rotation(rotation);
            item.set_translation(translation);
            kernel.on_item_packed(item, bed, context)
        }
        None => {
            item.set_rotation(0.0);
            false
        }
    }
}

/// Test-packs `item` into a bed with nothing else on it; used by the
/// unpackable-item pre-filter so an item that could never fit does not
/// waste a rotation/NFP pass during the real run.
pub fn can_possibly_fit(bed: &Bed, item: &Item, settings: &Settings) -> bool {
    for rotation in rotation_candidates(item, settings.rotations_enabled) {
        let local_hull = item.fixed_outline().contour.rotated(rotation).convex_hull();
        if !ifp::ifp(bed, &local_hull).is_empty() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose;
    use crate::geometry::{to_scaled, ExPolygon};
    use crate::item::Shape;
    use crate::kernel::GravityKernel;

    fn square_item(side: f64) -> Item {
        let s = to_scaled(side);
        let poly = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(s, 0),
            Point::new(s, s),
            Point::new(0, s),
        ]);
        let parts = decompose::decompose(&ExPolygon::from_contour(poly.clone()), 1).unwrap();
        Item::new(Shape::new(ExPolygon::from_contour(poly), parts))
    }

    #[test]
    fn packs_single_item_inside_rectangle_bed() {
        let bed = Bed::Rectangle(crate::geometry::BoundingBox::new(
            Point::new(0, 0),
            Point::new(to_scaled(250.0), to_scaled(210.0)),
        ));
        let mut item = square_item(20.0);
        let context = PackingContext::new();
        let settings = Settings::default();
        let mut kernel = GravityKernel::new();
        let cancel = CancellationToken::new();
        let ok = pack(&mut kernel, &bed, &mut item, &context, &[], &settings, &cancel);
        assert!(ok);
        let bb = item.transformed_bbox().unwrap();
        assert!(bb.min.x >= 0 && bb.max.x <= to_scaled(250.0));
        assert!(bb.min.y >= 0 && bb.max.y <= to_scaled(210.0));
    }

    #[test]
    fn canceled_token_prevents_placement() {
        let bed = Bed::Rectangle(crate::geometry::BoundingBox::new(
            Point::new(0, 0),
            Point::new(to_scaled(250.0), to_scaled(210.0)),
        ));
        let mut item = square_item(20.0);
        let context = PackingContext::new();
        let settings = Settings::default();
        let mut kernel = GravityKernel::new();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let ok = pack(&mut kernel, &bed, &mut item, &context, &[], &settings, &cancel);
        assert!(!ok);
    }

    #[test]
    fn oversized_item_cannot_fit() {
        let bed = Bed::Rectangle(crate::geometry::BoundingBox::new(
            Point::new(0, 0),
            Point::new(to_scaled(5.0), to_scaled(5.0)),
        ));
        let item = square_item(20.0);
        let settings = Settings::default();
        assert!(!can_possibly_fit(&bed, &item, &settings));
    }
}
