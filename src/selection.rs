//! First-fit selection loop: assigns a batch of movable items to numbered
//! logical beds, honouring per-item bed constraints, fixed items, priority
//! ordering, and cooperative cancellation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::bed::{Bed, UNARRANGED};
use crate::cancellation::CancellationToken;
use crate::item::Item;
use crate::kernel::Kernel;
use crate::packing_context::PackingContext;
use crate::settings::Settings;
use crate::strategy;

/// Stably sorts movable items by descending priority, then by descending
/// transformed-hull area — larger, higher-priority items get first pick of
/// bed real estate.
fn sort_by_priority(items: &mut [Item]) {
    items.sort_by(|a, b| match b.priority.cmp(&a.priority) {
        Ordering::Equal => {
            let area_a = a.transformed_hull().area();
            let area_b = b.transformed_hull().area();
            area_b.partial_cmp(&area_a).unwrap_or(Ordering::Equal)
        }
        other => other,
    });
}

/// Runs the first-fit loop. `make_kernel` is called once per newly
/// encountered bed index, lazily, so each bed gets its own kernel instance
/// (the TM kernel's R*-trees, for example, must not be shared across
/// beds). `on_arranged` is invoked once per item, whether it was placed or
/// left `Unarranged`, so callers can advance progress and poll
/// cancellation.
pub fn run(
    items: Vec<Item>,
    fixed: Vec<Item>,
    bed: &Bed,
    settings: &Settings,
    cancel: &CancellationToken,
    make_kernel: impl FnMut() -> Box<dyn Kernel>,
    on_arranged: impl FnMut(&Item),
) -> Vec<Item> {
    run_from(items, fixed, bed, settings, cancel, 0, make_kernel, on_arranged)
}

/// As [`run`], but unconstrained items are only tried on bed indices
/// `min_bed_index` and above. The arrange task uses this to keep
/// unprintable items off any bed a printable item already occupies:
/// physical bed indices, once claimed by one category, are off-limits to
/// the other.
pub fn run_from(
    mut items: Vec<Item>,
    fixed: Vec<Item>,
    bed: &Bed,
    settings: &Settings,
    cancel: &CancellationToken,
    min_bed_index: i32,
    mut make_kernel: impl FnMut() -> Box<dyn Kernel>,
    mut on_arranged: impl FnMut(&Item),
) -> Vec<Item> {
    sort_by_priority(&mut items);

    for item in items.iter_mut() {
        if !strategy::can_possibly_fit(bed, item, settings) {
            item.unarrange();
        }
    }

    let mut bed_contexts: BTreeMap<i32, PackingContext> = BTreeMap::new();
    let mut kernels: BTreeMap<i32, Box<dyn Kernel>> = BTreeMap::new();
    for f in fixed {
        if f.bed_index >= 0 {
            bed_contexts.entry(f.bed_index).or_default().fixed.push(f);
        }
    }

    let total = items.len();
    let max_fixed_bed = bed_contexts
        .keys()
        .copied()
        .max()
        .unwrap_or(-1)
        .max(min_bed_index - 1);
    // Virtual beds are conceptually unbounded; this is a generous but
    // finite ceiling so a pathological input cannot spin the loop forever.
    let bed_cap = max_fixed_bed + total as i32 + 2;

    let was_prefiltered_out = |item: &Item| item.is_unarranged();

    for i in 0..items.len() {
        if cancel.is_canceled() {
            break;
        }
        if was_prefiltered_out(&items[i]) {
            on_arranged(&items[i]);
            continue;
        }

        let remaining: Vec<Item> = items[i + 1..].to_vec();
        let bed_indices: Vec<i32> = match items[i].bed_constraint {
            Some(c) => vec![c],
            None => (min_bed_index..=bed_cap).collect(),
        };

        let mut placed_on = None;
        for bed_idx in bed_indices {
            if cancel.is_canceled() {
                break;
            }
            let context = bed_contexts.entry(bed_idx).or_default();
            let kernel = kernels.entry(bed_idx).or_insert_with(&mut make_kernel);
            let ok = strategy::pack(
                kernel.as_mut(),
                bed,
                &mut items[i],
                context,
                &remaining,
                settings,
                cancel,
            );
            if ok {
                placed_on = Some(bed_idx);
                break;
            }
        }

        match placed_on {
            Some(bed_idx) => {
                items[i].bed_index = bed_idx;
                let committed = items[i].clone();
                bed_contexts.entry(bed_idx).or_default().push_packed(committed);
            }
            None => {
                items[i].bed_index = UNARRANGED;
            }
        }
        on_arranged(&items[i]);
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompose;
    use crate::geometry::{to_scaled, BoundingBox, ExPolygon, Point, Polygon};
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
    fn single_small_item_lands_on_bed_zero() {
        let bed = Bed::Rectangle(BoundingBox::new(
            Point::new(0, 0),
            Point::new(to_scaled(250.0), to_scaled(210.0)),
        ));
        let settings = Settings::default();
        let cancel = CancellationToken::new();
        let result = run(
            vec![square_item(20.0)],
            vec![],
            &bed,
            &settings,
            &cancel,
            || Box::new(GravityKernel::new()),
            |_| {},
        );
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].bed_index, 0);
    }

    #[test]
    fn second_item_overflows_to_next_bed_when_it_does_not_fit_alongside_the_first() {
        // Each 20mm item fits the 30mm bed alone, but the two cannot fit
        // side by side, so the second must overflow to bed 1.
        let bed = Bed::Rectangle(BoundingBox::new(
            Point::new(0, 0),
            Point::new(to_scaled(30.0), to_scaled(30.0)),
        ));
        let settings = Settings::default();
        let cancel = CancellationToken::new();
        let result = run(
            vec![square_item(20.0), square_item(20.0)],
            vec![],
            &bed,
            &settings,
            &cancel,
            || Box::new(GravityKernel::new()),
            |_| {},
        );
        let bed_indices: Vec<i32> = result.iter().map(|i| i.bed_index).collect();
        assert!(bed_indices.contains(&0));
        assert!(bed_indices.iter().any(|&b| b > 0));
    }
}
