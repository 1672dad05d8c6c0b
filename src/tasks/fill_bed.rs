//! Fill-bed task: replicate the single selected geometry enough times to
//! cover the constrained bed, plus a matching set of slightly shrunken
//! filler copies that patch residual gaps.

use tracing::instrument;

use crate::cancellation::CancellationToken;
use crate::converter::{self, ArrangeableHost};
use crate::decompose;
use crate::geometry::{ExPolygon, PolygonSet};
use crate::item::{Item, Shape};
use crate::scene::Scene;
use crate::selection;
use crate::tasks::{convert_ids, find_prototype, make_kernel, new_item_key, NewItemRequest, TaskResult};

/// The physical bed this task fills; fillers are bed-constrained to it so
/// none of them are ever allowed to spill onto a virtual bed.
const TARGET_BED: i32 = 0;

/// Extra shrink applied to filler copies, beyond the converter's own
/// clearance inflation, so they can slot into gaps the real copies leave
/// without ever touching a neighbour.
const FILLER_SHRINK_MM: f64 = 0.3;

/// Runs the fill-bed task. Returns a default (empty) result if the host
/// exposes no selected geometry, or if the selected prototype's area is
/// zero.
#[instrument(skip_all)]
pub fn run(
    host: &mut dyn ArrangeableHost,
    scene: &Scene,
    cancel: &CancellationToken,
    mut on_arranged: impl FnMut(&Item),
) -> TaskResult {
    let mut selected_ids = Vec::new();
    let mut other_ids = Vec::new();
    host.for_each(&mut |arrangeable| {
        if arrangeable.is_selected() {
            selected_ids.push(arrangeable.id());
        } else {
            other_ids.push(arrangeable.id());
        }
    });

    let Some(prototype_host) = find_prototype(host, &selected_ids) else {
        return TaskResult::default();
    };
    let prototype_id = prototype_host.id();
    let settings = &scene.settings;
    let Ok(prototype) = converter::convert(prototype_host, settings, 0.0) else {
        return TaskResult::default();
    };
    let prototype_area = prototype.fixed_area();
    if prototype_area <= 0.0 {
        return TaskResult::default();
    }

    let bed = scene.effective_bed();
    let fixed_items = convert_ids(host, &other_ids, settings, 0.0);
    let fixed_on_target: f64 = fixed_items
        .iter()
        .filter(|item| item.bed_index == TARGET_BED)
        .map(Item::fixed_area)
        .sum();

    let count = ((bed.area() - fixed_on_target) / prototype_area).ceil().max(0.0) as usize;
    if count == 0 {
        return TaskResult::default();
    }

    let real_copies: Vec<Item> = (0..count).map(|_| clone_prototype(&prototype, 0.0)).collect();
    let placed_real = selection::run(
        real_copies,
        fixed_items.clone(),
        &bed,
        settings,
        cancel,
        || make_kernel(&bed, settings),
        &mut on_arranged,
    );

    let mut filler_obstacles = fixed_items;
    filler_obstacles.extend(placed_real.iter().cloned());
    let filler_copies: Vec<Item> = (0..count)
        .map(|_| {
            let mut filler = clone_prototype(&prototype, -FILLER_SHRINK_MM);
            filler.bed_constraint = Some(TARGET_BED);
            filler
        })
        .collect();

    // Mirrors the original's early stop: the instant one filler fails to
    // land on the physical bed, every filler after it is left unarranged
    // instead of independently attempted against an already-saturated bed.
    let filler_cancel = CancellationToken::new();
    let placed_fillers = selection::run(
        filler_copies,
        filler_obstacles,
        &bed,
        settings,
        &filler_cancel,
        || make_kernel(&bed, settings),
        &mut |item: &Item| {
            on_arranged(item);
            if cancel.is_canceled() || item.is_unarranged() {
                filler_cancel.cancel();
            }
        },
    );

    let placed = placed_real.into_iter().chain(placed_fillers);
    let mut result = TaskResult::default();
    for item in placed.filter(|item| item.bed_index == TARGET_BED) {
        let translation = item.pose.translation;
        let rotation = item.pose.rotation;
        let bed_index = item.bed_index;
        result.new_item_requests.push(NewItemRequest {
            prototype_host_id: prototype_id,
            translation,
            rotation,
            bed_index,
            key: new_item_key(prototype_id, translation, rotation, bed_index),
        });
    }
    result
}

/// Builds an engine-only copy of `prototype` (no host id yet — one is
/// minted by [`TaskResult::apply_on`] when the request is applied),
/// optionally inflated (or, for fillers, shrunk) by `extra_offset_mm`
/// beyond whatever clearance the converter already baked in.
fn clone_prototype(prototype: &Item, extra_offset_mm: f64) -> Item {
    let (shape, envelope) = if extra_offset_mm.abs() < 1.0e-9 {
        (prototype.shape.clone(), prototype.envelope.clone())
    } else {
        let envelope = prototype.envelope.as_ref().map(|e| inflate(e, extra_offset_mm));
        let outline = if envelope.is_some() {
            prototype.shape.outline.clone()
        } else {
            inflate(&prototype.shape.outline, extra_offset_mm)
        };
        let fixed = envelope.as_ref().unwrap_or(&outline);
        let convex_parts =
            decompose::decompose(fixed, 0).unwrap_or_else(|_| prototype.shape.convex_parts.clone());
        (Shape::new(outline, convex_parts), envelope)
    };

    let mut item = Item::new(shape);
    item.envelope = envelope;
    item.priority = prototype.priority;
    item.data = prototype.data.clone();
    item.data.host_id = None;
    item
}

fn inflate(outline: &ExPolygon, mm: f64) -> ExPolygon {
    let set = crate::geometry::offset(&PolygonSet::new(vec![outline.clone()]), mm);
    set.polygons.into_iter().next().unwrap_or_else(|| outline.clone())
}
