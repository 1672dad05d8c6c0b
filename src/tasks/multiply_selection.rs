//! Multiply-selection task: append `count` more copies of the selected
//! geometry's prototype and arrange them alongside the existing selection.

use tracing::instrument;

use crate::cancellation::CancellationToken;
use crate::converter::{self, ArrangeableHost};
use crate::item::Item;
use crate::scene::Scene;
use crate::selection;
use crate::tasks::{convert_ids, find_prototype, make_kernel, new_item_key, NewItemRequest, TaskResult};

/// Runs the multiply-selection task, adding `count` copies of the first
/// selected geometry found. Returns a default (empty) result if nothing is
/// selected or `count` is zero.
#[instrument(skip_all)]
pub fn run(
    host: &mut dyn ArrangeableHost,
    scene: &Scene,
    count: usize,
    cancel: &CancellationToken,
    mut on_arranged: impl FnMut(&Item),
) -> TaskResult {
    if count == 0 {
        return TaskResult::default();
    }

    let mut selected_ids = Vec::new();
    let mut all_ids = Vec::new();
    host.for_each(&mut |arrangeable| {
        all_ids.push(arrangeable.id());
        if arrangeable.is_selected() {
            selected_ids.push(arrangeable.id());
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

    let bed = scene.effective_bed();
    // The existing selection (and everything else) stays put as an
    // obstacle; only the new copies are movable.
    let existing = convert_ids(host, &all_ids, settings, 0.0);
    let new_copies: Vec<Item> = (0..count)
        .map(|_| {
            let mut item = Item::new(prototype.shape.clone());
            item.envelope = prototype.envelope.clone();
            item.priority = prototype.priority;
            item.data = prototype.data.clone();
            item.data.host_id = None;
            item
        })
        .collect();

    let placed = selection::run(
        new_copies,
        existing,
        &bed,
        settings,
        cancel,
        || make_kernel(&bed, settings),
        &mut on_arranged,
    );

    let mut result = TaskResult::default();
    for item in &placed {
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
