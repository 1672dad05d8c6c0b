//! Arrange task: split the scene into printable/unprintable ×
//! selected/unselected buckets and pack each movable bucket against its
//! unselected counterpart.

use tracing::instrument;

use crate::bed::Bed;
use crate::cancellation::CancellationToken;
use crate::converter::ArrangeableHost;
use crate::item::Item;
use crate::scene::Scene;
use crate::segmented_alignment;
use crate::selection;
use crate::tasks::{convert_ids, make_kernel, TaskResult};

/// Inflation (negative = shrink) applied to unselected items before they
/// become obstacles for the selection loop, so a mover's feasible region
/// is never pinched shut by exact numerical coincidence with an
/// unselected neighbour's edge.
const UNSELECTED_SHRINK_MM: f64 = -0.05;

/// Runs the arrange task against every item the host currently exposes.
#[instrument(skip_all)]
pub fn run(
    host: &mut dyn ArrangeableHost,
    scene: &Scene,
    cancel: &CancellationToken,
    mut on_arranged: impl FnMut(&Item),
) -> TaskResult {
    let mut printable_selected_ids = Vec::new();
    let mut printable_unselected_ids = Vec::new();
    let mut unprintable_selected_ids = Vec::new();
    let mut unprintable_unselected_ids = Vec::new();

    host.for_each(&mut |arrangeable| {
        let id = arrangeable.id();
        match (arrangeable.is_printable(), arrangeable.is_selected()) {
            (true, true) => printable_selected_ids.push(id),
            (true, false) => printable_unselected_ids.push(id),
            (false, true) => unprintable_selected_ids.push(id),
            (false, false) => unprintable_unselected_ids.push(id),
        }
    });

    let bed = scene.effective_bed();
    let settings = &scene.settings;

    let printable_selected = convert_ids(host, &printable_selected_ids, settings, 0.0);
    let printable_unselected = convert_ids(host, &printable_unselected_ids, settings, UNSELECTED_SHRINK_MM);
    let unprintable_selected = convert_ids(host, &unprintable_selected_ids, settings, 0.0);
    let mut unprintable_unselected =
        convert_ids(host, &unprintable_unselected_ids, settings, UNSELECTED_SHRINK_MM);

    let printable_placed = selection::run(
        printable_selected,
        printable_unselected.clone(),
        &bed,
        settings,
        cancel,
        || make_kernel(&bed, settings),
        &mut on_arranged,
    );

    // Unprintable items live on logical beds that come after every bed a
    // printable item claimed, so the two categories never share a
    // physical plate.
    let first_free_bed = printable_placed
        .iter()
        .chain(printable_unselected.iter())
        .filter(|item| item.bed_index >= 0)
        .map(|item| item.bed_index)
        .max()
        .map_or(0, |m| m + 1);

    for item in unprintable_unselected.iter_mut() {
        if item.bed_index >= 0 {
            item.bed_index += first_free_bed;
        }
    }

    let unprintable_placed = selection::run_from(
        unprintable_selected,
        unprintable_unselected.clone(),
        &bed,
        settings,
        cancel,
        first_free_bed,
        || make_kernel(&bed, settings),
        &mut on_arranged,
    );

    let mut placed: Vec<Item> = printable_placed
        .into_iter()
        .chain(unprintable_placed)
        .chain(unprintable_unselected)
        .collect();

    if let Bed::Segmented(seg) = &bed {
        let bed_indices: std::collections::BTreeSet<i32> = placed
            .iter()
            .map(|item| item.bed_index)
            .filter(|&b| b >= 0)
            .collect();
        for bed_index in bed_indices {
            segmented_alignment::align_bed(seg, bed_index, &mut placed, settings.seed);
        }
    }

    TaskResult::from_items(placed.iter())
}
