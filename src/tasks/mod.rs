//! Tasks: the entry points a host actually calls. Each builds on the
//! selection loop and converter to implement one host-facing operation,
//! and produces a [`TaskResult`] the host applies back to its own model.

pub mod arrange;
pub mod fill_bed;
pub mod multiply_selection;

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tracing::warn;

use crate::bed::Bed;
use crate::converter::{self, Arrangeable, ArrangeableHost};
use crate::geometry::Point;
use crate::item::Item;
use crate::kernel::{GravityKernel, Kernel, TmKernel};
use crate::settings::{ArrangeStrategy, Settings};

/// One item's final placement, keyed by the host id the item was converted
/// from.
#[derive(Debug, Clone, Copy)]
pub struct PlacementResult {
    pub host_id: u64,
    pub translation: Point,
    pub rotation: f64,
    pub bed_index: i32,
}

/// A request to create one more copy of `prototype_host_id`'s geometry,
/// already packed at `translation`/`rotation`/`bed_index` by the task that
/// produced it. The fill-bed and multiply-selection tasks pack prototype
/// clones entirely within the engine (they have no host id yet); applying
/// the result is what actually calls back into the host to create them.
#[derive(Debug, Clone, Copy)]
pub struct NewItemRequest {
    pub prototype_host_id: u64,
    pub translation: Point,
    pub rotation: f64,
    pub bed_index: i32,
    /// Stable across repeated `apply_on` calls for the same `TaskResult`,
    /// derived from this request's own fields; used to recognize a copy
    /// this request already created.
    pub key: u64,
}

/// Derives a [`NewItemRequest::key`] from the fields that together identify
/// one placed copy. Two requests built from the same placement always hash
/// to the same key, which is what lets a second `apply_on` recognize the
/// copy as already created.
pub(crate) fn new_item_key(prototype_host_id: u64, translation: Point, rotation: f64, bed_index: i32) -> u64 {
    let mut hasher = DefaultHasher::new();
    prototype_host_id.hash(&mut hasher);
    translation.x.hash(&mut hasher);
    translation.y.hash(&mut hasher);
    rotation.to_bits().hash(&mut hasher);
    bed_index.hash(&mut hasher);
    hasher.finish()
}

/// What a task produced: a set of placements to write back to the host,
/// plus any new-item requests. Applying is a single pass over
/// `placements`; per-item failures (an id the host no longer recognizes)
/// do not block the rest from applying.
#[derive(Debug, Clone, Default)]
pub struct TaskResult {
    pub placements: Vec<PlacementResult>,
    pub new_item_requests: Vec<NewItemRequest>,
}

impl TaskResult {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let placements = items
            .into_iter()
            .filter_map(|item| {
                item.data.host_id.map(|host_id| PlacementResult {
                    host_id,
                    translation: item.pose.translation,
                    rotation: item.pose.rotation,
                    bed_index: item.bed_index,
                })
            })
            .collect();
        Self {
            placements,
            new_item_requests: Vec::new(),
        }
    }

    /// Writes every placement back to `host` in one pass, then creates and
    /// places every requested new item. Returns `true` only if every
    /// placement found its id and was accepted by `assign_bed` and every
    /// new item was created (or already existed) and accepted.
    ///
    /// Repositioning placements are idempotent (`transform`/`assign_bed`
    /// set absolute state). `new_item_requests` are also idempotent on
    /// hosts that implement [`Arrangeable::request_tag`]: before creating a
    /// copy, this looks for an object already tagged with the request's
    /// key and reuses it instead of calling `host.add` again. Hosts that
    /// leave tagging at its default no-op do not get this guarantee and
    /// will see a second batch of copies on a repeated apply.
    pub fn apply_on(&self, host: &mut dyn ArrangeableHost) -> bool {
        let mut all_ok = true;
        for placement in &self.placements {
            match host.visit_mut(placement.host_id) {
                Some(arrangeable) => {
                    arrangeable.transform(placement.translation, placement.rotation);
                    if !arrangeable.assign_bed(placement.bed_index) {
                        all_ok = false;
                    }
                }
                None => all_ok = false,
            }
        }
        for request in &self.new_item_requests {
            let existing_id = {
                let mut found = None;
                host.for_each(&mut |arrangeable| {
                    if found.is_none() && arrangeable.request_tag() == Some(request.key) {
                        found = Some(arrangeable.id());
                    }
                });
                found
            };
            let target_id = match existing_id {
                Some(id) => Some(id),
                None => host.add(request.prototype_host_id),
            };
            match target_id {
                Some(id) => match host.visit_mut(id) {
                    Some(arrangeable) => {
                        arrangeable.set_request_tag(request.key);
                        arrangeable.transform(request.translation, request.rotation);
                        if !arrangeable.assign_bed(request.bed_index) {
                            all_ok = false;
                        }
                    }
                    None => all_ok = false,
                },
                None => all_ok = false,
            }
        }
        all_ok
    }
}

/// Picks a kernel per `settings.arrange_strategy`: `Auto` uses the TM
/// kernel for any bed with real geometry to pack against (rectangle,
/// irregular, segmented) and falls back to gravity for circular and
/// infinite beds, where there is no "corner" for TM's compaction framing
/// to compact toward; `PullToCenter` always uses gravity.
pub(crate) fn make_kernel(bed: &Bed, settings: &Settings) -> Box<dyn Kernel> {
    match settings.arrange_strategy {
        ArrangeStrategy::PullToCenter => Box::new(GravityKernel::new()),
        ArrangeStrategy::Auto => match bed {
            Bed::Circle { .. } | Bed::Infinite => Box::new(GravityKernel::new()),
            Bed::Rectangle(_) | Bed::Irregular(_) | Bed::Segmented(_) => Box::new(TmKernel::new()),
        },
    }
}

/// Converts the host objects named by `ids`, logging and dropping (not
/// failing the task over) any that are missing or whose outline is empty.
pub(crate) fn convert_ids(
    host: &dyn ArrangeableHost,
    ids: &[u64],
    settings: &Settings,
    extra_offset_mm: f64,
) -> Vec<Item> {
    ids.iter()
        .filter_map(|&id| host.visit(id))
        .filter_map(|arrangeable| match converter::convert(arrangeable, settings, extra_offset_mm) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(host_id = arrangeable.id(), error = %err, "dropping item from this task");
                None
            }
        })
        .collect()
}

pub(crate) fn find_prototype<'a>(
    host: &'a dyn ArrangeableHost,
    selected_ids: &[u64],
) -> Option<&'a dyn Arrangeable> {
    selected_ids.iter().find_map(|&id| host.visit(id))
}
