//! The boundary between the host's object model and this crate's [`Item`]
//! model: the `Arrangeable` trait a host implements once per movable
//! entity, and the converter that turns a batch of them into `Item`s under
//! one of the three geometry-handling modes.

use tracing::warn;

use crate::bed::UNARRANGED;
use crate::data_store::DataStore;
use crate::decompose;
use crate::error::Result;
use crate::geometry::{ExPolygon, Point, Polygon, PolygonSet};
use crate::geometry::offset;
use crate::item::{Item, Shape};
use crate::settings::{GeometryHandling, Settings, ADVANCED_SIMPLIFY_TOLERANCE_MM};

/// A host object presentable as a 2D shape the engine may move. The host
/// implements this once per movable entity; the engine never reaches back
/// into the host model except through these methods.
pub trait Arrangeable {
    /// Stable unique identifier across the run.
    fn id(&self) -> u64;
    /// Group identifier; items sharing outline (e.g. copies of one part)
    /// share this.
    fn geometry_id(&self) -> u64;
    fn full_outline(&self) -> ExPolygon;
    fn convex_outline(&self) -> Polygon;
    /// Optional inflated envelope; `None` means "use the outline".
    fn full_envelope(&self) -> Option<ExPolygon> {
        None
    }
    fn is_printable(&self) -> bool {
        true
    }
    fn is_selected(&self) -> bool {
        true
    }
    fn priority(&self) -> i32 {
        0
    }
    /// Current logical bed, or [`UNARRANGED`] if never placed.
    fn get_bed_index(&self) -> i32 {
        UNARRANGED
    }
    fn bed_constraint(&self) -> Option<i32> {
        None
    }
    /// Lets the host write sink points, the wipe-tower flag, and similar
    /// host-specific facts into the converted item's data store.
    fn imbue_data(&self, store: &mut DataStore) {
        let _ = store;
    }

    /// Tag stamped by [`crate::tasks::TaskResult::apply_on`] on an object it
    /// created from a `new_item_requests` entry, so a repeated `apply_on` of
    /// the same result can recognize the copy already exists instead of
    /// creating a duplicate. Hosts that do not override this (the default)
    /// do not get that idempotence guarantee.
    fn request_tag(&self) -> Option<u64> {
        None
    }
    fn set_request_tag(&mut self, tag: u64) {
        let _ = tag;
    }

    /// Applied by the engine to record a committed placement.
    fn transform(&mut self, translation: Point, rotation: f64);
    /// Applied by the engine to record a bed assignment; the host may
    /// reject it (e.g. the id no longer exists) by returning `false`.
    fn assign_bed(&mut self, bed_index: i32) -> bool;
}

/// The host model: iteration over every arrangeable plus a factory used by
/// the fill-bed and multiply-selection tasks to create copies of a
/// prototype.
pub trait ArrangeableHost {
    fn for_each(&self, visit: &mut dyn FnMut(&dyn Arrangeable));
    fn visit(&self, id: u64) -> Option<&dyn Arrangeable>;
    fn visit_mut(&mut self, id: u64) -> Option<&mut dyn Arrangeable>;
    /// Creates a new arrangeable as a copy of `prototype_id`'s geometry,
    /// returning its new id, or `None` if the host refuses (e.g. unknown
    /// prototype).
    fn add(&mut self, prototype_id: u64) -> Option<u64>;
}

/// Converts one host object into an [`Item`], applying `settings`'s
/// geometry-handling mode and clearance inflation.
///
/// `extra_offset_mm` is added on top of `distance_from_objects / 2`; the
/// arrange task uses a small negative value for the unselected bucket so
/// those items shrink slightly and cannot be touched by movers.
pub fn convert(host: &dyn Arrangeable, settings: &Settings, extra_offset_mm: f64) -> Result<Item> {
    let raw_outline = host.full_outline();
    if raw_outline.contour.is_empty() {
        return Err(crate::error::ArrangeError::EmptyItemOutline(host.id()));
    }

    let half_clearance = settings.distance_from_objects / 2.0 + extra_offset_mm;

    // `raw_envelope`, when present, is what the pack strategy treats as
    // the item's collision shape (see `Item::fixed_outline`); `raw_shape`
    // is kept as the true geometry for whichever mode has no envelope.
    let (raw_shape, raw_envelope) = match settings.geometry_handling {
        GeometryHandling::Convex => {
            let hull = host.convex_outline().convex_hull();
            (ExPolygon::from_contour(hull), None)
        }
        GeometryHandling::Balanced => {
            let hull = raw_outline.contour.convex_hull();
            (raw_outline.clone(), Some(ExPolygon::from_contour(hull)))
        }
        GeometryHandling::Advanced => {
            let outline = raw_outline.simplified(ADVANCED_SIMPLIFY_TOLERANCE_MM);
            let envelope = host
                .full_envelope()
                .map(|e| e.simplified(ADVANCED_SIMPLIFY_TOLERANCE_MM));
            (outline, envelope)
        }
    };

    let envelope = raw_envelope.as_ref().map(|e| inflate(e, half_clearance));
    let shape_outline = if envelope.is_some() {
        raw_shape
    } else {
        inflate(&raw_shape, half_clearance)
    };

    let fixed_outline = envelope.as_ref().unwrap_or(&shape_outline);
    let convex_parts = decompose::decompose(fixed_outline, host.id())?;

    let mut item =
        Item::new(Shape::new(shape_outline.clone(), convex_parts)).with_priority(host.priority());
    if let Some(env) = envelope {
        item = item.with_envelope(env);
    }
    item.bed_constraint = host.bed_constraint();
    item.bed_index = host.get_bed_index();
    host.imbue_data(&mut item.data);
    item.data.host_id = Some(host.id());
    item.data.geometry_id = host.geometry_id();
    Ok(item)
}

fn inflate(outline: &ExPolygon, mm: f64) -> ExPolygon {
    if mm.abs() < 1.0e-9 {
        return outline.clone();
    }
    let set = offset(&PolygonSet::new(vec![outline.clone()]), mm);
    set.polygons.into_iter().next().unwrap_or_else(|| outline.clone())
}

/// Converts every host object visited by `host`, dropping (and logging)
/// any whose outline is empty or fails convex decomposition, per this
/// crate's policy of never failing a whole run over one bad item.
pub fn convert_all(
    host: &dyn ArrangeableHost,
    settings: &Settings,
    extra_offset_mm: impl Fn(&dyn Arrangeable) -> f64,
) -> Vec<Item> {
    let mut items = Vec::new();
    host.for_each(&mut |arrangeable| {
        match convert(arrangeable, settings, extra_offset_mm(arrangeable)) {
            Ok(item) => items.push(item),
            Err(err) => warn!(host_id = arrangeable.id(), error = %err, "dropping item from this run"),
        }
    });
    items
}
