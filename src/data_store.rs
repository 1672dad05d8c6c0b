//! Closed-sum replacement for an arbitrary key→value item data store.
//!
//! The original engine hangs auxiliary per-item facts off a dynamically
//! typed map (`sink`, `wipe_tower`, host object id, precomputed rotation
//! candidates, ...). Since the full set of keys ever read by a kernel or
//! task is known statically, this crate keeps them as plain optional fields
//! instead, which the compiler can check and which need no runtime lookup.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataStore {
    /// Attraction point used by [`crate::kernel::gravity::GravityKernel`];
    /// falls back to the bed's center when unset.
    pub sink: Option<Point>,
    /// Marks an item as the print's wipe tower: excluded from rotation
    /// pre-enrichment and from segmented-bed post-alignment shifting.
    pub wipe_tower: bool,
    /// Opaque identifier of the host object this item was converted from,
    /// carried through so task results can be re-applied to the host model.
    pub host_id: Option<u64>,
    /// Group identifier shared by items converted from the same underlying
    /// geometry, used by the fill-bed and multiply-selection tasks to spot
    /// a prototype among the current selection.
    pub geometry_id: u64,
    /// Rotation candidates computed by rotation pre-enrichment, tried by
    /// the pack strategy in addition to the item's zero rotation.
    pub recommended_rotations: Vec<f64>,
}

impl DataStore {
    pub fn with_sink(mut self, sink: Point) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_host_id(mut self, id: u64) -> Self {
        self.host_id = Some(id);
        self
    }

    pub fn as_wipe_tower(mut self) -> Self {
        self.wipe_tower = true;
        self
    }
}
