//! The scene a task runs against: a bed and the settings that erode it and
//! govern conversion.

use crate::bed::Bed;
use crate::settings::Settings;

/// Bundles a bed with the run settings, computing the bed any task should
/// actually pack against.
#[derive(Debug, Clone)]
pub struct Scene {
    pub bed: Bed,
    pub settings: Settings,
}

impl Scene {
    pub fn new(bed: Bed, settings: Settings) -> Self {
        Self { bed, settings }
    }

    /// The bed eroded by `distance_from_bed` plus half of
    /// `distance_from_objects` — the other half is applied as inflation to
    /// each item by the converter, so that two items end up exactly
    /// `distance_from_objects` apart and an item ends up `distance_from_bed`
    /// from the bed edge.
    pub fn effective_bed(&self) -> Bed {
        let erosion = self.settings.distance_from_bed + self.settings.distance_from_objects / 2.0;
        self.bed.offset(-erosion)
    }
}
