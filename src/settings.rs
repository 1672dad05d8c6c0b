//! Flat, serializable run settings, with a fluent builder in the style of
//! the teacher crate's `PackerConfig`/`PackerConfigBuilder`.

use serde::{Deserialize, Serialize};

use crate::bed::XlAlignment;
use crate::error::{ArrangeError, Result};

/// Converter geometry-handling mode: how much of an item's true shape is
/// exposed to NFP construction versus approximated for speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryHandling {
    /// Outline = convex hull of the raw outline, inflated by half the
    /// clearance distance. Fastest, least accurate for concave parts.
    Convex,
    /// Full expoly outline; convex envelope = convex hull of the outline.
    Balanced,
    /// Full expoly outline and full envelope, both optionally simplified.
    Advanced,
}

/// Kernel selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrangeStrategy {
    /// TM kernel for rectangle/irregular beds, gravity kernel for circle
    /// beds.
    Auto,
    /// Always use the gravity kernel.
    PullToCenter,
}

/// Simplification tolerance applied to advanced-mode outlines/envelopes.
/// Hard-coded rather than derived from item size or bed resolution: the
/// original engine does the same and no regression suite has exercised a
/// different value.
pub const ADVANCED_SIMPLIFY_TOLERANCE_MM: f64 = 0.2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_distance_from_objects")]
    pub distance_from_objects: f64,
    #[serde(default)]
    pub distance_from_bed: f64,
    #[serde(default)]
    pub rotations_enabled: bool,
    #[serde(default = "default_geometry_handling")]
    pub geometry_handling: GeometryHandling,
    #[serde(default = "default_arrange_strategy")]
    pub arrange_strategy: ArrangeStrategy,
    #[serde(default = "default_xl_alignment")]
    pub xl_alignment: XlAlignment,
    /// Sample density the optimizer and edge caches use; `1.0` is densest.
    #[serde(default = "default_accuracy")]
    pub accuracy: f64,
    /// Seed for the RNG threaded through rotation pre-enrichment and
    /// `xl_alignment = random`, so runs are reproducible.
    #[serde(default)]
    pub seed: u64,
    /// Enable the `parallel` Cargo feature's rayon fan-out across
    /// optimizer samples, when compiled in.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            distance_from_objects: default_distance_from_objects(),
            distance_from_bed: 0.0,
            rotations_enabled: false,
            geometry_handling: default_geometry_handling(),
            arrange_strategy: default_arrange_strategy(),
            xl_alignment: default_xl_alignment(),
            accuracy: default_accuracy(),
            seed: 0,
            parallel: false,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.distance_from_objects < 0.0 {
            return Err(ArrangeError::InvalidConfig(
                "distance_from_objects must be >= 0".to_string(),
            ));
        }
        if self.distance_from_bed < 0.0 {
            return Err(ArrangeError::InvalidConfig(
                "distance_from_bed must be >= 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(ArrangeError::InvalidConfig(
                "accuracy must be in [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_distance_from_objects() -> f64 {
    6.0
}
fn default_geometry_handling() -> GeometryHandling {
    GeometryHandling::Convex
}
fn default_arrange_strategy() -> ArrangeStrategy {
    ArrangeStrategy::Auto
}
fn default_xl_alignment() -> XlAlignment {
    XlAlignment::FrontLeft
}
fn default_accuracy() -> f64 {
    0.65
}

/// Builder for [`Settings`] for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
        }
    }

    pub fn distance_from_objects(mut self, mm: f64) -> Self {
        self.settings.distance_from_objects = mm;
        self
    }

    pub fn distance_from_bed(mut self, mm: f64) -> Self {
        self.settings.distance_from_bed = mm;
        self
    }

    pub fn rotations_enabled(mut self, enabled: bool) -> Self {
        self.settings.rotations_enabled = enabled;
        self
    }

    pub fn geometry_handling(mut self, mode: GeometryHandling) -> Self {
        self.settings.geometry_handling = mode;
        self
    }

    pub fn arrange_strategy(mut self, strategy: ArrangeStrategy) -> Self {
        self.settings.arrange_strategy = strategy;
        self
    }

    pub fn xl_alignment(mut self, alignment: XlAlignment) -> Self {
        self.settings.xl_alignment = alignment;
        self
    }

    pub fn accuracy(mut self, accuracy: f64) -> Self {
        self.settings.accuracy = accuracy;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = seed;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.settings.parallel = parallel;
        self
    }

    pub fn build(self) -> Result<Settings> {
        self.settings.validate()?;
        Ok(self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn negative_distance_is_rejected() {
        let bad = SettingsBuilder::new().distance_from_objects(-1.0).build();
        assert!(bad.is_err());
    }
}
