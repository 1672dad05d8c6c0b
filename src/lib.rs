//! No-fit-polygon based 2D packing and layout engine.
//!
//! - Geometry: scaled-integer polygons/expolygons, boolean ops and
//!   offsetting via `geo`/`geo-buffer`, convex decomposition via `earcutr`.
//! - Construction: angle-merged Minkowski-sum no-fit-polygons for
//!   convex/concave items, half-plane-clipped or triangulated inner-fit
//!   polygons for every supported bed shape.
//! - Placement: a pluggable [`kernel::Kernel`] scores candidate
//!   translations sampled along a feasible region's edges; the selection
//!   loop first-fits a priority-sorted batch of items across numbered
//!   logical beds.
//! - Tasks: [`tasks::arrange`], [`tasks::fill_bed`] and
//!   [`tasks::multiply_selection`] are the host-facing entry points, each
//!   producing a [`tasks::TaskResult`] the host applies back to its own
//!   model.
//!
//! Quick example:
//! ```ignore
//! use nfp_arrange_core::prelude::*;
//!
//! let bed = Bed::Rectangle(BoundingBox::new(Point::new(0, 0), Point::new(to_scaled(250.0), to_scaled(210.0))));
//! let scene = Scene::new(bed, Settings::default());
//! let cancel = CancellationToken::new();
//! let result = tasks::arrange::run(&mut my_host, &scene, &cancel, |_item| {});
//! result.apply_on(&mut my_host);
//! ```

pub mod bed;
pub mod cancellation;
pub mod converter;
pub mod data_store;
pub mod decompose;
pub mod edge_cache;
pub mod error;
pub mod geometry;
pub mod ifp;
pub mod item;
pub mod kernel;
pub mod nfp;
pub mod optimizer;
pub mod packing_context;
pub mod rotation;
pub mod scene;
pub mod segmented_alignment;
pub mod selection;
pub mod settings;
pub mod strategy;
pub mod tasks;

pub use error::{ArrangeError, Result};

/// Convenience prelude for the primary types and entry points.
/// Importing `nfp_arrange_core::prelude::*` brings them into scope.
pub mod prelude {
    pub use crate::bed::{Bed, SegmentedRectangle, XlAlignment};
    pub use crate::cancellation::CancellationToken;
    pub use crate::converter::{Arrangeable, ArrangeableHost};
    pub use crate::data_store::DataStore;
    pub use crate::error::{ArrangeError, Result};
    pub use crate::geometry::{to_mm, to_scaled, BoundingBox, Coord, ExPolygon, Point, Polygon};
    pub use crate::item::{Item, Pose, Shape};
    pub use crate::kernel::{CompactifyKernel, GravityKernel, Kernel, RectangleOverfitKernel, TmKernel};
    pub use crate::scene::Scene;
    pub use crate::settings::{ArrangeStrategy, GeometryHandling, Settings, SettingsBuilder};
    pub use crate::tasks::{self, NewItemRequest, PlacementResult, TaskResult};
}
