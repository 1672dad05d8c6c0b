//! The item model: a movable (or fixed) piece of geometry.

use serde::{Deserialize, Serialize};

use crate::bed::UNARRANGED;
use crate::data_store::DataStore;
use crate::geometry::{BoundingBox, ExPolygon, Point, Polygon};

/// The possibly-concave outline of an item, plus its convex decomposition.
/// Both are stored untransformed (as if translation were `(0, 0)` and
/// rotation `0`); [`Item::transformed_outline`] and friends apply the
/// item's current pose on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub outline: ExPolygon,
    pub convex_parts: Vec<Polygon>,
}

impl Shape {
    pub fn new(outline: ExPolygon, convex_parts: Vec<Polygon>) -> Self {
        Self {
            outline,
            convex_parts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outline.contour.is_empty()
    }
}

/// An item's pose: translation (scaled units) plus rotation (radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose {
    pub translation: Point,
    pub rotation: f64,
}

impl Pose {
    pub fn apply_to_polygon(&self, poly: &Polygon) -> Polygon {
        poly.rotated(self.rotation)
            .translated(self.translation.x, self.translation.y)
    }

    pub fn apply_to_expolygon(&self, poly: &ExPolygon) -> ExPolygon {
        poly.rotated(self.rotation)
            .translated(self.translation.x, self.translation.y)
    }
}

/// An arrangeable item: the unit the pack strategy and selection loop
/// operate on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub shape: Shape,
    /// Optional larger outline used instead of `shape` for NFP/IFP and
    /// collision purposes (e.g. a clearance envelope); kept in lock-step
    /// with `shape`'s transform.
    pub envelope: Option<ExPolygon>,
    pub pose: Pose,
    /// `UNARRANGED` until placed by the selection loop.
    pub bed_index: i32,
    pub priority: i32,
    pub bed_constraint: Option<i32>,
    /// Rotations the pack strategy is allowed to try, in radians. Always
    /// contains `0.0` implicitly tried first by convention of the caller.
    pub allowed_rotations: Vec<f64>,
    pub data: DataStore,
}

impl Item {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            envelope: None,
            pose: Pose::default(),
            bed_index: UNARRANGED,
            priority: 0,
            bed_constraint: None,
            allowed_rotations: vec![0.0],
            data: DataStore::default(),
        }
    }

    pub fn with_envelope(mut self, envelope: ExPolygon) -> Self {
        self.envelope = Some(envelope);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_unarranged(&self) -> bool {
        self.bed_index == UNARRANGED
    }

    pub fn unarrange(&mut self) {
        self.bed_index = UNARRANGED;
    }

    pub fn is_wipe_tower(&self) -> bool {
        self.data.wipe_tower
    }

    /// The outline used for collision/NFP purposes: the envelope when
    /// present, otherwise the shape's outline.
    pub fn fixed_outline(&self) -> &ExPolygon {
        self.envelope.as_ref().unwrap_or(&self.shape.outline)
    }

    pub fn transformed_outline(&self) -> ExPolygon {
        self.pose.apply_to_expolygon(self.fixed_outline())
    }

    pub fn transformed_convex_parts(&self) -> Vec<Polygon> {
        self.shape
            .convex_parts
            .iter()
            .map(|p| self.pose.apply_to_polygon(p))
            .collect()
    }

    pub fn transformed_hull(&self) -> Polygon {
        self.transformed_outline().contour.convex_hull()
    }

    pub fn transformed_bbox(&self) -> Option<BoundingBox> {
        self.transformed_outline().bounding_box()
    }

    pub fn fixed_area(&self) -> f64 {
        self.fixed_outline().area()
    }

    pub fn centroid(&self) -> Point {
        let outline = self.transformed_outline();
        outline.contour.centroid()
    }

    pub fn envelope_centroid(&self) -> Point {
        self.centroid()
    }

    pub fn set_translation(&mut self, p: Point) {
        self.pose.translation = p;
    }

    pub fn set_rotation(&mut self, angle: f64) {
        self.pose.rotation = angle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::to_scaled;

    fn square_item(side: f64) -> Item {
        let s = to_scaled(side);
        let poly = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(s, 0),
            Point::new(s, s),
            Point::new(0, s),
        ]);
        Item::new(Shape::new(
            ExPolygon::from_contour(poly.clone()),
            vec![poly],
        ))
    }

    #[test]
    fn new_item_is_unarranged() {
        let item = square_item(10.0);
        assert!(item.is_unarranged());
    }

    #[test]
    fn transformed_outline_reflects_translation() {
        let mut item = square_item(10.0);
        item.set_translation(Point::new(to_scaled(5.0), to_scaled(5.0)));
        let bb = item.transformed_bbox().unwrap();
        assert_eq!(bb.min.x, to_scaled(5.0));
        assert_eq!(bb.min.y, to_scaled(5.0));
    }

    #[test]
    fn envelope_overrides_fixed_outline() {
        let mut item = square_item(10.0);
        let env_side = to_scaled(20.0);
        let env = ExPolygon::from_contour(Polygon::new(vec![
            Point::new(-5_000_000, -5_000_000),
            Point::new(env_side, -5_000_000),
            Point::new(env_side, env_side),
            Point::new(-5_000_000, env_side),
        ]));
        item = item.with_envelope(env.clone());
        assert_eq!(item.fixed_outline(), &env);
    }
}
