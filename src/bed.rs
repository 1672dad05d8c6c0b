//! The bed model: a closed sum type of the shapes an item can be packed into.

use serde::{Deserialize, Serialize};

use crate::geometry::{to_scaled, BoundingBox, Coord, ExPolygon, Point, Polygon, PolygonSet};

/// Sentinel bed index meaning "not yet placed".
pub const UNARRANGED: i32 = -1;

/// Number of sides used to approximate a circular bed as a polygon.
const CIRCLE_APPROXIMATION_SIDES: usize = 24;

/// Pivot corner for segmented-rectangle post-alignment. Named after the
/// operator-facing front/rear of the bed rather than screen-space
/// top/bottom, since that is the frame the host's `xl_alignment` setting is
/// expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XlAlignment {
    Center,
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
    /// Picked per-bed from the task's seeded RNG.
    Random,
}

/// A rectangular bed subdivided into a `segments_x` × `segments_y` grid of
/// equal cells, used to post-align each bed's pile toward one corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentedRectangle {
    pub bb: BoundingBox,
    pub segments_x: usize,
    pub segments_y: usize,
    pub pivot: XlAlignment,
}

impl SegmentedRectangle {
    pub fn cell_width(&self) -> Coord {
        self.bb.width() / self.segments_x.max(1) as Coord
    }

    pub fn cell_height(&self) -> Coord {
        self.bb.height() / self.segments_y.max(1) as Coord
    }
}

/// Closed sum type of the bed shapes the engine understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bed {
    /// Unbounded region, represented for bounding-box purposes as a very
    /// large rectangle centered on the origin.
    Infinite,
    Rectangle(BoundingBox),
    Circle { center: Point, radius: Coord },
    /// A possibly concave region, possibly with holes.
    Irregular(ExPolygon),
    Segmented(SegmentedRectangle),
}

/// Clamp factor used when an `Infinite` bed needs a concrete bounding box,
/// matching the ratio the original engine uses to keep arithmetic finite
/// while still being "large enough" for any real item.
const INFINITE_BED_CLAMP: f64 = 1.0e5;

impl Bed {
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Bed::Infinite => {
                let half = to_scaled(INFINITE_BED_CLAMP);
                BoundingBox::new(Point::new(-half, -half), Point::new(half, half))
            }
            Bed::Rectangle(bb) => *bb,
            Bed::Circle { center, radius } => BoundingBox::new(
                Point::new(center.x - radius, center.y - radius),
                Point::new(center.x + radius, center.y + radius),
            ),
            Bed::Irregular(poly) => poly
                .bounding_box()
                .unwrap_or_else(|| BoundingBox::new(Point::new(0, 0), Point::new(0, 0))),
            Bed::Segmented(seg) => seg.bb,
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Bed::Infinite => f64::INFINITY,
            Bed::Rectangle(bb) => {
                crate::geometry::to_mm(bb.width()) * crate::geometry::to_mm(bb.height())
            }
            Bed::Circle { radius, .. } => {
                let r = crate::geometry::to_mm(*radius);
                std::f64::consts::PI * r * r
            }
            Bed::Irregular(poly) => poly.area(),
            Bed::Segmented(seg) => {
                crate::geometry::to_mm(seg.bb.width()) * crate::geometry::to_mm(seg.bb.height())
            }
        }
    }

    /// Approximates a circle as a regular polygon with
    /// [`CIRCLE_APPROXIMATION_SIDES`] sides.
    pub fn approximate_circle(center: Point, radius: Coord) -> Polygon {
        let n = CIRCLE_APPROXIMATION_SIDES;
        let pts = (0..n)
            .map(|i| {
                let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                Point::new(
                    center.x + (radius as f64 * angle.cos()).round() as Coord,
                    center.y + (radius as f64 * angle.sin()).round() as Coord,
                )
            })
            .collect();
        Polygon::new(pts)
    }

    /// Converts the bed to its polygon-set representation, used when
    /// building the complement for irregular-bed IFP construction and as a
    /// fallback geometric view for kernels that want to measure the pile
    /// against the bed shape.
    pub fn to_polygon_set(&self) -> PolygonSet {
        match self {
            Bed::Infinite | Bed::Rectangle(_) | Bed::Segmented(_) => {
                let bb = self.bounding_box();
                let rect = Polygon::new(vec![
                    Point::new(bb.min.x, bb.min.y),
                    Point::new(bb.max.x, bb.min.y),
                    Point::new(bb.max.x, bb.max.y),
                    Point::new(bb.min.x, bb.max.y),
                ]);
                PolygonSet::new(vec![ExPolygon::from_contour(rect)])
            }
            Bed::Circle { center, radius } => {
                let poly = Self::approximate_circle(*center, *radius);
                PolygonSet::new(vec![ExPolygon::from_contour(poly)])
            }
            Bed::Irregular(poly) => PolygonSet::new(vec![poly.clone()]),
        }
    }

    pub fn offset(&self, amount_mm: f64) -> Bed {
        let amount = to_scaled(amount_mm);
        match self {
            Bed::Infinite => Bed::Infinite,
            Bed::Rectangle(bb) => Bed::Rectangle(bb.offset(amount)),
            Bed::Circle { center, radius } => Bed::Circle {
                center: *center,
                radius: (radius + amount).max(0),
            },
            Bed::Irregular(poly) => {
                let offset_set = crate::geometry::offset(
                    &PolygonSet::new(vec![poly.clone()]),
                    amount_mm,
                );
                Bed::Irregular(
                    offset_set
                        .polygons
                        .into_iter()
                        .next()
                        .unwrap_or_else(|| poly.clone()),
                )
            }
            Bed::Segmented(seg) => Bed::Segmented(SegmentedRectangle {
                bb: seg.bb.offset(amount),
                ..*seg
            }),
        }
    }

    /// Classifies an arbitrary outline as the closest bed variant, mirroring
    /// the host's auto-shape-detection: an outline whose area is within
    /// 0.1% of its bounding box's area is a rectangle; within 1% of the
    /// area of its minimal enclosing circle, a circle; otherwise irregular.
    pub fn classify(poly: &ExPolygon) -> Bed {
        let area = poly.area();
        if area <= 0.0 {
            return Bed::Irregular(poly.clone());
        }
        if let Some(bb) = poly.bounding_box() {
            let bb_area =
                crate::geometry::to_mm(bb.width()) * crate::geometry::to_mm(bb.height());
            if bb_area > 0.0 && ((bb_area - area) / bb_area).abs() < 1.0e-3 {
                return Bed::Rectangle(bb);
            }
            let center = bb.center();
            let radius = (bb.width().max(bb.height())) / 2;
            let circle_area = {
                let r = crate::geometry::to_mm(radius);
                std::f64::consts::PI * r * r
            };
            if circle_area > 0.0 && ((circle_area - area) / circle_area).abs() < 1.0e-2 {
                return Bed::Circle { center, radius };
            }
        }
        Bed::Irregular(poly.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_bounding_box_is_itself() {
        let bb = BoundingBox::new(Point::new(0, 0), Point::new(to_scaled(250.0), to_scaled(210.0)));
        let bed = Bed::Rectangle(bb);
        assert_eq!(bed.bounding_box(), bb);
    }

    #[test]
    fn circle_approximation_has_expected_side_count() {
        let poly = Bed::approximate_circle(Point::new(0, 0), to_scaled(50.0));
        assert_eq!(poly.points.len(), CIRCLE_APPROXIMATION_SIDES);
    }

    #[test]
    fn infinite_bed_is_finite_box() {
        let bb = Bed::Infinite.bounding_box();
        assert!(bb.width() > 0);
        assert!(bb.height() > 0);
    }

    #[test]
    fn classify_detects_rectangle() {
        let side = to_scaled(100.0);
        let rect = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ]);
        let bed = Bed::classify(&ExPolygon::from_contour(rect));
        assert!(matches!(bed, Bed::Rectangle(_)));
    }
}
