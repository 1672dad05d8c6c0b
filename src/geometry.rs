//! Scaled-integer geometry primitives.
//!
//! Coordinates are stored as `i64` "scaled units" (≈10⁶ per millimeter) so
//! that NFP/IFP construction and angle comparisons run on exact integer
//! arithmetic. Conversion to `f64` millimeters only happens at the boundary
//! with `geo`/`geo-buffer`, which is used for boolean ops and offsetting.

use geo::{BooleanOps, BoundingRect, ConvexHull, Simplify};
use serde::{Deserialize, Serialize};

/// Scaled integer coordinate, roughly 10⁻⁶ mm per unit.
pub type Coord = i64;

/// Units per millimeter for the scaled coordinate system.
pub const SCALE: f64 = 1_000_000.0;

pub fn to_scaled(mm: f64) -> Coord {
    (mm * SCALE).round() as Coord
}

pub fn to_mm(c: Coord) -> f64 {
    c as f64 / SCALE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    pub fn translated(self, dx: Coord, dy: Coord) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Squared Euclidean distance, kept as `i128` to avoid overflow on the
    /// products of scaled coordinates.
    pub fn dist_sq(self, other: Point) -> i128 {
        let dx = (self.x - other.x) as i128;
        let dy = (self.y - other.y) as i128;
        dx * dx + dy * dy
    }

    /// Euclidean distance (scaled units).
    pub fn dist(self, other: Point) -> f64 {
        (self.dist_sq(other) as f64).sqrt()
    }

    pub fn to_f64(self) -> (f64, f64) {
        (to_mm(self.x), to_mm(self.y))
    }
}

/// Axis-aligned bounding box in scaled units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        let mut iter = points.iter();
        let first = *iter.next()?;
        let mut bb = Self::new(first, first);
        for &p in iter {
            bb.min.x = bb.min.x.min(p.x);
            bb.min.y = bb.min.y.min(p.y);
            bb.max.x = bb.max.x.max(p.x);
            bb.max.y = bb.max.y.max(p.y);
        }
        Some(bb)
    }

    pub fn width(&self) -> Coord {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> Coord {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2,
            (self.min.y + self.max.y) / 2,
        )
    }

    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }

    pub fn offset(&self, amount: Coord) -> Self {
        Self::new(
            Point::new(self.min.x - amount, self.min.y - amount),
            Point::new(self.max.x + amount, self.max.y + amount),
        )
    }

    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// A simple polygon: CCW winding for outer contours, CW for holes, per
/// `ExPolygon` convention below. No implicit closing point is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Polygon {
    pub points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.len() < 3
    }

    /// Signed area (shoelace formula, doubled); positive for CCW winding.
    pub fn signed_area_x2(&self) -> i128 {
        let n = self.points.len();
        if n < 3 {
            return 0;
        }
        let mut acc: i128 = 0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            acc += a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
        }
        acc
    }

    pub fn area(&self) -> f64 {
        (self.signed_area_x2().unsigned_abs() as f64) / 2.0 / (SCALE * SCALE)
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area_x2() > 0
    }

    pub fn reversed(&self) -> Self {
        let mut pts = self.points.clone();
        pts.reverse();
        Self::new(pts)
    }

    pub fn ensure_ccw(&self) -> Self {
        if self.is_ccw() {
            self.clone()
        } else {
            self.reversed()
        }
    }

    pub fn ensure_cw(&self) -> Self {
        if self.is_ccw() {
            self.reversed()
        } else {
            self.clone()
        }
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }

    pub fn translated(&self, dx: Coord, dy: Coord) -> Self {
        Self::new(self.points.iter().map(|p| p.translated(dx, dy)).collect())
    }

    /// Rotates about the origin by `angle` radians, rounding back to scaled
    /// integers. Rotation happens in f64 millimeter space because scaled
    /// integers have no exact representation of irrational trig values.
    pub fn rotated(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let pts = self
            .points
            .iter()
            .map(|p| {
                let x = p.x as f64;
                let y = p.y as f64;
                Point::new(
                    (x * c - y * s).round() as Coord,
                    (x * s + y * c).round() as Coord,
                )
            })
            .collect();
        Self::new(pts)
    }

    pub fn centroid(&self) -> Point {
        let n = self.points.len();
        if n == 0 {
            return Point::new(0, 0);
        }
        let mut cx: i128 = 0;
        let mut cy: i128 = 0;
        let mut area2: i128 = 0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            let cross = a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128;
            area2 += cross;
            cx += (a.x as i128 + b.x as i128) * cross;
            cy += (a.y as i128 + b.y as i128) * cross;
        }
        if area2 == 0 {
            return self.points[0];
        }
        Point::new((cx / (3 * area2)) as Coord, (cy / (3 * area2)) as Coord)
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let ext: Vec<(f64, f64)> = self.points.iter().map(|p| p.to_f64()).collect();
        geo::Polygon::new(geo::LineString::from(ext), vec![])
    }

    pub fn from_geo(poly: &geo::LineString<f64>) -> Self {
        let points = poly
            .points()
            .map(|p| Point::new(to_scaled(p.x()), to_scaled(p.y())))
            .collect::<Vec<_>>();
        let mut pts = points;
        // geo LineStrings are closed (first == last); drop the duplicate.
        if pts.len() > 1 && pts.first() == pts.last() {
            pts.pop();
        }
        Self::new(pts)
    }

    pub fn convex_hull(&self) -> Self {
        let hull = self.to_geo().convex_hull();
        Self::from_geo(hull.exterior())
    }

    /// Douglas-Peucker simplification with a tolerance in millimeters.
    pub fn simplified(&self, tolerance_mm: f64) -> Self {
        let simplified = self.to_geo().exterior().simplify(&tolerance_mm);
        Self::from_geo(&simplified)
    }
}

/// An outer contour with zero or more holes. Mirrors the convention used by
/// `geo`'s `Polygon`: exterior ring CCW, interior rings CW.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExPolygon {
    pub contour: Polygon,
    pub holes: Vec<Polygon>,
}

impl ExPolygon {
    pub fn new(contour: Polygon, holes: Vec<Polygon>) -> Self {
        Self {
            contour: contour.ensure_ccw(),
            holes: holes.into_iter().map(|h| h.ensure_cw()).collect(),
        }
    }

    pub fn from_contour(contour: Polygon) -> Self {
        Self::new(contour, vec![])
    }

    pub fn area(&self) -> f64 {
        self.contour.area() - self.holes.iter().map(Polygon::area).sum::<f64>()
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.contour.bounding_box()
    }

    pub fn translated(&self, dx: Coord, dy: Coord) -> Self {
        Self {
            contour: self.contour.translated(dx, dy),
            holes: self.holes.iter().map(|h| h.translated(dx, dy)).collect(),
        }
    }

    pub fn rotated(&self, angle: f64) -> Self {
        Self {
            contour: self.contour.rotated(angle),
            holes: self.holes.iter().map(|h| h.rotated(angle)).collect(),
        }
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let ext: Vec<(f64, f64)> = self.contour.points.iter().map(|p| p.to_f64()).collect();
        let holes: Vec<geo::LineString<f64>> = self
            .holes
            .iter()
            .map(|h| geo::LineString::from(h.points.iter().map(|p| p.to_f64()).collect::<Vec<_>>()))
            .collect();
        geo::Polygon::new(geo::LineString::from(ext), holes)
    }

    pub fn from_geo(poly: &geo::Polygon<f64>) -> Self {
        let contour = Polygon::from_geo(poly.exterior());
        let holes = poly.interiors().iter().map(Polygon::from_geo).collect();
        Self::new(contour, holes)
    }

    /// Simplifies the contour and every hole independently, each with
    /// tolerance `tolerance_mm`.
    pub fn simplified(&self, tolerance_mm: f64) -> Self {
        Self::new(
            self.contour.simplified(tolerance_mm),
            self.holes.iter().map(|h| h.simplified(tolerance_mm)).collect(),
        )
    }
}

/// A set of (possibly disjoint, possibly nested) `ExPolygon`s, the currency
/// type for boolean operations (feasible regions, merged piles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PolygonSet {
    pub polygons: Vec<ExPolygon>,
}

impl PolygonSet {
    pub fn new(polygons: Vec<ExPolygon>) -> Self {
        Self { polygons }
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn area(&self) -> f64 {
        self.polygons.iter().map(ExPolygon::area).sum()
    }

    pub fn to_geo(&self) -> geo::MultiPolygon<f64> {
        geo::MultiPolygon::new(self.polygons.iter().map(ExPolygon::to_geo).collect())
    }

    pub fn from_geo(mp: &geo::MultiPolygon<f64>) -> Self {
        Self::new(mp.0.iter().map(ExPolygon::from_geo).collect())
    }

    pub fn union(&self, other: &PolygonSet) -> PolygonSet {
        let merged = self.to_geo().union(&other.to_geo());
        PolygonSet::from_geo(&merged)
    }

    pub fn difference(&self, other: &PolygonSet) -> PolygonSet {
        let diff = self.to_geo().difference(&other.to_geo());
        PolygonSet::from_geo(&diff)
    }

    pub fn intersection(&self, other: &PolygonSet) -> PolygonSet {
        let inter = self.to_geo().intersection(&other.to_geo());
        PolygonSet::from_geo(&inter)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let rect = self.to_geo().bounding_rect()?;
        Some(BoundingBox::new(
            Point::new(to_scaled(rect.min().x), to_scaled(rect.min().y)),
            Point::new(to_scaled(rect.max().x), to_scaled(rect.max().y)),
        ))
    }

    pub fn convex_hull_area(&self) -> f64 {
        let hull = self.to_geo().convex_hull();
        let p = Polygon::from_geo(hull.exterior());
        p.area()
    }
}

/// Inflates (positive) or erodes (negative) a polygon set by `dist_mm`
/// millimeters using `geo-buffer`'s polygon offsetting.
pub fn offset(set: &PolygonSet, dist_mm: f64) -> PolygonSet {
    let mut out = Vec::new();
    for p in &set.polygons {
        let buffered = geo_buffer::buffer_polygon(&p.to_geo(), dist_mm);
        out.extend(buffered.0.iter().map(ExPolygon::from_geo));
    }
    PolygonSet::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: Coord) -> Polygon {
        Polygon::new(vec![
            Point::new(0, 0),
            Point::new(side, 0),
            Point::new(side, side),
            Point::new(0, side),
        ])
    }

    #[test]
    fn area_of_unit_square() {
        let side = to_scaled(10.0);
        let sq = square(side);
        assert!((sq.area() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn ccw_detection() {
        let sq = square(to_scaled(1.0));
        assert!(sq.is_ccw());
        assert!(!sq.reversed().is_ccw());
    }

    #[test]
    fn translate_roundtrip() {
        let sq = square(to_scaled(1.0));
        let moved = sq.translated(10, 20).translated(-10, -20);
        assert_eq!(sq, moved);
    }

    #[test]
    fn bbox_of_square() {
        let side = to_scaled(5.0);
        let sq = square(side);
        let bb = sq.bounding_box().unwrap();
        assert_eq!(bb.width(), side);
        assert_eq!(bb.height(), side);
    }
}
