//! Inner-fit-polygon construction: the locus of positions of an item's
//! local origin at which the item stays strictly inside a bed.

use crate::bed::Bed;
use crate::decompose;
use crate::geometry::{to_mm, ExPolygon, Point, Polygon, PolygonSet};

/// Intersects a convex polygon (represented as a point list, implicitly
/// closed) against a half-plane `{ p : normal · p <= offset }`, via
/// Sutherland-Hodgman clipping.
fn clip_halfplane(poly: &[(f64, f64)], normal: (f64, f64), offset: f64) -> Vec<(f64, f64)> {
    if poly.is_empty() {
        return Vec::new();
    }
    let inside = |p: (f64, f64)| normal.0 * p.0 + normal.1 * p.1 <= offset + 1e-7;
    let n = poly.len();
    let mut out = Vec::with_capacity(n + 1);
    for i in 0..n {
        let cur = poly[i];
        let nxt = poly[(i + 1) % n];
        let (cur_in, nxt_in) = (inside(cur), inside(nxt));
        if cur_in {
            out.push(cur);
        }
        if cur_in != nxt_in {
            let d0 = normal.0 * cur.0 + normal.1 * cur.1 - offset;
            let d1 = normal.0 * nxt.0 + normal.1 * nxt.1 - offset;
            let t = d0 / (d0 - d1);
            out.push((cur.0 + t * (nxt.0 - cur.0), cur.1 + t * (nxt.1 - cur.1)));
        }
    }
    out
}

/// Inner-fit polygon of `item_hull` (convex) inside the convex polygon
/// `container`, via the Minkowski-difference-as-half-plane-intersection
/// identity: for each edge of the container, keep the half-plane shifted
/// inward by the item's support distance in that edge's inward normal.
pub fn ifp_convex(container: &Polygon, item_hull: &Polygon) -> Polygon {
    let cont: Vec<(f64, f64)> = container.points.iter().map(|p| p.to_f64()).collect();
    let item: Vec<(f64, f64)> = item_hull.points.iter().map(|p| p.to_f64()).collect();

    let bb = container
        .bounding_box()
        .expect("container must have at least one vertex");
    let pad = 1.0;
    let (minx, miny) = (to_mm(bb.min.x) - pad, to_mm(bb.min.y) - pad);
    let (maxx, maxy) = (to_mm(bb.max.x) + pad, to_mm(bb.max.y) + pad);
    let mut clipped = vec![(minx, miny), (maxx, miny), (maxx, maxy), (minx, maxy)];

    let n = cont.len();
    for i in 0..n {
        if clipped.is_empty() {
            break;
        }
        let a = cont[i];
        let b = cont[(i + 1) % n];
        let edge = (b.0 - a.0, b.1 - a.1);
        // Inward normal of a CCW polygon: rotate the edge direction -90°.
        let normal = (-edge.1, edge.0);
        let support = item
            .iter()
            .map(|p| normal.0 * p.0 + normal.1 * p.1)
            .fold(f64::MIN, f64::max);
        let offset = normal.0 * a.0 + normal.1 * a.1 - support;
        clipped = clip_halfplane(&clipped, normal, offset);
    }

    Polygon::new(
        clipped
            .into_iter()
            .map(|(x, y)| decompose::requantize(x, y))
            .collect(),
    )
}

/// Inner-fit region of `item_hull` inside a possibly concave, possibly
/// holed bed outline: tessellate the complement of the bed (inside its
/// enclosing rectangle) into triangles, union their NFPs against the item,
/// and keep only the resulting holes — those are exactly the positions
/// fully inside the bed. Matches the construction used for genuinely
/// irregular beds, where a single convex half-plane clip does not apply.
pub fn ifp_irregular(bed_poly: &ExPolygon, item_hull: &Polygon) -> PolygonSet {
    let bb = match bed_poly.bounding_box() {
        Some(bb) => bb.offset(crate::geometry::to_scaled(1.0)),
        None => return PolygonSet::default(),
    };
    let rect = Polygon::new(vec![
        Point::new(bb.min.x, bb.min.y),
        Point::new(bb.max.x, bb.min.y),
        Point::new(bb.max.x, bb.max.y),
        Point::new(bb.min.x, bb.max.y),
    ]);
    let enclosing = PolygonSet::new(vec![ExPolygon::from_contour(rect)]);
    let bed_set = PolygonSet::new(vec![bed_poly.clone()]);
    let complement = enclosing.difference(&bed_set);

    let mut nfp_pieces = Vec::new();
    for region in &complement.polygons {
        let Ok(triangles) = decompose::decompose(region, 0) else {
            continue;
        };
        for tri in triangles {
            nfp_pieces.push(ExPolygon::from_contour(crate::nfp::nfp_convex_convex(
                &tri, item_hull,
            )));
        }
    }

    let mut union = PolygonSet::default();
    for piece in nfp_pieces {
        union = union.union(&PolygonSet::new(vec![piece]));
    }

    let holes = union
        .polygons
        .into_iter()
        .flat_map(|p| p.holes)
        .map(|hole| ExPolygon::from_contour(hole.ensure_ccw()))
        .collect();

    PolygonSet::new(holes)
}

/// Computes the inner-fit region of `item_hull` against `bed`, dispatching
/// on the bed's shape.
pub fn ifp(bed: &Bed, item_hull: &Polygon) -> PolygonSet {
    match bed {
        Bed::Infinite | Bed::Rectangle(_) | Bed::Segmented(_) => {
            let bb = bed.bounding_box();
            let rect = Polygon::new(vec![
                Point::new(bb.min.x, bb.min.y),
                Point::new(bb.max.x, bb.min.y),
                Point::new(bb.max.x, bb.max.y),
                Point::new(bb.min.x, bb.max.y),
            ]);
            let region = ifp_convex(&rect, item_hull);
            if region.points.is_empty() {
                PolygonSet::default()
            } else {
                PolygonSet::new(vec![ExPolygon::from_contour(region)])
            }
        }
        Bed::Circle { center, radius } => {
            let ring = Bed::approximate_circle(*center, *radius);
            let region = ifp_convex(&ring, item_hull);
            if region.points.is_empty() {
                PolygonSet::default()
            } else {
                PolygonSet::new(vec![ExPolygon::from_contour(region)])
            }
        }
        Bed::Irregular(poly) => ifp_irregular(poly, item_hull),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::to_scaled;

    fn square(side: f64) -> Polygon {
        let s = to_scaled(side);
        Polygon::new(vec![
            Point::new(0, 0),
            Point::new(s, 0),
            Point::new(s, s),
            Point::new(0, s),
        ])
    }

    #[test]
    fn ifp_of_small_item_in_rectangle_bed() {
        let container = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(to_scaled(100.0), 0),
            Point::new(to_scaled(100.0), to_scaled(100.0)),
            Point::new(0, to_scaled(100.0)),
        ]);
        let item = square(10.0);
        let region = ifp_convex(&container, &item);
        let bb = region.bounding_box().unwrap();
        assert_eq!(bb.width(), to_scaled(90.0));
        assert_eq!(bb.height(), to_scaled(90.0));
    }

    #[test]
    fn ifp_empty_when_item_too_big() {
        let container = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(to_scaled(5.0), 0),
            Point::new(to_scaled(5.0), to_scaled(5.0)),
            Point::new(0, to_scaled(5.0)),
        ]);
        let item = square(10.0);
        let region = ifp_convex(&container, &item);
        assert!(region.points.is_empty());
    }
}
