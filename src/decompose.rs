//! Convex decomposition of a (possibly concave, possibly holed) outline
//! into a set of convex polygons, via constrained triangulation.
//!
//! Every triangle earcut produces is trivially convex, so the decomposition
//! invariant ("every piece is convex") holds without further splitting.

use crate::error::{ArrangeError, Result};
use crate::geometry::{to_mm, to_scaled, ExPolygon, Point, Polygon};

/// Decomposes `outline` into convex pieces. `item_id` is only used to
/// attribute a failure to the offending item in the returned error.
pub fn decompose(outline: &ExPolygon, item_id: u64) -> Result<Vec<Polygon>> {
    if outline.contour.points.len() < 3 {
        return Err(ArrangeError::DecompositionFailed(
            item_id,
            "outline has fewer than 3 vertices".to_string(),
        ));
    }

    let mut data = Vec::new();
    let mut hole_indices = Vec::new();
    let mut vertices = Vec::new();

    for p in &outline.contour.points {
        push_vertex(&mut data, &mut vertices, *p);
    }
    for hole in &outline.holes {
        hole_indices.push(vertices.len());
        for p in &hole.points {
            push_vertex(&mut data, &mut vertices, *p);
        }
    }

    let triangle_indices = earcutr::earcut(&data, &hole_indices, 2)
        .map_err(|e| ArrangeError::DecompositionFailed(item_id, format!("{e:?}")))?;

    if triangle_indices.len() % 3 != 0 {
        return Err(ArrangeError::DecompositionFailed(
            item_id,
            "triangulation returned a non-multiple-of-3 index list".to_string(),
        ));
    }

    let triangles = triangle_indices
        .chunks(3)
        .map(|tri| Polygon::new(vec![vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]]))
        .filter(|p| p.signed_area_x2() != 0)
        .collect();

    Ok(triangles)
}

fn push_vertex(data: &mut Vec<f64>, vertices: &mut Vec<Point>, p: Point) {
    data.push(to_mm(p.x));
    data.push(to_mm(p.y));
    vertices.push(p);
}

/// Re-quantizes an earcut vertex back to scaled units; kept separate from
/// `push_vertex` so callers constructing synthetic triangles (tests, the
/// irregular-bed complement) can reuse the same rounding rule.
pub fn requantize(x: f64, y: f64) -> Point {
    Point::new(to_scaled(x), to_scaled(y))
}
