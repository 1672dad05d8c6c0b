//! No-fit-polygon construction.
//!
//! `nfp_convex_convex` computes the forbidden-translation region of one
//! convex polygon against another in O(n+m) via the angle-merged Minkowski
//! sum: the classic technique of walking both polygons' edge-vector lists,
//! already angularly sorted by convexity, in lock-step. Concave shapes are
//! handled one layer up by unioning the NFP of every pair of convex parts
//! from each side's decomposition.

use std::cmp::Ordering;

use crate::geometry::{ExPolygon, Point, Polygon, PolygonSet};

/// Quadrant bucket used to totally order direction vectors by angle
/// without computing a transcendental `atan2`.
fn quadrant(p: Point) -> u8 {
    if p.x > 0 && p.y >= 0 {
        0
    } else if p.x <= 0 && p.y > 0 {
        1
    } else if p.x < 0 && p.y <= 0 {
        2
    } else {
        3
    }
}

fn cross(a: Point, b: Point) -> i128 {
    a.x as i128 * b.y as i128 - a.y as i128 * b.x as i128
}

/// Orders two direction vectors by their angle in `[0, 2π)`, matching the
/// winding direction of a CCW convex polygon's edge sequence.
fn cmp_angle(a: Point, b: Point) -> Ordering {
    let (qa, qb) = (quadrant(a), quadrant(b));
    if qa != qb {
        qa.cmp(&qb)
    } else {
        match cross(a, b) {
            c if c > 0 => Ordering::Less,
            c if c < 0 => Ordering::Greater,
            _ => Ordering::Equal,
        }
    }
}

fn min_vertex_index(poly: &Polygon) -> usize {
    poly.points
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| (p.y, p.x))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn rotated_to_start_at_min(poly: &Polygon) -> Vec<Point> {
    let start = min_vertex_index(poly);
    let n = poly.points.len();
    (0..n).map(|i| poly.points[(start + i) % n]).collect()
}

fn edge_vectors(pts: &[Point]) -> Vec<Point> {
    let n = pts.len();
    (0..n)
        .map(|i| {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            Point::new(b.x - a.x, b.y - a.y)
        })
        .collect()
}

/// Reflects a convex polygon through its own local origin. A point
/// reflection is orientation-preserving in 2D, so winding order (and thus
/// the angular sort of edges) is unaffected.
fn reflected(poly: &Polygon) -> Polygon {
    Polygon::new(poly.points.iter().map(|p| Point::new(-p.x, -p.y)).collect())
}

/// Minkowski sum of two convex, CCW polygons via angle-merged edge walking.
fn minkowski_sum_convex(a: &Polygon, b: &Polygon) -> Polygon {
    let a_pts = rotated_to_start_at_min(a);
    let b_pts = rotated_to_start_at_min(b);
    let a_edges = edge_vectors(&a_pts);
    let b_edges = edge_vectors(&b_pts);

    let start = Point::new(a_pts[0].x + b_pts[0].x, a_pts[0].y + b_pts[0].y);
    let mut cur = start;
    let mut out = Vec::with_capacity(a_edges.len() + b_edges.len());
    out.push(cur);

    let (mut i, mut j) = (0, 0);
    while i < a_edges.len() || j < b_edges.len() {
        let take_a = if i >= a_edges.len() {
            false
        } else if j >= b_edges.len() {
            true
        } else {
            cmp_angle(a_edges[i], b_edges[j]) != Ordering::Greater
        };
        let e = if take_a {
            let e = a_edges[i];
            i += 1;
            e
        } else {
            let e = b_edges[j];
            j += 1;
            e
        };
        cur = cur.translated(e.x, e.y);
        out.push(cur);
    }
    out.pop(); // closing point duplicates `start`
    Polygon::new(out)
}

/// No-fit-polygon of `moving` around `fixed`: the set of translations
/// applicable to `moving`'s local origin at which it touches or overlaps
/// `fixed`. Both inputs must be convex and CCW-wound.
pub fn nfp_convex_convex(fixed: &Polygon, moving: &Polygon) -> Polygon {
    minkowski_sum_convex(fixed, &reflected(moving))
}

/// No-fit-polygon of a (possibly concave) moving outline around a
/// (possibly concave) fixed outline, given each side's convex decomposition:
/// the union of the pairwise convex NFPs.
pub fn nfp_concave_concave(fixed_parts: &[Polygon], moving_parts: &[Polygon]) -> PolygonSet {
    let mut pieces = Vec::with_capacity(fixed_parts.len() * moving_parts.len());
    for fp in fixed_parts {
        for mp in moving_parts {
            if fp.points.len() < 3 || mp.points.len() < 3 {
                continue;
            }
            pieces.push(ExPolygon::from_contour(nfp_convex_convex(fp, mp)));
        }
    }
    union_all(pieces)
}

fn union_all(pieces: Vec<ExPolygon>) -> PolygonSet {
    let mut acc = PolygonSet::default();
    for piece in pieces {
        acc = acc.union(&PolygonSet::new(vec![piece]));
    }
    acc
}
