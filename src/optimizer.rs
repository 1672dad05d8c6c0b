//! A bounded, derivative-free local optimizer over a feasible region's
//! contour, parametrized by [`crate::edge_cache::EdgeCache`].
//!
//! Mirrors the original's "subplex-style" local search without pulling in
//! an external nonlinear-optimization dependency: vertices are scored first
//! (the cheap path, also the only path for "simple" shapes with few
//! vertices), then the neighbourhood of the best vertex is refined with a
//! golden-section bracket narrowing bounded by an iteration budget.

use crate::cancellation::CancellationToken;
use crate::edge_cache::EdgeCache;
use crate::geometry::Point;

/// Below this vertex count the optimizer only scores vertices; a bracket
/// search over so few samples would not find anything a direct scan
/// misses.
const SIMPLE_SHAPE_VERTEX_THRESHOLD: usize = 8;

const GOLDEN_RATIO: f64 = 0.618_033_988_749_895;

#[derive(Debug, Clone, Copy)]
pub struct OptimizerSettings {
    pub accuracy: f64,
    pub rel_tol: f64,
}

impl OptimizerSettings {
    pub fn new(accuracy: f64) -> Self {
        Self {
            accuracy,
            rel_tol: 1.0e-20,
        }
    }

    pub fn max_iters(&self) -> usize {
        (1000.0 * self.accuracy).floor().max(1.0) as usize
    }
}

/// The result of an optimization pass: the best score found (higher is
/// better) and the point that achieves it.
#[derive(Debug, Clone, Copy)]
pub struct OptimizerResult {
    pub score: f64,
    pub point: Point,
}

/// Number of vertex samples used to seed the bracket search: the cache's
/// own sampled point count, so the coarse-sampling density actually tracks
/// the `accuracy` setting that drove `EdgeCache`'s stride.
fn vertex_count_hint(cache: &EdgeCache) -> usize {
    cache.point_count()
}

/// Finds the best-scoring point on `cache`'s contour according to
/// `fitness`. Returns `None` when the contour is empty (feasible region
/// has zero area) or `cancel` fires mid-search.
pub fn optimize(
    cache: &EdgeCache,
    settings: OptimizerSettings,
    cancel: &CancellationToken,
    mut fitness: impl FnMut(Point) -> f64,
) -> Option<OptimizerResult> {
    if cache.is_empty() {
        return None;
    }

    let samples = vertex_count_hint(cache).min(1000).max(16);
    let mut best_t = 0.0;
    let mut best_score = f64::NEG_INFINITY;
    for i in 0..samples {
        if cancel.is_canceled() {
            return None;
        }
        let t = i as f64 / samples as f64;
        let p = cache.coords(t);
        let score = fitness(p);
        if score > best_score {
            best_score = score;
            best_t = t;
        }
    }

    if samples <= SIMPLE_SHAPE_VERTEX_THRESHOLD {
        return Some(OptimizerResult {
            score: best_score,
            point: cache.coords(best_t),
        });
    }

    let window = 1.0 / samples as f64;
    let mut lo = (best_t - window).max(0.0);
    let mut hi = (best_t + window).min(1.0);

    let mut c = hi - GOLDEN_RATIO * (hi - lo);
    let mut d = lo + GOLDEN_RATIO * (hi - lo);
    let mut fc = fitness(cache.coords(c));
    let mut fd = fitness(cache.coords(d));

    for _ in 0..settings.max_iters() {
        if cancel.is_canceled() {
            break;
        }
        if (hi - lo).abs() < settings.rel_tol {
            break;
        }
        if fc > fd {
            hi = d;
            d = c;
            fd = fc;
            c = hi - GOLDEN_RATIO * (hi - lo);
            fc = fitness(cache.coords(c));
        } else {
            lo = c;
            c = d;
            fc = fd;
            d = lo + GOLDEN_RATIO * (hi - lo);
            fd = fitness(cache.coords(d));
        }
    }

    let (t_final, score_final) = if fc > fd { (c, fc) } else { (d, fd) };
    if score_final > best_score {
        Some(OptimizerResult {
            score: score_final,
            point: cache.coords(t_final),
        })
    } else {
        Some(OptimizerResult {
            score: best_score,
            point: cache.coords(best_t),
        })
    }
}
