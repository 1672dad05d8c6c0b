//! Arc-length parametrization of a polygon's boundary, used by the
//! optimizer to turn a scalar search parameter into a candidate point on
//! the feasible region's contour.

use crate::geometry::Point;

/// Samples a contour at a stride that shrinks as `accuracy` rises toward 1,
/// mirroring the density/quality tradeoff of the original cache: an
/// `accuracy` of 1 samples every vertex, lower values thin the sampling.
fn stride(n: usize, accuracy: f64) -> usize {
    if n == 0 {
        return 1;
    }
    let accuracy = accuracy.clamp(1.0e-3, 1.0);
    let divisor = (n as f64).powf(accuracy.powf(1.0 / 3.0));
    let s = (n as f64 / divisor).round() as usize;
    s.max(1)
}

/// Cumulative arc-length table over a contour's vertices (and, through
/// [`EdgeCache::sample_polygon_set`], over every contour and hole of a
/// polygon set), supporting point lookup by fractional distance along the
/// perimeter via binary search plus linear interpolation.
#[derive(Debug, Clone)]
pub struct EdgeCache {
    points: Vec<Point>,
    cumulative: Vec<f64>,
    total_length: f64,
}

impl EdgeCache {
    pub fn from_contour(contour: &[Point], accuracy: f64) -> Self {
        let n = contour.len();
        if n == 0 {
            return Self {
                points: Vec::new(),
                cumulative: Vec::new(),
                total_length: 0.0,
            };
        }
        let step = stride(n, accuracy);
        let sampled: Vec<Point> = contour.iter().step_by(step).copied().collect();
        Self::from_points(&sampled)
    }

    fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut cumulative = Vec::with_capacity(n + 1);
        cumulative.push(0.0);
        let mut total = 0.0;
        for i in 0..n {
            let a = points[i];
            let b = points[(i + 1) % n];
            total += (a.dist_sq(b) as f64).sqrt();
            cumulative.push(total);
        }
        Self {
            points: points.to_vec(),
            cumulative,
            total_length: total,
        }
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Number of sampled points backing this cache's parametrization.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.total_length <= 0.0
    }

    /// Returns the point at fractional distance `t` (`0.0..=1.0`) along the
    /// perimeter, via binary search over the cumulative table followed by
    /// linear interpolation between the bracketing vertices.
    pub fn coords(&self, t: f64) -> Point {
        if self.is_empty() {
            return Point::new(0, 0);
        }
        let target = t.clamp(0.0, 1.0) * self.total_length;
        let idx = match self
            .cumulative
            .binary_search_by(|d| d.partial_cmp(&target).unwrap())
        {
            Ok(i) => i,
            Err(i) => i,
        };
        let idx = idx.clamp(1, self.cumulative.len() - 1);
        let seg_start = self.cumulative[idx - 1];
        let seg_end = self.cumulative[idx];
        let a = self.points[(idx - 1) % self.points.len()];
        let b = self.points[idx % self.points.len()];
        let seg_len = seg_end - seg_start;
        let frac = if seg_len > 0.0 {
            (target - seg_start) / seg_len
        } else {
            0.0
        };
        Point::new(
            a.x + ((b.x - a.x) as f64 * frac).round() as i64,
            a.y + ((b.y - a.y) as f64 * frac).round() as i64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::to_scaled;

    fn square(side: f64) -> Vec<Point> {
        let s = to_scaled(side);
        vec![
            Point::new(0, 0),
            Point::new(s, 0),
            Point::new(s, s),
            Point::new(0, s),
        ]
    }

    #[test]
    fn total_length_matches_perimeter() {
        let cache = EdgeCache::from_contour(&square(10.0), 1.0);
        assert!((cache.total_length() - 40.0 * crate::geometry::SCALE).abs() < 1.0);
    }

    #[test]
    fn coords_at_zero_is_first_vertex() {
        let cache = EdgeCache::from_contour(&square(10.0), 1.0);
        assert_eq!(cache.coords(0.0), Point::new(0, 0));
    }

    #[test]
    fn stride_shrinks_with_lower_accuracy() {
        assert!(stride(1000, 0.1) >= stride(1000, 1.0));
    }
}
