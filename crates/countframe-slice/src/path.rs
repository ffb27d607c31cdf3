//! Open polylines in view coordinates.

use countframe_math::{point_to_segment_dist_2d, Point2};

/// An ordered sequence of connected points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    /// Points in order.
    pub points: Vec<Point2>,
}

impl Polyline {
    /// Create a new polyline.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Check if the polyline is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Shortest distance from `p` to any segment, `None` if empty.
    pub fn distance_to(&self, p: &Point2) -> Option<f64> {
        match self.points.as_slice() {
            [] => None,
            [only] => Some((p - only).norm()),
            points => points
                .windows(2)
                .map(|w| point_to_segment_dist_2d(p, &w[0], &w[1]))
                .reduce(f64::min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to() {
        let line = Polyline::new(vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0)]);
        approx::assert_relative_eq!(line.distance_to(&Point2::new(5.0, 2.0)).unwrap(), 2.0);
        approx::assert_relative_eq!(line.distance_to(&Point2::new(12.0, 5.0)).unwrap(), 2.0);
        assert!(Polyline::default().distance_to(&Point2::origin()).is_none());
        let dot = Polyline::new(vec![Point2::new(1.0, 1.0)]);
        approx::assert_relative_eq!(dot.distance_to(&Point2::new(4.0, 5.0)).unwrap(), 5.0);
    }
}
