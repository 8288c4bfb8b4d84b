//! Axis-aligned bounding boxes over world coordinates.

use crate::stroke::StrokePoint;
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle `{x, y, width, height}` in world units.
/// Width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Minimal box covering all points. Empty input yields a degenerate
    /// zero-size box at the origin.
    pub fn of_points(points: &[StrokePoint]) -> Self {
        if points.is_empty() {
            return Self::default();
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for point in points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Grow symmetrically by `padding` on every side.
    pub fn expand(self, padding: f64) -> Self {
        Self {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + padding * 2.0,
            height: self.height + padding * 2.0,
        }
    }

    /// Minimal box covering both `self` and `other`.
    pub fn merge(self, other: Self) -> Self {
        Self::from_rect(self.to_rect().union(other.to_rect()))
    }

    /// Whether two boxes overlap. Two boxes intersect unless one lies
    /// entirely to one side of the other along either axis; touching
    /// edges count as intersecting.
    pub fn intersects(self, other: Self) -> bool {
        !(self.x > other.x + other.width
            || self.x + self.width < other.x
            || self.y > other.y + other.height
            || self.y + self.height < other.y)
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_points_empty() {
        let bounds = Bounds::of_points(&[]);
        assert_eq!(bounds, Bounds::default());
    }

    #[test]
    fn test_of_points() {
        let points = vec![
            StrokePoint::new(0.0, 0.0, 0.5),
            StrokePoint::new(10.0, 0.0, 0.5),
        ];
        let bounds = Bounds::of_points(&points);
        assert_eq!(bounds, Bounds::new(0.0, 0.0, 10.0, 0.0));
    }

    #[test]
    fn test_of_points_negative_coordinates() {
        let points = vec![
            StrokePoint::new(-5.0, 3.0, 1.0),
            StrokePoint::new(2.0, -7.0, 1.0),
        ];
        let bounds = Bounds::of_points(&points);
        assert_eq!(bounds, Bounds::new(-5.0, -7.0, 7.0, 10.0));
    }

    #[test]
    fn test_expand() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 0.0).expand(4.0);
        assert_eq!(bounds, Bounds::new(-4.0, -4.0, 18.0, 8.0));
    }

    #[test]
    fn test_merge() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(5.0, 5.0, 20.0, 2.0);
        assert_eq!(a.merge(b), Bounds::new(0.0, 0.0, 25.0, 10.0));
    }

    #[test]
    fn test_merge_disjoint() {
        let a = Bounds::new(-10.0, -10.0, 5.0, 5.0);
        let b = Bounds::new(10.0, 10.0, 5.0, 5.0);
        assert_eq!(a.merge(b), Bounds::new(-10.0, -10.0, 25.0, 25.0));
    }

    #[test]
    fn test_intersects() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(Bounds::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(Bounds::new(11.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(Bounds::new(0.0, -6.0, 5.0, 5.0)));
    }

    #[test]
    fn test_touching_edges_intersect() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(Bounds::new(10.0, 0.0, 5.0, 5.0)));
        assert!(a.intersects(Bounds::new(0.0, 10.0, 5.0, 5.0)));
        assert!(a.intersects(Bounds::new(-5.0, -5.0, 5.0, 5.0)));
    }

    #[test]
    fn test_degenerate_intersects() {
        // Zero-size box on an edge still counts.
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(Bounds::new(10.0, 10.0, 0.0, 0.0)));
    }
}
