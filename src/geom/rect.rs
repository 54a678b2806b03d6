use crate::Point;
use crate::geom::EPS;

/// Axis-aligned rectangle in the XY plane, defined by its minimum corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub width: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, length: f64, width: f64) -> Self {
        Self {
            x,
            y,
            length,
            width,
        }
    }

    pub fn area(&self) -> f64 {
        self.length * self.width
    }

    pub fn min_dimension(&self) -> f64 {
        self.length.min(self.width)
    }

    /// The 4 corners in counter-clockwise order viewed from above (+Z),
    /// starting at the minimum corner, placed at elevation `z`.
    pub fn corners_ccw(&self, z: f64) -> [Point; 4] {
        [
            Point::new(self.x, self.y, z),
            Point::new(self.x + self.length, self.y, z),
            Point::new(self.x + self.length, self.y + self.width, z),
            Point::new(self.x, self.y + self.width, z),
        ]
    }

    /// Checks whether an XY position lies inside the rectangle (with tolerance).
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        x > self.x - EPS
            && x < self.x + self.length + EPS
            && y > self.y - EPS
            && y < self.y + self.width + EPS
    }

    /// True if the interiors of both rectangles intersect.
    ///
    /// Shared edges do not count as overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        let sep_x =
            self.x + self.length <= other.x + EPS || other.x + other.length <= self.x + EPS;
        let sep_y = self.y + self.width <= other.y + EPS || other.y + other.width <= self.y + EPS;
        !(sep_x || sep_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area() {
        let r = Rect::new(0., 0., 4., 3.);
        assert!((r.area() - 12.0).abs() < EPS);
        assert!((r.min_dimension() - 3.0).abs() < EPS);
    }

    #[test]
    fn test_corners_ccw() {
        let r = Rect::new(1., 2., 3., 4.);
        let c = r.corners_ccw(0.5);
        assert!(c[0].is_close(&Point::new(1., 2., 0.5)));
        assert!(c[1].is_close(&Point::new(4., 2., 0.5)));
        assert!(c[2].is_close(&Point::new(4., 6., 0.5)));
        assert!(c[3].is_close(&Point::new(1., 6., 0.5)));
    }

    #[test]
    fn test_contains_xy() {
        let r = Rect::new(0., 0., 2., 2.);
        assert!(r.contains_xy(1., 1.));
        assert!(r.contains_xy(0., 0.)); // boundary counts as inside
        assert!(!r.contains_xy(2.5, 1.));
    }

    #[test]
    fn test_overlaps() {
        let a = Rect::new(0., 0., 2., 2.);
        let b = Rect::new(1., 1., 2., 2.);
        let c = Rect::new(2., 0., 2., 2.); // shares an edge with a
        let d = Rect::new(5., 5., 1., 1.);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }
}
