use crate::Point;
use crate::geom::EPS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Vector {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Vector from point `a` to point `b`.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            dx: b.x - a.x,
            dy: b.y - a.y,
            dz: b.z - a.z,
        }
    }

    pub fn length(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy + self.dz * self.dz).sqrt()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.dx * other.dx + self.dy * other.dy + self.dz * other.dz
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self {
            dx: self.dy * other.dz - self.dz * other.dy,
            dy: self.dz * other.dx - self.dx * other.dz,
            dz: self.dx * other.dy - self.dy * other.dx,
        }
    }

    /// Returns a unit-length copy. Zero-length vectors are returned unchanged.
    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len < EPS {
            return *self;
        }
        Self {
            dx: self.dx / len,
            dy: self.dy / len,
            dz: self.dz / len,
        }
    }

    pub fn is_close(&self, other: &Self) -> bool {
        (self.dx - other.dx).abs() < EPS
            && (self.dy - other.dy).abs() < EPS
            && (self.dz - other.dz).abs() < EPS
    }
}

/// Unit normal of the plane through the first three vertices of a polygon.
///
/// Follows the right-hand rule, so a counter-clockwise vertex order (viewed
/// from the side the normal points toward) gives the outward normal.
pub fn polygon_normal(pts: &[Point]) -> Vector {
    assert!(pts.len() >= 3, "normal needs at least 3 points");
    let e0 = Vector::from_points(pts[0], pts[1]);
    let e1 = Vector::from_points(pts[1], pts[2]);
    e0.cross(&e1).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross() {
        let x = Vector::new(1., 0., 0.);
        let z = Vector::new(0., 0., 1.);
        // x cross z = -y
        assert!(x.cross(&z).is_close(&Vector::new(0., -1., 0.)));
    }

    #[test]
    fn test_normalized() {
        let v = Vector::new(3., 4., 0.).normalized();
        assert!((v.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_polygon_normal_ccw_up() {
        // CCW square viewed from above -> normal points up
        let pts = vec![
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(1., 1., 0.),
            Point::new(0., 1., 0.),
        ];
        assert!(polygon_normal(&pts).is_close(&Vector::new(0., 0., 1.)));
    }

    #[test]
    fn test_polygon_normal_reversed_down() {
        let pts = vec![
            Point::new(0., 1., 0.),
            Point::new(1., 1., 0.),
            Point::new(1., 0., 0.),
            Point::new(0., 0., 0.),
        ];
        assert!(polygon_normal(&pts).is_close(&Vector::new(0., 0., -1.)));
    }
}
