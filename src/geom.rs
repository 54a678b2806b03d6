pub mod point;
pub mod rect;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-9;

/// Closeness check for scalars, mirroring `Point::is_close`.
pub trait IsClose {
    fn is_close(&self, other: f64) -> bool;
}

impl IsClose for f64 {
    fn is_close(&self, other: f64) -> bool {
        (self - other).abs() < EPS
    }
}
