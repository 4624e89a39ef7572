pub mod bboxes;
pub mod face;
pub mod plane;
pub mod point;
pub mod point2d;
pub mod polygon2d;
pub mod polyhedron;
pub mod polyline;
pub mod projection;
pub mod rotation;
pub mod segment;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-10;

/// Approximate float comparison.
pub trait IsClose {
    /// Compares with the default geometric precision `EPS`.
    fn is_close(&self, other: Self) -> bool;

    /// Compares with an explicit tolerance.
    fn is_close_tol(&self, other: Self, tol: f64) -> bool;
}

impl IsClose for f64 {
    fn is_close(&self, other: f64) -> bool {
        (self - other).abs() < EPS
    }

    fn is_close_tol(&self, other: f64, tol: f64) -> bool {
        (self - other).abs() <= tol
    }
}

/// Number of decimal places that resolve `tolerance`.
///
/// Used to round distances before sorting so float noise cannot reorder
/// points that sit within tolerance of each other.
pub fn tolerance_digits(tolerance: f64) -> i32 {
    if tolerance <= 0. {
        return 10;
    }
    (-tolerance.log10() - 1e-9).ceil().max(0.) as i32
}

/// Rounds `value` to the resolution returned by [`tolerance_digits`].
pub fn round_to_tolerance(value: f64, tolerance: f64) -> f64 {
    let factor = 10f64.powi(tolerance_digits(tolerance));
    (value * factor).round() / factor
}
