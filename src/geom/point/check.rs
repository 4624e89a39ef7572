use super::*;
use crate::geom::vector::Vector;

/// Checks if all points lie on one plane (within `tol`).
///
/// The plane is taken from the Newell normal of the sequence, so the check
/// also works for concave rings.
pub fn are_points_coplanar(pts: &[Point], tol: f64) -> bool {
    if pts.len() <= 3 {
        return true;
    }
    let Ok(vn) = Vector::newell_normal(pts) else {
        return are_points_collinear(pts, tol);
    };
    let p0 = pts[0];
    pts.iter().all(|p| (*p - p0).dot(&vn).abs() <= tol)
}

/// Checks if (multiple) points are collinear (within `tol`).
pub fn are_points_collinear(pts: &[Point], tol: f64) -> bool {
    if pts.len() <= 2 {
        return true; // 1 or 2 points are always collinear
    }
    // Use the farthest pair as the reference line
    let mut far = (0, 0, 0.);
    for i in 0..pts.len() {
        for j in (i + 1)..pts.len() {
            let d = pts[i].distance(&pts[j]);
            if d > far.2 {
                far = (i, j, d);
            }
        }
    }
    if far.2 <= tol {
        return true;
    }
    let (a, b) = (pts[far.0], pts[far.1]);
    pts.iter()
        .all(|p| crate::geom::segment::distance_point_to_line(*p, a, b) <= tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coplanar() {
        let pts = vec![
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(1., 1., 0.),
            Point::new(0., 1., 0.001),
        ];
        assert!(are_points_coplanar(&pts, 0.01));
        assert!(!are_points_coplanar(&pts, 0.0001));
    }

    #[test]
    fn test_collinear() {
        let pts = vec![
            Point::new(0., 0., 0.),
            Point::new(1., 1., 1.),
            Point::new(2., 2., 2.),
        ];
        assert!(are_points_collinear(&pts, 1e-6));
        let pts = vec![
            Point::new(0., 0., 0.),
            Point::new(1., 1., 1.),
            Point::new(2., 2., 3.),
        ];
        assert!(!are_points_collinear(&pts, 1e-6));
    }
}
