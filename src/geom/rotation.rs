use crate::geom::IsClose;
use crate::geom::point::Point;
use crate::geom::point::convert::{array_to_points, points_to_array};
use crate::geom::vector::Vector;
use anyhow::Result;
use ndarray as nd;

/// Rotation matrix for the axis `u` and angle `phi` (radians).
///
/// Rodrigues' formula: `R = I + sin(phi) W + 2 sin^2(phi / 2) W^2`,
/// where `W` is the cross-product matrix of the normalized axis.
pub fn rotation_matrix(u: &Vector, phi: f64) -> Result<nd::Array2<f64>> {
    let u = u.normalize()?;
    let w: nd::Array2<f64> = nd::arr2(&[[0., -u.dz, u.dy], [u.dz, 0., -u.dx], [-u.dy, u.dx, 0.]]);

    Ok(nd::Array::eye(3) + phi.sin() * &w + (2. * (phi / 2.).sin().powi(2)) * w.dot(&w))
}

/// Rotate points around the axis through `origin` along `u` by `phi` (radians).
pub fn rotate_points_around_axis(
    pts: &[Point],
    origin: Point,
    u: &Vector,
    phi: f64,
) -> Result<Vec<Point>> {
    if phi.abs().is_close(0.) {
        return Ok(pts.to_vec());
    }
    let rot = rotation_matrix(u, phi)?;
    let shifted: Vec<Point> = pts
        .iter()
        .map(|p| Point::new(p.x - origin.x, p.y - origin.y, p.z - origin.z))
        .collect();
    // Row vectors: p' = p R^T
    let rotated = points_to_array(&shifted).dot(&rot.t());
    Ok(array_to_points(&rotated)
        .into_iter()
        .map(|p| p + Vector::from_a_point(origin))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotate_points_around_y() {
        let p0 = Point::new(1.0, 0.0, 0.0);
        let p1 = Point::new(0.0, 1.0, 0.0);
        let p2 = Point::new(0.0, 0.0, 0.0);
        let u = Vector::new(0., 1., 0.);
        let phi = -std::f64::consts::PI / 2.;

        let rotated = rotate_points_around_axis(&[p0, p1, p2], p2, &u, phi).unwrap();

        assert!(rotated[0].is_close(&Point::new(0.0, 0.0, 1.0)));
        assert!(rotated[1].is_close(&Point::new(0.0, 1.0, 0.0)));
        assert!(rotated[2].is_close(&Point::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rotate_around_offset_vertical_axis() {
        let origin = Point::new(1.0, 1.0, 0.0);
        let p = Point::new(2.0, 1.0, 5.0);
        let u = Vector::new(0., 0., 1.);
        let rotated = rotate_points_around_axis(&[p], origin, &u, std::f64::consts::FRAC_PI_2).unwrap();
        assert!(rotated[0].is_close_tol(&Point::new(1.0, 2.0, 5.0), 1e-12));
    }
}
