use crate::geom::point::Point;
use crate::geom::point2d::Point2D;
use crate::geom::vector::Vector;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Below this vertical normal component a plane is treated as vertical.
const VERTICAL_NZ: f64 = 1e-9;

/// Infinite plane through `origin` with unit normal `vn`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point,
    pub vn: Vector,
}

impl Plane {
    pub fn new(origin: Point, normal: Vector) -> Result<Self> {
        Ok(Self {
            origin,
            vn: normal.normalize()?,
        })
    }

    /// Plane through a ring of points, oriented by the ring's winding.
    pub fn from_points(pts: &[Point]) -> Result<Self> {
        if pts.len() < 3 {
            return Err(anyhow!("A plane needs at least 3 points, got {}", pts.len()));
        }
        let vn = Vector::newell_normal(pts)?;
        Ok(Self { origin: pts[0], vn })
    }

    /// Horizontal plane at elevation `z` facing up.
    pub fn horizontal(z: f64) -> Self {
        Self {
            origin: Point::new(0., 0., z),
            vn: Vector::new(0., 0., 1.),
        }
    }

    /// Signed distance (positive on the normal side).
    pub fn signed_distance(&self, pt: Point) -> f64 {
        (pt - self.origin).dot(&self.vn)
    }

    pub fn distance_to_point(&self, pt: Point) -> f64 {
        self.signed_distance(pt).abs()
    }

    /// Closest point on the plane.
    pub fn closest_point(&self, pt: Point) -> Point {
        pt + self.vn * -self.signed_distance(pt)
    }

    pub fn is_vertical(&self) -> bool {
        self.vn.dz.abs() < VERTICAL_NZ
    }

    /// Elevation of the plane above the plan point `(x, y)`.
    ///
    /// Returns `None` for vertical planes, which have no single elevation.
    pub fn z_at(&self, x: f64, y: f64) -> Option<f64> {
        if self.is_vertical() {
            return None;
        }
        let n = self.vn;
        let o = self.origin;
        Some(o.z - (n.dx * (x - o.x) + n.dy * (y - o.y)) / n.dz)
    }

    /// Projects a plan point vertically onto the plane.
    pub fn project_vertical(&self, pt: Point2D) -> Option<Point> {
        self.z_at(pt.x, pt.y).map(|z| Point::new(pt.x, pt.y, z))
    }

    /// Intersection of the line `pt + t * dir` with the plane.
    pub fn intersect_line(&self, pt: Point, dir: Vector) -> Option<Point> {
        let denom = self.vn.dot(&dir);
        if denom.abs() < 1e-12 {
            return None;
        }
        let t = -self.signed_distance(pt) / denom;
        Some(pt + dir * t)
    }

    /// Checks whether another plane describes the same surface (either facing).
    pub fn is_coplanar(&self, other: &Plane, tol: f64, angle_tol: f64) -> bool {
        let cos = self.vn.dot(&other.vn).abs();
        cos >= angle_tol.cos() && self.distance_to_point(other.origin) <= tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_z_at_sloped() {
        // Rises 1 m per 2 m along X, passes through z=3 at x=0
        let plane = Plane::new(Point::new(0., 0., 3.), Vector::new(-0.5, 0., 1.)).unwrap();
        assert!((plane.z_at(2., 7.).unwrap() - 4.).abs() < 1e-12);
        assert!((plane.z_at(0., -1.).unwrap() - 3.).abs() < 1e-12);
    }

    #[test]
    fn test_vertical_plane_has_no_elevation() {
        let plane = Plane::new(Point::new(0., 0., 0.), Vector::new(1., 0., 0.)).unwrap();
        assert!(plane.is_vertical());
        assert!(plane.project_vertical(Point2D::new(1., 1.)).is_none());
    }

    #[test]
    fn test_from_points_and_distance() {
        let pts = vec![
            Point::new(0., 0., 2.),
            Point::new(1., 0., 2.),
            Point::new(1., 1., 2.),
        ];
        let plane = Plane::from_points(&pts).unwrap();
        assert!((plane.signed_distance(Point::new(5., 5., 3.)) - 1.).abs() < 1e-12);
        assert!(plane.closest_point(Point::new(5., 5., 3.)).is_close(&Point::new(5., 5., 2.)));
        let hit = plane
            .intersect_line(Point::new(0.5, 0.5, 0.), Vector::new(0., 0., 1.))
            .unwrap();
        assert!(hit.is_close(&Point::new(0.5, 0.5, 2.)));
        assert!(plane.is_coplanar(&Plane::horizontal(2.), 1e-6, 0.01));
    }
}
