use crate::geom::plane::Plane;
use crate::geom::point::Point;
use crate::geom::point2d::Point2D;
use crate::geom::vector::Vector;

/// Orthonormal basis for mapping points of a plane into 2D and back.
///
/// Used to run plan-only algorithms (self-intersection, splitting) on loops
/// that are tilted in 3D.
#[derive(Debug, Clone, Copy)]
pub struct PlaneBasis {
    pub origin: Point,
    pub u: Vector,
    pub v: Vector,
}

impl PlaneBasis {
    /// Creates a `PlaneBasis` from an origin point and a normal vector.
    pub fn from_normal(origin: Point, normal: Vector) -> Option<Self> {
        let n = normal.normalize().ok()?;

        let helper = if n.dz.abs() < 0.9 {
            Vector::new(0.0, 0.0, 1.0)
        } else {
            Vector::new(0.0, 1.0, 0.0)
        };

        let u = helper.cross(&n).normalize().ok()?;
        let v = n.cross(&u).normalize().ok()?;

        Some(Self { origin, u, v })
    }

    pub fn from_plane(plane: &Plane) -> Option<Self> {
        Self::from_normal(plane.origin, plane.vn)
    }

    /// Projects a 3D point onto the basis.
    pub fn project(&self, p: Point) -> Point2D {
        let r = p - self.origin;
        Point2D::new(r.dot(&self.u), r.dot(&self.v))
    }

    pub fn project_ring(&self, pts: &[Point]) -> Vec<Point2D> {
        pts.iter().map(|p| self.project(*p)).collect()
    }

    /// Maps 2D basis coordinates back to a 3D point on the plane.
    pub fn unproject(&self, p: Point2D) -> Point {
        self.origin + self.u * p.x + self.v * p.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sloped_roundtrip() {
        let plane = Plane::new(Point::new(1.0, 2.0, 3.0), Vector::new(0.3, -0.2, 1.0)).unwrap();
        let basis = PlaneBasis::from_plane(&plane).unwrap();
        let p = plane.project_vertical(Point2D::new(4.0, -1.0)).unwrap();
        let back = basis.unproject(basis.project(p));
        assert!(p.is_close_tol(&back, 1e-9));
    }

    #[test]
    fn test_vertical_plane_basis() {
        let basis = PlaneBasis::from_normal(Point::new(0., 0., 0.), Vector::new(1., 0., 0.)).unwrap();
        let p = Point::new(0., 2., 3.);
        assert!(basis.unproject(basis.project(p)).is_close_tol(&p, 1e-12));
    }
}
