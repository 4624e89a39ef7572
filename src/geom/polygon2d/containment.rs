use crate::geom::point2d::Point2D;
use crate::geom::polygon2d::{Polygon2D, Region2D};

/// Where a point lies relative to a polygon or region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointRelation {
    Outside,
    Boundary,
    Inside,
}

impl Polygon2D {
    /// Classifies `pt` against the ring. Points within `tol` of an edge are `Boundary`.
    pub fn point_relationship(&self, pt: Point2D, tol: f64) -> PointRelation {
        if self.segments().iter().any(|s| s.distance_to_point(pt) <= tol) {
            return PointRelation::Boundary;
        }
        if self.is_point_inside(pt) {
            PointRelation::Inside
        } else {
            PointRelation::Outside
        }
    }

    /// Even-odd ray casting test (boundary handling is undefined).
    pub fn is_point_inside(&self, pt: Point2D) -> bool {
        let pts = self.vertices();
        let n = pts.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (a, b) = (pts[i], pts[j]);
            if (a.y > pt.y) != (b.y > pt.y) {
                let x_cross = a.x + (pt.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if pt.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

impl Region2D {
    /// Classifies `pt` against the region; hole interiors are `Outside`.
    pub fn point_relationship(&self, pt: Point2D, tol: f64) -> PointRelation {
        match self.boundary.point_relationship(pt, tol) {
            PointRelation::Inside => {}
            other => return other,
        }
        for hole in self.holes.iter() {
            match hole.point_relationship(pt, tol) {
                PointRelation::Outside => {}
                PointRelation::Boundary => return PointRelation::Boundary,
                PointRelation::Inside => return PointRelation::Outside,
            }
        }
        PointRelation::Inside
    }

    /// True for interior and boundary points.
    pub fn contains_point(&self, pt: Point2D, tol: f64) -> bool {
        self.point_relationship(pt, tol) != PointRelation::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> Polygon2D {
        Polygon2D::new(coords.iter().map(|c| Point2D::from(*c)).collect()).unwrap()
    }

    #[test]
    fn test_concave_polygon() {
        // U shape open to the top
        let poly = ring(&[(0., 0.), (3., 0.), (3., 3.), (2., 3.), (2., 1.), (1., 1.), (1., 3.), (0., 3.)]);
        assert_eq!(poly.point_relationship(Point2D::new(0.5, 2.), 0.01), PointRelation::Inside);
        assert_eq!(poly.point_relationship(Point2D::new(1.5, 2.), 0.01), PointRelation::Outside);
        assert_eq!(poly.point_relationship(Point2D::new(1.5, 1.005), 0.01), PointRelation::Boundary);
    }

    #[test]
    fn test_region_with_hole() {
        let outer = ring(&[(0., 0.), (10., 0.), (10., 10.), (0., 10.)]);
        let hole = ring(&[(4., 4.), (6., 4.), (6., 6.), (4., 6.)]);
        let region = Region2D::new(outer, vec![hole]);
        assert_eq!(region.point_relationship(Point2D::new(5., 5.), 0.01), PointRelation::Outside);
        assert_eq!(region.point_relationship(Point2D::new(4., 5.), 0.01), PointRelation::Boundary);
        assert_eq!(region.point_relationship(Point2D::new(1., 1.), 0.01), PointRelation::Inside);
        assert!(region.contains_point(Point2D::new(4., 5.), 0.01));
    }
}
