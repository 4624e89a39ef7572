//! Plan polygon relationship detection.

use crate::geom::polygon2d::Region2D;
use crate::geom::polygon2d::boolean::overlap_area;

/// Relationship of a region to a container region.
///
/// Ordered so that `relation >= Overlapping` means "shares area".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PolygonRelation {
    /// No shared area (disjoint or only touching along edges/vertices).
    Outside = -1,
    /// Shares area but is not fully covered.
    Overlapping = 0,
    /// Fully covered by the container.
    Inside = 1,
}

impl PolygonRelation {
    pub fn as_i8(self) -> i8 {
        self as i8
    }
}

/// Area below which overlaps of `region` count as touching.
///
/// Scaled by the region's perimeter so a tolerance-wide strip along the whole
/// boundary is still treated as noise.
pub fn area_tolerance(region: &Region2D, tol: f64) -> f64 {
    tol * region.perimeter()
}

/// Classifies `region` against `container`.
pub fn polygon_relationship(container: &Region2D, region: &Region2D, tol: f64) -> PolygonRelation {
    let (cmin, cmax) = container.bounds();
    let (rmin, rmax) = region.bounds();
    if rmax.x < cmin.x - tol || rmin.x > cmax.x + tol || rmax.y < cmin.y - tol || rmin.y > cmax.y + tol {
        return PolygonRelation::Outside;
    }
    let area_tol = area_tolerance(region, tol);
    let shared = overlap_area(container, region, tol);
    if shared <= area_tol {
        PolygonRelation::Outside
    } else if region.area() - shared <= area_tol {
        PolygonRelation::Inside
    } else {
        PolygonRelation::Overlapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point2d::Point2D;
    use crate::geom::polygon2d::Polygon2D;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Region2D {
        let pts = vec![
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x1, y1),
            Point2D::new(x0, y1),
        ];
        Region2D::from_polygon(Polygon2D::new(pts).unwrap())
    }

    #[test]
    fn test_relationships() {
        let floor = rect(0., 0., 10., 8.);
        assert_eq!(polygon_relationship(&rect(-1., -1., 11., 9.), &floor, 0.01), PolygonRelation::Inside);
        assert_eq!(polygon_relationship(&rect(0., 0., 10., 8.), &floor, 0.01), PolygonRelation::Inside);
        assert_eq!(polygon_relationship(&rect(5., 0., 15., 8.), &floor, 0.01), PolygonRelation::Overlapping);
        assert_eq!(polygon_relationship(&rect(10., 0., 15., 8.), &floor, 0.01), PolygonRelation::Outside);
        assert_eq!(polygon_relationship(&rect(20., 0., 25., 8.), &floor, 0.01), PolygonRelation::Outside);
        assert!(PolygonRelation::Inside >= PolygonRelation::Overlapping);
        assert_eq!(PolygonRelation::Outside.as_i8(), -1);
    }
}
