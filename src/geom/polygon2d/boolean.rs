//! Boolean operations on plan regions.
//!
//! The clipping itself is delegated to `geo::BooleanOps`. Results are cleaned
//! with the caller's tolerance: colinear and duplicate vertices are removed
//! and slivers narrower than the tolerance are dropped, so downstream wall and
//! roof construction never sees zero-width pieces.

use crate::geom::polygon2d::{Polygon2D, Region2D};
use geo::BooleanOps;

/// Result of a boolean operation that may produce multiple regions.
#[derive(Debug, Clone, Default)]
pub struct BooleanResult {
    pub regions: Vec<Region2D>,
}

impl BooleanResult {
    pub fn new(regions: Vec<Region2D>) -> Self {
        Self { regions }
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn total_area(&self) -> f64 {
        self.regions.iter().map(|r| r.area()).sum()
    }
}

pub fn to_multi_polygon(regions: &[Region2D]) -> geo::MultiPolygon<f64> {
    geo::MultiPolygon::new(regions.iter().map(|r| r.to_geo()).collect())
}

/// Converts a `geo` result back into cleaned regions.
pub fn from_multi_polygon(mp: &geo::MultiPolygon<f64>, tol: f64) -> BooleanResult {
    let mut regions = Vec::new();
    for poly in mp.iter() {
        let Ok(region) = Region2D::from_geo(poly) else {
            continue;
        };
        if let Some(clean) = clean_region(&region, tol) {
            regions.push(clean);
        }
    }
    BooleanResult::new(regions)
}

/// Area common to both sets of regions.
pub fn intersection(a: &[Region2D], b: &[Region2D], tol: f64) -> BooleanResult {
    let result = to_multi_polygon(a).intersection(&to_multi_polygon(b));
    from_multi_polygon(&result, tol)
}

/// Area covered by either set of regions.
pub fn union(a: &[Region2D], b: &[Region2D], tol: f64) -> BooleanResult {
    let result = to_multi_polygon(a).union(&to_multi_polygon(b));
    from_multi_polygon(&result, tol)
}

/// Area of `a` not covered by `b`.
pub fn difference(a: &[Region2D], b: &[Region2D], tol: f64) -> BooleanResult {
    let result = to_multi_polygon(a).difference(&to_multi_polygon(b));
    from_multi_polygon(&result, tol)
}

/// Overlap area of two regions.
pub fn overlap_area(a: &Region2D, b: &Region2D, tol: f64) -> f64 {
    intersection(std::slice::from_ref(a), std::slice::from_ref(b), tol).total_area()
}

/// Removes colinear vertices and slivers. Returns `None` if nothing is left.
///
/// A region is a sliver when its area is below half the tolerance times its
/// perimeter, i.e. its mean width is below the tolerance.
fn clean_region(region: &Region2D, tol: f64) -> Option<Region2D> {
    let boundary = clean_ring(&region.boundary, tol)?;
    let holes: Vec<Polygon2D> = region
        .holes
        .iter()
        .filter_map(|h| clean_ring(h, tol))
        .collect();
    let clean = Region2D::new(boundary, holes);
    if clean.area() < 0.5 * tol * clean.perimeter() {
        return None;
    }
    Some(clean)
}

fn clean_ring(ring: &Polygon2D, tol: f64) -> Option<Polygon2D> {
    let (clean, _) = ring.remove_colinear_vertices(tol).ok()?;
    if clean.area() < 0.5 * tol * clean.perimeter() {
        return None;
    }
    Some(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point2d::Point2D;

    fn square(size: f64, origin: (f64, f64)) -> Region2D {
        let pts = vec![
            Point2D::new(origin.0, origin.1),
            Point2D::new(origin.0 + size, origin.1),
            Point2D::new(origin.0 + size, origin.1 + size),
            Point2D::new(origin.0, origin.1 + size),
        ];
        Region2D::from_polygon(Polygon2D::new(pts).unwrap())
    }

    #[test]
    fn test_intersection_overlapping() {
        let result = intersection(&[square(2., (0., 0.))], &[square(2., (1., 1.))], 0.01);
        assert_eq!(result.len(), 1);
        assert!((result.total_area() - 1.).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_disjoint() {
        let result = intersection(&[square(1., (0., 0.))], &[square(1., (5., 5.))], 0.01);
        assert!(result.is_empty());
    }

    #[test]
    fn test_difference_creates_hole() {
        let result = difference(&[square(4., (0., 0.))], &[square(1., (1., 1.))], 0.01);
        assert_eq!(result.len(), 1);
        assert_eq!(result.regions[0].holes.len(), 1);
        assert!((result.total_area() - 15.).abs() < 1e-9);
    }

    #[test]
    fn test_union_of_touching_squares() {
        let result = union(&[square(1., (0., 0.))], &[square(1., (1., 0.))], 0.01);
        assert_eq!(result.len(), 1);
        assert_eq!(result.regions[0].boundary.len(), 4);
        assert!((result.total_area() - 2.).abs() < 1e-9);
    }

    #[test]
    fn test_sliver_dropped() {
        let result = difference(&[square(4., (0., 0.))], &[square(4., (0.005, 0.))], 0.01);
        assert!(result.is_empty());
    }
}
