//! Plan polygons.
//!
//! `Polygon2D` is a single closed ring (no repeated closing vertex).
//! `Region2D` is an outer ring with zero or more hole rings; it is the shape
//! of a room floor and of every 2D boolean result.

use crate::geom::EPS;
use crate::geom::bboxes::bounding_rect;
use crate::geom::point2d::Point2D;
use crate::geom::segment::LineSegment2D;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

pub mod boolean;
pub mod containment;
pub mod relations;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon2D {
    pts: Vec<Point2D>,
}

impl Polygon2D {
    pub fn new(pts: Vec<Point2D>) -> Result<Self> {
        if pts.len() < 3 {
            return Err(anyhow!("A polygon needs at least 3 vertices, got {}", pts.len()));
        }
        Ok(Self { pts })
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.pts
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// Segment `i` runs from vertex `i` to vertex `i + 1` (wrapping).
    pub fn segments(&self) -> Vec<LineSegment2D> {
        let n = self.pts.len();
        (0..n)
            .map(|i| LineSegment2D::new(self.pts[i], self.pts[(i + 1) % n]))
            .collect()
    }

    /// Shoelace area, positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        let n = self.pts.len();
        let mut sum = 0.;
        for i in 0..n {
            let a = self.pts[i];
            let b = self.pts[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        0.5 * sum
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.
    }

    pub fn perimeter(&self) -> f64 {
        self.segments().iter().map(|s| s.length()).sum()
    }

    /// Bounding rectangle `(min, max)`.
    pub fn bounds(&self) -> (Point2D, Point2D) {
        bounding_rect(&self.pts).unwrap_or((Point2D::new(0., 0.), Point2D::new(0., 0.)))
    }

    /// Reverses the winding while keeping vertex 0 in place.
    ///
    /// With this ordering new segment `k` is old segment `n - 1 - k` walked
    /// backwards, so per-segment data only needs a plain reversal.
    pub fn reverse_keep_start(&self) -> Self {
        let mut pts = Vec::with_capacity(self.pts.len());
        pts.push(self.pts[0]);
        pts.extend(self.pts.iter().skip(1).rev());
        Self { pts }
    }

    /// Applies `f` to every vertex.
    pub fn map_points<F: Fn(Point2D) -> Point2D>(&self, f: F) -> Self {
        Self {
            pts: self.pts.iter().map(|p| f(*p)).collect(),
        }
    }

    /// Drops consecutive vertices closer than `tol` to the last kept vertex.
    ///
    /// Returns the cleaned ring and the original indices of the kept vertices.
    pub fn remove_duplicate_vertices(&self, tol: f64) -> Result<(Self, Vec<usize>)> {
        let mut kept: Vec<usize> = Vec::with_capacity(self.pts.len());
        for (i, pt) in self.pts.iter().enumerate() {
            match kept.last() {
                Some(&last) if self.pts[last].is_close_tol(pt, tol) => {}
                _ => kept.push(i),
            }
        }
        while kept.len() > 1 {
            let first = self.pts[kept[0]];
            let last = self.pts[kept[kept.len() - 1]];
            if first.is_close_tol(&last, tol) {
                kept.pop();
            } else {
                break;
            }
        }
        let pts: Vec<Point2D> = kept.iter().map(|&i| self.pts[i]).collect();
        Ok((Self::new(pts)?, kept))
    }

    /// Drops vertices that lie within `tol` of the line through their neighbors.
    ///
    /// Duplicate vertices are dropped too. Returns the cleaned ring and the
    /// original indices of the kept vertices.
    pub fn remove_colinear_vertices(&self, tol: f64) -> Result<(Self, Vec<usize>)> {
        let mut kept: Vec<usize> = (0..self.pts.len()).collect();
        loop {
            let n = kept.len();
            if n < 3 {
                return Err(anyhow!("Polygon collapses to fewer than 3 vertices"));
            }
            let mut removed = None;
            for k in 0..n {
                let prev = self.pts[kept[(k + n - 1) % n]];
                let this = self.pts[kept[k]];
                let next = self.pts[kept[(k + 1) % n]];
                let seg = LineSegment2D::new(prev, next);
                let on_line = if prev.is_close_tol(&next, tol) {
                    this.is_close_tol(&prev, tol)
                } else {
                    seg.distance_to_line(this) <= tol
                        && seg.parameter_of(this) > -EPS
                        && seg.parameter_of(this) < 1. + EPS
                };
                if on_line || this.is_close_tol(&prev, tol) {
                    removed = Some(k);
                    break;
                }
            }
            match removed {
                Some(k) => {
                    kept.remove(k);
                }
                None => break,
            }
        }
        let pts: Vec<Point2D> = kept.iter().map(|&i| self.pts[i]).collect();
        Ok((Self::new(pts)?, kept))
    }

    /// Checks whether any two non-adjacent segments touch or cross.
    ///
    /// Adjacent segments that fold back onto each other also count.
    pub fn is_self_intersecting(&self, tol: f64) -> bool {
        let segs = self.segments();
        let n = segs.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    // Folding back: the shared vertex is not the only contact
                    if segs[i].colinear_overlap(&segs[j], tol).is_some() {
                        return true;
                    }
                    continue;
                }
                if segs[i].intersect(&segs[j], tol).is_some()
                    || segs[i].colinear_overlap(&segs[j], tol).is_some()
                {
                    return true;
                }
            }
        }
        false
    }

    /// Closed `geo` ring of this polygon.
    pub fn to_line_string(&self) -> geo::LineString<f64> {
        geo::LineString::new(self.pts.iter().map(|p| geo::Coord::from(*p)).collect())
    }

    /// Builds a ring from a closed or open `geo` line string.
    pub fn from_line_string(ls: &geo::LineString<f64>) -> Result<Self> {
        let mut pts: Vec<Point2D> = ls.coords().map(|c| Point2D::from(*c)).collect();
        if pts.len() > 1 && pts[0].is_close(&pts[pts.len() - 1]) {
            pts.pop();
        }
        Self::new(pts)
    }
}

/// Outer ring plus hole rings.
///
/// Normal form: boundary counter-clockwise, holes clockwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region2D {
    pub boundary: Polygon2D,
    pub holes: Vec<Polygon2D>,
}

impl Region2D {
    /// Creates a region and brings its rings into normal form.
    pub fn new(boundary: Polygon2D, holes: Vec<Polygon2D>) -> Self {
        let boundary = if boundary.is_clockwise() {
            boundary.reverse_keep_start()
        } else {
            boundary
        };
        let holes = holes
            .into_iter()
            .map(|h| if h.is_clockwise() { h } else { h.reverse_keep_start() })
            .collect();
        Self { boundary, holes }
    }

    pub fn from_polygon(boundary: Polygon2D) -> Self {
        Self::new(boundary, Vec::new())
    }

    /// Boundary ring followed by hole rings.
    pub fn rings(&self) -> Vec<&Polygon2D> {
        let mut rings = vec![&self.boundary];
        rings.extend(self.holes.iter());
        rings
    }

    pub fn area(&self) -> f64 {
        self.boundary.area() - self.holes.iter().map(|h| h.area()).sum::<f64>()
    }

    pub fn perimeter(&self) -> f64 {
        self.rings().iter().map(|r| r.perimeter()).sum()
    }

    /// Boundary segments followed by hole segments, in ring order.
    pub fn segments(&self) -> Vec<LineSegment2D> {
        self.rings().iter().flat_map(|r| r.segments()).collect()
    }

    pub fn segment_count(&self) -> usize {
        self.rings().iter().map(|r| r.len()).sum()
    }

    pub fn bounds(&self) -> (Point2D, Point2D) {
        self.boundary.bounds()
    }

    pub fn map_points<F: Fn(Point2D) -> Point2D>(&self, f: F) -> Self {
        Self {
            boundary: self.boundary.map_points(&f),
            holes: self.holes.iter().map(|h| h.map_points(&f)).collect(),
        }
    }

    pub fn to_geo(&self) -> geo::Polygon<f64> {
        geo::Polygon::new(
            self.boundary.to_line_string(),
            self.holes.iter().map(|h| h.to_line_string()).collect(),
        )
    }

    /// Converts a `geo` polygon, dropping hole rings that cannot form a polygon.
    pub fn from_geo(poly: &geo::Polygon<f64>) -> Result<Self> {
        let boundary = Polygon2D::from_line_string(poly.exterior())?;
        let holes = poly
            .interiors()
            .iter()
            .filter_map(|ls| Polygon2D::from_line_string(ls).ok())
            .collect();
        Ok(Self::new(boundary, holes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(coords: &[(f64, f64)]) -> Polygon2D {
        Polygon2D::new(coords.iter().map(|c| Point2D::from(*c)).collect()).unwrap()
    }

    #[test]
    fn test_area_and_orientation() {
        let ccw = ring(&[(0., 0.), (10., 0.), (10., 8.), (0., 8.)]);
        assert!((ccw.signed_area() - 80.).abs() < 1e-12);
        assert!(!ccw.is_clockwise());
        let cw = ccw.reverse_keep_start();
        assert!(cw.is_clockwise());
        assert!(cw.vertices()[0].is_close(&Point2D::new(0., 0.)));
        assert!(cw.vertices()[1].is_close(&Point2D::new(0., 8.)));
        assert!((ccw.perimeter() - 36.).abs() < 1e-12);
    }

    #[test]
    fn test_remove_colinear_vertices() {
        let poly = ring(&[(0., 0.), (5., 0.), (10., 0.), (10., 8.), (0., 8.), (0., 4.)]);
        let (clean, kept) = poly.remove_colinear_vertices(0.01).unwrap();
        assert_eq!(clean.len(), 4);
        assert_eq!(kept, vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_remove_duplicate_vertices() {
        let poly = ring(&[(0., 0.), (5., 0.), (5.001, 0.), (5., 5.), (0., 5.), (0., 0.0005)]);
        let (clean, kept) = poly.remove_duplicate_vertices(0.01).unwrap();
        assert_eq!(clean.len(), 4);
        assert_eq!(kept, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_degenerate_ring_fails() {
        let poly = ring(&[(0., 0.), (5., 0.), (10., 0.)]);
        assert!(poly.remove_colinear_vertices(0.01).is_err());
    }

    #[test]
    fn test_self_intersecting() {
        let bowtie = ring(&[(0., 0.), (4., 4.), (4., 0.), (0., 4.)]);
        assert!(bowtie.is_self_intersecting(0.01));
        let square = ring(&[(0., 0.), (4., 0.), (4., 4.), (0., 4.)]);
        assert!(!square.is_self_intersecting(0.01));
    }

    #[test]
    fn test_region_normal_form() {
        let outer = ring(&[(0., 0.), (0., 10.), (10., 10.), (10., 0.)]);
        let hole = ring(&[(4., 4.), (6., 4.), (6., 6.), (4., 6.)]);
        let region = Region2D::new(outer, vec![hole]);
        assert!(!region.boundary.is_clockwise());
        assert!(region.holes[0].is_clockwise());
        assert!((region.area() - 96.).abs() < 1e-12);
        assert_eq!(region.segment_count(), 8);
    }
}
