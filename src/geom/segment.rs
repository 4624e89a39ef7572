//! Line segment operations.
//!
//! 3D helpers work on bare endpoint pairs. Plan segments (`LineSegment2D`) are
//! the walls of a room seen from above and carry the tolerance-aware queries
//! used by adjacency solving and roof wall stepping.

use crate::geom::EPS;
use crate::geom::point::Point;
use crate::geom::point2d::Point2D;
use serde::{Deserialize, Serialize};

/// Calculates the distance between a point and a line segment.
///
/// Returns the minimum distance from the point to any point on the segment.
pub fn distance_point_to_segment(pt: Point, p1: Point, p2: Point) -> f64 {
    (pt - closest_point_on_segment(pt, p1, p2)).length()
}

/// Calculates the distance between a point and an infinite line.
///
/// The line is defined by two points p1 and p2.
pub fn distance_point_to_line(pt: Point, p1: Point, p2: Point) -> f64 {
    let line_vec = p2 - p1;
    let pt_vec = pt - p1;

    let line_len_sq = line_vec.dot(&line_vec);

    if line_len_sq < EPS * EPS {
        // Line is a point
        return pt_vec.length();
    }

    // Distance = area / base = |cross| / |line_vec|
    pt_vec.cross(&line_vec).length() / line_len_sq.sqrt()
}

/// Finds the closest point on a segment to a given point.
pub fn closest_point_on_segment(pt: Point, p1: Point, p2: Point) -> Point {
    let seg_vec = p2 - p1;
    let seg_len_sq = seg_vec.dot(&seg_vec);

    if seg_len_sq < EPS * EPS {
        // Segment is a point
        return p1;
    }

    let t = ((pt - p1).dot(&seg_vec) / seg_len_sq).clamp(0.0, 1.0);
    p1 + seg_vec * t
}

/// Returns the parameter of `pt` projected on the segment (0 at `p1`, 1 at `p2`).
pub fn segment_parameter(pt: Point, p1: Point, p2: Point) -> f64 {
    let seg_vec = p2 - p1;
    let seg_len_sq = seg_vec.dot(&seg_vec);
    if seg_len_sq < EPS * EPS {
        return 0.;
    }
    (pt - p1).dot(&seg_vec) / seg_len_sq
}

/// A plan segment from `p1` to `p2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment2D {
    pub p1: Point2D,
    pub p2: Point2D,
}

impl LineSegment2D {
    pub fn new(p1: Point2D, p2: Point2D) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f64 {
        self.p1.distance(&self.p2)
    }

    /// Direction vector (not normalized).
    pub fn direction(&self) -> Point2D {
        self.p2 - self.p1
    }

    pub fn midpoint(&self) -> Point2D {
        self.point_at(0.5)
    }

    pub fn point_at(&self, t: f64) -> Point2D {
        self.p1 + self.direction() * t
    }

    pub fn flip(&self) -> Self {
        Self::new(self.p2, self.p1)
    }

    /// Parameter of `pt` projected on the infinite line (0 at `p1`, 1 at `p2`).
    pub fn parameter_of(&self, pt: Point2D) -> f64 {
        let d = self.direction();
        let len_sq = d.dot(&d);
        if len_sq < EPS * EPS {
            return 0.;
        }
        (pt - self.p1).dot(&d) / len_sq
    }

    pub fn closest_point(&self, pt: Point2D) -> Point2D {
        self.point_at(self.parameter_of(pt).clamp(0., 1.))
    }

    pub fn distance_to_point(&self, pt: Point2D) -> f64 {
        self.closest_point(pt).distance(&pt)
    }

    /// Distance from `pt` to the infinite line through the segment.
    pub fn distance_to_line(&self, pt: Point2D) -> f64 {
        let d = self.direction();
        let len = d.length();
        if len < EPS {
            return self.p1.distance(&pt);
        }
        (pt - self.p1).cross(&d).abs() / len
    }

    /// Checks whether both segments share their endpoints (in either direction).
    pub fn is_equivalent(&self, other: &Self, tol: f64) -> bool {
        (self.p1.is_close_tol(&other.p1, tol) && self.p2.is_close_tol(&other.p2, tol))
            || (self.p1.is_close_tol(&other.p2, tol) && self.p2.is_close_tol(&other.p1, tol))
    }

    /// Checks whether `other` lies on the same infinite line within `tol`.
    pub fn is_colinear(&self, other: &Self, tol: f64) -> bool {
        self.distance_to_line(other.p1) <= tol && self.distance_to_line(other.p2) <= tol
    }

    /// Parameter interval on `self` covered by a colinear `other`, if the overlap
    /// is longer than `tol`.
    pub fn colinear_overlap(&self, other: &Self, tol: f64) -> Option<(f64, f64)> {
        if !self.is_colinear(other, tol) {
            return None;
        }
        let len = self.length();
        if len < EPS {
            return None;
        }
        let t1 = self.parameter_of(other.p1);
        let t2 = self.parameter_of(other.p2);
        let start = t1.min(t2).max(0.);
        let end = t1.max(t2).min(1.);
        if (end - start) * len > tol {
            Some((start, end))
        } else {
            None
        }
    }

    /// Intersection point of two segments (touching counts), if any.
    ///
    /// Colinear overlaps are not reported here; use [`Self::colinear_overlap`].
    pub fn intersect(&self, other: &Self, tol: f64) -> Option<Point2D> {
        let d1 = self.direction();
        let d2 = other.direction();
        let denom = d1.cross(&d2);
        let len1 = d1.length();
        let len2 = d2.length();
        if len1 < EPS || len2 < EPS || denom.abs() < EPS * len1 * len2 {
            return None; // Parallel or degenerate
        }
        let r = other.p1 - self.p1;
        let t = r.cross(&d2) / denom;
        let s = r.cross(&d1) / denom;
        let t_tol = tol / len1;
        let s_tol = tol / len2;
        if (-t_tol..=1. + t_tol).contains(&t) && (-s_tol..=1. + s_tol).contains(&s) {
            Some(self.point_at(t.clamp(0., 1.)))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_point_to_segment() {
        let p1 = Point::new(0., 0., 0.);
        let p2 = Point::new(2., 0., 0.);
        assert!((distance_point_to_segment(Point::new(1., 1., 0.), p1, p2) - 1.).abs() < EPS);
        assert!((distance_point_to_segment(Point::new(3., 0., 0.), p1, p2) - 1.).abs() < EPS);
        assert!((distance_point_to_line(Point::new(3., 1., 0.), p1, p2) - 1.).abs() < EPS);
    }

    #[test]
    fn test_segment_parameter() {
        let p1 = Point::new(0., 0., 0.);
        let p2 = Point::new(4., 0., 0.);
        assert!((segment_parameter(Point::new(1., 3., 0.), p1, p2) - 0.25).abs() < EPS);
    }

    #[test]
    fn test_intersect_crossing() {
        let a = LineSegment2D::new(Point2D::new(0., 0.), Point2D::new(2., 2.));
        let b = LineSegment2D::new(Point2D::new(0., 2.), Point2D::new(2., 0.));
        let pt = a.intersect(&b, 1e-6).unwrap();
        assert!(pt.is_close(&Point2D::new(1., 1.)));
    }

    #[test]
    fn test_intersect_touching_and_disjoint() {
        let a = LineSegment2D::new(Point2D::new(0., 0.), Point2D::new(2., 0.));
        let b = LineSegment2D::new(Point2D::new(1., 0.), Point2D::new(1., 2.));
        assert!(a.intersect(&b, 1e-6).is_some());
        let c = LineSegment2D::new(Point2D::new(3., 1.), Point2D::new(3., 2.));
        assert!(a.intersect(&c, 1e-6).is_none());
    }

    #[test]
    fn test_equivalent_reversed() {
        let a = LineSegment2D::new(Point2D::new(0., 0.), Point2D::new(5., 0.));
        let b = LineSegment2D::new(Point2D::new(5.005, 0.), Point2D::new(0., 0.004));
        assert!(a.is_equivalent(&b, 0.01));
        assert!(!a.is_equivalent(&b, 0.001));
    }

    #[test]
    fn test_colinear_overlap() {
        let a = LineSegment2D::new(Point2D::new(0., 0.), Point2D::new(4., 0.));
        let b = LineSegment2D::new(Point2D::new(6., 0.), Point2D::new(2., 0.));
        let (s, e) = a.colinear_overlap(&b, 1e-6).unwrap();
        assert!((s - 0.5).abs() < 1e-12);
        assert!((e - 1.0).abs() < 1e-12);
        let c = LineSegment2D::new(Point2D::new(5., 0.), Point2D::new(6., 0.));
        assert!(a.colinear_overlap(&c, 1e-6).is_none());
    }
}
