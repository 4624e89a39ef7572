use crate::geom::point::Point;
use crate::geom::point2d::Point2D;

/// Returns the `(min, max)` corners of the box holding all points `pts`.
///
/// Returns `None` for an empty slice.
pub fn bounding_box(pts: &[Point]) -> Option<(Point, Point)> {
    let first = pts.first()?;
    let mut pmin = *first;
    let mut pmax = *first;
    for p in pts.iter().skip(1) {
        pmin = Point::new(pmin.x.min(p.x), pmin.y.min(p.y), pmin.z.min(p.z));
        pmax = Point::new(pmax.x.max(p.x), pmax.y.max(p.y), pmax.z.max(p.z));
    }
    Some((pmin, pmax))
}

/// Plan bounding rectangle `(min, max)` of all points `pts`.
pub fn bounding_rect(pts: &[Point2D]) -> Option<(Point2D, Point2D)> {
    let first = pts.first()?;
    let mut pmin = *first;
    let mut pmax = *first;
    for p in pts.iter().skip(1) {
        pmin = Point2D::new(pmin.x.min(p.x), pmin.y.min(p.y));
        pmax = Point2D::new(pmax.x.max(p.x), pmax.y.max(p.y));
    }
    Some((pmin, pmax))
}

/// Checks whether two bounding rectangles overlap within `distance`.
///
/// Separating axis test on the rectangle centers and half-widths: the
/// rectangles are apart only when the gap along X or Y exceeds `distance`.
pub fn are_rects_within_distance(
    rect1: (Point2D, Point2D),
    rect2: (Point2D, Point2D),
    distance: f64,
) -> bool {
    let (min1, max1) = rect1;
    let (min2, max2) = rect2;

    let width1 = max1.x - min1.x;
    let width2 = max2.x - min2.x;
    let center_dx = ((min1.x + max1.x) - (min2.x + max2.x)).abs() / 2.;
    let x_gap = center_dx - 0.5 * width1 - 0.5 * width2;

    let height1 = max1.y - min1.y;
    let height2 = max2.y - min2.y;
    let center_dy = ((min1.y + max1.y) - (min2.y + max2.y)).abs() / 2.;
    let y_gap = center_dy - 0.5 * height1 - 0.5 * height2;

    !(x_gap > distance || y_gap > distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box() {
        let pts = vec![
            Point::new(1., -1., 2.),
            Point::new(-3., 4., 0.),
            Point::new(0., 0., 5.),
        ];
        let (pmin, pmax) = bounding_box(&pts).unwrap();
        assert!(pmin.is_close(&Point::new(-3., -1., 0.)));
        assert!(pmax.is_close(&Point::new(1., 4., 5.)));
        assert!(bounding_box(&[]).is_none());
    }

    #[test]
    fn test_rects_within_distance() {
        let r1 = (Point2D::new(0., 0.), Point2D::new(5., 5.));
        let touching = (Point2D::new(5., 0.), Point2D::new(10., 5.));
        let near = (Point2D::new(5.005, 0.), Point2D::new(10., 5.));
        let far = (Point2D::new(6., 0.), Point2D::new(10., 5.));
        assert!(are_rects_within_distance(r1, touching, 0.01));
        assert!(are_rects_within_distance(r1, near, 0.01));
        assert!(!are_rects_within_distance(r1, far, 0.01));
    }
}
