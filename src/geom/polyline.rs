use crate::geom::point::Point;

/// Chain of points, closed when the last point connects back to the first.
///
/// A closed polyline does not repeat its first point at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub pts: Vec<Point>,
    pub closed: bool,
}

impl Polyline {
    /// Segments in order (including the closing one for closed polylines).
    pub fn segments(&self) -> Vec<(Point, Point)> {
        let n = self.pts.len();
        let mut segs: Vec<(Point, Point)> = self.pts.windows(2).map(|w| (w[0], w[1])).collect();
        if self.closed && n > 2 {
            segs.push((self.pts[n - 1], self.pts[0]));
        }
        segs
    }

    pub fn length(&self) -> f64 {
        self.segments().iter().map(|(a, b)| a.distance(b)).sum()
    }
}

/// Joins unordered segments into polylines by matching endpoints within `tol`.
///
/// Segments are consumed greedily in input order, extending each chain at
/// its end first and then at its start, so the result is deterministic.
pub fn join_segments(segments: &[(Point, Point)], tol: f64) -> Vec<Polyline> {
    let mut used = vec![false; segments.len()];
    let mut out = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut chain = vec![segments[start].0, segments[start].1];
        let mut closed = false;

        // Grow forward
        loop {
            let end = chain[chain.len() - 1];
            if chain.len() > 2 && end.is_close_tol(&chain[0], tol) {
                chain.pop();
                closed = true;
                break;
            }
            match take_next(segments, &mut used, end, tol) {
                Some(p) => chain.push(p),
                None => break,
            }
        }

        // Grow backward
        if !closed {
            loop {
                let first = chain[0];
                match take_next(segments, &mut used, first, tol) {
                    Some(p) => chain.insert(0, p),
                    None => break,
                }
                if chain.len() > 2 && chain[0].is_close_tol(&chain[chain.len() - 1], tol) {
                    chain.remove(0);
                    closed = true;
                    break;
                }
            }
        }

        out.push(Polyline { pts: chain, closed });
    }
    out
}

/// Consumes the first unused segment touching `pt`, returning its far end.
fn take_next(segments: &[(Point, Point)], used: &mut [bool], pt: Point, tol: f64) -> Option<Point> {
    for (i, (a, b)) in segments.iter().enumerate() {
        if used[i] {
            continue;
        }
        if a.is_close_tol(&pt, tol) {
            used[i] = true;
            return Some(*b);
        }
        if b.is_close_tol(&pt, tol) {
            used[i] = true;
            return Some(*a);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_closed_loop_out_of_order() {
        let p = |x: f64, y: f64| Point::new(x, y, 0.);
        let segs = vec![
            (p(1., 0.), p(1., 1.)),
            (p(0., 1.), p(0., 0.)),
            (p(0., 0.), p(1., 0.)),
            (p(0., 1.), p(1., 1.)),
        ];
        let lines = join_segments(&segs, 0.01);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].closed);
        assert_eq!(lines[0].pts.len(), 4);
        assert!((lines[0].length() - 4.).abs() < 1e-12);
    }

    #[test]
    fn test_join_open_chain_grows_both_ways() {
        let p = |x: f64| Point::new(x, 0., 0.);
        let segs = vec![(p(1.), p(2.)), (p(0.), p(1.)), (p(2.), p(3.)), (p(10.), p(11.))];
        let lines = join_segments(&segs, 0.01);
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].closed);
        assert_eq!(lines[0].pts.len(), 4);
        assert!(lines[0].pts[0].is_close(&p(0.)));
        assert_eq!(lines[1].segments().len(), 1);
    }
}
