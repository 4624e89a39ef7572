//! Planar 3D faces.
//!
//! A `Face` is one boundary ring plus optional hole rings, all lying in one
//! plane. Holes are stored with the winding opposite to the boundary so that
//! the Newell sum over all rings gives the net area vector.

use crate::geom::plane::Plane;
use crate::geom::point::Point;
use crate::geom::segment::{distance_point_to_segment, segment_parameter};
use crate::geom::vector::Vector;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub boundary: Vec<Point>,
    pub holes: Vec<Vec<Point>>,
    pub vn: Vector,
}

impl Face {
    /// Creates a face; the normal follows the right-hand rule on `boundary`.
    pub fn new(boundary: Vec<Point>, holes: Vec<Vec<Point>>) -> Result<Self> {
        if boundary.len() < 3 {
            return Err(anyhow!("A face needs at least 3 vertices, got {}", boundary.len()));
        }
        let vn = Vector::newell_normal(&boundary)?;
        let holes = holes
            .into_iter()
            .filter(|h| h.len() >= 3)
            .map(|h| {
                if Vector::area_vector(&h).dot(&vn) > 0. {
                    reverse_keep_start(&h)
                } else {
                    h
                }
            })
            .collect();
        Ok(Self { boundary, holes, vn })
    }

    pub fn from_ring(boundary: Vec<Point>) -> Result<Self> {
        Self::new(boundary, Vec::new())
    }

    /// Boundary ring followed by hole rings.
    pub fn rings(&self) -> Vec<&[Point]> {
        let mut rings: Vec<&[Point]> = vec![&self.boundary];
        rings.extend(self.holes.iter().map(|h| h.as_slice()));
        rings
    }

    /// Directed edges of all rings.
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let mut edges = Vec::new();
        for ring in self.rings() {
            let n = ring.len();
            for i in 0..n {
                edges.push((ring[i], ring[(i + 1) % n]));
            }
        }
        edges
    }

    /// Net area vector (normal times area).
    pub fn area_vector(&self) -> Vector {
        let mut sum = Vector::area_vector(&self.boundary);
        for h in self.holes.iter() {
            sum = sum + Vector::area_vector(h);
        }
        sum * 0.5
    }

    pub fn area(&self) -> f64 {
        self.area_vector().length()
    }

    pub fn plane(&self) -> Plane {
        Plane {
            origin: self.boundary[0],
            vn: self.vn,
        }
    }

    /// Vertex average of the boundary ring.
    pub fn centroid(&self) -> Point {
        let n = self.boundary.len() as f64;
        let (mut x, mut y, mut z) = (0., 0., 0.);
        for p in self.boundary.iter() {
            x += p.x;
            y += p.y;
            z += p.z;
        }
        Point::new(x / n, y / n, z / n)
    }

    /// Same face facing the other way.
    pub fn flip(&self) -> Self {
        Self {
            boundary: reverse_keep_start(&self.boundary),
            holes: self.holes.iter().map(|h| reverse_keep_start(h)).collect(),
            vn: -self.vn,
        }
    }

    /// Normal within `angle_tol` (radians) of horizontal.
    pub fn is_vertical(&self, angle_tol: f64) -> bool {
        self.vn.dz.abs() <= angle_tol.sin()
    }

    /// Normal within `angle_tol` (radians) of vertical.
    pub fn is_horizontal(&self, angle_tol: f64) -> bool {
        self.vn.dz.abs() >= angle_tol.cos()
    }

    /// Contribution of this face to the signed volume of a closed shell.
    pub fn signed_volume_contribution(&self) -> f64 {
        Vector::from_a_point(self.boundary[0]).dot(&self.area_vector()) / 3.
    }

    /// Drops consecutive vertices closer than `tol`. Fails if a ring collapses.
    pub fn remove_duplicate_vertices(&self, tol: f64) -> Result<Self> {
        let boundary = dedup_ring(&self.boundary, tol);
        if boundary.len() < 3 {
            return Err(anyhow!("Face collapses after removing duplicate vertices"));
        }
        let holes = self
            .holes
            .iter()
            .map(|h| dedup_ring(h, tol))
            .filter(|h| h.len() >= 3)
            .collect();
        Ok(Self {
            boundary,
            holes,
            vn: self.vn,
        })
    }

    /// Inserts every point of `pts` that lies on an edge (away from its ends).
    ///
    /// Used to heal T-junctions where a vertex of a neighbouring face sits in
    /// the middle of one of this face's edges.
    pub fn insert_points_on_edges(&self, pts: &[Point], tol: f64) -> Self {
        Self {
            boundary: insert_on_ring(&self.boundary, pts, tol),
            holes: self.holes.iter().map(|h| insert_on_ring(h, pts, tol)).collect(),
            vn: self.vn,
        }
    }
}

fn reverse_keep_start(pts: &[Point]) -> Vec<Point> {
    let mut out = Vec::with_capacity(pts.len());
    if let Some(first) = pts.first() {
        out.push(*first);
        out.extend(pts.iter().skip(1).rev());
    }
    out
}

fn dedup_ring(pts: &[Point], tol: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(pts.len());
    for p in pts.iter() {
        match out.last() {
            Some(last) if last.is_close_tol(p, tol) => {}
            _ => out.push(*p),
        }
    }
    while out.len() > 1 && out[0].is_close_tol(&out[out.len() - 1], tol) {
        out.pop();
    }
    out
}

fn insert_on_ring(ring: &[Point], pts: &[Point], tol: f64) -> Vec<Point> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        out.push(a);
        let mut inner: Vec<(f64, Point)> = pts
            .iter()
            .filter(|p| !p.is_close_tol(&a, tol) && !p.is_close_tol(&b, tol))
            .filter(|p| distance_point_to_segment(**p, a, b) <= tol)
            .map(|p| (segment_parameter(*p, a, b), *p))
            .collect();
        inner.sort_by(|x, y| x.0.total_cmp(&y.0));
        for (_, p) in inner {
            match out.last() {
                Some(last) if last.is_close_tol(&p, tol) => {}
                _ => out.push(p),
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(z: f64) -> Vec<Point> {
        vec![
            Point::new(0., 0., z),
            Point::new(2., 0., z),
            Point::new(2., 2., z),
            Point::new(0., 2., z),
        ]
    }

    #[test]
    fn test_new_and_area() {
        let face = Face::from_ring(square(1.)).unwrap();
        assert!(face.vn.is_close(&Vector::new(0., 0., 1.)));
        assert!((face.area() - 4.).abs() < 1e-12);
        assert!(face.is_horizontal(0.01));
        assert!(!face.is_vertical(0.01));
        let flipped = face.flip();
        assert!(flipped.vn.is_close(&Vector::new(0., 0., -1.)));
        assert!(flipped.boundary[0].is_close(&face.boundary[0]));
    }

    #[test]
    fn test_hole_is_subtracted() {
        let hole = vec![
            Point::new(0.5, 0.5, 0.),
            Point::new(1.5, 0.5, 0.),
            Point::new(1.5, 1.5, 0.),
            Point::new(0.5, 1.5, 0.),
        ];
        let face = Face::new(square(0.), vec![hole]).unwrap();
        assert!((face.area() - 3.).abs() < 1e-12);
        assert_eq!(face.edges().len(), 8);
    }

    #[test]
    fn test_insert_points_on_edges() {
        let face = Face::from_ring(square(0.)).unwrap();
        let pts = [Point::new(1., 0., 0.), Point::new(5., 5., 0.), Point::new(0.5, 0., 0.)];
        let healed = face.insert_points_on_edges(&pts, 0.01);
        assert_eq!(healed.boundary.len(), 6);
        assert!(healed.boundary[1].is_close(&Point::new(0.5, 0., 0.)));
        assert!(healed.boundary[2].is_close(&Point::new(1., 0., 0.)));
    }

    #[test]
    fn test_remove_duplicate_vertices() {
        let mut pts = square(0.);
        pts.insert(1, Point::new(0.001, 0., 0.));
        let face = Face::from_ring(pts).unwrap();
        assert_eq!(face.remove_duplicate_vertices(0.01).unwrap().boundary.len(), 4);
    }
}
