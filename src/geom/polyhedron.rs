//! Polyhedra built from loose faces.
//!
//! Vertices of all faces are welded within a tolerance, after which edges are
//! identified by their (sorted) pair of vertex indices. An edge used by
//! exactly two faces is interior; an edge used by one face is naked. A
//! polyhedron is a closed solid when it has no naked or over-shared edges.

use crate::geom::face::Face;
use crate::geom::point::Point;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::debug;

/// Undirected edge key (smaller vertex index first).
pub type EdgeKey = (usize, usize);

#[derive(Debug, Clone)]
pub struct Polyhedron {
    faces: Vec<Face>,
    vertices: Vec<Point>,
    /// Welded vertex indices per face, per ring.
    rings: Vec<Vec<Vec<usize>>>,
    /// Edge -> indices of the faces using it.
    edges: BTreeMap<EdgeKey, Vec<usize>>,
    /// Input index of every kept face.
    source: Vec<usize>,
    tolerance: f64,
}

impl Polyhedron {
    /// Builds the polyhedron, welding vertices closer than `tol`.
    ///
    /// Face coordinates are replaced by the welded vertex positions, and
    /// repeated consecutive vertices created by welding are dropped.
    pub fn from_faces(faces: Vec<Face>, tol: f64) -> Self {
        let mut vertices: Vec<Point> = Vec::new();
        let mut weld = |p: Point| -> usize {
            match vertices.iter().position(|v| v.is_close_tol(&p, tol)) {
                Some(i) => i,
                None => {
                    vertices.push(p);
                    vertices.len() - 1
                }
            }
        };

        let mut welded_rings: Vec<Vec<Vec<usize>>> = Vec::with_capacity(faces.len());
        for face in faces.iter() {
            let mut face_rings = Vec::new();
            for ring in face.rings() {
                let mut ids: Vec<usize> = Vec::with_capacity(ring.len());
                for p in ring.iter() {
                    let id = weld(*p);
                    if ids.last() != Some(&id) {
                        ids.push(id);
                    }
                }
                while ids.len() > 1 && ids.first() == ids.last() {
                    ids.pop();
                }
                face_rings.push(ids);
            }
            welded_rings.push(face_rings);
        }

        let mut kept_faces = Vec::with_capacity(faces.len());
        let mut rings = Vec::with_capacity(faces.len());
        let mut source = Vec::with_capacity(faces.len());
        for (fi, (face, face_rings)) in faces.into_iter().zip(welded_rings).enumerate() {
            if face_rings[0].len() < 3 {
                debug!("Dropping face collapsed by vertex welding");
                continue;
            }
            let to_pts = |ids: &[usize]| ids.iter().map(|&i| vertices[i]).collect::<Vec<Point>>();
            let boundary = to_pts(&face_rings[0]);
            let holes: Vec<Vec<Point>> = face_rings[1..]
                .iter()
                .filter(|h| h.len() >= 3)
                .map(|h| to_pts(h))
                .collect();
            let ring_ids: Vec<Vec<usize>> = face_rings.into_iter().filter(|r| r.len() >= 3).collect();
            kept_faces.push(Face {
                boundary,
                holes,
                vn: face.vn,
            });
            rings.push(ring_ids);
            source.push(fi);
        }

        let mut edges: BTreeMap<EdgeKey, Vec<usize>> = BTreeMap::new();
        for (fi, face_rings) in rings.iter().enumerate() {
            for ring in face_rings.iter() {
                let n = ring.len();
                for i in 0..n {
                    edges.entry(edge_key(ring[i], ring[(i + 1) % n])).or_default().push(fi);
                }
            }
        }

        Self {
            faces: kept_faces,
            vertices,
            rings,
            edges,
            source,
            tolerance: tol,
        }
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Input index of each face (faces collapsed by welding are skipped).
    pub fn source_indices(&self) -> &[usize] {
        &self.source
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every edge is shared by exactly two faces.
    pub fn is_solid(&self) -> bool {
        !self.faces.is_empty() && self.edges.values().all(|f| f.len() == 2)
    }

    /// Edges used by a single face.
    pub fn naked_edges(&self) -> Vec<(Point, Point)> {
        self.edges
            .iter()
            .filter(|(_, f)| f.len() == 1)
            .map(|(&(a, b), _)| (self.vertices[a], self.vertices[b]))
            .collect()
    }

    /// Edges used by more than two faces.
    pub fn non_manifold_edges(&self) -> Vec<(Point, Point)> {
        self.edges
            .iter()
            .filter(|(_, f)| f.len() > 2)
            .map(|(&(a, b), _)| (self.vertices[a], self.vertices[b]))
            .collect()
    }

    /// Indices of the faces sharing an edge with face `i`.
    pub fn face_neighbors(&self, i: usize) -> BTreeSet<usize> {
        let mut out = BTreeSet::new();
        for key in self.face_edge_keys(i) {
            if let Some(faces) = self.edges.get(&key) {
                out.extend(faces.iter().copied().filter(|&f| f != i));
            }
        }
        out
    }

    /// Indices of faces using the edge between two welded vertices.
    pub fn edge_faces(&self, key: EdgeKey) -> &[usize] {
        self.edges.get(&edge_key(key.0, key.1)).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn face_edge_keys(&self, i: usize) -> Vec<EdgeKey> {
        let mut keys = Vec::new();
        for ring in self.rings[i].iter() {
            let n = ring.len();
            for k in 0..n {
                keys.push(edge_key(ring[k], ring[(k + 1) % n]));
            }
        }
        keys
    }

    fn directed_edges(&self, i: usize) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for ring in self.rings[i].iter() {
            let n = ring.len();
            for k in 0..n {
                out.push((ring[k], ring[(k + 1) % n]));
            }
        }
        out
    }

    /// Signed volume; positive when the faces point outward.
    pub fn signed_volume(&self) -> f64 {
        self.faces.iter().map(|f| f.signed_volume_contribution()).sum()
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Makes face orientation consistent and outward.
    ///
    /// Walks face neighbourhoods breadth-first: two faces are consistent when
    /// they traverse their shared edge in opposite directions. The whole
    /// shell is then flipped if its signed volume is negative.
    pub fn orient_outward(&self) -> Self {
        let n = self.faces.len();
        let mut flip: Vec<Option<bool>> = vec![None; n];
        for start in 0..n {
            if flip[start].is_some() {
                continue;
            }
            flip[start] = Some(false);
            let mut queue = VecDeque::from([start]);
            while let Some(f) = queue.pop_front() {
                let f_flipped = flip[f].unwrap_or(false);
                for (a, b) in self.directed_edges(f) {
                    let (a, b) = if f_flipped { (b, a) } else { (a, b) };
                    for &g in self.edge_faces((a, b)) {
                        if g == f || flip[g].is_some() {
                            continue;
                        }
                        let same_direction = self.directed_edges(g).contains(&(a, b));
                        flip[g] = Some(same_direction);
                        queue.push_back(g);
                    }
                }
            }
        }

        let mut faces: Vec<Face> = self
            .faces
            .iter()
            .zip(flip.iter())
            .map(|(f, fl)| if fl.unwrap_or(false) { f.flip() } else { f.clone() })
            .collect();
        let signed: f64 = faces.iter().map(|f| f.signed_volume_contribution()).sum();
        if signed < 0. {
            faces = faces.iter().map(|f| f.flip()).collect();
        }
        Self::from_faces(faces, self.tolerance)
    }
}

fn edge_key(a: usize, b: usize) -> EdgeKey {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unit box with outward faces, optionally without the top.
    fn box_faces(with_top: bool) -> Vec<Face> {
        let p = |x: f64, y: f64, z: f64| Point::new(x, y, z);
        let mut rings = vec![
            vec![p(0., 0., 0.), p(0., 1., 0.), p(1., 1., 0.), p(1., 0., 0.)],
            vec![p(0., 0., 0.), p(1., 0., 0.), p(1., 0., 1.), p(0., 0., 1.)],
            vec![p(1., 0., 0.), p(1., 1., 0.), p(1., 1., 1.), p(1., 0., 1.)],
            vec![p(1., 1., 0.), p(0., 1., 0.), p(0., 1., 1.), p(1., 1., 1.)],
            vec![p(0., 1., 0.), p(0., 0., 0.), p(0., 0., 1.), p(0., 1., 1.)],
        ];
        if with_top {
            rings.push(vec![p(0., 0., 1.), p(1., 0., 1.), p(1., 1., 1.), p(0., 1., 1.)]);
        }
        rings.into_iter().map(|r| Face::from_ring(r).unwrap()).collect()
    }

    #[test]
    fn test_closed_box() {
        let poly = Polyhedron::from_faces(box_faces(true), 0.01);
        assert!(poly.is_solid());
        assert_eq!(poly.vertices().len(), 8);
        assert_eq!(poly.edge_count(), 12);
        assert!(poly.naked_edges().is_empty());
        assert!((poly.signed_volume() - 1.).abs() < 1e-12);
        assert_eq!(poly.face_neighbors(0).len(), 4);
    }

    #[test]
    fn test_open_box() {
        let poly = Polyhedron::from_faces(box_faces(false), 0.01);
        assert!(!poly.is_solid());
        assert_eq!(poly.naked_edges().len(), 4);
    }

    #[test]
    fn test_welding_within_tolerance() {
        let mut faces = box_faces(true);
        faces[5].boundary[0] = Point::new(0.001, -0.001, 1.);
        let poly = Polyhedron::from_faces(faces, 0.01);
        assert!(poly.is_solid());
    }

    #[test]
    fn test_orient_outward() {
        let mut faces = box_faces(true);
        faces[2] = faces[2].flip();
        faces[5] = faces[5].flip();
        let faces: Vec<Face> = faces.iter().map(|f| f.flip()).collect();
        let poly = Polyhedron::from_faces(faces, 0.01);
        let fixed = poly.orient_outward();
        assert!((fixed.signed_volume() - 1.).abs() < 1e-12);
        for f in fixed.faces() {
            let c = f.centroid();
            let probe = c + f.vn * 0.1;
            let inside = probe.x > 0. && probe.x < 1. && probe.y > 0. && probe.y < 1. && probe.z > 0. && probe.z < 1.;
            assert!(!inside);
        }
    }
}
