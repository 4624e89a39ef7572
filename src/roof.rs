//! Roof geometry and roof-bounded room volumes.
//!
//! A `RoofSpecification` is a set of planar, arbitrarily sloped faces. Rooms
//! find their roof through a `RoofIndex` keyed by room identifier.
//! `build_roof_volume` turns a room and its roof into a closed polyhedron
//! (see `pipeline` for the stages and `repair` for the healing of near-miss
//! shells).

use crate::error::Room2dError;
use crate::geom::face::Face;
use crate::geom::plane::Plane;
use crate::geom::point::Point;
use crate::geom::point2d::Point2D;
use crate::geom::polygon2d::{Polygon2D, Region2D};
use crate::geom::polyhedron::Polyhedron;
use crate::geom::vector::Vector;
use crate::room::Room2D;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

pub mod index;
pub mod pipeline;
pub mod repair;

pub use index::RoofIndex;
use repair::{FaceRole, Shell};

/// Faces with a normal this close to horizontal are vertical and never roof a room.
const VERTICAL_ROOF_DZ: f64 = 1e-3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoofSpecification {
    pub faces: Vec<Face>,
}

impl RoofSpecification {
    pub fn new(faces: Vec<Face>) -> Self {
        Self { faces }
    }

    /// Roof from loose faces, without vertical faces and duplicates.
    pub fn from_faces(faces: Vec<Face>, tol: f64) -> Self {
        let mut spec = Self {
            faces: faces.into_iter().filter(|f| footprint(f).is_some()).collect(),
        };
        spec.remove_duplicates(tol);
        spec
    }

    /// Single-face roof over a plan polygon.
    pub fn from_polygon_and_plane(poly: &Polygon2D, plane: &Plane) -> Result<Self> {
        Ok(Self {
            faces: vec![Self::lift_polygon(poly, plane)?],
        })
    }

    /// Roof from plan polygons lifted onto their planes.
    pub fn from_polygons_and_planes(parts: &[(Polygon2D, Plane)]) -> Result<Self> {
        let faces = parts
            .iter()
            .map(|(poly, plane)| Self::lift_polygon(poly, plane))
            .collect::<Result<Vec<Face>>>()?;
        Ok(Self { faces })
    }

    /// Lifts a plan polygon vertically onto `plane`, facing up.
    pub fn lift_polygon(poly: &Polygon2D, plane: &Plane) -> Result<Face> {
        let pts = poly
            .vertices()
            .iter()
            .map(|p| plane.project_vertical(*p))
            .collect::<Option<Vec<Point>>>()
            .ok_or_else(|| anyhow!("Cannot lift a polygon onto a vertical plane"))?;
        let face = Face::from_ring(pts)?;
        Ok(if face.vn.dz < 0. { face.flip() } else { face })
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Plan footprints of all non-vertical faces.
    pub fn polygons_2d(&self) -> Vec<Region2D> {
        self.faces.iter().filter_map(footprint).collect()
    }

    pub fn planes(&self) -> Vec<Plane> {
        self.faces.iter().map(|f| f.plane()).collect()
    }

    pub fn min_height(&self) -> Option<f64> {
        self.vertices().map(|p| p.z).min_by(f64::total_cmp)
    }

    pub fn max_height(&self) -> Option<f64> {
        self.vertices().map(|p| p.z).max_by(f64::total_cmp)
    }

    /// Midpoint between the lowest and highest vertex.
    pub fn center_height(&self) -> Option<f64> {
        Some((self.min_height()? + self.max_height()?) / 2.)
    }

    fn vertices(&self) -> impl Iterator<Item = &Point> {
        self.faces.iter().flat_map(|f| f.boundary.iter())
    }

    /// Drops faces whose boundary matches an earlier face within `tol`.
    ///
    /// Returns the number of faces removed.
    pub fn remove_duplicates(&mut self, tol: f64) -> usize {
        let before = self.faces.len();
        let mut kept: Vec<Face> = Vec::with_capacity(before);
        for face in self.faces.drain(..) {
            if !kept.iter().any(|k| faces_equivalent(k, &face, tol)) {
                kept.push(face);
            }
        }
        self.faces = kept;
        before - self.faces.len()
    }

    pub fn move_by(&mut self, v: Vector) {
        for face in self.faces.iter_mut() {
            for p in face.boundary.iter_mut().chain(face.holes.iter_mut().flatten()) {
                *p = *p + v;
            }
        }
    }
}

/// Plan footprint of a roof face, `None` for vertical or degenerate faces.
pub fn footprint(face: &Face) -> Option<Region2D> {
    if face.vn.dz.abs() < VERTICAL_ROOF_DZ {
        return None;
    }
    let ring = |pts: &[Point]| Polygon2D::new(pts.iter().map(|p| p.to_2d()).collect()).ok();
    let boundary = ring(&face.boundary)?;
    let holes = face.holes.iter().filter_map(|h| ring(h)).collect();
    let region = Region2D::new(boundary, holes);
    if region.area() <= 0. {
        return None;
    }
    Some(region)
}

/// Same boundary vertices (any start, either direction) within `tol`.
fn faces_equivalent(a: &Face, b: &Face, tol: f64) -> bool {
    let (pa, pb) = (&a.boundary, &b.boundary);
    if pa.len() != pb.len() {
        return false;
    }
    let n = pa.len();
    let Some(start) = pb.iter().position(|p| p.is_close_tol(&pa[0], tol)) else {
        return false;
    };
    let forward = (0..n).all(|k| pa[k].is_close_tol(&pb[(start + k) % n], tol));
    let backward = (0..n).all(|k| pa[k].is_close_tol(&pb[(start + n - k) % n], tol));
    forward || backward
}

/// Horizontal faces at elevation `z` covering `regions`, facing up.
pub fn flat_caps(regions: &[Region2D], z: f64) -> Result<Vec<Face>> {
    regions
        .iter()
        .map(|r| {
            let lift = |ring: &Polygon2D| ring.vertices().iter().map(|p| Point::from_2d(*p, z)).collect::<Vec<_>>();
            let face = Face::new(lift(&r.boundary), r.holes.iter().map(lift).collect())?;
            Ok(if face.vn.dz < 0. { face.flip() } else { face })
        })
        .collect()
}

/// Closed room volume with its faces classified.
#[derive(Debug, Clone)]
pub struct RoofVolume {
    pub polyhedron: Polyhedron,
    /// Indices of floor faces (facing down).
    pub floor_faces: Vec<usize>,
    /// Indices of roof caps (sloped or flat).
    pub roof_faces: Vec<usize>,
    /// `(face index, segment index)` of every wall face.
    pub wall_faces: Vec<(usize, usize)>,
    /// Segments whose wall faces were dropped while closing the volume.
    pub excluded_segments: BTreeSet<usize>,
}

impl RoofVolume {
    /// Builds a volume from roof caps and walls without any repair.
    pub fn assemble(room: &Room2D, roof_faces: Vec<Face>, walls: Vec<(Face, usize)>, tol: f64) -> Result<Self> {
        let shell = Shell::assemble(room, roof_faces, walls, tol)?;
        Ok(Self::from_shell(shell))
    }

    /// Welds the shell into a polyhedron with outward faces.
    pub(crate) fn from_shell(shell: Shell) -> Self {
        let Shell {
            faces,
            roles,
            excluded,
            tolerance,
        } = shell;
        let welded = Polyhedron::from_faces(faces, tolerance);
        let roles: Vec<FaceRole> = welded.source_indices().iter().map(|&i| roles[i]).collect();
        let polyhedron = welded.orient_outward();
        let roles: Vec<FaceRole> = polyhedron.source_indices().iter().map(|&i| roles[i]).collect();

        let mut volume = Self {
            polyhedron,
            floor_faces: Vec::new(),
            roof_faces: Vec::new(),
            wall_faces: Vec::new(),
            excluded_segments: excluded,
        };
        for (i, role) in roles.iter().enumerate() {
            match role {
                FaceRole::Floor => volume.floor_faces.push(i),
                FaceRole::Roof => volume.roof_faces.push(i),
                FaceRole::Wall(s) => volume.wall_faces.push((i, *s)),
                FaceRole::Patch => {}
            }
        }
        volume
    }

    pub fn is_solid(&self) -> bool {
        self.polyhedron.is_solid()
    }
}

/// Roof-bounded volume of `room`, or `None` when the caller should extrude.
pub fn build_roof_volume(room: &Room2D, roof: &RoofSpecification, tol: f64) -> Option<RoofVolume> {
    match try_build_roof_volume(room, roof, tol) {
        Ok(volume) => Some(volume),
        Err(e) => {
            debug!("{e}");
            None
        }
    }
}

/// Like [`build_roof_volume`] but reports why the volume could not be built.
pub fn try_build_roof_volume(room: &Room2D, roof: &RoofSpecification, tol: f64) -> Result<RoofVolume, Room2dError> {
    let fail = |reason: String| Room2dError::InvalidRoofGeometry {
        room: room.identifier.clone(),
        reason,
    };
    let shell = pipeline::build_shell(room, roof, tol).map_err(|e| fail(e.to_string()))?;
    if shell.is_solid() {
        return Ok(RoofVolume::from_shell(shell));
    }
    let shell = repair::repair(shell).ok_or_else(|| fail("shell is still open after all repair stages".to_string()))?;
    Ok(RoofVolume::from_shell(shell))
}

/// Plane through a plan point rising with `slope` (rise over run) along `dir`.
///
/// Convenience for building sloped roof planes: the plane passes through
/// `(origin.x, origin.y, z)` and climbs towards `dir`.
pub fn sloped_plane(origin: Point2D, z: f64, dir: Point2D, slope: f64) -> Result<Plane> {
    let len = dir.length();
    if len <= 0. {
        return Err(anyhow!("Slope direction must not be zero"));
    }
    let d = dir * (1. / len);
    Plane::new(Point::from_2d(origin, z), Vector::new(-d.x * slope, -d.y * slope, 1.))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon2D {
        Polygon2D::new(vec![
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x1, y1),
            Point2D::new(x0, y1),
        ])
        .unwrap()
    }

    #[test]
    fn test_lift_polygon() {
        let plane = sloped_plane(Point2D::new(0., 0.), 3., Point2D::new(1., 0.), 0.5).unwrap();
        let face = RoofSpecification::lift_polygon(&rect(0., 0., 4., 2.), &plane).unwrap();
        assert!(face.vn.dz > 0.);
        assert!((face.boundary[1].z - 5.).abs() < 1e-9);
        let spec = RoofSpecification::new(vec![face]);
        assert!((spec.min_height().unwrap() - 3.).abs() < 1e-9);
        assert!((spec.max_height().unwrap() - 5.).abs() < 1e-9);
        assert!((spec.center_height().unwrap() - 4.).abs() < 1e-9);
        assert_eq!(spec.polygons_2d().len(), 1);
    }

    #[test]
    fn test_remove_duplicates() {
        let plane = Plane::horizontal(4.);
        let a = RoofSpecification::lift_polygon(&rect(0., 0., 4., 2.), &plane).unwrap();
        let b = a.flip();
        let c = RoofSpecification::lift_polygon(&rect(4., 0., 8., 2.), &plane).unwrap();
        let mut spec = RoofSpecification::new(vec![a, b, c]);
        assert_eq!(spec.remove_duplicates(0.01), 1);
        assert_eq!(spec.len(), 2);
    }

    #[test]
    fn test_vertical_face_has_no_footprint() {
        let wall = Face::from_ring(vec![
            Point::new(0., 0., 0.),
            Point::new(1., 0., 0.),
            Point::new(1., 0., 1.),
            Point::new(0., 0., 1.),
        ])
        .unwrap();
        assert!(footprint(&wall).is_none());
    }
}
