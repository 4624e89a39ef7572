//! Lookup of roof specifications by room.

use crate::geom::IsClose;
use crate::geom::face::Face;
use crate::geom::polygon2d::boolean::intersection;
use crate::geom::polygon2d::relations::{PolygonRelation, polygon_relationship};
use crate::roof::{RoofSpecification, footprint};
use crate::room::Room2D;
use std::collections::HashMap;
use tracing::debug;

/// Roof specifications and the rooms they cover.
#[derive(Debug, Clone, Default)]
pub struct RoofIndex {
    specs: Vec<RoofSpecification>,
    by_room: HashMap<String, usize>,
}

impl RoofIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a specification and returns its index.
    pub fn insert(&mut self, spec: RoofSpecification) -> usize {
        self.specs.push(spec);
        self.specs.len() - 1
    }

    /// Points `room_id` at specification `spec`. Returns false for an unknown index.
    pub fn assign(&mut self, room_id: &str, spec: usize) -> bool {
        if spec >= self.specs.len() {
            return false;
        }
        self.by_room.insert(room_id.to_string(), spec);
        true
    }

    pub fn roof_for(&self, room_id: &str) -> Option<&RoofSpecification> {
        self.by_room.get(room_id).and_then(|&i| self.specs.get(i))
    }

    pub fn specs(&self) -> &[RoofSpecification] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Distributes loose roof faces over rooms grouped into levels.
    ///
    /// Rooms sharing a floor height (within `tol`) form a level. Levels are
    /// visited from the top down and each face goes to the first level it
    /// covers: it must overlap one of the level's rooms by at least
    /// `overlap_threshold` times that room's floor area, and lie above the
    /// room's floor at every vertex of the overlap. All rooms of a level
    /// share one specification.
    ///
    /// Returns the faces that were not assigned to any level.
    pub fn assign_by_overlap(&mut self, faces: &[Face], rooms: &[Room2D], overlap_threshold: f64, tol: f64) -> Vec<Face> {
        let mut levels: Vec<(f64, Vec<&Room2D>)> = Vec::new();
        for room in rooms {
            match levels.iter_mut().find(|(h, _)| h.is_close_tol(room.floor_height(), tol)) {
                Some((_, members)) => members.push(room),
                None => levels.push((room.floor_height(), vec![room])),
            }
        }
        levels.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut assigned: Vec<Vec<Face>> = vec![Vec::new(); levels.len()];
        let mut orphans = Vec::new();
        for face in faces {
            let level = levels
                .iter()
                .position(|(_, members)| members.iter().any(|r| face_covers_room(face, r, overlap_threshold, tol)));
            match level {
                Some(l) => assigned[l].push(face.clone()),
                None => orphans.push(face.clone()),
            }
        }

        for ((height, members), faces) in levels.iter().zip(assigned) {
            if faces.is_empty() {
                continue;
            }
            debug!(level = height, faces = faces.len(), rooms = members.len(), "Assigning roof faces");
            let idx = self.insert(RoofSpecification::new(faces));
            for room in members {
                self.by_room.insert(room.identifier.clone(), idx);
            }
        }
        orphans
    }
}

fn face_covers_room(face: &Face, room: &Room2D, overlap_threshold: f64, tol: f64) -> bool {
    let Some(region) = footprint(face) else {
        return false;
    };
    if face.boundary.iter().all(|p| p.z < room.floor_height()) {
        return false;
    }
    if polygon_relationship(&region, room.floor(), tol) < PolygonRelation::Overlapping {
        return false;
    }
    let overlap = intersection(std::slice::from_ref(room.floor()), std::slice::from_ref(&region), tol);
    if overlap.total_area() < room.floor_area() * overlap_threshold {
        return false;
    }
    let plane = face.plane();
    overlap.regions.iter().flat_map(|r| r.rings()).all(|ring| {
        ring.vertices()
            .iter()
            .all(|p| plane.z_at(p.x, p.y).is_some_and(|z| z >= room.floor_height()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeometryConfig;
    use crate::geom::plane::Plane;
    use crate::geom::point2d::Point2D;
    use crate::geom::polygon2d::Polygon2D;
    use crate::room::RoomPlan;

    fn room(id: &str, x0: f64, fh: f64) -> Room2D {
        let plan = RoomPlan {
            identifier: Some(id.to_string()),
            boundary: vec![(x0, 0.), (x0 + 5., 0.), (x0 + 5., 5.), (x0, 5.)],
            floor_height: fh,
            ..RoomPlan::default()
        };
        Room2D::from_plan(plan, &GeometryConfig::default()).unwrap()
    }

    fn flat(x0: f64, x1: f64, z: f64) -> Face {
        let poly = Polygon2D::new(vec![
            Point2D::new(x0, 0.),
            Point2D::new(x1, 0.),
            Point2D::new(x1, 5.),
            Point2D::new(x0, 5.),
        ])
        .unwrap();
        RoofSpecification::lift_polygon(&poly, &Plane::horizontal(z)).unwrap()
    }

    #[test]
    fn test_insert_and_assign() {
        let mut index = RoofIndex::new();
        let i = index.insert(RoofSpecification::new(vec![flat(0., 5., 4.)]));
        assert!(index.assign("a", i));
        assert!(!index.assign("b", 7));
        assert!(index.roof_for("a").is_some());
        assert!(index.roof_for("b").is_none());
    }

    #[test]
    fn test_assign_by_overlap_prefers_top_level() {
        let rooms = vec![room("ground", 0., 0.), room("upper", 0., 3.), room("side", 10., 0.)];
        let faces = vec![flat(0., 5., 7.), flat(10., 15., 4.), flat(30., 35., 4.)];
        let mut index = RoofIndex::new();
        let orphans = index.assign_by_overlap(&faces, &rooms, 0.25, 0.01);
        assert_eq!(orphans.len(), 1);
        assert_eq!(index.len(), 2);
        // The face above both stacked rooms goes to the upper level
        let upper = index.roof_for("upper").unwrap();
        assert_eq!(upper.len(), 1);
        assert!((upper.faces[0].boundary[0].z - 7.).abs() < 1e-9);
        // Ground-level rooms share one specification
        let ground = index.roof_for("ground").unwrap();
        assert_eq!(ground, index.roof_for("side").unwrap());
        assert!((ground.faces[0].boundary[0].z - 4.).abs() < 1e-9);
    }

    #[test]
    fn test_face_below_floor_not_assigned() {
        let rooms = vec![room("upper", 0., 3.)];
        let mut index = RoofIndex::new();
        let orphans = index.assign_by_overlap(&[flat(0., 5., 2.)], &rooms, 0.25, 0.01);
        assert_eq!(orphans.len(), 1);
        assert!(index.is_empty());
    }
}
