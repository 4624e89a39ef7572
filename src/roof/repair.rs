//! Healing of roof shells that are almost closed.
//!
//! Every stage takes a shell and returns a (possibly) improved one; the
//! stages run in a fixed order and the first one producing a closed solid
//! ends the repair.

use crate::geom::face::Face;
use crate::geom::point::Point;
use crate::geom::point::check::are_points_coplanar;
use crate::geom::point2d::Point2D;
use crate::geom::polygon2d::Polygon2D;
use crate::geom::polyhedron::Polyhedron;
use crate::geom::polyline::join_segments;
use crate::geom::projection::PlaneBasis;
use crate::geom::segment::LineSegment2D;
use crate::geom::vector::Vector;
use crate::room::Room2D;
use anyhow::Result;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// What a shell face stands for in the finished volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceRole {
    Floor,
    Roof,
    /// Wall face generated from the floor segment with this index.
    Wall(usize),
    /// Face added while closing gaps.
    Patch,
}

/// Loose faces of a room volume with their roles.
#[derive(Debug, Clone)]
pub struct Shell {
    pub faces: Vec<Face>,
    pub roles: Vec<FaceRole>,
    /// Segments whose wall faces were removed.
    pub excluded: BTreeSet<usize>,
    pub tolerance: f64,
}

pub type RepairStage = fn(Shell) -> Shell;

/// Repair stages in the order they are tried.
pub const REPAIR_STAGES: [(&str, RepairStage); 4] = [
    ("merge_edges", merge_edges),
    ("patch_vertical_gaps", patch_vertical_gaps),
    ("cap_planar_holes", cap_planar_holes),
    ("remove_disconnected", remove_disconnected),
];

/// Recursion limit when splitting self-intersecting hole loops.
const MAX_SPLIT_DEPTH: usize = 8;

impl Shell {
    pub fn new(tolerance: f64) -> Self {
        Self {
            faces: Vec::new(),
            roles: Vec::new(),
            excluded: BTreeSet::new(),
            tolerance,
        }
    }

    /// Floor of `room` facing down, then roof caps, then walls.
    pub fn assemble(room: &Room2D, roof_faces: Vec<Face>, walls: Vec<(Face, usize)>, tol: f64) -> Result<Self> {
        let mut shell = Self::new(tol);
        let z = room.floor_height();
        let lift = |ring: &Polygon2D| ring.vertices().iter().map(|p| Point::from_2d(*p, z)).collect::<Vec<_>>();
        let floor = room.floor();
        let floor_face = Face::new(lift(&floor.boundary), floor.holes.iter().map(lift).collect())?;
        shell.push(if floor_face.vn.dz > 0. { floor_face.flip() } else { floor_face }, FaceRole::Floor);
        for face in roof_faces {
            shell.push(face, FaceRole::Roof);
        }
        for (face, segment) in walls {
            shell.push(face, FaceRole::Wall(segment));
        }
        Ok(shell)
    }

    pub fn push(&mut self, face: Face, role: FaceRole) {
        self.faces.push(face);
        self.roles.push(role);
    }

    pub fn polyhedron(&self) -> Polyhedron {
        Polyhedron::from_faces(self.faces.clone(), self.tolerance)
    }

    pub fn is_solid(&self) -> bool {
        self.polyhedron().is_solid()
    }

    /// Keeps the faces selected by `keep`, recording dropped walls.
    fn retain(&mut self, keep: &[bool]) {
        let faces = std::mem::take(&mut self.faces);
        let roles = std::mem::take(&mut self.roles);
        for ((face, role), k) in faces.into_iter().zip(roles).zip(keep.iter()) {
            if *k {
                self.push(face, role);
            } else if let FaceRole::Wall(s) = role {
                self.excluded.insert(s);
            }
        }
    }
}

/// Runs the repair stages until the shell closes.
pub fn repair(mut shell: Shell) -> Option<Shell> {
    for (name, stage) in REPAIR_STAGES.iter() {
        shell = stage(shell);
        let solid = shell.is_solid();
        debug!(stage = *name, faces = shell.faces.len(), solid, "Roof shell repair stage");
        if solid {
            return Some(shell);
        }
    }
    warn!(naked_edges = shell.polyhedron().naked_edges().len(), "Roof shell could not be closed");
    None
}

/// Splits edges at vertices of other faces lying on them (T-junctions).
pub fn merge_edges(mut shell: Shell) -> Shell {
    let tol = shell.tolerance;
    let all: Vec<Point> = shell.faces.iter().flat_map(|f| f.rings().concat()).collect();
    let mut keep = vec![true; shell.faces.len()];
    for (i, face) in shell.faces.iter_mut().enumerate() {
        match face.insert_points_on_edges(&all, tol).remove_duplicate_vertices(tol) {
            Ok(merged) => *face = merged,
            Err(_) => keep[i] = false,
        }
    }
    shell.retain(&keep);
    shell
}

/// Closes vertical slots between naked edges that lie above one another.
///
/// Two naked, non-vertical edges whose plan projections are colinear and
/// overlap bound a vertical gap. The gap over the shared stretch is filled
/// with a quad, or with two triangles if the edges cross. An edge may face
/// several partners along one seam and gets a patch for each of them.
/// Patch corners landing inside existing edges are merged afterwards.
pub fn patch_vertical_gaps(mut shell: Shell) -> Shell {
    let tol = shell.tolerance;
    let naked: Vec<(Point, Point)> = shell
        .polyhedron()
        .naked_edges()
        .into_iter()
        .filter(|(a, b)| a.to_2d().distance(&b.to_2d()) > tol)
        .collect();
    let mut patches = Vec::new();
    for (i, &(a1, a2)) in naked.iter().enumerate() {
        let plan_a = LineSegment2D::new(a1.to_2d(), a2.to_2d());
        for &(b1, b2) in naked.iter().skip(i + 1) {
            let plan_b = LineSegment2D::new(b1.to_2d(), b2.to_2d());
            let Some((t0, t1)) = plan_a.colinear_overlap(&plan_b, tol) else {
                continue;
            };
            let at = |t: f64| {
                let p = plan_a.point_at(t);
                let za = lerp_z(a1, a2, &plan_a, p);
                let zb = lerp_z(b1, b2, &plan_b, p);
                (p, za, zb)
            };
            let (p0, za0, zb0) = at(t0);
            let (p1, za1, zb1) = at(t1);
            if (za0 - zb0).abs() <= tol && (za1 - zb1).abs() <= tol {
                continue;
            }
            patches.extend(gap_faces(p0, za0, zb0, p1, za1, zb1, tol));
        }
    }
    debug!(count = patches.len(), "Patching vertical gaps");
    if patches.is_empty() {
        return shell;
    }
    for face in patches {
        shell.push(face, FaceRole::Patch);
    }
    merge_edges(shell)
}

fn lerp_z(p1: Point, p2: Point, plan: &LineSegment2D, at: Point2D) -> f64 {
    let t = plan.parameter_of(at);
    p1.z + (p2.z - p1.z) * t
}

/// Quad between two edges over one plan stretch, split at a crossing.
fn gap_faces(p0: Point2D, za0: f64, zb0: f64, p1: Point2D, za1: f64, zb1: f64, tol: f64) -> Vec<Face> {
    let (d0, d1) = (za0 - zb0, za1 - zb1);
    let mut faces = Vec::new();
    if d0 * d1 < 0. {
        let t = d0 / (d0 - d1);
        let pc = p0 + (p1 - p0) * t;
        let zc = za0 + (za1 - za0) * t;
        let x = Point::from_2d(pc, zc);
        if d0.abs() > tol {
            faces.push(vec![Point::from_2d(p0, za0), x, Point::from_2d(p0, zb0)]);
        }
        if d1.abs() > tol {
            faces.push(vec![x, Point::from_2d(p1, za1), Point::from_2d(p1, zb1)]);
        }
    } else {
        let mut ring = vec![Point::from_2d(p0, za0), Point::from_2d(p1, za1)];
        if d1.abs() > tol {
            ring.push(Point::from_2d(p1, zb1));
        }
        if d0.abs() > tol {
            ring.push(Point::from_2d(p0, zb0));
        }
        faces.push(ring);
    }
    faces.into_iter().filter_map(|r| Face::from_ring(r).ok()).collect()
}

/// Caps closed loops of naked edges with planar faces.
///
/// Loops that are not planar are capped only if a plane through one of their
/// non-vertical edges holds all points. Self-intersecting loops are split at
/// their first crossing and each part capped on its own.
pub fn cap_planar_holes(mut shell: Shell) -> Shell {
    let tol = shell.tolerance;
    let naked = shell.polyhedron().naked_edges();
    let loops = join_segments(&naked, tol);
    let mut caps = Vec::new();
    for pl in loops.iter().filter(|pl| pl.closed && pl.pts.len() >= 3) {
        match loop_basis(&pl.pts, tol) {
            Some(basis) => caps.extend(cap_loop(&pl.pts, &basis, tol, 0)),
            None => debug!(points = pl.pts.len(), "Skipping non-planar naked loop"),
        }
    }
    debug!(count = caps.len(), "Capping naked loops");
    for face in caps {
        shell.push(face, FaceRole::Patch);
    }
    shell
}

/// Plane basis holding every loop point within `tol`.
fn loop_basis(pts: &[Point], tol: f64) -> Option<PlaneBasis> {
    if are_points_coplanar(pts, tol) {
        let vn = Vector::newell_normal(pts).ok()?;
        return PlaneBasis::from_normal(pts[0], vn);
    }
    let n = pts.len();
    for k in 0..n {
        let (a, b) = (pts[k], pts[(k + 1) % n]);
        if a.to_2d().distance(&b.to_2d()) <= tol {
            continue;
        }
        let ab = b - a;
        let far = pts
            .iter()
            .map(|p| (ab.cross(&(*p - a)), *p))
            .max_by(|x, y| x.0.length().total_cmp(&y.0.length()));
        let Some((vn, _)) = far else { continue };
        let Ok(vn) = vn.normalize() else { continue };
        if pts.iter().all(|p| (*p - a).dot(&vn).abs() <= tol) {
            return PlaneBasis::from_normal(a, vn);
        }
    }
    None
}

fn cap_loop(pts: &[Point], basis: &PlaneBasis, tol: f64, depth: usize) -> Vec<Face> {
    let plan = basis.project_ring(pts);
    let Ok(poly) = Polygon2D::new(plan.clone()) else {
        return Vec::new();
    };
    // Crossing lobes cancel in the signed area
    if !poly.is_self_intersecting(tol) {
        if poly.area() <= tol * tol {
            return Vec::new();
        }
        return Face::from_ring(pts.to_vec()).into_iter().collect();
    }
    if depth >= MAX_SPLIT_DEPTH {
        return Vec::new();
    }
    let Some((i, j, x)) = first_crossing(&poly, tol) else {
        return Vec::new();
    };
    let x3 = basis.unproject(x);
    let n = pts.len();
    let mut first = vec![x3];
    first.extend((i + 1..=j).map(|k| pts[k % n]));
    let mut second = vec![x3];
    second.extend((j + 1..=i + n).map(|k| pts[k % n]));
    let mut faces = cap_loop(&first, basis, tol, depth + 1);
    faces.extend(cap_loop(&second, basis, tol, depth + 1));
    faces
}

/// First pair of non-adjacent crossing segments and their crossing point.
fn first_crossing(poly: &Polygon2D, tol: f64) -> Option<(usize, usize, Point2D)> {
    let segs = poly.segments();
    let n = segs.len();
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if let Some(x) = segs[i].intersect(&segs[j], tol) {
                return Some((i, j, x));
            }
        }
    }
    None
}

/// Drops faces that share edges with fewer than two other faces.
pub fn remove_disconnected(mut shell: Shell) -> Shell {
    loop {
        let poly = shell.polyhedron();
        let mut keep = vec![true; shell.faces.len()];
        // Faces collapsed by welding are gone from `poly` and are dropped too.
        let mut present = vec![false; shell.faces.len()];
        for (i, &src) in poly.source_indices().iter().enumerate() {
            present[src] = true;
            if poly.face_neighbors(i).len() < 2 {
                keep[src] = false;
            }
        }
        for (k, p) in keep.iter_mut().zip(present) {
            *k &= p;
        }
        let removed = keep.iter().filter(|k| !**k).count();
        if removed == 0 {
            return shell;
        }
        debug!(removed, "Removing disconnected faces");
        shell.retain(&keep);
    }
}
