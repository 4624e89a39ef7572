//! Construction of the loose shell under a roof.
//!
//! 1. Roof faces whose plan footprint shares area with the floor are kept,
//!    in specification order (earlier faces win where footprints overlap).
//! 2. The floor is partitioned into the plan areas owned by each roof plane.
//!    Floor area under no roof becomes a flat cap at ceiling height.
//! 3. Each owned area is lifted vertically onto its plane.
//! 4. Every floor segment gets a wall whose top follows the owning planes,
//!    with a vertical step wherever ownership changes between planes of
//!    different height.

use crate::geom::face::Face;
use crate::geom::plane::Plane;
use crate::geom::point::Point;
use crate::geom::point2d::Point2D;
use crate::geom::polygon2d::boolean::{difference, intersection, union};
use crate::geom::polygon2d::relations::{PolygonRelation, area_tolerance, polygon_relationship};
use crate::geom::polygon2d::{Polygon2D, Region2D};
use crate::geom::round_to_tolerance;
use crate::geom::segment::LineSegment2D;
use crate::roof::repair::Shell;
use crate::roof::{RoofSpecification, footprint};
use crate::room::Room2D;
use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;

/// Roof face sharing area with the floor.
#[derive(Debug, Clone)]
pub struct RelevantRoof {
    /// Index of the face in the roof specification.
    pub index: usize,
    pub region: Region2D,
    pub plane: Plane,
    pub relation: PolygonRelation,
}

/// Plan area of the floor covered by one plane.
#[derive(Debug, Clone)]
pub struct Owner {
    pub regions: Vec<Region2D>,
    pub plane: Plane,
}

pub fn relevant_roofs(room: &Room2D, roof: &RoofSpecification, tol: f64) -> Vec<RelevantRoof> {
    roof.faces
        .iter()
        .enumerate()
        .filter_map(|(index, face)| {
            let region = footprint(face)?;
            let relation = polygon_relationship(&region, room.floor(), tol);
            (relation >= PolygonRelation::Overlapping).then(|| RelevantRoof {
                index,
                region,
                plane: face.plane(),
                relation,
            })
        })
        .collect()
}

/// Splits the floor among the relevant roofs.
///
/// When the first relevant roof covers the whole floor it owns everything.
/// Otherwise each roof owns its overlap with the floor minus what earlier
/// roofs already own, and any uncovered rest is owned by a horizontal plane
/// at ceiling height.
pub fn floor_owners(room: &Room2D, relevant: &[RelevantRoof], tol: f64) -> Vec<Owner> {
    if let Some(first) = relevant.first()
        && first.relation == PolygonRelation::Inside
    {
        debug!(room = %room.identifier, roof = first.index, "Floor covered by a single roof face");
        return vec![Owner {
            regions: vec![room.floor().clone()],
            plane: first.plane,
        }];
    }

    let floor = std::slice::from_ref(room.floor());
    let mut covered: Vec<Region2D> = Vec::new();
    let mut owners = Vec::new();
    for roof in relevant {
        let under = intersection(floor, std::slice::from_ref(&roof.region), tol).regions;
        let own = if covered.is_empty() {
            under.clone()
        } else {
            difference(&under, &covered, tol).regions
        };
        covered = if covered.is_empty() {
            under
        } else {
            union(&covered, &under, tol).regions
        };
        if !own.is_empty() {
            owners.push(Owner {
                regions: own,
                plane: roof.plane,
            });
        }
    }

    let residual = difference(floor, &covered, tol);
    if residual.total_area() > area_tolerance(room.floor(), tol) {
        debug!(
            room = %room.identifier,
            area = residual.total_area(),
            "Floor partly uncovered, adding flat cap at ceiling height"
        );
        owners.push(Owner {
            regions: residual.regions,
            plane: Plane::horizontal(room.ceiling_height()),
        });
    }
    owners
}

/// Loose shell (floor, roof caps, walls) under `roof`.
pub fn build_shell(room: &Room2D, roof: &RoofSpecification, tol: f64) -> Result<Shell> {
    let relevant = relevant_roofs(room, roof, tol);
    if relevant.is_empty() {
        bail!("no roof face overlaps the floor");
    }
    let owners = floor_owners(room, &relevant, tol);
    let floor_z = room.floor_height();

    let mut caps = Vec::new();
    for owner in owners.iter() {
        for region in owner.regions.iter() {
            caps.push(lift_region(region, &owner.plane, floor_z, tol)?);
        }
    }
    let walls = wall_faces(room, &owners, tol)?;
    debug!(
        room = %room.identifier,
        roofs = relevant.len(),
        caps = caps.len(),
        walls = walls.len(),
        "Assembling roof shell"
    );
    Shell::assemble(room, caps, walls, tol)
}

fn lift_point(p: Point2D, plane: &Plane, floor_z: f64, tol: f64) -> Result<Point> {
    let z = plane
        .z_at(p.x, p.y)
        .ok_or_else(|| anyhow!("vertical roof plane at ({:.3}, {:.3})", p.x, p.y))?;
    if z <= floor_z + tol {
        bail!(
            "roof at ({:.3}, {:.3}) has elevation {:.3}, not above the floor at {:.3}",
            p.x,
            p.y,
            z,
            floor_z
        );
    }
    Ok(Point::new(p.x, p.y, z))
}

/// Lifts a plan region onto `plane`, facing up.
fn lift_region(region: &Region2D, plane: &Plane, floor_z: f64, tol: f64) -> Result<Face> {
    let lift = |ring: &Polygon2D| -> Result<Vec<Point>> {
        ring.vertices()
            .iter()
            .map(|p| lift_point(*p, plane, floor_z, tol))
            .collect()
    };
    let boundary = lift(&region.boundary)?;
    let holes = region.holes.iter().map(lift).collect::<Result<Vec<_>>>()?;
    let face = Face::new(boundary, holes).context("Degenerate roof cap")?;
    Ok(if face.vn.dz < 0. { face.flip() } else { face })
}

/// First owner whose plan area contains `pt`.
fn owner_at(owners: &[Owner], pt: Point2D, tol: f64) -> Result<usize> {
    owners
        .iter()
        .position(|o| o.regions.iter().any(|r| r.contains_point(pt, tol)))
        .ok_or_else(|| anyhow!("wall point ({:.3}, {:.3}) is under no roof", pt.x, pt.y))
}

/// Distances along `seg` where ownership may change.
fn breakpoints(seg: &LineSegment2D, edges: &[LineSegment2D], tol: f64) -> Vec<f64> {
    let len = seg.length();
    let mut ds = vec![0., round_to_tolerance(len, tol)];
    for edge in edges {
        if let Some(x) = seg.intersect(edge, tol) {
            ds.push(round_to_tolerance(seg.p1.distance(&x), tol).min(len));
        }
    }
    ds.sort_by(f64::total_cmp);
    ds.dedup_by(|a, b| (*a - *b).abs() <= tol);
    if let Some(last) = ds.last_mut() {
        *last = len;
    }
    ds
}

/// One wall face per floor segment, tagged with the segment index.
fn wall_faces(room: &Room2D, owners: &[Owner], tol: f64) -> Result<Vec<(Face, usize)>> {
    let floor_z = room.floor_height();
    let edges: Vec<LineSegment2D> = owners
        .iter()
        .flat_map(|o| o.regions.iter().flat_map(|r| r.segments()))
        .collect();
    let mut walls = Vec::with_capacity(room.segment_count());

    for (i, seg) in room.floor_segments().iter().enumerate() {
        let len = seg.length();
        let ds = breakpoints(seg, &edges, tol);
        if ds.len() < 2 {
            bail!("segment {i} is shorter than the tolerance");
        }
        let pts: Vec<Point2D> = ds
            .iter()
            .enumerate()
            .map(|(k, d)| match k {
                0 => seg.p1,
                k if k == ds.len() - 1 => seg.p2,
                _ => seg.point_at(d / len),
            })
            .collect();
        let owned = ds
            .windows(2)
            .map(|w| owner_at(owners, seg.point_at((w[0] + w[1]) / 2. / len), tol))
            .collect::<Result<Vec<usize>>>()?;

        let mut top: Vec<Point> = Vec::with_capacity(pts.len() + 2);
        for (k, p) in pts.iter().enumerate() {
            let left = owned[k.saturating_sub(1)];
            let right = owned[k.min(owned.len() - 1)];
            let interior = k > 0 && k < pts.len() - 1;
            if interior && left == right {
                continue;
            }
            let zl = lift_point(*p, &owners[left].plane, floor_z, tol)?;
            top.push(zl);
            if left != right {
                let zr = lift_point(*p, &owners[right].plane, floor_z, tol)?;
                if (zl.z - zr.z).abs() > tol {
                    top.push(zr);
                }
            }
        }

        let mut ring = vec![Point::from_2d(seg.p1, floor_z), Point::from_2d(seg.p2, floor_z)];
        ring.extend(top.into_iter().rev());
        let face = Face::from_ring(ring).with_context(|| format!("Degenerate wall at segment {i}"))?;
        walls.push((face, i));
    }
    Ok(walls)
}
