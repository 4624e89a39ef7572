//! Interior adjacency between rooms.
//!
//! Two segments are adjacent when their endpoints coincide within the
//! tolerance (in either direction). Adjacent segments get Surface boundary
//! conditions pointing at each other, and their windows are reconciled so
//! that both sides describe the same glazing.

use crate::config::GeometryConfig;
use crate::error::Room2dError;
use crate::geom::bboxes::are_rects_within_distance;
use crate::geom::point2d::Point2D;
use crate::geom::segment::LineSegment2D;
use crate::room::boundary::BoundaryCondition;
use crate::room::params::WindowParameter;
use crate::room::{Room2D, SegmentMap};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// One segment of one room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentRef {
    pub room: String,
    pub segment: usize,
}

impl SegmentRef {
    pub fn new(room: &str, segment: usize) -> Self {
        Self {
            room: room.to_string(),
            segment,
        }
    }
}

/// Two segments set adjacent to each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyPair {
    pub first: SegmentRef,
    pub second: SegmentRef,
}

/// Matched segments with the windows to put on each side.
struct Link {
    a: (usize, usize),
    b: (usize, usize),
    windows: (Option<WindowParameter>, Option<WindowParameter>),
}

/// Finds and sets all adjacencies between `rooms`.
///
/// Duplicate vertices are removed from every room first, re-targeting
/// Surface references into rooms whose segments were renumbered. Segments
/// that already carry a Surface condition are never rematched, so running
/// this twice gives the same result. With `resolve_conflicts` off, the first
/// window mismatch is reported and `rooms` are left unchanged.
pub fn solve_adjacency(
    rooms: &mut [Room2D],
    tol: f64,
    resolve_conflicts: bool,
) -> Result<Vec<AdjacencyPair>, Room2dError> {
    let mut work = rooms.to_vec();
    for i in 0..work.len() {
        let map = work[i].remove_duplicate_vertices(tol)?;
        if !is_identity(&map) {
            let id = work[i].identifier.clone();
            let count = retarget_surface_references(&mut work, &id, &map);
            debug!(room = %id, retargeted = count, "Removed duplicate vertices before matching");
        }
    }

    let mut taken: HashSet<(usize, usize)> = HashSet::new();
    let mut links = Vec::new();
    for i in 0..work.len() {
        for j in (i + 1)..work.len() {
            if !are_rects_within_distance(work[i].floor().bounds(), work[j].floor().bounds(), tol) {
                continue;
            }
            let segs_i = work[i].floor_segments();
            let segs_j = work[j].floor_segments();
            for (a, seg_a) in segs_i.iter().enumerate() {
                if taken.contains(&(i, a)) || work[i].segments()[a].boundary_condition.is_surface() {
                    continue;
                }
                let found = segs_j.iter().enumerate().position(|(b, seg_b)| {
                    !taken.contains(&(j, b))
                        && !work[j].segments()[b].boundary_condition.is_surface()
                        && seg_a.is_equivalent(seg_b, tol)
                });
                let Some(b) = found else { continue };
                let windows = reconcile_windows((&work[i], a), (&work[j], b), tol, resolve_conflicts)?;
                taken.insert((i, a));
                taken.insert((j, b));
                links.push(Link {
                    a: (i, a),
                    b: (j, b),
                    windows,
                });
            }
        }
    }

    let mut pairs = Vec::with_capacity(links.len());
    for link in links {
        let (first, second) = pair_mut(&mut work, link.a.0, link.b.0);
        pairs.push(link_segments(first, link.a.1, second, link.b.1, link.windows)?);
    }
    debug!(pairs = pairs.len(), rooms = work.len(), "Solved adjacency");
    rooms.clone_from_slice(&work);
    Ok(pairs)
}

/// [`solve_adjacency`] with the tolerance and conflict policy of `config`.
pub fn solve_adjacency_with(rooms: &mut [Room2D], config: &GeometryConfig) -> Result<Vec<AdjacencyPair>, Room2dError> {
    solve_adjacency(rooms, config.tolerance, config.resolve_window_conflicts)
}

/// Sets one explicit adjacency between segment `seg_a` of `room_a` and
/// segment `seg_b` of `room_b`.
pub fn set_adjacency(
    room_a: &mut Room2D,
    seg_a: usize,
    room_b: &mut Room2D,
    seg_b: usize,
    tol: f64,
    resolve_conflicts: bool,
) -> Result<AdjacencyPair, Room2dError> {
    let line_a = segment_of(room_a, seg_a)?;
    let line_b = segment_of(room_b, seg_b)?;
    if !line_a.is_equivalent(&line_b, tol) {
        return Err(Room2dError::InvalidWallAssignment {
            room: room_a.identifier.clone(),
            segment: seg_a,
            reason: format!("segment does not coincide with {}[{seg_b}]", room_b.identifier),
        });
    }
    let windows = reconcile_windows((room_a, seg_a), (room_b, seg_b), tol, resolve_conflicts)?;
    link_segments(room_a, seg_a, room_b, seg_b, windows)
}

/// Turns every Surface condition whose peer is missing or does not point
/// back into Outdoor. Returns the number of segments changed.
pub fn patch_missing_adjacencies(rooms: &mut [Room2D]) -> usize {
    let index: HashMap<&str, usize> = rooms
        .iter()
        .enumerate()
        .map(|(i, r)| (r.identifier.as_str(), i))
        .collect();
    let mut stale = Vec::new();
    for (i, room) in rooms.iter().enumerate() {
        for (s, props) in room.segments().iter().enumerate() {
            let Some((peer_room, peer_segment)) = props.boundary_condition.peer() else {
                continue;
            };
            let points_back = index
                .get(peer_room)
                .and_then(|&p| rooms[p].segments().get(peer_segment))
                .and_then(|peer| peer.boundary_condition.peer())
                .is_some_and(|(r, k)| r == room.identifier && k == s);
            if !points_back {
                stale.push((i, s));
            }
        }
    }

    for &(i, s) in stale.iter() {
        let room = &mut rooms[i];
        warn!(room = %room.identifier, segment = s, "Dangling Surface condition set to Outdoor");
        let mut props = room.segments()[s].clone();
        props.boundary_condition = BoundaryCondition::Outdoor;
        props.air_boundary = false;
        if let Err(e) = room.set_segment(s, props) {
            warn!("{e}");
        }
    }
    stale.len()
}

/// Splits segments at vertices of neighbouring rooms lying on them.
///
/// After this, walls that only partially overlap another room's wall are
/// cut into pieces that `solve_adjacency` can match. Returns the segment map
/// of every room, in input order.
pub fn intersect_adjacency(rooms: &mut [Room2D], tol: f64) -> Result<Vec<SegmentMap>, Room2dError> {
    let mut maps = Vec::with_capacity(rooms.len());
    for i in 0..rooms.len() {
        let bounds = rooms[i].floor().bounds();
        let pts: Vec<Point2D> = rooms
            .iter()
            .enumerate()
            .filter(|(j, other)| *j != i && are_rects_within_distance(bounds, other.floor().bounds(), tol))
            .flat_map(|(_, other)| ring_vertices(other))
            .collect();
        let map = rooms[i].split_segments_at(&pts, tol)?;
        if !is_identity(&map) {
            let id = rooms[i].identifier.clone();
            retarget_surface_references(rooms, &id, &map);
            debug!(room = %id, segments = rooms[i].segment_count(), "Split segments at neighbour vertices");
        }
        maps.push(map);
    }
    Ok(maps)
}

/// Vertices lying closer than `gap_distance` (but farther than `tol`) to
/// another room's boundary.
pub fn find_adjacency_gaps(rooms: &[Room2D], gap_distance: f64, tol: f64) -> Vec<Point2D> {
    let mut gaps: Vec<Point2D> = Vec::new();
    for (i, room) in rooms.iter().enumerate() {
        let bounds = room.floor().bounds();
        for (j, other) in rooms.iter().enumerate() {
            if i == j || !are_rects_within_distance(bounds, other.floor().bounds(), gap_distance) {
                continue;
            }
            let segs = other.floor_segments();
            for pt in ring_vertices(room) {
                let d = segs
                    .iter()
                    .map(|s| s.distance_to_point(pt))
                    .fold(f64::INFINITY, f64::min);
                if d > tol && d < gap_distance && !gaps.iter().any(|g| g.is_close_tol(&pt, tol)) {
                    gaps.push(pt);
                }
            }
        }
    }
    gaps
}

/// Rewrites Surface references into `room_id` through `map`.
///
/// References to segments that no longer exist become Outdoor. Returns the
/// number of segments changed.
pub fn retarget_surface_references(rooms: &mut [Room2D], room_id: &str, map: &SegmentMap) -> usize {
    let mut changed = 0;
    for room in rooms.iter_mut() {
        for s in 0..room.segment_count() {
            let Some((peer, old)) = room.segments()[s].boundary_condition.peer() else {
                continue;
            };
            if peer != room_id {
                continue;
            }
            let target = map.get(old).copied().flatten();
            if target == Some(old) {
                continue;
            }
            let mut props = room.segments()[s].clone();
            match target {
                Some(new) => props.boundary_condition = BoundaryCondition::surface(room_id, new),
                None => {
                    props.boundary_condition = BoundaryCondition::Outdoor;
                    props.air_boundary = false;
                }
            }
            if let Err(e) = room.set_segment(s, props) {
                warn!("{e}");
                continue;
            }
            changed += 1;
        }
    }
    changed
}

fn is_identity(map: &SegmentMap) -> bool {
    map.iter().enumerate().all(|(k, m)| *m == Some(k))
}

fn ring_vertices(room: &Room2D) -> Vec<Point2D> {
    room.floor()
        .rings()
        .iter()
        .flat_map(|r| r.vertices().iter().copied())
        .collect()
}

fn segment_of(room: &Room2D, i: usize) -> Result<LineSegment2D, Room2dError> {
    room.segment(i)?;
    Ok(room.floor_segments()[i])
}

/// Mutable references to two different rooms of a slice.
fn pair_mut(rooms: &mut [Room2D], i: usize, j: usize) -> (&mut Room2D, &mut Room2D) {
    debug_assert!(i < j);
    let (left, right) = rooms.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

/// Windows both sides should carry once linked.
///
/// Equal windows (after flipping for the opposite walking direction) are
/// kept. Otherwise the larger window wins, both areas measured at the lower
/// of the two floor-to-ceiling heights; ties go to `a`.
fn reconcile_windows(
    (room_a, seg_a): (&Room2D, usize),
    (room_b, seg_b): (&Room2D, usize),
    tol: f64,
    resolve_conflicts: bool,
) -> Result<(Option<WindowParameter>, Option<WindowParameter>), Room2dError> {
    let line_a = segment_of(room_a, seg_a)?;
    let line_b = segment_of(room_b, seg_b)?;
    let same_direction = line_a.p1.is_close_tol(&line_b.p1, tol);
    let len = line_a.length();
    let transfer = |w: &WindowParameter| if same_direction { w.clone() } else { w.flip(len) };

    let wa = room_a.window_parameter(seg_a)?;
    let wb = room_b.window_parameter(seg_b)?;
    let equivalent = match (wa, wb) {
        (None, None) => true,
        (Some(x), Some(y)) => x.is_equivalent(&transfer(y), tol),
        _ => false,
    };
    if equivalent {
        return Ok((wa.cloned(), wb.cloned()));
    }
    if !resolve_conflicts {
        return Err(Room2dError::AdjacencyConflict {
            room_a: room_a.identifier.clone(),
            segment_a: seg_a,
            room_b: room_b.identifier.clone(),
            segment_b: seg_b,
        });
    }

    let height = room_a.floor_to_ceiling_height().min(room_b.floor_to_ceiling_height());
    let area = |w: Option<&WindowParameter>| w.map_or(0., |w| w.area_from_segment(len, height));
    let (area_a, area_b) = (area(wa), area(wb));
    debug!(
        room_a = %room_a.identifier,
        room_b = %room_b.identifier,
        area_a,
        area_b,
        "Resolving window conflict"
    );
    if area_a >= area_b {
        Ok((wa.cloned(), wa.map(transfer)))
    } else {
        Ok((wb.map(transfer), wb.cloned()))
    }
}

fn link_segments(
    room_a: &mut Room2D,
    seg_a: usize,
    room_b: &mut Room2D,
    seg_b: usize,
    (window_a, window_b): (Option<WindowParameter>, Option<WindowParameter>),
) -> Result<AdjacencyPair, Room2dError> {
    let mut props_a = room_a.segment(seg_a)?.clone();
    props_a.boundary_condition = BoundaryCondition::surface(&room_b.identifier, seg_b);
    props_a.window_parameter = window_a;
    let mut props_b = room_b.segment(seg_b)?.clone();
    props_b.boundary_condition = BoundaryCondition::surface(&room_a.identifier, seg_a);
    props_b.window_parameter = window_b;
    room_a.check_segment(seg_a, &props_a)?;
    room_b.check_segment(seg_b, &props_b)?;
    room_a.set_segment(seg_a, props_a)?;
    room_b.set_segment(seg_b, props_b)?;
    Ok(AdjacencyPair {
        first: SegmentRef::new(&room_a.identifier, seg_a),
        second: SegmentRef::new(&room_b.identifier, seg_b),
    })
}
