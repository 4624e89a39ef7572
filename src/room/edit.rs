//! Geometry editing that changes the number of segments.
//!
//! Each operation rebuilds the rings and redistributes the segment records,
//! then returns a `SegmentMap` so callers can re-target Surface references
//! held by other rooms.

use crate::error::Room2dError;
use crate::geom::point2d::Point2D;
use crate::geom::polygon2d::boolean::{difference, intersection};
use crate::geom::polygon2d::{Polygon2D, Region2D};
use crate::random_id;
use crate::room::boundary::BoundaryCondition;
use crate::room::segment::SegmentProps;
use crate::room::{Room2D, SegmentMap, check_ring};
use crate::vecutils::argmax;
use tracing::debug;

/// One rebuilt ring: vertices, segment records and the map of its old segments.
struct RingEdit {
    ring: Polygon2D,
    props: Vec<SegmentProps>,
    /// Old local segment index -> new local index.
    map: Vec<Option<usize>>,
}

impl Room2D {
    /// Removes vertices closer than `tol` to their predecessor.
    ///
    /// A merged segment keeps the record of the longest original segment it
    /// spans. Hole rings that collapse are dropped.
    pub fn remove_duplicate_vertices(&mut self, tol: f64) -> Result<SegmentMap, Room2dError> {
        self.edit_rings(tol, |room, ring, props, is_hole| {
            let (clean, kept) = match ring.remove_duplicate_vertices(tol) {
                Ok(r) => r,
                Err(e) if is_hole => {
                    debug!("Dropping collapsed hole of room {}: {e}", room.identifier);
                    return Ok(None);
                }
                Err(e) => return Err(room.degenerate(e.to_string())),
            };
            let lengths: Vec<f64> = ring.segments().iter().map(|s| s.length()).collect();
            let mut map = vec![None; ring.len()];
            let mut new_props = Vec::with_capacity(kept.len());
            for (j, spanned) in spans(&kept, ring.len()).into_iter().enumerate() {
                let span_lengths: Vec<f64> = spanned.iter().map(|&k| lengths[k]).collect();
                let best = spanned[argmax(&span_lengths).unwrap_or(0)];
                map[best] = Some(j);
                new_props.push(props[best].clone());
            }
            Ok(Some(RingEdit {
                ring: clean,
                props: new_props,
                map,
            }))
        })
    }

    /// Removes vertices lying on the line through their neighbours.
    ///
    /// Records of merged colinear segments are folded pairwise from left to
    /// right. A segment that absorbs only zero-length pieces keeps its record
    /// (and its Surface condition) unchanged.
    pub fn remove_colinear_vertices(&mut self, tol: f64) -> Result<SegmentMap, Room2dError> {
        let height = self.floor_to_ceiling_height();
        self.edit_rings(tol, |room, ring, props, is_hole| {
            let (clean, kept) = match ring.remove_colinear_vertices(tol) {
                Ok(r) => r,
                Err(e) if is_hole => {
                    debug!("Dropping collapsed hole of room {}: {e}", room.identifier);
                    return Ok(None);
                }
                Err(e) => return Err(room.degenerate(e.to_string())),
            };
            let lengths: Vec<f64> = ring.segments().iter().map(|s| s.length()).collect();
            let mut map = vec![None; ring.len()];
            let mut new_props = Vec::with_capacity(kept.len());
            for (j, spanned) in spans(&kept, ring.len()).into_iter().enumerate() {
                let real: Vec<usize> = spanned.iter().copied().filter(|&k| lengths[k] > tol).collect();
                match real.as_slice() {
                    [] => {
                        new_props.push(props[spanned[0]].clone());
                        map[spanned[0]] = Some(j);
                    }
                    [single] => {
                        new_props.push(props[*single].clone());
                        map[*single] = Some(j);
                    }
                    [first, rest @ ..] => {
                        let mut acc = props[*first].clone();
                        let mut acc_len = lengths[*first];
                        for &k in rest {
                            acc = SegmentProps::merge(&[(&acc, acc_len), (&props[k], lengths[k])], height);
                            acc_len += lengths[k];
                        }
                        new_props.push(acc);
                    }
                }
            }
            Ok(Some(RingEdit {
                ring: clean,
                props: new_props,
                map,
            }))
        })
    }

    /// Snaps all vertices to a grid, then removes the duplicates it creates.
    ///
    /// The room is left untouched if snapping makes the floor invalid.
    pub fn snap_to_grid(&mut self, increment: f64, tol: f64) -> Result<SegmentMap, Room2dError> {
        let mut snapped = self.clone();
        let floor = self.floor().map_points(|p| p.snap_to_grid(increment));
        let segments = self.segments().to_vec();
        snapped.replace_geometry(floor, segments);
        let map = snapped.remove_duplicate_vertices(tol)?;
        for ring in snapped.floor().rings() {
            check_ring(ring, &snapped.identifier, tol)?;
        }
        *self = snapped;
        Ok(map)
    }

    /// Inserts vertices at the given points where they lie on a segment.
    ///
    /// Records of split segments are trimmed to each piece in proportion to
    /// its length along the original segment.
    pub fn split_segments_at(&mut self, pts: &[Point2D], tol: f64) -> Result<SegmentMap, Room2dError> {
        let height = self.floor_to_ceiling_height();
        self.edit_rings(tol, |_, ring, props, _| {
            let mut new_pts = Vec::new();
            let mut new_props = Vec::new();
            let mut map = vec![None; ring.len()];
            for (k, seg) in ring.segments().iter().enumerate() {
                let len = seg.length();
                let mut params: Vec<f64> = pts
                    .iter()
                    .filter(|p| seg.distance_to_point(**p) <= tol)
                    .filter(|p| !p.is_close_tol(&seg.p1, tol) && !p.is_close_tol(&seg.p2, tol))
                    .map(|p| seg.parameter_of(*p))
                    .collect();
                params.sort_by(f64::total_cmp);
                params.dedup_by(|a, b| (*a - *b) * len <= tol);

                new_pts.push(seg.p1);
                if params.is_empty() {
                    map[k] = Some(new_props.len());
                    new_props.push(props[k].clone());
                    continue;
                }
                let mut cuts = vec![0.];
                for t in params.iter() {
                    new_pts.push(seg.point_at(*t));
                    cuts.push(t * len);
                }
                cuts.push(len);
                for w in cuts.windows(2) {
                    new_props.push(props[k].trimmed(len, w[0], w[1], height));
                }
            }
            let ring = Polygon2D::new(new_pts).map_err(|e| Room2dError::InvalidGeometry(e.to_string()))?;
            Ok(Some(RingEdit {
                ring,
                props: new_props,
                map,
            }))
        })
    }

    /// Splits the room into the parts inside and outside `cutter`.
    ///
    /// Derived rooms get fresh identifiers. Walls on the original boundary
    /// keep their records (trimmed to the overlap); new walls along the cut
    /// are Outdoor until adjacency is solved again.
    pub fn split_by_region(&self, cutter: &Region2D, tol: f64) -> Result<Vec<Room2D>, Room2dError> {
        let floor = std::slice::from_ref(self.floor());
        let cutters = std::slice::from_ref(cutter);
        let mut pieces = intersection(floor, cutters, tol).regions;
        pieces.extend(difference(floor, cutters, tol).regions);
        if pieces.len() <= 1 {
            return Ok(vec![self.clone()]);
        }

        let height = self.floor_to_ceiling_height();
        let old_segments = self.floor_segments();
        let mut rooms = Vec::with_capacity(pieces.len());
        for piece in pieces {
            let mut segments = Vec::with_capacity(piece.segment_count());
            for seg in piece.segments() {
                let len = seg.length();
                let mut props = SegmentProps::new(BoundaryCondition::Outdoor);
                for (k, old) in old_segments.iter().enumerate() {
                    if let Some((t0, t1)) = old.colinear_overlap(&seg, tol) {
                        if (t1 - t0) * old.length() >= len - tol {
                            props = self.segments()[k].trimmed(old.length(), t0 * old.length(), t1 * old.length(), height);
                            if old.parameter_of(seg.p1) > old.parameter_of(seg.p2) {
                                props = props.flipped(len);
                            }
                            break;
                        }
                    }
                }
                segments.push(props);
            }
            let mut room = self.clone();
            room.identifier = format!("{}_{}", self.identifier, &random_id()[..8]);
            room.display_name = format!("{} part", self.display_name);
            room.replace_geometry(piece, segments);
            for i in 0..room.segment_count() {
                room.check_segment(i, &room.segments()[i])?;
            }
            rooms.push(room);
        }
        Ok(rooms)
    }

    /// Applies `edit` to every ring and reassembles the room.
    fn edit_rings<F>(&mut self, tol: f64, mut edit: F) -> Result<SegmentMap, Room2dError>
    where
        F: FnMut(&Room2D, &Polygon2D, &[SegmentProps], bool) -> Result<Option<RingEdit>, Room2dError>,
    {
        let mut map: SegmentMap = vec![None; self.segment_count()];
        let mut offset_old = 0;
        let mut boundary: Option<Polygon2D> = None;
        let mut holes = Vec::new();
        let mut segments = Vec::with_capacity(self.segment_count());

        let rings: Vec<Polygon2D> = self.floor().rings().into_iter().cloned().collect();
        for (r, ring) in rings.iter().enumerate() {
            let n = ring.len();
            let props = &self.segments()[offset_old..offset_old + n];
            let is_hole = r > 0;
            if let Some(result) = edit(self, ring, props, is_hole)? {
                let offset_new = segments.len();
                for (k, m) in result.map.iter().enumerate() {
                    map[offset_old + k] = m.map(|j| offset_new + j);
                }
                segments.extend(result.props);
                if is_hole {
                    holes.push(result.ring);
                } else {
                    boundary = Some(result.ring);
                }
            }
            offset_old += n;
        }

        let Some(boundary) = boundary else {
            return Err(self.degenerate("floor boundary collapsed".to_string()));
        };
        let floor = Region2D { boundary, holes };
        if floor.area() <= tol * tol {
            return Err(self.degenerate(format!("floor area {} is below tolerance", floor.area())));
        }
        self.replace_geometry(floor, segments);
        Ok(map)
    }
}

/// Old segments spanned by each new segment, given the kept vertex indices.
///
/// New segment `j` runs from `kept[j]` to `kept[j + 1]` (wrapping) and covers
/// the old segments in between.
fn spans(kept: &[usize], n: usize) -> Vec<Vec<usize>> {
    let m = kept.len();
    (0..m)
        .map(|j| {
            let start = kept[j];
            let end = if j + 1 < m { kept[j + 1] } else { kept[0] + n };
            (start..end).map(|k| k % n).collect()
        })
        .collect()
}
