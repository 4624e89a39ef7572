//! Rooms as vertically extruded floor plans.
//!
//! A `Room2D` is a floor region (outer ring plus holes) at `floor_height`,
//! extruded by `floor_to_ceiling_height`. Every ring edge is a wall segment;
//! segments are numbered over the outer ring first and then over each hole
//! ring, and each one carries a `SegmentProps` record.
//!
//! Rings are kept in normal form (outer counter-clockwise, holes clockwise).
//! Whenever an operation reverses a ring, the segment records are reversed
//! with it and asymmetric windows are flipped.

use crate::config::GeometryConfig;
use crate::error::Room2dError;
use crate::geom::face::Face;
use crate::geom::point::Point;
use crate::geom::point2d::Point2D;
use crate::geom::polygon2d::boolean::overlap_area;
use crate::geom::polygon2d::relations::{PolygonRelation, area_tolerance, polygon_relationship};
use crate::geom::polygon2d::{Polygon2D, Region2D};
use crate::geom::polyhedron::Polyhedron;
use crate::geom::rotation::rotation_matrix;
use crate::geom::segment::LineSegment2D;
use crate::geom::vector::Vector;
use crate::random_id;
use crate::roof::{RoofSpecification, RoofVolume, build_roof_volume};
use tracing::{debug, warn};

pub mod boundary;
pub mod edit;
pub mod params;
pub mod record;
pub mod segment;

use boundary::BoundaryCondition;
use params::{ShadingParameter, SkylightParameter, WindowParameter};
use segment::SegmentProps;

/// Old segment index -> new segment index (`None` when the segment is gone).
pub type SegmentMap = Vec<Option<usize>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Room2D {
    pub identifier: String,
    pub display_name: String,
    floor: Region2D,
    floor_height: f64,
    floor_to_ceiling_height: f64,
    segments: Vec<SegmentProps>,
    pub is_ground_contact: bool,
    pub is_top_exposed: bool,
    pub has_floor: bool,
    pub has_ceiling: bool,
    ceiling_plenum_depth: f64,
    floor_plenum_depth: f64,
    pub skylight_parameter: Option<SkylightParameter>,
    pub zone: Option<String>,
}

/// Everything needed to construct a room.
///
/// Per-segment lists are optional; when given they must have one entry per
/// segment of the rings as passed in (before any re-orientation).
#[derive(Debug, Clone)]
pub struct RoomPlan {
    pub identifier: Option<String>,
    pub display_name: Option<String>,
    pub boundary: Vec<(f64, f64)>,
    pub holes: Vec<Vec<(f64, f64)>>,
    pub floor_height: f64,
    pub floor_to_ceiling_height: f64,
    pub boundary_conditions: Option<Vec<BoundaryCondition>>,
    pub window_parameters: Option<Vec<Option<WindowParameter>>>,
    pub shading_parameters: Option<Vec<Option<ShadingParameter>>>,
    pub air_boundaries: Option<Vec<bool>>,
    pub is_ground_contact: bool,
    pub is_top_exposed: bool,
    pub has_floor: bool,
    pub has_ceiling: bool,
    pub ceiling_plenum_depth: f64,
    pub floor_plenum_depth: f64,
    pub skylight_parameter: Option<SkylightParameter>,
    pub zone: Option<String>,
}

impl Default for RoomPlan {
    fn default() -> Self {
        let boundary = vec![(0., 0.), (1., 0.), (1., 1.), (0., 1.)];
        let floor_to_ceiling_height = 3.;

        Self {
            identifier: None,
            display_name: None,
            boundary,
            holes: Vec::new(),
            floor_height: 0.,
            floor_to_ceiling_height,
            boundary_conditions: None,
            window_parameters: None,
            shading_parameters: None,
            air_boundaries: None,
            is_ground_contact: false,
            is_top_exposed: false,
            has_floor: true,
            has_ceiling: true,
            ceiling_plenum_depth: 0.,
            floor_plenum_depth: 0.,
            skylight_parameter: None,
            zone: None,
        }
    }
}

/// Final volume of a room and how its faces map back to the plan.
#[derive(Debug, Clone)]
pub struct RoomVolume {
    pub shell: RoofVolume,
    /// The shell is a plain extrusion (no roof, or the roof build failed).
    pub is_extrusion: bool,
}

impl Room2D {
    /// Builds a room from a plan, validating geometry and wall assignments.
    pub fn from_plan(plan: RoomPlan, config: &GeometryConfig) -> Result<Self, Room2dError> {
        let tol = config.tolerance;
        let identifier = plan.identifier.unwrap_or_else(random_id);
        let display_name = plan.display_name.unwrap_or_else(|| identifier.clone());
        let invalid = |msg: String| Room2dError::InvalidGeometry(format!("room {identifier}: {msg}"));

        if plan.floor_to_ceiling_height <= 0. {
            return Err(invalid(format!(
                "floor-to-ceiling height must be positive, got {}",
                plan.floor_to_ceiling_height
            )));
        }

        let to_ring = |coords: &[(f64, f64)]| -> Result<Polygon2D, Room2dError> {
            Polygon2D::new(coords.iter().map(|c| Point2D::from(*c)).collect()).map_err(|e| invalid(e.to_string()))
        };
        let boundary = to_ring(&plan.boundary)?;
        let holes: Vec<Polygon2D> = plan.holes.iter().map(|h| to_ring(h)).collect::<Result<_, _>>()?;

        for ring in std::iter::once(&boundary).chain(holes.iter()) {
            check_ring(ring, &identifier, tol)?;
        }
        check_holes(&boundary, &holes, &identifier, tol)?;

        let count: usize = boundary.len() + holes.iter().map(|h| h.len()).sum::<usize>();
        let default_bc = if plan.floor_height < config.ground_level - tol {
            BoundaryCondition::Ground
        } else {
            BoundaryCondition::Outdoor
        };
        let bcs = plan
            .boundary_conditions
            .unwrap_or_else(|| vec![default_bc; count]);
        let windows = plan.window_parameters.unwrap_or_else(|| vec![None; count]);
        let shades = plan.shading_parameters.unwrap_or_else(|| vec![None; count]);
        let air = plan.air_boundaries.unwrap_or_else(|| vec![false; count]);
        for (name, len) in [
            ("boundary_conditions", bcs.len()),
            ("window_parameters", windows.len()),
            ("shading_parameters", shades.len()),
            ("air_boundaries", air.len()),
        ] {
            if len != count {
                return Err(invalid(format!("{name} has {len} entries for {count} segments")));
            }
        }

        let mut segments: Vec<SegmentProps> = bcs
            .into_iter()
            .zip(windows)
            .zip(shades)
            .zip(air)
            .map(|(((bc, w), s), a)| SegmentProps {
                boundary_condition: bc,
                window_parameter: w,
                shading_parameter: s,
                air_boundary: a,
            })
            .collect();

        let (floor, _) = normalize_rings(boundary, holes, &mut segments);

        let room = Self {
            identifier,
            display_name,
            floor,
            floor_height: plan.floor_height,
            floor_to_ceiling_height: plan.floor_to_ceiling_height,
            segments,
            is_ground_contact: plan.is_ground_contact,
            is_top_exposed: plan.is_top_exposed,
            has_floor: plan.has_floor,
            has_ceiling: plan.has_ceiling,
            ceiling_plenum_depth: plan.ceiling_plenum_depth,
            floor_plenum_depth: plan.floor_plenum_depth,
            skylight_parameter: plan.skylight_parameter,
            zone: plan.zone,
        };
        room.check_plenums(room.floor_to_ceiling_height, room.ceiling_plenum_depth, room.floor_plenum_depth)?;
        for i in 0..room.segments.len() {
            room.check_segment(i, &room.segments[i])?;
        }
        Ok(room)
    }

    /// Room with default segment properties from existing plan polygons.
    ///
    /// Wall assignments, windows, shades and the exposure flags take their
    /// defaults; use [`Room2D::from_plan`] to set them at construction.
    pub fn from_polygon(
        identifier: &str,
        boundary: Polygon2D,
        holes: Vec<Polygon2D>,
        floor_height: f64,
        floor_to_ceiling_height: f64,
        tolerance: f64,
    ) -> Result<Self, Room2dError> {
        let coords = |p: &Polygon2D| p.vertices().iter().map(|v| (v.x, v.y)).collect::<Vec<_>>();
        let plan = RoomPlan {
            identifier: Some(identifier.to_string()),
            boundary: coords(&boundary),
            holes: holes.iter().map(coords).collect(),
            floor_height,
            floor_to_ceiling_height,
            ..RoomPlan::default()
        };
        Self::from_plan(plan, &GeometryConfig::new(tolerance))
    }

    /// Room from a horizontal ring of 3D points.
    pub fn from_vertices_3d(
        identifier: &str,
        pts: &[Point],
        floor_to_ceiling_height: f64,
        tolerance: f64,
    ) -> Result<Self, Room2dError> {
        let Some(first) = pts.first() else {
            return Err(Room2dError::InvalidGeometry(format!("room {identifier}: no vertices")));
        };
        if pts.iter().any(|p| (p.z - first.z).abs() > tolerance) {
            return Err(Room2dError::InvalidGeometry(format!(
                "room {identifier}: floor vertices are not horizontal"
            )));
        }
        let plan = RoomPlan {
            identifier: Some(identifier.to_string()),
            boundary: pts.iter().map(|p| (p.x, p.y)).collect(),
            floor_height: first.z,
            floor_to_ceiling_height,
            ..RoomPlan::default()
        };
        Self::from_plan(plan, &GeometryConfig::new(tolerance))
    }

    /// Room over a horizontal 3D face (holes included).
    ///
    /// The face may point up or down; it must be horizontal within the
    /// configured angle tolerance.
    pub fn from_face(
        identifier: &str,
        face: &Face,
        floor_to_ceiling_height: f64,
        config: &GeometryConfig,
    ) -> Result<Self, Room2dError> {
        if !face.is_horizontal(config.angle_tolerance) {
            return Err(Room2dError::InvalidGeometry(format!(
                "room {identifier}: floor face is not horizontal"
            )));
        }
        let coords = |ring: &[Point]| ring.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>();
        let plan = RoomPlan {
            identifier: Some(identifier.to_string()),
            boundary: coords(&face.boundary),
            holes: face.holes.iter().map(|h| coords(h)).collect(),
            floor_height: face.boundary.iter().map(|p| p.z).fold(f64::INFINITY, f64::min),
            floor_to_ceiling_height,
            ..RoomPlan::default()
        };
        Self::from_plan(plan, config)
    }

    // Geometry accessors

    pub fn floor(&self) -> &Region2D {
        &self.floor
    }

    pub fn floor_boundary(&self) -> &Polygon2D {
        &self.floor.boundary
    }

    pub fn floor_holes(&self) -> &[Polygon2D] {
        &self.floor.holes
    }

    pub fn floor_height(&self) -> f64 {
        self.floor_height
    }

    pub fn set_floor_height(&mut self, floor_height: f64) {
        self.floor_height = floor_height;
    }

    pub fn floor_to_ceiling_height(&self) -> f64 {
        self.floor_to_ceiling_height
    }

    pub fn set_floor_to_ceiling_height(&mut self, height: f64) -> Result<(), Room2dError> {
        if height <= 0. {
            return Err(Room2dError::InvalidGeometry(format!(
                "room {}: floor-to-ceiling height must be positive, got {height}",
                self.identifier
            )));
        }
        self.check_plenums(height, self.ceiling_plenum_depth, self.floor_plenum_depth)?;
        self.floor_to_ceiling_height = height;
        Ok(())
    }

    pub fn ceiling_height(&self) -> f64 {
        self.floor_height + self.floor_to_ceiling_height
    }

    pub fn ceiling_plenum_depth(&self) -> f64 {
        self.ceiling_plenum_depth
    }

    pub fn floor_plenum_depth(&self) -> f64 {
        self.floor_plenum_depth
    }

    pub fn set_plenum_depths(&mut self, ceiling: f64, floor: f64) -> Result<(), Room2dError> {
        self.check_plenums(self.floor_to_ceiling_height, ceiling, floor)?;
        self.ceiling_plenum_depth = ceiling;
        self.floor_plenum_depth = floor;
        Ok(())
    }

    // Segment access

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[SegmentProps] {
        &self.segments
    }

    pub fn segment(&self, i: usize) -> Result<&SegmentProps, Room2dError> {
        self.segments.get(i).ok_or_else(|| self.out_of_range(i))
    }

    pub fn boundary_condition(&self, i: usize) -> Result<&BoundaryCondition, Room2dError> {
        Ok(&self.segment(i)?.boundary_condition)
    }

    pub fn window_parameter(&self, i: usize) -> Result<Option<&WindowParameter>, Room2dError> {
        Ok(self.segment(i)?.window_parameter.as_ref())
    }

    pub fn shading_parameter(&self, i: usize) -> Result<Option<&ShadingParameter>, Room2dError> {
        Ok(self.segment(i)?.shading_parameter.as_ref())
    }

    pub fn air_boundary(&self, i: usize) -> Result<bool, Room2dError> {
        Ok(self.segment(i)?.air_boundary)
    }

    /// Replaces all properties of segment `i` after validating them.
    pub fn set_segment(&mut self, i: usize, props: SegmentProps) -> Result<(), Room2dError> {
        if i >= self.segments.len() {
            return Err(self.out_of_range(i));
        }
        self.check_segment(i, &props)?;
        self.segments[i] = props;
        Ok(())
    }

    /// Sets the boundary condition; a window left on an incompatible wall is an error.
    pub fn set_boundary_condition(&mut self, i: usize, bc: BoundaryCondition) -> Result<(), Room2dError> {
        let mut props = self.segment(i)?.clone();
        props.boundary_condition = bc;
        self.set_segment(i, props)
    }

    pub fn set_window_parameter(&mut self, i: usize, window: Option<WindowParameter>) -> Result<(), Room2dError> {
        let mut props = self.segment(i)?.clone();
        props.window_parameter = window;
        self.set_segment(i, props)
    }

    pub fn set_shading_parameter(&mut self, i: usize, shade: Option<ShadingParameter>) -> Result<(), Room2dError> {
        let mut props = self.segment(i)?.clone();
        props.shading_parameter = shade;
        self.set_segment(i, props)
    }

    pub fn set_air_boundary(&mut self, i: usize, air_boundary: bool) -> Result<(), Room2dError> {
        let mut props = self.segment(i)?.clone();
        props.air_boundary = air_boundary;
        self.set_segment(i, props)
    }

    /// Replaces all boundary conditions at once (all-or-nothing).
    pub fn set_boundary_conditions(&mut self, bcs: Vec<BoundaryCondition>) -> Result<(), Room2dError> {
        self.check_len("boundary_conditions", bcs.len())?;
        let mut segments = self.segments.clone();
        for (props, bc) in segments.iter_mut().zip(bcs) {
            props.boundary_condition = bc;
        }
        self.replace_segments(segments)
    }

    /// Replaces all window parameters at once (all-or-nothing).
    pub fn set_window_parameters(&mut self, windows: Vec<Option<WindowParameter>>) -> Result<(), Room2dError> {
        self.check_len("window_parameters", windows.len())?;
        let mut segments = self.segments.clone();
        for (props, w) in segments.iter_mut().zip(windows) {
            props.window_parameter = w;
        }
        self.replace_segments(segments)
    }

    /// Assigns `window` to every Outdoor segment.
    pub fn set_outdoor_window_parameters(&mut self, window: Option<WindowParameter>) {
        for props in self.segments.iter_mut() {
            if props.boundary_condition == BoundaryCondition::Outdoor {
                props.window_parameter = window.clone();
            }
        }
    }

    /// Assigns `shade` to every Outdoor segment.
    pub fn set_outdoor_shading_parameters(&mut self, shade: Option<ShadingParameter>) {
        for props in self.segments.iter_mut() {
            if props.boundary_condition == BoundaryCondition::Outdoor {
                props.shading_parameter = shade.clone();
            }
        }
    }

    pub fn boundary_conditions(&self) -> Vec<BoundaryCondition> {
        self.segments.iter().map(|s| s.boundary_condition.clone()).collect()
    }

    pub fn window_parameters(&self) -> Vec<Option<WindowParameter>> {
        self.segments.iter().map(|s| s.window_parameter.clone()).collect()
    }

    pub fn shading_parameters(&self) -> Vec<Option<ShadingParameter>> {
        self.segments.iter().map(|s| s.shading_parameter.clone()).collect()
    }

    pub fn air_boundaries(&self) -> Vec<bool> {
        self.segments.iter().map(|s| s.air_boundary).collect()
    }

    // Derived values

    pub fn floor_segments(&self) -> Vec<LineSegment2D> {
        self.floor.segments()
    }

    /// Wall bottom edges at floor height.
    pub fn floor_segments_3d(&self) -> Vec<(Point, Point)> {
        self.floor
            .segments()
            .iter()
            .map(|s| (Point::from_2d(s.p1, self.floor_height), Point::from_2d(s.p2, self.floor_height)))
            .collect()
    }

    pub fn segment_lengths(&self) -> Vec<f64> {
        self.floor.segments().iter().map(|s| s.length()).collect()
    }

    pub fn perimeter(&self) -> f64 {
        self.floor.perimeter()
    }

    pub fn floor_area(&self) -> f64 {
        self.floor.area()
    }

    pub fn volume(&self) -> f64 {
        self.floor_area() * self.floor_to_ceiling_height
    }

    /// Area of walls facing the outdoors.
    pub fn exterior_wall_area(&self) -> f64 {
        self.segment_lengths()
            .iter()
            .zip(self.segments.iter())
            .filter(|(_, p)| p.boundary_condition == BoundaryCondition::Outdoor)
            .map(|(len, _)| len * self.floor_to_ceiling_height)
            .sum()
    }

    /// Glazed area of walls facing the outdoors.
    pub fn exterior_aperture_area(&self) -> f64 {
        self.segment_lengths()
            .iter()
            .zip(self.segments.iter())
            .filter(|(_, p)| p.boundary_condition == BoundaryCondition::Outdoor)
            .filter_map(|(len, p)| {
                p.window_parameter
                    .as_ref()
                    .map(|w| w.area_from_segment(*len, self.floor_to_ceiling_height))
            })
            .sum()
    }

    pub fn skylight_area(&self) -> f64 {
        match (&self.skylight_parameter, self.is_top_exposed) {
            (Some(sky), true) => sky.area(self.floor_area()),
            _ => 0.,
        }
    }

    /// Center of the bounding rectangle at floor height.
    pub fn center(&self) -> Point {
        let (min, max) = self.floor.bounds();
        Point::new((min.x + max.x) / 2., (min.y + max.y) / 2., self.floor_height)
    }

    pub fn min(&self) -> Point {
        Point::from_2d(self.floor.bounds().0, self.floor_height)
    }

    pub fn max(&self) -> Point {
        Point::from_2d(self.floor.bounds().1, self.ceiling_height())
    }

    // Transformations

    pub fn move_by(&mut self, v: Vector) {
        let shift = Point2D::new(v.dx, v.dy);
        self.floor = self.floor.map_points(|p| p + shift);
        self.floor_height += v.dz;
        self.skylight_parameter = self.skylight_parameter.as_ref().map(|s| s.transform(|p| p + shift, 1.));
    }

    /// Rotates the plan counter-clockwise by `angle_deg` around `origin`.
    pub fn rotate_xy(&mut self, angle_deg: f64, origin: Point2D) -> Result<(), Room2dError> {
        let rot = rotation_matrix(&Vector::new(0., 0., 1.), angle_deg.to_radians())
            .map_err(|e| Room2dError::InvalidGeometry(e.to_string()))?;
        let f = |p: Point2D| {
            let d = p - origin;
            Point2D::new(
                origin.x + rot[[0, 0]] * d.x + rot[[0, 1]] * d.y,
                origin.y + rot[[1, 0]] * d.x + rot[[1, 1]] * d.y,
            )
        };
        self.floor = self.floor.map_points(f);
        self.skylight_parameter = self.skylight_parameter.as_ref().map(|s| s.transform(f, 1.));
        Ok(())
    }

    /// Scales the room about `origin`, including heights and parameters.
    pub fn scale(&mut self, factor: f64, origin: Point) -> Result<(), Room2dError> {
        if factor <= 0. {
            return Err(Room2dError::InvalidGeometry(format!(
                "room {}: scale factor must be positive, got {factor}",
                self.identifier
            )));
        }
        let o2 = origin.to_2d();
        let f = |p: Point2D| p.scale(factor, o2);
        self.floor = self.floor.map_points(f);
        self.floor_height = origin.z + (self.floor_height - origin.z) * factor;
        self.floor_to_ceiling_height *= factor;
        self.ceiling_plenum_depth *= factor;
        self.floor_plenum_depth *= factor;
        for props in self.segments.iter_mut() {
            props.window_parameter = props.window_parameter.as_ref().map(|w| w.scale(factor));
            props.shading_parameter = props.shading_parameter.as_ref().map(|s| s.scale(factor));
        }
        self.skylight_parameter = self.skylight_parameter.as_ref().map(|s| s.transform(f, factor));
        Ok(())
    }

    /// Mirrors the plan across the line through `origin` perpendicular to `normal`.
    ///
    /// Rings come back reversed and are re-oriented, so segment indices change.
    /// Returns the old -> new segment index map.
    pub fn reflect(&mut self, normal: Point2D, origin: Point2D) -> SegmentMap {
        let f = |p: Point2D| p.reflect(normal, origin);
        let mirrored = self.floor.map_points(f);
        self.skylight_parameter = self
            .skylight_parameter
            .as_ref()
            .map(|s| s.transform(f, 1.).reverse_polygons());
        let Region2D { boundary, holes } = mirrored;
        let (floor, map) = normalize_rings(boundary, holes, &mut self.segments);
        self.floor = floor;
        debug!("Reflected room {}", self.identifier);
        map
    }

    // Volumes

    /// Plain vertical extrusion of the floor to the ceiling height.
    pub fn to_extrusion(&self, tol: f64) -> Result<Polyhedron, Room2dError> {
        Ok(self.extrusion_volume(tol)?.polyhedron)
    }

    pub(crate) fn extrusion_volume(&self, tol: f64) -> Result<RoofVolume, Room2dError> {
        let ceiling = self.ceiling_height();
        let caps = vec![self.floor.clone()];
        let roof_faces = crate::roof::flat_caps(&caps, ceiling).map_err(|e| self.degenerate(e.to_string()))?;
        let mut walls = Vec::with_capacity(self.segments.len());
        for (i, seg) in self.floor.segments().iter().enumerate() {
            let pts = vec![
                Point::from_2d(seg.p1, self.floor_height),
                Point::from_2d(seg.p2, self.floor_height),
                Point::from_2d(seg.p2, ceiling),
                Point::from_2d(seg.p1, ceiling),
            ];
            let face = Face::from_ring(pts).map_err(|e| self.degenerate(e.to_string()))?;
            walls.push((face, i));
        }
        RoofVolume::assemble(self, roof_faces, walls, tol).map_err(|e| self.degenerate(e.to_string()))
    }

    /// Closed volume under `roof`, or the extrusion when that is not possible.
    pub fn to_volume(&self, roof: Option<&RoofSpecification>, tol: f64) -> Result<RoomVolume, Room2dError> {
        if let Some(roof) = roof {
            match build_roof_volume(self, roof, tol) {
                Some(shell) => {
                    return Ok(RoomVolume {
                        shell,
                        is_extrusion: false,
                    });
                }
                None => warn!("Roof volume failed for room {}, using extrusion", self.identifier),
            }
        }
        Ok(RoomVolume {
            shell: self.extrusion_volume(tol)?,
            is_extrusion: true,
        })
    }

    // Internal helpers

    /// Replaces segment records and rings together (used by editing operations).
    pub(crate) fn replace_geometry(&mut self, floor: Region2D, segments: Vec<SegmentProps>) {
        self.floor = floor;
        self.segments = segments;
    }

    fn replace_segments(&mut self, segments: Vec<SegmentProps>) -> Result<(), Room2dError> {
        for (i, props) in segments.iter().enumerate() {
            self.check_segment(i, props)?;
        }
        self.segments = segments;
        Ok(())
    }

    pub(crate) fn check_segment(&self, i: usize, props: &SegmentProps) -> Result<(), Room2dError> {
        props.validate().map_err(|reason| Room2dError::InvalidWallAssignment {
            room: self.identifier.clone(),
            segment: i,
            reason,
        })
    }

    fn check_len(&self, name: &str, len: usize) -> Result<(), Room2dError> {
        if len != self.segments.len() {
            return Err(Room2dError::InvalidGeometry(format!(
                "room {}: {name} has {len} entries for {} segments",
                self.identifier,
                self.segments.len()
            )));
        }
        Ok(())
    }

    fn check_plenums(&self, ftc: f64, ceiling: f64, floor: f64) -> Result<(), Room2dError> {
        if ceiling < 0. || floor < 0. || ceiling + floor >= ftc {
            return Err(Room2dError::InvalidGeometry(format!(
                "room {}: plenum depths {ceiling} + {floor} must be non-negative and below {ftc}",
                self.identifier
            )));
        }
        Ok(())
    }

    fn out_of_range(&self, index: usize) -> Room2dError {
        Room2dError::SegmentOutOfRange {
            room: self.identifier.clone(),
            index,
            count: self.segments.len(),
        }
    }

    pub(crate) fn degenerate(&self, reason: String) -> Room2dError {
        Room2dError::GeometryDegenerate {
            room: self.identifier.clone(),
            reason,
        }
    }
}

/// Rejects rings that self-intersect or collapse under `tol`.
pub(crate) fn check_ring(ring: &Polygon2D, room: &str, tol: f64) -> Result<(), Room2dError> {
    let degenerate = |reason: String| Room2dError::GeometryDegenerate {
        room: room.to_string(),
        reason,
    };
    let (clean, _) = ring
        .remove_duplicate_vertices(tol)
        .map_err(|e| degenerate(e.to_string()))?;
    if clean.is_self_intersecting(tol) {
        return Err(Room2dError::SelfIntersecting { room: room.to_string() });
    }
    let (clean, _) = clean
        .remove_colinear_vertices(tol)
        .map_err(|e| degenerate(e.to_string()))?;
    if clean.area() <= tol * tol {
        return Err(degenerate(format!("ring area {} is below tolerance", clean.area())));
    }
    Ok(())
}

/// Holes must lie inside the outer ring and must not overlap one another.
pub(crate) fn check_holes(boundary: &Polygon2D, holes: &[Polygon2D], room: &str, tol: f64) -> Result<(), Room2dError> {
    let outer = Region2D::from_polygon(boundary.clone());
    let regions: Vec<Region2D> = holes.iter().map(|h| Region2D::from_polygon(h.clone())).collect();
    for (i, hole) in regions.iter().enumerate() {
        match polygon_relationship(&outer, hole, tol) {
            PolygonRelation::Inside => {}
            PolygonRelation::Overlapping => return Err(Room2dError::SelfIntersecting { room: room.to_string() }),
            PolygonRelation::Outside => {
                return Err(Room2dError::InvalidGeometry(format!(
                    "room {room}: hole {i} lies outside the floor boundary"
                )));
            }
        }
        for other in regions.iter().skip(i + 1) {
            if overlap_area(hole, other, tol) > area_tolerance(hole, tol) {
                return Err(Room2dError::SelfIntersecting { room: room.to_string() });
            }
        }
    }
    Ok(())
}

/// Brings rings into normal form, reversing and flipping segment records of
/// any ring that had to be reversed. Returns the region and the index map.
pub(crate) fn normalize_rings(
    boundary: Polygon2D,
    holes: Vec<Polygon2D>,
    segments: &mut [SegmentProps],
) -> (Region2D, SegmentMap) {
    let mut map: SegmentMap = (0..segments.len()).map(Some).collect();
    let mut offset = 0;
    let mut orient = |ring: Polygon2D, want_ccw: bool| -> Polygon2D {
        let n = ring.len();
        let range = offset..offset + n;
        offset += n;
        if ring.is_clockwise() != want_ccw {
            return ring;
        }
        let lengths: Vec<f64> = ring.segments().iter().map(|s| s.length()).collect();
        let props = &mut segments[range.clone()];
        props.reverse();
        for (k, p) in props.iter_mut().enumerate() {
            *p = p.flipped(lengths[n - 1 - k]);
        }
        for k in 0..n {
            map[range.start + k] = Some(range.start + n - 1 - k);
        }
        ring.reverse_keep_start()
    };
    let boundary = orient(boundary, true);
    let holes = holes.into_iter().map(|h| orient(h, false)).collect();
    (Region2D { boundary, holes }, map)
}
