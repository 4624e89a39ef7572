//! Serializable property record of a room.
//!
//! The record is a plain transcription of the stored state: ring coordinates,
//! heights, the four per-segment lists and the room flags. Nothing derived is
//! stored, so `from_record(to_record(room))` reproduces the room exactly.

use crate::config::GeometryConfig;
use crate::error::Room2dError;
use crate::geom::polygon2d::Polygon2D;
use crate::room::boundary::BoundaryCondition;
use crate::room::params::{ShadingParameter, SkylightParameter, WindowParameter};
use crate::room::{Room2D, RoomPlan};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room2dRecord {
    pub identifier: String,
    pub display_name: String,
    pub floor_boundary: Vec<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub floor_holes: Vec<Vec<[f64; 2]>>,
    pub floor_height: f64,
    pub floor_to_ceiling_height: f64,
    pub boundary_conditions: Vec<BoundaryCondition>,
    pub window_parameters: Vec<Option<WindowParameter>>,
    pub shading_parameters: Vec<Option<ShadingParameter>>,
    pub air_boundaries: Vec<bool>,
    pub is_ground_contact: bool,
    pub is_top_exposed: bool,
    #[serde(default = "default_true")]
    pub has_floor: bool,
    #[serde(default = "default_true")]
    pub has_ceiling: bool,
    #[serde(default)]
    pub ceiling_plenum_depth: f64,
    #[serde(default)]
    pub floor_plenum_depth: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skylight_parameter: Option<SkylightParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

fn default_true() -> bool {
    true
}

fn ring_coords(ring: &Polygon2D) -> Vec<[f64; 2]> {
    ring.vertices().iter().map(|p| [p.x, p.y]).collect()
}

impl Room2D {
    pub fn to_record(&self) -> Room2dRecord {
        Room2dRecord {
            identifier: self.identifier.clone(),
            display_name: self.display_name.clone(),
            floor_boundary: ring_coords(self.floor_boundary()),
            floor_holes: self.floor_holes().iter().map(ring_coords).collect(),
            floor_height: self.floor_height(),
            floor_to_ceiling_height: self.floor_to_ceiling_height(),
            boundary_conditions: self.boundary_conditions(),
            window_parameters: self.window_parameters(),
            shading_parameters: self.shading_parameters(),
            air_boundaries: self.air_boundaries(),
            is_ground_contact: self.is_ground_contact,
            is_top_exposed: self.is_top_exposed,
            has_floor: self.has_floor,
            has_ceiling: self.has_ceiling,
            ceiling_plenum_depth: self.ceiling_plenum_depth(),
            floor_plenum_depth: self.floor_plenum_depth(),
            skylight_parameter: self.skylight_parameter.clone(),
            zone: self.zone.clone(),
        }
    }

    /// Rebuilds a room from its record, re-running all validation.
    pub fn from_record(record: Room2dRecord, tolerance: f64) -> Result<Self, Room2dError> {
        let to_tuples = |ring: &[[f64; 2]]| ring.iter().map(|c| (c[0], c[1])).collect::<Vec<_>>();
        let plan = RoomPlan {
            identifier: Some(record.identifier),
            display_name: Some(record.display_name),
            boundary: to_tuples(&record.floor_boundary),
            holes: record.floor_holes.iter().map(|h| to_tuples(h)).collect(),
            floor_height: record.floor_height,
            floor_to_ceiling_height: record.floor_to_ceiling_height,
            boundary_conditions: Some(record.boundary_conditions),
            window_parameters: Some(record.window_parameters),
            shading_parameters: Some(record.shading_parameters),
            air_boundaries: Some(record.air_boundaries),
            is_ground_contact: record.is_ground_contact,
            is_top_exposed: record.is_top_exposed,
            has_floor: record.has_floor,
            has_ceiling: record.has_ceiling,
            ceiling_plenum_depth: record.ceiling_plenum_depth,
            floor_plenum_depth: record.floor_plenum_depth,
            skylight_parameter: record.skylight_parameter,
            zone: record.zone,
        };
        Self::from_plan(plan, &GeometryConfig::new(tolerance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point2d::Point2D;

    #[test]
    fn test_record_roundtrip() {
        let plan = RoomPlan {
            identifier: Some("office".to_string()),
            boundary: vec![(0., 0.), (6., 0.), (6., 4.), (0., 4.)],
            holes: vec![vec![(2., 1.), (2., 2.), (3., 2.), (3., 1.)]],
            boundary_conditions: Some(vec![
                BoundaryCondition::Outdoor,
                BoundaryCondition::surface("hall", 2),
                BoundaryCondition::Adiabatic,
                BoundaryCondition::Outdoor,
                BoundaryCondition::Outdoor,
                BoundaryCondition::Outdoor,
                BoundaryCondition::Outdoor,
                BoundaryCondition::Outdoor,
            ]),
            window_parameters: Some(vec![
                Some(WindowParameter::Detailed {
                    polygons: vec![vec![
                        Point2D::new(1., 1.),
                        Point2D::new(2., 1.),
                        Point2D::new(2., 2.),
                    ]],
                }),
                None,
                None,
                Some(WindowParameter::SimpleRatio { ratio: 0.3 }),
                None,
                None,
                None,
                None,
            ]),
            zone: Some("z1".to_string()),
            ..RoomPlan::default()
        };
        let room = Room2D::from_plan(plan, &GeometryConfig::default()).unwrap();
        let record = room.to_record();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: Room2dRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        let back = Room2D::from_record(parsed, 0.01).unwrap();
        assert_eq!(back, room);
    }
}
