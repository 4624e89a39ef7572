use crate::room::boundary::BoundaryCondition;
use crate::room::params::{ShadingParameter, WindowParameter};
use serde::{Deserialize, Serialize};

/// Properties of one wall segment.
///
/// Kept as a single record per segment so that inserting, removing or
/// splitting segments can never desynchronize the per-segment values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentProps {
    pub boundary_condition: BoundaryCondition,
    pub window_parameter: Option<WindowParameter>,
    pub shading_parameter: Option<ShadingParameter>,
    pub air_boundary: bool,
}

impl SegmentProps {
    pub fn new(boundary_condition: BoundaryCondition) -> Self {
        Self {
            boundary_condition,
            ..Self::default()
        }
    }

    /// Reason why the combination is invalid, if it is.
    pub fn validate(&self) -> Result<(), String> {
        if self.window_parameter.is_some() && !self.boundary_condition.allows_windows() {
            return Err(format!(
                "a window is not allowed on a {} boundary",
                self.boundary_condition
            ));
        }
        if self.air_boundary {
            if !self.boundary_condition.is_surface() {
                return Err(format!(
                    "an air boundary is not allowed on a {} boundary",
                    self.boundary_condition
                ));
            }
            if self.window_parameter.is_some() {
                return Err("an air boundary cannot have a window".to_string());
            }
        }
        Ok(())
    }

    /// Same segment walked in the opposite direction.
    pub fn flipped(&self, segment_length: f64) -> Self {
        Self {
            window_parameter: self.window_parameter.as_ref().map(|w| w.flip(segment_length)),
            ..self.clone()
        }
    }

    /// Properties of the piece `[start, end]` (distances along the segment).
    ///
    /// Surface conditions cannot survive a split because the peer segment
    /// no longer matches, so they fall back to Outdoor.
    pub fn trimmed(&self, segment_length: f64, start: f64, end: f64, height: f64) -> Self {
        let full = start.abs() < 1e-9 && (end - segment_length).abs() < 1e-9;
        if full {
            return self.clone();
        }
        let boundary_condition = match &self.boundary_condition {
            BoundaryCondition::Surface { .. } => BoundaryCondition::Outdoor,
            other => other.clone(),
        };
        Self {
            boundary_condition,
            window_parameter: self
                .window_parameter
                .as_ref()
                .and_then(|w| w.trim(segment_length, start, end, height)),
            shading_parameter: self.shading_parameter.clone(),
            air_boundary: false,
        }
    }

    /// Merges consecutive colinear pieces (`parts` holds props and lengths).
    ///
    /// The boundary condition of the longest piece wins. If any piece is a
    /// Surface the result is Outdoor, since no peer spans the merged segment.
    pub fn merge(parts: &[(&SegmentProps, f64)], height: f64) -> Self {
        let mut longest = 0;
        for (i, (_, len)) in parts.iter().enumerate() {
            if *len > parts[longest].1 {
                longest = i;
            }
        }
        let any_surface = parts.iter().any(|(p, _)| p.boundary_condition.is_surface());
        let boundary_condition = if any_surface {
            BoundaryCondition::Outdoor
        } else {
            parts[longest].0.boundary_condition.clone()
        };

        let windows: Vec<(Option<&WindowParameter>, f64)> = parts
            .iter()
            .map(|(p, len)| (p.window_parameter.as_ref(), *len))
            .collect();
        let shades: Vec<(Option<&ShadingParameter>, f64)> = parts
            .iter()
            .map(|(p, len)| (p.shading_parameter.as_ref(), *len))
            .collect();

        let window_parameter = if boundary_condition.allows_windows() {
            WindowParameter::merge(&windows, height)
        } else {
            None
        };

        Self {
            boundary_condition,
            window_parameter,
            shading_parameter: ShadingParameter::merge(&shades),
            air_boundary: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let mut props = SegmentProps::new(BoundaryCondition::Ground);
        assert!(props.validate().is_ok());
        props.window_parameter = Some(WindowParameter::SimpleRatio { ratio: 0.3 });
        assert!(props.validate().is_err());
        props.boundary_condition = BoundaryCondition::surface("b", 0);
        assert!(props.validate().is_ok());
        props.air_boundary = true;
        assert!(props.validate().is_err());
        props.window_parameter = None;
        assert!(props.validate().is_ok());
    }

    #[test]
    fn test_merge_surface_becomes_outdoor() {
        let a = SegmentProps::new(BoundaryCondition::surface("b", 2));
        let mut b = SegmentProps::new(BoundaryCondition::Outdoor);
        b.window_parameter = Some(WindowParameter::SimpleRatio { ratio: 0.5 });
        let merged = SegmentProps::merge(&[(&a, 4.), (&b, 4.)], 3.);
        assert_eq!(merged.boundary_condition, BoundaryCondition::Outdoor);
        let area = merged.window_parameter.unwrap().area_from_segment(8., 3.);
        assert!((area - 6.).abs() < 1e-9);
    }

    #[test]
    fn test_merge_ground_drops_windows() {
        let a = SegmentProps::new(BoundaryCondition::Ground);
        let b = SegmentProps::new(BoundaryCondition::Ground);
        let merged = SegmentProps::merge(&[(&a, 1.), (&b, 4.)], 3.);
        assert_eq!(merged.boundary_condition, BoundaryCondition::Ground);
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn test_trimmed_surface_falls_back() {
        let a = SegmentProps::new(BoundaryCondition::surface("b", 2));
        assert_eq!(a.trimmed(4., 0., 4., 3.), a);
        assert_eq!(a.trimmed(4., 0., 2., 3.).boundary_condition, BoundaryCondition::Outdoor);
    }
}
