use serde::{Deserialize, Serialize};
use std::fmt;

/// Exterior relationship of a wall segment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoundaryCondition {
    #[default]
    Outdoor,
    Ground,
    Adiabatic,
    /// Shared with segment `peer_segment` of room `peer_room`.
    Surface { peer_room: String, peer_segment: usize },
}

impl BoundaryCondition {
    pub fn surface(peer_room: &str, peer_segment: usize) -> Self {
        Self::Surface {
            peer_room: peer_room.to_string(),
            peer_segment,
        }
    }

    pub fn is_surface(&self) -> bool {
        matches!(self, Self::Surface { .. })
    }

    /// Outdoor and Surface walls may carry windows.
    pub fn allows_windows(&self) -> bool {
        matches!(self, Self::Outdoor | Self::Surface { .. })
    }

    /// Peer `(room, segment)` of a Surface condition.
    pub fn peer(&self) -> Option<(&str, usize)> {
        match self {
            Self::Surface {
                peer_room,
                peer_segment,
            } => Some((peer_room.as_str(), *peer_segment)),
            _ => None,
        }
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outdoor => write!(f, "Outdoor"),
            Self::Ground => write!(f, "Ground"),
            Self::Adiabatic => write!(f, "Adiabatic"),
            Self::Surface {
                peer_room,
                peer_segment,
            } => write!(f, "Surface({peer_room}[{peer_segment}])"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_compatibility() {
        assert!(BoundaryCondition::Outdoor.allows_windows());
        assert!(BoundaryCondition::surface("a", 1).allows_windows());
        assert!(!BoundaryCondition::Ground.allows_windows());
        assert!(!BoundaryCondition::Adiabatic.allows_windows());
    }

    #[test]
    fn test_serde_tagged() {
        let bc = BoundaryCondition::surface("room_b", 3);
        let json = serde_json::to_string(&bc).unwrap();
        assert_eq!(json, r#"{"type":"Surface","peer_room":"room_b","peer_segment":3}"#);
        let back: BoundaryCondition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bc);
        assert_eq!(back.peer(), Some(("room_b", 3)));
    }
}
