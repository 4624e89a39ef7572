use thiserror::Error;

/// Errors raised by room construction, editing, adjacency and roof building.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Room2dError {
    /// Zero or near-zero area after colinear-vertex removal.
    #[error("degenerate geometry in room {room}: {reason}")]
    GeometryDegenerate { room: String, reason: String },

    /// The floor boundary crosses itself.
    #[error("room {room} has a self-intersecting floor boundary")]
    SelfIntersecting { room: String },

    /// Window or air boundary placed on an incompatible boundary condition.
    #[error("invalid assignment on segment {segment} of room {room}: {reason}")]
    InvalidWallAssignment {
        room: String,
        segment: usize,
        reason: String,
    },

    /// Mismatched windows across a matched pair with resolution disabled.
    #[error("window conflict between {room_a}[{segment_a}] and {room_b}[{segment_b}]")]
    AdjacencyConflict {
        room_a: String,
        segment_a: usize,
        room_b: String,
        segment_b: usize,
    },

    /// A roof volume could not be closed after all repair stages.
    #[error("cannot build a roof volume for room {room}: {reason}")]
    InvalidRoofGeometry { room: String, reason: String },

    /// Any other malformed input (array lengths, heights, plenum depths).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("segment {index} is out of range for room {room} with {count} segments")]
    SegmentOutOfRange {
        room: String,
        index: usize,
        count: usize,
    },
}
