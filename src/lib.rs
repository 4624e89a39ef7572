pub mod adjacency;
pub mod config;
pub mod error;
pub mod geom;
mod id;
pub mod io;
pub mod roof;
pub mod room;
pub mod vecutils;

// Prelude
pub use adjacency::{AdjacencyPair, SegmentRef, patch_missing_adjacencies, solve_adjacency};
pub use config::GeometryConfig;
pub use error::Room2dError;
pub use geom::point::Point;
pub use geom::point2d::Point2D;
pub use geom::polygon2d::{Polygon2D, Region2D};
pub use geom::vector::Vector;
pub use id::random_id;
pub use roof::{RoofIndex, RoofSpecification, RoofVolume, build_roof_volume, try_build_roof_volume};
pub use room::boundary::BoundaryCondition;
pub use room::params::{ShadingParameter, SkylightParameter, WindowParameter};
pub use room::{Room2D, RoomPlan, RoomVolume};
