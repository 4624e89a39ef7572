/// Numeric settings threaded through room construction and adjacency solving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    /// Maximum distance at which two points are treated as equal (model units).
    pub tolerance: f64,
    /// Maximum angle difference (radians) for planarity checks.
    pub angle_tolerance: f64,
    /// Floors below this elevation default to `Ground` walls.
    pub ground_level: f64,
    /// Resolve mismatched windows instead of raising `AdjacencyConflict`.
    pub resolve_window_conflicts: bool,
}

impl GeometryConfig {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        let tolerance = 0.01;
        let angle_tolerance = 1f64.to_radians();
        let ground_level = 0.;
        let resolve_window_conflicts = true;

        Self {
            tolerance,
            angle_tolerance,
            ground_level,
            resolve_window_conflicts,
        }
    }
}
