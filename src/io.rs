//! JSON I/O for rooms.
//!
//! Rooms are stored as a JSON array of property records. Reading re-runs
//! the full room validation, so a file that deserializes but describes
//! invalid geometry is rejected.

use crate::room::Room2D;
use crate::room::record::Room2dRecord;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Writes rooms to a JSON file.
///
/// # Example
/// ```no_run
/// use room2d::Room2D;
/// use room2d::io::write_rooms;
/// use std::path::Path;
///
/// let rooms: Vec<Room2D> = Vec::new();
/// write_rooms(Path::new("rooms.json"), &rooms).unwrap();
/// ```
pub fn write_rooms(path: &Path, rooms: &[Room2D]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);
    let records: Vec<Room2dRecord> = rooms.iter().map(|r| r.to_record()).collect();

    serde_json::to_writer_pretty(writer, &records)
        .with_context(|| format!("Failed to serialize rooms to: {}", path.display()))?;

    Ok(())
}

/// Reads rooms from a JSON file, validating each with `tolerance`.
pub fn read_rooms(path: &Path, tolerance: f64) -> Result<Vec<Room2D>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let records: Vec<Room2dRecord> = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize rooms from: {}", path.display()))?;

    from_records(records, tolerance)
}

pub fn to_json_string(rooms: &[Room2D]) -> Result<String> {
    let records: Vec<Room2dRecord> = rooms.iter().map(|r| r.to_record()).collect();
    serde_json::to_string_pretty(&records).context("Failed to serialize rooms to string")
}

pub fn from_json_str(json: &str, tolerance: f64) -> Result<Vec<Room2D>> {
    let records: Vec<Room2dRecord> = serde_json::from_str(json).context("Failed to deserialize rooms from string")?;
    from_records(records, tolerance)
}

fn from_records(records: Vec<Room2dRecord>, tolerance: f64) -> Result<Vec<Room2D>> {
    records
        .into_iter()
        .map(|rec| {
            let id = rec.identifier.clone();
            Room2D::from_record(rec, tolerance).with_context(|| format!("Invalid room record: {id}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adjacency::solve_adjacency;
    use crate::config::GeometryConfig;
    use crate::room::RoomPlan;
    use crate::room::params::WindowParameter;
    use tempfile::tempdir;

    fn rooms() -> Vec<Room2D> {
        let cfg = GeometryConfig::default();
        let plan = |id: &str, x0: f64| RoomPlan {
            identifier: Some(id.to_string()),
            boundary: vec![(x0, 0.), (x0 + 4., 0.), (x0 + 4., 3.), (x0, 3.)],
            ..RoomPlan::default()
        };
        let mut rooms = vec![
            Room2D::from_plan(plan("a", 0.), &cfg).unwrap(),
            Room2D::from_plan(plan("b", 4.), &cfg).unwrap(),
        ];
        rooms[0].set_outdoor_window_parameters(Some(WindowParameter::SimpleRatio { ratio: 0.4 }));
        solve_adjacency(&mut rooms, cfg.tolerance, true).unwrap();
        rooms
    }

    #[test]
    fn test_write_and_read_rooms() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("rooms.json");
        let original = rooms();

        write_rooms(&path, &original)?;
        let loaded = read_rooms(&path, 0.01)?;

        assert_eq!(loaded, original);
        Ok(())
    }

    #[test]
    fn test_json_string_roundtrip() -> Result<()> {
        let original = rooms();
        let json = to_json_string(&original)?;
        assert!(json.contains("\"peer_room\": \"b\""));
        let loaded = from_json_str(&json, 0.01)?;
        assert_eq!(loaded, original);
        Ok(())
    }

    #[test]
    fn test_invalid_record_rejected() {
        let json = r#"[{
            "identifier": "bad",
            "display_name": "bad",
            "floor_boundary": [[0, 0], [1, 1], [1, 0], [0, 1]],
            "floor_height": 0,
            "floor_to_ceiling_height": 3,
            "boundary_conditions": [{"type": "Outdoor"}, {"type": "Outdoor"}, {"type": "Outdoor"}, {"type": "Outdoor"}],
            "window_parameters": [null, null, null, null],
            "shading_parameters": [null, null, null, null],
            "air_boundaries": [false, false, false, false],
            "is_ground_contact": false,
            "is_top_exposed": false
        }]"#;
        let err = from_json_str(json, 0.01).unwrap_err();
        assert!(format!("{err:#}").contains("bad"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        assert!(read_rooms(&dir.path().join("missing.json"), 0.01).is_err());
    }
}
