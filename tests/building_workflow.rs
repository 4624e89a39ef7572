use room2d::adjacency::{retarget_surface_references, solve_adjacency_with};
use room2d::io::{from_json_str, to_json_string};
use room2d::{
    BoundaryCondition, GeometryConfig, Point2D, Room2D, Room2dError, RoomPlan, WindowParameter,
    patch_missing_adjacencies, solve_adjacency,
};

fn room(id: &str, boundary: Vec<(f64, f64)>) -> Room2D {
    let plan = RoomPlan {
        identifier: Some(id.to_string()),
        boundary,
        ..RoomPlan::default()
    };
    Room2D::from_plan(plan, &GeometryConfig::default()).unwrap()
}

fn square(id: &str, x0: f64, y0: f64, size: f64) -> Room2D {
    room(
        id,
        vec![(x0, y0), (x0 + size, y0), (x0 + size, y0 + size), (x0, y0 + size)],
    )
}

/// 2x2 grid of 5 m rooms.
fn grid() -> Vec<Room2D> {
    vec![
        square("sw", 0., 0., 5.),
        square("se", 5., 0., 5.),
        square("nw", 0., 5., 5.),
        square("ne", 5., 5., 5.),
    ]
}

fn assert_symmetric(rooms: &[Room2D]) {
    for r in rooms.iter() {
        for (i, bc) in r.boundary_conditions().iter().enumerate() {
            if let Some((peer_id, peer_seg)) = bc.peer() {
                let peer = rooms
                    .iter()
                    .find(|p| p.identifier == peer_id)
                    .unwrap_or_else(|| panic!("missing peer {peer_id}"));
                assert_eq!(
                    peer.boundary_condition(peer_seg).unwrap(),
                    &BoundaryCondition::surface(&r.identifier, i)
                );
                assert_eq!(r.window_parameter(i).unwrap().is_some(), peer.window_parameter(peer_seg).unwrap().is_some());
            }
        }
    }
}

#[test]
fn test_single_room_metrics() {
    let r = room("office", vec![(0., 0.), (10., 0.), (10., 8.), (0., 8.)]);
    assert_eq!(r.segment_count(), 4);
    assert!((r.floor_area() - 80.).abs() < 1e-9);
    assert!((r.perimeter() - 36.).abs() < 1e-9);
    assert!((r.volume() - 240.).abs() < 1e-9);
    assert!((r.exterior_wall_area() - 108.).abs() < 1e-9);
    assert!(r.boundary_conditions().iter().all(|bc| *bc == BoundaryCondition::Outdoor));
}

#[test]
fn test_two_rooms_share_one_wall() {
    let mut rooms = vec![square("a", 0., 0., 5.), square("b", 5., 0., 5.)];
    let pairs = solve_adjacency(&mut rooms, 0.01, true).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_eq!(rooms[0].boundary_condition(1).unwrap(), &BoundaryCondition::surface("b", 3));
    assert_eq!(rooms[1].boundary_condition(3).unwrap(), &BoundaryCondition::surface("a", 1));
    // Shared walls no longer count as exterior
    assert!((rooms[0].exterior_wall_area() - 45.).abs() < 1e-9);
}

#[test]
fn test_grid_adjacency_is_symmetric() {
    let mut rooms = grid();
    for r in rooms.iter_mut() {
        r.set_outdoor_window_parameters(Some(WindowParameter::SimpleRatio { ratio: 0.3 }));
    }
    let pairs = solve_adjacency(&mut rooms, 0.01, true).unwrap();
    assert_eq!(pairs.len(), 4);
    assert_symmetric(&rooms);

    // A second pass finds nothing new
    let snapshot = rooms.clone();
    assert!(solve_adjacency(&mut rooms, 0.01, true).unwrap().is_empty());
    assert_eq!(rooms, snapshot);
}

#[test]
fn test_conflicting_windows_resolved_by_area() {
    let mut rooms = vec![square("a", 0., 0., 5.), square("b", 5., 0., 5.)];
    rooms[0]
        .set_window_parameter(1, Some(WindowParameter::SimpleRatio { ratio: 1. / 3. }))
        .unwrap();
    rooms[1]
        .set_window_parameter(3, Some(WindowParameter::SimpleRatio { ratio: 8. / 15. }))
        .unwrap();
    solve_adjacency(&mut rooms, 0.01, true).unwrap();
    let expected = WindowParameter::SimpleRatio { ratio: 8. / 15. };
    assert_eq!(rooms[0].window_parameter(1).unwrap(), Some(&expected));
    assert_eq!(rooms[1].window_parameter(3).unwrap(), Some(&expected));
}

#[test]
fn test_conflict_leaves_every_room_unchanged() {
    let mut rooms = grid();
    // Only the last pair conflicts, earlier pairs must not be committed either
    rooms[3]
        .set_window_parameter(3, Some(WindowParameter::SimpleRatio { ratio: 0.5 }))
        .unwrap();
    let before = rooms.clone();
    let strict = GeometryConfig {
        resolve_window_conflicts: false,
        ..GeometryConfig::default()
    };
    let err = solve_adjacency_with(&mut rooms, &strict).unwrap_err();
    assert!(matches!(err, Room2dError::AdjacencyConflict { .. }));
    assert_eq!(rooms, before);
}

#[test]
fn test_deleted_peer_is_patched_to_outdoor() {
    let mut rooms = grid();
    solve_adjacency(&mut rooms, 0.01, true).unwrap();
    rooms.retain(|r| r.identifier != "ne");

    assert_eq!(patch_missing_adjacencies(&mut rooms), 2);
    assert_symmetric(&rooms);
    let surfaces: usize = rooms
        .iter()
        .map(|r| r.boundary_conditions().iter().filter(|bc| bc.is_surface()).count())
        .sum();
    assert_eq!(surfaces, 4);
}

#[test]
fn test_reflect_keeps_orientation_and_lengths() {
    let mut r = room("l", vec![(0., 0.), (6., 0.), (6., 2.), (2., 2.), (2., 5.), (0., 5.)]);
    r.set_window_parameter(0, Some(WindowParameter::SimpleRatio { ratio: 0.4 }))
        .unwrap();
    let mut lengths = r.segment_lengths();
    let area = r.floor_area();

    let map = r.reflect(Point2D::new(1., 0.), Point2D::new(0., 0.));
    assert!(!r.floor_boundary().is_clockwise());
    assert!((r.floor_area() - area).abs() < 1e-9);

    let mut reflected = r.segment_lengths();
    lengths.sort_by(f64::total_cmp);
    reflected.sort_by(f64::total_cmp);
    for (a, b) in lengths.iter().zip(reflected.iter()) {
        assert!((a - b).abs() < 1e-9);
    }

    // The window follows its wall
    let new_index = map[0].unwrap();
    assert!(r.window_parameter(new_index).unwrap().is_some());
    assert!((r.segment_lengths()[new_index] - 6.).abs() < 1e-9);
}

#[test]
fn test_colinear_merge_retargets_peers() {
    // a's east wall is split in two, b's west wall is one piece
    let mut rooms = vec![
        room("a", vec![(0., 0.), (5., 0.), (5., 2.), (5., 5.), (0., 5.)]),
        square("b", 5., 0., 5.),
    ];
    let pairs = solve_adjacency(&mut rooms, 0.01, true).unwrap();
    assert!(pairs.is_empty());

    let map = rooms[0].remove_colinear_vertices(0.01).unwrap();
    assert_eq!(rooms[0].segment_count(), 4);
    assert_eq!(retarget_surface_references(&mut rooms, "a", &map), 0);

    let pairs = solve_adjacency(&mut rooms, 0.01, true).unwrap();
    assert_eq!(pairs.len(), 1);
    assert_symmetric(&rooms);
}

#[test]
fn test_json_roundtrip_keeps_adjacency() {
    let mut rooms = grid();
    solve_adjacency(&mut rooms, 0.01, true).unwrap();
    let json = to_json_string(&rooms).unwrap();
    let loaded = from_json_str(&json, 0.01).unwrap();
    assert_eq!(loaded, rooms);
    assert_symmetric(&loaded);
}
