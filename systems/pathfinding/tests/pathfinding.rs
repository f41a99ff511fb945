use std::collections::HashSet;

use snake_pilot_core::{CellCoord, GridSize};
use snake_pilot_system_pathfinding::{find_path, Pathfinder};

fn blocked_set(cells: &[(u32, u32)]) -> HashSet<CellCoord> {
    cells
        .iter()
        .map(|&(column, row)| CellCoord::new(column, row))
        .collect()
}

#[test]
fn open_board_scenario_heads_straight_for_goal() {
    let grid = GridSize::square(5);
    let path = find_path(grid, CellCoord::new(2, 2), CellCoord::new(2, 4), |_| false);

    assert_eq!(path, vec![CellCoord::new(2, 3), CellCoord::new(2, 4)]);
}

#[test]
fn straight_corridor_returns_one_cell_per_step() {
    let grid = GridSize::new(9, 3);
    // Rows 0 and 2 are walls, leaving a single corridor along row 1.
    let walls: HashSet<CellCoord> = (0..9)
        .flat_map(|column| [CellCoord::new(column, 0), CellCoord::new(column, 2)])
        .collect();

    for length in 1..=8 {
        let target = CellCoord::new(length, 1);
        let path = find_path(grid, CellCoord::new(0, 1), target, |cell| {
            walls.contains(&cell)
        });

        assert_eq!(path.len(), length as usize);
        assert_eq!(path.last(), Some(&target));
        assert!(path.iter().all(|cell| cell.row() == 1));
    }
}

#[test]
fn sealed_neighbour_is_unreachable() {
    let grid = GridSize::square(5);
    // (3, 2) is fully enclosed by blocked cells; the start sits outside the enclosure.
    let blocked = blocked_set(&[(3, 1), (3, 3), (2, 2), (4, 2)]);

    let path = find_path(grid, CellCoord::new(0, 0), CellCoord::new(3, 2), |cell| {
        blocked.contains(&cell)
    });

    assert!(path.is_empty());
}

#[test]
fn start_boxed_in_by_blocked_cells_finds_nothing() {
    let grid = GridSize::square(5);
    let blocked = blocked_set(&[(2, 1), (2, 3), (1, 2), (3, 2)]);

    let path = find_path(grid, CellCoord::new(2, 2), CellCoord::new(3, 2), |cell| {
        blocked.contains(&cell)
    });

    assert!(path.is_empty());
}

#[test]
fn start_cell_is_never_treated_as_blocked() {
    let grid = GridSize::square(4);
    let start = CellCoord::new(1, 1);

    let path = find_path(grid, start, CellCoord::new(1, 3), |cell| cell == start);

    assert_eq!(path, vec![CellCoord::new(1, 2), CellCoord::new(1, 3)]);
}

#[test]
fn identical_inputs_produce_identical_paths() {
    let grid = GridSize::square(12);
    let blocked = blocked_set(&[(4, 4), (4, 5), (4, 6), (5, 6), (6, 6), (7, 3)]);
    let start = CellCoord::new(1, 9);
    let target = CellCoord::new(10, 2);

    let mut pathfinder = Pathfinder::new();
    let first = pathfinder.find_path(grid, start, target, |cell| blocked.contains(&cell));
    let second = pathfinder.find_path(grid, start, target, |cell| blocked.contains(&cell));
    let fresh = find_path(grid, start, target, |cell| blocked.contains(&cell));

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(first, fresh);
    assert_eq!(first.len() as u32, start.manhattan_distance(target));
}

#[test]
fn ties_prefer_vertical_moves_first() {
    let grid = GridSize::square(5);
    let path = find_path(grid, CellCoord::new(0, 0), CellCoord::new(1, 1), |_| false);

    // Down is expanded before Right, so the route turns through (0, 1).
    assert_eq!(path, vec![CellCoord::new(0, 1), CellCoord::new(1, 1)]);
}

#[test]
fn search_does_not_cross_grid_edges() {
    let grid = GridSize::square(6);
    let path = find_path(grid, CellCoord::new(0, 3), CellCoord::new(5, 3), |_| false);

    // A wrapped route would take one step; the bounded search must walk across.
    assert_eq!(path.len(), 5);
    assert!(path
        .windows(2)
        .all(|pair| pair[0].manhattan_distance(pair[1]) == 1));
}

#[test]
fn every_step_is_adjacent_and_avoids_blocked_cells() {
    let grid = GridSize::square(10);
    let blocked: HashSet<CellCoord> = (1..10).map(|row| CellCoord::new(5, row)).collect();
    let start = CellCoord::new(0, 9);
    let target = CellCoord::new(9, 9);

    let path = find_path(grid, start, target, |cell| blocked.contains(&cell));

    assert_eq!(path.last(), Some(&target));
    assert!(path.iter().all(|cell| !blocked.contains(cell)));
    assert_eq!(start.manhattan_distance(path[0]), 1);
    assert!(path
        .windows(2)
        .all(|pair| pair[0].manhattan_distance(pair[1]) == 1));
    assert!(path.contains(&CellCoord::new(5, 0)));
}
