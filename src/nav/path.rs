//! # Pathfinding
//!
//! Grid search between two tiles under a walkability threshold.

use crate::world::{Grid, Position, TileKind};
use pathfinding::prelude::astar;

/// Finds a walkable path from `start` to `goal`.
///
/// The returned waypoint list is inclusive: it begins with `start` and ends
/// with `goal`; callers animating from the current tile skip index 0. An
/// empty vector means no route exists — a normal outcome callers handle,
/// not an error. Passing [`crate::world::WALK_ANY`] as the threshold
/// ignores terrain entirely (every in-bounds tile passes), which is what
/// the forced-connection fallback relies on.
///
/// Only the 4-neighborhood is searched; every waypoint except `start`
/// satisfies `walk_index <= max_walk` (the mover already stands on
/// `start`, whatever it is).
///
/// # Examples
///
/// ```
/// use veldt::{find_path, Grid, OverworldTile, Position};
/// use veldt::world::OVERWORLD_MAX_WALK;
///
/// let grid: Grid<OverworldTile> = Grid::new(8, 8).unwrap();
/// let path = find_path(&grid, Position::new(0, 0), Position::new(3, 0), OVERWORLD_MAX_WALK);
/// assert_eq!(path.first(), Some(&Position::new(0, 0)));
/// assert_eq!(path.last(), Some(&Position::new(3, 0)));
///
/// let trivial = find_path(&grid, Position::new(2, 2), Position::new(2, 2), OVERWORLD_MAX_WALK);
/// assert_eq!(trivial, vec![Position::new(2, 2)]);
/// ```
pub fn find_path<T: TileKind>(
    grid: &Grid<T>,
    start: Position,
    goal: Position,
    max_walk: u8,
) -> Vec<Position> {
    if !grid.contains(start) || !grid.contains(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let result = astar(
        &start,
        |&pos| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|&next| {
                    grid.get(next)
                        .map_or(false, |tile| tile.walk_index() <= max_walk)
                })
                .map(|next| (next, 1u32))
                .collect::<Vec<_>>()
        },
        |&pos| pos.manhattan_distance(goal),
        |&pos| pos == goal,
    );

    match result {
        Some((path, _cost)) => path,
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{OverworldTile, WALK_ANY, OVERWORLD_MAX_WALK};

    #[test]
    fn test_straight_path() {
        let grid: Grid<OverworldTile> = Grid::new(10, 10).unwrap();
        let path = find_path(
            &grid,
            Position::new(1, 1),
            Position::new(5, 1),
            OVERWORLD_MAX_WALK,
        );
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], Position::new(1, 1));
        assert_eq!(path[4], Position::new(5, 1));
    }

    #[test]
    fn test_path_respects_threshold() {
        let mut grid: Grid<OverworldTile> = Grid::new(10, 3).unwrap();
        // A mountain wall splits the grid.
        for y in 0..3 {
            grid.set(Position::new(5, y), OverworldTile::Mountain).unwrap();
        }
        let blocked = find_path(
            &grid,
            Position::new(0, 1),
            Position::new(9, 1),
            OVERWORLD_MAX_WALK,
        );
        assert!(blocked.is_empty());

        let forced = find_path(&grid, Position::new(0, 1), Position::new(9, 1), WALK_ANY);
        assert!(!forced.is_empty());
    }

    #[test]
    fn test_path_routes_around_obstacles() {
        let mut grid: Grid<OverworldTile> = Grid::new(10, 10).unwrap();
        // Wall with one opening at the bottom.
        for y in 0..9 {
            grid.set(Position::new(5, y), OverworldTile::Water).unwrap();
        }
        let path = find_path(
            &grid,
            Position::new(0, 0),
            Position::new(9, 0),
            OVERWORLD_MAX_WALK,
        );
        assert!(!path.is_empty());
        assert!(path.contains(&Position::new(5, 9)));
        for pos in &path[1..] {
            assert!(grid.get(*pos).unwrap().walk_index() <= OVERWORLD_MAX_WALK);
        }
    }

    #[test]
    fn test_same_start_and_goal() {
        let grid: Grid<OverworldTile> = Grid::new(4, 4).unwrap();
        let path = find_path(
            &grid,
            Position::new(0, 0),
            Position::new(0, 0),
            OVERWORLD_MAX_WALK,
        );
        assert_eq!(path, vec![Position::new(0, 0)]);
    }

    #[test]
    fn test_out_of_bounds_endpoints() {
        let grid: Grid<OverworldTile> = Grid::new(4, 4).unwrap();
        assert!(find_path(
            &grid,
            Position::new(-1, 0),
            Position::new(2, 2),
            OVERWORLD_MAX_WALK
        )
        .is_empty());
        assert!(find_path(
            &grid,
            Position::new(0, 0),
            Position::new(4, 4),
            OVERWORLD_MAX_WALK
        )
        .is_empty());
    }

    #[test]
    fn test_waypoints_are_contiguous() {
        let grid: Grid<OverworldTile> = Grid::new(12, 12).unwrap();
        let path = find_path(
            &grid,
            Position::new(2, 3),
            Position::new(9, 10),
            OVERWORLD_MAX_WALK,
        );
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }
}
