//! # Interior Digger
//!
//! Carves room-and-corridor layouts for building floors and cave levels.
//!
//! The digger spends a bounded retry budget laying out non-overlapping
//! rooms joined by corridors until a dig budget (a fraction of the grid
//! area) is met, then infers walls around everything dug and carves the
//! stairs. Exhausting the budget surfaces [`crate::VeldtError::GenerationFailed`];
//! callers treat that as a skippable, logged outcome, never a crash.

use crate::world::{Floor, Footprint, Grid, InteriorTile, Position};
use crate::{VeldtError, VeldtResult};
use log::warn;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::BTreeSet;

/// Tunables for digging one interior floor.
#[derive(Debug, Clone)]
pub struct InteriorConfig {
    /// Floor width in tiles
    pub width: u32,
    /// Floor height in tiles
    pub height: u32,
    /// Smallest room edge length
    pub min_room: u32,
    /// Largest room edge length
    pub max_room: u32,
    /// Shortest corridor between rooms
    pub min_corridor: u32,
    /// Longest corridor between rooms
    pub max_corridor: u32,
    /// Fraction of the grid area to dig before stopping
    pub dig_budget: f64,
    /// Attempts before the layout is abandoned
    pub max_attempts: u32,
}

impl InteriorConfig {
    /// Creates the default digging configuration for a floor of the given
    /// size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            min_room: 3,
            max_room: 7,
            min_corridor: 2,
            max_corridor: 5,
            dig_budget: 0.25,
            max_attempts: crate::config::DIG_RETRY_BUDGET,
        }
    }

    /// Creates a small configuration for testing.
    pub fn for_testing() -> Self {
        Self {
            width: 20,
            height: 16,
            min_room: 2,
            max_room: 4,
            min_corridor: 1,
            max_corridor: 3,
            dig_budget: 0.2,
            max_attempts: crate::config::DIG_RETRY_BUDGET,
        }
    }
}

/// Digs one interior floor.
///
/// Terminal floors get only the upward exit; every other floor also gets a
/// downward exit on a different tile.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use veldt::{dig_floor, InteriorConfig, InteriorTile};
///
/// let mut rng = StdRng::seed_from_u64(11);
/// let floor = dig_floor(&InteriorConfig::for_testing(), true, &mut rng).unwrap();
/// assert_eq!(floor.grid.get(floor.up_stairs), Some(InteriorTile::Stairs));
/// ```
pub fn dig_floor(config: &InteriorConfig, terminal: bool, rng: &mut StdRng) -> VeldtResult<Floor> {
    if config.width == 0 || config.height == 0 {
        return Err(VeldtError::InvalidDimensions {
            width: config.width as i64,
            height: config.height as i64,
        });
    }
    if config.min_room > config.max_room || config.min_corridor > config.max_corridor {
        return Err(VeldtError::InvalidState(format!(
            "inverted digging bounds: rooms {}..={}, corridors {}..={}",
            config.min_room, config.max_room, config.min_corridor, config.max_corridor
        )));
    }

    let mut grid = Grid::filled(config.width, config.height, InteriorTile::Nothing)?;
    let mut rooms: Vec<(Position, Footprint)> = Vec::new();
    let area = (config.width * config.height) as usize;
    let target_dug = ((area as f64 * config.dig_budget) as usize).max(1);
    let mut dug = 0usize;

    for _attempt in 0..config.max_attempts {
        if !rooms.is_empty() && dug >= target_dug {
            break;
        }
        if rooms.is_empty() {
            if let Some((anchor, footprint)) = random_room(config, rng) {
                carve_room(&mut grid, anchor, footprint);
                dug += (footprint.width * footprint.height) as usize;
                rooms.push((anchor, footprint));
            }
        } else if let Some(addition) = try_extend(config, &grid, &rooms, rng) {
            let Extension {
                corridor,
                anchor,
                footprint,
            } = addition;
            for pos in &corridor {
                let _ = grid.set(*pos, InteriorTile::Ground);
            }
            carve_room(&mut grid, anchor, footprint);
            dug += corridor.len() + (footprint.width * footprint.height) as usize;
            rooms.push((anchor, footprint));
        }
    }

    if rooms.is_empty() {
        return Err(VeldtError::GenerationFailed(format!(
            "no room layout fits a {}x{} floor within {} attempts",
            config.width, config.height, config.max_attempts
        )));
    }

    infer_walls(&mut grid);

    let ground = grid.indices_of(InteriorTile::Ground);
    let up_index = ground[rng.gen_range(0..ground.len())];
    let up_stairs = grid.coordinate_of(up_index);
    grid.set(up_stairs, InteriorTile::Stairs)?;

    let down_stairs = if terminal {
        None
    } else {
        let remaining: Vec<usize> = ground.into_iter().filter(|&i| i != up_index).collect();
        if remaining.is_empty() {
            warn!("floor too small for a downward exit, leaving it out");
            None
        } else {
            let down = grid.coordinate_of(remaining[rng.gen_range(0..remaining.len())]);
            grid.set(down, InteriorTile::Stairs)?;
            Some(down)
        }
    };

    Ok(Floor {
        grid,
        position: up_stairs,
        characters: Vec::new(),
        up_stairs,
        down_stairs,
        visited: BTreeSet::new(),
    })
}

struct Extension {
    corridor: Vec<Position>,
    anchor: Position,
    footprint: Footprint,
}

/// Picks a random room rectangle that fits the grid, if any can.
fn random_room(config: &InteriorConfig, rng: &mut StdRng) -> Option<(Position, Footprint)> {
    if config.min_room > config.width || config.min_room > config.height {
        return None;
    }
    let w = rng.gen_range(config.min_room..=config.max_room.min(config.width));
    let h = rng.gen_range(config.min_room..=config.max_room.min(config.height));
    let x = rng.gen_range(0..=(config.width - w)) as i32;
    let y = rng.gen_range(0..=(config.height - h)) as i32;
    Some((Position::new(x, y), Footprint::new(w, h)))
}

/// Attempts to grow the layout: a corridor out of a random existing room's
/// edge, ending at a fresh room. Returns `None` when the candidate leaves
/// the grid or collides with an existing room.
fn try_extend(
    config: &InteriorConfig,
    grid: &Grid<InteriorTile>,
    rooms: &[(Position, Footprint)],
    rng: &mut StdRng,
) -> Option<Extension> {
    let (source_anchor, source) = rooms[rng.gen_range(0..rooms.len())];
    let (dx, dy) = [(0, -1), (0, 1), (-1, 0), (1, 0)][rng.gen_range(0..4)];
    let length = rng.gen_range(config.min_corridor..=config.max_corridor) as i32;

    // Corridor leaves from the middle of the chosen edge, one tile out.
    let mid_x = source_anchor.x + source.width as i32 / 2;
    let mid_y = source_anchor.y + source.height as i32 / 2;
    let start = match (dx, dy) {
        (1, 0) => Position::new(source_anchor.x + source.width as i32, mid_y),
        (-1, 0) => Position::new(source_anchor.x - 1, mid_y),
        (0, 1) => Position::new(mid_x, source_anchor.y + source.height as i32),
        _ => Position::new(mid_x, source_anchor.y - 1),
    };
    let mut corridor = Vec::with_capacity(length as usize);
    for i in 0..length {
        let pos = Position::new(start.x + dx * i, start.y + dy * i);
        if !grid.contains(pos) {
            return None;
        }
        corridor.push(pos);
    }

    let w = rng.gen_range(config.min_room..=config.max_room);
    let h = rng.gen_range(config.min_room..=config.max_room);
    let footprint = Footprint::new(w, h);
    let end = corridor.last().copied()?;
    // Anchor the new room so the corridor meets the middle of its near edge.
    let anchor = match (dx, dy) {
        (1, 0) => Position::new(end.x + 1, end.y - h as i32 / 2),
        (-1, 0) => Position::new(end.x - w as i32, end.y - h as i32 / 2),
        (0, 1) => Position::new(end.x - w as i32 / 2, end.y + 1),
        _ => Position::new(end.x - w as i32 / 2, end.y - h as i32),
    };

    let far_corner = Position::new(anchor.x + w as i32 - 1, anchor.y + h as i32 - 1);
    if !grid.contains(anchor) || !grid.contains(far_corner) {
        return None;
    }
    // Keep a one-tile gap so every room gets its own walls.
    let padded_anchor = Position::new(anchor.x - 1, anchor.y - 1);
    let padded = Footprint::new(w + 2, h + 2);
    if rooms
        .iter()
        .any(|&(other_anchor, other)| padded.intersects(padded_anchor, other, other_anchor))
    {
        return None;
    }

    Some(Extension {
        corridor,
        anchor,
        footprint,
    })
}

fn carve_room(grid: &mut Grid<InteriorTile>, anchor: Position, footprint: Footprint) {
    for pos in footprint.tiles(anchor) {
        let _ = grid.set(pos, InteriorTile::Ground);
    }
}

/// Converts every untouched cell 8-adjacent to dug ground into a wall.
fn infer_walls(grid: &mut Grid<InteriorTile>) {
    let mut walls = Vec::new();
    for (pos, tile) in grid.iter() {
        if tile != InteriorTile::Nothing {
            continue;
        }
        let touches_ground = grid
            .surrounding_indices(pos, 1, true)
            .into_iter()
            .any(|i| grid.get_index(i) == Some(InteriorTile::Ground));
        if touches_ground {
            walls.push(pos);
        }
    }
    for pos in walls {
        let _ = grid.set(pos, InteriorTile::Wall);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_digs_a_walkable_floor() {
        let config = InteriorConfig::for_testing();
        let floor = dig_floor(&config, false, &mut rng(1)).unwrap();
        assert!(floor.grid.count(InteriorTile::Ground) > 0);
        assert_eq!(floor.grid.get(floor.up_stairs), Some(InteriorTile::Stairs));
        let down = floor.down_stairs.expect("non-terminal floor needs a way down");
        assert_ne!(down, floor.up_stairs);
        assert_eq!(floor.grid.get(down), Some(InteriorTile::Stairs));
    }

    #[test]
    fn test_terminal_floor_has_no_down_stairs() {
        let config = InteriorConfig::for_testing();
        let floor = dig_floor(&config, true, &mut rng(2)).unwrap();
        assert!(floor.down_stairs.is_none());
    }

    #[test]
    fn test_walls_wrap_all_ground() {
        let config = InteriorConfig::for_testing();
        let floor = dig_floor(&config, true, &mut rng(3)).unwrap();
        for (pos, tile) in floor.grid.iter() {
            if tile != InteriorTile::Nothing {
                continue;
            }
            let touches_dug = floor
                .grid
                .surrounding_indices(pos, 1, true)
                .into_iter()
                .any(|i| {
                    matches!(
                        floor.grid.get_index(i),
                        Some(InteriorTile::Ground) | Some(InteriorTile::Stairs)
                    )
                });
            assert!(!touches_dug, "untouched cell at {:?} borders dug space", pos);
        }
    }

    #[test]
    fn test_impossible_layout_fails_gracefully() {
        let config = InteriorConfig {
            width: 1,
            height: 1,
            min_room: 2,
            max_room: 2,
            min_corridor: 1,
            max_corridor: 1,
            dig_budget: 0.5,
            max_attempts: crate::config::DIG_RETRY_BUDGET,
        };
        let result = dig_floor(&config, true, &mut rng(4));
        assert!(matches!(result, Err(VeldtError::GenerationFailed(_))));
    }

    #[test]
    fn test_inverted_bounds_are_fatal() {
        let mut config = InteriorConfig::for_testing();
        config.min_room = 5;
        config.max_room = 4;
        assert!(matches!(
            dig_floor(&config, true, &mut rng(7)),
            Err(VeldtError::InvalidState(_))
        ));

        let mut config = InteriorConfig::for_testing();
        config.min_corridor = 4;
        config.max_corridor = 2;
        assert!(matches!(
            dig_floor(&config, true, &mut rng(8)),
            Err(VeldtError::InvalidState(_))
        ));
    }

    #[test]
    fn test_zero_dimensions_are_fatal() {
        let mut config = InteriorConfig::for_testing();
        config.width = 0;
        assert!(matches!(
            dig_floor(&config, true, &mut rng(5)),
            Err(VeldtError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_position_rests_on_stairs() {
        let config = InteriorConfig::for_testing();
        let floor = dig_floor(&config, false, &mut rng(6)).unwrap();
        assert_eq!(floor.position, floor.up_stairs);
    }
}
