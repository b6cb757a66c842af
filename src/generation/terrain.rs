//! # Terrain Synthesis
//!
//! Seed-and-grow painting of the overworld: scatter feature seed cells,
//! grow them into organic blobs, then run the beachify, afforest, and
//! cleanup passes.
//!
//! Feature *counts* come from the world seed and reproduce exactly; the
//! blob *shapes* come from the caller's free-running RNG and do not. Two
//! worlds from one seed share feature counts but not coastlines.

use crate::generation::{GenerationConfig, WorldSeed};
use crate::world::{Grid, OverworldTile, Position};
use crate::VeldtResult;
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Hash offsets per feature, fixed so counts stay stable across versions.
const WATER_COUNT_OFFSET: usize = 0;
const GRASS_COUNT_OFFSET: usize = 4;
const MOUNTAIN_COUNT_OFFSET: usize = 8;
const BEACH_RADIUS_OFFSET: usize = 12;

/// Synthesizes the overworld terrain grid.
///
/// Features are painted in a fixed order (water, grass, mountain) so later
/// features may overwrite earlier ones at blob boundaries.
pub fn synthesize_terrain(
    config: &GenerationConfig,
    seed: &WorldSeed,
    rng: &mut StdRng,
) -> VeldtResult<Grid<OverworldTile>> {
    config.validate()?;
    let mut grid = Grid::filled(config.width, config.height, OverworldTile::Ground)?;

    let features = [
        (OverworldTile::Water, config.water_seed_divisor, WATER_COUNT_OFFSET),
        (OverworldTile::Grass, config.grass_seed_divisor, GRASS_COUNT_OFFSET),
        (OverworldTile::Mountain, config.mountain_seed_divisor, MOUNTAIN_COUNT_OFFSET),
    ];
    for (tile, divisor, offset) in features {
        let count = seeded_feature_count(config, seed, divisor, offset);
        let planted = scatter_seeds(&mut grid, tile, count, rng);
        grow(&mut grid, tile, config.growth_iterations, config.growth_chance, rng);
        debug!(
            "terrain: {:?} planted {} of {} seeds, grew {} iterations",
            tile, planted, count, config.growth_iterations
        );
    }

    let beach_radius = 1 + seed.count_at(BEACH_RADIUS_OFFSET, 2) % 2;
    beachify(&mut grid, beach_radius, config.beach_chance, rng);
    afforest(&mut grid, config.tree_fraction, rng);
    cleanup(&mut grid);

    Ok(grid)
}

/// Number of seed cells for one feature: proportional to the grid area and
/// scaled by a hash-derived term. Pure function of seed and config.
pub fn seeded_feature_count(
    config: &GenerationConfig,
    seed: &WorldSeed,
    divisor: u32,
    offset: usize,
) -> u32 {
    let base = (config.area() / divisor).max(1);
    base + seed.count_at(offset, 2) % base
}

/// Plants up to `count` seed cells of `tile` on distinct cells not already
/// holding it. Returns how many were actually planted; a crowded grid may
/// plant fewer, never more.
pub fn scatter_seeds(
    grid: &mut Grid<OverworldTile>,
    tile: OverworldTile,
    count: u32,
    rng: &mut StdRng,
) -> u32 {
    let mut planted = 0;
    let mut attempts = 0;
    let max_attempts = count.saturating_mul(10).max(16);
    while planted < count && attempts < max_attempts {
        attempts += 1;
        let pos = Position::new(
            rng.gen_range(0..grid.width() as i32),
            rng.gen_range(0..grid.height() as i32),
        );
        if grid.get(pos) != Some(tile) {
            let _ = grid.set(pos, tile);
            planted += 1;
        }
    }
    planted
}

/// Runs `iterations` growth passes for one tile type. Each pass visits
/// every cell of that type and converts each of its 8 neighbors with
/// probability `chance`, producing organic non-rectangular blobs.
pub fn grow(
    grid: &mut Grid<OverworldTile>,
    tile: OverworldTile,
    iterations: u32,
    chance: f64,
    rng: &mut StdRng,
) {
    for _ in 0..iterations {
        // Snapshot first so growth from this pass does not cascade within it.
        let current = grid.indices_of(tile);
        for index in current {
            let pos = grid.coordinate_of(index);
            for neighbor in grid.surrounding_indices(pos, 1, true) {
                if grid.get_index(neighbor) != Some(tile) && rng.gen_bool(chance) {
                    let _ = grid.set_index(neighbor, tile);
                }
            }
        }
    }
}

/// Converts ground cells near water into sand so coastlines read
/// naturally. `radius` controls how far inland the beach may reach.
pub fn beachify(grid: &mut Grid<OverworldTile>, radius: u32, chance: f64, rng: &mut StdRng) {
    let ground = grid.indices_of(OverworldTile::Ground);
    for index in ground {
        let pos = grid.coordinate_of(index);
        let coastal = grid
            .surrounding_indices(pos, radius, true)
            .into_iter()
            .any(|i| grid.get_index(i) == Some(OverworldTile::Water));
        if coastal && rng.gen_bool(chance) {
            let _ = grid.set_index(index, OverworldTile::Sand);
        }
    }
}

/// Converts a fraction of grass cells into trees.
pub fn afforest(grid: &mut Grid<OverworldTile>, fraction: f64, rng: &mut StdRng) {
    let grass = grid.indices_of(OverworldTile::Grass);
    for index in grass {
        if rng.gen_bool(fraction) {
            let _ = grid.set_index(index, OverworldTile::Tree);
        }
    }
}

/// Reassigns isolated non-edge cells. A cell matching none of its four
/// orthogonal neighbors is noise: grass becomes tree (an isolated grass
/// tile reads oddly), anything else takes its left neighbor's value.
pub fn cleanup(grid: &mut Grid<OverworldTile>) {
    for y in 1..grid.height() as i32 - 1 {
        for x in 1..grid.width() as i32 - 1 {
            let pos = Position::new(x, y);
            let tile = match grid.get(pos) {
                Some(t) => t,
                None => continue,
            };
            let neighbors = grid.neighbors(pos);
            let isolated = [neighbors.left, neighbors.right, neighbors.above, neighbors.below]
                .into_iter()
                .flatten()
                .all(|n| n != tile);
            if isolated {
                let replacement = if tile == OverworldTile::Grass {
                    OverworldTile::Tree
                } else {
                    neighbors.left.unwrap_or(tile)
                };
                let _ = grid.set(pos, replacement);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_zero_growth_keeps_exact_seed_count() {
        let mut grid = Grid::filled(16, 16, OverworldTile::Ground).unwrap();
        let planted = scatter_seeds(&mut grid, OverworldTile::Water, 12, &mut rng());
        grow(&mut grid, OverworldTile::Water, 0, 0.3, &mut rng());
        assert_eq!(grid.count(OverworldTile::Water) as u32, planted);
        assert_eq!(planted, 12);
    }

    #[test]
    fn test_growth_only_adds() {
        let mut grid = Grid::filled(16, 16, OverworldTile::Ground).unwrap();
        scatter_seeds(&mut grid, OverworldTile::Water, 5, &mut rng());
        let before = grid.count(OverworldTile::Water);
        grow(&mut grid, OverworldTile::Water, 4, 0.3, &mut rng());
        assert!(grid.count(OverworldTile::Water) >= before);
    }

    #[test]
    fn test_feature_counts_are_seed_deterministic() {
        let config = GenerationConfig::for_testing();
        let seed = WorldSeed::new("d41d8cd98f00b204e9800998ecf8427e").unwrap();
        let a = seeded_feature_count(&config, &seed, config.water_seed_divisor, 0);
        let b = seeded_feature_count(&config, &seed, config.water_seed_divisor, 0);
        assert_eq!(a, b);
        assert!(a >= 1);
    }

    #[test]
    fn test_beachify_touches_only_coastal_ground() {
        let mut grid = Grid::filled(9, 9, OverworldTile::Ground).unwrap();
        grid.set(Position::new(4, 4), OverworldTile::Water).unwrap();
        // Full chance so every coastal cell converts.
        beachify(&mut grid, 1, 1.0, &mut rng());
        assert_eq!(grid.get(Position::new(4, 3)), Some(OverworldTile::Sand));
        assert_eq!(grid.get(Position::new(0, 0)), Some(OverworldTile::Ground));
        assert_eq!(grid.get(Position::new(4, 4)), Some(OverworldTile::Water));
    }

    #[test]
    fn test_afforest_converts_only_grass() {
        let mut grid = Grid::filled(8, 8, OverworldTile::Grass).unwrap();
        grid.set(Position::new(0, 0), OverworldTile::Water).unwrap();
        afforest(&mut grid, 1.0, &mut rng());
        assert_eq!(grid.count(OverworldTile::Tree), 63);
        assert_eq!(grid.get(Position::new(0, 0)), Some(OverworldTile::Water));
    }

    #[test]
    fn test_cleanup_reassigns_isolated_cells() {
        let mut grid = Grid::filled(5, 5, OverworldTile::Ground).unwrap();
        grid.set(Position::new(2, 2), OverworldTile::Water).unwrap();
        cleanup(&mut grid);
        assert_eq!(grid.get(Position::new(2, 2)), Some(OverworldTile::Ground));

        let mut grid = Grid::filled(5, 5, OverworldTile::Ground).unwrap();
        grid.set(Position::new(2, 2), OverworldTile::Grass).unwrap();
        cleanup(&mut grid);
        assert_eq!(grid.get(Position::new(2, 2)), Some(OverworldTile::Tree));
    }

    #[test]
    fn test_cleanup_leaves_edges_alone() {
        let mut grid = Grid::filled(5, 5, OverworldTile::Ground).unwrap();
        grid.set(Position::new(0, 0), OverworldTile::Water).unwrap();
        cleanup(&mut grid);
        assert_eq!(grid.get(Position::new(0, 0)), Some(OverworldTile::Water));
    }

    #[test]
    fn test_synthesize_produces_valid_tiles() {
        let config = GenerationConfig::for_testing();
        let seed = WorldSeed::new("d41d8cd98f00b204e9800998ecf8427e").unwrap();
        let grid = synthesize_terrain(&config, &seed, &mut rng()).unwrap();
        assert_eq!(grid.len(), config.area() as usize);
        for (_, tile) in grid.iter() {
            assert!(OverworldTile::all().contains(&tile));
        }
    }
}
