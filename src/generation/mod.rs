//! # Generation Module
//!
//! Everything between a seed string and a finished, walkable world:
//! terrain synthesis, interior digging, collision-free object placement,
//! and zone/city connectivity.
//!
//! Generation is synchronous and single-threaded. Retryable failures
//! (a floor that will not lay out, a group that will not fit) are logged
//! and degrade the result; only bad preconditions (malformed seed,
//! zero-sized grids) fail loudly at the entry point.

pub mod interior;
pub mod placement;
pub mod seed;
pub mod terrain;
pub mod zones;

pub use interior::{dig_floor, InteriorConfig};
pub use placement::{place_ring_group, reserve_footprint, RingPlan};
pub use seed::WorldSeed;
pub use terrain::synthesize_terrain;
pub use zones::{GeneratedWorld, WorldGenerator};

use crate::{VeldtError, VeldtResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Tunables for world generation.
///
/// Controls grid size, terrain feature density, growth behavior, and
/// zone/structure placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Overworld width in tiles
    pub width: u32,
    /// Overworld height in tiles
    pub height: u32,
    /// Growth iterations applied to each terrain feature
    pub growth_iterations: u32,
    /// Chance that a neighbor cell converts during one growth visit
    pub growth_chance: f64,
    /// One water seed cell per this many tiles
    pub water_seed_divisor: u32,
    /// One grass seed cell per this many tiles
    pub grass_seed_divisor: u32,
    /// One mountain seed cell per this many tiles
    pub mountain_seed_divisor: u32,
    /// Chance that a coastal ground cell becomes sand
    pub beach_chance: f64,
    /// Fraction of grass converted to trees
    pub tree_fraction: f64,
    /// Minimum number of zones (cities), center zone included
    pub min_zones: u32,
    /// Maximum number of zones
    pub max_zones: u32,
    /// Smallest zone edge length
    pub zone_min_size: u32,
    /// Largest zone edge length
    pub zone_max_size: u32,
    /// Spacing enforced between zone bounding boxes
    pub zone_padding: i32,
    /// Buildings attempted per zone
    pub buildings_per_zone: u32,
    /// Shops attempted per zone
    pub shops_per_zone: u32,
    /// Most floors a building may have
    pub max_floors: u32,
    /// Smallest connected water region eligible for the secret island
    pub island_min_water: usize,
}

impl GenerationConfig {
    /// Creates the default configuration for a grid of the given size.
    ///
    /// # Examples
    ///
    /// ```
    /// use veldt::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(96, 96);
    /// assert!(config.validate().is_ok());
    /// assert!(GenerationConfig::new(0, 96).validate().is_err());
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            growth_iterations: 6,
            growth_chance: crate::config::GROWTH_CHANCE,
            water_seed_divisor: 400,
            grass_seed_divisor: 300,
            mountain_seed_divisor: 600,
            beach_chance: crate::config::GROWTH_CHANCE,
            tree_fraction: crate::config::TREE_FRACTION,
            min_zones: 2,
            max_zones: 5,
            zone_min_size: 10,
            zone_max_size: 16,
            zone_padding: 2,
            buildings_per_zone: 4,
            shops_per_zone: 3,
            max_floors: 3,
            island_min_water: 60,
        }
    }

    /// Creates a configuration for testing with a small, quick world.
    pub fn for_testing() -> Self {
        Self {
            width: 48,
            height: 48,
            growth_iterations: 3,
            growth_chance: crate::config::GROWTH_CHANCE,
            water_seed_divisor: 200,
            grass_seed_divisor: 150,
            mountain_seed_divisor: 300,
            beach_chance: crate::config::GROWTH_CHANCE,
            tree_fraction: crate::config::TREE_FRACTION,
            min_zones: 2,
            max_zones: 3,
            zone_min_size: 7,
            zone_max_size: 10,
            zone_padding: 2,
            buildings_per_zone: 2,
            shops_per_zone: 1,
            max_floors: 2,
            island_min_water: 25,
        }
    }

    /// Checks the fatal generation preconditions.
    pub fn validate(&self) -> VeldtResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VeldtError::InvalidDimensions {
                width: self.width as i64,
                height: self.height as i64,
            });
        }
        Ok(())
    }

    /// Total tile count of the configured grid.
    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_WORLD_WIDTH,
            crate::config::DEFAULT_WORLD_HEIGHT,
        )
    }
}

/// Creates a free-running RNG seeded from the world seed, for callers that
/// want repeatable shapes (tests mostly; the game seeds from entropy).
pub fn create_rng(seed: &WorldSeed) -> StdRng {
    StdRng::seed_from_u64(seed.rng_seed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_sane() {
        let config = GenerationConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.min_zones <= config.max_zones);
        assert!(config.zone_min_size <= config.zone_max_size);
        assert!(config.growth_chance > 0.0 && config.growth_chance < 1.0);
    }

    #[test]
    fn test_config_rejects_degenerate_dimensions() {
        let mut config = GenerationConfig::new(0, 40);
        assert!(config.validate().is_err());
        config.width = 40;
        config.height = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_create_rng_repeatable() {
        use rand::Rng;
        let seed = WorldSeed::new("deadbeef").unwrap();
        let mut a = create_rng(&seed);
        let mut b = create_rng(&seed);
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }
}
