//! # Veldt
//!
//! Procedural overworld generation and navigation for a tile-based RPG.
//!
//! ## Architecture Overview
//!
//! Veldt is the world-building core of the game: everything between "a seed
//! string" and "a walkable, populated tile world". The surrounding
//! application (rendering, battles, save files, UI) consumes the structures
//! produced here through narrow boundary types.
//!
//! - **World Model**: flat tile grids, environments (overworld, building
//!   floors, cave levels), placed objects, and the occupancy ledger
//! - **Generation System**: seeded terrain synthesis, room-and-corridor
//!   digging for interiors, collision-free object placement, and
//!   zone/city connectivity with a guaranteed walkable route
//! - **Navigation System**: grid pathfinding and per-tick movement
//!   validation with collision hit-testing
//! - **Render Boundary**: the read-only scene view handed to an external
//!   pixel baker, bakeable one row at a time
//!
//! Generation is synchronous, single-threaded, CPU-bound work; callers that
//! need to keep a frame loop responsive drive the baking boundary
//! incrementally instead.

pub mod generation;
pub mod nav;
pub mod render;
pub mod world;

pub use generation::{
    dig_floor, place_ring_group, reserve_footprint, synthesize_terrain, GeneratedWorld,
    GenerationConfig, InteriorConfig, RingPlan, WorldGenerator, WorldSeed,
};
pub use nav::{find_path, hit_test_floor, hit_test_world, Collision, Mover, MoverProfile,
    StairKind, StepOutcome};
pub use render::{BakeScene, EnvironmentBaker, RowChunks};
pub use world::{
    Axis, Building, BuildingKind, Character, CharacterKind, Direction, EntityId, EnvironmentKind,
    Floor, Footprint, Grid, InteriorTile, Neighbors, OverworldTile, Position, PositionLedger,
    Shop, ShopKind, TileKind, World, Zone,
};

/// Core error type for the Veldt world engine.
#[derive(thiserror::Error, Debug)]
pub enum VeldtError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Seed string is missing or malformed
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// Requested grid dimensions are unusable
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    /// World state is internally inconsistent
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generation failed after exhausting its retry budget
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Veldt codebase.
pub type VeldtResult<T> = Result<T, VeldtError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// World-building configuration constants.
pub mod config {
    /// Default overworld width in tiles
    pub const DEFAULT_WORLD_WIDTH: u32 = 96;

    /// Default overworld height in tiles
    pub const DEFAULT_WORLD_HEIGHT: u32 = 96;

    /// Retry budget for interior floor digging
    pub const DIG_RETRY_BUDGET: u32 = 255;

    /// Expansions attempted by the nearest-free placement search
    pub const PLACEMENT_EXPANSIONS: i32 = 5;

    /// Corridor padding carved around connectivity waypoints, in tiles
    pub const CORRIDOR_PADDING: i32 = 2;

    /// Fraction of grass converted to trees by the afforest pass
    pub const TREE_FRACTION: f64 = 0.1;

    /// Probability gate used by terrain growth and beach conversion
    pub const GROWTH_CHANCE: f64 = 0.3;
}
