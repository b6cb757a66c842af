//! # Tile Type Sets
//!
//! The two closed tile vocabularies: one for the overworld, one for
//! building floors and cave levels. Discriminant values double as the
//! walkability ordering: a mover with a maximum walk index of `n` may stand
//! on any tile whose index is `<= n`.

use serde::{Deserialize, Serialize};

/// Common behavior shared by both tile vocabularies.
///
/// Grids, the pathfinder, and the movement validator are generic over this
/// trait so interiors and the overworld share one code path.
pub trait TileKind:
    Copy + Clone + PartialEq + Eq + std::fmt::Debug + Serialize + for<'de> Deserialize<'de>
{
    /// The tile a freshly created grid is filled with.
    const BASE: Self;

    /// Position of this tile in the walkability ordering.
    fn walk_index(self) -> u8;

    /// Whether this tile is untouched/void space.
    fn is_nothing(self) -> bool;
}

/// Walk threshold that ignores terrain entirely (forced-path fallback).
pub const WALK_ANY: u8 = u8::MAX;

/// Overworld tile types, ordered by walkability.
///
/// Everything up to and including [`OverworldTile::CaveEntrance`] is
/// passable for an ordinary mover; water becomes passable only when the
/// mover's profile raises its threshold (e.g. water-walking footwear).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OverworldTile {
    Ground = 0,
    Grass = 1,
    Sand = 2,
    Road = 3,
    CaveEntrance = 4,
    Water = 5,
    Mountain = 6,
    Tree = 7,
    Nothing = 8,
}

/// Highest walk index an ordinary overworld mover may stand on.
pub const OVERWORLD_MAX_WALK: u8 = OverworldTile::CaveEntrance as u8;

/// Walk index granted by water-walking footwear.
pub const OVERWORLD_WATER_WALK: u8 = OverworldTile::Water as u8;

impl TileKind for OverworldTile {
    const BASE: Self = OverworldTile::Ground;

    fn walk_index(self) -> u8 {
        self as u8
    }

    fn is_nothing(self) -> bool {
        self == OverworldTile::Nothing
    }
}

impl OverworldTile {
    /// All members of the overworld tile set.
    pub fn all() -> [OverworldTile; 9] {
        [
            OverworldTile::Ground,
            OverworldTile::Grass,
            OverworldTile::Sand,
            OverworldTile::Road,
            OverworldTile::CaveEntrance,
            OverworldTile::Water,
            OverworldTile::Mountain,
            OverworldTile::Tree,
            OverworldTile::Nothing,
        ]
    }

    /// Tiles structures may be founded on.
    pub fn structure_whitelist() -> [OverworldTile; 3] {
        [
            OverworldTile::Ground,
            OverworldTile::Grass,
            OverworldTile::Sand,
        ]
    }
}

/// Building floor / cave level tile types, ordered by walkability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum InteriorTile {
    Ground = 0,
    Stairs = 1,
    Wall = 2,
    Nothing = 3,
}

/// Highest walk index an interior mover may stand on.
pub const INTERIOR_MAX_WALK: u8 = InteriorTile::Stairs as u8;

impl TileKind for InteriorTile {
    const BASE: Self = InteriorTile::Nothing;

    fn walk_index(self) -> u8 {
        self as u8
    }

    fn is_nothing(self) -> bool {
        self == InteriorTile::Nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overworld_walk_ordering() {
        assert!(OverworldTile::Ground.walk_index() <= OVERWORLD_MAX_WALK);
        assert!(OverworldTile::Road.walk_index() <= OVERWORLD_MAX_WALK);
        assert!(OverworldTile::CaveEntrance.walk_index() <= OVERWORLD_MAX_WALK);
        assert!(OverworldTile::Water.walk_index() > OVERWORLD_MAX_WALK);
        assert!(OverworldTile::Water.walk_index() <= OVERWORLD_WATER_WALK);
        assert!(OverworldTile::Mountain.walk_index() > OVERWORLD_WATER_WALK);
    }

    #[test]
    fn test_interior_walk_ordering() {
        assert!(InteriorTile::Ground.walk_index() <= INTERIOR_MAX_WALK);
        assert!(InteriorTile::Stairs.walk_index() <= INTERIOR_MAX_WALK);
        assert!(InteriorTile::Wall.walk_index() > INTERIOR_MAX_WALK);
    }

    #[test]
    fn test_nothing_tiles() {
        assert!(OverworldTile::Nothing.is_nothing());
        assert!(!OverworldTile::Ground.is_nothing());
        assert!(InteriorTile::Nothing.is_nothing());
        assert!(!InteriorTile::Wall.is_nothing());
    }

    #[test]
    fn test_walk_any_admits_everything() {
        for tile in OverworldTile::all() {
            assert!(tile.walk_index() <= WALK_ANY);
        }
    }
}
