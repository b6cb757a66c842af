//! # Environment Structures
//!
//! The overworld, buildings and their floors, placed objects, generation
//! zones, and the occupancy ledger. Everything here except [`Zone`] and
//! [`PositionLedger`] is part of the persisted save-file contract and
//! round-trips losslessly through JSON.

use crate::world::{
    new_entity_id, EntityId, Grid, InteriorTile, OverworldTile, Position,
};
use crate::VeldtResult;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Tag distinguishing the kinds of walkable environments.
///
/// Behavior differences between environments dispatch on this enum so a new
/// environment kind is a compile-time-checked addition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvironmentKind {
    Overworld,
    BuildingFloor,
    CaveLevel,
}

/// A rectangular tile footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Every tile covered when anchored at `anchor` (top-left).
    pub fn tiles(self, anchor: Position) -> Vec<Position> {
        let mut tiles = Vec::with_capacity((self.width * self.height) as usize);
        for dy in 0..self.height as i32 {
            for dx in 0..self.width as i32 {
                tiles.push(Position::new(anchor.x + dx, anchor.y + dy));
            }
        }
        tiles
    }

    /// Axis-aligned rectangle intersection test between two anchored
    /// footprints.
    pub fn intersects(self, anchor: Position, other: Footprint, other_anchor: Position) -> bool {
        !(anchor.x >= other_anchor.x + other.width as i32
            || other_anchor.x >= anchor.x + self.width as i32
            || anchor.y >= other_anchor.y + other.height as i32
            || other_anchor.y >= anchor.y + self.height as i32)
    }

    /// Whether a position falls inside the anchored footprint.
    pub fn contains(self, anchor: Position, pos: Position) -> bool {
        pos.x >= anchor.x
            && pos.y >= anchor.y
            && pos.x < anchor.x + self.width as i32
            && pos.y < anchor.y + self.height as i32
    }
}

/// Kinds of characters that can stand on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterKind {
    Villager,
    Merchant,
    Monster,
}

/// A character placed in an environment: the player, villagers, merchants,
/// and the monsters the battle collaborator takes over on collision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub kind: CharacterKind,
    pub position: Position,
    pub footprint: Footprint,
    pub hostile: bool,
}

impl Character {
    pub fn new(kind: CharacterKind, position: Position) -> Self {
        Self {
            id: new_entity_id(),
            kind,
            position,
            footprint: Footprint::new(1, 1),
            hostile: kind == CharacterKind::Monster,
        }
    }

    /// Whether this character's footprint covers a tile.
    pub fn covers(&self, pos: Position) -> bool {
        self.footprint.contains(self.position, pos)
    }
}

/// Kinds of shops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopKind {
    General,
    Weapons,
    Inn,
}

/// A shop placed on the overworld.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub kind: ShopKind,
    pub position: Position,
    pub footprint: Footprint,
}

impl Shop {
    /// Standard shop footprint in tiles.
    pub const FOOTPRINT: Footprint = Footprint {
        width: 2,
        height: 2,
    };

    pub fn new(kind: ShopKind, position: Position) -> Self {
        Self {
            kind,
            position,
            footprint: Self::FOOTPRINT,
        }
    }

    /// The tile a mover steps onto to enter: the bottom-left corner.
    pub fn door(&self) -> Position {
        Position::new(
            self.position.x,
            self.position.y + self.footprint.height as i32 - 1,
        )
    }

    pub fn covers(&self, pos: Position) -> bool {
        self.footprint.contains(self.position, pos)
    }
}

/// Kinds of buildings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingKind {
    House,
    Tower,
    Cave,
}

/// A building (or cave) on the overworld with its stack of interior floors.
///
/// A cave is a degenerate building: few floors, entered through a
/// [`OverworldTile::CaveEntrance`] tile instead of a door.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub kind: BuildingKind,
    pub position: Position,
    pub footprint: Footprint,
    /// Index of the currently occupied floor.
    pub floor: usize,
    pub floors: Vec<Floor>,
}

impl Building {
    /// Standard building footprint in tiles.
    pub const FOOTPRINT: Footprint = Footprint {
        width: 3,
        height: 3,
    };

    pub fn new(kind: BuildingKind, position: Position) -> Self {
        Self {
            kind,
            position,
            footprint: Self::FOOTPRINT,
            floor: 0,
            floors: Vec::new(),
        }
    }

    /// The tile a mover steps onto to enter: the bottom-center tile.
    pub fn door(&self) -> Position {
        Position::new(
            self.position.x + self.footprint.width as i32 / 2,
            self.position.y + self.footprint.height as i32 - 1,
        )
    }

    pub fn covers(&self, pos: Position) -> bool {
        self.footprint.contains(self.position, pos)
    }

    /// The environment kind of this building's floors.
    pub fn floor_kind(&self) -> EnvironmentKind {
        match self.kind {
            BuildingKind::Cave => EnvironmentKind::CaveLevel,
            _ => EnvironmentKind::BuildingFloor,
        }
    }
}

/// One interior level of a building or cave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub grid: Grid<InteriorTile>,
    /// The controlling entity's current tile while this floor is active.
    pub position: Position,
    pub characters: Vec<Character>,
    /// Upward exit; every floor has exactly one.
    pub up_stairs: Position,
    /// Downward exit; absent on terminal floors.
    pub down_stairs: Option<Position>,
    /// Flat indices of tiles the player has seen. Grows only.
    pub visited: BTreeSet<usize>,
}

impl Floor {
    /// Records that a tile has been seen.
    pub fn mark_visited(&mut self, pos: Position) {
        if let Some(index) = self.grid.index_of(pos) {
            self.visited.insert(index);
        }
    }
}

/// The overworld: terrain plus every object placed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub grid: Grid<OverworldTile>,
    /// The controlling entity's current tile.
    pub position: Position,
    pub buildings: Vec<Building>,
    pub shops: Vec<Shop>,
    pub characters: Vec<Character>,
    /// Flat indices of tiles the player has seen. Grows only.
    pub visited: BTreeSet<usize>,
}

impl World {
    /// Creates an empty ground-filled overworld with nothing placed on it.
    pub fn empty_overworld(width: u32, height: u32) -> VeldtResult<Self> {
        let grid = Grid::new(width, height)?;
        Ok(Self {
            position: grid.center(),
            grid,
            buildings: Vec::new(),
            shops: Vec::new(),
            characters: Vec::new(),
            visited: BTreeSet::new(),
        })
    }

    pub fn kind(&self) -> EnvironmentKind {
        EnvironmentKind::Overworld
    }

    /// Records that a tile has been seen.
    pub fn mark_visited(&mut self, pos: Position) {
        if let Some(index) = self.grid.index_of(pos) {
            self.visited.insert(index);
        }
    }

    /// Rebuilds the occupancy ledger from the placed-object lists, e.g.
    /// after loading a save. Door tiles stay unclaimed so they remain
    /// enterable, and hostile characters stay out of the ledger so walking
    /// into them resolves as a collision rather than a blocked step.
    pub fn build_ledger(&self) -> PositionLedger {
        let mut ledger = PositionLedger::new();
        for building in &self.buildings {
            for tile in building.footprint.tiles(building.position) {
                if tile != building.door() {
                    ledger.claim(tile);
                }
            }
        }
        for shop in &self.shops {
            for tile in shop.footprint.tiles(shop.position) {
                if tile != shop.door() {
                    ledger.claim(tile);
                }
            }
        }
        for character in &self.characters {
            if !character.hostile {
                ledger.claim_entity(character.position, character.id);
            }
        }
        ledger
    }
}

/// A transient generation-time bounding box used to group structure
/// placement. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Zone {
    /// Creates a zone from its edges (right/bottom inclusive).
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a zone of the given size centered on a position.
    pub fn around(center: Position, width: u32, height: u32) -> Self {
        let half_w = width as i32 / 2;
        let half_h = height as i32 / 2;
        Self {
            left: center.x - half_w,
            top: center.y - half_h,
            right: center.x - half_w + width as i32 - 1,
            bottom: center.y - half_h + height as i32 - 1,
        }
    }

    pub fn width(&self) -> u32 {
        (self.right - self.left + 1).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top + 1).max(0) as u32
    }

    pub fn center(&self) -> Position {
        Position::new((self.left + self.right) / 2, (self.top + self.bottom) / 2)
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.left && pos.x <= self.right && pos.y >= self.top && pos.y <= self.bottom
    }

    /// This zone grown by `pad` tiles on every side, used for spacing
    /// checks between candidate zones.
    pub fn expanded(&self, pad: i32) -> Zone {
        Zone::new(
            self.left - pad,
            self.top - pad,
            self.right + pad,
            self.bottom + pad,
        )
    }

    pub fn intersects(&self, other: &Zone) -> bool {
        !(self.right < other.left
            || other.right < self.left
            || self.bottom < other.top
            || other.bottom < self.top)
    }
}

/// What is standing on a claimed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    Structure,
    Entity(EntityId),
}

/// The occupancy map shared by generation-time placement and run-time
/// movement validation.
///
/// One ledger belongs to one active environment; worlds generated side by
/// side (tests, previews) each carry their own. It is rebuilt from the
/// placed-object lists after deserialization rather than persisted.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    claimed: HashMap<Position, Claim>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tile is already claimed.
    pub fn is_claimed(&self, pos: Position) -> bool {
        self.claimed.contains_key(&pos)
    }

    /// Claims a tile for a structure. Returns false if already taken.
    pub fn claim(&mut self, pos: Position) -> bool {
        if self.claimed.contains_key(&pos) {
            return false;
        }
        self.claimed.insert(pos, Claim::Structure);
        true
    }

    /// Claims a tile for a tracked entity. Returns false if already taken.
    pub fn claim_entity(&mut self, pos: Position, id: EntityId) -> bool {
        if self.claimed.contains_key(&pos) {
            return false;
        }
        self.claimed.insert(pos, Claim::Entity(id));
        true
    }

    /// Releases a tile.
    pub fn release(&mut self, pos: Position) {
        self.claimed.remove(&pos);
    }

    /// Atomically moves an entity's claim from one tile to another.
    /// Returns false (and changes nothing) if the target is taken.
    pub fn move_entity(&mut self, from: Position, to: Position, id: EntityId) -> bool {
        if from != to && self.claimed.contains_key(&to) {
            return false;
        }
        self.claimed.remove(&from);
        self.claimed.insert(to, Claim::Entity(id));
        true
    }

    /// Number of claimed tiles.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_footprint_tiles_and_containment() {
        let footprint = Footprint::new(2, 3);
        let anchor = Position::new(4, 4);
        let tiles = footprint.tiles(anchor);
        assert_eq!(tiles.len(), 6);
        assert!(tiles.contains(&Position::new(5, 6)));
        assert!(footprint.contains(anchor, Position::new(5, 6)));
        assert!(!footprint.contains(anchor, Position::new(6, 4)));
    }

    #[test]
    fn test_footprint_intersection() {
        let a = Footprint::new(3, 3);
        let b = Footprint::new(2, 2);
        assert!(a.intersects(Position::new(5, 5), b, Position::new(7, 7)));
        assert!(!a.intersects(Position::new(5, 5), b, Position::new(8, 5)));
        assert!(!a.intersects(Position::new(5, 5), b, Position::new(5, 8)));
    }

    #[test]
    fn test_building_door_inside_footprint() {
        let building = Building::new(BuildingKind::House, Position::new(10, 10));
        let door = building.door();
        assert!(building.covers(door));
        assert_eq!(door, Position::new(11, 12));
    }

    #[test]
    fn test_cave_floor_kind() {
        let cave = Building::new(BuildingKind::Cave, Position::new(0, 0));
        assert_eq!(cave.floor_kind(), EnvironmentKind::CaveLevel);
        let house = Building::new(BuildingKind::House, Position::new(0, 0));
        assert_eq!(house.floor_kind(), EnvironmentKind::BuildingFloor);
    }

    #[test]
    fn test_zone_geometry() {
        let zone = Zone::around(Position::new(10, 10), 5, 5);
        assert_eq!(zone.width(), 5);
        assert_eq!(zone.height(), 5);
        assert_eq!(zone.center(), Position::new(10, 10));
        assert!(zone.contains(Position::new(8, 8)));
        assert!(!zone.contains(Position::new(13, 10)));
    }

    #[test]
    fn test_zone_expansion_and_intersection() {
        let a = Zone::new(0, 0, 4, 4);
        let b = Zone::new(6, 0, 10, 4);
        assert!(!a.intersects(&b));
        assert!(a.expanded(2).intersects(&b));
    }

    #[test]
    fn test_ledger_claim_release() {
        let mut ledger = PositionLedger::new();
        let pos = Position::new(3, 3);
        assert!(ledger.claim(pos));
        assert!(!ledger.claim(pos));
        assert!(ledger.is_claimed(pos));
        ledger.release(pos);
        assert!(!ledger.is_claimed(pos));
    }

    #[test]
    fn test_ledger_move_entity() {
        let mut ledger = PositionLedger::new();
        let id = new_entity_id();
        let from = Position::new(1, 1);
        let to = Position::new(2, 1);
        ledger.claim_entity(from, id);
        assert!(ledger.move_entity(from, to, id));
        assert!(!ledger.is_claimed(from));
        assert!(ledger.is_claimed(to));

        ledger.claim(Position::new(3, 1));
        assert!(!ledger.move_entity(to, Position::new(3, 1), id));
        assert!(ledger.is_claimed(to));
    }

    #[test]
    fn test_ledger_move_entity_in_place() {
        let mut ledger = PositionLedger::new();
        let id = new_entity_id();
        let pos = Position::new(1, 1);
        ledger.claim_entity(pos, id);
        assert!(ledger.move_entity(pos, pos, id));
        assert!(ledger.is_claimed(pos));
    }

    #[test]
    fn test_world_ledger_rebuild_leaves_doors_open() {
        let mut world = World {
            grid: Grid::new(20, 20).unwrap(),
            position: Position::new(1, 1),
            buildings: vec![Building::new(BuildingKind::House, Position::new(5, 5))],
            shops: vec![Shop::new(ShopKind::General, Position::new(12, 12))],
            characters: vec![
                Character::new(CharacterKind::Villager, Position::new(2, 2)),
                Character::new(CharacterKind::Monster, Position::new(3, 3)),
            ],
            visited: BTreeSet::new(),
        };
        world.mark_visited(world.position);

        let ledger = world.build_ledger();
        assert!(!ledger.is_claimed(world.buildings[0].door()));
        assert!(ledger.is_claimed(world.buildings[0].position));
        assert!(!ledger.is_claimed(world.shops[0].door()));
        // Villagers occupy; monsters are left collidable.
        assert!(ledger.is_claimed(Position::new(2, 2)));
        assert!(!ledger.is_claimed(Position::new(3, 3)));
    }
}
