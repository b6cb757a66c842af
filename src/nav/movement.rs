//! # Movement Validator / Collision Resolver
//!
//! Per-tick validation of proposed steps and hit-testing of the resulting
//! tile against an environment's live object lists. Validation is pure and
//! idempotent: querying the same request twice with no state change yields
//! the same answer. Rejections are ordinary variants, never errors.

use crate::world::{
    Axis, Building, Character, EntityId, Floor, Grid, OverworldTile, Position, PositionLedger,
    Shop, TileKind, World, INTERIOR_MAX_WALK, OVERWORLD_MAX_WALK, OVERWORLD_WATER_WALK,
};
use log::trace;

/// What a mover is allowed to stand on.
///
/// Inventory raises the threshold: water-walking footwear lifts an
/// overworld profile up to the water index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoverProfile {
    pub max_walk: u8,
}

impl MoverProfile {
    /// Ordinary overworld mover.
    pub fn overworld() -> Self {
        Self {
            max_walk: OVERWORLD_MAX_WALK,
        }
    }

    /// Overworld mover wearing water-walking footwear.
    pub fn water_walking() -> Self {
        Self {
            max_walk: OVERWORLD_WATER_WALK,
        }
    }

    /// Mover inside a building floor or cave level.
    pub fn interior() -> Self {
        Self {
            max_walk: INTERIOR_MAX_WALK,
        }
    }
}

/// Result of validating one single-axis move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step is allowed; `to` is the tile the mover lands on.
    Approved { from: Position, to: Position },
    /// The step is rejected; the mover's position is unchanged.
    Blocked { axis: Axis },
}

impl StepOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, StepOutcome::Approved { .. })
    }
}

/// Validates one single-axis step without committing anything.
///
/// The candidate tile is the current tile shifted one step along `axis`
/// and clamped to the grid bounds; a request that clamps back onto the
/// current tile (walking off the edge) is a rejection. The tile must then
/// pass the mover's terrain threshold and must not be claimed in the
/// ledger.
pub fn validate_step<T: TileKind>(
    grid: &Grid<T>,
    ledger: &PositionLedger,
    from: Position,
    axis: Axis,
    delta: i32,
    profile: MoverProfile,
) -> StepOutcome {
    if delta == 0 {
        return StepOutcome::Blocked { axis };
    }
    let proposed = from.shifted(axis, delta.signum());
    let target = Position::new(
        proposed.x.clamp(0, grid.width() as i32 - 1),
        proposed.y.clamp(0, grid.height() as i32 - 1),
    );
    if target == from {
        return StepOutcome::Blocked { axis };
    }
    let passable = grid
        .get(target)
        .map_or(false, |tile| tile.walk_index() <= profile.max_walk);
    if !passable {
        trace!("step to {:?} rejected by terrain", target);
        return StepOutcome::Blocked { axis };
    }
    if ledger.is_claimed(target) {
        trace!("step to {:?} rejected by occupancy", target);
        return StepOutcome::Blocked { axis };
    }
    StepOutcome::Approved { from, to: target }
}

/// A moving entity: its position, its per-axis movement intent, and its
/// walkability profile.
#[derive(Debug, Clone)]
pub struct Mover {
    pub id: EntityId,
    pub position: Position,
    /// Signed intent along the horizontal axis (-1, 0, or 1).
    pub intent_x: i32,
    /// Signed intent along the vertical axis (-1, 0, or 1).
    pub intent_y: i32,
    pub profile: MoverProfile,
}

impl Mover {
    pub fn new(id: EntityId, position: Position, profile: MoverProfile) -> Self {
        Self {
            id,
            position,
            intent_x: 0,
            intent_y: 0,
            profile,
        }
    }

    /// Sets the movement intent for both axes.
    pub fn set_intent(&mut self, dx: i32, dy: i32) {
        self.intent_x = dx.signum();
        self.intent_y = dy.signum();
    }

    /// Cancels any in-flight movement. Safe at any waypoint boundary; the
    /// ledger keeps whatever claim the mover currently holds.
    pub fn cancel(&mut self) {
        self.intent_x = 0;
        self.intent_y = 0;
    }

    fn intent_along(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Horizontal => self.intent_x,
            Axis::Vertical => self.intent_y,
        }
    }

    /// Attempts one step along `axis` following the current intent,
    /// committing position and ledger on approval.
    ///
    /// On rejection the intent along the *perpendicular* axis is cleared,
    /// not the requested one. That is how movement has always behaved in
    /// this engine and gameplay tuning grew around it; it is arguably
    /// backwards, so tests pin it rather than anyone "fixing" it in
    /// passing.
    pub fn step<T: TileKind>(
        &mut self,
        axis: Axis,
        grid: &Grid<T>,
        ledger: &mut PositionLedger,
    ) -> StepOutcome {
        let outcome = validate_step(
            grid,
            ledger,
            self.position,
            axis,
            self.intent_along(axis),
            self.profile,
        );
        match outcome {
            StepOutcome::Approved { to, .. } => {
                if ledger.move_entity(self.position, to, self.id) {
                    self.position = to;
                    outcome
                } else {
                    // Lost the tile between validation and commit.
                    StepOutcome::Blocked { axis }
                }
            }
            StepOutcome::Blocked { .. } => {
                match axis.perpendicular() {
                    Axis::Horizontal => self.intent_x = 0,
                    Axis::Vertical => self.intent_y = 0,
                }
                outcome
            }
        }
    }
}

/// Which kind of stairs a mover landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StairKind {
    Up,
    Down,
}

/// A collision reported after an approved step. The referenced object is
/// handed to the relevant external collaborator (battle, shop, entry).
#[derive(Debug, PartialEq)]
pub enum Collision<'a> {
    /// A hostile character; the battle collaborator takes over.
    Enemy(&'a Character),
    Shop(&'a Shop),
    Building(&'a Building),
    /// A cave entrance tile on the overworld.
    CaveEntrance,
    /// A stairs tile inside a building or cave.
    Stairs(StairKind),
}

/// Hit-tests a tile against the overworld's live object lists.
///
/// Precedence is fixed: a hostile character beats shop entry, which beats
/// building entry, which beats a cave entrance tile. At most one collision
/// is reported per step; the rest are suppressed.
pub fn hit_test_world(world: &World, pos: Position) -> Option<Collision<'_>> {
    if let Some(enemy) = world
        .characters
        .iter()
        .find(|c| c.hostile && c.covers(pos))
    {
        return Some(Collision::Enemy(enemy));
    }
    if let Some(shop) = world.shops.iter().find(|s| s.covers(pos)) {
        return Some(Collision::Shop(shop));
    }
    if let Some(building) = world.buildings.iter().find(|b| b.covers(pos)) {
        return Some(Collision::Building(building));
    }
    if world.grid.get(pos) == Some(OverworldTile::CaveEntrance) {
        return Some(Collision::CaveEntrance);
    }
    None
}

/// Hit-tests a tile against an interior floor: hostile characters first,
/// then stairs transitions.
pub fn hit_test_floor(floor: &Floor, pos: Position) -> Option<Collision<'_>> {
    if let Some(enemy) = floor
        .characters
        .iter()
        .find(|c| c.hostile && c.covers(pos))
    {
        return Some(Collision::Enemy(enemy));
    }
    if pos == floor.up_stairs {
        return Some(Collision::Stairs(StairKind::Up));
    }
    if floor.down_stairs == Some(pos) {
        return Some(Collision::Stairs(StairKind::Down));
    }
    None
}
