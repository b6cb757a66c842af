//! # Zone Layout & World Assembly
//!
//! Partitions the synthesized terrain into city zones, populates them with
//! buildings and shops, guarantees a walkable route between the spawn zone
//! and its neighbor, carves the secret island, and scatters the stragglers
//! that live outside any city. This is the entry point that turns a seed
//! into a finished [`World`].

use crate::generation::{
    dig_floor, place_ring_group, reserve_footprint, synthesize_terrain, GenerationConfig,
    InteriorConfig, RingPlan, WorldSeed,
};
use crate::nav::find_path;
use crate::world::{
    Building, BuildingKind, Character, CharacterKind, Footprint, Grid, InteriorTile,
    OverworldTile, Position, PositionLedger, Shop, ShopKind, TileKind, World, Zone,
    OVERWORLD_MAX_WALK, WALK_ANY,
};
use crate::{VeldtError, VeldtResult};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Hash offsets for the world-level counts. Fixed so a seed keeps meaning
/// the same world shape across versions.
const ZONE_COUNT_OFFSET: usize = 16;
const STRAY_SHOP_COUNT_OFFSET: usize = 20;
const ROAMER_COUNT_OFFSET: usize = 24;

/// A finished world plus the transient state callers need alongside it:
/// the occupancy ledger and the city centers (handy for minimaps and
/// tests; the zones themselves are not persisted).
#[derive(Debug)]
pub struct GeneratedWorld {
    pub world: World,
    pub ledger: PositionLedger,
    pub city_centers: Vec<Position>,
}

/// Generates complete overworlds from a seed.
#[derive(Debug, Clone)]
pub struct WorldGenerator {
    pub config: GenerationConfig,
}

impl WorldGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Creates a generator for testing with a small, quick world.
    pub fn for_testing() -> Self {
        Self::new(GenerationConfig::for_testing())
    }

    /// Runs the full pipeline: terrain, zones, structures, connectivity,
    /// the secret island, and out-of-city stragglers.
    ///
    /// Retryable failures inside (a floor that will not dig, an island
    /// that will not fit) degrade the result and are logged; only bad
    /// preconditions return an error.
    pub fn generate(&self, seed: &WorldSeed, rng: &mut StdRng) -> VeldtResult<GeneratedWorld> {
        self.config.validate()?;
        let mut grid = synthesize_terrain(&self.config, seed, rng)?;

        let zones = self.lay_out_zones(&grid, seed, rng);
        for zone in &zones {
            carve_zone(&mut grid, zone);
        }

        let mut ledger = PositionLedger::new();
        let mut buildings = Vec::new();
        let mut shops = Vec::new();
        let mut characters = Vec::new();
        // Tiles that end up open at runtime (doors, hostile characters)
        // stay claimed until every placement pass is done, so nothing
        // else can be reserved on top of them.
        let mut held_open = Vec::new();
        for zone in &zones {
            self.populate_zone(
                zone,
                &grid,
                &mut ledger,
                &mut buildings,
                &mut shops,
                &mut held_open,
                rng,
            );
        }

        // The spawn tile is pinned before anything else can claim it.
        let spawn = reserve_footprint(
            zones[0].center(),
            Footprint::new(1, 1),
            &grid,
            &mut ledger,
            &OverworldTile::structure_whitelist(),
        )
        .ok_or_else(|| {
            VeldtError::GenerationFailed("no occupiable spawn tile in the center zone".to_string())
        })?;

        if zones.len() >= 2 {
            self.ensure_connection(&mut grid, &ledger, zones[0].center(), zones[1].center());
        }

        if let Some(cave) = self.carve_secret_island(&mut grid, rng) {
            buildings.push(cave);
        }

        self.scatter_stragglers(
            seed,
            &grid,
            &mut ledger,
            &mut shops,
            &mut characters,
            &mut held_open,
            rng,
        );

        for pos in held_open {
            ledger.release(pos);
        }
        // The player claims its own tile at runtime.
        ledger.release(spawn);

        let mut world = World {
            grid,
            position: spawn,
            buildings,
            shops,
            characters,
            visited: BTreeSet::new(),
        };
        world.mark_visited(spawn);

        Ok(GeneratedWorld {
            world,
            ledger,
            city_centers: zones.iter().map(|z| z.center()).collect(),
        })
    }

    /// Lays out the fixed center zone plus hash-counted random candidates,
    /// each accepted only when its padded bounding box stays clear of the
    /// zones already accepted.
    fn lay_out_zones(
        &self,
        grid: &Grid<OverworldTile>,
        seed: &WorldSeed,
        rng: &mut StdRng,
    ) -> Vec<Zone> {
        let cfg = &self.config;
        let center_size = (cfg.zone_min_size + cfg.zone_max_size) / 2;
        let mut zones = vec![Zone::around(grid.center(), center_size, center_size)];

        let wanted = seed.bounded_count(ZONE_COUNT_OFFSET, 3, cfg.min_zones, cfg.max_zones);
        let mut attempts = 0;
        while (zones.len() as u32) < wanted && attempts < wanted * 20 {
            attempts += 1;
            let size = rng.gen_range(cfg.zone_min_size..=cfg.zone_max_size);
            if grid.width() <= size || grid.height() <= size {
                continue;
            }
            let left = rng.gen_range(0..(grid.width() - size)) as i32;
            let top = rng.gen_range(0..(grid.height() - size)) as i32;
            let candidate = Zone::new(left, top, left + size as i32 - 1, top + size as i32 - 1);
            let padded = candidate.expanded(cfg.zone_padding);
            if zones.iter().all(|z| !padded.intersects(z)) {
                zones.push(candidate);
            }
        }
        debug!("laid out {} of {} zones", zones.len(), wanted);
        zones
    }

    /// Fills one zone with buildings and shops in concentric rings around
    /// its center.
    fn populate_zone(
        &self,
        zone: &Zone,
        grid: &Grid<OverworldTile>,
        ledger: &mut PositionLedger,
        buildings: &mut Vec<Building>,
        shops: &mut Vec<Shop>,
        held_open: &mut Vec<Position>,
        rng: &mut StdRng,
    ) {
        let whitelist = OverworldTile::structure_whitelist();
        let building_count = rng.gen_range(1..=self.config.buildings_per_zone);
        let anchors = place_ring_group(
            building_count,
            zone.center(),
            zone,
            &RingPlan::default(),
            grid,
            ledger,
            Building::FOOTPRINT,
            &whitelist,
        );
        if (anchors.len() as u32) < building_count {
            debug!(
                "zone at {:?} holds {} of {} buildings",
                zone.center(),
                anchors.len(),
                building_count
            );
        }
        for anchor in anchors {
            let kind = if rng.gen_bool(0.2) {
                BuildingKind::Tower
            } else {
                BuildingKind::House
            };
            let building = self.raise_building(kind, anchor, rng);
            held_open.push(building.door());
            buildings.push(building);
        }

        let shop_count = rng.gen_range(0..=self.config.shops_per_zone);
        let shop_plan = RingPlan {
            initial_radius: 5.0,
            ..RingPlan::default()
        };
        let anchors = place_ring_group(
            shop_count,
            zone.center(),
            zone,
            &shop_plan,
            grid,
            ledger,
            Shop::FOOTPRINT,
            &whitelist,
        );
        for anchor in anchors {
            let kind = match rng.gen_range(0..3) {
                0 => ShopKind::General,
                1 => ShopKind::Weapons,
                _ => ShopKind::Inn,
            };
            let shop = Shop::new(kind, anchor);
            held_open.push(shop.door());
            shops.push(shop);
        }
    }

    /// Constructs a building and digs its floors. A floor that refuses to
    /// lay out is logged and skipped; the building keeps whatever floors
    /// succeeded.
    fn raise_building(&self, kind: BuildingKind, anchor: Position, rng: &mut StdRng) -> Building {
        let mut building = Building::new(kind, anchor);
        let floor_count = rng.gen_range(1..=self.config.max_floors) as usize;
        let interior = match kind {
            BuildingKind::Cave => InteriorConfig::new(24, 18),
            _ => InteriorConfig::new(20, 16),
        };
        for i in 0..floor_count {
            let terminal = i == floor_count - 1;
            match dig_floor(&interior, terminal, rng) {
                Ok(floor) => building.floors.push(floor),
                Err(err) => {
                    warn!("skipping floor {} of {:?} at {:?}: {}", i, kind, anchor, err);
                    break;
                }
            }
        }
        // A floor stack cut short must still end somewhere.
        if let Some(last) = building.floors.last_mut() {
            if last.down_stairs.take().is_some() {
                let down = last
                    .grid
                    .indices_of(InteriorTile::Stairs)
                    .into_iter()
                    .map(|i| last.grid.coordinate_of(i))
                    .find(|&p| p != last.up_stairs);
                if let Some(p) = down {
                    let _ = last.grid.set(p, InteriorTile::Ground);
                }
            }
        }
        building
    }

    /// Guarantees a walkable route between two zone centers. The first
    /// attempt routes over existing walkable terrain and widens a sand
    /// corridor around it; when no such route exists, an unrestricted
    /// search forces one through whatever terrain is in the way.
    fn ensure_connection(
        &self,
        grid: &mut Grid<OverworldTile>,
        ledger: &PositionLedger,
        from: Position,
        to: Position,
    ) {
        let path = find_path(grid, from, to, OVERWORLD_MAX_WALK);
        let path = if path.is_empty() {
            debug!("no natural route between {:?} and {:?}, forcing one", from, to);
            find_path(grid, from, to, WALK_ANY)
        } else {
            path
        };
        // A bounded grid always yields some unrestricted path.
        debug_assert!(!path.is_empty());
        let pad = crate::config::CORRIDOR_PADDING;
        for waypoint in &path {
            for dy in -pad..=pad {
                for dx in -pad..=pad {
                    let pos = Position::new(waypoint.x + dx, waypoint.y + dy);
                    if !grid.contains(pos) || ledger.is_claimed(pos) {
                        continue;
                    }
                    let tile = match grid.get(pos) {
                        Some(t) => t,
                        None => continue,
                    };
                    if tile.walk_index() > OVERWORLD_MAX_WALK {
                        let _ = grid.set(pos, OverworldTile::Sand);
                    }
                }
            }
        }
    }

    /// Carves a small sand island with a cave entrance into one randomly
    /// chosen, sufficiently large body of water. Absence of such a body is
    /// a logged, non-fatal outcome: that world simply has no secret cave.
    fn carve_secret_island(
        &self,
        grid: &mut Grid<OverworldTile>,
        rng: &mut StdRng,
    ) -> Option<Building> {
        let mut candidates = Vec::new();
        for region in water_regions(grid) {
            if region.len() < self.config.island_min_water {
                continue;
            }
            if let Some(center) = deepest_cell(grid, &region) {
                candidates.push(center);
            }
        }
        let center = match candidates.len() {
            0 => {
                warn!("no water body large enough for the secret island");
                return None;
            }
            n => candidates[rng.gen_range(0..n)],
        };

        for dy in -1..=1 {
            for dx in -1..=1 {
                let _ = grid.set(Position::new(center.x + dx, center.y + dy), OverworldTile::Sand);
            }
        }
        grid.set(center, OverworldTile::CaveEntrance).ok()?;

        let mut cave = Building::new(BuildingKind::Cave, center);
        cave.footprint = Footprint::new(1, 1);
        let interior = InteriorConfig::new(24, 18);
        let depth = rng.gen_range(1..=2);
        for i in 0..depth {
            match dig_floor(&interior, i == depth - 1, rng) {
                Ok(floor) => cave.floors.push(floor),
                Err(err) => {
                    warn!("skipping cave level {}: {}", i, err);
                    break;
                }
            }
        }
        debug!("secret island carved at {:?}", center);
        Some(cave)
    }

    /// Places the hash-counted shops and roaming characters that live
    /// outside any city. Placement failures just mean fewer stragglers.
    fn scatter_stragglers(
        &self,
        seed: &WorldSeed,
        grid: &Grid<OverworldTile>,
        ledger: &mut PositionLedger,
        shops: &mut Vec<Shop>,
        characters: &mut Vec<Character>,
        held_open: &mut Vec<Position>,
        rng: &mut StdRng,
    ) {
        let whitelist = OverworldTile::structure_whitelist();
        let stray_shops = seed.bounded_count(STRAY_SHOP_COUNT_OFFSET, 3, 0, 3);
        for _ in 0..stray_shops {
            let anchor = random_position(grid, rng);
            if let Some(pos) =
                reserve_footprint(anchor, Shop::FOOTPRINT, grid, ledger, &whitelist)
            {
                let shop = Shop::new(ShopKind::General, pos);
                held_open.push(shop.door());
                shops.push(shop);
            }
        }

        let walkable = [
            OverworldTile::Ground,
            OverworldTile::Grass,
            OverworldTile::Sand,
            OverworldTile::Road,
        ];
        let roamers = seed.bounded_count(ROAMER_COUNT_OFFSET, 3, 2, 8);
        let footprint = Footprint::new(1, 1);
        for _ in 0..roamers {
            let anchor = random_position(grid, rng);
            if let Some(pos) = reserve_footprint(anchor, footprint, grid, ledger, &walkable) {
                let kind = match rng.gen_range(0..3) {
                    0 => CharacterKind::Villager,
                    1 => CharacterKind::Merchant,
                    _ => CharacterKind::Monster,
                };
                let character = Character::new(kind, pos);
                if character.hostile {
                    // Hostiles stay collidable at runtime: walking into
                    // one starts a battle instead of bouncing off an
                    // occupancy claim. Their tile opens up only once all
                    // placement is done.
                    held_open.push(pos);
                } else {
                    ledger.release(pos);
                    ledger.claim_entity(pos, character.id);
                }
                characters.push(character);
            }
        }
    }
}

impl Default for WorldGenerator {
    fn default() -> Self {
        Self::new(GenerationConfig::default())
    }
}

fn carve_zone(grid: &mut Grid<OverworldTile>, zone: &Zone) {
    for y in zone.top..=zone.bottom {
        for x in zone.left..=zone.right {
            let _ = grid.set(Position::new(x, y), OverworldTile::Ground);
        }
    }
}

fn random_position(grid: &Grid<OverworldTile>, rng: &mut StdRng) -> Position {
    Position::new(
        rng.gen_range(0..grid.width() as i32),
        rng.gen_range(0..grid.height() as i32),
    )
}

/// Connected water regions (4-connectivity) as lists of positions.
fn water_regions(grid: &Grid<OverworldTile>) -> Vec<Vec<Position>> {
    let mut seen: HashSet<usize> = HashSet::new();
    let mut regions = Vec::new();
    for index in grid.indices_of(OverworldTile::Water) {
        if seen.contains(&index) {
            continue;
        }
        let mut region = Vec::new();
        let mut queue = VecDeque::new();
        seen.insert(index);
        queue.push_back(grid.coordinate_of(index));
        while let Some(pos) = queue.pop_front() {
            region.push(pos);
            for next in pos.cardinal_adjacent_positions() {
                if let Some(i) = grid.index_of(next) {
                    if grid.get_index(i) == Some(OverworldTile::Water) && seen.insert(i) {
                        queue.push_back(next);
                    }
                }
            }
        }
        regions.push(region);
    }
    regions
}

/// The region cell nearest its centroid whose whole 2-tile neighborhood is
/// still water, i.e. somewhere an island fits without touching shore.
fn deepest_cell(grid: &Grid<OverworldTile>, region: &[Position]) -> Option<Position> {
    let n = region.len() as i64;
    let centroid = Position::new(
        (region.iter().map(|p| p.x as i64).sum::<i64>() / n) as i32,
        (region.iter().map(|p| p.y as i64).sum::<i64>() / n) as i32,
    );
    region
        .iter()
        .filter(|&&pos| {
            let surrounding = grid.surrounding_indices(pos, 2, true);
            surrounding.len() == 24
                && surrounding
                    .into_iter()
                    .all(|i| grid.get_index(i) == Some(OverworldTile::Water))
        })
        .min_by_key(|&&pos| pos.manhattan_distance(centroid))
        .copied()
}
