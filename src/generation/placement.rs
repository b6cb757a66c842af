//! # Spatial Object Placement
//!
//! Reserves non-overlapping rectangular footprints on a grid. A desired
//! anchor is honored when its footprint sits entirely on whitelisted tiles
//! and claims nothing already in the ledger; otherwise a bounded
//! nearest-free search expands outward, biased toward the grid center.
//! `None` means "could not place" and callers skip the object or fall back
//! to forced generation.

use crate::world::{Footprint, Grid, Position, PositionLedger, TileKind, Zone};
use log::debug;
use std::f64::consts::TAU;

/// Checks one anchored footprint against the whitelist and the ledger.
fn footprint_fits<T: TileKind>(
    anchor: Position,
    footprint: Footprint,
    grid: &Grid<T>,
    ledger: &PositionLedger,
    whitelist: &[T],
) -> bool {
    footprint.tiles(anchor).into_iter().all(|pos| {
        matches!(grid.get(pos), Some(tile) if whitelist.contains(&tile))
            && !ledger.is_claimed(pos)
    })
}

/// Reserves a footprint at or near the desired anchor.
///
/// On success every covered tile is claimed in the ledger, so the
/// reservation is visible to all later placement calls sharing it. The
/// fallback search tries rings of growing radius around the anchor
/// (bounded, no recursion), preferring candidates closer to the grid
/// center.
///
/// # Examples
///
/// ```
/// use veldt::{reserve_footprint, Footprint, Grid, OverworldTile, Position, PositionLedger};
///
/// let grid: Grid<OverworldTile> = Grid::new(16, 16).unwrap();
/// let mut ledger = PositionLedger::new();
/// let footprint = Footprint::new(2, 2);
/// let whitelist = [OverworldTile::Ground];
///
/// let first = reserve_footprint(Position::new(5, 5), footprint, &grid, &mut ledger, &whitelist);
/// assert_eq!(first, Some(Position::new(5, 5)));
/// let second = reserve_footprint(Position::new(5, 5), footprint, &grid, &mut ledger, &whitelist);
/// assert_ne!(second, Some(Position::new(5, 5)));
/// ```
pub fn reserve_footprint<T: TileKind>(
    anchor: Position,
    footprint: Footprint,
    grid: &Grid<T>,
    ledger: &mut PositionLedger,
    whitelist: &[T],
) -> Option<Position> {
    let found = find_free_anchor(anchor, footprint, grid, ledger, whitelist)?;
    for pos in footprint.tiles(found) {
        ledger.claim(pos);
    }
    Some(found)
}

fn find_free_anchor<T: TileKind>(
    anchor: Position,
    footprint: Footprint,
    grid: &Grid<T>,
    ledger: &PositionLedger,
    whitelist: &[T],
) -> Option<Position> {
    if footprint_fits(anchor, footprint, grid, ledger, whitelist) {
        return Some(anchor);
    }

    let center = grid.center();
    for radius in 1..=crate::config::PLACEMENT_EXPANSIONS {
        let mut ring = ring_offsets(radius)
            .into_iter()
            .map(|(dx, dy)| Position::new(anchor.x + dx, anchor.y + dy))
            .collect::<Vec<_>>();
        // Bias toward the middle of the world so structures drift inward
        // instead of piling against an edge.
        ring.sort_by_key(|pos| pos.manhattan_distance(center));
        for candidate in ring {
            if footprint_fits(candidate, footprint, grid, ledger, whitelist) {
                return Some(candidate);
            }
        }
    }
    None
}

/// The Chebyshev ring of offsets at exactly `radius`.
fn ring_offsets(radius: i32) -> Vec<(i32, i32)> {
    let mut offsets = Vec::with_capacity((radius as usize) * 8);
    for d in -radius..=radius {
        offsets.push((d, -radius));
        offsets.push((d, radius));
    }
    for d in (-radius + 1)..radius {
        offsets.push((-radius, d));
        offsets.push((radius, d));
    }
    offsets
}

/// Shape of one concentric-ring distribution.
#[derive(Debug, Clone)]
pub struct RingPlan {
    /// Radius of the innermost ring, in tiles
    pub initial_radius: f64,
    /// Items attempted on the innermost ring
    pub initial_count: u32,
    /// Radius multiplier applied after each ring
    pub radius_growth: f64,
    /// Items added per ring after the first
    pub count_growth: u32,
    /// Angular offset added per ring so rings do not line up
    pub angle_drift: f64,
}

impl Default for RingPlan {
    fn default() -> Self {
        Self {
            initial_radius: 3.0,
            initial_count: 4,
            radius_growth: 1.6,
            count_growth: 2,
            angle_drift: 0.35,
        }
    }
}

/// Distributes up to `amount` identical footprints in concentric rings
/// around a center point, bounded by a zone.
///
/// Placement stops early the moment a candidate falls outside the zone;
/// an under-filled result is accepted rather than looping forever. Returns
/// the anchors actually reserved.
pub fn place_ring_group<T: TileKind>(
    amount: u32,
    center: Position,
    zone: &Zone,
    plan: &RingPlan,
    grid: &Grid<T>,
    ledger: &mut PositionLedger,
    footprint: Footprint,
    whitelist: &[T],
) -> Vec<Position> {
    debug_assert!(plan.radius_growth > 1.0);
    let mut placed = Vec::new();
    let mut radius = plan.initial_radius;
    let mut ring_count = plan.initial_count.max(1);
    let mut offset = 0.0f64;

    while (placed.len() as u32) < amount {
        for i in 0..ring_count {
            if placed.len() as u32 >= amount {
                break;
            }
            let angle = offset + TAU * i as f64 / ring_count as f64;
            let candidate = Position::new(
                center.x + (radius * angle.cos()).round() as i32,
                center.y + (radius * angle.sin()).round() as i32,
            );
            if !zone.contains(candidate) {
                debug!(
                    "ring placement left zone after {} of {} items",
                    placed.len(),
                    amount
                );
                return placed;
            }
            if let Some(pos) = reserve_footprint(candidate, footprint, grid, ledger, whitelist) {
                placed.push(pos);
            }
        }
        radius *= plan.radius_growth;
        ring_count += plan.count_growth;
        offset += plan.angle_drift;
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::OverworldTile;

    fn open_grid(size: u32) -> Grid<OverworldTile> {
        Grid::new(size, size).unwrap()
    }

    const WHITELIST: [OverworldTile; 1] = [OverworldTile::Ground];

    #[test]
    fn test_exact_anchor_honored_when_free() {
        let grid = open_grid(16);
        let mut ledger = PositionLedger::new();
        let anchor = Position::new(5, 5);
        let got = reserve_footprint(anchor, Footprint::new(2, 2), &grid, &mut ledger, &WHITELIST);
        assert_eq!(got, Some(anchor));
        assert!(ledger.is_claimed(Position::new(6, 6)));
    }

    #[test]
    fn test_second_reservation_moves_or_fails() {
        let grid = open_grid(16);
        let mut ledger = PositionLedger::new();
        let anchor = Position::new(5, 5);
        let footprint = Footprint::new(2, 2);
        let first = reserve_footprint(anchor, footprint, &grid, &mut ledger, &WHITELIST).unwrap();
        let second = reserve_footprint(anchor, footprint, &grid, &mut ledger, &WHITELIST);
        match second {
            Some(pos) => {
                assert_ne!(pos, first);
                assert!(!footprint.intersects(pos, footprint, first));
            }
            None => {} // also acceptable: could not place
        }
    }

    #[test]
    fn test_whitelist_enforced() {
        let grid = Grid::filled(16, 16, OverworldTile::Water).unwrap();
        let mut ledger = PositionLedger::new();
        let got = reserve_footprint(
            Position::new(5, 5),
            Footprint::new(2, 2),
            &grid,
            &mut ledger,
            &WHITELIST,
        );
        assert_eq!(got, None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_search_is_bounded() {
        // Claim a block far larger than the search can escape.
        let grid = open_grid(32);
        let mut ledger = PositionLedger::new();
        for y in 0..32 {
            for x in 0..32 {
                if (4..=28).contains(&x) && (4..=28).contains(&y) {
                    ledger.claim(Position::new(x, y));
                }
            }
        }
        let got = reserve_footprint(
            Position::new(16, 16),
            Footprint::new(2, 2),
            &grid,
            &mut ledger,
            &WHITELIST,
        );
        assert_eq!(got, None);
    }

    #[test]
    fn test_footprint_must_fit_entirely() {
        let grid = open_grid(8);
        let mut ledger = PositionLedger::new();
        // Anchor valid but footprint would hang off the grid edge; the
        // search should pull it inward, never place it partially outside.
        let got = reserve_footprint(
            Position::new(7, 7),
            Footprint::new(3, 3),
            &grid,
            &mut ledger,
            &WHITELIST,
        );
        if let Some(pos) = got {
            assert!(pos.x + 2 < 8 && pos.y + 2 < 8);
        }
    }

    #[test]
    fn test_ring_group_places_disjoint_footprints() {
        let grid = open_grid(32);
        let mut ledger = PositionLedger::new();
        let zone = Zone::new(0, 0, 31, 31);
        let footprint = Footprint::new(2, 2);
        let placed = place_ring_group(
            6,
            Position::new(16, 16),
            &zone,
            &RingPlan::default(),
            &grid,
            &mut ledger,
            footprint,
            &WHITELIST,
        );
        assert!(!placed.is_empty());
        for (i, a) in placed.iter().enumerate() {
            for b in placed.iter().skip(i + 1) {
                assert!(!footprint.intersects(*a, footprint, *b));
            }
        }
    }

    #[test]
    fn test_ring_group_aborts_at_zone_edge() {
        let grid = open_grid(32);
        let mut ledger = PositionLedger::new();
        // Zone too small to hold everything; must return early, not spin.
        let zone = Zone::new(14, 14, 18, 18);
        let placed = place_ring_group(
            50,
            Position::new(16, 16),
            &zone,
            &RingPlan::default(),
            &grid,
            &mut ledger,
            Footprint::new(2, 2),
            &WHITELIST,
        );
        assert!((placed.len() as u32) < 50);
    }
}
