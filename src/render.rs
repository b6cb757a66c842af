//! # Render Boundary
//!
//! The read-only seam between the world model and whatever draws it. The
//! engine never renders; it hands a [`BakeScene`] to an external
//! [`EnvironmentBaker`] exactly once per environment entry, and the baker
//! turns it into an opaque baked background. Baking walks the grid one row
//! at a time through [`RowChunks`], so a frame loop can spread the work
//! across ticks instead of stalling on a full-grid pass.

use crate::world::{Building, Character, Floor, Grid, Shop, TileKind, World};

/// A read-only view of one environment, assembled for baking.
///
/// Overworld scenes carry the placed objects so the baker can stamp
/// buildings and shops onto the background; interior scenes carry only the
/// floor tiles (characters move every tick and are drawn live, but bakers
/// that pre-render their sprites get the list here too).
#[derive(Debug, Clone, Copy)]
pub struct BakeScene<'a, T: TileKind> {
    grid: &'a Grid<T>,
    pub buildings: &'a [Building],
    pub shops: &'a [Shop],
    pub characters: &'a [Character],
}

impl<'a> BakeScene<'a, crate::world::OverworldTile> {
    pub fn from_world(world: &'a World) -> Self {
        Self {
            grid: &world.grid,
            buildings: &world.buildings,
            shops: &world.shops,
            characters: &world.characters,
        }
    }
}

impl<'a> BakeScene<'a, crate::world::InteriorTile> {
    pub fn from_floor(floor: &'a Floor) -> Self {
        Self {
            grid: &floor.grid,
            buildings: &[],
            shops: &[],
            characters: &floor.characters,
        }
    }
}

impl<'a, T: TileKind> BakeScene<'a, T> {
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// The scene's tile rows, top to bottom.
    pub fn rows(&self) -> RowChunks<'a, T> {
        RowChunks {
            grid: self.grid,
            next: 0,
        }
    }

    /// Drives a baker over every row and returns its baked output.
    ///
    /// Callers that want to spread the cost across frames iterate
    /// [`rows`](Self::rows) themselves and call
    /// [`EnvironmentBaker::bake_row`] at their own pace.
    pub fn bake<B: EnvironmentBaker<T>>(&self, mut baker: B) -> B::Baked {
        for (y, row) in self.rows() {
            baker.bake_row(self, y, row);
        }
        baker.finish()
    }
}

/// Consumes a scene row by row and produces an opaque baked background.
///
/// The engine knows nothing about the output type; a pixel baker returns a
/// texture, a terminal baker returns styled strings, tests return whatever
/// they want to assert on.
pub trait EnvironmentBaker<T: TileKind> {
    type Baked;

    fn bake_row(&mut self, scene: &BakeScene<'_, T>, y: u32, row: &[T]);

    fn finish(self) -> Self::Baked;
}

/// Iterator over a grid's rows, yielding `(y, row)` pairs.
#[derive(Debug)]
pub struct RowChunks<'a, T: TileKind> {
    grid: &'a Grid<T>,
    next: u32,
}

impl<'a, T: TileKind> Iterator for RowChunks<'a, T> {
    type Item = (u32, &'a [T]);

    fn next(&mut self) -> Option<Self::Item> {
        let y = self.next;
        let row = self.grid.row(y)?;
        self.next += 1;
        Some((y, row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.grid.height().saturating_sub(self.next) as usize;
        (left, Some(left))
    }
}

impl<'a, T: TileKind> ExactSizeIterator for RowChunks<'a, T> {}
