//! # Terrain Grid Primitives
//!
//! A flat, row-major tile array with coordinate math and clipped
//! neighborhood queries. All queries are O(1) or O(radius²); nothing here
//! ever scans the whole grid.

use crate::world::{Position, TileKind};
use crate::{VeldtError, VeldtResult};
use serde::{Deserialize, Serialize};

/// A rectangular tile grid stored as a flat row-major array.
///
/// `index = y * width + x`. Every index handed out by this type is a valid
/// grid index; out-of-range coordinates yield `None` rather than wrapping.
///
/// # Examples
///
/// ```
/// use veldt::{Grid, OverworldTile, Position};
///
/// let grid: Grid<OverworldTile> = Grid::new(8, 8).unwrap();
/// assert_eq!(grid.len(), 64);
/// assert_eq!(grid.index_of(Position::new(3, 2)), Some(19));
/// assert_eq!(grid.coordinate_of(19), Position::new(3, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

/// The four orthogonal neighbors of a cell, `None` at grid edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors<T> {
    pub left: Option<T>,
    pub right: Option<T>,
    pub above: Option<T>,
    pub below: Option<T>,
}

impl<T: TileKind> Grid<T> {
    /// Creates a grid filled with the tile set's base tile.
    ///
    /// Fails with [`VeldtError::InvalidDimensions`] when either dimension
    /// is zero.
    pub fn new(width: u32, height: u32) -> VeldtResult<Self> {
        Self::filled(width, height, T::BASE)
    }

    /// Creates a grid filled with a specific tile.
    pub fn filled(width: u32, height: u32, tile: T) -> VeldtResult<Self> {
        if width == 0 || height == 0 {
            return Err(VeldtError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        Ok(Self {
            width,
            height,
            cells: vec![tile; (width * height) as usize],
        })
    }
}

impl<T: Copy> Grid<T> {
    /// Grid width in tiles.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in tiles.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no cells. Construction forbids this; kept for
    /// the conventional `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The grid centroid tile.
    pub fn center(&self) -> Position {
        Position::new(self.width as i32 / 2, self.height as i32 / 2)
    }

    /// Whether a position lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Maps a coordinate to its flat index, `None` when out of bounds.
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some((pos.y as u32 * self.width + pos.x as u32) as usize)
        } else {
            None
        }
    }

    /// Maps a flat index back to its coordinate.
    ///
    /// # Panics
    ///
    /// Panics in debug builds when the index is out of range.
    pub fn coordinate_of(&self, index: usize) -> Position {
        debug_assert!(index < self.cells.len());
        Position::new(
            (index as u32 % self.width) as i32,
            (index as u32 / self.width) as i32,
        )
    }

    /// Reads the tile at a position, `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<T> {
        self.index_of(pos).map(|i| self.cells[i])
    }

    /// Reads the tile at a flat index.
    pub fn get_index(&self, index: usize) -> Option<T> {
        self.cells.get(index).copied()
    }

    /// Writes the tile at a position.
    pub fn set(&mut self, pos: Position, tile: T) -> VeldtResult<()> {
        match self.index_of(pos) {
            Some(i) => {
                self.cells[i] = tile;
                Ok(())
            }
            None => Err(VeldtError::InvalidState(format!(
                "position ({}, {}) outside {}x{} grid",
                pos.x, pos.y, self.width, self.height
            ))),
        }
    }

    /// Writes the tile at a flat index.
    pub fn set_index(&mut self, index: usize, tile: T) -> VeldtResult<()> {
        match self.cells.get_mut(index) {
            Some(cell) => {
                *cell = tile;
                Ok(())
            }
            None => Err(VeldtError::InvalidState(format!(
                "index {} outside grid of {} cells",
                index,
                self.cells.len()
            ))),
        }
    }

    /// Returns the flat indices of all cells within `radius` of a position,
    /// excluding the position itself, clipped to the grid bounds.
    ///
    /// With `diagonals` the neighborhood is a Chebyshev disk (8-neighborhood
    /// at radius 1); without, a Manhattan disk (4-neighborhood at radius 1).
    pub fn surrounding_indices(&self, pos: Position, radius: u32, diagonals: bool) -> Vec<usize> {
        let r = radius as i32;
        let mut indices = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if !diagonals && dx.abs() + dy.abs() > r {
                    continue;
                }
                if let Some(index) = self.index_of(Position::new(pos.x + dx, pos.y + dy)) {
                    indices.push(index);
                }
            }
        }
        indices
    }

    /// The four orthogonal neighbor tiles, `None` past each edge.
    pub fn neighbors(&self, pos: Position) -> Neighbors<T> {
        Neighbors {
            left: self.get(Position::new(pos.x - 1, pos.y)),
            right: self.get(Position::new(pos.x + 1, pos.y)),
            above: self.get(Position::new(pos.x, pos.y - 1)),
            below: self.get(Position::new(pos.x, pos.y + 1)),
        }
    }

    /// Iterates every cell with its coordinate.
    pub fn iter(&self) -> impl Iterator<Item = (Position, T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &tile)| (self.coordinate_of(i), tile))
    }

    /// The raw flat cell slice.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// One row of tiles, `None` when the row is out of range.
    pub fn row(&self, y: u32) -> Option<&[T]> {
        if y < self.height {
            let start = (y * self.width) as usize;
            Some(&self.cells[start..start + self.width as usize])
        } else {
            None
        }
    }
}

impl<T: Copy + PartialEq> Grid<T> {
    /// Counts the cells currently holding a given tile.
    pub fn count(&self, tile: T) -> usize {
        self.cells.iter().filter(|&&c| c == tile).count()
    }

    /// Flat indices of all cells currently holding a given tile.
    pub fn indices_of(&self, tile: T) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == tile)
            .map(|(i, _)| i)
            .collect()
    }
}
