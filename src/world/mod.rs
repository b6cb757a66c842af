//! # World Module
//!
//! The data model for everything walkable: coordinates, tile type sets,
//! flat tile grids, and the environment structures (overworld, buildings,
//! floors) that generation produces and navigation consumes.

pub mod environment;
pub mod grid;
pub mod tiles;

pub use environment::*;
pub use grid::*;
pub use tiles::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a 2D tile coordinate in an environment.
///
/// # Examples
///
/// ```
/// use veldt::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// assert_eq!(pos.manhattan_distance(Position::new(13, 9)), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(8);
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx != 0 || dy != 0 {
                    positions.push(Position::new(self.x + dx, self.y + dy));
                }
            }
        }
        positions
    }

    /// Returns this position shifted along one axis.
    pub fn shifted(self, axis: Axis, delta: i32) -> Position {
        match axis {
            Axis::Horizontal => Position::new(self.x + delta, self.y),
            Axis::Vertical => Position::new(self.x, self.y + delta),
        }
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Movement axes. Movement requests are validated one axis at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Returns the other axis.
    pub fn perpendicular(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// Cardinal directions for movement intent and facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use veldt::{Direction, Position};
    ///
    /// assert_eq!(Direction::North.to_delta(), Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// The axis this direction moves along.
    pub fn axis(self) -> Axis {
        match self {
            Direction::East | Direction::West => Axis::Horizontal,
            Direction::North | Direction::South => Axis::Vertical,
        }
    }

    /// The signed step this direction takes along its axis.
    pub fn delta(self) -> i32 {
        match self {
            Direction::North | Direction::West => -1,
            Direction::South | Direction::East => 1,
        }
    }
}

/// Unique identifier for characters and other tracked entities.
pub type EntityId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}
