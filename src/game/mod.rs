//! # Game Module
//!
//! Runtime representation of a dungeon level and the rules that act on it.
//!
//! This module contains the fundamental building blocks of Warren:
//! - Tiles, rooms and the level-wide room map
//! - Spawned entities and pickups (opaque to the core beyond position and health)
//! - The transit planner that moves the player between rooms
//! - The key / exit progression state machine

pub mod entities;
pub mod level;
pub mod progression;
pub mod room;
pub mod tile;
pub mod transit;

pub use entities::*;
pub use level::*;
pub use progression::*;
pub use room::*;
pub use tile::*;
pub use transit::*;

use crate::config::TILE_SIZE;
use serde::{Deserialize, Serialize};

/// Represents a 2D integer coordinate.
///
/// The same type is used for room grid coordinates, tile coordinates inside a
/// room and pixel coordinates; the field or function name says which.
///
/// # Examples
///
/// ```
/// use warren::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.adjacent_positions();
/// assert_eq!(adjacent.len(), 8); // All 8 surrounding positions
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
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
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the Chebyshev (king-move) distance to another position.
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        (self.x - other.x).abs().max((self.y - other.y).abs()) as u32
    }

    /// Calculates the Euclidean distance to another position.
    pub fn euclidean_distance(self, other: Position) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Squared Euclidean distance, exact in integers.
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x - 1, self.y - 1), // NW
            Position::new(self.x, self.y - 1),     // N
            Position::new(self.x + 1, self.y - 1), // NE
            Position::new(self.x - 1, self.y),     // W
            Position::new(self.x + 1, self.y),     // E
            Position::new(self.x - 1, self.y + 1), // SW
            Position::new(self.x, self.y + 1),     // S
            Position::new(self.x + 1, self.y + 1), // SE
        ]
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }

    /// Returns the position one step away in the given direction.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }

    /// Pixel coordinate of the centre of the tile at this tile coordinate.
    pub fn tile_center_pixel(self) -> Position {
        Position::new(
            self.x * TILE_SIZE + TILE_SIZE / 2,
            self.y * TILE_SIZE + TILE_SIZE / 2,
        )
    }

    /// Pixel coordinate of the top-left corner of the tile at this tile coordinate.
    pub fn tile_origin_pixel(self) -> Position {
        Position::new(self.x * TILE_SIZE, self.y * TILE_SIZE)
    }

    /// Tile coordinate containing this pixel coordinate.
    pub fn pixel_to_tile(self) -> Position {
        Position::new(self.x.div_euclid(TILE_SIZE), self.y.div_euclid(TILE_SIZE))
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

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Door directions. Rooms only connect through their four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Converts a direction to a grid delta. North is negative y.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::East => Position::new(1, 0),
            Direction::South => Position::new(0, 1),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Converts a grid delta to a direction.
    ///
    /// Returns None if the delta is not a single cardinal step.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (1, 0) => Some(Direction::East),
            (0, 1) => Some(Direction::South),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// The direction pointing back the way this one came.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// All four directions in north, east, south, west order.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::East,
            Direction::South,
            Direction::West,
        ]
    }

    /// Parses a direction from a name or its first letter.
    pub fn parse(text: &str) -> Option<Direction> {
        match text.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Some(Direction::North),
            "e" | "east" => Some(Direction::East),
            "s" | "south" => Some(Direction::South),
            "w" | "west" => Some(Direction::West),
            _ => None,
        }
    }
}

/// Axis-aligned rectangle in pixel space.
///
/// Overlap is half-open: rectangles that merely share an edge do not collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covering exactly one tile.
    pub fn from_tile(tile: Position) -> Self {
        let origin = tile.tile_origin_pixel();
        Self::new(origin.x, origin.y, TILE_SIZE, TILE_SIZE)
    }

    /// Rectangle of the given size centred on a pixel position.
    pub fn centered(center: Position, w: i32, h: i32) -> Self {
        Self::new(center.x - w / 2, center.y - h / 2, w, h)
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Checks whether two rectangles overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::Rect;
    ///
    /// let a = Rect::new(0, 0, 10, 10);
    /// assert!(a.intersects(&Rect::new(5, 5, 10, 10)));
    /// assert!(!a.intersects(&Rect::new(10, 0, 10, 10))); // touching edge
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Inclusive range of tile coordinates the rectangle touches, clamped to a grid.
    ///
    /// Returns None when the rectangle lies entirely outside the grid.
    pub fn tile_span(&self, width: usize, height: usize) -> Option<(Position, Position)> {
        let max_x = width as i32 - 1;
        let max_y = height as i32 - 1;
        let x1 = self.left().div_euclid(TILE_SIZE).max(0);
        let y1 = self.top().div_euclid(TILE_SIZE).max(0);
        let x2 = self.right().div_euclid(TILE_SIZE).min(max_x);
        let y2 = self.bottom().div_euclid(TILE_SIZE).min(max_y);
        if x1 > x2 || y1 > y2 {
            return None;
        }
        Some((Position::new(x1, y1), Position::new(x2, y2)))
    }
}
