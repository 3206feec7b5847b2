//! # Tiles
//!
//! The four tile kinds a room grid is made of.

use serde::{Deserialize, Serialize};

/// A single cell of a room grid.
///
/// Whether a wall can be destroyed is tracked separately by the room, so a
/// chest is still a plain `Wall` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Tile {
    /// Walkable ground
    Floor,
    /// Solid wall (including the room border and destroyable chests)
    #[default]
    Wall,
    /// Opening to a neighbouring room, on the border midpoint
    Door,
    /// Exit to the next level, on the border
    ExitDoor,
}

impl Tile {
    /// Whether entities collide with this tile.
    pub fn is_blocking(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Whether entities may be placed on this tile.
    pub fn is_floor(self) -> bool {
        matches!(self, Tile::Floor)
    }

    /// Character used by the ASCII room dump.
    pub fn glyph(self) -> char {
        match self {
            Tile::Floor => '.',
            Tile::Wall => '#',
            Tile::Door => 'D',
            Tile::ExitDoor => 'X',
        }
    }
}
