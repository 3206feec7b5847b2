//! # Room Transit
//!
//! Works out where the player lands after walking through a door.
//!
//! The nominal landing tile sits just inside the opposite wall of the next
//! room, centred on the door. When a motif put a wall there, the planner
//! searches expanding Chebyshev rings for floor, and as a last resort falls
//! back to the room's first floor tile.

use crate::config::TRANSIT_SEARCH_RADIUS;
use crate::game::{Direction, Level, Position, Room};
use crate::utils::chebyshev_ring;
use log::{debug, warn};

/// How the landing tile was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryResolution {
    /// The nominal tile inside the door was free
    Nominal,
    /// Found on the ring of this radius around the nominal tile
    RingSearch { radius: i32 },
    /// Fell back to the room's first floor tile (or its centre)
    RoomFallback,
}

/// Result of asking to move through a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transit {
    /// The player moves into `room`
    Arrived {
        /// Grid coordinate of the room entered
        room: Position,
        /// Landing tile inside that room
        tile: Position,
        /// Pixel centre of the landing tile
        position: Position,
        resolution: EntryResolution,
    },
    /// No room lies beyond the door, or leaving is not allowed
    NoTransition,
}

impl Transit {
    /// Pixel position the player should be moved to, if any.
    pub fn position(&self) -> Option<Position> {
        match self {
            Transit::Arrived { position, .. } => Some(*position),
            Transit::NoTransition => None,
        }
    }

    pub fn is_arrival(&self) -> bool {
        matches!(self, Transit::Arrived { .. })
    }
}

/// Computes landing positions for door transitions.
#[derive(Debug, Clone, Copy)]
pub struct TransitPlanner {
    /// Largest ring radius searched around a blocked landing tile
    pub search_radius: i32,
}

impl Default for TransitPlanner {
    fn default() -> Self {
        Self {
            search_radius: TRANSIT_SEARCH_RADIUS,
        }
    }
}

impl TransitPlanner {
    /// Tile just inside the door the player arrives through.
    ///
    /// Leaving north means entering through the south door, and so on.
    pub fn nominal_entry_tile(room: &Room, direction: Direction) -> Position {
        let w = room.width as i32;
        let h = room.height as i32;
        match direction {
            Direction::North => Position::new(w / 2, h - 2),
            Direction::South => Position::new(w / 2, 1),
            Direction::East => Position::new(1, h / 2),
            Direction::West => Position::new(w - 2, h / 2),
        }
    }

    /// Finds the landing tile in `room` for a player leaving in `direction`.
    pub fn entry_tile(&self, room: &Room, direction: Direction) -> (Position, EntryResolution) {
        let nominal = Self::nominal_entry_tile(room, direction);
        if room.is_floor(nominal.x, nominal.y) {
            return (nominal, EntryResolution::Nominal);
        }

        for radius in 1..=self.search_radius {
            if let Some(tile) =
                chebyshev_ring(nominal, radius).find(|tile| room.is_floor(tile.x, tile.y))
            {
                debug!("Entry tile {} blocked; using {} at radius {}", nominal, tile, radius);
                return (tile, EntryResolution::RingSearch { radius });
            }
        }

        let fallback = room.first_floor_tile().unwrap_or_else(|| {
            warn!("Room {} has no floor at all; landing on its centre", room.grid_position());
            room.center()
        });
        warn!(
            "No floor within {} tiles of {} in room {}; falling back to {}",
            self.search_radius,
            nominal,
            room.grid_position(),
            fallback
        );
        (fallback, EntryResolution::RoomFallback)
    }

    /// Plans a move from the level's current room through the door on `direction`.
    ///
    /// Pure: the level is not changed. [`Level::transition`] applies the result.
    pub fn plan(&self, level: &Level, direction: Direction) -> Transit {
        let target = level.current_room_coords.step(direction);
        let room = match level.room(target) {
            Some(room) => room,
            None => {
                debug!("No room at {} beyond the {:?} door", target, direction);
                return Transit::NoTransition;
            }
        };

        let (tile, resolution) = self.entry_tile(room, direction);
        Transit::Arrived {
            room: target,
            tile,
            position: tile.tile_center_pixel(),
            resolution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{RoomType, Tile};

    fn open_room() -> Room {
        let mut room = Room::new(0, -1, 1, RoomType::Normal);
        for y in 1..18 {
            for x in 1..24 {
                room.put(x, y, Tile::Floor);
            }
        }
        room
    }

    #[test]
    fn test_nominal_entry_tiles() {
        let room = open_room();
        assert_eq!(TransitPlanner::nominal_entry_tile(&room, Direction::North), Position::new(12, 17));
        assert_eq!(TransitPlanner::nominal_entry_tile(&room, Direction::South), Position::new(12, 1));
        assert_eq!(TransitPlanner::nominal_entry_tile(&room, Direction::East), Position::new(1, 9));
        assert_eq!(TransitPlanner::nominal_entry_tile(&room, Direction::West), Position::new(23, 9));
    }

    #[test]
    fn test_entry_uses_nominal_when_free() {
        let room = open_room();
        let planner = TransitPlanner::default();
        assert_eq!(
            planner.entry_tile(&room, Direction::North),
            (Position::new(12, 17), EntryResolution::Nominal)
        );
    }

    #[test]
    fn test_entry_ring_search() {
        let mut room = open_room();
        for x in 1..24 {
            room.put(x, 17, Tile::Wall);
        }
        let (tile, resolution) = TransitPlanner::default().entry_tile(&room, Direction::North);
        assert_eq!(resolution, EntryResolution::RingSearch { radius: 1 });
        assert_eq!(tile, Position::new(11, 16));
        assert_eq!(room.tile_at(tile), Some(Tile::Floor));
    }

    #[test]
    fn test_entry_falls_back_to_first_floor() {
        let mut room = Room::new(0, 0, 1, RoomType::Normal);
        room.put(3, 2, Tile::Floor);
        let (tile, resolution) = TransitPlanner::default().entry_tile(&room, Direction::South);
        // Nine columns from the nominal tile, outside the search radius
        assert_eq!(resolution, EntryResolution::RoomFallback);
        assert_eq!(tile, Position::new(3, 2));
    }

    #[test]
    fn test_entry_in_solid_room_uses_centre() {
        let room = Room::new(0, 0, 1, RoomType::Normal);
        let (tile, resolution) = TransitPlanner::default().entry_tile(&room, Direction::East);
        assert_eq!(resolution, EntryResolution::RoomFallback);
        assert_eq!(tile, room.center());
    }
}
