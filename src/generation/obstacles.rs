//! # Obstacle Placement
//!
//! Turns a handful of floor tiles into destroyable walls ("chests") once a
//! room's layout and doors exist. Chests stay out of door approaches and out
//! of spots that look like they would choke a path.

use crate::config::BOSS_ARENA_PERIMETER;
use crate::game::{Position, Room, RoomType, Tile};
use crate::utils::angle_around;
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Tiles from the room centre within which chests are never placed.
const CENTER_KEEPOUT: i32 = 3;

/// Places destroyable walls according to the room's role.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObstaclePlacer;

impl ObstaclePlacer {
    pub fn new() -> Self {
        Self
    }

    /// Chest budget for a room: a per-role base plus one from level 4 on.
    pub fn max_chests(room: &Room) -> usize {
        room.room_type.base_chest_count() + (room.level_number as usize / 4).min(1)
    }

    /// Floor tiles that may hold a chest, in row-major order.
    ///
    /// A tile qualifies when it is at least two tiles from the border, has no
    /// door within Chebyshev distance 2, and does not look path-critical.
    pub fn candidates(room: &Room) -> Vec<Position> {
        let mut candidates = Vec::new();
        for y in 2..room.height as i32 - 2 {
            for x in 2..room.width as i32 - 2 {
                let pos = Position::new(x, y);
                if room.is_floor(x, y) && !room.door_within(pos, 2) && !Self::blocks_path(room, pos)
                {
                    candidates.push(pos);
                }
            }
        }
        candidates
    }

    /// Local stand-in for "this tile is a chokepoint".
    ///
    /// True when two or three of the eight neighbours are floor, or when the
    /// tile is close to the room centre. It is not a true articulation check.
    pub fn blocks_path(room: &Room, pos: Position) -> bool {
        let open_neighbours = pos
            .adjacent_positions()
            .into_iter()
            .filter(|n| room.is_floor(n.x, n.y))
            .count();
        let center = room.center();
        let near_center =
            (pos.x - center.x).abs() < CENTER_KEEPOUT && (pos.y - center.y).abs() < CENTER_KEEPOUT;
        (2..=3).contains(&open_neighbours) || near_center
    }

    /// Places up to [`ObstaclePlacer::max_chests`] chests and returns their tiles.
    pub fn place(&self, room: &mut Room, rng: &mut StdRng) -> Vec<Position> {
        let budget = Self::max_chests(room);
        let candidates = Self::candidates(room);
        if candidates.is_empty() {
            debug!("No chest candidates in room {}", room.grid_position());
            return Vec::new();
        }

        let chosen = match room.room_type {
            RoomType::Boss => Self::choose_boss(room, &candidates, budget),
            RoomType::Treasure => Self::choose_treasure(room, &candidates, budget, rng),
            RoomType::Normal | RoomType::Start => {
                Self::choose_scattered(room, candidates, budget, rng)
            }
        };

        let placed: Vec<Position> = chosen
            .into_iter()
            .filter(|&pos| room.place_destroyable_wall(pos))
            .collect();
        debug!(
            "Placed {} of {} chests in {:?} room {}",
            placed.len(),
            budget,
            room.room_type,
            room.grid_position()
        );
        placed
    }

    /// Evenly spaced tiles around the arena perimeter.
    fn choose_boss(room: &Room, candidates: &[Position], budget: usize) -> Vec<Position> {
        let center = room.center();
        let mut perimeter: Vec<Position> = candidates
            .iter()
            .copied()
            .filter(|pos| {
                let distance = pos.chebyshev_distance(center) as i32;
                (distance - BOSS_ARENA_PERIMETER).abs() <= 2
            })
            .collect();
        perimeter.sort_by(|a, b| angle_around(center, *a).total_cmp(&angle_around(center, *b)));

        if perimeter.len() < budget {
            return perimeter;
        }
        let step = perimeter.len() / budget;
        (0..budget)
            .map(|i| perimeter[(i * step) % perimeter.len()])
            .collect()
    }

    /// Mirrored pairs near the centre first, then one tile per corner zone.
    fn choose_treasure(
        room: &Room,
        candidates: &[Position],
        budget: usize,
        rng: &mut StdRng,
    ) -> Vec<Position> {
        let center = room.center();
        let mut chosen: Vec<Position> = Vec::new();
        let mut used: HashSet<Position> = HashSet::new();

        let central: Vec<Position> = candidates
            .iter()
            .copied()
            .filter(|pos| (3..=5).contains(&pos.manhattan_distance(center)))
            .collect();

        'pairs: for (i, &a) in central.iter().enumerate() {
            for &b in &central[i + 1..] {
                if chosen.len() + 2 > budget {
                    break 'pairs;
                }
                let mirrored = ((a.x - center.x) + (b.x - center.x)).abs() < 2
                    && ((a.y - center.y) + (b.y - center.y)).abs() < 2;
                if mirrored && !used.contains(&a) && !used.contains(&b) {
                    chosen.extend([a, b]);
                    used.extend([a, b]);
                }
            }
        }

        let zones: [fn(i32, i32) -> bool; 4] = [
            |dx, dy| dx < -4 && dy < -4,
            |dx, dy| dx > 4 && dy < -4,
            |dx, dy| dx < -4 && dy > 4,
            |dx, dy| dx > 4 && dy > 4,
        ];
        for in_zone in zones {
            if chosen.len() >= budget {
                break;
            }
            let zone: Vec<Position> = candidates
                .iter()
                .copied()
                .filter(|pos| !used.contains(pos) && in_zone(pos.x - center.x, pos.y - center.y))
                .collect();
            if let Some(&pos) = zone.choose(rng) {
                chosen.push(pos);
                used.insert(pos);
            }
        }

        chosen
    }

    /// Random tiles, preferring ones against a wall.
    fn choose_scattered(
        room: &Room,
        mut candidates: Vec<Position>,
        budget: usize,
        rng: &mut StdRng,
    ) -> Vec<Position> {
        let mut against_wall: Vec<Position> = candidates
            .iter()
            .copied()
            .filter(|pos| {
                pos.cardinal_adjacent_positions()
                    .into_iter()
                    .any(|n| room.tile_at(n) == Some(Tile::Wall))
            })
            .collect();

        if !against_wall.is_empty() && against_wall.len() >= budget {
            against_wall.shuffle(rng);
            against_wall.truncate(budget);
            return against_wall;
        }

        candidates.shuffle(rng);
        candidates.truncate(budget);
        candidates
    }
}
