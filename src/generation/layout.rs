//! # Room Layouts
//!
//! Fills a room's tile grid from its final role: border walls, an open
//! interior, a symmetric wall motif, then door openings. Door openings always
//! win over decoration, and any floor pocket the motif cut off is joined back
//! to the rest of the room.

use crate::config::BOSS_ARENA_CLEAR_RADIUS;
use crate::game::{Direction, Position, Room, RoomType, Tile};
use crate::utils::{connected_regions, l_path, reachable_from};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Index of the wall motif a normal room at the given grid coordinate uses.
///
/// Depends only on the coordinate, so a room's motif is stable across seeds.
pub fn pattern_index(grid_x: i32, grid_y: i32) -> usize {
    ((grid_x.unsigned_abs() as usize) * 3 + (grid_y.unsigned_abs() as usize) * 7) % 9
}

/// Generates tile layouts for rooms whose role and doors are final.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomLayoutGenerator;

impl RoomLayoutGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Rebuilds every tile of the room.
    ///
    /// Earlier tiles and destroyable flags are discarded. Returns the number
    /// of cut-off floor regions that had to be joined back.
    pub fn generate(&self, room: &mut Room, rng: &mut StdRng) -> usize {
        room.reset_tiles();
        open_interior(room);

        match room.room_type {
            RoomType::Normal => {
                let motif = pattern_index(room.grid_x, room.grid_y);
                normal_motif(room, motif);
            }
            RoomType::Start => start_layout(room),
            RoomType::Boss => boss_layout(room),
            RoomType::Treasure => treasure_layout(room),
        }

        carve_doors(room);
        repair_connectivity(room, rng)
    }

    /// Turns one border tile into the level exit and opens the tile inside it.
    ///
    /// Corners, the tiles next to them and the door midpoints are never used.
    pub fn add_exit_door(&self, room: &mut Room, rng: &mut StdRng) -> Option<Position> {
        let w = room.width as i32;
        let h = room.height as i32;
        let (cx, cy) = (w / 2, h / 2);

        let mut candidates = Vec::new();
        candidates.extend((2..w - 2).filter(|&x| x != cx).map(|x| Position::new(x, 0)));
        candidates.extend((2..w - 2).filter(|&x| x != cx).map(|x| Position::new(x, h - 1)));
        candidates.extend((2..h - 2).filter(|&y| y != cy).map(|y| Position::new(w - 1, y)));
        candidates.extend((2..h - 2).filter(|&y| y != cy).map(|y| Position::new(0, y)));
        candidates.retain(|&pos| room.tile_at(pos) == Some(Tile::Wall));

        let exit = *candidates.choose(rng)?;
        room.put(exit.x, exit.y, Tile::ExitDoor);

        let inside = if exit.y == 0 {
            Position::new(exit.x, 1)
        } else if exit.y == h - 1 {
            Position::new(exit.x, h - 2)
        } else if exit.x == 0 {
            Position::new(1, exit.y)
        } else {
            Position::new(w - 2, exit.y)
        };
        room.put(inside.x, inside.y, Tile::Floor);
        room.exit_position = Some(exit);

        info!(
            "Exit door placed in room {} at tile {}",
            room.grid_position(),
            exit
        );
        Some(exit)
    }
}

/// Writes a motif wall, leaving the border untouched.
fn wall(room: &mut Room, x: i32, y: i32) {
    if x >= 1 && y >= 1 && x < room.width as i32 - 1 && y < room.height as i32 - 1 {
        room.put(x, y, Tile::Wall);
    }
}

fn pillar(room: &mut Room, x: i32, y: i32) {
    for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        wall(room, x + dx, y + dy);
    }
}

fn open_interior(room: &mut Room) {
    for y in 1..room.height as i32 - 1 {
        for x in 1..room.width as i32 - 1 {
            room.put(x, y, Tile::Floor);
        }
    }
}

fn normal_motif(room: &mut Room, motif: usize) {
    let w = room.width as i32;
    let h = room.height as i32;
    let (cx, cy) = (w / 2, h / 2);

    match motif {
        // Cross with a gap at the middle plus four flanking bars
        0 => {
            for y in 2..h - 2 {
                for x in 2..w - 2 {
                    let on_cross = x == cx || y == cy;
                    let in_gap = (x == cx && (y - cy).abs() < 3) || (y == cy && (x - cx).abs() < 3);
                    if on_cross && !in_gap {
                        wall(room, x, y);
                    } else if (x == cx - 4 || x == cx + 4) && 5 < y && y < h - 6 {
                        wall(room, x, y);
                    } else if (y == cy - 4 || y == cy + 4) && 5 < x && x < w - 6 {
                        wall(room, x, y);
                    }
                }
            }
        }
        // Four quarters split by gapped walls, each with a ring of walls
        1 => {
            let quarter_w = (w - 6) / 2;
            let quarter_h = (h - 6) / 2;
            for x in 2..w - 2 {
                if (x - cx).abs() > 2 {
                    wall(room, x, cy);
                }
            }
            for y in 2..h - 2 {
                if (y - cy).abs() > 2 {
                    wall(room, cx, y);
                }
            }
            for sy in [-1, 1] {
                for sx in [-1, 1] {
                    let oy = cy + sy * (quarter_h / 2 + 2);
                    let ox = cx + sx * (quarter_w / 2 + 2);
                    for dy in -1..=1 {
                        for dx in -1..=1 {
                            if dx != 0 || dy != 0 {
                                wall(room, ox + dx, oy + dy);
                            }
                        }
                    }
                }
            }
        }
        // Diamond outline, with an inner diamond in large rooms
        2 => {
            let radius = cx.min(cy) - 3;
            for y in 2..h - 2 {
                for x in 2..w - 2 {
                    let distance = (x - cx).abs() + (y - cy).abs();
                    if distance == radius || (distance == radius / 2 && radius > 6) {
                        wall(room, x, y);
                    }
                }
            }
        }
        // Four pillars joined by gapped walls
        3 => {
            let pillars = [
                (cx / 2, cy / 2),
                (cx + cx / 2, cy / 2),
                (cx / 2, cy + cy / 2),
                (cx + cx / 2, cy + cy / 2),
            ];
            for (px, py) in pillars {
                pillar(room, px, py);
            }
            if cx > 5 && cy > 5 {
                let (left, top) = pillars[0];
                let right = pillars[1].0;
                let bottom = pillars[2].1;
                for x in left + 2..right {
                    if (x - left) % 3 != 0 {
                        wall(room, x, top);
                        wall(room, x, bottom);
                    }
                }
                for y in top + 2..bottom {
                    if (y - top) % 3 != 0 {
                        wall(room, left, y);
                        wall(room, right, y);
                    }
                }
            }
        }
        // Grid of gapped wall lines mirrored about the centre
        4 => {
            for offset in (3..cy).step_by(3) {
                for x in 3..w - 3 {
                    if (x - 3) % 6 != 0 {
                        wall(room, x, cy - offset);
                        wall(room, x, cy + offset);
                    }
                }
            }
            for offset in (3..cx).step_by(3) {
                for y in 3..h - 3 {
                    if (y - 3) % 6 != 0 {
                        wall(room, cx - offset, y);
                        wall(room, cx + offset, y);
                    }
                }
            }
        }
        // Concentric rings every five tiles of Euclidean distance
        5 => {
            for y in 2..h - 2 {
                for x in 2..w - 2 {
                    let distance = (((x - cx).pow(2) + (y - cy).pow(2)) as f64).sqrt();
                    if (distance as i32) % 5 == 0 && distance > 3.0 {
                        wall(room, x, y);
                    }
                }
            }
        }
        // Checkerboard of 2x2 blocks on a 3-tile lattice
        6 => {
            let square = 3;
            for y in (3..h - 3).step_by(square as usize) {
                for x in (3..w - 3).step_by(square as usize) {
                    if (x / square + y / square) % 2 == 0 {
                        for dy in 0..square - 1 {
                            for dx in 0..square - 1 {
                                wall(room, x + dx, y + dy);
                            }
                        }
                    }
                }
            }
        }
        // Four arms of 2x2 blocks stepping out from the centre
        7 => {
            let max_radius = cx.min(cy) - 3;
            for radius in (3..max_radius).step_by(2) {
                for (ax, ay) in [(1, 0), (0, 1), (-1, 0), (0, -1)] {
                    let x = cx + radius * ax;
                    let y = cy + radius * ay;
                    if 2 <= x && x < w - 2 && 2 <= y && y < h - 2 {
                        wall(room, x, y);
                        let down = y + 1 < h - 2;
                        let right = x + 1 < w - 2;
                        if down {
                            wall(room, x, y + 1);
                        }
                        if right {
                            wall(room, x + 1, y);
                        }
                        if down && right {
                            wall(room, x + 1, y + 1);
                        }
                    }
                }
            }
        }
        // Four hollow chambers joined by walled hallways
        _ => {
            let chambers = [
                (cx - cx / 2, cy - cy / 2),
                (cx + cx / 2, cy - cy / 2),
                (cx - cx / 2, cy + cy / 2),
                (cx + cx / 2, cy + cy / 2),
            ];
            let half = 2;
            for (rx, ry) in chambers {
                for y in ry - half..=ry + half {
                    for x in rx - half..=rx + half {
                        if x == rx - half || x == rx + half || y == ry - half || y == ry + half {
                            wall(room, x, y);
                        }
                    }
                }
            }
            for x in chambers[0].0 + half + 1..chambers[1].0 - half {
                for y in [
                    cy - cy / 2 - 1,
                    cy - cy / 2 + 1,
                    cy + cy / 2 - 1,
                    cy + cy / 2 + 1,
                ] {
                    wall(room, x, y);
                }
            }
            for y in chambers[0].1 + half + 1..chambers[2].1 - half {
                for x in [
                    cx - cx / 2 - 1,
                    cx - cx / 2 + 1,
                    cx + cx / 2 - 1,
                    cx + cx / 2 + 1,
                ] {
                    wall(room, x, y);
                }
            }
        }
    }
}

fn start_layout(room: &mut Room) {
    let cx = room.width as i32 / 2;
    let cy = room.height as i32 / 2;

    for offset in (3..cx.min(cy) - 2).step_by(4) {
        for d in [-2, -1, 1, 2] {
            wall(room, cx + d, cy - offset);
            wall(room, cx + d, cy + offset);
            wall(room, cx - offset, cy + d);
            wall(room, cx + offset, cy + d);
        }
    }

    // The centre stays open for the player
    for y in cy - 2..=cy + 2 {
        for x in cx - 2..=cx + 2 {
            room.put(x, y, Tile::Floor);
        }
    }
}

fn boss_layout(room: &mut Room) {
    let w = room.width as i32;
    let h = room.height as i32;
    let (cx, cy) = (w / 2, h / 2);
    let radius = BOSS_ARENA_CLEAR_RADIUS;

    let pillar_distance = radius + 1;
    for (px, py) in [
        (cx - pillar_distance, cy - pillar_distance),
        (cx + pillar_distance, cy - pillar_distance),
        (cx - pillar_distance, cy + pillar_distance),
        (cx + pillar_distance, cy + pillar_distance),
    ] {
        if 0 < px && px + 1 < w - 1 && 0 < py && py + 1 < h - 1 {
            pillar(room, px, py);
        }
    }

    let edge = radius + 2;
    for offset in (-edge..=edge).step_by(4) {
        if offset == 0 || offset.abs() == edge {
            continue;
        }
        if 3 <= cy + offset && cy + offset < h - 3 {
            wall(room, cx - edge, cy + offset);
            wall(room, cx + edge, cy + offset);
        }
        if 3 <= cx + offset && cx + offset < w - 3 {
            wall(room, cx + offset, cy - edge);
            wall(room, cx + offset, cy + edge);
        }
    }
}

fn treasure_layout(room: &mut Room) {
    let w = room.width as i32;
    let h = room.height as i32;
    let (cx, cy) = (w / 2, h / 2);

    for (x0, y0) in [(2, 2), (2, h - 5), (w - 5, 2), (w - 5, h - 5)] {
        for i in 0..3 {
            wall(room, x0 + i, y0);
            wall(room, x0, y0 + i);
        }
    }

    let half = 2;
    for y in cy - half..=cy + half {
        for x in cx - half..=cx + half {
            let on_edge = x == cx - half || x == cx + half || y == cy - half || y == cy + half;
            let opening = (x == cx && (y - cy).abs() == half) || (y == cy && (x - cx).abs() == half);
            if on_edge && !opening {
                wall(room, x, y);
            }
        }
    }
}

/// Floor tile just inside the door on the given side.
fn door_threshold(room: &Room, direction: Direction) -> Position {
    let w = room.width as i32;
    let h = room.height as i32;
    match direction {
        Direction::North => Position::new(w / 2, 1),
        Direction::East => Position::new(w - 2, h / 2),
        Direction::South => Position::new(w / 2, h - 2),
        Direction::West => Position::new(1, h / 2),
    }
}

/// Opens every flagged door and clears a 3x3 approach inside it.
fn carve_doors(room: &mut Room) {
    let w = room.width as i32;
    let h = room.height as i32;
    let (cx, cy) = (w / 2, h / 2);

    for direction in room.doors.open_directions() {
        let (door, xs, ys) = match direction {
            Direction::North => (Position::new(cx, 0), cx - 1..=cx + 1, 1..=3),
            Direction::South => (Position::new(cx, h - 1), cx - 1..=cx + 1, h - 4..=h - 2),
            Direction::East => (Position::new(w - 1, cy), w - 4..=w - 2, cy - 1..=cy + 1),
            Direction::West => (Position::new(0, cy), 1..=3, cy - 1..=cy + 1),
        };
        room.put(door.x, door.y, Tile::Door);
        for y in ys {
            for x in xs.clone() {
                if x >= 1 && y >= 1 && x < w - 1 && y < h - 1 {
                    room.put(x, y, Tile::Floor);
                }
            }
        }
    }
}

/// Joins every floor region unreachable from the room's entry back to it.
///
/// The fill starts inside the first open door (north, east, south, west),
/// else at the centre, else at the first floor tile. Each cut-off region is
/// linked by an L-shaped path between its closest tile and the closest
/// reachable tile. Returns the number of regions joined.
pub fn repair_connectivity(room: &mut Room, rng: &mut StdRng) -> usize {
    let mut start = room
        .doors
        .open_directions()
        .first()
        .map(|&direction| door_threshold(room, direction))
        .unwrap_or_else(|| room.center());

    if !room.is_floor(start.x, start.y) {
        match room.first_floor_tile() {
            Some(tile) => start = tile,
            None => return 0,
        }
    }

    let reachable = {
        let snapshot: &Room = room;
        reachable_from(start, |pos| snapshot.is_floor(pos.x, pos.y))
    };

    let unreachable: Vec<Position> = room
        .positions_of(Tile::Floor)
        .into_iter()
        .filter(|pos| !reachable.contains(pos))
        .collect();
    if unreachable.is_empty() {
        return 0;
    }

    let regions = {
        let snapshot: &Room = room;
        connected_regions(&unreachable, |pos| snapshot.is_floor(pos.x, pos.y))
    };
    let cut_off: HashSet<Position> = unreachable.iter().copied().collect();

    for region in &regions {
        let accessible: Vec<Position> = room
            .positions_of(Tile::Floor)
            .into_iter()
            .filter(|pos| !cut_off.contains(pos))
            .collect();

        let mut best: Option<(u32, Position, Position)> = None;
        for &from in region {
            for &to in &accessible {
                let distance = from.manhattan_distance(to);
                if best.map_or(true, |(d, _, _)| distance < d) {
                    best = Some((distance, from, to));
                }
            }
        }

        if let Some((_, from, to)) = best {
            let horizontal_first = rng.gen_bool(0.5);
            for pos in l_path(from, to, horizontal_first) {
                room.put(pos.x, pos.y, Tile::Floor);
            }
        }
    }

    debug!(
        "Joined {} cut-off region(s) in room {}",
        regions.len(),
        room.grid_position()
    );
    regions.len()
}
