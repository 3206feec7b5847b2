//! # Rooms
//!
//! A room is one fixed-size tile grid in the level graph. Generation fills in
//! its tiles; at runtime it answers collision queries, tracks the entities and
//! pickups inside it, and applies the one-way consequences of destroying a
//! chest or defeating a boss.

use crate::config::{ROOM_HEIGHT, ROOM_WIDTH, TILE_SIZE};
use crate::game::{
    Direction, EntityId, Pickup, PickupKind, Position, Rect, SpawnedEntity, Tile, WeaponKind,
};
use crate::{WarrenError, WarrenResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role a room plays in the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    /// The room at grid origin where the player begins
    Start,
    /// Standard room with one of the nine symmetric motifs
    Normal,
    /// Arena room holding the level boss and, later, the key
    Boss,
    /// Open room with extra chests
    Treasure,
}

impl RoomType {
    /// Number of chests a room of this type gets before the level bonus.
    pub fn base_chest_count(self) -> usize {
        match self {
            RoomType::Normal => 2,
            RoomType::Boss => 3,
            RoomType::Treasure => 4,
            RoomType::Start => 1,
        }
    }

    /// Single character used on the level overview map.
    pub fn glyph(self) -> char {
        match self {
            RoomType::Start => 'S',
            RoomType::Normal => 'o',
            RoomType::Boss => 'B',
            RoomType::Treasure => 'T',
        }
    }
}

/// Door flags for the four sides of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Doors {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl Doors {
    /// Whether there is a door on the given side.
    pub fn is_open(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::East => self.east,
            Direction::South => self.south,
            Direction::West => self.west,
        }
    }

    /// Sets the door flag on the given side.
    pub fn set(&mut self, direction: Direction, open: bool) {
        match direction {
            Direction::North => self.north = open,
            Direction::East => self.east = open,
            Direction::South => self.south = open,
            Direction::West => self.west = open,
        }
    }

    /// Open sides in north, east, south, west order.
    pub fn open_directions(&self) -> Vec<Direction> {
        Direction::all()
            .into_iter()
            .filter(|&direction| self.is_open(direction))
            .collect()
    }
}

/// Something that happened while a room was updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// An enemy's death was processed, possibly leaving a pickup
    EnemyDefeated {
        id: EntityId,
        drop: Option<PickupKind>,
    },
    /// The boss was found dead for the first time
    BossDefeated { tile: Position },
    /// The level key appeared at a pixel position
    KeyDropped { position: Position },
    /// A weapon chest was raised in the middle of the room
    WeaponChestPlaced { tile: Position, weapon: WeaponKind },
}

/// One room of a level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    /// Column of this room in the level grid
    pub grid_x: i32,
    /// Row of this room in the level grid
    pub grid_y: i32,
    /// Level this room belongs to
    pub level_number: u32,
    /// Role of this room; only changed during generation
    pub room_type: RoomType,
    /// Width in tiles
    pub width: usize,
    /// Height in tiles
    pub height: usize,
    /// Door flags, mirrored on the neighbouring room
    pub doors: Doors,
    tiles: Vec<Vec<Tile>>,
    destroyable_walls: Vec<Vec<bool>>,
    /// Regular enemies; dead ones are removed by `update`
    pub enemies: Vec<SpawnedEntity>,
    /// The boss, for boss rooms where one could be placed
    pub boss: Option<SpawnedEntity>,
    /// Items lying in the room
    pub pickups: Vec<Pickup>,
    /// Tile holding the level exit, if this room has it
    pub exit_position: Option<Position>,
    /// Pixel position of the dropped key
    pub key_position: Option<Position>,
    /// Set once the boss has dropped the key
    pub key_dropped: bool,
    /// Set once the player took the key from this room
    pub key_picked_up: bool,
    /// Tile where the dead boss lies; set once
    pub boss_remains: Option<Position>,
    /// Weapon chest still waiting to be opened
    pub weapon_chest: Option<(Position, WeaponKind)>,
    /// Set once the boss's weapon chest was raised
    pub weapon_chest_placed: bool,
}

impl Room {
    /// Creates a room of the default size with every tile a wall.
    ///
    /// Tiles stay walls until a layout generator fills them in.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::{Room, RoomType, Tile};
    ///
    /// let room = Room::new(0, 0, 1, RoomType::Start);
    /// assert_eq!(room.width, 25);
    /// assert_eq!(room.height, 19);
    /// assert_eq!(room.tile(5, 5), Some(Tile::Wall));
    /// ```
    pub fn new(grid_x: i32, grid_y: i32, level_number: u32, room_type: RoomType) -> Self {
        Self::with_size(grid_x, grid_y, level_number, room_type, ROOM_WIDTH, ROOM_HEIGHT)
    }

    /// Creates a room with explicit dimensions.
    pub fn with_size(
        grid_x: i32,
        grid_y: i32,
        level_number: u32,
        room_type: RoomType,
        width: usize,
        height: usize,
    ) -> Self {
        Self {
            grid_x,
            grid_y,
            level_number,
            room_type,
            width,
            height,
            doors: Doors::default(),
            tiles: vec![vec![Tile::Wall; width]; height],
            destroyable_walls: vec![vec![false; width]; height],
            enemies: Vec::new(),
            boss: None,
            pickups: Vec::new(),
            exit_position: None,
            key_position: None,
            key_dropped: false,
            key_picked_up: false,
            boss_remains: None,
            weapon_chest: None,
            weapon_chest_placed: false,
        }
    }

    /// Grid coordinate of this room in the level.
    pub fn grid_position(&self) -> Position {
        Position::new(self.grid_x, self.grid_y)
    }

    /// Centre tile of the room.
    pub fn center(&self) -> Position {
        Position::new(self.width as i32 / 2, self.height as i32 / 2)
    }

    /// Whether a tile coordinate lies inside the grid.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Tile at a coordinate, or None outside the grid.
    pub fn tile(&self, x: i32, y: i32) -> Option<Tile> {
        if self.in_bounds(x, y) {
            Some(self.tiles[y as usize][x as usize])
        } else {
            None
        }
    }

    /// Tile at a position, or None outside the grid.
    pub fn tile_at(&self, pos: Position) -> Option<Tile> {
        self.tile(pos.x, pos.y)
    }

    /// Whether the tile at a coordinate is floor. False outside the grid.
    pub fn is_floor(&self, x: i32, y: i32) -> bool {
        self.tile(x, y) == Some(Tile::Floor)
    }

    /// The whole tile grid, indexed `[y][x]`.
    pub fn tiles(&self) -> &[Vec<Tile>] {
        &self.tiles
    }

    /// The destroyable-wall grid, aligned with `tiles()`.
    pub fn destroyable_walls(&self) -> &[Vec<bool>] {
        &self.destroyable_walls
    }

    /// Whether the tile at a coordinate is a destroyable wall.
    pub fn is_destroyable(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.destroyable_walls[y as usize][x as usize]
    }

    /// Overwrites a tile.
    ///
    /// Any destroyable flag on the tile is cleared, so a chest overwritten
    /// with a plain tile becomes an ordinary one.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> WarrenResult<()> {
        if !self.in_bounds(pos.x, pos.y) {
            return Err(WarrenError::InvalidState(format!(
                "tile {} is outside a {}x{} room",
                pos, self.width, self.height
            )));
        }
        self.tiles[pos.y as usize][pos.x as usize] = tile;
        self.destroyable_walls[pos.y as usize][pos.x as usize] = false;
        Ok(())
    }

    /// Writes a tile if the coordinate is inside the grid; ignores it otherwise.
    pub(crate) fn put(&mut self, x: i32, y: i32, tile: Tile) {
        if self.in_bounds(x, y) {
            self.tiles[y as usize][x as usize] = tile;
            self.destroyable_walls[y as usize][x as usize] = false;
        }
    }

    /// Resets every tile to wall and clears all destroyable flags.
    pub(crate) fn reset_tiles(&mut self) {
        self.tiles = vec![vec![Tile::Wall; self.width]; self.height];
        self.destroyable_walls = vec![vec![false; self.width]; self.height];
    }

    /// Turns a floor tile into a destroyable wall (a chest).
    ///
    /// Returns false and changes nothing unless the tile is floor.
    pub fn place_destroyable_wall(&mut self, pos: Position) -> bool {
        if !self.is_floor(pos.x, pos.y) {
            return false;
        }
        self.tiles[pos.y as usize][pos.x as usize] = Tile::Wall;
        self.destroyable_walls[pos.y as usize][pos.x as usize] = true;
        true
    }

    /// All tile coordinates of the given kind, in row-major order.
    pub fn positions_of(&self, kind: Tile) -> Vec<Position> {
        let mut positions = Vec::new();
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, &tile) in row.iter().enumerate() {
                if tile == kind {
                    positions.push(Position::new(x as i32, y as i32));
                }
            }
        }
        positions
    }

    /// Number of floor tiles in the room.
    pub fn floor_count(&self) -> usize {
        self.tiles
            .iter()
            .flat_map(|row| row.iter())
            .filter(|tile| tile.is_floor())
            .count()
    }

    /// First interior floor tile in row-major order.
    pub fn first_floor_tile(&self) -> Option<Position> {
        for y in 1..self.height.saturating_sub(1) {
            for x in 1..self.width.saturating_sub(1) {
                if self.tiles[y][x] == Tile::Floor {
                    return Some(Position::new(x as i32, y as i32));
                }
            }
        }
        None
    }

    /// Whether any door tile lies within the given Chebyshev radius.
    pub fn door_within(&self, pos: Position, radius: i32) -> bool {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if self.tile(pos.x + dx, pos.y + dy) == Some(Tile::Door) {
                    return true;
                }
            }
        }
        false
    }

    /// Whether a tile sits in the approach lane of an open door.
    ///
    /// Narrower than [`Room::door_within`]: only the three tiles deep by three
    /// wide corridor just inside each door counts.
    pub fn near_door(&self, x: i32, y: i32) -> bool {
        let w = self.width as i32;
        let h = self.height as i32;
        (self.doors.north && y < 3 && (x - w / 2).abs() < 2)
            || (self.doors.south && y > h - 4 && (x - w / 2).abs() < 2)
            || (self.doors.east && x > w - 4 && (y - h / 2).abs() < 2)
            || (self.doors.west && x < 3 && (y - h / 2).abs() < 2)
    }

    /// Pixel position where the player should stand when placed in this room
    /// without a door to enter through.
    pub fn get_valid_player_position(&self) -> Position {
        if self.room_type == RoomType::Start {
            return self.center().tile_center_pixel();
        }
        match self.first_floor_tile() {
            Some(tile) => tile.tile_center_pixel(),
            None => {
                warn!(
                    "Room {} has no floor tile; using its centre",
                    self.grid_position()
                );
                self.center().tile_center_pixel()
            }
        }
    }

    /// Checks whether a pixel rectangle hits a wall or leaves the room.
    pub fn check_collision(&self, rect: &Rect) -> bool {
        if rect.left() < 0
            || rect.top() < 0
            || rect.right() > self.width as i32 * TILE_SIZE
            || rect.bottom() > self.height as i32 * TILE_SIZE
        {
            return true;
        }
        self.check_collision_walls_only(rect)
    }

    /// Checks whether a pixel rectangle hits a wall tile, ignoring room bounds.
    pub fn check_collision_walls_only(&self, rect: &Rect) -> bool {
        self.touched_tiles(rect, |tile| tile.is_blocking()).next().is_some()
    }

    /// Returns the side of the door the rectangle touches, if any.
    pub fn check_door_collision(&self, rect: &Rect) -> Option<Direction> {
        let (x, y) = self
            .touched_tiles(rect, |tile| tile == Tile::Door)
            .map(|pos| (pos.x, pos.y))
            .next()?;
        if y == 0 {
            Some(Direction::North)
        } else if y == self.height as i32 - 1 {
            Some(Direction::South)
        } else if x == 0 {
            Some(Direction::West)
        } else if x == self.width as i32 - 1 {
            Some(Direction::East)
        } else {
            None
        }
    }

    /// Checks whether the rectangle touches this room's exit door.
    pub fn check_exit_collision(&self, rect: &Rect) -> bool {
        match self.exit_position {
            Some(exit) => rect.intersects(&Rect::from_tile(exit)),
            None => false,
        }
    }

    /// Checks whether the rectangle touches the dropped key.
    ///
    /// The key's hitbox is two tiles square so it is easy to grab.
    pub fn check_key_collision(&self, rect: &Rect) -> bool {
        if !self.key_dropped {
            return false;
        }
        match self.key_position {
            Some(key) => rect.intersects(&Rect::centered(key, TILE_SIZE * 2, TILE_SIZE * 2)),
            None => false,
        }
    }

    /// Tiles overlapped by a rectangle that satisfy a predicate.
    fn touched_tiles<'a>(
        &'a self,
        rect: &'a Rect,
        wanted: fn(Tile) -> bool,
    ) -> impl Iterator<Item = Position> + 'a {
        let span = rect.tile_span(self.width, self.height);
        span.into_iter().flat_map(move |(lo, hi)| {
            (lo.y..=hi.y).flat_map(move |y| {
                (lo.x..=hi.x).filter_map(move |x| {
                    let pos = Position::new(x, y);
                    let tile = self.tiles[y as usize][x as usize];
                    (wanted(tile) && rect.intersects(&Rect::from_tile(pos))).then_some(pos)
                })
            })
        })
    }

    /// Tries to destroy the wall at a tile coordinate.
    ///
    /// Only destroyable walls break. A broken wall becomes floor for good and
    /// may leave a pickup; a boss weapon chest always yields its weapon.
    pub fn try_destroy_wall(&mut self, x: i32, y: i32, rng: &mut StdRng) -> bool {
        if !self.in_bounds(x, y) {
            warn!(
                "Wall position ({}, {}) is outside room {}",
                x,
                y,
                self.grid_position()
            );
            return false;
        }

        let (ux, uy) = (x as usize, y as usize);
        if self.tiles[uy][ux] != Tile::Wall || !self.destroyable_walls[uy][ux] {
            debug!("No destroyable wall at ({}, {})", x, y);
            return false;
        }

        self.tiles[uy][ux] = Tile::Floor;
        self.destroyable_walls[uy][ux] = false;

        let pos = Position::new(x, y);
        let center = pos.tile_center_pixel();

        if let Some((chest, weapon)) = self.weapon_chest {
            if chest == pos {
                self.weapon_chest = None;
                self.pickups
                    .push(Pickup::new(PickupKind::Weapon(weapon), center));
                info!("Weapon chest opened: {:?}", weapon);
                return true;
            }
        }

        let roll: f64 = rng.gen();
        let drop = if roll < 0.3 {
            Some(PickupKind::Health)
        } else if roll < 0.5 {
            Some(PickupKind::Arrows)
        } else {
            None
        };
        if let Some(kind) = drop {
            self.pickups.push(Pickup::new(kind, center));
        }
        debug!("Destroyed wall at ({}, {}), drop {:?}", x, y, drop);
        true
    }

    /// Collects the first uncollected pickup the rectangle touches.
    pub fn try_collect_pickup(&mut self, rect: &Rect) -> Option<PickupKind> {
        let pickup = self.pickups.iter_mut().find(|pickup| {
            !pickup.collected
                && rect.intersects(&Rect::centered(pickup.position, TILE_SIZE, TILE_SIZE))
        })?;
        pickup.collected = true;
        Some(pickup.kind)
    }

    /// Whether the room holds a boss that is still alive.
    pub fn has_living_boss(&self) -> bool {
        self.boss.as_ref().map_or(false, |boss| boss.is_alive())
    }

    /// True when no enemies remain and the boss is absent or dead.
    pub fn is_cleared(&self) -> bool {
        self.enemies.is_empty() && !self.has_living_boss()
    }

    /// Processes deaths in the room.
    ///
    /// Dead enemies are removed (with a chance of a drop). A dead boss leaves
    /// its remains, the key and, on some levels, a weapon chest; each of those
    /// happens once no matter how often this is called.
    pub fn update(&mut self, rng: &mut StdRng) -> Vec<RoomEvent> {
        let mut events = Vec::new();

        if let Some(boss) = self.boss.as_ref().filter(|boss| !boss.is_alive()) {
            let boss_tile = boss.tile;
            let boss_center = boss.center_pixel();

            if self.boss_remains.is_none() {
                self.boss_remains = Some(boss_tile);
                events.push(RoomEvent::BossDefeated { tile: boss_tile });
            }

            if let Some(event) = self.drop_key(boss_center) {
                events.push(event);
            }

            if let Some(event) = self.raise_weapon_chest() {
                events.push(event);
            }
        }

        let mut survivors = Vec::with_capacity(self.enemies.len());
        for enemy in self.enemies.drain(..) {
            if enemy.is_alive() {
                survivors.push(enemy);
                continue;
            }
            let roll: f64 = rng.gen();
            let drop = if roll < 0.1 {
                Some(PickupKind::Health)
            } else if roll < 0.18 {
                Some(PickupKind::Arrows)
            } else {
                None
            };
            if let Some(kind) = drop {
                self.pickups.push(Pickup::new(kind, enemy.center_pixel()));
            }
            events.push(RoomEvent::EnemyDefeated { id: enemy.id, drop });
        }
        self.enemies = survivors;

        events
    }

    fn drop_key(&mut self, at: Position) -> Option<RoomEvent> {
        if self.room_type != RoomType::Boss || self.key_dropped || self.key_picked_up {
            return None;
        }
        self.key_position = Some(at);
        self.key_dropped = true;
        info!("Boss defeated; key dropped at {}", at);
        Some(RoomEvent::KeyDropped { position: at })
    }

    fn raise_weapon_chest(&mut self) -> Option<RoomEvent> {
        if self.room_type != RoomType::Boss || self.weapon_chest_placed {
            return None;
        }
        let weapon = WeaponKind::reward_for_level(self.level_number)?;
        let center = self.center();
        self.put(center.x, center.y, Tile::Wall);
        self.destroyable_walls[center.y as usize][center.x as usize] = true;
        self.weapon_chest = Some((center, weapon));
        self.weapon_chest_placed = true;
        Some(RoomEvent::WeaponChestPlaced {
            tile: center,
            weapon,
        })
    }

    /// Marks the key as taken by the player.
    pub(crate) fn take_key(&mut self) {
        self.key_dropped = false;
        self.key_position = None;
        self.key_picked_up = true;
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.tiles.iter().enumerate() {
            let line: String = row
                .iter()
                .enumerate()
                .map(|(x, tile)| {
                    let pos = Position::new(x as i32, y as i32);
                    if self.boss.as_ref().map_or(false, |b| b.is_alive() && b.tile == pos) {
                        'B'
                    } else if self.enemies.iter().any(|e| e.is_alive() && e.tile == pos) {
                        'E'
                    } else if self.destroyable_walls[y][x] {
                        'C'
                    } else {
                        tile.glyph()
                    }
                })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
