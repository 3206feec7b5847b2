//! # Levels
//!
//! A level owns its rooms, knows which one the player is in, and carries the
//! key/exit progression. It is built once per level index by the
//! [`LevelGenerator`](crate::generation::LevelGenerator) and thrown away when
//! the player advances or restarts.

use crate::game::{
    Direction, ExitAttempt, NoticeThrottle, PickupKind, Position, ProgressionState, Rect, Room,
    RoomEvent, RoomType, Transit, TransitPlanner,
};
use crate::generation::{GenerationConfig, Generator, LevelGenerator};
use crate::WarrenResult;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

/// Calls between repeated "you can't do that" notices.
const NOTICE_INTERVAL: u32 = 60;

/// One dungeon level: a graph of rooms plus the player's progress through it.
#[derive(Debug, Clone)]
pub struct Level {
    /// Level index, starting at 1
    pub level_number: u32,
    /// Rooms keyed by grid coordinate
    pub rooms: HashMap<Position, Room>,
    room_order: Vec<Position>,
    /// The room the player is in; always a key of `rooms`
    pub current_room_coords: Position,
    /// Room holding the exit door
    pub exit_room_coords: Option<Position>,
    progression: ProgressionState,
    planner: TransitPlanner,
    exit_notice: NoticeThrottle,
    boss_notice: NoticeThrottle,
}

impl Level {
    /// Assembles a level from finished rooms.
    ///
    /// `room_order` lists the rooms in placement order with the start room
    /// first; the player begins in the start room at the grid origin.
    pub fn from_rooms(
        level_number: u32,
        rooms: HashMap<Position, Room>,
        room_order: Vec<Position>,
    ) -> Self {
        let exit_room_coords = room_order
            .iter()
            .copied()
            .find(|coords| {
                rooms
                    .get(coords)
                    .map_or(false, |room| room.exit_position.is_some())
            });
        Self {
            level_number,
            rooms,
            room_order,
            current_room_coords: Position::origin(),
            exit_room_coords,
            progression: ProgressionState::default(),
            planner: TransitPlanner::default(),
            exit_notice: NoticeThrottle::new(NOTICE_INTERVAL),
            boss_notice: NoticeThrottle::new(NOTICE_INTERVAL),
        }
    }

    /// Generates a level with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::{Level, Position, RoomType};
    ///
    /// let level = Level::generate(1, 42).unwrap();
    /// assert_eq!(level.current_room_coords, Position::origin());
    /// assert_eq!(level.current_room().unwrap().room_type, RoomType::Start);
    /// assert!(!level.has_key());
    /// ```
    pub fn generate(level_number: u32, seed: u64) -> WarrenResult<Self> {
        let config = GenerationConfig::new(seed, level_number);
        let mut rng = StdRng::seed_from_u64(seed);
        LevelGenerator::new().generate(&config, &mut rng)
    }

    /// Room coordinates in placement order, start room first.
    pub fn room_order(&self) -> &[Position] {
        &self.room_order
    }

    pub fn room(&self, coords: Position) -> Option<&Room> {
        self.rooms.get(&coords)
    }

    pub fn room_mut(&mut self, coords: Position) -> Option<&mut Room> {
        self.rooms.get_mut(&coords)
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.rooms.get(&self.current_room_coords)
    }

    pub fn current_room_mut(&mut self) -> Option<&mut Room> {
        self.rooms.get_mut(&self.current_room_coords)
    }

    /// Coordinates of rooms with the given role, in placement order.
    pub fn rooms_of_type(&self, room_type: RoomType) -> Vec<Position> {
        self.room_order
            .iter()
            .copied()
            .filter(|coords| {
                self.rooms
                    .get(coords)
                    .map_or(false, |room| room.room_type == room_type)
            })
            .collect()
    }

    pub fn progression(&self) -> ProgressionState {
        self.progression
    }

    pub fn has_key(&self) -> bool {
        self.progression.has_key()
    }

    pub fn show_exit_confirmation(&self) -> bool {
        self.progression == ProgressionState::ExitConfirmPending
    }

    pub fn completed(&self) -> bool {
        self.progression == ProgressionState::LevelComplete
    }

    /// Whether the player is in a boss room whose boss still lives.
    pub fn in_active_boss_room(&self) -> bool {
        self.current_room()
            .map_or(false, |room| room.room_type == RoomType::Boss && room.has_living_boss())
    }

    /// Pixel position where the player starts the level.
    pub fn get_valid_player_start_position(&self) -> Position {
        match self.room(Position::origin()) {
            Some(room) => room.get_valid_player_position(),
            None => {
                warn!("Level {} has no start room", self.level_number);
                Position::origin()
            }
        }
    }

    /// Moves the player through the door on `direction` of the current room.
    ///
    /// On arrival the current room changes; otherwise nothing does.
    pub fn transition(&mut self, direction: Direction) -> Transit {
        let transit = self.planner.plan(self, direction);
        if let Transit::Arrived { room, tile, resolution, .. } = transit {
            debug!(
                "Entered room {} at tile {} ({:?})",
                room, tile, resolution
            );
            self.current_room_coords = room;
        }
        transit
    }

    /// Moves the player if their rectangle touches a door of the current room.
    ///
    /// A boss room cannot be left while its boss is alive.
    pub fn check_door_transition(&mut self, player: &Rect) -> Transit {
        let direction = match self
            .current_room()
            .and_then(|room| room.check_door_collision(player))
        {
            Some(direction) => direction,
            None => return Transit::NoTransition,
        };

        if self.in_active_boss_room() {
            if self.boss_notice.should_emit() {
                info!("Defeat the boss to leave this room");
            }
            return Transit::NoTransition;
        }

        self.transition(direction)
    }

    /// Picks up the key if the player touches it. Returns true on pickup.
    pub fn check_key_pickup(&mut self, player: &Rect) -> bool {
        if self.has_key() {
            return false;
        }
        let touched = match self.current_room_mut() {
            Some(room) if room.check_key_collision(player) => {
                room.take_key();
                true
            }
            _ => false,
        };
        if touched {
            self.progression.key_collected();
            info!("Key collected; the exit can now be used");
        }
        touched
    }

    /// Checks the player against the exit door.
    pub fn check_exit_use(&mut self, player: &Rect) -> ExitAttempt {
        if matches!(
            self.progression,
            ProgressionState::ExitConfirmPending | ProgressionState::LevelComplete
        ) {
            return ExitAttempt::AlreadyPending;
        }

        let touching = self
            .current_room()
            .map_or(false, |room| room.check_exit_collision(player));
        if !touching {
            return ExitAttempt::NotAtExit;
        }

        if self.progression.exit_touched() {
            info!("Exit reached; waiting for confirmation");
            ExitAttempt::ConfirmationShown
        } else {
            if self.exit_notice.should_emit() {
                info!("A key is needed to use this exit");
            }
            ExitAttempt::MissingKey
        }
    }

    /// Confirms leaving the level. Does nothing unless the confirmation is showing.
    pub fn confirm_exit(&mut self) -> bool {
        let confirmed = self.progression.confirm();
        if confirmed {
            info!("Level {} complete", self.level_number);
        }
        confirmed
    }

    /// Dismisses the exit confirmation; the key stays with the player.
    pub fn cancel_exit(&mut self) -> bool {
        self.progression.cancel()
    }

    /// Updates the current room and folds its events into the progression.
    pub fn update(&mut self, rng: &mut StdRng) -> Vec<RoomEvent> {
        let events = match self.current_room_mut() {
            Some(room) => room.update(rng),
            None => return Vec::new(),
        };
        if events
            .iter()
            .any(|event| matches!(event, RoomEvent::KeyDropped { .. }))
        {
            self.progression.key_dropped();
        }
        events
    }

    /// Collision test against the current room.
    ///
    /// With no current room everything collides.
    pub fn check_collision(&self, rect: &Rect) -> bool {
        self.current_room()
            .map_or(true, |room| room.check_collision(rect))
    }

    /// Destroys a destroyable wall in the current room.
    pub fn try_destroy_wall(&mut self, x: i32, y: i32, rng: &mut StdRng) -> bool {
        match self.current_room_mut() {
            Some(room) => room.try_destroy_wall(x, y, rng),
            None => false,
        }
    }

    /// Collects a pickup in the current room the player touches.
    pub fn collect_pickup(&mut self, player: &Rect) -> Option<PickupKind> {
        self.current_room_mut()?.try_collect_pickup(player)
    }
}
