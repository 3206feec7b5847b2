//! # Warren
//!
//! Procedural dungeon generation and room connectivity for a real-time action game.
//!
//! ## Architecture Overview
//!
//! A level is a graph of fixed-size rectangular rooms laid out on an integer grid
//! and linked by doors. The crate is organised around a few concepts:
//!
//! - **Game**: tiles, rooms, levels, the transit planner that moves the player
//!   between rooms, and the key/exit progression state machine
//! - **Generation**: the room graph builder, per-room layout motifs, obstacle
//!   ("chest") placement, entity spawning and the orchestrating level generator
//! - **Utils**: ring searches and flood fills shared by the generators
//!
//! All randomness flows through a single seeded [`rand::rngs::StdRng`], so a
//! [`GenerationConfig`] seed reproduces a level exactly.

pub mod game;
pub mod generation;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use utils::*;

pub use game::{
    Direction, Doors, EntityKind, EntryResolution, ExitAttempt, Level, NoticeThrottle, Pickup,
    PickupKind, Position, ProgressionState, Rect, Room, RoomEvent, RoomType, SpawnedEntity, Tile,
    Transit, TransitPlanner, WeaponKind,
};

pub use generation::{
    GenerationConfig, Generator, LevelGenerator, ObstaclePlacer, Placement, RoomGraph,
    RoomGraphBuilder, RoomLayoutGenerator, SpawnPlacer,
};

/// Core error type for the Warren dungeon engine.
#[derive(thiserror::Error, Debug)]
pub enum WarrenError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generation configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Level or room state is invalid
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Warren codebase.
pub type WarrenResult<T> = Result<T, WarrenError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Dungeon configuration constants.
pub mod config {
    /// Edge length of one tile in pixels
    pub const TILE_SIZE: i32 = 32;

    /// Default room width in tiles
    pub const ROOM_WIDTH: usize = 25;

    /// Default room height in tiles
    pub const ROOM_HEIGHT: usize = 19;

    /// Smallest room edge the layout motifs support
    pub const MIN_ROOM_EDGE: usize = 9;

    /// The last level; its exit always sits in the boss room
    pub const FINAL_LEVEL: u32 = 10;

    /// Random draws per enemy before it is skipped
    pub const DEFAULT_SPAWN_ATTEMPTS: u32 = 100;

    /// Largest Chebyshev radius the transit planner searches around a blocked entry
    pub const TRANSIT_SEARCH_RADIUS: i32 = 5;

    /// Radius of the open square cleared in the middle of a boss room
    pub const BOSS_ARENA_CLEAR_RADIUS: i32 = 5;

    /// Perimeter radius around which boss room chests are arranged
    pub const BOSS_ARENA_PERIMETER: i32 = 6;

    /// Minimum spacing between spawned entities, in tiles
    pub const SPAWN_SEPARATION_TILES: i32 = 3;
}
