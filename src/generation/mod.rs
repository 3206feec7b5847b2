//! # Generation Module
//!
//! Procedural content generation for dungeon levels.
//!
//! A level is built in phases, each driven by the same seeded random number
//! generator:
//! 1. [`RoomGraphBuilder`] grows the door graph and assigns room roles
//! 2. [`RoomLayoutGenerator`] fills each room's tiles once roles are final
//! 3. [`ObstaclePlacer`] scatters destroyable walls
//! 4. [`SpawnPlacer`] places the boss and regular enemies
//! 5. [`LevelGenerator`] ties the phases together and places the exit

pub mod dungeon;
pub mod graph;
pub mod layout;
pub mod obstacles;
pub mod spawns;

pub use dungeon::*;
pub use graph::*;
pub use layout::*;
pub use obstacles::*;
pub use spawns::*;

use crate::config::{DEFAULT_SPAWN_ATTEMPTS, MIN_ROOM_EDGE, ROOM_HEIGHT, ROOM_WIDTH};
use crate::game::Position;
use crate::{WarrenError, WarrenResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for procedural generation.
///
/// Controls the size of a level, the room dimensions and whether entities
/// are spawned. Every field except `seed` and `level_number` has a default,
/// so a JSON config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Level index, starting at 1
    pub level_number: u32,
    /// Number of rooms to aim for; defaults to `4 + level_number`
    #[serde(default)]
    pub target_room_count: Option<usize>,
    /// Room width in tiles
    #[serde(default = "default_room_width")]
    pub room_width: usize,
    /// Room height in tiles
    #[serde(default = "default_room_height")]
    pub room_height: usize,
    /// Random draws per enemy before it is skipped
    #[serde(default = "default_spawn_attempts")]
    pub spawn_attempts: u32,
    /// Whether bosses and enemies are placed at all
    #[serde(default = "default_spawn_entities")]
    pub spawn_entities: bool,
}

fn default_room_width() -> usize {
    ROOM_WIDTH
}

fn default_room_height() -> usize {
    ROOM_HEIGHT
}

fn default_spawn_attempts() -> u32 {
    DEFAULT_SPAWN_ATTEMPTS
}

fn default_spawn_entities() -> bool {
    true
}

impl GenerationConfig {
    /// Creates a configuration for the given level with default room sizes.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42, 3);
    /// assert_eq!(config.room_target(), 7);
    /// assert_eq!(config.max_enemies_per_room(), 3);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64, level_number: u32) -> Self {
        Self {
            seed,
            level_number,
            target_room_count: None,
            room_width: ROOM_WIDTH,
            room_height: ROOM_HEIGHT,
            spawn_attempts: DEFAULT_SPAWN_ATTEMPTS,
            spawn_entities: true,
        }
    }

    /// Creates a configuration for testing with a small first level.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            target_room_count: Some(6),
            ..Self::new(seed, 1)
        }
    }

    /// Loads a configuration from a JSON file and validates it.
    pub fn from_json_file(path: impl AsRef<Path>) -> WarrenResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: GenerationConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of rooms the graph builder aims for.
    pub fn room_target(&self) -> usize {
        self.target_room_count
            .unwrap_or(4 + self.level_number as usize)
    }

    /// Upper bound on regular enemies in a normal room.
    pub fn max_enemies_per_room(&self) -> usize {
        2 + self.level_number as usize / 2
    }

    /// Checks that the configuration can produce a level.
    pub fn validate(&self) -> WarrenResult<()> {
        if self.level_number == 0 {
            return Err(WarrenError::InvalidConfig(
                "level_number starts at 1".to_string(),
            ));
        }
        if self.room_width < MIN_ROOM_EDGE || self.room_height < MIN_ROOM_EDGE {
            return Err(WarrenError::InvalidConfig(format!(
                "rooms must be at least {}x{} tiles, got {}x{}",
                MIN_ROOM_EDGE, MIN_ROOM_EDGE, self.room_width, self.room_height
            )));
        }
        if self.room_target() < 3 {
            return Err(WarrenError::InvalidConfig(format!(
                "a level needs room for a start, boss and treasure room, got a target of {}",
                self.room_target()
            )));
        }
        if self.spawn_attempts == 0 {
            return Err(WarrenError::InvalidConfig(
                "spawn_attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42, 1)
    }
}

/// Outcome of trying to put something into a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Placed on this tile
    Placed(Position),
    /// No valid tile was found; the room is left without it
    Skipped { reason: &'static str },
}

impl Placement {
    /// The tile used, if the placement succeeded.
    pub fn position(&self) -> Option<Position> {
        match self {
            Placement::Placed(pos) => Some(*pos),
            Placement::Skipped { .. } => None,
        }
    }

    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed(_))
    }
}

/// Trait for procedural generators.
///
/// All generation systems in Warren that produce a whole artefact from a
/// configuration implement this trait.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> WarrenResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> WarrenResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::game::{Level, RoomType};
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Validates that a level meets the structural requirements.
    ///
    /// Checks the start room, role counts, door symmetry and that every room
    /// has somewhere to stand.
    pub fn validate_level(level: &Level) -> WarrenResult<()> {
        let start = Position::origin();
        match level.room(start) {
            Some(room) if room.room_type == RoomType::Start => {}
            _ => {
                return Err(WarrenError::GenerationFailed(
                    "no start room at the grid origin".to_string(),
                ))
            }
        }

        if level.rooms_of_type(RoomType::Start).len() != 1 {
            return Err(WarrenError::GenerationFailed(
                "level must have exactly one start room".to_string(),
            ));
        }

        if level.room(level.current_room_coords).is_none() {
            return Err(WarrenError::InvalidState(format!(
                "current room {} does not exist",
                level.current_room_coords
            )));
        }

        for (&coords, room) in &level.rooms {
            for direction in crate::game::Direction::all() {
                let neighbour = level.room(coords.step(direction));
                let mirrored = neighbour
                    .map_or(false, |other| other.doors.is_open(direction.opposite()));
                if room.doors.is_open(direction) != mirrored {
                    return Err(WarrenError::GenerationFailed(format!(
                        "door {:?} of room {} is not mirrored",
                        direction, coords
                    )));
                }
            }

            if room.floor_count() == 0 {
                return Err(WarrenError::GenerationFailed(format!(
                    "room {} has no floor tiles",
                    coords
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345, 1);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.room_target(), 5);
        assert_eq!(config.room_width, 25);
        assert_eq!(config.room_height, 19);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generation_config_validation() {
        let mut config = GenerationConfig::new(1, 0);
        assert!(matches!(config.validate(), Err(WarrenError::InvalidConfig(_))));

        config.level_number = 1;
        config.room_width = 8;
        assert!(config.validate().is_err());

        config.room_width = 9;
        config.room_height = 9;
        assert!(config.validate().is_ok());

        config.target_room_count = Some(2);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enemy_scaling() {
        assert_eq!(GenerationConfig::new(0, 1).max_enemies_per_room(), 2);
        assert_eq!(GenerationConfig::new(0, 4).max_enemies_per_room(), 4);
        assert_eq!(GenerationConfig::new(0, 10).max_enemies_per_room(), 7);
    }

    #[test]
    fn test_config_from_json_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "seed": 9, "level_number": 2 }}"#).unwrap();

        let config = GenerationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config, GenerationConfig::new(9, 2));
    }

    #[test]
    fn test_config_from_json_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();
        assert!(matches!(
            GenerationConfig::from_json_file(file.path()),
            Err(WarrenError::Serde(_))
        ));

        assert!(matches!(
            GenerationConfig::from_json_file("/definitely/not/here.json"),
            Err(WarrenError::Io(_))
        ));
    }

    #[test]
    fn test_placement_accessors() {
        let placed = Placement::Placed(Position::new(3, 4));
        assert!(placed.is_placed());
        assert_eq!(placed.position(), Some(Position::new(3, 4)));

        let skipped = Placement::Skipped { reason: "full" };
        assert!(!skipped.is_placed());
        assert_eq!(skipped.position(), None);
    }

    #[test]
    fn test_utils_rng_creation() {
        use rand::Rng;
        let config = GenerationConfig::new(12345, 1);
        let a: u64 = utils::create_rng(&config).gen();
        let b: u64 = utils::create_rng(&config).gen();
        assert_eq!(a, b);
    }
}
