//! # Level Generation
//!
//! Builds a complete [`Level`] in three pure phases:
//!
//! 1. Grow the door graph and settle every room's role
//! 2. Lay out each room's tiles once, from the finished graph
//! 3. Dress the rooms: chests, boss and enemies, and finally the exit door
//!
//! Rooms are always visited in placement order so a seed reproduces a level.

use crate::config::FINAL_LEVEL;
use crate::game::{Level, Position, Room, RoomType};
use crate::generation::{
    utils, GenerationConfig, Generator, ObstaclePlacer, Placement, RoomGraph, RoomGraphBuilder,
    RoomLayoutGenerator, SpawnPlacer,
};
use crate::{WarrenError, WarrenResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Orchestrates every generation phase into a playable level.
#[derive(Debug, Clone, Default)]
pub struct LevelGenerator {
    layout: RoomLayoutGenerator,
    obstacles: ObstaclePlacer,
}

impl LevelGenerator {
    /// Creates a level generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::{GenerationConfig, Generator, LevelGenerator};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let config = GenerationConfig::new(7, 2);
    /// let mut rng = StdRng::seed_from_u64(config.seed);
    /// let level = LevelGenerator::new().generate(&config, &mut rng).unwrap();
    /// assert!(level.rooms.len() <= config.room_target());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns every graph node into a laid-out room, in placement order.
    fn build_rooms(
        &self,
        graph: &RoomGraph,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> HashMap<Position, Room> {
        let mut rooms = HashMap::with_capacity(graph.len());
        for &coords in graph.order() {
            let node = match graph.node(coords) {
                Some(node) => node,
                None => continue,
            };
            let mut room = Room::with_size(
                coords.x,
                coords.y,
                config.level_number,
                node.room_type,
                config.room_width,
                config.room_height,
            );
            room.doors = node.doors;

            let repaired = self.layout.generate(&mut room, rng);
            if repaired > 0 {
                debug!("Joined {} cut-off regions in room {}", repaired, coords);
            }
            rooms.insert(coords, room);
        }
        rooms
    }

    /// Places chests and, if enabled, the boss and enemies in every room.
    fn dress_rooms(
        &self,
        rooms: &mut HashMap<Position, Room>,
        order: &[Position],
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        let spawner = SpawnPlacer::new(config.spawn_attempts);
        let mut skipped = 0;

        for coords in order {
            let room = match rooms.get_mut(coords) {
                Some(room) => room,
                None => continue,
            };
            self.obstacles.place(room, rng);
            if config.spawn_entities {
                skipped += spawner
                    .populate(room, config, rng)
                    .iter()
                    .filter(|placement| matches!(placement, Placement::Skipped { .. }))
                    .count();
            }
        }

        if skipped > 0 {
            warn!("{} entities could not be placed", skipped);
        }
    }

    /// Room that receives the exit door.
    ///
    /// The final level keeps its exit in the boss room; otherwise any room
    /// may hold it.
    fn choose_exit_room(
        &self,
        graph: &RoomGraph,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Option<Position> {
        if config.level_number >= FINAL_LEVEL {
            if let Some(&boss) = graph.rooms_of_type(RoomType::Boss).first() {
                return Some(boss);
            }
            warn!("Final level has no boss room; placing the exit at random");
        }
        graph.order().choose(rng).copied()
    }

    fn place_exit(
        &self,
        rooms: &mut HashMap<Position, Room>,
        graph: &RoomGraph,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Option<Position> {
        let coords = self.choose_exit_room(graph, config, rng)?;
        let room = rooms.get_mut(&coords)?;
        match self.layout.add_exit_door(room, rng) {
            Some(_) => Some(coords),
            None => {
                warn!("No wall tile left for the exit door in room {}", coords);
                None
            }
        }
    }
}

impl Generator<Level> for LevelGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> WarrenResult<Level> {
        config.validate()?;

        let graph = RoomGraphBuilder::new(config.room_target()).build(rng);
        if graph.is_empty() {
            return Err(WarrenError::GenerationFailed(
                "room graph has no rooms".to_string(),
            ));
        }

        let mut rooms = self.build_rooms(&graph, config, rng);
        self.dress_rooms(&mut rooms, graph.order(), config, rng);
        let exit_room = self.place_exit(&mut rooms, &graph, config, rng);

        let level = Level::from_rooms(config.level_number, rooms, graph.order().to_vec());
        self.validate(&level, config)?;

        info!(
            "Level {} built: {} rooms, boss rooms {:?}, treasure rooms {:?}, exit in {:?}",
            config.level_number,
            level.rooms.len(),
            level.rooms_of_type(RoomType::Boss),
            level.rooms_of_type(RoomType::Treasure),
            exit_room
        );
        Ok(level)
    }

    fn validate(&self, level: &Level, config: &GenerationConfig) -> WarrenResult<()> {
        if level.level_number != config.level_number {
            return Err(WarrenError::InvalidState(format!(
                "level {} generated for config level {}",
                level.level_number, config.level_number
            )));
        }
        utils::validate_level(level)
    }

    fn generator_type(&self) -> &'static str {
        "LevelGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Tile;
    use std::collections::HashSet;

    fn generate(config: &GenerationConfig) -> Level {
        let mut rng = utils::create_rng(config);
        LevelGenerator::new().generate(config, &mut rng).unwrap()
    }

    #[test]
    fn test_generator_type() {
        assert_eq!(LevelGenerator::new().generator_type(), "LevelGenerator");
    }

    #[test]
    fn test_generation_with_testing_config() {
        let config = GenerationConfig::for_testing(12345);
        let level = generate(&config);

        assert!(level.rooms.len() <= 6);
        assert_eq!(level.rooms_of_type(RoomType::Start), vec![Position::origin()]);
        assert!(!level.rooms_of_type(RoomType::Boss).is_empty());
        assert!(!level.rooms_of_type(RoomType::Treasure).is_empty());
        assert_eq!(level.room_order().len(), level.rooms.len());
        assert_eq!(level.current_room_coords, Position::origin());
    }

    #[test]
    fn test_rooms_reachable_from_start() {
        for seed in 0..20 {
            let level = generate(&GenerationConfig::new(seed, 3));
            let reached: HashSet<Position> = ::pathfinding::prelude::bfs_reach(
                Position::origin(),
                |coords| {
                    let room = &level.rooms[coords];
                    room.doors
                        .open_directions()
                        .into_iter()
                        .map(|direction| coords.step(direction))
                        .collect::<Vec<_>>()
                },
            )
            .collect();
            assert_eq!(reached.len(), level.rooms.len(), "seed {}", seed);
        }
    }

    #[test]
    fn test_exactly_one_exit() {
        for seed in 0..10 {
            let level = generate(&GenerationConfig::new(seed, 2));
            let exits: usize = level
                .rooms
                .values()
                .map(|room| room.positions_of(Tile::ExitDoor).len())
                .sum();
            assert_eq!(exits, 1, "seed {}", seed);
            let exit_room = level.exit_room_coords.unwrap();
            assert!(level.room(exit_room).unwrap().exit_position.is_some());
        }
    }

    #[test]
    fn test_final_level_exit_in_boss_room() {
        for seed in 0..5 {
            let level = generate(&GenerationConfig::new(seed, FINAL_LEVEL));
            let boss = level.rooms_of_type(RoomType::Boss)[0];
            assert_eq!(level.exit_room_coords, Some(boss));
        }
    }

    #[test]
    fn test_spawning_can_be_disabled() {
        let mut config = GenerationConfig::new(9, 5);
        config.spawn_entities = false;
        let level = generate(&config);
        for room in level.rooms.values() {
            assert!(room.enemies.is_empty());
            assert!(room.boss.is_none());
        }
    }

    #[test]
    fn test_boss_rooms_have_bosses() {
        let level = generate(&GenerationConfig::new(31, 4));
        for coords in level.rooms_of_type(RoomType::Boss) {
            assert!(level.room(coords).unwrap().has_living_boss());
        }
        assert!(level.room(Position::origin()).unwrap().enemies.is_empty());
    }

    #[test]
    fn test_seed_reproduces_level() {
        let config = GenerationConfig::new(777, 6);
        let a = generate(&config);
        let b = generate(&config);
        assert_eq!(a.room_order(), b.room_order());
        for coords in a.room_order() {
            let (ra, rb) = (&a.rooms[coords], &b.rooms[coords]);
            assert_eq!(ra.room_type, rb.room_type);
            assert_eq!(ra.tiles(), rb.tiles());
            assert_eq!(ra.destroyable_walls(), rb.destroyable_walls());
            let tiles_a: Vec<_> = ra.enemies.iter().map(|e| e.tile).collect();
            let tiles_b: Vec<_> = rb.enemies.iter().map(|e| e.tile).collect();
            assert_eq!(tiles_a, tiles_b);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GenerationConfig::new(1, 0);
        let mut rng = utils::create_rng(&config);
        assert!(matches!(
            LevelGenerator::new().generate(&config, &mut rng),
            Err(WarrenError::InvalidConfig(_))
        ));
    }
}
