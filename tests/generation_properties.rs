//! Property tests over seeds and levels for the structural guarantees of
//! generated levels.

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashSet;
use warren::{
    config, connected_regions, Direction, GenerationConfig, Generator, Level, LevelGenerator,
    Position, RoomLayoutGenerator, RoomType, Tile, TransitPlanner,
};

fn generate(seed: u64, level_number: u32) -> Level {
    let mut rng = StdRng::seed_from_u64(seed);
    LevelGenerator::new()
        .generate(&GenerationConfig::new(seed, level_number), &mut rng)
        .expect("valid config always generates")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_roles_and_room_count(seed in any::<u64>(), level_number in 1..=config::FINAL_LEVEL) {
        let level = generate(seed, level_number);
        prop_assert!(level.rooms.len() <= 4 + level_number as usize);
        prop_assert_eq!(level.rooms_of_type(RoomType::Start), vec![Position::origin()]);
        prop_assert!(!level.rooms_of_type(RoomType::Boss).is_empty());
        prop_assert!(!level.rooms_of_type(RoomType::Treasure).is_empty());
    }

    #[test]
    fn prop_doors_symmetric_and_connected(seed in any::<u64>(), level_number in 1..=config::FINAL_LEVEL) {
        let level = generate(seed, level_number);
        for (coords, room) in &level.rooms {
            for direction in Direction::all() {
                let mirrored = level
                    .room(coords.step(direction))
                    .map_or(false, |other| other.doors.is_open(direction.opposite()));
                prop_assert_eq!(room.doors.is_open(direction), mirrored);
            }
        }

        let reached: HashSet<Position> = pathfinding::prelude::bfs_reach(Position::origin(), |coords| {
            level.rooms[coords]
                .doors
                .open_directions()
                .into_iter()
                .map(|direction| coords.step(direction))
                .collect::<Vec<_>>()
        })
        .collect();
        prop_assert_eq!(reached.len(), level.rooms.len());
    }

    #[test]
    fn prop_layouts_are_one_floor_region(seed in any::<u64>(), level_number in 1..=5u32) {
        let level = generate(seed, level_number);
        let mut rng = StdRng::seed_from_u64(seed);
        for room in level.rooms.values() {
            let mut fresh = room.clone();
            RoomLayoutGenerator::new().generate(&mut fresh, &mut rng);
            let floor = fresh.positions_of(Tile::Floor);
            let regions = connected_regions(&floor, |pos| fresh.is_floor(pos.x, pos.y));
            prop_assert_eq!(regions.len(), 1);
        }
    }

    #[test]
    fn prop_destroyable_only_on_walls(seed in any::<u64>(), level_number in 1..=config::FINAL_LEVEL) {
        let level = generate(seed, level_number);
        for room in level.rooms.values() {
            for (y, row) in room.destroyable_walls().iter().enumerate() {
                for (x, &flag) in row.iter().enumerate() {
                    prop_assert!(!flag || room.tiles()[y][x] == Tile::Wall);
                }
            }
        }
    }

    #[test]
    fn prop_entry_tiles_are_floor(seed in any::<u64>(), level_number in 1..=config::FINAL_LEVEL) {
        let level = generate(seed, level_number);
        let planner = TransitPlanner::default();
        for room in level.rooms.values() {
            for direction in Direction::all() {
                let (tile, _) = planner.entry_tile(room, direction);
                prop_assert_eq!(room.tile_at(tile), Some(Tile::Floor));
            }
        }
    }

    #[test]
    fn prop_spawns_on_floor(seed in any::<u64>(), level_number in 1..=config::FINAL_LEVEL) {
        let level = generate(seed, level_number);
        for room in level.rooms.values() {
            for entity in room.enemies.iter().chain(room.boss.iter()) {
                prop_assert_eq!(room.tile_at(entity.tile), Some(Tile::Floor));
            }
        }
    }
}
