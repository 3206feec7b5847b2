//! # Spawn Placement
//!
//! Places the boss and regular enemies on floor tiles. Nothing here fails
//! loudly: an entity that cannot be placed is reported as
//! [`Placement::Skipped`] and the room stays valid with one fewer occupant.

use crate::config::{DEFAULT_SPAWN_ATTEMPTS, SPAWN_SEPARATION_TILES, TILE_SIZE};
use crate::game::{EntityKind, Position, Room, RoomType, SpawnedEntity};
use crate::generation::{GenerationConfig, Placement};
use crate::utils::chebyshev_ring;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Levels whose boss fight has no regular enemies in the boss room.
const SOLO_BOSS_LEVELS: [u32; 4] = [3, 4, 7, 10];

/// Level whose boss is guarded by minions instead of regular enemies.
const BOSS_MINION_LEVEL: u32 = 3;

/// Minions spawned next to the guarded boss.
const BOSS_MINIONS: usize = 2;

/// Chebyshev distances from the boss at which minions may stand.
const MINION_RADII: std::ops::RangeInclusive<i32> = 3..=5;

/// Places entities in a room.
#[derive(Debug, Clone, Copy)]
pub struct SpawnPlacer {
    /// Random draws per enemy before it is skipped
    pub attempts: u32,
}

impl Default for SpawnPlacer {
    fn default() -> Self {
        Self::new(DEFAULT_SPAWN_ATTEMPTS)
    }
}

impl SpawnPlacer {
    pub fn new(attempts: u32) -> Self {
        Self { attempts }
    }

    /// Number of regular enemies a room of this role gets.
    pub fn enemy_count(room: &Room, config: &GenerationConfig, rng: &mut StdRng) -> usize {
        let max = config.max_enemies_per_room();
        match room.room_type {
            RoomType::Start => 0,
            RoomType::Boss if SOLO_BOSS_LEVELS.contains(&room.level_number) => 0,
            RoomType::Boss => max / 2,
            RoomType::Treasure => max / 3,
            RoomType::Normal => rng.gen_range(1..=max),
        }
    }

    /// Whether an entity may stand on a tile.
    ///
    /// The tile must be floor and at least three tiles (in pixels, measured
    /// between tile corners) from every enemy already in the room.
    pub fn is_valid_spawn(room: &Room, tile: Position) -> bool {
        if !room.is_floor(tile.x, tile.y) {
            return false;
        }
        let pixel = tile.tile_origin_pixel();
        let min_distance = (SPAWN_SEPARATION_TILES * TILE_SIZE) as i64;
        room.enemies
            .iter()
            .all(|enemy| enemy.pixel.distance_squared(pixel) >= min_distance * min_distance)
    }

    /// Fills a room: the boss first (in boss rooms), then its minions on the
    /// guarded level, then regular enemies.
    pub fn populate(
        &self,
        room: &mut Room,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> Vec<Placement> {
        let mut placements = Vec::new();
        if room.room_type == RoomType::Start {
            return placements;
        }
        if room.room_type == RoomType::Boss {
            placements.push(self.place_boss(room, rng));
            if room.level_number == BOSS_MINION_LEVEL {
                placements.extend(self.place_minions(room, BOSS_MINIONS, rng));
            }
        }
        let count = Self::enemy_count(room, config, rng);
        placements.extend(self.place_enemies(room, count, rng));
        placements
    }

    /// Places `count` enemies by rejection sampling over the interior.
    ///
    /// An enemy is accepted on the first floor tile outside every door
    /// approach; after `attempts` misses it is skipped.
    pub fn place_enemies(&self, room: &mut Room, count: usize, rng: &mut StdRng) -> Vec<Placement> {
        let w = room.width as i32;
        let h = room.height as i32;
        if w < 3 || h < 3 {
            debug!("Room {} has no interior, skipping {} enemies", room.grid_position(), count);
            return vec![
                Placement::Skipped {
                    reason: "room has no interior",
                };
                count
            ];
        }
        let mut placements = Vec::with_capacity(count);

        for _ in 0..count {
            let mut placement = Placement::Skipped {
                reason: "no free floor tile found",
            };
            for _ in 0..self.attempts {
                let x = rng.gen_range(1..=w - 2);
                let y = rng.gen_range(1..=h - 2);
                if room.is_floor(x, y) && !room.near_door(x, y) {
                    let tile = Position::new(x, y);
                    room.enemies.push(SpawnedEntity::new(
                        EntityKind::Enemy,
                        tile,
                        room.level_number,
                        rng,
                    ));
                    placement = Placement::Placed(tile);
                    break;
                }
            }
            match placement {
                Placement::Placed(tile) => debug!("Enemy placed at {}", tile),
                Placement::Skipped { .. } => debug!(
                    "Enemy skipped in room {} after {} attempts",
                    room.grid_position(),
                    self.attempts
                ),
            }
            placements.push(placement);
        }

        placements
    }

    /// Places `count` minions around the boss.
    ///
    /// Each try picks a distance of three to five tiles from the boss (or the
    /// room centre when there is no boss) and a random interior cell on that
    /// ring. The cell must be free floor outside every door approach; after
    /// `attempts` misses the minion is skipped.
    pub fn place_minions(&self, room: &mut Room, count: usize, rng: &mut StdRng) -> Vec<Placement> {
        let w = room.width as i32;
        let h = room.height as i32;
        if w < 3 || h < 3 {
            return vec![
                Placement::Skipped {
                    reason: "room has no interior",
                };
                count
            ];
        }
        let center = room.boss.as_ref().map_or_else(|| room.center(), |boss| boss.tile);
        let mut placements = Vec::with_capacity(count);

        for _ in 0..count {
            let mut placement = Placement::Skipped {
                reason: "no free tile near the boss",
            };
            for _ in 0..self.attempts {
                let radius = rng.gen_range(MINION_RADII);
                let ring: Vec<Position> = chebyshev_ring(center, radius)
                    .filter(|tile| (1..=w - 2).contains(&tile.x) && (1..=h - 2).contains(&tile.y))
                    .collect();
                let Some(&tile) = ring.choose(rng) else {
                    continue;
                };
                let occupied = room.enemies.iter().any(|enemy| enemy.tile == tile);
                if room.is_floor(tile.x, tile.y) && !room.near_door(tile.x, tile.y) && !occupied {
                    room.enemies.push(SpawnedEntity::new(
                        EntityKind::Minion,
                        tile,
                        room.level_number,
                        rng,
                    ));
                    placement = Placement::Placed(tile);
                    break;
                }
            }
            match placement {
                Placement::Placed(tile) => debug!("Minion placed at {}", tile),
                Placement::Skipped { .. } => {
                    warn!("Minion skipped in room {}", room.grid_position())
                }
            }
            placements.push(placement);
        }

        placements
    }

    /// Places the boss as close to the centre as possible.
    ///
    /// The centre is tried first, then each Chebyshev ring around it up to
    /// half the shorter room edge, then every interior tile in row-major
    /// order. If all of that fails the room is left without a boss.
    pub fn place_boss(&self, room: &mut Room, rng: &mut StdRng) -> Placement {
        let tile = match Self::find_boss_tile(room) {
            Some(tile) => tile,
            None => {
                warn!("No valid tile for the boss in room {}", room.grid_position());
                return Placement::Skipped {
                    reason: "no valid tile for the boss",
                };
            }
        };

        room.boss = Some(SpawnedEntity::new(EntityKind::Boss, tile, room.level_number, rng));
        debug!("Boss placed at {} in room {}", tile, room.grid_position());
        Placement::Placed(tile)
    }

    fn find_boss_tile(room: &Room) -> Option<Position> {
        let center = room.center();
        if Self::is_valid_spawn(room, center) {
            return Some(center);
        }

        let max_radius = (room.width.min(room.height) / 2) as i32;
        for radius in 1..max_radius {
            if let Some(tile) =
                chebyshev_ring(center, radius).find(|&tile| Self::is_valid_spawn(room, tile))
            {
                return Some(tile);
            }
        }

        (1..room.height as i32 - 1)
            .flat_map(|y| (1..room.width as i32 - 1).map(move |x| Position::new(x, y)))
            .find(|&tile| Self::is_valid_spawn(room, tile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Doors, Tile};
    use crate::generation::RoomLayoutGenerator;
    use rand::SeedableRng;

    fn boss_room() -> Room {
        let mut room = Room::new(1, 0, 1, RoomType::Boss);
        room.doors.west = true;
        RoomLayoutGenerator::new().generate(&mut room, &mut StdRng::seed_from_u64(1));
        room
    }

    #[test]
    fn test_enemy_counts_by_role() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = GenerationConfig::new(1, 6);
        let max = config.max_enemies_per_room();
        assert_eq!(max, 5);

        let start = Room::new(0, 0, 6, RoomType::Start);
        assert_eq!(SpawnPlacer::enemy_count(&start, &config, &mut rng), 0);
        let boss = Room::new(0, 0, 6, RoomType::Boss);
        assert_eq!(SpawnPlacer::enemy_count(&boss, &config, &mut rng), 2);
        let treasure = Room::new(0, 0, 6, RoomType::Treasure);
        assert_eq!(SpawnPlacer::enemy_count(&treasure, &config, &mut rng), 1);
        let normal = Room::new(0, 0, 6, RoomType::Normal);
        for _ in 0..20 {
            let count = SpawnPlacer::enemy_count(&normal, &config, &mut rng);
            assert!((1..=max).contains(&count));
        }

        let solo = GenerationConfig::new(1, 7);
        let boss = Room::new(0, 0, 7, RoomType::Boss);
        assert_eq!(SpawnPlacer::enemy_count(&boss, &solo, &mut rng), 0);
    }

    #[test]
    fn test_boss_at_open_centre() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut room = boss_room();
        assert_eq!(
            SpawnPlacer::default().place_boss(&mut room, &mut rng),
            Placement::Placed(room.center())
        );
        assert_eq!(room.boss.as_ref().unwrap().tile, room.center());
    }

    #[test]
    fn test_boss_avoids_blocked_centre() {
        let mut room = boss_room();
        let center = room.center();
        for pos in chebyshev_ring(center, 1).chain(std::iter::once(center)) {
            room.set_tile(pos, Tile::Wall).unwrap();
        }

        let placement = SpawnPlacer::default().place_boss(&mut room, &mut StdRng::seed_from_u64(2));
        let tile = placement.position().unwrap();
        assert_ne!(tile, center);
        assert_eq!(tile.chebyshev_distance(center), 2);
        // First ring-2 cell in row-major order
        assert_eq!(tile, Position::new(center.x - 2, center.y - 2));
    }

    #[test]
    fn test_boss_keeps_distance_from_enemies() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut room = boss_room();
        let center = room.center();
        room.enemies
            .push(SpawnedEntity::new(EntityKind::Enemy, center, room.level_number, &mut rng));

        let tile = SpawnPlacer::default()
            .place_boss(&mut room, &mut rng)
            .position()
            .unwrap();
        let gap = tile.tile_origin_pixel().distance_squared(center.tile_origin_pixel());
        assert!(gap >= (3 * 32 * 3 * 32) as i64);
    }

    #[test]
    fn test_boss_skipped_in_solid_room() {
        let mut room = Room::new(0, 0, 1, RoomType::Boss);
        let mut rng = StdRng::seed_from_u64(2);
        assert!(!SpawnPlacer::default().place_boss(&mut room, &mut rng).is_placed());
        assert!(room.boss.is_none());
        let minions = SpawnPlacer::default().place_minions(&mut room, 2, &mut rng);
        assert_eq!(minions.len(), 2);
        assert!(minions.iter().all(|p| !p.is_placed()));
        assert!(room.enemies.is_empty());
    }

    #[test]
    fn test_minions_guard_the_boss() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut room = boss_room();
        room.level_number = 3;
        let placer = SpawnPlacer::default();
        let boss_tile = placer.place_boss(&mut room, &mut rng).position().unwrap();

        let placements = placer.place_minions(&mut room, 2, &mut rng);
        assert_eq!(placements.len(), 2);
        assert!(placements.iter().all(Placement::is_placed));
        assert_eq!(room.enemies.len(), 2);
        for minion in &room.enemies {
            assert_eq!(minion.kind, EntityKind::Minion);
            assert!(MINION_RADII.contains(&(minion.tile.chebyshev_distance(boss_tile) as i32)));
            assert!(room.is_floor(minion.tile.x, minion.tile.y));
            assert!(!room.near_door(minion.tile.x, minion.tile.y));
        }
        assert_ne!(room.enemies[0].tile, room.enemies[1].tile);
    }

    #[test]
    fn test_level_three_boss_room_has_minions_only() {
        let mut rng = StdRng::seed_from_u64(8);
        let config = GenerationConfig::new(8, 3);
        let mut room = Room::new(1, 0, 3, RoomType::Boss);
        room.doors.west = true;
        RoomLayoutGenerator::new().generate(&mut room, &mut rng);

        let placements = SpawnPlacer::default().populate(&mut room, &config, &mut rng);
        assert_eq!(placements.len(), 1 + BOSS_MINIONS);
        assert!(room.boss.is_some());
        assert!(room
            .enemies
            .iter()
            .all(|entity| entity.kind == EntityKind::Minion));
        assert_eq!(
            room.enemies.len(),
            placements[1..].iter().filter(|p| p.is_placed()).count()
        );
    }

    #[test]
    fn test_enemies_avoid_doors_and_walls() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut room = Room::new(0, 1, 1, RoomType::Normal);
        room.doors = Doors {
            north: true,
            east: true,
            south: true,
            west: true,
        };
        RoomLayoutGenerator::new().generate(&mut room, &mut rng);

        let placements = SpawnPlacer::default().place_enemies(&mut room, 6, &mut rng);
        assert_eq!(placements.len(), 6);
        for placement in placements {
            if let Placement::Placed(tile) = placement {
                assert!(room.is_floor(tile.x, tile.y));
                assert!(!room.near_door(tile.x, tile.y));
            }
        }
    }

    #[test]
    fn test_enemies_skipped_without_floor() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut room = Room::new(0, 0, 1, RoomType::Normal);
        let placements = SpawnPlacer::new(10).place_enemies(&mut room, 3, &mut rng);
        assert!(placements.iter().all(|p| !p.is_placed()));
        assert!(room.enemies.is_empty());
    }

    #[test]
    fn test_enemies_skipped_in_room_without_interior() {
        let mut rng = StdRng::seed_from_u64(4);
        let placer = SpawnPlacer::new(10);
        for (width, height) in [(2, 2), (1, 9), (9, 2), (0, 0)] {
            let mut room = Room::with_size(0, 0, 1, RoomType::Normal, width, height);
            let placements = placer.place_enemies(&mut room, 3, &mut rng);
            assert_eq!(
                placements,
                vec![Placement::Skipped { reason: "room has no interior" }; 3]
            );
            assert!(room.enemies.is_empty());
        }
    }
}
