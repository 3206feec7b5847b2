//! # Entities
//!
//! Minimal models of the entities the dungeon core spawns and tracks.
//!
//! Enemy and boss behaviour lives outside this crate. The core only needs to
//! know where an entity stands, whether it is alive, and which level it was
//! built for, so that is all these types carry.

use crate::game::Position;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

/// Unique identifier for spawned entities.
pub type EntityId = Uuid;

/// Creates a random (version 4) entity ID from the given generator.
///
/// Drawing from the level's seeded generator keeps ids reproducible.
pub fn new_entity_id<R: Rng>(rng: &mut R) -> EntityId {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// Which kind of hostile an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Enemy,
    Boss,
    /// A boss's bodyguard; spawned next to the boss, with regular enemy stats
    Minion,
}

/// Base stats per level, indexed by `level_number - 1`.
const ENEMY_PROFILES: [(&str, i32); 10] = [
    ("Slime", 50),
    ("Skeleton", 60),
    ("Ghost", 40),
    ("Goblin", 70),
    ("Dark Knight", 80),
    ("Wizard", 65),
    ("Demon", 90),
    ("Dragon Spawn", 100),
    ("Shadow", 85),
    ("Dark Elf", 110),
];

const BOSS_PROFILES: [(&str, i32); 10] = [
    ("King Slime", 200),
    ("Skeleton Lord", 250),
    ("Phantom King", 300),
    ("Goblin Chief", 800),
    ("Dark Champion", 400),
    ("Arch Wizard", 450),
    ("Demon Lord", 500),
    ("Dragon", 550),
    ("Shadow King", 600),
    ("Dark Lord", 1),
];

fn profile(kind: EntityKind, level_number: u32) -> (&'static str, i32) {
    let index = (level_number.clamp(1, 10) - 1) as usize;
    match kind {
        EntityKind::Enemy | EntityKind::Minion => ENEMY_PROFILES[index],
        EntityKind::Boss => BOSS_PROFILES[index],
    }
}

/// An enemy or boss placed in a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnedEntity {
    /// Unique identifier
    pub id: EntityId,
    /// Enemy or boss
    pub kind: EntityKind,
    /// Display name from the level's roster
    pub name: String,
    /// Tile the entity was spawned on
    pub tile: Position,
    /// Pixel position (top-left of the spawn tile)
    pub pixel: Position,
    /// Level the entity was built for
    pub level_number: u32,
    /// Remaining health; the entity is dead at zero
    pub health: i32,
    /// Health at spawn
    pub max_health: i32,
}

impl SpawnedEntity {
    /// Creates an entity standing on the given tile.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use warren::{EntityKind, Position, SpawnedEntity};
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let boss = SpawnedEntity::new(EntityKind::Boss, Position::new(12, 9), 1, &mut rng);
    /// assert_eq!(boss.name, "King Slime");
    /// assert!(boss.is_alive());
    /// ```
    pub fn new<R: Rng>(
        kind: EntityKind,
        tile: Position,
        level_number: u32,
        rng: &mut R,
    ) -> Self {
        let (name, health) = profile(kind, level_number);
        Self {
            id: new_entity_id(rng),
            kind,
            name: name.to_string(),
            tile,
            pixel: tile.tile_origin_pixel(),
            level_number,
            health,
            max_health: health,
        }
    }

    /// Whether the entity still has health left.
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Applies damage and returns true if this blow killed the entity.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.is_alive();
        self.health = (self.health - amount.max(0)).max(0);
        was_alive && !self.is_alive()
    }

    /// Pixel position of the centre of the entity's tile.
    pub fn center_pixel(&self) -> Position {
        self.tile.tile_center_pixel()
    }
}

/// Special weapons hidden in boss-room chests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    FireSword,
    LightningSword,
}

impl WeaponKind {
    /// The weapon a level's defeated boss leaves behind, if any.
    pub fn reward_for_level(level_number: u32) -> Option<WeaponKind> {
        match level_number {
            2 => Some(WeaponKind::FireSword),
            4 => Some(WeaponKind::LightningSword),
            _ => None,
        }
    }
}

/// What a pickup grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Health,
    Arrows,
    Weapon(WeaponKind),
}

/// An item lying on the floor of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    /// Pixel position of the pickup's centre
    pub position: Position,
    pub collected: bool,
}

impl Pickup {
    pub fn new(kind: PickupKind, position: Position) -> Self {
        Self {
            kind,
            position,
            collected: false,
        }
    }
}
