//! Loading generation configs from JSON files.

use rand::{rngs::StdRng, SeedableRng};
use std::io::Write;
use tempfile::NamedTempFile;
use warren::{
    config, GenerationConfig, Generator, LevelGenerator, RoomType, WarrenError, WarrenResult,
};

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(json.as_bytes()).expect("write config");
    file
}

#[test]
fn test_minimal_config_uses_defaults() -> WarrenResult<()> {
    let file = write_config(r#"{ "seed": 99, "level_number": 3 }"#);
    let loaded = GenerationConfig::from_json_file(file.path())?;

    assert_eq!(loaded.seed, 99);
    assert_eq!(loaded.level_number, 3);
    assert_eq!(loaded.target_room_count, None);
    assert_eq!(loaded.room_target(), 7);
    assert_eq!(loaded.room_width, config::ROOM_WIDTH);
    assert_eq!(loaded.room_height, config::ROOM_HEIGHT);
    assert_eq!(loaded.spawn_attempts, config::DEFAULT_SPAWN_ATTEMPTS);
    assert!(loaded.spawn_entities);
    Ok(())
}

#[test]
fn test_saved_config_round_trips_into_same_level() -> WarrenResult<()> {
    let mut original = GenerationConfig::new(2468, 4);
    original.target_room_count = Some(7);
    let file = write_config(&serde_json::to_string_pretty(&original)?);
    let loaded = GenerationConfig::from_json_file(file.path())?;

    assert_eq!(loaded, original);

    let generator = LevelGenerator::new();
    let a = generator.generate(&original, &mut StdRng::seed_from_u64(original.seed))?;
    let b = generator.generate(&loaded, &mut StdRng::seed_from_u64(loaded.seed))?;
    assert_eq!(a.room_order(), b.room_order());
    assert_eq!(
        a.rooms_of_type(RoomType::Boss),
        b.rooms_of_type(RoomType::Boss)
    );
    Ok(())
}

#[test]
fn test_invalid_configs_rejected() {
    let too_small = write_config(r#"{ "seed": 1, "level_number": 1, "room_width": 5 }"#);
    assert!(matches!(
        GenerationConfig::from_json_file(too_small.path()),
        Err(WarrenError::InvalidConfig(_))
    ));

    let level_zero = write_config(r#"{ "seed": 1, "level_number": 0 }"#);
    assert!(matches!(
        GenerationConfig::from_json_file(level_zero.path()),
        Err(WarrenError::InvalidConfig(_))
    ));

    let malformed = write_config("{ seed: 1 ");
    assert!(matches!(
        GenerationConfig::from_json_file(malformed.path()),
        Err(WarrenError::Serde(_))
    ));

    let missing = tempfile::tempdir().expect("temp dir");
    assert!(matches!(
        GenerationConfig::from_json_file(missing.path().join("absent.json")),
        Err(WarrenError::Io(_))
    ));
}
