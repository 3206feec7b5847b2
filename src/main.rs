//! # Warren Main Entry Point
//!
//! Generates a level from the command line, optionally walks through some of
//! its doors, and prints the result as ASCII.

use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use warren::{
    Direction, GenerationConfig, Generator, Level, LevelGenerator, Transit, WarrenError,
    WarrenResult,
};

/// Command line arguments for the Warren level generator.
#[derive(Parser, Debug)]
#[command(name = "warren")]
#[command(about = "Generates room-graph dungeon levels and prints them as ASCII")]
#[command(version)]
struct Args {
    /// Random seed for level generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level index, starting at 1
    #[arg(short, long, default_value_t = 1)]
    level: u32,

    /// Number of rooms to aim for (defaults to 4 + level)
    #[arg(short, long)]
    rooms: Option<usize>,

    /// JSON generation config; overrides seed, level and rooms
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Comma separated doors to walk through, e.g. "n,e,e,s"
    #[arg(long)]
    walk: Option<String>,

    /// Print every room instead of only the current one
    #[arg(long)]
    show_all: bool,
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn initialize_logging(log_level: &str) {
    env_logger::Builder::new()
        .parse_filters(log_level)
        .format_target(false)
        .init();
}

fn load_config(args: &Args) -> WarrenResult<GenerationConfig> {
    if let Some(path) = &args.config {
        info!("Loading generation config from {}", path.display());
        return GenerationConfig::from_json_file(path);
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut config = GenerationConfig::new(seed, args.level);
    config.target_room_count = args.rooms;
    config.validate()?;
    Ok(config)
}

fn parse_walk(walk: &str) -> WarrenResult<Vec<Direction>> {
    walk.split(',')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(|step| {
            Direction::parse(step)
                .ok_or_else(|| WarrenError::InvalidConfig(format!("unknown direction '{}'", step)))
        })
        .collect()
}

fn run(args: &Args) -> WarrenResult<()> {
    let config = load_config(args)?;
    info!("Starting Warren v{} with seed {}", warren::VERSION, config.seed);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let generator = LevelGenerator::new();
    let mut level = generator.generate(&config, &mut rng)?;

    if let Some(walk) = &args.walk {
        for direction in parse_walk(walk)? {
            match level.transition(direction) {
                Transit::Arrived { room, tile, resolution, .. } => {
                    println!(
                        "{:?}: entered room {} at tile {} ({:?})",
                        direction, room, tile, resolution
                    );
                }
                Transit::NoTransition => {
                    println!("{:?}: no room beyond this door", direction);
                }
            }
        }
    }

    print_summary(&level, config.seed);
    print_rooms(&level, args.show_all);
    Ok(())
}

fn print_summary(level: &Level, seed: u64) {
    println!("Level {} (seed {})", level.level_number, seed);
    println!("Rooms: {}", level.rooms.len());
    for &coords in level.room_order() {
        if let Some(room) = level.room(coords) {
            let marker = if coords == level.current_room_coords { '*' } else { ' ' };
            let exit = if level.exit_room_coords == Some(coords) { " exit" } else { "" };
            println!(
                "{} {:>10} {:?} enemies={} chests={}{}",
                marker,
                coords.to_string(),
                room.room_type,
                room.enemies.len() + usize::from(room.boss.is_some()),
                room.destroyable_walls()
                    .iter()
                    .flatten()
                    .filter(|&&flag| flag)
                    .count(),
                exit
            );
        }
    }
    println!();
}

fn print_rooms(level: &Level, show_all: bool) {
    let coords: Vec<_> = if show_all {
        level.room_order().to_vec()
    } else {
        vec![level.current_room_coords]
    };
    for coords in coords {
        if let Some(room) = level.room(coords) {
            println!("Room {} ({:?})", coords, room.room_type);
            println!("{}", room);
        }
    }
}
