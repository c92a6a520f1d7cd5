//! delve: level generator and visibility inspector
//!
//! Generates one level for a seed and depth, runs a visibility pass from
//! the player's position and prints what came out.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};
use serde::Serialize;

use dv_core::dungeon::{Chunk, Loc};
use dv_core::generate::{generate_level, BasicPopulator, GenData, LevelRequest};
use dv_core::player::Player;
use dv_core::world::{DungeonError, GenConfig, WorldState};
use dv_core::GameRng;

/// What to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// The live level
    Map,
    /// The player's memory of the level after one look around
    Known,
    /// Summary of the generated level
    Json,
}

/// Generate a dungeon level and look at it
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(author, version, about = "Generate and inspect dungeon levels", long_about = None)]
struct Args {
    /// Random seed
    #[arg(short = 's', long = "seed", default_value_t = 0)]
    seed: u64,

    /// Dungeon depth (0 is the town)
    #[arg(short = 'd', long = "depth", default_value_t = 1)]
    depth: i32,

    /// Game turn, for the town's day and night
    #[arg(short = 't', long = "turn", default_value_t = 0)]
    turn: u64,

    /// Player light radius
    #[arg(short = 'l', long = "light", default_value_t = 1)]
    light: i32,

    /// Configuration file (defaults to delve/config.json in the config directory)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Directory with terrain.json, room_template.txt, vault.txt or pit.json
    /// to use instead of the built-in tables
    #[arg(long = "data")]
    data: Option<PathBuf>,

    /// Override a configuration value, as key=value
    #[arg(short = 'o', long = "option")]
    options: Vec<String>,

    /// What to print
    #[arg(short = 'f', long = "format", value_enum, default_value_t = Output::Map)]
    format: Output,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    depth: i32,
    profile: String,
    name: String,
    height: i32,
    width: i32,
    attempts: u32,
    rooms: usize,
    monsters: usize,
    objects: usize,
    player: Option<(i32, i32)>,
    known_map: bool,
    obj_rating: u32,
    mon_rating: u32,
    feeling: u16,
    seen: usize,
    marked: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("delve: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });
    // RUST_LOG still wins over the flag
    builder.parse_default_env();
    builder.init();
}

/// Default configuration file location
fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("delve");
    path.push("config.json");
    Some(path)
}

fn load_config(args: &Args) -> Result<GenConfig, DungeonError> {
    let path = args.config.clone().or_else(|| default_config_path().filter(|p| p.exists()));
    let mut config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            GenConfig::load_from_file(&path)?
        }
        None => GenConfig::default(),
    };
    for opt in &args.options {
        config.apply_override(opt)?;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(), DungeonError> {
    let config = load_config(args)?;
    let data = match &args.data {
        Some(dir) => GenData::load_dir(dir)?,
        None => GenData::builtin()?,
    };
    let mut pop = BasicPopulator::builtin(config.max_depth)?;
    let mut rng = GameRng::new(args.seed);

    let mut player = Player::new();
    player.set_depth(args.depth.clamp(0, config.max_depth - 1));
    player.cur_light = args.light;

    let request = LevelRequest {
        turn: args.turn,
        join: None,
    };
    let level = generate_level(&data, &config, &mut rng, &mut pop, &mut player, &request)?;
    let profile = level.profile.clone();
    let attempts = level.attempts;
    let rooms = level.centres.len();
    let known_map = level.known_map;

    let world = WorldState::from_generated(level, player, config);

    match args.format {
        Output::Map => print!("{}", render(&world.chunk, &world.chunk, world.player.grid)),
        Output::Known => print!("{}", render(&world.known, &world.chunk, world.player.grid)),
        Output::Json => {
            let c = &world.chunk;
            let summary = Summary {
                seed: args.seed,
                depth: c.depth,
                profile,
                name: c.name.clone(),
                height: c.height,
                width: c.width,
                attempts,
                rooms,
                monsters: c.monster_count(),
                objects: c.object_count(),
                player: world.player.grid.map(|g| (g.y, g.x)),
                known_map,
                obj_rating: c.obj_rating,
                mon_rating: c.mon_rating,
                feeling: c.feeling,
                seen: c.grids().filter(|&g| c.is_seen(g)).count(),
                marked: c.grids().filter(|&g| c.is_mark(g)).count(),
            };
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Draw the terrain of `terrain`, with occupants from `live` where the
/// terrain chunk is the live one
fn render(terrain: &Chunk, live: &Chunk, player: Option<Loc>) -> String {
    let table = terrain.terrain();
    let show_occupants = std::ptr::eq(terrain, live);
    let mut out = String::with_capacity(((terrain.width + 1) * terrain.height) as usize);

    for y in 0..terrain.height {
        for x in 0..terrain.width {
            let grid = Loc::new(y, x);
            let glyph = if player == Some(grid) {
                '@'
            } else if show_occupants && live.monster_at(grid).is_some() {
                'M'
            } else if show_occupants && !live.objects_at(grid).is_empty() {
                '&'
            } else {
                table.get(terrain.feat(grid)).map_or(' ', |f| f.glyph)
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
