//! Level generation behavioural tests
//!
//! Whole levels through `generate_level`: profiles, retry limits, block
//! reservations, vault flags and the finished level's bookkeeping.

use dv_core::dungeon::{Loc, Rect};
use dv_core::generate::{generate_level, BasicPopulator, CaveKind, GenData, GeneratedLevel, LevelRequest};
use dv_core::player::{Arrival, Player};
use dv_core::world::{DungeonError, GenConfig};
use dv_core::GameRng;
use proptest::prelude::*;

fn generate(config: &GenConfig, seed: u64, depth: i32) -> Result<(GeneratedLevel, Player), DungeonError> {
    let data = GenData::builtin().unwrap();
    let mut rng = GameRng::new(seed);
    let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
    let mut player = Player::new();
    player.set_depth(depth);
    let level = generate_level(&data, config, &mut rng, &mut pop, &mut player, &LevelRequest::default())?;
    Ok((level, player))
}

fn forced(profile: &str) -> GenConfig {
    GenConfig {
        force_profile: Some(profile.to_string()),
        ..GenConfig::default()
    }
}

fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.y1 <= b.y2 && b.y1 <= a.y2 && a.x1 <= b.x2 && b.x1 <= a.x2
}

// ============================================================================
// Simple profile at depth 1
// ============================================================================

#[test]
fn test_simple_level_at_depth_one() {
    let config = forced("simple");
    let (level, player) = generate(&config, 1234, 1).unwrap();
    let c = &level.chunk;

    assert_eq!(level.profile, "simple");
    assert!(!level.centres.is_empty());
    let start = player.grid.unwrap();
    assert_eq!(c.player_grid(), Some(start));
    assert!(c.is_floor(start));
    assert!(!c.is_vault(start));
    assert!(c.monster_count() <= config.level_monster_max);
    assert!(c.object_count() <= config.level_object_max);
}

#[test]
fn test_generation_flags_cleared() {
    let (level, _) = generate(&GenConfig::default(), 8, 12).unwrap();
    let c = &level.chunk;
    assert!(c.grids().all(|g| !c.is_wall_inner(g) && !c.is_wall_outer(g) && !c.is_wall_solid(g)));
}

#[test]
fn test_same_seed_same_level() {
    let config = GenConfig::default();
    let (a, _) = generate(&config, 77, 9).unwrap();
    let (b, _) = generate(&config, 77, 9).unwrap();
    assert_eq!(a.profile, b.profile);
    assert_eq!(a.attempts, b.attempts);
    assert_eq!((a.chunk.height, a.chunk.width), (b.chunk.height, b.chunk.width));
    assert!(a.chunk.grids().all(|g| a.chunk.feat(g) == b.chunk.feat(g)));
    assert_eq!(a.chunk.monster_count(), b.chunk.monster_count());
}

#[test]
fn test_level_feeling_is_set_below_town() {
    let (level, _) = generate(&GenConfig::default(), 3, 20).unwrap();
    let c = &level.chunk;
    assert!(c.feeling >= 10);
    assert!((1..=9).contains(&(c.feeling % 10)));
    assert!(c.grids().any(|g| c.is_feel(g)));
}

// ============================================================================
// Retry limit
// ============================================================================

#[test]
fn test_generation_gives_up_after_exactly_the_attempt_limit() {
    // No level can ever have few enough monsters
    let config = GenConfig {
        level_monster_max: 0,
        ..GenConfig::default()
    };
    match generate(&config, 5, 5) {
        Err(DungeonError::GenerationFailed { attempts, .. }) => assert_eq!(attempts, 100),
        other => panic!("expected generation to fail, got {:?}", other.map(|(l, _)| l.attempts)),
    }
}

#[test]
fn test_player_is_unplaced_after_failure() {
    let config = GenConfig {
        level_monster_max: 0,
        max_generation_attempts: 3,
        ..GenConfig::default()
    };
    let data = GenData::builtin().unwrap();
    let mut rng = GameRng::new(2);
    let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
    let mut player = Player::new();
    player.set_depth(4);
    let result = generate_level(&data, &config, &mut rng, &mut pop, &mut player, &LevelRequest::default());
    assert!(matches!(result, Err(DungeonError::GenerationFailed { attempts: 3, .. })));
    assert!(player.grid.is_none());
}

// ============================================================================
// Profiles
// ============================================================================

#[test]
fn test_town_at_depth_zero() {
    let (level, _) = generate(&GenConfig::default(), 1, 0).unwrap();
    assert_eq!(level.profile, "town");
    assert_eq!(level.daytime, Some(true));
    assert_eq!((level.chunk.height, level.chunk.width), (22, 66));
}

#[test]
fn test_forced_labyrinth() {
    let (level, _) = generate(&forced("labyrinth"), 6, 25).unwrap();
    assert_eq!(level.profile, "labyrinth");
    assert_eq!(level.chunk.name, "labyrinth");
    assert_eq!(level.daytime, None);
}

#[test]
fn test_shallow_cavern_falls_back_to_classic() {
    let data = GenData::builtin().unwrap();
    let (level, _) = generate(&forced("cavern"), 6, 5).unwrap();
    let profile = data.profile(&level.profile).unwrap();
    assert_eq!(profile.kind, CaveKind::Classic);
}

#[test]
fn test_connected_stairs_on_arrival() {
    let data = GenData::builtin().unwrap();
    let config = GenConfig::default();
    let mut rng = GameRng::new(31);
    let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
    let mut player = Player::new();
    player.set_depth(7);
    player.arrival = Arrival::Descended;
    let level = generate_level(&data, &config, &mut rng, &mut pop, &mut player, &LevelRequest::default()).unwrap();
    let start = player.grid.unwrap();
    assert!(level.chunk.is_up_stairs(start));
}

#[test]
fn test_join_puts_player_on_the_staircase() {
    let data = GenData::builtin().unwrap();
    let config = forced("classic");
    let mut rng = GameRng::new(12);
    let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
    let mut player = Player::new();
    player.set_depth(10);
    let join = Loc::new(20, 40);
    let request = LevelRequest { turn: 0, join: Some(join) };
    let level = generate_level(&data, &config, &mut rng, &mut pop, &mut player, &request).unwrap();
    assert_eq!(player.grid, Some(join));
    assert_eq!(level.chunk.player_grid(), Some(join));
}

// ============================================================================
// Vaults and block reservations
// ============================================================================

#[test]
fn test_vault_grids_are_room_grids() {
    let config = forced("classic");
    for seed in 0..6 {
        let (level, _) = generate(&config, seed, 45).unwrap();
        let c = &level.chunk;
        for g in c.grids().filter(|&g| c.is_vault(g)) {
            assert!(c.is_room(g), "seed {seed}: vault grid {g:?} outside a room");
            assert!(c.is_mon_restrict(g), "seed {seed}: vault grid {g:?} open to wanderers");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_reserved_blocks_never_overlap(seed in any::<u64>(), depth in 1i32..60) {
        let (level, _) = generate(&forced("classic"), seed, depth).unwrap();
        for (i, a) in level.reserved.iter().enumerate() {
            for b in &level.reserved[i + 1..] {
                prop_assert!(!overlaps(a, b), "{:?} and {:?}", a, b);
            }
        }
    }
}
