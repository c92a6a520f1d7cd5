//! Visibility, lighting and memory behavioural tests
//!
//! Line of sight, the view and light passes, room lighting and what the
//! player remembers, on hand-built rooms and on generated levels.

use std::sync::Arc;

use dv_core::dungeon::{distance, Chunk, FeatureTable, Loc, Rect, SquareFlags};
use dv_core::events::EventQueue;
use dv_core::generate::util::{fill_rectangle, generate_room};
use dv_core::generate::{generate_level, BasicPopulator, GenData, LevelRequest};
use dv_core::player::Player;
use dv_core::vision::{light_room, los, update_view};
use dv_core::world::{GenConfig, WorldState};
use dv_core::GameRng;
use proptest::prelude::*;

fn terrain() -> Arc<FeatureTable> {
    Arc::new(FeatureTable::builtin().unwrap())
}

/// Granite chunk with a walled floor rectangle; no grid glows
fn walled_room(h: i32, w: i32) -> Chunk {
    let mut c = Chunk::new(h, w, terrain());
    let (floor, granite) = (c.feats().floor, c.feats().granite);
    fill_rectangle(&mut c, Rect::new(0, 0, h - 1, w - 1), granite, SquareFlags::empty());
    fill_rectangle(&mut c, Rect::new(1, 1, h - 2, w - 2), floor, SquareFlags::empty());
    c
}

/// Chunk of floor and granite scattered from a seed
fn scattered(seed: u64, h: i32, w: i32, walls: i32) -> Chunk {
    let mut c = Chunk::new(h, w, terrain());
    let (floor, granite) = (c.feats().floor, c.feats().granite);
    let mut rng = GameRng::new(seed);
    for g in c.grids().collect::<Vec<_>>() {
        let feat = if rng.randint0(100) < walls { granite } else { floor };
        c.set_feat(g, feat);
    }
    c
}

fn player_at(grid: Loc, light: i32) -> Player {
    let mut p = Player::new();
    p.grid = Some(grid);
    p.cur_light = light;
    p
}

fn generated_world(seed: u64, depth: i32) -> WorldState {
    let data = GenData::builtin().unwrap();
    let config = GenConfig::default();
    let mut rng = GameRng::new(seed);
    let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
    let mut player = Player::new();
    player.set_depth(depth);
    let level = generate_level(&data, &config, &mut rng, &mut pop, &mut player, &LevelRequest::default()).unwrap();
    WorldState::from_generated(level, player, config)
}

// ============================================================================
// Line of sight and distance
// ============================================================================

#[test]
fn test_distance_values() {
    assert_eq!(distance(Loc::new(0, 0), Loc::new(0, 5)), 5);
    assert_eq!(distance(Loc::new(0, 0), Loc::new(5, 5)), 7);
    assert_eq!(distance(Loc::new(0, 0), Loc::new(3, 0)), 3);
    assert_eq!(distance(Loc::new(2, 9), Loc::new(2, 9)), 0);
}

#[test]
fn test_los_blocked_by_a_pillar() {
    let mut c = walled_room(11, 11);
    let granite = c.feats().granite;
    c.set_feat(Loc::new(5, 5), granite);
    assert!(!los(&c, Loc::new(5, 2), Loc::new(5, 8)));
    assert!(!los(&c, Loc::new(2, 5), Loc::new(8, 5)));
    assert!(los(&c, Loc::new(2, 2), Loc::new(2, 8)));
    // The pillar itself is visible
    assert!(los(&c, Loc::new(5, 2), Loc::new(5, 5)));
}

proptest! {
    #[test]
    fn prop_los_is_symmetric(
        seed in any::<u64>(),
        walls in 0i32..50,
        y1 in 0i32..16, x1 in 0i32..16,
        y2 in 0i32..16, x2 in 0i32..16,
    ) {
        let c = scattered(seed, 16, 16, walls);
        let (a, b) = (Loc::new(y1, x1), Loc::new(y2, x2));
        let dy = (y2 - y1).abs();
        let dx = (x2 - x1).abs();
        prop_assume!(!((dy == 1 && dx == 2) || (dy == 2 && dx == 1)));
        prop_assert_eq!(los(&c, a, b), los(&c, b, a));
    }

    #[test]
    fn prop_los_reflexive_and_adjacent(
        seed in any::<u64>(),
        y in 0i32..16, x in 0i32..16,
        dy in -1i32..=1, dx in -1i32..=1,
    ) {
        let c = scattered(seed, 16, 16, 60);
        let a = Loc::new(y, x);
        prop_assert!(los(&c, a, a));
        let b = a.offset(dy, dx);
        prop_assume!(c.in_bounds(b));
        prop_assert!(los(&c, a, b));
    }

    #[test]
    fn prop_seen_implies_view(
        seed in any::<u64>(),
        walls in 0i32..40,
        y in 1i32..19, x in 1i32..29,
        light in 0i32..4,
    ) {
        let mut c = scattered(seed, 20, 30, walls);
        let floor = c.feats().floor;
        let pgrid = Loc::new(y, x);
        c.set_feat(pgrid, floor);
        c.info_on(Loc::new(y, 0), SquareFlags::GLOW);
        let mut known = c.new_known();
        let mut events = EventQueue::new();
        let config = GenConfig::default();
        update_view(&mut c, &mut known, &player_at(pgrid, light), &config, &mut events);
        for g in c.grids() {
            if c.is_seen(g) {
                prop_assert!(c.is_view(g), "{:?} seen but not in view", g);
            }
            if c.is_view(g) {
                prop_assert!(distance(pgrid, g) <= config.max_sight);
            }
        }
    }
}

// ============================================================================
// A dark room with no light
// ============================================================================

#[test]
fn test_dark_room_without_light() {
    let mut c = walled_room(15, 15);
    let granite = c.feats().granite;
    for pillar in [Loc::new(5, 5), Loc::new(7, 10), Loc::new(10, 4)] {
        c.set_feat(pillar, granite);
    }
    let pgrid = Loc::new(7, 7);
    let mut known = c.new_known();
    let mut events = EventQueue::new();
    let config = GenConfig::default();
    update_view(&mut c, &mut known, &player_at(pgrid, 0), &config, &mut events);

    for g in c.grids() {
        assert!(!c.is_seen(g), "{g:?} seen in the dark");
        if c.is_wall(g) {
            continue;
        }
        let expected = los(&c, pgrid, g) && distance(pgrid, g) <= config.max_sight;
        assert_eq!(c.is_view(g), expected, "{g:?}");
    }
    // Behind the pillar at (5, 5), seen from (7, 7)
    assert!(!c.is_view(Loc::new(3, 3)));
    // Nothing was seen, so nothing is remembered
    assert!(c.grids().all(|g| !c.is_mark(g)));
}

// ============================================================================
// Lighting and darkening a room
// ============================================================================

#[test]
fn test_light_room_then_darken() {
    // Two rooms sharing the wall at x = 9
    let mut c = Chunk::new(13, 17, terrain());
    let (floor, granite, less) = (c.feats().floor, c.feats().granite, c.feats().less);
    fill_rectangle(&mut c, Rect::new(0, 0, 12, 16), granite, SquareFlags::empty());
    let west = Rect::new(3, 3, 9, 9);
    let east = Rect::new(3, 9, 9, 15);
    for r in [west, east] {
        generate_room(&mut c, r, false);
        fill_rectangle(&mut c, Rect::new(r.y1 + 1, r.x1 + 1, r.y2 - 1, r.x2 - 1), floor, SquareFlags::empty());
    }
    let stairs = Loc::new(6, 6);
    c.set_feat(stairs, less);

    let player = player_at(Loc::new(5, 5), 1);
    let config = GenConfig::default();
    let mut known = c.new_known();
    let mut events = EventQueue::new();
    let mut rng = GameRng::new(3);

    light_room(&mut c, &mut known, &player, Loc::new(5, 5), true, &mut rng, &mut events);
    for g in west.grids() {
        assert!(c.is_glow(g), "{g:?} left dark");
    }
    for g in Rect::new(4, 10, 8, 14).grids() {
        assert!(!c.is_glow(g), "{g:?} lit through the wall");
    }
    assert!(c.grids().filter(|&g| !west.contains(g)).all(|g| !c.is_glow(g)));

    update_view(&mut c, &mut known, &player, &config, &mut events);
    assert!(west.grids().all(|g| c.is_mark(g)));
    assert_eq!(known.feat(stairs), less);

    light_room(&mut c, &mut known, &player, Loc::new(5, 5), false, &mut rng, &mut events);
    for g in west.grids() {
        assert!(!c.is_glow(g));
        if c.is_floor(g) {
            assert!(!c.is_mark(g), "{g:?} still remembered");
            assert_eq!(known.feat(g), known.feats().none);
        } else {
            assert!(c.is_mark(g), "{g:?} forgotten");
        }
    }
    assert!(c.is_mark(stairs));
}

// ============================================================================
// Memory on generated levels
// ============================================================================

#[test]
fn test_marks_survive_walking_around() {
    let mut w = generated_world(17, 6);
    let mut rng = GameRng::new(17);
    let mut marked: Vec<Loc> = w.chunk.grids().filter(|&g| w.chunk.is_mark(g)).collect();

    for _ in 0..10 {
        let open: Vec<Loc> = w.chunk.grids().filter(|&g| w.chunk.is_empty(g)).collect();
        let Some(&to) = rng.choose(&open) else {
            break;
        };
        w.move_player(to).unwrap();
        for &g in &marked {
            assert!(w.chunk.is_mark(g), "{g:?} forgotten after moving to {to:?}");
        }
        for g in w.chunk.grids() {
            if w.chunk.is_seen(g) {
                assert!(w.chunk.is_view(g));
                assert_eq!(w.known.feat(g), w.chunk.feat(g));
            }
        }
        marked = w.chunk.grids().filter(|&g| w.chunk.is_mark(g)).collect();
    }
}

#[test]
fn test_wiz_light_reveals_and_wiz_dark_forgets() {
    let mut w = generated_world(23, 3);
    w.wiz_light(false);
    let player = w.player.grid.unwrap();
    assert!(w.chunk.grids().filter(|&g| w.chunk.is_floor(g)).count() > 0);
    assert!(w.chunk.grids().any(|g| g != player && w.chunk.is_mark(g)));
    w.wiz_dark();
    let remembered = w.chunk.grids().filter(|&g| w.chunk.is_mark(g) && !w.chunk.is_seen(g)).count();
    assert_eq!(remembered, 0);
}
