//! Classic rooms-and-corridors levels

use log::debug;

use super::room::{build_simple, room_build};
use super::tunnel::{build_streamer, build_tunnel, ensure_connectedness, try_door};
use super::util::{
    alloc_objects, alloc_stairs, draw_rectangle, fill_rectangle, new_player_spot, pick_and_place_distant_monster,
    AllocKind, Placement,
};
use super::{Attempt, GenerationContext, Rejected};
use crate::consts::{AMT_GOLD, AMT_ITEM, AMT_ROOM, BLOCK_HGT, BLOCK_WID};
use crate::dungeon::{Chunk, Rect, SquareFlags};
use crate::object::Origin;

/// Level size as a percentage of the full dungeon; quest levels are full size
fn size_percent(ctx: &mut GenerationContext<'_>) -> i32 {
    if ctx.is_quest_level() {
        return 100;
    }
    match ctx.rng.randint1(10) + ctx.depth / 24 {
        i if i < 2 => 75,
        2 => 80,
        3 => 85,
        4 => 90,
        5 => 95,
        _ => 100,
    }
}

/// How exotic a room this block may get: each tier needs another
/// successful roll against `dun_unusual`
fn roll_rarity(ctx: &mut GenerationContext<'_>) -> i32 {
    let mut rarity = 0;
    let mut i = 0;
    while i == rarity && i < ctx.profile.max_rarity {
        if ctx.rng.randint0(ctx.profile.dun_unusual) < 50 + ctx.depth / 2 {
            rarity += 1;
        }
        i += 1;
    }
    rarity
}

/// Rooms first, block by block, until enough are built or every block
/// has been tried
fn build_rooms(ctx: &mut GenerationContext<'_>, c: &mut Chunk, num_rooms: i32) {
    // The staircase of a connected level gets a room of its own
    if let Some(join) = ctx.join.filter(|&g| c.in_bounds_fully(g)) {
        let (by, bx) = (join.y / BLOCK_HGT, join.x / BLOCK_WID);
        if build_simple(ctx, c, Some(join)) {
            ctx.add_centre(join);
            ctx.reserve(by, bx - 1, by + 1, bx + 2);
        }
    }

    let total = ctx.row_blocks * ctx.col_blocks;
    let mut tried = vec![false; total.max(0) as usize];
    let mut blocks_tried = 0;
    let rooms = ctx.profile.room_profiles.clone();

    while (ctx.cent.len() as i32) < num_rooms && blocks_tried < total {
        let (by, bx) = loop {
            let by = ctx.rng.randint0(ctx.row_blocks);
            let bx = ctx.rng.randint0(ctx.col_blocks);
            let i = (by * ctx.col_blocks + bx) as usize;
            if !tried[i] {
                tried[i] = true;
                break (by, bx);
            }
        };
        blocks_tried += 1;

        let key = ctx.rng.randint0(100);
        let rarity = roll_rarity(ctx);
        for profile in &rooms {
            if profile.rarity > rarity || profile.cutoff <= key {
                continue;
            }
            if room_build(ctx, c, by, bx, profile) {
                break;
            }
        }
    }
}

/// Corridors between the room centres, in a scrambled order, then doors
/// at the junctions
fn connect_rooms(ctx: &mut GenerationContext<'_>, c: &mut Chunk) {
    let mut centres = ctx.cent.clone();
    ctx.rng.shuffle(&mut centres);

    ctx.door.clear();
    let Some(&last) = centres.last() else {
        return;
    };
    let mut from = last;
    for &to in &centres {
        build_tunnel(ctx, c, to, from);
        from = to;
    }

    let doors = std::mem::take(&mut ctx.door);
    for grid in doors {
        for spot in [grid.offset(-1, 0), grid.offset(1, 0), grid.offset(0, -1), grid.offset(0, 1)] {
            try_door(ctx, c, spot);
        }
    }
}

pub fn classic_gen(ctx: &mut GenerationContext<'_>) -> Attempt {
    let config = ctx.config;
    let depth = ctx.depth;

    let size_percent = size_percent(ctx);
    let height = (config.dungeon_hgt * (size_percent - 5 + ctx.rng.randint0(10)) / 100).min(config.dungeon_hgt);
    let width = (config.dungeon_wid * (size_percent - 5 + ctx.rng.randint0(10)) / 100).min(config.dungeon_wid);
    let num_rooms = ctx.profile.dun_rooms * size_percent / 100;

    let mut c = ctx.new_chunk(height, width);
    let (granite, perm) = (c.feats().granite, c.feats().perm);
    fill_rectangle(&mut c, Rect::new(0, 0, height - 1, width - 1), granite, SquareFlags::empty());
    ctx.init_blocks(height, width);

    build_rooms(ctx, &mut c, num_rooms);
    draw_rectangle(&mut c, Rect::new(0, 0, height - 1, width - 1), perm, SquareFlags::empty());
    if ctx.cent.is_empty() {
        return Err(Rejected::NoRooms);
    }
    debug!("Classic level {height}x{width} ({size_percent}%), {} rooms", ctx.cent.len());

    connect_rooms(ctx, &mut c);
    ensure_connectedness(&mut c);

    let streamers = ctx.profile.str.clone();
    let (magma, quartz) = (c.feats().magma, c.feats().quartz);
    for _ in 0..streamers.mag {
        build_streamer(ctx, &mut c, magma, streamers.mc);
    }
    for _ in 0..streamers.qua {
        build_streamer(ctx, &mut c, quartz, streamers.qc);
    }

    let down = ctx.rng.rand_range(3, 4);
    alloc_stairs(ctx, &mut c, true, down, 3);
    let up = ctx.rng.rand_range(1, 2);
    alloc_stairs(ctx, &mut c, false, up, 3);

    // Scale the clutter by depth
    let k = (depth / 3).clamp(2, 10);
    let rubble = ctx.rng.randint1(k);
    alloc_objects(ctx, &mut c, Placement::Corridor, AllocKind::Rubble, rubble, depth, Origin::Floor);
    let traps = ctx.rng.randint1(k);
    alloc_objects(ctx, &mut c, Placement::Corridor, AllocKind::Trap, traps, depth, Origin::Floor);

    if !new_player_spot(ctx, &mut c) {
        return Err(Rejected::NoPlayerSpot);
    }

    let monsters = config.min_m_alloc_level + ctx.rng.randint1(8) + k;
    for _ in 0..monsters {
        pick_and_place_distant_monster(ctx, &mut c, 0, true, depth);
    }

    let room_items = ctx.rng.rand_normal(AMT_ROOM, 3);
    alloc_objects(ctx, &mut c, Placement::Room, AllocKind::Object, room_items, depth, Origin::Floor);
    let items = ctx.rng.rand_normal(AMT_ITEM, 3);
    alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Object, items, depth, Origin::Floor);
    let gold = ctx.rng.rand_normal(AMT_GOLD, 3);
    alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Gold, gold, depth, Origin::Floor);

    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::Loc;
    use crate::generate::{BasicPopulator, GenData};
    use crate::player::Player;
    use crate::rng::GameRng;
    use crate::world::GenConfig;

    fn run(seed: u64, depth: i32, profile: &str) -> (Attempt, Vec<Rect>) {
        let data = GenData::builtin().unwrap();
        let config = GenConfig::default();
        let mut rng = GameRng::new(seed);
        let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
        let mut player = Player::new();
        player.set_depth(depth);
        let profile = data.profile(profile).unwrap().clone();
        let mut ctx = GenerationContext::new(&data, &config, &mut rng, &mut pop, &mut player, profile);
        let result = classic_gen(&mut ctx);
        (result, ctx.reserved.clone())
    }

    #[test]
    fn test_size_percent_is_bounded() {
        let data = GenData::builtin().unwrap();
        let config = GenConfig::default();
        let mut rng = GameRng::new(1);
        let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
        let mut player = Player::new();
        player.set_depth(50);
        let profile = data.profile("classic").unwrap().clone();
        let mut ctx = GenerationContext::new(&data, &config, &mut rng, &mut pop, &mut player, profile);
        for _ in 0..100 {
            let p = size_percent(&mut ctx);
            assert!((75..=100).contains(&p) && p % 5 == 0);
        }
    }

    #[test]
    fn test_classic_level() {
        let (result, reserved) = run(42, 5, "classic");
        let c = result.unwrap();
        assert!(!reserved.is_empty());

        // Permanent border
        for x in 0..c.width {
            assert!(c.is_perm(Loc::new(0, x)) && c.is_perm(Loc::new(c.height - 1, x)));
        }
        let player = c.player_grid().unwrap();
        assert!(c.is_floor(player) || c.is_stairs(player));
        assert!(c.grids().any(|g| c.is_down_stairs(g)));
        assert!(c.monster_count() > 0);
    }

    #[test]
    fn test_reserved_blocks_never_overlap() {
        for seed in 0..4 {
            let (result, reserved) = run(seed, 30, "classic");
            assert!(result.is_ok());
            for (i, a) in reserved.iter().enumerate() {
                for b in &reserved[i + 1..] {
                    let overlap = a.y1 <= b.y2 && b.y1 <= a.y2 && a.x1 <= b.x2 && b.x1 <= a.x2;
                    assert!(!overlap, "seed {seed}: {a:?} and {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_simple_profile_only_plain_rooms() {
        let (result, _) = run(9, 1, "simple");
        let c = result.unwrap();
        assert!(c.grids().all(|g| !c.is_vault(g)));
        assert!(c.grids().any(|g| c.is_room(g)));
    }
}
