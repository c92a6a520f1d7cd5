//! Cavern levels
//!
//! Random rock smoothed by a cellular automaton: a grid with more than five
//! wall neighbours becomes wall, one with fewer than four becomes floor.
//! Small pockets are filled in and the rest joined up.

use log::debug;

use super::tunnel::Regions;
use super::util::{
    alloc_objects, alloc_stairs, draw_rectangle, fill_rectangle, new_player_spot, pick_and_place_distant_monster,
    place_feat, AllocKind, Placement,
};
use super::{Attempt, GenerationContext, Rejected};
use crate::consts::{AMT_GOLD, AMT_ITEM, AMT_ROOM};
use crate::dungeon::{Chunk, Loc, Rect, SquareFlags};
use crate::object::Origin;

/// Shallowest cavern level
const CAVERN_MIN_DEPTH: i32 = 15;

/// Seed the interior with floor and granite, `density` percent granite
fn init_cavern(ctx: &mut GenerationContext<'_>, c: &mut Chunk, density: i32) {
    let (floor, granite, perm) = (c.feats().floor, c.feats().granite, c.feats().perm);
    let all = Rect::new(0, 0, c.height - 1, c.width - 1);
    fill_rectangle(c, all, floor, SquareFlags::empty());
    for grid in all.grids() {
        if ctx.rng.randint0(100) < density {
            place_feat(c, grid, granite);
        }
    }
    draw_rectangle(c, all, perm, SquareFlags::WALL_SOLID);
}

/// One smoothing pass; every grid is judged on the previous pass
fn mutate_cavern(c: &mut Chunk) {
    let (floor, granite) = (c.feats().floor, c.feats().granite);
    let inner = Rect::new(1, 1, c.height - 2, c.width - 2);
    let walls: Vec<(Loc, usize)> = inner
        .grids()
        .map(|g| (g, g.adjacent().filter(|&n| c.is_wall(n)).count()))
        .collect();
    for (grid, count) in walls {
        if count > 5 {
            place_feat(c, grid, granite);
        } else if count < 4 {
            place_feat(c, grid, floor);
        }
    }
}

pub fn cavern_gen(ctx: &mut GenerationContext<'_>) -> Attempt {
    let depth = ctx.depth;
    if depth < CAVERN_MIN_DEPTH {
        return Err(Rejected::CavernDeclined);
    }
    let config = ctx.config;
    let height = ctx.rng.rand_range(config.dungeon_hgt / 2, config.dungeon_hgt * 3 / 4);
    let width = ctx.rng.rand_range(config.dungeon_wid / 2, config.dungeon_wid * 3 / 4);
    let size = height * width;

    let density = ctx.rng.rand_range(40, 48);
    let times = ctx.rng.rand_range(3, 6);

    let mut c = ctx.new_chunk(height, width);
    c.name = "cavern".to_string();
    init_cavern(ctx, &mut c, density);
    for _ in 0..times {
        mutate_cavern(&mut c);
    }

    let mut regions = Regions::build(&c, true);
    regions.clear_small(&mut c);
    regions.join_all(&mut c);

    let open = c.grids().filter(|&g| c.is_floor(g)).count() as i32;
    if open < size / 8 {
        debug!("Cavern declined: {open} floor grids of {size}");
        return Err(Rejected::CavernDeclined);
    }

    let down = ctx.rng.rand_range(1, 3);
    alloc_stairs(ctx, &mut c, true, down, 1);
    let up = ctx.rng.rand_range(1, 2);
    alloc_stairs(ctx, &mut c, false, up, 1);

    let k = (depth / 3).clamp(2, 10);
    let rubble = ctx.rng.randint1(k);
    alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Rubble, rubble, depth, Origin::Cavern);
    let traps = ctx.rng.randint1(k);
    alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Trap, traps, depth, Origin::Cavern);

    if !new_player_spot(ctx, &mut c) {
        return Err(Rejected::NoPlayerSpot);
    }

    // Population scales with the area of the cavern
    let full = config.dungeon_hgt * config.dungeon_wid;
    let scale = |n: i32| (n * size / full).max(1);
    let monsters = scale(config.min_m_alloc_level + ctx.rng.randint1(8) + k);
    for _ in 0..monsters {
        pick_and_place_distant_monster(ctx, &mut c, 0, true, depth);
    }

    let items = scale(ctx.rng.rand_normal(AMT_ROOM + AMT_ITEM, 3));
    alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Object, items, depth, Origin::Cavern);
    let gold = scale(ctx.rng.rand_normal(AMT_GOLD, 3));
    alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Gold, gold, depth, Origin::Cavern);

    debug!("Cavern {height}x{width}, density {density}, {times} passes");
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{BasicPopulator, GenData};
    use crate::player::Player;
    use crate::rng::GameRng;
    use crate::world::GenConfig;
    use hashbrown::HashSet;

    fn run(seed: u64, depth: i32) -> Attempt {
        let data = GenData::builtin().unwrap();
        let config = GenConfig::default();
        let mut rng = GameRng::new(seed);
        let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
        let mut player = Player::new();
        player.set_depth(depth);
        let profile = data.profile("cavern").unwrap().clone();
        let mut ctx = GenerationContext::new(&data, &config, &mut rng, &mut pop, &mut player, profile);
        cavern_gen(&mut ctx)
    }

    #[test]
    fn test_shallow_caverns_decline() {
        assert_eq!(run(1, 10).unwrap_err(), Rejected::CavernDeclined);
    }

    /// Every open grid reachable from the player, rubble counting as open
    fn reachable(c: &Chunk, start: Loc) -> HashSet<Loc> {
        let open = |g: Loc| c.is_passable(g) || c.is_door(g) || c.is_rubble(g);
        let mut seen = HashSet::from([start]);
        let mut queue = vec![start];
        while let Some(g) = queue.pop() {
            for n in g.adjacent() {
                if open(n) && seen.insert(n) {
                    queue.push(n);
                }
            }
        }
        seen
    }

    #[test]
    fn test_cavern_is_connected() {
        for seed in 0..4 {
            let Ok(c) = run(seed, 30) else {
                continue;
            };
            let player = c.player_grid().unwrap();
            let seen = reachable(&c, player);
            for g in c.grids().filter(|&g| c.is_floor(g)) {
                assert!(seen.contains(&g), "seed {seed}: {g:?} cut off");
            }
            assert!(c.is_perm(Loc::new(0, 0)));
        }
    }

    #[test]
    fn test_mutation_smooths() {
        let data = GenData::builtin().unwrap();
        let mut c = Chunk::new(9, 9, std::sync::Arc::clone(&data.terrain));
        let (floor, granite) = (c.feats().floor, c.feats().granite);
        fill_rectangle(&mut c, Rect::new(0, 0, 8, 8), granite, SquareFlags::empty());
        // A lone floor grid in rock closes up; a lone rock in a hall opens
        place_feat(&mut c, Loc::new(2, 2), floor);
        fill_rectangle(&mut c, Rect::new(4, 1, 7, 7), floor, SquareFlags::empty());
        place_feat(&mut c, Loc::new(6, 4), granite);
        mutate_cavern(&mut c);
        assert!(c.is_wall(Loc::new(2, 2)));
        assert!(c.is_floor(Loc::new(6, 4)));
    }
}
