//! The town
//!
//! Two rows of four shops along a main street, with a staircase down. The
//! layout comes from the fixed town seed so the town looks the same on
//! every visit; who is walking about depends on the time of day.

use log::debug;

use super::util::{
    draw_rectangle, fill_rectangle, find_empty, new_player_spot, pick_and_place_distant_monster, place_feat,
    place_stairs,
};
use super::{Attempt, GenerationContext, Rejected};
use crate::consts::{MAX_STORES, MIN_M_ALLOC_TD, MIN_M_ALLOC_TN, TOWN_DAWN, TOWN_DUSK};
use crate::dungeon::{Chunk, Loc, Rect, SquareFlags};
use crate::rng::GameRng;

/// Is it daylight on `turn`?
pub fn is_daytime(turn: u64) -> bool {
    turn % (10 * TOWN_DAWN) < 10 * TOWN_DUSK
}

/// One shop building with its entrance facing the street
///
/// Shops in the top row open to the south, the bottom row to the north.
fn build_store(c: &mut Chunk, rng: &mut GameRng, n: usize, yy: i32, xx: i32) {
    let (perm, entrance) = (c.feats().perm, c.feats().shops.get(n).copied());

    let y0 = yy * 9 + 6;
    let x0 = xx * 14 + 12;
    let y1 = y0 - rng.randint1(if yy == 0 { 3 } else { 2 });
    let y2 = y0 + rng.randint1(if yy == 1 { 3 } else { 2 });
    let x1 = x0 - rng.randint1(5);
    let x2 = x0 + rng.randint1(5);
    fill_rectangle(c, Rect::new(y1, x1, y2, x2), perm, SquareFlags::empty());

    if let Some(entrance) = entrance {
        let y = if yy == 0 { y2 } else { y1 };
        let x = rng.rand_range(x1, x2);
        place_feat(c, Loc::new(y, x), entrance);
    }
}

/// Lay out the streets and shops with the town's own generator
fn town_layout(ctx: &GenerationContext<'_>, c: &mut Chunk, rng: &mut GameRng) {
    let (floor, perm) = (c.feats().floor, c.feats().perm);
    let all = Rect::new(0, 0, c.height - 1, c.width - 1);
    fill_rectangle(c, all, floor, SquareFlags::empty());
    draw_rectangle(c, all, perm, SquareFlags::WALL_SOLID);

    let mut stores: Vec<usize> = (0..MAX_STORES).collect();
    rng.shuffle(&mut stores);
    for (k, &n) in stores.iter().enumerate() {
        let (yy, xx) = ((k / 4) as i32, (k % 4) as i32);
        build_store(c, rng, n, yy, xx);
    }

    if let Some(grid) = find_empty(c, rng) {
        place_stairs(ctx, c, grid, true);
    }
}

pub fn town_gen(ctx: &mut GenerationContext<'_>) -> Attempt {
    let (height, width) = (ctx.config.town_hgt, ctx.config.town_wid);
    let mut c = ctx.new_chunk(height, width);
    c.name = "town".to_string();

    let mut town_rng = GameRng::new(ctx.config.town_seed);
    town_layout(ctx, &mut c, &mut town_rng);

    if !new_player_spot(ctx, &mut c) {
        return Err(Rejected::NoPlayerSpot);
    }

    let daytime = is_daytime(ctx.turn);
    let residents = if daytime { MIN_M_ALLOC_TD } else { MIN_M_ALLOC_TN };
    for _ in 0..residents {
        pick_and_place_distant_monster(ctx, &mut c, 3, true, 0);
    }
    ctx.daytime = Some(daytime);

    debug!("Town at turn {} ({})", ctx.turn, if daytime { "day" } else { "night" });
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{BasicPopulator, GenData};
    use crate::player::Player;
    use crate::world::GenConfig;

    fn run(seed: u64, turn: u64) -> (Chunk, Option<bool>) {
        let data = GenData::builtin().unwrap();
        let config = GenConfig::default();
        let mut rng = GameRng::new(seed);
        let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
        let mut player = Player::new();
        let profile = data.profile("town").unwrap().clone();
        let mut ctx = GenerationContext::new(&data, &config, &mut rng, &mut pop, &mut player, profile);
        ctx.turn = turn;
        let c = town_gen(&mut ctx).unwrap();
        (c, ctx.daytime)
    }

    #[test]
    fn test_day_and_night() {
        assert!(is_daytime(0));
        assert!(is_daytime(10 * TOWN_DUSK - 1));
        assert!(!is_daytime(10 * TOWN_DUSK));
        assert!(is_daytime(10 * TOWN_DAWN));
    }

    #[test]
    fn test_town_has_shops_and_stairs() {
        let (c, daytime) = run(1, 0);
        assert_eq!((c.height, c.width), (22, 66));
        assert_eq!(daytime, Some(true));
        assert_eq!(c.grids().filter(|&g| c.is_shop(g)).count(), MAX_STORES);
        assert!(c.grids().any(|g| c.is_down_stairs(g)));
        assert!(!c.grids().any(|g| c.is_up_stairs(g)));
        assert!(c.player_grid().is_some());
    }

    #[test]
    fn test_town_layout_is_fixed() {
        // Different game seeds, same streets
        let (a, _) = run(1, 0);
        let (b, _) = run(99, 0);
        let strip = |c: &Chunk| {
            let shops: Vec<Loc> = c.grids().filter(|&g| c.is_shop(g)).collect();
            (shops, c.grids().filter(|&g| c.is_perm(g)).count())
        };
        assert_eq!(strip(&a), strip(&b));
        let stairs = |c: &Chunk| c.grids().find(|&g| c.is_down_stairs(g));
        assert_eq!(stairs(&a), stairs(&b));
    }

    #[test]
    fn test_residents_day_and_night() {
        let (day, _) = run(5, 0);
        let (night, daytime) = run(5, 10 * TOWN_DUSK);
        assert_eq!(daytime, Some(false));
        assert!(day.monster_count() > 0);
        assert!(night.monster_count() > 0);
    }

    #[test]
    fn test_shop_entrances_face_the_street() {
        let (c, _) = run(2, 0);
        for g in c.grids().filter(|&g| c.is_shop(g)) {
            let street = if g.y < c.height / 2 { g.offset(1, 0) } else { g.offset(-1, 0) };
            assert!(!c.is_perm(street), "{g:?} opens into a wall");
        }
    }
}
