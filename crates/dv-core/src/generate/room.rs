//! Room builders
//!
//! Every builder takes an optional centre. With a centre the caller has
//! already reserved the space; without one the builder finds and reserves
//! its own with [`find_space`]. A builder that returns `false` has changed
//! nothing.

use log::{debug, trace};

use super::util::{
    draw_rectangle, fill_circle, fill_rectangle, generate_hole, generate_open, generate_plus, generate_room,
    place_feat, place_object, place_random_stairs, place_secret_door, rand_dir, set_marked_granite, vault_monsters,
    vault_objects, vault_traps,
};
use super::{blueprint, chambers, pit, starburst, GenerationContext, RoomKind, RoomProfile};
use crate::consts::{BLOCK_HGT, BLOCK_WID, MAX_PIT};
use crate::dungeon::{Chunk, Loc, Rect, SquareFlags};
use crate::object::Origin;

/// A room builder
pub type RoomBuilder = fn(&mut GenerationContext<'_>, &mut Chunk, Option<Loc>) -> bool;

/// Placement tries made by [`find_space`]
const FIND_SPACE_TRIES: i32 = 25;

/// The builder for a kind of room
pub fn builder(kind: RoomKind) -> RoomBuilder {
    match kind {
        RoomKind::Simple => build_simple,
        RoomKind::Circular => build_circular,
        RoomKind::Overlap => build_overlap,
        RoomKind::Crossed => build_crossed,
        RoomKind::Large => build_large,
        RoomKind::Nest => pit::build_nest,
        RoomKind::Pit => pit::build_pit,
        RoomKind::Template => blueprint::build_template,
        RoomKind::LesserVault => blueprint::build_lesser_vault,
        RoomKind::MediumVault => blueprint::build_medium_vault,
        RoomKind::GreaterVault => blueprint::build_greater_vault,
        RoomKind::Huge => build_huge,
        RoomKind::Chambers => chambers::build_room_of_chambers,
    }
}

/// Rooms whose size comes from their blueprint
fn sizes_itself(kind: RoomKind) -> bool {
    matches!(
        kind,
        RoomKind::Template | RoomKind::LesserVault | RoomKind::MediumVault | RoomKind::GreaterVault
    )
}

/// Find and reserve blocks for a `height` x `width` room
///
/// Returns the centre of the reserved blocks, which is also recorded as a
/// room centre.
pub fn find_space(ctx: &mut GenerationContext<'_>, height: i32, width: i32) -> Option<Loc> {
    let blocks_high = 1 + (height - 1).max(0) / BLOCK_HGT;
    let mut blocks_wide = 1 + (width - 1).max(0) / BLOCK_WID;

    // Little rooms like some elbow room
    if blocks_wide == 2 && ctx.rng.one_in(3) {
        blocks_wide = 3;
    } else if blocks_wide == 1 && ctx.rng.one_in(2) {
        blocks_wide = ctx.rng.rand_range(2, 3);
    }

    for _ in 0..FIND_SPACE_TRIES {
        let by1 = ctx.rng.randint0(ctx.row_blocks);
        let bx1 = ctx.rng.randint0(ctx.col_blocks);
        let by2 = by1 + blocks_high;
        let bx2 = bx1 + blocks_wide;

        if !ctx.blocks_free(by1, bx1, by2, bx2) {
            continue;
        }

        let centre = Loc::new((by1 + by2) * BLOCK_HGT / 2, (bx1 + bx2) * BLOCK_WID / 2);
        ctx.add_centre(centre);
        ctx.reserve(by1, bx1, by2, bx2);
        return Some(centre);
    }
    None
}

/// The given centre, or space found for a room of this size
pub(super) fn centre_or_space(ctx: &mut GenerationContext<'_>, centre: Option<Loc>, height: i32, width: i32) -> Option<Loc> {
    match centre {
        Some(centre) => Some(centre),
        None => find_space(ctx, height, width),
    }
}

/// Try to build a room of the given profile at block `(by, bx)`
///
/// Rooms sized by a blueprint look for their own space instead. Pits and
/// nests are limited per level.
pub fn room_build(ctx: &mut GenerationContext<'_>, c: &mut Chunk, by: i32, bx: i32, profile: &RoomProfile) -> bool {
    if ctx.depth < profile.level {
        return false;
    }
    if profile.pit && ctx.pit_num >= MAX_PIT {
        return false;
    }

    let build = builder(profile.kind);
    if sizes_itself(profile.kind) {
        if !build(ctx, c, None) {
            return false;
        }
    } else {
        let by2 = by + profile.height;
        let bx2 = bx + profile.width;
        if !ctx.blocks_free(by, bx, by2, bx2) {
            return false;
        }

        let centre = Loc::new((by + by2) * BLOCK_HGT / 2, (bx + bx2) * BLOCK_WID / 2);
        if !build(ctx, c, Some(centre)) {
            return false;
        }
        ctx.add_centre(centre);
        ctx.reserve(by, bx, by2, bx2);
    }

    if profile.pit {
        ctx.pit_num += 1;
    }
    debug!("Built {} room at depth {}", profile.name, ctx.depth);
    true
}

/// Shallow rooms are usually lit
fn roll_light(ctx: &mut GenerationContext<'_>) -> bool {
    ctx.depth <= ctx.rng.randint1(25)
}

/// Outer wall ring, floor inside, room flags over both
fn outlined_room(c: &mut Chunk, r: Rect, light: bool) {
    let walled = Rect::new(r.y1 - 1, r.x1 - 1, r.y2 + 1, r.x2 + 1);
    let (floor, granite) = (c.feats().floor, c.feats().granite);
    generate_room(c, walled, light);
    draw_rectangle(c, walled, granite, SquareFlags::WALL_OUTER);
    fill_rectangle(c, r, floor, SquareFlags::empty());
}

/// A circular room with radius 4 to 7, the biggest with a middle chamber
pub fn build_circular(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let radius = 2 + ctx.rng.randint1(2) + ctx.rng.randint1(3);
    let Some(centre) = centre_or_space(ctx, centre, 2 * radius + 10, 2 * radius + 10) else {
        return false;
    };
    let light = roll_light(ctx);
    let (floor, granite, secret) = (c.feats().floor, c.feats().granite, c.feats().secret);

    fill_circle(c, centre, radius + 1, 1, granite, SquareFlags::WALL_OUTER, light);
    fill_circle(c, centre, radius, 0, floor, SquareFlags::empty(), light);

    if radius - 4 > 0 && ctx.rng.randint0(4) < radius - 4 {
        let (dy, dx) = rand_dir(ctx.rng);
        let inner = Rect::new(centre.y - 2, centre.x - 2, centre.y + 2, centre.x + 2);
        draw_rectangle(c, inner, granite, SquareFlags::WALL_INNER);
        place_feat(c, centre.offset(dy * 2, dx * 2), secret);

        let depth = ctx.depth;
        let n = ctx.rng.randint0(2);
        vault_objects(ctx, c, centre, depth, n);
        let n = ctx.rng.randint0(3);
        vault_monsters(ctx, c, centre, depth + 1, n);
    }
    true
}

/// A plain rectangular room, sometimes pillared or ragged
pub fn build_simple(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let Some(Loc { y: y0, x: x0 }) = centre_or_space(ctx, centre, 11, 25) else {
        return false;
    };
    let r = Rect::new(
        y0 - ctx.rng.randint1(4),
        x0 - ctx.rng.randint1(11),
        y0 + ctx.rng.randint1(3),
        x0 + ctx.rng.randint1(11),
    );
    let light = roll_light(ctx);
    outlined_room(c, r, light);

    if ctx.rng.one_in(20) {
        // Pillars
        for y in (r.y1..=r.y2).step_by(2) {
            for x in (r.x1..=r.x2).step_by(2) {
                set_marked_granite(c, Loc::new(y, x), SquareFlags::WALL_INNER);
            }
        }
    } else if ctx.rng.one_in(50) {
        // Ragged edges
        for y in (r.y1 + 2..=r.y2 - 2).step_by(2) {
            set_marked_granite(c, Loc::new(y, r.x1), SquareFlags::WALL_INNER);
            set_marked_granite(c, Loc::new(y, r.x2), SquareFlags::WALL_INNER);
        }
        for x in (r.x1 + 2..=r.x2 - 2).step_by(2) {
            set_marked_granite(c, Loc::new(r.y1, x), SquareFlags::WALL_INNER);
            set_marked_granite(c, Loc::new(r.y2, x), SquareFlags::WALL_INNER);
        }
    }
    trace!("Simple room {r:?}");
    true
}

/// Two overlapping rectangles
pub fn build_overlap(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let Some(Loc { y: y0, x: x0 }) = centre_or_space(ctx, centre, 11, 25) else {
        return false;
    };
    let light = roll_light(ctx);
    let a = Rect::new(
        y0 - ctx.rng.randint1(4),
        x0 - ctx.rng.randint1(11),
        y0 + ctx.rng.randint1(3),
        x0 + ctx.rng.randint1(10),
    );
    let b = Rect::new(
        y0 - ctx.rng.randint1(3),
        x0 - ctx.rng.randint1(10),
        y0 + ctx.rng.randint1(4),
        x0 + ctx.rng.randint1(11),
    );

    let (floor, granite) = (c.feats().floor, c.feats().granite);
    for r in [a, b] {
        let walled = Rect::new(r.y1 - 1, r.x1 - 1, r.y2 + 1, r.x2 + 1);
        generate_room(c, walled, light);
        draw_rectangle(c, walled, granite, SquareFlags::WALL_OUTER);
    }
    for r in [a, b] {
        fill_rectangle(c, r, floor, SquareFlags::empty());
    }
    true
}

/// A cross: one arm running north-south, one east-west, with something
/// in the middle
pub fn build_crossed(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let Some(centre) = centre_or_space(ctx, centre, 11, 25) else {
        return false;
    };
    let Loc { y: y0, x: x0 } = centre;
    let light = roll_light(ctx);

    let (wy, wx) = (1, 1);
    let dy = ctx.rng.rand_range(3, 4);
    let dx = ctx.rng.rand_range(3, 11);

    let a = Rect::new(y0 - dy, x0 - wx, y0 + dy, x0 + wx);
    let b = Rect::new(y0 - wy, x0 - dx, y0 + wy, x0 + dx);

    let (floor, granite, secret) = (c.feats().floor, c.feats().granite, c.feats().secret);
    for r in [a, b] {
        let walled = Rect::new(r.y1 - 1, r.x1 - 1, r.y2 + 1, r.x2 + 1);
        generate_room(c, walled, light);
        draw_rectangle(c, walled, granite, SquareFlags::WALL_OUTER);
    }
    for r in [a, b] {
        fill_rectangle(c, r, floor, SquareFlags::empty());
    }

    // The middle, where the arms meet
    let middle = Rect::new(b.y1, a.x1, b.y2, a.x2);
    match ctx.rng.randint1(4) {
        2 => fill_rectangle(c, middle, granite, SquareFlags::WALL_INNER),
        3 => {
            // Treasure chamber
            draw_rectangle(c, middle, granite, SquareFlags::WALL_INNER);
            generate_hole(c, ctx.rng, middle, secret);
            let depth = ctx.depth;
            place_object(ctx, c, centre, depth, false, false, Origin::Special, None);
            let n = ctx.rng.randint0(2) + 3;
            vault_monsters(ctx, c, centre, depth + 2, n);
            let n = ctx.rng.randint0(3) + 2;
            vault_traps(ctx, c, centre, 4, 4, n);
        }
        4 => {
            if ctx.rng.one_in(3) {
                // Pinch the middle shut
                for y in b.y1..=b.y2 {
                    if y == y0 {
                        continue;
                    }
                    set_marked_granite(c, Loc::new(y, a.x1 - 1), SquareFlags::WALL_INNER);
                    set_marked_granite(c, Loc::new(y, a.x2 + 1), SquareFlags::WALL_INNER);
                }
                for x in a.x1..=a.x2 {
                    if x == x0 {
                        continue;
                    }
                    set_marked_granite(c, Loc::new(b.y1 - 1, x), SquareFlags::WALL_INNER);
                    set_marked_granite(c, Loc::new(b.y2 + 1, x), SquareFlags::WALL_INNER);
                }
                if ctx.rng.one_in(3) {
                    generate_open(c, Rect::new(b.y1 - 1, a.x1 - 1, b.y2 + 1, a.x2 + 1), secret);
                }
            } else if ctx.rng.one_in(3) {
                generate_plus(c, middle, granite, SquareFlags::WALL_INNER);
            } else if ctx.rng.one_in(3) {
                set_marked_granite(c, centre, SquareFlags::WALL_INNER);
            }
        }
        _ => {}
    }
    true
}

/// A large room with an inner room in one of five styles
pub fn build_large(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let Some(centre) = centre_or_space(ctx, centre, 11, 25) else {
        return false;
    };
    let Loc { y: y0, x: x0 } = centre;
    let light = roll_light(ctx);
    let depth = ctx.depth;

    outlined_room(c, Rect::new(y0 - 4, x0 - 11, y0 + 4, x0 + 11), light);

    // The inner room
    let inner = Rect::new(y0 - 2, x0 - 9, y0 + 2, x0 + 9);
    let inner_wall = Rect::new(inner.y1 - 1, inner.x1 - 1, inner.y2 + 1, inner.x2 + 1);
    let (granite, secret, closed) = (c.feats().granite, c.feats().secret, c.feats().closed);
    draw_rectangle(c, inner_wall, granite, SquareFlags::WALL_INNER);

    match ctx.rng.randint1(5) {
        1 => {
            generate_hole(c, ctx.rng, inner_wall, secret);
            vault_monsters(ctx, c, centre, depth + 2, 1);
        }
        2 => {
            // A small inner room inside the inner room
            generate_hole(c, ctx.rng, inner_wall, secret);
            let closet = Rect::new(y0 - 1, x0 - 1, y0 + 1, x0 + 1);
            draw_rectangle(c, closet, granite, SquareFlags::WALL_INNER);
            generate_hole(c, ctx.rng, closet, closed);

            let n = ctx.rng.randint1(3) + 2;
            vault_monsters(ctx, c, centre, depth + 2, n);
            if ctx.rng.randint0(100) < 80 {
                place_object(ctx, c, centre, depth, false, false, Origin::Special, None);
            } else {
                place_random_stairs(ctx, c, centre);
            }
            let n = 2 + ctx.rng.randint1(3);
            vault_traps(ctx, c, centre, 4, 10, n);
        }
        3 => {
            generate_hole(c, ctx.rng, inner_wall, secret);
            fill_rectangle(c, Rect::new(y0 - 1, x0 - 1, y0 + 1, x0 + 1), granite, SquareFlags::WALL_INNER);

            // Sometimes two more pillars
            if ctx.rng.one_in(2) {
                let (near, far) = if ctx.rng.one_in(2) { (5, 7) } else { (4, 6) };
                fill_rectangle(
                    c,
                    Rect::new(y0 - 1, x0 - far, y0 + 1, x0 - near),
                    granite,
                    SquareFlags::WALL_INNER,
                );
                fill_rectangle(
                    c,
                    Rect::new(y0 - 1, x0 + near, y0 + 1, x0 + far),
                    granite,
                    SquareFlags::WALL_INNER,
                );
            }

            // Sometimes closets either side of the middle
            if ctx.rng.one_in(3) {
                draw_rectangle(
                    c,
                    Rect::new(y0 - 1, x0 - 5, y0 + 1, x0 + 5),
                    granite,
                    SquareFlags::WALL_INNER,
                );
                let dy = ctx.rng.randint1(2) * 2;
                place_secret_door(c, Loc::new(y0 - 3 + dy, x0 - 3));
                let dy = ctx.rng.randint1(2) * 2;
                place_secret_door(c, Loc::new(y0 - 3 + dy, x0 + 3));

                let n = ctx.rng.randint1(2);
                vault_monsters(ctx, c, Loc::new(y0, x0 - 2), depth + 2, n);
                let n = ctx.rng.randint1(2);
                vault_monsters(ctx, c, Loc::new(y0, x0 + 2), depth + 2, n);

                if ctx.rng.one_in(3) {
                    place_object(ctx, c, Loc::new(y0, x0 - 2), depth, false, false, Origin::Special, None);
                }
                if ctx.rng.one_in(3) {
                    place_object(ctx, c, Loc::new(y0, x0 + 2), depth, false, false, Origin::Special, None);
                }
            }
        }
        4 => {
            // Checkerboard maze
            generate_hole(c, ctx.rng, inner_wall, secret);
            for grid in inner.grids() {
                if (grid.x + grid.y) & 1 != 0 {
                    set_marked_granite(c, grid, SquareFlags::WALL_INNER);
                }
            }

            let n = ctx.rng.randint1(3);
            vault_monsters(ctx, c, Loc::new(y0, x0 - 5), depth + 2, n);
            let n = ctx.rng.randint1(3);
            vault_monsters(ctx, c, Loc::new(y0, x0 + 5), depth + 2, n);
            let n = ctx.rng.randint1(3);
            vault_traps(ctx, c, Loc::new(y0, x0 - 3), 2, 8, n);
            let n = ctx.rng.randint1(3);
            vault_traps(ctx, c, Loc::new(y0, x0 + 3), 2, 8, n);
            vault_objects(ctx, c, centre, depth, 3);
        }
        _ => {
            // Four compartments
            generate_plus(c, inner, granite, SquareFlags::WALL_INNER);
            if ctx.rng.randint0(100) < 50 {
                let i = ctx.rng.randint1(10);
                place_secret_door(c, Loc::new(inner.y1 - 1, x0 - i));
                place_secret_door(c, Loc::new(inner.y1 - 1, x0 + i));
                place_secret_door(c, Loc::new(inner.y2 + 1, x0 - i));
                place_secret_door(c, Loc::new(inner.y2 + 1, x0 + i));
            } else {
                let i = ctx.rng.randint1(3);
                place_secret_door(c, Loc::new(y0 + i, inner.x1 - 1));
                place_secret_door(c, Loc::new(y0 - i, inner.x1 - 1));
                place_secret_door(c, Loc::new(y0 + i, inner.x2 + 1));
                place_secret_door(c, Loc::new(y0 - i, inner.x2 + 1));
            }

            let n = 2 + ctx.rng.randint1(2);
            vault_objects(ctx, c, centre, depth, n);
            for (dy, dx) in [(1, -4), (1, 4), (-1, -4), (-1, 4)] {
                let n = ctx.rng.randint1(4);
                vault_monsters(ctx, c, Loc::new(y0 + dy, x0 + dx), depth + 2, n);
            }
        }
    }
    true
}

/// One enormous starburst, often broken up by rubble fields
pub fn build_huge(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let height = 3 * BLOCK_HGT;
    let width = 6 * BLOCK_WID;
    let Some(Loc { y: y0, x: x0 }) = centre_or_space(ctx, centre, height, width) else {
        return false;
    };
    let light = ctx.rng.randint0(3) != 0;

    let y1 = y0 - height / 2;
    let x1 = x0 - width / 2;
    let r = Rect::new(y1, x1, y1 + height - 1, x1 + width - 1);

    let floor = c.feats().floor;
    if !starburst::generate_starburst_room(c, ctx.rng, r, light, floor, false) {
        return false;
    }

    if ctx.rng.randint1(5) > 2 {
        let rubble = c.feats().rubble;
        let count = height * width * ctx.rng.randint1(2) / 1100;
        for _ in 0..count {
            let h = 8 + ctx.rng.randint0(16);
            let w = 10 + ctx.rng.randint0(24);
            let fy = y1 + ctx.rng.randint0(height - h);
            let fx = x1 + ctx.rng.randint0(width - w);
            starburst::generate_starburst_room(c, ctx.rng, Rect::new(fy, fx, fy + h, fx + w), false, rubble, false);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{DUNGEON_HGT, DUNGEON_WID};
    use crate::generate::{BasicPopulator, GenData, GenerationContext};
    use crate::player::Player;
    use crate::rng::GameRng;
    use crate::world::GenConfig;

    fn granite_chunk(ctx: &mut GenerationContext<'_>) -> Chunk {
        let mut c = ctx.new_chunk(DUNGEON_HGT, DUNGEON_WID);
        let granite = c.feats().granite;
        fill_rectangle(&mut c, Rect::new(0, 0, DUNGEON_HGT - 1, DUNGEON_WID - 1), granite, SquareFlags::empty());
        ctx.init_blocks(DUNGEON_HGT, DUNGEON_WID);
        c
    }

    fn with_ctx(seed: u64, depth: i32, f: impl FnOnce(&mut GenerationContext<'_>)) {
        let data = GenData::builtin().unwrap();
        let config = GenConfig::default();
        let mut rng = GameRng::new(seed);
        let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
        let mut player = Player::new();
        player.set_depth(depth);
        let profile = data.profile("classic").unwrap().clone();
        let mut ctx = GenerationContext::new(&data, &config, &mut rng, &mut pop, &mut player, profile);
        f(&mut ctx);
    }

    #[test]
    fn test_simple_room_has_walls_and_floor() {
        with_ctx(3, 1, |ctx| {
            let mut c = granite_chunk(ctx);
            let centre = Loc::new(20, 40);
            assert!(build_simple(ctx, &mut c, Some(centre)));
            assert!(c.is_room(centre));
            assert!(c.grids().any(|g| c.is_wall_outer(g)));
            // Nothing beyond the largest footprint
            for g in c.grids() {
                if (g.y - 20).abs() > 5 || (g.x - 40).abs() > 12 {
                    assert!(c.is_granite(g) && !c.is_room(g));
                }
            }
        });
    }

    #[test]
    fn test_builders_without_centre_reserve_space() {
        with_ctx(9, 10, |ctx| {
            let mut c = granite_chunk(ctx);
            assert!(build_overlap(ctx, &mut c, None));
            assert_eq!(ctx.cent.len(), 1);
            assert_eq!(ctx.reserved.len(), 1);
            let centre = ctx.cent[0];
            assert!(c.is_floor(centre));
        });
    }

    #[test]
    fn test_find_space_never_overlaps() {
        with_ctx(4, 5, |ctx| {
            let _c = granite_chunk(ctx);
            while find_space(ctx, 22, 33).is_some() {}
            let blocks: Vec<_> = ctx.reserved.iter().flat_map(|r| r.grids()).collect();
            let mut unique = blocks.clone();
            unique.sort_by_key(|l| (l.y, l.x));
            unique.dedup();
            assert_eq!(blocks.len(), unique.len());
        });
    }

    #[test]
    fn test_room_build_respects_depth_and_pits() {
        with_ctx(5, 2, |ctx| {
            let mut c = granite_chunk(ctx);
            let profile = ctx.profile.room_profiles.iter().find(|r| r.kind == RoomKind::Huge).unwrap().clone();
            assert!(!room_build(ctx, &mut c, 0, 0, &profile));
            assert!(ctx.cent.is_empty());

            let pit = ctx.profile.room_profiles.iter().find(|r| r.kind == RoomKind::Pit).unwrap().clone();
            ctx.pit_num = MAX_PIT;
            assert!(!room_build(ctx, &mut c, 0, 0, &pit));
        });
    }

    #[test]
    fn test_room_build_reserves_blocks() {
        with_ctx(6, 5, |ctx| {
            let mut c = granite_chunk(ctx);
            let simple = ctx.profile.room_profiles.iter().find(|r| r.kind == RoomKind::Simple).unwrap().clone();
            assert!(room_build(ctx, &mut c, 1, 2, &simple));
            assert_eq!(ctx.cent, vec![Loc::new(16, 38)]);
            assert!(ctx.is_reserved(1, 2) && ctx.is_reserved(1, 4));
            assert!(!ctx.is_reserved(1, 5));
            // Same blocks again fail
            assert!(!room_build(ctx, &mut c, 1, 3, &simple));
        });
    }

    #[test]
    fn test_circular_and_crossed_rooms() {
        with_ctx(8, 3, |ctx| {
            let mut c = granite_chunk(ctx);
            assert!(build_circular(ctx, &mut c, Some(Loc::new(20, 30))));
            assert!(c.is_room(Loc::new(20, 26)));
            assert!(build_crossed(ctx, &mut c, Some(Loc::new(20, 100))));
            assert!(c.is_floor(Loc::new(20, 103)));
            assert!(c.is_floor(Loc::new(23, 100)));
        });
    }

    #[test]
    fn test_large_and_huge_rooms() {
        with_ctx(12, 45, |ctx| {
            let mut c = granite_chunk(ctx);
            assert!(build_large(ctx, &mut c, Some(Loc::new(10, 20))));
            assert!(c.is_floor(Loc::new(6, 9)));
            assert!(c.is_wall_inner(Loc::new(7, 10)) || c.is_door(Loc::new(7, 10)));
            assert!(build_huge(ctx, &mut c, Some(Loc::new(33, 120))));
            let room = Rect::new(17, 87, 49, 152).grids().filter(|&g| c.is_room(g)).count();
            assert!(room > 500, "room grids = {room}");
        });
    }
}
