//! Room of chambers
//!
//! A big room filled with magma, cut into many small overlapping chambers
//! with walls and a door each. Floor is then opened up from one chamber and
//! spread to its neighbours through their doors, or through short breaches
//! in the walls between them, until nothing more connects.

use std::collections::VecDeque;

use log::debug;

use super::room::centre_or_space;
use super::util::{
    draw_rectangle, fill_rectangle, find_empty_range, find_in_range, generate_room, place_feat, place_object,
    place_random_door, set_marked_granite,
};
use super::GenerationContext;
use crate::dungeon::{Chunk, Loc, Rect, SquareFlags};
use crate::object::Origin;

/// Connection passes before giving up on the last chambers
const CONNECT_PASSES: i32 = 100;

const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Wall in a chamber's boundary, with a door somewhere along it
fn make_chamber(ctx: &mut GenerationContext<'_>, c: &mut Chunk, r: Rect) {
    for y in r.y1..=r.y2 {
        for x in r.x1..=r.x2 {
            let grid = Loc::new(y, x);
            let edge = y == r.y1 || y == r.y2 || x == r.x1 || x == r.x2;
            if edge && c.is_magma(grid) {
                set_marked_granite(c, grid, SquareFlags::WALL_INNER);
            }
        }
    }

    // A door in a random side, away from the corners
    for _ in 0..20 {
        let grid = if ctx.rng.one_in(2) {
            let y = if ctx.rng.one_in(2) { r.y1 } else { r.y2 };
            Loc::new(y, ctx.rng.rand_range(r.x1 + 1, r.x2 - 1))
        } else {
            let x = if ctx.rng.one_in(2) { r.x1 } else { r.x2 };
            Loc::new(ctx.rng.rand_range(r.y1 + 1, r.y2 - 1), x)
        };
        if c.is_granite(grid) && c.is_wall_inner(grid) {
            place_random_door(c, ctx.rng, grid);
            break;
        }
    }
}

/// Turn the magma reachable from `start` into floor, passing through doors
fn hollow_out(c: &mut Chunk, start: Loc) {
    let floor = c.feats().floor;
    let mut queue = VecDeque::from([start]);
    if c.is_magma(start) {
        place_feat(c, start, floor);
    }

    while let Some(grid) = queue.pop_front() {
        for next in grid.adjacent() {
            if c.is_magma(next) {
                place_feat(c, next, floor);
                queue.push_back(next);
            } else if c.is_door(next) && !queue.contains(&next) {
                // Doors pass the flood on without changing
                let beyond = next.offset(next.y - grid.y, next.x - grid.x);
                if c.is_magma(beyond) {
                    place_feat(c, beyond, floor);
                    queue.push_back(beyond);
                }
            }
        }
    }
}

/// Open one magma grid that touches hollowed floor, directly or through a
/// single wall; returns whether anything was opened
fn connect_one(ctx: &mut GenerationContext<'_>, c: &mut Chunk, grid: Loc, inner: Rect) -> bool {
    let (floor, broken) = (c.feats().floor, c.feats().broken);
    for (dy, dx) in ORTHOGONAL {
        let wall = grid.offset(dy, dx);
        let beyond = wall.offset(dy, dx);
        if c.is_floor(wall) && inner.contains(wall) {
            hollow_out(c, grid);
            return true;
        }
        if !inner.contains(beyond) || !c.is_floor(beyond) {
            continue;
        }
        if !(c.is_granite(wall) && c.is_wall_inner(wall)) {
            continue;
        }
        if ctx.rng.one_in(2) {
            place_feat(c, wall, broken);
        } else {
            place_feat(c, wall, floor);
        }
        hollow_out(c, grid);
        return true;
    }
    false
}

/// A room of many small chambers, sized by depth
pub fn build_room_of_chambers(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let depth = ctx.depth;
    let height = 14 + ctx.rng.m_bonus(6, depth);
    let width = 24 + ctx.rng.randint1(8) + ctx.rng.m_bonus(10, depth);
    let light = depth <= ctx.rng.randint1(25);

    let Some(centre) = centre_or_space(ctx, centre, height + 2, width + 2) else {
        return false;
    };

    let y1 = centre.y - height / 2;
    let x1 = centre.x - width / 2;
    let outer = Rect::new(y1, x1, y1 + height - 1, x1 + width - 1);
    if !c.in_bounds_fully(Loc::new(outer.y1, outer.x1)) || !c.in_bounds_fully(Loc::new(outer.y2, outer.x2)) {
        return false;
    }
    let inner = Rect::new(outer.y1 + 1, outer.x1 + 1, outer.y2 - 1, outer.x2 - 1);

    let (magma, granite) = (c.feats().magma, c.feats().granite);
    generate_room(c, outer, light);
    fill_rectangle(c, outer, magma, SquareFlags::WALL_INNER);
    draw_rectangle(c, outer, granite, SquareFlags::WALL_OUTER);

    // Carve
    let num_chambers = 10 + height * width / 80;
    for _ in 0..num_chambers {
        let ch = 3 + ctx.rng.randint0(4);
        let cw = 3 + ctx.rng.randint0(6);
        if ch > inner.y2 - inner.y1 || cw > inner.x2 - inner.x1 {
            continue;
        }
        let cy = ctx.rng.rand_range(inner.y1, inner.y2 - ch);
        let cx = ctx.rng.rand_range(inner.x1, inner.x2 - cw);
        make_chamber(ctx, c, Rect::new(cy, cx, cy + ch, cx + cw));
    }

    // Connect: start from magma in the middle of the room
    let middle = (
        (inner.y1 + (inner.y2 - inner.y1) / 4, inner.y2 - (inner.y2 - inner.y1) / 4 + 1),
        (inner.x1 + (inner.x2 - inner.x1) / 4, inner.x2 - (inner.x2 - inner.x1) / 4 + 1),
    );
    let seed = find_in_range(c, ctx.rng, middle.0, middle.1, Chunk::is_magma).unwrap_or(centre);
    hollow_out(c, seed);
    if !c.is_floor(seed) && !c.is_door(seed) {
        let floor = c.feats().floor;
        place_feat(c, seed, floor);
        hollow_out(c, seed);
    }

    for _ in 0..CONNECT_PASSES {
        let mut count = 0;
        for grid in inner.grids() {
            if c.is_magma(grid) && connect_one(ctx, c, grid, inner) {
                count += 1;
            }
        }
        if count == 0 {
            break;
        }
    }

    // Unreached magma becomes wall; walls with no open neighbour are solid
    for grid in inner.grids() {
        if c.is_magma(grid) {
            set_marked_granite(c, grid, SquareFlags::WALL_INNER);
        }
    }
    for grid in inner.grids() {
        if c.is_granite(grid) && !grid.adjacent().into_iter().any(|g| c.is_passable(g)) {
            c.info_off(grid, SquareFlags::WALL_INNER);
            c.info_on(grid, SquareFlags::WALL_SOLID);
        }
    }

    // Residents and their belongings
    let area = height * width;
    let ys = (inner.y1, inner.y2 + 1);
    let xs = (inner.x1, inner.x2 + 1);
    for _ in 0..area / 50 {
        let Some(grid) = find_empty_range(c, ctx.rng, ys, xs) else {
            break;
        };
        let boost = ctx.rng.randint0(6);
        ctx.pop.pick_and_place_monster(c, ctx.rng, grid, depth + boost, true, true, Origin::Special);
    }
    for _ in 0..area / 150 {
        let Some(grid) = find_empty_range(c, ctx.rng, ys, xs) else {
            break;
        };
        place_object(ctx, c, grid, depth, false, false, Origin::Special, None);
    }

    debug!("Room of chambers {height}x{width} at {centre:?}");
    true
}
