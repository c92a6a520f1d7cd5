//! Shared generation helpers
//!
//! Drawing primitives (rectangles, circles, wall roles), grid searches, and
//! the placement of stairs, doors, objects, traps and monsters that every
//! builder uses. Drawing ignores grids outside the chunk.

use log::trace;

use super::GenerationContext;
use crate::dungeon::{Chunk, FeatureId, Loc, PileEnd, Rect, SquareFlags, DDX_DDD, DDY_DDD};
use crate::object::{Origin, Tval};
use crate::player::Arrival;
use crate::rng::GameRng;
use crate::vision::los;

/// Random picks tried before a search falls back to an exhaustive scan
const QUICK_TRIES: i32 = 100;

/// Where `alloc_object` may put things
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Corridor,
    Room,
    Both,
}

/// What `alloc_object` puts down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocKind {
    Rubble,
    Trap,
    Gold,
    Object,
    Good,
    Great,
}

// Drawing

/// Change terrain during generation; any wall role the grid had is dropped
pub fn place_feat(c: &mut Chunk, grid: Loc, feat: FeatureId) {
    if !c.in_bounds(grid) {
        return;
    }
    c.set_feat(grid, feat);
    c.info_off(grid, SquareFlags::GENERATION);
}

/// Granite with a wall role
pub fn set_marked_granite(c: &mut Chunk, grid: Loc, flag: SquareFlags) {
    if !c.in_bounds(grid) {
        return;
    }
    let granite = c.feats().granite;
    place_feat(c, grid, granite);
    c.info_on(grid, flag);
}

/// Set terrain with an optional wall role; granite gets the role
fn place_marked(c: &mut Chunk, grid: Loc, feat: FeatureId, flag: SquareFlags) {
    place_feat(c, grid, feat);
    if !flag.is_empty() && c.in_bounds(grid) {
        c.info_on(grid, flag);
    }
}

/// Add flags to every grid of a rectangle
pub fn generate_mark(c: &mut Chunk, r: Rect, flag: SquareFlags) {
    for grid in r.grids() {
        if c.in_bounds(grid) {
            c.info_on(grid, flag);
        }
    }
}

/// Mark a rectangle as room, lit or not
pub fn generate_room(c: &mut Chunk, r: Rect, light: bool) {
    let flag = if light {
        SquareFlags::ROOM | SquareFlags::GLOW
    } else {
        SquareFlags::ROOM
    };
    generate_mark(c, r, flag);
}

/// Fill a rectangle with a feature
pub fn fill_rectangle(c: &mut Chunk, r: Rect, feat: FeatureId, flag: SquareFlags) {
    for grid in r.grids() {
        place_marked(c, grid, feat, flag);
    }
}

/// Draw the edges of a rectangle with a feature
pub fn draw_rectangle(c: &mut Chunk, r: Rect, feat: FeatureId, flag: SquareFlags) {
    for y in r.y1..=r.y2 {
        place_marked(c, Loc::new(y, r.x1), feat, flag);
        place_marked(c, Loc::new(y, r.x2), feat, flag);
    }
    for x in r.x1..=r.x2 {
        place_marked(c, Loc::new(r.y1, x), feat, flag);
        place_marked(c, Loc::new(r.y2, x), feat, flag);
    }
}

/// Fill a horizontal run with a feature and room flags
pub fn fill_xrange(c: &mut Chunk, y: i32, x1: i32, x2: i32, feat: FeatureId, flag: SquareFlags, light: bool) {
    for x in x1..=x2 {
        let grid = Loc::new(y, x);
        place_marked(c, grid, feat, flag);
        generate_room(c, Rect::new(y, x, y, x), light);
    }
}

/// Fill a vertical run with a feature and room flags
pub fn fill_yrange(c: &mut Chunk, x: i32, y1: i32, y2: i32, feat: FeatureId, flag: SquareFlags, light: bool) {
    for y in y1..=y2 {
        let grid = Loc::new(y, x);
        place_marked(c, grid, feat, flag);
        generate_room(c, Rect::new(y, x, y, x), light);
    }
}

/// Fill a circle; `border` widens every row to draw a ring around a smaller
/// circle filled afterwards
#[allow(clippy::too_many_arguments)]
pub fn fill_circle(
    c: &mut Chunk,
    centre: Loc,
    radius: i32,
    border: i32,
    feat: FeatureId,
    flag: SquareFlags,
    light: bool,
) {
    let (y0, x0) = (centre.y, centre.x);
    let r2 = radius * radius;
    let mut last = 0;
    for i in 0..=radius {
        let k = (f64::from(r2 - i * i).sqrt() + 0.5) as i32;

        let mut b = border;
        if border != 0 && last > k {
            b += 1;
        }

        fill_xrange(c, y0 - i, x0 - k - b, x0 + k + b, feat, flag, light);
        fill_xrange(c, y0 + i, x0 - k - b, x0 + k + b, feat, flag, light);
        fill_yrange(c, x0 - i, y0 - k - b, y0 + k + b, feat, flag, light);
        fill_yrange(c, x0 + i, y0 - k - b, y0 + k + b, feat, flag, light);
        last = k;
    }
}

/// Draw the lines of a cross through the middle of a rectangle
pub fn generate_plus(c: &mut Chunk, r: Rect, feat: FeatureId, flag: SquareFlags) {
    let y0 = (r.y1 + r.y2) / 2;
    let x0 = (r.x1 + r.x2) / 2;
    for y in r.y1..=r.y2 {
        place_marked(c, Loc::new(y, x0), feat, flag);
    }
    for x in r.x1..=r.x2 {
        place_marked(c, Loc::new(y0, x), feat, flag);
    }
}

/// Open the middle of every side of a rectangle
pub fn generate_open(c: &mut Chunk, r: Rect, feat: FeatureId) {
    let y0 = (r.y1 + r.y2) / 2;
    let x0 = (r.x1 + r.x2) / 2;
    place_feat(c, Loc::new(r.y1, x0), feat);
    place_feat(c, Loc::new(y0, r.x1), feat);
    place_feat(c, Loc::new(r.y2, x0), feat);
    place_feat(c, Loc::new(y0, r.x2), feat);
}

/// Open the middle of one random side of a rectangle
pub fn generate_hole(c: &mut Chunk, rng: &mut GameRng, r: Rect, feat: FeatureId) {
    let y0 = (r.y1 + r.y2) / 2;
    let x0 = (r.x1 + r.x2) / 2;
    let grid = match rng.randint0(4) {
        0 => Loc::new(r.y1, x0),
        1 => Loc::new(y0, r.x1),
        2 => Loc::new(r.y2, x0),
        _ => Loc::new(y0, r.x2),
    };
    place_feat(c, grid, feat);
}

// Searching

/// A random grid in `y1..y2` x `x1..x2` (half open) satisfying `pred`
///
/// Every qualifying grid is equally likely; `None` only if there is none.
pub fn find_in_range(
    c: &Chunk,
    rng: &mut GameRng,
    (y1, y2): (i32, i32),
    (x1, x2): (i32, i32),
    pred: impl Fn(&Chunk, Loc) -> bool,
) -> Option<Loc> {
    let yd = y2 - y1;
    let xd = x2 - x1;
    if yd <= 0 || xd <= 0 {
        return None;
    }
    let at = |k: i32| Loc::new(y1 + k / xd, x1 + k % xd);
    let n = yd * xd;

    // Step 1: random tries
    for _ in 0..QUICK_TRIES {
        let grid = at(rng.randint0(n));
        if pred(c, grid) {
            return Some(grid);
        }
    }

    // Step 2: visit the rest in random order
    let mut squares: Vec<i32> = (0..n).collect();
    for i in 0..n as usize {
        let j = i + rng.randint0(n - i as i32) as usize;
        squares.swap(i, j);
        let grid = at(squares[i]);
        if pred(c, grid) {
            return Some(grid);
        }
    }
    None
}

/// A random grid anywhere on the chunk satisfying `pred`
pub fn cave_find(c: &Chunk, rng: &mut GameRng, pred: impl Fn(&Chunk, Loc) -> bool) -> Option<Loc> {
    find_in_range(c, rng, (0, c.height), (0, c.width), pred)
}

/// A random empty grid
pub fn find_empty(c: &Chunk, rng: &mut GameRng) -> Option<Loc> {
    cave_find(c, rng, Chunk::is_empty)
}

/// A random empty grid in `y1..y2` x `x1..x2`
pub fn find_empty_range(c: &Chunk, rng: &mut GameRng, ys: (i32, i32), xs: (i32, i32)) -> Option<Loc> {
    find_in_range(c, rng, ys, xs, Chunk::is_empty)
}

/// A random in-bounds grid within `yd`, `xd` of `centre`
pub fn find_nearby_grid(c: &Chunk, rng: &mut GameRng, centre: Loc, yd: i32, xd: i32) -> Option<Loc> {
    find_in_range(
        c,
        rng,
        (centre.y - yd, centre.y + yd + 1),
        (centre.x - xd, centre.x + xd + 1),
        Chunk::in_bounds,
    )
}

/// Orthogonal step from `from` towards `to`; diagonals pick an axis at random
pub fn correct_dir(rng: &mut GameRng, from: Loc, to: Loc) -> (i32, i32) {
    let mut rdir = (to.y - from.y).signum();
    let mut cdir = (to.x - from.x).signum();
    if rdir != 0 && cdir != 0 {
        if rng.randint0(100) < 50 {
            rdir = 0;
        } else {
            cdir = 0;
        }
    }
    (rdir, cdir)
}

/// A random orthogonal step
pub fn rand_dir(rng: &mut GameRng) -> (i32, i32) {
    let i = rng.randint0(4) as usize;
    (DDY_DDD[i], DDX_DDD[i])
}

/// A random in-bounds grid within `d` of `centre`, in line of sight of it if
/// asked; `centre` itself if nothing turns up
pub fn scatter(c: &Chunk, rng: &mut GameRng, centre: Loc, d: i32, need_los: bool) -> Loc {
    for _ in 0..100 {
        let grid = Loc::new(rng.rand_spread(centre.y, d), rng.rand_spread(centre.x, d));
        if !c.in_bounds_fully(grid) {
            continue;
        }
        if d > 1 && crate::dungeon::distance(centre, grid) > d {
            continue;
        }
        if !need_los || los(c, centre, grid) {
            return grid;
        }
    }
    centre
}

/// Orthogonal neighbours that are walls
pub fn next_to_walls(c: &Chunk, grid: Loc) -> usize {
    grid.orthogonal().filter(|&g| c.is_wall(g)).count()
}

// Player and stairs

/// Put the player on a random empty non-vault grid (or the joining staircase)
///
/// A player who arrived by connected stairs finds a staircase back.
pub fn new_player_spot(ctx: &mut GenerationContext<'_>, c: &mut Chunk) -> bool {
    let grid = match ctx.join.filter(|&g| c.in_bounds_fully(g)) {
        Some(grid) => {
            if !c.is_floor(grid) {
                let floor = c.feats().floor;
                place_feat(c, grid, floor);
            }
            Some(grid)
        }
        None => cave_find(c, ctx.rng, |c, g| c.is_empty(g) && !c.is_vault(g)),
    };
    let Some(grid) = grid else {
        return false;
    };

    if ctx.player.connect_stairs {
        match ctx.player.arrival {
            Arrival::Descended => {
                let less = c.feats().less;
                place_feat(c, grid, less);
            }
            Arrival::Ascended => {
                let more = c.feats().more;
                place_feat(c, grid, more);
            }
            Arrival::Anywhere => {}
        }
    }

    if c.place_player(grid).is_err() {
        return false;
    }
    ctx.player.grid = Some(grid);
    trace!("Player starts at {grid:?}");
    true
}

/// Place stairs, forcing the direction where only one makes sense
///
/// The town only goes down; quest levels and the bottom only go up.
pub fn place_stairs(ctx: &GenerationContext<'_>, c: &mut Chunk, grid: Loc, down: bool) {
    let feats = c.feats();
    let feat = if ctx.depth == 0 {
        feats.more
    } else if ctx.is_quest_level() || ctx.depth >= ctx.config.max_depth - 1 {
        feats.less
    } else if down {
        feats.more
    } else {
        feats.less
    };
    place_feat(c, grid, feat);
}

/// Stairs in a random direction, if the grid could hold an object
pub fn place_random_stairs(ctx: &mut GenerationContext<'_>, c: &mut Chunk, grid: Loc) {
    let down = ctx.rng.randint0(100) >= 50;
    if c.can_put_item(grid) {
        place_stairs(ctx, c, grid, down);
    }
}

/// Place `num` staircases next to at least `walls` walls, relaxing the
/// requirement when no such spot turns up
pub fn alloc_stairs(ctx: &mut GenerationContext<'_>, c: &mut Chunk, down: bool, num: i32, walls: usize) {
    let mut walls = walls;
    for _ in 0..num {
        let mut done = false;
        while !done {
            for _ in 0..=1000 {
                let Some(grid) = find_empty(c, ctx.rng) else {
                    return;
                };
                if next_to_walls(c, grid) < walls {
                    continue;
                }
                place_stairs(ctx, c, grid, down);
                done = true;
                break;
            }
            if !done {
                if walls == 0 {
                    return;
                }
                walls -= 1;
            }
        }
    }
}

// Doors and rubble

pub fn place_rubble(c: &mut Chunk, grid: Loc) {
    let rubble = c.feats().rubble;
    place_feat(c, grid, rubble);
}

pub fn place_secret_door(c: &mut Chunk, grid: Loc) {
    let secret = c.feats().secret;
    place_feat(c, grid, secret);
}

pub fn place_closed_door(c: &mut Chunk, grid: Loc) {
    let closed = c.feats().closed;
    place_feat(c, grid, closed);
}

/// Open, broken, secret or closed door
pub fn place_random_door(c: &mut Chunk, rng: &mut GameRng, grid: Loc) {
    let tmp = rng.randint0(100);
    let feats = c.feats();
    let feat = if tmp < 30 {
        feats.open
    } else if tmp < 40 {
        feats.broken
    } else if tmp < 60 {
        feats.secret
    } else {
        feats.closed
    };
    place_feat(c, grid, feat);
}

// Objects, traps and monsters

/// Place a random object, adding to the level's object rating
#[allow(clippy::too_many_arguments)]
pub fn place_object(
    ctx: &mut GenerationContext<'_>,
    c: &mut Chunk,
    grid: Loc,
    level: i32,
    good: bool,
    great: bool,
    origin: Origin,
    tval: Option<Tval>,
) -> bool {
    if !c.can_put_item(grid) {
        return false;
    }
    let Some((mut obj, rating)) = ctx.pop.make_object(ctx.rng, level, good, great, tval) else {
        return false;
    };
    obj.origin = origin;
    obj.origin_depth = c.depth;
    if c.add_object(grid, obj, PileEnd::Front).is_err() {
        return false;
    }
    let rating = rating.min(250_000);
    c.obj_rating = c.obj_rating.saturating_add((rating / 10) * (rating / 10));
    true
}

/// Place a pile of gold
pub fn place_gold(ctx: &mut GenerationContext<'_>, c: &mut Chunk, grid: Loc, level: i32, origin: Origin) -> bool {
    if !c.can_put_item(grid) {
        return false;
    }
    let mut gold = ctx.pop.make_gold(ctx.rng, level);
    gold.origin = origin;
    gold.origin_depth = level;
    c.add_object(grid, gold, PileEnd::Front).is_ok()
}

/// Place `num` things of one kind at random empty grids
#[allow(clippy::too_many_arguments)]
pub fn alloc_objects(
    ctx: &mut GenerationContext<'_>,
    c: &mut Chunk,
    set: Placement,
    kind: AllocKind,
    num: i32,
    depth: i32,
    origin: Origin,
) -> usize {
    (0..num)
        .filter(|_| alloc_object(ctx, c, set, kind, depth, origin))
        .count()
}

/// Place one thing at a random empty grid in a corridor, a room, or either
pub fn alloc_object(
    ctx: &mut GenerationContext<'_>,
    c: &mut Chunk,
    set: Placement,
    kind: AllocKind,
    depth: i32,
    origin: Origin,
) -> bool {
    let mut spot = None;
    for _ in 0..2000 {
        let Some(grid) = find_empty(c, ctx.rng) else {
            return false;
        };
        let room = c.is_room(grid);
        let ok = match set {
            Placement::Corridor => !room,
            Placement::Room => room,
            Placement::Both => true,
        };
        if ok {
            spot = Some(grid);
            break;
        }
    }
    let Some(grid) = spot else {
        return false;
    };

    match kind {
        AllocKind::Rubble => {
            place_rubble(c, grid);
            true
        }
        AllocKind::Trap => ctx.pop.place_trap(c, ctx.rng, grid, depth),
        AllocKind::Gold => place_gold(ctx, c, grid, depth, origin),
        AllocKind::Object => place_object(ctx, c, grid, depth, false, false, origin, None),
        AllocKind::Good => place_object(ctx, c, grid, depth, true, false, origin, None),
        AllocKind::Great => place_object(ctx, c, grid, depth, true, true, origin, None),
    }
}

/// Up to `num` objects or gold piles near `centre`
pub fn vault_objects(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Loc, depth: i32, num: i32) {
    for _ in 0..num {
        for _ in 0..11 {
            let Some(grid) = find_nearby_grid(c, ctx.rng, centre, 2, 3) else {
                break;
            };
            if !c.can_put_item(grid) {
                continue;
            }
            if ctx.rng.randint0(100) < 75 {
                place_object(ctx, c, grid, depth, false, false, Origin::Special, None);
            } else {
                place_gold(ctx, c, grid, depth, Origin::Vault);
            }
            break;
        }
    }
}

/// Up to `num` traps within `yd`, `xd` of `centre`
pub fn vault_traps(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Loc, yd: i32, xd: i32, num: i32) {
    let depth = c.depth;
    for _ in 0..num {
        for _ in 0..=5 {
            let Some(grid) = find_nearby_grid(c, ctx.rng, centre, yd, xd) else {
                break;
            };
            if !c.is_empty(grid) {
                continue;
            }
            ctx.pop.place_trap(c, ctx.rng, grid, depth);
            break;
        }
    }
}

/// Up to `num` sleeping monsters (with their groups) next to `centre`
pub fn vault_monsters(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Loc, depth: i32, num: i32) {
    for _ in 0..num {
        for _ in 0..9 {
            let grid = scatter(c, ctx.rng, centre, 1, true);
            if !c.is_empty(grid) {
                continue;
            }
            ctx.pop.pick_and_place_monster(c, ctx.rng, grid, depth, true, true, Origin::Drop);
            break;
        }
    }
}

/// Place a monster more than `dis` grids from the player
pub fn pick_and_place_distant_monster(
    ctx: &mut GenerationContext<'_>,
    c: &mut Chunk,
    dis: i32,
    sleep: bool,
    depth: i32,
) -> bool {
    for _ in 0..10_000 {
        let grid = Loc::new(ctx.rng.randint0(c.height), ctx.rng.randint0(c.width));
        if !c.is_empty(grid) || c.is_mon_restrict(grid) {
            continue;
        }
        if ctx.player.distance_to(grid) <= dis {
            continue;
        }
        return ctx.pop.pick_and_place_monster(c, ctx.rng, grid, depth, sleep, true, Origin::Floor);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::FeatureTable;
    use std::sync::Arc;

    fn granite(h: i32, w: i32) -> Chunk {
        let mut c = Chunk::new(h, w, Arc::new(FeatureTable::builtin().unwrap()));
        let granite = c.feats().granite;
        fill_rectangle(&mut c, Rect::new(0, 0, h - 1, w - 1), granite, SquareFlags::empty());
        c
    }

    #[test]
    fn test_rectangles_and_wall_roles() {
        let mut c = granite(12, 12);
        let (floor, granite) = (c.feats().floor, c.feats().granite);
        let r = Rect::new(2, 2, 8, 8);
        draw_rectangle(&mut c, r, granite, SquareFlags::WALL_OUTER);
        fill_rectangle(&mut c, Rect::new(3, 3, 7, 7), floor, SquareFlags::empty());
        generate_room(&mut c, r, true);

        assert!(c.is_wall_outer(Loc::new(2, 5)));
        assert!(c.is_floor(Loc::new(5, 5)));
        assert!(!c.is_wall_outer(Loc::new(5, 5)));
        assert!(c.is_room(Loc::new(2, 2)) && c.is_glow(Loc::new(8, 8)));
        assert!(!c.is_room(Loc::new(1, 1)));

        // Floor laid over a marked wall drops the role
        place_feat(&mut c, Loc::new(2, 5), floor);
        assert!(!c.is_wall_outer(Loc::new(2, 5)));
    }

    #[test]
    fn test_drawing_off_the_edge_is_ignored() {
        let mut c = granite(5, 5);
        let floor = c.feats().floor;
        fill_rectangle(&mut c, Rect::new(-3, -3, 7, 7), floor, SquareFlags::empty());
        assert!(c.grids().all(|g| c.is_floor(g)));
    }

    #[test]
    fn test_fill_circle_is_round() {
        let mut c = granite(21, 21);
        let floor = c.feats().floor;
        fill_circle(&mut c, Loc::new(10, 10), 4, 0, floor, SquareFlags::empty(), false);
        assert!(c.is_floor(Loc::new(10, 14)));
        assert!(c.is_floor(Loc::new(6, 10)));
        assert!(!c.is_floor(Loc::new(6, 14)));
        assert!(!c.is_floor(Loc::new(10, 15)));
        assert!(c.is_room(Loc::new(10, 10)));
    }

    #[test]
    fn test_plus_and_open() {
        let mut c = granite(9, 9);
        let floor = c.feats().floor;
        let r = Rect::new(0, 0, 8, 8);
        generate_plus(&mut c, r, floor, SquareFlags::empty());
        assert!(c.is_floor(Loc::new(4, 0)) && c.is_floor(Loc::new(0, 4)));
        assert!(!c.is_floor(Loc::new(1, 1)));

        let mut c = granite(9, 9);
        generate_open(&mut c, r, floor);
        assert_eq!(c.grids().filter(|&g| c.is_floor(g)).count(), 4);
    }

    #[test]
    fn test_find_in_range_is_exhaustive() {
        let mut c = granite(30, 30);
        let floor = c.feats().floor;
        place_feat(&mut c, Loc::new(17, 3), floor);
        let mut rng = GameRng::new(4);
        assert_eq!(find_empty(&c, &mut rng), Some(Loc::new(17, 3)));
        assert_eq!(find_empty_range(&c, &mut rng, (0, 10), (0, 30)), None);
        assert_eq!(find_empty_range(&c, &mut rng, (5, 5), (0, 30)), None);
    }

    #[test]
    fn test_correct_dir_is_orthogonal() {
        let mut rng = GameRng::new(8);
        for _ in 0..50 {
            let (dy, dx) = correct_dir(&mut rng, Loc::new(0, 0), Loc::new(5, -7));
            assert!((dy, dx) == (1, 0) || (dy, dx) == (0, -1));
            let (dy, dx) = rand_dir(&mut rng);
            assert_eq!(dy.abs() + dx.abs(), 1);
        }
        assert_eq!(correct_dir(&mut rng, Loc::new(3, 3), Loc::new(3, 9)), (0, 1));
    }

    #[test]
    fn test_next_to_walls() {
        let mut c = granite(5, 5);
        let floor = c.feats().floor;
        place_feat(&mut c, Loc::new(2, 2), floor);
        assert_eq!(next_to_walls(&c, Loc::new(2, 2)), 4);
        place_feat(&mut c, Loc::new(2, 3), floor);
        assert_eq!(next_to_walls(&c, Loc::new(2, 2)), 3);
    }

    #[test]
    fn test_random_doors() {
        let mut c = granite(5, 5);
        let mut rng = GameRng::new(12);
        for _ in 0..40 {
            place_random_door(&mut c, &mut rng, Loc::new(2, 2));
            assert!(c.is_door(Loc::new(2, 2)));
        }
    }
}
