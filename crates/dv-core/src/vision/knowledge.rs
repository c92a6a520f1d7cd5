//! The player's memory of a level
//!
//! The knowledge chunk has the live chunk's dimensions and terrain table but
//! only ever holds terrain the player has perceived. It changes only through
//! the functions here. MARK on the live square records that the grid has
//! been memorized.

use crate::dungeon::{Chunk, Loc, SquareFlags};
use crate::events::{EventSink, GameEvent};
use crate::object::ObjectKnowledge;

/// Copy the live terrain of a grid into the player's memory
pub fn memorize(c: &mut Chunk, known: &mut Chunk, grid: Loc) {
    let feat = c.feat(grid);
    known.set_feat(grid, feat);
    c.info_on(grid, SquareFlags::MARK);
}

/// Drop the player's memory of a grid
pub fn forget(c: &mut Chunk, known: &mut Chunk, grid: Loc) {
    let none = known.feats().none;
    known.set_feat(grid, none);
    c.info_off(grid, SquareFlags::MARK);
}

/// Record what the player can currently see on a grid
///
/// Does nothing unless the grid is SEEN (or the player is standing on it).
/// Objects on the grid become fully seen. Terrain is memorized if it was
/// not yet, or if it has changed since it was last seen.
pub fn note_spot(c: &mut Chunk, known: &mut Chunk, grid: Loc) {
    if !c.is_seen(grid) && !c.is_player(grid) {
        return;
    }

    know_pile(c, grid, ObjectKnowledge::Seen);

    if c.is_mark(grid) && known.feat(grid) == c.feat(grid) {
        return;
    }
    memorize(c, known, grid);
}

/// Tell the display a grid needs redrawing
pub fn light_spot(events: &mut dyn EventSink, grid: Loc) {
    events.publish(GameEvent::ItemList);
    events.publish(GameEvent::Map(grid));
}

fn know_pile(c: &mut Chunk, grid: Loc, level: ObjectKnowledge) {
    let pile = c.objects_at(grid).to_vec();
    for handle in pile {
        if let Some(obj) = c.object_mut(handle) {
            obj.notice(level);
        }
    }
}

/// Map the whole level: light and memorize everything that isn't floor
///
/// With `full`, floor objects become fully seen; otherwise the player only
/// becomes aware of them.
pub fn wiz_light(c: &mut Chunk, known: &mut Chunk, full: bool) {
    for y in 1..c.height - 1 {
        for x in 1..c.width - 1 {
            let grid = Loc::new(y, x);

            if !c.seems_like_wall(grid) {
                for a_grid in std::iter::once(grid).chain(grid.adjacent()) {
                    c.info_on(a_grid, SquareFlags::GLOW);
                    if !c.is_floor(a_grid) || c.has_visible_trap(a_grid) {
                        memorize(c, known, a_grid);
                    }
                }
            }

            let level = if full {
                ObjectKnowledge::Seen
            } else {
                ObjectKnowledge::Aware
            };
            know_pile(c, grid, level);
        }
    }
}

/// Forget the whole level
pub fn wiz_dark(c: &mut Chunk, known: &mut Chunk) {
    let none = known.feats().none;
    for grid in c.grids().collect::<Vec<_>>() {
        c.info_off(grid, SquareFlags::MARK | SquareFlags::DTRAP | SquareFlags::DEDGE);
        known.set_feat(grid, none);
    }
    for (_, obj) in c.objects_mut() {
        obj.known = ObjectKnowledge::Unaware;
    }
}

/// Light or darken the town for the time of day
///
/// By day everything glows. At night only non-floor grids glow, and lit
/// shop entrances light their doorsteps.
pub fn cave_illuminate(c: &mut Chunk, known: &mut Chunk, daytime: bool) {
    for grid in c.grids().collect::<Vec<_>>() {
        let near_floor = std::iter::once(grid)
            .chain(grid.adjacent())
            .filter(|&g| c.in_bounds_fully(g))
            .any(|g| c.is_floor(g) || c.is_stairs(g));

        if daytime || !c.is_floor(grid) {
            c.info_on(grid, SquareFlags::GLOW);
            if near_floor {
                memorize(c, known, grid);
            }
        } else if !c.is_bright(grid) {
            c.info_off(grid, SquareFlags::GLOW);
            forget(c, known, grid);
        }
    }

    let shops: Vec<Loc> = c.grids().filter(|&g| c.is_shop(g)).collect();
    for shop in shops {
        for a_grid in shop.adjacent() {
            if c.in_bounds(a_grid) {
                c.info_on(a_grid, SquareFlags::GLOW);
                memorize(c, known, a_grid);
            }
        }
    }
}

/// Memorize every grid except walls buried in other walls
pub fn cave_known(c: &mut Chunk, known: &mut Chunk) {
    for grid in c.grids().collect::<Vec<_>>() {
        let enclosed = grid
            .adjacent()
            .filter(|&g| !c.is_projectable(g) || c.is_bright(g))
            .count();
        if enclosed < 8 {
            memorize(c, known, grid);
        }
    }
}
