//! Field of view
//!
//! [`update_view`] rebuilds VIEW and SEEN for the whole chunk from the
//! player's position, then notes what came into or went out of sight.
//! SEEN is only ever set on a grid that already has VIEW.

use super::knowledge::{light_spot, note_spot};
use super::light::calc_lighting;
use super::los::los;
use crate::dungeon::{distance, Chunk, Loc, SquareFlags};
use crate::events::{EventSink, GameEvent};
use crate::player::Player;
use crate::world::options::GenConfig;

/// Clear VIEW and SEEN everywhere
pub fn forget_view(c: &mut Chunk) {
    c.info_off_all(SquareFlags::VIEW | SquareFlags::SEEN);
}

/// Remember what was seen, then wipe the view
fn mark_wasseen(c: &mut Chunk) {
    for grid in c.grids().collect::<Vec<_>>() {
        if c.is_seen(grid) {
            c.info_on(grid, SquareFlags::WASSEEN);
        }
        c.info_off(grid, SquareFlags::VIEW | SquareFlags::SEEN);
    }
}

/// One step from `grid` towards `target`
fn step_toward(grid: Loc, target: Loc) -> Loc {
    Loc::new(
        grid.y + (target.y - grid.y).signum(),
        grid.x + (target.x - grid.x).signum(),
    )
}

/// Put a grid in view, and decide whether it is also seen
fn become_viewable(c: &mut Chunk, grid: Loc, pgrid: Loc, close: bool) {
    if c.is_view(grid) {
        return;
    }
    c.info_on(grid, SquareFlags::VIEW);

    if close {
        c.info_on(grid, SquareFlags::SEEN);
    }

    // Walls are seen by the light of the grid in front of them
    let lit_from = if c.is_wall(grid) {
        step_toward(grid, pgrid)
    } else {
        grid
    };
    if c.light(lit_from) > 0 {
        c.info_on(grid, SquareFlags::SEEN);
    }
}

/// Grid whose line of sight stands in for a wall's
///
/// A wall is visible if the grid next to it on the player's side is,
/// unless that grid is itself a wall, or the wall was only reached through
/// a knight's move past another wall.
fn wall_view_target(c: &Chunk, grid: Loc, pgrid: Loc) -> Loc {
    let (y, x) = (grid.y, grid.x);
    let dx = x - pgrid.x;
    let dy = y - pgrid.y;
    let ax = dx.abs();
    let ay = dy.abs();
    let sx = if dx > 0 { 1 } else { -1 };
    let sy = if dy > 0 { 1 } else { -1 };

    let target = step_toward(grid, pgrid);
    if c.is_wall(target) {
        return grid;
    }

    if ax == 2 && ay == 1 {
        if !c.is_wall(Loc::new(y, x - sx)) && c.is_wall(Loc::new(y - sy, x - sx)) {
            return grid;
        }
    } else if ax == 1
        && ay == 2
        && !c.is_wall(Loc::new(y - sy, x))
        && c.is_wall(Loc::new(y - sy, x - sx))
    {
        return grid;
    }

    target
}

fn update_view_one(c: &mut Chunk, grid: Loc, pgrid: Loc, player: &Player, max_sight: i32) {
    let d = distance(grid, pgrid);
    if d > max_sight {
        return;
    }

    let close = if player.unlight && player.cur_light <= 0 {
        d < player.unlight_radius()
    } else {
        d < player.cur_light
    };

    let target = if c.is_wall(grid) {
        wall_view_target(c, grid, pgrid)
    } else {
        grid
    };

    if los(c, pgrid, target) {
        become_viewable(c, grid, pgrid, close);
    }
}

/// Settle one grid after the view has been rebuilt
fn update_one(
    c: &mut Chunk,
    known: &mut Chunk,
    grid: Loc,
    blind: bool,
    feeling_need: i32,
    events: &mut dyn EventSink,
) {
    if blind {
        c.info_off(grid, SquareFlags::SEEN);
    }

    let seen = c.is_seen(grid);
    let was_seen = c.is_was_seen(grid);

    if seen && !was_seen {
        if c.is_feel(grid) {
            c.feeling_squares += 1;
            c.info_off(grid, SquareFlags::FEEL);
            if c.feeling_squares == feeling_need {
                log::debug!("level feeling ready after {} squares", feeling_need);
                events.publish(GameEvent::FeelingReady);
            }
        }
        note_spot(c, known, grid);
        light_spot(events, grid);
    }

    if !seen && was_seen {
        light_spot(events, grid);
    }

    c.info_off(grid, SquareFlags::WASSEEN);
}

/// Recompute the player's view of a chunk
///
/// Runs in four passes: save and wipe the old view, recompute light levels,
/// mark everything in line of sight, then settle seen/unseen transitions
/// into the knowledge chunk and the event sink. With no player on the level
/// only the wipe and settle passes run.
pub fn update_view(
    c: &mut Chunk,
    known: &mut Chunk,
    player: &Player,
    config: &GenConfig,
    events: &mut dyn EventSink,
) {
    mark_wasseen(c);
    calc_lighting(c, player, config.max_sight);

    if let Some(pgrid) = player.grid.filter(|&g| c.in_bounds(g)) {
        c.info_on(pgrid, SquareFlags::VIEW);
        if c.light(pgrid) > 0 || c.is_glow(pgrid) || player.unlight {
            c.info_on(pgrid, SquareFlags::SEEN);
        }

        for grid in c.grids().collect::<Vec<_>>() {
            update_view_one(c, grid, pgrid, player, config.max_sight);
        }
    }

    for grid in c.grids().collect::<Vec<_>>() {
        update_one(c, known, grid, player.blind, config.feeling_need, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::FeatureTable;
    use crate::events::EventQueue;
    use std::sync::Arc;

    fn room(h: i32, w: i32) -> Chunk {
        let mut c = Chunk::new(h, w, Arc::new(FeatureTable::builtin().unwrap()));
        let (floor, granite) = (c.feats().floor, c.feats().granite);
        for g in c.grids().collect::<Vec<_>>() {
            let edge = g.y == 0 || g.x == 0 || g.y == h - 1 || g.x == w - 1;
            c.set_feat(g, if edge { granite } else { floor });
        }
        c
    }

    fn player_at(y: i32, x: i32, light: i32) -> Player {
        let mut p = Player::new();
        p.grid = Some(Loc::new(y, x));
        p.cur_light = light;
        p
    }

    fn run(c: &mut Chunk, p: &Player) -> (Chunk, EventQueue) {
        let mut known = c.new_known();
        let mut events = EventQueue::new();
        update_view(c, &mut known, p, &GenConfig::default(), &mut events);
        (known, events)
    }

    #[test]
    fn test_dark_room_without_light() {
        let mut c = room(11, 11);
        let p = player_at(5, 5, 0);
        run(&mut c, &p);
        assert!(c.grids().all(|g| c.is_view(g)));
        assert!(c.grids().all(|g| !c.is_seen(g)));
    }

    #[test]
    fn test_torch_radius() {
        let mut c = room(11, 11);
        let p = player_at(5, 5, 2);
        let (known, _) = run(&mut c, &p);
        assert!(c.is_seen(Loc::new(5, 5)));
        assert!(c.is_seen(Loc::new(5, 6)));
        assert!(c.is_seen(Loc::new(6, 6)));
        assert!(!c.is_seen(Loc::new(5, 7)));
        assert!(c.is_view(Loc::new(5, 7)));
        assert!(c.is_mark(Loc::new(5, 6)));
        assert_eq!(known.feat(Loc::new(5, 6)), c.feats().floor);
        assert!(known.is_not_known(Loc::new(5, 7)));
    }

    #[test]
    fn test_lit_room_walls_seen() {
        let mut c = room(11, 11);
        for y in 1..10 {
            for x in 1..10 {
                c.info_on(Loc::new(y, x), SquareFlags::GLOW);
            }
        }
        let p = player_at(5, 5, 0);
        run(&mut c, &p);
        assert!(c.grids().all(|g| c.is_view(g) && c.is_seen(g)));
        assert!(c.is_seen(Loc::new(0, 5)));
        assert!(c.is_seen(Loc::new(10, 10)));
        assert!(c.is_seen(Loc::new(1, 1)));
    }

    #[test]
    fn test_corridor_wall_uses_grid_in_front() {
        // #1#############
        // #............@#
        // ###############
        let mut c = room(3, 15);
        for g in c.grids().collect::<Vec<_>>() {
            c.info_on(g, SquareFlags::GLOW);
        }
        let p = player_at(1, 13, 1);
        run(&mut c, &p);
        assert!(c.is_view(Loc::new(0, 1)));
        assert!(c.is_seen(Loc::new(0, 1)));
    }

    #[test]
    fn test_double_wall_hides_far_side() {
        let mut c = room(7, 9);
        let granite = c.feats().granite;
        // Thick wall at x = 5,6 across the room
        for y in 1..6 {
            c.set_feat(Loc::new(y, 5), granite);
            c.set_feat(Loc::new(y, 6), granite);
        }
        for g in c.grids().collect::<Vec<_>>() {
            c.info_on(g, SquareFlags::GLOW);
        }
        let p = player_at(3, 2, 1);
        run(&mut c, &p);
        assert!(c.is_view(Loc::new(3, 5)));
        assert!(!c.is_view(Loc::new(3, 6)));
        assert!(!c.is_view(Loc::new(3, 7)));
    }

    #[test]
    fn test_blind_sees_nothing() {
        let mut c = room(11, 11);
        for g in c.grids().collect::<Vec<_>>() {
            c.info_on(g, SquareFlags::GLOW);
        }
        let mut p = player_at(5, 5, 2);
        p.blind = true;
        run(&mut c, &p);
        assert!(c.grids().all(|g| !c.is_seen(g)));
        assert!(c.is_view(Loc::new(5, 6)));
    }

    #[test]
    fn test_unlight_sees_close_grids() {
        let mut c = room(11, 11);
        let mut p = player_at(5, 5, 0);
        p.unlight = true;
        run(&mut c, &p);
        assert!(c.is_seen(Loc::new(5, 5)));
        assert!(c.is_seen(Loc::new(6, 6)));
        assert!(!c.is_seen(Loc::new(5, 7)));
    }

    #[test]
    fn test_feeling_squares() {
        let mut c = room(11, 11);
        for x in 2..5 {
            c.info_on(Loc::new(5, x), SquareFlags::FEEL);
        }
        for g in c.grids().collect::<Vec<_>>() {
            c.info_on(g, SquareFlags::GLOW);
        }
        let p = player_at(5, 5, 1);
        let mut known = c.new_known();
        let mut events = EventQueue::new();
        let config = GenConfig {
            feeling_need: 2,
            ..GenConfig::default()
        };
        update_view(&mut c, &mut known, &p, &config, &mut events);
        assert_eq!(c.feeling_squares, 3);
        assert!(c.grids().all(|g| !c.is_feel(g)));
        let ready = events.drain().filter(|e| *e == GameEvent::FeelingReady).count();
        assert_eq!(ready, 1);
    }

    #[test]
    fn test_transitions_publish_map_events() {
        let mut c = room(11, 11);
        let mut p = player_at(5, 5, 2);
        let mut known = c.new_known();
        let mut events = EventQueue::new();
        let config = GenConfig::default();

        update_view(&mut c, &mut known, &p, &config, &mut events);
        assert!(events.contains(GameEvent::Map(Loc::new(5, 6))));
        events.drain().for_each(drop);

        // Nothing changed
        update_view(&mut c, &mut known, &p, &config, &mut events);
        assert!(events.is_empty());
        assert!(c.grids().all(|g| !c.is_was_seen(g)));

        // Step west: the east side goes dark
        p.grid = Some(Loc::new(5, 4));
        c.place_player(Loc::new(5, 4)).unwrap();
        update_view(&mut c, &mut known, &p, &config, &mut events);
        assert!(events.contains(GameEvent::Map(Loc::new(5, 6))));
        assert!(!c.is_seen(Loc::new(5, 6)));
        // Still remembered
        assert!(c.is_mark(Loc::new(5, 6)));
    }
}
