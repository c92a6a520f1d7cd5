//! Light levels and room lighting

use super::knowledge::{forget, light_spot, memorize};
use super::los::los;
use super::point_set::PointSet;
use crate::dungeon::{distance, Chunk, Loc, SquareFlags};
use crate::events::EventSink;
use crate::player::Player;
use crate::rng::GameRng;

/// Add a light source's contribution around `centre`
///
/// Positive sources fade with distance, negative ones (darkness) weaken the
/// same way. `accept` filters the grids that can be affected.
fn add_light_source<F>(c: &mut Chunk, centre: Loc, light: i32, mut accept: F)
where
    F: FnMut(&Chunk, Loc) -> bool,
{
    let radius = light.abs() - 1;
    if radius < 0 {
        return;
    }
    for y in -radius..=radius {
        for x in -radius..=radius {
            let grid = centre.offset(y, x);
            if !c.in_bounds(grid) {
                continue;
            }
            let dist = distance(centre, grid);
            if dist > radius || !accept(c, grid) {
                continue;
            }
            let amount = if light > 0 { light - dist } else { light + dist };
            c.add_light(grid, amount);
        }
    }
}

/// Recompute the light level of every grid from scratch
///
/// Glowing grids start at 1; bright terrain adds 2 to itself and 1 to each
/// neighbour; then the player's light and every monster light are added.
/// Monster light only reaches grids within `max_sight` of the player and in
/// the monster's line of sight.
pub fn calc_lighting(c: &mut Chunk, player: &Player, max_sight: i32) {
    let grids: Vec<Loc> = c.grids().collect();
    for &grid in &grids {
        let base = i32::from(c.is_glow(grid));
        c.set_light(grid, base);
    }

    for &grid in &grids {
        if !c.is_bright(grid) {
            continue;
        }
        c.add_light(grid, 2);
        for adj in grid.adjacent() {
            if c.in_bounds(adj) {
                c.add_light(adj, 1);
            }
        }
    }

    let Some(pgrid) = player.grid else {
        return;
    };

    add_light_source(c, pgrid, player.cur_light, |_, _| true);

    let lights: Vec<(Loc, i32)> = c
        .monsters()
        .filter(|(_, m)| m.light != 0)
        .map(|(_, m)| (m.grid, m.light))
        .collect();
    for (mgrid, light) in lights {
        add_light_source(c, mgrid, light, |c, grid| {
            distance(pgrid, grid) <= max_sight && los(c, mgrid, grid)
        });
    }
}

fn room_aux(c: &Chunk, seen: &mut PointSet, grid: Loc) {
    if seen.contains(grid) || !c.in_bounds(grid) || !c.is_room(grid) {
        return;
    }
    seen.add(grid);
}

/// Collect the room containing `grid`; walls are included but stop the fill
pub fn room_grids(c: &Chunk, grid: Loc) -> PointSet {
    let mut ps = PointSet::new(c.height, c.width, 200);
    room_aux(c, &mut ps, grid);

    let mut i = 0;
    while let Some(g) = ps.get(i) {
        i += 1;
        if !c.is_projectable(g) {
            continue;
        }
        for adj in g.adjacent() {
            room_aux(c, &mut ps, adj);
        }
    }
    ps
}

/// Light or darken the room containing `grid`
///
/// Lighting may wake sleeping monsters in the room. Darkening forgets plain
/// floor (unless the player sees in the dark) but keeps other memories.
/// Callers should recompute the view afterwards.
pub fn light_room(
    c: &mut Chunk,
    known: &mut Chunk,
    player: &Player,
    grid: Loc,
    light: bool,
    rng: &mut GameRng,
    events: &mut dyn EventSink,
) {
    let ps = room_grids(c, grid);
    log::trace!(
        "{} room at {:?} ({} grids)",
        if light { "lighting" } else { "darkening" },
        grid,
        ps.len()
    );

    if light {
        for g in ps.iter() {
            c.info_on(g, SquareFlags::GLOW);
        }
        for g in ps.iter() {
            light_spot(events, g);
            if let Some(handle) = c.monster_at(g) {
                if let Some(mon) = c.monster_mut(handle) {
                    if mon.is_asleep() && rng.randint0(100) < 25 {
                        mon.wake();
                    }
                }
            }
        }
    } else {
        for g in ps.iter() {
            if !c.is_bright(g) {
                c.info_off(g, SquareFlags::GLOW);
            }
            if player.unlight {
                memorize(c, known, g);
            }
            if c.is_floor(g) {
                forget(c, known, g);
            }
        }
        for g in ps.iter() {
            light_spot(events, g);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::FeatureTable;
    use crate::monster::{Monster, RaceId};
    use std::sync::Arc;

    fn dark_room() -> Chunk {
        let mut c = Chunk::new(11, 11, Arc::new(FeatureTable::builtin().unwrap()));
        let (floor, granite) = (c.feats().floor, c.feats().granite);
        for g in c.grids().collect::<Vec<_>>() {
            let edge = g.y == 0 || g.x == 0 || g.y == 10 || g.x == 10;
            c.set_feat(g, if edge { granite } else { floor });
        }
        c
    }

    #[test]
    fn test_player_light_falloff() {
        let mut c = dark_room();
        let mut p = Player::new();
        p.grid = Some(Loc::new(5, 5));
        p.cur_light = 3;
        calc_lighting(&mut c, &p, 20);
        assert_eq!(c.light(Loc::new(5, 5)), 3);
        assert_eq!(c.light(Loc::new(5, 6)), 2);
        assert_eq!(c.light(Loc::new(5, 7)), 1);
        assert_eq!(c.light(Loc::new(5, 8)), 0);
        assert_eq!(c.light(Loc::new(7, 7)), 0);
    }

    #[test]
    fn test_glow_and_bright() {
        let mut c = dark_room();
        let lava = c.feats().lava;
        c.info_on(Loc::new(2, 2), SquareFlags::GLOW);
        c.set_feat(Loc::new(8, 8), lava);
        let mut p = Player::new();
        p.cur_light = 0;
        p.grid = Some(Loc::new(5, 5));
        calc_lighting(&mut c, &p, 20);
        assert_eq!(c.light(Loc::new(2, 2)), 1);
        // Lava glows (1) and is bright (+2)
        assert_eq!(c.light(Loc::new(8, 8)), 3);
        assert_eq!(c.light(Loc::new(7, 7)), 1);
        assert_eq!(c.light(Loc::new(6, 6)), 0);
    }

    #[test]
    fn test_monster_darkness() {
        let mut c = dark_room();
        for g in c.grids().collect::<Vec<_>>() {
            c.info_on(g, SquareFlags::GLOW);
        }
        let m_grid = Loc::new(5, 8);
        let mut shadow = Monster::new(RaceId(0), m_grid);
        shadow.light = -2;
        c.place_monster(m_grid, shadow).unwrap();
        let mut p = Player::new();
        p.cur_light = 0;
        p.grid = Some(Loc::new(5, 2));
        calc_lighting(&mut c, &p, 20);
        assert_eq!(c.light(m_grid), -1);
        assert_eq!(c.light(Loc::new(5, 7)), 0);
        assert_eq!(c.light(Loc::new(5, 6)), 1);
    }

    #[test]
    fn test_monster_light_limited_by_sight() {
        let mut c = dark_room();
        let m_grid = Loc::new(5, 8);
        let mut m = Monster::new(RaceId(0), m_grid);
        m.light = 2;
        c.place_monster(m_grid, m).unwrap();
        let mut p = Player::new();
        p.cur_light = 0;
        p.grid = Some(Loc::new(5, 2));
        calc_lighting(&mut c, &p, 20);
        assert_eq!(c.light(m_grid), 2);
        assert_eq!(c.light(Loc::new(5, 9)), 1);

        calc_lighting(&mut c, &p, 5);
        assert_eq!(c.light(m_grid), 0);
        assert_eq!(c.light(Loc::new(5, 7)), 1);
    }

    #[test]
    fn test_room_grids_stop_at_walls() {
        let mut c = dark_room();
        for g in c.grids().collect::<Vec<_>>() {
            c.info_on(g, SquareFlags::ROOM);
        }
        let granite = c.feats().granite;
        // Split the room with a wall at x = 5
        for y in 0..11 {
            c.set_feat(Loc::new(y, 5), granite);
        }
        let ps = room_grids(&c, Loc::new(3, 2));
        assert!(ps.contains(Loc::new(3, 4)));
        assert!(ps.contains(Loc::new(3, 5)));
        assert!(!ps.contains(Loc::new(3, 6)));
    }
}
