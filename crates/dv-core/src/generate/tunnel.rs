//! Corridors, mineral veins and connectivity repair
//!
//! Tunnels are dug between room centres before any streamer is laid, since
//! they rely on the wall roles rooms leave behind: outer walls may be
//! pierced, solid walls may not.

use std::collections::VecDeque;

use log::trace;

use super::util::{correct_dir, find_nearby_grid, place_feat, place_random_door, rand_dir, set_marked_granite};
use super::GenerationContext;
use crate::consts::{DOOR_MAX, TUNN_MAX, WALL_MAX};
use crate::dungeon::{Chunk, FeatureId, Loc, SquareFlags, TerrainFlags, DDD, DDX, DDY, DDX_DDD, DDY_DDD};

/// Steps a single tunnel may take
const TUNNEL_STEPS: i32 = 2000;

/// Regions smaller than this are filled in
const MIN_REGION: u32 = 9;

fn is_granite_with(c: &Chunk, grid: Loc, flag: SquareFlags) -> bool {
    c.in_bounds(grid) && c.feat(grid) == c.feats().granite && c.info_has(grid, flag)
}

/// Dig a corridor from `from` towards `to`
///
/// Room outer walls are pierced (and the walls around a piercing turned
/// solid so no second corridor exits next to it), rooms are crossed,
/// granite is dug, and crossings of existing corridors are remembered as
/// junctions for doors. The tunnel may stop early once it has joined
/// another corridor far enough from its start.
pub fn build_tunnel(ctx: &mut GenerationContext<'_>, c: &mut Chunk, from: Loc, to: Loc) {
    let tun = ctx.profile.tun.clone();
    let mut cur = from;
    let mut door_flag = false;
    let mut steps = 0;

    ctx.tunn.clear();
    ctx.wall.clear();

    let (mut row_dir, mut col_dir) = correct_dir(ctx.rng, cur, to);

    while cur != to {
        steps += 1;
        if steps > TUNNEL_STEPS {
            break;
        }

        // Allow bends
        if ctx.rng.randint0(100) < tun.chg {
            (row_dir, col_dir) = correct_dir(ctx.rng, cur, to);
            if ctx.rng.randint0(100) < tun.rnd {
                (row_dir, col_dir) = rand_dir(ctx.rng);
            }
        }

        let mut next = cur.offset(row_dir, col_dir);
        while !c.in_bounds(next) {
            (row_dir, col_dir) = correct_dir(ctx.rng, cur, to);
            if ctx.rng.randint0(100) < tun.rnd {
                (row_dir, col_dir) = rand_dir(ctx.rng);
            }
            next = cur.offset(row_dir, col_dir);
        }

        // Avoid the edge of the level and solid walls
        if c.is_perm(next) || is_granite_with(c, next, SquareFlags::WALL_SOLID) {
            continue;
        }

        let flags = c.terrain().flags(c.feat(next));
        if is_granite_with(c, next, SquareFlags::WALL_OUTER) {
            // Pierce a room wall, if the grid beyond is not more wall
            let beyond = next.offset(row_dir, col_dir);
            if c.is_perm(beyond)
                || is_granite_with(c, beyond, SquareFlags::WALL_OUTER)
                || is_granite_with(c, beyond, SquareFlags::WALL_SOLID)
            {
                continue;
            }
            cur = next;
            if ctx.wall.len() < WALL_MAX {
                ctx.wall.push(cur);
            }

            // No other exit right next to this one
            for g in cur.adjacent() {
                if is_granite_with(c, g, SquareFlags::WALL_OUTER) {
                    set_marked_granite(c, g, SquareFlags::WALL_SOLID);
                }
            }
        } else if c.is_room(next) {
            // Cross rooms freely
            cur = next;
        } else if flags.intersects(TerrainFlags::GRANITE | TerrainFlags::PERMANENT) {
            // Dig
            cur = next;
            if ctx.tunn.len() < TUNN_MAX {
                ctx.tunn.push(cur);
            }
            door_flag = false;
        } else {
            // Crossing or running along another corridor
            cur = next;
            if !door_flag {
                if ctx.door.len() < DOOR_MAX {
                    ctx.door.push(cur);
                }
                door_flag = true;
            }

            // Maybe stop here if far enough from the start
            if ctx.rng.randint0(100) >= tun.con {
                let dy = (cur.y - from.y).abs();
                let dx = (cur.x - from.x).abs();
                if dy > 10 || dx > 10 {
                    break;
                }
            }
        }
    }

    let floor = c.feats().floor;
    for &grid in &ctx.tunn {
        place_feat(c, grid, floor);
    }
    for &grid in &ctx.wall {
        place_feat(c, grid, floor);
        if ctx.rng.randint0(100) < tun.pen {
            place_random_door(c, ctx.rng, grid);
        }
    }
    trace!(
        "Tunnel {from:?} -> {to:?}: {} dug, {} piercings, ended at {cur:?}",
        ctx.tunn.len(),
        ctx.wall.len()
    );
}

/// Orthogonal neighbours that are corridor floor (floor outside rooms)
pub fn next_to_corr(c: &Chunk, grid: Loc) -> usize {
    grid.orthogonal()
        .filter(|&g| c.is_floor(g) && !c.is_room(g))
        .count()
}

/// A doorway needs two corridor neighbours and strong walls on opposite sides
pub fn possible_doorway(c: &Chunk, grid: Loc) -> bool {
    if next_to_corr(c, grid) < 2 {
        return false;
    }
    let (n, s) = (grid.offset(-1, 0), grid.offset(1, 0));
    let (w, e) = (grid.offset(0, -1), grid.offset(0, 1));
    (c.is_strong_wall(n) && c.is_strong_wall(s)) || (c.is_strong_wall(w) && c.is_strong_wall(e))
}

/// Maybe put a door at a corridor junction
pub fn try_door(ctx: &mut GenerationContext<'_>, c: &mut Chunk, grid: Loc) {
    if !c.in_bounds(grid) || c.is_strong_wall(grid) || c.is_room(grid) {
        return;
    }
    if ctx.rng.randint0(100) < ctx.profile.tun.jct && possible_doorway(c, grid) {
        place_random_door(c, ctx.rng, grid);
    }
}

/// Lay a vein of `feat` across the level; one in `chance` vein grids holds
/// treasure
pub fn build_streamer(ctx: &mut GenerationContext<'_>, c: &mut Chunk, feat: FeatureId, chance: i32) {
    let den = ctx.profile.str.den;
    let d = ctx.profile.str.rng;

    let mut grid = Loc::new(
        ctx.rng.rand_spread(c.height / 2, 10),
        ctx.rng.rand_spread(c.width / 2, 15),
    );
    let dir = DDD[ctx.rng.randint0(8) as usize];

    loop {
        for _ in 0..den {
            let Some(spot) = find_nearby_grid(c, ctx.rng, grid, d, d) else {
                continue;
            };
            if !c.is_rock(spot) {
                continue;
            }
            place_feat(c, spot, feat);
            if ctx.rng.one_in(chance) {
                upgrade_mineral(c, spot);
            }
        }

        grid = grid.offset(DDY[dir], DDX[dir]);
        if !c.in_bounds(grid) {
            break;
        }
    }
}

/// Give a mineral vein visible treasure
pub fn upgrade_mineral(c: &mut Chunk, grid: Loc) {
    let feats = c.feats();
    let feat = if c.feat(grid) == feats.magma {
        feats.magma_k
    } else if c.feat(grid) == feats.quartz {
        feats.quartz_k
    } else {
        return;
    };
    place_feat(c, grid, feat);
}

/// Connected open areas of a chunk, numbered from 1
///
/// Passable grids, doors and vault grids count as open.
#[derive(Debug, Clone)]
pub struct Regions {
    width: i32,
    /// Region of each grid (0 for none)
    colors: Vec<u32>,
    /// Grids per region, indexed by region number
    counts: Vec<u32>,
}

impl Regions {
    /// Colour the open areas; `diagonal` also joins diagonal neighbours
    pub fn build(c: &Chunk, diagonal: bool) -> Self {
        let size = (c.height * c.width) as usize;
        let mut regions = Self {
            width: c.width,
            colors: vec![0; size],
            counts: vec![0],
        };
        let limit = if diagonal { 8 } else { 4 };
        let mut color = 0;

        for grid in c.grids() {
            if !regions.colourable(c, grid) {
                continue;
            }
            color += 1;
            regions.counts.push(0);

            let mut queue = VecDeque::from([grid]);
            regions.paint(grid, color);
            while let Some(g) = queue.pop_front() {
                for i in 0..limit {
                    let next = g.offset(DDY_DDD[i], DDX_DDD[i]);
                    if regions.colourable(c, next) {
                        regions.paint(next, color);
                        queue.push_back(next);
                    }
                }
            }
        }
        regions
    }

    fn index(&self, grid: Loc) -> usize {
        (grid.y * self.width + grid.x) as usize
    }

    fn colourable(&self, c: &Chunk, grid: Loc) -> bool {
        if !c.in_bounds(grid) || self.colors[self.index(grid)] != 0 {
            return false;
        }
        c.is_vault(grid) || c.is_passable(grid) || c.is_door(grid)
    }

    fn paint(&mut self, grid: Loc, color: u32) {
        let i = self.index(grid);
        self.colors[i] = color;
        self.counts[color as usize] += 1;
    }

    /// Region of a grid (0 for closed grids)
    pub fn color(&self, grid: Loc) -> u32 {
        self.colors.get(self.index(grid)).copied().unwrap_or(0)
    }

    /// Number of regions with any grids left
    pub fn count(&self) -> usize {
        self.counts.iter().filter(|&&n| n > 0).count()
    }

    /// Size of a region
    pub fn size(&self, color: u32) -> u32 {
        self.counts.get(color as usize).copied().unwrap_or(0)
    }

    /// Fill every region smaller than the minimum with solid granite
    ///
    /// Closed grids inside the border are turned into solid granite too.
    pub fn clear_small(&mut self, c: &mut Chunk) {
        let deleted: Vec<bool> = self.counts.iter().map(|&n| n < MIN_REGION).collect();
        for (i, n) in self.counts.iter_mut().enumerate() {
            if deleted[i] {
                *n = 0;
            }
        }
        for y in 1..c.height - 1 {
            for x in 1..c.width - 1 {
                let grid = Loc::new(y, x);
                let i = self.index(grid);
                if !deleted[self.colors[i] as usize] {
                    continue;
                }
                self.colors[i] = 0;
                set_marked_granite(c, grid, SquareFlags::WALL_SOLID);
            }
        }
    }

    /// Tunnel between regions until only one is left
    pub fn join_all(&mut self, c: &mut Chunk) {
        let mut num = self.count();
        while num > 1 {
            let Some(color) = self.counts.iter().position(|&n| n > 0) else {
                break;
            };
            self.join_region(c, color as u32);
            num -= 1;
        }
    }

    /// Dig the shortest orthogonal path from a region to any other
    fn join_region(&mut self, c: &mut Chunk, color: u32) {
        let size = self.colors.len();
        let mut previous: Vec<Option<usize>> = vec![None; size];
        let mut queue = VecDeque::new();

        for (i, &col) in self.colors.iter().enumerate() {
            if col == color {
                queue.push_back(i);
                previous[i] = Some(i);
            }
        }

        let floor = c.feats().floor;
        while let Some(n) = queue.pop_front() {
            let color2 = self.colors[n];
            if color2 != 0 && color2 != color {
                // Walk back along the path, digging
                let mut n = n;
                while self.colors[n] != color {
                    let grid = Loc::new(n as i32 / self.width, n as i32 % self.width);
                    self.colors[n] = color;
                    if !c.is_perm(grid) && !c.is_vault(grid) {
                        place_feat(c, grid, floor);
                    }
                    match previous[n] {
                        Some(p) => n = p,
                        None => break,
                    }
                }

                // Merge the two regions
                for col in self.colors.iter_mut() {
                    if *col == color2 {
                        *col = color;
                    }
                }
                let moved = self.counts[color2 as usize];
                self.counts[color as usize] += moved;
                self.counts[color2 as usize] = 0;
                return;
            }

            let here = Loc::new(n as i32 / self.width, n as i32 % self.width);
            for i in 0..4 {
                let next = here.offset(DDY_DDD[i], DDX_DDD[i]);
                if !c.in_bounds(next) || c.is_perm(next) {
                    continue;
                }
                let n2 = self.index(next);
                if previous[n2].is_some() {
                    continue;
                }
                previous[n2] = Some(n);
                queue.push_back(n2);
            }
        }
    }
}

/// Join every open area of the level into one
pub fn ensure_connectedness(c: &mut Chunk) {
    let mut regions = Regions::build(c, true);
    regions.join_all(c);
}
