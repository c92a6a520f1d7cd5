//! Starburst rooms
//!
//! An organic room shape. The circle around the room centre is cut into
//! arcs, each arc gets a reach that stays close to its neighbours', and
//! every grid within the reach of the arc it falls in is changed. Long thin
//! requests are split into two overlapping starbursts.
//!
//! Vault grids and grids holding monsters or objects are left alone, so a
//! starburst can be laid over an area that already has content.

use std::sync::LazyLock;

use log::trace;

use super::util::{fill_rectangle, place_feat};
use crate::consts::STARBURST_MAX_DEPTH;
use crate::dungeon::{distance, Chunk, FeatureId, Loc, Rect, SquareFlags};
use crate::rng::GameRng;

/// Most arcs a starburst is cut into
const MAX_ARCS: usize = 45;

/// Angle from the centre of a 41x41 grid to each of its grids
///
/// Angles run from 0 to 179, two degrees per step, counter-clockwise from
/// due east; north is 45.
static ANGLE_TO_GRID: LazyLock<[[u8; 41]; 41]> = LazyLock::new(|| {
    let mut table = [[0u8; 41]; 41];
    for (ny, row) in table.iter_mut().enumerate() {
        for (nx, cell) in row.iter_mut().enumerate() {
            let dy = ny as f64 - 20.0;
            let dx = nx as f64 - 20.0;
            if dy == 0.0 && dx == 0.0 {
                continue;
            }
            let mut deg = (-dy).atan2(dx).to_degrees();
            if deg < 0.0 {
                deg += 360.0;
            }
            *cell = ((deg / 2.0).round() as u8) % 180;
        }
    }
    table
});

/// Angle from `(20, 20)` to `(ny, nx)` in the lookup table
pub fn angle_to_grid(ny: usize, nx: usize) -> Option<u8> {
    ANGLE_TO_GRID.get(ny).and_then(|row| row.get(nx)).copied()
}

/// Make a starburst room of `feat` inside `r`
///
/// Only grids strictly inside `r` change terrain; the post-pass that marks
/// room walls reaches the edge of `r` and no further. Fails if `r` is off
/// the chunk or too small.
pub fn generate_starburst_room(
    c: &mut Chunk,
    rng: &mut GameRng,
    r: Rect,
    light: bool,
    feat: FeatureId,
    special_ok: bool,
) -> bool {
    starburst(c, rng, r, light, feat, special_ok, 0)
}

fn starburst(
    c: &mut Chunk,
    rng: &mut GameRng,
    r: Rect,
    light: bool,
    feat: FeatureId,
    special_ok: bool,
    depth: u32,
) -> bool {
    let Rect { y1, x1, y2, x2 } = r;

    if !c.in_bounds(Loc::new(y1, x1)) || !c.in_bounds(Loc::new(y2, x2)) {
        return false;
    }
    if y1 + 2 >= y2 || x1 + 2 >= x2 {
        return false;
    }

    let terrain = c.terrain_arc();
    let is_floor = terrain.is_floor(feat);
    let is_passable = terrain.is_passable(feat);
    let is_smooth = terrain.is_smooth(feat);

    let height = 1 + y2 - y1;
    let width = 1 + x2 - x1;

    // Long, narrow rooms are split
    if height > 5 * width / 2 || width > 5 * height / 2 {
        let inner = Rect::new(y1 + 1, x1 + 1, y2 - 1, x2 - 1);
        if depth >= STARBURST_MAX_DEPTH {
            fill_rectangle(c, inner, feat, SquareFlags::empty());
            return true;
        }

        let (mut ay, mut ax) = (y2, x2);
        if height > width {
            ay = y1 + 2 * height / 3;
        } else {
            ax = x1 + 2 * width / 3;
        }
        starburst(c, rng, Rect::new(y1, x1, ay, ax), light, feat, false, depth + 1);

        let (mut by, mut bx) = (y1, x1);
        if height > width {
            by = y1 + height / 3;
        } else {
            bx = x1 + width / 3;
        }
        starburst(c, rng, Rect::new(by, bx, y2, x2), light, feat, false, depth + 1);

        if is_floor {
            // Corridor between the two centres
            for y in (y1 + ay) / 2..=(by + y2) / 2 {
                for x in (x1 + ax) / 2..=(bx + x2) / 2 {
                    place_feat(c, Loc::new(y, x), feat);
                }
            }
        } else {
            // Cover the overlap of the two halves
            let middle = if height > width {
                Rect::new(by, x1, ay, x2)
            } else {
                Rect::new(y1, bx, y2, ax)
            };
            starburst(c, rng, middle, light, feat, false, depth + 1);
        }
        return true;
    }

    // The angle table only reaches 20 grids; scale bigger rooms down
    let dist_conv = if width > 44 || height > 44 {
        10 * width.max(height) / 44
    } else {
        10
    };

    let cloverleaf = special_ok && height > 10 && rng.randint0(20) == 0;
    let arc_num = if cloverleaf {
        12
    } else {
        let n = 8 + height * width / 80;
        (n + 3 - rng.randint0(7)).clamp(8, MAX_ARCS as i32)
    };

    let y0 = y1 + height / 2;
    let x0 = x1 + width / 2;

    // Start angle and reach of every arc
    let mut arc = [[0i32; 2]; MAX_ARCS];
    let mut degree_first = 0;
    let n = arc_num as usize;
    for i in 0..n {
        let k = i as i32;
        arc[i][0] = degree_first;

        degree_first += (180 + rng.randint0(arc_num)) / arc_num;
        degree_first = degree_first
            .max(180 * (k + 1) / arc_num)
            .min((180 + arc_num) * (k + 1) / arc_num);

        let centre_of_arc = degree_first + arc[i][0];
        if (centre_of_arc > 45 && centre_of_arc < 135) || (centre_of_arc > 225 && centre_of_arc < 315) {
            arc[i][1] = height / 4 + rng.randint0((height + 3) / 4);
        } else if (centre_of_arc < 45 || centre_of_arc > 315) || (centre_of_arc < 225 && centre_of_arc > 135) {
            arc[i][1] = width / 4 + rng.randint0((width + 3) / 4);
        } else if i != 0 {
            arc[i][1] = if cloverleaf { 0 } else { arc[i - 1][1] + 3 - rng.randint0(7) };
        }

        // Keep neighbouring arcs close
        if !cloverleaf && i != 0 && i != n - 1 {
            let prev = arc[i - 1][1];
            if is_smooth {
                arc[i][1] = arc[i][1].clamp(prev - 2, prev + 2);
            } else {
                if arc[i][1] > 3 * (prev + 1) / 2 {
                    arc[i][1] = 3 * (prev + 1) / 2;
                }
                if arc[i][1] < 2 * (prev - 1) / 3 {
                    arc[i][1] = 2 * (prev - 1) / 3;
                }
            }
        }

        // Bring the last arc towards the first
        if i == n - 1 && (arc[i][1] - arc[0][1]).abs() > 3 {
            if arc[i][1] > arc[0][1] {
                arc[i][1] -= rng.randint0(arc[i][1] - arc[0][1]);
            } else {
                arc[i][1] += rng.randint0(arc[0][1] - arc[i][1]);
            }
        }
    }

    let dist_check = 21 * dist_conv / 10;
    let centre = Loc::new(y0, x0);

    for y in y1 + 1..y2 {
        for x in x1 + 1..x2 {
            let grid = Loc::new(y, x);
            if c.is_vault(grid) || c.is_occupied(grid) || c.has_objects(grid) {
                continue;
            }

            let dist = distance(centre, grid);
            if dist >= dist_check {
                continue;
            }

            let ny = 20 + 10 * (y - y0) / dist_conv;
            let nx = 20 + 10 * (x - x0) / dist_conv;
            if !(0..=40).contains(&ny) || !(0..=40).contains(&nx) {
                continue;
            }
            let Some(degree) = angle_to_grid(ny as usize, nx as usize) else {
                continue;
            };
            let degree = i32::from(degree);

            // Last arc starting at or before this angle
            let Some(i) = (0..n).rev().find(|&i| arc[i][0] <= degree) else {
                continue;
            };
            let max_dist = arc[i][1];
            if max_dist < dist {
                continue;
            }

            if is_floor || !is_passable {
                place_feat(c, grid, feat);
                if is_floor {
                    c.info_on(grid, SquareFlags::ROOM);
                } else {
                    c.info_off(grid, SquareFlags::ROOM);
                }
                if light {
                    c.info_on(grid, SquareFlags::GLOW);
                } else {
                    c.info_off(grid, SquareFlags::GLOW);
                }
            } else {
                // Passable non-floor only goes over floor, thicker in the middle
                let over_floor = c.is_floor(grid);
                if is_smooth {
                    if over_floor {
                        place_feat(c, grid, feat);
                    }
                } else if over_floor && rng.randint1(max_dist + 5) >= dist + 5 {
                    place_feat(c, grid, feat);
                }
                if light {
                    c.info_on(grid, SquareFlags::GLOW);
                }
            }
        }
    }

    // Granite next to the new floor becomes room wall
    let granite = c.feats().granite;
    if is_floor || feat == granite {
        for y in y1 + 1..y2 {
            for x in x1 + 1..x2 {
                let grid = Loc::new(y, x);
                if !c.is_floor(grid) {
                    continue;
                }
                for g in grid.adjacent() {
                    c.info_on(g, SquareFlags::ROOM);
                    if light {
                        c.info_on(g, SquareFlags::GLOW);
                    }
                    if c.feat(g) == granite {
                        c.info_on(g, SquareFlags::WALL_OUTER);
                    }
                }
            }
        }
    }

    trace!("Starburst in {r:?}: {arc_num} arcs{}", if cloverleaf { " (cloverleaf)" } else { "" });
    true
}
