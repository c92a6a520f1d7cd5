//! Line of sight

use crate::dungeon::{Chunk, Loc};

/// Can an unobstructed line be traced between the centres of two grids?
///
/// Only the grids strictly between the endpoints are tested. Knight's-move
/// offsets get a shortcut through the adjacent orthogonal grid, which makes
/// the result depend on direction for those offsets only.
pub fn los(c: &Chunk, from: Loc, to: Loc) -> bool {
    let (y1, x1, y2, x2) = (from.y, from.x, to.y, to.x);
    let dy = y2 - y1;
    let dx = x2 - x1;
    let ay = dy.abs();
    let ax = dx.abs();

    // Adjacent or identical
    if ax < 2 && ay < 2 {
        return true;
    }

    let open = |y: i32, x: i32| c.is_projectable(Loc::new(y, x));

    // Straight north/south
    if dx == 0 {
        let sy = dy.signum();
        let mut ty = y1 + sy;
        while ty != y2 {
            if !open(ty, x1) {
                return false;
            }
            ty += sy;
        }
        return true;
    }

    // Straight east/west
    if dy == 0 {
        let sx = dx.signum();
        let mut tx = x1 + sx;
        while tx != x2 {
            if !open(y1, tx) {
                return false;
            }
            tx += sx;
        }
        return true;
    }

    let sx = if dx < 0 { -1 } else { 1 };
    let sy = if dy < 0 { -1 } else { 1 };

    // Knight's moves
    if ax == 1 && ay == 2 && open(y1 + sy, x1) {
        return true;
    } else if ay == 1 && ax == 2 && open(y1, x1 + sx) {
        return true;
    }

    // Scale factors
    let f2 = ax * ay;
    let f1 = f2 << 1;

    if ax >= ay {
        // Travel horizontally, q tracks the vertical fraction
        let mut qy = ay * ay;
        let m = qy << 1;
        let mut tx = x1 + sx;
        let mut ty = if qy == f2 {
            qy -= f1;
            y1 + sy
        } else {
            y1
        };

        while x2 != tx {
            if !open(ty, tx) {
                return false;
            }
            qy += m;
            if qy < f2 {
                tx += sx;
            } else if qy > f2 {
                ty += sy;
                if !open(ty, tx) {
                    return false;
                }
                qy -= f1;
                tx += sx;
            } else {
                // Exactly through a corner
                ty += sy;
                qy -= f1;
                tx += sx;
            }
        }
    } else {
        // Travel vertically
        let mut qx = ax * ax;
        let m = qx << 1;
        let mut ty = y1 + sy;
        let mut tx = if qx == f2 {
            qx -= f1;
            x1 + sx
        } else {
            x1
        };

        while y2 != ty {
            if !open(ty, tx) {
                return false;
            }
            qx += m;
            if qx < f2 {
                ty += sy;
            } else if qx > f2 {
                tx += sx;
                if !open(ty, tx) {
                    return false;
                }
                qx -= f1;
                ty += sy;
            } else {
                tx += sx;
                qx -= f1;
                ty += sy;
            }
        }
    }

    true
}

/// True for the offsets whose line of sight is direction dependent
pub fn is_knight_move(from: Loc, to: Loc) -> bool {
    let ay = (to.y - from.y).abs();
    let ax = (to.x - from.x).abs();
    (ax == 1 && ay == 2) || (ax == 2 && ay == 1)
}
