//! Grid coordinates, directions and distance

use serde::{Deserialize, Serialize};

/// A grid location, row first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Loc {
    pub y: i32,
    pub x: i32,
}

impl Loc {
    pub const fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    /// Offset by a direction vector
    pub const fn offset(self, dy: i32, dx: i32) -> Self {
        Self {
            y: self.y + dy,
            x: self.x + dx,
        }
    }

    /// Step one grid in a keypad direction (see [`DDY`]/[`DDX`])
    pub const fn step(self, dir: usize) -> Self {
        self.offset(DDY[dir], DDX[dir])
    }

    /// The 8 surrounding grids, in [`DDD`] order
    pub fn adjacent(self) -> impl Iterator<Item = Loc> {
        DDD[..8].iter().map(move |&d| self.step(d))
    }

    /// The 4 orthogonal neighbours
    pub fn orthogonal(self) -> impl Iterator<Item = Loc> {
        DDD[..4].iter().map(move |&d| self.step(d))
    }
}

impl From<(i32, i32)> for Loc {
    fn from((y, x): (i32, i32)) -> Self {
        Self { y, x }
    }
}

/// Keypad direction offsets, indexed by keypad digit
pub const DDX: [i32; 10] = [0, -1, 0, 1, -1, 0, 1, -1, 0, 1];
pub const DDY: [i32; 10] = [0, 1, 1, 1, 0, 0, 0, -1, -1, -1];

/// The 8 real directions, orthogonal first
pub const DDD: [usize; 9] = [2, 8, 6, 4, 3, 1, 9, 7, 5];

/// Same offsets indexed by [`DDD`] position
pub const DDX_DDD: [i32; 9] = [0, 0, 1, -1, 1, -1, 1, -1, 0];
pub const DDY_DDD: [i32; 9] = [1, -1, 0, 0, 1, 1, -1, -1, 0];

/// Octagonal distance approximation: the longer leg plus half the shorter
///
/// Game ranges depend on this exact value, not on true distance.
pub const fn distance(a: Loc, b: Loc) -> i32 {
    let ay = (a.y - b.y).abs();
    let ax = (a.x - b.x).abs();
    if ay > ax { ay + (ax >> 1) } else { ax + (ay >> 1) }
}

/// A rectangle given by inclusive corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub y1: i32,
    pub x1: i32,
    pub y2: i32,
    pub x2: i32,
}

impl Rect {
    pub const fn new(y1: i32, x1: i32, y2: i32, x2: i32) -> Self {
        Self { y1, x1, y2, x2 }
    }

    pub const fn contains(&self, grid: Loc) -> bool {
        grid.y >= self.y1 && grid.y <= self.y2 && grid.x >= self.x1 && grid.x <= self.x2
    }

    pub const fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    pub const fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    /// Every grid in the rectangle, row by row
    pub fn grids(self) -> impl Iterator<Item = Loc> {
        (self.y1..=self.y2).flat_map(move |y| (self.x1..=self.x2).map(move |x| Loc::new(y, x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_values() {
        let o = Loc::new(0, 0);
        assert_eq!(distance(o, Loc::new(0, 5)), 5);
        assert_eq!(distance(o, Loc::new(5, 5)), 7);
        assert_eq!(distance(o, Loc::new(3, 0)), 3);
        assert_eq!(distance(o, Loc::new(1, 1)), 1);
        assert_eq!(distance(Loc::new(10, 4), Loc::new(7, 12)), 9);
    }

    #[test]
    fn test_direction_tables_agree() {
        for (i, &d) in DDD.iter().enumerate() {
            assert_eq!(DDX[d], DDX_DDD[i]);
            assert_eq!(DDY[d], DDY_DDD[i]);
        }
        let adj: Vec<Loc> = Loc::new(5, 5).adjacent().collect();
        assert_eq!(adj.len(), 8);
        assert!(!adj.contains(&Loc::new(5, 5)));
        assert_eq!(Loc::new(5, 5).step(DDD[8]), Loc::new(5, 5));
    }

    #[test]
    fn test_rect_grids() {
        let r = Rect::new(1, 2, 3, 4);
        assert_eq!(r.grids().count(), 9);
        assert!(r.contains(Loc::new(2, 3)));
        assert!(!r.contains(Loc::new(0, 3)));
        assert_eq!(r.height(), 3);
        assert_eq!(r.width(), 3);
    }
}
