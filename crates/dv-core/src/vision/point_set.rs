//! Growable grid set for flood fills

use crate::dungeon::Loc;

/// Grids in insertion order with constant-time membership
#[derive(Debug, Clone)]
pub struct PointSet {
    pts: Vec<Loc>,
    width: i32,
    member: Vec<bool>,
}

impl PointSet {
    /// A set able to hold grids of a `height` x `width` chunk
    pub fn new(height: i32, width: i32, initial_size: usize) -> Self {
        Self {
            pts: Vec::with_capacity(initial_size),
            width: width.max(0),
            member: vec![false; (height.max(0) * width.max(0)) as usize],
        }
    }

    fn index(&self, grid: Loc) -> Option<usize> {
        if grid.y < 0 || grid.x < 0 || grid.x >= self.width {
            return None;
        }
        let i = (grid.y * self.width + grid.x) as usize;
        (i < self.member.len()).then_some(i)
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    pub fn contains(&self, grid: Loc) -> bool {
        self.index(grid).is_some_and(|i| self.member[i])
    }

    /// Add a grid; returns false if it was already present or off the map
    pub fn add(&mut self, grid: Loc) -> bool {
        match self.index(grid) {
            Some(i) if !self.member[i] => {
                self.member[i] = true;
                self.pts.push(grid);
                true
            }
            _ => false,
        }
    }

    pub fn get(&self, i: usize) -> Option<Loc> {
        self.pts.get(i).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Loc> + '_ {
        self.pts.iter().copied()
    }

    pub fn as_slice(&self) -> &[Loc] {
        &self.pts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_contains() {
        let mut ps = PointSet::new(4, 4, 2);
        assert!(ps.add(Loc::new(1, 1)));
        assert!(!ps.add(Loc::new(1, 1)));
        assert!(ps.add(Loc::new(3, 3)));
        assert!(!ps.add(Loc::new(4, 0)));
        assert!(!ps.add(Loc::new(0, -1)));
        assert!(ps.contains(Loc::new(3, 3)));
        assert!(!ps.contains(Loc::new(2, 2)));
        assert_eq!(ps.as_slice(), &[Loc::new(1, 1), Loc::new(3, 3)]);
    }
}
