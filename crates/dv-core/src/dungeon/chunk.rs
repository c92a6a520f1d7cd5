//! Level structure
//!
//! A [`Chunk`] owns its squares and its monster and object arenas. Terrain
//! definitions are shared with every other chunk through the feature table.
//! Occupancy is only ever changed through the mutators here, which keep the
//! square and the arena entry in step.

use std::sync::Arc;

use super::{
    Arena, FeatureId, FeatureTable, Feats, Heatmap, Loc, Occupant, PileEnd, Square, SquareFlags,
    Trap,
};
use crate::monster::{Monster, MonsterHandle};
use crate::object::{Object, ObjectHandle};
use crate::world::errors::{DungeonError, Result};

/// One dungeon level (or the player's memory of one)
#[derive(Debug, Clone)]
pub struct Chunk {
    pub name: String,
    /// Game turn the chunk was created on
    pub turn: u64,
    pub depth: i32,
    pub height: i32,
    pub width: i32,

    /// Danger ratings accumulated during generation
    pub obj_rating: u32,
    pub mon_rating: u32,
    pub good_item: bool,

    /// Level feeling (object feeling * 10 + monster feeling)
    pub feeling: u16,
    /// FEEL squares the player has walked over
    pub feeling_squares: i32,

    /// Monster flow maps
    pub noise: Heatmap,
    pub scent: Heatmap,

    terrain: Arc<FeatureTable>,
    squares: Vec<Square>,
    monsters: Arena<Monster>,
    objects: Arena<Object>,
    feat_count: Vec<u32>,
    player_grid: Option<Loc>,
}

impl Chunk {
    /// Create a chunk of unknown grids
    pub fn new(height: i32, width: i32, terrain: Arc<FeatureTable>) -> Self {
        let height = height.max(1);
        let width = width.max(1);
        let none = terrain.feats.none;
        let area = (height * width) as usize;
        let squares = vec![
            Square {
                feat: none,
                ..Square::default()
            };
            area
        ];
        let mut feat_count = vec![0; terrain.len()];
        if let Some(c) = feat_count.get_mut(none.index()) {
            *c = area as u32;
        }

        Self {
            name: String::new(),
            turn: 0,
            depth: 0,
            height,
            width,
            obj_rating: 0,
            mon_rating: 0,
            good_item: false,
            feeling: 0,
            feeling_squares: 0,
            noise: Heatmap::new(height, width),
            scent: Heatmap::new(height, width),
            terrain,
            squares,
            monsters: Arena::new(),
            objects: Arena::new(),
            feat_count,
            player_grid: None,
        }
    }

    /// A blank chunk with the same dimensions and terrain table, used as the
    /// player's memory of this level
    pub fn new_known(&self) -> Self {
        let mut known = Chunk::new(self.height, self.width, Arc::clone(&self.terrain));
        known.name = self.name.clone();
        known.depth = self.depth;
        known
    }

    /// The terrain table
    pub fn terrain(&self) -> &FeatureTable {
        &self.terrain
    }

    pub fn terrain_arc(&self) -> Arc<FeatureTable> {
        Arc::clone(&self.terrain)
    }

    /// Well-known terrain ids
    pub fn feats(&self) -> &Feats {
        &self.terrain.feats
    }

    pub fn in_bounds(&self, grid: Loc) -> bool {
        grid.x >= 0 && grid.x < self.width && grid.y >= 0 && grid.y < self.height
    }

    /// In bounds and not on the outer edge
    pub fn in_bounds_fully(&self, grid: Loc) -> bool {
        grid.x > 0 && grid.x < self.width - 1 && grid.y > 0 && grid.y < self.height - 1
    }

    fn index(&self, grid: Loc) -> usize {
        assert!(
            self.in_bounds(grid),
            "grid {:?} outside {}x{} chunk",
            grid,
            self.height,
            self.width
        );
        (grid.y * self.width + grid.x) as usize
    }

    fn check(&self, grid: Loc) -> Result<usize> {
        if self.in_bounds(grid) {
            Ok((grid.y * self.width + grid.x) as usize)
        } else {
            Err(DungeonError::OutOfBounds {
                y: grid.y,
                x: grid.x,
                height: self.height,
                width: self.width,
            })
        }
    }

    /// Checked square access
    pub fn square(&self, grid: Loc) -> Result<&Square> {
        let i = self.check(grid)?;
        Ok(&self.squares[i])
    }

    pub(crate) fn get(&self, grid: Loc) -> Option<&Square> {
        if self.in_bounds(grid) {
            Some(&self.squares[(grid.y * self.width + grid.x) as usize])
        } else {
            None
        }
    }

    pub(crate) fn sq_mut(&mut self, grid: Loc) -> &mut Square {
        let i = self.index(grid);
        &mut self.squares[i]
    }

    /// All squares in row-major order
    pub fn squares(&self) -> &[Square] {
        &self.squares
    }

    /// Every grid of the chunk, row by row
    pub fn grids(&self) -> impl Iterator<Item = Loc> + use<> {
        let (h, w) = (self.height, self.width);
        (0..h).flat_map(move |y| (0..w).map(move |x| Loc::new(y, x)))
    }

    // Terrain

    /// Terrain at a grid; out-of-bounds grids read as unknown
    pub fn feat(&self, grid: Loc) -> FeatureId {
        self.get(grid).map_or(self.terrain.feats.none, |s| s.feat)
    }

    /// Change terrain, keeping feature counts in step. Bright terrain glows.
    ///
    /// Panics off the map, like slice indexing; see [`Chunk::try_set_feat`].
    pub fn set_feat(&mut self, grid: Loc, feat: FeatureId) {
        assert!(self.terrain.is_valid(feat), "invalid feature id {:?}", feat);
        let bright = self.terrain.is_bright(feat);
        let sq = self.sq_mut(grid);
        let old = sq.feat;
        sq.feat = feat;
        if bright {
            sq.info.insert(SquareFlags::GLOW);
        }
        if let Some(c) = self.feat_count.get_mut(old.index()) {
            *c = c.saturating_sub(1);
        }
        if let Some(c) = self.feat_count.get_mut(feat.index()) {
            *c += 1;
        }
    }

    /// Checked terrain change
    pub fn try_set_feat(&mut self, grid: Loc, feat: FeatureId) -> Result<()> {
        self.check(grid)?;
        if !self.terrain.is_valid(feat) {
            return Err(DungeonError::Data(format!("invalid feature id {}", feat.0)));
        }
        self.set_feat(grid, feat);
        Ok(())
    }

    /// Number of squares with this terrain
    pub fn feat_count(&self, feat: FeatureId) -> u32 {
        self.feat_count.get(feat.index()).copied().unwrap_or(0)
    }

    // Flags

    pub fn info(&self, grid: Loc) -> SquareFlags {
        self.get(grid).map_or(SquareFlags::empty(), |s| s.info)
    }

    pub fn info_has(&self, grid: Loc, flag: SquareFlags) -> bool {
        self.info(grid).intersects(flag)
    }

    pub fn info_on(&mut self, grid: Loc, flag: SquareFlags) {
        self.sq_mut(grid).info.insert(flag);
    }

    pub fn info_off(&mut self, grid: Loc, flag: SquareFlags) {
        self.sq_mut(grid).info.remove(flag);
    }

    /// Replace every flag on a square
    pub(crate) fn set_info(&mut self, grid: Loc, info: SquareFlags) {
        self.sq_mut(grid).info = info;
    }

    /// Clear flags from every square
    pub fn info_off_all(&mut self, flag: SquareFlags) {
        for sq in &mut self.squares {
            sq.info.remove(flag);
        }
    }

    // Light

    pub fn light(&self, grid: Loc) -> i32 {
        self.get(grid).map_or(0, |s| s.light)
    }

    pub(crate) fn set_light(&mut self, grid: Loc, light: i32) {
        self.sq_mut(grid).light = light;
    }

    pub(crate) fn add_light(&mut self, grid: Loc, amount: i32) {
        self.sq_mut(grid).light += amount;
    }

    // Player

    pub fn player_grid(&self) -> Option<Loc> {
        self.player_grid
    }

    /// Put the player on a square, taking them off any previous one
    pub fn place_player(&mut self, grid: Loc) -> Result<()> {
        let i = self.check(grid)?;
        if !self.squares[i].occupant.is_none() && self.player_grid != Some(grid) {
            return Err(DungeonError::Occupied {
                y: grid.y,
                x: grid.x,
            });
        }
        if let Some(old) = self.player_grid.take() {
            self.sq_mut(old).occupant = Occupant::None;
        }
        self.squares[i].occupant = Occupant::Player;
        self.player_grid = Some(grid);
        Ok(())
    }

    pub fn remove_player(&mut self) {
        if let Some(old) = self.player_grid.take() {
            self.sq_mut(old).occupant = Occupant::None;
        }
    }

    // Monsters

    pub fn monster(&self, handle: MonsterHandle) -> Option<&Monster> {
        self.monsters.get(handle)
    }

    pub fn monster_mut(&mut self, handle: MonsterHandle) -> Option<&mut Monster> {
        self.monsters.get_mut(handle)
    }

    pub fn monsters(&self) -> impl Iterator<Item = (MonsterHandle, &Monster)> {
        self.monsters.iter()
    }

    pub fn monsters_mut(&mut self) -> impl Iterator<Item = (MonsterHandle, &mut Monster)> {
        self.monsters.iter_mut()
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }

    /// Monster standing on a grid
    pub fn monster_at(&self, grid: Loc) -> Option<MonsterHandle> {
        self.get(grid).and_then(|s| s.occupant.monster())
    }

    /// Add a monster at a grid; the square must be unoccupied
    pub fn place_monster(&mut self, grid: Loc, mut monster: Monster) -> Result<MonsterHandle> {
        let i = self.check(grid)?;
        if !self.squares[i].occupant.is_none() {
            return Err(DungeonError::Occupied {
                y: grid.y,
                x: grid.x,
            });
        }
        monster.grid = grid;
        let handle = self.monsters.insert(monster);
        self.squares[i].occupant = Occupant::Monster(handle);
        Ok(handle)
    }

    /// Remove a monster and everything it carries
    pub fn remove_monster(&mut self, handle: MonsterHandle) -> Result<Monster> {
        let monster = self
            .monsters
            .remove(handle)
            .ok_or(DungeonError::StaleHandle { kind: "monster" })?;
        if let Some(sq) = self.squares.get_mut((monster.grid.y * self.width + monster.grid.x) as usize)
        {
            if sq.occupant == Occupant::Monster(handle) {
                sq.occupant = Occupant::None;
            }
        }
        for &obj in &monster.held {
            self.objects.remove(obj);
        }
        Ok(monster)
    }

    /// Move a monster to an unoccupied grid
    pub fn move_monster(&mut self, handle: MonsterHandle, to: Loc) -> Result<()> {
        let to_i = self.check(to)?;
        let from = self
            .monsters
            .get(handle)
            .ok_or(DungeonError::StaleHandle { kind: "monster" })?
            .grid;
        if from == to {
            return Ok(());
        }
        if !self.squares[to_i].occupant.is_none() {
            return Err(DungeonError::Occupied { y: to.y, x: to.x });
        }
        self.sq_mut(from).occupant = Occupant::None;
        self.squares[to_i].occupant = Occupant::Monster(handle);
        if let Some(m) = self.monsters.get_mut(handle) {
            m.grid = to;
        }
        Ok(())
    }

    // Objects

    pub fn object(&self, handle: ObjectHandle) -> Option<&Object> {
        self.objects.get(handle)
    }

    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut Object> {
        self.objects.get_mut(handle)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &Object)> {
        self.objects.iter()
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = (ObjectHandle, &mut Object)> {
        self.objects.iter_mut()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Objects on a grid, top of the pile first
    pub fn objects_at(&self, grid: Loc) -> &[ObjectHandle] {
        self.get(grid).map_or(&[], |s| &s.objects)
    }

    /// Put an object on the floor at one end of the pile
    pub fn add_object(&mut self, grid: Loc, mut object: Object, end: PileEnd) -> Result<ObjectHandle> {
        let i = self.check(grid)?;
        object.grid = Some(grid);
        object.held_by = None;
        let handle = self.objects.insert(object);
        let pile = &mut self.squares[i].objects;
        match end {
            PileEnd::Front => pile.insert(0, handle),
            PileEnd::Back => pile.push(handle),
        }
        Ok(handle)
    }

    /// Give an object to a monster to carry
    pub fn give_object(&mut self, monster: MonsterHandle, mut object: Object) -> Result<ObjectHandle> {
        if !self.monsters.contains(monster) {
            return Err(DungeonError::StaleHandle { kind: "monster" });
        }
        object.grid = None;
        object.held_by = Some(monster);
        let handle = self.objects.insert(object);
        if let Some(m) = self.monsters.get_mut(monster) {
            m.held.push(handle);
        }
        Ok(handle)
    }

    /// Delete an object from wherever it is
    pub fn remove_object(&mut self, handle: ObjectHandle) -> Result<Object> {
        let object = self
            .objects
            .remove(handle)
            .ok_or(DungeonError::StaleHandle { kind: "object" })?;
        if let Some(grid) = object.grid {
            if let Some(i) = self.check(grid).ok() {
                self.squares[i].objects.retain(|&o| o != handle);
            }
        }
        if let Some(m) = object.held_by.and_then(|m| self.monsters.get_mut(m)) {
            m.held.retain(|&o| o != handle);
        }
        Ok(object)
    }

    // Traps

    pub fn traps_at(&self, grid: Loc) -> &[Trap] {
        self.get(grid).map_or(&[], |s| &s.traps)
    }

    /// Add a trap; hidden traps also mark the square INVIS
    pub fn add_trap(&mut self, grid: Loc, trap: Trap) -> Result<()> {
        let i = self.check(grid)?;
        let sq = &mut self.squares[i];
        sq.traps.push(trap);
        sq.info.insert(SquareFlags::TRAP);
        if !trap.visible {
            sq.info.insert(SquareFlags::INVIS);
        }
        Ok(())
    }

    /// Make every trap on a square visible
    pub fn reveal_traps(&mut self, grid: Loc) -> bool {
        let Some(i) = self.check(grid).ok() else {
            return false;
        };
        let sq = &mut self.squares[i];
        let mut revealed = false;
        for trap in &mut sq.traps {
            if !trap.visible {
                trap.visible = true;
                revealed = true;
            }
        }
        sq.info.remove(SquareFlags::INVIS);
        revealed
    }

    pub fn remove_traps(&mut self, grid: Loc) {
        let sq = self.sq_mut(grid);
        sq.traps.clear();
        sq.info.remove(SquareFlags::TRAP | SquareFlags::INVIS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::RaceId;
    use crate::object::{KindId, Tval};

    fn test_chunk() -> Chunk {
        let terrain = Arc::new(FeatureTable::builtin().unwrap());
        Chunk::new(10, 20, terrain)
    }

    #[test]
    fn test_new_chunk_is_unknown() {
        let c = test_chunk();
        let none = c.feats().none;
        assert_eq!(c.feat_count(none), 200);
        assert!(c.grids().all(|g| c.feat(g) == none));
        assert_eq!(c.monster_count(), 0);
    }

    #[test]
    fn test_set_feat_tracks_counts() {
        let mut c = test_chunk();
        let floor = c.feats().floor;
        let none = c.feats().none;
        c.set_feat(Loc::new(2, 3), floor);
        c.set_feat(Loc::new(2, 4), floor);
        c.set_feat(Loc::new(2, 4), floor);
        assert_eq!(c.feat_count(floor), 2);
        assert_eq!(c.feat_count(none), 198);
    }

    #[test]
    fn test_bright_terrain_glows() {
        let mut c = test_chunk();
        let lava = c.feats().lava;
        c.set_feat(Loc::new(1, 1), lava);
        assert!(c.info_has(Loc::new(1, 1), SquareFlags::GLOW));
    }

    #[test]
    fn test_checked_access() {
        let c = test_chunk();
        assert!(c.square(Loc::new(9, 19)).is_ok());
        assert!(matches!(
            c.square(Loc::new(10, 0)),
            Err(DungeonError::OutOfBounds { .. })
        ));
        assert_eq!(c.feat(Loc::new(-1, 0)), c.feats().none);
    }

    #[test]
    #[should_panic]
    fn test_unchecked_mutation_panics_out_of_bounds() {
        let mut c = test_chunk();
        let floor = c.feats().floor;
        c.set_feat(Loc::new(0, 20), floor);
    }

    #[test]
    fn test_monster_placement_and_move() {
        let mut c = test_chunk();
        let a = Loc::new(3, 3);
        let b = Loc::new(3, 4);
        let m = c.place_monster(a, Monster::new(RaceId(0), a)).unwrap();
        assert_eq!(c.monster_at(a), Some(m));
        assert!(c.place_monster(a, Monster::new(RaceId(1), a)).is_err());

        c.move_monster(m, b).unwrap();
        assert_eq!(c.monster_at(a), None);
        assert_eq!(c.monster_at(b), Some(m));
        assert_eq!(c.monster(m).unwrap().grid, b);

        c.remove_monster(m).unwrap();
        assert_eq!(c.monster_at(b), None);
        assert!(matches!(
            c.remove_monster(m),
            Err(DungeonError::StaleHandle { .. })
        ));
    }

    #[test]
    fn test_player_occupancy() {
        let mut c = test_chunk();
        let m_grid = Loc::new(5, 5);
        c.place_monster(m_grid, Monster::new(RaceId(0), m_grid)).unwrap();
        assert!(c.place_player(m_grid).is_err());
        c.place_player(Loc::new(5, 6)).unwrap();
        c.place_player(Loc::new(5, 7)).unwrap();
        assert_eq!(c.square(Loc::new(5, 6)).unwrap().occupant(), Occupant::None);
        assert_eq!(c.square(Loc::new(5, 7)).unwrap().occupant(), Occupant::Player);
        assert_eq!(c.player_grid(), Some(Loc::new(5, 7)));
    }

    #[test]
    fn test_object_pile_order() {
        let mut c = test_chunk();
        let g = Loc::new(4, 4);
        let first = c.add_object(g, Object::new(KindId(0), Tval::Food, 1), PileEnd::Front).unwrap();
        let second = c.add_object(g, Object::new(KindId(1), Tval::Flask, 1), PileEnd::Front).unwrap();
        let third = c.add_object(g, Object::new(KindId(2), Tval::Light, 1), PileEnd::Back).unwrap();
        assert_eq!(c.objects_at(g), &[second, first, third]);

        c.remove_object(first).unwrap();
        assert_eq!(c.objects_at(g), &[second, third]);
        assert_eq!(c.object_count(), 2);
    }

    #[test]
    fn test_held_objects_go_with_monster() {
        let mut c = test_chunk();
        let g = Loc::new(2, 2);
        let m = c.place_monster(g, Monster::new(RaceId(0), g)).unwrap();
        let o = c.give_object(m, Object::new(KindId(0), Tval::Gold, 50)).unwrap();
        assert_eq!(c.monster(m).unwrap().held, vec![o]);
        assert_eq!(c.object(o).unwrap().held_by, Some(m));
        c.remove_monster(m).unwrap();
        assert!(c.object(o).is_none());
    }

    #[test]
    fn test_traps() {
        let mut c = test_chunk();
        let g = Loc::new(1, 1);
        c.add_trap(g, Trap::new(crate::dungeon::TrapKind::Pit)).unwrap();
        assert!(c.info_has(g, SquareFlags::INVIS));
        assert!(c.reveal_traps(g));
        assert!(!c.info_has(g, SquareFlags::INVIS));
        assert!(c.traps_at(g)[0].visible);
        c.remove_traps(g);
        assert!(c.traps_at(g).is_empty());
        assert!(!c.info_has(g, SquareFlags::TRAP));
    }
}
