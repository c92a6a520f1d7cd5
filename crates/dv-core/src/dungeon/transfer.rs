//! Saving chunks and copying them into other chunks
//!
//! The town and persistent levels are kept in a [`ChunkList`] by name.
//! [`chunk_copy`] stamps one chunk into another under a rotation, reflection
//! and translation, bringing objects, traps, monsters and the player along.

use bitflags::bitflags;

use super::{Chunk, Loc, PileEnd, Rect};
use crate::monster::GroupInfo;
use crate::rng::GameRng;
use crate::world::errors::{DungeonError, Result};

/// Weight of an untransposed transform in [`get_random_symmetry_transform`]
pub const SYMTR_MAX_WEIGHT: i32 = 32768;

bitflags! {
    /// Constraints on random symmetry transforms
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymmetryFlags: u8 {
        /// No 90/270 degree rotations and no bare 180 degree rotation
        const NO_ROT = 1 << 0;
        /// No horizontal reflection (wins over FORCE_REF)
        const NO_REF = 1 << 1;
        /// Always reflect horizontally
        const FORCE_REF = 1 << 2;
    }
}

/// Rotation (clockwise quarter turns), reflection, then translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transform {
    pub y0: i32,
    pub x0: i32,
    pub rotate: i32,
    pub reflect: bool,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        y0: 0,
        x0: 0,
        rotate: 0,
        reflect: false,
    };

    pub const fn new(y0: i32, x0: i32, rotate: i32, reflect: bool) -> Self {
        Self {
            y0,
            x0,
            rotate,
            reflect,
        }
    }

    /// Same rotation and reflection, moved to a new offset
    pub const fn at(self, y0: i32, x0: i32) -> Self {
        Self { y0, x0, ..self }
    }

    /// Map a grid of a `height` x `width` piece
    pub fn apply(&self, grid: Loc, height: i32, width: i32) -> Loc {
        symmetry_transform(grid, self.y0, self.x0, height, width, self.rotate, self.reflect)
    }

    /// Size of a `height` x `width` piece after the transform
    pub const fn dimensions(&self, height: i32, width: i32) -> (i32, i32) {
        if self.rotate % 2 == 0 {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Transform a grid by rotation, reflection and translation
///
/// Rotations are clockwise quarter turns. The reflection is horizontal in
/// the rotated frame.
pub fn symmetry_transform(
    grid: Loc,
    y0: i32,
    x0: i32,
    height: i32,
    width: i32,
    rotate: i32,
    reflect: bool,
) -> Loc {
    let (mut rheight, mut rwidth) = (height, width);
    let mut g = grid;

    for _ in 0..rotate.rem_euclid(4) {
        g = Loc::new(g.x, rheight - 1 - g.y);
        std::mem::swap(&mut rheight, &mut rwidth);
    }

    if reflect {
        g.x = rwidth - 1 - g.x;
    }

    g.offset(y0, x0)
}

/// Pick a random rotation and reflection under `flags`
///
/// `transpose_weight` (clamped to `0..=SYMTR_MAX_WEIGHT`) weighs the
/// transforms that swap height and width; zero forbids them. Returns the
/// transform (with no translation) and the transformed height and width.
pub fn get_random_symmetry_transform(
    rng: &mut GameRng,
    height: i32,
    width: i32,
    flags: SymmetryFlags,
    transpose_weight: i32,
) -> (Transform, i32, i32) {
    let tw = transpose_weight.clamp(0, SYMTR_MAX_WEIGHT);
    let no_ref = flags.contains(SymmetryFlags::NO_REF);
    let no_rot = flags.contains(SymmetryFlags::NO_ROT);
    let unreflected_ok = no_ref || !flags.contains(SymmetryFlags::FORCE_REF);

    // Cumulative weights: four rotations unreflected, then four reflected
    let mut weights = [0i32; 9];
    weights[1] = if unreflected_ok { SYMTR_MAX_WEIGHT } else { 0 };
    if no_rot || !unreflected_ok {
        weights[2] = weights[1];
        weights[3] = weights[2];
        weights[4] = weights[3];
    } else {
        weights[2] = weights[1] + tw;
        weights[3] = weights[2] + SYMTR_MAX_WEIGHT;
        weights[4] = weights[3] + tw;
    }
    if no_ref {
        weights[5] = weights[4];
        weights[6] = weights[5];
        weights[7] = weights[6];
        weights[8] = weights[7];
    } else {
        weights[5] = weights[4] + SYMTR_MAX_WEIGHT;
        if no_rot {
            // Half turn plus reflection is a vertical flip, which is allowed
            weights[6] = weights[5];
            weights[7] = weights[6] + SYMTR_MAX_WEIGHT;
            weights[8] = weights[7];
        } else {
            weights[6] = weights[5] + tw;
            weights[7] = weights[6] + SYMTR_MAX_WEIGHT;
            weights[8] = weights[7] + tw;
        }
    }

    let draw = rng.randint0(weights[8]);

    // Binary search for the bucket holding the draw
    let (mut ilow, mut ihigh) = (0usize, 8usize);
    while ilow != ihigh - 1 {
        let imid = (ilow + ihigh) / 2;
        if weights[imid] <= draw {
            ilow = imid;
        } else {
            ihigh = imid;
        }
    }

    let transform = Transform::new(0, 0, (ilow % 4) as i32, ilow >= 4);
    let (th, tw) = transform.dimensions(height, width);
    (transform, th, tw)
}

/// Transpose weight that favours keeping wide pieces wide
///
/// Zero when `width >= 2 * height`, rising to [`SYMTR_MAX_WEIGHT`] once the
/// piece is at least as tall as it is wide.
pub fn calc_default_transpose_weight(height: i32, width: i32) -> i32 {
    if width <= 0 {
        return SYMTR_MAX_WEIGHT;
    }
    (SYMTR_MAX_WEIGHT / 64) * ((128 * height) / width - 64).clamp(0, 64)
}

/// Copy the terrain and flags of a whole chunk
pub fn chunk_write(c: &Chunk) -> Chunk {
    let rect = Rect::new(0, 0, c.height - 1, c.width - 1);
    let mut new = Chunk::new(c.height, c.width, c.terrain_arc());
    copy_terrain(&mut new, c, rect);
    new.name = c.name.clone();
    new.depth = c.depth;
    new.turn = c.turn;
    new
}

/// Copy the terrain and flags of part of a chunk into a new chunk
pub fn chunk_write_rect(c: &Chunk, rect: Rect) -> Result<Chunk> {
    for corner in [Loc::new(rect.y1, rect.x1), Loc::new(rect.y2, rect.x2)] {
        c.square(corner)?;
    }
    if rect.y2 < rect.y1 || rect.x2 < rect.x1 {
        return Err(DungeonError::Data(format!("empty rectangle {:?}", rect)));
    }
    let mut new = Chunk::new(rect.height(), rect.width(), c.terrain_arc());
    copy_terrain(&mut new, c, rect);
    new.depth = c.depth;
    Ok(new)
}

fn copy_terrain(dest: &mut Chunk, source: &Chunk, rect: Rect) {
    for grid in rect.grids() {
        let to = grid.offset(-rect.y1, -rect.x1);
        dest.set_feat(to, source.feat(grid));
        dest.set_info(to, source.info(grid));
    }
}

/// Copy `source` into `dest` under a transform
///
/// Terrain, flags, floor objects (pile order kept), traps, the player,
/// monsters and what they carry are all copied; monster group ids are
/// shifted past those already in `dest`. Ratings are added. Fails without
/// touching `dest` if the transformed piece does not fit.
pub fn chunk_copy(dest: &mut Chunk, source: &Chunk, t: Transform) -> Result<()> {
    if t.rotate < 0 {
        return Err(DungeonError::InvalidTransform {
            rotate: t.rotate,
            reflect: t.reflect,
        });
    }

    let (h, w) = (source.height, source.width);
    let (th, tw) = t.dimensions(h, w);
    if t.y0 < 0 || t.x0 < 0 || th + t.y0 > dest.height || tw + t.x0 > dest.width {
        return Err(DungeonError::ChunkDoesNotFit {
            name: source.name.clone(),
            y: t.y0,
            x: t.x0,
        });
    }

    // Step 1: terrain, flags, floor objects and traps
    for grid in source.grids() {
        let to = t.apply(grid, h, w);
        dest.set_feat(to, source.feat(grid));
        dest.set_info(to, source.info(grid));

        for &handle in source.objects_at(grid) {
            if let Some(obj) = source.object(handle) {
                dest.add_object(to, obj.clone(), PileEnd::Back)?;
            }
        }
        for &trap in source.traps_at(grid) {
            dest.add_trap(to, trap)?;
        }
    }

    // Step 2: the player
    if let Some(pgrid) = source.player_grid() {
        dest.place_player(t.apply(pgrid, h, w))?;
    }

    // Step 3: monsters, with their groups renumbered and their gear
    let group_skip = dest
        .monsters()
        .filter_map(|(_, m)| m.group.map(|g| g.index))
        .max()
        .map_or(0, |i| i + 1);

    for (_, mon) in source.monsters() {
        let mut copy = mon.clone();
        copy.grid = t.apply(mon.grid, h, w);
        copy.held = Vec::new();
        copy.group = mon.group.map(|g| GroupInfo {
            index: g.index + group_skip,
            role: g.role,
        });
        let new_handle = dest.place_monster(copy.grid, copy)?;
        for &held in &mon.held {
            if let Some(obj) = source.object(held) {
                dest.give_object(new_handle, obj.clone())?;
            }
        }
    }

    // Step 4: ratings
    dest.obj_rating += source.obj_rating;
    dest.mon_rating += source.mon_rating;
    dest.good_item |= source.good_item;

    log::trace!(
        "copied chunk '{}' ({}x{}) to ({}, {}) rotate {} reflect {}",
        source.name,
        h,
        w,
        t.y0,
        t.x0,
        t.rotate,
        t.reflect
    );
    Ok(())
}

/// Saved chunks, looked up by name
#[derive(Debug, Clone, Default)]
pub struct ChunkList {
    chunks: Vec<Chunk>,
}

impl ChunkList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a chunk, replacing any stored under the same name
    pub fn add(&mut self, c: Chunk) {
        self.remove(&c.name);
        log::debug!("storing chunk '{}'", c.name);
        self.chunks.push(c);
    }

    /// Take a chunk out of the list
    pub fn remove(&mut self, name: &str) -> Option<Chunk> {
        let i = self.chunks.iter().position(|c| c.name == name)?;
        Some(self.chunks.remove(i))
    }

    pub fn find(&self, name: &str) -> Option<&Chunk> {
        self.chunks.iter().find(|c| c.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Chunk> {
        self.chunks.iter_mut().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }
}
