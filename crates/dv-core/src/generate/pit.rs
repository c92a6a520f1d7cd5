//! Monster pits and nests
//!
//! Both are a walled room with a moat around an inner room packed with
//! monsters of one theme. The theme is a [`PitProfile`]: a filter on race
//! flags, spells, base and colour. Nests scatter their races at random;
//! pits sort them by level and lay them out with the hardest in the middle.

use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::Display;

use super::room::centre_or_space;
use super::util::{draw_rectangle, fill_rectangle, generate_hole, generate_room, place_object};
use super::populate::next_group_index;
use super::GenerationContext;
use crate::dungeon::{Chunk, Loc, Rect, SquareFlags};
use crate::monster::{GroupInfo, GroupRole, MonsterRace, RaceFlags, RaceId, SpellFlags};
use crate::object::Origin;
use crate::world::errors::{read_data_file, DungeonError, Result};

/// Races sampled for a nest
const NEST_RACES: usize = 64;
/// Races sampled for a pit
const PIT_RACES: usize = 16;

/// Which room a pit profile themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum PitKind {
    Pit,
    Nest,
}

/// A monster theme for pits and nests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitProfile {
    pub name: String,
    pub kind: PitKind,
    /// Typical depth
    pub ave: i32,
    /// One in this many chance of being considered
    pub rarity: i32,
    /// Percent chance of an object on each grid
    pub obj_rarity: i32,
    /// Flags every race must have
    pub flags: RaceFlags,
    pub forbidden_flags: RaceFlags,
    /// Spells every race must have
    pub spells: SpellFlags,
    pub forbidden_spells: SpellFlags,
    /// Allowed bases; empty allows any
    pub bases: Vec<String>,
    /// Allowed colours; empty allows any
    pub colors: Vec<char>,
    /// Races never used
    pub forbidden_monsters: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PitRecord {
    name: String,
    kind: PitKind,
    ave: i32,
    #[serde(default = "default_rarity")]
    rarity: i32,
    #[serde(default)]
    obj_rarity: i32,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    forbidden_flags: Vec<String>,
    #[serde(default)]
    spells: Vec<String>,
    #[serde(default)]
    forbidden_spells: Vec<String>,
    #[serde(default)]
    bases: Vec<String>,
    #[serde(default)]
    colors: Vec<char>,
    #[serde(default)]
    forbidden_monsters: Vec<String>,
}

fn default_rarity() -> i32 {
    1
}

const BUILTIN_PITS: &str = include_str!("../data/pit.json");

/// The pit profiles shipped with the crate
pub fn builtin_pits() -> Result<Vec<PitProfile>> {
    pits_from_json(BUILTIN_PITS)
}

pub fn load_pits(path: &Path) -> Result<Vec<PitProfile>> {
    let contents = read_data_file(path)?;
    pits_from_json(&contents)
}

pub fn pits_from_json(contents: &str) -> Result<Vec<PitProfile>> {
    let records: Vec<PitRecord> = serde_json::from_str(contents)?;
    records
        .into_iter()
        .map(|rec| {
            if rec.rarity < 1 {
                return Err(DungeonError::Data(format!("pit '{}' has rarity < 1", rec.name)));
            }
            Ok(PitProfile {
                flags: parse_flags(&rec.flags, &rec.name, RaceFlags::from_name)?,
                forbidden_flags: parse_flags(&rec.forbidden_flags, &rec.name, RaceFlags::from_name)?,
                spells: parse_flags(&rec.spells, &rec.name, SpellFlags::from_name)?,
                forbidden_spells: parse_flags(&rec.forbidden_spells, &rec.name, SpellFlags::from_name)?,
                name: rec.name,
                kind: rec.kind,
                ave: rec.ave,
                rarity: rec.rarity,
                obj_rarity: rec.obj_rarity,
                bases: rec.bases,
                colors: rec.colors,
                forbidden_monsters: rec.forbidden_monsters,
            })
        })
        .collect()
}

fn parse_flags<F: bitflags::Flags>(names: &[String], pit: &str, from_name: impl Fn(&str) -> Option<F>) -> Result<F> {
    let mut flags = F::empty();
    for name in names {
        let flag =
            from_name(name).ok_or_else(|| DungeonError::Data(format!("unknown flag '{name}' on pit '{pit}'")))?;
        flags.insert(flag);
    }
    Ok(flags)
}

impl PitProfile {
    /// Can this race live in the pit?
    pub fn accepts(&self, race: &MonsterRace) -> bool {
        if race.flags.contains(RaceFlags::UNIQUE) {
            return false;
        }
        if !race.flags.contains(self.flags) || race.flags.intersects(self.forbidden_flags) {
            return false;
        }
        if !race.spells.contains(self.spells) || race.spells.intersects(self.forbidden_spells) {
            return false;
        }
        if self.forbidden_monsters.iter().any(|name| *name == race.name) {
            return false;
        }
        let base_ok = self.bases.is_empty() || self.bases.iter().any(|b| *b == race.base);
        let color_ok = self.colors.is_empty() || self.colors.contains(&race.color);
        base_ok && color_ok
    }
}

/// Pick the pit profile of `kind` for this level
///
/// Every profile rolls a depth around its average; the one landing nearest
/// the level's depth (and passing its rarity roll) wins.
pub fn set_pit_type(ctx: &mut GenerationContext<'_>, kind: PitKind) -> Option<usize> {
    let data = ctx.data;
    let mut chosen = None;
    let mut best = 999;

    for (i, pit) in data.pits.iter().enumerate() {
        if pit.kind != kind {
            continue;
        }
        let offset = ctx.rng.rand_normal(pit.ave, 10);
        let dist = (offset - ctx.depth).abs();
        if dist < best && ctx.rng.one_in(pit.rarity) {
            chosen = Some(i);
            best = dist;
        }
    }

    let chosen = chosen.or_else(|| data.pits.iter().position(|p| p.kind == kind));
    ctx.pit_type = chosen;
    chosen
}

/// Sample `n` races for the chosen pit profile; `None` if any pick fails
fn pick_races(ctx: &mut GenerationContext<'_>, n: usize) -> Option<Vec<RaceId>> {
    let data = ctx.data;
    let pit = &data.pits[ctx.pit_type?];
    let hook = |r: &MonsterRace| pit.accepts(r);
    let depth = ctx.depth + 10;
    (0..n).map(|_| ctx.pop.pick_race(ctx.rng, depth, Some(&hook))).collect()
}

/// Walled room with an inner room opened by a secret door
fn moat_room(ctx: &mut GenerationContext<'_>, c: &mut Chunk, outer: Rect) -> Rect {
    let (floor, granite, secret) = (c.feats().floor, c.feats().granite, c.feats().secret);
    let walled = Rect::new(outer.y1 - 1, outer.x1 - 1, outer.y2 + 1, outer.x2 + 1);
    generate_room(c, walled, false);
    draw_rectangle(c, walled, granite, SquareFlags::WALL_OUTER);
    fill_rectangle(c, outer, floor, SquareFlags::empty());

    let inner = Rect::new(outer.y1 + 2, outer.x1 + 2, outer.y2 - 2, outer.x2 - 2);
    let inner_wall = Rect::new(inner.y1 - 1, inner.x1 - 1, inner.y2 + 1, inner.x2 + 1);
    draw_rectangle(c, inner_wall, granite, SquareFlags::WALL_INNER);
    generate_hole(c, ctx.rng, inner_wall, secret);
    inner
}

/// A nest: an inner room tiled with monsters drawn from 64 sampled races
pub fn build_nest(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let size_vary = ctx.rng.randint0(4);

    let Some(pit_idx) = set_pit_type(ctx, PitKind::Nest) else {
        return false;
    };
    let Some(what) = pick_races(ctx, NEST_RACES) else {
        return false;
    };
    let Some(Loc { y: y0, x: x0 }) = centre_or_space(ctx, centre, 11, 25) else {
        return false;
    };

    let outer = Rect::new(y0 - 4, x0 - 5 - size_vary, y0 + 4, x0 + 5 + size_vary);
    let inner = moat_room(ctx, c, outer);

    let pit = &ctx.data.pits[pit_idx];
    debug!("Monster nest ({})", pit.name);
    let alloc_obj = pit.obj_rarity;
    c.mon_rating = c.mon_rating.saturating_add((size_vary + pit.ave / 20) as u32);

    let depth = ctx.depth;
    for grid in inner.grids() {
        let race = what[ctx.rng.randint0(NEST_RACES as i32) as usize];
        ctx.pop.place_monster(c, ctx.rng, grid, race, false, Origin::Nest);

        if ctx.rng.randint0(100) < alloc_obj {
            let good = ctx.rng.one_in(3);
            place_object(ctx, c, grid, depth + 10, good, false, Origin::Nest, None);
        }
    }
    true
}

/// Pit layout around the centre: `(dy, dx, tier)`, tier 0 the easiest
fn pit_layout() -> Vec<(i32, i32, usize)> {
    let mut spots = Vec::new();

    // Top and bottom rows
    for dx in -3..=3 {
        spots.push((-2, dx, 0));
        spots.push((2, dx, 0));
    }
    for dx in [-5, -4, 4, 5] {
        spots.push((-2, dx, 1));
        spots.push((2, dx, 1));
    }

    // Middle columns
    for dy in -1..=1 {
        for (dx, tier) in [(5, 0), (4, 1), (3, 2), (2, 3)] {
            spots.push((dy, -dx, tier));
            spots.push((dy, dx, tier));
        }
    }

    // Around the centre
    for (dy, dx) in [(-1, -1), (-1, 1), (1, -1), (1, 1)] {
        spots.push((dy, dx, 4));
    }
    for dy in [-1, 1] {
        spots.push((dy, 0, 5));
    }
    spots.push((0, -1, 6));
    spots.push((0, 1, 6));
    spots.push((0, 0, 7));
    spots
}

/// A pit: 16 sampled races sorted by level, every other one placed in
/// rings with the hardest at the centre as the group leader
pub fn build_pit(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let Some(pit_idx) = set_pit_type(ctx, PitKind::Pit) else {
        return false;
    };
    let Some(mut what) = pick_races(ctx, PIT_RACES) else {
        return false;
    };
    let Some(centre) = centre_or_space(ctx, centre, 11, 25) else {
        return false;
    };
    let Loc { y: y0, x: x0 } = centre;

    moat_room(ctx, c, Rect::new(y0 - 4, x0 - 7, y0 + 4, x0 + 7));

    // Sort by level and keep every other race
    what.sort_by_key(|&r| ctx.pop.race(r).map_or(0, |race| race.level));
    let tiers: Vec<RaceId> = what.iter().step_by(2).copied().collect();

    let pit = &ctx.data.pits[pit_idx];
    debug!("Monster pit ({})", pit.name);
    let alloc_obj = pit.obj_rarity;
    c.mon_rating = c.mon_rating.saturating_add((3 + pit.ave / 20) as u32);

    let index = next_group_index(c);
    for (dy, dx, tier) in pit_layout() {
        let grid = centre.offset(dy, dx);
        let role = if tier == 7 {
            GroupRole::Leader
        } else {
            GroupRole::Servant
        };
        if let Some(h) = ctx.pop.place_monster(c, ctx.rng, grid, tiers[tier], false, Origin::Pit) {
            if let Some(mon) = c.monster_mut(h) {
                mon.group = Some(GroupInfo { index, role });
            }
        }
    }

    let depth = ctx.depth;
    for y in y0 - 2..=y0 + 2 {
        for x in x0 - 9..=x0 + 9 {
            if ctx.rng.randint0(100) < alloc_obj {
                let good = ctx.rng.one_in(3);
                place_object(ctx, c, Loc::new(y, x), depth + 10, good, false, Origin::Pit, None);
            }
        }
    }
    true
}
