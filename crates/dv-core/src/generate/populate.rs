//! Monster, object and trap creation for the generator
//!
//! The generator only decides where things go. What goes there is asked of
//! a [`Populator`], so a game can plug in its own monster and object rules.
//! [`BasicPopulator`] works from the built-in race and kind tables.

use crate::dungeon::{Chunk, Loc, Trap, TrapKind};
use crate::monster::{GroupInfo, GroupRole, Monster, MonsterHandle, MonsterRace, RaceFlags, RaceId, RaceTable};
use crate::object::{KindTable, Object, Origin, Tval};
use crate::rng::GameRng;
use crate::world::errors::Result;

/// Filter applied to candidate races
pub type RaceFilter<'a> = &'a dyn Fn(&MonsterRace) -> bool;

/// One in this many monster picks is out of depth
const OOD_MONSTER_CHANCE: i32 = 25;
/// Largest out-of-depth boost
const OOD_MONSTER_AMOUNT: i32 = 10;

/// Largest friends group
const GROUP_MAX: i32 = 8;

/// Source of level inhabitants and treasure
pub trait Populator {
    /// Race details for filtering and sorting
    fn race(&self, id: RaceId) -> Option<&MonsterRace>;

    /// Race by name
    fn find_race(&self, name: &str) -> Option<RaceId>;

    /// Choose a race suitable for `depth`, optionally filtered
    fn pick_race(&mut self, rng: &mut GameRng, depth: i32, filter: Option<RaceFilter<'_>>)
    -> Option<RaceId>;

    /// Put one monster of `race` at `grid`
    fn place_monster(
        &mut self,
        c: &mut Chunk,
        rng: &mut GameRng,
        grid: Loc,
        race: RaceId,
        sleep: bool,
        origin: Origin,
    ) -> Option<MonsterHandle>;

    /// Pick a race for `depth` and place it (and its friends or escort)
    fn pick_and_place_monster(
        &mut self,
        c: &mut Chunk,
        rng: &mut GameRng,
        grid: Loc,
        depth: i32,
        sleep: bool,
        group_ok: bool,
        origin: Origin,
    ) -> bool;

    /// Make an object for `depth`; returns it with its rating
    fn make_object(
        &mut self,
        rng: &mut GameRng,
        depth: i32,
        good: bool,
        great: bool,
        tval: Option<Tval>,
    ) -> Option<(Object, u32)>;

    /// Make a pile of gold for `depth`
    fn make_gold(&mut self, rng: &mut GameRng, depth: i32) -> Object;

    /// Put a hidden trap at `grid` if it can hold one
    fn place_trap(&mut self, c: &mut Chunk, rng: &mut GameRng, grid: Loc, depth: i32) -> bool;
}

/// Populator over the built-in race and object tables
#[derive(Debug, Clone)]
pub struct BasicPopulator {
    races: RaceTable,
    kinds: KindTable,
    max_depth: i32,
}

impl BasicPopulator {
    pub fn new(races: RaceTable, kinds: KindTable, max_depth: i32) -> Self {
        Self {
            races,
            kinds,
            max_depth,
        }
    }

    /// Populator using the tables shipped with the crate
    pub fn builtin(max_depth: i32) -> Result<Self> {
        Ok(Self::new(RaceTable::builtin()?, KindTable::builtin()?, max_depth))
    }

    pub fn races(&self) -> &RaceTable {
        &self.races
    }

    /// Place followers around a freshly placed monster
    fn place_group(
        &mut self,
        c: &mut Chunk,
        rng: &mut GameRng,
        leader: MonsterHandle,
        depth: i32,
        origin: Origin,
    ) {
        let Some(mon) = c.monster(leader) else {
            return;
        };
        let (grid, race_id, sleep) = (mon.grid, mon.race, mon.is_asleep());
        let Some(race) = self.races.get(race_id) else {
            return;
        };
        let (flags, level, base) = (race.flags, race.level, race.base.clone());

        let (count, role) = if flags.contains(RaceFlags::FRIENDS) {
            // Bigger groups when the race is shallow for this depth
            let extra = ((depth - level).max(0) / 4).min(GROUP_MAX - 2);
            (rng.randint1(2 + extra), GroupRole::Member)
        } else if flags.contains(RaceFlags::ESCORT) {
            (rng.rand_range(2, 4), GroupRole::Servant)
        } else {
            return;
        };

        let index = next_group_index(c);
        let leader_role = if role == GroupRole::Servant {
            GroupRole::Leader
        } else {
            GroupRole::Member
        };
        if let Some(m) = c.monster_mut(leader) {
            m.group = Some(GroupInfo {
                index,
                role: leader_role,
            });
        }

        let mut members = vec![grid];
        let mut placed = 0;
        let mut i = 0;
        while placed < count {
            let Some(&from) = members.get(i) else {
                break;
            };
            i += 1;
            for spot in from.adjacent() {
                if placed >= count {
                    break;
                }
                if !c.in_bounds_fully(spot) || !c.is_empty(spot) || c.is_mon_restrict(spot) {
                    continue;
                }
                let follower = if role == GroupRole::Servant {
                    let escort = |r: &MonsterRace| {
                        r.base == base && r.level <= level && !r.flags.contains(RaceFlags::UNIQUE)
                    };
                    self.pick_race(rng, level, Some(&escort))
                } else {
                    Some(race_id)
                };
                let Some(follower) = follower else {
                    continue;
                };
                if let Some(h) = self.place_monster(c, rng, spot, follower, sleep, origin) {
                    if let Some(m) = c.monster_mut(h) {
                        m.group = Some(GroupInfo { index, role });
                    }
                    members.push(spot);
                    placed += 1;
                }
            }
        }
    }
}

/// First unused monster group number on a chunk
pub fn next_group_index(c: &Chunk) -> u32 {
    c.monsters()
        .filter_map(|(_, m)| m.group.map(|g| g.index))
        .max()
        .map_or(0, |i| i + 1)
}

impl Populator for BasicPopulator {
    fn race(&self, id: RaceId) -> Option<&MonsterRace> {
        self.races.get(id)
    }

    fn find_race(&self, name: &str) -> Option<RaceId> {
        self.races.lookup(name).map(|r| r.ridx)
    }

    fn pick_race(
        &mut self,
        rng: &mut GameRng,
        depth: i32,
        filter: Option<RaceFilter<'_>>,
    ) -> Option<RaceId> {
        let mut level = depth.max(0);
        if level > 0 && rng.one_in(OOD_MONSTER_CHANCE) {
            level += (level / 4 + 2).min(OOD_MONSTER_AMOUNT);
        }

        let candidates: Vec<(RaceId, i32)> = self
            .races
            .iter()
            .filter(|r| r.level <= level)
            // Town dwellers stay in town
            .filter(|r| (level == 0) == (r.level == 0))
            .filter(|r| !r.flags.contains(RaceFlags::QUESTOR))
            .filter(|r| filter.is_none_or(|f| f(r)))
            .map(|r| (r.ridx, (100 / r.rarity).max(1)))
            .collect();

        let total: i32 = candidates.iter().map(|(_, w)| w).sum();
        if total <= 0 {
            return None;
        }
        let mut draw = rng.randint0(total);
        for (ridx, weight) in candidates {
            if draw < weight {
                return Some(ridx);
            }
            draw -= weight;
        }
        None
    }

    fn place_monster(
        &mut self,
        c: &mut Chunk,
        rng: &mut GameRng,
        grid: Loc,
        race: RaceId,
        sleep: bool,
        origin: Origin,
    ) -> Option<MonsterHandle> {
        if !c.in_bounds(grid) || !c.is_empty(grid) {
            return None;
        }
        let r = self.races.get(race)?;
        if r.flags.contains(RaceFlags::UNIQUE) && c.monsters().any(|(_, m)| m.race == race) {
            return None;
        }

        let mut mon = Monster::new(race, grid);
        mon.light = r.light;
        mon.origin = origin;
        if sleep {
            mon.sleep = 20 + rng.randint1(100);
        }
        let level = r.level.max(0) as u32;

        let handle = c.place_monster(grid, mon).ok()?;
        c.mon_rating = c.mon_rating.saturating_add(level * level);
        log::trace!("placed {} at {:?}", r.name, grid);
        Some(handle)
    }

    fn pick_and_place_monster(
        &mut self,
        c: &mut Chunk,
        rng: &mut GameRng,
        grid: Loc,
        depth: i32,
        sleep: bool,
        group_ok: bool,
        origin: Origin,
    ) -> bool {
        let Some(race) = self.pick_race(rng, depth, None) else {
            return false;
        };
        let Some(handle) = self.place_monster(c, rng, grid, race, sleep, origin) else {
            return false;
        };
        if group_ok {
            self.place_group(c, rng, handle, depth, origin);
        }
        true
    }

    fn make_object(
        &mut self,
        rng: &mut GameRng,
        depth: i32,
        good: bool,
        great: bool,
        tval: Option<Tval>,
    ) -> Option<(Object, u32)> {
        let mut level = depth.max(0);
        if good {
            level += 10;
        }
        if great {
            level += 10 + rng.randint0(10);
        }

        let candidates: Vec<_> = self
            .kinds
            .iter()
            .filter(|(_, k)| k.alloc > 0 && k.tval != Tval::Gold && k.level <= level)
            .filter(|(_, k)| tval.is_none_or(|t| k.tval == t))
            .collect();
        let total: i32 = candidates.iter().map(|(_, k)| k.alloc).sum();
        if total <= 0 {
            return None;
        }

        let mut draw = rng.randint0(total);
        let (kidx, kind) = candidates.into_iter().find(|(_, k)| {
            if draw < k.alloc {
                true
            } else {
                draw -= k.alloc;
                false
            }
        })?;

        let mut value = kind.cost;
        if good {
            value += kind.cost / 2 + rng.m_bonus(100, level);
        }
        if great {
            value *= 2;
        }
        let mut obj = Object::new(kidx, kind.tval, value);
        obj.origin_depth = depth;
        Some((obj, value.max(0) as u32))
    }

    fn make_gold(&mut self, rng: &mut GameRng, depth: i32) -> Object {
        let depth = depth.max(0);
        let avg = (18 * depth) / 10 + 18;
        let spread = depth + 10;
        let value = rng.rand_spread(avg, spread).max(1);

        // Richer metals deeper down
        let metals: Vec<_> = self
            .kinds
            .iter()
            .filter(|(_, k)| k.tval == Tval::Gold && k.level <= depth.max(1))
            .collect();
        let mut obj = match rng.choose(&metals) {
            Some(&(kidx, kind)) => Object::new(kidx, Tval::Gold, value * kind.cost / 30),
            None => Object::new(crate::object::KindId(0), Tval::Gold, value),
        };
        obj.value = obj.value.max(1);
        obj.origin_depth = depth;
        obj
    }

    fn place_trap(&mut self, c: &mut Chunk, rng: &mut GameRng, grid: Loc, depth: i32) -> bool {
        if !c.in_bounds(grid)
            || !c.is_trap_holding(grid)
            || c.has_trap(grid)
            || c.has_objects(grid)
        {
            return false;
        }
        let kind = TrapKind::pick(rng, depth, self.max_depth);
        c.add_trap(grid, Trap::new(kind)).is_ok()
    }
}
