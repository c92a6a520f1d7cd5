//! Monster races
//!
//! Races are immutable templates loaded from data. The generator only needs
//! enough of a race to pick level-appropriate monsters and to filter them for
//! themed pits and nests.

use bitflags::bitflags;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::world::errors::{read_data_file, DungeonError, Result};

bitflags! {
    /// Race flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RaceFlags: u32 {
        const UNIQUE = 1 << 0;
        const EVIL = 1 << 1;
        const UNDEAD = 1 << 2;
        const DEMON = 1 << 3;
        const DRAGON = 1 << 4;
        const ORC = 1 << 5;
        const TROLL = 1 << 6;
        const GIANT = 1 << 7;
        const ANIMAL = 1 << 8;
        const STUPID = 1 << 9;
        const INVISIBLE = 1 << 10;
        const COLD_BLOOD = 1 << 11;
        const NEVER_MOVE = 1 << 12;
        const FRIENDS = 1 << 13;
        const ESCORT = 1 << 14;
        const HURT_LIGHT = 1 << 15;
        const IM_FIRE = 1 << 16;
        const IM_COLD = 1 << 17;
        const IM_ACID = 1 << 18;
        const IM_ELEC = 1 << 19;
        const IM_POIS = 1 << 20;
        /// Placed only by a quest, never at random
        const QUESTOR = 1 << 21;
    }
}

bitflags! {
    /// Innate and spell abilities
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpellFlags: u32 {
        const BR_ACID = 1 << 0;
        const BR_ELEC = 1 << 1;
        const BR_FIRE = 1 << 2;
        const BR_COLD = 1 << 3;
        const BR_POIS = 1 << 4;
        const ARROW = 1 << 5;
        const MISSILE = 1 << 6;
        const BLINK = 1 << 7;
        const TPORT = 1 << 8;
        const BLIND = 1 << 9;
        const CONF = 1 << 10;
        const SCARE = 1 << 11;
        const DRAIN_MANA = 1 << 12;
        const S_MONSTER = 1 << 13;
    }
}

/// Index into the race table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaceId(pub u16);

/// A monster template
#[derive(Debug, Clone)]
pub struct MonsterRace {
    pub ridx: RaceId,
    pub name: String,
    /// Monster base ("orc", "jelly", ...)
    pub base: String,
    pub glyph: char,
    /// Single-letter colour code
    pub color: char,
    pub level: i32,
    pub rarity: i32,
    pub flags: RaceFlags,
    pub spells: SpellFlags,
    /// Light radius carried (negative for darkness)
    pub light: i32,
}

#[derive(Debug, Clone, Deserialize)]
struct RaceRecord {
    name: String,
    base: String,
    glyph: char,
    color: char,
    level: i32,
    #[serde(default = "default_rarity")]
    rarity: i32,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    spells: Vec<String>,
    #[serde(default)]
    light: i32,
}

fn default_rarity() -> i32 {
    1
}

/// All monster races
#[derive(Debug, Clone)]
pub struct RaceTable {
    races: Vec<MonsterRace>,
    by_name: HashMap<String, RaceId>,
}

const BUILTIN_RACES: &str = include_str!("../data/races.json");

impl RaceTable {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_RACES)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = read_data_file(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let records: Vec<RaceRecord> = serde_json::from_str(contents)?;
        let mut races = Vec::with_capacity(records.len());
        let mut by_name = HashMap::new();

        for (i, rec) in records.into_iter().enumerate() {
            let ridx = RaceId(i as u16);
            let flags = parse_flags(&rec.flags, &rec.name, RaceFlags::from_name)?;
            let spells = parse_flags(&rec.spells, &rec.name, SpellFlags::from_name)?;
            if rec.rarity < 1 {
                return Err(DungeonError::Data(format!("race '{}' has rarity < 1", rec.name)));
            }
            by_name.insert(rec.name.clone(), ridx);
            races.push(MonsterRace {
                ridx,
                name: rec.name,
                base: rec.base,
                glyph: rec.glyph,
                color: rec.color,
                level: rec.level,
                rarity: rec.rarity,
                flags,
                spells,
                light: rec.light,
            });
        }

        Ok(Self { races, by_name })
    }

    pub fn get(&self, ridx: RaceId) -> Option<&MonsterRace> {
        self.races.get(ridx.0 as usize)
    }

    pub fn lookup(&self, name: &str) -> Option<&MonsterRace> {
        self.by_name.get(name).and_then(|&r| self.get(r))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonsterRace> {
        self.races.iter()
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }
}

fn parse_flags<F: bitflags::Flags>(
    names: &[String],
    race: &str,
    from_name: impl Fn(&str) -> Option<F>,
) -> Result<F> {
    let mut flags = F::empty();
    for name in names {
        let flag = from_name(name)
            .ok_or_else(|| DungeonError::Data(format!("unknown flag '{name}' on race '{race}'")))?;
        flags.insert(flag);
    }
    Ok(flags)
}
