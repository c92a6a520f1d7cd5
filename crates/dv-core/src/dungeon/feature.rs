//! Terrain features
//!
//! Features are immutable and loaded once. Squares refer to them by
//! [`FeatureId`]; ids are only stable for one loaded table, so the ones the
//! generator needs are resolved by name into [`Feats`].

use bitflags::bitflags;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::world::errors::{read_data_file, DungeonError, Result};

bitflags! {
    /// Terrain flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TerrainFlags: u32 {
        const LOS = 1 << 0;
        const PROJECT = 1 << 1;
        const PASSABLE = 1 << 2;
        const INTERESTING = 1 << 3;
        const PERMANENT = 1 << 4;
        const EASY = 1 << 5;
        const TRAP = 1 << 6;
        const NO_SCENT = 1 << 7;
        const NO_FLOW = 1 << 8;
        const OBJECT = 1 << 9;
        const TORCH = 1 << 10;
        const HIDDEN = 1 << 11;
        const GOLD = 1 << 12;
        const CLOSABLE = 1 << 13;
        const FLOOR = 1 << 14;
        const WALL = 1 << 15;
        const ROCK = 1 << 16;
        const GRANITE = 1 << 17;
        const DOOR_ANY = 1 << 18;
        const DOOR_CLOSED = 1 << 19;
        const SHOP = 1 << 20;
        const DOOR_JAMMED = 1 << 21;
        const DOOR_LOCKED = 1 << 22;
        const MAGMA = 1 << 23;
        const QUARTZ = 1 << 24;
        const STAIR = 1 << 25;
        const UPSTAIR = 1 << 26;
        const DOWNSTAIR = 1 << 27;
        const SMOOTH = 1 << 28;
        const BRIGHT = 1 << 29;
        const FIERY = 1 << 30;
    }
}

/// Index into the loaded terrain table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub u16);

impl FeatureId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One terrain type
#[derive(Debug, Clone)]
pub struct Feature {
    pub fidx: FeatureId,
    pub name: String,
    /// What an uninformed player sees this as
    pub mimic: FeatureId,
    pub flags: TerrainFlags,
    pub glyph: char,
    pub priority: u8,
    /// Shop number for shop entrances
    pub shop: Option<u8>,
}

impl Feature {
    pub fn has(&self, flag: TerrainFlags) -> bool {
        self.flags.contains(flag)
    }
}

/// Terrain entry as written in the data file
#[derive(Debug, Clone, Deserialize)]
struct FeatureRecord {
    name: String,
    #[serde(default)]
    mimic: Option<String>,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default = "default_glyph")]
    glyph: char,
    #[serde(default)]
    priority: u8,
    #[serde(default)]
    shop: Option<u8>,
}

fn default_glyph() -> char {
    '?'
}

/// Feature ids the core refers to directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feats {
    pub none: FeatureId,
    pub floor: FeatureId,
    pub closed: FeatureId,
    pub open: FeatureId,
    pub broken: FeatureId,
    pub less: FeatureId,
    pub more: FeatureId,
    pub secret: FeatureId,
    pub rubble: FeatureId,
    pub pass_rubble: FeatureId,
    pub magma: FeatureId,
    pub quartz: FeatureId,
    pub magma_k: FeatureId,
    pub quartz_k: FeatureId,
    pub granite: FeatureId,
    pub perm: FeatureId,
    pub lava: FeatureId,
    /// Shop entrances in shop-number order
    pub shops: Vec<FeatureId>,
}

/// The loaded terrain table
#[derive(Debug, Clone)]
pub struct FeatureTable {
    features: Vec<Feature>,
    by_name: HashMap<String, FeatureId>,
    pub feats: Feats,
}

const BUILTIN_TERRAIN: &str = include_str!("../data/terrain.json");

impl FeatureTable {
    /// The terrain table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_TERRAIN)
    }

    /// Load a terrain table from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = read_data_file(path)?;
        Self::from_json(&contents)
    }

    /// Parse a terrain table and resolve the well-known ids
    pub fn from_json(contents: &str) -> Result<Self> {
        let records: Vec<FeatureRecord> = serde_json::from_str(contents)?;
        if records.len() > u16::MAX as usize {
            return Err(DungeonError::Data("too many terrain features".into()));
        }

        let mut by_name = HashMap::new();
        for (i, rec) in records.iter().enumerate() {
            if by_name.insert(rec.name.clone(), FeatureId(i as u16)).is_some() {
                return Err(DungeonError::Data(format!("duplicate terrain '{}'", rec.name)));
            }
        }

        let mut features = Vec::with_capacity(records.len());
        for (i, rec) in records.into_iter().enumerate() {
            let fidx = FeatureId(i as u16);
            let mut flags = TerrainFlags::empty();
            for name in &rec.flags {
                let flag = TerrainFlags::from_name(name).ok_or_else(|| {
                    DungeonError::Data(format!("unknown terrain flag '{}' on '{}'", name, rec.name))
                })?;
                flags |= flag;
            }
            let mimic = match &rec.mimic {
                Some(m) => *by_name
                    .get(m)
                    .ok_or_else(|| DungeonError::UnknownFeature(m.clone()))?,
                None => fidx,
            };
            features.push(Feature {
                fidx,
                name: rec.name,
                mimic,
                flags,
                glyph: rec.glyph,
                priority: rec.priority,
                shop: rec.shop,
            });
        }

        let feats = resolve_feats(&by_name, &features)?;
        Ok(Self {
            features,
            by_name,
            feats,
        })
    }

    /// Look up a feature id by name
    pub fn lookup(&self, name: &str) -> Result<FeatureId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| DungeonError::UnknownFeature(name.to_string()))
    }

    pub fn get(&self, fidx: FeatureId) -> Option<&Feature> {
        self.features.get(fidx.index())
    }

    /// Flags of a feature; unknown ids have none
    pub fn flags(&self, fidx: FeatureId) -> TerrainFlags {
        self.features
            .get(fidx.index())
            .map(|f| f.flags)
            .unwrap_or_default()
    }

    pub fn has(&self, fidx: FeatureId, flag: TerrainFlags) -> bool {
        self.flags(fidx).contains(flag)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn is_valid(&self, fidx: FeatureId) -> bool {
        fidx.index() < self.features.len()
    }

    /// Shop entrance feature for a shop number (1-based)
    pub fn shop_feature(&self, shop: u8) -> Option<FeatureId> {
        self.features
            .iter()
            .find(|f| f.shop == Some(shop))
            .map(|f| f.fidx)
    }

    // Feature classes used by the generator and predicates

    pub fn is_floor(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::FLOOR)
    }

    pub fn is_wall(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::WALL)
    }

    pub fn is_projectable(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::PROJECT)
    }

    pub fn is_passable(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::PASSABLE)
    }

    pub fn is_bright(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::BRIGHT)
    }

    pub fn is_smooth(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::SMOOTH)
    }

    pub fn is_shop(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::SHOP)
    }

    pub fn is_granite(&self, fidx: FeatureId) -> bool {
        let flags = self.flags(fidx);
        flags.contains(TerrainFlags::GRANITE) && !flags.contains(TerrainFlags::DOOR_ANY)
    }

    pub fn is_magma(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::MAGMA)
    }

    pub fn is_quartz(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::QUARTZ)
    }

    pub fn is_trap_holding(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::TRAP)
    }

    pub fn is_object_holding(&self, fidx: FeatureId) -> bool {
        self.has(fidx, TerrainFlags::OBJECT)
    }
}

fn resolve_feats(by_name: &HashMap<String, FeatureId>, features: &[Feature]) -> Result<Feats> {
    let get = |name: &str| {
        by_name
            .get(name)
            .copied()
            .ok_or_else(|| DungeonError::UnknownFeature(name.to_string()))
    };

    let mut shops: Vec<(u8, FeatureId)> = features
        .iter()
        .filter_map(|f| f.shop.map(|s| (s, f.fidx)))
        .collect();
    shops.sort();

    Ok(Feats {
        none: get("unknown grid")?,
        floor: get("open floor")?,
        closed: get("closed door")?,
        open: get("open door")?,
        broken: get("broken door")?,
        less: get("up staircase")?,
        more: get("down staircase")?,
        secret: get("secret door")?,
        rubble: get("pile of rubble")?,
        pass_rubble: get("passable rubble")?,
        magma: get("magma vein")?,
        quartz: get("quartz vein")?,
        magma_k: get("magma vein with treasure")?,
        quartz_k: get("quartz vein with treasure")?,
        granite: get("granite wall")?,
        perm: get("permanent wall")?,
        lava: get("lava stream")?,
        shops: shops.into_iter().map(|(_, f)| f).collect(),
    })
}

// Manual serde impl for TerrainFlags
impl Serialize for TerrainFlags {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TerrainFlags {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(TerrainFlags::from_bits_truncate(bits))
    }
}
