//! Generation and visibility configuration
//!
//! Handles the tunable limits used by the generator and the view code, and
//! loading them from a JSON file or `key=value` overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::errors::{read_data_file, DungeonError, Result};
use crate::consts;

/// A level whose guardian must be placed when the level is generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub depth: i32,
    /// Race name of the guardian
    pub race: String,
}

/// Tunable limits for level generation and visibility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    // Visibility
    pub max_sight: i32,
    pub max_range: i32,

    // Level sizes
    pub dungeon_hgt: i32,
    pub dungeon_wid: i32,
    pub town_hgt: i32,
    pub town_wid: i32,
    pub max_depth: i32,

    // Population limits
    pub level_monster_max: usize,
    pub level_object_max: usize,
    pub min_m_alloc_level: i32,

    // Level feeling
    pub feeling_need: i32,

    // Generation control
    pub max_generation_attempts: u32,
    pub persistent_levels: bool,
    pub town_seed: u64,
    /// Force a cave profile by name instead of rolling one
    pub force_profile: Option<String>,
    pub quests: Vec<Quest>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            max_sight: consts::MAX_SIGHT,
            max_range: 20,

            dungeon_hgt: consts::DUNGEON_HGT,
            dungeon_wid: consts::DUNGEON_WID,
            town_hgt: consts::TOWN_HGT,
            town_wid: consts::TOWN_WID,
            max_depth: consts::MAX_DEPTH,

            level_monster_max: 1024,
            level_object_max: 1024,
            min_m_alloc_level: 14,

            feeling_need: consts::FEELING_NEED,

            max_generation_attempts: 100,
            persistent_levels: false,
            town_seed: 0x5eed_7041,
            force_profile: None,
            quests: vec![
                Quest {
                    depth: 99,
                    race: "Sauron, the Sorcerer".to_string(),
                },
                Quest {
                    depth: 100,
                    race: "Morgoth, Lord of Darkness".to_string(),
                },
            ],
        }
    }
}

impl GenConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = read_data_file(path)?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string; missing keys keep defaults
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: GenConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply one `key=value` override
    pub fn apply_override(&mut self, opt: &str) -> Result<()> {
        let (key, value) = opt
            .split_once('=')
            .or_else(|| opt.split_once(':'))
            .ok_or_else(|| DungeonError::Data(format!("expected key=value, got '{opt}'")))?;
        let key = key.trim();
        let value = value.trim();

        match key {
            "max_sight" => self.max_sight = parse_num(key, value)?,
            "max_range" => self.max_range = parse_num(key, value)?,
            "dungeon_hgt" => self.dungeon_hgt = parse_num(key, value)?,
            "dungeon_wid" => self.dungeon_wid = parse_num(key, value)?,
            "town_hgt" => self.town_hgt = parse_num(key, value)?,
            "town_wid" => self.town_wid = parse_num(key, value)?,
            "max_depth" => self.max_depth = parse_num(key, value)?,
            "level_monster_max" => self.level_monster_max = parse_num(key, value)?,
            "level_object_max" => self.level_object_max = parse_num(key, value)?,
            "min_m_alloc_level" => self.min_m_alloc_level = parse_num(key, value)?,
            "feeling_need" => self.feeling_need = parse_num(key, value)?,
            "max_generation_attempts" => self.max_generation_attempts = parse_num(key, value)?,
            "town_seed" => self.town_seed = parse_num(key, value)?,
            "persistent_levels" => {
                self.persistent_levels = match value {
                    "true" | "yes" | "1" => true,
                    "false" | "no" | "0" => false,
                    _ => return Err(DungeonError::Data(format!("bad boolean for {key}: {value}"))),
                }
            }
            "force_profile" => {
                self.force_profile = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            _ => return Err(DungeonError::Data(format!("unknown option '{key}'"))),
        }

        self.validate()
    }

    /// Is this depth guarded by a quest monster?
    pub fn is_quest(&self, depth: i32) -> bool {
        self.quests.iter().any(|q| q.depth == depth)
    }

    /// Reject configurations the generator cannot work with
    pub fn validate(&self) -> Result<()> {
        // Rooms need at least a few blocks each way
        if self.dungeon_hgt < 3 * consts::BLOCK_HGT || self.dungeon_wid < 3 * consts::BLOCK_WID {
            return Err(DungeonError::Data(format!(
                "dungeon size {}x{} is too small",
                self.dungeon_hgt, self.dungeon_wid
            )));
        }
        // Town needs room for two rows of shops
        if self.town_hgt < 20 || self.town_wid < 60 {
            return Err(DungeonError::Data(format!(
                "town size {}x{} is too small",
                self.town_hgt, self.town_wid
            )));
        }
        if self.max_sight < 1 || self.max_sight > consts::MAX_SIGHT * 2 {
            return Err(DungeonError::Data(format!("max_sight {} out of range", self.max_sight)));
        }
        if self.max_generation_attempts == 0 {
            return Err(DungeonError::Data("max_generation_attempts must be positive".into()));
        }
        Ok(())
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| DungeonError::Data(format!("bad value for {key}: {value}")))
}
