//! Object kinds and classes

use serde::{Deserialize, Serialize};
use std::path::Path;
use strum::{Display, EnumIter, EnumString};

use crate::world::errors::{read_data_file, Result};

/// Object class
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Tval {
    #[default]
    Food,
    Flask,
    Light,
    Sword,
    Hafted,
    Polearm,
    Bow,
    Armour,
    Shield,
    Helm,
    Boots,
    Potion,
    Scroll,
    Wand,
    Rod,
    Staff,
    Ring,
    Amulet,
    Book,
    Chest,
    Gold,
}

impl Tval {
    /// Display symbol for this class
    pub const fn symbol(&self) -> char {
        match self {
            Tval::Food => ',',
            Tval::Flask => '!',
            Tval::Light => '~',
            Tval::Sword => '|',
            Tval::Hafted => '\\',
            Tval::Polearm => '/',
            Tval::Bow => '}',
            Tval::Armour => '[',
            Tval::Shield => ')',
            Tval::Helm => ']',
            Tval::Boots => ']',
            Tval::Potion => '!',
            Tval::Scroll => '?',
            Tval::Wand => '-',
            Tval::Rod => '-',
            Tval::Staff => '_',
            Tval::Ring => '=',
            Tval::Amulet => '"',
            Tval::Book => '?',
            Tval::Chest => '~',
            Tval::Gold => '$',
        }
    }

    pub const fn is_weapon(&self) -> bool {
        matches!(self, Tval::Sword | Tval::Hafted | Tval::Polearm | Tval::Bow)
    }
}

/// Index into the kind table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindId(pub u16);

/// An object template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectKind {
    #[serde(skip)]
    pub kidx: Option<KindId>,
    pub name: String,
    pub tval: Tval,
    pub level: i32,
    pub cost: i32,
    /// Allocation weight (0 = never generated at random)
    #[serde(default)]
    pub alloc: i32,
}

/// All object kinds
#[derive(Debug, Clone)]
pub struct KindTable {
    kinds: Vec<ObjectKind>,
}

const BUILTIN_OBJECTS: &str = include_str!("../data/objects.json");

impl KindTable {
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_OBJECTS)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = read_data_file(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let mut kinds: Vec<ObjectKind> = serde_json::from_str(contents)?;
        for (i, kind) in kinds.iter_mut().enumerate() {
            kind.kidx = Some(KindId(i as u16));
        }
        Ok(Self { kinds })
    }

    pub fn get(&self, kidx: KindId) -> Option<&ObjectKind> {
        self.kinds.get(kidx.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (KindId, &ObjectKind)> {
        self.kinds
            .iter()
            .enumerate()
            .map(|(i, k)| (KindId(i as u16), k))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds() {
        let kinds = KindTable::builtin().unwrap();
        assert!(kinds.len() > 30);
        let gold: Vec<_> = kinds.iter().filter(|(_, k)| k.tval == Tval::Gold).collect();
        assert!(!gold.is_empty());
        assert!(gold.iter().all(|(_, k)| k.alloc == 0));
        assert_eq!(Tval::Gold.symbol(), '$');
        assert!(Tval::Sword.is_weapon());
    }
}
