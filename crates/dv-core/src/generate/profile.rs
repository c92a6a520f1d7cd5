//! Cave, room, tunnel and streamer profiles
//!
//! A cave profile bundles everything one level style needs: how many rooms
//! to try, which room builders it may use and how often, and how its
//! corridors and mineral veins look.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::rng::GameRng;
use crate::world::GenConfig;

/// Level builder
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CaveKind {
    Town,
    Labyrinth,
    Cavern,
    Classic,
    /// Classic layout with only plain rooms; never rolled, only forced
    Simple,
}

/// Corridor shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelProfile {
    pub name: String,
    /// Percent chance of a random direction change
    pub rnd: i32,
    /// Percent chance of turning towards the target
    pub chg: i32,
    /// Percent chance of carrying on through an existing corridor
    pub con: i32,
    /// Percent chance of a door where a corridor pierces a room wall
    pub pen: i32,
    /// Percent chance of a door at a corridor junction
    pub jct: i32,
}

impl Default for TunnelProfile {
    fn default() -> Self {
        Self {
            name: "tunnel-default".to_string(),
            rnd: 10,
            chg: 30,
            con: 15,
            pen: 25,
            jct: 50,
        }
    }
}

/// Mineral vein layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamerProfile {
    pub name: String,
    /// Grids changed per step
    pub den: i32,
    /// Width of the vein
    pub rng: i32,
    /// Number of magma veins
    pub mag: i32,
    /// One in this many magma grids holds treasure
    pub mc: i32,
    /// Number of quartz veins
    pub qua: i32,
    /// One in this many quartz grids holds treasure
    pub qc: i32,
}

impl Default for StreamerProfile {
    fn default() -> Self {
        Self {
            name: "streamer-default".to_string(),
            den: 5,
            rng: 2,
            mag: 3,
            mc: 90,
            qua: 2,
            qc: 40,
        }
    }
}

/// Room builder
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Simple,
    Circular,
    Overlap,
    Crossed,
    Large,
    Nest,
    Pit,
    Template,
    LesserVault,
    MediumVault,
    GreaterVault,
    Huge,
    Chambers,
}

/// One entry of a cave profile's room table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomProfile {
    pub name: String,
    pub kind: RoomKind,
    /// Height in blocks
    pub height: i32,
    /// Width in blocks
    pub width: i32,
    /// Minimum depth
    pub level: i32,
    /// Counts against the pit/nest limit
    pub pit: bool,
    /// Rarity tier this room needs
    pub rarity: i32,
    /// Percent cutoff for the key roll
    pub cutoff: i32,
}

impl RoomProfile {
    fn new(name: &str, kind: RoomKind, (height, width): (i32, i32), level: i32, rarity: i32, cutoff: i32) -> Self {
        Self {
            name: name.to_string(),
            kind,
            height,
            width,
            level,
            pit: matches!(kind, RoomKind::Pit | RoomKind::Nest),
            rarity,
            cutoff,
        }
    }
}

/// A level style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaveProfile {
    pub name: String,
    pub kind: CaveKind,
    /// Rooms attempted on a full-size level
    pub dun_rooms: i32,
    /// Roll against this for rarer rooms
    pub dun_unusual: i32,
    /// Highest rarity tier
    pub max_rarity: i32,
    #[serde(default)]
    pub tun: TunnelProfile,
    #[serde(default)]
    pub str: StreamerProfile,
    #[serde(default)]
    pub room_profiles: Vec<RoomProfile>,
    /// Chance out of 100 of picking this profile in a weighted roll
    pub cutoff: i32,
}

impl CaveProfile {
    fn plain(name: &str, kind: CaveKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            dun_rooms: 0,
            dun_unusual: 0,
            max_rarity: 0,
            tun: TunnelProfile::default(),
            str: StreamerProfile::default(),
            room_profiles: Vec::new(),
            cutoff: 0,
        }
    }
}

/// Room table of the classic profile, rarest first
fn classic_rooms() -> Vec<RoomProfile> {
    use RoomKind::*;
    vec![
        RoomProfile::new("greater vault", GreaterVault, (4, 6), 10, 1, 100),
        RoomProfile::new("medium vault", MediumVault, (2, 4), 5, 2, 10),
        RoomProfile::new("lesser vault", LesserVault, (2, 3), 5, 2, 25),
        RoomProfile::new("huge", Huge, (3, 6), 40, 2, 40),
        RoomProfile::new("chambers", Chambers, (2, 4), 10, 2, 50),
        RoomProfile::new("pit", Pit, (1, 2), 5, 1, 8),
        RoomProfile::new("nest", Nest, (1, 3), 5, 1, 12),
        RoomProfile::new("large", Large, (1, 3), 3, 1, 25),
        RoomProfile::new("template", Template, (2, 3), 5, 1, 50),
        RoomProfile::new("crossed", Crossed, (2, 3), 3, 1, 60),
        RoomProfile::new("circular", Circular, (2, 2), 1, 1, 75),
        RoomProfile::new("overlap", Overlap, (1, 3), 1, 1, 100),
        RoomProfile::new("simple", Simple, (1, 3), 1, 0, 100),
    ]
}

/// The built-in cave profiles
pub fn builtin_profiles() -> Vec<CaveProfile> {
    let classic = CaveProfile {
        dun_rooms: 50,
        dun_unusual: 200,
        max_rarity: 2,
        room_profiles: classic_rooms(),
        cutoff: 100,
        ..CaveProfile::plain("classic", CaveKind::Classic)
    };
    let simple = CaveProfile {
        dun_rooms: 50,
        dun_unusual: 200,
        max_rarity: 0,
        room_profiles: vec![RoomProfile::new("simple", RoomKind::Simple, (1, 3), 1, 0, 100)],
        ..CaveProfile::plain("simple", CaveKind::Simple)
    };
    vec![
        CaveProfile::plain("town", CaveKind::Town),
        CaveProfile::plain("labyrinth", CaveKind::Labyrinth),
        CaveProfile::plain("cavern", CaveKind::Cavern),
        classic,
        simple,
    ]
}

/// Should this level be a labyrinth?
///
/// Deeper levels are more likely, with a bonus on depths divisible by small
/// primes. Quest levels never are.
pub fn labyrinth_check(rng: &mut GameRng, depth: i32, config: &GenConfig) -> bool {
    if config.is_quest(depth) || depth < 13 {
        return false;
    }
    let mut chance = 2;
    for m in [3, 5, 7, 11, 13] {
        if depth % m == 0 {
            chance += 1;
        }
    }
    rng.randint0(100) < chance
}

/// Should this level try to be a cavern?
pub fn cavern_check(rng: &mut GameRng, depth: i32) -> bool {
    depth >= 15 && rng.one_in(10)
}

/// Find a profile by name
pub fn find_profile<'a>(profiles: &'a [CaveProfile], name: &str) -> Option<&'a CaveProfile> {
    profiles.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_builtin_profiles() {
        let profiles = builtin_profiles();
        let classic = find_profile(&profiles, "classic").unwrap();
        assert_eq!(classic.kind, CaveKind::Classic);
        assert_eq!(classic.room_profiles.len(), 13);
        assert_eq!(classic.room_profiles[0].kind, RoomKind::GreaterVault);
        let pits: Vec<_> = classic.room_profiles.iter().filter(|r| r.pit).collect();
        assert_eq!(pits.len(), 2);
        assert!(find_profile(&profiles, "moria").is_none());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(CaveKind::from_str("labyrinth").unwrap(), CaveKind::Labyrinth);
        assert_eq!(RoomKind::GreaterVault.to_string(), "greater_vault");
        assert_eq!(RoomKind::from_str("chambers").unwrap(), RoomKind::Chambers);
    }

    #[test]
    fn test_labyrinth_check() {
        let config = GenConfig::default();
        let mut rng = GameRng::new(5);
        for _ in 0..100 {
            assert!(!labyrinth_check(&mut rng, 12, &config));
            assert!(!labyrinth_check(&mut rng, 99, &config));
        }
        // 3 * 5 * 7 = 105: 5% chance
        let hits = (0..10_000)
            .filter(|_| labyrinth_check(&mut rng, 105, &config))
            .count();
        assert!(hits > 300 && hits < 700, "hits = {hits}");
    }

    #[test]
    fn test_profile_json() {
        let json = serde_json::to_string(&builtin_profiles()).unwrap();
        let back: Vec<CaveProfile> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, builtin_profiles());
    }
}
