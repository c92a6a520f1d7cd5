//! Level generation
//!
//! A level is built in one attempt by a cave profile's builder (town,
//! labyrinth, cavern or classic rooms-and-corridors), then checked. An
//! attempt that overflows the monster or object limits, or that a builder
//! rejects, is thrown away whole and generation starts again from scratch.
//!
//! All scratch state of an attempt lives in a [`GenerationContext`] that is
//! threaded through the builders.

pub mod blueprint;
mod cavern;
mod chambers;
mod classic;
mod labyrinth;
pub mod pit;
pub mod populate;
pub mod profile;
pub mod room;
pub mod starburst;
mod town;
pub mod tunnel;
pub mod util;

pub use blueprint::{Blueprint, RoomTemplate, Vault, VaultKind};
pub use pit::{PitKind, PitProfile};
pub use populate::{BasicPopulator, Populator, RaceFilter};
pub use profile::{builtin_profiles, CaveKind, CaveProfile, RoomKind, RoomProfile};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::consts::{BLOCK_HGT, BLOCK_WID, CENT_MAX, FEELING_TOTAL};
use crate::dungeon::{Chunk, FeatureTable, Loc, Rect, SquareFlags};
use crate::object::Origin;
use crate::player::Player;
use crate::rng::GameRng;
use crate::world::errors::{DungeonError, Result};
use crate::world::GenConfig;

/// Data the generator reads but never changes
#[derive(Debug, Clone)]
pub struct GenData {
    pub terrain: Arc<FeatureTable>,
    pub profiles: Vec<CaveProfile>,
    pub templates: Vec<RoomTemplate>,
    pub vaults: Vec<Vault>,
    pub pits: Vec<PitProfile>,
}

impl GenData {
    /// Everything shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::with_terrain(Arc::new(FeatureTable::builtin()?))
    }

    /// Built-in rooms and profiles over a caller-supplied terrain table
    pub fn with_terrain(terrain: Arc<FeatureTable>) -> Result<Self> {
        Ok(Self {
            terrain,
            profiles: builtin_profiles(),
            templates: blueprint::builtin_templates()?,
            vaults: blueprint::builtin_vaults()?,
            pits: pit::builtin_pits()?,
        })
    }

    /// Built-in data with any of `terrain.json`, `room_template.txt`,
    /// `vault.txt` and `pit.json` found in `dir` used instead
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let terrain = match existing(dir, "terrain.json") {
            Some(path) => FeatureTable::load_from_file(&path)?,
            None => FeatureTable::builtin()?,
        };
        let mut data = Self::with_terrain(Arc::new(terrain))?;
        if let Some(path) = existing(dir, "room_template.txt") {
            data.templates = blueprint::load_templates(&path)?;
        }
        if let Some(path) = existing(dir, "vault.txt") {
            data.vaults = blueprint::load_vaults(&path)?;
        }
        if let Some(path) = existing(dir, "pit.json") {
            data.pits = pit::load_pits(&path)?;
        }
        Ok(data)
    }

    pub fn profile(&self, name: &str) -> Option<&CaveProfile> {
        profile::find_profile(&self.profiles, name)
    }
}

fn existing(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        debug!("Using {}", path.display());
        Some(path)
    } else {
        None
    }
}

/// What the caller wants from a new level besides its depth
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelRequest {
    /// Game turn, for the town's day/night cycle
    pub turn: u64,
    /// Staircase position the new level must connect to (persistent levels)
    pub join: Option<Loc>,
}

/// Why a generation attempt was thrown away
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("no rooms could be built")]
    NoRooms,
    #[error("no starting square for the player")]
    NoPlayerSpot,
    #[error("the cavern builder declined the level")]
    CavernDeclined,
    #[error("{count} monsters exceeds the limit of {max}")]
    TooManyMonsters { count: usize, max: usize },
    #[error("{count} objects exceeds the limit of {max}")]
    TooManyObjects { count: usize, max: usize },
}

/// Result of one builder attempt
pub type Attempt = core::result::Result<Chunk, Rejected>;

/// Scratch state of one generation attempt
pub struct GenerationContext<'a> {
    pub data: &'a GenData,
    pub config: &'a GenConfig,
    pub rng: &'a mut GameRng,
    pub pop: &'a mut dyn Populator,
    pub player: &'a mut Player,
    pub profile: CaveProfile,
    pub depth: i32,
    pub turn: u64,
    pub join: Option<Loc>,

    /// Room centres, in build order
    pub cent: Vec<Loc>,
    /// Tunnel junctions that may get doors
    pub door: Vec<Loc>,
    /// Room wall piercings made by the current tunnel
    pub wall: Vec<Loc>,
    /// Grids of the current tunnel
    pub tunn: Vec<Loc>,

    /// Block grid size
    pub row_blocks: i32,
    pub col_blocks: i32,
    room_map: Vec<bool>,
    /// Block rectangles handed out so far
    pub reserved: Vec<Rect>,

    pub pit_num: i32,
    /// Pit profile chosen for the pit or nest being built
    pub pit_type: Option<usize>,

    /// The level map should start out known
    pub known_map: bool,
    /// Town lighting to apply once the player's memory exists
    pub daytime: Option<bool>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        data: &'a GenData,
        config: &'a GenConfig,
        rng: &'a mut GameRng,
        pop: &'a mut dyn Populator,
        player: &'a mut Player,
        profile: CaveProfile,
    ) -> Self {
        let depth = player.depth;
        Self {
            data,
            config,
            rng,
            pop,
            player,
            profile,
            depth,
            turn: 0,
            join: None,
            cent: Vec::new(),
            door: Vec::new(),
            wall: Vec::new(),
            tunn: Vec::new(),
            row_blocks: 0,
            col_blocks: 0,
            room_map: Vec::new(),
            reserved: Vec::new(),
            pit_num: 0,
            pit_type: None,
            known_map: false,
            daytime: None,
        }
    }

    /// Fresh chunk for this attempt, filled with `none` terrain
    pub fn new_chunk(&self, height: i32, width: i32) -> Chunk {
        let mut c = Chunk::new(height, width, Arc::clone(&self.data.terrain));
        c.depth = self.depth;
        c.turn = self.turn;
        c
    }

    /// Set up an empty block map for a chunk of the given size
    pub fn init_blocks(&mut self, height: i32, width: i32) {
        self.row_blocks = height / BLOCK_HGT;
        self.col_blocks = width / BLOCK_WID;
        self.room_map = vec![false; (self.row_blocks * self.col_blocks).max(0) as usize];
        self.reserved.clear();
    }

    pub fn is_reserved(&self, by: i32, bx: i32) -> bool {
        if by < 0 || bx < 0 || by >= self.row_blocks || bx >= self.col_blocks {
            return true;
        }
        self.room_map[(by * self.col_blocks + bx) as usize]
    }

    /// Is every block in `by1..by2` x `bx1..bx2` inside the map and free?
    pub fn blocks_free(&self, by1: i32, bx1: i32, by2: i32, bx2: i32) -> bool {
        if by1 < 0 || bx1 < 0 || by2 > self.row_blocks || bx2 > self.col_blocks {
            return false;
        }
        (by1..by2).all(|by| (bx1..bx2).all(|bx| !self.is_reserved(by, bx)))
    }

    /// Reserve blocks `by1..by2` x `bx1..bx2`
    pub fn reserve(&mut self, by1: i32, bx1: i32, by2: i32, bx2: i32) {
        for by in by1..by2 {
            for bx in bx1..bx2 {
                if by >= 0 && bx >= 0 && by < self.row_blocks && bx < self.col_blocks {
                    self.room_map[(by * self.col_blocks + bx) as usize] = true;
                }
            }
        }
        self.reserved.push(Rect::new(by1, bx1, by2 - 1, bx2 - 1));
    }

    /// Remember a room centre for tunnelling
    pub fn add_centre(&mut self, grid: Loc) {
        if self.cent.len() < CENT_MAX {
            self.cent.push(grid);
        }
    }

    pub fn is_quest_level(&self) -> bool {
        self.config.is_quest(self.depth)
    }
}

/// A finished level and how it was made
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub chunk: Chunk,
    /// Name of the cave profile used
    pub profile: String,
    /// Attempts it took, counting the successful one
    pub attempts: u32,
    /// Room centres of the accepted attempt
    pub centres: Vec<Loc>,
    /// Block rectangles reserved by rooms of the accepted attempt
    pub reserved: Vec<Rect>,
    /// The player should start out knowing the map
    pub known_map: bool,
    /// Town lighting: `Some(true)` by day, `Some(false)` by night
    pub daytime: Option<bool>,
}

/// Pick the cave profile for a depth
pub fn choose_profile(data: &GenData, config: &GenConfig, rng: &mut GameRng, depth: i32) -> CaveProfile {
    let named = |name: &str| data.profile(name).cloned();
    let forced = config.force_profile.as_deref().and_then(named);

    let chosen = if let Some(profile) = forced {
        Some(profile)
    } else if depth == 0 {
        named("town")
    } else if profile::labyrinth_check(rng, depth, config) {
        named("labyrinth")
    } else if profile::cavern_check(rng, depth) {
        named("cavern")
    } else {
        // Weighted roll over the remaining profiles
        let pick = rng.randint0(100);
        data.profiles
            .iter()
            .filter(|p| p.cutoff > 0)
            .find(|p| pick < p.cutoff)
            .cloned()
    };
    chosen.unwrap_or_else(|| {
        data.profiles
            .iter()
            .find(|p| p.kind == CaveKind::Classic)
            .cloned()
            .unwrap_or_else(|| profile::builtin_profiles().swap_remove(3))
    })
}

/// Run one attempt of the profile's builder
fn build_attempt(ctx: &mut GenerationContext<'_>) -> Attempt {
    match ctx.profile.kind {
        CaveKind::Town => town::town_gen(ctx),
        CaveKind::Labyrinth => labyrinth::labyrinth_gen(ctx),
        CaveKind::Cavern => match cavern::cavern_gen(ctx) {
            Err(Rejected::CavernDeclined) => {
                // Fall back to a classic level in the same attempt
                if let Some(classic) = ctx.data.profiles.iter().find(|p| p.kind == CaveKind::Classic) {
                    ctx.profile = classic.clone();
                }
                classic::classic_gen(ctx)
            }
            other => other,
        },
        CaveKind::Classic | CaveKind::Simple => classic::classic_gen(ctx),
    }
}

/// Generate a level at the player's depth
///
/// Retries whole attempts until one passes the checks, up to
/// `max_generation_attempts`. The player is placed on the level.
pub fn generate_level(
    data: &GenData,
    config: &GenConfig,
    rng: &mut GameRng,
    pop: &mut dyn Populator,
    player: &mut Player,
    request: &LevelRequest,
) -> Result<GeneratedLevel> {
    let max = config.max_generation_attempts;
    let mut reason = String::from("no attempts made");

    for attempt in 1..=max {
        let profile = choose_profile(data, config, rng, player.depth);
        debug!("Generation attempt {attempt} at depth {} using '{}'", player.depth, profile.name);

        let mut ctx = GenerationContext::new(data, config, rng, pop, player, profile);
        ctx.turn = request.turn;
        ctx.join = request.join;

        let result = build_attempt(&mut ctx).and_then(|mut c| {
            place_quest_monsters(&mut ctx, &mut c);
            c.info_off_all(SquareFlags::GENERATION);
            validate(&c, config).map(|()| c)
        });

        match result {
            Ok(mut c) => {
                if c.depth > 0 {
                    c.feeling = calc_obj_feeling(&c) + calc_mon_feeling(&c);
                    place_feeling(&mut c, ctx.rng);
                }
                info!(
                    "Generated '{}' level at depth {} after {attempt} attempt(s): {} monsters, {} objects",
                    ctx.profile.name,
                    c.depth,
                    c.monster_count(),
                    c.object_count()
                );
                return Ok(GeneratedLevel {
                    profile: ctx.profile.name.clone(),
                    attempts: attempt,
                    centres: std::mem::take(&mut ctx.cent),
                    reserved: std::mem::take(&mut ctx.reserved),
                    known_map: ctx.known_map,
                    daytime: ctx.daytime,
                    chunk: c,
                });
            }
            Err(rejected) => {
                warn!("Generation restarted: {rejected}");
                reason = rejected.to_string();
                ctx.player.grid = None;
            }
        }
    }

    Err(DungeonError::GenerationFailed {
        attempts: max,
        reason,
    })
}

/// Throw away levels with more inhabitants or treasure than allowed
fn validate(c: &Chunk, config: &GenConfig) -> core::result::Result<(), Rejected> {
    if c.monster_count() > config.level_monster_max {
        return Err(Rejected::TooManyMonsters {
            count: c.monster_count(),
            max: config.level_monster_max,
        });
    }
    if c.object_count() > config.level_object_max {
        return Err(Rejected::TooManyObjects {
            count: c.object_count(),
            max: config.level_object_max,
        });
    }
    Ok(())
}

/// Make sure the guardian of a quest level is on it
fn place_quest_monsters(ctx: &mut GenerationContext<'_>, c: &mut Chunk) {
    let Some(quest) = ctx.config.quests.iter().find(|q| q.depth == ctx.depth) else {
        return;
    };
    let Some(race) = ctx.pop.find_race(&quest.race) else {
        warn!("Quest monster '{}' is not a known race", quest.race);
        return;
    };
    if c.monsters().any(|(_, m)| m.race == race) {
        return;
    }
    for _ in 0..1000 {
        let Some(grid) = util::find_empty(c, ctx.rng) else {
            return;
        };
        if ctx.player.distance_to(grid) <= 10 || c.is_vault(grid) {
            continue;
        }
        if ctx.pop.place_monster(c, ctx.rng, grid, race, false, Origin::Drop).is_some() {
            debug!("Placed quest monster '{}' at {grid:?}", quest.race);
            return;
        }
    }
}

/// Object feeling from the depth-adjusted object rating, in tens
pub fn calc_obj_feeling(c: &Chunk) -> u16 {
    if c.depth <= 0 {
        return 0;
    }
    let x = c.obj_rating / c.depth as u32;

    if c.good_item && x < 641 {
        return 60;
    }
    match x {
        x if x > 16000 => 20,
        x if x > 4000 => 30,
        x if x > 1000 => 40,
        x if x > 250 => 50,
        x if x > 64 => 60,
        x if x > 16 => 70,
        x if x > 4 => 80,
        x if x > 1 => 90,
        _ => 100,
    }
}

/// Monster feeling from the depth-adjusted monster rating, 1 (deadly) to 9
pub fn calc_mon_feeling(c: &Chunk) -> u16 {
    if c.depth <= 0 {
        return 0;
    }
    let x = c.mon_rating / c.depth as u32;
    match x {
        x if x > 7000 => 1,
        x if x > 4500 => 2,
        x if x > 2500 => 3,
        x if x > 1500 => 4,
        x if x > 800 => 5,
        x if x > 400 => 6,
        x if x > 150 => 7,
        x if x > 50 => 8,
        _ => 9,
    }
}

/// Scatter the hidden squares that reveal the object feeling when walked on
pub fn place_feeling(c: &mut Chunk, rng: &mut GameRng) {
    for _ in 0..FEELING_TOTAL {
        for _ in 0..500 {
            let grid = Loc::new(rng.randint0(c.height), rng.randint0(c.width));
            if !c.is_floor(grid) || c.is_feel(grid) {
                continue;
            }
            c.info_on(grid, SquareFlags::FEEL);
            break;
        }
    }
    c.feeling_squares = 0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> GenData {
        GenData::builtin().unwrap()
    }

    #[test]
    fn test_load_dir_without_files_is_builtin() {
        let builtin = data();
        let loaded = GenData::load_dir(Path::new("/nonexistent/delve-data")).unwrap();
        assert_eq!(loaded.terrain.len(), builtin.terrain.len());
        assert_eq!(loaded.vaults.len(), builtin.vaults.len());
        assert_eq!(loaded.templates.len(), builtin.templates.len());
        assert_eq!(loaded.pits.len(), builtin.pits.len());
    }

    #[test]
    fn test_choose_profile_by_depth() {
        let data = data();
        let config = GenConfig::default();
        let mut rng = GameRng::new(3);
        assert_eq!(choose_profile(&data, &config, &mut rng, 0).kind, CaveKind::Town);
        for _ in 0..50 {
            // Too shallow for labyrinths and caverns
            assert_eq!(choose_profile(&data, &config, &mut rng, 5).kind, CaveKind::Classic);
        }
    }

    #[test]
    fn test_forced_profile() {
        let data = data();
        let config = GenConfig {
            force_profile: Some("labyrinth".to_string()),
            ..GenConfig::default()
        };
        let mut rng = GameRng::new(3);
        assert_eq!(choose_profile(&data, &config, &mut rng, 1).kind, CaveKind::Labyrinth);
    }

    #[test]
    fn test_feelings() {
        let mut c = Chunk::new(5, 5, Arc::new(FeatureTable::builtin().unwrap()));
        c.depth = 10;
        assert_eq!(calc_obj_feeling(&c), 100);
        assert_eq!(calc_mon_feeling(&c), 9);
        c.obj_rating = 50_000;
        c.mon_rating = 90_000;
        assert_eq!(calc_obj_feeling(&c), 40);
        assert_eq!(calc_mon_feeling(&c), 1);
        c.depth = 0;
        assert_eq!(calc_obj_feeling(&c), 0);
    }

    #[test]
    fn test_place_feeling_marks_floor_only() {
        let mut c = Chunk::new(12, 12, Arc::new(FeatureTable::builtin().unwrap()));
        let floor = c.feats().floor;
        for g in Rect::new(2, 2, 9, 9).grids() {
            c.set_feat(g, floor);
        }
        let mut rng = GameRng::new(9);
        place_feeling(&mut c, &mut rng);
        let feel: Vec<Loc> = c.grids().filter(|&g| c.is_feel(g)).collect();
        assert!(!feel.is_empty());
        assert!(feel.iter().all(|&g| c.is_floor(g)));
    }

    #[test]
    fn test_block_reservation() {
        let data = data();
        let config = GenConfig::default();
        let mut rng = GameRng::new(1);
        let mut pop = BasicPopulator::builtin(128).unwrap();
        let mut player = Player::new();
        let profile = choose_profile(&data, &config, &mut rng, 1);
        let mut ctx = GenerationContext::new(&data, &config, &mut rng, &mut pop, &mut player, profile);
        ctx.init_blocks(66, 198);
        assert_eq!((ctx.row_blocks, ctx.col_blocks), (6, 18));
        assert!(ctx.blocks_free(0, 0, 2, 3));
        ctx.reserve(0, 0, 2, 3);
        assert!(!ctx.blocks_free(1, 2, 2, 4));
        assert!(ctx.blocks_free(2, 0, 3, 3));
        assert!(!ctx.blocks_free(5, 17, 7, 18));
        assert_eq!(ctx.reserved, vec![Rect::new(0, 0, 1, 2)]);
    }
}
