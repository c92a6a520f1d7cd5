//! Room templates and vaults drawn from ASCII blueprints
//!
//! Blueprint files are line based. `name:` starts an entry, `D:` lines give
//! the rows of the picture and the other `key:value` lines describe the
//! entry. Each picture character is looked up in a symbol table; a space
//! leaves the chunk alone.

use log::debug;
use std::path::Path;
use std::str::FromStr;
use strum::{Display, EnumString};

use super::room::centre_or_space;
use super::util::{
    place_feat, place_object, place_random_stairs, place_rubble, place_secret_door, place_stairs,
    set_marked_granite, vault_monsters, vault_objects, vault_traps,
};
use super::GenerationContext;
use crate::dungeon::{Chunk, Loc, SquareFlags};
use crate::object::{Origin, Tval};
use crate::world::errors::{read_data_file, DungeonError, Result};

/// What a room template symbol stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSymbol {
    OuterWall,
    SolidWall,
    Floor,
    SecretDoor,
    /// Wall on half the layouts, floor on the rest
    OptionalWall,
    /// Door where optional walls stand
    LayoutDoor,
    /// Door where optional walls do not stand, wall otherwise
    OtherLayoutDoor,
    /// Door opened when the door roll reaches its number
    NumberedDoor(u8),
    /// Treasure or stairs, guarded and trapped
    Treasure,
    /// Monsters and objects nearby
    Interesting,
    /// Object of the template's class
    ClassObject,
}

pub const TEMPLATE_SYMBOLS: &[(char, TemplateSymbol)] = &[
    ('%', TemplateSymbol::OuterWall),
    ('#', TemplateSymbol::SolidWall),
    ('.', TemplateSymbol::Floor),
    ('+', TemplateSymbol::SecretDoor),
    ('x', TemplateSymbol::OptionalWall),
    ('(', TemplateSymbol::LayoutDoor),
    (')', TemplateSymbol::OtherLayoutDoor),
    ('1', TemplateSymbol::NumberedDoor(1)),
    ('2', TemplateSymbol::NumberedDoor(2)),
    ('3', TemplateSymbol::NumberedDoor(3)),
    ('4', TemplateSymbol::NumberedDoor(4)),
    ('5', TemplateSymbol::NumberedDoor(5)),
    ('6', TemplateSymbol::NumberedDoor(6)),
    ('8', TemplateSymbol::Treasure),
    ('9', TemplateSymbol::Interesting),
    ('[', TemplateSymbol::ClassObject),
];

/// What a vault symbol stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultSymbol {
    /// Outer wall, not part of the vault proper
    DoorStep,
    Wall,
    PermWall,
    Floor,
    SecretDoor,
    Trap,
    ObjectOrTrap,
    Rubble,
    /// Mineral vein with treasure
    GoldSeam,
    UpStairs,
    DownStairs,
    /// Monster this many levels out of depth
    Monster(i32),
    /// Each of a monster (+3) and an object (+7) half the time
    MonsterOrObject,
    /// Monster and a good object, each out of depth
    Guarded { monster: i32, object: i32, great: bool },
}

pub const VAULT_SYMBOLS: &[(char, VaultSymbol)] = &[
    ('%', VaultSymbol::DoorStep),
    ('#', VaultSymbol::Wall),
    ('@', VaultSymbol::PermWall),
    ('.', VaultSymbol::Floor),
    ('+', VaultSymbol::SecretDoor),
    ('^', VaultSymbol::Trap),
    ('&', VaultSymbol::ObjectOrTrap),
    (':', VaultSymbol::Rubble),
    ('*', VaultSymbol::GoldSeam),
    ('<', VaultSymbol::UpStairs),
    ('>', VaultSymbol::DownStairs),
    ('2', VaultSymbol::Monster(5)),
    ('6', VaultSymbol::Monster(11)),
    ('4', VaultSymbol::MonsterOrObject),
    (
        '9',
        VaultSymbol::Guarded {
            monster: 9,
            object: 7,
            great: false,
        },
    ),
    (
        '8',
        VaultSymbol::Guarded {
            monster: 40,
            object: 20,
            great: true,
        },
    ),
];

fn lookup<S: Copy>(table: &[(char, S)], ch: char) -> Option<S> {
    table.iter().find(|(c, _)| *c == ch).map(|&(_, s)| s)
}

/// A parsed picture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blueprint<S> {
    pub name: String,
    pub height: i32,
    pub width: i32,
    /// Row-major; `None` leaves the chunk untouched
    cells: Vec<Option<S>>,
}

impl<S: Copy> Blueprint<S> {
    /// Parse picture rows against a symbol table
    ///
    /// `rows` pairs each row with its line number for error reports. Short
    /// rows are padded with spaces.
    pub fn parse(name: &str, rows: &[(usize, &str)], table: &[(char, S)]) -> Result<Self> {
        let bad = |line, message: String| DungeonError::Blueprint {
            name: name.to_string(),
            line,
            message,
        };
        let Some(&(first, _)) = rows.first() else {
            return Err(bad(0, "no picture rows".to_string()));
        };

        let width = rows.iter().map(|(_, r)| r.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err(bad(first, "empty picture".to_string()));
        }

        let mut cells = Vec::with_capacity(rows.len() * width);
        for &(line, row) in rows {
            let mut n = 0;
            for ch in row.chars() {
                let cell = match ch {
                    ' ' => None,
                    _ => Some(lookup(table, ch).ok_or_else(|| bad(line, format!("unknown symbol '{ch}'")))?),
                };
                cells.push(cell);
                n += 1;
            }
            cells.extend(std::iter::repeat_n(None, width - n));
        }

        Ok(Self {
            name: name.to_string(),
            height: rows.len() as i32,
            width: width as i32,
            cells,
        })
    }

    pub fn get(&self, dy: i32, dx: i32) -> Option<S> {
        if dy < 0 || dx < 0 || dy >= self.height || dx >= self.width {
            return None;
        }
        self.cells[(dy * self.width + dx) as usize]
    }

    /// Every drawn cell as `(dy, dx, symbol)`
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, S)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, s)| s.map(|s| (i as i32 / width, i as i32 % width, s)))
    }

    /// Top-left grid when drawn around `centre`
    fn top_left(&self, centre: Loc) -> Loc {
        Loc::new(centre.y - self.height / 2, centre.x - self.width / 2)
    }

    /// Does the picture fit inside the chunk's outer wall around `centre`?
    fn fits(&self, c: &Chunk, centre: Loc) -> bool {
        let top = self.top_left(centre);
        c.in_bounds_fully(top) && c.in_bounds_fully(top.offset(self.height - 1, self.width - 1))
    }
}

/// A room drawn from a picture with random doors and layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTemplate {
    pub blueprint: Blueprint<TemplateSymbol>,
    /// Highest numbered door that can open
    pub doors: u8,
    /// Object class for `[` squares
    pub tval: Option<Tval>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum VaultKind {
    Lesser,
    Medium,
    Greater,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    pub blueprint: Blueprint<VaultSymbol>,
    pub kind: VaultKind,
    /// Added to the monster rating when built
    pub rating: u32,
    pub min_depth: i32,
    pub max_depth: i32,
}

/// One `name:` entry of a blueprint file
struct Entry<'a> {
    name: &'a str,
    line: usize,
    fields: Vec<(&'a str, &'a str, usize)>,
    rows: Vec<(usize, &'a str)>,
}

impl<'a> Entry<'a> {
    fn field(&self, key: &str) -> Option<(&'a str, usize)> {
        self.fields
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|&(_, v, line)| (v.trim(), line))
    }

    fn error(&self, line: usize, message: impl Into<String>) -> DungeonError {
        DungeonError::Blueprint {
            name: self.name.to_string(),
            line,
            message: message.into(),
        }
    }

    fn number<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.field(key) {
            None => Ok(None),
            Some((value, line)) => value
                .parse()
                .map(Some)
                .map_err(|_| self.error(line, format!("bad {key} '{value}'"))),
        }
    }
}

fn split_entries(text: &str) -> Result<Vec<Entry<'_>>> {
    let mut entries: Vec<Entry<'_>> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim_end();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            return Err(DungeonError::Blueprint {
                name: entries.last().map_or("", |e| e.name).to_string(),
                line,
                message: format!("expected 'key:value', found '{trimmed}'"),
            });
        };

        if key == "name" {
            entries.push(Entry {
                name: value.trim(),
                line,
                fields: Vec::new(),
                rows: Vec::new(),
            });
            continue;
        }
        let Some(entry) = entries.last_mut() else {
            return Err(DungeonError::Blueprint {
                name: String::new(),
                line,
                message: format!("'{key}' before the first name"),
            });
        };
        if key == "D" {
            entry.rows.push((line, value));
        } else {
            entry.fields.push((key, value, line));
        }
    }
    Ok(entries)
}

pub fn templates_from_text(text: &str) -> Result<Vec<RoomTemplate>> {
    split_entries(text)?
        .iter()
        .map(|e| {
            let doors = e.number::<u8>("doors")?.unwrap_or(1);
            if doors > 6 {
                return Err(e.error(e.line, format!("{doors} doors, at most 6 allowed")));
            }
            let tval = match e.field("tval") {
                None => None,
                Some((name, line)) => {
                    Some(Tval::from_str(name).map_err(|_| e.error(line, format!("unknown tval '{name}'")))?)
                }
            };
            Ok(RoomTemplate {
                blueprint: Blueprint::parse(e.name, &e.rows, TEMPLATE_SYMBOLS)?,
                doors,
                tval,
            })
        })
        .collect()
}

pub fn vaults_from_text(text: &str) -> Result<Vec<Vault>> {
    split_entries(text)?
        .iter()
        .map(|e| {
            let (kind, line) = e.field("type").ok_or_else(|| e.error(e.line, "missing type"))?;
            let kind = VaultKind::from_str(kind).map_err(|_| e.error(line, format!("unknown vault type '{kind}'")))?;

            let (min_depth, max_depth) = match e.field("depth") {
                None => (0, i32::MAX),
                Some((value, line)) => {
                    let parsed = value
                        .split_once(':')
                        .and_then(|(lo, hi)| Some((lo.trim().parse().ok()?, hi.trim().parse().ok()?)));
                    parsed.ok_or_else(|| e.error(line, format!("bad depth '{value}'")))?
                }
            };

            Ok(Vault {
                blueprint: Blueprint::parse(e.name, &e.rows, VAULT_SYMBOLS)?,
                kind,
                rating: e.number("rating")?.unwrap_or(0),
                min_depth,
                max_depth,
            })
        })
        .collect()
}

const BUILTIN_TEMPLATES: &str = include_str!("../data/room_template.txt");
const BUILTIN_VAULTS: &str = include_str!("../data/vault.txt");

pub fn builtin_templates() -> Result<Vec<RoomTemplate>> {
    templates_from_text(BUILTIN_TEMPLATES)
}

pub fn builtin_vaults() -> Result<Vec<Vault>> {
    vaults_from_text(BUILTIN_VAULTS)
}

pub fn load_templates(path: &Path) -> Result<Vec<RoomTemplate>> {
    templates_from_text(&read_data_file(path)?)
}

pub fn load_vaults(path: &Path) -> Result<Vec<Vault>> {
    vaults_from_text(&read_data_file(path)?)
}

// Builders

/// A random room template
pub fn build_template(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    let data = ctx.data;
    let Some(template) = ctx.rng.choose(&data.templates) else {
        return false;
    };
    let bp = &template.blueprint;
    let Some(centre) = centre_or_space(ctx, centre, bp.height, bp.width) else {
        return false;
    };
    build_room_template(ctx, c, centre, template)
}

/// Draw a room template around `centre`
pub fn build_room_template(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Loc, t: &RoomTemplate) -> bool {
    let bp = &t.blueprint;
    if !bp.fits(c, centre) {
        return false;
    }
    let top = bp.top_left(centre);
    let light = ctx.depth <= ctx.rng.randint1(25);
    let rnddoors = ctx.rng.randint1(i32::from(t.doors.max(1)));
    let rndwalls = ctx.rng.one_in(2);
    let floor = c.feats().floor;

    let mut room = SquareFlags::ROOM;
    if light {
        room |= SquareFlags::GLOW;
    }

    for (dy, dx, sym) in bp.cells() {
        let grid = top.offset(dy, dx);
        match sym {
            TemplateSymbol::OuterWall => set_marked_granite(c, grid, SquareFlags::WALL_OUTER),
            TemplateSymbol::SolidWall => set_marked_granite(c, grid, SquareFlags::WALL_SOLID),
            TemplateSymbol::SecretDoor => place_secret_door(c, grid),
            TemplateSymbol::OptionalWall if rndwalls => set_marked_granite(c, grid, SquareFlags::WALL_INNER),
            TemplateSymbol::LayoutDoor if rndwalls => place_secret_door(c, grid),
            TemplateSymbol::OtherLayoutDoor if rndwalls => set_marked_granite(c, grid, SquareFlags::WALL_INNER),
            TemplateSymbol::OtherLayoutDoor => place_secret_door(c, grid),
            TemplateSymbol::NumberedDoor(n) if i32::from(n) <= rnddoors => place_secret_door(c, grid),
            TemplateSymbol::NumberedDoor(_) => set_marked_granite(c, grid, SquareFlags::WALL_OUTER),
            _ => place_feat(c, grid, floor),
        }
        c.info_on(grid, room);
    }

    let depth = ctx.depth;
    for (dy, dx, sym) in bp.cells() {
        let grid = top.offset(dy, dx);
        match sym {
            TemplateSymbol::Treasure => {
                if !ctx.config.persistent_levels && ctx.rng.one_in(4) {
                    place_random_stairs(ctx, c, grid);
                } else {
                    place_object(ctx, c, grid, depth + 2, true, false, Origin::Special, None);
                }
                vault_monsters(ctx, c, grid, depth + 2, 2);
                let traps = ctx.rng.randint1(2);
                vault_traps(ctx, c, grid, 2, 3, traps);
            }
            TemplateSymbol::Interesting => {
                let monsters = ctx.rng.randint1(2);
                vault_monsters(ctx, c, grid, depth + 2, monsters);
                let objects = ctx.rng.randint1(2);
                vault_objects(ctx, c, grid, depth, objects);
            }
            TemplateSymbol::ClassObject => {
                let good = ctx.rng.one_in(2);
                place_object(ctx, c, grid, depth + 5, good, false, Origin::Special, t.tval);
            }
            _ => {}
        }
    }

    debug!("Room template '{}' at {centre:?}", bp.name);
    true
}

/// Pick a vault of this kind allowed at the current depth
fn pick_vault<'a>(ctx: &mut GenerationContext<'a>, kind: VaultKind) -> Option<&'a Vault> {
    let data = ctx.data;
    let depth = ctx.depth;
    let candidates: Vec<&'a Vault> = data
        .vaults
        .iter()
        .filter(|v| v.kind == kind && v.min_depth <= depth && depth <= v.max_depth)
        .collect();
    ctx.rng.choose(&candidates).copied()
}

fn build_vault_kind(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>, kind: VaultKind) -> bool {
    let Some(vault) = pick_vault(ctx, kind) else {
        return false;
    };
    let bp = &vault.blueprint;
    let Some(centre) = centre_or_space(ctx, centre, bp.height, bp.width) else {
        return false;
    };
    if !build_vault(ctx, c, centre, vault) {
        return false;
    }
    c.mon_rating = c.mon_rating.saturating_add(vault.rating);
    true
}

pub fn build_lesser_vault(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    build_vault_kind(ctx, c, centre, VaultKind::Lesser)
}

pub fn build_medium_vault(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    build_vault_kind(ctx, c, centre, VaultKind::Medium)
}

/// Greater vaults only come first on a level, and get rarer the shallower
/// the level is below depth 90
pub fn build_greater_vault(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Option<Loc>) -> bool {
    if !ctx.cent.is_empty() {
        return false;
    }

    let (mut numerator, mut denominator) = (2, 3);
    let mut i = 90;
    while i > ctx.depth {
        numerator *= 2;
        denominator *= 3;
        i -= 10;
    }
    if ctx.rng.randint0(denominator) >= numerator {
        return false;
    }

    build_vault_kind(ctx, c, centre, VaultKind::Greater)
}

/// Draw a vault around `centre`
///
/// Every drawn square becomes part of the room and is closed to random
/// monsters; all but the door steps are vault squares.
pub fn build_vault(ctx: &mut GenerationContext<'_>, c: &mut Chunk, centre: Loc, vault: &Vault) -> bool {
    let bp = &vault.blueprint;
    if !bp.fits(c, centre) {
        return false;
    }
    let top = bp.top_left(centre);
    let (floor, perm, magma_k) = (c.feats().floor, c.feats().perm, c.feats().magma_k);
    let stairs = !ctx.config.persistent_levels;

    for (dy, dx, sym) in bp.cells() {
        let grid = top.offset(dy, dx);
        match sym {
            VaultSymbol::DoorStep => set_marked_granite(c, grid, SquareFlags::WALL_OUTER),
            VaultSymbol::Wall => set_marked_granite(c, grid, SquareFlags::WALL_INNER),
            VaultSymbol::PermWall => {
                place_feat(c, grid, perm);
                c.info_on(grid, SquareFlags::WALL_SOLID);
            }
            VaultSymbol::SecretDoor => place_secret_door(c, grid),
            VaultSymbol::Rubble => place_rubble(c, grid),
            VaultSymbol::GoldSeam => place_feat(c, grid, magma_k),
            VaultSymbol::UpStairs if stairs => place_stairs(ctx, c, grid, false),
            VaultSymbol::DownStairs if stairs => place_stairs(ctx, c, grid, true),
            _ => place_feat(c, grid, floor),
        }

        let mut flags = SquareFlags::ROOM | SquareFlags::MON_RESTRICT;
        if sym != VaultSymbol::DoorStep {
            flags |= SquareFlags::VAULT;
        }
        c.info_on(grid, flags);
    }

    let depth = ctx.depth;
    for (dy, dx, sym) in bp.cells() {
        let grid = top.offset(dy, dx);
        match sym {
            VaultSymbol::Trap => {
                ctx.pop.place_trap(c, ctx.rng, grid, depth);
            }
            VaultSymbol::ObjectOrTrap => {
                if ctx.rng.randint0(100) < 75 {
                    place_object(ctx, c, grid, depth, false, false, Origin::Vault, None);
                } else {
                    ctx.pop.place_trap(c, ctx.rng, grid, depth);
                }
            }
            VaultSymbol::Monster(boost) => {
                ctx.pop.pick_and_place_monster(c, ctx.rng, grid, depth + boost, true, true, Origin::Vault);
            }
            VaultSymbol::MonsterOrObject => {
                if ctx.rng.one_in(2) {
                    ctx.pop.pick_and_place_monster(c, ctx.rng, grid, depth + 3, true, true, Origin::Vault);
                }
                if ctx.rng.one_in(2) {
                    place_object(ctx, c, grid, depth + 7, false, false, Origin::Vault, None);
                }
            }
            VaultSymbol::Guarded { monster, object, great } => {
                ctx.pop.pick_and_place_monster(c, ctx.rng, grid, depth + monster, true, true, Origin::Vault);
                place_object(ctx, c, grid, depth + object, true, great, Origin::Vault, None);
            }
            _ => {}
        }
    }

    debug!("{} vault '{}' at {centre:?}", vault.kind, bp.name);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{FeatureTable, Rect};
    use crate::generate::util::fill_rectangle;
    use crate::generate::{BasicPopulator, GenData};
    use crate::player::Player;
    use crate::rng::GameRng;
    use crate::world::GenConfig;
    use std::sync::Arc;

    fn granite_chunk(h: i32, w: i32) -> Chunk {
        let mut c = Chunk::new(h, w, Arc::new(FeatureTable::builtin().unwrap()));
        let granite = c.feats().granite;
        fill_rectangle(&mut c, Rect::new(0, 0, h - 1, w - 1), granite, SquareFlags::empty());
        c
    }

    fn with_ctx(depth: i32, f: impl FnOnce(&mut GenerationContext<'_>)) {
        let data = GenData::builtin().unwrap();
        let config = GenConfig::default();
        let mut rng = GameRng::new(21);
        let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
        let mut player = Player::new();
        player.set_depth(depth);
        let profile = data.profile("classic").unwrap().clone();
        let mut ctx = GenerationContext::new(&data, &config, &mut rng, &mut pop, &mut player, profile);
        ctx.init_blocks(66, 198);
        f(&mut ctx);
    }

    #[test]
    fn test_builtin_blueprints_parse() {
        let templates = builtin_templates().unwrap();
        assert!(templates.len() >= 5);
        let armoury = templates.iter().find(|t| t.blueprint.name == "Armoury").unwrap();
        assert_eq!(armoury.tval, Some(Tval::Sword));
        assert_eq!(armoury.doors, 2);

        let vaults = builtin_vaults().unwrap();
        for kind in [VaultKind::Lesser, VaultKind::Medium, VaultKind::Greater] {
            assert!(vaults.iter().any(|v| v.kind == kind), "no {kind} vault");
        }
        let cells = vaults.iter().find(|v| v.blueprint.name == "Cell block").unwrap();
        assert_eq!((cells.blueprint.height, cells.blueprint.width), (8, 19));
        assert_eq!(cells.blueprint.get(0, 0), Some(VaultSymbol::DoorStep));
        assert_eq!(cells.blueprint.get(2, 7), Some(VaultSymbol::Monster(5)));
        assert_eq!(cells.blueprint.get(8, 0), None);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let text = "name:Tee\nD:%%%\nD: .\n";
        let t = &templates_from_text(text).unwrap()[0];
        assert_eq!(t.blueprint.width, 3);
        assert_eq!(t.blueprint.get(1, 0), None);
        assert_eq!(t.blueprint.get(1, 1), Some(TemplateSymbol::Floor));
        assert_eq!(t.blueprint.get(1, 2), None);
        assert_eq!(t.blueprint.cells().count(), 4);
    }

    #[test]
    fn test_parse_errors_name_the_line() {
        let err = vaults_from_text("name:Odd\ntype:lesser\nD:%%%\nD:%Q%\n").unwrap_err();
        assert_eq!(
            err,
            DungeonError::Blueprint {
                name: "Odd".to_string(),
                line: 4,
                message: "unknown symbol 'Q'".to_string(),
            }
        );

        let err = vaults_from_text("name:Odd\ntype:tiny\nD:%%%\n").unwrap_err();
        assert!(matches!(err, DungeonError::Blueprint { line: 2, .. }));

        let err = vaults_from_text("name:Odd\ntype:lesser\n").unwrap_err();
        assert!(matches!(err, DungeonError::Blueprint { .. }));

        let err = templates_from_text("D:%%%\n").unwrap_err();
        assert!(matches!(err, DungeonError::Blueprint { line: 1, .. }));

        let err = templates_from_text("name:A\ntval:spoon\nD:.\n").unwrap_err();
        assert!(err.to_string().contains("spoon"));
    }

    #[test]
    fn test_vault_footprint_flags() {
        with_ctx(30, |ctx| {
            let mut c = granite_chunk(66, 198);
            let vault = ctx.data.vaults.iter().find(|v| v.blueprint.name == "Crypt").unwrap().clone();
            let centre = Loc::new(30, 60);
            assert!(build_vault(ctx, &mut c, centre, &vault));

            let bp = &vault.blueprint;
            let top = bp.top_left(centre);
            for (dy, dx, sym) in bp.cells() {
                let grid = top.offset(dy, dx);
                assert!(c.is_room(grid));
                assert!(c.is_mon_restrict(grid));
                assert_eq!(c.is_vault(grid), sym != VaultSymbol::DoorStep, "{grid:?}");
            }
            // Outside untouched
            assert!(!c.is_room(top.offset(-1, 0)));
            assert!(c.is_granite(top.offset(0, -1)));
        });
    }

    #[test]
    fn test_vault_must_fit() {
        with_ctx(30, |ctx| {
            let mut c = granite_chunk(66, 198);
            let vault = ctx.data.vaults[0].clone();
            assert!(!build_vault(ctx, &mut c, Loc::new(1, 1), &vault));
            assert!(c.grids().all(|g| !c.is_room(g)));
        });
    }

    #[test]
    fn test_vault_stairs_skip_persistent_levels() {
        let text = "name:Stair\ntype:lesser\nD:%%%%%\nD:%<.>%\nD:%%%%%\n";
        let vault = vaults_from_text(text).unwrap().remove(0);
        let data = GenData::builtin().unwrap();
        for persistent in [false, true] {
            let config = GenConfig {
                persistent_levels: persistent,
                ..GenConfig::default()
            };
            let mut rng = GameRng::new(2);
            let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
            let mut player = Player::new();
            player.set_depth(10);
            let profile = data.profile("classic").unwrap().clone();
            let mut ctx = GenerationContext::new(&data, &config, &mut rng, &mut pop, &mut player, profile);

            let mut c = granite_chunk(20, 20);
            assert!(build_vault(&mut ctx, &mut c, Loc::new(10, 10), &vault));
            let stairs = c.grids().filter(|&g| c.is_stairs(g)).count();
            assert_eq!(stairs, if persistent { 0 } else { 2 });
        }
    }

    #[test]
    fn test_greater_vault_only_comes_first() {
        with_ctx(100, |ctx| {
            let mut c = granite_chunk(66, 198);
            ctx.add_centre(Loc::new(5, 5));
            assert!(!build_greater_vault(ctx, &mut c, None));
        });
    }

    #[test]
    fn test_lesser_vault_finds_space() {
        with_ctx(30, |ctx| {
            let mut c = granite_chunk(66, 198);
            let mut built = 0;
            for _ in 0..5 {
                if build_lesser_vault(ctx, &mut c, None) {
                    built += 1;
                }
            }
            assert!(built > 0);
            assert_eq!(ctx.cent.len(), ctx.reserved.len());
            assert!(c.grids().any(|g| c.is_vault(g)));
        });
    }

    #[test]
    fn test_no_vault_out_of_depth() {
        with_ctx(1, |ctx| {
            let mut c = granite_chunk(66, 198);
            assert!(!build_medium_vault(ctx, &mut c, None));
            assert!(ctx.cent.is_empty());
        });
    }

    #[test]
    fn test_template_room() {
        with_ctx(10, |ctx| {
            let mut c = granite_chunk(66, 198);
            let t = ctx.data.templates.iter().find(|t| t.blueprint.name == "Library").unwrap().clone();
            let centre = Loc::new(30, 90);
            assert!(build_room_template(ctx, &mut c, centre, &t));

            let top = t.blueprint.top_left(centre);
            // Corners are outer wall, the middle row is open
            assert!(c.is_wall_outer(top));
            assert!(c.is_floor(top.offset(1, 1)));
            assert!(c.is_room(centre));
            assert!(!c.is_vault(centre));
            // At least door 1 is always open
            assert!(c.is_secret(top.offset(0, 10)));
        });
    }
}
