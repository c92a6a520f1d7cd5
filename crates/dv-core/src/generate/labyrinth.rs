//! Labyrinth levels
//!
//! A perfect maze on the odd grids of a small level. Deeper labyrinths are
//! bigger and more often dark, unknown and carved from permanent rock.

use log::debug;

use super::util::{
    alloc_objects, alloc_stairs, draw_rectangle, fill_rectangle, find_empty, new_player_spot, pick_and_place_distant_monster,
    place_closed_door, place_feat, AllocKind, Placement,
};
use super::{Attempt, GenerationContext, Rejected};
use crate::consts::{AMT_ITEM, AMT_ROOM};
use crate::dungeon::{Chunk, Loc, Rect, SquareFlags};
use crate::object::Origin;

/// How a labyrinth turned out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabyrinthStyle {
    /// Every grid glows
    pub lit: bool,
    /// The player starts out knowing the map
    pub known: bool,
    /// Walls can be dug
    pub soft: bool,
}

impl LabyrinthStyle {
    pub fn roll(ctx: &mut GenerationContext<'_>) -> Self {
        let depth = ctx.depth;
        let lit = ctx.rng.randint0(depth) < 25 || ctx.rng.randint0(2) < 1;
        let known = lit && ctx.rng.randint0(depth) < 25;
        let soft = ctx.rng.randint0(depth) < 35 || ctx.rng.randint0(3) < 2;
        Self { lit, known, soft }
    }
}

/// Disjoint sets over maze cells
struct Sets {
    parent: Vec<usize>,
}

impl Sets {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// Join two sets; false if they were already one
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }
}

/// Carve a perfect maze into `c`, whose odd grids are the maze cells
///
/// Walls between cells are knocked down in random order whenever they
/// separate two cells not yet connected.
pub fn carve_maze(ctx: &mut GenerationContext<'_>, c: &mut Chunk) {
    let floor = c.feats().floor;
    let rows = (c.height - 1) / 2;
    let cols = (c.width - 1) / 2;
    let cell = |r: i32, k: i32| Loc::new(2 * r + 1, 2 * k + 1);
    let index = |r: i32, k: i32| (r * cols + k) as usize;

    for r in 0..rows {
        for k in 0..cols {
            place_feat(c, cell(r, k), floor);
        }
    }

    // Every wall between two horizontally or vertically adjacent cells
    let mut walls: Vec<(i32, i32, bool)> = Vec::new();
    for r in 0..rows {
        for k in 0..cols {
            if k + 1 < cols {
                walls.push((r, k, true));
            }
            if r + 1 < rows {
                walls.push((r, k, false));
            }
        }
    }
    ctx.rng.shuffle(&mut walls);

    let mut sets = Sets::new((rows * cols).max(0) as usize);
    for (r, k, east) in walls {
        let (r2, k2) = if east { (r, k + 1) } else { (r + 1, k) };
        if sets.union(index(r, k), index(r2, k2)) {
            let a = cell(r, k);
            place_feat(c, Loc::new(a.y + r2 - r, a.x + k2 - k), floor);
        }
    }
}

pub fn labyrinth_gen(ctx: &mut GenerationContext<'_>) -> Attempt {
    let depth = ctx.depth;
    let height = 15 + ctx.rng.randint0(depth / 10) * 2;
    let width = 51 + ctx.rng.randint0(depth / 10) * 10;
    let style = LabyrinthStyle::roll(ctx);

    let mut c = ctx.new_chunk(height, width);
    let (granite, perm) = (c.feats().granite, c.feats().perm);
    let wall = if style.soft { granite } else { perm };
    let all = Rect::new(0, 0, height - 1, width - 1);
    fill_rectangle(&mut c, all, wall, SquareFlags::WALL_SOLID);
    draw_rectangle(&mut c, all, perm, SquareFlags::WALL_SOLID);
    c.name = "labyrinth".to_string();

    carve_maze(ctx, &mut c);

    for grid in all.grids() {
        c.info_on(grid, SquareFlags::ROOM);
        if style.lit {
            c.info_on(grid, SquareFlags::GLOW);
        }
    }

    // A door for every hundred grids
    for _ in 0..height * width / 100 {
        if let Some(grid) = find_empty(&c, ctx.rng) {
            place_closed_door(&mut c, grid);
        }
    }

    let down = ctx.rng.rand_range(1, 2);
    alloc_stairs(ctx, &mut c, true, down, 1);
    let up = ctx.rng.rand_range(1, 2);
    alloc_stairs(ctx, &mut c, false, up, 1);

    if !new_player_spot(ctx, &mut c) {
        return Err(Rejected::NoPlayerSpot);
    }

    let k = (depth / 3).clamp(2, 10);
    let traps = ctx.rng.randint1(k);
    alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Trap, traps, depth, Origin::Labyrinth);

    let monsters = ctx.config.min_m_alloc_level + ctx.rng.randint1(8) + k;
    for _ in 0..monsters {
        pick_and_place_distant_monster(ctx, &mut c, 0, true, depth);
    }

    // Treasure: better in the dark, better still behind undiggable walls
    let items = ctx.rng.rand_normal(AMT_ROOM, 3);
    alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Object, items, depth, Origin::Labyrinth);
    if !style.lit {
        let good = ctx.rng.rand_normal(AMT_ITEM, 2);
        alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Good, good, depth, Origin::Labyrinth);
    }
    if !style.soft {
        let great = ctx.rng.rand_normal(AMT_ITEM, 2);
        alloc_objects(ctx, &mut c, Placement::Both, AllocKind::Great, great, depth, Origin::Labyrinth);
    }

    ctx.known_map = style.known;
    debug!("Labyrinth {height}x{width} {style:?}");
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::tunnel::Regions;
    use crate::generate::{BasicPopulator, GenData};
    use crate::player::Player;
    use crate::rng::GameRng;
    use crate::world::GenConfig;

    fn run(seed: u64, depth: i32) -> (Attempt, bool) {
        let data = GenData::builtin().unwrap();
        let config = GenConfig::default();
        let mut rng = GameRng::new(seed);
        let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
        let mut player = Player::new();
        player.set_depth(depth);
        let profile = data.profile("labyrinth").unwrap().clone();
        let mut ctx = GenerationContext::new(&data, &config, &mut rng, &mut pop, &mut player, profile);
        let result = labyrinth_gen(&mut ctx);
        (result, ctx.known_map)
    }

    #[test]
    fn test_labyrinth_dimensions_are_odd() {
        for seed in 0..5 {
            let c = run(seed, 40).0.unwrap();
            assert_eq!(c.height % 2, 1);
            assert_eq!(c.width % 2, 1);
            assert!(c.height <= 66 && c.width <= 198);
        }
    }

    #[test]
    fn test_labyrinth_is_one_region() {
        let c = run(3, 20).0.unwrap();
        let regions = Regions::build(&c, false);
        assert_eq!(regions.count(), 1);
        // Cells sit on odd grids, pillars on even ones
        assert!(c.is_passable(Loc::new(1, 1)) || c.is_door(Loc::new(1, 1)));
        assert!(!c.is_passable(Loc::new(2, 2)));
        assert!(c.is_perm(Loc::new(0, 0)));
    }

    #[test]
    fn test_known_labyrinths_are_lit() {
        for seed in 0..20 {
            let (result, known) = run(seed, 30);
            let c = result.unwrap();
            if known {
                assert!(c.grids().all(|g| c.is_glow(g)));
            }
        }
    }
}
