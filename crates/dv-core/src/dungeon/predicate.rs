//! Square predicates
//!
//! Every predicate here only reads. Out-of-bounds grids answer `false`
//! (or the terrain of an unknown grid where a feature is asked for).

use super::{Chunk, Loc, Occupant, SquareFlags, TerrainFlags};
use crate::dungeon::loc::{DDX_DDD, DDY_DDD};

impl Chunk {
    fn tflags(&self, grid: Loc) -> TerrainFlags {
        self.terrain().flags(self.feat(grid))
    }

    fn thas(&self, grid: Loc, flag: TerrainFlags) -> bool {
        self.in_bounds(grid) && self.tflags(grid).contains(flag)
    }

    // Terrain

    pub fn is_floor(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::FLOOR)
    }

    /// Blocks line of sight and projections
    pub fn is_wall(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && !self.tflags(grid).contains(TerrainFlags::PROJECT)
    }

    /// Rock that is not a secret door
    pub fn is_rock(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && self.terrain().is_granite(self.feat(grid))
    }

    pub fn is_granite(&self, grid: Loc) -> bool {
        self.is_rock(grid)
    }

    pub fn is_perm(&self, grid: Loc) -> bool {
        let f = self.tflags(grid);
        self.in_bounds(grid) && f.contains(TerrainFlags::PERMANENT | TerrainFlags::ROCK)
    }

    pub fn is_magma(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::MAGMA)
    }

    pub fn is_quartz(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::QUARTZ)
    }

    pub fn is_mineral(&self, grid: Loc) -> bool {
        self.is_rock(grid) || self.is_magma(grid) || self.is_quartz(grid)
    }

    /// Mineral vein holding treasure
    pub fn has_gold(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::GOLD)
    }

    pub fn is_rubble(&self, grid: Loc) -> bool {
        let f = self.tflags(grid);
        self.in_bounds(grid) && f.contains(TerrainFlags::ROCK) && !f.contains(TerrainFlags::WALL)
    }

    pub fn is_door(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::DOOR_ANY)
    }

    pub fn is_secret(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::DOOR_ANY | TerrainFlags::ROCK)
    }

    pub fn is_open_door(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::CLOSABLE)
    }

    pub fn is_closed_door(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::DOOR_CLOSED)
    }

    pub fn is_broken_door(&self, grid: Loc) -> bool {
        let f = self.tflags(grid);
        self.in_bounds(grid)
            && f.contains(TerrainFlags::DOOR_ANY | TerrainFlags::PASSABLE)
            && !f.contains(TerrainFlags::CLOSABLE)
    }

    pub fn is_stairs(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::STAIR)
    }

    pub fn is_up_stairs(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::UPSTAIR)
    }

    pub fn is_down_stairs(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::DOWNSTAIR)
    }

    pub fn is_shop(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::SHOP)
    }

    pub fn is_passable(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::PASSABLE)
    }

    pub fn is_projectable(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::PROJECT)
    }

    pub fn is_los(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::LOS)
    }

    pub fn is_bright(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::BRIGHT)
    }

    pub fn is_smooth(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::SMOOTH)
    }

    pub fn is_interesting(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::INTERESTING)
    }

    pub fn is_trap_holding(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::TRAP)
    }

    pub fn is_object_holding(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::OBJECT)
    }

    /// Walls that can't be tunnelled through easily
    pub fn is_strong_wall(&self, grid: Loc) -> bool {
        self.is_mineral(grid) || self.is_perm(grid)
    }

    /// Anything that looks like rock to the player
    pub fn seems_like_wall(&self, grid: Loc) -> bool {
        self.thas(grid, TerrainFlags::ROCK)
    }

    pub fn is_diggable(&self, grid: Loc) -> bool {
        self.is_mineral(grid) || self.is_secret(grid) || self.is_rubble(grid)
    }

    // Square flags

    fn ihas(&self, grid: Loc, flag: SquareFlags) -> bool {
        self.info(grid).contains(flag)
    }

    pub fn is_glow(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::GLOW)
    }

    pub fn is_room(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::ROOM)
    }

    pub fn is_vault(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::VAULT)
    }

    pub fn is_view(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::VIEW)
    }

    pub fn is_seen(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::SEEN)
    }

    pub fn is_was_seen(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::WASSEEN)
    }

    pub fn is_mark(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::MARK)
    }

    pub fn is_feel(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::FEEL)
    }

    pub fn is_wall_inner(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::WALL_INNER)
    }

    pub fn is_wall_outer(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::WALL_OUTER)
    }

    pub fn is_wall_solid(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::WALL_SOLID)
    }

    pub fn is_mon_restrict(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::MON_RESTRICT)
    }

    pub fn is_no_teleport(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::NO_TELEPORT)
    }

    pub fn is_no_map(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::NO_MAP)
    }

    pub fn is_no_esp(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::NO_ESP)
    }

    pub fn is_detected_traps(&self, grid: Loc) -> bool {
        self.ihas(grid, SquareFlags::DTRAP)
    }

    // Occupancy

    pub fn is_player(&self, grid: Loc) -> bool {
        self.get(grid).is_some_and(|s| s.occupant == Occupant::Player)
    }

    pub fn is_occupied(&self, grid: Loc) -> bool {
        self.get(grid).is_some_and(|s| !s.occupant.is_none())
    }

    pub fn has_objects(&self, grid: Loc) -> bool {
        !self.objects_at(grid).is_empty()
    }

    pub fn has_trap(&self, grid: Loc) -> bool {
        !self.traps_at(grid).is_empty()
    }

    pub fn has_visible_trap(&self, grid: Loc) -> bool {
        self.traps_at(grid).iter().any(|t| t.visible)
    }

    /// A trap the player can set off
    pub fn has_player_trap(&self, grid: Loc) -> bool {
        self.traps_at(grid).iter().any(|t| t.kind.is_player_trap())
    }

    /// Floor with nobody on it
    pub fn is_open(&self, grid: Loc) -> bool {
        self.is_floor(grid) && !self.is_occupied(grid)
    }

    /// Open floor with no objects and no traps
    pub fn is_empty(&self, grid: Loc) -> bool {
        self.is_open(grid) && !self.has_player_trap(grid) && !self.has_objects(grid)
    }

    /// Somewhere a monster or the player can be put down
    pub fn is_arrivable(&self, grid: Loc) -> bool {
        !self.is_occupied(grid)
            && !self.has_player_trap(grid)
            && (self.is_floor(grid) || self.is_stairs(grid))
    }

    /// Can take a new floor object
    pub fn can_put_item(&self, grid: Loc) -> bool {
        self.is_object_holding(grid) && !self.has_trap(grid) && !self.has_objects(grid)
    }

    /// Wall next to a lit room floor the player has seen
    pub fn is_lit_wall(&self, grid: Loc) -> bool {
        if !self.is_wall(grid) {
            return false;
        }
        grid.adjacent().any(|g| {
            self.is_floor(g) && self.is_room(g) && self.is_glow(g) && self.is_seen(g)
        })
    }

    // Knowledge layer (called on the player's memory chunk)

    /// The player has some belief about this grid
    pub fn is_known(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && self.feat(grid) != self.feats().none
    }

    pub fn is_not_known(&self, grid: Loc) -> bool {
        self.in_bounds(grid) && !self.is_known(grid)
    }

    // Neighbourhood counts

    /// Orthogonal neighbours that are walls
    pub fn num_walls_adjacent(&self, grid: Loc) -> usize {
        (0..4)
            .filter(|&i| {
                let g = grid.offset(DDY_DDD[i], DDX_DDD[i]);
                self.terrain().is_wall(self.feat(g)) && self.in_bounds(g)
            })
            .count()
    }

    /// Diagonal neighbours that are walls
    pub fn num_walls_diagonal(&self, grid: Loc) -> usize {
        (4..8)
            .filter(|&i| {
                let g = grid.offset(DDY_DDD[i], DDX_DDD[i]);
                self.terrain().is_wall(self.feat(g)) && self.in_bounds(g)
            })
            .count()
    }

    /// A good stair spot: a corridor dead end
    pub fn suits_stairs_well(&self, grid: Loc) -> bool {
        !self.is_vault(grid)
            && !self.is_no_stairs(grid)
            && self.num_walls_adjacent(grid) == 3
            && self.num_walls_diagonal(grid) == 4
            && self.is_empty(grid)
    }

    /// An acceptable stair spot: a corridor
    pub fn suits_stairs_ok(&self, grid: Loc) -> bool {
        !self.is_vault(grid)
            && !self.is_no_stairs(grid)
            && self.num_walls_adjacent(grid) == 2
            && self.num_walls_diagonal(grid) == 4
            && self.is_empty(grid)
    }

    fn is_no_stairs(&self, grid: Loc) -> bool {
        self.is_shop(grid)
    }
}
