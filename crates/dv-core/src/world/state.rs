//! The live level, the player's memory of it, and the player
//!
//! Visibility and the sanctioned terrain/occupancy writes that affect what
//! the player sees go through here so the view and the memory stay in step.

use crate::dungeon::{Chunk, FeatureId, Loc};
use crate::events::EventQueue;
use crate::generate::GeneratedLevel;
use crate::player::Player;
use crate::rng::GameRng;
use crate::vision::{self, knowledge};

use super::errors::Result;
use super::options::GenConfig;

/// Everything the visibility engine needs, owned in one place
#[derive(Debug, Clone)]
pub struct WorldState {
    pub chunk: Chunk,
    /// What the player remembers of `chunk`
    pub known: Chunk,
    pub player: Player,
    pub config: GenConfig,
    pub events: EventQueue,
}

impl WorldState {
    /// Wrap a freshly generated level; the player's memory starts empty
    pub fn new(chunk: Chunk, player: Player, config: GenConfig) -> Self {
        let known = chunk.new_known();
        Self {
            chunk,
            known,
            player,
            config,
            events: EventQueue::new(),
        }
    }

    /// Start play on a generated level
    ///
    /// Town lighting and a known map are applied to the player's memory, and
    /// the first view is computed.
    pub fn from_generated(level: GeneratedLevel, player: Player, config: GenConfig) -> Self {
        let mut world = Self::new(level.chunk, player, config);
        world.player.grid = world.chunk.player_grid();
        world.player.set_depth(world.chunk.depth);
        world.apply_generated(level.daytime, level.known_map);
        world
    }

    /// Move to another generated level, forgetting the old one
    pub fn enter_generated(&mut self, level: GeneratedLevel) {
        self.enter_level(level.chunk, None);
        self.apply_generated(level.daytime, level.known_map);
    }

    fn apply_generated(&mut self, daytime: Option<bool>, known_map: bool) {
        if let Some(daytime) = daytime {
            knowledge::cave_illuminate(&mut self.chunk, &mut self.known, daytime);
        }
        if known_map {
            knowledge::cave_known(&mut self.chunk, &mut self.known);
        }
        self.update_view();
    }

    /// Replace the level (and the memory of it) on a level change
    pub fn enter_level(&mut self, chunk: Chunk, known: Option<Chunk>) {
        self.known = known.unwrap_or_else(|| chunk.new_known());
        self.chunk = chunk;
        self.player.grid = self.chunk.player_grid();
        self.player.set_depth(self.chunk.depth);
    }

    /// Recompute the view from the player's position
    pub fn update_view(&mut self) {
        vision::update_view(
            &mut self.chunk,
            &mut self.known,
            &self.player,
            &self.config,
            &mut self.events,
        );
    }

    /// Move the player and recompute the view
    pub fn move_player(&mut self, grid: Loc) -> Result<()> {
        self.chunk.place_player(grid)?;
        self.player.grid = Some(grid);
        self.update_view();
        Ok(())
    }

    /// Change terrain, refreshing the view if the grid could be seen
    pub fn set_feat(&mut self, grid: Loc, feat: FeatureId) -> Result<()> {
        self.chunk.try_set_feat(grid, feat)?;
        if self.chunk.is_view(grid) {
            knowledge::note_spot(&mut self.chunk, &mut self.known, grid);
            knowledge::light_spot(&mut self.events, grid);
            self.update_view();
        }
        Ok(())
    }

    /// Light or darken the room at `grid`
    pub fn light_room(&mut self, grid: Loc, light: bool, rng: &mut GameRng) {
        vision::light_room(
            &mut self.chunk,
            &mut self.known,
            &self.player,
            grid,
            light,
            rng,
            &mut self.events,
        );
        self.update_view();
    }

    /// Reveal the level map
    pub fn wiz_light(&mut self, full: bool) {
        knowledge::wiz_light(&mut self.chunk, &mut self.known, full);
        self.update_view();
    }

    /// Forget the level map
    pub fn wiz_dark(&mut self) {
        knowledge::wiz_dark(&mut self.chunk, &mut self.known);
        self.update_view();
    }

    /// Day or night lighting for the town
    pub fn illuminate(&mut self, daytime: bool) {
        knowledge::cave_illuminate(&mut self.chunk, &mut self.known, daytime);
        self.update_view();
    }

    /// Is the player standing in the dark?
    pub fn no_light(&self) -> bool {
        self.player
            .grid
            .is_none_or(|grid| !self.chunk.is_seen(grid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{FeatureTable, SquareFlags};
    use crate::events::GameEvent;
    use crate::world::DungeonError;
    use std::sync::Arc;

    fn world() -> WorldState {
        let mut c = Chunk::new(9, 9, Arc::new(FeatureTable::builtin().unwrap()));
        let (floor, granite) = (c.feats().floor, c.feats().granite);
        for g in c.grids().collect::<Vec<_>>() {
            let edge = g.y == 0 || g.x == 0 || g.y == 8 || g.x == 8;
            c.set_feat(g, if edge { granite } else { floor });
            c.info_on(g, SquareFlags::ROOM);
        }
        let mut p = Player::new();
        p.cur_light = 2;
        WorldState::new(c, p, GenConfig::default())
    }

    #[test]
    fn test_move_player_updates_view() {
        let mut w = world();
        assert!(w.no_light());
        w.move_player(Loc::new(4, 4)).unwrap();
        assert!(!w.no_light());
        assert!(w.chunk.is_seen(Loc::new(4, 5)));
        assert!(w.move_player(Loc::new(9, 9)).is_err());
    }

    #[test]
    fn test_set_feat_in_view_is_remembered() {
        let mut w = world();
        w.move_player(Loc::new(4, 4)).unwrap();
        let closed = w.chunk.feats().closed;
        w.events.drain().for_each(drop);
        w.set_feat(Loc::new(4, 5), closed).unwrap();
        assert_eq!(w.known.feat(Loc::new(4, 5)), closed);
        assert!(w.events.contains(GameEvent::Map(Loc::new(4, 5))));
    }

    #[test]
    fn test_set_feat_off_the_map_is_an_error() {
        let mut w = world();
        let closed = w.chunk.feats().closed;
        let err = w.set_feat(Loc::new(9, 4), closed).unwrap_err();
        assert!(matches!(err, DungeonError::OutOfBounds { .. }));
        assert!(w.set_feat(Loc::new(-1, 0), closed).is_err());
    }

    #[test]
    fn test_undrained_events_stay_bounded() {
        let mut w = world();
        for i in 0..40 {
            let to = if i % 2 == 0 { Loc::new(2, 2) } else { Loc::new(6, 6) };
            w.move_player(to).unwrap();
        }
        // At most one redraw per grid plus the item list and feeling
        assert!(w.events.len() <= 9 * 9 + 2);
    }

    #[test]
    fn test_town_by_day_is_remembered() {
        use crate::generate::{generate_level, BasicPopulator, GenData, LevelRequest};

        let data = GenData::builtin().unwrap();
        let config = GenConfig::default();
        let mut rng = GameRng::new(4);
        let mut pop = BasicPopulator::builtin(config.max_depth).unwrap();
        let mut player = Player::new();
        let level = generate_level(&data, &config, &mut rng, &mut pop, &mut player, &LevelRequest::default()).unwrap();
        assert_eq!(level.daytime, Some(true));

        let w = WorldState::from_generated(level, player, config);
        assert_eq!(w.player.grid, w.chunk.player_grid());
        // Daylight shows the whole town
        let street = w.chunk.grids().find(|&g| w.chunk.is_floor(g)).unwrap();
        assert!(w.chunk.is_glow(street));
        assert!(w.chunk.is_mark(street));
        assert_eq!(w.known.feat(street), w.chunk.feat(street));
    }

    #[test]
    fn test_light_room_then_darken() {
        let mut w = world();
        let mut rng = GameRng::new(7);
        w.player.cur_light = 0;
        w.move_player(Loc::new(4, 4)).unwrap();
        assert!(!w.chunk.is_seen(Loc::new(2, 2)));

        w.light_room(Loc::new(4, 4), true, &mut rng);
        assert!(w.chunk.is_glow(Loc::new(2, 2)));
        assert!(w.chunk.is_seen(Loc::new(2, 2)));
        assert!(w.chunk.is_mark(Loc::new(2, 2)));

        w.light_room(Loc::new(4, 4), false, &mut rng);
        assert!(!w.chunk.is_glow(Loc::new(2, 2)));
        assert!(!w.chunk.is_mark(Loc::new(2, 2)));
        // Walls stay remembered
        assert!(w.chunk.is_mark(Loc::new(0, 4)));
    }
}
