//! Session module - the frame-stepped game driver
//!
//! A session owns one block table and one grid for its whole life and moves
//! through three phases:
//!
//! - `Falling`: the active block obeys gravity and player actions
//! - `Clearing`: full rows are animating away; input is ignored
//! - `GameOver`: a new block could not be placed at the spawn point
//!
//! Points are assessed the moment a block locks, before the clear animation
//! starts. Rows are resolved once the animation reports it has finished.

use serde::Serialize;
use tracing::{debug, info, warn};

use blockfall_core::geometry::transform_mask;
use blockfall_core::scoring::{calculate_level, get_drop_interval_frames};
use blockfall_core::{
    AnimationFrame, BlockSnapshot, BlockTable, EngineConfig, Grid, GridSnapshot, PieceKind,
    PresetBag, ROTATE_180, ROTATE_CCW, ROTATE_CW,
};
use blockfall_types::{BlockId, EngineError, Point};

/// Offsets tried, in order, when a rotation collides in place
const ROTATION_KICKS: [Point; 4] = [
    Point::new(0, 0),
    Point::new(-1, 0),
    Point::new(1, 0),
    Point::new(0, -1),
];

/// Spawn row for every preset; keeps the top lattice row on grid row 0
const SPAWN_ROW: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Falling,
    Clearing,
    GameOver,
}

/// Player actions a driver can apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
    Rotate180,
}

#[derive(Debug, Clone)]
pub struct Session {
    config: EngineConfig,
    table: BlockTable,
    grid: Grid,
    bag: PresetBag,
    active: Option<BlockId>,
    phase: Phase,
    score: u32,
    level: u32,
    lines: u32,
    /// Frames since the last gravity step
    drop_timer: u32,
}

impl Session {
    /// Build a session and spawn its first block
    pub fn new(config: EngineConfig, seed: u32) -> Result<Self, EngineError> {
        config.validate()?;
        let mut session = Self {
            config,
            table: BlockTable::new(config.max_blocks),
            grid: Grid::new(config.grid_width, config.grid_height)?,
            bag: PresetBag::new(seed),
            active: None,
            phase: Phase::Falling,
            score: 0,
            level: 0,
            lines: 0,
            drop_timer: 0,
        };
        session.spawn()?;
        Ok(session)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn table(&self) -> &BlockTable {
        &self.table
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn active(&self) -> Option<BlockId> {
        self.active
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    /// Kind of the block the next spawn will use
    pub fn next_kind(&self) -> PieceKind {
        self.bag.peek()
    }

    fn spawn_position(&self) -> Point {
        Point::new(self.grid.width() as i32 / 2, SPAWN_ROW)
    }

    /// Spawn the next preset at the top of the grid.
    ///
    /// Returns `Ok(false)` and ends the game when the spawn placement is
    /// rejected or the block table has no free id left.
    pub fn spawn(&mut self) -> Result<bool, EngineError> {
        let preset = self.bag.draw();
        let position = self.spawn_position();
        let id = match self
            .table
            .create(preset.size, preset.mask, position, preset.color)
        {
            Ok(id) => id,
            Err(EngineError::TableFull) => {
                warn!(capacity = self.table.capacity(), "block table full at spawn");
                self.end_game();
                return Ok(false);
            }
            Err(err) => return Err(err),
        };

        if !self.grid.can_place_block(&self.table, id) {
            self.table.remove(id)?;
            self.end_game();
            return Ok(false);
        }

        self.active = Some(id);
        self.phase = Phase::Falling;
        self.drop_timer = 0;
        debug!(%id, kind = ?preset.kind, "block spawned");
        Ok(true)
    }

    fn end_game(&mut self) {
        self.active = None;
        self.phase = Phase::GameOver;
        info!(score = self.score, lines = self.lines, "game over");
    }

    /// Shift the active block by `(dx, dy)` if the target placement is free
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        let (Some(size), Some(mask), Some(position)) = (
            self.table.size(id),
            self.table.contents(id),
            self.table.position(id),
        ) else {
            return false;
        };

        let target = Point::new(position.x + dx, position.y + dy);
        if !self.grid.can_place(size, mask, target) {
            return false;
        }
        self.table.translate(id, Point::new(dx, dy)).is_ok()
    }

    /// Rotate the active block, nudging it by the first kick that fits
    pub fn try_rotate(&mut self, rotation: Point) -> bool {
        let Some(id) = self.active else {
            return false;
        };
        let (Some(size), Some(mask), Some(position)) = (
            self.table.size(id),
            self.table.contents(id),
            self.table.position(id),
        ) else {
            return false;
        };

        let rotated = transform_mask(mask, size, rotation);
        let Some(kick) = ROTATION_KICKS.iter().copied().find(|kick| {
            self.grid
                .can_place(size, rotated, Point::new(position.x + kick.x, position.y + kick.y))
        }) else {
            return false;
        };

        self.table.transform(id, rotation).is_ok() && self.table.translate(id, kick).is_ok()
    }

    /// Rows the active block can still fall
    pub fn drop_distance(&self) -> u32 {
        self.active
            .map(|id| self.grid.drop_distance(&self.table, id))
            .unwrap_or(0)
    }

    /// Grid row the active block's position would have after a hard drop
    pub fn ghost_y(&self) -> Option<i32> {
        let id = self.active?;
        let position = self.table.position(id)?;
        Some(position.y + self.drop_distance() as i32)
    }

    /// Drop the active block to the floor and lock it. Returns the distance fallen.
    pub fn hard_drop(&mut self) -> Result<u32, EngineError> {
        let Some(id) = self.active else {
            return Ok(0);
        };
        let distance = self.drop_distance();
        self.table.translate(id, Point::new(0, distance as i32))?;
        self.lock()?;
        Ok(distance)
    }

    /// Bake the active block into the grid, then score and animate full rows
    /// or spawn the next block.
    pub fn lock(&mut self) -> Result<(), EngineError> {
        let Some(id) = self.active else {
            return Ok(());
        };
        self.grid.commit(&mut self.table, id)?;
        self.active = None;

        if self.grid.full_row_count() == 0 {
            self.spawn()?;
            return Ok(());
        }

        let points = self.grid.assess_score(self.level)?;
        self.score = self.score.saturating_add(points);
        self.grid.prepare_animation(self.config.framerate)?;
        self.phase = Phase::Clearing;
        debug!(points, score = self.score, "rows clearing");
        Ok(())
    }

    /// Apply one player action. Returns whether anything changed.
    pub fn apply_action(&mut self, action: Action) -> Result<bool, EngineError> {
        if self.phase != Phase::Falling {
            return Ok(false);
        }
        let changed = match action {
            Action::MoveLeft => self.try_move(-1, 0),
            Action::MoveRight => self.try_move(1, 0),
            Action::SoftDrop => {
                let moved = self.try_move(0, 1);
                if moved {
                    self.drop_timer = 0;
                }
                moved
            }
            Action::HardDrop => {
                self.hard_drop()?;
                true
            }
            Action::RotateCw => self.try_rotate(ROTATE_CW),
            Action::RotateCcw => self.try_rotate(ROTATE_CCW),
            Action::Rotate180 => self.try_rotate(ROTATE_180),
        };
        Ok(changed)
    }

    /// Advance one frame: gravity while falling, the clear animation while clearing.
    ///
    /// Returns whether the visible state changed.
    pub fn tick(&mut self) -> Result<bool, EngineError> {
        match self.phase {
            Phase::GameOver => Ok(false),
            Phase::Clearing => match self.grid.run_animation_frame() {
                AnimationFrame::Finished | AnimationFrame::Idle => {
                    self.finish_clear()?;
                    Ok(true)
                }
                AnimationFrame::Advanced => Ok(true),
                AnimationFrame::Waiting => Ok(false),
            },
            Phase::Falling => {
                self.drop_timer += 1;
                if self.drop_timer < get_drop_interval_frames(self.level, self.config.framerate) {
                    return Ok(false);
                }
                self.drop_timer = 0;
                if !self.try_move(0, 1) {
                    self.lock()?;
                }
                Ok(true)
            }
        }
    }

    fn finish_clear(&mut self) -> Result<(), EngineError> {
        let mut cleared = 0;
        loop {
            let rows = self.grid.resolve_rows(&mut self.table)?;
            if rows == 0 {
                break;
            }
            cleared += rows as u32;
        }

        self.lines = self.lines.saturating_add(cleared);
        let level = calculate_level(self.lines);
        if level != self.level {
            info!(level, lines = self.lines, "level up");
            self.level = level;
        }
        self.spawn()?;
        Ok(())
    }

    /// Wipe the grid, any running clear and the statistics, then start over
    /// with a new seed
    pub fn restart(&mut self, seed: u32) -> Result<(), EngineError> {
        if let Some(id) = self.active.take() {
            self.table.remove(id)?;
        }
        self.grid.reset(&mut self.table)?;
        self.bag = PresetBag::new(seed);
        self.score = 0;
        self.level = 0;
        self.lines = 0;
        self.drop_timer = 0;
        self.spawn()?;
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            grid: GridSnapshot::capture(&self.grid),
            active: self
                .active
                .and_then(|id| BlockSnapshot::capture(&self.table, id)),
            ghost_y: self.ghost_y(),
            next: self.next_kind(),
            phase: self.phase,
            score: self.score,
            level: self.level,
            lines: self.lines,
        }
    }
}

/// Serializable state of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub grid: GridSnapshot,
    pub active: Option<BlockSnapshot>,
    pub ghost_y: Option<i32>,
    pub next: PieceKind,
    pub phase: Phase,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall_core::types::Color;

    fn small_config() -> EngineConfig {
        EngineConfig {
            grid_width: 4,
            grid_height: 6,
            max_blocks: 16,
            framerate: 30,
        }
    }

    #[test]
    fn test_new_spawns_at_top_center() {
        let session = Session::new(EngineConfig::default(), 1).unwrap();
        let id = session.active().unwrap();
        assert_eq!(session.table().position(id), Some(Point::new(5, SPAWN_ROW)));
        assert_eq!(session.phase(), Phase::Falling);
        assert!(session.grid().can_place_block(session.table(), id));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig {
            framerate: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            Session::new(config, 1).err(),
            Some(EngineError::InvalidConfig("framerate"))
        );
    }

    #[test]
    fn test_moves_stop_at_walls() {
        let mut session = Session::new(EngineConfig::default(), 3).unwrap();
        let mut moves = 0;
        while session.apply_action(Action::MoveLeft).unwrap() {
            moves += 1;
            assert!(moves < 20);
        }
        let id = session.active().unwrap();
        let table = session.table();
        let cells = blockfall_core::block_cells(
            table.size(id).unwrap(),
            table.contents(id).unwrap(),
            table.position(id).unwrap(),
        );
        assert_eq!(cells.iter().map(|c| c.x).min(), Some(0));
    }

    #[test]
    fn test_rotation_round_trip() {
        let mut session = Session::new(EngineConfig::default(), 5).unwrap();
        let id = session.active().unwrap();
        // Move away from the top so no kick is needed.
        session.apply_action(Action::SoftDrop).unwrap();
        session.apply_action(Action::SoftDrop).unwrap();
        let before = session.table().contents(id);

        assert!(session.apply_action(Action::RotateCw).unwrap());
        assert!(session.apply_action(Action::RotateCcw).unwrap());
        assert_eq!(session.table().contents(id), before);
    }

    #[test]
    fn test_hard_drop_locks_and_spawns_next() {
        let mut session = Session::new(EngineConfig::default(), 9).unwrap();
        let first = session.active().unwrap();
        let distance = session.hard_drop().unwrap();
        assert!(distance > 0);

        // The locked block keeps its id as a grid owner.
        assert_eq!(session.table().contents(first), Some(0));
        assert_eq!(session.table().cell_count(first), 4);
        assert!(session.grid().cells().contains(&Some(first)));
        assert_ne!(session.active(), Some(first));
        assert_eq!(session.phase(), Phase::Falling);
    }

    #[test]
    fn test_gravity_moves_after_interval() {
        let mut session = Session::new(EngineConfig::default(), 2).unwrap();
        let id = session.active().unwrap();
        let y0 = session.table().position(id).unwrap().y;

        // Level 0 at 60 fps: one row per 60 frames.
        for _ in 0..59 {
            assert!(!session.tick().unwrap());
        }
        assert!(session.tick().unwrap());
        assert_eq!(session.table().position(id).unwrap().y, y0 + 1);
    }

    /// Fill the bottom row of a 4-wide grid except columns 2-3 and make a
    /// horizontal domino above the gap the active block. Returns
    /// `(filler, domino)`.
    fn stage_single_line(session: &mut Session) -> (BlockId, BlockId) {
        if let Some(active) = session.active.take() {
            session.table.remove(active).unwrap();
        }
        let bottom = session.grid.height() as i32 - 1;

        let filler = session
            .table
            .create(1, 1, Point::new(0, bottom), Color::default())
            .unwrap();
        session.grid.commit(&mut session.table, filler).unwrap();
        let filler2 = session
            .table
            .create(1, 1, Point::new(1, bottom), Color::default())
            .unwrap();
        session.grid.commit(&mut session.table, filler2).unwrap();

        // Horizontal domino on a 2x2 lattice covering columns 2-3.
        let domino = session
            .table
            .create(2, 0b0011, Point::new(3, 1), Color::default())
            .unwrap();
        session.active = Some(domino);
        (filler, domino)
    }

    #[test]
    fn test_clear_cycle_scores_and_resolves() {
        let mut session = Session::new(small_config(), 1).unwrap();
        let (filler, domino) = stage_single_line(&mut session);
        session.hard_drop().unwrap();

        assert_eq!(session.phase(), Phase::Clearing);
        assert_eq!(session.score(), 40);
        assert!(!session.apply_action(Action::MoveLeft).unwrap());

        let mut frames = 0;
        while session.phase() == Phase::Clearing {
            session.tick().unwrap();
            frames += 1;
            assert!(frames < 100);
        }
        assert_eq!(session.lines(), 1);
        assert!(session.grid().cells().iter().all(Option::is_none));
        assert!(!session.table().exists(filler));
        assert!(!session.table().exists(domino));
        assert!(session.active().is_some());
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let mut session = Session::new(small_config(), 4).unwrap();
        let mut drops = 0;
        while !session.is_game_over() {
            session.apply_action(Action::HardDrop).unwrap();
            while session.phase() == Phase::Clearing {
                session.tick().unwrap();
            }
            drops += 1;
            assert!(drops < 50, "narrow grid should fill up quickly");
        }
        assert_eq!(session.active(), None);
        assert!(!session.tick().unwrap());
        assert!(!session.apply_action(Action::HardDrop).unwrap());
    }

    #[test]
    fn test_restart_releases_every_block() {
        let mut session = Session::new(EngineConfig::default(), 8).unwrap();
        for _ in 0..3 {
            session.hard_drop().unwrap();
        }
        session.restart(8).unwrap();
        assert!(session.grid().cells().iter().all(Option::is_none));
        assert_eq!(session.table().live_count(), 1, "only the new active block");
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_restart_during_clear_allows_next_clear() {
        let config = EngineConfig {
            framerate: 60,
            ..small_config()
        };
        let mut session = Session::new(config, 1).unwrap();
        stage_single_line(&mut session);
        session.hard_drop().unwrap();
        assert_eq!(session.phase(), Phase::Clearing);
        session.tick().unwrap();
        session.tick().unwrap();

        session.restart(2).unwrap();
        assert_eq!(session.phase(), Phase::Falling);
        assert!(!session.grid().is_animating());
        assert_eq!(session.grid().row_progress(5), (0, 0));

        stage_single_line(&mut session);
        session.hard_drop().unwrap();
        assert_eq!(session.phase(), Phase::Clearing);
        while session.phase() == Phase::Clearing {
            session.tick().unwrap();
        }
        assert_eq!(session.lines(), 1);
    }

    #[test]
    fn test_full_table_at_spawn_ends_game() {
        // Wide enough that no single piece completes a row.
        let config = EngineConfig {
            max_blocks: 1,
            ..EngineConfig::default()
        };
        let mut session = Session::new(config, 1).unwrap();
        let first = session.active().unwrap();

        // The locked block keeps the only id, so the next spawn has none.
        assert_eq!(session.hard_drop().map(|d| d > 0), Ok(true));
        assert!(session.is_game_over());
        assert_eq!(session.active(), None);
        assert!(session.table().exists(first));
        assert_eq!(session.tick(), Ok(false));
    }

    #[test]
    fn test_snapshot_serializes() {
        let session = Session::new(EngineConfig::default(), 6).unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, Phase::Falling);
        assert_eq!(snapshot.active.as_ref().map(|a| a.cells.len()), Some(4));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "falling");
        assert_eq!(json["grid"]["width"], 10);
    }
}
