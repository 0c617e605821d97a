//! Board controller: owns the grid, the animators and the tile source, and
//! runs one tick in a fixed order.
//!
//! # Tick order
//!
//! 1. **Resolve match**: an activation discards the clicked same-colour group.
//! 2. **Settle**: gravity per [`SettleStrategy`], then one condense pass.
//! 3. **Spawn**: a requested column shifts the board left and fills the
//!    right edge with fresh random tiles that slide in from off-board.
//! 4. **Animate**: every in-flight animator advances one step.
//!
//! A spawn that would push tiles past the left edge ends the session with
//! [`GameStatus::BoardFull`]. A placement conflict during settling or
//! spawning is a broken invariant: the board parks in [`Phase::Failed`],
//! the error is returned once, and later ticks return [`BoardError::Halted`].

use crate::animation::{Animations, DEFAULT_STEPS};
use crate::condense;
use crate::error::BoardError;
use crate::gravity::{self, SettleStrategy};
use crate::grid::{BoardLayout, TileGrid};
use crate::matching;
use crate::tile::{Point, TileColor, TileFactory, TileId};
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Board width in tiles.
pub const DEFAULT_WIDTH: usize = 14;
/// Board height in tiles.
pub const DEFAULT_HEIGHT: usize = 8;
/// Animator slots: two per cell covers a full-board shift plus a fall.
pub const DEFAULT_ANIMATION_CAPACITY: usize = 224;
/// Ticks a manual spawn must wait after the previous spawn.
pub const DEFAULT_SPAWN_COOLDOWN: u32 = 30;
/// Period of the timer-driven column feed.
pub const DEFAULT_FEED_PERIOD_MS: u64 = 6000;

#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    /// Number of colours in play, 1..=6.
    pub colors: u8,
    pub animation_capacity: usize,
    pub animation_steps: u32,
    pub spawn_cooldown_ticks: u32,
    /// Read by the front end's timer; the board itself has no clock.
    pub feed_period_ms: u64,
    pub settle: SettleStrategy,
    /// Fixed seed for reproducible boards; `None` seeds from the OS.
    pub seed: Option<u64>,
    pub layout: BoardLayout,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            colors: TileColor::COUNT as u8,
            animation_capacity: DEFAULT_ANIMATION_CAPACITY,
            animation_steps: DEFAULT_STEPS,
            spawn_cooldown_ticks: DEFAULT_SPAWN_COOLDOWN,
            feed_period_ms: DEFAULT_FEED_PERIOD_MS,
            settle: SettleStrategy::default(),
            seed: None,
            layout: BoardLayout::default(),
        }
    }
}

/// Where the controller is in its tick. Between ticks it is `Idle` or terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ResolvingMatch,
    Settling,
    SpawningColumn,
    /// Board full; no further input is accepted.
    GameOver,
    /// A grid invariant broke; the board refuses to run.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Running,
    BoardFull,
    Failed,
}

/// Why a column is being fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnTrigger {
    /// Player request; ignored while the cooldown runs.
    Manual,
    /// Periodic feed; always runs and re-arms the cooldown.
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// A column of this many tiles entered on the right.
    Spawned(usize),
    CoolingDown,
    BoardFull,
    /// The board is already over; nothing happened.
    Ignored,
}

/// Discrete input for one tick, already translated to grid coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub activate: Option<(i32, i32)>,
    pub spawn: Option<SpawnTrigger>,
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub discarded: usize,
    pub fallen: usize,
    pub condensed: usize,
    pub spawned: usize,
    pub spawn_refused: bool,
    pub animations_finished: usize,
    pub animations_in_flight: usize,
    pub status: GameStatus,
}

#[derive(Debug, Clone)]
pub struct Board {
    config: BoardConfig,
    grid: TileGrid,
    animations: Animations,
    factory: TileFactory,
    rng: StdRng,
    phase: Phase,
    cooldown: u32,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            grid: TileGrid::new(config.width, config.height),
            animations: Animations::new(config.animation_capacity, config.animation_steps),
            factory: TileFactory::new(config.colors),
            rng,
            phase: Phase::Idle,
            cooldown: 0,
            config,
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn animations(&self) -> &Animations {
        &self.animations
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.config.layout
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn status(&self) -> GameStatus {
        match self.phase {
            Phase::GameOver => GameStatus::BoardFull,
            Phase::Failed => GameStatus::Failed,
            _ => GameStatus::Running,
        }
    }

    fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver | Phase::Failed)
    }

    /// (colour, screen position) of every tile, column-major.
    pub fn sprites(&self) -> impl Iterator<Item = (TileColor, Point)> + '_ {
        self.grid.render_iter().map(|(_, _, tile)| (tile.color, tile.pos))
    }

    /// Place a tile of `color_id` directly at rest in cell `(x, y)`.
    pub fn place(&mut self, x: usize, y: usize, color_id: u8) -> Result<TileId, BoardError> {
        let mut tile = self.factory.create(color_id)?;
        tile.pos = self.config.layout.pos_at(x as i32, y as i32);
        self.grid.put(x, y, tile)
    }

    /// Fill the rightmost `columns` columns with random tiles at rest.
    pub fn populate(&mut self, columns: usize) -> Result<usize, BoardError> {
        let width = self.grid.width();
        let mut placed = 0;
        for x in width.saturating_sub(columns)..width {
            for y in 0..self.grid.height() {
                let mut tile = self.factory.random(&mut self.rng);
                tile.pos = self.config.layout.pos_at(x as i32, y as i32);
                self.grid.put(x, y, tile)?;
                placed += 1;
            }
        }
        Ok(placed)
    }

    /// Discard the same-colour group at `(x, y)`. Returns the number removed.
    pub fn activate(&mut self, x: i32, y: i32) -> usize {
        if self.is_over() {
            return 0;
        }
        self.phase = Phase::ResolvingMatch;
        let discarded = matching::discard_connected(&mut self.grid, x, y);
        if discarded > 0 {
            log::info!("{discarded} tiles discarded at ({x},{y})");
        }
        self.phase = Phase::Idle;
        discarded
    }

    /// Gravity per the configured strategy, then one condense pass.
    /// Returns `(fallen, condensed)` tile moves.
    pub fn settle(&mut self) -> Result<(usize, usize), BoardError> {
        if self.is_over() {
            return Ok((0, 0));
        }
        self.phase = Phase::Settling;
        let fallen = gravity::settle(
            &mut self.grid,
            &mut self.animations,
            &self.config.layout,
            self.config.settle,
        );
        let condensed =
            condense::apply(&mut self.grid, &mut self.animations, &self.config.layout);
        let condensed = self.escalate(condensed)?;
        self.phase = Phase::Idle;
        Ok((fallen, condensed))
    }

    /// Shift every column one to the left and fill the right edge with new tiles.
    pub fn spawn_column(&mut self, trigger: SpawnTrigger) -> Result<SpawnOutcome, BoardError> {
        if self.is_over() {
            return Ok(SpawnOutcome::Ignored);
        }
        if trigger == SpawnTrigger::Manual && self.cooldown > 0 {
            return Ok(SpawnOutcome::CoolingDown);
        }
        let (width, height) = (self.grid.width(), self.grid.height());
        if width == 0 || height == 0 {
            return Ok(SpawnOutcome::Spawned(0));
        }
        if !self.grid.is_column_empty(0) {
            log::info!("board full: column 0 is occupied, no room to feed");
            self.phase = Phase::GameOver;
            return Ok(SpawnOutcome::BoardFull);
        }

        self.phase = Phase::SpawningColumn;
        let layout = self.config.layout;
        for x in 1..width {
            if !self.grid.is_column_empty(x) {
                let shifted = condense::displace_column(
                    &mut self.grid,
                    &mut self.animations,
                    &layout,
                    x,
                    x - 1,
                );
                self.escalate(shifted)?;
            }
        }
        let edge = width - 1;
        for y in 0..height {
            let mut tile = self.factory.random(&mut self.rng);
            tile.pos = layout.pos_at(width as i32, y as i32);
            let placed = self.grid.put(edge, y, tile);
            let id = self.escalate(placed)?;
            self.animations
                .schedule(&mut self.grid, id, layout.pos_at(edge as i32, y as i32));
        }
        self.cooldown = self.config.spawn_cooldown_ticks;
        self.phase = Phase::Idle;
        Ok(SpawnOutcome::Spawned(height))
    }

    /// A grid conflict while moving tiles means the board state can no
    /// longer be trusted: park in [`Phase::Failed`] and hand the error back.
    fn escalate<T>(&mut self, result: Result<T, BoardError>) -> Result<T, BoardError> {
        if let Err(err) = &result {
            log::warn!("board halted: {err}");
            self.phase = Phase::Failed;
        }
        result
    }

    /// Run one tick: match, settle, optional spawn, then advance animations.
    pub fn tick(&mut self, input: TickInput) -> Result<TickReport, BoardError> {
        if self.phase == Phase::Failed {
            return Err(BoardError::Halted);
        }
        let mut report = TickReport::default();
        if !self.is_over() {
            if let Some((x, y)) = input.activate {
                report.discarded = self.activate(x, y);
            }
            (report.fallen, report.condensed) = self.settle()?;
            if let Some(trigger) = input.spawn {
                match self.spawn_column(trigger)? {
                    SpawnOutcome::Spawned(n) => report.spawned = n,
                    SpawnOutcome::CoolingDown => report.spawn_refused = true,
                    SpawnOutcome::BoardFull | SpawnOutcome::Ignored => {}
                }
            }
        }
        report.animations_finished = self.animations.tick(&mut self.grid);
        report.animations_in_flight = self.animations.in_flight();
        self.cooldown = self.cooldown.saturating_sub(1);
        report.status = self.status();
        Ok(report)
    }

    /// Snap all moving tiles onto their cells.
    pub fn finish_animations(&mut self) {
        self.animations.finish_all(&mut self.grid);
    }
}
