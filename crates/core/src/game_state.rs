//! Game state module - the turn-based state machine
//!
//! Ties together the grid, the piece slots, scoring and the piece source.
//! Phases: `Created → Initialized → Running → GameOver`, with `Stopped` for a
//! game abandoned before it ended.
//!
//! The state is single-threaded and clock-free. Everything observers care about
//! is queued as a [`GameEvent`] and drained with [`GameState::take_events`];
//! [`GameEvent::TurnStarted`] is the signal to (re)arm the turn timer.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::GameConfig;
use crate::grid::{CellObserver, Grid};
use crate::pieces::GamePiece;
use crate::scores::ScoreList;
use crate::scoring::{calculate_score, level_for_score, timer_delay, ScoreResult};
use crate::snapshot::{GameSnapshot, PieceSnapshot};
use crate::source::PieceSource;
use crate::types::{
    GameAction, GridCoord, ScoreEntry, BASE_MULTIPLIER, STARTING_LIVES,
};
use crate::GameError;

/// Lifecycle phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// No values or pieces yet
    Created,
    /// Values reset, waiting for the first two pieces
    Initialized,
    /// Accepting placements, rotations, swaps and ticks
    Running,
    /// Lives ran out (terminal)
    GameOver,
    /// Abandoned before the game ended (terminal)
    Stopped,
}

/// Something observers should hear about, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The following piece became current
    NextPiece {
        current: GamePiece,
        following: GamePiece,
    },
    /// Full rows/columns were emptied
    LinesCleared {
        coords: Vec<GridCoord>,
        score: ScoreResult,
    },
    /// A new turn began; the turn timer should run for `delay`
    TurnStarted { delay: Duration },
    /// The game ended
    GameOver { score: u32 },
}

/// Result of a turn timer expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A life was lost and the next turn runs for `delay`
    Continue { delay: Duration },
    /// The last life was lost
    GameOver,
    /// The game is not running; nothing changed
    Ignored,
}

/// Complete game state
pub struct GameState<S> {
    config: GameConfig,
    grid: Grid,
    source: S,
    phase: GamePhase,
    score: u32,
    level: u32,
    lives: u32,
    multiplier: u32,
    current: Option<GamePiece>,
    following: Option<GamePiece>,
    scores: ScoreList,
    events: Vec<GameEvent>,
}

impl<S: PieceSource> GameState<S> {
    /// Create a game in the `Created` phase
    pub fn new(config: GameConfig, source: S) -> Self {
        let grid = Grid::new(config.cols, config.rows);
        Self {
            config,
            grid,
            source,
            phase: GamePhase::Created,
            score: 0,
            level: 0,
            lives: STARTING_LIVES,
            multiplier: BASE_MULTIPLIER,
            current: None,
            following: None,
            scores: ScoreList::new(),
            events: Vec::new(),
        }
    }

    /// Reset score, level, lives and multiplier; enter `Initialized`
    pub fn initialise(&mut self) {
        self.score = 0;
        self.level = 0;
        self.lives = STARTING_LIVES;
        self.multiplier = BASE_MULTIPLIER;
        self.current = None;
        self.following = None;
        self.phase = GamePhase::Initialized;
    }

    /// Draw the first two pieces and start the first turn
    ///
    /// Does nothing unless the game is `Initialized`.
    pub fn deal_initial_pieces(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Initialized {
            return Ok(());
        }
        let first = self.source.next_piece().ok_or(GameError::PieceQueueUnderrun)?;
        self.following = Some(first);
        self.advance_piece()?;
        self.phase = GamePhase::Running;
        self.start_turn();
        Ok(())
    }

    /// Initialise and deal in one step (local games)
    pub fn start(&mut self) -> Result<(), GameError> {
        self.initialise();
        self.deal_initial_pieces()
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn current(&self) -> Option<GamePiece> {
        self.current
    }

    pub fn following(&self) -> Option<GamePiece> {
        self.following
    }

    /// Score history (server scores, or the local result after game over)
    pub fn scores(&self) -> &ScoreList {
        &self.scores
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Subscribe to grid cell writes
    ///
    /// The observer runs while the game is being mutated, so it must not read
    /// or change the game (or a session wrapping it); copy what it needs.
    pub fn observe_grid(&mut self, observer: CellObserver) {
        self.grid.set_observer(observer);
    }

    /// Turn length at the current level
    pub fn timer_delay(&self) -> Duration {
        timer_delay(&self.config.timer, self.level)
    }

    /// Take and clear the queued events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Replace the score history with an already-sorted list
    pub fn set_scores(&mut self, scores: ScoreList) {
        self.scores = scores;
    }

    /// Place the current piece centred on (x, y)
    ///
    /// Returns `Ok(false)` for an invalid move or a game that is not running;
    /// nothing changes in that case. A starved piece source is an error and
    /// also leaves the state untouched.
    pub fn place_at(&mut self, x: i32, y: i32) -> Result<bool, GameError> {
        if !self.is_running() {
            return Ok(false);
        }
        let Some(piece) = self.current else {
            return Ok(false);
        };
        if !self.source.has_next() {
            return Err(GameError::PieceQueueUnderrun);
        }
        if !self.grid.place(&piece, x, y) {
            return Ok(false);
        }

        self.evaluate_lines();
        self.advance_piece()?;
        self.start_turn();
        self.source.after_placement(&self.grid);
        Ok(true)
    }

    /// Make the following piece current and draw a new following piece
    pub fn advance_piece(&mut self) -> Result<(), GameError> {
        let next = self.source.next_piece().ok_or(GameError::PieceQueueUnderrun)?;
        self.current = self.following.replace(next);
        if let Some(current) = self.current {
            self.events.push(GameEvent::NextPiece {
                current,
                following: next,
            });
        }
        Ok(())
    }

    /// Exchange current and following pieces
    pub fn swap_pieces(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        std::mem::swap(&mut self.current, &mut self.following);
        true
    }

    /// Turn the current piece clockwise
    pub fn rotate_current(&mut self) -> bool {
        self.turn_current(|p| p.rotated())
    }

    /// Turn the current piece counter-clockwise
    pub fn rotate_current_ccw(&mut self) -> bool {
        self.turn_current(|p| p.rotated_ccw())
    }

    fn turn_current(&mut self, turn: impl FnOnce(&GamePiece) -> GamePiece) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.current.as_mut() {
            Some(piece) => {
                *piece = turn(piece);
                true
            }
            None => false,
        }
    }

    /// Clear every full row and column
    ///
    /// Returns the score awarded, or None if nothing was full (which also
    /// breaks the multiplier streak).
    pub fn evaluate_lines(&mut self) -> Option<ScoreResult> {
        let cols = self.grid.cols();
        let rows = self.grid.rows();
        let mut lines = 0usize;
        let mut clear: BTreeSet<GridCoord> = BTreeSet::new();

        for y in (0..rows).filter(|&y| self.grid.is_row_full(y)) {
            lines += 1;
            clear.extend((0..cols).map(|x| GridCoord::new(x, y)));
        }
        for x in (0..cols).filter(|&x| self.grid.is_col_full(x)) {
            lines += 1;
            clear.extend((0..rows).map(|y| GridCoord::new(x, y)));
        }

        if clear.is_empty() {
            self.reset_multiplier();
            return None;
        }

        let result = calculate_score(lines, clear.len(), self.multiplier);
        self.score = self.score.saturating_add(result.total);
        self.multiplier += 1;
        self.level = level_for_score(self.score);

        for &coord in &clear {
            self.grid.clear_cell(coord);
        }

        self.events.push(GameEvent::LinesCleared {
            coords: clear.into_iter().collect(),
            score: result,
        });
        Some(result)
    }

    /// Turn timer expired: lose a life and move on to the next piece
    ///
    /// The tick that takes the last life ends the game; later ticks are
    /// ignored.
    pub fn tick(&mut self) -> Result<TickOutcome, GameError> {
        if !self.is_running() {
            return Ok(TickOutcome::Ignored);
        }
        let ends_game = self.lives <= 1;
        if !ends_game && !self.source.has_next() {
            return Err(GameError::PieceQueueUnderrun);
        }

        self.reset_multiplier();
        self.lives = self.lives.saturating_sub(1);
        if ends_game {
            self.game_over();
            return Ok(TickOutcome::GameOver);
        }

        self.advance_piece()?;
        let delay = self.start_turn();
        Ok(TickOutcome::Continue { delay })
    }

    /// Apply a player action
    pub fn apply_action(&mut self, action: GameAction) -> Result<bool, GameError> {
        match action {
            GameAction::Place { x, y } => self.place_at(x, y),
            GameAction::RotateCw => Ok(self.rotate_current()),
            GameAction::RotateCcw => Ok(self.rotate_current_ccw()),
            GameAction::Swap => Ok(self.swap_pieces()),
        }
    }

    /// Abandon the game; later actions and ticks are ignored
    pub fn stop(&mut self) {
        if self.phase != GamePhase::GameOver {
            self.phase = GamePhase::Stopped;
        }
    }

    /// Capture a read-only copy for observers
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            cols: self.grid.cols(),
            rows: self.grid.rows(),
            cells: self.grid.cells().to_vec(),
            phase: self.phase,
            score: self.score,
            level: self.level,
            lives: self.lives,
            multiplier: self.multiplier,
            current: self.current.map(PieceSnapshot::from),
            following: self.following.map(PieceSnapshot::from),
            timer_ms: self.timer_delay().as_millis() as u64,
        }
    }

    fn start_turn(&mut self) -> Duration {
        let delay = self.timer_delay();
        self.events.push(GameEvent::TurnStarted { delay });
        delay
    }

    fn reset_multiplier(&mut self) {
        if self.multiplier > BASE_MULTIPLIER {
            self.multiplier = BASE_MULTIPLIER;
        }
    }

    fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        if self.scores.is_empty() {
            self.scores = ScoreList::from_entries([ScoreEntry::new(
                self.config.player_name.clone(),
                self.score,
            )]);
        }
        self.events.push(GameEvent::GameOver { score: self.score });
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for GameState<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("phase", &self.phase)
            .field("score", &self.score)
            .field("level", &self.level)
            .field("lives", &self.lives)
            .field("multiplier", &self.multiplier)
            .field("current", &self.current)
            .field("following", &self.following)
            .field("source", &self.source)
            .field("grid", &self.grid)
            .finish()
    }
}
