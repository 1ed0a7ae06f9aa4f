//! Game configuration
//!
//! Defaults describe the standard 5x5 challenge; `from_env` lets the binary and
//! tests override them without code changes.

use crate::types::{
    DEFAULT_COLS, DEFAULT_ROWS, TIMER_BASE_MS, TIMER_FLOOR_MS, TIMER_STEP_MS, WARNING_PERCENTS,
};

/// Turn timer curve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub base_ms: u64,
    pub step_ms: u64,
    pub floor_ms: u64,
    /// Percentages of the turn at which low-time warnings fire
    pub warning_percents: [u64; 3],
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            base_ms: TIMER_BASE_MS,
            step_ms: TIMER_STEP_MS,
            floor_ms: TIMER_FLOOR_MS,
            warning_percents: WARNING_PERCENTS,
        }
    }
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub cols: usize,
    pub rows: usize,
    /// Name reported in the score history of a local game
    pub player_name: String,
    pub timer: TimerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            player_name: "Player".to_string(),
            timer: TimerConfig::default(),
        }
    }
}

impl GameConfig {
    /// Create from environment variables
    ///
    /// - `TETRECS_COLS` / `TETRECS_ROWS`: grid size (default 5x5)
    /// - `TETRECS_PLAYER`: player name
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let dim = |key: &str, default: usize| {
            env::var(key)
                .ok()
                .and_then(|s| s.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(default)
        };

        let player_name = env::var("TETRECS_PLAYER")
            .ok()
            .map(|s| s.trim().replace(':', ""))
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.player_name);

        Self {
            cols: dim("TETRECS_COLS", defaults.cols),
            rows: dim("TETRECS_ROWS", defaults.rows),
            player_name,
            timer: defaults.timer,
        }
    }

    /// Same configuration with a different grid size
    pub fn with_size(mut self, cols: usize, rows: usize) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }
}
