//! Scoring module - clear rewards, levels and the turn timer curve
//!
//! Clearing is rewarded superlinearly: every full line multiplies the
//! (deduplicated) cell count, so a row and a column cleared together count
//! their shared cell once in `cells` but twice through `lines`.

use std::time::Duration;

use crate::config::TimerConfig;
use crate::types::{POINTS_PER_CELL, POINTS_PER_LEVEL};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    /// Full rows plus full columns
    pub lines: u32,
    /// Distinct cells emptied
    pub cells: u32,
    pub multiplier: u32,
    pub total: u32,
}

/// Points for one clear: `lines * cells * 10 * multiplier`
pub fn calculate_score(lines: usize, cells: usize, multiplier: u32) -> ScoreResult {
    let lines = lines as u32;
    let cells = cells as u32;
    let total = lines
        .saturating_mul(cells)
        .saturating_mul(POINTS_PER_CELL)
        .saturating_mul(multiplier);
    ScoreResult {
        lines,
        cells,
        multiplier,
        total,
    }
}

/// Level reached at a given score
pub fn level_for_score(score: u32) -> u32 {
    score / POINTS_PER_LEVEL
}

/// Turn length at a level: `max(floor, base - step * level)`
pub fn timer_delay(config: &TimerConfig, level: u32) -> Duration {
    let reduction = config.step_ms.saturating_mul(level as u64);
    let ms = config.base_ms.saturating_sub(reduction).max(config.floor_ms);
    Duration::from_millis(ms)
}

/// Offsets into a turn at which the low-time warnings fire
pub fn warning_offsets(config: &TimerConfig, delay: Duration) -> [Duration; 3] {
    let ms = delay.as_millis() as u64;
    config
        .warning_percents
        .map(|percent| Duration::from_millis(ms * percent / 100))
}
