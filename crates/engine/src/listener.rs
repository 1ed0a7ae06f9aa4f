use std::time::Duration;

use tetrecs_core::{GamePiece, ScoreResult};
use tetrecs_types::GridCoord;

/// Receives session notifications, one at a time and in the order they
/// happened
///
/// Every method has an empty default, so listeners only implement what they
/// display. Callbacks run on whichever thread drove the change (the caller of
/// a session method, or the timer thread); they may call back into the
/// session.
pub trait GameListener: Send + Sync {
    /// The following piece became current
    fn on_next_piece(&self, _current: &GamePiece, _following: &GamePiece) {}

    /// Full rows/columns were emptied
    fn on_line_cleared(&self, _coords: &[GridCoord], _score: &ScoreResult) {}

    /// A new turn started and the timer was (re)armed for `delay`
    fn on_tick(&self, _delay: Duration) {}

    /// The current turn is running low; stage 0 is the first warning
    fn on_timer_warning(&self, _stage: usize) {}

    /// The game ended
    fn on_game_over(&self, _score: u32) {}
}
