/// Failures of the game state machine
///
/// Invalid moves are not errors: they come back as `false` and change nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GameError {
    /// The piece source had nothing to hand out; the turn was blocked
    #[display("piece source has no piece available")]
    PieceQueueUnderrun,
}

impl GameError {
    pub fn code(self) -> &'static str {
        match self {
            GameError::PieceQueueUnderrun => "piece_queue_underrun",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            GameError::PieceQueueUnderrun => "no piece available, turn blocked",
        }
    }
}
