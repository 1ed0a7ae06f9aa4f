use serde::Serialize;

use crate::game_state::GamePhase;
use crate::pieces::GamePiece;
use crate::types::{PieceKind, Rotation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub rotation: Rotation,
}

impl From<GamePiece> for PieceSnapshot {
    fn from(value: GamePiece) -> Self {
        Self {
            kind: value.kind(),
            rotation: value.rotation(),
        }
    }
}

/// Read-only copy of everything an observer displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub cols: usize,
    pub rows: usize,
    /// Row-major cell values
    pub cells: Vec<u8>,
    pub phase: GamePhase,
    pub score: u32,
    pub level: u32,
    pub lives: u32,
    pub multiplier: u32,
    pub current: Option<PieceSnapshot>,
    pub following: Option<PieceSnapshot>,
    pub timer_ms: u64,
}

impl GameSnapshot {
    /// Cell at (x, y), None outside the grid
    pub fn cell(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        self.cells.get(y * self.cols + x).copied()
    }

    pub fn playable(&self) -> bool {
        self.phase == GamePhase::Running
    }
}
