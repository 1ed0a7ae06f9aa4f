//! Pieces module - the fifteen block patterns and their rotation
//!
//! Every piece lives in a 3x3 box. Patterns are stored row-major
//! (`pattern[y][x]`) with each cell either empty or the piece's colour value.
//! Rotation is a pure 90° clockwise transform of the box.

use std::fmt;

use arrayvec::ArrayVec;

use crate::types::{PieceKind, Rotation, EMPTY, PIECE_SIZE};

/// A 3x3 block pattern, row-major
pub type Pattern = [[u8; PIECE_SIZE]; PIECE_SIZE];

/// Offset of one block relative to the top-left corner of the box, with its value
pub type Block = (i32, i32, u8);

/// Spawn layout (North orientation) for a piece kind, as a 0/1 mask
fn spawn_mask(kind: PieceKind) -> [[u8; PIECE_SIZE]; PIECE_SIZE] {
    match kind {
        PieceKind::Line => [[0, 0, 0], [1, 1, 1], [0, 0, 0]],
        PieceKind::C => [[0, 0, 0], [1, 1, 1], [1, 0, 1]],
        PieceKind::Plus => [[0, 1, 0], [1, 1, 1], [0, 1, 0]],
        PieceKind::Dot => [[0, 0, 0], [0, 1, 0], [0, 0, 0]],
        PieceKind::Square => [[1, 1, 0], [1, 1, 0], [0, 0, 0]],
        PieceKind::L => [[0, 0, 0], [1, 1, 1], [1, 0, 0]],
        PieceKind::J => [[0, 0, 0], [1, 1, 1], [0, 0, 1]],
        PieceKind::S => [[0, 0, 0], [0, 1, 1], [1, 1, 0]],
        PieceKind::Z => [[1, 1, 0], [0, 1, 1], [0, 0, 0]],
        PieceKind::T => [[0, 0, 0], [1, 1, 1], [0, 1, 0]],
        PieceKind::X => [[1, 0, 1], [0, 1, 0], [1, 0, 1]],
        PieceKind::Corner => [[0, 0, 0], [1, 1, 0], [0, 1, 0]],
        PieceKind::InverseCorner => [[0, 0, 0], [0, 1, 1], [0, 1, 0]],
        PieceKind::Double => [[0, 1, 0], [0, 1, 0], [0, 0, 0]],
        PieceKind::Triple => [[0, 1, 0], [0, 1, 0], [0, 1, 0]],
    }
}

/// Rotate a pattern 90° clockwise
pub fn rotate_pattern(pattern: &Pattern) -> Pattern {
    let mut out = [[EMPTY; PIECE_SIZE]; PIECE_SIZE];
    for (y, row) in out.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = pattern[PIECE_SIZE - 1 - x][y];
        }
    }
    out
}

/// An immutable piece: kind, orientation and coloured pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GamePiece {
    kind: PieceKind,
    rotation: Rotation,
    pattern: Pattern,
}

impl GamePiece {
    /// Create a piece of the given kind in its spawn orientation
    pub fn new(kind: PieceKind) -> Self {
        let value = kind.value();
        let mut pattern = spawn_mask(kind);
        for cell in pattern.iter_mut().flatten() {
            *cell *= value;
        }
        Self {
            kind,
            rotation: Rotation::North,
            pattern,
        }
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Protocol id of the piece kind
    pub fn id(&self) -> u8 {
        self.kind.id()
    }

    /// Colour value written into the grid
    pub fn value(&self) -> u8 {
        self.kind.value()
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The same piece turned 90° clockwise
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            kind: self.kind,
            rotation: self.rotation.rotate_cw(),
            pattern: rotate_pattern(&self.pattern),
        }
    }

    /// The same piece turned 90° counter-clockwise
    #[must_use]
    pub fn rotated_ccw(&self) -> Self {
        self.rotated().rotated().rotated()
    }

    /// Non-empty cells as (dx, dy, value) offsets from the box's top-left corner
    pub fn blocks(&self) -> ArrayVec<Block, 9> {
        let mut blocks = ArrayVec::new();
        for (y, row) in self.pattern.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                if cell != EMPTY {
                    blocks.push((x as i32, y as i32, cell));
                }
            }
        }
        blocks
    }
}

impl fmt::Display for GamePiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())
    }
}

/// Create the piece with the given protocol id (0..15)
///
/// Returns None for ids outside the catalog.
pub fn create_piece(id: u8) -> Option<GamePiece> {
    PieceKind::from_id(id).map(GamePiece::new)
}
