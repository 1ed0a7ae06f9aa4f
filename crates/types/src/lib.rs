//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no I/O, usable from the core logic, the
//! threaded engine and the network layer alike.
//!
//! # Grid Dimensions
//!
//! The challenge grid is square by default:
//!
//! - **Columns**: 5 (indexed 0-4)
//! - **Rows**: 5 (indexed 0-4)
//!
//! Dimensions are a runtime setting (see `GameConfig` in the core crate); the
//! constants below are only the defaults.
//!
//! # Turn Timer
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TIMER_BASE_MS` | 12000 | Turn length at level 0 |
//! | `TIMER_STEP_MS` | 500 | Reduction per level |
//! | `TIMER_FLOOR_MS` | 2500 | Shortest turn |
//!
//! Low-time warnings fire at 75%, 85% and 95% of the turn.
//!
//! # Examples
//!
//! ```
//! use tetrecs_types::{GameAction, PieceKind, Rotation};
//!
//! let kind = PieceKind::from_id(2).unwrap();
//! assert_eq!(kind, PieceKind::Plus);
//! assert_eq!(kind.value(), 3);
//!
//! assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
//!
//! let action = GameAction::parse("place 2 3").unwrap();
//! assert_eq!(action, GameAction::Place { x: 2, y: 3 });
//! ```

use serde::{Deserialize, Serialize};

/// Default number of grid columns
pub const DEFAULT_COLS: usize = 5;

/// Default number of grid rows
pub const DEFAULT_ROWS: usize = 5;

/// Side length of every piece pattern
pub const PIECE_SIZE: usize = 3;

/// Number of pieces in the catalog
pub const PIECE_COUNT: u8 = 15;

/// Value of an empty grid cell
pub const EMPTY: u8 = 0;

/// Sentinel returned for reads outside the grid
pub const OUT_OF_BOUNDS: i32 = -1;

/// Lives at the start of a game
pub const STARTING_LIVES: u32 = 3;

/// Multiplier at the start of a game and after a streak is broken
pub const BASE_MULTIPLIER: u32 = 1;

/// Points per cleared cell, per line, per multiplier step
pub const POINTS_PER_CELL: u32 = 10;

/// Score needed per level (`level = score / POINTS_PER_LEVEL`)
pub const POINTS_PER_LEVEL: u32 = 1000;

/// Turn length at level 0
pub const TIMER_BASE_MS: u64 = 12_000;

/// Turn length reduction per level
pub const TIMER_STEP_MS: u64 = 500;

/// Shortest possible turn
pub const TIMER_FLOOR_MS: u64 = 2_500;

/// Fractions of a turn (in percent) at which low-time warnings fire
pub const WARNING_PERCENTS: [u64; 3] = [75, 85, 95];

/// Number of scores kept in a persisted high-score table
pub const MAX_SCORES: usize = 10;


/// The fifteen piece kinds of the catalog
///
/// The discriminant is the protocol id; the colour index written into the grid
/// is `id + 1`, so an empty cell (0) is never confused with a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Line,
    C,
    Plus,
    Dot,
    Square,
    L,
    J,
    S,
    Z,
    T,
    X,
    Corner,
    InverseCorner,
    Double,
    Triple,
}

impl PieceKind {
    /// All kinds in id order
    pub const ALL: [PieceKind; PIECE_COUNT as usize] = [
        PieceKind::Line,
        PieceKind::C,
        PieceKind::Plus,
        PieceKind::Dot,
        PieceKind::Square,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::T,
        PieceKind::X,
        PieceKind::Corner,
        PieceKind::InverseCorner,
        PieceKind::Double,
        PieceKind::Triple,
    ];

    /// Look up a kind by its protocol id
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_id(0), Some(PieceKind::Line));
    /// assert_eq!(PieceKind::from_id(14), Some(PieceKind::Triple));
    /// assert_eq!(PieceKind::from_id(15), None);
    /// ```
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Protocol id (0..15)
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Colour index written into grid cells (1..=15)
    pub fn value(self) -> u8 {
        self.id() + 1
    }

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Line => "Line",
            PieceKind::C => "C",
            PieceKind::Plus => "Plus",
            PieceKind::Dot => "Dot",
            PieceKind::Square => "Square",
            PieceKind::L => "L",
            PieceKind::J => "J",
            PieceKind::S => "S",
            PieceKind::Z => "Z",
            PieceKind::T => "T",
            PieceKind::X => "X",
            PieceKind::Corner => "Corner",
            PieceKind::InverseCorner => "Inverse Corner",
            PieceKind::Double => "Double",
            PieceKind::Triple => "Triple",
        }
    }
}

/// Quarter-turn orientation of a piece pattern
///
/// The rotation cycle goes: North → East → South → West → North
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    North,
    East,
    South,
    West,
}

impl Rotation {
    /// Rotate clockwise (90°)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::Rotation;
    ///
    /// assert_eq!(Rotation::North.rotate_cw(), Rotation::East);
    /// assert_eq!(Rotation::West.rotate_cw(), Rotation::North);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Rotation::North => Rotation::East,
            Rotation::East => Rotation::South,
            Rotation::South => Rotation::West,
            Rotation::West => Rotation::North,
        }
    }

    /// Rotate counter-clockwise (-90° or 270°)
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Rotation::North => Rotation::West,
            Rotation::West => Rotation::South,
            Rotation::South => Rotation::East,
            Rotation::East => Rotation::North,
        }
    }
}

/// Player actions that can be applied to a running game
///
/// Placement targets the centre cell of the piece's 3x3 box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Place the current piece centred on (x, y)
    Place { x: i32, y: i32 },
    /// Rotate the current piece 90° clockwise
    RotateCw,
    /// Rotate the current piece 90° counter-clockwise
    RotateCcw,
    /// Exchange the current and following pieces
    Swap,
}

impl GameAction {
    /// Parse a textual action (`place <x> <y>`, `rotate`, `rotateccw`, `swap`)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrecs_types::GameAction;
    ///
    /// assert_eq!(GameAction::parse("rotate"), Some(GameAction::RotateCw));
    /// assert_eq!(GameAction::parse("SWAP"), Some(GameAction::Swap));
    /// assert_eq!(GameAction::parse("place 1"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace();
        let verb = parts.next()?.to_lowercase();
        let action = match verb.as_str() {
            "place" => {
                let x = parts.next()?.parse().ok()?;
                let y = parts.next()?.parse().ok()?;
                GameAction::Place { x, y }
            }
            "rotate" | "rotatecw" => GameAction::RotateCw,
            "rotateccw" => GameAction::RotateCcw,
            "swap" => GameAction::Swap,
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(action)
    }
}

/// A cell coordinate: column `x`, row `y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
}

impl GridCoord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// One (name, score) pair of a score table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
}

impl ScoreEntry {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}
