//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the rules of the challenge game: a small grid that
//! 3x3 pieces are placed onto, full rows and columns that clear, and a
//! score/level/lives/multiplier state machine. It has no clock, no threads
//! and no I/O:
//!
//! - **Deterministic**: a seeded [`LocalPieceSource`] reproduces a game exactly
//! - **Pluggable**: [`GameState`] is generic over its [`PieceSource`], so the
//!   network crate can feed pieces from a server queue
//! - **Observable**: state changes are queued as [`GameEvent`]s and drained by
//!   whoever drives the game
//!
//! # Module Structure
//!
//! - [`grid`]: the playing field, placement checks and cell observers
//! - [`pieces`]: the fifteen piece patterns and their rotation
//! - [`game_state`]: phases, turns, line clearing and lives
//! - [`scoring`]: clear rewards, levels and the turn timer curve
//! - [`scores`]: sorted `name:score` tables
//! - [`source`]: the [`PieceSource`] seam and the local random source
//! - [`rng`]: seeded LCG used by the local source
//! - [`config`]: grid size, player name and timer curve
//!
//! # Example
//!
//! ```
//! use tetrecs_core::{GameConfig, GameState, LocalPieceSource};
//!
//! let mut game = GameState::new(GameConfig::default(), LocalPieceSource::new(12345));
//! game.start().unwrap();
//!
//! // Every piece fits somewhere on an empty 5x5 grid when centred.
//! assert!(game.place_at(2, 2).unwrap());
//! assert_eq!(game.lives(), 3);
//! ```
//!
//! # Timing
//!
//! The state never looks at a clock. A turn starts with a
//! [`GameEvent::TurnStarted`] carrying the turn length; when it runs out the
//! driver calls [`GameState::tick`].

pub mod config;
pub mod error;
pub mod game_state;
pub mod grid;
pub mod pieces;
pub mod rng;
pub mod scores;
pub mod scoring;
pub mod snapshot;
pub mod source;

pub use tetrecs_types as types;

// Re-export commonly used types for convenience
pub use config::{GameConfig, TimerConfig};
pub use error::GameError;
pub use game_state::{GameEvent, GamePhase, GameState, TickOutcome};
pub use grid::{CellObserver, Grid};
pub use pieces::{create_piece, GamePiece};
pub use rng::SimpleRng;
pub use scores::{format_score_line, parse_score_line, ScoreList};
pub use scoring::{calculate_score, level_for_score, timer_delay, warning_offsets, ScoreResult};
pub use snapshot::{GameSnapshot, PieceSnapshot};
pub use source::{LocalPieceSource, PieceSource};
