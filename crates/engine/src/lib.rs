//! Threaded game driver
//!
//! [`GameSession`] wraps a core [`GameState`](tetrecs_core::GameState) in a
//! lock, runs its turn timer on a dedicated thread ([`TurnTimer`]) and
//! delivers notifications to [`GameListener`]s in the order the state changed.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use tetrecs_core::{GameConfig, GameState, LocalPieceSource};
//! use tetrecs_engine::{GameListener, GameSession};
//!
//! struct Log;
//!
//! impl GameListener for Log {
//!     fn on_tick(&self, delay: Duration) {
//!         println!("turn of {}ms", delay.as_millis());
//!     }
//! }
//!
//! let game = GameState::new(GameConfig::default(), LocalPieceSource::new(7));
//! let session = GameSession::new(game).unwrap();
//! session.add_listener(Arc::new(Log));
//! session.start().unwrap();
//! assert!(session.place_at(2, 2).unwrap());
//! session.stop();
//! ```

mod dispatch;
pub mod listener;
pub mod session;
pub mod timer;

pub use tetrecs_core as core;
pub use tetrecs_types as types;

pub use listener::GameListener;
pub use session::{GameSession, UNDERRUN_RETRY};
pub use timer::{TimerFire, TurnTimer};
