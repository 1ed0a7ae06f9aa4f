//! Multiplayer networking
//!
//! Keeps a game's piece stream and board in sync with a server over a
//! line-based text protocol.
//!
//! # Pieces
//!
//! - [`protocol`]: message codec (`PIECE`, `BOARD`, `SCORES`, `HISCORES`, `HISCORE`)
//! - [`transport`]: fire-and-forget outbound seam and its channel implementation
//! - [`source`]: [`NetworkPieceSource`], the server-fed piece queue
//! - [`multiplayer`]: [`MultiplayerGame`], applying server messages to a session
//! - [`connection`]: tokio TCP client pumping lines both ways
//!
//! # Environment Variables
//!
//! - `TETRECS_HOST`: server host (default: "127.0.0.1")
//! - `TETRECS_PORT`: server port (default: 9700)
//! - `TETRECS_PREFETCH`: pieces requested up front (default: 10)
//! - `TETRECS_LOG_PATH`: append a JSON wire log of every line to this file
//! - `TETRECS_OFFLINE`: set to "1" or "true" to play locally
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: PIECE            (x10)
//! Server -> Client: PIECE 3
//! Server -> Client: PIECE 11
//! Server -> Client: PIECE 0          (third piece: game starts)
//! Client -> Server: PIECE            (x2, replacing the dealt pieces)
//! Client -> Server: PIECE            (after a placement)
//! Client -> Server: BOARD 0 0 4 0 0 ...
//! Server -> Client: SCORES
//! Server -> Client: Bob:900
//! Server -> Client: Alice:500
//! ```

pub mod config;
pub mod connection;
pub mod multiplayer;
pub mod protocol;
pub mod source;
pub mod transport;

pub use tetrecs_core as core;
pub use tetrecs_engine as engine;
pub use tetrecs_types as types;

pub use config::{ClientConfig, DEFAULT_PREFETCH};
pub use connection::{run_connection, Connection};
pub use multiplayer::{MultiplayerGame, NetworkSession};
pub use protocol::{parse_message, ClientCommand, LineDecoder, ProtocolError, ServerMessage};
pub use source::NetworkPieceSource;
pub use transport::{ChannelTransport, Transport};
