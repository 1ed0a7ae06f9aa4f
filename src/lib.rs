//! TetrECS (workspace facade crate).
//!
//! Re-exports the member crates under `crates/` as `tetrecs::{core,engine,net,types}`.

pub use tetrecs_core as core;
pub use tetrecs_engine as engine;
pub use tetrecs_net as net;
pub use tetrecs_types as types;
