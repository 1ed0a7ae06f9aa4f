//! Piece sources - where the next piece comes from
//!
//! The game state is generic over its [`PieceSource`], chosen at
//! construction: [`LocalPieceSource`] draws uniformly at random, the network
//! crate provides a queue fed by the server.

use crate::grid::Grid;
use crate::pieces::{create_piece, GamePiece};
use crate::rng::SimpleRng;
use crate::types::PIECE_COUNT;

/// Supplies pieces to a game on demand
pub trait PieceSource {
    /// Produce the next piece, or None if none is available right now.
    ///
    /// The game checks [`PieceSource::has_next`] before mutating anything, so a
    /// `None` here after a positive `has_next` is a broken source.
    fn next_piece(&mut self) -> Option<GamePiece>;

    /// Whether `next_piece` would currently succeed
    fn has_next(&self) -> bool {
        true
    }

    /// Called after every successful placement, once clears and the piece
    /// advance are done
    fn after_placement(&mut self, _grid: &Grid) {}
}

/// Uniform random pieces from a seeded LCG
#[derive(Debug, Clone)]
pub struct LocalPieceSource {
    rng: SimpleRng,
}

impl LocalPieceSource {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
        }
    }

    /// Seeded from the wall clock
    pub fn from_time() -> Self {
        Self {
            rng: SimpleRng::from_time(),
        }
    }

    /// Seed that reproduces the remaining sequence
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for LocalPieceSource {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PieceSource for LocalPieceSource {
    fn next_piece(&mut self) -> Option<GamePiece> {
        let id = self.rng.next_range(PIECE_COUNT as u32) as u8;
        create_piece(id)
    }
}
