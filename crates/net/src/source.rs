//! Networked piece source - a FIFO fed by `PIECE` messages
//!
//! Construction requests a buffer of pieces; every piece handed out requests
//! one more, so the queue depth stays constant once the server has caught up.
//! The game is only dealt its first pieces once the queue holds more than
//! two (the "started" latch), which keeps the first draws from starving.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tetrecs_core::{GamePiece, Grid, PieceSource};

use crate::protocol::ClientCommand;
use crate::transport::Transport;

/// Queue depth at which the game starts
pub const START_DEPTH: usize = 3;

pub struct NetworkPieceSource {
    queue: VecDeque<GamePiece>,
    started: bool,
    transport: Arc<dyn Transport>,
}

impl NetworkPieceSource {
    /// Create the source and request `prefetch` pieces
    pub fn new(transport: Arc<dyn Transport>, prefetch: usize) -> Self {
        for _ in 0..prefetch {
            transport.send(&ClientCommand::Piece);
        }
        Self {
            queue: VecDeque::with_capacity(prefetch),
            started: false,
            transport,
        }
    }

    /// Queue a piece from the server
    ///
    /// Returns true exactly once: when this piece closes the started latch and
    /// the game should be dealt its first two pieces.
    pub fn enqueue(&mut self, piece: GamePiece) -> bool {
        self.queue.push_back(piece);
        if !self.started && self.queue.len() >= START_DEPTH {
            self.started = true;
            return true;
        }
        false
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Pieces received but not yet handed out
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

impl PieceSource for NetworkPieceSource {
    fn next_piece(&mut self) -> Option<GamePiece> {
        let piece = self.queue.pop_front()?;
        self.transport.send(&ClientCommand::Piece);
        Some(piece)
    }

    fn has_next(&self) -> bool {
        !self.queue.is_empty()
    }

    fn after_placement(&mut self, grid: &Grid) {
        self.transport.send(&ClientCommand::board(grid));
    }
}

impl fmt::Debug for NetworkPieceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkPieceSource")
            .field("queue", &self.queue)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::transport::ChannelTransport;
    use tetrecs_types::PieceKind;

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_construction_prefetches() {
        let (transport, mut rx) = ChannelTransport::new();
        let source = NetworkPieceSource::new(Arc::new(transport), 10);
        assert_eq!(drain(&mut rx), vec!["PIECE"; 10]);
        assert!(!source.has_next());
        assert!(!source.is_started());
    }

    #[test]
    fn test_latch_fires_once_at_depth_three() {
        let (transport, _rx) = ChannelTransport::new();
        let mut source = NetworkPieceSource::new(Arc::new(transport), 0);
        let dot = GamePiece::new(PieceKind::Dot);

        assert!(!source.enqueue(dot));
        assert!(!source.enqueue(dot));
        assert!(source.enqueue(dot));
        assert!(!source.enqueue(dot));
        assert!(source.is_started());
    }

    #[test]
    fn test_every_dequeue_requests_a_replacement() {
        let (transport, mut rx) = ChannelTransport::new();
        let mut source = NetworkPieceSource::new(Arc::new(transport), 0);
        source.enqueue(GamePiece::new(PieceKind::T));
        source.enqueue(GamePiece::new(PieceKind::S));

        assert_eq!(source.next_piece().map(|p| p.kind()), Some(PieceKind::T));
        assert_eq!(source.next_piece().map(|p| p.kind()), Some(PieceKind::S));
        assert_eq!(source.next_piece(), None);
        assert_eq!(drain(&mut rx), vec!["PIECE", "PIECE"]);
    }

    #[test]
    fn test_after_placement_sends_board() {
        let (transport, mut rx) = ChannelTransport::new();
        let mut source = NetworkPieceSource::new(Arc::new(transport), 0);
        let mut grid = Grid::new(2, 2);
        grid.set(1, 0, 7);
        source.after_placement(&grid);
        assert_eq!(drain(&mut rx), vec!["BOARD 0 0 7 0"]);
    }
}
