//! Multiplayer game - a [`GameSession`] kept in sync with the server
//!
//! Incoming lines are decoded and applied under the session lock: pieces go
//! into the [`NetworkPieceSource`] queue (dealing the first two once the
//! started latch closes, which also starts the turn timer), `SCORES` replace
//! the score history. Once the game is stopped, incoming lines are ignored.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use tetrecs_core::{GameConfig, GameError, GamePiece, GameState, ScoreList};
use tetrecs_engine::GameSession;
use tetrecs_types::ScoreEntry;

use crate::protocol::{ClientCommand, LineDecoder, ServerMessage};
use crate::source::NetworkPieceSource;
use crate::transport::Transport;

pub type NetworkSession = GameSession<NetworkPieceSource>;

pub struct MultiplayerGame {
    session: NetworkSession,
    transport: Arc<dyn Transport>,
    decoder: Mutex<LineDecoder>,
    online_scores: Mutex<ScoreList>,
}

impl MultiplayerGame {
    /// Create the game, request `prefetch` pieces and wait for them
    pub fn new(
        config: GameConfig,
        transport: Arc<dyn Transport>,
        prefetch: usize,
    ) -> io::Result<Self> {
        let source = NetworkPieceSource::new(Arc::clone(&transport), prefetch);
        let session = GameSession::new(GameState::new(config, source))?;
        session.initialise();
        Ok(Self {
            session,
            transport,
            decoder: Mutex::new(LineDecoder::new()),
            online_scores: Mutex::new(ScoreList::new()),
        })
    }

    pub fn session(&self) -> &NetworkSession {
        &self.session
    }

    /// Decode and apply one line from the server
    ///
    /// Unknown commands are skipped; malformed ones are reported.
    pub fn handle_line(&self, line: &str) -> anyhow::Result<()> {
        if self.session.is_stopped() {
            return Ok(());
        }
        let message = self
            .decoder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .feed(line)?;
        if let Some(message) = message {
            self.handle_message(message)?;
        }
        Ok(())
    }

    /// Apply one decoded server message
    pub fn handle_message(&self, message: ServerMessage) -> Result<(), GameError> {
        if self.session.is_stopped() {
            return Ok(());
        }
        match message {
            ServerMessage::Piece(kind) => self.session.with_state(|game| {
                if game.source_mut().enqueue(GamePiece::new(kind)) {
                    println!("[Net] Piece buffer filled, starting game");
                    game.deal_initial_pieces()
                } else {
                    Ok(())
                }
            }),
            ServerMessage::Scores(scores) => {
                // An empty table never replaces a history already recorded.
                if !scores.is_empty() {
                    self.session.set_scores(scores);
                }
                Ok(())
            }
            ServerMessage::HiScores(scores) => {
                *self
                    .online_scores
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = scores;
                Ok(())
            }
            ServerMessage::Other { command, .. } => {
                println!("[Net] Ignoring {command}");
                Ok(())
            }
        }
    }

    /// Ask the server for its high-score table
    pub fn request_high_scores(&self) {
        self.transport.send(&ClientCommand::HiScores);
    }

    /// Submit a high score to the server
    pub fn submit_high_score(&self, entry: ScoreEntry) {
        self.transport.send(&ClientCommand::HiScore(entry));
    }

    /// Last `HISCORES` table received
    pub fn online_scores(&self) -> ScoreList {
        self.online_scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn stop(&self) {
        self.session.stop();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::transport::ChannelTransport;
    use tetrecs_core::GamePhase;

    fn game() -> (MultiplayerGame, mpsc::UnboundedReceiver<String>) {
        let (transport, rx) = ChannelTransport::new();
        let game = MultiplayerGame::new(GameConfig::default(), Arc::new(transport), 10).unwrap();
        (game, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_game_starts_on_third_piece() {
        let (game, mut rx) = game();
        assert_eq!(drain(&mut rx).len(), 10);

        game.handle_line("PIECE 3").unwrap();
        game.handle_line("PIECE 3").unwrap();
        assert_eq!(game.session().snapshot().phase, GamePhase::Initialized);

        game.handle_line("PIECE 2").unwrap();
        let snap = game.session().snapshot();
        assert_eq!(snap.phase, GamePhase::Running);
        assert!(snap.current.is_some());
        // Two pieces dealt, two replacements requested.
        assert_eq!(drain(&mut rx), vec!["PIECE", "PIECE"]);
        game.stop();
    }

    #[test]
    fn test_placement_mirrors_board() {
        let (game, mut rx) = game();
        for _ in 0..4 {
            game.handle_line("PIECE 3").unwrap();
        }
        drain(&mut rx);

        assert!(game.session().place_at(0, 0).unwrap());
        let sent = drain(&mut rx);
        assert_eq!(sent[0], "PIECE");
        assert_eq!(
            sent[1],
            format!("BOARD 4{}", " 0".repeat(24)),
        );
        game.stop();
    }

    #[test]
    fn test_underrun_blocks_the_turn() {
        let (game, _rx) = game();
        for _ in 0..3 {
            game.handle_line("PIECE 3").unwrap();
        }
        // One piece left in the queue after dealing.
        assert!(game.session().place_at(0, 0).unwrap());
        assert_eq!(
            game.session().place_at(4, 4),
            Err(GameError::PieceQueueUnderrun)
        );
        game.handle_line("PIECE 3").unwrap();
        assert!(game.session().place_at(4, 4).unwrap());
        game.stop();
    }

    #[test]
    fn test_scores_replace_history() {
        let (game, _rx) = game();
        game.handle_line("SCORES").unwrap();
        game.handle_line("Alice:500").unwrap();
        game.handle_line("Bob:900").unwrap();
        let scores = game.session().scores();
        assert_eq!(
            scores.entries(),
            &[ScoreEntry::new("Bob", 900), ScoreEntry::new("Alice", 500)]
        );
        game.stop();
    }

    #[test]
    fn test_score_names_may_start_with_a_command_word() {
        let (game, _rx) = game();
        for line in ["SCORES", "Alice:500", "DJ Khaled:700", "Bob:900"] {
            game.handle_line(line).unwrap();
        }
        assert_eq!(
            game.session().scores().entries(),
            &[
                ScoreEntry::new("Bob", 900),
                ScoreEntry::new("DJ Khaled", 700),
                ScoreEntry::new("Alice", 500),
            ]
        );
        game.stop();
    }

    #[test]
    fn test_empty_scores_keep_existing_history() {
        let (game, _rx) = game();
        let history = ScoreList::from_entries([ScoreEntry::new("Player", 320)]);
        game.session().set_scores(history.clone());

        game.handle_line("SCORES").unwrap();
        assert_eq!(game.session().scores(), history);
        game.handle_message(ServerMessage::Scores(ScoreList::new())).unwrap();
        assert_eq!(game.session().scores(), history);
        game.stop();
    }

    #[test]
    fn test_high_scores_round_trip_through_transport() {
        let (game, mut rx) = game();
        drain(&mut rx);
        game.request_high_scores();
        game.submit_high_score(ScoreEntry::new("Ann", 70));
        assert_eq!(drain(&mut rx), vec!["HISCORES", "HISCORE Ann:70"]);

        game.handle_line("HISCORES Ann:70\nBen:90").unwrap();
        assert_eq!(game.online_scores().entries()[0].name, "Ben");
        game.stop();
    }

    #[test]
    fn test_malformed_line_is_an_error_and_lines_after_stop_are_ignored() {
        let (game, _rx) = game();
        assert!(game.handle_line("PIECE x").is_err());
        assert!(game.handle_line("CHAT hi").is_ok());

        game.stop();
        for _ in 0..5 {
            game.handle_line("PIECE 1").unwrap();
        }
        assert_eq!(game.session().snapshot().phase, GamePhase::Stopped);
        assert_eq!(game.session().read(|g| g.source().queued()), 0);
    }
}
