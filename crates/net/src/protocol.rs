//! Protocol codec - the line-based text messages exchanged with the server
//!
//! Every message is `<COMMAND>[ <payload>]`. Score payloads carry one
//! `name:score` pair per line, so over a line-framed stream a `SCORES` or
//! `HISCORES` header is followed by continuation lines; [`LineDecoder`]
//! stitches those back together.
//!
//! Outgoing (client → server):
//!
//! | Line | Meaning |
//! |------|---------|
//! | `PIECE` | request the next piece |
//! | `BOARD v0 v1 …` | full board, column-major |
//! | `HISCORES` | request the online high-score table |
//! | `HISCORE name:score` | submit a high score |
//!
//! Incoming (server → client): `PIECE <id>`, `SCORES <lines>`,
//! `HISCORES <lines>`. Anything else is passed through as
//! [`ServerMessage::Other`].

use std::fmt;

use tetrecs_core::{format_score_line, parse_score_line, Grid, ScoreList};
use tetrecs_types::{PieceKind, ScoreEntry};

/// Protocol decoding failures
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ProtocolError {
    #[display("empty message")]
    Empty,
    #[display("{command} requires a payload")]
    MissingPayload {
        #[error(not(source))]
        command: &'static str,
    },
    #[display("invalid piece id {payload:?}")]
    InvalidPiece {
        #[error(not(source))]
        payload: String,
    },
}

impl ProtocolError {
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolError::Empty => "empty",
            ProtocolError::MissingPayload { .. } => "missing_payload",
            ProtocolError::InvalidPiece { .. } => "invalid_piece",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ProtocolError::Empty => "message has no command",
            ProtocolError::MissingPayload { .. } => "command needs a payload",
            ProtocolError::InvalidPiece { .. } => "piece id is not in the catalog",
        }
    }
}

/// Commands the client sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Request one piece
    Piece,
    /// Board values, column-major
    Board(Vec<u8>),
    /// Request the online high-score table
    HiScores,
    /// Submit a high score
    HiScore(ScoreEntry),
}

impl ClientCommand {
    /// `BOARD` command for the grid's current contents
    pub fn board(grid: &Grid) -> Self {
        ClientCommand::Board(grid.column_major().collect())
    }

    /// Wire form, without the trailing newline
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClientCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientCommand::Piece => f.write_str("PIECE"),
            ClientCommand::Board(values) => {
                f.write_str("BOARD")?;
                for value in values {
                    write!(f, " {value}")?;
                }
                Ok(())
            }
            ClientCommand::HiScores => f.write_str("HISCORES"),
            ClientCommand::HiScore(entry) => {
                write!(f, "HISCORE {}", format_score_line(entry))
            }
        }
    }
}

/// Messages the server sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Piece(PieceKind),
    /// Scores of the players in the current multiplayer game
    Scores(ScoreList),
    /// Online high-score table
    HiScores(ScoreList),
    /// Any command this client does not act on
    Other { command: String, payload: String },
}

/// Parse one complete message; the payload may span several lines
pub fn parse_message(text: &str) -> Result<ServerMessage, ProtocolError> {
    let text = text.trim_start();
    let (command, payload) = match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], &text[pos..]),
        None => (text, ""),
    };
    // Drop exactly the separator; the payload itself may start with a newline.
    let payload = payload
        .strip_prefix("\r\n")
        .or_else(|| payload.strip_prefix(|c: char| c.is_whitespace()))
        .unwrap_or(payload);

    match command {
        "" => Err(ProtocolError::Empty),
        "PIECE" => {
            let id = payload.trim();
            if id.is_empty() {
                return Err(ProtocolError::MissingPayload { command: "PIECE" });
            }
            id.parse::<u8>()
                .ok()
                .and_then(PieceKind::from_id)
                .map(ServerMessage::Piece)
                .ok_or_else(|| ProtocolError::InvalidPiece {
                    payload: id.to_string(),
                })
        }
        "SCORES" => Ok(ServerMessage::Scores(ScoreList::parse_lines(payload))),
        "HISCORES" => Ok(ServerMessage::HiScores(ScoreList::parse_lines(payload))),
        _ => Ok(ServerMessage::Other {
            command: command.to_string(),
            payload: payload.trim_end().to_string(),
        }),
    }
}

/// Whether a line starts a new message: its first word is an upper-case
/// command such as `PIECE` or `SCORES`
pub fn is_command_line(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|word| word.bytes().all(|b| b.is_ascii_uppercase()))
}

/// Reassembles multi-line score messages from a line-framed stream
///
/// A score block has no terminator, so every line of it yields the scores
/// received so far. Receivers replace their list each time and end up with
/// the complete table. While a block is open, any line that parses as
/// `name:score` belongs to it, even when the name starts with an upper-case
/// word.
#[derive(Debug, Default)]
pub struct LineDecoder {
    block: Option<String>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line (without its newline)
    ///
    /// Returns `Ok(None)` for blank lines, for continuation lines with no
    /// open score block and while an open block holds no scores yet.
    pub fn feed(&mut self, line: &str) -> Result<Option<ServerMessage>, ProtocolError> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(block) = self.block.as_mut() {
            if parse_score_line(line).is_some() || !is_command_line(line) {
                if line.trim().is_empty() {
                    return Ok(None);
                }
                block.push('\n');
                block.push_str(line);
                return parse_message(block).map(non_empty_scores);
            }
        }
        if !is_command_line(line) {
            return Ok(None);
        }

        self.block = None;
        let message = parse_message(line)?;
        if matches!(
            message,
            ServerMessage::Scores(_) | ServerMessage::HiScores(_)
        ) {
            self.block = Some(line.to_string());
            return Ok(non_empty_scores(message));
        }
        Ok(Some(message))
    }
}

/// Hold back score messages that carry no entries yet
fn non_empty_scores(message: ServerMessage) -> Option<ServerMessage> {
    let empty = matches!(
        &message,
        ServerMessage::Scores(list) | ServerMessage::HiScores(list) if list.is_empty()
    );
    (!empty).then_some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_command_lines() {
        assert_eq!(ClientCommand::Piece.to_line(), "PIECE");
        assert_eq!(ClientCommand::HiScores.to_line(), "HISCORES");
        assert_eq!(
            ClientCommand::HiScore(ScoreEntry::new("Ann", 120)).to_line(),
            "HISCORE Ann:120"
        );
        assert_eq!(ClientCommand::Board(vec![0, 3, 0]).to_line(), "BOARD 0 3 0");
    }

    #[test]
    fn test_board_is_column_major() {
        let mut grid = Grid::new(2, 2);
        // Row 0: 1 2, row 1: 3 4
        grid.set(0, 0, 1);
        grid.set(1, 0, 2);
        grid.set(0, 1, 3);
        grid.set(1, 1, 4);
        assert_eq!(ClientCommand::board(&grid).to_line(), "BOARD 1 3 2 4");
    }

    #[test]
    fn test_parse_piece() {
        assert_eq!(
            parse_message("PIECE 4").unwrap(),
            ServerMessage::Piece(PieceKind::Square)
        );
        assert_eq!(
            parse_message("PIECE 15"),
            Err(ProtocolError::InvalidPiece {
                payload: "15".into()
            })
        );
        assert_eq!(
            parse_message("PIECE").unwrap_err().code(),
            "missing_payload"
        );
        assert_eq!(parse_message("  "), Err(ProtocolError::Empty));
    }

    #[test]
    fn test_parse_multiline_scores() {
        let ServerMessage::Scores(list) = parse_message("SCORES\nAlice:500\nBob:900").unwrap()
        else {
            panic!("expected scores");
        };
        assert_eq!(
            list.entries(),
            &[ScoreEntry::new("Bob", 900), ScoreEntry::new("Alice", 500)]
        );
    }

    #[test]
    fn test_unknown_command_passes_through() {
        assert_eq!(
            parse_message("MSG hello there").unwrap(),
            ServerMessage::Other {
                command: "MSG".into(),
                payload: "hello there".into()
            }
        );
    }

    #[test]
    fn test_decoder_accumulates_score_block() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed("SCORES").unwrap(), None);
        decoder.feed("Alice:500").unwrap();
        let last = decoder.feed("Bob:900\r").unwrap();
        let Some(ServerMessage::Scores(list)) = last else {
            panic!("expected scores");
        };
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].name, "Bob");

        // A new command closes the block.
        assert_eq!(
            decoder.feed("PIECE 0").unwrap(),
            Some(ServerMessage::Piece(PieceKind::Line))
        );
        assert_eq!(decoder.feed("Carol:1").unwrap(), None);
    }

    #[test]
    fn test_decoder_inline_score_payload() {
        let mut decoder = LineDecoder::new();
        let Some(ServerMessage::HiScores(list)) = decoder.feed("HISCORES Zed:10").unwrap() else {
            panic!("expected hiscores");
        };
        assert_eq!(list.entries(), &[ScoreEntry::new("Zed", 10)]);
        let Some(ServerMessage::HiScores(list)) = decoder.feed("Amy:30").unwrap() else {
            panic!("expected hiscores");
        };
        assert_eq!(list.entries()[0], ScoreEntry::new("Amy", 30));
    }

    #[test]
    fn test_decoder_keeps_upper_case_names_in_block() {
        let mut decoder = LineDecoder::new();
        decoder.feed("SCORES").unwrap();
        decoder.feed("Alice:500").unwrap();
        decoder.feed("DJ Khaled:700").unwrap();
        let Some(ServerMessage::Scores(list)) = decoder.feed("Bob:900").unwrap() else {
            panic!("expected scores");
        };
        assert_eq!(
            list.entries(),
            &[
                ScoreEntry::new("Bob", 900),
                ScoreEntry::new("DJ Khaled", 700),
                ScoreEntry::new("Alice", 500),
            ]
        );

        // Outside a block the same shape is an ordinary command.
        let mut decoder = LineDecoder::new();
        assert!(matches!(
            decoder.feed("DJ Khaled:700").unwrap(),
            Some(ServerMessage::Other { command, .. }) if command == "DJ"
        ));
    }

    #[test]
    fn test_decoder_holds_back_empty_score_blocks() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed("HISCORES").unwrap(), None);
        assert_eq!(decoder.feed("not a score").unwrap(), None);
        assert_eq!(decoder.feed("").unwrap(), None);
        assert!(matches!(
            decoder.feed("Amy:30").unwrap(),
            Some(ServerMessage::HiScores(list)) if list.len() == 1
        ));
    }
}
