//! Headless runner (default binary).
//!
//! Reads one action per line from stdin (`place <x> <y>`, `rotate`,
//! `rotateccw`, `swap`, `quit`) and prints the board after every move.
//! Plays against the server from `TETRECS_HOST`/`TETRECS_PORT` unless
//! `TETRECS_OFFLINE` is set or the server cannot be reached.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use tetrecs::core::{
    GameConfig, GamePiece, GameSnapshot, GameState, LocalPieceSource, PieceSource, ScoreResult,
};
use tetrecs::engine::{GameListener, GameSession};
use tetrecs::net::{ChannelTransport, ClientConfig, Connection, MultiplayerGame};
use tetrecs::types::{GameAction, GridCoord};

/// Prints notifications as they arrive
struct ConsoleListener;

impl GameListener for ConsoleListener {
    fn on_next_piece(&self, current: &GamePiece, following: &GamePiece) {
        println!("[Game] Piece: {current} (next: {following})");
    }

    fn on_line_cleared(&self, coords: &[GridCoord], score: &ScoreResult) {
        println!(
            "[Game] Cleared {} cells over {} lines: +{} (x{})",
            coords.len(),
            score.lines,
            score.total,
            score.multiplier
        );
    }

    fn on_tick(&self, delay: Duration) {
        println!("[Game] {:.1}s to place", delay.as_secs_f32());
    }

    fn on_timer_warning(&self, stage: usize) {
        println!("[Game] Hurry! ({})", stage + 1);
    }

    fn on_game_over(&self, score: u32) {
        println!("[Game] Game over, final score {score}");
    }
}

fn main() -> Result<()> {
    let config = GameConfig::from_env();

    if ClientConfig::is_offline() {
        return run_local(config);
    }

    let net = ClientConfig::from_env();
    let (transport, outgoing) = ChannelTransport::new();
    let game = Arc::new(MultiplayerGame::new(
        config.clone(),
        Arc::new(transport),
        net.prefetch,
    )?);

    let handler_game = Arc::clone(&game);
    let connection = match Connection::open(&net, outgoing, move |line| {
        if let Err(e) = handler_game.handle_line(&line) {
            eprintln!("[Net] Skipping {line:?}: {e}");
        }
    }) {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("[Net] Cannot reach {}:{} ({e}), playing offline", net.host, net.port);
            game.stop();
            return run_local(config);
        }
    };

    game.session().add_listener(Arc::new(ConsoleListener));
    let result = play(game.session());
    if connection.is_closed() {
        println!("[Net] Lost the server during the game; scores were not synced");
    }
    game.stop();
    connection.close();
    result
}

fn run_local(config: GameConfig) -> Result<()> {
    let source = LocalPieceSource::from_time();
    println!("[Game] Local game, seed {}", source.seed());
    let session = GameSession::new(GameState::new(config, source))?;
    session.add_listener(Arc::new(ConsoleListener));
    session.start()?;
    let result = play(&session);
    session.stop();
    result
}

fn play<S: PieceSource + Send + 'static>(session: &GameSession<S>) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("quit") {
            break;
        }

        let Some(action) = GameAction::parse(input) else {
            println!("[Game] Unknown action {input:?}");
            continue;
        };
        match session.apply_action(action) {
            Ok(true) => {}
            Ok(false) => println!("[Game] Invalid move"),
            Err(e) => eprintln!("[Game] {} ({})", e.message(), e.code()),
        }

        write_board(&mut out, &session.snapshot())?;
        if session.is_over() {
            break;
        }
    }

    for entry in session.scores().entries() {
        println!("{}: {}", entry.name, entry.score);
    }
    Ok(())
}

fn write_board(out: &mut impl Write, snap: &GameSnapshot) -> io::Result<()> {
    for y in 0..snap.rows {
        for x in 0..snap.cols {
            match snap.cell(x, y) {
                Some(0) | None => write!(out, "  .")?,
                Some(value) => write!(out, "{value:3}")?,
            }
        }
        writeln!(out)?;
    }
    writeln!(
        out,
        "score {}  level {}  lives {}  x{}",
        snap.score, snap.level, snap.lives, snap.multiplier
    )?;
    out.flush()
}
