//! End-to-end multiplayer tests against an in-process server

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

use tetrecs::core::{GameConfig, GamePhase};
use tetrecs::net::{
    run_connection, ChannelTransport, ClientConfig, Connection, MultiplayerGame,
};
use tetrecs::types::ScoreEntry;

fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(3);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn multiplayer_game_over_tcp() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (seen_tx, seen_rx) = mpsc::channel::<String>();

    let server = thread::spawn(move || {
        let (socket, _) = listener.accept().unwrap();
        let mut writer = socket.try_clone().unwrap();
        let reader = BufReader::new(socket);
        let mut requests = 0;
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if line == "PIECE" {
                requests += 1;
                // Answer the prefetch in one burst, then one by one.
                if requests >= 10 {
                    let reply = if requests == 10 { "PIECE 3\n".repeat(10) } else { "PIECE 3\n".into() };
                    if writer.write_all(reply.as_bytes()).is_err() {
                        break;
                    }
                }
            }
            if line.starts_with("BOARD") {
                let _ = writer.write_all(b"SCORES\nAlice:500\nBob:900\n");
            }
            if seen_tx.send(line).is_err() {
                break;
            }
        }
    });

    let config = ClientConfig {
        port,
        ..ClientConfig::default()
    };
    let (transport, outgoing) = ChannelTransport::new();
    let game = Arc::new(
        MultiplayerGame::new(GameConfig::default(), Arc::new(transport), config.prefetch).unwrap(),
    );
    let handler = Arc::clone(&game);
    let connection = Connection::open(&config, outgoing, move |line| {
        handler.handle_line(&line).unwrap();
    })
    .unwrap();

    assert!(wait_for(|| game.session().snapshot().phase == GamePhase::Running));
    assert!(game.session().place_at(2, 2).unwrap());

    let board = seen_rx
        .iter()
        .find(|line| line.starts_with("BOARD"))
        .unwrap();
    let values: Vec<&str> = board.split(' ').skip(1).collect();
    assert_eq!(values.len(), 25);
    // Dot (value 4) on the centre cell: column 2, row 2.
    assert_eq!(values[2 * 5 + 2], "4");

    assert!(wait_for(|| game.session().scores().len() == 2));
    assert_eq!(
        game.session().scores().entries()[0],
        ScoreEntry::new("Bob", 900)
    );

    game.stop();
    connection.close();
    drop(seen_rx);
    server.join().unwrap();
}

#[test]
fn connection_reports_server_hangup() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (socket, _) = listener.accept().unwrap();
        drop(socket);
    });

    let config = ClientConfig {
        port,
        ..ClientConfig::default()
    };
    let (_transport, outgoing) = ChannelTransport::new();
    let connection = Connection::open(&config, outgoing, |_| {}).unwrap();
    server.join().unwrap();

    assert!(wait_for(|| connection.is_closed()));
    connection.close();
}

#[tokio::test]
async fn run_connection_feeds_multiplayer_game() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (transport, outgoing) = ChannelTransport::new();
    let game = Arc::new(
        MultiplayerGame::new(GameConfig::default(), Arc::new(transport), 3).unwrap(),
    );
    let handler = Arc::clone(&game);

    let client = tokio::spawn(async move {
        let stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        run_connection(
            stream,
            outgoing,
            move |line| {
                let _ = handler.handle_line(&line);
            },
            None,
        )
        .await
    });

    let (server, _) = listener.accept().await.unwrap();
    let (read_half, mut write_half) = server.into_split();
    let mut lines = tokio::io::BufReader::new(read_half).lines();
    for _ in 0..3 {
        let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line.as_deref(), Some("PIECE"));
    }

    write_half
        .write_all(b"PIECE 0\nPIECE 1\nPIECE 2\nHISCORES\nZoe:5\n")
        .await
        .unwrap();
    // Half-close: the client sees EOF but can still send its requests.
    drop(write_half);
    let result = tokio::time::timeout(Duration::from_secs(2), client)
        .await
        .unwrap()
        .unwrap();
    tokio_test::assert_ok!(result);
    drop(lines);

    let snap = game.session().snapshot();
    assert_eq!(snap.phase, GamePhase::Running);
    assert_eq!(game.online_scores().entries(), &[ScoreEntry::new("Zoe", 5)]);
    game.stop();
}

#[test]
fn connect_to_closed_port_fails() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let (_transport, outgoing) = ChannelTransport::new();
    let config = ClientConfig {
        port,
        ..ClientConfig::default()
    };
    assert!(Connection::open(&config, outgoing, |_| {}).is_err());
}
