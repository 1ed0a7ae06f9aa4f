//! TCP connection runtime
//!
//! Bridges the synchronous game with an async TCP stream: outgoing lines are
//! taken from the transport channel, incoming lines are handed to a callback
//! one at a time, in arrival order.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::config::ClientConfig;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum Direction {
    In,
    Out,
}

/// One line of the wire log
#[derive(Debug, Clone, Serialize)]
struct WireRecord {
    dir: Direction,
    line: String,
}

fn spawn_wire_log(path: PathBuf) -> mpsc::UnboundedSender<WireRecord> {
    let (tx, mut rx) = mpsc::unbounded_channel::<WireRecord>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
        {
            Ok(f) => f,
            Err(e) => {
                eprintln!("[Net] Cannot open wire log {}: {}", path.display(), e);
                return;
            }
        };

        let mut buf: Vec<u8> = Vec::with_capacity(256);
        while let Some(rec) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &rec).is_err() {
                continue;
            }
            buf.push(b'\n');
            if file.write_all(&buf).await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });
    tx
}

/// Pump lines between `stream` and the game
///
/// Returns when the server closes the connection.
pub async fn run_connection<F>(
    stream: TcpStream,
    mut outgoing: mpsc::UnboundedReceiver<String>,
    mut on_line: F,
    log_path: Option<PathBuf>,
) -> anyhow::Result<()>
where
    F: FnMut(String) + Send + 'static,
{
    let wire_log = log_path.map(spawn_wire_log);
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let wire_log_out = wire_log.clone();
    let write_task = tokio::spawn(async move {
        while let Some(line) = outgoing.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err()
                || writer.write_all(b"\n").await.is_err()
                || writer.flush().await.is_err()
            {
                break;
            }
            if let Some(tx) = wire_log_out.as_ref() {
                let _ = tx.send(WireRecord {
                    dir: Direction::Out,
                    line,
                });
            }
        }
    });

    let mut line = String::new();
    let result = loop {
        line.clear();
        let bytes_read = match reader.read_line(&mut line).await {
            Ok(n) => n,
            Err(e) => break Err(e.into()),
        };
        if bytes_read == 0 {
            println!("[Net] Server closed the connection");
            break Ok(());
        }

        let raw_line = line.trim_end_matches(['\n', '\r']).to_string();
        if let Some(tx) = wire_log.as_ref() {
            let _ = tx.send(WireRecord {
                dir: Direction::In,
                line: raw_line.clone(),
            });
        }
        on_line(raw_line);
    };

    write_task.abort();
    result
}

/// Running connection: owns its runtime and the socket tasks
pub struct Connection {
    rt: Runtime,
    closed: Arc<AtomicBool>,
}

impl Connection {
    /// Connect and start pumping lines
    ///
    /// `outgoing` is the receiving end of the transport the game sends on;
    /// `on_line` runs on a runtime worker for every line received.
    pub fn open<F>(
        config: &ClientConfig,
        outgoing: mpsc::UnboundedReceiver<String>,
        on_line: F,
    ) -> anyhow::Result<Self>
    where
        F: FnMut(String) + Send + 'static,
    {
        let addr = config.socket_addr()?;
        let rt = Runtime::new()?;
        let stream = rt.block_on(TcpStream::connect(addr))?;
        println!("[Net] Connected to {}", addr);

        let closed = Arc::new(AtomicBool::new(false));
        let log_path = config.log_path.clone();
        {
            let closed = Arc::clone(&closed);
            rt.spawn(async move {
                if let Err(e) = run_connection(stream, outgoing, on_line, log_path).await {
                    eprintln!("[Net] Connection error: {}", e);
                }
                closed.store(true, Ordering::Release);
            });
        }

        Ok(Self { rt, closed })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Drop the socket without waiting for pending writes
    pub fn close(self) {
        self.rt.shutdown_background();
        println!("[Net] Disconnected");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::net::TcpListener;

    use super::*;

    #[tokio::test]
    async fn test_lines_flow_both_ways() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, mut in_rx) = mpsc::unbounded_channel::<String>();

        let client = tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            run_connection(
                stream,
                out_rx,
                move |line| {
                    let _ = in_tx.send(line);
                },
                None,
            )
            .await
        });

        let (server, _) = listener.accept().await.unwrap();
        let (read_half, mut write_half) = server.into_split();
        let mut lines = BufReader::new(read_half).lines();

        out_tx.send("PIECE".to_string()).unwrap();
        let got = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.as_deref(), Some("PIECE"));

        write_half.write_all(b"PIECE 7\r\nSCORES\n").await.unwrap();
        let first = tokio::time::timeout(Duration::from_secs(2), in_rx.recv())
            .await
            .unwrap();
        let second = tokio::time::timeout(Duration::from_secs(2), in_rx.recv())
            .await
            .unwrap();
        assert_eq!(first.as_deref(), Some("PIECE 7"));
        assert_eq!(second.as_deref(), Some("SCORES"));

        drop(write_half);
        drop(lines);
        let result = tokio::time::timeout(Duration::from_secs(2), client)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wire_log_records_both_directions() {
        let path = std::env::temp_dir().join(format!("tetrecs-wire-{}", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (out_tx, out_rx) = mpsc::unbounded_channel::<String>();
        let log_path = path.clone();

        let client = tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            run_connection(stream, out_rx, |_| {}, Some(log_path)).await
        });

        let (mut server, _) = listener.accept().await.unwrap();
        out_tx.send("HISCORES".to_string()).unwrap();
        let mut buf = [0u8; 9];
        tokio::io::AsyncReadExt::read_exact(&mut server, &mut buf)
            .await
            .unwrap();
        assert_eq!(&buf, b"HISCORES\n");
        server.write_all(b"PIECE 1\n").await.unwrap();
        drop(server);

        tokio::time::timeout(Duration::from_secs(2), client)
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        // The log writer runs on its own task; give it a moment to flush.
        let mut text = String::new();
        for _ in 0..50 {
            text = std::fs::read_to_string(&path).unwrap_or_default();
            if text.lines().count() >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let records: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 2);
        assert!(records.contains(&serde_json::json!({"dir": "out", "line": "HISCORES"})));
        assert!(records.contains(&serde_json::json!({"dir": "in", "line": "PIECE 1"})));
        let _ = std::fs::remove_file(&path);
    }
}
