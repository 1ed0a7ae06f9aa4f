//! Outbound transport seam
//!
//! Sends are fire-and-forget: nothing waits for the server, and a closed
//! connection silently drops lines.

use tokio::sync::mpsc;

use crate::protocol::ClientCommand;

/// Outbound half of a server connection
pub trait Transport: Send + Sync {
    /// Queue one line (without newline) for the server
    fn send_line(&self, line: String);

    fn send(&self, command: &ClientCommand) {
        self.send_line(command.to_line());
    }
}

/// Transport backed by an unbounded channel; the receiving end is drained by
/// a [`Connection`](crate::connection::Connection) or by a test
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Transport for ChannelTransport {
    fn send_line(&self, line: String) {
        let _ = self.tx.send(line);
    }
}
