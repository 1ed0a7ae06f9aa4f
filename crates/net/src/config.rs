use std::net::SocketAddr;
use std::path::PathBuf;

/// Default number of pieces requested when a networked game is created
pub const DEFAULT_PREFETCH: usize = 10;

/// Client connection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Pieces requested up front
    pub prefetch: usize,
    /// Append every line sent and received to this file as JSON records
    pub log_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9700,
            prefetch: DEFAULT_PREFETCH,
            log_path: None,
        }
    }
}

impl ClientConfig {
    /// Create from environment variables
    ///
    /// - `TETRECS_HOST` / `TETRECS_PORT`: server address
    /// - `TETRECS_PREFETCH`: pieces requested up front
    /// - `TETRECS_LOG_PATH`: wire log file
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TETRECS_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("TETRECS_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let prefetch = env::var("TETRECS_PREFETCH")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.prefetch);
        let log_path = env::var("TETRECS_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s.into()) });

        Self {
            host,
            port,
            prefetch,
            log_path,
        }
    }

    /// Check if networking is disabled via environment
    pub fn is_offline() -> bool {
        std::env::var("TETRECS_OFFLINE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        use std::net::ToSocketAddrs;

        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow::anyhow!("{}:{} did not resolve", self.host, self.port))
    }
}
