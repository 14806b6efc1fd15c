//! TCP Game Server
//!
//! Async TCP accept loop for the one-command-per-connection protocol.
//! Each accepted connection is handled by a worker task drawn from a
//! semaphore-bounded pool: read one CRLF-terminated command line (with a
//! bounded timeout), run it through the dispatcher, write one JSON reply
//! followed by a blank line, close. A client that disconnects or stalls
//! before a full command arrives never touches the game lock.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::network::dispatcher::Dispatcher;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connection workers.
    pub max_workers: usize,
    /// How long a connection may take to deliver a full command.
    pub read_timeout: Duration,
    /// Upper bound on the command line, in bytes.
    pub max_command_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8889".parse().unwrap(),
            max_workers: 20,
            read_timeout: Duration::from_secs(30),
            max_command_bytes: 4096,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden from `UNO_BIND_ADDR`, `UNO_MAX_WORKERS` and
    /// `UNO_READ_TIMEOUT_SECS`. Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("UNO_BIND_ADDR") {
            match raw.parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(_) => warn!("ignoring unparseable UNO_BIND_ADDR: {}", raw),
            }
        }
        if let Ok(raw) = std::env::var("UNO_MAX_WORKERS") {
            match raw.parse() {
                Ok(n) if n > 0 => config.max_workers = n,
                _ => warn!("ignoring unparseable UNO_MAX_WORKERS: {}", raw),
            }
        }
        if let Ok(raw) = std::env::var("UNO_READ_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => config.read_timeout = Duration::from_secs(secs),
                Err(_) => warn!("ignoring unparseable UNO_READ_TIMEOUT_SECS: {}", raw),
            }
        }

        config
    }
}

/// Server failures.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// Failed to bind the listen socket.
    #[error("failed to bind: {0}")]
    BindFailed(#[from] io::Error),
}

/// The game server: accept loop plus bounded worker pool.
pub struct GameServer {
    config: ServerConfig,
    dispatcher: Dispatcher,
}

impl GameServer {
    /// Create a server for one dispatcher (one shared table).
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// Bind and serve until the process exits.
    pub async fn run(&self) -> Result<(), ServeError> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        info!(
            "UNO table server listening on {} ({} workers)",
            self.config.bind_addr, self.config.max_workers
        );

        let workers = Arc::new(Semaphore::new(self.config.max_workers));

        loop {
            let (stream, addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("accept error: {}", e);
                    continue;
                }
            };

            let permit = workers
                .clone()
                .acquire_owned()
                .await
                .expect("worker semaphore is never closed");
            debug!(%addr, "connection accepted");

            let dispatcher = self.dispatcher.clone();
            let read_timeout = self.config.read_timeout;
            let max_command_bytes = self.config.max_command_bytes;

            tokio::spawn(async move {
                if let Err(err) =
                    handle_connection(stream, addr, dispatcher, read_timeout, max_command_bytes)
                        .await
                {
                    warn!(%addr, %err, "connection error");
                }
                drop(permit);
            });
        }
    }
}

/// One complete exchange: read a command, dispatch it, write the reply,
/// close the connection.
async fn handle_connection(
    mut stream: TcpStream,
    addr: SocketAddr,
    dispatcher: Dispatcher,
    read_timeout: Duration,
    max_command_bytes: usize,
) -> io::Result<()> {
    let line = match timeout(read_timeout, read_command(&mut stream, max_command_bytes)).await {
        Ok(Ok(Some(line))) => line,
        Ok(Ok(None)) => {
            debug!(%addr, "client closed before sending a full command");
            return Ok(());
        }
        Ok(Err(e)) => return Err(e),
        Err(_) => {
            warn!(%addr, "read timed out before a full command arrived");
            return Ok(());
        }
    };

    debug!(%addr, command = %line, "received");
    let reply = dispatcher.handle_line(&line).await;
    let body = match reply.to_json() {
        Ok(json) => json,
        Err(e) => {
            error!(%addr, "failed to serialize reply: {}", e);
            r#"{"status":"ERROR","message":"internal server error"}"#.to_string()
        }
    };

    stream.write_all(body.as_bytes()).await?;
    stream.write_all(b"\r\n\r\n").await?;
    stream.shutdown().await?;
    Ok(())
}

/// Read until the first newline, bounded by `max_bytes`. Returns `None` if
/// the peer closes before a full line arrives.
async fn read_command(stream: &mut TcpStream, max_bytes: usize) -> io::Result<Option<String>> {
    let mut buf: Vec<u8> = Vec::with_capacity(256);
    let mut chunk = [0u8; 512];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = buf.iter().position(|&b| b == b'\n') {
            let line = String::from_utf8_lossy(&buf[..pos]).trim().to_string();
            return Ok(Some(line));
        }
        if buf.len() > max_bytes {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "command exceeds size limit",
            ));
        }
    }
}
