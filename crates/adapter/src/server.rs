//! TCP server for the game service
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.
//!
//! Each connection gets its own task and its own [`GameEngine`], so requests
//! on one connection are processed strictly in order and never share an RNG.
//! Finished games go to a single results writer task.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use crate::core::{GameEngine, UserId};
use crate::protocol::*;
use crate::results::{run_result_writer, ChannelSink, ResultRecord};

/// Protocol version spoken by this server; clients must share the major
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    /// JSON-lines file for finished games; results are only logged when unset
    pub results_path: Option<PathBuf>,
    /// Base seed for dealing; each connection derives its own
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            results_path: None,
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let host = env::var("BLOCKFIT_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("BLOCKFIT_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7878);

        let results_path = env::var("BLOCKFIT_RESULTS_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(PathBuf::from(s)) });

        let seed = env::var("BLOCKFIT_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        Self {
            host,
            port,
            protocol_version: PROTOCOL_VERSION.to_string(),
            results_path,
            seed,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }

    /// Protocol major version prefix, e.g. `"1."`
    fn major_prefix(&self) -> String {
        let major = self
            .protocol_version
            .split('.')
            .next()
            .unwrap_or(&self.protocol_version);
        format!("{}.", major)
    }

    fn engine_rng(&self, client_id: usize) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(client_id as u64)),
            None => SmallRng::from_entropy(),
        }
    }
}

/// Per-connection handshake and sequencing state
#[derive(Debug, Default)]
struct ClientState {
    user: Option<UserId>,
    last_seq: Option<u64>,
}

impl ClientState {
    fn is_handshaken(&self) -> bool {
        self.user.is_some()
    }

    /// Accept `seq` only if it is above the last one seen
    fn check_and_update_seq(&mut self, seq: u64) -> bool {
        match self.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                self.last_seq = Some(seq);
                true
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Game(GameMessage),
    Turn(TurnMessage),
    Error(ErrorMessage),
}

/// Start the TCP server
///
/// Binds `config.socket_addr()`, reports the bound address on `ready_tx`
/// (useful with port 0) and serves until the listener fails.
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let (results_tx, results_rx) = mpsc::unbounded_channel::<ResultRecord>();
    let results_path = config.results_path.clone();
    tokio::spawn(async move {
        if let Err(e) = run_result_writer(results_path, results_rx).await {
            tracing::error!("results writer stopped: {:#}", e);
        }
    });

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr).await?;
    let bound = listener.local_addr()?;
    tracing::info!("listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let config = Arc::new(config);
    let mut client_id_counter = 0usize;

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        tracing::info!(client = client_id, %addr, "client connected");

        let config = Arc::clone(&config);
        let sink = ChannelSink::new(results_tx.clone());

        // Spawn task to handle this client
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, client_id, config, sink).await {
                tracing::warn!(client = client_id, "client error: {}", e);
            }
            tracing::info!(client = client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    config: Arc<ServerConfig>,
    sink: ChannelSink,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    // Spawn task to write messages to client
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut engine = GameEngine::new(config.engine_rng(client_id), sink);
    let mut client = ClientState::default();
    let major = config.major_prefix();
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // Client disconnected
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                // Sequencing: enforce monotonic seq per sender.
                if client.is_handshaken() && !client.check_and_update_seq(hello.seq) {
                    let error = create_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                // Validate protocol version
                if !hello.protocol_version.starts_with(&major) {
                    let error = create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    break;
                }

                if hello.user_id.trim().is_empty() {
                    let error =
                        create_error(hello.seq, ErrorCode::InvalidCommand, "userId is required");
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                tracing::info!(
                    client = client_id,
                    user = %hello.user_id,
                    name = %hello.client.name,
                    "hello"
                );
                client.user = Some(UserId::new(hello.user_id));
                client.last_seq = Some(hello.seq);

                let welcome = create_welcome(hello.seq, &config.protocol_version);
                let _ = tx.send(ClientOutbound::Welcome(welcome));
            }

            Ok(ParsedMessage::NewGame(msg)) => {
                if let Some(error) = gate(&mut client, msg.seq, "newGame") {
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                let session = engine.new_game();
                let _ = tx.send(ClientOutbound::Game(create_game(msg.seq, &session)));
            }

            Ok(ParsedMessage::PlaceShape(msg)) => {
                if let Some(error) = gate(&mut client, msg.seq, "placeShape") {
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }
                let Some(user) = client.user.as_ref() else {
                    continue;
                };
                if msg.session_id.is_empty() {
                    let error = create_error(
                        msg.seq,
                        ErrorCode::InvalidCommand,
                        "placeShape requires a sessionId",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                let reply = msg.to_session().and_then(|session| {
                    engine.place_shape(
                        user,
                        &session,
                        &msg.shape_instance_id,
                        msg.position.into(),
                    )
                });
                match reply {
                    Ok(outcome) => {
                        let _ = tx.send(ClientOutbound::Turn(create_turn(msg.seq, &outcome)));
                    }
                    Err(e) => {
                        tracing::debug!(client = client_id, seq = msg.seq, "turn rejected: {}", e);
                        let _ = tx.send(ClientOutbound::Error(create_game_error(msg.seq, &e)));
                    }
                }
            }

            Ok(ParsedMessage::Unknown(m)) => {
                let error =
                    create_error(m.seq, ErrorCode::InvalidCommand, "Unknown message type");
                let _ = tx.send(ClientOutbound::Error(error));
            }

            Err(e) => {
                tracing::warn!(client = client_id, "unparseable message: {}", e);
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                let error = create_error(seq, ErrorCode::InvalidCommand, &e.to_string());
                let _ = tx.send(ClientOutbound::Error(error));
            }
        }
    }

    // Let queued replies drain before the socket closes.
    drop(tx);
    let _ = write_task.await;
    Ok(())
}

/// Handshake and sequencing checks shared by game requests
fn gate(client: &mut ClientState, seq: u64, what: &str) -> Option<ErrorMessage> {
    if !client.is_handshaken() {
        return Some(create_error(
            seq,
            ErrorCode::HandshakeRequired,
            &format!("Send hello before {}", what),
        ));
    }
    if !client.check_and_update_seq(seq) {
        return Some(create_error(
            seq,
            ErrorCode::InvalidCommand,
            "seq must be strictly increasing",
        ));
    }
    None
}

/// Pull `seq` out of a line that failed to parse, so the error can echo it
fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest
        .as_bytes()
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_from_env() {
        // This test just ensures it doesn't panic
        let _config = ServerConfig::from_env();
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 7878);

        let bad = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_major_prefix() {
        assert_eq!(ServerConfig::default().major_prefix(), "1.");
    }

    #[test]
    fn test_seq_must_increase() {
        let mut client = ClientState::default();
        assert!(client.check_and_update_seq(1));
        assert!(client.check_and_update_seq(5));
        assert!(!client.check_and_update_seq(5));
        assert!(!client.check_and_update_seq(2));
        assert!(client.check_and_update_seq(6));
    }

    #[test]
    fn test_gate_requires_hello() {
        let mut client = ClientState::default();
        let err = gate(&mut client, 1, "newGame").unwrap();
        assert_eq!(err.code, ErrorCode::HandshakeRequired);

        client.user = Some(UserId::new("u"));
        client.last_seq = Some(1);
        assert!(gate(&mut client, 2, "newGame").is_none());
        assert_eq!(
            gate(&mut client, 2, "newGame").unwrap().code,
            ErrorCode::InvalidCommand
        );
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"type":"x","seq": 42,"#), Some(42));
        assert_eq!(extract_seq_best_effort(r#"{"seq":"a"}"#), None);
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn test_seeded_engines_differ_per_client() {
        use rand::Rng;

        let config = ServerConfig {
            seed: Some(9),
            ..ServerConfig::default()
        };
        let a: u64 = config.engine_rng(1).gen();
        let b: u64 = config.engine_rng(2).gen();
        let a_again: u64 = config.engine_rng(1).gen();
        assert_ne!(a, b);
        assert_eq!(a, a_again);
    }
}
