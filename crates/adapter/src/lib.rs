//! Adapter - the puzzle engine as a TCP service with a JSON protocol
//!
//! Clients drive games over a **line-delimited JSON protocol**. The server
//! keeps no game between requests: every `placeShape` carries the board and
//! hand the client currently holds, and every reply carries the next ones.
//!
//! # Protocol Overview
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello` with its `userId`, server responds with `welcome`
//! 3. **New game**: `newGame` returns an empty board and a fresh hand
//! 4. **Turns**: `placeShape` returns the next board, hand, score delta and game-over flag
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Handshake with client info, protocol version and user id
//! - **newGame**: Start a game
//! - **placeShape**: Place one hand shape at a board position
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with grid size, hand size and catalog size
//! - **game**: A freshly started game
//! - **turn**: Result of an accepted placement
//! - **error**: Rejected request with code and message
//!
//! # Environment Variables
//!
//! - `BLOCKFIT_HOST`: Bind address (default: "127.0.0.1")
//! - `BLOCKFIT_PORT`: Port number (default: 7878)
//! - `BLOCKFIT_RESULTS_PATH`: JSON-lines file for finished games
//! - `BLOCKFIT_SEED`: Base seed for reproducible dealing
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"bot","version":"1.0.0"},"protocolVersion":"1.0.0","userId":"p1"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocolVersion":"1.0.0","gridSize":8,"handSize":3,"shapeCount":30}
//! Client -> Server: {"type":"newGame","seq":2,"ts":1234567891}
//! Server -> Client: {"type":"game","seq":2,"ts":1234567891,"sessionId":"...","board":[[0,...]],"hand":[...],"score":0,"turn":0,"gameOver":false}
//! Client -> Server: {"type":"placeShape","seq":3,"ts":1234567892,"shapeInstanceId":"...","position":{"x":0,"y":0},"board":[...],"hand":[...],"score":0,"turn":0}
//! Server -> Client: {"type":"turn","seq":3,"ts":1234567892,"board":[...],"hand":[...],"scoreDelta":0,"score":0,"turn":1,"linesCleared":0,"gameOver":false}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7878
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocolVersion":"1.0.0","userId":"me"}
//! ```

pub mod protocol;
pub mod results;
pub mod server;

pub use blockfit_core as core;
pub use blockfit_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use results::{run_result_writer, ChannelSink, ResultRecord};
pub use server::{run_server, ServerConfig, PROTOCOL_VERSION};
