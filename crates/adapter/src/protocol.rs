//! Protocol module - JSON message types for the game service
//!
//! Line-delimited JSON: one object per line, every message has `type`, `seq`
//! (sequence number) and `ts` (timestamp in ms). Field names are camelCase.
//!
//! The core crate knows nothing about serde. This module owns the wire shapes
//! and the conversions to and from core types, and it is where untrusted
//! boards and hands are validated.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{
    Board, GameError, GameSession, Hand, InstanceId, SessionId, ShapeGrid, ShapeInstance,
    TurnOutcome,
};
use crate::types::{Position, GRID_SIZE, HAND_SIZE};

/// Board or shape grid on the wire: rows of `0`/`1`
///
/// Kept as raw JSON so that any non-binary cell reaches grid validation
/// instead of failing the whole message.
pub type WireGrid = Value;

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NewGameType {
    #[default]
    #[serde(rename = "newGame")]
    NewGame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlaceShapeType {
    #[default]
    #[serde(rename = "placeShape")]
    PlaceShape,
}

/// Client hello message (first message on a connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    /// Player identity; finished games are recorded under it
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Start a new game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGameMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: NewGameType,
    pub seq: u64,
    pub ts: u64,
}

/// Place one shape from the hand
///
/// The client holds the game between turns and sends it back in full.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceShapeMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: PlaceShapeType,
    pub seq: u64,
    pub ts: u64,
    pub shape_instance_id: String,
    pub position: WirePosition,
    pub board: WireGrid,
    pub hand: Vec<WireShape>,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub turn: u32,
    #[serde(default)]
    pub game_over: bool,
    /// Required; a missing value decodes as empty and is rejected
    #[serde(default)]
    pub session_id: String,
}

impl PlaceShapeMessage {
    /// Validate the client-held state and rebuild the session from it
    pub fn to_session(&self) -> Result<GameSession, GameError> {
        Ok(GameSession {
            session_id: SessionId::new(self.session_id.clone()),
            board: board_from_wire(&self.board)?,
            hand: hand_from_wire(&self.hand)?,
            score: self.score,
            turn: self.turn,
            game_over: self.game_over,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePosition {
    pub x: i32,
    pub y: i32,
}

impl From<WirePosition> for Position {
    fn from(p: WirePosition) -> Self {
        Position::new(p.x, p.y)
    }
}

/// A shape as the client sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireShape {
    /// Catalog template id
    pub id: String,
    /// Instance id, distinct within a hand
    pub unique_id: String,
    pub grid: WireGrid,
    #[serde(default)]
    pub color: String,
}

impl From<&ShapeInstance> for WireShape {
    fn from(shape: &ShapeInstance) -> Self {
        Self {
            id: shape.template_id.to_string(),
            unique_id: shape.instance_id.to_string(),
            grid: Value::from(shape.grid.to_bits()),
            color: shape.color.to_string(),
        }
    }
}

/// Narrow an untrusted grid to rows of bits
///
/// Every cell must be the integer `0` or `1`; anything else is reported
/// through `malformed`. Row counts and lengths are left to the core.
fn grid_bits(
    grid: &Value,
    what: &str,
    malformed: fn(String) -> GameError,
) -> Result<Vec<Vec<u8>>, GameError> {
    let rows = grid
        .as_array()
        .ok_or_else(|| malformed(format!("{what} is {grid}, expected an array of rows")))?;

    rows.iter()
        .enumerate()
        .map(|(y, row)| -> Result<Vec<u8>, GameError> {
            let cells = row
                .as_array()
                .ok_or_else(|| malformed(format!("{what} row {y} is {row}, expected an array")))?;
            cells
                .iter()
                .enumerate()
                .map(|(x, cell)| match cell.as_u64() {
                    Some(bit @ (0 | 1)) => Ok(bit as u8),
                    _ => Err(malformed(format!(
                        "{what} cell ({x}, {y}) is {cell}, expected 0 or 1"
                    ))),
                })
                .collect()
        })
        .collect()
}

/// Decode an untrusted board
pub fn board_from_wire(grid: &Value) -> Result<Board, GameError> {
    Board::from_bits(&grid_bits(grid, "board", GameError::MalformedBoard)?)
}

/// Decode an untrusted hand
///
/// At most [`HAND_SIZE`] shapes, each with a non-empty `uniqueId` that no
/// other shape in the hand shares.
pub fn hand_from_wire(shapes: &[WireShape]) -> Result<Hand, GameError> {
    if shapes.len() > HAND_SIZE {
        return Err(GameError::MalformedShape(format!(
            "hand has {} shapes, at most {HAND_SIZE} allowed",
            shapes.len()
        )));
    }

    let mut seen = HashSet::with_capacity(shapes.len());
    let mut hand = Hand::new();
    for shape in shapes {
        if shape.unique_id.is_empty() {
            return Err(GameError::MalformedShape(format!(
                "shape {} has no uniqueId",
                shape.id
            )));
        }
        if !seen.insert(shape.unique_id.as_str()) {
            return Err(GameError::MalformedShape(format!(
                "uniqueId {} appears more than once in the hand",
                shape.unique_id
            )));
        }
        let grid = ShapeGrid::from_bits(&grid_bits(
            &shape.grid,
            "shape grid",
            GameError::MalformedShape,
        )?)?;
        hand.push(ShapeInstance::new(
            shape.id.clone(),
            InstanceId::new(shape.unique_id.clone()),
            grid,
            shape.color.clone(),
        ));
    }
    Ok(hand)
}

pub fn hand_to_wire(hand: &Hand) -> Vec<WireShape> {
    hand.iter().map(WireShape::from).collect()
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    #[serde(rename = "game")]
    Game,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnType {
    #[serde(rename = "turn")]
    Turn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "unknown_shape")]
    UnknownShape,
    #[serde(rename = "invalid_placement")]
    InvalidPlacement,
    #[serde(rename = "malformed_board")]
    MalformedBoard,
    #[serde(rename = "malformed_shape")]
    MalformedShape,
    #[serde(rename = "session_over")]
    SessionOver,
}

impl From<&GameError> for ErrorCode {
    fn from(err: &GameError) -> Self {
        match err {
            GameError::InvalidPlacement(_) => ErrorCode::InvalidPlacement,
            GameError::UnknownShape(_) => ErrorCode::UnknownShape,
            GameError::MalformedBoard(_) => ErrorCode::MalformedBoard,
            GameError::MalformedShape(_) => ErrorCode::MalformedShape,
            GameError::SessionAlreadyOver => ErrorCode::SessionOver,
        }
    }
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub grid_size: usize,
    pub hand_size: usize,
    pub shape_count: usize,
}

/// A freshly started game (response to newGame)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMessage {
    #[serde(rename = "type")]
    pub msg_type: GameType,
    pub seq: u64,
    pub ts: u64,
    pub session_id: String,
    pub board: WireGrid,
    pub hand: Vec<WireShape>,
    pub score: u32,
    pub turn: u32,
    pub game_over: bool,
}

/// Result of an accepted placement (response to placeShape)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnMessage {
    #[serde(rename = "type")]
    pub msg_type: TurnType,
    pub seq: u64,
    pub ts: u64,
    pub board: WireGrid,
    pub hand: Vec<WireShape>,
    pub score_delta: u32,
    pub score: u32,
    pub turn: u32,
    pub lines_cleared: usize,
    pub game_over: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Parse a raw JSON message
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "newGame")]
        NewGame(NewGameMessage),
        #[serde(rename = "placeShape")]
        PlaceShape(PlaceShapeMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::NewGame(m)) => Ok(ParsedMessage::NewGame(m)),
        Ok(InboundMessage::PlaceShape(m)) => Ok(ParsedMessage::PlaceShape(Box::new(m))),
        Err(e) => {
            // An unrecognized type is reported, not treated as a parse failure.
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
                seq: Option<u64>,
            }
            let head = serde_json::from_str::<TypeOnly>(json)?;
            match head.msg_type {
                Some("hello" | "newGame" | "placeShape") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: head.seq.unwrap_or(0),
                })),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    NewGame(NewGameMessage),
    PlaceShape(Box<PlaceShapeMessage>),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Create a hello message (client side, used by tests and tools)
pub fn create_hello(
    seq: u64,
    client_name: &str,
    protocol_version: &str,
    user_id: &str,
) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        user_id: user_id.to_string(),
    }
}

pub fn create_welcome(seq: u64, protocol_version: &str) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        grid_size: GRID_SIZE,
        hand_size: HAND_SIZE,
        shape_count: crate::core::SHAPE_COUNT,
    }
}

pub fn create_game(seq: u64, session: &GameSession) -> GameMessage {
    GameMessage {
        msg_type: GameType::Game,
        seq,
        ts: current_timestamp_ms(),
        session_id: session.session_id.to_string(),
        board: Value::from(session.board.to_bits()),
        hand: hand_to_wire(&session.hand),
        score: session.score,
        turn: session.turn,
        game_over: session.game_over,
    }
}

pub fn create_turn(seq: u64, outcome: &TurnOutcome) -> TurnMessage {
    TurnMessage {
        msg_type: TurnType::Turn,
        seq,
        ts: current_timestamp_ms(),
        board: Value::from(outcome.board.to_bits()),
        hand: hand_to_wire(&outcome.hand),
        score_delta: outcome.score_delta,
        score: outcome.score,
        turn: outcome.turn,
        lines_cleared: outcome.lines_cleared,
        game_over: outcome.game_over,
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Map a rejected turn onto an error reply
pub fn create_game_error(seq: u64, err: &GameError) -> ErrorMessage {
    create_error(seq, ErrorCode::from(err), &err.to_string())
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::core::{DiscardResults, GameEngine};

    fn wire_shape(id: &str, unique_id: &str, grid: WireGrid) -> WireShape {
        WireShape {
            id: id.to_string(),
            unique_id: unique_id.to_string(),
            grid,
            color: String::new(),
        }
    }

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"test-bot","version":"1.0.0"},"protocolVersion":"1.0.0","userId":"player-7"}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.msg_type, HelloType::Hello);
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "test-bot");
                assert_eq!(msg.protocol_version, "1.0.0");
                assert_eq!(msg.user_id, "player-7");
            }
            _ => panic!("Expected Hello message"),
        }
    }

    #[test]
    fn test_parse_place_shape() {
        let json = r#"{"type":"placeShape","seq":4,"ts":1,"shapeInstanceId":"abc","position":{"x":2,"y":-1},"board":[[0]],"hand":[{"id":"TEEWEE","uniqueId":"abc","grid":[[0,1,0],[1,1,1]]}],"sessionId":"s-9"}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::PlaceShape(msg) => {
                assert_eq!(msg.shape_instance_id, "abc");
                assert_eq!(Position::from(msg.position), Position::new(2, -1));
                assert_eq!(msg.hand.len(), 1);
                assert_eq!(msg.hand[0].color, "");
                assert_eq!(msg.score, 0);
                assert_eq!(msg.session_id, "s-9");
            }
            _ => panic!("Expected PlaceShape message"),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let json = r#"{"type":"rotate","seq":9,"ts":1}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Unknown(m) => assert_eq!(m.seq, 9),
            _ => panic!("Expected Unknown message"),
        }
    }

    #[test]
    fn test_parse_known_type_with_bad_fields_is_error() {
        let json = r#"{"type":"newGame","ts":1}"#;
        assert!(parse_message(json).is_err());
    }

    #[test]
    fn test_hand_rejects_duplicate_unique_ids() {
        let hand = vec![
            wire_shape("A", "x", json!([[1]])),
            wire_shape("B", "x", json!([[1, 1]])),
        ];
        assert!(matches!(
            hand_from_wire(&hand),
            Err(GameError::MalformedShape(_))
        ));
    }

    #[test]
    fn test_hand_rejects_oversized_and_bad_grids() {
        let four: Vec<_> = (0..4)
            .map(|i| wire_shape("A", &i.to_string(), json!([[1]])))
            .collect();
        assert!(matches!(
            hand_from_wire(&four),
            Err(GameError::MalformedShape(_))
        ));

        let ragged = vec![wire_shape("A", "a", json!([[1, 1], [1]]))];
        assert!(matches!(
            hand_from_wire(&ragged),
            Err(GameError::MalformedShape(_))
        ));

        let missing_id = vec![wire_shape("A", "", json!([[1]]))];
        assert!(matches!(
            hand_from_wire(&missing_id),
            Err(GameError::MalformedShape(_))
        ));
    }

    #[test]
    fn test_board_rejects_non_binary() {
        for bad in [json!(3), json!(256), json!(-1), json!(true), json!(1.0), json!("1")] {
            let mut board = json!(vec![vec![0; GRID_SIZE]; GRID_SIZE]);
            board[4][2] = bad.clone();
            match board_from_wire(&board) {
                Err(GameError::MalformedBoard(msg)) => {
                    assert!(msg.contains("(2, 4)"), "{bad}: {msg}")
                }
                other => panic!("{bad}: expected MalformedBoard, got {other:?}"),
            }
        }

        assert!(matches!(
            board_from_wire(&json!("empty")),
            Err(GameError::MalformedBoard(_))
        ));
        assert!(matches!(
            board_from_wire(&json!(vec![vec![0; GRID_SIZE]; GRID_SIZE - 1])),
            Err(GameError::MalformedBoard(_))
        ));
    }

    #[test]
    fn test_shape_grid_rejects_non_binary() {
        let hand = vec![wire_shape("A", "a", json!([[1, 256]]))];
        assert!(matches!(
            hand_from_wire(&hand),
            Err(GameError::MalformedShape(_))
        ));
    }

    #[test]
    fn test_place_shape_with_wide_cells_still_parses() {
        let json = r#"{"type":"placeShape","seq":4,"ts":1,"shapeInstanceId":"a","position":{"x":0,"y":0},"board":[[-1, true, 256]],"hand":[],"sessionId":"s"}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::PlaceShape(msg) => assert!(matches!(
                msg.to_session(),
                Err(GameError::MalformedBoard(_))
            )),
            _ => panic!("Expected PlaceShape message"),
        }
    }

    #[test]
    fn test_missing_session_id_decodes_empty() {
        let json = r#"{"type":"placeShape","seq":4,"ts":1,"shapeInstanceId":"a","position":{"x":0,"y":0},"board":[],"hand":[]}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::PlaceShape(msg) => assert!(msg.session_id.is_empty()),
            _ => panic!("Expected PlaceShape message"),
        }
    }

    #[test]
    fn test_create_welcome() {
        let welcome = create_welcome(1, "1.0.0");
        assert_eq!(welcome.msg_type, WelcomeType::Welcome);
        assert_eq!(welcome.seq, 1);
        assert_eq!(welcome.grid_size, 8);
        assert_eq!(welcome.hand_size, 3);
        assert_eq!(welcome.shape_count, 30);
    }

    #[test]
    fn test_game_message_shape() {
        let mut engine = GameEngine::seeded(4, DiscardResults);
        let session = engine.new_game();
        let msg = create_game(2, &session);

        let v = serde_json::to_value(&msg).unwrap();
        assert_eq!(v["type"], "game");
        assert_eq!(v["score"], 0);
        assert_eq!(v["gameOver"], false);
        assert_eq!(v["board"].as_array().unwrap().len(), GRID_SIZE);
        assert_eq!(v["hand"].as_array().unwrap().len(), HAND_SIZE);
        assert!(v["hand"][0]["uniqueId"].is_string());
    }

    #[test]
    fn test_wire_hand_survives_a_round_trip() {
        let mut engine = GameEngine::seeded(11, DiscardResults);
        let session = engine.new_game();
        let wire = hand_to_wire(&session.hand);
        let back = hand_from_wire(&wire).unwrap();
        assert_eq!(back, session.hand);
    }

    #[test]
    fn test_create_game_error() {
        let err = create_game_error(5, &GameError::UnknownShape("zz".to_string()));
        assert_eq!(err.msg_type, ErrorType::Error);
        assert_eq!(err.code, ErrorCode::UnknownShape);

        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["code"], "unknown_shape");
    }

    #[test]
    fn test_error_codes_match_core() {
        let errors = [
            GameError::InvalidPlacement(Position::ORIGIN),
            GameError::UnknownShape(String::new()),
            GameError::MalformedBoard(String::new()),
            GameError::MalformedShape(String::new()),
            GameError::SessionAlreadyOver,
        ];
        for err in &errors {
            let wire = serde_json::to_value(ErrorCode::from(err)).unwrap();
            assert_eq!(wire, err.code());
        }
    }
}
