use thiserror::Error;

use crate::types::Position;

/// Everything a turn can be rejected for
///
/// Game-over is not an error: it is reported on [`TurnOutcome`](crate::TurnOutcome).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("shape does not fit at ({}, {})", .0.x, .0.y)]
    InvalidPlacement(Position),
    #[error("shape {0} is not in the current hand")]
    UnknownShape(String),
    #[error("malformed board: {0}")]
    MalformedBoard(String),
    #[error("malformed shape: {0}")]
    MalformedShape(String),
    #[error("game already ended, no new placements are accepted")]
    SessionAlreadyOver,
}

impl GameError {
    /// Stable machine-readable code, used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidPlacement(_) => "invalid_placement",
            GameError::UnknownShape(_) => "unknown_shape",
            GameError::MalformedBoard(_) => "malformed_board",
            GameError::MalformedShape(_) => "malformed_shape",
            GameError::SessionAlreadyOver => "session_over",
        }
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
