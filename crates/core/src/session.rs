//! Session module - turn orchestration
//!
//! This module ties together the board, placement rules, dealer and scoring.
//! The engine itself keeps no game between calls: the caller owns the
//! [`GameSession`] and hands it back every turn. The only side effect is
//! reporting a finished game to a [`ResultSink`].

use std::convert::Infallible;
use std::fmt;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::Board;
use crate::dealer::{deal_hand, Hand, InstanceId};
use crate::error::{GameError, Result};
use crate::placement::{is_game_over, place};
use crate::scoring::calculate_score;
use crate::shapes::ShapeInstance;
use crate::types::Position;

/// Opaque identity of the player, supplied by whoever authenticated them
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier minted when a game starts
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn mint<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(InstanceId::mint(rng).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final result of a concluded game
///
/// `(session_id, turn)` identifies the terminal turn, so a store can drop a
/// retried record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub user_id: UserId,
    pub session_id: SessionId,
    pub turn: u32,
    pub score: u32,
}

/// Destination for finished games
pub trait ResultSink {
    type Error: fmt::Display;

    fn record(&mut self, result: GameResult) -> core::result::Result<(), Self::Error>;
}

impl<S: ResultSink + ?Sized> ResultSink for &mut S {
    type Error = S::Error;

    fn record(&mut self, result: GameResult) -> core::result::Result<(), Self::Error> {
        (**self).record(result)
    }
}

impl ResultSink for Vec<GameResult> {
    type Error = Infallible;

    fn record(&mut self, result: GameResult) -> core::result::Result<(), Self::Error> {
        self.push(result);
        Ok(())
    }
}

/// Sink that drops every result
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardResults;

impl ResultSink for DiscardResults {
    type Error = Infallible;

    fn record(&mut self, _result: GameResult) -> core::result::Result<(), Self::Error> {
        Ok(())
    }
}

/// Client-held state of one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub session_id: SessionId,
    pub board: Board,
    pub hand: Hand,
    /// Running total
    pub score: u32,
    /// Successful placements so far
    pub turn: u32,
    pub game_over: bool,
}

impl GameSession {
    /// A fresh game: empty board, the given hand, nothing scored
    pub fn new(session_id: SessionId, hand: Hand) -> Self {
        Self {
            session_id,
            board: Board::new(),
            hand,
            score: 0,
            turn: 0,
            game_over: false,
        }
    }

    /// Find a hand shape by instance id
    pub fn find_shape(&self, instance_id: &str) -> Option<&ShapeInstance> {
        self.hand
            .iter()
            .find(|s| s.instance_id.as_str() == instance_id)
    }

    /// Fold a turn's outcome into this session
    pub fn apply(&mut self, outcome: TurnOutcome) {
        self.board = outcome.board;
        self.hand = outcome.hand;
        self.score = outcome.score;
        self.turn = outcome.turn;
        self.game_over = outcome.game_over;
    }
}

/// Everything a successful placement produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Board after placement and line clearing
    pub board: Board,
    /// Remaining shapes, or a fresh hand if the last one was played
    pub hand: Hand,
    pub lines_cleared: usize,
    pub score_delta: u32,
    /// Running total including `score_delta`
    pub score: u32,
    pub turn: u32,
    pub game_over: bool,
}

/// Rules engine with an injected random source and result sink
#[derive(Debug)]
pub struct GameEngine<R, S> {
    rng: R,
    sink: S,
}

impl<S: ResultSink> GameEngine<SmallRng, S> {
    /// Engine with a deterministic dealer
    pub fn seeded(seed: u64, sink: S) -> Self {
        Self::new(SmallRng::seed_from_u64(seed), sink)
    }
}

impl<R: Rng, S: ResultSink> GameEngine<R, S> {
    pub fn new(rng: R, sink: S) -> Self {
        Self { rng, sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Start a game: empty board, a fresh hand, score 0
    pub fn new_game(&mut self) -> GameSession {
        let session_id = SessionId::mint(&mut self.rng);
        let hand = deal_hand(&mut self.rng);
        tracing::debug!(session = %session_id, "new game");
        GameSession::new(session_id, hand)
    }

    /// Play `shape_instance_id` from the session's hand at `position`
    ///
    /// Rejected turns change nothing. When the turn ends the game, exactly one
    /// [`GameResult`] is sent to the sink; a sink failure is logged and the
    /// outcome is returned regardless.
    pub fn place_shape(
        &mut self,
        user: &UserId,
        session: &GameSession,
        shape_instance_id: &str,
        position: Position,
    ) -> Result<TurnOutcome> {
        if session.game_over {
            return Err(GameError::SessionAlreadyOver);
        }

        let Some(shape) = session.find_shape(shape_instance_id) else {
            return Err(GameError::UnknownShape(shape_instance_id.to_string()));
        };

        let placed = place(&session.board, &shape.grid, position)?;
        let clear = placed.clear_lines();
        let board = clear.board;
        let score = calculate_score(clear.count(), board.is_empty());

        let mut hand: Hand = session
            .hand
            .iter()
            .filter(|s| s.instance_id.as_str() != shape_instance_id)
            .cloned()
            .collect();
        if hand.is_empty() {
            hand = deal_hand(&mut self.rng);
        }

        let game_over = is_game_over(&board, hand.iter().map(|s| &s.grid));
        let outcome = TurnOutcome {
            board,
            hand,
            lines_cleared: clear.count(),
            score_delta: score.total,
            score: session.score.saturating_add(score.total),
            turn: session.turn.saturating_add(1),
            game_over,
        };

        tracing::debug!(
            session = %session.session_id,
            shape = %shape.template_id,
            x = position.x,
            y = position.y,
            lines = outcome.lines_cleared,
            delta = outcome.score_delta,
            "shape placed"
        );

        if game_over {
            tracing::info!(
                user = %user,
                session = %session.session_id,
                score = outcome.score,
                turns = outcome.turn,
                "game over"
            );
            let result = GameResult {
                user_id: user.clone(),
                session_id: session.session_id.clone(),
                turn: outcome.turn,
                score: outcome.score,
            };
            if let Err(e) = self.sink.record(result) {
                tracing::warn!(
                    user = %user,
                    session = %session.session_id,
                    "failed to record game result: {}",
                    e
                );
            }
        }

        Ok(outcome)
    }
}
