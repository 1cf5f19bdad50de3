//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains the rules of the 8x8 block-placement puzzle: placing
//! shapes from a hand of three, clearing full rows and columns, scoring, and
//! deciding when no move is left. It has no dependencies on networking or
//! I/O, which keeps it:
//!
//! - **Deterministic**: a seeded RNG deals identical games
//! - **Testable**: every rule is covered by unit tests
//! - **Cheap**: boards are `Copy` and hands never allocate beyond the shapes
//!
//! # Module Structure
//!
//! - [`board`]: 8x8 grid, line detection and clearing
//! - [`shapes`]: the 30-template catalog and shape grids
//! - [`dealer`]: random hands and instance ids
//! - [`placement`]: fit checks and game-over detection
//! - [`scoring`]: points per cleared line plus the empty-board bonus
//! - [`session`]: the turn pipeline and result reporting
//!
//! # Game Rules
//!
//! - A shape may be placed wherever its filled cells land on empty board cells
//! - After each placement, every full row and full column is emptied at once
//! - Each cleared line scores 10; emptying the whole board adds 100
//! - When the hand runs out, a fresh hand of three is dealt
//! - The game ends when no shape in the hand fits anywhere
//!
//! # Example
//!
//! ```
//! use blockfit_core::{DiscardResults, GameEngine, UserId};
//! use blockfit_core::types::Position;
//!
//! let mut engine = GameEngine::seeded(12345, DiscardResults);
//! let mut session = engine.new_game();
//!
//! let id = session.hand[0].instance_id.to_string();
//! let outcome = engine
//!     .place_shape(&UserId::new("player"), &session, &id, Position::ORIGIN)
//!     .unwrap();
//! session.apply(outcome);
//!
//! assert_eq!(session.turn, 1);
//! assert_eq!(session.hand.len(), 2);
//! ```

pub mod board;
pub mod dealer;
pub mod error;
pub mod placement;
pub mod scoring;
pub mod session;
pub mod shapes;

pub use blockfit_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, LineClear};
pub use dealer::{deal, deal_hand, Hand, InstanceId};
pub use error::{GameError, Result};
pub use placement::{can_place_shape, is_game_over, is_valid_placement, place};
pub use scoring::{calculate_score, ScoreResult};
pub use session::{
    DiscardResults, GameEngine, GameResult, GameSession, ResultSink, SessionId, TurnOutcome,
    UserId,
};
pub use shapes::{catalog, find_template, ShapeGrid, ShapeInstance, ShapeTemplate, SHAPE_COUNT};
