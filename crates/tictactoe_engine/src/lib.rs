//! Pure tic-tac-toe rules for the game service.
//!
//! - **Board**: replays a move history into a 3x3 grid and detects terminal
//!   outcomes.
//! - **Search**: exhaustive minimax for the automated opponent, parametrised
//!   by a [`RoleMapping`] passed per call.
//! - **Game**: the move/turn state machine that validates a submission,
//!   appends it, lets the opponent answer and updates status and winner.
//!
//! Nothing here performs I/O or blocks; persistence and concurrency control
//! live with the caller.
//!
//! # Example
//!
//! ```
//! use tictactoe_engine::{Cell, Game, GameMode, GameStatus, Player};
//!
//! let game = Game::new(1, GameMode::HumanVsAutomated);
//! let step = game.apply_move(&[], Cell::try_new(1, 1)?)?;
//!
//! assert_eq!(step.moves().len(), 2);
//! assert_eq!(step.game().status(), GameStatus::InProgress);
//! assert_eq!(step.game().active_turn(), Some(Player::Human));
//! # Ok::<(), tictactoe_engine::MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod error;
mod game;
mod search;
mod types;

pub use board::{Board, winner};
pub use error::{EngineError, MoveError};
pub use game::{Game, Transition};
pub use search::{MAX_DEPTH, Search, best_move, score};
pub use types::{Cell, GameId, GameMode, GameStatus, Move, Outcome, Player, Role, RoleMapping};
