//! Errors raised by the rules engine.

use crate::Player;

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// A coordinate is outside `0..=2`.
    #[display("Incorrect input data. Coordinates should be between 0 and 2.")]
    OutOfRange {
        /// Requested row.
        x: i64,
        /// Requested column.
        y: i64,
    },

    /// The cell already holds a mark.
    #[display("Cell x:{}, y: {} was used.", x, y)]
    CellOccupied {
        /// Row of the used cell.
        x: u8,
        /// Column of the used cell.
        y: u8,
    },

    /// The game reached a terminal outcome.
    #[display("Game you are trying to play is already finished. Try to create a new one")]
    GameFinished,

    /// The stored history breaks a data-model invariant.
    #[display("Corrupt move history: {}", _0)]
    CorruptHistory(String),
}

impl std::error::Error for MoveError {}

/// Error returned by the search entry point.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EngineError {
    /// The player to move is neither the maximizing nor the minimizing role.
    #[display("{} takes no part in this role mapping", _0)]
    UnknownRole(Player),

    /// The history handed to the search breaks a data-model invariant.
    #[display("Corrupt move history: {}", _0)]
    Corrupt(String),
}

impl std::error::Error for EngineError {}

impl From<EngineError> for MoveError {
    fn from(err: EngineError) -> Self {
        MoveError::CorruptHistory(err.to_string())
    }
}
