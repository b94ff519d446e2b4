//! Database persistence layer for games and their move histories.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{GameRow, GameSnapshot, MoveRow, NewGameRow, NewMoveRow};
pub use repository::{GameRepository, MIGRATIONS};
