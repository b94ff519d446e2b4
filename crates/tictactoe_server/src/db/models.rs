//! Database models and their mapping onto engine types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tictactoe_engine::{Cell, Game, GameId, GameMode, GameStatus, Move, Outcome, Player};
use tracing::instrument;

use crate::db::{DbError, schema};

/// Stored game row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRow {
    id: i32,
    status: String,
    winner: String,
    active_turn: Option<String>,
    mode: String,
    version: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl GameRow {
    /// Parses the stored columns into a [`Game`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any enum column holds an unknown value.
    #[instrument(skip(self), fields(game_id = self.id))]
    pub fn to_game(&self) -> Result<Game, DbError> {
        let status = parse_column::<GameStatus>("status", &self.status)?;
        let winner = parse_column::<Outcome>("winner", &self.winner)?;
        let active_turn = self
            .active_turn
            .as_deref()
            .map(|turn| parse_column::<Player>("active_turn", turn))
            .transpose()?;
        let mode = parse_column::<GameMode>("mode", &self.mode)?;
        Ok(Game::restore(self.id, status, winner, active_turn, mode))
    }
}

/// Insertable game row. `version` and the timestamps take their defaults.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::games)]
pub struct NewGameRow {
    status: String,
    winner: String,
    active_turn: Option<String>,
    mode: String,
}

impl NewGameRow {
    /// Row for a fresh game in `mode`: created, undetermined, first mover to
    /// play.
    pub fn for_mode(mode: GameMode) -> Self {
        Self::new(
            GameStatus::Created.to_string(),
            Outcome::Undetermined.to_string(),
            Some(mode.first_mover().to_string()),
            mode.to_string(),
        )
    }
}

/// Stored move row.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::moves)]
#[diesel(belongs_to(GameRow, foreign_key = game_id))]
pub struct MoveRow {
    id: i32,
    game_id: i32,
    number: i32,
    x: i32,
    y: i32,
    played_by: String,
}

impl MoveRow {
    /// Parses the stored columns into a [`Move`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the coordinates, ordinal or player are invalid.
    #[instrument(skip(self), fields(move_id = self.id, game_id = self.game_id))]
    pub fn to_move(&self) -> Result<Move, DbError> {
        let cell = Cell::try_new(i64::from(self.x), i64::from(self.y))
            .map_err(|e| DbError::invalid_data(format!("Move {}: {}", self.id, e)))?;
        let number = u32::try_from(self.number).map_err(|_| {
            DbError::invalid_data(format!("Move {} has ordinal {}", self.id, self.number))
        })?;
        let player = parse_column::<Player>("played_by", &self.played_by)?;
        Ok(Move::new(self.game_id, number, cell, player))
    }
}

/// Insertable move row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::moves)]
pub struct NewMoveRow {
    game_id: i32,
    number: i32,
    x: i32,
    y: i32,
    played_by: String,
}

impl From<&Move> for NewMoveRow {
    fn from(mv: &Move) -> Self {
        Self::new(
            mv.game_id(),
            mv.number() as i32,
            i32::from(mv.cell().x()),
            i32::from(mv.cell().y()),
            mv.player().to_string(),
        )
    }
}

/// A game together with its concurrency version and full move history.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct GameSnapshot {
    game: Game,
    version: i32,
    moves: Vec<Move>,
}

impl GameSnapshot {
    /// Assembles a snapshot from a game row and its moves in ordinal order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any row fails to parse.
    pub fn from_rows(row: &GameRow, moves: &[MoveRow]) -> Result<Self, DbError> {
        let game = row.to_game()?;
        let moves = moves
            .iter()
            .map(MoveRow::to_move)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            game,
            version: row.version,
            moves,
        })
    }

    /// Identifier of the snapshotted game.
    pub fn id(&self) -> GameId {
        self.game.id()
    }
}

fn parse_column<T>(column: &str, value: &str) -> Result<T, DbError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| DbError::invalid_data(format!("Column {} holds '{}': {}", column, value, e)))
}
