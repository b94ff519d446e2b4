//! Request and response bodies.

use serde::{Deserialize, Serialize};
use tictactoe_engine::{GameId, GameMode, GameStatus, Move, Outcome, Player};

use crate::db::GameSnapshot;

/// Body of `POST /api/v1/tictactoe/new`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NewGameRequest {
    /// Requested opponent kind.
    pub mode: ModeChoice,
}

/// Client-facing names for the two game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeChoice {
    /// Play against the minimax opponent.
    Automated,
    /// Play against another human.
    Human,
}

impl From<ModeChoice> for GameMode {
    fn from(choice: ModeChoice) -> Self {
        match choice {
            ModeChoice::Automated => GameMode::HumanVsAutomated,
            ModeChoice::Human => GameMode::HumanVsHuman,
        }
    }
}

/// Body of a move submission. Range is checked by the engine, not serde.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MoveRequest {
    /// Row, expected in `0..=2`.
    pub x: i64,
    /// Column, expected in `0..=2`.
    pub y: i64,
}

/// `?gameId=` query parameter, kept as text so that malformed ids surface as
/// a missing game.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameQuery {
    /// Raw id as sent by the client.
    pub game_id: String,
}

impl GameQuery {
    /// The id as an integer, if it is one.
    pub fn parsed(&self) -> Option<GameId> {
        self.game_id.trim().parse().ok()
    }
}

/// One move in a [`GameResponse`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveResponse {
    /// Row.
    pub x: u8,
    /// Column.
    pub y: u8,
    /// 1-based ordinal.
    pub number: u32,
    /// Who played it.
    pub played_by: Player,
}

impl From<&Move> for MoveResponse {
    fn from(mv: &Move) -> Self {
        Self {
            x: mv.cell().x(),
            y: mv.cell().y(),
            number: mv.number(),
            played_by: mv.player(),
        }
    }
}

/// Game state returned by every game endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    /// Game identifier.
    pub id: GameId,
    /// History sorted by ordinal.
    pub moves: Vec<MoveResponse>,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Outcome so far.
    pub winner: Outcome,
    /// Who moves next. Absent once the game is finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_turn: Option<Player>,
    /// Opponent kind.
    pub game_type: GameMode,
}

impl From<&GameSnapshot> for GameResponse {
    fn from(snapshot: &GameSnapshot) -> Self {
        let game = snapshot.game();
        let mut moves: Vec<MoveResponse> =
            snapshot.moves().iter().map(MoveResponse::from).collect();
        moves.sort_by_key(|m| m.number);
        Self {
            id: game.id(),
            moves,
            status: game.status(),
            winner: game.winner(),
            active_turn: game.active_turn(),
            game_type: game.mode(),
        }
    }
}

/// Health check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub error: String,
    /// Human-readable explanation.
    pub message: String,
}
