//! Core domain types for tic-tac-toe.

use crate::MoveError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a persisted game.
pub type GameId = i32;

/// A participant that can own a mark on the board.
///
/// The string forms are the identifiers stored in the database and sent
/// over the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Player {
    /// The human in a game against the automated opponent.
    #[serde(rename = "PLAYER")]
    #[strum(serialize = "PLAYER")]
    Human,
    /// The automated opponent.
    #[serde(rename = "AI")]
    #[strum(serialize = "AI")]
    Automated,
    /// First player of a human-vs-human game.
    #[serde(rename = "PLAYER_1")]
    #[strum(serialize = "PLAYER_1")]
    PlayerA,
    /// Second player of a human-vs-human game.
    #[serde(rename = "PLAYER_2")]
    #[strum(serialize = "PLAYER_2")]
    PlayerB,
}

/// Which kind of opponent the human faces.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum GameMode {
    /// Human against the minimax opponent.
    #[serde(rename = "AGAINST_AI")]
    #[strum(serialize = "AGAINST_AI")]
    HumanVsAutomated,
    /// Two humans sharing one game.
    #[serde(rename = "AGAINST_HUMAN")]
    #[strum(serialize = "AGAINST_HUMAN")]
    HumanVsHuman,
}

impl GameMode {
    /// Role mapping used for terminal detection and search in this mode.
    pub const fn roles(self) -> RoleMapping {
        match self {
            GameMode::HumanVsAutomated => RoleMapping::HUMAN_VS_AUTOMATED,
            GameMode::HumanVsHuman => RoleMapping::HUMAN_VS_HUMAN,
        }
    }

    /// The player who makes the first move of a game in this mode.
    pub const fn first_mover(self) -> Player {
        match self {
            GameMode::HumanVsAutomated => Player::Human,
            GameMode::HumanVsHuman => Player::PlayerA,
        }
    }

    /// The player expected to make the move at 0-based `index` of the
    /// history: moves alternate starting with [`GameMode::first_mover`].
    pub fn player_at(self, index: usize) -> Player {
        let roles = self.roles();
        let first = self.first_mover();
        if index % 2 == 0 {
            first
        } else {
            roles.opponent(first).unwrap_or(first)
        }
    }

    /// The player whose move a client submission represents, given the
    /// author of the previous move.
    ///
    /// Against the automated opponent every submission belongs to the human,
    /// because the countermove is generated in the same step.
    pub fn submitting_player(self, previous: Option<Player>) -> Player {
        match (self, previous) {
            (GameMode::HumanVsAutomated, _) => Player::Human,
            (GameMode::HumanVsHuman, Some(Player::PlayerA)) => Player::PlayerB,
            (GameMode::HumanVsHuman, _) => Player::PlayerA,
        }
    }
}

/// Lifecycle of a game. Transitions only move forward.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Allocated, no move accepted yet.
    Created,
    /// At least one move accepted and no terminal outcome.
    InProgress,
    /// Won or drawn. Immutable from here on.
    Finished,
}

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Outcome {
    /// The game is still open.
    Undetermined,
    /// The player owns a complete line.
    Won(Player),
    /// All nine cells are used and nobody owns a line.
    Draw,
}

impl Outcome {
    /// Whether this is a win or a draw.
    pub fn is_determined(self) -> bool {
        !matches!(self, Outcome::Undetermined)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Undetermined => f.write_str("NOT_DEFINED_YET"),
            Outcome::Won(player) => write!(f, "{}", player),
            Outcome::Draw => f.write_str("DRAW"),
        }
    }
}

impl FromStr for Outcome {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_DEFINED_YET" => Ok(Outcome::Undetermined),
            "DRAW" => Ok(Outcome::Draw),
            other => other.parse::<Player>().map(Outcome::Won),
        }
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.to_string()
    }
}

impl TryFrom<String> for Outcome {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Side of the adversarial search a player is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Positive scores favour this side.
    Maximizing,
    /// Negative scores favour this side.
    Minimizing,
}

/// Binds two players to the maximizing and minimizing sides of the search.
///
/// The maximizing player is also the one whose lines are checked first by
/// the terminal detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleMapping {
    maximizing: Player,
    minimizing: Player,
}

impl RoleMapping {
    /// Human (minimizing) against the automated opponent (maximizing).
    pub const HUMAN_VS_AUTOMATED: RoleMapping = RoleMapping::new(Player::Automated, Player::Human);

    /// PlayerA (minimizing) against PlayerB (maximizing).
    pub const HUMAN_VS_HUMAN: RoleMapping = RoleMapping::new(Player::PlayerB, Player::PlayerA);

    /// Creates a mapping from the maximizing and minimizing players.
    pub const fn new(maximizing: Player, minimizing: Player) -> Self {
        Self {
            maximizing,
            minimizing,
        }
    }

    /// The maximizing player.
    pub const fn maximizing(&self) -> Player {
        self.maximizing
    }

    /// The minimizing player.
    pub const fn minimizing(&self) -> Player {
        self.minimizing
    }

    /// Role of `player`, or `None` if the player takes no part.
    pub fn role_of(&self, player: Player) -> Option<Role> {
        if player == self.maximizing {
            Some(Role::Maximizing)
        } else if player == self.minimizing {
            Some(Role::Minimizing)
        } else {
            None
        }
    }

    /// The other participant, or `None` if `player` takes no part.
    pub fn opponent(&self, player: Player) -> Option<Player> {
        match self.role_of(player)? {
            Role::Maximizing => Some(self.minimizing),
            Role::Minimizing => Some(self.maximizing),
        }
    }
}

/// A validated board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    x: u8,
    y: u8,
}

impl Cell {
    /// Side length of the board.
    pub const SIZE: u8 = 3;

    /// All cells in row-major order: `x` outer, `y` inner.
    pub const ALL: [Cell; 9] = [
        Cell::at(0, 0),
        Cell::at(0, 1),
        Cell::at(0, 2),
        Cell::at(1, 0),
        Cell::at(1, 1),
        Cell::at(1, 2),
        Cell::at(2, 0),
        Cell::at(2, 1),
        Cell::at(2, 2),
    ];

    const fn at(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Validates raw coordinates coming from a client or storage.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfRange`] if either coordinate is outside `0..=2`.
    pub fn try_new(x: i64, y: i64) -> Result<Self, MoveError> {
        let range = 0..i64::from(Self::SIZE);
        if range.contains(&x) && range.contains(&y) {
            Ok(Self::at(x as u8, y as u8))
        } else {
            Err(MoveError::OutOfRange { x, y })
        }
    }

    /// Row coordinate.
    pub const fn x(&self) -> u8 {
        self.x
    }

    /// Column coordinate.
    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Row-major index (0-8).
    pub const fn index(&self) -> usize {
        (self.x * Self::SIZE + self.y) as usize
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An accepted move. Never mutated once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    game_id: GameId,
    number: u32,
    cell: Cell,
    player: Player,
}

impl Move {
    /// Creates a move record.
    pub const fn new(game_id: GameId, number: u32, cell: Cell, player: Player) -> Self {
        Self {
            game_id,
            number,
            cell,
            player,
        }
    }

    /// Game the move belongs to.
    pub const fn game_id(&self) -> GameId {
        self.game_id
    }

    /// 1-based position in the game's history.
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Target cell.
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Who played it.
    pub const fn player(&self) -> Player {
        self.player
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} -> {}", self.number, self.player, self.cell)
    }
}
