//! Move/turn state machine.
//!
//! A [`Game`] is the mutable record of one match. [`Game::apply_move`] is the
//! only place its status, winner and active turn change: it validates a
//! submitted cell against the stored history, appends the move, lets the
//! automated opponent answer when the mode calls for it and finally runs the
//! terminal detector over the full history.

use crate::{
    Board, Cell, GameId, GameMode, GameStatus, Move, MoveError, Outcome, Player, search,
};
use derive_getters::Getters;
use tracing::{debug, error, info, instrument, warn};

/// Per-game state owned by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Game {
    id: GameId,
    status: GameStatus,
    winner: Outcome,
    active_turn: Option<Player>,
    mode: GameMode,
}

impl Game {
    /// Creates a game that has not seen a move yet.
    #[instrument]
    pub fn new(id: GameId, mode: GameMode) -> Self {
        Self {
            id,
            status: GameStatus::Created,
            winner: Outcome::Undetermined,
            active_turn: Some(mode.first_mover()),
            mode,
        }
    }

    /// Rebuilds a game from its stored fields.
    pub fn restore(
        id: GameId,
        status: GameStatus,
        winner: Outcome,
        active_turn: Option<Player>,
        mode: GameMode,
    ) -> Self {
        Self {
            id,
            status,
            winner,
            active_turn,
            mode,
        }
    }

    /// Game identifier.
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Lifecycle status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Outcome recorded so far.
    pub fn winner(&self) -> Outcome {
        self.winner
    }

    /// Who moves next; `None` once finished.
    pub fn active_turn(&self) -> Option<Player> {
        self.active_turn
    }

    /// Opponent kind.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Applies a client move at `cell` on top of `history`.
    ///
    /// `history` must be the game's full move list in ordinal order.
    ///
    /// # Errors
    ///
    /// - [`MoveError::GameFinished`] if the game already ended.
    /// - [`MoveError::CellOccupied`] if the cell is used.
    /// - [`MoveError::CorruptHistory`] if the stored history breaks an invariant.
    #[instrument(skip(self, history), fields(game_id = self.id, mode = %self.mode, cell = %cell))]
    pub fn apply_move(&self, history: &[Move], cell: Cell) -> Result<Transition, MoveError> {
        if self.status == GameStatus::Finished {
            warn!(winner = %self.winner, "Move submitted to finished game");
            return Err(MoveError::GameFinished);
        }

        let roles = self.mode.roles();
        let mut board = self.replay(history)?;

        if board.get(cell).is_some() {
            warn!(used = board.used(), "Cell already used");
            return Err(MoveError::CellOccupied {
                x: cell.x(),
                y: cell.y(),
            });
        }

        let player = self.mode.submitting_player(history.last().map(Move::player));
        if player != self.mode.player_at(history.len()) {
            error!(%player, moves = history.len(), "Stored history is out of turn");
            return Err(MoveError::CorruptHistory(format!(
                "game {} expects {} to move, history says {}",
                self.id,
                self.mode.player_at(history.len()),
                player
            )));
        }

        let mut game = *self;
        let mut moves = history.to_vec();
        let submitted = Move::new(self.id, next_number(&moves), cell, player);
        board.place(cell, player);
        moves.push(submitted);
        let mut appended = vec![submitted];
        debug!(%submitted, board = %board, "Move appended");

        match self.mode {
            GameMode::HumanVsAutomated => {
                game.active_turn = Some(Player::Automated);
                if !board.outcome(roles).is_determined() {
                    let search = search::best_move(self.id, &moves, Player::Automated, roles)?;
                    if let Some(reply) = search.chosen() {
                        debug!(%reply, score = search.score(), "Automated opponent answered");
                        board.place(reply.cell(), reply.player());
                        moves.push(reply);
                        appended.push(reply);
                    }
                }
                game.active_turn = Some(Player::Human);
            }
            GameMode::HumanVsHuman => {
                game.active_turn = roles.opponent(player);
            }
        }

        let outcome = board.outcome(roles);
        if outcome.is_determined() {
            game.status = GameStatus::Finished;
            game.winner = outcome;
            game.active_turn = None;
            info!(winner = %outcome, moves = moves.len(), "Game finished");
        } else {
            game.status = GameStatus::InProgress;
            game.winner = Outcome::Undetermined;
            info!(active_turn = ?game.active_turn, moves = moves.len(), "Move accepted");
        }

        Ok(Transition {
            game,
            appended,
            moves,
        })
    }

    /// Rebuilds the board and checks the stored history against the game.
    fn replay(&self, history: &[Move]) -> Result<Board, MoveError> {
        let board = Board::try_from_moves(history).map_err(|e| {
            error!(error = %e, "Stored history reuses a cell");
            MoveError::from(e)
        })?;

        for (index, mv) in history.iter().enumerate() {
            let expected = self.mode.player_at(index);
            if mv.number() as usize != index + 1 || mv.player() != expected {
                error!(%mv, index, %expected, "Stored move out of sequence");
                return Err(MoveError::CorruptHistory(format!(
                    "move {} of game {} is out of sequence",
                    mv, self.id
                )));
            }
        }

        let outcome = board.outcome(self.mode.roles());
        if outcome.is_determined() {
            error!(%outcome, status = %self.status, "Terminal history on an open game");
            return Err(MoveError::CorruptHistory(format!(
                "game {} is {} but its history is terminal ({})",
                self.id, self.status, outcome
            )));
        }

        Ok(board)
    }
}

fn next_number(moves: &[Move]) -> u32 {
    moves.len() as u32 + 1
}

/// Result of a successful [`Game::apply_move`].
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Transition {
    /// Game with its updated status, winner and turn.
    game: Game,
    /// Moves created by this step: the submission and, against the automated
    /// opponent, its countermove.
    appended: Vec<Move>,
    /// Full history after the step, in ordinal order.
    moves: Vec<Move>,
}

impl Transition {
    /// Splits the transition into its parts.
    pub fn into_parts(self) -> (Game, Vec<Move>, Vec<Move>) {
        (self.game, self.appended, self.moves)
    }
}
