//! Exhaustive minimax search for the automated opponent.
//!
//! The search walks the full game tree below the given history. Candidates
//! are enumerated in row-major order and the first best score wins ties, so
//! the chosen cell is a pure function of the history, the player to move and
//! the role mapping.

use crate::{Board, Cell, EngineError, GameId, Move, Outcome, Player, Role, RoleMapping};
use tracing::{debug, instrument};

/// Upper bound on search depth. A 3x3 board never needs more.
pub const MAX_DEPTH: u8 = 9;

/// Base score of a win before the depth adjustment.
const WIN_SCORE: i32 = 10;

/// Result of a search invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Search {
    chosen: Option<Move>,
    score: i32,
}

impl Search {
    /// The selected move, or `None` if the history was already terminal.
    pub fn chosen(&self) -> Option<Move> {
        self.chosen
    }

    /// Minimax score of the selected move.
    pub fn score(&self) -> i32 {
        self.score
    }
}

/// Scores a terminal outcome reached `depth` plies below the search root.
///
/// Faster wins for the maximizing role score higher, faster wins for the
/// minimizing role score lower. Draws score zero.
pub fn score(outcome: Outcome, depth: u8, roles: RoleMapping) -> i32 {
    let depth = i32::from(depth);
    match outcome {
        Outcome::Won(player) if player == roles.maximizing() => WIN_SCORE - depth,
        Outcome::Won(player) if player == roles.minimizing() => depth - WIN_SCORE,
        _ => 0,
    }
}

/// Computes the best next move for `to_move`.
///
/// The returned move is numbered to follow `moves`; it is not appended.
/// A history that is already terminal yields no move and the score of its
/// outcome.
///
/// # Errors
///
/// Returns [`EngineError::UnknownRole`] if `to_move` is not part of `roles`,
/// and [`EngineError::Corrupt`] if the history reuses a cell.
#[instrument(skip(moves), fields(history = moves.len()))]
pub fn best_move(
    game_id: GameId,
    moves: &[Move],
    to_move: Player,
    roles: RoleMapping,
) -> Result<Search, EngineError> {
    if roles.role_of(to_move).is_none() {
        return Err(EngineError::UnknownRole(to_move));
    }
    let mut board = Board::try_from_moves(moves)?;
    let (cell, score) = minimax(&mut board, to_move, roles, 0);
    let number = moves.len() as u32 + 1;
    let chosen = cell.map(|cell| Move::new(game_id, number, cell, to_move));

    debug!(board = %board, chosen = ?chosen.map(|m| m.cell()), score, "search finished");
    Ok(Search { chosen, score })
}

fn minimax(
    board: &mut Board,
    to_move: Player,
    roles: RoleMapping,
    depth: u8,
) -> (Option<Cell>, i32) {
    let outcome = board.outcome(roles);
    if outcome.is_determined() {
        return (None, score(outcome, depth, roles));
    }
    if depth >= MAX_DEPTH {
        return (None, 0);
    }
    let (Some(role), Some(next)) = (roles.role_of(to_move), roles.opponent(to_move)) else {
        return (None, 0);
    };

    let mut best: Option<(Cell, i32)> = None;
    for cell in Cell::ALL {
        if !board.is_empty(cell) {
            continue;
        }
        board.place(cell, to_move);
        let (_, candidate) = minimax(board, next, roles, depth + 1);
        board.clear(cell);

        // Strict comparison keeps the earliest cell on ties.
        let improves = match (best, role) {
            (None, _) => true,
            (Some((_, current)), Role::Maximizing) => candidate > current,
            (Some((_, current)), Role::Minimizing) => candidate < current,
        };
        if improves {
            best = Some((cell, candidate));
        }
    }

    match best {
        Some((cell, score)) => (Some(cell), score),
        None => (None, 0),
    }
}
