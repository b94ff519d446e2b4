//! Board reconstruction and terminal detection.

use crate::{Cell, EngineError, Move, Outcome, Player, RoleMapping};
use std::fmt;

/// Winning lines as row-major cell indices.
const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// 3x3 occupancy grid derived from a move history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Option<Player>; 9],
    used: u8,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays `moves` onto an empty board.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Corrupt`] if two moves target the same cell.
    pub fn try_from_moves(moves: &[Move]) -> Result<Self, EngineError> {
        let mut board = Self::new();
        for mv in moves {
            if let Some(owner) = board.get(mv.cell()) {
                return Err(EngineError::Corrupt(format!(
                    "move {} targets cell {} already owned by {}",
                    mv.number(),
                    mv.cell(),
                    owner
                )));
            }
            board.place(mv.cell(), mv.player());
        }
        Ok(board)
    }

    /// Owner of a cell.
    pub fn get(&self, cell: Cell) -> Option<Player> {
        self.cells[cell.index()]
    }

    /// Whether the cell holds no mark.
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.get(cell).is_none()
    }

    /// Number of used cells.
    pub fn used(&self) -> usize {
        usize::from(self.used)
    }

    /// Whether all nine cells are used.
    pub fn is_full(&self) -> bool {
        self.used() == Cell::ALL.len()
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        Cell::ALL.into_iter().filter(|cell| self.is_empty(*cell))
    }

    /// Marks an empty cell.
    pub(crate) fn place(&mut self, cell: Cell, player: Player) {
        debug_assert!(self.is_empty(cell), "cell {} is already used", cell);
        self.cells[cell.index()] = Some(player);
        self.used += 1;
    }

    /// Clears a cell marked by [`Board::place`].
    pub(crate) fn clear(&mut self, cell: Cell) {
        debug_assert!(!self.is_empty(cell), "cell {} is already empty", cell);
        self.cells[cell.index()] = None;
        self.used -= 1;
    }

    /// Whether `player` owns a complete row, column or diagonal.
    pub fn owns_line(&self, player: Player) -> bool {
        LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.cells[i] == Some(player)))
    }

    /// Evaluates the board. The maximizing player's lines are checked first,
    /// then the minimizing player's, then a full board is a draw.
    pub fn outcome(&self, roles: RoleMapping) -> Outcome {
        if self.owns_line(roles.maximizing()) {
            Outcome::Won(roles.maximizing())
        } else if self.owns_line(roles.minimizing()) {
            Outcome::Won(roles.minimizing())
        } else if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::Undetermined
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in 0..3 {
            for y in 0..3 {
                let symbol = match self.cells[x * 3 + y] {
                    None => '.',
                    Some(Player::Human) | Some(Player::PlayerA) => 'X',
                    Some(Player::Automated) | Some(Player::PlayerB) => 'O',
                };
                write!(f, "{}", symbol)?;
            }
            if x < 2 {
                f.write_str("/")?;
            }
        }
        Ok(())
    }
}

/// Terminal outcome of a move history.
///
/// # Panics
///
/// Panics if two moves target the same cell. Histories reaching this
/// function are produced by the engine or validated on load, so a duplicate
/// is a programming error.
pub fn winner(moves: &[Move], roles: RoleMapping) -> Outcome {
    match Board::try_from_moves(moves) {
        Ok(board) => board.outcome(roles),
        Err(err) => panic!("terminal detection over an invalid history: {}", err),
    }
}
