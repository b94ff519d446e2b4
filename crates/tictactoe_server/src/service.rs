//! Game service: the per-game critical section around the rules engine.
//!
//! Every mutating operation runs "load, validate, search, append, commit"
//! while holding the game's lock. Storage calls are blocking diesel calls and
//! run on the blocking pool.

use derive_more::{Display, Error, From};
use tictactoe_engine::{Cell, GameId, GameMode, MoveError};
use tokio::task::JoinError;
use tracing::{debug, error, info, instrument, warn};

use crate::arbiter::GameLocks;
use crate::db::{DbError, GameRepository, GameSnapshot};

/// Error returned by [`GameService`] operations.
#[derive(Debug, Display, Error, From)]
pub enum ServiceError {
    /// The move was rejected by the rules engine.
    #[from]
    #[display("{}", _0)]
    Move(MoveError),

    /// No game with this id exists.
    #[display("Game {} was not found", game_id)]
    GameNotFound {
        /// Requested id.
        game_id: GameId,
    },

    /// Another writer changed the game between load and commit.
    #[display(
        "Game {} was changed by a concurrent move. Reload the game and try again",
        game_id
    )]
    ConcurrentConflict {
        /// Contested game.
        game_id: GameId,
    },

    /// The database failed.
    #[from]
    #[display("{}", _0)]
    Storage(DbError),

    /// A blocking worker panicked or was cancelled.
    #[display("Worker failed: {}", message)]
    Worker {
        /// Join failure description.
        message: String,
    },
}

impl From<JoinError> for ServiceError {
    fn from(err: JoinError) -> Self {
        ServiceError::Worker {
            message: err.to_string(),
        }
    }
}

impl ServiceError {
    /// Whether the error is the caller's fault rather than the server's.
    pub fn is_client_error(&self) -> bool {
        match self {
            ServiceError::Move(MoveError::CorruptHistory(_)) => false,
            ServiceError::Move(_) => true,
            ServiceError::GameNotFound { .. } | ServiceError::ConcurrentConflict { .. } => true,
            ServiceError::Storage(_) | ServiceError::Worker { .. } => false,
        }
    }
}

/// Game operations shared by all request handlers.
#[derive(Debug, Clone)]
pub struct GameService {
    repo: GameRepository,
    locks: GameLocks,
}

impl GameService {
    /// Creates a service over `repo` with an empty lock registry.
    #[instrument(skip(repo))]
    pub fn new(repo: GameRepository) -> Self {
        Self {
            repo,
            locks: GameLocks::new(),
        }
    }

    /// The lock registry guarding game mutations.
    pub fn locks(&self) -> &GameLocks {
        &self.locks
    }

    /// Creates a game in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Storage`] if the insert fails.
    #[instrument(skip(self), fields(mode = %mode))]
    pub async fn create_game(&self, mode: GameMode) -> Result<GameSnapshot, ServiceError> {
        let repo = self.repo.clone();
        let snapshot = tokio::task::spawn_blocking(move || repo.create_game(mode)).await??;
        info!(game_id = snapshot.id(), "Game created");
        Ok(snapshot)
    }

    /// Loads a game with its moves.
    ///
    /// Reads take no lock; the load is a single read transaction and always
    /// sees a committed state.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::GameNotFound`] if the id is unknown.
    #[instrument(skip(self))]
    pub async fn get_game(&self, game_id: GameId) -> Result<GameSnapshot, ServiceError> {
        let repo = self.repo.clone();
        tokio::task::spawn_blocking(move || repo.load(game_id))
            .await??
            .ok_or(ServiceError::GameNotFound { game_id })
    }

    /// Submits a move at `(x, y)` and, against the automated opponent,
    /// its countermove.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Move`] with [`MoveError::OutOfRange`] before any
    ///   state is read, or with the engine's rejection otherwise.
    /// - [`ServiceError::GameNotFound`] if the id is unknown.
    /// - [`ServiceError::ConcurrentConflict`] if another writer won.
    #[instrument(skip(self))]
    pub async fn play(
        &self,
        game_id: GameId,
        x: i64,
        y: i64,
    ) -> Result<GameSnapshot, ServiceError> {
        let cell =
            Cell::try_new(x, y).inspect_err(|e| warn!(error = %e, "Rejected coordinates"))?;

        let repo = self.repo.clone();
        self.locks
            .with_game_lock(game_id, move || apply_and_commit(&repo, game_id, cell))
            .await?
    }

    /// Deletes a game and its moves. Unknown ids are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Storage`] if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_game(&self, game_id: GameId) -> Result<(), ServiceError> {
        let repo = self.repo.clone();
        let existed = self
            .locks
            .with_game_lock(game_id, move || repo.delete_game(game_id))
            .await??;
        debug!(existed, "Delete handled");
        Ok(())
    }
}

/// The blocking half of [`GameService::play`]; runs under the game lock.
fn apply_and_commit(
    repo: &GameRepository,
    game_id: GameId,
    cell: Cell,
) -> Result<GameSnapshot, ServiceError> {
    let snapshot = repo
        .load(game_id)?
        .ok_or(ServiceError::GameNotFound { game_id })?;
    commit_move(repo, &snapshot, cell)
}

/// Applies `cell` to `snapshot` and commits the transition against the
/// snapshot's version.
fn commit_move(
    repo: &GameRepository,
    snapshot: &GameSnapshot,
    cell: Cell,
) -> Result<GameSnapshot, ServiceError> {
    let game_id = snapshot.id();
    let transition = snapshot
        .game()
        .apply_move(snapshot.moves(), cell)
        .inspect_err(|e| match e {
            MoveError::CorruptHistory(_) => error!(error = %e, "Stored history is corrupt"),
            _ => debug!(error = %e, "Move rejected"),
        })?;

    repo.commit(*snapshot.version(), &transition).map_err(|e| {
        if e.is_conflict() {
            warn!(error = %e, "Commit lost to a concurrent writer");
            ServiceError::ConcurrentConflict { game_id }
        } else {
            ServiceError::Storage(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_client_error_classification() {
        assert!(ServiceError::from(MoveError::GameFinished).is_client_error());
        assert!(ServiceError::GameNotFound { game_id: 4 }.is_client_error());
        assert!(!ServiceError::from(MoveError::CorruptHistory("dup".into())).is_client_error());
        assert!(!ServiceError::from(DbError::new("disk")).is_client_error());
    }

    #[test]
    fn test_messages_match_wire_text() {
        assert_eq!(
            ServiceError::GameNotFound { game_id: 12 }.to_string(),
            "Game 12 was not found"
        );
        assert_eq!(
            ServiceError::ConcurrentConflict { game_id: 3 }.to_string(),
            "Game 3 was changed by a concurrent move. Reload the game and try again"
        );
        assert_eq!(
            ServiceError::from(MoveError::CellOccupied { x: 0, y: 2 }).to_string(),
            "Cell x:0, y: 2 was used."
        );
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_concurrent_conflict() {
        let db = NamedTempFile::new().expect("Failed to create temp file");
        let path = db.path().to_str().expect("Invalid path").to_string();
        let repo = GameRepository::open(path.clone()).expect("Failed to open repository");
        let service = GameService::new(repo.clone());
        let other = GameService::new(GameRepository::new(path).expect("Invalid path"));

        let game = service
            .create_game(GameMode::HumanVsHuman)
            .await
            .expect("Create failed");
        let stale = repo
            .load(game.id())
            .expect("Load failed")
            .expect("Game exists");

        // A second service on the same file commits first.
        other.play(game.id(), 0, 0).await.expect("Move failed");

        let cell = Cell::try_new(1, 1).expect("Valid cell");
        let err = commit_move(&repo, &stale, cell).unwrap_err();
        assert!(
            matches!(err, ServiceError::ConcurrentConflict { game_id } if game_id == game.id()),
            "{err}"
        );

        let stored = service.get_game(game.id()).await.expect("Game exists");
        assert_eq!(stored.moves().len(), 1);
        assert_eq!((stored.moves()[0].cell().x(), stored.moves()[0].cell().y()), (0, 0));
        assert_eq!(*stored.version(), *stale.version() + 1);
    }
}
