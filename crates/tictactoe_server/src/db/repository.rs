//! Database repository for games and move histories.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tictactoe_engine::{GameId, GameMode, Transition};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, GameRow, GameSnapshot, MoveRow, NewGameRow, NewMoveRow, schema};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const CONNECTION_PRAGMAS: &str = "PRAGMA busy_timeout = 5000; PRAGMA foreign_keys = ON;";

/// Database repository for game operations.
///
/// Every method opens its own connection, so the repository is cheap to
/// clone and safe to use from blocking worker threads concurrently.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a repository for the database file at the given path.
    ///
    /// The schema is not touched; see [`GameRepository::open`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Creates a repository, applies pending migrations and switches the
    /// database to WAL journaling.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, DbError> {
        let repo = Self::new(db_path)?;
        let mut conn = repo.connection()?;
        conn.batch_execute("PRAGMA journal_mode = WAL;")?;
        let applied = repo.migrate()?;
        info!(applied, "Database ready");
        Ok(repo)
    }

    /// Applies pending migrations and returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn migrate(&self) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migrations failed: {}", e)))?;
        for version in &applied {
            info!(%version, "Migration applied");
        }
        Ok(applied.len())
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        conn.batch_execute(CONNECTION_PRAGMAS)?;
        Ok(conn)
    }

    /// Creates a new game in the `CREATED` state with an empty history.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self), fields(mode = %mode))]
    pub fn create_game(&self, mode: GameMode) -> Result<GameSnapshot, DbError> {
        debug!("Creating game");
        let mut conn = self.connection()?;

        let new_game = NewGameRow::for_mode(mode);

        let row = diesel::insert_into(schema::games::table)
            .values(&new_game)
            .returning(GameRow::as_returning())
            .get_result(&mut conn)?;

        let snapshot = GameSnapshot::from_rows(&row, &[])?;
        info!(game_id = snapshot.id(), "Game created");
        Ok(snapshot)
    }

    /// Loads a game with its moves in ordinal order. Returns `None` if the
    /// game does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs or a row is invalid.
    #[instrument(skip(self))]
    pub fn load(&self, game_id: GameId) -> Result<Option<GameSnapshot>, DbError> {
        debug!("Loading game");
        let mut conn = self.connection()?;

        let rows = conn.transaction::<_, DbError, _>(|conn| {
            let Some(game) = schema::games::table
                .find(game_id)
                .select(GameRow::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(None);
            };

            let moves = MoveRow::belonging_to(&game)
                .select(MoveRow::as_select())
                .order(schema::moves::number.asc())
                .load(conn)?;

            Ok(Some((game, moves)))
        })?;

        match rows {
            Some((game, moves)) => {
                let snapshot = GameSnapshot::from_rows(&game, &moves)?;
                debug!(
                    status = %snapshot.game().status(),
                    moves = snapshot.moves().len(),
                    version = snapshot.version(),
                    "Game loaded"
                );
                Ok(Some(snapshot))
            }
            None => {
                debug!("Game not found");
                Ok(None)
            }
        }
    }

    /// Persists a state-machine transition computed against the snapshot
    /// at `expected_version`.
    ///
    /// The game update and the appended moves are written in one immediate
    /// transaction. The update only matches while the stored version still
    /// equals `expected_version`, and bumps it.
    ///
    /// # Errors
    ///
    /// Returns a [`DbErrorKind::Conflict`](crate::db::DbErrorKind::Conflict)
    /// error if the version moved on or a move collides with a stored one.
    /// Nothing is written in that case.
    #[instrument(
        skip(self, transition),
        fields(game_id = transition.game().id(), appended = transition.appended().len())
    )]
    pub fn commit(
        &self,
        expected_version: i32,
        transition: &Transition,
    ) -> Result<GameSnapshot, DbError> {
        use schema::games::dsl as g;

        let game = transition.game();
        let game_id = game.id();
        let new_moves: Vec<NewMoveRow> =
            transition.appended().iter().map(NewMoveRow::from).collect();
        let mut conn = self.connection()?;

        conn.immediate_transaction::<_, DbError, _>(|conn| {
            let updated = diesel::update(
                g::games
                    .filter(g::id.eq(game_id))
                    .filter(g::version.eq(expected_version)),
            )
            .set((
                g::status.eq(game.status().to_string()),
                g::winner.eq(game.winner().to_string()),
                g::active_turn.eq(game.active_turn().map(|p| p.to_string())),
                g::version.eq(g::version + 1),
                g::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)?;

            if updated == 0 {
                warn!(expected_version, "Game version moved on");
                return Err(DbError::conflict(format!(
                    "Game {} is no longer at version {}",
                    game_id, expected_version
                )));
            }

            diesel::insert_into(schema::moves::table)
                .values(&new_moves)
                .execute(conn)?;
            Ok(())
        })?;

        let snapshot = GameSnapshot::new(*game, expected_version + 1, transition.moves().clone());
        info!(
            status = %game.status(),
            winner = %game.winner(),
            version = snapshot.version(),
            "Transition committed"
        );
        Ok(snapshot)
    }

    /// Deletes a game and its moves. Returns whether the game existed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs; nothing is deleted then.
    #[instrument(skip(self))]
    pub fn delete_game(&self, game_id: GameId) -> Result<bool, DbError> {
        debug!("Deleting game");
        let mut conn = self.connection()?;

        let (moves, games) = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let moves = diesel::delete(
                schema::moves::table.filter(schema::moves::game_id.eq(game_id)),
            )
            .execute(conn)?;
            let games = diesel::delete(schema::games::table.find(game_id)).execute(conn)?;
            Ok((moves, games))
        })?;

        info!(moves, existed = games > 0, "Game deleted");
        Ok(games > 0)
    }
}
