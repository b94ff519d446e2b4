//! Per-game mutual exclusion.
//!
//! Requests touching different games never wait on each other. Requests for
//! the same game run their critical sections one at a time, in the order the
//! lock is granted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tictactoe_engine::GameId;
use tokio::task::JoinError;
use tracing::{Span, debug, instrument, trace};

type GameLock = Arc<tokio::sync::Mutex<()>>;
type Registry = Arc<Mutex<HashMap<GameId, GameLock>>>;

/// Registry of per-game locks.
///
/// An entry lives only while some request holds or waits for it.
#[derive(Debug, Clone, Default)]
pub struct GameLocks {
    locks: Registry,
}

/// A reference to one registry entry. Dropping the last one removes the
/// entry.
#[derive(Debug)]
struct GameEntry {
    registry: Registry,
    game_id: GameId,
    lock: GameLock,
}

impl Drop for GameEntry {
    fn drop(&mut self) {
        let mut locks = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        // The map and this entry are the only references left.
        if locks
            .get(&self.game_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 2)
        {
            locks.remove(&self.game_id);
            debug!(game_id = self.game_id, "Game lock entry dropped");
        }
    }
}

impl GameLocks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the blocking `work` on the blocking pool while holding the lock
    /// for `game_id`.
    ///
    /// The lock is owned by the worker, not by the returned future. If the
    /// caller is dropped after the lock was granted, `work` still runs to
    /// completion and the next holder starts only after it returns.
    ///
    /// # Errors
    ///
    /// Returns [`JoinError`] if `work` panicked. The lock is released either
    /// way.
    #[instrument(skip(self, work))]
    pub async fn with_game_lock<F, T>(&self, game_id: GameId, work: F) -> Result<T, JoinError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let entry = self.acquire_entry(game_id);
        let guard = Arc::clone(&entry.lock).lock_owned().await;
        trace!("Game lock held");

        let span = Span::current();
        tokio::task::spawn_blocking(move || {
            let _span = span.enter();
            // Drops run in reverse: the guard goes before the entry.
            let _entry = entry;
            let _guard = guard;
            work()
        })
        .await
    }

    /// Number of games with a live entry.
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn acquire_entry(&self, game_id: GameId) -> GameEntry {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = Arc::clone(locks.entry(game_id).or_default());
        GameEntry {
            registry: Arc::clone(&self.locks),
            game_id,
            lock,
        }
    }
}
