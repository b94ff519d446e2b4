//! Tic-tac-toe game service.
//!
//! # Architecture
//!
//! - **API**: axum router exposing the game endpoints as JSON
//! - **Service**: per-game critical section around the rules engine
//! - **Arbiter**: in-process per-game locks
//! - **Database**: diesel/SQLite persistence with optimistic versioning
//!
//! # Example
//!
//! ```no_run
//! use tictactoe_server::{GameRepository, GameService, router};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let repo = GameRepository::open("tictactoe.db".to_string())?;
//! let app = router(GameService::new(repo));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod arbiter;
mod config;
mod service;

pub mod api;
pub mod db;

// Crate-level exports - HTTP interface
pub use api::{API_PREFIX, ApiError, router};

// Crate-level exports - Concurrency control
pub use arbiter::GameLocks;

// Crate-level exports - Configuration
pub use config::{ConfigError, DEFAULT_CONFIG_FILE, ServerConfig};

// Crate-level exports - Database
pub use db::{DbError, DbErrorKind, GameRepository, GameSnapshot};

// Crate-level exports - Service
pub use service::{GameService, ServiceError};
