//! Tic-tac-toe server binary.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tictactoe_server::{GameRepository, GameService, ServerConfig, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?.apply_env();

    match cli.command {
        Command::Serve {
            port,
            host,
            database,
        } => {
            let config = config.with_overrides(host, port, database.database_url);
            init_tracing(&config);
            run_http_server(config).await
        }
        Command::Migrate { database } => {
            let config = config.with_overrides(None, None, database.database_url);
            init_tracing(&config);
            run_migrations(&config)
        }
    }
}

fn init_tracing(config: &ServerConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();
}

/// Run the HTTP game server
#[instrument(skip_all, fields(addr = %config.bind_address(), db = %config.database_url()))]
async fn run_http_server(config: ServerConfig) -> Result<()> {
    info!("Starting tic-tac-toe server");

    let repo = GameRepository::open(config.database_url().clone())?;
    let app = router(GameService::new(repo));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!("Server ready at http://{}/", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Apply migrations and exit
#[instrument(skip_all, fields(db = %config.database_url()))]
fn run_migrations(config: &ServerConfig) -> Result<()> {
    let repo = GameRepository::new(config.database_url().clone())?;
    let applied = repo.migrate()?;
    info!(applied, "Migrations complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
