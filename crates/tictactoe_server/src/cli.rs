//! Command-line interface for tictactoe_server.

use clap::{Args, Parser, Subcommand};

/// Tic-tac-toe game service with a minimax opponent
#[derive(Parser, Debug)]
#[command(name = "tictactoe_server")]
#[command(about = "Tic-tac-toe REST service backed by SQLite", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./tictactoe.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        #[command(flatten)]
        database: DatabaseArgs,
    },

    /// Apply pending database migrations and exit
    Migrate {
        #[command(flatten)]
        database: DatabaseArgs,
    },
}

/// Database location flags shared by all commands.
#[derive(Args, Debug)]
pub struct DatabaseArgs {
    /// Path to the SQLite database file (created if it doesn't exist)
    #[arg(long)]
    pub database_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_flags() {
        let cli = Cli::parse_from([
            "tictactoe_server",
            "serve",
            "--port",
            "9090",
            "--database-url",
            "x.db",
        ]);
        match cli.command {
            Command::Serve {
                port,
                host,
                database,
            } => {
                assert_eq!(port, Some(9090));
                assert_eq!(host, None);
                assert_eq!(database.database_url.as_deref(), Some("x.db"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::parse_from(["tictactoe_server", "migrate", "--config", "prod.toml"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("prod.toml")));
        assert!(matches!(cli.command, Command::Migrate { .. }));
    }
}
