use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

/// Identity service: registration, login and bearer tokens
#[derive(Parser, Debug)]
#[command(name = "identity-service", version)]
#[command(about = "Identity service: registration, login and bearer tokens", long_about = None)]
pub struct Cli {
    /// Configuration file path. Without it, config/default.toml is layered
    /// with config/{RUN_MODE}.toml
    #[arg(short, long, global = true, env = "IDENTITY_SERVICE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP server
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Print the service version
    Version,
}

impl Cli {
    /// Subcommand to run; `serve` when none is given.
    pub fn resolved_command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

/// Line printed by the `version` subcommand.
pub fn version_line() -> String {
    format!("identity-service version: {}", env!("CARGO_PKG_VERSION"))
}
