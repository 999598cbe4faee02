//! Memoria CLI - memorial comments.
//!
//! Provides commands for:
//! - `comments`: List, post, reply to and like comments on a memorial
//! - `admin`: Moderate comments and manage access codes

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AdminCommand, CommentsCommand, ConnectionArgs};
use output::Output;

/// Memoria - memorial comments.
#[derive(Parser)]
#[command(name = "memoria", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    connection: ConnectionArgs,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Public comment commands.
    #[command(subcommand)]
    Comments(CommentsCommand),
    /// Moderation commands.
    #[command(subcommand)]
    Admin(AdminCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Comments(cmd) => cmd.execute(&cli.connection),
        Commands::Admin(cmd) => cmd.execute(&cli.connection),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
