//! Quill CLI - Micropub-style post storage.
//!
//! Provides commands for:
//! - `create`: Store a new post from a JSON or form-style submission
//! - `source`: Show the stored properties of a post
//! - `update`: Apply a replace/add/delete update to a post
//! - `delete` / `undelete`: Toggle a post's soft-deleted state
//! - `destinations`: List configured destinations

mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CreateArgs, SourceArgs, UpdateArgs, UrlArgs};
use output::Output;

/// Quill - Micropub-style post storage.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover quill.toml).
    #[arg(short, long, global = true, env = "QUILL_CONFIG")]
    config: Option<PathBuf>,

    /// Destination to use when a submission names none (overrides config).
    #[arg(short, long, global = true)]
    destination: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a post.
    Create(CreateArgs),
    /// Show a post's source properties.
    Source(SourceArgs),
    /// Update a post.
    Update(UpdateArgs),
    /// Soft-delete a post.
    Delete(UrlArgs),
    /// Restore a soft-deleted post.
    Undelete(UrlArgs),
    /// List configured destinations.
    Destinations,
}

fn main() -> ExitCode {
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

    let session = commands::Session {
        config_path: cli.config,
        default_destination: cli.destination,
    };
    let result = match cli.command {
        Commands::Create(args) => args.execute(&session, &output),
        Commands::Source(args) => args.execute(&session, &output),
        Commands::Update(args) => args.execute(&session, &output),
        Commands::Delete(args) => args.delete(&session, &output),
        Commands::Undelete(args) => args.undelete(&session, &output),
        Commands::Destinations => commands::list_destinations(&session, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::from(err.exit_code())
        }
    }
}
