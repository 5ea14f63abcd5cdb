//! Metasync: replay route metadata against a document head.
//!
//! # Usage
//!
//! ```text
//! metasync init --origin <url> [--asset-prefix <prefix>]
//! metasync apply --head <head.json> --routes <routes.yaml> [--origin <url>] [--json]
//! metasync diff --head <head.json> --routes <routes.yaml> [--origin <url>]
//! metasync defaults --head <head.json>
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{apply::ApplyArgs, defaults::DefaultsArgs, diff::DiffArgs, init::InitArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "metasync",
    version,
    about = "Keep document-head metadata in step with the active route",
    long_about = None,
)]
struct Cli {
    /// Log every write and restore (same as RUST_LOG=debug).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Save the application origin used to resolve asset references.
    Init(InitArgs),

    /// Apply each route's metadata in order and print the resulting head.
    Apply(ApplyArgs),

    /// Show a unified diff of what replaying the routes does to the head.
    Diff(DiffArgs),

    /// Print the head's own title and description.
    Defaults(DefaultsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Apply(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Defaults(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("logging initialised");
}
