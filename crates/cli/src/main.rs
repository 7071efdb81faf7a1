//! Gaian Archive CLI — the main entry point.
//!
//! Commands:
//! - `serve`     — Start the HTTP server (API + embedded frontend)
//! - `doctor`    — Diagnose configuration health
//! - `knowledge` — Inspect or edit the knowledge base from the terminal

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "gaian-archive",
    about = "Gaian Archive — knowledge-base chat service",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Diagnose configuration health
    Doctor,

    /// Inspect or edit the knowledge base
    Knowledge {
        #[command(subcommand)]
        action: commands::knowledge::KnowledgeAction,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Knowledge { action } => commands::knowledge::run(action).await?,
    }

    Ok(())
}
