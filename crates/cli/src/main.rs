//! Orchael CLI — the main entry point.
//!
//! Commands:
//! - `chat`   — Process one input through the configured processor, or show history
//! - `server` — Run the long-lived HTTP server
//! - `build`  — Package an agent for uploading to the backend

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "orchael",
    about = "Orchael SDK — pluggable chat processors",
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
    /// Process chat input or show history
    Chat {
        /// Path to the YAML configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Input text to process (required unless --history is used)
        #[arg(short, long)]
        input: Option<String>,

        /// Show chat history
        #[arg(long)]
        history: bool,
    },

    /// Run the Orchael HTTP server
    Server {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value_t = 8000)]
        port: u16,

        /// Path to the YAML configuration file
        /// (default: $ORCHAEL_CONFIG_FILE, then config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Build an agent package for uploading to the backend
    Build {
        /// Path to the YAML configuration file
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Output ZIP file name
        #[arg(short, long, default_value = "agent.zip")]
        output: PathBuf,

        /// Exclude dependency files (requirements.txt, pyproject.toml, package.json)
        #[arg(long)]
        no_deps: bool,
    },
}

#[tokio::main]
async fn main() {
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

    let result = match cli.command {
        Commands::Chat {
            config,
            input,
            history,
        } => commands::chat::run(config, input, history).await,
        Commands::Server { host, port, config } => commands::server::run(host, port, config).await,
        Commands::Build {
            config,
            output,
            no_deps,
        } => commands::build::run(config, output, !no_deps),
    };

    // Libraries return typed errors; presentation happens here and nowhere else.
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
