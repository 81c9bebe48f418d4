//! ldpcsim CLI - Monte-Carlo error-rate sweeps for LDPC codes.
//!
//! Commands:
//! - `ldpcsim run` - Sweep a channel parameter and log FER/BER per point
//! - `ldpcsim check` - Load a code (and optionally a config) and print a summary

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "ldpcsim")]
#[command(about = "Parallel Monte-Carlo error-rate simulator for LDPC codes")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a parameter sweep
    Run(commands::run::RunArgs),

    /// Validate a code file and configuration without simulating
    Check {
        /// Path to the parity-check matrix (alist)
        code: String,

        /// Configuration file (.yaml or .json)
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the progress line owns stdout
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Check { code, config } => commands::check::run(&code, config.as_deref()),
    }
}
