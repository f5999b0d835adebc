//! Thyme CLI - Main Entry Point
//!
//! Runs YAML test suites through the report shell and writes an HTML page
//! plus machine-readable results.

use clap::{Parser, Subcommand};

use thyme_cli::commands::{config, run};
use thyme_cli::output::{self, OutputFormat};

/// Thyme - hierarchical test reports
#[derive(Parser)]
#[command(name = "thyme")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run suites and write the report
    Run(run::RunArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Show version information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let code = match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            2
        }
    };
    std::process::exit(code);
}

async fn execute(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Run(args) => {
            let status = run::execute(args, cli.format).await?;
            Ok(status.exit_code())
        }
        Commands::Config(cmd) => {
            config::execute(cmd, cli.format)?;
            Ok(0)
        }
        Commands::Version => {
            println!("Thyme CLI v{}", thyme_common::VERSION);
            Ok(0)
        }
    }
}
