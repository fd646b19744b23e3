mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run_app(cli).await {
        eprintln!("\nError: {e}");
        std::process::exit(e.exit_code());
    }
}

/// Sends panic reports through the logger instead of straight to stderr.
fn install_panic_reporting() -> Result<()> {
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |info| {
        error!("{}", panic_hook.panic_report(info));
    }));
    Ok(())
}

fn configure_worker_threads(threads: Option<usize>) -> Result<()> {
    let Some(threads) = threads else {
        return Ok(());
    };
    info!(threads, "Sizing the population worker pool.");
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to build worker pool: {e}")))
}

async fn run_app(cli: Cli) -> Result<()> {
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;
    install_panic_reporting()?;

    info!("Theseus CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Parsed arguments: {:?}", &cli);
    configure_worker_threads(cli.threads)?;

    let result = match cli.command {
        Commands::Evolve(args) => commands::evolve::run(args).await,
        Commands::Describe(args) => commands::describe::run(args).await,
        Commands::Targets(args) => commands::targets::run(args).await,
    };

    match &result {
        Ok(()) => info!("Command completed."),
        Err(e) => error!(exit_code = e.exit_code(), "Command failed: {e}"),
    }
    result
}
