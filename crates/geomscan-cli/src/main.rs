mod cli;
mod commands;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("command failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::setup_logging(cli.verbose, cli.quiet, &cli.log_file)?;
    info!("gscan v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("parsed arguments: {:?}", &cli);

    match cli.command {
        Commands::Scan(args) => commands::scan::run(args),
        Commands::Set(args) => commands::set::run(args),
        Commands::Info(args) => commands::info::run(args),
    }
}
