//! Command line tools for skeletal animation assets

mod cli;
mod commands;
mod utils;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use log::LevelFilter;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = requested_level(cli.verbose, cli.quiet) {
        logger.filter_level(level);
    }
    logger.init();

    match cli.command {
        Commands::Skeleton { command } => commands::skeleton::execute(command),
        Commands::Clip { command } => commands::clip::execute(command),
        Commands::Completions { shell } => {
            write_completions(shell);
            Ok(())
        }
    }
}

/// Log level picked by `-v`/`-q`; `None` leaves `RUST_LOG` in charge
fn requested_level(verbose: u8, quiet: bool) -> Option<LevelFilter> {
    match verbose {
        0 if quiet => Some(LevelFilter::Error),
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

fn write_completions(shell: Shell) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(shell, &mut command, name, &mut std::io::stdout());
}
