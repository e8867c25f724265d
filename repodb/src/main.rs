//! The `repodb` CLI tool.

use std::process::ExitCode;

mod commands;

use clap::Parser;
use log::error;
use repodb::cli::{Cli, Command};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use crate::commands::{check, index, providers};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(error) = TermLogger::init(
        cli.verbose.log_level_filter(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger:\n{error}");
        return ExitCode::FAILURE;
    };

    let result = match cli.command {
        Command::Index {
            compression,
            repos,
        } => index(compression, repos),
        Command::Check { stage, repos } => check(stage, repos),
        Command::Providers { repos } => providers(repos, &mut std::io::stdout()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::from(error.exit_code())
        }
    }
}
