//! brand.yml command line tool.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use console::style;

mod cli;
mod commands;
mod logging;

use crate::cli::Cli;
use crate::logging::{init_logging, LogConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let log_config = LogConfig::from_verbosity(cli.verbose);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    let mut stdout = io::stdout().lock();
    match commands::run(&cli.command, &mut stdout) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}
