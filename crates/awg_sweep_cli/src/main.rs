//! `awg-sweep` binary.
//!
//! Entry point for the command-line tool.

use std::process::ExitCode;

use clap::Parser;

mod app;
mod cli;
mod exit;
mod logger;

use app::Outcome;
use cli::Cli;
use exit::{codes, exit_code};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match app::run(&cli) {
        Ok(Outcome::Interrupted) => ExitCode::from(codes::SIGINT as u8),
        Ok(Outcome::Completed | Outcome::Generated) => ExitCode::from(codes::SUCCESS as u8),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}
