use std::process::ExitCode;

use clap::Parser;

mod commands;
mod host;
mod printer;
mod session;

use burrow_runtime::{PROGRAM_NAME, logging};
use commands::Command;

#[derive(Debug, Parser)]
#[command(
    name = PROGRAM_NAME,
    version,
    about = "Walk a directory tree and browse it from several windows"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match cli.command {
        Command::Tree(args) => commands::tree::run(args),
        Command::Share(args) => commands::share::run(args),
        Command::Rename(args) => commands::rename::run(args),
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
