use anyhow::Result;
use colored::Colorize;

use chess_standings::cli::Command;
use chess_standings::{handle_crawl, handle_repair, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Crawl(args) => handle_crawl(args),
        Command::Repair(args) => handle_repair(args),
    }
}
