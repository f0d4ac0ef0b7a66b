use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chess league standings scraper")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Scrape teams, divisions and players from both federations and save them
    Crawl(RunArgs),
    /// Re-fetch teams that a previous crawl saved without roster or matches
    Repair(RunArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Default)]
pub struct RunArgs {
    /// Team name prefix of the club (defaults to SISSA)
    #[arg(short, long)]
    pub prefix: Option<String>,
    /// Directory the JSON collections are written to (defaults to ./data)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Concurrent fetches per stage
    #[arg(short, long)]
    pub workers: Option<usize>,
    /// Attempts per page before giving up
    #[arg(short, long)]
    pub retries: Option<usize>,
    /// User agent sent by the browser and the ratings client
    #[arg(long)]
    pub user_agent: Option<String>,
}
