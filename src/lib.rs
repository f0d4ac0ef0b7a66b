pub mod aggregation;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod pagination;
pub mod services;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use log::{error, info};

use crate::cli::{Command, RunArgs};
use crate::config::settings::{AppConfig, ConcurrencySettings};
use crate::http::{BrowserRenderer, Fetcher, HttpClient, LiveSource, RetryPolicy};
use crate::services::{CrawlService, RepairService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

/// Defaults with the command-line overrides applied
pub fn build_config(args: &RunArgs) -> AppConfig {
    let mut config = AppConfig::new();
    if let Some(prefix) = &args.prefix {
        config.club.prefix = prefix.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }
    if let Some(workers) = args.workers {
        config.concurrency = ConcurrencySettings::uniform(workers);
    }
    if let Some(retries) = args.retries {
        config.retry.max_attempts = retries.max(1);
    }
    if let Some(user_agent) = &args.user_agent {
        config.scraper.user_agent = user_agent.clone();
    }
    config
}

pub fn handle_crawl(args: &RunArgs) -> Result<()> {
    let config = build_config(args);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let fetcher = live_fetcher(&config).await?;
        let today = chrono::Local::now().date_naive();

        let result = match CrawlService::new(&config, &fetcher, today) {
            Ok(service) => service.run().await,
            Err(e) => Err(e),
        };
        fetcher.into_source().shutdown().await;

        if let Some(report) = result? {
            info!(
                "Saved {} teams, {} divisions, {} players ({} empty teams, {} unresolved players)",
                report.teams, report.divisions, report.players, report.empty_teams, report.unresolved_players
            );
            if !report.persist_failures.is_empty() {
                error!("Failed to write: {}", report.persist_failures.join(", "));
            }
        }
        Ok(())
    })
}

pub fn handle_repair(args: &RunArgs) -> Result<()> {
    let config = build_config(args);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let fetcher = live_fetcher(&config).await?;
        let today = chrono::Local::now().date_naive();

        let result = match RepairService::new(&config, &fetcher, today) {
            Ok(service) => service.run().await,
            Err(e) => Err(e),
        };
        fetcher.into_source().shutdown().await;

        let report = result?;
        for name in &report.still_empty {
            info!("  Still empty: {}", name);
        }
        Ok(())
    })
}

async fn live_fetcher(config: &AppConfig) -> Result<Fetcher<LiveSource>> {
    let renderer = BrowserRenderer::launch(&config.scraper)
        .await
        .context("Failed to start headless browser (set CHROME_PATH to point at Chrome/Chromium)")?;
    let http = HttpClient::new(&config.scraper.user_agent, config.scraper.api_timeout)?;

    Ok(Fetcher::new(
        LiveSource::new(renderer, http),
        RetryPolicy::from_settings(&config.retry),
        BrowserRenderer::attempt_timeout(&config.scraper),
    )
    .with_max_open_pages(config.concurrency.max_open_pages))
}
