//! expiry-monitor — scheduled inventory expiry reporting job.
//!
//! Scans the inventory database for batches past expiry and delivers a
//! digest to the chat webhook plus a detailed export to the email
//! recipients. Runs to completion once and exits; scheduling is the
//! caller's concern (cron or similar).

use chrono::NaiveDate;
use clap::Parser;
use tracing::info;

use shelfwatch_core::config::{load_dotenv, Config};

/// Inventory expiry monitor — one-shot reporting job.
#[derive(Parser, Debug)]
#[command(name = "expiry-monitor", version, about)]
struct Cli {
    /// Compute and log the digest without sending notifications.
    #[arg(long)]
    dry_run: bool,

    /// Override the reference date (YYYY-MM-DD) used for overdue computation.
    #[arg(long, value_parser = parse_date)]
    reference_date: Option<NaiveDate>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let outcome = shelfwatch_monitor::run(&config, cli.reference_date, cli.dry_run).await?;
    info!(%outcome, "expiry monitor run finished");

    Ok(())
}
