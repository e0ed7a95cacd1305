//! Run orchestration for the expiry monitor job.
//!
//! One run is strictly sequential: fetch → sanitize → evaluate → format →
//! notify. Source failures end the run early; everything after the fetch is
//! best-effort, and a failed sink downgrades the outcome to partial success
//! instead of failing the run.

use std::fmt;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use shelfwatch_core::record::AlertEntry;
use shelfwatch_core::Config;
use shelfwatch_notify::email::EmailNotifier;
use shelfwatch_notify::export;
use shelfwatch_notify::webhook::ChatWebhookNotifier;
use shelfwatch_notify::{Dispatcher, Notification, Notifier};
use shelfwatch_pipeline::{evaluate, sanitize, summarize, tabulate};
use shelfwatch_source::{connect, fetch_all_inventory};

/// Completion state of a single run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The source returned no rows at all.
    NoData,
    /// Rows were fetched but nothing is past expiry.
    NoAlerts,
    /// Alerts were computed and logged, sending was skipped.
    DryRun { alerts: usize },
    /// Every configured sink delivered.
    Completed { alerts: usize, delivered: usize },
    /// At least one sink failed or none delivered; the alert list itself
    /// was still computed.
    Partial { alerts: usize, failed: Vec<String> },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NoData => write!(f, "no data"),
            RunOutcome::NoAlerts => write!(f, "no alerts"),
            RunOutcome::DryRun { alerts } => write!(f, "dry run ({alerts} alerts)"),
            RunOutcome::Completed { alerts, delivered } => {
                write!(f, "completed ({alerts} alerts, {delivered} sinks)")
            }
            RunOutcome::Partial { alerts, failed } => {
                if failed.is_empty() {
                    write!(f, "partial ({alerts} alerts, nothing delivered)")
                } else {
                    write!(f, "partial ({alerts} alerts, failed: {})", failed.join(", "))
                }
            }
        }
    }
}

/// Execute one monitoring run.
///
/// `reference_date` overrides "today" for reproducible runs; `dry_run`
/// stops short of dispatching and logs the digest instead.
pub async fn run(
    config: &Config,
    reference_date: Option<NaiveDate>,
    dry_run: bool,
) -> anyhow::Result<RunOutcome> {
    let generated_at = Local::now().naive_local();
    let reference_date = reference_date.unwrap_or_else(|| generated_at.date());
    info!(%reference_date, "expiry monitor run starting");

    let pool = connect(&config.database).await?;
    let records = fetch_all_inventory(&pool, config.monitor.page_size).await?;

    if records.is_empty() {
        info!("source returned no inventory rows");
        return Ok(RunOutcome::NoData);
    }

    let sanitized = sanitize(records, reference_date);
    let evaluated = evaluate(
        sanitized.kept,
        reference_date,
        config.monitor.max_reasonable_overdue_days,
    );

    if evaluated.alerts.is_empty() {
        info!("no expired batches found");
        return Ok(RunOutcome::NoAlerts);
    }

    let alert_count = evaluated.alerts.len();
    log_overdue_stats(&evaluated.alerts);

    let digest = summarize(&evaluated.alerts, generated_at);
    let export_table = tabulate(evaluated.alerts);

    let mut notification = Notification::text(digest.subject, digest.body.clone());
    if !export_table.is_empty() {
        match export::to_attachment(&export_table, generated_at) {
            Ok(attachment) => notification = notification.with_attachment(attachment),
            Err(e) => {
                warn!(error = %e, "export serialization failed, sending digest without attachment");
            }
        }
    }

    if dry_run {
        info!("dry run, skipping notification dispatch");
        info!("digest:\n{}", digest.body);
        return Ok(RunOutcome::DryRun {
            alerts: alert_count,
        });
    }

    let dispatcher = Dispatcher::new(build_channels(config));
    if dispatcher.is_empty() {
        warn!("no notification sinks configured, alerts computed but not delivered");
        return Ok(RunOutcome::Partial {
            alerts: alert_count,
            failed: Vec::new(),
        });
    }

    let results = dispatcher.dispatch(&notification).await;
    let failed: Vec<String> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.channel.clone())
        .collect();

    if failed.is_empty() {
        Ok(RunOutcome::Completed {
            alerts: alert_count,
            delivered: results.len(),
        })
    } else {
        Ok(RunOutcome::Partial {
            alerts: alert_count,
            failed,
        })
    }
}

/// Construct the configured sinks. A sink with incomplete or invalid
/// configuration is skipped with a warning rather than failing the run.
fn build_channels(config: &Config) -> Vec<Box<dyn Notifier>> {
    let mut channels: Vec<Box<dyn Notifier>> = Vec::new();

    if config.webhook.is_configured() {
        match ChatWebhookNotifier::from_config(&config.webhook) {
            Ok(notifier) => channels.push(Box::new(notifier)),
            Err(e) => warn!(error = %e, "chat webhook sink misconfigured, skipping"),
        }
    } else {
        info!("chat webhook not configured, skipping");
    }

    if config.mail.is_configured() {
        match EmailNotifier::from_config(&config.mail) {
            Ok(notifier) => channels.push(Box::new(notifier)),
            Err(e) => warn!(error = %e, "email sink misconfigured, skipping"),
        }
    } else {
        info!("email sink not configured, skipping");
    }

    channels
}

/// Log max/min/mean overdue days across the alert list.
fn log_overdue_stats(alerts: &[AlertEntry]) {
    if let Some((max, min, mean)) = overdue_stats(alerts) {
        info!(
            alerts = alerts.len(),
            max_overdue_days = max,
            min_overdue_days = min,
            mean_overdue_days = format!("{mean:.1}"),
            "expired batches found"
        );
    }
}

fn overdue_stats(alerts: &[AlertEntry]) -> Option<(i64, i64, f64)> {
    if alerts.is_empty() {
        return None;
    }
    let max = alerts.iter().map(|a| a.overdue_days).max()?;
    let min = alerts.iter().map(|a| a.overdue_days).min()?;
    let sum: i64 = alerts.iter().map(|a| a.overdue_days).sum();
    Some((max, min, sum as f64 / alerts.len() as f64))
}
