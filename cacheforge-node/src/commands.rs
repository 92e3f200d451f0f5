//! Command handlers.

use std::path::PathBuf;

use anyhow::{bail, Context};
use cacheforge_core::{
    CacheMonitor, ConfigLoader, MonitorConfig, OperationStatus, RefreshOutcome, ValidationError,
};
use serde_json::json;

use crate::output::{self, OutputFormat};

/// Log lines shown after a gateway operation.
const LOG_TAIL: usize = 5;

pub fn load_config(path: Option<PathBuf>, base_url: Option<String>) -> anyhow::Result<MonitorConfig> {
    let loader = match path {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load().context("Failed to load configuration")?;

    if let Some(base_url) = base_url {
        config = config.with_base_url(base_url);
        config
            .validate()
            .map_err(anyhow::Error::msg)
            .context("Invalid --base-url")?;
    }
    Ok(config)
}

pub fn build_monitor(path: Option<PathBuf>, base_url: Option<String>) -> anyhow::Result<CacheMonitor> {
    let config = load_config(path, base_url)?;
    Ok(CacheMonitor::new(config)?)
}

pub async fn state(monitor: &CacheMonitor, format: OutputFormat) -> anyhow::Result<()> {
    let issues = match monitor.refresh_now().await {
        RefreshOutcome::Published { issues } => issues,
        RefreshOutcome::Failed(reason) => bail!("Sync failed: {}", reason),
        RefreshOutcome::Skipped => Vec::new(),
    };
    let view = monitor.view();

    match format {
        OutputFormat::Json => {
            let issues: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
            println!(
                "{}",
                output::to_json(&json!({
                    "overview": view.overview(),
                    "view": &*view,
                    "issues": issues,
                }))
            );
        }
        OutputFormat::Plain => {
            println!("{}", output::format_view(&view));
            for issue in &issues {
                println!("⚠ {}", issue);
            }
        }
    }
    Ok(())
}

pub async fn metrics(monitor: &CacheMonitor, format: OutputFormat) -> anyhow::Result<()> {
    let metrics = monitor.collect_metrics().await;
    match format {
        OutputFormat::Json => println!(
            "{}",
            output::to_json(&json!({
                "metrics": &*metrics,
                "latencyMillis": metrics.latency_millis(),
                "hitRatio": metrics.hit_ratio(),
            }))
        ),
        OutputFormat::Plain => println!("{}", output::format_metrics(&metrics)),
    }
    Ok(())
}

pub fn report_operation(
    monitor: &CacheMonitor,
    status: Result<OperationStatus, ValidationError>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let status = status?;
    let logs = monitor.logs();
    let tail = &logs[..logs.len().min(LOG_TAIL)];

    match format {
        OutputFormat::Json => println!(
            "{}",
            output::to_json(&json!({ "result": &status, "log": tail }))
        ),
        OutputFormat::Plain => {
            println!("{}", output::format_status(&status));
            println!("\n{}", output::format_logs(tail));
        }
    }

    if let OperationStatus::Failed { reason } = status {
        bail!("{}", reason);
    }
    Ok(())
}

/// Runs until `iterations` updates were printed, or until Ctrl-C.
pub async fn watch(
    monitor: &CacheMonitor,
    iterations: Option<usize>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut views = monitor.subscribe_view();
    let mut metrics = monitor.subscribe_metrics();
    let mut logs = monitor.subscribe_logs();
    let mut last_log = None;

    monitor.start().await;
    print_update(monitor, format, &mut last_log);

    let mut printed = 1;
    while iterations.map_or(true, |n| printed < n) {
        tokio::select! {
            changed = views.changed() => changed.context("view publisher closed")?,
            changed = metrics.changed() => changed.context("metrics publisher closed")?,
            changed = logs.changed() => changed.context("log publisher closed")?,
            _ = tokio::signal::ctrl_c() => break,
        }
        views.borrow_and_update();
        metrics.borrow_and_update();
        logs.borrow_and_update();

        print_update(monitor, format, &mut last_log);
        printed += 1;
    }

    monitor.stop();
    Ok(())
}

/// Prints the current state plus log lines newer than `last_log`.
fn print_update(
    monitor: &CacheMonitor,
    format: OutputFormat,
    last_log: &mut Option<chrono::DateTime<chrono::Local>>,
) {
    let view = monitor.view();
    let metrics = monitor.metrics();
    let logs = monitor.logs();
    let fresh: Vec<_> = logs
        .iter()
        .take_while(|e| last_log.map_or(true, |seen| e.timestamp > seen))
        .cloned()
        .collect();
    if let Some(newest) = logs.first() {
        *last_log = Some(newest.timestamp);
    }

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&json!({
                "overview": view.overview(),
                "metrics": &*metrics,
                "log": fresh,
                "lastRefreshed": monitor.last_refreshed(),
            }))
            .unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Plain => {
            println!("{}\n", output::format_overview(&view));
            println!("{}", output::format_metrics(&metrics));
            if !fresh.is_empty() {
                println!("\n{}", output::format_logs(&fresh));
            }
            println!("---");
        }
    }
}
