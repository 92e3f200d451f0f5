//! # Output Formatting
//!
//! Plain-text and JSON rendering for command results.

use cacheforge_core::OperationStatus;
use cacheforge_types::{LogEntry, MetricsRecord, ViewModel};
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Plain
        }
    }
}

/// Pretty JSON, or `{}` if the value cannot be serialized.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Left-aligned columns separated by two spaces. The first row is the header.
pub fn format_table(rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; num_cols];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_overview(view: &ViewModel) -> String {
    let overview = view.overview();
    format!(
        "Total Capacity: {}\nKeys Count:     {}\nStripes:        {}\nNamespaces:     {}",
        overview.total_capacity, overview.key_count, overview.stripe_count, overview.namespace_count
    )
}

pub fn format_stripes(view: &ViewModel) -> String {
    let mut rows = vec![vec![
        "STRIPE".to_string(),
        "KEYS".to_string(),
        "CAPACITY".to_string(),
        "OCCUPANCY".to_string(),
        "LRU (oldest → newest)".to_string(),
    ]];
    for stripe in &view.stripes {
        let order = stripe
            .recency_order
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(" → ");
        rows.push(vec![
            stripe.id.to_string(),
            stripe.key_count.to_string(),
            format!("{:.1}", stripe.capacity),
            format!("{:.0}%", stripe.occupancy() * 100.0),
            order,
        ]);
    }
    format_table(&rows)
}

pub fn format_keys(view: &ViewModel) -> String {
    if view.all_keys.is_empty() {
        return "No keys".to_string();
    }

    let mut rows = vec![vec![
        "NAMESPACE".to_string(),
        "KEY".to_string(),
        "VALUE".to_string(),
        "TTL".to_string(),
        "STATE".to_string(),
        "STRIPE".to_string(),
    ]];
    for key in &view.all_keys {
        rows.push(vec![
            key.namespace.clone(),
            key.key.clone(),
            key.value.clone(),
            if key.is_persistent() {
                "∞".to_string()
            } else {
                format!("{}s", key.ttl_seconds)
            },
            if key.expired { "expired" } else { "active" }.to_string(),
            key.stripe_id.to_string(),
        ]);
    }
    format_table(&rows)
}

pub fn format_view(view: &ViewModel) -> String {
    format!(
        "{}\n\n{}\n\n{}",
        format_overview(view),
        format_stripes(view),
        format_keys(view)
    )
}

pub fn format_metrics(metrics: &MetricsRecord) -> String {
    format_table(&[
        vec!["Hits".to_string(), metrics.hits.to_string()],
        vec!["Misses".to_string(), metrics.misses.to_string()],
        vec!["Hit Ratio".to_string(), format!("{:.1}%", metrics.hit_ratio() * 100.0)],
        vec!["Expired".to_string(), metrics.expired.to_string()],
        vec!["Created".to_string(), metrics.created.to_string()],
        vec!["Updated".to_string(), metrics.updated.to_string()],
        vec!["Latency".to_string(), format!("{:.2} ms", metrics.latency_millis())],
    ])
}

pub fn format_logs(entries: &[LogEntry]) -> String {
    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_status(status: &OperationStatus) -> String {
    match status {
        OperationStatus::Completed(outcome) => {
            let mut line = outcome.log_line();
            if let Some(value) = &outcome.value {
                line.push_str(&format!("\nvalue: {}", value));
            }
            line
        }
        OperationStatus::Failed { reason } => format!("Operation failed: {}", reason),
    }
}
