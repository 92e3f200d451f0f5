//! CacheForge Monitor CLI
//!
//! Thin operator front end over `cacheforge-core`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

mod commands;
mod output;

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "cacheforge")]
#[command(about = "CacheForge - striped LRU cache monitor")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $CACHEFORGE_CONFIG, ./cacheforge.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache service base URL, overrides the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    json: bool,

    #[arg(long, short, global = true, help = "Log diagnostics at info level")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one snapshot and print overview, stripes and keys
    State,

    /// Collect the cache counters once
    Metrics,

    /// Store a value
    Set {
        namespace: String,
        key: String,
        value: String,
        /// Seconds to live, -1 for no expiry
        #[arg(long, default_value_t = -1, allow_hyphen_values = true)]
        ttl: i64,
    },

    /// Read a value
    Get { namespace: String, key: String },

    /// Delete a value
    Del { namespace: String, key: String },

    /// Keep the monitor running and print every update
    Watch {
        /// Stop after this many updates
        #[arg(long, short = 'n')]
        iterations: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Running command: {:?}", cli.command);

    let format = OutputFormat::from_flag(cli.json);
    let result = match commands::build_monitor(cli.config, cli.base_url) {
        Ok(monitor) => run_command(cli.command, &monitor, format).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_command(
    command: Commands,
    monitor: &cacheforge_core::CacheMonitor,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match command {
        Commands::State => commands::state(monitor, format).await,
        Commands::Metrics => commands::metrics(monitor, format).await,
        Commands::Set {
            namespace,
            key,
            value,
            ttl,
        } => {
            let status = monitor.gateway().set(&namespace, &key, &value, ttl).await;
            commands::report_operation(monitor, status, format)
        }
        Commands::Get { namespace, key } => {
            let status = monitor.gateway().get(&namespace, &key).await;
            commands::report_operation(monitor, status, format)
        }
        Commands::Del { namespace, key } => {
            let status = monitor.gateway().delete(&namespace, &key).await;
            commands::report_operation(monitor, status, format)
        }
        Commands::Watch { iterations } => commands::watch(monitor, iterations, format).await,
    }
}
