//! # Cache Monitor
//!
//! Wires the client, scheduler, aggregator, activity log and gateway together
//! and owns the background tasks that drive them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cacheforge_types::{LogEntry, MetricsRecord, ViewModel};
use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::activity_log::ActivityLog;
use crate::client::{CacheOperations, HttpCacheClient, SnapshotClient};
use crate::config::MonitorConfig;
use crate::error::{CacheForgeError, Result};
use crate::gateway::CacheOperationGateway;
use crate::metrics::MetricsAggregator;
use crate::scheduler::{RefreshOutcome, RefreshScheduler};

pub struct CacheMonitor {
    config: MonitorConfig,
    log: Arc<ActivityLog>,
    scheduler: Arc<RefreshScheduler>,
    aggregator: Arc<MetricsAggregator>,
    gateway: CacheOperationGateway,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    running: AtomicBool,
}

impl CacheMonitor {
    /// Monitor backed by the HTTP client described in `config.endpoint`.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate().map_err(CacheForgeError::configuration)?;
        let client = HttpCacheClient::from_config(&config.endpoint)
            .map_err(|e| CacheForgeError::configuration(e.to_string()))?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Monitor backed by any client; used with mocks in tests.
    pub fn with_client<C>(config: MonitorConfig, client: Arc<C>) -> Self
    where
        C: SnapshotClient + CacheOperations + 'static,
    {
        let log = Arc::new(ActivityLog::new(config.activity_log.capacity));
        let snapshots: Arc<dyn SnapshotClient> = client.clone();
        let operations: Arc<dyn CacheOperations> = client;

        let scheduler = Arc::new(RefreshScheduler::new(snapshots.clone(), log.clone()));
        let aggregator = Arc::new(MetricsAggregator::new(snapshots, config.metrics.failure_policy));
        let gateway = CacheOperationGateway::new(operations, scheduler.clone(), log.clone());

        Self {
            config,
            log,
            scheduler,
            aggregator,
            gateway,
            tasks: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Initial sync (when enabled), then the periodic refresh and metrics poller.
    ///
    /// Calling `start` on a running monitor does nothing. The running state is
    /// claimed before the initial sync, so concurrent calls start one set of tasks.
    pub async fn start(&self) {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Cache monitor already running");
            return;
        }

        if self.config.refresh.sync_on_start {
            self.scheduler.request(true).await;
            if !self.is_running() {
                // stopped during the initial sync
                return;
            }
        }

        let refresh = Arc::clone(&self.scheduler)
            .spawn_periodic(self.config.refresh.interval(), self.config.refresh.repeat);
        let metrics = Arc::clone(&self.aggregator).spawn_polling(self.config.metrics.interval());

        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend([refresh, metrics]);

        info!(
            "Cache monitor started: refresh every {}s (repeat={}), metrics every {}s",
            self.config.refresh.interval_secs,
            self.config.refresh.repeat,
            self.config.metrics.interval_secs
        );
    }

    /// Abort the background tasks. Published state stays readable.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        if tasks.is_empty() {
            return;
        }
        for task in tasks {
            task.abort();
        }
        info!("Cache monitor stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn view(&self) -> Arc<ViewModel> {
        self.scheduler.view()
    }

    pub fn metrics(&self) -> Arc<MetricsRecord> {
        self.aggregator.current()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.log.entries()
    }

    pub fn activity_log(&self) -> &Arc<ActivityLog> {
        &self.log
    }

    pub fn subscribe_view(&self) -> watch::Receiver<Arc<ViewModel>> {
        self.scheduler.view_reader().subscribe()
    }

    pub fn subscribe_metrics(&self) -> watch::Receiver<Arc<MetricsRecord>> {
        self.aggregator.reader().subscribe()
    }

    pub fn subscribe_logs(&self) -> watch::Receiver<Arc<Vec<LogEntry>>> {
        self.log.reader().subscribe()
    }

    /// Explicit refresh; logs on success.
    pub async fn refresh_now(&self) -> RefreshOutcome {
        self.scheduler.request(true).await
    }

    /// One metrics collection outside the poller's cadence.
    pub async fn collect_metrics(&self) -> Arc<MetricsRecord> {
        self.aggregator.collect().await
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        self.scheduler.last_refreshed()
    }

    pub fn gateway(&self) -> &CacheOperationGateway {
        &self.gateway
    }
}

impl Drop for CacheMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
