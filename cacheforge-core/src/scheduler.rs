//! # Refresh Scheduler
//!
//! Drives snapshot fetch + normalization and publishes the resulting view.
//!
//! The scheduler is a two-state machine, `Idle` and `Refreshing`. A request
//! that arrives while a refresh is in flight is dropped, never queued, and
//! the in-flight refresh is never cancelled. Leaving `Refreshing` is tied to
//! a drop guard, so the machine returns to `Idle` on every exit path.
//!
//! Two triggers feed it: explicit requests (`force_log = true`) and the
//! periodic timer (`force_log = false`).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cacheforge_types::ViewModel;
use chrono::{DateTime, Local};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::activity_log::ActivityLog;
use crate::client::SnapshotClient;
use crate::normalizer::{normalize, ConsistencyIssue, NormalizedSnapshot};
use crate::store::{Publisher, StateReader};

pub const SYNCHRONIZED_MESSAGE: &str = "System state synchronized.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Result of one `request` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new view was published. Any issues were logged as warnings.
    Published { issues: Vec<ConsistencyIssue> },
    /// The snapshot could not be fetched; the previous view is kept.
    Failed(String),
    /// Another refresh was already in flight.
    Skipped,
}

impl RefreshOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, RefreshOutcome::Published { .. })
    }
}

/// Returns the machine to `Idle` when dropped.
struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct RefreshScheduler {
    client: Arc<dyn SnapshotClient>,
    log: Arc<ActivityLog>,
    view: Publisher<ViewModel>,
    last_refreshed: Publisher<Option<DateTime<Local>>>,
    refreshing: AtomicBool,
}

impl RefreshScheduler {
    pub fn new(client: Arc<dyn SnapshotClient>, log: Arc<ActivityLog>) -> Self {
        Self {
            client,
            log,
            view: Publisher::new(ViewModel::default()),
            last_refreshed: Publisher::new(None),
            refreshing: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> RefreshState {
        if self.refreshing.load(Ordering::Acquire) {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    fn try_begin(&self) -> Option<RefreshGuard<'_>> {
        self.refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RefreshGuard {
                flag: &self.refreshing,
            })
    }

    /// Run one refresh unless one is already in flight.
    ///
    /// Fetch failures are logged and reported in the outcome; they never
    /// replace the published view.
    pub async fn request(&self, force_log: bool) -> RefreshOutcome {
        let Some(_guard) = self.try_begin() else {
            debug!("Refresh already in flight, dropping request (force_log={})", force_log);
            return RefreshOutcome::Skipped;
        };

        debug!("Refreshing cache snapshot");
        match self.client.fetch_snapshot().await {
            Ok(raw) => {
                let NormalizedSnapshot { view, issues } = normalize(&raw);
                for issue in &issues {
                    self.log.warn(issue.to_string());
                }

                let view = self.view.publish(view);
                self.last_refreshed.publish(Some(Local::now()));
                info!(
                    "Published view: {} stripes, {} keys",
                    view.stripes.len(),
                    view.all_keys.len()
                );

                if force_log {
                    self.log.append(SYNCHRONIZED_MESSAGE);
                }
                RefreshOutcome::Published { issues }
            }
            Err(e) => {
                let reason = e.to_string();
                self.log.error(format!("Sync Error: {}", reason));
                RefreshOutcome::Failed(reason)
            }
        }
    }

    /// Spawn the periodic trigger. The first tick fires one `interval` after
    /// the call; with `repeat = false` it fires once and the task ends.
    pub fn spawn_periodic(self: Arc<Self>, interval: Duration, repeat: bool) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if self.request(false).await == RefreshOutcome::Skipped {
                    debug!("Periodic refresh skipped");
                }
                if !repeat {
                    debug!("Periodic refresh configured to run once, stopping");
                    break;
                }
            }
        })
    }

    pub fn view(&self) -> Arc<ViewModel> {
        self.view.current()
    }

    pub fn view_reader(&self) -> StateReader<ViewModel> {
        self.view.reader()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        *self.last_refreshed.current()
    }
}
