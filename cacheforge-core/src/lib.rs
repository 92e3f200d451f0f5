//! # CacheForge Core Library
//!
//! State synchronization layer for observing a remote striped-LRU cache
//! service.
//!
//! ## Architecture
//!
//! - **Client**: `SnapshotClient` / `CacheOperations` traits and the HTTP implementation
//! - **Normalizer**: raw snapshot → `ViewModel`, with consistency issues reported alongside
//! - **Metrics**: concurrent counter fetch folded into one `MetricsRecord`
//! - **Activity Log**: bounded newest-first event log
//! - **Scheduler**: Idle/Refreshing state machine, at most one refresh in flight
//! - **Gateway**: validated set/get/del followed by a forced refresh
//! - **Monitor**: facade that wires the above and owns the background tasks
//!
//! ```text
//! timer / caller ─► RefreshScheduler ─► SnapshotClient ─► normalize ─► ViewModel
//! timer ─────────► MetricsAggregator ─► SnapshotClient ×6 ─► fold ───► MetricsRecord
//! caller ────────► CacheOperationGateway ─► CacheOperations ─► ActivityLog + refresh
//! ```
//!
//! Every published value is replaced whole; readers never see a view whose
//! stripes and keys disagree.

pub use cacheforge_types::*;

pub mod activity_log;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod monitor;
pub mod normalizer;
pub mod scheduler;
pub mod store;

// Test support with mocks (only for testing)
#[cfg(any(test, feature = "test-utils"))]
pub mod test;

pub use activity_log::ActivityLog;
pub use client::{select_measurement, CacheOperations, HttpCacheClient, SnapshotClient};
pub use config::{ConfigLoader, FailurePolicy, MonitorConfig};
pub use error::{CacheForgeError, FetchError, Result, ValidationError};
pub use gateway::{CacheOperationGateway, Operation, OperationOutcome, OperationStatus};
pub use metrics::{fold_counters, MetricsAggregator};
pub use monitor::CacheMonitor;
pub use normalizer::{normalize, ConsistencyIssue, NormalizedSnapshot};
pub use scheduler::{RefreshOutcome, RefreshScheduler, RefreshState};
pub use store::{Publisher, StateReader};
