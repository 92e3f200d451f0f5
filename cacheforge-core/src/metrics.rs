//! # Metrics Aggregator
//!
//! 并发拉取六个计数器，汇总为一条完整的 [`MetricsRecord`]。
//!
//! ## 失败处理
//!
//! - 每个计数器独立成败，一个失败不影响其他字段
//! - 失败字段按 [`FailurePolicy`] 取 0 或上次发布的值
//! - 负数或非有限值视为失败
//! - 对外永远只有完整记录，没有"部分指标"状态

use std::sync::Arc;
use std::time::Duration;

use cacheforge_types::{CounterName, MetricsRecord};
use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::client::SnapshotClient;
use crate::config::FailurePolicy;
use crate::error::FetchError;
use crate::store::{Publisher, StateReader};

/// 单轮拉取结果，按 [`CounterName::ALL`] 顺序
pub type CounterResults = Vec<(CounterName, Result<f64, FetchError>)>;

/// 指标聚合器，唯一的指标写入方
pub struct MetricsAggregator {
    client: Arc<dyn SnapshotClient>,
    policy: FailurePolicy,
    state: Publisher<MetricsRecord>,
}

impl MetricsAggregator {
    pub fn new(client: Arc<dyn SnapshotClient>, policy: FailurePolicy) -> Self {
        Self {
            client,
            policy,
            state: Publisher::new(MetricsRecord::default()),
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// 并发拉取全部计数器，等全部返回后再汇总
    pub async fn fetch_all(&self) -> CounterResults {
        let fetches = CounterName::ALL.iter().map(|counter| {
            let client = Arc::clone(&self.client);
            let counter = *counter;
            async move { (counter, client.fetch_counter(counter).await) }
        });
        join_all(fetches).await
    }

    /// 拉取、汇总并发布一轮指标
    pub async fn collect(&self) -> Arc<MetricsRecord> {
        let results = self.fetch_all().await;
        let previous = self.state.current();
        let record = fold_counters(results, self.policy, &previous);
        debug!(
            "Metrics collected: hits={} misses={} latency={:.4}s",
            record.hits, record.misses, record.latency_seconds
        );
        self.state.publish(record)
    }

    pub fn current(&self) -> Arc<MetricsRecord> {
        self.state.current()
    }

    pub fn reader(&self) -> StateReader<MetricsRecord> {
        self.state.reader()
    }

    /// 按固定间隔轮询，首轮立即执行
    pub fn spawn_polling(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                self.collect().await;
            }
        })
    }
}

/// 把一轮拉取结果折叠进一条记录
///
/// `previous` 只在 [`FailurePolicy::LastKnown`] 下使用。
pub fn fold_counters(
    results: CounterResults,
    policy: FailurePolicy,
    previous: &MetricsRecord,
) -> MetricsRecord {
    results
        .into_iter()
        .fold(MetricsRecord::default(), |mut record, (counter, result)| {
            match result.and_then(|value| checked(counter, value)) {
                Ok(value) => record.set(counter, value),
                Err(e) => {
                    warn!("Counter {} unavailable: {}", counter, e);
                    let fallback = match policy {
                        FailurePolicy::Zero => 0.0,
                        FailurePolicy::LastKnown => previous.get(counter),
                    };
                    record.set(counter, fallback);
                }
            }
            record
        })
}

fn checked(counter: CounterName, value: f64) -> Result<f64, FetchError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FetchError::InvalidMeasurement { counter, value })
    }
}
