//! # Mock Cache Client
//!
//! 同时实现 [`SnapshotClient`] 和 [`CacheOperations`] 的 Mock。

use super::MockCallTracker;
use crate::client::{CacheOperations, SnapshotClient};
use crate::error::FetchError;
use async_trait::async_trait;
use cacheforge_types::{CounterName, OperationResponse, RawSnapshot, SetRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Preset<T> = Result<T, FetchError>;

/// 缓存服务 Mock
///
/// 未预设的快照与计数器返回错误；未预设的操作返回空的 `OperationResponse`。
#[derive(Clone)]
pub struct MockCacheClient {
    tracker: MockCallTracker,
    snapshot: Arc<Mutex<Preset<RawSnapshot>>>,
    counters: Arc<Mutex<HashMap<CounterName, Preset<f64>>>>,
    operation: Arc<Mutex<Preset<OperationResponse>>>,
    gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl Default for MockCacheClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCacheClient {
    /// 创建新的 Mock
    pub fn new() -> Self {
        Self {
            tracker: MockCallTracker::new(),
            snapshot: Arc::new(Mutex::new(Err(FetchError::decode("no snapshot preset")))),
            counters: Arc::new(Mutex::new(HashMap::new())),
            operation: Arc::new(Mutex::new(Ok(OperationResponse::default()))),
            gate: Arc::new(Mutex::new(None)),
        }
    }

    /// 调用追踪器
    pub fn tracker(&self) -> &MockCallTracker {
        &self.tracker
    }

    /// 预设快照
    pub fn preset_snapshot(&self, snapshot: RawSnapshot) {
        *self.snapshot.lock().unwrap() = Ok(snapshot);
    }

    /// 预设快照错误
    pub fn preset_snapshot_err(&self, error: FetchError) {
        *self.snapshot.lock().unwrap() = Err(error);
    }

    /// 预设计数器值
    pub fn preset_counter(&self, counter: CounterName, value: f64) {
        self.counters.lock().unwrap().insert(counter, Ok(value));
    }

    /// 预设计数器错误
    pub fn preset_counter_err(&self, counter: CounterName, error: FetchError) {
        self.counters.lock().unwrap().insert(counter, Err(error));
    }

    /// 预设 set/get/del 的响应
    pub fn preset_operation(&self, response: OperationResponse) {
        *self.operation.lock().unwrap() = Ok(response);
    }

    /// 预设 set/get/del 的错误
    pub fn preset_operation_err(&self, error: FetchError) {
        *self.operation.lock().unwrap() = Err(error);
    }

    /// 之后的 `fetch_snapshot` 调用挂起，直到 [`release_snapshot`](Self::release_snapshot)
    pub fn hold_snapshots(&self) {
        *self.gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    /// 放行一个挂起的 `fetch_snapshot`
    pub fn release_snapshot(&self) {
        if let Some(gate) = self.gate.lock().unwrap().as_ref() {
            gate.notify_one();
        }
    }

    fn operation_result(&self) -> Preset<OperationResponse> {
        replay(&*self.operation.lock().unwrap())
    }
}

/// FetchError 不可 Clone，按变体重建；传输错误降级为 Decode
fn replay<T: Clone>(preset: &Preset<T>) -> Preset<T> {
    match preset {
        Ok(value) => Ok(value.clone()),
        Err(e) => Err(match e {
            FetchError::Status {
                status,
                code,
                message,
            } => FetchError::Status {
                status: *status,
                code: code.clone(),
                message: message.clone(),
            },
            FetchError::MissingMeasurement { counter, index } => FetchError::MissingMeasurement {
                counter: *counter,
                index: *index,
            },
            FetchError::InvalidMeasurement { counter, value } => FetchError::InvalidMeasurement {
                counter: *counter,
                value: *value,
            },
            FetchError::InvalidUrl(url) => FetchError::InvalidUrl(url.clone()),
            other => FetchError::decode(other.to_string()),
        }),
    }
}

#[async_trait]
impl SnapshotClient for MockCacheClient {
    async fn fetch_snapshot(&self) -> Result<RawSnapshot, FetchError> {
        self.tracker.record("fetch_snapshot", vec![]);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        replay(&*self.snapshot.lock().unwrap())
    }

    async fn fetch_counter(&self, counter: CounterName) -> Result<f64, FetchError> {
        self.tracker
            .record("fetch_counter", vec![counter.metric_name().to_string()]);

        match self.counters.lock().unwrap().get(&counter) {
            Some(preset) => replay(preset),
            None => Err(FetchError::Status {
                status: 404,
                code: None,
                message: None,
            }),
        }
    }
}

#[async_trait]
impl CacheOperations for MockCacheClient {
    async fn set(&self, request: &SetRequest) -> Result<OperationResponse, FetchError> {
        self.tracker.record(
            "set",
            vec![
                request.namespace.clone(),
                request.key.clone(),
                request.value.clone(),
                request.ttl.to_string(),
            ],
        );
        self.operation_result()
    }

    async fn get(&self, namespace: &str, key: &str) -> Result<OperationResponse, FetchError> {
        self.tracker
            .record("get", vec![namespace.to_string(), key.to_string()]);
        self.operation_result()
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<OperationResponse, FetchError> {
        self.tracker
            .record("delete", vec![namespace.to_string(), key.to_string()]);
        self.operation_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_presets_replay_every_call() {
        let mock = MockCacheClient::new();
        mock.preset_counter_err(
            CounterName::Misses,
            FetchError::Status {
                status: 502,
                code: None,
                message: None,
            },
        );

        for _ in 0..2 {
            let err = mock.fetch_counter(CounterName::Misses).await.unwrap_err();
            assert_eq!(err.to_string(), "HTTP 502");
        }
        mock.tracker().assert_call_count("fetch_counter", 2);
        assert!(mock.fetch_snapshot().await.is_err());
    }

    #[tokio::test]
    async fn test_gate_holds_snapshot() {
        let mock = MockCacheClient::new();
        mock.preset_snapshot(RawSnapshot::default());
        mock.hold_snapshots();

        let pending = tokio::spawn({
            let mock = mock.clone();
            async move { mock.fetch_snapshot().await }
        });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());

        mock.release_snapshot();
        assert!(pending.await.unwrap().is_ok());
    }
}
