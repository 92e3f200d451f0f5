//! 集成测试共用工具
//!
//! - `ScriptedClient`: 按脚本依次返回快照的客户端
//! - `StubServer`: 回放预设响应的 axum 服务，用于测试 `HttpCacheClient`

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cacheforge_core::{CacheOperations, FetchError, SnapshotClient};
use cacheforge_types::{
    CounterName, KeyRecord, KeyRef, OperationResponse, RawSnapshot, SetRequest,
};
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 构造单条记录
pub fn record(ns: &str, key: &str, value: &str) -> KeyRecord {
    KeyRecord {
        namespace: ns.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        ttl: -1,
        expired: false,
    }
}

/// 由 `(stripe, [(ns, key)])` 构造一致的快照，LRU 顺序与列出顺序相同
pub fn snapshot(capacity: u64, stripes: &[(&str, &[(&str, &str)])]) -> RawSnapshot {
    let mut raw = RawSnapshot {
        capacity,
        ..Default::default()
    };
    for (id, keys) in stripes {
        raw.keys.insert(
            id.to_string(),
            keys.iter().map(|(ns, k)| record(ns, k, "v")).collect(),
        );
        raw.lru.insert(
            id.to_string(),
            keys.iter().map(|(ns, k)| KeyRef::new(*ns, *k)).collect(),
        );
    }
    raw
}

/// 按顺序返回预设快照；用完后重复最后一个
#[derive(Default)]
pub struct ScriptedClient {
    snapshots: Mutex<VecDeque<Result<RawSnapshot, String>>>,
    last: Mutex<Option<Result<RawSnapshot, String>>>,
    counters: Mutex<HashMap<CounterName, Result<f64, String>>>,
    operation: Mutex<Option<Result<OperationResponse, String>>>,
    pub snapshot_calls: AtomicUsize,
    pub operation_calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_snapshot(&self, snapshot: RawSnapshot) {
        self.snapshots.lock().unwrap().push_back(Ok(snapshot));
    }

    pub fn push_failure(&self, reason: &str) {
        self.snapshots.lock().unwrap().push_back(Err(reason.to_string()));
    }

    pub fn counter(&self, counter: CounterName, value: Result<f64, &str>) {
        self.counters
            .lock()
            .unwrap()
            .insert(counter, value.map_err(str::to_string));
    }

    pub fn all_counters(&self, value: f64) {
        for counter in CounterName::ALL {
            self.counter(counter, Ok(value));
        }
    }

    pub fn respond(&self, response: Result<OperationResponse, &str>) {
        *self.operation.lock().unwrap() = Some(response.map_err(str::to_string));
    }

    pub fn snapshot_calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }

    pub fn operation_calls(&self) -> usize {
        self.operation_calls.load(Ordering::SeqCst)
    }

    fn operation_result(&self) -> Result<OperationResponse, FetchError> {
        self.operation_calls.fetch_add(1, Ordering::SeqCst);
        match self.operation.lock().unwrap().clone() {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(FetchError::decode(reason)),
            None => Ok(OperationResponse::default()),
        }
    }
}

#[async_trait]
impl SnapshotClient for ScriptedClient {
    async fn fetch_snapshot(&self) -> Result<RawSnapshot, FetchError> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.snapshots.lock().unwrap().pop_front();
        let result = match next {
            Some(result) => {
                *self.last.lock().unwrap() = Some(result.clone());
                result
            }
            None => self
                .last
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("no snapshot scripted".to_string())),
        };
        result.map_err(FetchError::decode)
    }

    async fn fetch_counter(&self, counter: CounterName) -> Result<f64, FetchError> {
        match self.counters.lock().unwrap().get(&counter) {
            Some(Ok(value)) => Ok(*value),
            Some(Err(reason)) => Err(FetchError::decode(reason.clone())),
            None => Err(FetchError::decode("counter not scripted")),
        }
    }
}

#[async_trait]
impl CacheOperations for ScriptedClient {
    async fn set(&self, _request: &SetRequest) -> Result<OperationResponse, FetchError> {
        self.operation_result()
    }

    async fn get(&self, _namespace: &str, _key: &str) -> Result<OperationResponse, FetchError> {
        self.operation_result()
    }

    async fn delete(&self, _namespace: &str, _key: &str) -> Result<OperationResponse, FetchError> {
        self.operation_result()
    }
}

/// 回放预设响应的 HTTP 服务，按请求顺序使用预设
pub struct StubServer {
    pub base_url: String,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct StubState {
    responses: Mutex<VecDeque<(u16, &'static str)>>,
    requests: Mutex<Vec<String>>,
}

impl StubServer {
    /// `responses` 为 `(状态码, 响应体)`；预设用完后返回 500
    pub async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let state = Arc::new(StubState {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(replay).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            handle,
        }
    }

    /// 已收到的请求：`METHOD path`，若有请求体则以换行追加
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn replay(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    body: String,
) -> impl IntoResponse {
    let line = format!("{} {}", method, uri.path());
    state.requests.lock().unwrap().push(if body.is_empty() {
        line
    } else {
        format!("{}\n{}", line, body)
    });

    let (status, body) = state
        .responses
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((500, r#"{"message":"no response preset"}"#));
    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}
