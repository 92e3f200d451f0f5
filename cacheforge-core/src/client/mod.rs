//! # Cache Service Client
//!
//! 缓存服务的抽象接口。
//!
//! - [`SnapshotClient`]: 只读，拉取结构快照和单个计数器
//! - [`CacheOperations`]: 单点 set/get/del
//!
//! 本层不做重试，失败直接以 [`FetchError`] 返回，由调用方决定如何处理。

mod http;

pub use http::HttpCacheClient;

use async_trait::async_trait;
use cacheforge_types::{CounterName, MetricResponse, OperationResponse, RawSnapshot, SetRequest};

use crate::error::FetchError;

/// 结构快照与指标的只读来源
#[async_trait]
pub trait SnapshotClient: Send + Sync {
    /// `GET /api/cache/state`
    async fn fetch_snapshot(&self) -> Result<RawSnapshot, FetchError>;

    /// 读取一个计数器的当前值，已按 [`select_measurement`] 取样
    async fn fetch_counter(&self, counter: CounterName) -> Result<f64, FetchError>;
}

/// 单点写操作
#[async_trait]
pub trait CacheOperations: Send + Sync {
    /// `POST /api/cache/set`
    async fn set(&self, request: &SetRequest) -> Result<OperationResponse, FetchError>;

    /// `GET /api/cache/get/{namespace}/{key}`
    async fn get(&self, namespace: &str, key: &str) -> Result<OperationResponse, FetchError>;

    /// `DELETE /api/cache/del/{namespace}/{key}`
    async fn delete(&self, namespace: &str, key: &str) -> Result<OperationResponse, FetchError>;
}

/// 从计数器响应中取出该计数器对应的样本
///
/// 延迟计数器读第 3 个样本（下标 2），其余读第 1 个。
pub fn select_measurement(response: &MetricResponse, counter: CounterName) -> Result<f64, FetchError> {
    let index = counter.measurement_index();
    let measurement = response
        .measurements
        .get(index)
        .ok_or(FetchError::MissingMeasurement { counter, index })?;

    if !measurement.value.is_finite() {
        return Err(FetchError::InvalidMeasurement {
            counter,
            value: measurement.value,
        });
    }
    Ok(measurement.value)
}
