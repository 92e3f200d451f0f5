//! # Cache Operation Gateway
//!
//! 单点 set/get/del 操作的入口。
//!
//! ## 流程
//!
//! 1. 校验输入（去除首尾空白后不能为空，TTL 为 -1 或正数）
//! 2. 校验失败：写日志并返回 [`ValidationError`]，不发请求
//! 3. 请求成功：写日志 `"<OP> [<ns>:<key>] -> <HIT|OK/MISS>"`，等待一次强制刷新完成
//! 4. 请求失败：写日志 `"Operation Failed: <OP> (<原因>)"`，返回 [`OperationStatus::Failed`]
//!
//! 网络错误不会越过本组件向上抛出。

use std::fmt;
use std::sync::Arc;

use cacheforge_types::{OperationResponse, SetRequest, NO_EXPIRY};
use serde::Serialize;
use tracing::debug;

use crate::activity_log::ActivityLog;
use crate::client::CacheOperations;
use crate::error::{FetchError, ValidationError};
use crate::scheduler::RefreshScheduler;

/// 操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    #[serde(rename = "SET")]
    Set,
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "DEL")]
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Set => "SET",
            Operation::Get => "GET",
            Operation::Delete => "DEL",
        })
    }
}

/// 一次成功操作的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub operation: Operation,
    pub namespace: String,
    pub key: String,
    /// 服务端找到了已有条目（DEL 表示确实删除了一条）
    pub hit: bool,
    /// GET 读到的值；SET 返回写入的值；DEL 为空
    pub value: Option<String>,
}

impl OperationOutcome {
    /// 活动日志中的一行
    pub fn log_line(&self) -> String {
        format!(
            "{} [{}:{}] -> {}",
            self.operation,
            self.namespace,
            self.key,
            if self.hit { "HIT" } else { "OK/MISS" }
        )
    }
}

/// 通过校验后的操作状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OperationStatus {
    Completed(OperationOutcome),
    Failed { reason: String },
}

impl OperationStatus {
    pub fn outcome(&self) -> Option<&OperationOutcome> {
        match self {
            OperationStatus::Completed(outcome) => Some(outcome),
            OperationStatus::Failed { .. } => None,
        }
    }
}

/// 单点操作网关
pub struct CacheOperationGateway {
    client: Arc<dyn CacheOperations>,
    scheduler: Arc<RefreshScheduler>,
    log: Arc<ActivityLog>,
}

impl CacheOperationGateway {
    pub fn new(
        client: Arc<dyn CacheOperations>,
        scheduler: Arc<RefreshScheduler>,
        log: Arc<ActivityLog>,
    ) -> Self {
        Self {
            client,
            scheduler,
            log,
        }
    }

    /// 写入一个条目，`ttl` 为 -1 表示永不过期
    pub async fn set(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: i64,
    ) -> Result<OperationStatus, ValidationError> {
        let (namespace, key, value) = match (required(namespace), required(key), required(value)) {
            (Some(ns), Some(k), Some(v)) => (ns, k, v),
            _ => return Err(self.reject(ValidationError::MissingFields { operation: Operation::Set })),
        };
        if ttl != NO_EXPIRY && ttl <= 0 {
            return Err(self.reject(ValidationError::InvalidTtl { ttl }));
        }

        let request = SetRequest {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            ttl,
        };
        let result = self.client.set(&request).await;
        Ok(self.finish(Operation::Set, namespace, key, result).await)
    }

    /// 读取一个条目
    pub async fn get(&self, namespace: &str, key: &str) -> Result<OperationStatus, ValidationError> {
        let (namespace, key) = self.require_pair(Operation::Get, namespace, key)?;
        let result = self.client.get(namespace, key).await;
        Ok(self.finish(Operation::Get, namespace, key, result).await)
    }

    /// 删除一个条目
    pub async fn delete(&self, namespace: &str, key: &str) -> Result<OperationStatus, ValidationError> {
        let (namespace, key) = self.require_pair(Operation::Delete, namespace, key)?;
        let result = self.client.delete(namespace, key).await;
        Ok(self.finish(Operation::Delete, namespace, key, result).await)
    }

    fn require_pair<'a>(
        &self,
        operation: Operation,
        namespace: &'a str,
        key: &'a str,
    ) -> Result<(&'a str, &'a str), ValidationError> {
        match (required(namespace), required(key)) {
            (Some(ns), Some(k)) => Ok((ns, k)),
            _ => Err(self.reject(ValidationError::MissingFields { operation })),
        }
    }

    fn reject(&self, error: ValidationError) -> ValidationError {
        self.log.warn(error.to_string());
        error
    }

    async fn finish(
        &self,
        operation: Operation,
        namespace: &str,
        key: &str,
        result: Result<OperationResponse, FetchError>,
    ) -> OperationStatus {
        match result {
            Ok(response) => {
                let outcome = OperationOutcome {
                    operation,
                    namespace: namespace.to_string(),
                    key: key.to_string(),
                    hit: response.hit,
                    value: response.value().map(str::to_string),
                };
                self.log.append(outcome.log_line());

                let refresh = self.scheduler.request(true).await;
                debug!("Post-{} refresh: {:?}", operation, refresh);
                OperationStatus::Completed(outcome)
            }
            Err(e) => {
                let reason = e.to_string();
                self.log.error(format!("Operation Failed: {} ({})", operation, reason));
                OperationStatus::Failed { reason }
            }
        }
    }
}

/// 去除首尾空白，空串视为缺失
fn required(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
