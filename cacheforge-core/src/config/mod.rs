//! # 监控配置
//!
//! 监控层的全部可调参数。所有字段都有默认值，配置文件只需写需要覆盖的部分。
//!
//! ```toml
//! [endpoint]
//! base_url = "http://localhost:8080"
//! timeout_secs = 10
//!
//! [refresh]
//! interval_secs = 50
//! repeat = true
//! sync_on_start = true
//!
//! [metrics]
//! interval_secs = 5
//! failure_policy = "zero"
//!
//! [activity_log]
//! capacity = 100
//! ```

mod loader;

pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// 监控总配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub endpoint: EndpointConfig,
    pub refresh: RefreshConfig,
    pub metrics: MetricsConfig,
    pub activity_log: ActivityLogConfig,
}

/// 缓存服务地址
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// 服务根地址，不含 `/api`
    pub base_url: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

impl EndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 结构快照刷新
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// 周期刷新间隔（秒）
    pub interval_secs: u64,
    /// false 时周期刷新只触发一次
    pub repeat: bool,
    /// 启动时立即强制刷新一次
    pub sync_on_start: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 50,
            repeat: true,
            sync_on_start: true,
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// 单个计数器拉取失败时该字段取什么值
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// 本轮取 0
    #[default]
    Zero,
    /// 保留上一次发布的值
    LastKnown,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "last_known" | "last-known" => Ok(Self::LastKnown),
            other => Err(format!("unknown failure policy '{}'", other)),
        }
    }
}

/// 指标轮询
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 轮询间隔（秒）
    pub interval_secs: u64,
    pub failure_policy: FailurePolicy,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            failure_policy: FailurePolicy::Zero,
        }
    }
}

impl MetricsConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// 活动日志
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityLogConfig {
    /// 最多保留的条目数
    pub capacity: usize,
}

impl Default for ActivityLogConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

impl MonitorConfig {
    /// 设置服务地址
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.endpoint.base_url = base_url.into();
        self
    }

    /// 设置请求超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.endpoint.timeout_secs = timeout.as_secs();
        self
    }

    /// 设置周期刷新间隔
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh.interval_secs = interval.as_secs();
        self
    }

    /// 设置周期刷新是否重复
    pub fn with_refresh_repeat(mut self, repeat: bool) -> Self {
        self.refresh.repeat = repeat;
        self
    }

    /// 设置启动时是否同步
    pub fn with_sync_on_start(mut self, sync: bool) -> Self {
        self.refresh.sync_on_start = sync;
        self
    }

    /// 设置指标轮询间隔
    pub fn with_metrics_interval(mut self, interval: Duration) -> Self {
        self.metrics.interval_secs = interval.as_secs();
        self
    }

    /// 设置指标失败策略
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.metrics.failure_policy = policy;
        self
    }

    /// 设置日志容量
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.activity_log.capacity = capacity;
        self
    }

    /// 验证配置
    pub fn validate(&self) -> Result<(), String> {
        let base_url = self.endpoint.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(format!(
                "endpoint.base_url must start with http:// or https://, got '{}'",
                self.endpoint.base_url
            ));
        }
        if self.endpoint.timeout_secs == 0 {
            return Err("endpoint.timeout_secs must be greater than 0".to_string());
        }
        if self.refresh.interval_secs == 0 {
            return Err("refresh.interval_secs must be greater than 0".to_string());
        }
        if self.metrics.interval_secs == 0 {
            return Err("metrics.interval_secs must be greater than 0".to_string());
        }
        if self.activity_log.capacity == 0 {
            return Err("activity_log.capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}
