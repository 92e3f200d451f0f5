//! # Mock Implementations
//!
//! 可验证的 Mock 实现，用于单元测试中的依赖隔离。
//!
//! ## 核心特性
//!
//! - **调用追踪**: 自动记录所有方法调用
//! - **行为配置**: 预设返回值或错误
//! - **挂起控制**: 可让 `fetch_snapshot` 停在半途，模拟慢请求
//!
//! ## 使用模式
//!
//! ```rust,no_run
//! # use cacheforge_core::test::mocks::MockCacheClient;
//! # use cacheforge_types::RawSnapshot;
//! let mock = MockCacheClient::new();
//! mock.preset_snapshot(RawSnapshot::default());
//! mock.hold_snapshots();
//! // ... 发起刷新，此时状态为 Refreshing ...
//! mock.release_snapshot();
//! mock.tracker().assert_call_count("fetch_snapshot", 1);
//! ```

mod cache_client;

pub use cache_client::MockCacheClient;

use std::sync::{Arc, Mutex};

/// 调用记录
#[derive(Debug, Clone)]
pub struct CallRecord {
    /// 方法名
    pub method: String,
    /// 参数列表
    pub args: Vec<String>,
    /// 调用时间
    pub timestamp: std::time::Instant,
}

impl CallRecord {
    pub fn new(method: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            method: method.into(),
            args,
            timestamp: std::time::Instant::now(),
        }
    }
}

/// Mock 调用追踪器
#[derive(Debug, Default, Clone)]
pub struct MockCallTracker {
    calls: Arc<Mutex<Vec<CallRecord>>>,
}

impl MockCallTracker {
    /// 创建新的追踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录调用
    pub fn record(&self, method: impl Into<String>, args: Vec<String>) {
        self.calls.lock().unwrap().push(CallRecord::new(method, args));
    }

    /// 获取所有调用记录
    pub fn get_calls(&self) -> Vec<CallRecord> {
        self.calls.lock().unwrap().clone()
    }

    /// 获取指定方法的调用记录
    pub fn get_calls_for(&self, method: &str) -> Vec<CallRecord> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// 获取调用次数
    pub fn call_count(&self, method: &str) -> usize {
        self.get_calls_for(method).len()
    }

    /// 断言：方法被调用指定次数
    pub fn assert_call_count(&self, method: &str, expected: usize) {
        let actual = self.call_count(method);
        assert_eq!(
            actual, expected,
            "Expected method '{}' to be called {} times, but was called {} times",
            method, expected, actual
        );
    }

    /// 断言：方法从未被调用
    pub fn assert_not_called(&self, method: &str) {
        self.assert_call_count(method, 0);
    }

    /// 断言：最后一次调用的参数
    pub fn assert_last_call_args(&self, method: &str, expected_args: Vec<&str>) {
        let calls = self.get_calls_for(method);
        let last_call = calls
            .last()
            .unwrap_or_else(|| panic!("Expected method '{}' to have been called", method));

        let expected: Vec<String> = expected_args.iter().map(|s| s.to_string()).collect();
        assert_eq!(
            last_call.args, expected,
            "Method '{}' was called with unexpected arguments",
            method
        );
    }

    /// 清空调用记录
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_records_calls() {
        let tracker = MockCallTracker::new();
        tracker.record("get", vec!["ns".to_string(), "k".to_string()]);
        tracker.record("fetch_snapshot", vec![]);

        assert_eq!(tracker.get_calls().len(), 2);
        tracker.assert_call_count("get", 1);
        tracker.assert_last_call_args("get", vec!["ns", "k"]);

        tracker.clear();
        tracker.assert_not_called("get");
    }
}
