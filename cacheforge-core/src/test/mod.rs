//! # Test Support
//!
//! 测试用的 Mock 实现，仅在 `cfg(test)` 或 `test-utils` feature 下编译。
//!
//! ```rust,no_run
//! use cacheforge_core::test::mocks::MockCacheClient;
//! use cacheforge_types::CounterName;
//!
//! let client = MockCacheClient::new();
//! client.preset_counter(CounterName::Hits, 5.0);
//! client.tracker().assert_not_called("fetch_snapshot");
//! ```

pub mod mocks;
