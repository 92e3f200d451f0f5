//! # CLI Integration Tests
//!
//! 只覆盖不需要缓存服务在线的路径。

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// 加载器读取的环境变量覆盖
const ENV_OVERRIDES: [&str; 6] = [
    "CACHEFORGE_BASE_URL",
    "CACHEFORGE_TIMEOUT_SECS",
    "CACHEFORGE_REFRESH_INTERVAL_SECS",
    "CACHEFORGE_REFRESH_REPEAT",
    "CACHEFORGE_METRICS_INTERVAL_SECS",
    "CACHEFORGE_METRICS_FAILURE_POLICY",
];

/// 指向不存在的配置文件并清除环境覆盖，避免读到本机配置
fn isolated(mut cmd: Command) -> Command {
    cmd.env("CACHEFORGE_CONFIG", "/nonexistent/cacheforge-test.toml")
        .env_remove("RUST_LOG");
    for name in ENV_OVERRIDES {
        cmd.env_remove(name);
    }
    cmd
}

fn cacheforge() -> Command {
    isolated(Command::cargo_bin("cacheforge").unwrap())
}

#[test]
fn test_help_lists_subcommands() {
    cacheforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("state"))
        .stdout(predicate::str::contains("metrics"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn test_set_with_empty_namespace_fails_without_network() {
    // Unroutable base URL: reaching the network would fail differently.
    cacheforge()
        .args(["--base-url", "http://127.0.0.1:9", "set", "", "k", "v", "--ttl", "60"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Namespace, key and value required for SET",
        ));
}

#[test]
fn test_get_with_blank_key_fails() {
    cacheforge()
        .args(["get", "ns", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Namespace and key required for GET"));
}

#[test]
fn test_invalid_ttl_fails() {
    cacheforge()
        .args(["set", "ns", "k", "v", "--ttl", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TTL must be -1 or > 0"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[refresh]\ninterval_secs = 0\n").unwrap();

    cacheforge()
        .env("CACHEFORGE_CONFIG", file.path())
        .arg("state")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_inherited_overrides_are_cleared() {
    let mut cmd = Command::cargo_bin("cacheforge").unwrap();
    cmd.env("CACHEFORGE_REFRESH_INTERVAL_SECS", "0")
        .env("CACHEFORGE_BASE_URL", "cache:8080");

    // Either override alone would fail config loading.
    isolated(cmd)
        .args(["get", "ns", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Namespace and key required for GET"))
        .stderr(predicate::str::contains("Failed to load configuration").not());
}

#[test]
fn test_unreachable_service_fails_state() {
    cacheforge()
        .args(["--base-url", "http://127.0.0.1:9", "state"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sync failed"));
}
