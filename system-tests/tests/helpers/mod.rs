// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared fixtures and guards for blobcheck system-tests.
// Purpose: Start services once per test and bound every test in time.
// Dependencies: system-tests, tokio
// ============================================================================

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod infra;

use std::future::Future;

use system_tests::config::SystemTestConfig;

/// Loads the environment configuration or fails the test.
pub fn load_config() -> SystemTestConfig {
    match SystemTestConfig::load() {
        Ok(config) => config,
        Err(err) => panic!("invalid system-test environment: {err}"),
    }
}

/// Runs `body` under the configured timeout.
pub async fn with_timeout<T>(config: &SystemTestConfig, body: impl Future<Output = T>) -> T {
    match tokio::time::timeout(config.timeout(), body).await {
        Ok(value) => value,
        Err(_) => panic!("system test exceeded {:?}", config.timeout()),
    }
}
