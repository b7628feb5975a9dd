//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum_test::TestServer;
use std::sync::Arc;
use udx3::{
    AppState, Udx3Config, Udx3ConfigManager,
    api::routes::app,
    db::{DashboardStore, MemoryStore},
    utils::toml_config::RetryConfig,
};

pub const GEMINI_PATH: &str = "/v1beta/models/gemini-pro:generateContent";

/// Config pointing the Gemini client at `base_url`, with the key read from `key_env`.
pub fn test_config(base_url: &str, key_env: &str) -> Udx3Config {
    let mut config = Udx3Config::default();
    config.gemini.base_url = base_url.to_string();
    config.gemini.api_key_env = key_env.to_string();
    config.gemini.request_timeout_secs = 5;
    config
}

/// Retry policy with millisecond backoff so tests stay fast.
pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        jitter_factor: 0.0,
        ..Default::default()
    }
}

/// Set a test-only env var. Each test uses its own variable name.
pub fn set_env(name: &str, value: &str) {
    unsafe {
        std::env::set_var(name, value);
    }
}

pub fn test_server_with_store(config: Udx3Config, store: Arc<dyn DashboardStore>) -> TestServer {
    let manager = Arc::new(Udx3ConfigManager::from_config(config));
    let state = AppState::new(manager, store).unwrap();
    TestServer::new(app(state)).unwrap()
}

pub fn test_server(config: Udx3Config) -> TestServer {
    test_server_with_store(config, Arc::new(MemoryStore::new()))
}

/// Gemini reply carrying a single text candidate.
pub fn gemini_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": text }],
                "role": "model"
            },
            "finishReason": "STOP",
            "index": 0
        }]
    })
}
