//! Configuration file integration tests

use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use udx3::Udx3ConfigManager;
use udx3::utils::toml_config::{LogFormat, StoreBackend};

const BASE_CONFIG: &str = r#"
[server]
port = 4100
log_format = "json"

[gemini]
api_key_env = "UDX3_CONFIG_IT_KEY"
model = "gemini-pro"

[gemini.retry]
max_attempts = 1

[database]
backend = "memory"
"#;

#[test]
fn test_manager_loads_file_and_defaults_missing_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("udx3.toml");
    fs::write(&path, BASE_CONFIG).unwrap();

    let manager = Udx3ConfigManager::new(&path).unwrap();
    let config = manager.config();

    assert_eq!(config.server.port, 4100);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.log_format, LogFormat::Json);
    assert_eq!(config.database.backend, StoreBackend::Memory);
    assert_eq!(
        config.gemini.base_url,
        "https://generativelanguage.googleapis.com"
    );
    assert!((config.gemini.generation.temperature - 0.7).abs() < f32::EPSILON);
}

#[test]
fn test_invalid_file_is_an_error_not_a_fallback() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("udx3.toml");
    fs::write(&path, "[gemini.retry]\nmax_attempts = 0\n").unwrap();

    assert!(Udx3ConfigManager::load_or_default(&path).is_err());
}

#[tokio::test]
async fn test_hot_reload_picks_up_edits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("udx3.toml");
    fs::write(&path, BASE_CONFIG).unwrap();

    let manager = Udx3ConfigManager::new(&path).unwrap();
    manager.start_watching().unwrap();

    fs::write(&path, BASE_CONFIG.replace("max_attempts = 1", "max_attempts = 3")).unwrap();

    let mut reloaded = false;
    for _ in 0..50 {
        if manager.config().gemini.retry.max_attempts == 3 {
            reloaded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    manager.stop_watching();

    assert!(reloaded, "watcher did not reload the edited file");
}
