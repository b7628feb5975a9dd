//! TOML-based configuration for the UDX3 server
//!
//! Infrastructure settings (listener, logging, storage) and the Gemini
//! upstream settings live in `udx3.toml`. Secrets are never written to the
//! file: the file names the environment variable that holds them.
//!
//! # Hot Reloading
//!
//! Configuration changes are detected and applied at runtime. Handlers read
//! the current snapshot through [`Udx3ConfigManager::config`] on every
//! request, so generation parameters, retry policy and the credential
//! variable name can change without a restart.

use arc_swap::ArcSwap;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Root configuration structure loaded from udx3.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Udx3Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Maximum accepted request body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

// ============= Gemini Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Environment variable containing the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_gemini_base")]
    pub base_url: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Upper bound on a single upstream call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_gemini_base(),
            model: default_gemini_model(),
            request_timeout_secs: default_request_timeout(),
            generation: GenerationConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Sampling parameters sent as `generationConfig` on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// Retry policy for transient upstream failures.
///
/// `max_attempts = 1` (the default) means a single call with no retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f32,
    /// D' = D * (1 + U[-j, +j]) where j is jitter factor
    #[serde(default = "default_jitter_factor")]
    pub jitter_factor: f32,
    /// Total time allowed for all attempts and backoff sleeps
    #[serde(default = "default_budget_ms")]
    pub budget_ms: u64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_initial_backoff_ms() -> u64 {
    250
}

fn default_max_backoff_ms() -> u64 {
    4000
}

fn default_backoff_multiplier() -> f32 {
    2.0
}

fn default_jitter_factor() -> f32 {
    0.2
}

fn default_budget_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter_factor: default_jitter_factor(),
            budget_ms: default_budget_ms(),
        }
    }
}

// ============= Database Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// SQLite file path (sqlite backend only)
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Seed an empty store with the sample dashboard data
    #[serde(default = "default_true")]
    pub seed_sample_data: bool,
}

fn default_database_path() -> String {
    "./data/udx3.db".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_database_path(),
            seed_sample_data: true,
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Configuration warnings that don't prevent operation but may indicate issues
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub kind: ConfigWarningKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarningKind {
    MissingCredential,
    RetryBudgetTooSmall,
}

impl std::fmt::Display for ConfigWarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::MissingCredential => "missing_credential",
            Self::RetryBudgetTooSmall => "retry_budget_too_small",
        })
    }
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Watch error: {0}")]
    WatchError(#[from] notify::Error),
}

impl Udx3Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: Udx3Config = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration for internal consistency
    ///
    /// The Gemini credential is deliberately not required here: a missing
    /// key is reported per request as a configuration error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.api_key_env.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.api_key_env must name an environment variable".to_string(),
            ));
        }

        if !self.gemini.base_url.starts_with("http://")
            && !self.gemini.base_url.starts_with("https://")
        {
            return Err(ConfigError::ValidationError(format!(
                "gemini.base_url must be an http(s) URL, got '{}'",
                self.gemini.base_url
            )));
        }

        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.model must not be empty".to_string(),
            ));
        }

        if self.gemini.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "gemini.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        let generation = &self.gemini.generation;
        if !(0.0..=2.0).contains(&generation.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "gemini.generation.temperature must be within 0.0..=2.0, got {}",
                generation.temperature
            )));
        }
        if !(0.0..=1.0).contains(&generation.top_p) {
            return Err(ConfigError::ValidationError(format!(
                "gemini.generation.topP must be within 0.0..=1.0, got {}",
                generation.top_p
            )));
        }
        if generation.top_k == 0 || generation.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "gemini.generation.topK and maxOutputTokens must be greater than 0".to_string(),
            ));
        }

        let retry = &self.gemini.retry;
        if retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "gemini.retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::ValidationError(
                "gemini.retry.backoff_multiplier must be at least 1.0".to_string(),
            ));
        }

        if self.database.backend == StoreBackend::Sqlite && self.database.path.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.path is required for the sqlite backend".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate configuration and collect non-fatal warnings
    pub fn validate_with_warnings(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        self.validate()?;

        let mut warnings = Vec::new();

        if self.gemini_api_key().is_none() {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::MissingCredential,
                message: format!(
                    "Environment variable '{}' is not set; chat requests will fail until it is",
                    self.gemini.api_key_env
                ),
            });
        }

        let retry = &self.gemini.retry;
        if retry.max_attempts > 1 && retry.budget_ms < retry.initial_backoff_ms {
            warnings.push(ConfigWarning {
                kind: ConfigWarningKind::RetryBudgetTooSmall,
                message: format!(
                    "gemini.retry.budget_ms ({}) is below initial_backoff_ms ({}); retries will never run",
                    retry.budget_ms, retry.initial_backoff_ms
                ),
            });
        }

        Ok(warnings)
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Resolve the Gemini API key from the environment
    pub fn gemini_api_key(&self) -> Option<String> {
        self.resolve_env(&self.gemini.api_key_env)
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ============= Hot Reloading Configuration Manager =============

/// Thread-safe configuration manager with hot reloading support
pub struct Udx3ConfigManager {
    config: Arc<ArcSwap<Udx3Config>>,
    config_path: PathBuf,
    watcher: RwLock<Option<RecommendedWatcher>>,
}

impl Udx3ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = absolute(path.as_ref())?;
        let config = Udx3Config::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
            watcher: RwLock::new(None),
        })
    }

    /// Load the file if present, otherwise start from defaults
    ///
    /// A present but invalid file is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::new(path.as_ref()) {
            Err(ConfigError::FileNotFound(missing)) => {
                debug!("No configuration at {:?}", missing);
                Ok(Self {
                    config: Arc::new(ArcSwap::from_pointee(Udx3Config::default())),
                    config_path: missing,
                    watcher: RwLock::new(None),
                })
            }
            other => other,
        }
    }

    /// Create a config manager directly from a config (useful for testing)
    /// This won't have file watching capabilities.
    pub fn from_config(config: Udx3Config) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from("udx3.toml"),
            watcher: RwLock::new(None),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<Udx3Config> {
        self.config.load_full()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Manually reload the configuration from disk
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = Udx3Config::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Start watching for configuration file changes
    pub fn start_watching(&self) -> Result<(), ConfigError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();

        let config_path = self.config_path.clone();
        let config_arc = Arc::clone(&self.config);
        let file_name = config_path.file_name().map(|n| n.to_os_string());

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    let touches_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if touches_config && (event.kind.is_modify() || event.kind.is_create()) {
                        let _ = tx.send(());
                    }
                }
                Err(e) => {
                    error!("Config watcher error: {:?}", e);
                }
            }
        })?;

        if let Some(parent) = self.config_path.parent() {
            watcher.watch(parent, RecursiveMode::NonRecursive)?;
        }

        *self.watcher.write() = Some(watcher);

        tokio::spawn(async move {
            let mut last_reload: Option<std::time::Instant> = None;
            let debounce_duration = Duration::from_millis(500);

            while rx.recv().await.is_some() {
                if last_reload.is_some_and(|t| t.elapsed() < debounce_duration) {
                    continue;
                }

                // Let the writer finish before reading
                tokio::time::sleep(Duration::from_millis(100)).await;

                match Udx3Config::load(&config_path) {
                    Ok(new_config) => {
                        config_arc.store(Arc::new(new_config));
                        info!("Configuration hot-reloaded successfully");
                        last_reload = Some(std::time::Instant::now());
                    }
                    Err(e) => {
                        warn!(
                            "Failed to hot-reload config: {}. Keeping previous config.",
                            e
                        );
                    }
                }
            }
        });

        info!("Configuration hot-reload watcher started");
        Ok(())
    }

    /// Stop watching for configuration changes
    pub fn stop_watching(&self) {
        *self.watcher.write() = None;
        info!("Configuration hot-reload watcher stopped");
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .map_err(ConfigError::ReadError)?
            .join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_config() -> String {
        r#"
[server]
host = "0.0.0.0"
port = 8080
log_format = "json"

[gemini]
api_key_env = "UDX3_CONFIG_TEST_KEY"
model = "gemini-1.5-flash"
request_timeout_secs = 10

[gemini.generation]
temperature = 0.2
topK = 20

[gemini.retry]
max_attempts = 3

[database]
backend = "sqlite"
path = "./data/test.db"
"#
        .to_string()
    }

    #[test]
    fn test_parse_config() {
        let config: Udx3Config = toml::from_str(&create_test_config()).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_format, LogFormat::Json);
        assert_eq!(config.gemini.api_key_env, "UDX3_CONFIG_TEST_KEY");
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.gemini.generation.temperature, 0.2);
        assert_eq!(config.gemini.generation.top_k, 20);
        // Unspecified generation fields keep their defaults
        assert_eq!(config.gemini.generation.top_p, 0.95);
        assert_eq!(config.gemini.generation.max_output_tokens, 1024);
        assert_eq!(config.gemini.retry.max_attempts, 3);
        assert_eq!(config.gemini.retry.initial_backoff_ms, 250);
        assert_eq!(config.database.backend, StoreBackend::Sqlite);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config: Udx3Config = toml::from_str("").unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com"
        );
        assert_eq!(config.gemini.model, "gemini-pro");
        assert_eq!(config.gemini.generation, GenerationConfig::default());
        assert_eq!(config.gemini.retry.max_attempts, 1);
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert!(config.database.seed_sample_data);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_generation_config_serializes_camel_case() {
        let value = serde_json::to_value(GenerationConfig::default()).unwrap();
        assert_eq!(value["topK"], 40);
        assert_eq!(value["maxOutputTokens"], 1024);
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((value["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_validation_rejects_out_of_range_temperature() {
        let mut config = Udx3Config::default();
        config.gemini.generation.temperature = 3.5;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let mut config = Udx3Config::default();
        config.gemini.retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_base_url() {
        let mut config = Udx3Config::default();
        config.gemini.base_url = "generativelanguage.googleapis.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credential_is_a_warning() {
        let mut config = Udx3Config::default();
        config.gemini.api_key_env = "UDX3_CONFIG_TEST_UNSET_KEY".to_string();

        let warnings = config.validate_with_warnings().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, ConfigWarningKind::MissingCredential);
        assert_eq!(warnings[0].kind.to_string(), "missing_credential");
        assert!(config.gemini_api_key().is_none());
    }

    #[test]
    fn test_retry_budget_warning_kind_displays_snake_case() {
        let mut config = Udx3Config::default();
        config.gemini.api_key_env = "UDX3_CONFIG_TEST_UNSET_KEY".to_string();
        config.gemini.retry.max_attempts = 3;
        config.gemini.retry.budget_ms = 10;
        config.gemini.retry.initial_backoff_ms = 250;

        let kinds: Vec<String> = config
            .validate_with_warnings()
            .unwrap()
            .iter()
            .map(|w| w.kind.to_string())
            .collect();
        assert_eq!(kinds, vec!["missing_credential", "retry_budget_too_small"]);
    }

    #[test]
    fn test_api_key_resolved_from_env() {
        // SAFETY: unique variable name, not read by any other test
        unsafe {
            std::env::set_var("UDX3_CONFIG_TEST_PRESENT_KEY", "secret");
        }
        let mut config = Udx3Config::default();
        config.gemini.api_key_env = "UDX3_CONFIG_TEST_PRESENT_KEY".to_string();

        assert_eq!(config.gemini_api_key().as_deref(), Some("secret"));
        assert!(config.validate_with_warnings().unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Udx3Config::load("/nonexistent/udx3.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("udx3.toml");
        let manager = Udx3ConfigManager::load_or_default(&missing).unwrap();
        assert_eq!(manager.config().server.port, 3000);
        assert!(manager.config_path().ends_with("udx3.toml"));
        assert!(!manager.config_path().exists());
    }

    #[test]
    fn test_manager_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("udx3.toml");
        fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let manager = Udx3ConfigManager::new(&path).unwrap();
        assert_eq!(manager.config().server.port, 4000);

        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[server]\nport = 4001").unwrap();
        drop(file);

        manager.reload().unwrap();
        assert_eq!(manager.config().server.port, 4001);
    }

    #[test]
    fn test_manager_reload_keeps_previous_on_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("udx3.toml");
        fs::write(&path, "[server]\nport = 4000\n").unwrap();
        let manager = Udx3ConfigManager::new(&path).unwrap();

        fs::write(&path, "[gemini.retry]\nmax_attempts = 0\n").unwrap();
        assert!(manager.reload().is_err());
        assert_eq!(manager.config().server.port, 4000);
    }

    #[test]
    fn test_config_manager_from_config() {
        let mut config = Udx3Config::default();
        config.server.port = 9999;
        let manager = Udx3ConfigManager::from_config(config);
        assert_eq!(manager.config().server.port, 9999);
    }
}
