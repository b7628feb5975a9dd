//! Init command implementation
//!
//! Scaffolds `udx3.toml`, `.env.example` and a `data/` directory for a new
//! UDX3 server deployment.

use super::output::{FileAction, Output};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (udx3.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.section("Initializing UDX3 server");

    let base_path = &config.path;

    let config_path = base_path.join("udx3.toml");
    if config_path.exists() && !config.force {
        output.warning("udx3.toml already exists; rerun with --force to overwrite");
        return InitResult::AlreadyExists;
    }

    let data_dir = base_path.join("data");
    if data_dir.exists() {
        output.file(&data_dir, FileAction::Kept);
    } else {
        if let Err(e) = fs::create_dir_all(&data_dir) {
            output.error(&format!("Failed to create {}: {}", data_dir.display(), e));
            return InitResult::Error(e.to_string());
        }
        output.file(&data_dir, FileAction::Created);
    }

    let toml_content = generate_udx3_toml(&config);
    if let Err(e) = write_file(&config_path, &toml_content, config.force) {
        output.error(&format!("Failed to create udx3.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.file(&config_path, FileAction::Created);

    let env_example_path = base_path.join(".env.example");
    let env_existed = env_example_path.exists() && !config.force;
    if let Err(e) = write_file(&env_example_path, generate_env_example(), config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.file(
        &env_example_path,
        if env_existed {
            FileAction::Kept
        } else {
            FileAction::Created
        },
    );

    output.section("Next steps");
    output.step(1, "Add your Gemini API key", Some("cp .env.example .env"));
    output.step(2, "Start the server", Some("udx3-server"));
    output.info(&format!(
        "Chat endpoint: http://{}:{}/api/chat",
        config.host, config.port
    ));

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_udx3_toml(config: &InitConfig) -> String {
    format!(
        r#"# UDX3 server configuration

[server]
host = "{host}"
port = {port}
log_level = "info"
# "pretty" or "json"
log_format = "pretty"
body_limit_bytes = 65536

[gemini]
# Name of the environment variable holding the API key (never the key itself)
api_key_env = "GEMINI_API_KEY"
base_url = "https://generativelanguage.googleapis.com"
model = "gemini-pro"
request_timeout_secs = 30

[gemini.generation]
temperature = 0.7
topK = 40
topP = 0.95
maxOutputTokens = 1024

# max_attempts = 1 sends each chat request upstream exactly once
[gemini.retry]
max_attempts = 1
initial_backoff_ms = 250
max_backoff_ms = 4000
backoff_multiplier = 2.0
jitter_factor = 0.2
budget_ms = 10000

[database]
# "memory" or "sqlite"
backend = "sqlite"
path = "./data/udx3.db"
seed_sample_data = true
"#,
        host = config.host,
        port = config.port
    )
}

fn generate_env_example() -> &'static str {
    r#"# UDX3 environment variables
# Copy this file to .env and fill in the values.

# REQUIRED: Gemini API key used by the chat proxy
GEMINI_API_KEY=your-gemini-api-key

# Optional: overrides [server] log_level
RUST_LOG=info,udx3=debug
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::{StoreBackend, Udx3Config};
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir, force: bool) -> InitConfig {
        InitConfig {
            path: temp_dir.path().to_path_buf(),
            force,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }

    #[test]
    fn test_generated_toml_parses_and_validates() {
        let temp_dir = TempDir::new().unwrap();
        let content = generate_udx3_toml(&test_config(&temp_dir, false));

        let config: Udx3Config = toml::from_str(&content).unwrap();
        config.validate().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.gemini.generation.top_k, 40);
        assert_eq!(config.gemini.retry.max_attempts, 1);
        assert_eq!(config.database.backend, StoreBackend::Sqlite);
    }

    #[test]
    fn test_env_example_names_gemini_key() {
        assert!(generate_env_example().contains("GEMINI_API_KEY="));
    }

    #[test]
    fn test_write_file_skips_existing_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "original").unwrap();

        write_file(&file_path, "new content", false).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "original");

        write_file(&file_path, "new content", true).unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_run_creates_all_files() {
        let temp_dir = TempDir::new().unwrap();
        let result = run(test_config(&temp_dir, false), &Output::new(false));

        assert!(matches!(result, InitResult::Success));
        assert!(temp_dir.path().join("udx3.toml").exists());
        assert!(temp_dir.path().join(".env.example").exists());
        assert!(temp_dir.path().join("data").is_dir());
    }

    #[test]
    fn test_run_already_exists_without_force() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("udx3.toml"), "existing").unwrap();

        let result = run(test_config(&temp_dir, false), &Output::new(false));
        assert!(matches!(result, InitResult::AlreadyExists));

        let result = run(test_config(&temp_dir, true), &Output::new(false));
        assert!(matches!(result, InitResult::Success));
        let content = fs::read_to_string(temp_dir.path().join("udx3.toml")).unwrap();
        assert!(content.contains("[gemini]"));
    }
}
