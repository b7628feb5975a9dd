//! CLI module for the udx3-server binary
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use crate::utils::toml_config::{Udx3Config, Udx3ConfigManager};
use clap::{Parser, Subcommand};
use output::Output;
use std::path::{Path, PathBuf};

/// UDX3 - work management server with a Gemini chat proxy
#[derive(Parser, Debug)]
#[command(
    name = "udx3-server",
    version,
    about = "UDX3 - work management server with a Gemini chat proxy",
    long_about = "Serves the UDX3 dashboard API and relays chat prompts to Gemini.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a config.",
    after_help = "EXAMPLES:\n    \
                  udx3-server init              # Write udx3.toml and .env.example\n    \
                  udx3-server                   # Start the server\n    \
                  udx3-server config --validate # Check udx3.toml\n    \
                  udx3-server --config my.toml  # Use a custom config file"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "udx3.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write udx3.toml, .env.example and a data/ directory
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Print the full resolved configuration as TOML
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn output(&self) -> Output {
        Output::new(!self.no_color)
    }
}

/// Run `config`; returns false when validation fails.
pub fn show_config(path: &Path, full: bool, validate: bool, output: &Output) -> bool {
    output.section("Configuration");
    output.field("file", &path.display().to_string());

    let manager = match Udx3ConfigManager::load_or_default(path) {
        Ok(manager) => manager,
        Err(e) => {
            output.error(&e.to_string());
            return false;
        }
    };
    let config = manager.config();

    if !path.exists() {
        output.warning("File not found; showing defaults");
    }

    summarize(&config, output);

    if validate {
        match config.validate_with_warnings() {
            Ok(warnings) => {
                output.success("Configuration is valid");
                for warning in &warnings {
                    output.config_warning(warning);
                }
            }
            Err(e) => {
                output.error(&e.to_string());
                return false;
            }
        }
    }

    if full {
        match toml::to_string_pretty(config.as_ref()) {
            Ok(text) => println!("\n{}", text),
            Err(e) => output.error(&format!("Failed to render configuration: {}", e)),
        }
    }

    true
}

fn summarize(config: &Udx3Config, output: &Output) {
    output.field("listen", &config.bind_address());
    output.field("model", &config.gemini.model);
    output.field("api key env", &config.gemini.api_key_env);
    output.field(
        "api key set",
        if config.gemini_api_key().is_some() {
            "yes"
        } else {
            "no"
        },
    );
    output.field("retry attempts", &config.gemini.retry.max_attempts.to_string());
    output.field("store", &format!("{:?}", config.database.backend).to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_init_subcommand() {
        let cli = Cli::parse_from(["udx3-server", "init", "demo", "--port", "8080", "--force"]);
        match cli.command {
            Some(Commands::Init {
                path, force, port, ..
            }) => {
                assert_eq!(path, PathBuf::from("demo"));
                assert!(force);
                assert_eq!(port, 8080);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.config, PathBuf::from("udx3.toml"));
    }

    #[test]
    fn test_show_config_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("udx3.toml");
        std::fs::write(&path, "[gemini.generation]\ntemperature = 5.0\n").unwrap();

        assert!(!show_config(&path, false, true, &Output::new(false)));
    }

    #[test]
    fn test_show_config_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");

        assert!(show_config(&path, true, true, &Output::new(false)));
    }
}
