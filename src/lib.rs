//! # UDX3 Server
//!
//! Backend for the UDX3 work-management platform: a Gemini chat proxy plus
//! the JSON API behind the projects, tasks, team and notes dashboards.
//!
//! ## Library Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use udx3::{AppState, Udx3ConfigManager, api::routes::app, db::DatabaseProvider};
//!
//! let config_manager = Arc::new(Udx3ConfigManager::load_or_default("udx3.toml")?);
//! let config = config_manager.config();
//! let store = DatabaseProvider::from_config(&config.database).create_store().await?;
//!
//! let state = AppState::new(config_manager, store.into())?;
//! let router = app(state);
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Axum routes, handlers and CORS middleware
//! - [`db`] - Dashboard repository with memory and SQLite backends
//! - [`llm`] - Gemini client, retry policy and the `LLMClient` trait
//! - [`types`] - Request/response types and the error taxonomy
//! - [`utils`] - TOML configuration with hot reload, logging setup
//! - [`cli`] - Command-line interface for the `udx3-server` binary

/// HTTP API handlers and routes.
pub mod api;
/// Command-line interface.
pub mod cli;
/// Dashboard persistence.
pub mod db;
/// Upstream LLM client.
pub mod llm;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration and logging utilities.
pub mod utils;

pub use db::{DashboardStore, DatabaseProvider};
pub use llm::{GeminiClient, LLMClient};
pub use types::{AppError, Result};
pub use utils::toml_config::{Udx3Config, Udx3ConfigManager};

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// TOML configuration with hot-reload support
    pub config_manager: Arc<Udx3ConfigManager>,
    /// Connection pool for upstream calls
    pub http: reqwest::Client,
    /// Dashboard repository
    pub store: Arc<dyn DashboardStore>,
}

impl AppState {
    pub fn new(
        config_manager: Arc<Udx3ConfigManager>,
        store: Arc<dyn DashboardStore>,
    ) -> Result<Self> {
        let http = GeminiClient::http_client(&config_manager.config().gemini)?;
        Ok(Self {
            config_manager,
            http,
            store,
        })
    }
}
