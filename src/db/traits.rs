//! Dashboard repository abstraction
//!
//! Handlers depend on [`DashboardStore`] rather than on a concrete backend,
//! so the same routes run against the in-memory store in tests and against
//! SQLite in production.
//!
//! # Example
//!
//! ```rust,ignore
//! use udx3::db::{DatabaseProvider, DashboardStore};
//!
//! let store = DatabaseProvider::Memory.create_store().await?;
//! let tasks = store.list_tasks(&Default::default()).await?;
//! ```

use crate::types::{
    AppError, NewProject, NewTask, NewTeamMember, Note, NoteInput, Project, Result, Task,
    TaskFilter, TaskStatus, TaskUpdate, TeamMember, TeamSummary,
};
use crate::utils::toml_config::{DatabaseConfig, StoreBackend};
use async_trait::async_trait;

/// Repository for everything the dashboard displays.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    // Projects
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn get_project(&self, id: &str) -> Result<Project>;
    async fn create_project(&self, project: NewProject) -> Result<Project>;
    async fn delete_project(&self, id: &str) -> Result<()>;

    // Tasks
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>>;
    async fn get_task(&self, id: &str) -> Result<Task>;
    async fn create_task(&self, task: NewTask) -> Result<Task>;
    async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task>;
    async fn delete_task(&self, id: &str) -> Result<()>;

    /// Move a task to another kanban column
    async fn set_task_status(&self, id: &str, status: TaskStatus) -> Result<Task> {
        self.update_task(
            id,
            TaskUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    // Team
    async fn list_team_members(&self) -> Result<Vec<TeamMember>>;
    async fn add_team_member(&self, member: NewTeamMember) -> Result<TeamMember>;
    async fn remove_team_member(&self, id: &str) -> Result<()>;

    async fn team_summary(&self) -> Result<TeamSummary> {
        let members = self.list_team_members().await?;
        Ok(TeamSummary::from_members(&members))
    }

    // Notes
    /// Notes newest first, optionally filtered by a case-insensitive substring
    async fn list_notes(&self, query: Option<&str>) -> Result<Vec<Note>>;
    async fn get_note(&self, id: &str) -> Result<Note>;
    async fn create_note(&self, note: NoteInput) -> Result<Note>;
    async fn update_note(&self, id: &str, note: NoteInput) -> Result<Note>;
    async fn delete_note(&self, id: &str) -> Result<()>;

    /// True when the store holds no projects, tasks or team members
    async fn is_empty(&self) -> Result<bool>;
}

/// Database provider configuration
#[derive(Debug, Clone, Default)]
pub enum DatabaseProvider {
    /// In-process store (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database via libsql
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
}

impl DatabaseProvider {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        match config.backend {
            StoreBackend::Memory => DatabaseProvider::Memory,
            StoreBackend::Sqlite => DatabaseProvider::SQLite {
                path: config.path.clone(),
            },
        }
    }

    /// Create a store for this provider configuration
    pub async fn create_store(&self) -> Result<Box<dyn DashboardStore>> {
        match self {
            DatabaseProvider::Memory => Ok(Box::new(super::memory::MemoryStore::new())),
            DatabaseProvider::SQLite { path } => {
                if let Some(parent) = std::path::Path::new(path).parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::Database(format!(
                            "Failed to create database directory {:?}: {}",
                            parent, e
                        ))
                    })?;
                }
                let store = super::sqlite::SqliteStore::new_local(path).await?;
                Ok(Box::new(store))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DatabaseProvider::Memory => "memory",
            DatabaseProvider::SQLite { .. } => "sqlite",
        }
    }
}
