use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persona prepended to every prompt when the caller sends no `context`.
pub const DEFAULT_CONTEXT: &str = "You are a helpful AI assistant for a work management platform called UDX3. Help users with their tasks, projects, and productivity questions.";

// ============= Chat Types =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ChatRequest {
    /// The context string to send upstream, falling back to [`DEFAULT_CONTEXT`].
    pub fn context_or_default(&self) -> &str {
        self.context.as_deref().unwrap_or(DEFAULT_CONTEXT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub success: bool,
}

impl ChatResponse {
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            success: true,
        }
    }
}

/// Failure envelope shared by every route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub success: bool,
    pub kind: ErrorKind,
}

// ============= Dashboard Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    OnTrack,
    InProgress,
    AlmostDone,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: String,
    pub status: ProjectStatus,
    pub progress: u8,
    pub due_date: Option<String>,
    pub team: Vec<String>,
    pub tasks_completed: u32,
    pub tasks_total: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_project_kind")]
    pub kind: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub team: Vec<String>,
    #[serde(default)]
    pub tasks_completed: u32,
    #[serde(default)]
    pub tasks_total: u32,
}

fn default_project_kind() -> String {
    "operational".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub assignee: String,
    pub due_date: Option<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    pub project: Option<String>,
    pub estimated_hours: f32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_assignee")]
    pub assignee: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub estimated_hours: f32,
}

fn default_assignee() -> String {
    "me".to_string()
}

/// Partial task update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f32>,
}

impl TaskUpdate {
    /// Apply the present fields onto `task`.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = Some(description);
        }
        if let Some(assignee) = self.assignee {
            task.assignee = assignee;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(project) = self.project {
            task.project = Some(project);
        }
        if let Some(hours) = self.estimated_hours {
            task.estimated_hours = hours;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub project: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|s| task.status == s)
            && self
                .project
                .as_deref()
                .is_none_or(|p| task.project.as_deref() == Some(p))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Active,
    Away,
    Busy,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub status: MemberStatus,
    pub initials: String,
    pub active_tasks: u32,
    pub completed_tasks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeamMember {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    #[serde(default)]
    pub active_tasks: u32,
    #[serde(default)]
    pub completed_tasks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub total_members: usize,
    pub active_now: usize,
    pub active_tasks: u32,
    pub completed_tasks: u32,
}

impl TeamSummary {
    pub fn from_members(members: &[TeamMember]) -> Self {
        Self {
            total_members: members.len(),
            active_now: members
                .iter()
                .filter(|m| m.status == MemberStatus::Active)
                .count(),
            active_tasks: members.iter().map(|m| m.active_tasks).sum(),
            completed_tasks: members.iter().map(|m| m.completed_tasks).sum(),
        }
    }
}

/// Initials shown in avatars: first letter of up to two words, uppercased.
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

// ============= Error Types =============

/// Machine-readable failure category carried in every error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Upstream,
    EmptyResult,
    Unexpected,
    InvalidInput,
    NotFound,
    Database,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Configuration(String),

    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("{0}")]
    EmptyResult(String),

    #[error("{0}")]
    Unexpected(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Configuration(_) => ErrorKind::Configuration,
            AppError::Upstream { .. } => ErrorKind::Upstream,
            AppError::EmptyResult(_) => ErrorKind::EmptyResult,
            AppError::Unexpected(_) => ErrorKind::Unexpected,
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Database(_) => ErrorKind::Database,
        }
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_envelope(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            success: false,
            kind: self.kind(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), axum::Json(self.to_envelope())).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_context_defaults_to_persona() {
        let req: ChatRequest = serde_json::from_str(r#"{"prompt":"hi"}"#).unwrap();
        assert_eq!(req.context_or_default(), DEFAULT_CONTEXT);

        let req: ChatRequest =
            serde_json::from_str(r#"{"prompt":"hi","context":"Be brief."}"#).unwrap();
        assert_eq!(req.context_or_default(), "Be brief.");
    }

    #[test]
    fn test_success_envelope_shape() {
        let body = serde_json::to_value(ChatResponse::ok("Hello")).unwrap();
        assert_eq!(body, serde_json::json!({ "response": "Hello", "success": true }));
    }

    #[test]
    fn test_error_envelope_carries_kind() {
        let err = AppError::Upstream {
            status: Some(429),
            message: "Gemini API error: 429 Too Many Requests".to_string(),
        };
        let body = serde_json::to_value(err.to_envelope()).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "upstream");
        assert_eq!(body["error"], "Gemini API error: 429 Too Many Requests");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Configuration("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::EmptyResult("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("John Doe"), "JD");
        assert_eq!(initials("emma"), "E");
        assert_eq!(initials("Mary Ann Smith"), "MA");
        assert_eq!(initials("   "), "");
    }

    #[test]
    fn test_team_summary_counts_active() {
        let member = |status, active, done| TeamMember {
            id: "x".into(),
            name: "X".into(),
            email: "x@example.com".into(),
            role: "Dev".into(),
            department: None,
            phone: None,
            bio: None,
            status,
            initials: "X".into(),
            active_tasks: active,
            completed_tasks: done,
        };
        let summary = TeamSummary::from_members(&[
            member(MemberStatus::Active, 5, 23),
            member(MemberStatus::Away, 4, 31),
            member(MemberStatus::Active, 6, 28),
        ]);
        assert_eq!(summary.total_members, 3);
        assert_eq!(summary.active_now, 2);
        assert_eq!(summary.active_tasks, 15);
        assert_eq!(summary.completed_tasks, 82);
    }

    #[test]
    fn test_task_update_applies_present_fields() {
        let mut task = Task {
            id: "1".into(),
            title: "Write documentation".into(),
            description: None,
            assignee: "Mike".into(),
            due_date: None,
            priority: Priority::Low,
            status: TaskStatus::InProgress,
            project: None,
            estimated_hours: 0.0,
            created_at: Utc::now(),
        };
        TaskUpdate {
            status: Some(TaskStatus::Completed),
            priority: Some(Priority::High),
            ..Default::default()
        }
        .apply(&mut task);
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.title, "Write documentation");
    }
}
