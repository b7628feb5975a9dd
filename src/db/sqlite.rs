use super::records;
use super::traits::DashboardStore;
use crate::types::{
    AppError, MemberStatus, NewProject, NewTask, NewTeamMember, Note, NoteInput, Priority,
    Project, ProjectStatus, Result, Task, TaskFilter, TaskStatus, TaskUpdate, TeamMember,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database, Row, Value, params_from_iter};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

/// SQLite-backed dashboard store (libsql, local file or in-memory).
pub struct SqliteStore {
    _db: Database,
    // One shared connection: an in-memory database exists per connection
    conn: Connection,
    // Held across read-modify-write sequences
    write_lock: Mutex<()>,
}

impl SqliteStore {
    pub async fn new_local(path: &str) -> Result<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open {}: {}", path, e)))?;
        Self::from_database(db).await
    }

    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    async fn from_database(db: Database) -> Result<Self> {
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let store = Self {
            _db: db,
            conn,
            write_lock: Mutex::new(()),
        };
        store.initialize_schema().await?;
        Ok(store)
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS projects (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT,
                    kind TEXT NOT NULL,
                    status TEXT NOT NULL,
                    progress INTEGER NOT NULL,
                    due_date TEXT,
                    team TEXT NOT NULL,
                    tasks_completed INTEGER NOT NULL,
                    tasks_total INTEGER NOT NULL,
                    created_at INTEGER NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create projects table: {}", e)))?;

        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    description TEXT,
                    assignee TEXT NOT NULL,
                    due_date TEXT,
                    priority TEXT NOT NULL,
                    status TEXT NOT NULL,
                    project TEXT,
                    estimated_hours REAL NOT NULL,
                    created_at INTEGER NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create tasks table: {}", e)))?;

        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS team_members (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    email TEXT NOT NULL,
                    role TEXT NOT NULL,
                    department TEXT,
                    phone TEXT,
                    bio TEXT,
                    status TEXT NOT NULL,
                    initials TEXT NOT NULL,
                    active_tasks INTEGER NOT NULL,
                    completed_tasks INTEGER NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to create team_members table: {}", e))
            })?;

        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS notes (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create notes table: {}", e)))?;

        Ok(())
    }

    /// Run a query and convert each row while the cursor is positioned on it
    async fn query_map<T>(
        &self,
        sql: &str,
        params: Vec<Value>,
        map: fn(&Row) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut rows = self
            .conn
            .query(sql, params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Query failed: {}", e)))?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            out.push(map(&row)?);
        }
        Ok(out)
    }

    async fn query_first<T>(
        &self,
        sql: &str,
        params: Vec<Value>,
        map: fn(&Row) -> Result<T>,
    ) -> Result<Option<T>> {
        Ok(self.query_map(sql, params, map).await?.into_iter().next())
    }

    async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        self.conn
            .execute(sql, params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Statement failed: {}", e)))
    }

    async fn delete_by_id(&self, table: &str, kind: &str, id: &str) -> Result<()> {
        let affected = self
            .execute(
                &format!("DELETE FROM {} WHERE id = ?", table),
                vec![text(id)],
            )
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("{} '{}'", kind, id)));
        }
        Ok(())
    }

    async fn count(&self, table: &str) -> Result<i64> {
        let count = self
            .query_first(
                &format!("SELECT COUNT(*) FROM {}", table),
                vec![],
                |row| get_int(row, 0),
            )
            .await?;
        Ok(count.unwrap_or(0))
    }

    async fn insert_task(&self, task: &Task) -> Result<()> {
        self.execute(
            "INSERT INTO tasks (id, title, description, assignee, due_date, priority, status,
                                project, estimated_hours, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                text(&task.id),
                text(&task.title),
                opt_text(&task.description),
                text(&task.assignee),
                opt_text(&task.due_date),
                enum_text(&task.priority)?,
                enum_text(&task.status)?,
                opt_text(&task.project),
                Value::Real(f64::from(task.estimated_hours)),
                Value::Integer(task.created_at.timestamp_micros()),
            ],
        )
        .await?;
        Ok(())
    }
}

// ============= Value Conversion =============

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn opt_text(value: &Option<String>) -> Value {
    match value {
        Some(v) => Value::Text(v.clone()),
        None => Value::Null,
    }
}

/// Store a unit enum as its serde name (e.g. `in_progress`)
fn enum_text<T: Serialize>(value: &T) -> Result<Value> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => Ok(Value::Text(s)),
        Ok(other) => Err(AppError::Database(format!(
            "Expected a string enum, got {}",
            other
        ))),
        Err(e) => Err(AppError::Database(e.to_string())),
    }
}

fn parse_enum<T: DeserializeOwned>(raw: String) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(raw.clone()))
        .map_err(|_| AppError::Database(format!("Unknown stored value '{}'", raw)))
}

fn get_value(row: &Row, idx: i32) -> Result<Value> {
    row.get_value(idx)
        .map_err(|e| AppError::Database(e.to_string()))
}

fn get_text(row: &Row, idx: i32) -> Result<String> {
    match get_value(row, idx)? {
        Value::Text(s) => Ok(s),
        other => Err(AppError::Database(format!(
            "Expected text in column {}, got {:?}",
            idx, other
        ))),
    }
}

fn get_opt_text(row: &Row, idx: i32) -> Result<Option<String>> {
    match get_value(row, idx)? {
        Value::Null => Ok(None),
        Value::Text(s) => Ok(Some(s)),
        other => Err(AppError::Database(format!(
            "Expected text in column {}, got {:?}",
            idx, other
        ))),
    }
}

fn get_int(row: &Row, idx: i32) -> Result<i64> {
    match get_value(row, idx)? {
        Value::Integer(i) => Ok(i),
        other => Err(AppError::Database(format!(
            "Expected integer in column {}, got {:?}",
            idx, other
        ))),
    }
}

fn get_u32(row: &Row, idx: i32) -> Result<u32> {
    u32::try_from(get_int(row, idx)?)
        .map_err(|e| AppError::Database(format!("Column {} out of range: {}", idx, e)))
}

fn get_real(row: &Row, idx: i32) -> Result<f64> {
    match get_value(row, idx)? {
        Value::Real(r) => Ok(r),
        Value::Integer(i) => Ok(i as f64),
        other => Err(AppError::Database(format!(
            "Expected real in column {}, got {:?}",
            idx, other
        ))),
    }
}

fn get_time(row: &Row, idx: i32) -> Result<DateTime<Utc>> {
    let micros = get_int(row, idx)?;
    DateTime::from_timestamp_micros(micros)
        .ok_or_else(|| AppError::Database(format!("Invalid timestamp {}", micros)))
}

const PROJECT_COLUMNS: &str = "id, name, description, kind, status, progress, due_date, team, \
                               tasks_completed, tasks_total, created_at";
const TASK_COLUMNS: &str = "id, title, description, assignee, due_date, priority, status, \
                            project, estimated_hours, created_at";
const MEMBER_COLUMNS: &str = "id, name, email, role, department, phone, bio, status, initials, \
                              active_tasks, completed_tasks";
const NOTE_COLUMNS: &str = "id, title, content, created_at, updated_at";

fn project_from_row(row: &Row) -> Result<Project> {
    let team: Vec<String> = serde_json::from_str(&get_text(row, 7)?)
        .map_err(|e| AppError::Database(format!("Invalid team list: {}", e)))?;
    let progress = u8::try_from(get_int(row, 5)?)
        .map_err(|e| AppError::Database(format!("Invalid progress: {}", e)))?;

    Ok(Project {
        id: get_text(row, 0)?,
        name: get_text(row, 1)?,
        description: get_opt_text(row, 2)?,
        kind: get_text(row, 3)?,
        status: parse_enum::<ProjectStatus>(get_text(row, 4)?)?,
        progress,
        due_date: get_opt_text(row, 6)?,
        team,
        tasks_completed: get_u32(row, 8)?,
        tasks_total: get_u32(row, 9)?,
        created_at: get_time(row, 10)?,
    })
}

fn task_from_row(row: &Row) -> Result<Task> {
    Ok(Task {
        id: get_text(row, 0)?,
        title: get_text(row, 1)?,
        description: get_opt_text(row, 2)?,
        assignee: get_text(row, 3)?,
        due_date: get_opt_text(row, 4)?,
        priority: parse_enum::<Priority>(get_text(row, 5)?)?,
        status: parse_enum::<TaskStatus>(get_text(row, 6)?)?,
        project: get_opt_text(row, 7)?,
        estimated_hours: get_real(row, 8)? as f32,
        created_at: get_time(row, 9)?,
    })
}

fn member_from_row(row: &Row) -> Result<TeamMember> {
    Ok(TeamMember {
        id: get_text(row, 0)?,
        name: get_text(row, 1)?,
        email: get_text(row, 2)?,
        role: get_text(row, 3)?,
        department: get_opt_text(row, 4)?,
        phone: get_opt_text(row, 5)?,
        bio: get_opt_text(row, 6)?,
        status: parse_enum::<MemberStatus>(get_text(row, 7)?)?,
        initials: get_text(row, 8)?,
        active_tasks: get_u32(row, 9)?,
        completed_tasks: get_u32(row, 10)?,
    })
}

fn note_from_row(row: &Row) -> Result<Note> {
    Ok(Note {
        id: get_text(row, 0)?,
        title: get_text(row, 1)?,
        content: get_text(row, 2)?,
        created_at: get_time(row, 3)?,
        updated_at: get_time(row, 4)?,
    })
}

#[async_trait]
impl DashboardStore for SqliteStore {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.query_map(
            &format!(
                "SELECT {} FROM projects ORDER BY created_at ASC, rowid ASC",
                PROJECT_COLUMNS
            ),
            vec![],
            project_from_row,
        )
        .await
    }

    async fn get_project(&self, id: &str) -> Result<Project> {
        self.query_first(
            &format!("SELECT {} FROM projects WHERE id = ?", PROJECT_COLUMNS),
            vec![text(id)],
            project_from_row,
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("project '{}'", id)))
    }

    async fn create_project(&self, project: NewProject) -> Result<Project> {
        let project = records::build_project(project)?;
        let team = serde_json::to_string(&project.team)
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.execute(
            "INSERT INTO projects (id, name, description, kind, status, progress, due_date, team,
                                   tasks_completed, tasks_total, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                text(&project.id),
                text(&project.name),
                opt_text(&project.description),
                text(&project.kind),
                enum_text(&project.status)?,
                Value::Integer(i64::from(project.progress)),
                opt_text(&project.due_date),
                Value::Text(team),
                Value::Integer(i64::from(project.tasks_completed)),
                Value::Integer(i64::from(project.tasks_total)),
                Value::Integer(project.created_at.timestamp_micros()),
            ],
        )
        .await?;

        Ok(project)
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        self.delete_by_id("projects", "project", id).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut sql = format!("SELECT {} FROM tasks WHERE 1 = 1", TASK_COLUMNS);
        let mut params = Vec::new();
        if let Some(status) = &filter.status {
            sql.push_str(" AND status = ?");
            params.push(enum_text(status)?);
        }
        if let Some(project) = &filter.project {
            sql.push_str(" AND project = ?");
            params.push(text(project));
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        self.query_map(&sql, params, task_from_row).await
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        self.query_first(
            &format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS),
            vec![text(id)],
            task_from_row,
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task '{}'", id)))
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let task = records::build_task(task)?;
        self.insert_task(&task).await?;
        Ok(task)
    }

    async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        let _guard = self.write_lock.lock().await;
        let current = self.get_task(id).await?;
        let next = records::updated_task(&current, update)?;

        let affected = self
            .execute(
                "UPDATE tasks SET title = ?, description = ?, assignee = ?, due_date = ?,
                                  priority = ?, status = ?, project = ?, estimated_hours = ?
                 WHERE id = ?",
                vec![
                    text(&next.title),
                    opt_text(&next.description),
                    text(&next.assignee),
                    opt_text(&next.due_date),
                    enum_text(&next.priority)?,
                    enum_text(&next.status)?,
                    opt_text(&next.project),
                    Value::Real(f64::from(next.estimated_hours)),
                    text(id),
                ],
            )
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("task '{}'", id)));
        }

        Ok(next)
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        self.delete_by_id("tasks", "task", id).await
    }

    async fn list_team_members(&self) -> Result<Vec<TeamMember>> {
        self.query_map(
            &format!("SELECT {} FROM team_members ORDER BY rowid ASC", MEMBER_COLUMNS),
            vec![],
            member_from_row,
        )
        .await
    }

    async fn add_team_member(&self, member: NewTeamMember) -> Result<TeamMember> {
        let member = records::build_member(member)?;

        let _guard = self.write_lock.lock().await;
        let existing = self
            .query_first(
                "SELECT id FROM team_members WHERE email = ? COLLATE NOCASE",
                vec![text(&member.email)],
                |row| get_text(row, 0),
            )
            .await?;
        if existing.is_some() {
            return Err(AppError::InvalidInput(format!(
                "a team member with email '{}' already exists",
                member.email
            )));
        }

        self.execute(
            "INSERT INTO team_members (id, name, email, role, department, phone, bio, status,
                                       initials, active_tasks, completed_tasks)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                text(&member.id),
                text(&member.name),
                text(&member.email),
                text(&member.role),
                opt_text(&member.department),
                opt_text(&member.phone),
                opt_text(&member.bio),
                enum_text(&member.status)?,
                text(&member.initials),
                Value::Integer(i64::from(member.active_tasks)),
                Value::Integer(i64::from(member.completed_tasks)),
            ],
        )
        .await?;

        Ok(member)
    }

    async fn remove_team_member(&self, id: &str) -> Result<()> {
        self.delete_by_id("team_members", "team member", id).await
    }

    async fn list_notes(&self, query: Option<&str>) -> Result<Vec<Note>> {
        // Filtered in Rust so case folding matches the memory store
        let notes = self
            .query_map(
                &format!(
                    "SELECT {} FROM notes ORDER BY created_at DESC, rowid DESC",
                    NOTE_COLUMNS
                ),
                vec![],
                note_from_row,
            )
            .await?;

        Ok(match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => notes
                .into_iter()
                .filter(|n| records::note_matches(n, q))
                .collect(),
            None => notes,
        })
    }

    async fn get_note(&self, id: &str) -> Result<Note> {
        self.query_first(
            &format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS),
            vec![text(id)],
            note_from_row,
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("note '{}'", id)))
    }

    async fn create_note(&self, note: NoteInput) -> Result<Note> {
        let note = records::build_note(note);
        self.execute(
            "INSERT INTO notes (id, title, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
            vec![
                text(&note.id),
                text(&note.title),
                text(&note.content),
                Value::Integer(note.created_at.timestamp_micros()),
                Value::Integer(note.updated_at.timestamp_micros()),
            ],
        )
        .await?;
        Ok(note)
    }

    async fn update_note(&self, id: &str, note: NoteInput) -> Result<Note> {
        let _guard = self.write_lock.lock().await;
        let current = self.get_note(id).await?;
        let saved = records::saved_note(&current, note);

        let affected = self
            .execute(
                "UPDATE notes SET title = ?, content = ?, updated_at = ? WHERE id = ?",
                vec![
                    text(&saved.title),
                    text(&saved.content),
                    Value::Integer(saved.updated_at.timestamp_micros()),
                    text(id),
                ],
            )
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound(format!("note '{}'", id)));
        }

        Ok(saved)
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        self.delete_by_id("notes", "note", id).await
    }

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.count("projects").await? == 0
            && self.count("tasks").await? == 0
            && self.count("team_members").await? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_text_uses_serde_names() {
        assert!(matches!(
            enum_text(&TaskStatus::InProgress).unwrap(),
            Value::Text(ref s) if s == "in_progress"
        ));
        assert!(matches!(
            enum_text(&ProjectStatus::AlmostDone).unwrap(),
            Value::Text(ref s) if s == "almost_done"
        ));
    }

    #[test]
    fn test_parse_enum_round_trips_and_rejects_unknown() {
        let status: MemberStatus = parse_enum("busy".to_string()).unwrap();
        assert_eq!(status, MemberStatus::Busy);
        assert!(parse_enum::<MemberStatus>("sleeping".to_string()).is_err());
    }

    #[tokio::test]
    async fn test_rows_are_read_while_cursor_is_live() {
        let store = SqliteStore::new_memory().await.unwrap();
        let note = store
            .create_note(NoteInput {
                title: "Standup".to_string(),
                content: "Blockers first".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(store.count("notes").await.unwrap(), 1);
        assert_eq!(store.get_note(&note.id).await.unwrap(), note);
        assert_eq!(store.list_notes(None).await.unwrap(), vec![note]);
    }

    #[tokio::test]
    async fn test_update_of_vanished_row_is_not_found() {
        let store = SqliteStore::new_memory().await.unwrap();
        let note = store
            .create_note(NoteInput {
                title: "Draft".to_string(),
                content: String::new(),
            })
            .await
            .unwrap();
        store.delete_note(&note.id).await.unwrap();

        let err = store
            .update_note(
                &note.id,
                NoteInput {
                    title: "Final".to_string(),
                    content: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let store = SqliteStore::new_memory().await.unwrap();
        store.initialize_schema().await.unwrap();
        assert!(store.is_empty().await.unwrap());
    }
}
