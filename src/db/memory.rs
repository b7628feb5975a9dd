use super::records;
use super::traits::DashboardStore;
use crate::types::{
    AppError, NewProject, NewTask, NewTeamMember, Note, NoteInput, Project, Result, Task,
    TaskFilter, TaskUpdate, TeamMember,
};
use async_trait::async_trait;
use parking_lot::RwLock;

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    team: Vec<TeamMember>,
    // Newest first
    notes: Vec<Note>,
}

/// In-process dashboard store. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(kind: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} '{}'", kind, id))
}

fn remove_by<T>(items: &mut Vec<T>, kind: &str, id: &str, key: impl Fn(&T) -> &str) -> Result<()> {
    let before = items.len();
    items.retain(|item| key(item) != id);
    if items.len() == before {
        return Err(not_found(kind, id));
    }
    Ok(())
}

#[async_trait]
impl DashboardStore for MemoryStore {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.tables.read().projects.clone())
    }

    async fn get_project(&self, id: &str) -> Result<Project> {
        self.tables
            .read()
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| not_found("project", id))
    }

    async fn create_project(&self, project: NewProject) -> Result<Project> {
        let project = records::build_project(project)?;
        self.tables.write().projects.push(project.clone());
        Ok(project)
    }

    async fn delete_project(&self, id: &str) -> Result<()> {
        remove_by(&mut self.tables.write().projects, "project", id, |p| &p.id)
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        Ok(self
            .tables
            .read()
            .tasks
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        self.tables
            .read()
            .tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found("task", id))
    }

    async fn create_task(&self, task: NewTask) -> Result<Task> {
        let task = records::build_task(task)?;
        self.tables.write().tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        let mut tables = self.tables.write();
        let slot = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("task", id))?;
        let next = records::updated_task(slot, update)?;
        *slot = next.clone();
        Ok(next)
    }

    async fn delete_task(&self, id: &str) -> Result<()> {
        remove_by(&mut self.tables.write().tasks, "task", id, |t| &t.id)
    }

    async fn list_team_members(&self) -> Result<Vec<TeamMember>> {
        Ok(self.tables.read().team.clone())
    }

    async fn add_team_member(&self, member: NewTeamMember) -> Result<TeamMember> {
        let member = records::build_member(member)?;
        let mut tables = self.tables.write();
        if tables
            .team
            .iter()
            .any(|m| m.email.eq_ignore_ascii_case(&member.email))
        {
            return Err(AppError::InvalidInput(format!(
                "a team member with email '{}' already exists",
                member.email
            )));
        }
        tables.team.push(member.clone());
        Ok(member)
    }

    async fn remove_team_member(&self, id: &str) -> Result<()> {
        remove_by(&mut self.tables.write().team, "team member", id, |m| &m.id)
    }

    async fn list_notes(&self, query: Option<&str>) -> Result<Vec<Note>> {
        let tables = self.tables.read();
        Ok(match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => tables
                .notes
                .iter()
                .filter(|n| records::note_matches(n, q))
                .cloned()
                .collect(),
            None => tables.notes.clone(),
        })
    }

    async fn get_note(&self, id: &str) -> Result<Note> {
        self.tables
            .read()
            .notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| not_found("note", id))
    }

    async fn create_note(&self, note: NoteInput) -> Result<Note> {
        let note = records::build_note(note);
        self.tables.write().notes.insert(0, note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: &str, note: NoteInput) -> Result<Note> {
        let mut tables = self.tables.write();
        let slot = tables
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| not_found("note", id))?;
        *slot = records::saved_note(slot, note);
        Ok(slot.clone())
    }

    async fn delete_note(&self, id: &str) -> Result<()> {
        remove_by(&mut self.tables.write().notes, "note", id, |n| &n.id)
    }

    async fn is_empty(&self) -> Result<bool> {
        let tables = self.tables.read();
        Ok(tables.projects.is_empty() && tables.tasks.is_empty() && tables.team.is_empty())
    }
}
