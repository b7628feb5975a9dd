//! Record construction and validation shared by every store backend.

use crate::types::{
    AppError, NewProject, NewTask, NewTeamMember, Note, NoteInput, Project, Result, Task,
    TaskUpdate, TeamMember, initials,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const NEW_NOTE_TITLE: &str = "New note";
const UNTITLED_NOTE: &str = "Untitled";

/// Current time truncated to microseconds, the precision SQLite keeps.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

pub fn build_project(input: NewProject) -> Result<Project> {
    let name = required(&input.name, "name")?;
    if input.progress > 100 {
        return Err(AppError::InvalidInput(format!(
            "progress must be between 0 and 100, got {}",
            input.progress
        )));
    }
    if input.tasks_completed > input.tasks_total {
        return Err(AppError::InvalidInput(
            "tasks_completed cannot exceed tasks_total".to_string(),
        ));
    }

    Ok(Project {
        id: new_id(),
        name,
        description: input.description,
        kind: input.kind,
        status: input.status,
        progress: input.progress,
        due_date: input.due_date,
        team: input.team,
        tasks_completed: input.tasks_completed,
        tasks_total: input.tasks_total,
        created_at: now(),
    })
}

pub fn build_task(input: NewTask) -> Result<Task> {
    let title = required(&input.title, "title")?;
    validate_hours(input.estimated_hours)?;

    Ok(Task {
        id: new_id(),
        title,
        description: input.description,
        assignee: input.assignee,
        due_date: input.due_date,
        priority: input.priority,
        status: input.status,
        project: input.project,
        estimated_hours: input.estimated_hours,
        created_at: now(),
    })
}

/// Apply an update to a copy of `task`, rejecting blank titles.
pub fn updated_task(task: &Task, update: TaskUpdate) -> Result<Task> {
    if let Some(title) = &update.title {
        required(title, "title")?;
    }
    if let Some(hours) = update.estimated_hours {
        validate_hours(hours)?;
    }

    let mut next = task.clone();
    update.apply(&mut next);
    next.title = next.title.trim().to_string();
    Ok(next)
}

fn validate_hours(hours: f32) -> Result<()> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(AppError::InvalidInput(
            "estimated_hours must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

pub fn build_member(input: NewTeamMember) -> Result<TeamMember> {
    let name = required(&input.name, "name")?;
    let email = required(&input.email, "email")?;
    let role = required(&input.role, "role")?;
    if !email.contains('@') {
        return Err(AppError::InvalidInput(format!(
            "'{}' is not a valid email address",
            email
        )));
    }

    Ok(TeamMember {
        id: new_id(),
        initials: initials(&name),
        name,
        email,
        role,
        department: input.department,
        phone: input.phone,
        bio: input.bio,
        status: input.status,
        active_tasks: input.active_tasks,
        completed_tasks: input.completed_tasks,
    })
}

pub fn build_note(input: NoteInput) -> Note {
    let now = now();
    let title = if input.title.trim().is_empty() {
        NEW_NOTE_TITLE.to_string()
    } else {
        input.title
    };

    Note {
        id: new_id(),
        title,
        content: input.content,
        created_at: now,
        updated_at: now,
    }
}

/// Saved version of `note`; a blank title is stored as "Untitled".
pub fn saved_note(note: &Note, input: NoteInput) -> Note {
    let title = if input.title.trim().is_empty() {
        UNTITLED_NOTE.to_string()
    } else {
        input.title
    };

    Note {
        title,
        content: input.content,
        updated_at: now(),
        ..note.clone()
    }
}

/// Case-insensitive substring match over title and content.
pub fn note_matches(note: &Note, query: &str) -> bool {
    let query = query.to_lowercase();
    note.title.to_lowercase().contains(&query) || note.content.to_lowercase().contains(&query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MemberStatus, ProjectStatus, TaskStatus};

    fn new_member(name: &str, email: &str, role: &str) -> NewTeamMember {
        NewTeamMember {
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            department: None,
            phone: None,
            bio: None,
            status: MemberStatus::default(),
            active_tasks: 0,
            completed_tasks: 0,
        }
    }

    #[test]
    fn test_member_requires_name_email_role() {
        assert!(build_member(new_member("", "a@b.c", "Dev")).is_err());
        assert!(build_member(new_member("Ann", "  ", "Dev")).is_err());
        assert!(build_member(new_member("Ann", "a@b.c", "")).is_err());
        assert!(build_member(new_member("Ann", "not-an-email", "Dev")).is_err());

        let member = build_member(new_member("  Ann Lee ", "ann@company.com", "Dev")).unwrap();
        assert_eq!(member.name, "Ann Lee");
        assert_eq!(member.initials, "AL");
        assert_eq!(member.status, MemberStatus::Active);
        assert_eq!(member.active_tasks, 0);
    }

    #[test]
    fn test_project_progress_bounds() {
        let project = |progress| NewProject {
            name: "Website Redesign".to_string(),
            description: None,
            kind: "operational".to_string(),
            status: ProjectStatus::OnTrack,
            progress,
            due_date: None,
            team: vec![],
            tasks_completed: 0,
            tasks_total: 0,
        };
        assert!(build_project(project(100)).is_ok());
        let err = build_project(project(101)).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_task_blank_title_rejected_on_update() {
        let task = build_task(NewTask {
            title: "Write documentation".to_string(),
            description: None,
            assignee: "Mike".to_string(),
            due_date: None,
            priority: Default::default(),
            status: TaskStatus::Todo,
            project: None,
            estimated_hours: 2.0,
        })
        .unwrap();

        let blank = TaskUpdate {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(updated_task(&task, blank).is_err());

        let negative = TaskUpdate {
            estimated_hours: Some(-1.0),
            ..Default::default()
        };
        assert!(updated_task(&task, negative).is_err());
    }

    #[test]
    fn test_note_title_defaults() {
        let note = build_note(NoteInput::default());
        assert_eq!(note.title, "New note");
        assert_eq!(note.created_at, note.updated_at);

        let saved = saved_note(
            &note,
            NoteInput {
                title: String::new(),
                content: "body".to_string(),
            },
        );
        assert_eq!(saved.title, "Untitled");
        assert_eq!(saved.content, "body");
        assert_eq!(saved.id, note.id);
        assert_eq!(saved.created_at, note.created_at);
    }

    #[test]
    fn test_note_matches_case_insensitive() {
        let note = build_note(NoteInput {
            title: "Sprint Retro".to_string(),
            content: "Action items for QA".to_string(),
        });
        assert!(note_matches(&note, "retro"));
        assert!(note_matches(&note, "qa"));
        assert!(!note_matches(&note, "budget"));
    }
}
