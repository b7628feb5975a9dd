//! Sample dashboard content loaded into an empty store on first start.

use super::traits::DashboardStore;
use crate::types::{
    MemberStatus, NewProject, NewTask, NewTeamMember, Priority, ProjectStatus, Result, TaskStatus,
};
use tracing::info;

fn project(
    name: &str,
    description: &str,
    status: ProjectStatus,
    progress: u8,
    due_date: &str,
    team: &[&str],
    tasks: (u32, u32),
) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: Some(description.to_string()),
        kind: "operational".to_string(),
        status,
        progress,
        due_date: Some(due_date.to_string()),
        team: team.iter().map(|m| m.to_string()).collect(),
        tasks_completed: tasks.0,
        tasks_total: tasks.1,
    }
}

pub fn sample_projects() -> Vec<NewProject> {
    vec![
        project(
            "Website Redesign",
            "Complete overhaul of company website with modern design",
            ProjectStatus::OnTrack,
            75,
            "2024-02-15",
            &["JD", "SM", "AB"],
            (12, 16),
        ),
        project(
            "Mobile App Development",
            "Native iOS and Android app for customer engagement",
            ProjectStatus::InProgress,
            45,
            "2024-03-30",
            &["MJ", "AB", "BW"],
            (8, 18),
        ),
        project(
            "Marketing Campaign",
            "Q1 digital marketing campaign across all channels",
            ProjectStatus::AlmostDone,
            90,
            "2024-01-31",
            &["ED", "SM"],
            (18, 20),
        ),
        project(
            "Team Training Program",
            "Skills development program for the engineering team",
            ProjectStatus::Planning,
            25,
            "2024-04-15",
            &["JD", "BW"],
            (3, 12),
        ),
    ]
}

fn task(
    title: &str,
    assignee: &str,
    priority: Priority,
    status: TaskStatus,
    project: Option<&str>,
    due_date: &str,
    estimated_hours: f32,
) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: None,
        assignee: assignee.to_string(),
        due_date: Some(due_date.to_string()),
        priority,
        status,
        project: project.map(str::to_string),
        estimated_hours,
    }
}

pub fn sample_tasks() -> Vec<NewTask> {
    vec![
        task(
            "Design homepage mockup",
            "Sarah",
            Priority::High,
            TaskStatus::Todo,
            Some("Website Redesign"),
            "2024-01-20",
            8.0,
        ),
        task(
            "Implement user authentication",
            "John",
            Priority::Medium,
            TaskStatus::InProgress,
            Some("Mobile App Development"),
            "2024-01-25",
            12.0,
        ),
        task(
            "Write documentation",
            "Mike",
            Priority::Low,
            TaskStatus::InProgress,
            None,
            "2024-01-30",
            4.0,
        ),
        task(
            "Setup CI/CD pipeline",
            "Alice",
            Priority::High,
            TaskStatus::Completed,
            None,
            "2024-01-18",
            6.0,
        ),
    ]
}

fn member(
    name: &str,
    email: &str,
    role: &str,
    department: &str,
    status: MemberStatus,
    active_tasks: u32,
    completed_tasks: u32,
) -> NewTeamMember {
    NewTeamMember {
        name: name.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        department: Some(department.to_string()),
        phone: None,
        bio: None,
        status,
        active_tasks,
        completed_tasks,
    }
}

pub fn sample_team() -> Vec<NewTeamMember> {
    vec![
        member(
            "John Doe",
            "john.doe@company.com",
            "Project Manager",
            "Management",
            MemberStatus::Active,
            5,
            23,
        ),
        member(
            "Sarah Smith",
            "sarah.smith@company.com",
            "UI/UX Designer",
            "Design",
            MemberStatus::Active,
            3,
            18,
        ),
        member(
            "Mike Johnson",
            "mike.johnson@company.com",
            "Frontend Developer",
            "Engineering",
            MemberStatus::Away,
            4,
            31,
        ),
        member(
            "Alice Brown",
            "alice.brown@company.com",
            "Backend Developer",
            "Engineering",
            MemberStatus::Active,
            6,
            28,
        ),
        member(
            "Bob Wilson",
            "bob.wilson@company.com",
            "QA Engineer",
            "Engineering",
            MemberStatus::Busy,
            2,
            15,
        ),
        member(
            "Emma Davis",
            "emma.davis@company.com",
            "Marketing Specialist",
            "Marketing",
            MemberStatus::Offline,
            1,
            12,
        ),
    ]
}

/// Load the sample projects, tasks and team into `store` if it is empty.
///
/// Returns `true` when data was written.
pub async fn seed_sample_data(store: &dyn DashboardStore) -> Result<bool> {
    if !store.is_empty().await? {
        return Ok(false);
    }

    for project in sample_projects() {
        store.create_project(project).await?;
    }
    for task in sample_tasks() {
        store.create_task(task).await?;
    }
    for member in sample_team() {
        store.add_team_member(member).await?;
    }

    info!("Seeded dashboard store with sample data");
    Ok(true)
}
