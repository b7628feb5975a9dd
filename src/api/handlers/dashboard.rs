use crate::{
    AppState,
    api::extract::{JsonBody, PathParam, QueryParams},
    types::{
        NewProject, NewTask, NewTeamMember, Note, NoteInput, Project, Result, Task, TaskFilter,
        TaskStatus, TaskUpdate, TeamMember, TeamSummary,
    },
};
use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

// ============= Projects =============

pub async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.store.list_projects().await?))
}

pub async fn get_project(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Project>> {
    Ok(Json(state.store.get_project(&id).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewProject>,
) -> Result<(StatusCode, Json<Project>)> {
    let project = state.store.create_project(payload).await?;
    info!(id = %project.id, name = %project.name, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn delete_project(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<StatusCode> {
    state.store.delete_project(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============= Tasks =============

pub async fn list_tasks(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<TaskFilter>,
) -> Result<Json<Vec<Task>>> {
    Ok(Json(state.store.list_tasks(&filter).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Task>> {
    Ok(Json(state.store.get_task(&id).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewTask>,
) -> Result<(StatusCode, Json<Task>)> {
    let task = state.store.create_task(payload).await?;
    info!(id = %task.id, title = %task.title, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(payload): JsonBody<TaskUpdate>,
) -> Result<Json<Task>> {
    Ok(Json(state.store.update_task(&id, payload).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: TaskStatus,
}

/// Move a task between board columns
pub async fn set_task_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(payload): JsonBody<StatusChange>,
) -> Result<Json<Task>> {
    Ok(Json(state.store.set_task_status(&id, payload.status).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<StatusCode> {
    state.store.delete_task(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============= Team =============

pub async fn list_team(State(state): State<AppState>) -> Result<Json<Vec<TeamMember>>> {
    Ok(Json(state.store.list_team_members().await?))
}

pub async fn add_team_member(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewTeamMember>,
) -> Result<(StatusCode, Json<TeamMember>)> {
    let member = state.store.add_team_member(payload).await?;
    info!(id = %member.id, role = %member.role, "Team member added");
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn remove_team_member(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<StatusCode> {
    state.store.remove_team_member(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn team_summary(State(state): State<AppState>) -> Result<Json<TeamSummary>> {
    Ok(Json(state.store.team_summary().await?))
}

// ============= Notes =============

#[derive(Debug, Default, Deserialize)]
pub struct NoteSearch {
    pub q: Option<String>,
}

pub async fn list_notes(
    State(state): State<AppState>,
    QueryParams(search): QueryParams<NoteSearch>,
) -> Result<Json<Vec<Note>>> {
    Ok(Json(state.store.list_notes(search.q.as_deref()).await?))
}

pub async fn get_note(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<Json<Note>> {
    Ok(Json(state.store.get_note(&id).await?))
}

pub async fn create_note(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NoteInput>,
) -> Result<(StatusCode, Json<Note>)> {
    let note = state.store.create_note(payload).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn update_note(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
    JsonBody(payload): JsonBody<NoteInput>,
) -> Result<Json<Note>> {
    Ok(Json(state.store.update_note(&id, payload).await?))
}

pub async fn delete_note(
    State(state): State<AppState>,
    PathParam(id): PathParam<String>,
) -> Result<StatusCode> {
    state.store.delete_note(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
