//! Task resource. Every route requires a session.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiFailure;
use crate::SharedState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

#[derive(Debug, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
}

/// Only the fields present in the JSON are applied.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
}

const TITLE_AND_DESCRIPTION_REQUIRED: ApiFailure =
    ApiFailure::new(StatusCode::BAD_REQUEST, "TITLE_AND_DESCRIPTION_REQUIRED");
const TASK_NOT_FOUND: ApiFailure = ApiFailure::new(StatusCode::NOT_FOUND, "TASK_NOT_FOUND");

/// Trimmed text, or `None` when nothing is left.
fn required_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub async fn list_tasks(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Query(filter): Query<TaskFilter>,
) -> Json<Value> {
    let tasks = state.tasks.read().await;
    let selected: Vec<&Task> = tasks
        .iter()
        .filter(|t| filter.status.map_or(true, |status| t.status == status))
        .collect();
    Json(json!({ "ok": true, "data": selected }))
}

pub async fn create_task(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Value>), ApiFailure> {
    let (Some(title), Some(description)) =
        (required_text(&input.title), required_text(&input.description))
    else {
        return Err(TITLE_AND_DESCRIPTION_REQUIRED);
    };

    let task = Task {
        id: Uuid::new_v4(),
        title,
        description,
        status: input.status,
    };
    state.tasks.write().await.push(task.clone());
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "data": task }))))
}

pub async fn get_task(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiFailure> {
    let tasks = state.tasks.read().await;
    let task = tasks.iter().find(|t| t.id == id).ok_or(TASK_NOT_FOUND)?;
    Ok(Json(json!({ "ok": true, "data": task })))
}

pub async fn update_task(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Value>, ApiFailure> {
    let title = input
        .title
        .as_deref()
        .map(|t| required_text(t).ok_or(TITLE_AND_DESCRIPTION_REQUIRED))
        .transpose()?;
    let description = input
        .description
        .as_deref()
        .map(|d| required_text(d).ok_or(TITLE_AND_DESCRIPTION_REQUIRED))
        .transpose()?;

    let mut tasks = state.tasks.write().await;
    let task = tasks.iter_mut().find(|t| t.id == id).ok_or(TASK_NOT_FOUND)?;
    if let Some(title) = title {
        task.title = title;
    }
    if let Some(description) = description {
        task.description = description;
    }
    if let Some(status) = input.status {
        task.status = status;
    }
    Ok(Json(json!({ "ok": true, "data": task })))
}

pub async fn delete_task(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiFailure> {
    let mut tasks = state.tasks.write().await;
    let index = tasks.iter().position(|t| t.id == id).ok_or(TASK_NOT_FOUND)?;
    tasks.remove(index);
    Ok(StatusCode::NO_CONTENT)
}
