//! HTTP handlers for single-task operations.
//!
//! Request bodies are taken as `Result<Json<_>, JsonRejection>` so that a
//! malformed body is reported in the same `{ error, code, details }` shape
//! as every other failure.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use super::dto::{CreateTaskRequest, DeleteResponse, RawTaskId, TaskResponse, UpdateTaskRequest};
use super::error::ApiErrorResponse;
use crate::domain::{TaskId, TaskIdGenerator};
use crate::infrastructure::{Repositories, RepositoryFactory, TaskRepository};

/// Plain-text banner served at `GET /`.
pub const BANNER: &str = "TaskNet backend running";

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// Uses a trait object so that the backend chosen by `RepositoryFactory`
/// at startup can be swapped without changing handler signatures.
#[derive(Clone)]
pub struct AppState {
    /// Task repository for persistence.
    pub task_repository: Arc<dyn TaskRepository + Send + Sync>,
    /// Source of server-assigned identifiers.
    pub id_generator: Arc<TaskIdGenerator>,
}

impl AppState {
    /// Creates a new `AppState` from initialized repositories.
    #[must_use]
    pub fn from_repositories(repositories: Repositories) -> Self {
        Self {
            task_repository: repositories.task_repository,
            id_generator: Arc::new(TaskIdGenerator::new()),
        }
    }

    /// Creates a new `AppState` backed by an empty in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repositories(RepositoryFactory::create_in_memory_repositories())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("task_repository", &"Arc<dyn TaskRepository>")
            .field("id_generator", &self.id_generator)
            .finish()
    }
}

/// Resolves a path segment to an identifier; anything non-numeric is a 404.
fn path_task_id(raw: &str) -> Result<TaskId, ApiErrorResponse> {
    TaskId::parse(raw).ok_or_else(ApiErrorResponse::not_found)
}

// =============================================================================
// POST /tasks Handler
// =============================================================================

/// Creates a new task.
///
/// # Request Body
///
/// ```json
/// {
///   "id": 1700000000000,
///   "title": "Task title",
///   "description": "Optional description",
///   "status": "pending|in-progress|completed",
///   "dueDate": "2024-01-31"
/// }
/// ```
///
/// `id` is optional. When it is missing, zero or not numeric, the server
/// assigns one.
///
/// # Errors
///
/// - **400 Bad Request**: Validation error or duplicate id
/// - **500 Internal Server Error**: Repository operation failed
pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiErrorResponse> {
    let Json(request) = payload?;
    let fields = request.validate()?;

    let id = request
        .id
        .as_ref()
        .and_then(RawTaskId::to_task_id)
        .unwrap_or_else(|| state.id_generator.next_id());

    let document = state.task_repository.insert(fields.into_task(id)).await?;
    tracing::info!(task_id = %id, "Task created");

    Ok((StatusCode::CREATED, Json(TaskResponse::from(document))))
}

// =============================================================================
// GET /tasks/{id} Handler
// =============================================================================

/// Returns one task.
///
/// # Errors
///
/// - **404 Not Found**: No task has this id, or the id is not an integer
/// - **500 Internal Server Error**: Repository operation failed
pub async fn get_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let id = path_task_id(&raw_id)?;
    let document = state
        .task_repository
        .find_by_id(id)
        .await?
        .ok_or_else(ApiErrorResponse::not_found)?;

    Ok(Json(TaskResponse::from(document)))
}

// =============================================================================
// PUT /tasks/{id} Handler
// =============================================================================

/// Replaces every field of a task except its id.
///
/// Omitted `description` and `dueDate` are cleared; an omitted `status`
/// resets to `pending`. An unknown id is reported before the body is
/// validated.
///
/// # Errors
///
/// - **400 Bad Request**: Validation error
/// - **404 Not Found**: No task has this id
/// - **500 Internal Server Error**: Repository operation failed
pub async fn update_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let id = path_task_id(&raw_id)?;
    if state.task_repository.find_by_id(id).await?.is_none() {
        return Err(ApiErrorResponse::not_found());
    }
    let Json(request) = payload?;
    let fields = request.validate()?;

    let document = state.task_repository.replace(fields.into_task(id)).await?;
    tracing::info!(task_id = %id, "Task updated");

    Ok(Json(TaskResponse::from(document)))
}

// =============================================================================
// DELETE /tasks/{id} Handler
// =============================================================================

/// Deletes a task.
///
/// # Errors
///
/// - **404 Not Found**: No task has this id
/// - **500 Internal Server Error**: Repository operation failed
pub async fn delete_task(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiErrorResponse> {
    let id = path_task_id(&raw_id)?;
    if !state.task_repository.delete(id).await? {
        return Err(ApiErrorResponse::not_found());
    }
    tracing::info!(task_id = %id, "Task deleted");

    Ok(Json(DeleteResponse { success: true }))
}

// =============================================================================
// GET /health and GET / Handlers
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Plain-text banner.
pub async fn root() -> &'static str {
    BANNER
}

// =============================================================================
// Tests
// =============================================================================
