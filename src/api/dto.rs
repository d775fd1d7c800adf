//! Data Transfer Objects for API requests and responses.
//!
//! Request DTOs keep every field loosely typed so that validation can report
//! all problems at once with field-level details. Response DTOs are shared
//! with the client, which deserializes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    DueDate, GlobalStats, PageRequest, Task, TaskId, TaskStatus, normalize_description,
};
use crate::infrastructure::{PaginatedResult, TaskDocument};

use super::error::ValidationError;

// =============================================================================
// Task DTOs
// =============================================================================

/// Identifier as sent by legacy clients: a number, a numeric string, or junk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTaskId {
    /// JSON integer.
    Number(i64),
    /// JSON string, possibly numeric.
    Text(String),
    /// Anything else.
    Other(serde_json::Value),
}

impl RawTaskId {
    /// Returns the usable identifier, if any.
    ///
    /// Zero and non-numeric values are not usable; the server assigns an
    /// identifier instead.
    #[must_use]
    pub fn to_task_id(&self) -> Option<TaskId> {
        let id = match self {
            Self::Number(value) => Some(TaskId::new(*value)),
            Self::Text(text) => TaskId::parse(text),
            Self::Other(_) => None,
        };
        id.filter(|id| id.value() != 0)
    }
}

/// Request DTO for creating a new task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Optional client-chosen identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RawTaskId>,
    /// Title of the task.
    #[serde(default)]
    pub title: Option<String>,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Status; defaults to `pending`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Due date as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Request DTO for replacing a task.
///
/// Any `id` in the body is ignored; the path decides which task is replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description; omitted clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New status; omitted resets to `pending`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// New due date; omitted clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

/// Validated, normalized task fields, ready to be paired with an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed description, `None` when blank.
    pub description: Option<String>,
    /// Status.
    pub status: TaskStatus,
    /// Due date.
    pub due_date: Option<DueDate>,
}

impl TaskFields {
    /// Builds the task with the given identifier.
    #[must_use]
    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            due_date: self.due_date,
        }
    }
}

impl CreateTaskRequest {
    /// Validates every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` listing each invalid field.
    pub fn validate(&self) -> Result<TaskFields, ValidationError> {
        validate_task_fields(
            self.title.as_deref(),
            self.description.as_deref(),
            self.status.as_deref(),
            self.due_date.as_deref(),
        )
    }
}

impl UpdateTaskRequest {
    /// Validates every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` listing each invalid field.
    pub fn validate(&self) -> Result<TaskFields, ValidationError> {
        validate_task_fields(
            self.title.as_deref(),
            self.description.as_deref(),
            self.status.as_deref(),
            self.due_date.as_deref(),
        )
    }
}

/// Response DTO for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// The task fields, flattened into the object.
    #[serde(flatten)]
    pub task: Task,
    /// Creation timestamp maintained by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last replacement timestamp maintained by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<TaskDocument> for TaskResponse {
    fn from(document: TaskDocument) -> Self {
        Self {
            task: document.task,
            created_at: Some(document.created_at),
            updated_at: Some(document.updated_at),
        }
    }
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            task,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Response DTO for task listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksResponse {
    /// Tasks on the requested page.
    pub tasks: Vec<TaskResponse>,
    /// Matching tasks across all pages.
    pub total: u64,
    /// Requested page.
    pub page: u64,
    /// Page size.
    pub per_page: u64,
    /// `max(1, ceil(total / perPage))`.
    pub total_pages: u64,
}

impl From<PaginatedResult<TaskDocument>> for ListTasksResponse {
    fn from(result: PaginatedResult<TaskDocument>) -> Self {
        let total_pages = PageRequest::new(result.page, result.per_page).total_pages(result.total);
        Self {
            tasks: result.items.into_iter().map(TaskResponse::from).collect(),
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            total_pages,
        }
    }
}

/// Response DTO for a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
}

// =============================================================================
// Statistics DTOs
// =============================================================================

/// Per-status counts on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    /// Completed tasks.
    pub completed: u64,
    /// In-progress tasks.
    pub in_progress: u64,
    /// Pending tasks.
    pub pending: u64,
}

/// Done/not-done summary on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    /// Completed tasks.
    pub done: u64,
    /// Everything else.
    pub not_done: u64,
}

/// Response DTO for global statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStatsResponse {
    /// All tasks.
    pub total: u64,
    /// Counts per status.
    pub by_status: StatusBreakdown,
    /// Rounded completion percentage.
    pub percent: u64,
    /// Done/not-done summary.
    pub summary: StatsSummary,
}

impl From<GlobalStats> for GlobalStatsResponse {
    fn from(stats: GlobalStats) -> Self {
        Self {
            total: stats.total,
            by_status: StatusBreakdown {
                completed: stats.counts.completed,
                in_progress: stats.counts.in_progress,
                pending: stats.counts.pending,
            },
            percent: stats.percent,
            summary: StatsSummary {
                done: stats.done(),
                not_done: stats.not_done(),
            },
        }
    }
}

// =============================================================================
// Validation Functions
// =============================================================================

/// Validates a task title.
///
/// # Errors
///
/// Returns a `ValidationError` if the title is missing or blank.
pub fn validate_title(title: Option<&str>) -> Result<String, ValidationError> {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => Err(ValidationError::single("title", "Title is required")),
    }
}

/// Validates a task status; missing or empty means `pending`.
///
/// # Errors
///
/// Returns a `ValidationError` for any value other than the three statuses.
pub fn validate_status(status: Option<&str>) -> Result<TaskStatus, ValidationError> {
    match status.map(str::trim) {
        None | Some("") => Ok(TaskStatus::default()),
        Some(value) => value
            .parse()
            .map_err(|error: crate::domain::UnknownStatus| {
                ValidationError::single("status", error.to_string())
            }),
    }
}

/// Validates a due date; missing or blank means no due date.
///
/// # Errors
///
/// Returns a `ValidationError` if the value is not a real `YYYY-MM-DD` date.
pub fn validate_due_date(due_date: Option<&str>) -> Result<Option<DueDate>, ValidationError> {
    match due_date.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DueDate::parse(value)
            .map(Some)
            .map_err(|error| ValidationError::single("dueDate", error.to_string())),
    }
}

/// Validates all task fields, collecting every failure.
///
/// # Errors
///
/// Returns a `ValidationError` listing each invalid field.
pub fn validate_task_fields(
    title: Option<&str>,
    description: Option<&str>,
    status: Option<&str>,
    due_date: Option<&str>,
) -> Result<TaskFields, ValidationError> {
    let title = validate_title(title);
    let status = validate_status(status);
    let due_date = validate_due_date(due_date);

    match (title, status, due_date) {
        (Ok(title), Ok(status), Ok(due_date)) => Ok(TaskFields {
            title,
            description: normalize_description(description),
            status,
            due_date,
        }),
        (title, status, due_date) => {
            let mut errors = ValidationError::new(Vec::new());
            for error in [title.err(), status.err(), due_date.err()]
                .into_iter()
                .flatten()
            {
                errors.merge(error);
            }
            Err(errors)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
