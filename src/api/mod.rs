//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod query;
pub mod routes;

pub use dto::{
    CreateTaskRequest, DeleteResponse, GlobalStatsResponse, ListTasksResponse, RawTaskId,
    StatsSummary, StatusBreakdown, TaskFields, TaskResponse, UpdateTaskRequest,
};
pub use error::{ApiError, ApiErrorResponse, FieldError, ValidationError};
pub use handlers::{
    AppState, BANNER, HealthResponse, create_task, delete_task, get_task, health_check, root,
    update_task,
};
pub use query::{ListTasksQuery, global_stats, list_tasks, resolve_list_query};
pub use routes::{DEFAULT_BASE_PATH, router, task_routes};
