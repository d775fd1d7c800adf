//! Query handlers: task listing and global statistics.
//!
//! The list endpoint accepts its parameters as raw strings and resolves them
//! into a canonical [`TaskQuery`]. Pagination values are lenient (bad input
//! falls back to a default) while selectors are strict (bad input is a 400).

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::Deserialize;

use crate::domain::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, DateRange, GlobalStats, PageRequest, StatusFilter, TaskFilter,
    TaskQuery,
};

use super::dto::{GlobalStatsResponse, ListTasksResponse, validate_due_date};
use super::error::{ApiErrorResponse, ValidationError};
use super::handlers::AppState;

// =============================================================================
// Query Parameters
// =============================================================================

/// Raw query parameters of `GET /tasks`.
///
/// Decoded from the raw key/value pairs so that a repeated key never fails
/// the request: the first occurrence wins and unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct ListTasksQuery {
    /// Page number (default: 1, minimum: 1).
    pub page: Option<String>,
    /// Items per page (default: 10, minimum: 1).
    pub per_page: Option<String>,
    /// `all | active | pending | in-progress | completed`.
    pub status: Option<String>,
    /// Inclusive lower due-date bound.
    pub date_from: Option<String>,
    /// Inclusive upper due-date bound.
    pub date_to: Option<String>,
}

impl From<Vec<(String, String)>> for ListTasksQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "perPage" => &mut query.per_page,
                "status" => &mut query.status,
                "dateFrom" => &mut query.date_from,
                "dateTo" => &mut query.date_to,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Reads the leading integer of `text`, ignoring surrounding whitespace and
/// any trailing garbage. Returns `None` when there are no leading digits.
fn leading_integer(text: &str) -> Option<i64> {
    let text = text.trim();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let end = digits
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}

/// Resolves the `page` parameter: unparsable or below 1 becomes 1.
#[must_use]
pub fn parse_page(page: Option<&str>) -> u64 {
    page.and_then(leading_integer)
        .and_then(|value| u64::try_from(value).ok())
        .filter(|value| *value >= 1)
        .unwrap_or(DEFAULT_PAGE)
}

/// Resolves the `perPage` parameter: unparsable or zero becomes 10, negative
/// becomes 1.
#[must_use]
pub fn parse_per_page(per_page: Option<&str>) -> u64 {
    match per_page.and_then(leading_integer) {
        None | Some(0) => DEFAULT_PER_PAGE,
        Some(value) if value < 0 => 1,
        Some(value) => value.unsigned_abs(),
    }
}

/// Resolves the `status` parameter; absent or empty means no constraint.
///
/// # Errors
///
/// Returns a `ValidationError` for an unknown selector.
pub fn parse_status_filter(status: Option<&str>) -> Result<StatusFilter, ValidationError> {
    status
        .map_or(Ok(StatusFilter::All), |value| value.trim().parse())
        .map_err(|error| ValidationError::single("status", error.to_string()))
}

/// Resolves raw list parameters into a canonical query.
///
/// # Errors
///
/// Returns a `ValidationError` listing every invalid selector.
pub fn resolve_list_query(query: &ListTasksQuery) -> Result<TaskQuery, ValidationError> {
    let status = parse_status_filter(query.status.as_deref());
    let from = validate_due_date(query.date_from.as_deref()).map_err(|error| rename(error, "dateFrom"));
    let to = validate_due_date(query.date_to.as_deref()).map_err(|error| rename(error, "dateTo"));

    match (status, from, to) {
        (Ok(status), Ok(from), Ok(to)) => Ok(TaskQuery::new(
            TaskFilter::new(status, DateRange::new(from, to)),
            PageRequest::new(
                parse_page(query.page.as_deref()),
                parse_per_page(query.per_page.as_deref()),
            ),
        )),
        (status, from, to) => {
            let mut errors = ValidationError::new(Vec::new());
            for error in [status.err(), from.err(), to.err()].into_iter().flatten() {
                errors.merge(error);
            }
            Err(errors)
        }
    }
}

fn rename(mut error: ValidationError, field: &str) -> ValidationError {
    for field_error in &mut error.errors {
        field_error.field = field.to_string();
    }
    error
}

// =============================================================================
// GET /tasks - List Tasks
// =============================================================================

/// Lists tasks with filtering and pagination.
///
/// # Query Parameters
///
/// - `page`: Page number (default: 1)
/// - `perPage`: Items per page (default: 10)
/// - `status`: `all` (default), `active`, or one exact status
/// - `dateFrom` / `dateTo`: inclusive `YYYY-MM-DD` due-date bounds
///
/// # Errors
///
/// - **400 Bad Request**: Unknown status or malformed date
/// - **500 Internal Server Error**: Repository operation failed
pub async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<ListTasksResponse>, ApiErrorResponse> {
    let Query(query) = query?;
    let task_query = resolve_list_query(&query)?;
    tracing::debug!(?task_query, "Listing tasks");

    let result = state.task_repository.list(task_query).await?;

    Ok(Json(ListTasksResponse::from(result)))
}

// =============================================================================
// GET /tasks/stats/global - Global Statistics
// =============================================================================

/// Returns completion statistics over the whole task set.
///
/// # Errors
///
/// - **500 Internal Server Error**: Repository operation failed
pub async fn global_stats(
    State(state): State<AppState>,
) -> Result<Json<GlobalStatsResponse>, ApiErrorResponse> {
    let counts = state.task_repository.count_by_status().await?;
    Ok(Json(GlobalStatsResponse::from(GlobalStats::from_counts(
        counts,
    ))))
}

// =============================================================================
// Tests
// =============================================================================
