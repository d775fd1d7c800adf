//! `PostgreSQL` repository implementation.
//!
//! Tasks are stored as JSONB documents keyed by their numeric identifier.
//! The primary key provides the atomic uniqueness check used by inserts.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE tasks (
//!     id BIGINT PRIMARY KEY,
//!     data JSONB NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
//!     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```
//!
//! Due dates are compared with `COLLATE "C"` so that ordering is plain
//! byte order, which for zero-padded `YYYY-MM-DD` strings is date order.

use chrono::{DateTime, Utc};
use futures::FutureExt;
use sqlx::PgPool;

use crate::domain::{StatusCounts, StatusFilter, Task, TaskFilter, TaskId, TaskQuery, TaskStatus};
use crate::infrastructure::{
    PaginatedResult, RepositoryError, RepositoryFuture, TaskDocument, TaskRepository,
};

/// Statements run by [`PostgresTaskRepository::ensure_schema`].
const SCHEMA_STATEMENTS: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS tasks (
        id BIGINT PRIMARY KEY,
        data JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks ((data->>'status'))",
    "CREATE INDEX IF NOT EXISTS idx_tasks_due_date ON tasks ((data->>'dueDate') COLLATE \"C\", id)",
];

const ORDER_CLAUSE: &str = "ORDER BY data->>'dueDate' COLLATE \"C\" ASC NULLS FIRST, id ASC";

// =============================================================================
// Helper Functions
// =============================================================================

fn database_error(error: &sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

fn decode_document(
    data: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Result<TaskDocument, RepositoryError> {
    let task = serde_json::from_value(data)
        .map_err(|error| RepositoryError::SerializationError(error.to_string()))?;
    Ok(TaskDocument {
        task,
        created_at,
        updated_at,
    })
}

fn encode_task(task: &Task) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(task).map_err(|error| RepositoryError::SerializationError(error.to_string()))
}

/// Builds the `WHERE` clause for a filter and the text values to bind.
///
/// Placeholders are numbered from `$1` in the order of the returned values.
fn build_where_clause(filter: &TaskFilter) -> (String, Vec<String>) {
    let mut conditions = vec!["1=1".to_string()];
    let mut values = Vec::new();

    match filter.status {
        StatusFilter::All => {}
        StatusFilter::Active => {
            values.push(TaskStatus::Completed.as_str().to_string());
            conditions.push(format!("data->>'status' <> ${}", values.len()));
        }
        StatusFilter::Only(status) => {
            values.push(status.as_str().to_string());
            conditions.push(format!("data->>'status' = ${}", values.len()));
        }
    }

    if let Some(from) = &filter.due.from {
        values.push(from.as_str().to_string());
        conditions.push(format!("data->>'dueDate' COLLATE \"C\" >= ${}", values.len()));
    }
    if let Some(to) = &filter.due.to {
        values.push(to.as_str().to_string());
        conditions.push(format!("data->>'dueDate' COLLATE \"C\" <= ${}", values.len()));
    }

    (conditions.join(" AND "), values)
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

// =============================================================================
// PostgreSQL Task Repository
// =============================================================================

/// `PostgreSQL` implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/tasknet").await?;
/// let repository = PostgresTaskRepository::new(pool);
/// repository.ensure_schema().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a repository over an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `tasks` table and its indexes if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if a statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|error| database_error(&error))?;
        }
        Ok(())
    }
}

impl TaskRepository for PostgresTaskRepository {
    fn find_by_id(&self, id: TaskId) -> RepositoryFuture<Option<TaskDocument>> {
        let pool = self.pool.clone();
        async move {
            let row: Option<(serde_json::Value, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
                "SELECT data, created_at, updated_at FROM tasks WHERE id = $1",
            )
            .bind(id.value())
            .fetch_optional(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            row.map(|(data, created_at, updated_at)| decode_document(data, created_at, updated_at))
                .transpose()
        }
        .boxed()
    }

    fn insert(&self, task: Task) -> RepositoryFuture<TaskDocument> {
        let pool = self.pool.clone();
        async move {
            let data = encode_task(&task)?;
            let row: Option<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
                "INSERT INTO tasks (id, data) VALUES ($1, $2)
                 ON CONFLICT (id) DO NOTHING
                 RETURNING created_at, updated_at",
            )
            .bind(task.id.value())
            .bind(data)
            .fetch_optional(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            let (created_at, updated_at) = row.ok_or(RepositoryError::DuplicateKey(task.id))?;
            Ok(TaskDocument {
                task,
                created_at,
                updated_at,
            })
        }
        .boxed()
    }

    fn replace(&self, task: Task) -> RepositoryFuture<TaskDocument> {
        let pool = self.pool.clone();
        async move {
            let data = encode_task(&task)?;
            let row: Option<(DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(
                "UPDATE tasks SET data = $2, updated_at = NOW()
                 WHERE id = $1
                 RETURNING created_at, updated_at",
            )
            .bind(task.id.value())
            .bind(data)
            .fetch_optional(&pool)
            .await
            .map_err(|error| database_error(&error))?;

            let (created_at, updated_at) = row.ok_or(RepositoryError::NotFound(task.id))?;
            Ok(TaskDocument {
                task,
                created_at,
                updated_at,
            })
        }
        .boxed()
    }

    fn delete(&self, id: TaskId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
                .bind(id.value())
                .execute(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            Ok(result.rows_affected() > 0)
        }
        .boxed()
    }

    fn list(&self, query: TaskQuery) -> RepositoryFuture<PaginatedResult<TaskDocument>> {
        let pool = self.pool.clone();
        async move {
            let (where_clause, values) = build_where_clause(&query.filter);

            // Count query
            let count_sql = format!("SELECT COUNT(*) FROM tasks WHERE {where_clause}");
            let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
            for value in &values {
                count_query = count_query.bind(value);
            }
            let (count,) = count_query
                .fetch_one(&pool)
                .await
                .map_err(|error| database_error(&error))?;
            let total = to_count(count);

            let page = query.page;
            if total == 0 || page.offset() >= total {
                return Ok(PaginatedResult::new(vec![], total, page.page, page.per_page));
            }

            // Data query with pagination
            let data_sql = format!(
                "SELECT data, created_at, updated_at FROM tasks WHERE {where_clause} {ORDER_CLAUSE} LIMIT ${} OFFSET ${}",
                values.len() + 1,
                values.len() + 2
            );
            let mut data_query =
                sqlx::query_as::<_, (serde_json::Value, DateTime<Utc>, DateTime<Utc>)>(&data_sql);
            for value in &values {
                data_query = data_query.bind(value);
            }
            let rows = data_query
                .bind(to_sql_integer(page.limit()))
                .bind(to_sql_integer(page.offset()))
                .fetch_all(&pool)
                .await
                .map_err(|error| database_error(&error))?;

            let items: Result<Vec<TaskDocument>, _> = rows
                .into_iter()
                .map(|(data, created_at, updated_at)| decode_document(data, created_at, updated_at))
                .collect();

            Ok(PaginatedResult::new(items?, total, page.page, page.per_page))
        }
        .boxed()
    }

    fn count_by_status(&self) -> RepositoryFuture<StatusCounts> {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<(Option<String>, i64)> =
                sqlx::query_as("SELECT data->>'status', COUNT(*) FROM tasks GROUP BY 1")
                    .fetch_all(&pool)
                    .await
                    .map_err(|error| database_error(&error))?;

            let mut counts = StatusCounts::default();
            for (status, count) in rows {
                let status: TaskStatus = status
                    .as_deref()
                    .unwrap_or_default()
                    .parse()
                    .map_err(|error: crate::domain::UnknownStatus| {
                        RepositoryError::SerializationError(error.to_string())
                    })?;
                match status {
                    TaskStatus::Pending => counts.pending = to_count(count),
                    TaskStatus::InProgress => counts.in_progress = to_count(count),
                    TaskStatus::Completed => counts.completed = to_count(count),
                }
            }
            Ok(counts)
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
