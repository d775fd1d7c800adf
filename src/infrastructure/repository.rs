//! Repository trait for the task document store.
//!
//! Every method returns a boxed `'static` future so that the work is
//! deferred until the caller awaits it, and so that backends can be used
//! behind `Arc<dyn TaskRepository>`.

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{StatusCounts, Task, TaskId, TaskQuery};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No document has the given identifier.
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    /// A document with the given identifier already exists.
    #[error("Duplicate id: {0}")]
    DuplicateKey(TaskId),

    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Stored document could not be decoded or encoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Deferred result of a repository operation.
pub type RepositoryFuture<T> = BoxFuture<'static, Result<T, RepositoryError>>;

// =============================================================================
// Stored Document
// =============================================================================

/// A task as held by the store, with store-maintained timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDocument {
    /// The task itself.
    pub task: Task,
    /// When the document was inserted.
    pub created_at: DateTime<Utc>,
    /// When the document was last replaced.
    pub updated_at: DateTime<Utc>,
}

impl TaskDocument {
    /// Wraps a new task, stamping both timestamps with `now`.
    #[must_use]
    pub const fn new(task: Task, now: DateTime<Utc>) -> Self {
        Self {
            task,
            created_at: now,
            updated_at: now,
        }
    }
}

// =============================================================================
// Paginated Result
// =============================================================================

/// Page of results together with the total number of matches.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    /// The items in the current page.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Current page (1-indexed).
    pub page: u64,
    /// Number of items per page.
    pub per_page: u64,
}

impl<T> PaginatedResult<T> {
    /// Creates a new paginated result.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64, page: u64, per_page: u64) -> Self {
        Self {
            items,
            total,
            page,
            per_page,
        }
    }
}

// =============================================================================
// Task Repository
// =============================================================================

/// Repository trait for task documents.
///
/// Implementations must evaluate [`TaskQuery`] with exactly the predicate
/// and ordering defined in [`crate::domain::query`].
pub trait TaskRepository: Send + Sync {
    /// Finds a task by its identifier.
    ///
    /// Returns `Ok(None)` if no document matches.
    fn find_by_id(&self, id: TaskId) -> RepositoryFuture<Option<TaskDocument>>;

    /// Inserts a new task.
    ///
    /// Fails with [`RepositoryError::DuplicateKey`] if the identifier is taken.
    fn insert(&self, task: Task) -> RepositoryFuture<TaskDocument>;

    /// Replaces every field of the task with the same identifier.
    ///
    /// Fails with [`RepositoryError::NotFound`] if no document matches.
    fn replace(&self, task: Task) -> RepositoryFuture<TaskDocument>;

    /// Deletes a task by its identifier.
    ///
    /// Returns `Ok(true)` if the task was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: TaskId) -> RepositoryFuture<bool>;

    /// Lists the tasks matching `query`, one page at a time.
    fn list(&self, query: TaskQuery) -> RepositoryFuture<PaginatedResult<TaskDocument>>;

    /// Counts all tasks grouped by status.
    fn count_by_status(&self) -> RepositoryFuture<StatusCounts>;
}

// =============================================================================
// Tests
// =============================================================================
