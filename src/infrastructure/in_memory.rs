//! In-memory repository implementation.
//!
//! Suitable for tests and local development. Documents live in a
//! `BTreeMap` keyed by identifier behind `Arc<RwLock<...>>`; the write lock
//! makes the duplicate check and the insert a single atomic step.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use tokio::sync::RwLock;

use crate::domain::{StatusCounts, Task, TaskId, TaskQuery};
use crate::infrastructure::{
    PaginatedResult, RepositoryError, RepositoryFuture, TaskDocument, TaskRepository,
};

/// In-memory implementation of `TaskRepository`.
///
/// # Example
///
/// ```ignore
/// use tasknet::infrastructure::InMemoryTaskRepository;
///
/// let repository = InMemoryTaskRepository::new();
/// repository.insert(Task::new(TaskId::new(1), "Write report")).await?;
/// let found = repository.find_by_id(TaskId::new(1)).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    documents: Arc<RwLock<BTreeMap<TaskId, TaskDocument>>>,
}

impl InMemoryTaskRepository {
    /// Creates a new empty in-memory task repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl TaskRepository for InMemoryTaskRepository {
    fn find_by_id(&self, id: TaskId) -> RepositoryFuture<Option<TaskDocument>> {
        let documents = Arc::clone(&self.documents);
        async move {
            let guard = documents.read().await;
            Ok(guard.get(&id).cloned())
        }
        .boxed()
    }

    fn insert(&self, task: Task) -> RepositoryFuture<TaskDocument> {
        let documents = Arc::clone(&self.documents);
        async move {
            let mut guard = documents.write().await;
            if guard.contains_key(&task.id) {
                return Err(RepositoryError::DuplicateKey(task.id));
            }
            let document = TaskDocument::new(task, Utc::now());
            guard.insert(document.task.id, document.clone());
            Ok(document)
        }
        .boxed()
    }

    fn replace(&self, task: Task) -> RepositoryFuture<TaskDocument> {
        let documents = Arc::clone(&self.documents);
        async move {
            let mut guard = documents.write().await;
            let existing = guard
                .get_mut(&task.id)
                .ok_or(RepositoryError::NotFound(task.id))?;
            existing.task = task;
            existing.updated_at = Utc::now();
            Ok(existing.clone())
        }
        .boxed()
    }

    fn delete(&self, id: TaskId) -> RepositoryFuture<bool> {
        let documents = Arc::clone(&self.documents);
        async move {
            let mut guard = documents.write().await;
            Ok(guard.remove(&id).is_some())
        }
        .boxed()
    }

    fn list(&self, query: TaskQuery) -> RepositoryFuture<PaginatedResult<TaskDocument>> {
        let documents = Arc::clone(&self.documents);
        async move {
            let guard = documents.read().await;
            let (total, page) = query.apply(guard.values().map(|document| &document.task));
            let items = page
                .into_iter()
                .filter_map(|task| guard.get(&task.id).cloned())
                .collect();
            Ok(PaginatedResult::new(
                items,
                total,
                query.page.page,
                query.page.per_page,
            ))
        }
        .boxed()
    }

    fn count_by_status(&self) -> RepositoryFuture<StatusCounts> {
        let documents = Arc::clone(&self.documents);
        async move {
            let guard = documents.read().await;
            Ok(StatusCounts::tally(
                guard.values().map(|document| document.task.status),
            ))
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================
