//! Canned [`TaskApi`] for unit tests of the sync model.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use serde_json::Value;

use super::transport::{ClientError, ClientFuture, TaskApi};
use crate::api::{CreateTaskRequest, ListTasksResponse, RawTaskId, TaskResponse, UpdateTaskRequest};
use crate::domain::{Task, TaskId, TaskQuery};

/// Canned implementation of [`TaskApi`] for tests.
///
/// Every list call returns `list_result` and records its query. Mutations
/// echo the request back as the stored task.
#[derive(Debug, Clone)]
pub struct StubTaskApi {
    list_result: Result<ListTasksResponse, ClientError>,
    stats_body: Value,
    mutation_error: Option<ClientError>,
    queries: Arc<Mutex<Vec<TaskQuery>>>,
}

impl StubTaskApi {
    /// Creates a stub returning `list_response` and an empty statistics body.
    #[must_use]
    pub fn new(list_response: ListTasksResponse) -> Self {
        Self {
            list_result: Ok(list_response),
            stats_body: Value::Null,
            mutation_error: None,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a stub whose every call fails with `error`.
    #[must_use]
    pub fn failing(error: ClientError) -> Self {
        Self {
            list_result: Err(error.clone()),
            stats_body: Value::Null,
            mutation_error: Some(error),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sets the statistics body.
    #[must_use]
    pub fn with_stats(mut self, body: Value) -> Self {
        self.stats_body = body;
        self
    }

    /// Returns the list queries received so far.
    #[must_use]
    pub fn recorded_queries(&self) -> Vec<TaskQuery> {
        self.queries
            .lock()
            .map(|queries| queries.clone())
            .unwrap_or_default()
    }

    fn echo(&self, id: TaskId, title: Option<String>, status: Option<String>) -> ClientFuture<TaskResponse> {
        let result = self.mutation_error.clone().map_or_else(
            || {
                let status = status
                    .as_deref()
                    .and_then(|value| value.parse().ok())
                    .unwrap_or_default();
                let task = Task::new(id, title.unwrap_or_default()).with_status(status);
                Ok(TaskResponse::from(task))
            },
            Err,
        );
        async move { result }.boxed()
    }
}

impl TaskApi for StubTaskApi {
    fn list(&self, query: TaskQuery) -> ClientFuture<ListTasksResponse> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query);
        }
        let result = self.list_result.clone();
        async move { result }.boxed()
    }

    fn global_stats(&self) -> ClientFuture<Value> {
        let result = self
            .mutation_error
            .clone()
            .map_or_else(|| Ok(self.stats_body.clone()), Err);
        async move { result }.boxed()
    }

    fn create(&self, request: CreateTaskRequest) -> ClientFuture<TaskResponse> {
        let id = request
            .id
            .as_ref()
            .and_then(RawTaskId::to_task_id)
            .unwrap_or(TaskId::new(1));
        self.echo(id, request.title, request.status)
    }

    fn update(&self, id: TaskId, request: UpdateTaskRequest) -> ClientFuture<TaskResponse> {
        self.echo(id, request.title, request.status)
    }

    fn delete(&self, _id: TaskId) -> ClientFuture<()> {
        let result = self.mutation_error.clone().map_or(Ok(()), Err);
        async move { result }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn test_stub_records_queries() {
        let stub = StubTaskApi::new(ListTasksResponse {
            tasks: Vec::new(),
            total: 0,
            page: 1,
            per_page: 5,
            total_pages: 1,
        });
        stub.list(TaskQuery::default()).await.unwrap();
        assert_eq!(stub.recorded_queries(), vec![TaskQuery::default()]);
    }

    #[rstest]
    #[tokio::test]
    async fn test_stub_failing() {
        let error = ClientError::Transport("connection refused".to_string());
        let stub = StubTaskApi::failing(error.clone());
        assert_eq!(stub.delete(TaskId::new(1)).await, Err(error.clone()));
        assert_eq!(stub.global_stats().await, Err(error));
    }
}
