//! Transport seam between the client sync model and the server.
//!
//! [`TaskApi`] is the only way the client talks to the server.
//! [`HttpTaskApi`] speaks HTTP+JSON with `reqwest`.

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::session::query_params;
use crate::api::{
    ApiError, CreateTaskRequest, DeleteResponse, ListTasksResponse, RawTaskId, TaskResponse,
    UpdateTaskRequest,
};
use crate::domain::{DueDate, Task, TaskId, TaskQuery, TaskStatus};

// =============================================================================
// Client Error
// =============================================================================

/// Errors surfaced by client operations. Nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or the status text.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Could not decode response: {0}")]
    Decode(String),

    /// The draft was rejected before sending.
    #[error("Invalid task: {0}")]
    InvalidDraft(String),
}

/// Deferred result of a client request.
pub type ClientFuture<T> = BoxFuture<'static, Result<T, ClientError>>;

// =============================================================================
// Task Draft
// =============================================================================

/// Task fields as edited in the client form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    /// Title; must not be blank.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Status.
    pub status: TaskStatus,
    /// Optional due date.
    pub due_date: Option<DueDate>,
}

impl TaskDraft {
    /// Creates a pending draft with only a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Creates a draft pre-filled from an existing task.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            due_date: task.due_date.clone(),
        }
    }

    /// Checks the draft locally.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidDraft` when the title is blank.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.title.trim().is_empty() {
            return Err(ClientError::InvalidDraft("Title is required".to_string()));
        }
        Ok(())
    }

    /// Builds the create request body, letting the server assign the id.
    #[must_use]
    pub fn to_create_request(&self) -> CreateTaskRequest {
        CreateTaskRequest {
            id: None,
            title: Some(self.title.trim().to_string()),
            description: self.description.clone(),
            status: Some(self.status.as_str().to_string()),
            due_date: self.due_date.as_ref().map(ToString::to_string),
        }
    }

    /// Builds the create request body with a client-chosen id.
    #[must_use]
    pub fn to_create_request_with_id(&self, id: TaskId) -> CreateTaskRequest {
        CreateTaskRequest {
            id: Some(RawTaskId::Number(id.value())),
            ..self.to_create_request()
        }
    }

    /// Builds the full-replace request body.
    #[must_use]
    pub fn to_update_request(&self) -> UpdateTaskRequest {
        UpdateTaskRequest {
            title: Some(self.title.trim().to_string()),
            description: self.description.clone(),
            status: Some(self.status.as_str().to_string()),
            due_date: self.due_date.as_ref().map(ToString::to_string),
        }
    }
}

// =============================================================================
// Task API Trait
// =============================================================================

/// Server operations used by the client.
pub trait TaskApi: Send + Sync {
    /// Fetches one page of tasks.
    fn list(&self, query: TaskQuery) -> ClientFuture<ListTasksResponse>;

    /// Fetches the global statistics body as raw JSON.
    fn global_stats(&self) -> ClientFuture<Value>;

    /// Creates a task.
    fn create(&self, request: CreateTaskRequest) -> ClientFuture<TaskResponse>;

    /// Replaces a task.
    fn update(&self, id: TaskId, request: UpdateTaskRequest) -> ClientFuture<TaskResponse>;

    /// Deletes a task.
    fn delete(&self, id: TaskId) -> ClientFuture<()>;
}

// =============================================================================
// HTTP Task API
// =============================================================================

/// `reqwest`-based implementation of [`TaskApi`].
///
/// `base_url` includes the API base path, e.g. `http://localhost:4000/api`.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTaskApi {
    /// Creates a client for the server at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Creates a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Sends a request and decodes a JSON success body.
async fn send_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|error| ClientError::Transport(error.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ApiError>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
        };
        return Err(ClientError::Status {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|error| ClientError::Decode(error.to_string()))
}

impl TaskApi for HttpTaskApi {
    fn list(&self, query: TaskQuery) -> ClientFuture<ListTasksResponse> {
        let request = self
            .client
            .get(self.url("/tasks"))
            .query(&query_params(&query));
        send_json(request).boxed()
    }

    fn global_stats(&self) -> ClientFuture<Value> {
        let request = self.client.get(self.url("/tasks/stats/global"));
        send_json(request).boxed()
    }

    fn create(&self, request: CreateTaskRequest) -> ClientFuture<TaskResponse> {
        let request = self.client.post(self.url("/tasks")).json(&request);
        send_json(request).boxed()
    }

    fn update(&self, id: TaskId, request: UpdateTaskRequest) -> ClientFuture<TaskResponse> {
        let request = self
            .client
            .put(self.url(&format!("/tasks/{id}")))
            .json(&request);
        send_json(request).boxed()
    }

    fn delete(&self, id: TaskId) -> ClientFuture<()> {
        let request = self.client.delete(self.url(&format!("/tasks/{id}")));
        async move {
            let _: DeleteResponse = send_json(request).await?;
            Ok(())
        }
        .boxed()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", false)]
    #[case("   ", false)]
    #[case("Buy milk", true)]
    fn test_draft_validate(#[case] title: &str, #[case] valid: bool) {
        let result = TaskDraft::new(title).validate();
        assert_eq!(result.is_ok(), valid);
        if !valid {
            assert!(matches!(result, Err(ClientError::InvalidDraft(_))));
        }
    }

    #[rstest]
    fn test_draft_requests() {
        let draft = TaskDraft {
            title: "  Ship it ".to_string(),
            description: Some("v1".to_string()),
            status: TaskStatus::InProgress,
            due_date: Some(DueDate::parse("2024-09-01").unwrap()),
        };

        let create = draft.to_create_request();
        assert!(create.id.is_none());
        assert_eq!(create.title.as_deref(), Some("Ship it"));
        assert_eq!(create.status.as_deref(), Some("in-progress"));
        assert_eq!(create.due_date.as_deref(), Some("2024-09-01"));

        let legacy = draft.to_create_request_with_id(TaskId::new(77));
        assert_eq!(legacy.id, Some(RawTaskId::Number(77)));

        let update = draft.to_update_request();
        assert_eq!(update.description.as_deref(), Some("v1"));
    }

    #[rstest]
    fn test_draft_from_task() {
        let task = Task::new(TaskId::new(3), "Read").with_status(TaskStatus::Completed);
        let draft = TaskDraft::from_task(&task);
        assert_eq!(draft.title, "Read");
        assert_eq!(draft.status, TaskStatus::Completed);
    }

    #[rstest]
    fn test_http_api_trims_trailing_slash() {
        let api = HttpTaskApi::new("http://localhost:4000/api/");
        assert_eq!(api.base_url(), "http://localhost:4000/api");
        assert_eq!(api.url("/tasks"), "http://localhost:4000/api/tasks");
    }

    #[rstest]
    fn test_client_error_display() {
        let error = ClientError::Status {
            status: 404,
            message: "Task not found".to_string(),
        };
        assert_eq!(error.to_string(), "Server returned 404: Task not found");
    }
}
