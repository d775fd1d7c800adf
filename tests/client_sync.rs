//! End-to-end tests of the client sync model against the real router.
//!
//! `RouterTaskApi` implements the client transport seam by sending requests
//! through the router in-process, so every client operation exercises the
//! same handlers and in-memory repository as a deployed server.

mod common;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use futures::FutureExt;
use http_body_util::BodyExt;
use rstest::rstest;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower::ServiceExt;

use common::{create_test_app_state, create_test_router, seed_tasks, task};
use tasknet::api::{
    ApiError, CreateTaskRequest, DeleteResponse, ListTasksResponse, TaskResponse,
    UpdateTaskRequest,
};
use tasknet::client::{
    ClientError, ClientFuture, Filter, SessionState, TaskApi, TaskDraft, TaskListClient,
    query_params,
};
use tasknet::domain::{DueDate, TaskId, TaskQuery, TaskStatus};

// =============================================================================
// In-process Transport
// =============================================================================

#[derive(Clone)]
struct RouterTaskApi {
    app: Router,
}

impl RouterTaskApi {
    fn call<B: Serialize, T: DeserializeOwned + Send + 'static>(
        &self,
        method: &'static str,
        uri: String,
        body: Option<B>,
    ) -> ClientFuture<T> {
        let app = self.app.clone();
        let body = body.map(|body| serde_json::to_vec(&body).unwrap());
        async move {
            let builder = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json");
            let request = builder
                .body(body.map_or_else(Body::empty, Body::from))
                .map_err(|error| ClientError::Transport(error.to_string()))?;

            let response = app
                .oneshot(request)
                .await
                .map_err(|error| ClientError::Transport(error.to_string()))?;
            let status = response.status();
            let bytes = response
                .into_body()
                .collect()
                .await
                .map_err(|error| ClientError::Transport(error.to_string()))?
                .to_bytes();

            if !status.is_success() {
                let message = serde_json::from_slice::<ApiError>(&bytes)
                    .map(|error| error.error)
                    .unwrap_or_default();
                return Err(ClientError::Status {
                    status: status.as_u16(),
                    message,
                });
            }
            serde_json::from_slice(&bytes).map_err(|error| ClientError::Decode(error.to_string()))
        }
        .boxed()
    }
}

impl TaskApi for RouterTaskApi {
    fn list(&self, query: TaskQuery) -> ClientFuture<ListTasksResponse> {
        let params: Vec<String> = query_params(&query)
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        self.call::<(), _>("GET", format!("/api/tasks?{}", params.join("&")), None)
    }

    fn global_stats(&self) -> ClientFuture<Value> {
        self.call::<(), _>("GET", "/api/tasks/stats/global".to_string(), None)
    }

    fn create(&self, request: CreateTaskRequest) -> ClientFuture<TaskResponse> {
        self.call("POST", "/api/tasks".to_string(), Some(request))
    }

    fn update(&self, id: TaskId, request: UpdateTaskRequest) -> ClientFuture<TaskResponse> {
        self.call("PUT", format!("/api/tasks/{id}"), Some(request))
    }

    fn delete(&self, id: TaskId) -> ClientFuture<()> {
        let request = self.call::<(), DeleteResponse>("DELETE", format!("/api/tasks/{id}"), None);
        async move {
            request.await?;
            Ok(())
        }
        .boxed()
    }
}

async fn seeded_client() -> TaskListClient {
    let state = create_test_app_state();
    seed_tasks(
        &state,
        vec![
            task(1, TaskStatus::Pending, Some("2024-05-03")),
            task(2, TaskStatus::Completed, Some("2024-05-01")),
            task(3, TaskStatus::InProgress, Some("2024-05-02")),
            task(4, TaskStatus::Pending, None),
        ],
    )
    .await;
    let api = RouterTaskApi {
        app: create_test_router(&state),
    };
    TaskListClient::new(Arc::new(api), SessionState::default())
}

fn view_ids(client: &TaskListClient) -> Vec<i64> {
    client.view().tasks.iter().map(|task| task.id.value()).collect()
}

// =============================================================================
// Tests
// =============================================================================

#[rstest]
#[tokio::test]
async fn test_default_tab_hides_completed() {
    let mut client = seeded_client().await;
    client.refresh().await.unwrap();

    assert_eq!(view_ids(&client), vec![4, 3, 1]);
    assert_eq!(client.view().total, 3);
    assert_eq!(client.view().total_pages, 1);

    let stats = client.stats();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.not_done(), 3);
    assert_eq!(stats.percent, 25);
}

#[rstest]
#[case(Filter::All, vec![4, 3, 1])]
#[case(Filter::Pending, vec![4, 1])]
#[case(Filter::InProgress, vec![3])]
#[case(Filter::Completed, vec![2])]
#[tokio::test]
async fn test_tabs_select_statuses(#[case] filter: Filter, #[case] expected: Vec<i64>) {
    let mut client = seeded_client().await;
    client.reload().await.unwrap();
    client.set_filter(filter).await.unwrap();
    assert_eq!(view_ids(&client), expected);
}

#[rstest]
#[tokio::test]
async fn test_date_range_round_trip() {
    let mut client = seeded_client().await;
    client
        .set_date_range(
            Some(DueDate::parse("2024-05-02").unwrap()),
            Some(DueDate::parse("2024-05-03").unwrap()),
        )
        .await
        .unwrap();
    assert_eq!(view_ids(&client), vec![3, 1]);

    client.clear_date_range().await.unwrap();
    assert_eq!(view_ids(&client), vec![4, 3, 1]);
}

#[rstest]
#[tokio::test]
async fn test_paging_through_results() {
    let state = create_test_app_state();
    seed_tasks(
        &state,
        (1..=12).map(|id| task(id, TaskStatus::Pending, None)).collect(),
    )
    .await;
    let api = RouterTaskApi {
        app: create_test_router(&state),
    };
    let mut client = TaskListClient::new(Arc::new(api), SessionState::default());

    client.reload().await.unwrap();
    assert_eq!(client.view().total_pages, 3);
    assert_eq!(view_ids(&client), vec![1, 2, 3, 4, 5]);

    client.last_page().await.unwrap();
    assert_eq!(view_ids(&client), vec![11, 12]);

    client.next_page().await.unwrap();
    assert_eq!(client.session().page, 3);

    client.first_page().await.unwrap();
    assert_eq!(view_ids(&client), vec![1, 2, 3, 4, 5]);
}

#[rstest]
#[tokio::test]
async fn test_mutations_refresh_view_and_stats() {
    let mut client = seeded_client().await;
    client.refresh().await.unwrap();

    let created = client.create(&TaskDraft::new("  Ship it ")).await.unwrap();
    assert_eq!(created.task.title, "Ship it");
    assert!(view_ids(&client).contains(&created.task.id.value()));
    assert_eq!(client.stats().total, 5);

    let mut draft = TaskDraft::from_task(&created.task);
    draft.status = TaskStatus::Completed;
    client.update(created.task.id, &draft).await.unwrap();
    assert!(!view_ids(&client).contains(&created.task.id.value()));
    assert_eq!(client.stats().completed, 2);
    assert_eq!(client.stats().percent, 40);

    client.delete(TaskId::new(1)).await.unwrap();
    assert_eq!(view_ids(&client), vec![4, 3]);
    assert_eq!(client.stats().total, 4);
}

#[rstest]
#[tokio::test]
async fn test_server_errors_surface() {
    let mut client = seeded_client().await;
    client.reload().await.unwrap();

    let result = client.delete(TaskId::new(404)).await;
    assert_eq!(
        result,
        Err(ClientError::Status {
            status: 404,
            message: "Task not found".to_string(),
        })
    );
    assert_eq!(view_ids(&client), vec![4, 3, 1]);
}
