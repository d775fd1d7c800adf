//! Router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_task, delete_task, get_task, health_check, root, update_task,
};
use super::query::{global_stats, list_tasks};

/// Default prefix of the task endpoints.
pub const DEFAULT_BASE_PATH: &str = "/api";

/// Task endpoints, relative to the base path.
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/stats/global", get(global_stats))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}

/// Normalizes a base path to start with `/` and not end with one.
///
/// An empty or `/` base path mounts the task endpoints at the root.
#[must_use]
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Builds the full application router.
///
/// `GET /` and `GET /health` are served at the root; the task endpoints are
/// nested under `base_path`.
pub fn router(state: AppState, base_path: &str) -> Router {
    // Allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let base_path = normalize_base_path(base_path);
    let application = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check));

    let application = if base_path.is_empty() {
        application.merge(task_routes())
    } else {
        application.nest(&base_path, task_routes())
    };

    application
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
