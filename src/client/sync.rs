//! Client sync model: keeps the session, the loaded page and the statistics
//! panel in step with the server.
//!
//! Every list request is tagged with a sequence number. A response is only
//! applied if no newer request has been issued since, so a slow response to
//! an old filter can never overwrite the view of a newer one.
//!
//! The high-level methods ([`TaskListClient::reload`] and everything built
//! on it) take `&mut self` and await their response before returning, so
//! they never overlap and the guard never discards their results. It only
//! matters to callers that drive a load by hand: take a ticket with
//! [`TaskListClient::begin_load`], send its query elsewhere, and hand the
//! response back through [`TaskListClient::apply_response`].

use std::sync::Arc;

use super::session::{Filter, ListView, SessionState, local_today};
use super::stats::StatsView;
use super::transport::{ClientError, TaskApi, TaskDraft};
use crate::api::{ListTasksResponse, TaskResponse};
use crate::domain::{DueDate, TaskId, TaskQuery};

/// A list request that has been issued but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    /// Sequence number of the request.
    pub token: u64,
    /// Query sent to the server.
    pub query: TaskQuery,
}

/// Client-side state machine for the task list.
pub struct TaskListClient {
    api: Arc<dyn TaskApi>,
    session: SessionState,
    view: ListView,
    stats: StatsView,
    latest_token: u64,
}

impl std::fmt::Debug for TaskListClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TaskListClient")
            .field("api", &"Arc<dyn TaskApi>")
            .field("session", &self.session)
            .field("view", &self.view)
            .field("stats", &self.stats)
            .field("latest_token", &self.latest_token)
            .finish()
    }
}

impl TaskListClient {
    /// Creates a client with the given session and an empty view.
    #[must_use]
    pub fn new(api: Arc<dyn TaskApi>, session: SessionState) -> Self {
        Self {
            api,
            session,
            view: ListView::default(),
            stats: StatsView::default(),
            latest_token: 0,
        }
    }

    /// Current session state.
    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// Currently loaded page.
    #[must_use]
    pub const fn view(&self) -> &ListView {
        &self.view
    }

    /// Currently displayed statistics.
    #[must_use]
    pub const fn stats(&self) -> &StatsView {
        &self.stats
    }

    // -------------------------------------------------------------------------
    // Loading
    // -------------------------------------------------------------------------

    /// Issues a new list request for the current session.
    ///
    /// Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_token += 1;
        LoadTicket {
            token: self.latest_token,
            query: self.session.to_query(),
        }
    }

    /// Applies a list response if `token` is the latest issued.
    ///
    /// Returns whether the response was applied.
    pub fn apply_response(&mut self, token: u64, response: ListTasksResponse) -> bool {
        if token != self.latest_token {
            tracing::debug!(token, latest = self.latest_token, "Discarding stale list response");
            return false;
        }
        self.view.reconcile(response);
        true
    }

    /// Loads the current page.
    ///
    /// # Errors
    ///
    /// Returns the transport error; the view is left unchanged.
    pub async fn reload(&mut self) -> Result<(), ClientError> {
        let ticket = self.begin_load();
        let response = self.api.list(ticket.query).await?;
        self.apply_response(ticket.token, response);
        Ok(())
    }

    /// Reloads the global statistics panel.
    ///
    /// # Errors
    ///
    /// Returns the transport error; the panel is left unchanged.
    pub async fn refresh_stats(&mut self) -> Result<(), ClientError> {
        let body = self.api.global_stats().await?;
        self.stats = StatsView::from_json(&body);
        Ok(())
    }

    /// Loads the current page and the statistics panel.
    ///
    /// # Errors
    ///
    /// Returns the first transport error.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.reload().await?;
        self.refresh_stats().await
    }

    async fn reload_if(&mut self, changed: bool) -> Result<(), ClientError> {
        if changed { self.reload().await } else { Ok(()) }
    }

    // -------------------------------------------------------------------------
    // Session Changes
    // -------------------------------------------------------------------------

    /// Selects a status tab.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn set_filter(&mut self, filter: Filter) -> Result<(), ClientError> {
        let changed = self.session.set_filter(filter);
        self.reload_if(changed).await
    }

    /// Sets the due-date range.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn set_date_range(
        &mut self,
        from: Option<DueDate>,
        to: Option<DueDate>,
    ) -> Result<(), ClientError> {
        let changed = self.session.set_date_range(from, to);
        self.reload_if(changed).await
    }

    /// Removes the due-date range.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn clear_date_range(&mut self) -> Result<(), ClientError> {
        let changed = self.session.clear_date_range();
        self.reload_if(changed).await
    }

    /// Shows tasks due today.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn show_today(&mut self) -> Result<(), ClientError> {
        let Some(today) = local_today() else {
            return Ok(());
        };
        let changed = self.session.preset_today(&today);
        self.reload_if(changed).await
    }

    /// Shows tasks due in the next seven days, today included.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn show_next_seven_days(&mut self) -> Result<(), ClientError> {
        let Some(today) = local_today() else {
            return Ok(());
        };
        let changed = self.session.preset_next_seven_days(&today);
        self.reload_if(changed).await
    }

    /// Moves to `page`, clamped to the known page count.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn go_to_page(&mut self, page: u64) -> Result<(), ClientError> {
        let changed = self.session.go_to_page(page, self.view.total_pages);
        self.reload_if(changed).await
    }

    /// Moves to the first page.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn first_page(&mut self) -> Result<(), ClientError> {
        let changed = self.session.first_page(self.view.total_pages);
        self.reload_if(changed).await
    }

    /// Moves one page back.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn previous_page(&mut self) -> Result<(), ClientError> {
        let changed = self.session.previous_page(self.view.total_pages);
        self.reload_if(changed).await
    }

    /// Moves one page forward.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn next_page(&mut self) -> Result<(), ClientError> {
        let changed = self.session.next_page(self.view.total_pages);
        self.reload_if(changed).await
    }

    /// Moves to the last page.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the reload.
    pub async fn last_page(&mut self) -> Result<(), ClientError> {
        let changed = self.session.last_page(self.view.total_pages);
        self.reload_if(changed).await
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Creates a task and reloads the page and statistics.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidDraft` without sending anything when the
    /// draft is invalid, otherwise the first transport error.
    pub async fn create(&mut self, draft: &TaskDraft) -> Result<TaskResponse, ClientError> {
        draft.validate()?;
        let created = self.api.create(draft.to_create_request()).await?;
        self.refresh().await?;
        Ok(created)
    }

    /// Replaces a task and reloads the page and statistics.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidDraft` without sending anything when the
    /// draft is invalid, otherwise the first transport error.
    pub async fn update(
        &mut self,
        id: TaskId,
        draft: &TaskDraft,
    ) -> Result<TaskResponse, ClientError> {
        draft.validate()?;
        let updated = self.api.update(id, draft.to_update_request()).await?;
        self.refresh().await?;
        Ok(updated)
    }

    /// Deletes a task and reloads the page and statistics.
    ///
    /// # Errors
    ///
    /// Returns the first transport error.
    pub async fn delete(&mut self, id: TaskId) -> Result<(), ClientError> {
        self.api.delete(id).await?;
        self.refresh().await
    }
}

// =============================================================================
// Tests
// =============================================================================
