//! Client session state and the view derived from list responses.
//!
//! [`SessionState`] is what the user controls: the status tab, the page and
//! the due-date range. It derives the canonical [`TaskQuery`] sent to the
//! server. [`ListView`] is what the server last returned for that query.

use std::fmt;
use std::str::FromStr;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::api::ListTasksResponse;
use crate::domain::{
    DateRange, DueDate, PageRequest, StatusFilter, Task, TaskFilter, TaskQuery, TaskStatus,
    UnknownStatus,
};

/// Page size of a client session unless configured otherwise.
pub const DEFAULT_CLIENT_PER_PAGE: u64 = 5;

/// Length of the "next 7 days" preset, today included.
const WEEK_PRESET_DAYS: u64 = 7;

/// Returns today's date on the local clock.
///
/// **Note**: This is an impure function (side effect: system clock).
#[must_use]
pub fn local_today() -> Option<DueDate> {
    DueDate::from_date(Local::now().date_naive())
}

// =============================================================================
// Filter Tab
// =============================================================================

/// Status tab selected in the client.
///
/// `All` is the default view and hides completed tasks: it is sent to the
/// server as the `active` selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    /// Every task that is not completed.
    #[default]
    All,
    /// Pending tasks only.
    Pending,
    /// In-progress tasks only.
    InProgress,
    /// Completed tasks only.
    Completed,
}

impl Filter {
    /// All tabs, in display order.
    pub const ALL: [Self; 4] = [Self::All, Self::Pending, Self::InProgress, Self::Completed];

    /// Returns the wire spelling of the tab.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => TaskStatus::Pending.as_str(),
            Self::InProgress => TaskStatus::InProgress.as_str(),
            Self::Completed => TaskStatus::Completed.as_str(),
        }
    }

    /// Maps the tab to the server's status selector.
    #[must_use]
    pub const fn to_status_filter(self) -> StatusFilter {
        match self {
            Self::All => StatusFilter::Active,
            Self::Pending => StatusFilter::Only(TaskStatus::Pending),
            Self::InProgress => StatusFilter::Only(TaskStatus::InProgress),
            Self::Completed => StatusFilter::Only(TaskStatus::Completed),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Self::All),
            other => other.parse::<TaskStatus>().map(|status| match status {
                TaskStatus::Pending => Self::Pending,
                TaskStatus::InProgress => Self::InProgress,
                TaskStatus::Completed => Self::Completed,
            }),
        }
    }
}

// =============================================================================
// Session State
// =============================================================================

/// User-controlled listing state.
///
/// Every mutator returns `true` when the state changed, which is the signal
/// to issue a new list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Selected status tab.
    pub filter: Filter,
    /// Current page (1-indexed).
    pub page: u64,
    /// Page size, fixed for the session.
    pub per_page: u64,
    /// Inclusive lower due-date bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<DueDate>,
    /// Inclusive upper due-date bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<DueDate>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_PER_PAGE)
    }
}

impl SessionState {
    /// Creates a session on the first page of the default tab.
    #[must_use]
    pub const fn new(per_page: u64) -> Self {
        Self {
            filter: Filter::All,
            page: 1,
            per_page: if per_page == 0 { 1 } else { per_page },
            date_from: None,
            date_to: None,
        }
    }

    /// Derives the canonical list query.
    #[must_use]
    pub fn to_query(&self) -> TaskQuery {
        TaskQuery::new(
            TaskFilter::new(
                self.filter.to_status_filter(),
                DateRange::new(self.date_from.clone(), self.date_to.clone()),
            ),
            PageRequest::new(self.page, self.per_page),
        )
    }

    /// Derives the query-string parameters of the list request.
    ///
    /// Date bounds are included only when set.
    #[must_use]
    pub fn to_query_params(&self) -> Vec<(&'static str, String)> {
        query_params(&self.to_query())
    }

    /// Selects a tab and returns to the first page.
    pub fn set_filter(&mut self, filter: Filter) -> bool {
        if self.filter == filter {
            return false;
        }
        self.filter = filter;
        self.page = 1;
        true
    }

    /// Sets both date bounds and returns to the first page.
    pub fn set_date_range(&mut self, from: Option<DueDate>, to: Option<DueDate>) -> bool {
        if self.date_from == from && self.date_to == to {
            return false;
        }
        self.date_from = from;
        self.date_to = to;
        self.page = 1;
        true
    }

    /// Removes both date bounds.
    pub fn clear_date_range(&mut self) -> bool {
        self.set_date_range(None, None)
    }

    /// Restricts the list to tasks due on `today`.
    pub fn preset_today(&mut self, today: &DueDate) -> bool {
        self.set_date_range(Some(today.clone()), Some(today.clone()))
    }

    /// Restricts the list to tasks due within the seven days starting `today`.
    pub fn preset_next_seven_days(&mut self, today: &DueDate) -> bool {
        let end = today.plus_days(WEEK_PRESET_DAYS - 1);
        self.set_date_range(Some(today.clone()), end)
    }

    /// Moves to `page`, clamped to `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: u64, total_pages: u64) -> bool {
        let target = page.clamp(1, total_pages.max(1));
        if self.page == target {
            return false;
        }
        self.page = target;
        true
    }

    /// Moves to the first page.
    pub fn first_page(&mut self, total_pages: u64) -> bool {
        self.go_to_page(1, total_pages)
    }

    /// Moves one page back.
    pub fn previous_page(&mut self, total_pages: u64) -> bool {
        self.go_to_page(self.page.saturating_sub(1), total_pages)
    }

    /// Moves one page forward.
    pub fn next_page(&mut self, total_pages: u64) -> bool {
        self.go_to_page(self.page.saturating_add(1), total_pages)
    }

    /// Moves to the last page.
    pub fn last_page(&mut self, total_pages: u64) -> bool {
        self.go_to_page(total_pages, total_pages)
    }
}

/// Encodes a query as `GET /tasks` parameters.
#[must_use]
pub fn query_params(query: &TaskQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.page.to_string()),
        ("perPage", query.page.per_page.to_string()),
        ("status", query.filter.status.as_str().to_string()),
    ];
    if let Some(from) = &query.filter.due.from {
        params.push(("dateFrom", from.to_string()));
    }
    if let Some(to) = &query.filter.due.to {
        params.push(("dateTo", to.to_string()));
    }
    params
}

// =============================================================================
// List View
// =============================================================================

/// The page of tasks currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Tasks on the loaded page.
    pub tasks: Vec<Task>,
    /// Matching tasks across all pages.
    pub total: u64,
    /// Page count reported by the server, at least 1.
    pub total_pages: u64,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            total: 0,
            total_pages: 1,
        }
    }
}

impl ListView {
    /// Replaces the view with a server response.
    pub fn reconcile(&mut self, response: ListTasksResponse) {
        self.tasks = response
            .tasks
            .into_iter()
            .map(|task_response| task_response.task)
            .collect();
        self.total = response.total;
        self.total_pages = response.total_pages.max(1);
    }

    /// Completed tasks on the loaded page.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_completed()).count()
    }

    /// Tasks on the loaded page that are not completed.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.tasks.len() - self.completed_count()
    }
}

// =============================================================================
// Tests
// =============================================================================
