//! Listing contract shared by the server and the client.
//!
//! A [`TaskQuery`] is the canonical form of a list request: a status
//! selector, an inclusive due-date range and a page window. Every storage
//! backend evaluates the same predicate and ordering defined here, and the
//! client derives its request parameters into the same types.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::task::{DueDate, Task, TaskStatus};

// =============================================================================
// List Pagination Constants
// =============================================================================

/// Page requested when none is given.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when none is given.
pub const DEFAULT_PER_PAGE: u64 = 10;

// =============================================================================
// Status Selector
// =============================================================================

/// Status constraint of a list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusFilter {
    /// No status constraint.
    #[default]
    All,
    /// Every task that is not completed.
    Active,
    /// Exactly one status.
    Only(TaskStatus),
}

impl StatusFilter {
    /// Returns the query-string value for this selector.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Only(status) => status.as_str(),
        }
    }

    /// Returns true when a task with `status` satisfies the selector.
    #[must_use]
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => !status.is_completed(),
            Self::Only(expected) => status == expected,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned for an unrecognized status selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown status filter: '{0}'. Expected all, active, pending, in-progress or completed")]
pub struct UnknownStatusFilter(pub String);

impl FromStr for StatusFilter {
    type Err = UnknownStatusFilter;

    /// Parses a selector; the empty string means [`StatusFilter::All`].
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "" | "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            other => other
                .parse::<TaskStatus>()
                .map(Self::Only)
                .map_err(|_| UnknownStatusFilter(other.to_string())),
        }
    }
}

// =============================================================================
// Due Date Range
// =============================================================================

/// Inclusive due-date bounds. An absent bound leaves that side open.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Lower bound (`dueDate >= from`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DueDate>,
    /// Upper bound (`dueDate <= to`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DueDate>,
}

impl DateRange {
    /// Creates a range from optional bounds.
    #[must_use]
    pub const fn new(from: Option<DueDate>, to: Option<DueDate>) -> Self {
        Self { from, to }
    }

    /// Returns true when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Returns true when `due_date` satisfies both bounds.
    ///
    /// A task without a due date only matches an unbounded range.
    #[must_use]
    pub fn contains(&self, due_date: Option<&DueDate>) -> bool {
        if self.is_unbounded() {
            return true;
        }
        due_date.is_some_and(|date| {
            self.from.as_ref().is_none_or(|from| date >= from)
                && self.to.as_ref().is_none_or(|to| date <= to)
        })
    }
}

// =============================================================================
// Task Filter
// =============================================================================

/// Storage predicate of a list request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskFilter {
    /// Status constraint.
    pub status: StatusFilter,
    /// Due-date constraint.
    pub due: DateRange,
}

impl TaskFilter {
    /// Creates a filter from its parts.
    #[must_use]
    pub const fn new(status: StatusFilter, due: DateRange) -> Self {
        Self { status, due }
    }

    /// Returns true when `task` satisfies the predicate.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.status.matches(task.status) && self.due.contains(task.due_date.as_ref())
    }
}

// =============================================================================
// Page Window
// =============================================================================

/// One-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Page number (1-indexed, at least 1).
    pub page: u64,
    /// Items per page (at least 1).
    pub per_page: u64,
}

impl PageRequest {
    /// Creates a page window, raising both values to at least 1.
    #[must_use]
    pub const fn new(page: u64, per_page: u64) -> Self {
        Self {
            page: if page == 0 { 1 } else { page },
            per_page: if per_page == 0 { 1 } else { per_page },
        }
    }

    /// Number of matching items skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// Maximum number of items on this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.per_page
    }

    /// Returns `max(1, ceil(total / per_page))`.
    #[must_use]
    pub const fn total_pages(&self, total: u64) -> u64 {
        let pages = total.div_ceil(self.per_page);
        if pages == 0 { 1 } else { pages }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PER_PAGE)
    }
}

// =============================================================================
// Task Query
// =============================================================================

/// Canonical list request: predicate plus page window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskQuery {
    /// Which tasks match.
    pub filter: TaskFilter,
    /// Which slice of the ordered matches to return.
    pub page: PageRequest,
}

impl TaskQuery {
    /// Creates a query from its parts.
    #[must_use]
    pub const fn new(filter: TaskFilter, page: PageRequest) -> Self {
        Self { filter, page }
    }

    /// Applies the query to an in-memory collection.
    ///
    /// Returns the total number of matches and the requested page, ordered
    /// by [`listing_order`].
    #[must_use]
    pub fn apply<'a, I>(&self, tasks: I) -> (u64, Vec<&'a Task>)
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut matching: Vec<&Task> = tasks
            .into_iter()
            .filter(|task| self.filter.matches(task))
            .collect();
        matching.sort_by(|left, right| listing_order(left, right));

        let total = matching.len() as u64;
        let offset = usize::try_from(self.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.page.limit()).unwrap_or(usize::MAX);
        let page = matching.into_iter().skip(offset).take(limit).collect();
        (total, page)
    }
}

/// Listing order: due date ascending with absent dates first, then id.
#[must_use]
pub fn listing_order(left: &Task, right: &Task) -> Ordering {
    left.due_date
        .cmp(&right.due_date)
        .then_with(|| left.id.cmp(&right.id))
}

// =============================================================================
// Tests
// =============================================================================
