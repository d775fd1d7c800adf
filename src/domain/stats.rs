//! Completion statistics over the whole task set.

use serde::{Deserialize, Serialize};

use super::task::TaskStatus;

/// Number of tasks in each status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Tasks with status `pending`.
    pub pending: u64,
    /// Tasks with status `in-progress`.
    pub in_progress: u64,
    /// Tasks with status `completed`.
    pub completed: u64,
}

impl StatusCounts {
    /// Counts the statuses of an iterator of tasks' statuses.
    pub fn tally<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = TaskStatus>,
    {
        statuses
            .into_iter()
            .fold(Self::default(), |counts, status| counts.with_one(status))
    }

    /// Returns the counts with one more task of `status`.
    #[must_use]
    pub const fn with_one(mut self, status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending => self.pending += 1,
            TaskStatus::InProgress => self.in_progress += 1,
            TaskStatus::Completed => self.completed += 1,
        }
        self
    }

    /// Total number of tasks.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pending + self.in_progress + self.completed
    }
}

/// Aggregate completion figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalStats {
    /// Per-status counts.
    pub counts: StatusCounts,
    /// Total number of tasks.
    pub total: u64,
    /// Rounded completion percentage, 0 when there are no tasks.
    pub percent: u64,
}

impl GlobalStats {
    /// Derives the aggregate figures from per-status counts.
    #[must_use]
    pub const fn from_counts(counts: StatusCounts) -> Self {
        let total = counts.total();
        Self {
            counts,
            total,
            percent: completion_percent(counts.completed, total),
        }
    }

    /// Tasks that are completed.
    #[must_use]
    pub const fn done(&self) -> u64 {
        self.counts.completed
    }

    /// Tasks that are not completed.
    #[must_use]
    pub const fn not_done(&self) -> u64 {
        self.total - self.counts.completed
    }
}

/// Returns `round(completed / total * 100)`, rounding halves up.
///
/// Returns 0 when `total` is 0.
#[must_use]
pub const fn completion_percent(completed: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (completed * 200 + total) / (total * 2)
}
